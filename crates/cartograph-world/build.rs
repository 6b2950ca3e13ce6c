use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const COLORS_JSON: &str = "assets/block_colors.json";

fn main() {
    println!("cargo:rerun-if-changed={}", COLORS_JSON);

    let json = fs::read_to_string(COLORS_JSON).expect("Failed to read block_colors.json");
    let colors: BTreeMap<String, String> =
        serde_json::from_str(&json).expect("Failed to parse block_colors.json");

    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("block_colors.rs");
    let mut out_file = File::create(&dest_path).expect("Failed to create block_colors.rs");

    writeln!(&mut out_file, "pub static BLOCK_COLORS: &[(&str, &str)] = &[").unwrap();
    for (name, hex) in &colors {
        assert!(
            hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
            "Color for {} is not RRGGBB: {}",
            name,
            hex
        );
        assert!(name.contains(':'), "Block id {} has no namespace", name);
        writeln!(&mut out_file, "    ({:?}, {:?}),", name, hex).unwrap();
    }
    writeln!(&mut out_file, "];").unwrap();
}
