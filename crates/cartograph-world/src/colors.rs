//! Block id to minimap color lookup.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::section::NAMESPACE;

mod bundled {
    include!(concat!(env!("OUT_DIR"), "/block_colors.rs"));
}

/// Fourth byte of every parsed color; distinguishes a resolved color from the all-zero placeholder.
pub const COLOR_MARKER: u8 = 0xFF;

static BUNDLED: Lazy<BlockColors> =
    Lazy::new(|| BlockColors::from_pairs(bundled::BLOCK_COLORS.iter().copied()));

#[derive(Debug, Clone, Default)]
pub struct BlockColors {
    colors: HashMap<String, String>,
}

impl BlockColors {
    /// The table compiled in from `assets/block_colors.json`.
    pub fn bundled() -> &'static BlockColors {
        &BUNDLED
    }

    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<String>,
    {
        let mut colors = BlockColors::default();
        for (name, hex) in pairs {
            colors.insert(name.as_ref(), hex);
        }
        colors
    }

    pub fn insert(&mut self, name: &str, hex: impl Into<String>) {
        self.colors.insert(namespaced(name), hex.into());
    }

    /// Adds every entry of `other`, overriding colors already present.
    pub fn extend(&mut self, other: BlockColors) {
        self.colors.extend(other.colors);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn hex(&self, name: &str) -> Option<&str> {
        let hex = if name.contains(':') {
            self.colors.get(name)
        } else {
            self.colors.get(&namespaced(name))
        };
        hex.map(String::as_str)
    }

    /// RGB plus [`COLOR_MARKER`], or `None` if the block has no usable color.
    pub fn color(&self, name: &str) -> Option<[u8; 4]> {
        self.hex(name).and_then(parse_hex)
    }
}

fn namespaced(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{}{}", NAMESPACE, name)
    }
}

/// Parses `RRGGBB` (an optional leading `#` is accepted).
pub fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?, COLOR_MARKER])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("3f76e4"), Some([0x3f, 0x76, 0xe4, 0xff]));
        assert_eq!(parse_hex("#FFFFFF"), Some([255, 255, 255, 255]));
        assert_eq!(parse_hex("fff"), None);
        assert_eq!(parse_hex("zz0000"), None);
    }

    #[test]
    fn test_bundled_table() {
        let colors = BlockColors::bundled();
        assert!(!colors.is_empty());
        assert!(colors.color("minecraft:water").is_some());
        assert!(colors.color("minecraft:grass_block").is_some());
        assert_eq!(colors.color("minecraft:air"), None);
        assert_eq!(colors.color("minecraft:stone"), None);
    }

    #[test]
    fn test_bare_names_resolve_under_default_namespace() {
        let colors = BlockColors::from_pairs([("sand", "dbcfa3"), ("mymod:ore", "102030")]);
        assert_eq!(colors.hex("minecraft:sand"), Some("dbcfa3"));
        assert_eq!(colors.hex("sand"), Some("dbcfa3"));
        assert_eq!(colors.hex("mymod:ore"), Some("102030"));
        assert_eq!(colors.hex("ore"), None);
    }

    #[test]
    fn test_extend_overrides() {
        let mut colors = BlockColors::from_pairs([("minecraft:sand", "000000")]);
        colors.extend(BlockColors::from_pairs([("minecraft:sand", "ffffff")]));
        assert_eq!(colors.len(), 1);
        assert_eq!(colors.color("sand"), Some([255, 255, 255, 255]));
    }
}
