use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use cartograph::{Config, Result, SurfaceArgs, SurfaceOptions, World};
use cartograph_logger::{log, set_max_severity, LogSeverity};
use cartograph_nbt::NbtFile;
use cartograph_world::{ChunkLocation, RegionFile};
use clap::{Parser, Subcommand};
use LogSeverity::*;

#[derive(Parser)]
#[command(name = "cartograph", about = "Inspect world saves and derive minimap surfaces")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the surface of every chunk in a world
    Surface(SurfaceArgs),
    /// Print the tag tree of an NBT file such as level.dat
    Tree {
        /// NBT file (gzip, zlib or uncompressed)
        path: PathBuf,
        /// Print only the tag at this path, e.g. Data.Version.Name
        #[arg(long)]
        find: Option<String>,
    },
    /// List the chunks stored in a region file
    Region {
        /// Region file (r.<x>.<z>.mca)
        path: PathBuf,
        /// Print the tag tree of the chunk at X Z
        #[arg(long, num_args = 2, value_names = ["X", "Z"], allow_hyphen_values = true)]
        chunk: Option<Vec<i32>>,
    },
}

async fn run_surface(args: SurfaceArgs) -> Result<()> {
    let config = Config::from_args(args)?;
    set_max_severity(config.log_level);

    let colors = config.block_colors()?;
    let world = World::open(&config.world).await?;
    let surfaces = world
        .surfaces(SurfaceOptions::from(&config), colors)
        .await?;

    println!(
        "{}: {} chunk surfaces, {} failures",
        world
            .level()
            .map(|level| level.name.clone())
            .unwrap_or_else(|| world.root().display().to_string()),
        surfaces.surfaces.len(),
        surfaces.failures.len()
    );
    for failure in &surfaces.failures {
        match failure.location {
            Some(location) => println!(
                "  {} chunk {}: {}",
                failure.region.file_name(),
                location,
                failure.error
            ),
            None => println!("  {}: {}", failure.region.file_name(), failure.error),
        }
    }

    if let Some(output) = &config.output {
        let writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer(writer, &surfaces).map_err(std::io::Error::from)?;
        log(format!("Wrote surfaces to {}", output.display()), Info);
    }
    Ok(())
}

fn run_tree(path: &Path, find: Option<&str>) -> Result<()> {
    let tree = NbtFile::open(path)?.into_tree();
    if let Some(find) = find {
        match tree.find(find).and_then(|id| tree.get(id)) {
            Some(tag) => println!("{}", tag),
            None => println!("No tag at {}", find),
        }
        return Ok(());
    }

    for id in tree.ids() {
        let (Some(kind), Some(tag)) = (tree.kind(id), tree.get(id)) else {
            continue;
        };
        let path = tree.path(id);
        let path = if path.is_empty() { "<root>" } else { path.as_str() };
        if kind.is_container() {
            println!("{} {} ({} children)", path, kind, tree.children(id).len());
        } else {
            println!("{} {} = {}", path, kind, tag);
        }
    }
    Ok(())
}

fn run_region(path: &Path, chunk: Option<&[i32]>) -> Result<()> {
    let region = RegionFile::open(path)?;
    if let Some(&[x, z]) = chunk {
        let location = ChunkLocation::new(x, z);
        match region.read_chunk(location)? {
            Some(root) => println!("{}", cartograph_nbt::Tag::Compound(root)),
            None => println!("Chunk {} is not present", location),
        }
        return Ok(());
    }

    let mut present = 0;
    for location in region.present_locations() {
        let entry = region.entry(location);
        println!(
            "{:>4} {:>4}  sector {:>5} x{:<3} modified {}",
            location.x, location.z, entry.offset, entry.sectors, entry.timestamp
        );
        present += 1;
    }
    println!(
        "{}: {} of 1024 chunks present, {} bytes",
        region.position().file_name(),
        present,
        region.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Surface(args) => run_surface(args).await,
        Command::Tree { path, find } => run_tree(&path, find.as_deref()),
        Command::Region { path, chunk } => run_region(&path, chunk.as_deref()),
    };

    if let Err(err) = result {
        log(format!("{}", err), Fatal);
        std::process::exit(1);
    }
}
