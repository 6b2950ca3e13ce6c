//! Settings for surface extraction: CLI flags over an optional JSON file over defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cartograph_logger::LogSeverity;
use cartograph_world::colors::parse_hex;
use cartograph_world::BlockColors;
use clap::Args;
use serde::Deserialize;

use crate::error::{CartographError, Result};

pub const DEFAULT_HEIGHT_LIMIT: i32 = 319;
pub const DEFAULT_PARALLEL_REGIONS: usize = 4;

/// Flags of the `surface` command. Unset flags fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SurfaceArgs {
    /// World save directory (the one holding level.dat)
    pub world: Option<PathBuf>,
    /// JSON file with any of the settings below
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Highest block y considered for coloring
    #[arg(long, allow_hyphen_values = true)]
    pub height_limit: Option<i32>,
    /// Also collect every height holding a colorable block
    #[arg(long)]
    pub valid_y: bool,
    /// Region files processed at once
    #[arg(long)]
    pub parallel_regions: Option<usize>,
    /// debug, info, warning, error or fatal
    #[arg(long)]
    pub log_level: Option<String>,
    /// Write all surfaces as JSON to this path
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// JSON object of extra block colors (id -> RRGGBB) layered over the bundled table
    #[arg(long)]
    pub colors: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub world: Option<PathBuf>,
    pub height_limit: Option<i32>,
    pub valid_y: Option<bool>,
    pub parallel_regions: Option<usize>,
    pub log_level: Option<String>,
    pub output: Option<PathBuf>,
    pub colors: Option<PathBuf>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            CartographError::ConfigError(format!("cannot read {}: {}", path.display(), err))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub world: PathBuf,
    pub height_limit: i32,
    pub valid_y: bool,
    pub parallel_regions: usize,
    pub log_level: LogSeverity,
    pub output: Option<PathBuf>,
    pub colors: Option<PathBuf>,
}

impl Config {
    pub fn new(world: impl Into<PathBuf>) -> Self {
        Config {
            world: world.into(),
            height_limit: DEFAULT_HEIGHT_LIMIT,
            valid_y: false,
            parallel_regions: DEFAULT_PARALLEL_REGIONS,
            log_level: LogSeverity::Info,
            output: None,
            colors: None,
        }
    }

    /// Reads `--config` if given, then layers the flags on top.
    pub fn from_args(args: SurfaceArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    pub fn resolve(args: SurfaceArgs, file: FileConfig) -> Result<Self> {
        let world = args.world.or(file.world).ok_or_else(|| {
            CartographError::ConfigError("no world directory given".to_string())
        })?;

        let parallel_regions = args
            .parallel_regions
            .or(file.parallel_regions)
            .unwrap_or(DEFAULT_PARALLEL_REGIONS);
        if parallel_regions == 0 {
            return Err(CartographError::ConfigError(
                "parallel_regions must be at least 1".to_string(),
            ));
        }

        let log_level = match args.log_level.or(file.log_level) {
            Some(level) => level
                .parse::<LogSeverity>()
                .map_err(|err| CartographError::ConfigError(format!("{}", err)))?,
            None => LogSeverity::Info,
        };

        Ok(Config {
            world,
            height_limit: args
                .height_limit
                .or(file.height_limit)
                .unwrap_or(DEFAULT_HEIGHT_LIMIT),
            valid_y: args.valid_y || file.valid_y.unwrap_or(false),
            parallel_regions,
            log_level,
            output: args.output.or(file.output),
            colors: args.colors.or(file.colors),
        })
    }

    /// The bundled color table, extended with the entries of `colors` when set.
    pub fn block_colors(&self) -> Result<Arc<BlockColors>> {
        let mut colors = BlockColors::bundled().clone();
        if let Some(path) = &self.colors {
            let json = fs::read_to_string(path)?;
            let extra: BTreeMap<String, String> = serde_json::from_str(&json)?;
            if let Some((name, hex)) = extra.iter().find(|(_, hex)| parse_hex(hex).is_none()) {
                return Err(CartographError::ConfigError(format!(
                    "color for {} in {} is not RRGGBB: {:?}",
                    name,
                    path.display(),
                    hex
                )));
            }
            colors.extend(BlockColors::from_pairs(extra));
        }
        Ok(Arc::new(colors))
    }
}
