//! World directories: `level.dat` plus the region files under `region/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use cartograph_logger::{log, LogSeverity};
use cartograph_nbt::NbtFile;
use cartograph_world::{
    BlockColors, ChunkData, ChunkLocation, RegionFile, RegionPosition, Surface, WorldError,
};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error::{CartographError, Result};
use crate::level::LevelInfo;
use LogSeverity::*;

pub const LEVEL_FILE: &str = "level.dat";
pub const REGION_DIR: &str = "region";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub height_limit: i32,
    pub need_valid_y: bool,
    pub parallel_regions: usize,
}

impl From<&Config> for SurfaceOptions {
    fn from(config: &Config) -> Self {
        SurfaceOptions {
            height_limit: config.height_limit,
            need_valid_y: config.valid_y,
            parallel_regions: config.parallel_regions,
        }
    }
}

/// A chunk (or a whole region when `location` is `None`) that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkFailure {
    pub region: RegionPosition,
    pub location: Option<ChunkLocation>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldSurfaces {
    pub surfaces: Vec<Surface>,
    pub failures: Vec<ChunkFailure>,
}

impl WorldSurfaces {
    fn failed(region: RegionPosition, location: Option<ChunkLocation>, error: String) -> Self {
        WorldSurfaces {
            surfaces: Vec::new(),
            failures: vec![ChunkFailure {
                region,
                location,
                error,
            }],
        }
    }

    fn merge(&mut self, other: WorldSurfaces) {
        self.surfaces.extend(other.surfaces);
        self.failures.extend(other.failures);
    }
}

#[derive(Debug, Clone)]
pub struct World {
    root: PathBuf,
    level: Option<LevelInfo>,
    regions: Vec<(RegionPosition, PathBuf)>,
}

impl World {
    /// Reads `level.dat` and lists `region/r.<x>.<z>.mca`.
    ///
    /// A missing or unreadable `level.dat` and a missing region directory are logged, not fatal.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !tokio::fs::metadata(&root).await?.is_dir() {
            return Err(CartographError::ConfigError(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let level = match tokio::fs::read(root.join(LEVEL_FILE)).await {
            Ok(bytes) => match NbtFile::read(&bytes)
                .map_err(CartographError::from)
                .and_then(|file| LevelInfo::from_nbt(&file))
            {
                Ok(level) => Some(level),
                Err(err) => {
                    log(format!("Ignoring unreadable {}: {}", LEVEL_FILE, err), Warning);
                    None
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log(format!("No {} in {}", LEVEL_FILE, root.display()), Warning);
                None
            }
            Err(err) => return Err(err.into()),
        };

        let mut regions = Vec::new();
        match tokio::fs::read_dir(root.join(REGION_DIR)).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    let name = entry.file_name();
                    match name.to_str().and_then(RegionPosition::parse_file_name) {
                        Some(position) => regions.push((position, entry.path())),
                        None => log(format!("Skipping {:?} in region directory", name), Debug),
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log(format!("No region directory in {}", root.display()), Warning);
            }
            Err(err) => return Err(err.into()),
        }
        regions.sort();

        if let Some(level) = &level {
            log(
                format!("Opened world \"{}\" with {} region files", level.name, regions.len()),
                Info,
            );
        }
        Ok(World {
            root,
            level,
            regions,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn level(&self) -> Option<&LevelInfo> {
        self.level.as_ref()
    }

    pub fn regions(&self) -> &[(RegionPosition, PathBuf)] {
        &self.regions
    }

    /// Extracts the surface of every present chunk, `parallel_regions` region files at a time.
    ///
    /// Bad chunks and unreadable regions are collected as failures; only a crashed task aborts.
    pub async fn surfaces(
        &self,
        options: SurfaceOptions,
        colors: Arc<BlockColors>,
    ) -> Result<WorldSurfaces> {
        let semaphore = Arc::new(Semaphore::new(options.parallel_regions.max(1)));

        let tasks = self.regions.iter().map(|(position, path)| {
            let semaphore = semaphore.clone();
            let colors = colors.clone();
            let position = *position;
            let path = path.clone();
            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|err| CartographError::TaskError(err.to_string()))?;

                let bytes = match tokio::fs::read(&path).await {
                    Ok(bytes) => Bytes::from(bytes),
                    Err(err) => {
                        log(format!("Cannot read {}: {}", path.display(), err), Warning);
                        return Ok(WorldSurfaces::failed(position, None, err.to_string()));
                    }
                };

                let result = tokio::task::spawn_blocking(move || match RegionFile::parse(bytes) {
                    Ok(region) => region_surfaces(&region.with_position(position), options, &colors),
                    Err(err) => {
                        log(format!("Skipping region {}: {}", position.file_name(), err), Warning);
                        WorldSurfaces::failed(position, None, err.to_string())
                    }
                })
                .await?;
                Ok::<_, CartographError>(result)
            }
        });

        let mut all = WorldSurfaces::default();
        for result in join_all(tasks).await {
            all.merge(result?);
        }
        all.surfaces.sort_by_key(|surface| surface.location);

        log(
            format!(
                "Extracted {} chunk surfaces from {} regions ({} failures)",
                all.surfaces.len(),
                self.regions.len(),
                all.failures.len()
            ),
            Info,
        );
        Ok(all)
    }
}

/// Surfaces of every present chunk in one region; failing chunks are logged and recorded.
pub fn region_surfaces(
    region: &RegionFile,
    options: SurfaceOptions,
    colors: &BlockColors,
) -> WorldSurfaces {
    let mut result = WorldSurfaces::default();
    for location in region.present_locations() {
        match chunk_surface(region, location, options, colors) {
            Ok(Some(surface)) => result.surfaces.push(surface),
            Ok(None) => {}
            Err(err) => {
                log(
                    format!(
                        "Skipping chunk {} in {}: {}",
                        location,
                        region.position().file_name(),
                        err
                    ),
                    Warning,
                );
                result.failures.push(ChunkFailure {
                    region: region.position(),
                    location: Some(location),
                    error: err.to_string(),
                });
            }
        }
    }
    log(
        format!(
            "Region {}: {} surfaces, {} failures",
            region.position().file_name(),
            result.surfaces.len(),
            result.failures.len()
        ),
        Debug,
    );
    result
}

fn chunk_surface(
    region: &RegionFile,
    location: ChunkLocation,
    options: SurfaceOptions,
    colors: &BlockColors,
) -> std::result::Result<Option<Surface>, WorldError> {
    let Some(root) = region.read_chunk(location)? else {
        return Ok(None);
    };
    let chunk = ChunkData::from_nbt(&root)?;
    chunk
        .surface(options.height_limit, options.need_valid_y, colors)
        .map(Some)
}
