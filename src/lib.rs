pub mod config;
pub mod error;
pub mod level;
pub mod world;

// Re-export commonly used items
pub use config::{Config, SurfaceArgs};
pub use error::{CartographError, Result};
pub use level::LevelInfo;
pub use world::{ChunkFailure, SurfaceOptions, World, WorldSurfaces};
