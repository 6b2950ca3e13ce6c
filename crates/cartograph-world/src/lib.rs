//! Region files, chunk payloads and the per-column surface projection used for minimaps.

pub mod chunk;
pub mod colors;
pub mod error;
pub mod location;
pub mod palette;
pub mod region;
pub mod section;
pub mod surface;

pub use chunk::{decode_chunk, encode_chunk, ChunkData, Compression};
pub use colors::BlockColors;
pub use error::{Result, WorldError};
pub use location::{ChunkLocation, RegionPosition};
pub use palette::PackingPolicy;
pub use region::{DirectoryEntry, RegionFile, RegionWriter};
pub use section::SubChunk;
pub use surface::{extract, Surface, SurfaceBlock};
