use serde::{Deserialize, Serialize};
use std::fmt;

/// Chunks per region edge.
pub const REGION_CHUNKS: i32 = 32;

/// Chunk coordinates in the world (block coordinates divided by 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkLocation {
    pub x: i32,
    pub z: i32,
}

impl ChunkLocation {
    pub fn new(x: i32, z: i32) -> Self {
        ChunkLocation { x, z }
    }

    /// Directory slot inside the owning region file.
    pub fn slot_index(&self) -> usize {
        (self.x.rem_euclid(REGION_CHUNKS) + self.z.rem_euclid(REGION_CHUNKS) * REGION_CHUNKS)
            as usize
    }

    pub fn region(&self) -> RegionPosition {
        RegionPosition {
            x: self.x.div_euclid(REGION_CHUNKS),
            z: self.z.div_euclid(REGION_CHUNKS),
        }
    }
}

impl fmt::Display for ChunkLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.x, self.z)
    }
}

/// Region coordinates, as in `r.<x>.<z>.mca`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionPosition {
    pub x: i32,
    pub z: i32,
}

impl RegionPosition {
    pub fn new(x: i32, z: i32) -> Self {
        RegionPosition { x, z }
    }

    pub fn file_name(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }

    pub fn parse_file_name(name: &str) -> Option<Self> {
        let mut parts = name.strip_prefix("r.")?.strip_suffix(".mca")?.split('.');
        let x = parts.next()?.parse().ok()?;
        let z = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(RegionPosition { x, z })
    }

    /// World location of the chunk stored in directory `slot`.
    pub fn chunk_at_slot(&self, slot: usize) -> ChunkLocation {
        let slot = slot as i32;
        ChunkLocation {
            x: self.x * REGION_CHUNKS + slot % REGION_CHUNKS,
            z: self.z * REGION_CHUNKS + slot / REGION_CHUNKS,
        }
    }
}
