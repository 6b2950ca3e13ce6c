//! Per-column surface projection of a chunk, as drawn by a minimap.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::colors::BlockColors;
use crate::error::Result;
use crate::location::ChunkLocation;
use crate::palette::{block_position, PackingPolicy, SECTION_EDGE};
use crate::section::{is_water, SubChunk};

pub const COLUMNS: usize = SECTION_EDGE * SECTION_EDGE;

/// Height reported for a column with no colorable block under the height limit.
pub const NO_BLOCK_Y: i32 = -63;

/// Vertical band used to shade water by the height of the floor beneath it.
pub const WATER_FLOOR_MIN: i32 = 53;
pub const WATER_FLOOR_MAX: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceBlock {
    /// RGB followed by a marker byte; all zeros for an unresolved column.
    pub color: [u8; 4],
    pub y: i32,
    pub is_water: bool,
    /// Floor depth under water in `0..=7`, `None` until a lower non-water block is seen.
    pub depth: Option<u8>,
}

impl SurfaceBlock {
    /// Wire value of an unresolved depth.
    pub const DEPTH_PENDING: i32 = -99;

    pub fn placeholder() -> Self {
        SurfaceBlock {
            color: [0; 4],
            y: NO_BLOCK_Y,
            is_water: false,
            depth: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }

    pub fn depth_or_pending(&self) -> i32 {
        self.depth.map_or(Self::DEPTH_PENDING, i32::from)
    }

    fn is_depth_pending(&self) -> bool {
        self.is_water && self.depth.is_none()
    }
}

impl Default for SurfaceBlock {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub location: ChunkLocation,
    /// One entry per column, indexed by [`column_index`].
    pub blocks: Vec<SurfaceBlock>,
    /// Absolute block heights holding at least one colorable block.
    pub valid_y: BTreeSet<i32>,
}

impl Surface {
    /// Block of the column at mapped `(x, z)`, `None` outside `0..16`.
    pub fn block(&self, x: usize, z: usize) -> Option<&SurfaceBlock> {
        if x >= SECTION_EDGE || z >= SECTION_EDGE {
            return None;
        }
        self.blocks.get(column_index(x, z))
    }

    pub fn resolved_columns(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_placeholder()).count()
    }
}

/// Column slot for mapped coordinates; both axes are mirrored.
pub fn column_index(x: usize, z: usize) -> usize {
    (SECTION_EDGE - 1 - x) + (SECTION_EDGE - 1 - z) * SECTION_EDGE
}

pub fn water_depth(floor_y: i32) -> u8 {
    (floor_y.clamp(WATER_FLOOR_MIN, WATER_FLOOR_MAX) - WATER_FLOOR_MIN) as u8
}

/// Resolves the topmost colorable block of every column at or below `height_limit`.
///
/// Sub-chunks may be passed in any order. When `need_valid_y` is set, every height holding
/// a colorable block is collected regardless of the limit.
pub fn extract(
    location: ChunkLocation,
    sub_chunks: &[SubChunk],
    height_limit: i32,
    need_valid_y: bool,
    policy: PackingPolicy,
    colors: &BlockColors,
) -> Result<Surface> {
    let mut ordered: Vec<&SubChunk> = sub_chunks.iter().collect();
    ordered.sort_by(|a, b| b.y.cmp(&a.y));

    let mut columns: Vec<Option<SurfaceBlock>> = vec![None; COLUMNS];
    let mut valid_y = BTreeSet::new();

    for sub_chunk in ordered {
        if sub_chunk.is_air_only() {
            continue;
        }
        let settled = columns
            .iter()
            .all(|c| matches!(c, Some(b) if !b.is_depth_pending()));
        if settled && !need_valid_y {
            break;
        }

        let resolved: Vec<(bool, Option<[u8; 4]>)> = sub_chunk
            .palette
            .iter()
            .map(|name| (is_water(name), colors.color(name)))
            .collect();
        let indices = sub_chunk.top_down_indices(policy)?;

        for (i, &index) in indices.iter().enumerate() {
            let (water, color) = resolved[index as usize];
            let (x, y, z) = block_position(i, sub_chunk.y);

            if need_valid_y && color.is_some() {
                valid_y.insert(y);
            }
            if y > height_limit {
                continue;
            }

            let column = column_index(x, z);
            match columns[column] {
                Some(ref mut existing) => {
                    if existing.is_depth_pending() && !water {
                        existing.depth = Some(water_depth(y));
                    }
                }
                None => {
                    if let Some(color) = color {
                        columns[column] = Some(SurfaceBlock {
                            color,
                            y,
                            is_water: water,
                            depth: None,
                        });
                    }
                }
            }
        }
    }

    Ok(Surface {
        location,
        blocks: columns
            .into_iter()
            .map(|c| c.unwrap_or_else(SurfaceBlock::placeholder))
            .collect(),
        valid_y,
    })
}
