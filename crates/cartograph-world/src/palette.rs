//! Bit-packed palette indices inside a section's long array.

use crate::error::{Result, WorldError};

pub const SECTION_EDGE: usize = 16;
pub const BLOCKS_PER_SECTION: usize = SECTION_EDGE * SECTION_EDGE * SECTION_EDGE;
pub const MIN_BITS_PER_ENTRY: u32 = 4;

/// First data version (20w17a) whose packed arrays never let an entry cross a word.
pub const PADDED_PACKING_DATA_VERSION: i32 = 2527;

/// How entries sit relative to 64-bit word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackingPolicy {
    /// Each word holds `64 / bits` whole entries; leftover high bits are padding.
    Padded,
    /// Entries are laid end to end and may straddle two words.
    Spanning,
}

impl PackingPolicy {
    pub fn for_data_version(data_version: i32) -> Self {
        if data_version >= PADDED_PACKING_DATA_VERSION {
            PackingPolicy::Padded
        } else {
            PackingPolicy::Spanning
        }
    }

    /// Number of longs needed for a full section at `bits` per entry.
    pub fn words_required(self, bits: u32) -> usize {
        let bits = bits as usize;
        match self {
            PackingPolicy::Padded => {
                let per_word = 64 / bits;
                BLOCKS_PER_SECTION.div_ceil(per_word)
            }
            PackingPolicy::Spanning => (BLOCKS_PER_SECTION * bits).div_ceil(64),
        }
    }
}

/// `max(4, ceil(log2(palette_size)))`
pub fn bits_per_entry(palette_size: usize) -> u32 {
    let needed = usize::BITS - palette_size.saturating_sub(1).leading_zeros();
    needed.max(MIN_BITS_PER_ENTRY)
}

fn check_palette_size(palette_size: usize) -> Result<()> {
    if palette_size == 0 || palette_size > BLOCKS_PER_SECTION {
        return Err(WorldError::InvalidPaletteSize(palette_size));
    }
    Ok(())
}

/// Decodes 4096 palette indices in storage order (`y * 256 + z * 16 + x`).
///
/// A single-entry palette needs no data and yields all zeros.
pub fn unpack(words: &[i64], palette_size: usize, policy: PackingPolicy) -> Result<Vec<u16>> {
    check_palette_size(palette_size)?;
    if palette_size == 1 {
        return Ok(vec![0; BLOCKS_PER_SECTION]);
    }

    let bits = bits_per_entry(palette_size);
    let expected = policy.words_required(bits);
    if words.len() < expected {
        return Err(WorldError::PackedDataTooShort {
            expected,
            found: words.len(),
        });
    }

    let bits = bits as usize;
    let mask = (1u64 << bits) - 1;
    let mut indices = Vec::with_capacity(BLOCKS_PER_SECTION);
    match policy {
        PackingPolicy::Padded => {
            let per_word = 64 / bits;
            for i in 0..BLOCKS_PER_SECTION {
                let word = words[i / per_word] as u64;
                let shift = (i % per_word) * bits;
                indices.push(((word >> shift) & mask) as usize);
            }
        }
        PackingPolicy::Spanning => {
            for i in 0..BLOCKS_PER_SECTION {
                let bit = i * bits;
                let start_long = bit / 64;
                let start_offset = bit % 64;
                let mut value = (words[start_long] as u64) >> start_offset;
                if start_offset + bits > 64 {
                    value |= (words[start_long + 1] as u64) << (64 - start_offset);
                }
                indices.push((value & mask) as usize);
            }
        }
    }

    indices
        .into_iter()
        .map(|index| {
            if index < palette_size {
                Ok(index as u16)
            } else {
                Err(WorldError::PaletteIndexOutOfRange {
                    index,
                    palette_size,
                })
            }
        })
        .collect()
}

/// Inverse of [`unpack`]: packs storage-order indices into longs.
pub fn pack(indices: &[u16], palette_size: usize, policy: PackingPolicy) -> Result<Vec<i64>> {
    check_palette_size(palette_size)?;
    if indices.len() != BLOCKS_PER_SECTION {
        return Err(WorldError::PackedDataTooShort {
            expected: BLOCKS_PER_SECTION,
            found: indices.len(),
        });
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= palette_size) {
        return Err(WorldError::PaletteIndexOutOfRange {
            index: index as usize,
            palette_size,
        });
    }

    let bits = bits_per_entry(palette_size);
    let mut words = vec![0u64; policy.words_required(bits)];
    let bits = bits as usize;
    match policy {
        PackingPolicy::Padded => {
            let per_word = 64 / bits;
            for (i, &index) in indices.iter().enumerate() {
                words[i / per_word] |= (index as u64) << ((i % per_word) * bits);
            }
        }
        PackingPolicy::Spanning => {
            for (i, &index) in indices.iter().enumerate() {
                let bit = i * bits;
                let start_long = bit / 64;
                let start_offset = bit % 64;
                words[start_long] |= (index as u64) << start_offset;
                if start_offset + bits > 64 {
                    words[start_long + 1] |= (index as u64) >> (64 - start_offset);
                }
            }
        }
    }
    Ok(words.into_iter().map(|w| w as i64).collect())
}

/// Maps index `i` of the reversed (top-down) sequence to `(x, y, z)`, with `y` absolute.
///
/// Index 0 is the top of the section and index 4095 the bottom.
pub fn block_position(i: usize, section_y: i32) -> (usize, i32, usize) {
    let x = (i / SECTION_EDGE) % SECTION_EDGE;
    let y = section_y * SECTION_EDGE as i32
        + (((BLOCKS_PER_SECTION - 1 - i) / (SECTION_EDGE * SECTION_EDGE)) % SECTION_EDGE) as i32;
    let z = i % SECTION_EDGE;
    (x, y, z)
}
