//! Chunk payloads and the block data inside them.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ByteOrder};
use cartograph_logger::{log, LogSeverity};
use cartograph_nbt::{Compound, NbtFile, Tag, TagKind};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::colors::BlockColors;
use crate::error::{Result, WorldError};
use crate::location::ChunkLocation;
use crate::palette::PackingPolicy;
use crate::section::SubChunk;
use crate::surface::{self, Surface};

const EXTERNAL_FLAG: u8 = 0x80;

/// First data version (17w47a) with per-section block palettes.
pub const FLATTENING_DATA_VERSION: i32 = 1451;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

impl Compression {
    pub fn from_id(id: u8) -> Result<Self> {
        if id & EXTERNAL_FLAG != 0 {
            return Err(WorldError::ExternalChunk);
        }
        match id {
            1 => Ok(Compression::Gzip),
            2 => Ok(Compression::Zlib),
            3 => Ok(Compression::Uncompressed),
            _ => Err(WorldError::UnsupportedCompression(id)),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

fn read_root<R: Read>(mut reader: R) -> Result<Compound> {
    Ok(NbtFile::read_uncompressed(&mut reader)?.root)
}

/// Decodes a framed payload: big-endian length, compression byte, compressed NBT.
///
/// The length counts the compression byte and the body.
pub fn decode_chunk(payload: &[u8]) -> Result<Compound> {
    if payload.len() < 5 {
        return Err(WorldError::TruncatedPayload {
            expected: 5,
            found: payload.len(),
        });
    }
    let length = BigEndian::read_u32(&payload[..4]) as usize;
    if length == 0 || payload.len() - 4 < length {
        return Err(WorldError::TruncatedPayload {
            expected: length.max(1),
            found: payload.len() - 4,
        });
    }

    let body = &payload[5..4 + length];
    match Compression::from_id(payload[4])? {
        Compression::Gzip => read_root(GzDecoder::new(body)),
        Compression::Zlib => read_root(ZlibDecoder::new(body)),
        Compression::Uncompressed => read_root(Cursor::new(body)),
    }
}

/// Frames `root` as an unnamed chunk document.
pub fn encode_chunk(root: &Compound, compression: Compression) -> Result<Vec<u8>> {
    let mut document = Vec::with_capacity(3 + root.size_in_bytes());
    document.extend_from_slice(&[TagKind::Compound.id(), 0, 0]);
    root.write_payload(&mut document)?;

    let body = match compression {
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&document)?;
            encoder.finish()?
        }
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&document)?;
            encoder.finish()?
        }
        Compression::Uncompressed => document,
    };

    let mut payload = vec![0u8; 5];
    BigEndian::write_u32(&mut payload[..4], body.len() as u32 + 1);
    payload[4] = compression.id();
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// The parts of a chunk the surface projection needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkData {
    pub location: ChunkLocation,
    pub data_version: i32,
    pub status: Option<String>,
    pub sections: Vec<SubChunk>,
}

impl ChunkData {
    /// Reads either the flat 1.18+ layout or the `Level`-wrapped 1.13 to 1.17 layout.
    pub fn from_nbt(root: &Compound) -> Result<Self> {
        let data_version = match root.get("DataVersion") {
            Some(tag) => tag.as_i32()?,
            None => 0,
        };
        if data_version < FLATTENING_DATA_VERSION {
            return Err(WorldError::UnsupportedLayout(format!(
                "data version {} predates block palettes ({})",
                data_version, FLATTENING_DATA_VERSION
            )));
        }

        let (level, sections, block_states, palette_key, data_key) = match root.get("Level") {
            Some(level) => (
                level.as_compound()?,
                "Sections",
                None,
                "Palette",
                "BlockStates",
            ),
            None => (root, "sections", Some("block_states"), "palette", "data"),
        };

        let location = ChunkLocation::new(level.get_int("xPos")?, level.get_int("zPos")?);
        let status = match level.get("Status") {
            Some(tag) => Some(tag.as_string()?.to_string()),
            None => None,
        };

        let mut sub_chunks = Vec::new();
        if let Some(list) = level.get(sections) {
            for section in list.as_list()? {
                let section = section.as_compound()?;
                let y = section_y(section)?;
                let states = match block_states {
                    Some(key) => match section.get(key) {
                        Some(states) => states.as_compound()?,
                        None => continue,
                    },
                    None => section,
                };
                let Some(palette) = states.get(palette_key) else {
                    if states.contains_key("Blocks") {
                        return Err(WorldError::UnsupportedLayout(format!(
                            "section {} of chunk {} stores numeric block ids",
                            y, location
                        )));
                    }
                    log(
                        format!("Section {} of chunk {} has no palette", y, location),
                        LogSeverity::Debug,
                    );
                    continue;
                };
                let palette = palette
                    .as_list()?
                    .iter()
                    .map(|entry| -> Result<String> {
                        Ok(entry.as_compound()?.get_string("Name")?.to_string())
                    })
                    .collect::<Result<Vec<_>>>()?;
                let data = match states.get(data_key) {
                    Some(data) => data.as_long_array()?.to_vec(),
                    None => Vec::new(),
                };
                sub_chunks.push(SubChunk::new(y, palette, data));
            }
        }

        Ok(ChunkData {
            location,
            data_version,
            status,
            sections: sub_chunks,
        })
    }

    pub fn packing_policy(&self) -> PackingPolicy {
        PackingPolicy::for_data_version(self.data_version)
    }

    pub fn surface(
        &self,
        height_limit: i32,
        need_valid_y: bool,
        colors: &BlockColors,
    ) -> Result<Surface> {
        surface::extract(
            self.location,
            &self.sections,
            height_limit,
            need_valid_y,
            self.packing_policy(),
            colors,
        )
    }
}

// Written as a byte by the game, though some tools store an int.
fn section_y(section: &Compound) -> Result<i32> {
    match section.field("Y")? {
        Tag::Int(y) => Ok(*y),
        other => Ok(other.as_i8()? as i32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use cartograph_nbt::{List, NbtError};

    fn palette(names: &[&str]) -> Tag {
        let entries = names
            .iter()
            .map(|name| {
                Tag::Compound([("Name", Tag::from(*name))].into_iter().collect())
            })
            .collect();
        Tag::List(List::from_tags(TagKind::Compound, entries).unwrap())
    }

    fn modern_chunk() -> Compound {
        let populated: Compound = [
            ("Y", Tag::Byte(-4)),
            (
                "block_states",
                Tag::Compound(
                    [
                        ("palette", palette(&["minecraft:stone", "minecraft:dirt"])),
                        ("data", Tag::LongArray(vec![0; 256])),
                    ]
                    .into_iter()
                    .collect(),
                ),
            ),
        ]
        .into_iter()
        .collect();
        let empty: Compound = [("Y", Tag::Byte(5))].into_iter().collect();
        [
            ("DataVersion", Tag::Int(3465)),
            ("xPos", Tag::Int(-3)),
            ("zPos", Tag::Int(7)),
            ("Status", Tag::from("minecraft:full")),
            (
                "sections",
                Tag::List(
                    List::from_tags(
                        TagKind::Compound,
                        vec![Tag::Compound(populated), Tag::Compound(empty)],
                    )
                    .unwrap(),
                ),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_compression_ids() {
        assert_eq!(Compression::from_id(1).unwrap(), Compression::Gzip);
        assert_eq!(Compression::from_id(3).unwrap(), Compression::Uncompressed);
        assert_matches!(Compression::from_id(0x82), Err(WorldError::ExternalChunk));
        assert_matches!(
            Compression::from_id(4),
            Err(WorldError::UnsupportedCompression(4))
        );
    }

    #[test]
    fn test_encode_decode_each_scheme() {
        let root = modern_chunk();
        for compression in [
            Compression::Gzip,
            Compression::Zlib,
            Compression::Uncompressed,
        ] {
            let payload = encode_chunk(&root, compression).unwrap();
            assert_eq!(payload[4], compression.id());
            assert_eq!(decode_chunk(&payload).unwrap(), root);
        }
    }

    #[test]
    fn test_decode_truncated() {
        let mut payload = encode_chunk(&modern_chunk(), Compression::Zlib).unwrap();
        payload.truncate(payload.len() - 3);
        assert_matches!(
            decode_chunk(&payload),
            Err(WorldError::TruncatedPayload { .. })
        );
        assert_matches!(
            decode_chunk(&[0, 0, 0]),
            Err(WorldError::TruncatedPayload {
                expected: 5,
                found: 3
            })
        );
    }

    #[test]
    fn test_decode_non_compound_root() {
        let payload = [0, 0, 0, 8, 3, 3, 0, 0, 0, 0, 0, 7];
        assert_matches!(
            decode_chunk(&payload),
            Err(WorldError::Nbt(NbtError::RootNotCompound(TagKind::Int)))
        );
    }

    #[test]
    fn test_modern_layout() {
        let chunk = ChunkData::from_nbt(&modern_chunk()).unwrap();
        assert_eq!(chunk.location, ChunkLocation::new(-3, 7));
        assert_eq!(chunk.data_version, 3465);
        assert_eq!(chunk.status.as_deref(), Some("minecraft:full"));
        assert_eq!(chunk.packing_policy(), PackingPolicy::Padded);
        assert_eq!(chunk.sections.len(), 1);
        assert_eq!(chunk.sections[0].y, -4);
        assert_eq!(
            chunk.sections[0].palette,
            vec!["minecraft:stone", "minecraft:dirt"]
        );
        assert_eq!(chunk.sections[0].data.len(), 256);
    }

    #[test]
    fn test_legacy_layout() {
        let section: Compound = [
            ("Y", Tag::Byte(2)),
            ("Palette", palette(&["minecraft:air"])),
        ]
        .into_iter()
        .collect();
        let no_palette: Compound = [("Y", Tag::Byte(-1))].into_iter().collect();
        let level: Compound = [
            ("xPos", Tag::Int(10)),
            ("zPos", Tag::Int(-20)),
            (
                "Sections",
                Tag::List(
                    List::from_tags(
                        TagKind::Compound,
                        vec![Tag::Compound(no_palette), Tag::Compound(section)],
                    )
                    .unwrap(),
                ),
            ),
        ]
        .into_iter()
        .collect();
        let root: Compound = [
            ("DataVersion", Tag::Int(2230)),
            ("Level", Tag::Compound(level)),
        ]
        .into_iter()
        .collect();

        let chunk = ChunkData::from_nbt(&root).unwrap();
        assert_eq!(chunk.location, ChunkLocation::new(10, -20));
        assert_eq!(chunk.packing_policy(), PackingPolicy::Spanning);
        assert_eq!(chunk.status, None);
        assert_eq!(chunk.sections.len(), 1);
        assert!(chunk.sections[0].is_air_only());
        assert!(chunk.sections[0].data.is_empty());
    }

    #[test]
    fn test_numeric_block_ids_are_unsupported() {
        let section: Compound = [
            ("Y", Tag::Byte(4)),
            ("Blocks", Tag::ByteArray(vec![1; 4096])),
            ("Data", Tag::ByteArray(vec![0; 2048])),
        ]
        .into_iter()
        .collect();
        let level = |sections: Vec<Tag>| -> Compound {
            [
                ("xPos", Tag::Int(0)),
                ("zPos", Tag::Int(0)),
                (
                    "Sections",
                    Tag::List(List::from_tags(TagKind::Compound, sections).unwrap()),
                ),
            ]
            .into_iter()
            .collect()
        };

        let old: Compound = [
            ("DataVersion", Tag::Int(1343)),
            ("Level", Tag::Compound(level(vec![Tag::Compound(section.clone())]))),
        ]
        .into_iter()
        .collect();
        assert_matches!(
            ChunkData::from_nbt(&old),
            Err(WorldError::UnsupportedLayout(_))
        );

        let unversioned: Compound = [("Level", Tag::Compound(level(vec![])))]
            .into_iter()
            .collect();
        assert_matches!(
            ChunkData::from_nbt(&unversioned),
            Err(WorldError::UnsupportedLayout(_))
        );

        // A palette-era version with a leftover numeric section is still rejected.
        let mixed: Compound = [
            ("DataVersion", Tag::Int(1631)),
            ("Level", Tag::Compound(level(vec![Tag::Compound(section)]))),
        ]
        .into_iter()
        .collect();
        assert_matches!(
            ChunkData::from_nbt(&mixed),
            Err(WorldError::UnsupportedLayout(_))
        );
    }

    #[test]
    fn test_missing_position() {
        let root: Compound = [("DataVersion", Tag::Int(3465))].into_iter().collect();
        assert_matches!(
            ChunkData::from_nbt(&root),
            Err(WorldError::Nbt(NbtError::MissingField(_)))
        );
    }
}
