//! Anvil region files (`r.<x>.<z>.mca`).
//!
//! The first 4096 bytes hold 1024 big-endian location words (3-byte sector offset,
//! 1-byte sector count), the next 4096 bytes hold 1024 big-endian timestamps.
//! Chunk payloads follow, aligned to 4096-byte sectors.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use cartograph_nbt::Compound;

use crate::chunk::{decode_chunk, encode_chunk, Compression};
use crate::error::{Result, WorldError};
use crate::location::{ChunkLocation, RegionPosition};

pub const SECTOR_SIZE: usize = 4096;
pub const DIRECTORY_ENTRIES: usize = 1024;
pub const HEADER_SIZE: usize = 2 * SECTOR_SIZE;
pub const MAX_CHUNK_SECTORS: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Offset in sectors from the start of the file.
    pub offset: u32,
    pub sectors: u8,
    /// Last modification, seconds since the Unix epoch.
    pub timestamp: u32,
}

impl DirectoryEntry {
    /// Offset and count both zero mean the chunk was never generated.
    pub fn is_empty(&self) -> bool {
        self.offset == 0 && self.sectors == 0
    }

    pub fn byte_offset(&self) -> usize {
        self.offset as usize * SECTOR_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct RegionFile {
    position: RegionPosition,
    data: Bytes,
    entries: Vec<DirectoryEntry>,
}

impl RegionFile {
    /// Parses the header; payloads are decoded lazily per chunk.
    pub fn parse(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.len() < HEADER_SIZE {
            return Err(WorldError::InvalidRegion(format!(
                "file is {} bytes, header needs {}",
                data.len(),
                HEADER_SIZE
            )));
        }

        let entries = (0..DIRECTORY_ENTRIES)
            .map(|slot| {
                let location = BigEndian::read_u32(&data[slot * 4..slot * 4 + 4]);
                let stamp_at = SECTOR_SIZE + slot * 4;
                DirectoryEntry {
                    offset: location >> 8,
                    sectors: (location & 0xFF) as u8,
                    timestamp: BigEndian::read_u32(&data[stamp_at..stamp_at + 4]),
                }
            })
            .collect();

        Ok(RegionFile {
            position: RegionPosition::default(),
            data,
            entries,
        })
    }

    /// Reads a region file, taking its position from an `r.<x>.<z>.mca` name when present.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let region = Self::parse(fs::read(path)?)?;
        let position = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(RegionPosition::parse_file_name)
            .unwrap_or_default();
        Ok(region.with_position(position))
    }

    pub fn with_position(mut self, position: RegionPosition) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> RegionPosition {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(DirectoryEntry::is_empty)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn entry(&self, location: ChunkLocation) -> &DirectoryEntry {
        &self.entries[location.slot_index()]
    }

    pub fn timestamp(&self, location: ChunkLocation) -> u32 {
        self.entry(location).timestamp
    }

    /// World locations of every chunk with a non-empty directory entry, in slot order.
    pub fn present_locations(&self) -> impl Iterator<Item = ChunkLocation> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_empty())
            .map(move |(slot, _)| self.position.chunk_at_slot(slot))
    }

    /// Raw framed payload (length, compression byte, body) for `location`.
    pub fn chunk_payload(&self, location: ChunkLocation) -> Result<Option<Bytes>> {
        let entry = *self.entry(location);
        if entry.is_empty() {
            return Ok(None);
        }
        if entry.offset < 2 || entry.sectors == 0 {
            return Err(WorldError::InvalidRegion(format!(
                "chunk {} has directory entry offset {} count {}",
                location, entry.offset, entry.sectors
            )));
        }

        let start = entry.byte_offset();
        if start + 4 > self.data.len() {
            return Err(WorldError::InvalidRegion(format!(
                "chunk {} starts at byte {} past the end of the file ({} bytes)",
                location,
                start,
                self.data.len()
            )));
        }

        let length = BigEndian::read_u32(&self.data[start..start + 4]) as usize;
        let available = self.data.len() - start - 4;
        if length > available {
            return Err(WorldError::TruncatedPayload {
                expected: length,
                found: available,
            });
        }
        Ok(Some(self.data.slice(start..start + 4 + length)))
    }

    /// Decodes the chunk root compound, or `None` if the slot is empty.
    pub fn read_chunk(&self, location: ChunkLocation) -> Result<Option<Compound>> {
        match self.chunk_payload(location)? {
            Some(payload) => decode_chunk(&payload).map(Some),
            None => Ok(None),
        }
    }
}

/// Builds a region file from framed chunk payloads.
#[derive(Debug, Default)]
pub struct RegionWriter {
    chunks: BTreeMap<usize, (Vec<u8>, u32)>,
}

impl RegionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Stores an already framed payload, replacing whatever the slot held.
    pub fn insert_payload(
        &mut self,
        location: ChunkLocation,
        payload: Vec<u8>,
        timestamp: u32,
    ) -> Result<()> {
        let sectors = payload.len().div_ceil(SECTOR_SIZE);
        if sectors == 0 || sectors > MAX_CHUNK_SECTORS {
            return Err(WorldError::InvalidRegion(format!(
                "chunk {} needs {} sectors",
                location, sectors
            )));
        }
        self.chunks
            .insert(location.slot_index(), (payload, timestamp));
        Ok(())
    }

    pub fn insert_chunk(
        &mut self,
        location: ChunkLocation,
        root: &Compound,
        compression: Compression,
        timestamp: u32,
    ) -> Result<()> {
        let payload = encode_chunk(root, compression)?;
        self.insert_payload(location, payload, timestamp)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body: usize = self
            .chunks
            .values()
            .map(|(payload, _)| payload.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE)
            .sum();
        let mut out = vec![0u8; HEADER_SIZE + body];

        let mut next_sector = HEADER_SIZE / SECTOR_SIZE;
        for (&slot, (payload, timestamp)) in &self.chunks {
            let sectors = payload.len().div_ceil(SECTOR_SIZE);
            let location = ((next_sector as u32) << 8) | sectors as u32;
            BigEndian::write_u32(&mut out[slot * 4..slot * 4 + 4], location);
            let stamp_at = SECTOR_SIZE + slot * 4;
            BigEndian::write_u32(&mut out[stamp_at..stamp_at + 4], *timestamp);

            let start = next_sector * SECTOR_SIZE;
            out[start..start + payload.len()].copy_from_slice(payload);
            next_sector += sectors;
        }
        out
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = fs::File::create(path)?;
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use cartograph_nbt::Tag;

    fn sample_chunk(x: i32, z: i32) -> Compound {
        [
            ("DataVersion", Tag::Int(3465)),
            ("xPos", Tag::Int(x)),
            ("zPos", Tag::Int(z)),
            ("Status", Tag::from("minecraft:full")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_short_header() {
        assert_matches!(
            RegionFile::parse(vec![0u8; HEADER_SIZE - 1]),
            Err(WorldError::InvalidRegion(_))
        );
    }

    #[test]
    fn test_empty_region() {
        let region = RegionFile::parse(vec![0u8; HEADER_SIZE]).unwrap();
        assert!(region.is_empty());
        assert_eq!(region.present_locations().count(), 0);
        assert_matches!(region.read_chunk(ChunkLocation::new(3, 4)), Ok(None));
    }

    #[test]
    fn test_write_then_read_chunks() {
        let mut writer = RegionWriter::new();
        writer
            .insert_chunk(
                ChunkLocation::new(0, 0),
                &sample_chunk(0, 0),
                Compression::Zlib,
                1_700_000_000,
            )
            .unwrap();
        writer
            .insert_chunk(
                ChunkLocation::new(5, 31),
                &sample_chunk(5, 31),
                Compression::Gzip,
                42,
            )
            .unwrap();
        let bytes = writer.to_bytes();
        assert_eq!(bytes.len() % SECTOR_SIZE, 0);

        let region = RegionFile::parse(bytes).unwrap();
        let present: Vec<_> = region.present_locations().collect();
        assert_eq!(
            present,
            vec![ChunkLocation::new(0, 0), ChunkLocation::new(5, 31)]
        );
        assert_eq!(region.timestamp(ChunkLocation::new(0, 0)), 1_700_000_000);
        assert_eq!(region.timestamp(ChunkLocation::new(5, 31)), 42);
        assert_eq!(region.entry(ChunkLocation::new(0, 0)).offset, 2);

        let root = region.read_chunk(ChunkLocation::new(5, 31)).unwrap().unwrap();
        assert_eq!(root, sample_chunk(5, 31));
        assert_matches!(region.read_chunk(ChunkLocation::new(1, 0)), Ok(None));
    }

    #[test]
    fn test_populated_slot_returns_exact_payload() {
        let location = ChunkLocation::new(7, 9);
        let payload = encode_chunk(&sample_chunk(7, 9), Compression::Zlib).unwrap();
        let mut writer = RegionWriter::new();
        writer.insert_payload(location, payload.clone(), 5).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RegionPosition::new(0, 0).file_name());
        writer.save(&path).unwrap();
        let region = RegionFile::open(&path).unwrap();

        let stored = region.chunk_payload(location).unwrap().unwrap();
        assert_eq!(&stored[..], &payload[..]);
        assert_eq!(stored.len(), 4 + BigEndian::read_u32(&payload[..4]) as usize);
        assert_eq!(stored[4], Compression::Zlib.id());
        assert_eq!(region.entry(location).sectors, 1);
        assert_eq!(region.timestamp(location), 5);
    }

    #[test]
    fn test_present_locations_use_region_position() {
        let mut writer = RegionWriter::new();
        writer
            .insert_chunk(
                ChunkLocation::new(-1, -32),
                &sample_chunk(-1, -32),
                Compression::Uncompressed,
                0,
            )
            .unwrap();
        let region = RegionFile::parse(writer.to_bytes())
            .unwrap()
            .with_position(RegionPosition::new(-1, -1));
        assert_eq!(
            region.present_locations().collect::<Vec<_>>(),
            vec![ChunkLocation::new(-1, -32)]
        );
    }

    #[test]
    fn test_entry_pointing_into_header() {
        let mut bytes = vec![0u8; HEADER_SIZE + SECTOR_SIZE];
        BigEndian::write_u32(&mut bytes[0..4], (1 << 8) | 1);
        let region = RegionFile::parse(bytes).unwrap();
        assert_matches!(
            region.chunk_payload(ChunkLocation::new(0, 0)),
            Err(WorldError::InvalidRegion(_))
        );
    }

    #[test]
    fn test_entry_past_end_of_file() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        BigEndian::write_u32(&mut bytes[0..4], (9 << 8) | 1);
        let region = RegionFile::parse(bytes).unwrap();
        assert_matches!(
            region.chunk_payload(ChunkLocation::new(0, 0)),
            Err(WorldError::InvalidRegion(_))
        );
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = vec![0u8; HEADER_SIZE + SECTOR_SIZE];
        BigEndian::write_u32(&mut bytes[0..4], (2 << 8) | 1);
        BigEndian::write_u32(&mut bytes[HEADER_SIZE..HEADER_SIZE + 4], 10_000);
        let region = RegionFile::parse(bytes).unwrap();
        assert_matches!(
            region.chunk_payload(ChunkLocation::new(0, 0)),
            Err(WorldError::TruncatedPayload {
                expected: 10_000,
                found: 4092
            })
        );
    }

    #[test]
    fn test_bad_chunk_does_not_poison_others() {
        let mut writer = RegionWriter::new();
        writer
            .insert_chunk(
                ChunkLocation::new(1, 0),
                &sample_chunk(1, 0),
                Compression::Zlib,
                0,
            )
            .unwrap();
        writer
            .insert_payload(ChunkLocation::new(2, 0), vec![0, 0, 0, 2, 9, 0], 0)
            .unwrap();
        let region = RegionFile::parse(writer.to_bytes()).unwrap();

        assert_matches!(
            region.read_chunk(ChunkLocation::new(2, 0)),
            Err(WorldError::UnsupportedCompression(9))
        );
        assert_matches!(region.read_chunk(ChunkLocation::new(1, 0)), Ok(Some(_)));
    }
}
