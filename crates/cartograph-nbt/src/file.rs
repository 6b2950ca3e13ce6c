use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::codec::write_name;
use crate::error::{NbtError, Result};
use crate::kind::TagKind;
use crate::tag::{Compound, Tag};
use crate::tree::TagTree;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A single-file NBT document such as `level.dat`: one named root compound.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtFile {
    pub name: String,
    pub root: Compound,
}

impl NbtFile {
    pub fn new(name: String, root: Compound) -> Self {
        NbtFile { name, root }
    }

    /// Reads a document from raw file bytes.
    ///
    /// Gzip framing is the norm; zlib and uncompressed documents are accepted as well.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            Self::read_uncompressed(&mut GzDecoder::new(bytes))
        } else if bytes.first() == Some(&0x78) {
            Self::read_uncompressed(&mut ZlibDecoder::new(bytes))
        } else {
            Self::read_uncompressed(&mut Cursor::new(bytes))
        }
    }

    /// Reads the root type byte, the root name and the compound payload.
    pub fn read_uncompressed<R: Read>(reader: &mut R) -> Result<Self> {
        let (name, root) = Tag::read(reader)?;
        match root {
            Tag::Compound(root) => Ok(NbtFile { name, root }),
            other => Err(NbtError::RootNotCompound(other.kind())),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(&fs::read(path)?)
    }

    /// Encoded size of the uncompressed document, root prefix included.
    pub fn size_in_bytes(&self) -> usize {
        1 + 2 + self.name.len() + self.root.size_in_bytes()
    }

    /// Encodes the document into a buffer of exactly `size_in_bytes()` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.size_in_bytes());
        buffer.push(TagKind::Compound.id());
        write_name(&mut buffer, &self.name)?;
        self.root.write_payload(&mut buffer)?;
        debug_assert_eq!(buffer.len(), self.size_in_bytes());
        Ok(buffer)
    }

    /// Writes the gzip-compressed document.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let buffer = self.to_bytes()?;
        let mut encoder = GzEncoder::new(writer, Compression::default());
        encoder.write_all(&buffer)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = fs::File::create(path)?;
        self.write(&mut file)?;
        file.flush()?;
        Ok(())
    }

    pub fn into_tree(self) -> TagTree {
        let name = if self.name.is_empty() { None } else { Some(self.name) };
        TagTree::new(name, Tag::Compound(self.root))
    }
}
