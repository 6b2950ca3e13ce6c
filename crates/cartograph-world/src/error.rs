use std::error::Error;
use std::fmt;

use cartograph_nbt::NbtError;

pub type Result<T> = std::result::Result<T, WorldError>;

#[derive(Debug)]
pub enum WorldError {
    IoError(std::io::Error),
    Nbt(NbtError),
    /// The region header or a directory entry is malformed.
    InvalidRegion(String),
    UnsupportedCompression(u8),
    /// The chunk lives in a separate `c.<x>.<z>.mcc` file.
    ExternalChunk,
    TruncatedPayload { expected: usize, found: usize },
    PackedDataTooShort { expected: usize, found: usize },
    PaletteIndexOutOfRange { index: usize, palette_size: usize },
    InvalidPaletteSize(usize),
    /// The chunk uses a block storage layout that has no palette (before 1.13).
    UnsupportedLayout(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::IoError(err) => write!(f, "IO error: {}", err),
            WorldError::Nbt(err) => write!(f, "NBT error: {}", err),
            WorldError::InvalidRegion(msg) => write!(f, "Invalid region file: {}", msg),
            WorldError::UnsupportedCompression(id) => {
                write!(f, "Unsupported chunk compression scheme: {}", id)
            }
            WorldError::ExternalChunk => write!(f, "Chunk is stored in an external file"),
            WorldError::TruncatedPayload { expected, found } => write!(
                f,
                "Chunk payload truncated: expected {} bytes, found {}",
                expected, found
            ),
            WorldError::PackedDataTooShort { expected, found } => write!(
                f,
                "Packed block data too short: expected {} longs, found {}",
                expected, found
            ),
            WorldError::PaletteIndexOutOfRange {
                index,
                palette_size,
            } => write!(
                f,
                "Palette index {} out of range for palette of {}",
                index, palette_size
            ),
            WorldError::InvalidPaletteSize(size) => {
                write!(f, "Invalid palette size for a 16x16x16 section: {}", size)
            }
            WorldError::UnsupportedLayout(msg) => {
                write!(f, "Unsupported chunk layout: {}", msg)
            }
        }
    }
}

impl Error for WorldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldError::IoError(err) => Some(err),
            WorldError::Nbt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WorldError {
    fn from(err: std::io::Error) -> Self {
        WorldError::IoError(err)
    }
}

impl From<NbtError> for WorldError {
    fn from(err: NbtError) -> Self {
        WorldError::Nbt(err)
    }
}
