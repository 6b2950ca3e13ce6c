use std::error::Error;
use std::fmt;
use std::io;

use crate::kind::TagKind;

pub type Result<T> = std::result::Result<T, NbtError>;

#[derive(Debug)]
pub enum NbtError {
    /// The underlying reader or writer failed for a reason other than running out of data.
    Io(io::Error),
    /// The input ended before the current tag was complete.
    Truncated,
    UnknownTagType(u8),
    InvalidString(std::string::FromUtf8Error),
    NegativeLength(i32),
    /// A list declared its element type as `End` but claimed to hold elements.
    EndListWithElements(i32),
    DepthLimit(usize),
    StringTooLong(usize),
    /// The root of a document was not a compound tag.
    RootNotCompound(TagKind),
    /// A tag was added to a list whose declared element type differs.
    TypeMismatch { expected: TagKind, found: TagKind },
    /// Typed access asked for one variant but the tag holds another.
    UnexpectedType { expected: TagKind, found: TagKind },
    MissingField(String),
}

impl fmt::Display for NbtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtError::Io(err) => write!(f, "IO error: {}", err),
            NbtError::Truncated => write!(f, "Unexpected end of NBT data"),
            NbtError::UnknownTagType(id) => write!(f, "Invalid tag type: {}", id),
            NbtError::InvalidString(err) => write!(f, "Invalid UTF-8 in string: {}", err),
            NbtError::NegativeLength(len) => write!(f, "Negative length: {}", len),
            NbtError::EndListWithElements(len) => {
                write!(f, "List of TAG_End cannot hold {} elements", len)
            }
            NbtError::DepthLimit(depth) => write!(f, "Nesting deeper than {} levels", depth),
            NbtError::StringTooLong(len) => {
                write!(f, "String of {} bytes does not fit a u16 length", len)
            }
            NbtError::RootNotCompound(kind) => write!(f, "Root tag is {}, expected TAG_Compound", kind),
            NbtError::TypeMismatch { expected, found } => {
                write!(f, "List holds {} but got {}", expected, found)
            }
            NbtError::UnexpectedType { expected, found } => {
                write!(f, "Expected {} but found {}", expected, found)
            }
            NbtError::MissingField(name) => write!(f, "Missing field: {}", name),
        }
    }
}

impl Error for NbtError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NbtError::Io(err) => Some(err),
            NbtError::InvalidString(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for NbtError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            NbtError::Truncated
        } else {
            NbtError::Io(err)
        }
    }
}

impl From<std::string::FromUtf8Error> for NbtError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        NbtError::InvalidString(err)
    }
}

impl NbtError {
    /// Decode errors leave the stream unusable; typed-access errors do not.
    pub fn is_decode_error(&self) -> bool {
        !matches!(
            self,
            NbtError::TypeMismatch { .. } | NbtError::UnexpectedType { .. } | NbtError::MissingField(_)
        )
    }
}
