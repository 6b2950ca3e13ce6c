//! Reading, writing and navigating NBT, the typed binary tag format used by world saves.

pub mod codec;
pub mod error;
pub mod file;
pub mod kind;
pub mod tag;
pub mod tree;

pub use error::{NbtError, Result};
pub use file::NbtFile;
pub use kind::TagKind;
pub use tag::{Compound, List, Tag};
pub use tree::{NodeId, TagTree};
