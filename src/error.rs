use std::error::Error;
use std::fmt;

use cartograph_nbt::NbtError;
use cartograph_world::WorldError;

pub type Result<T> = std::result::Result<T, CartographError>;

#[derive(Debug)]
pub enum CartographError {
    IoError(std::io::Error),
    Nbt(NbtError),
    World(WorldError),
    ConfigError(String),
    /// A blocking region task panicked or was cancelled.
    TaskError(String),
}

impl fmt::Display for CartographError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartographError::IoError(err) => write!(f, "IO error: {}", err),
            CartographError::Nbt(err) => write!(f, "NBT error: {}", err),
            CartographError::World(err) => write!(f, "World error: {}", err),
            CartographError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            CartographError::TaskError(msg) => write!(f, "Task error: {}", msg),
        }
    }
}

impl Error for CartographError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CartographError::IoError(err) => Some(err),
            CartographError::Nbt(err) => Some(err),
            CartographError::World(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CartographError {
    fn from(err: std::io::Error) -> Self {
        CartographError::IoError(err)
    }
}

impl From<NbtError> for CartographError {
    fn from(err: NbtError) -> Self {
        CartographError::Nbt(err)
    }
}

impl From<WorldError> for CartographError {
    fn from(err: WorldError) -> Self {
        CartographError::World(err)
    }
}

impl From<serde_json::Error> for CartographError {
    fn from(err: serde_json::Error) -> Self {
        CartographError::ConfigError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CartographError {
    fn from(err: tokio::task::JoinError) -> Self {
        CartographError::TaskError(err.to_string())
    }
}
