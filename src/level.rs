use std::path::Path;

use cartograph_nbt::NbtFile;
use serde::Serialize;

use crate::error::Result;

/// The few `level.dat` fields shown alongside a world's surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub name: String,
    pub data_version: Option<i32>,
    pub version_name: Option<String>,
}

impl LevelInfo {
    pub fn from_nbt(file: &NbtFile) -> Result<Self> {
        let data = file.root.get_compound("Data")?;
        let data_version = match data.get("DataVersion") {
            Some(tag) => Some(tag.as_i32()?),
            None => None,
        };
        let version_name = match data.get("Version") {
            Some(version) => Some(version.as_compound()?.get_string("Name")?.to_string()),
            None => None,
        };
        Ok(LevelInfo {
            name: data.get_string("LevelName")?.to_string(),
            data_version,
            version_name,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_nbt(&NbtFile::open(path)?)
    }
}
