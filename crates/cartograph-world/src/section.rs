use crate::error::Result;
use crate::palette::{self, PackingPolicy};

pub const NAMESPACE: &str = "minecraft:";

/// Drops a leading `minecraft:` so vanilla ids compare by bare name.
pub fn strip_namespace(name: &str) -> &str {
    name.strip_prefix(NAMESPACE).unwrap_or(name)
}

pub fn is_air(name: &str) -> bool {
    strip_namespace(name) == "air"
}

pub fn is_water(name: &str) -> bool {
    strip_namespace(name) == "water"
}

/// One 16x16x16 section: its vertical index, block-state names and packed indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubChunk {
    pub y: i32,
    pub palette: Vec<String>,
    pub data: Vec<i64>,
}

impl SubChunk {
    pub fn new(y: i32, palette: Vec<String>, data: Vec<i64>) -> Self {
        SubChunk { y, palette, data }
    }

    /// True when the palette holds nothing but air.
    pub fn is_air_only(&self) -> bool {
        self.palette.len() == 1 && is_air(&self.palette[0])
    }

    /// Palette indices in storage order (`y * 256 + z * 16 + x`).
    pub fn indices(&self, policy: PackingPolicy) -> Result<Vec<u16>> {
        palette::unpack(&self.data, self.palette.len(), policy)
    }

    /// Palette indices reversed so that position 0 is the top of the section.
    pub fn top_down_indices(&self, policy: PackingPolicy) -> Result<Vec<u16>> {
        let mut indices = self.indices(policy)?;
        indices.reverse();
        Ok(indices)
    }

    pub fn block_name(&self, index: u16) -> Option<&str> {
        self.palette.get(index as usize).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{pack, BLOCKS_PER_SECTION};

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_namespace_handling() {
        assert!(is_air("minecraft:air"));
        assert!(is_air("air"));
        assert!(!is_air("minecraft:cave_air"));
        assert!(is_water("minecraft:water"));
        assert!(!is_water("mymod:water_lily"));
        assert_eq!(strip_namespace("mymod:stone"), "mymod:stone");
    }

    #[test]
    fn test_is_air_only() {
        assert!(SubChunk::new(0, names(&["minecraft:air"]), vec![]).is_air_only());
        assert!(!SubChunk::new(0, names(&["minecraft:stone"]), vec![]).is_air_only());
        assert!(!SubChunk::new(0, names(&["minecraft:air", "minecraft:stone"]), vec![0; 256])
            .is_air_only());
    }

    #[test]
    fn test_top_down_indices_reverse_storage_order() {
        let mut storage = vec![0u16; BLOCKS_PER_SECTION];
        storage[0] = 1; // bottom corner
        storage[4095] = 2; // top corner
        let data = pack(&storage, 3, PackingPolicy::Padded).unwrap();
        let sub = SubChunk::new(
            1,
            names(&["minecraft:air", "minecraft:stone", "minecraft:dirt"]),
            data,
        );

        let top_down = sub.top_down_indices(PackingPolicy::Padded).unwrap();
        assert_eq!(top_down[0], 2);
        assert_eq!(top_down[4095], 1);
        assert_eq!(sub.block_name(top_down[0]), Some("minecraft:dirt"));
        assert_eq!(sub.block_name(7), None);
    }

    #[test]
    fn test_single_entry_palette_without_data() {
        let sub = SubChunk::new(-4, names(&["minecraft:stone"]), vec![]);
        let indices = sub.top_down_indices(PackingPolicy::Spanning).unwrap();
        assert_eq!(indices.len(), BLOCKS_PER_SECTION);
        assert!(indices.iter().all(|&i| i == 0));
    }
}
