use std::io::Read;

use crate::error::Result;
use crate::kind::TagKind;
use crate::tag::Tag;

/// Handle to one tag inside a [`TagTree`]. Ids are assigned in document order, root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    /// Position among the parent's children.
    slot: usize,
    name: Option<String>,
    index_in_list: Option<usize>,
    kind: TagKind,
    children: Vec<NodeId>,
}

/// A decoded tag tree plus an index of upward links.
///
/// The `Tag` values own their children. Names, parents and list positions are kept in a
/// separate table keyed by [`NodeId`], so walking upward never needs a shared or
/// reference-counted tag.
#[derive(Debug, Clone)]
pub struct TagTree {
    root_name: Option<String>,
    root: Tag,
    nodes: Vec<Node>,
}

fn index_node(
    nodes: &mut Vec<Node>,
    tag: &Tag,
    parent: Option<NodeId>,
    slot: usize,
    name: Option<String>,
    index_in_list: Option<usize>,
) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(Node {
        parent,
        slot,
        name,
        index_in_list,
        kind: tag.kind(),
        children: Vec::new(),
    });
    let children = match tag {
        Tag::Compound(compound) => compound
            .iter()
            .enumerate()
            .map(|(slot, (name, child))| {
                index_node(nodes, child, Some(id), slot, Some(name.to_owned()), None)
            })
            .collect(),
        Tag::List(list) => list
            .iter()
            .enumerate()
            .map(|(i, child)| index_node(nodes, child, Some(id), i, None, Some(i)))
            .collect(),
        _ => Vec::new(),
    };
    nodes[id.0].children = children;
    id
}

impl TagTree {
    pub fn new(root_name: Option<String>, root: Tag) -> Self {
        let mut nodes = Vec::new();
        index_node(&mut nodes, &root, None, 0, root_name.clone(), None);
        TagTree {
            root_name,
            root,
            nodes,
        }
    }

    /// Reads one named root tag and indexes it. An empty root name is stored as `None`.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let (name, root) = Tag::read(reader)?;
        let name = if name.is_empty() { None } else { Some(name) };
        Ok(TagTree::new(name, root))
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> &Tag {
        &self.root
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    pub fn into_root(self) -> (Option<String>, Tag) {
        (self.root_name, self.root)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Tag> {
        let mut slots = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            slots.push(current.slot);
            current = self.node(parent)?;
        }
        let mut tag = &self.root;
        for &slot in slots.iter().rev() {
            tag = tag.child(slot)?;
        }
        Some(tag)
    }

    pub fn kind(&self, id: NodeId) -> Option<TagKind> {
        self.node(id).map(|n| n.kind)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.name.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn index_in_list(&self, id: NodeId) -> Option<usize> {
        self.node(id)?.index_in_list
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Dotted path from the root, e.g. `sections[2].block_states.palette[0].Name`.
    ///
    /// The root itself has the empty path and contributes no separator.
    pub fn path(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let Some(parent) = node.parent else {
            return String::new();
        };
        let mut path = self.path(parent);
        if let Some(index) = node.index_in_list {
            path.push_str(&format!("[{}]", index));
        } else if let Some(name) = &node.name {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(name);
        }
        path
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.ids().find(|&id| self.path(id) == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{Compound, List};
    use std::io::Cursor;

    fn chunk_like() -> Tag {
        let palette = List::from_tags(
            TagKind::Compound,
            vec![
                Tag::Compound([("Name", Tag::from("minecraft:air"))].into_iter().collect()),
                Tag::Compound([("Name", Tag::from("minecraft:stone"))].into_iter().collect()),
            ],
        )
        .unwrap();
        let block_states: Compound = [
            ("palette", Tag::List(palette)),
            ("data", Tag::LongArray(vec![0; 4])),
        ]
        .into_iter()
        .collect();
        let section: Compound = [("Y", Tag::Byte(0)), ("block_states", Tag::Compound(block_states))]
            .into_iter()
            .collect();
        let sections = List::from_tags(TagKind::Compound, vec![Tag::Compound(section)]).unwrap();
        Tag::Compound(
            [("DataVersion", Tag::Int(3465)), ("sections", Tag::List(sections))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_paths() {
        let tree = TagTree::new(None, chunk_like());
        let paths: Vec<String> = tree.ids().map(|id| tree.path(id)).collect();
        assert_eq!(
            paths,
            vec![
                "",
                "DataVersion",
                "sections",
                "sections[0]",
                "sections[0].Y",
                "sections[0].block_states",
                "sections[0].block_states.palette",
                "sections[0].block_states.palette[0]",
                "sections[0].block_states.palette[0].Name",
                "sections[0].block_states.palette[1]",
                "sections[0].block_states.palette[1].Name",
                "sections[0].block_states.data",
            ]
        );
    }

    #[test]
    fn test_parents_are_containers() {
        let tree = TagTree::new(None, chunk_like());
        assert_eq!(tree.parent(tree.root_id()), None);
        for id in tree.ids().skip(1) {
            let parent = tree.parent(id).unwrap();
            assert!(tree.kind(parent).unwrap().is_container());
            assert!(tree.children(parent).contains(&id));
        }
    }

    #[test]
    fn test_lookup_by_path() {
        let tree = TagTree::new(None, chunk_like());
        let id = tree.find("sections[0].block_states.palette[1].Name").unwrap();
        assert_eq!(tree.get(id), Some(&Tag::from("minecraft:stone")));
        assert_eq!(tree.name(id), Some("Name"));
        assert_eq!(tree.index_in_list(id), None);

        let element = tree.parent(id).unwrap();
        assert_eq!(tree.index_in_list(element), Some(1));
        assert_eq!(tree.name(element), None);
        assert_eq!(tree.kind(element), Some(TagKind::Compound));

        assert!(tree.find("sections[3]").is_none());
    }

    #[test]
    fn test_decode_named_root() {
        let mut buffer = Vec::new();
        chunk_like().write(&mut buffer, "Level").unwrap();

        let tree = TagTree::decode(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(tree.root_name(), Some("Level"));
        assert_eq!(tree.len(), 12);
        // The root name does not prefix member paths.
        assert_eq!(tree.path(NodeId(1)), "DataVersion");
        assert_eq!(tree.into_root().1, chunk_like());
    }

    #[test]
    fn test_unknown_id() {
        let tree = TagTree::new(None, Tag::Int(1));
        assert!(tree.get(NodeId(5)).is_none());
        assert!(tree.children(NodeId(5)).is_empty());
        assert_eq!(tree.path(NodeId(5)), "");
    }
}
