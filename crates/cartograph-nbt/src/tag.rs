use std::fmt::{self, Write as _};

use crate::error::{NbtError, Result};
use crate::kind::TagKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::End => TagKind::End,
            Tag::Byte(_) => TagKind::Byte,
            Tag::Short(_) => TagKind::Short,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::Double(_) => TagKind::Double,
            Tag::ByteArray(_) => TagKind::ByteArray,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
            Tag::IntArray(_) => TagKind::IntArray,
            Tag::LongArray(_) => TagKind::LongArray,
        }
    }

    fn unexpected(&self, expected: TagKind) -> NbtError {
        NbtError::UnexpectedType {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_compound(&self) -> Result<&Compound> {
        match self {
            Tag::Compound(compound) => Ok(compound),
            _ => Err(self.unexpected(TagKind::Compound)),
        }
    }

    pub fn as_compound_mut(&mut self) -> Result<&mut Compound> {
        match self {
            Tag::Compound(compound) => Ok(compound),
            other => Err(other.unexpected(TagKind::Compound)),
        }
    }

    pub fn into_compound(self) -> Result<Compound> {
        match self {
            Tag::Compound(compound) => Ok(compound),
            other => Err(other.unexpected(TagKind::Compound)),
        }
    }

    pub fn as_list(&self) -> Result<&List> {
        match self {
            Tag::List(list) => Ok(list),
            _ => Err(self.unexpected(TagKind::List)),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut List> {
        match self {
            Tag::List(list) => Ok(list),
            other => Err(other.unexpected(TagKind::List)),
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            Tag::String(s) => Ok(s),
            _ => Err(self.unexpected(TagKind::String)),
        }
    }

    pub fn as_i8(&self) -> Result<i8> {
        match self {
            Tag::Byte(n) => Ok(*n),
            _ => Err(self.unexpected(TagKind::Byte)),
        }
    }

    pub fn as_i16(&self) -> Result<i16> {
        match self {
            Tag::Short(n) => Ok(*n),
            _ => Err(self.unexpected(TagKind::Short)),
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self {
            Tag::Int(n) => Ok(*n),
            _ => Err(self.unexpected(TagKind::Int)),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Tag::Long(n) => Ok(*n),
            _ => Err(self.unexpected(TagKind::Long)),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self {
            Tag::Float(n) => Ok(*n),
            _ => Err(self.unexpected(TagKind::Float)),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Tag::Double(n) => Ok(*n),
            _ => Err(self.unexpected(TagKind::Double)),
        }
    }

    pub fn as_byte_array(&self) -> Result<&[i8]> {
        match self {
            Tag::ByteArray(v) => Ok(v),
            _ => Err(self.unexpected(TagKind::ByteArray)),
        }
    }

    pub fn as_int_array(&self) -> Result<&[i32]> {
        match self {
            Tag::IntArray(v) => Ok(v),
            _ => Err(self.unexpected(TagKind::IntArray)),
        }
    }

    pub fn as_long_array(&self) -> Result<&[i64]> {
        match self {
            Tag::LongArray(v) => Ok(v),
            _ => Err(self.unexpected(TagKind::LongArray)),
        }
    }

    /// Child tag at `slot` for compounds (in insertion order) and lists.
    pub fn child(&self, slot: usize) -> Option<&Tag> {
        match self {
            Tag::Compound(compound) => compound.entry_at(slot).map(|(_, tag)| tag),
            Tag::List(list) => list.get(slot),
            _ => None,
        }
    }
}

macro_rules! tag_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Tag {
                fn from(value: $ty) -> Self {
                    Tag::$variant(value)
                }
            }
        )*
    };
}

tag_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<i8> => ByteArray,
    String => String,
    List => List,
    Compound => Compound,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_owned())
    }
}

/// Named children of a compound tag, kept in the order they were read or inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
}

impl Compound {
    pub fn new() -> Self {
        Compound::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, tag)| tag)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, tag)| tag)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts a child, replacing an existing child of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        let name = name.into();
        let tag = tag.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, tag)),
            None => {
                self.entries.push((name, tag));
                None
            }
        }
    }

    /// Appends without looking for an existing child; decoded documents keep every entry as read.
    pub(crate) fn push_entry(&mut self, name: String, tag: Tag) {
        self.entries.push((name, tag));
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn entry_at(&self, slot: usize) -> Option<(&str, &Tag)> {
        self.entries.get(slot).map(|(n, tag)| (n.as_str(), tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(n, tag)| (n.as_str(), tag))
    }

    pub fn field(&self, name: &str) -> Result<&Tag> {
        self.get(name)
            .ok_or_else(|| NbtError::MissingField(name.to_owned()))
    }

    pub fn get_byte(&self, name: &str) -> Result<i8> {
        self.field(name)?.as_i8()
    }

    pub fn get_short(&self, name: &str) -> Result<i16> {
        self.field(name)?.as_i16()
    }

    pub fn get_int(&self, name: &str) -> Result<i32> {
        self.field(name)?.as_i32()
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        self.field(name)?.as_i64()
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        self.field(name)?.as_string()
    }

    pub fn get_list(&self, name: &str) -> Result<&List> {
        self.field(name)?.as_list()
    }

    pub fn get_compound(&self, name: &str) -> Result<&Compound> {
        self.field(name)?.as_compound()
    }

    pub fn get_int_array(&self, name: &str) -> Result<&[i32]> {
        self.field(name)?.as_int_array()
    }

    pub fn get_long_array(&self, name: &str) -> Result<&[i64]> {
        self.field(name)?.as_long_array()
    }
}

impl<N: Into<String>, T: Into<Tag>> FromIterator<(N, T)> for Compound {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut compound = Compound::new();
        for (name, tag) in iter {
            compound.insert(name, tag);
        }
        compound
    }
}

impl IntoIterator for Compound {
    type Item = (String, Tag);
    type IntoIter = std::vec::IntoIter<(String, Tag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Unnamed children sharing one declared element type.
///
/// The element type is fixed at construction and survives an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    element: TagKind,
    items: Vec<Tag>,
}

impl Default for List {
    fn default() -> Self {
        List::new(TagKind::End)
    }
}

impl List {
    pub fn new(element: TagKind) -> Self {
        List {
            element,
            items: Vec::new(),
        }
    }

    pub fn from_tags(element: TagKind, tags: Vec<Tag>) -> Result<Self> {
        let mut list = List {
            element,
            items: Vec::with_capacity(tags.len()),
        };
        for tag in tags {
            list.push(tag)?;
        }
        Ok(list)
    }

    pub(crate) fn with_capacity(element: TagKind, capacity: usize) -> Self {
        List {
            element,
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn element_kind(&self) -> TagKind {
        self.element
    }

    /// Appends `tag`, failing if its kind is not the declared element kind.
    pub fn push(&mut self, tag: Tag) -> Result<()> {
        if self.element == TagKind::End {
            return Err(NbtError::EndListWithElements(self.items.len() as i32 + 1));
        }
        if tag.kind() != self.element {
            return Err(NbtError::TypeMismatch {
                expected: self.element,
                found: tag.kind(),
            });
        }
        self.items.push(tag);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let bare = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'));
    if bare {
        f.write_str(name)
    } else {
        write_quoted(f, name)
    }
}

fn write_array<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    suffix: &str,
    values: &[T],
) -> fmt::Result {
    write!(f, "[{};", prefix)?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{}{}", v, suffix)?;
    }
    f.write_char(']')
}

/// Renders the tag as SNBT.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::End => Ok(()),
            Tag::Byte(v) => write!(f, "{}b", v),
            Tag::Short(v) => write!(f, "{}s", v),
            Tag::Int(v) => write!(f, "{}", v),
            Tag::Long(v) => write!(f, "{}L", v),
            Tag::Float(v) => write!(f, "{}f", v),
            Tag::Double(v) => write!(f, "{}d", v),
            Tag::ByteArray(v) => write_array(f, "B", "b", v),
            Tag::String(v) => write_quoted(f, v),
            Tag::List(list) => {
                f.write_char('[')?;
                for (i, tag) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}", tag)?;
                }
                f.write_char(']')
            }
            Tag::Compound(compound) => {
                f.write_char('{')?;
                for (i, (name, tag)) in compound.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_name(f, name)?;
                    write!(f, ":{}", tag)?;
                }
                f.write_char('}')
            }
            Tag::IntArray(v) => write_array(f, "I", "", v),
            Tag::LongArray(v) => write_array(f, "L", "L", v),
        }
    }
}
