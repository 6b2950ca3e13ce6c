//! Binary encoding of tags: big-endian scalars, u16-prefixed strings, i32-counted arrays.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{NbtError, Result};
use crate::kind::TagKind;
use crate::tag::{Compound, List, Tag};

/// Nesting limit for lists and compounds.
pub const MAX_DEPTH: usize = 512;

// Caps up-front allocation so a corrupt count cannot request gigabytes before the
// reader runs dry.
const MAX_PREALLOC: usize = 4096;

fn read_count<R: Read>(reader: &mut R) -> Result<usize> {
    let length = reader.read_i32::<BigEndian>()?;
    if length < 0 {
        return Err(NbtError::NegativeLength(length));
    }
    Ok(length as usize)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let length = reader.read_u16::<BigEndian>()?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    let length = u16::try_from(s.len()).map_err(|_| NbtError::StringTooLong(s.len()))?;
    writer.write_u16::<BigEndian>(length)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

impl Tag {
    /// Reads a full named tag: type byte, name and payload.
    ///
    /// A lone end byte yields `("", Tag::End)`.
    pub fn read<R: Read>(reader: &mut R) -> Result<(String, Tag)> {
        Tag::read_named(reader, 0)
    }

    fn read_named<R: Read>(reader: &mut R, depth: usize) -> Result<(String, Tag)> {
        let kind = TagKind::from_id(reader.read_u8()?)?;
        if kind == TagKind::End {
            return Ok((String::new(), Tag::End));
        }
        let name = read_string(reader)?;
        let tag = Tag::read_payload_at(reader, kind, depth)?;
        Ok((name, tag))
    }

    /// Reads one payload of `kind`. The type byte and any name have already been consumed.
    pub fn read_payload<R: Read>(reader: &mut R, kind: TagKind) -> Result<Tag> {
        Tag::read_payload_at(reader, kind, 0)
    }

    fn read_payload_at<R: Read>(reader: &mut R, kind: TagKind, depth: usize) -> Result<Tag> {
        match kind {
            TagKind::End => Ok(Tag::End),
            TagKind::Byte => Ok(Tag::Byte(reader.read_i8()?)),
            TagKind::Short => Ok(Tag::Short(reader.read_i16::<BigEndian>()?)),
            TagKind::Int => Ok(Tag::Int(reader.read_i32::<BigEndian>()?)),
            TagKind::Long => Ok(Tag::Long(reader.read_i64::<BigEndian>()?)),
            TagKind::Float => Ok(Tag::Float(reader.read_f32::<BigEndian>()?)),
            TagKind::Double => Ok(Tag::Double(reader.read_f64::<BigEndian>()?)),
            TagKind::ByteArray => {
                let length = read_count(reader)?;
                let mut bytes = Vec::with_capacity(length.min(MAX_PREALLOC));
                reader.by_ref().take(length as u64).read_to_end(&mut bytes)?;
                if bytes.len() < length {
                    return Err(NbtError::Truncated);
                }
                Ok(Tag::ByteArray(bytes.into_iter().map(|b| b as i8).collect()))
            }
            TagKind::String => Ok(Tag::String(read_string(reader)?)),
            TagKind::List => {
                if depth >= MAX_DEPTH {
                    return Err(NbtError::DepthLimit(MAX_DEPTH));
                }
                let element = TagKind::from_id(reader.read_u8()?)?;
                let length = read_count(reader)?;
                if element == TagKind::End && length > 0 {
                    return Err(NbtError::EndListWithElements(length as i32));
                }
                let mut list = List::with_capacity(element, length.min(MAX_PREALLOC));
                for _ in 0..length {
                    list.push(Tag::read_payload_at(reader, element, depth + 1)?)?;
                }
                Ok(Tag::List(list))
            }
            TagKind::Compound => {
                if depth >= MAX_DEPTH {
                    return Err(NbtError::DepthLimit(MAX_DEPTH));
                }
                let mut compound = Compound::new();
                loop {
                    let (name, tag) = Tag::read_named(reader, depth + 1)?;
                    if let Tag::End = tag {
                        break;
                    }
                    compound.push_entry(name, tag);
                }
                Ok(Tag::Compound(compound))
            }
            TagKind::IntArray => {
                let length = read_count(reader)?;
                let mut ints = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    ints.push(reader.read_i32::<BigEndian>()?);
                }
                Ok(Tag::IntArray(ints))
            }
            TagKind::LongArray => {
                let length = read_count(reader)?;
                let mut longs = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    longs.push(reader.read_i64::<BigEndian>()?);
                }
                Ok(Tag::LongArray(longs))
            }
        }
    }

    /// Writes a full named tag: type byte, name and payload.
    pub fn write<W: Write>(&self, writer: &mut W, name: &str) -> Result<()> {
        writer.write_u8(self.kind().id())?;

        if !matches!(self, Tag::End) {
            write_string(writer, name)?;
        }

        self.write_payload(writer)
    }

    /// Writes the payload only, in the shape `read_payload` expects.
    pub fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Tag::End => {}
            Tag::Byte(v) => writer.write_i8(*v)?,
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v)?,
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v)?,
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v)?,
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v)?,
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v)?,
            Tag::ByteArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                let bytes: Vec<u8> = v.iter().map(|&b| b as u8).collect();
                writer.write_all(&bytes)?;
            }
            Tag::String(v) => write_string(writer, v)?,
            Tag::List(list) => {
                writer.write_u8(list.element_kind().id())?;
                writer.write_i32::<BigEndian>(list.len() as i32)?;
                for tag in list {
                    tag.write_payload(writer)?;
                }
            }
            Tag::Compound(compound) => compound.write_payload(writer)?,
            Tag::IntArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &i in v {
                    writer.write_i32::<BigEndian>(i)?;
                }
            }
            Tag::LongArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &l in v {
                    writer.write_i64::<BigEndian>(l)?;
                }
            }
        }
        Ok(())
    }

    /// Number of bytes `write_payload` produces for this tag.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Tag::End => 0,
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) | Tag::Float(_) => 4,
            Tag::Long(_) | Tag::Double(_) => 8,
            Tag::ByteArray(v) => 4 + v.len(),
            Tag::String(v) => 2 + v.len(),
            Tag::List(list) => 1 + 4 + list.iter().map(Tag::size_in_bytes).sum::<usize>(),
            Tag::Compound(compound) => compound.size_in_bytes(),
            Tag::IntArray(v) => 4 + 4 * v.len(),
            Tag::LongArray(v) => 4 + 8 * v.len(),
        }
    }

    /// Number of bytes `write` produces for this tag under `name`.
    pub fn named_size_in_bytes(&self, name: &str) -> usize {
        match self {
            Tag::End => 1,
            _ => 1 + 2 + name.len() + self.size_in_bytes(),
        }
    }
}

impl Compound {
    /// Writes every child as a named tag, then the end byte.
    pub fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        for (name, tag) in self.iter() {
            tag.write(writer, name)?;
        }
        writer.write_u8(TagKind::End.id())?;
        Ok(())
    }

    pub fn size_in_bytes(&self) -> usize {
        self.iter()
            .map(|(name, tag)| tag.named_size_in_bytes(name))
            .sum::<usize>()
            + 1
    }
}

pub(crate) fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    write_string(writer, name)
}
