use crate::ParseError;
use std::fmt::{Display, Formatter};

/// The dispatch category of a JVM type descriptor.
///
/// The tag of a descriptor is determined by its first character alone.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum Tag {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
    Array,
    Object,
}
impl Tag {
    /// Every tag, in descriptor-character order `ZBCSIJFDV[L`.
    pub const ALL: [Tag; 11] = [
        Tag::Boolean,
        Tag::Byte,
        Tag::Char,
        Tag::Short,
        Tag::Int,
        Tag::Long,
        Tag::Float,
        Tag::Double,
        Tag::Void,
        Tag::Array,
        Tag::Object,
    ];

    /// Returns the tag for a descriptor's leading character.
    pub fn from_char(ch: char) -> Option<Tag> {
        Some(match ch {
            'Z' => Tag::Boolean,
            'B' => Tag::Byte,
            'C' => Tag::Char,
            'S' => Tag::Short,
            'I' => Tag::Int,
            'J' => Tag::Long,
            'F' => Tag::Float,
            'D' => Tag::Double,
            'V' => Tag::Void,
            '[' => Tag::Array,
            'L' => Tag::Object,
            _ => return None,
        })
    }

    /// Returns the tag of a type descriptor, looking only at its first character.
    pub fn of(descriptor: &str) -> Option<Tag> {
        descriptor.chars().next().and_then(Tag::from_char)
    }

    /// Returns the leading descriptor character of this tag.
    pub fn as_char(self) -> char {
        match self {
            Tag::Boolean => 'Z',
            Tag::Byte => 'B',
            Tag::Char => 'C',
            Tag::Short => 'S',
            Tag::Int => 'I',
            Tag::Long => 'J',
            Tag::Float => 'F',
            Tag::Double => 'D',
            Tag::Void => 'V',
            Tag::Array => '[',
            Tag::Object => 'L',
        }
    }

    /// Returns whether this is one of the eight primitive tags.
    pub fn is_primitive(self) -> bool {
        !matches!(self, Tag::Void | Tag::Array | Tag::Object)
    }
}
impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tag::Boolean => "boolean",
            Tag::Byte => "byte",
            Tag::Char => "char",
            Tag::Short => "short",
            Tag::Int => "int",
            Tag::Long => "long",
            Tag::Float => "float",
            Tag::Double => "double",
            Tag::Void => "void",
            Tag::Array => "array",
            Tag::Object => "object",
        };
        f.write_str(name)
    }
}

/// Splits a type descriptor into its tag and the remainder the tag refers to.
///
/// For arrays the remainder is the element descriptor (one level down), for objects it is the
/// class name between `L` and `;`, and for primitives and void it is empty. Only the leading
/// token is validated; use [`Type::parse_jni`](crate::Type::parse_jni) to validate a whole
/// descriptor.
pub fn parse_tag(descriptor: &str) -> Result<(Tag, &str), ParseError> {
    let tag = match Tag::of(descriptor) {
        Some(tag) => tag,
        None => return Err(ParseError::custom(descriptor, "unknown descriptor tag", 0)),
    };
    match tag {
        Tag::Array if descriptor.len() > 1 => Ok((tag, &descriptor[1..])),
        Tag::Array => Err(ParseError::custom(descriptor, "array has no element type", 1)),
        Tag::Object => match descriptor.find(';') {
            Some(end) if end > 1 && end + 1 == descriptor.len() => Ok((tag, &descriptor[1..end])),
            _ => Err(ParseError::custom(descriptor, "unterminated class name", descriptor.len())),
        },
        _ if descriptor.len() == 1 => Ok((tag, "")),
        _ => Err(ParseError::custom(descriptor, "trailing characters after primitive", 1)),
    }
}
