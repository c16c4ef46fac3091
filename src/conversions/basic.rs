use super::*;

/// A Java primitive value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}
impl Primitive {
    /// Returns the descriptor tag of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Primitive::Boolean(_) => Tag::Boolean,
            Primitive::Byte(_) => Tag::Byte,
            Primitive::Char(_) => Tag::Char,
            Primitive::Short(_) => Tag::Short,
            Primitive::Int(_) => Tag::Int,
            Primitive::Long(_) => Tag::Long,
            Primitive::Float(_) => Tag::Float,
            Primitive::Double(_) => Tag::Double,
        }
    }

    /// Returns the type descriptor of this value, e.g. `I` for an `int`.
    pub fn signature(&self) -> &'static str {
        match self {
            Primitive::Boolean(_) => "Z",
            Primitive::Byte(_) => "B",
            Primitive::Char(_) => "C",
            Primitive::Short(_) => "S",
            Primitive::Int(_) => "I",
            Primitive::Long(_) => "J",
            Primitive::Float(_) => "F",
            Primitive::Double(_) => "D",
        }
    }

    /// Returns the native type this value is passed through.
    pub fn jni_type(&self) -> JniType {
        JniType::of_tag(self.tag())
    }

    /// Returns a `jvalue` carrying this value in the slot matching its tag.
    pub fn java_value(&self) -> jvalue {
        match *self {
            Primitive::Boolean(v) => jvalue { z: v as jboolean },
            Primitive::Byte(v) => jvalue { b: v },
            Primitive::Char(v) => jvalue { c: v },
            Primitive::Short(v) => jvalue { s: v },
            Primitive::Int(v) => jvalue { i: v },
            Primitive::Long(v) => jvalue { j: v },
            Primitive::Float(v) => jvalue { f: v },
            Primitive::Double(v) => jvalue { d: v },
        }
    }

    /// Converts a value returned from a native entry point. Returns `None` for references and
    /// void.
    pub(crate) fn from_native(value: NativeValue) -> Option<Primitive> {
        Some(match value {
            NativeValue::Boolean(v) => Primitive::Boolean(v != 0),
            NativeValue::Byte(v) => Primitive::Byte(v),
            NativeValue::Char(v) => Primitive::Char(v),
            NativeValue::Short(v) => Primitive::Short(v),
            NativeValue::Int(v) => Primitive::Int(v),
            NativeValue::Long(v) => Primitive::Long(v),
            NativeValue::Float(v) => Primitive::Float(v),
            NativeValue::Double(v) => Primitive::Double(v),
            NativeValue::Object(_) | NativeValue::Void => return None,
        })
    }
}
impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Boolean(v) => Display::fmt(v, f),
            Primitive::Byte(v) => Display::fmt(v, f),
            Primitive::Char(v) => match char::from_u32(*v as u32) {
                Some(ch) => Display::fmt(&ch, f),
                None => write!(f, "\\u{v:04x}"),
            },
            Primitive::Short(v) => Display::fmt(v, f),
            Primitive::Int(v) => Display::fmt(v, f),
            Primitive::Long(v) => Display::fmt(v, f),
            Primitive::Float(v) => Display::fmt(v, f),
            Primitive::Double(v) => Display::fmt(v, f),
        }
    }
}

macro_rules! simple_conversion {
    ($(($rust_ty:ty, $variant:ident))*) => {$(
        impl From<$rust_ty> for Primitive {
            fn from(v: $rust_ty) -> Self {
                Primitive::$variant(v)
            }
        }
        impl FromValue for $rust_ty {
            const EXPECTED: &'static str = stringify!($rust_ty);
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Primitive(Primitive::$variant(v)) => Ok(*v),
                    _ => Err(mismatch::<Self>(value)),
                }
            }
        }
    )*}
}
simple_conversion! {
    (bool, Boolean)
    (i8, Byte)
    (u16, Char)
    (i16, Short)
    (i32, Int)
    (i64, Long)
    (f32, Float)
    (f64, Double)
}

// Java has no unsigned byte; `u8` travels as a `byte` with the same bits.
impl From<u8> for Primitive {
    fn from(v: u8) -> Self {
        Primitive::Byte(v as i8)
    }
}
impl FromValue for u8 {
    const EXPECTED: &'static str = "u8";
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Primitive(Primitive::Byte(v)) => Ok(*v as u8),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}
