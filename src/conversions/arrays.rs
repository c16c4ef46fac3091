use super::*;

/// The contents of a Java primitive array, copied into host memory.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Boolean(Vec<bool>),
    Byte(Vec<i8>),
    Char(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}
impl ArrayData {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Boolean(v) => v.len(),
            ArrayData::Byte(v) => v.len(),
            ArrayData::Char(v) => v.len(),
            ArrayData::Short(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Long(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Double(v) => v.len(),
        }
    }

    /// Returns whether this array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the descriptor tag of the elements.
    pub fn element_tag(&self) -> Tag {
        match self {
            ArrayData::Boolean(_) => Tag::Boolean,
            ArrayData::Byte(_) => Tag::Byte,
            ArrayData::Char(_) => Tag::Char,
            ArrayData::Short(_) => Tag::Short,
            ArrayData::Int(_) => Tag::Int,
            ArrayData::Long(_) => Tag::Long,
            ArrayData::Float(_) => Tag::Float,
            ArrayData::Double(_) => Tag::Double,
        }
    }

    /// Returns the type descriptor of the array, e.g. `[I`.
    pub fn signature(&self) -> String {
        format!("[{}", self.element_tag().as_char())
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: usize) -> Option<Primitive> {
        match self {
            ArrayData::Boolean(v) => v.get(index).map(|x| Primitive::Boolean(*x)),
            ArrayData::Byte(v) => v.get(index).map(|x| Primitive::Byte(*x)),
            ArrayData::Char(v) => v.get(index).map(|x| Primitive::Char(*x)),
            ArrayData::Short(v) => v.get(index).map(|x| Primitive::Short(*x)),
            ArrayData::Int(v) => v.get(index).map(|x| Primitive::Int(*x)),
            ArrayData::Long(v) => v.get(index).map(|x| Primitive::Long(*x)),
            ArrayData::Float(v) => v.get(index).map(|x| Primitive::Float(*x)),
            ArrayData::Double(v) => v.get(index).map(|x| Primitive::Double(*x)),
        }
    }
}

/// A host type that can be stored in a Java primitive array.
pub trait ArrayElement: Copy + Into<Primitive> + 'static {
    /// The descriptor tag of the Java element type.
    const TAG: Tag;

    /// Copies a host slice into array contents.
    fn to_array_data(slice: &[Self]) -> ArrayData;

    /// Extracts host elements from array contents of the matching element type.
    fn from_array_data(data: ArrayData) -> Option<Vec<Self>>;
}

macro_rules! array_element {
    ($(($rust_ty:ty, $variant:ident))*) => {$(
        impl ArrayElement for $rust_ty {
            const TAG: Tag = Tag::$variant;
            fn to_array_data(slice: &[Self]) -> ArrayData {
                ArrayData::$variant(slice.to_vec())
            }
            fn from_array_data(data: ArrayData) -> Option<Vec<Self>> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*}
}
array_element! {
    (bool, Boolean)
    (i8, Byte)
    (u16, Char)
    (i16, Short)
    (i32, Int)
    (i64, Long)
    (f32, Float)
    (f64, Double)
}

impl ArrayElement for u8 {
    const TAG: Tag = Tag::Byte;
    fn to_array_data(slice: &[Self]) -> ArrayData {
        ArrayData::Byte(slice.iter().map(|x| *x as i8).collect())
    }
    fn from_array_data(data: ArrayData) -> Option<Vec<Self>> {
        match data {
            ArrayData::Byte(v) => Some(v.into_iter().map(|x| x as u8).collect()),
            _ => None,
        }
    }
}

impl<T: ArrayElement> FromValue for Vec<T> {
    const EXPECTED: &'static str = "primitive array";
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(array) => {
                let data = array.to_array_data()?;
                T::from_array_data(data).ok_or_else(|| mismatch::<Self>(value))
            }
            _ => Err(mismatch::<Self>(value)),
        }
    }
}
