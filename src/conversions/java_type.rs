use crate::conversions::java_type::sealed::Sealed;
use jni::sys::{jboolean, jbyte, jchar, jdouble, jfloat, jint, jlong, jobject, jshort, jvalue};
use jnicall_signatures::Tag;
use std::fmt::{Display, Formatter};

mod sealed {
    pub trait Sealed {}
}

/// The JNI calling-convention slot a value is passed through.
///
/// Arrays and class instances share the [`JniType::Object`] slot, and [`JniType::Void`] only
/// exists for method returns.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum JniType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
    Void,
}
impl JniType {
    /// Every native type.
    pub const ALL: [JniType; 10] = [
        JniType::Boolean,
        JniType::Byte,
        JniType::Char,
        JniType::Short,
        JniType::Int,
        JniType::Long,
        JniType::Float,
        JniType::Double,
        JniType::Object,
        JniType::Void,
    ];

    /// Returns the native type a descriptor tag dispatches through.
    pub fn of_tag(tag: Tag) -> JniType {
        match tag {
            Tag::Boolean => JniType::Boolean,
            Tag::Byte => JniType::Byte,
            Tag::Char => JniType::Char,
            Tag::Short => JniType::Short,
            Tag::Int => JniType::Int,
            Tag::Long => JniType::Long,
            Tag::Float => JniType::Float,
            Tag::Double => JniType::Double,
            Tag::Array | Tag::Object => JniType::Object,
            Tag::Void => JniType::Void,
        }
    }
}
impl Display for JniType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JniType::Boolean => "Boolean",
            JniType::Byte => "Byte",
            JniType::Char => "Char",
            JniType::Short => "Short",
            JniType::Int => "Int",
            JniType::Long => "Long",
            JniType::Float => "Float",
            JniType::Double => "Double",
            JniType::Object => "Object",
            JniType::Void => "Void",
        };
        f.write_str(name)
    }
}

/// A raw value returned by a native entry point, tagged with the slot it was read from.
///
/// Object values are local references owned by the caller.
#[derive(Debug, Copy, Clone)]
pub(crate) enum NativeValue {
    Boolean(jboolean),
    Byte(jbyte),
    Char(jchar),
    Short(jshort),
    Int(jint),
    Long(jlong),
    Float(jfloat),
    Double(jdouble),
    Object(jobject),
    Void,
}

/// Marker trait for Java types that can be used through the JNI interface.
///
/// An exhaustive list of possible types:
/// * `()` (only as a method return)
/// * [`jboolean`]
/// * [`jbyte`]
/// * [`jchar`]
/// * [`jdouble`]
/// * [`jfloat`]
/// * [`jint`]
/// * [`jlong`]
/// * [`jobject`]
/// * [`jshort`]
pub(crate) trait JniAbiType: Sealed + Copy + 'static {
    /// The slot values of this type are passed through.
    const TYPE: JniType;

    /// Reads this type's slot of a `jvalue`.
    ///
    /// # Safety
    ///
    /// The value must have been written through the same slot.
    unsafe fn from_jvalue(value: jvalue) -> Self;

    /// Converts this value into a [`NativeValue`].
    fn into_native(self) -> NativeValue;
}

macro_rules! simple_type {
    ($(($ty:ty, $variant:ident, $field:ident))*) => {$(
        impl Sealed for $ty {}
        impl JniAbiType for $ty {
            const TYPE: JniType = JniType::$variant;
            unsafe fn from_jvalue(value: jvalue) -> Self {
                value.$field
            }
            fn into_native(self) -> NativeValue {
                NativeValue::$variant(self)
            }
        }
    )*};
}
simple_type! {
    (jboolean, Boolean, z)
    (jbyte, Byte, b)
    (jchar, Char, c)
    (jshort, Short, s)
    (jint, Int, i)
    (jlong, Long, j)
    (jfloat, Float, f)
    (jdouble, Double, d)
    (jobject, Object, l)
}

impl Sealed for () {}
impl JniAbiType for () {
    const TYPE: JniType = JniType::Void;
    unsafe fn from_jvalue(_: jvalue) -> Self {}
    fn into_native(self) -> NativeValue {
        NativeValue::Void
    }
}

/// Returns a `jvalue` holding a null reference.
pub(crate) fn null_jvalue() -> jvalue {
    jvalue { l: std::ptr::null_mut() }
}
