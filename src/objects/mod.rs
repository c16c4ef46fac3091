mod array;
mod string;

pub use array::JArray;
pub use string::JString;

use crate::{
    conversions::{java_type::null_jvalue, FromValue, Primitive},
    errors::*,
    java_class::JInstance,
};
use jni::sys::{jobject, jvalue};
use jnicall_signatures::{Tag, Type};

pub(crate) const STRING_SIGNATURE: &str = "Ljava/lang/String;";
pub(crate) const OBJECT_SIGNATURE: &str = "Ljava/lang/Object;";

/// Any value that can be passed to or returned from Java.
#[derive(Clone, Debug)]
pub enum Value {
    /// The result of a `void` method. It cannot be passed as an argument.
    Void,
    Primitive(Primitive),
    Array(JArray),
    Object(JInstance),
    String(JString),
    /// A null reference of the given declared type.
    Null(String),
}
impl Value {
    /// Creates a null reference of a given reference type, e.g. `Ljava/lang/Object;` or `[I`.
    pub fn null(signature: &str) -> Result<Value> {
        let ty = Type::parse_jni(signature).map_err(bad_signature)?;
        if !ty.is_reference() {
            return Err(Error::unknown_signature(format!("{signature} is not a reference type")));
        }
        Ok(Value::Null(signature.to_string()))
    }

    /// Returns the type descriptor of this value.
    pub fn signature(&self) -> &str {
        match self {
            Value::Void => "V",
            Value::Primitive(p) => p.signature(),
            Value::Array(array) => array.signature(),
            Value::Object(obj) => obj.signature(),
            Value::String(_) => STRING_SIGNATURE,
            Value::Null(sig) => sig.as_str(),
        }
    }

    /// Returns a `jvalue` ready to be passed to a native call. References are valid as long as
    /// `self` is alive.
    pub fn java_value(&self) -> jvalue {
        match self {
            Value::Primitive(p) => p.java_value(),
            Value::Void | Value::Null(_) => null_jvalue(),
            _ => jvalue { l: self.raw_object() },
        }
    }

    pub(crate) fn raw_object(&self) -> jobject {
        match self {
            Value::Array(array) => array.raw(),
            Value::Object(obj) => obj.raw(),
            Value::String(s) => s.raw(),
            _ => std::ptr::null_mut(),
        }
    }

    /// Converts this value into a host value.
    pub fn to_host<T: FromValue>(&self) -> Result<T> {
        T::from_value(self)
    }

    /// Returns whether this is a null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }
}

macro_rules! value_from {
    ($($ty:ty)*) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Primitive(v.into())
            }
        }
    )*};
}
value_from!(bool i8 u8 u16 i16 i32 i64 f32 f64 Primitive);

impl From<JArray> for Value {
    fn from(v: JArray) -> Self {
        Value::Array(v)
    }
}
impl From<JInstance> for Value {
    fn from(v: JInstance) -> Self {
        Value::Object(v)
    }
}
impl From<JString> for Value {
    fn from(v: JString) -> Self {
        Value::String(v)
    }
}

/// Returns whether `value` can be passed where a value of type `declared` is expected.
///
/// Primitives must match exactly. Class types accept any reference, and array types accept null
/// or an array with a compatible element type. The runtime class of a reference is checked
/// separately, by the JVM.
pub(crate) fn is_assignable(declared: &str, value: &Value) -> bool {
    match (Tag::of(declared), value) {
        (_, Value::Void) => false,
        (Some(tag), Value::Primitive(p)) => tag == p.tag() && declared.len() == 1,
        (Some(Tag::Object), _) => true,
        (Some(Tag::Array), Value::Null(_)) => true,
        (Some(Tag::Array), Value::Array(array)) => array_assignable(declared, array.signature()),
        _ => false,
    }
}

fn array_assignable(declared: &str, actual: &str) -> bool {
    if declared == actual {
        return true;
    }
    match (declared.strip_prefix('['), actual.strip_prefix('[')) {
        (Some(declared), Some(actual)) => match Tag::of(declared) {
            Some(Tag::Object) => matches!(Tag::of(actual), Some(Tag::Object | Tag::Array)),
            Some(Tag::Array) => array_assignable(declared, actual),
            _ => false,
        },
        _ => false,
    }
}
