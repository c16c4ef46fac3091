mod arrays;
mod basic;
pub(crate) mod java_type;

pub use arrays::{ArrayData, ArrayElement};
pub use basic::Primitive;
pub use java_type::JniType;

use crate::{errors::*, java_class::JInstance, objects::Value};
use java_type::NativeValue;
use jni::sys::{jboolean, jvalue};
use jnicall_signatures::Tag;
use std::fmt::{Display, Formatter};

/// Main trait that converts wrapped Java values into host values.
///
/// Used through [`Value::to_host`].
pub trait FromValue: Sized {
    /// A human readable name of the host type, used in error messages.
    const EXPECTED: &'static str;

    /// Converts the value, failing with [`ErrorKind::TypeMismatch`] if it holds another type.
    fn from_value(value: &Value) -> Result<Self>;
}

#[track_caller]
fn mismatch<T: FromValue>(value: &Value) -> Error {
    Error::type_mismatch(T::EXPECTED, value.signature().to_string())
}

impl FromValue for String {
    const EXPECTED: &'static str = "java/lang/String";
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.as_str().to_string()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for JInstance {
    const EXPECTED: &'static str = "class instance";
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}
