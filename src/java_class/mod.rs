pub(crate) mod jni_ref;

use crate::{errors::*, objects::Value, Jvm};
use jni::sys::{jobject, jvalue};
use jni_ref::GlobalHandle;
use jnicall_signatures::{parse_tag, Tag};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// An instance of a Java class.
///
/// An instance owns one global reference to the object, and shares the global reference to its
/// class. Both are released when the last clone of the instance is dropped.
#[derive(Clone)]
pub struct JInstance {
    jvm: Jvm,
    signature: Arc<str>,
    object: Arc<GlobalHandle>,
    class: Arc<GlobalHandle>,
}
impl JInstance {
    pub(crate) fn new(
        jvm: &Jvm,
        object: Arc<GlobalHandle>,
        class: Arc<GlobalHandle>,
        signature: String,
    ) -> Self {
        JInstance { jvm: jvm.clone(), signature: signature.into(), object, class }
    }

    /// Wraps a local reference to an object of the declared type `signature`, which must be of
    /// the form `Lname;`. The class is resolved from the declared type, not the runtime type.
    pub(crate) fn from_local(jvm: &Jvm, local: jobject, signature: &str) -> Result<Self> {
        let object = GlobalHandle::from_local(jvm.ctx(), local)?;
        let class_name = match parse_tag(signature).map_err(bad_signature)? {
            (Tag::Object, name) => name,
            _ => return Err(Error::unknown_signature(format!("{signature} is not a class"))),
        };
        let class = jvm.resolve_class(class_name)?;
        Ok(JInstance::new(jvm, object, class, signature.to_string()))
    }

    /// Returns the type descriptor of this instance, e.g. `Ljava/util/ArrayList;`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns the internal name of this instance's class, e.g. `java/util/ArrayList`.
    pub fn class_name(&self) -> &str {
        &self.signature[1..self.signature.len() - 1]
    }

    /// Returns the JVM this instance belongs to.
    pub fn jvm(&self) -> &Jvm {
        &self.jvm
    }

    /// Returns a `jvalue` holding the object reference. It is valid as long as `self` is alive.
    pub fn java_value(&self) -> jvalue {
        jvalue { l: self.object.as_raw() }
    }

    pub(crate) fn raw(&self) -> jobject {
        self.object.as_raw()
    }

    /// Calls a method on this instance, with a method descriptor such as `(ILjava/lang/String;)V`.
    pub fn call(&self, method: &str, sig: &str, args: &[Value]) -> Result<Value> {
        self.jvm.invoke(&self.class, Some(&self.object), method, sig, args)
    }

    /// Reads a field with the given type descriptor.
    pub fn get_field(&self, field: &str, sig: &str) -> Result<Value> {
        self.jvm.read_field(&self.class, Some(&self.object), field, sig)
    }

    /// Writes a field, looking it up by the value's signature.
    pub fn set_field(&self, field: &str, value: &Value) -> Result<()> {
        self.set_field_as(field, value.signature(), value)
    }

    /// Writes a field declared with the given type descriptor, such as a field of type
    /// `Ljava/lang/Object;` holding an instance of a subclass.
    pub fn set_field_as(&self, field: &str, sig: &str, value: &Value) -> Result<()> {
        self.jvm.write_field(&self.class, Some(&self.object), field, sig, value)
    }

    /// Calls the Java `toString` method of this instance.
    pub fn to_java_string(&self) -> Result<String> {
        match self.call("toString", "()Ljava/lang/String;", &[])? {
            Value::String(s) => Ok(s.as_str().to_string()),
            Value::Null(_) => Ok("null".to_string()),
            other => Err(Error::type_mismatch("java/lang/String", other.signature().to_string())),
        }
    }
}
impl Debug for JInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "JInstance({} @ {:?})", self.signature, self.object.as_raw())
    }
}
