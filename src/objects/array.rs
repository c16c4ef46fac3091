use crate::{
    conversions::{ArrayData, ArrayElement},
    errors::*,
    java_class::jni_ref::GlobalHandle,
    objects::Value,
    Jvm,
};
use jni::sys::{jobject, jvalue};
use jnicall_signatures::Tag;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// A Java array.
///
/// The length is read once, when the array is wrapped. Elements are read from the JVM on every
/// access.
#[derive(Clone)]
pub struct JArray {
    jvm: Jvm,
    signature: Arc<str>,
    handle: Arc<GlobalHandle>,
    len: usize,
}
impl JArray {
    pub(crate) fn from_local(jvm: &Jvm, local: jobject, signature: &str) -> Result<Self> {
        jni_assert!(signature.starts_with('['), "{signature} is not an array type");
        let handle = GlobalHandle::from_local(jvm.ctx(), local)?;
        let len = jvm.native().array_length(handle.as_raw())?;
        Ok(JArray { jvm: jvm.clone(), signature: signature.into(), handle, len })
    }

    /// Returns the type descriptor of this array, e.g. `[I`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns the type descriptor of the elements, e.g. `I` for `[I`.
    pub fn element_signature(&self) -> &str {
        &self.signature[1..]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn java_value(&self) -> jvalue {
        jvalue { l: self.handle.as_raw() }
    }

    pub(crate) fn raw(&self) -> jobject {
        self.handle.as_raw()
    }

    fn primitive_element(&self) -> Option<Tag> {
        Tag::of(self.element_signature()).filter(|tag| tag.is_primitive())
    }

    /// Reads the element at `index`.
    pub fn get(&self, index: usize) -> Result<Value> {
        if index >= self.len {
            return Err(Error::argument_mismatch(format!(
                "index {index} out of bounds for length {}",
                self.len,
            )));
        }
        let native = self.jvm.native();
        match self.primitive_element() {
            Some(tag) => match native.get_array_region(self.raw(), tag, index, 1)?.get(0) {
                Some(prim) => Ok(Value::Primitive(prim)),
                None => jni_bail!("array region of {} was empty", self.signature),
            },
            None => {
                let local = native.get_object_array_element(self.raw(), index)?;
                self.jvm.wrap_object(local, self.element_signature())
            }
        }
    }

    /// Copies the contents of a primitive array in one call.
    pub fn to_array_data(&self) -> Result<ArrayData> {
        match self.primitive_element() {
            Some(tag) => self.jvm.native().get_array_region(self.raw(), tag, 0, self.len),
            None => Err(Error::type_mismatch("primitive array", self.signature.to_string())),
        }
    }

    /// Copies the contents of a primitive array into host elements of type `T`.
    pub fn to_host<T: ArrayElement>(&self) -> Result<Vec<T>> {
        let data = self.to_array_data()?;
        let found = data.signature();
        T::from_array_data(data).ok_or_else(|| Error::type_mismatch(T::TAG.to_string(), found))
    }

    /// Reads every element.
    pub fn to_vec(&self) -> Result<Vec<Value>> {
        if self.primitive_element().is_some() {
            let data = self.to_array_data()?;
            Ok((0..data.len()).filter_map(|i| data.get(i)).map(Value::Primitive).collect())
        } else {
            (0..self.len).map(|i| self.get(i)).collect()
        }
    }
}
impl Debug for JArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "JArray({}[{}] @ {:?})", self.signature, self.len, self.handle.as_raw())
    }
}
