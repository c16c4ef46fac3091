use crate::{errors::*, java_class::jni_ref::GlobalHandle, Jvm};
use jni::sys::{jobject, jvalue};
use std::{
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

/// A `java.lang.String`, together with its decoded contents.
#[derive(Clone)]
pub struct JString {
    handle: Arc<GlobalHandle>,
    value: Arc<str>,
}
impl JString {
    pub(crate) fn new(jvm: &Jvm, value: &str) -> Result<Self> {
        let local = jvm.native().new_string(value)?;
        let handle = GlobalHandle::from_local(jvm.ctx(), local)?;
        Ok(JString { handle, value: value.into() })
    }

    pub(crate) fn from_local(jvm: &Jvm, local: jobject) -> Result<Self> {
        let handle = GlobalHandle::from_local(jvm.ctx(), local)?;
        let value = jvm.native().get_string(handle.as_raw())?;
        Ok(JString { handle, value: value.into() })
    }

    /// Returns the contents of the string.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn signature(&self) -> &'static str {
        super::STRING_SIGNATURE
    }

    pub fn java_value(&self) -> jvalue {
        jvalue { l: self.handle.as_raw() }
    }

    pub(crate) fn raw(&self) -> jobject {
        self.handle.as_raw()
    }
}
impl Display for JString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
impl Debug for JString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "JString({:?})", &*self.value)
    }
}
