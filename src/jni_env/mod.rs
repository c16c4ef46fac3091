//! The native layer: the raw JNI entry points the dispatch engine calls through.

mod invocation;
#[cfg(test)]
pub(crate) mod mock;

pub(crate) use invocation::JniInvocation;

use crate::{conversions::ArrayData, errors::*, JniType};
use jni::sys::{jclass, jfieldID, jmethodID, jobject, jvalue};
use jnicall_signatures::Tag;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The raw JNI functions used by `jnicall`.
///
/// All references passed in and out are raw JNI handles. Lookups return `Ok(None)` when the
/// class or member does not exist, after clearing the error the JVM raised for it. The typed
/// entry points (`get_field`, `call_method`, ...) do not check for pending exceptions;
/// [`take_exception`](NativeInterface::take_exception) is called separately by the caller.
pub(crate) trait NativeInterface: Send + Sync {
    /// Attaches the calling thread to the JVM.
    fn attach_current_thread(&self) -> Result<()>;

    fn find_class(&self, name: &str) -> Result<Option<jclass>>;
    fn get_method_id(&self, class: jclass, name: &str, sig: &str) -> Result<Option<jmethodID>>;
    fn get_static_method_id(
        &self,
        class: jclass,
        name: &str,
        sig: &str,
    ) -> Result<Option<jmethodID>>;
    fn get_field_id(&self, class: jclass, name: &str, sig: &str) -> Result<Option<jfieldID>>;
    fn get_static_field_id(&self, class: jclass, name: &str, sig: &str)
        -> Result<Option<jfieldID>>;

    /// Invokes a constructor. Returns a local reference, or null if the constructor threw.
    fn new_object(&self, class: jclass, ctor: jmethodID, args: &[jvalue]) -> Result<jobject>;

    /// Returns whether `obj` is an instance of `class`. A null `obj` is an instance of every
    /// class.
    fn is_instance_of(&self, obj: jobject, class: jclass) -> Result<bool>;

    fn new_global_ref(&self, obj: jobject) -> Result<jobject>;
    fn delete_global_ref(&self, obj: jobject) -> Result<()>;
    fn delete_local_ref(&self, obj: jobject) -> Result<()>;

    /// Clears the pending exception, if any, and returns its `toString()`.
    ///
    /// If `describe` is set the exception is printed with `ExceptionDescribe` first.
    fn take_exception(&self, describe: bool) -> Result<Option<String>>;

    fn get_field(&self, obj: jobject, field: jfieldID, ty: JniType) -> Result<jvalue>;
    fn set_field(&self, obj: jobject, field: jfieldID, ty: JniType, value: jvalue) -> Result<()>;
    fn get_static_field(&self, class: jclass, field: jfieldID, ty: JniType) -> Result<jvalue>;
    fn set_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        ty: JniType,
        value: jvalue,
    ) -> Result<()>;
    fn call_method(
        &self,
        obj: jobject,
        method: jmethodID,
        ty: JniType,
        args: &[jvalue],
    ) -> Result<jvalue>;
    fn call_static_method(
        &self,
        class: jclass,
        method: jmethodID,
        ty: JniType,
        args: &[jvalue],
    ) -> Result<jvalue>;

    fn new_string(&self, value: &str) -> Result<jobject>;
    fn get_string(&self, string: jobject) -> Result<String>;

    fn new_primitive_array(&self, data: &ArrayData) -> Result<jobject>;
    fn new_object_array(&self, element_class: jclass, elements: &[jobject]) -> Result<jobject>;
    fn array_length(&self, array: jobject) -> Result<usize>;
    fn get_array_region(
        &self,
        array: jobject,
        element: Tag,
        start: usize,
        len: usize,
    ) -> Result<ArrayData>;
    fn get_object_array_element(&self, array: jobject, index: usize) -> Result<jobject>;
}

/// A native interface together with the count of global references held through it.
pub(crate) struct JniContext {
    pub(crate) native: Box<dyn NativeInterface>,
    live: AtomicUsize,
}
impl JniContext {
    pub(crate) fn new(native: Box<dyn NativeInterface>) -> Self {
        JniContext { native, live: AtomicUsize::new(0) }
    }

    pub(crate) fn acquired(&self) {
        self.live.fetch_add(1, Ordering::Relaxed);
    }
    pub(crate) fn released(&self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }

    /// Returns the number of global references currently held.
    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}
