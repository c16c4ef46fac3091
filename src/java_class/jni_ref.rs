use crate::{errors::*, jni_env::JniContext};
use jni::sys::jobject;
use log::{debug, warn};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// An owned JVM global reference.
///
/// The reference is released exactly once, when the handle is dropped. Handles are shared
/// through [`Arc`], so a reference used as a receiver or argument cannot be released while the
/// call is in flight.
pub(crate) struct GlobalHandle {
    ctx: Arc<JniContext>,
    raw: jobject,
}

// Global references are valid on every thread attached to the JVM.
unsafe impl Send for GlobalHandle {}
unsafe impl Sync for GlobalHandle {}

impl GlobalHandle {
    /// Promotes a non-null local reference to a global one. The local reference is deleted
    /// whether or not this succeeds.
    pub(crate) fn from_local(ctx: &Arc<JniContext>, local: jobject) -> Result<Arc<GlobalHandle>> {
        jni_assert!(!local.is_null(), "cannot globalize a null reference");
        let global = ctx.native.new_global_ref(local);
        ctx.native.delete_local_ref(local)?;
        let global = global?;
        jni_assert!(!global.is_null(), "NewGlobalRef returned null");

        ctx.acquired();
        Ok(Arc::new(GlobalHandle { ctx: ctx.clone(), raw: global }))
    }

    /// Returns the raw global reference. It stays valid as long as this handle is alive.
    pub(crate) fn as_raw(&self) -> jobject {
        self.raw
    }
}
impl Drop for GlobalHandle {
    fn drop(&mut self) {
        self.ctx.released();
        match self.ctx.native.delete_global_ref(self.raw) {
            Ok(()) => debug!("released global reference {:?}", self.raw),
            Err(e) => warn!("could not release global reference {:?}: {e}", self.raw),
        }
    }
}
impl Debug for GlobalHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GlobalHandle({:?})", self.raw)
    }
}
