use crate::options::JvmOptions;
use parking_lot::RwLock;

static DEFAULT_OPTIONS: RwLock<Option<JvmOptions>> = RwLock::new(None);

/// Sets the options [`Jvm::create`](crate::Jvm::create) launches with.
pub fn set_default_options(options: JvmOptions) {
    *DEFAULT_OPTIONS.write() = Some(options);
}

/// Returns the options [`Jvm::create`](crate::Jvm::create) launches with. Unless set with
/// [`set_default_options`], these are read from the environment.
pub fn default_options() -> JvmOptions {
    match &*DEFAULT_OPTIONS.read() {
        Some(options) => options.clone(),
        None => JvmOptions::from_env(),
    }
}
