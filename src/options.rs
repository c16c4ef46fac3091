use jni::JNIVersion;
use std::env;

/// Environment variable holding whitespace separated JVM options for [`JvmOptions::from_env`].
pub const JVM_OPTIONS_VAR: &str = "JNICALL_JVM_OPTIONS";

/// Options used to launch a JVM with [`Jvm::with_options`](crate::Jvm::with_options), and to
/// configure the behavior of the engine.
#[derive(Clone, Debug)]
pub struct JvmOptions {
    pub(crate) class_path: Vec<String>,
    pub(crate) options: Vec<String>,
    pub(crate) version: JNIVersion,
    pub(crate) ignore_unrecognized: bool,
    pub(crate) check_jni: bool,
    pub(crate) describe_exceptions: bool,
    pub(crate) cache_members: bool,
}
impl Default for JvmOptions {
    fn default() -> Self {
        JvmOptions {
            class_path: Vec::new(),
            options: Vec::new(),
            version: JNIVersion::V8,
            ignore_unrecognized: false,
            check_jni: false,
            describe_exceptions: false,
            cache_members: true,
        }
    }
}
impl JvmOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options from the `CLASSPATH` and `JNICALL_JVM_OPTIONS` environment variables.
    pub fn from_env() -> Self {
        let mut options = JvmOptions::new();
        if let Some(class_path) = env::var_os("CLASSPATH") {
            for entry in env::split_paths(&class_path) {
                if !entry.as_os_str().is_empty() {
                    options.class_path.push(entry.to_string_lossy().into_owned());
                }
            }
        }
        if let Ok(raw) = env::var(JVM_OPTIONS_VAR) {
            options.options.extend(raw.split_whitespace().map(str::to_string));
        }
        options
    }

    /// Adds a class path entry.
    pub fn class_path(mut self, entry: impl Into<String>) -> Self {
        self.class_path.push(entry.into());
        self
    }

    /// Adds a raw JVM option, e.g. `-Xmx256m` or `-Dfoo=bar`.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Sets the requested JNI version.
    pub fn version(mut self, version: JNIVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets whether the JVM ignores options it does not recognize.
    pub fn ignore_unrecognized(mut self, ignore: bool) -> Self {
        self.ignore_unrecognized = ignore;
        self
    }

    /// Enables `-Xcheck:jni`.
    pub fn check_jni(mut self, check: bool) -> Self {
        self.check_jni = check;
        self
    }

    /// Sets whether exceptions thrown by called Java code are printed to stderr with
    /// `ExceptionDescribe` before they are cleared.
    pub fn describe_exceptions(mut self, describe: bool) -> Self {
        self.describe_exceptions = describe;
        self
    }

    /// Sets whether resolved classes and member ids are cached per JVM instance.
    pub fn cache_members(mut self, cache: bool) -> Self {
        self.cache_members = cache;
        self
    }

    /// Returns the options passed to the JVM at launch.
    pub fn jvm_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.class_path.is_empty() {
            let separator = if cfg!(windows) { ";" } else { ":" };
            args.push(format!("-Djava.class.path={}", self.class_path.join(separator)));
        }
        if self.check_jni {
            args.push("-Xcheck:jni".to_string());
        }
        args.extend(self.options.iter().cloned());
        args
    }
}
