use jnicall_signatures::ParseError;
use std::{
    backtrace::{Backtrace, BacktraceStatus},
    borrow::Cow,
    fmt::{Display, Formatter},
    panic::Location,
};
use thiserror::Error;

// internal reexports
pub use std::{error::Error as ErrorTrait, result::Result as StdResult};

/// The error type used for `jnicall`.
///
/// This error does not implement [`Error`](`ErrorTrait`) to allow a `From` implementation for any
/// standard error.
#[derive(Debug)]
pub struct Error(Box<ErrorData>);

#[derive(Debug)]
struct ErrorData {
    location: &'static Location<'static>,
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

/// The kind of an [`struct@Error`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A type or method descriptor was malformed, or used a tag that cannot be dispatched.
    #[error("{0}")]
    UnknownSignature(Cow<'static, str>),
    /// A class, method or field could not be resolved.
    #[error("{member} not found: {name} {signature}")]
    MemberNotFound { member: &'static str, name: String, signature: String },
    /// The called Java code threw an exception. Contains the exception's `toString()`.
    #[error("Java exception: {0}")]
    JavaException(String),
    /// The arguments passed do not match the declared parameters.
    #[error("{0}")]
    ArgumentMismatch(Cow<'static, str>),
    /// A value was converted to a host type it does not hold.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Cow<'static, str>, found: String },
    /// An error reported by the native JNI layer.
    #[error("JNI error: {0}")]
    Wrapped(#[source] Box<dyn ErrorTrait + 'static>),
    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(Cow<'static, str>),
}
impl ErrorKind {
    fn wants_backtrace(&self) -> bool {
        matches!(self, ErrorKind::Wrapped(_) | ErrorKind::Internal(_))
    }
}

impl Error {
    #[inline(never)]
    #[track_caller]
    fn raw_new(kind: ErrorKind) -> Self {
        let backtrace = if kind.wants_backtrace() {
            let bt = Backtrace::capture();
            match bt.status() {
                BacktraceStatus::Captured => Some(bt),
                _ => None,
            }
        } else {
            None
        };
        Error(Box::new(ErrorData { location: Location::caller(), kind, backtrace }))
    }

    /// Creates a new `Error` with an internal error message.
    #[inline(never)]
    #[track_caller]
    pub fn new(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::raw_new(ErrorKind::Internal(msg.into()))
    }

    /// Wraps any error in an `Error`.
    #[inline(never)]
    #[track_caller]
    pub fn wrap<T: ErrorTrait + 'static>(err: T) -> Self {
        Self::raw_new(ErrorKind::Wrapped(Box::new(err)))
    }

    #[track_caller]
    pub(crate) fn unknown_signature(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::raw_new(ErrorKind::UnknownSignature(msg.into()))
    }

    #[track_caller]
    pub(crate) fn member_not_found(
        member: &'static str,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self::raw_new(ErrorKind::MemberNotFound {
            member,
            name: name.into(),
            signature: signature.into(),
        })
    }

    #[track_caller]
    pub(crate) fn java_exception(description: impl Into<String>) -> Self {
        Self::raw_new(ErrorKind::JavaException(description.into()))
    }

    #[track_caller]
    pub(crate) fn argument_mismatch(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::raw_new(ErrorKind::ArgumentMismatch(msg.into()))
    }

    #[track_caller]
    pub(crate) fn type_mismatch(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<String>,
    ) -> Self {
        Self::raw_new(ErrorKind::TypeMismatch { expected: expected.into(), found: found.into() })
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Returns whether this error was caused by an exception thrown by Java code.
    pub fn is_java_exception(&self) -> bool {
        matches!(self.0.kind, ErrorKind::JavaException(_))
    }

    /// Returns the location in the source code this error was created at.
    pub fn location(&self) -> &'static Location<'static> {
        self.0.location
    }

    /// Returns the cause of this error.
    pub fn source(&self) -> Option<&(dyn ErrorTrait + 'static)> {
        ErrorTrait::source(&self.0.kind)
    }

    /// Returns the backtrace for this error, if one was captured.
    ///
    /// Backtraces are only captured for internal and native-layer errors, and only when enabled
    /// through `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.0.backtrace.as_ref()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.kind.wants_backtrace() {
            write!(f, "{} (at {}:{})", self.0.kind, self.0.location.file(), self.0.location.line())
        } else {
            Display::fmt(&self.0.kind, f)
        }
    }
}
impl<T: ErrorTrait + 'static> From<T> for Error {
    #[track_caller]
    fn from(t: T) -> Self {
        Error::wrap(t)
    }
}

/// Converts a descriptor parse error into an [`ErrorKind::UnknownSignature`] error.
#[track_caller]
pub(crate) fn bad_signature(err: ParseError) -> Error {
    Error::unknown_signature(err.to_string())
}

/// The result type used for `jnicall`.
pub type Result<T> = StdResult<T, Error>;

/// Returns from the current function with an internal [`struct@Error`].
///
/// This requires the function return a [`Result`], and uses the same format as [`format!`].
#[macro_export]
macro_rules! jni_bail {
    ($($tt:tt)*) => {
        return ::std::result::Result::Err($crate::Error::new(::std::format!($($tt)*)))
    }
}

/// Returns from the current function with an internal [`struct@Error`], if a precondition fails.
///
/// This requires the function return a [`Result`], and uses the same format as [`assert!`].
#[macro_export]
macro_rules! jni_assert {
    ($condition:expr, $($tt:tt)*) => {
        if !$condition {
            $crate::jni_bail!($($tt)*)
        }
    }
}
