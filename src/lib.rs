#![deny(unused_must_use)]

//! Signature-driven calls into the Java virtual machine.
//!
//! A [`Jvm`] handle creates objects, calls methods and reads or writes fields. Every member is
//! addressed by name and JVM type descriptor, and the descriptor alone selects the native JNI
//! entry point used:
//!
//! ```no_run
//! use jnicall::{Jvm, JvmOptions, Value};
//!
//! # fn main() -> jnicall::Result<()> {
//! let jvm = Jvm::with_options(&JvmOptions::new().class_path("tests/java"))?;
//! let list = jvm.new_instance("java/util/ArrayList", &[])?;
//! let item = jvm.new_string("hello")?;
//! list.call("add", "(Ljava/lang/Object;)Z", &[item.into()])?;
//! let size = list.call("size", "()I", &[])?;
//! assert_eq!(size.to_host::<i32>()?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! Object references returned from Java are held as global references, and released when the
//! last wrapper holding them is dropped.

#[macro_use]
mod errors;

/// The module containing the types used for conversions between Java and Rust types.
pub mod conversions;

mod dispatch;
mod globals;
mod java_class;
mod jni_env;
mod jvm;
mod objects;
mod options;


pub use errors::{Error, ErrorKind, Result};
pub use globals::{default_options, set_default_options};
pub use java_class::JInstance;
pub use jvm::Jvm;
pub use objects::{JArray, JString, Value};
pub use options::{JvmOptions, JVM_OPTIONS_VAR};

pub use conversions::{JniType, Primitive};
pub use dispatch::{entry_points, is_valid_pair, CallKind};

#[doc(inline)]
/// The module containing types that represent Java type signatures.
pub use jnicall_signatures as signatures;

/// Re-export of the `jni` crate, for [`Jvm::from_java_vm`] and [`JNIVersion`](jni::JNIVersion).
pub use jni;
