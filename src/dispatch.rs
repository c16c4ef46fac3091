//! The table of native entry points, keyed by native type and call kind.

use crate::{
    conversions::java_type::{JniAbiType, NativeValue},
    errors::*,
    jni_env::NativeInterface,
    JniType,
};
use jni::sys::{
    jboolean, jbyte, jchar, jdouble, jfieldID, jfloat, jint, jlong, jmethodID, jobject, jshort,
    jvalue,
};
use lazy_static::lazy_static;
use log::trace;
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
};

/// The kind of member access a native entry point performs.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum CallKind {
    GetField,
    SetField,
    GetStaticField,
    SetStaticField,
    CallMethod,
    CallStaticMethod,
}
impl CallKind {
    /// Every call kind.
    pub const ALL: [CallKind; 6] = [
        CallKind::GetField,
        CallKind::SetField,
        CallKind::GetStaticField,
        CallKind::SetStaticField,
        CallKind::CallMethod,
        CallKind::CallStaticMethod,
    ];

    /// Returns whether this is a method call rather than a field access.
    pub fn is_method(self) -> bool {
        matches!(self, CallKind::CallMethod | CallKind::CallStaticMethod)
    }

    /// Returns whether this operates on a class rather than an instance.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            CallKind::GetStaticField | CallKind::SetStaticField | CallKind::CallStaticMethod
        )
    }

    /// Returns the name of the JNI function family implementing this kind for a native type,
    /// e.g. `CallStaticIntMethod`.
    pub fn jni_function(self, ty: JniType) -> String {
        match self {
            CallKind::GetField => format!("Get{ty}Field"),
            CallKind::SetField => format!("Set{ty}Field"),
            CallKind::GetStaticField => format!("GetStatic{ty}Field"),
            CallKind::SetStaticField => format!("SetStatic{ty}Field"),
            CallKind::CallMethod => format!("Call{ty}Method"),
            CallKind::CallStaticMethod => format!("CallStatic{ty}Method"),
        }
    }
}
impl Display for CallKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CallKind::GetField => "get field",
            CallKind::SetField => "set field",
            CallKind::GetStaticField => "get static field",
            CallKind::SetStaticField => "set static field",
            CallKind::CallMethod => "call method",
            CallKind::CallStaticMethod => "call static method",
        };
        f.write_str(name)
    }
}

/// Returns whether a native entry point exists for a pair. `void` has no fields.
pub fn is_valid_pair(ty: JniType, kind: CallKind) -> bool {
    ty != JniType::Void || kind.is_method()
}

/// The member a native call operates on.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Member {
    Field(jfieldID),
    Method(jmethodID),
}

/// The operands of a single native call.
///
/// `receiver` is the instance for instance members, and the class for static members. For
/// field sets, `args` holds the single value to store.
pub(crate) struct NativeCall<'a> {
    pub receiver: jobject,
    pub member: Member,
    pub args: &'a [jvalue],
}
impl<'a> NativeCall<'a> {
    fn field(&self) -> Result<jfieldID> {
        match self.member {
            Member::Field(field) => Ok(field),
            Member::Method(_) => jni_bail!("field entry point called with a method id"),
        }
    }
    fn method(&self) -> Result<jmethodID> {
        match self.member {
            Member::Method(method) => Ok(method),
            Member::Field(_) => jni_bail!("method entry point called with a field id"),
        }
    }
    fn value(&self) -> Result<jvalue> {
        match self.args {
            [value] => Ok(*value),
            _ => jni_bail!("field set called with {} values", self.args.len()),
        }
    }
}

type EntryPoint = fn(&dyn NativeInterface, &NativeCall<'_>) -> Result<NativeValue>;

fn get_field<T: JniAbiType>(env: &dyn NativeInterface, call: &NativeCall) -> Result<NativeValue> {
    let raw = env.get_field(call.receiver, call.field()?, T::TYPE)?;
    Ok(unsafe { T::from_jvalue(raw) }.into_native())
}
fn set_field<T: JniAbiType>(env: &dyn NativeInterface, call: &NativeCall) -> Result<NativeValue> {
    env.set_field(call.receiver, call.field()?, T::TYPE, call.value()?)?;
    Ok(NativeValue::Void)
}
fn get_static_field<T: JniAbiType>(
    env: &dyn NativeInterface,
    call: &NativeCall,
) -> Result<NativeValue> {
    let raw = env.get_static_field(call.receiver, call.field()?, T::TYPE)?;
    Ok(unsafe { T::from_jvalue(raw) }.into_native())
}
fn set_static_field<T: JniAbiType>(
    env: &dyn NativeInterface,
    call: &NativeCall,
) -> Result<NativeValue> {
    env.set_static_field(call.receiver, call.field()?, T::TYPE, call.value()?)?;
    Ok(NativeValue::Void)
}
fn call_method<T: JniAbiType>(env: &dyn NativeInterface, call: &NativeCall) -> Result<NativeValue> {
    let raw = env.call_method(call.receiver, call.method()?, T::TYPE, call.args)?;
    Ok(unsafe { T::from_jvalue(raw) }.into_native())
}
fn call_static_method<T: JniAbiType>(
    env: &dyn NativeInterface,
    call: &NativeCall,
) -> Result<NativeValue> {
    let raw = env.call_static_method(call.receiver, call.method()?, T::TYPE, call.args)?;
    Ok(unsafe { T::from_jvalue(raw) }.into_native())
}

/// The dispatch table, mapping every valid (native type, call kind) pair to exactly one typed
/// entry point.
pub(crate) struct DispatchTable {
    entries: HashMap<(JniType, CallKind), EntryPoint>,
}
impl DispatchTable {
    fn build() -> Self {
        let mut table = DispatchTable { entries: HashMap::new() };
        macro_rules! value_type {
            ($($ty:ty),* $(,)?) => {$(
                table.register::<$ty>(CallKind::GetField, get_field::<$ty>);
                table.register::<$ty>(CallKind::SetField, set_field::<$ty>);
                table.register::<$ty>(CallKind::GetStaticField, get_static_field::<$ty>);
                table.register::<$ty>(CallKind::SetStaticField, set_static_field::<$ty>);
                table.register::<$ty>(CallKind::CallMethod, call_method::<$ty>);
                table.register::<$ty>(CallKind::CallStaticMethod, call_static_method::<$ty>);
            )*};
        }
        value_type!(jboolean, jbyte, jchar, jshort, jint, jlong, jfloat, jdouble, jobject);
        table.register::<()>(CallKind::CallMethod, call_method::<()>);
        table.register::<()>(CallKind::CallStaticMethod, call_static_method::<()>);
        table
    }

    fn register<T: JniAbiType>(&mut self, kind: CallKind, entry: EntryPoint) {
        let prev = self.entries.insert((T::TYPE, kind), entry);
        debug_assert!(prev.is_none(), "duplicate entry point for {} {kind}", T::TYPE);
    }

    /// Returns the process-wide table.
    pub fn get() -> &'static DispatchTable {
        &DISPATCH_TABLE
    }

    /// Returns every pair the table holds an entry point for, in order.
    pub fn pairs(&self) -> Vec<(JniType, CallKind)> {
        let mut pairs: Vec<_> = self.entries.keys().copied().collect();
        pairs.sort();
        pairs
    }

    /// Calls the entry point for a pair.
    pub fn dispatch(
        &self,
        env: &dyn NativeInterface,
        ty: JniType,
        kind: CallKind,
        call: &NativeCall,
    ) -> Result<NativeValue> {
        let entry = match self.entries.get(&(ty, kind)) {
            Some(entry) => entry,
            None => return Err(Error::unknown_signature(format!("no native {kind} for {ty}"))),
        };
        trace!("dispatch: {}", kind.jni_function(ty));
        entry(env, call)
    }
}

lazy_static! {
    static ref DISPATCH_TABLE: DispatchTable = DispatchTable::build();
}

/// Returns every (native type, call kind) pair a native entry point exists for.
pub fn entry_points() -> Vec<(JniType, CallKind)> {
    DispatchTable::get().pairs()
}
