use crate::{
    conversions::{java_type::NativeValue, ArrayData, ArrayElement, Primitive},
    dispatch::{CallKind, DispatchTable, Member, NativeCall},
    errors::*,
    globals::default_options,
    java_class::{jni_ref::GlobalHandle, JInstance},
    jni_env::{JniContext, JniInvocation, NativeInterface},
    objects::{is_assignable, JArray, JString, Value, OBJECT_SIGNATURE, STRING_SIGNATURE},
    options::JvmOptions,
    JniType,
};
use jni::{
    sys::{jfieldID, jmethodID, jobject, jvalue},
    JavaVM,
};
use jnicall_signatures::{parse_tag, ClassName, MethodSig, Tag, Type};
use log::debug;
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::Arc,
};

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
enum MemberKind {
    Method,
    StaticMethod,
    Field,
    StaticField,
}
impl MemberKind {
    fn describe(self, name: &str) -> &'static str {
        match self {
            MemberKind::Method if name == "<init>" => "constructor",
            MemberKind::Method => "method",
            MemberKind::StaticMethod => "static method",
            MemberKind::Field => "field",
            MemberKind::StaticField => "static field",
        }
    }
}

#[derive(Debug, Hash, Eq, PartialEq)]
struct MemberKey {
    class: usize,
    kind: MemberKind,
    name: String,
    sig: String,
}

struct JvmInner {
    ctx: Arc<JniContext>,
    options: JvmOptions,
    classes: RwLock<HashMap<String, Arc<GlobalHandle>>>,
    members: RwLock<HashMap<MemberKey, usize>>,
}

/// A handle to a running JVM.
///
/// Every value created through a `Jvm` keeps it alive. Handles are cheap to clone, and can be
/// shared between threads as long as each thread calling into the JVM is attached with
/// [`Jvm::attach_current_thread`].
#[derive(Clone)]
pub struct Jvm {
    inner: Arc<JvmInner>,
}
impl Jvm {
    /// Launches a JVM with the [default options](crate::default_options).
    pub fn create() -> Result<Jvm> {
        Self::with_options(&default_options())
    }

    /// Launches a JVM with the given options. The calling thread is attached to it.
    ///
    /// Most JVM implementations only support one JVM per process.
    pub fn with_options(options: &JvmOptions) -> Result<Jvm> {
        let native = JniInvocation::launch(options)?;
        Ok(Jvm::from_native(Box::new(native), options.clone()))
    }

    /// Wraps an already running JVM, such as the one a native method was called from.
    pub fn from_java_vm(vm: JavaVM) -> Jvm {
        Jvm::from_native(Box::new(JniInvocation::from_vm(vm)), JvmOptions::default())
    }

    pub(crate) fn from_native(native: Box<dyn NativeInterface>, options: JvmOptions) -> Jvm {
        debug!("created JVM handle (cache_members = {})", options.cache_members);
        Jvm {
            inner: Arc::new(JvmInner {
                ctx: Arc::new(JniContext::new(native)),
                options,
                classes: RwLock::new(HashMap::new()),
                members: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Attaches the calling thread to this JVM.
    pub fn attach_current_thread(&self) -> Result<()> {
        self.native().attach_current_thread()
    }

    /// Returns the options this handle was created with.
    pub fn options(&self) -> &JvmOptions {
        &self.inner.options
    }

    /// Returns the number of global references currently held through this JVM handle,
    /// including the ones held by its class cache.
    pub fn live_references(&self) -> usize {
        self.inner.ctx.live()
    }

    /// Constructs a new instance of a class, given in internal form such as `java/util/ArrayList`.
    ///
    /// The constructor is selected by the signatures of the arguments.
    pub fn new_instance(&self, class_name: &str, args: &[Value]) -> Result<JInstance> {
        ClassName::parse_jni(class_name).map_err(bad_signature)?;
        let mut sig = String::from("(");
        for (i, arg) in args.iter().enumerate() {
            if let Value::Void = arg {
                return Err(Error::argument_mismatch(format!("argument {i}: void is not a value")));
            }
            sig.push_str(arg.signature());
        }
        sig.push_str(")V");

        let class = self.resolve_class(class_name)?;
        let ctor = self.member_id(&class, MemberKind::Method, "<init>", &sig)? as jmethodID;
        let raw_args = marshal(args);
        let result = self.native().new_object(class.as_raw(), ctor, &raw_args);
        let object = match self.check_exception(result.map(NativeValue::Object))? {
            NativeValue::Object(obj) if !obj.is_null() => obj,
            _ => jni_bail!("constructor of {class_name} returned null"),
        };
        let object = GlobalHandle::from_local(&self.inner.ctx, object)?;
        Ok(JInstance::new(self, object, class, format!("L{class_name};")))
    }

    /// Calls a static method.
    pub fn call_static(
        &self,
        class_name: &str,
        method: &str,
        sig: &str,
        args: &[Value],
    ) -> Result<Value> {
        MethodSig::parse_jni(sig).map_err(bad_signature)?;
        let class = self.resolve_class(class_name)?;
        self.invoke(&class, None, method, sig, args)
    }

    /// Reads a static field.
    pub fn get_static_field(&self, class_name: &str, field: &str, sig: &str) -> Result<Value> {
        Type::parse_jni(sig).map_err(bad_signature)?;
        let class = self.resolve_class(class_name)?;
        self.read_field(&class, None, field, sig)
    }

    /// Writes a static field, looking it up by the value's signature.
    pub fn set_static_field(&self, class_name: &str, field: &str, value: &Value) -> Result<()> {
        self.set_static_field_as(class_name, field, value.signature(), value)
    }

    /// Writes a static field declared with the given signature.
    pub fn set_static_field_as(
        &self,
        class_name: &str,
        field: &str,
        sig: &str,
        value: &Value,
    ) -> Result<()> {
        Type::parse_jni(sig).map_err(bad_signature)?;
        let class = self.resolve_class(class_name)?;
        self.write_field(&class, None, field, sig, value)
    }

    /// Wraps a host scalar. This does not touch the JVM.
    pub fn new_primitive(&self, value: impl Into<Primitive>) -> Value {
        Value::Primitive(value.into())
    }

    /// Creates a Java primitive array holding a copy of `values`.
    pub fn new_array<T: ArrayElement>(&self, values: &[T]) -> Result<JArray> {
        self.new_array_from_data(&T::to_array_data(values))
    }

    /// Creates a Java primitive array from array contents.
    pub fn new_array_from_data(&self, data: &ArrayData) -> Result<JArray> {
        let local = self.native().new_primitive_array(data)?;
        JArray::from_local(self, local, &data.signature())
    }

    /// Creates a Java array of references with element class `element_class`.
    pub fn new_object_array(&self, element_class: &str, elements: &[Value]) -> Result<JArray> {
        ClassName::parse_jni(element_class).map_err(bad_signature)?;
        let element_sig = format!("L{element_class};");
        for (i, element) in elements.iter().enumerate() {
            if !is_assignable(&element_sig, element) {
                return Err(Error::argument_mismatch(format!(
                    "element {i}: cannot store {} in {element_sig}[]",
                    element.signature(),
                )));
            }
        }
        for (i, element) in elements.iter().enumerate() {
            if !self.is_instance(&element_sig, element)? {
                return Err(Error::argument_mismatch(format!(
                    "element {i}: {} is not an instance of {element_class}",
                    element.signature(),
                )));
            }
        }
        let class = self.resolve_class(element_class)?;
        let raw: Vec<jobject> = elements.iter().map(Value::raw_object).collect();
        let local = self.native().new_object_array(class.as_raw(), &raw)?;
        JArray::from_local(self, local, &format!("[{element_sig}"))
    }

    /// Creates a Java string.
    pub fn new_string(&self, value: &str) -> Result<JString> {
        JString::new(self, value)
    }

    pub(crate) fn ctx(&self) -> &Arc<JniContext> {
        &self.inner.ctx
    }

    pub(crate) fn native(&self) -> &dyn NativeInterface {
        &*self.inner.ctx.native
    }

    /// Resolves a class by its internal name, through the cache if enabled.
    pub(crate) fn resolve_class(&self, name: &str) -> Result<Arc<GlobalHandle>> {
        let cache = self.inner.options.cache_members;
        if cache {
            if let Some(class) = self.inner.classes.read().get(name) {
                return Ok(class.clone());
            }
        }
        let local = match self.native().find_class(name)? {
            Some(local) => local,
            None => return Err(Error::member_not_found("class", name, "")),
        };
        let class = GlobalHandle::from_local(&self.inner.ctx, local)?;
        debug!("resolved class {name}");
        if cache {
            Ok(self.inner.classes.write().entry(name.to_string()).or_insert(class).clone())
        } else {
            Ok(class)
        }
    }

    fn member_id(
        &self,
        class: &GlobalHandle,
        kind: MemberKind,
        name: &str,
        sig: &str,
    ) -> Result<usize> {
        let cache = self.inner.options.cache_members;
        let key = MemberKey {
            class: class.as_raw() as usize,
            kind,
            name: name.to_string(),
            sig: sig.to_string(),
        };
        if cache {
            if let Some(id) = self.inner.members.read().get(&key) {
                return Ok(*id);
            }
        }

        let native = self.native();
        let raw = class.as_raw();
        let id = match kind {
            MemberKind::Method => native.get_method_id(raw, name, sig)?.map(|x| x as usize),
            MemberKind::StaticMethod => {
                native.get_static_method_id(raw, name, sig)?.map(|x| x as usize)
            }
            MemberKind::Field => native.get_field_id(raw, name, sig)?.map(|x| x as usize),
            MemberKind::StaticField => {
                native.get_static_field_id(raw, name, sig)?.map(|x| x as usize)
            }
        };
        let id = match id {
            Some(id) => id,
            None => return Err(Error::member_not_found(kind.describe(name), name, sig)),
        };
        if cache {
            self.inner.members.write().insert(key, id);
        }
        Ok(id)
    }

    /// Clears a pending exception raised by a method call, turning it into an error. The call's
    /// result is discarded in that case.
    fn check_exception(&self, result: Result<NativeValue>) -> Result<NativeValue> {
        let describe = self.inner.options.describe_exceptions;
        match self.native().take_exception(describe)? {
            Some(description) => {
                if let Ok(NativeValue::Object(obj)) = result {
                    if !obj.is_null() {
                        self.native().delete_local_ref(obj)?;
                    }
                }
                debug!("call threw {description}");
                Err(Error::java_exception(description))
            }
            None => result,
        }
    }

    /// Calls a method on `object`, or a static method of `class` if there is no object.
    pub(crate) fn invoke(
        &self,
        class: &GlobalHandle,
        object: Option<&GlobalHandle>,
        name: &str,
        sig: &str,
        args: &[Value],
    ) -> Result<Value> {
        let method_sig = MethodSig::parse_jni(sig).map_err(bad_signature)?;
        self.check_args(&method_sig.params, args)?;

        let (kind, member_kind, receiver) = match object {
            Some(object) => (CallKind::CallMethod, MemberKind::Method, object.as_raw()),
            None => (CallKind::CallStaticMethod, MemberKind::StaticMethod, class.as_raw()),
        };
        let method = self.member_id(class, member_kind, name, sig)? as jmethodID;

        let ty = JniType::of_tag(method_sig.ret_ty.tag());
        let raw_args = marshal(args);
        let call = NativeCall { receiver, member: Member::Method(method), args: &raw_args };
        let result = DispatchTable::get().dispatch(self.native(), ty, kind, &call);
        let value = self.check_exception(result)?;

        let ret = method_sig.ret_ty.display_jni().to_string();
        self.wrap_native(value, &ret)
    }

    /// Reads a field of `object`, or a static field of `class` if there is no object.
    pub(crate) fn read_field(
        &self,
        class: &GlobalHandle,
        object: Option<&GlobalHandle>,
        name: &str,
        sig: &str,
    ) -> Result<Value> {
        let ty = Type::parse_jni(sig).map_err(bad_signature)?;
        let (kind, member_kind, receiver) = match object {
            Some(object) => (CallKind::GetField, MemberKind::Field, object.as_raw()),
            None => (CallKind::GetStaticField, MemberKind::StaticField, class.as_raw()),
        };
        let field = self.member_id(class, member_kind, name, sig)? as jfieldID;

        let call = NativeCall { receiver, member: Member::Field(field), args: &[] };
        let value =
            DispatchTable::get().dispatch(self.native(), JniType::of_tag(ty.tag()), kind, &call)?;
        self.wrap_native(value, sig)
    }

    /// Writes a field of `object`, or a static field of `class` if there is no object.
    pub(crate) fn write_field(
        &self,
        class: &GlobalHandle,
        object: Option<&GlobalHandle>,
        name: &str,
        sig: &str,
        value: &Value,
    ) -> Result<()> {
        let ty = Type::parse_jni(sig).map_err(bad_signature)?;
        if !is_assignable(sig, value) {
            return Err(Error::argument_mismatch(format!(
                "cannot store {} in field {name} of type {sig}",
                value.signature(),
            )));
        }
        if !self.is_instance(sig, value)? {
            return Err(Error::argument_mismatch(format!(
                "cannot store {} in field {name}: not an instance of {sig}",
                value.signature(),
            )));
        }
        let (kind, member_kind, receiver) = match object {
            Some(object) => (CallKind::SetField, MemberKind::Field, object.as_raw()),
            None => (CallKind::SetStaticField, MemberKind::StaticField, class.as_raw()),
        };
        let field = self.member_id(class, member_kind, name, sig)? as jfieldID;

        let raw = [value.java_value()];
        let call = NativeCall { receiver, member: Member::Field(field), args: &raw };
        DispatchTable::get().dispatch(self.native(), JniType::of_tag(ty.tag()), kind, &call)?;
        Ok(())
    }

    /// Wraps a value returned by a native entry point, using the declared type.
    pub(crate) fn wrap_native(&self, value: NativeValue, declared: &str) -> Result<Value> {
        match value {
            NativeValue::Void => Ok(Value::Void),
            NativeValue::Object(obj) => self.wrap_object(obj, declared),
            value => match Primitive::from_native(value) {
                Some(prim) => Ok(Value::Primitive(prim)),
                None => jni_bail!("could not wrap {value:?} as {declared}"),
            },
        }
    }

    /// Wraps a local reference, taking ownership of it.
    pub(crate) fn wrap_object(&self, local: jobject, declared: &str) -> Result<Value> {
        if local.is_null() {
            return Ok(Value::Null(declared.to_string()));
        }
        match parse_tag(declared) {
            Ok((Tag::Array, _)) => Ok(Value::Array(JArray::from_local(self, local, declared)?)),
            Ok((Tag::Object, _)) if declared == STRING_SIGNATURE => {
                Ok(Value::String(JString::from_local(self, local)?))
            }
            Ok((Tag::Object, _)) => {
                Ok(Value::Object(JInstance::from_local(self, local, declared)?))
            }
            _ => {
                self.native().delete_local_ref(local)?;
                Err(Error::unknown_signature(format!("{declared} is not a reference type")))
            }
        }
    }

    fn check_args(&self, params: &[Type], args: &[Value]) -> Result<()> {
        if params.len() != args.len() {
            return Err(Error::argument_mismatch(format!(
                "expected {} arguments, found {}",
                params.len(),
                args.len(),
            )));
        }
        let params: Vec<String> = params.iter().map(|p| p.display_jni().to_string()).collect();
        for (i, (param, arg)) in params.iter().zip(args).enumerate() {
            if !is_assignable(param, arg) {
                return Err(Error::argument_mismatch(format!(
                    "argument {i}: cannot pass {} as {param}",
                    arg.signature(),
                )));
            }
        }
        for (i, (param, arg)) in params.iter().zip(args).enumerate() {
            if !self.is_instance(param, arg)? {
                return Err(Error::argument_mismatch(format!(
                    "argument {i}: {} is not an instance of {param}",
                    arg.signature(),
                )));
            }
        }
        Ok(())
    }

    /// Asks the JVM whether a reference is an instance of the reference type `declared`.
    ///
    /// Nulls, primitives and references already carrying the declared type are accepted
    /// without a native call.
    fn is_instance(&self, declared: &str, value: &Value) -> Result<bool> {
        let raw = value.raw_object();
        if raw.is_null() || value.signature() == declared || declared == OBJECT_SIGNATURE {
            return Ok(true);
        }
        let class_name = match parse_tag(declared).map_err(bad_signature)? {
            (Tag::Object, class) => class,
            (Tag::Array, _) => declared,
            _ => return Ok(true),
        };
        let class = self.resolve_class(class_name)?;
        self.native().is_instance_of(raw, class.as_raw())
    }
}
impl Debug for Jvm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jvm").field("live_references", &self.live_references()).finish()
    }
}

fn marshal(args: &[Value]) -> Vec<jvalue> {
    args.iter().map(Value::java_value).collect()
}
