use super::NativeInterface;
use crate::{conversions::ArrayData, errors::*, options::JvmOptions, JniType};
use jni::{
    objects::{
        GlobalRef, JBooleanArray, JByteArray, JCharArray, JClass, JDoubleArray, JFieldID,
        JFloatArray, JIntArray, JLongArray, JMethodID, JObject, JObjectArray, JShortArray,
        JStaticFieldID, JStaticMethodID, JString, JValue, JValueOwned,
    },
    signature::{JavaType, Primitive as JPrimitive, ReturnType},
    sys::{jboolean, jclass, jfieldID, jmethodID, jobject, jsize, jvalue},
    InitArgsBuilder, JNIEnv, JavaVM,
};
use jnicall_signatures::Tag;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

/// The native layer backed by a real JVM through the JNI invocation API.
///
/// Every call looks up the `JNIEnv` of the current thread, which must be attached.
pub(crate) struct JniInvocation {
    vm: JavaVM,
    globals: Mutex<HashMap<usize, GlobalRef>>,
}
impl JniInvocation {
    /// Launches a new JVM in this process and attaches the current thread to it.
    pub(crate) fn launch(options: &JvmOptions) -> Result<Self> {
        let args = options.jvm_args();
        let mut builder = InitArgsBuilder::new()
            .version(options.version)
            .ignore_unrecognized(options.ignore_unrecognized);
        for arg in &args {
            builder = builder.option(arg.as_str());
        }
        let vm = JavaVM::new(builder.build()?)?;
        vm.attach_current_thread_permanently()?;
        debug!("launched JVM with options {args:?}");
        Ok(JniInvocation::from_vm(vm))
    }

    /// Wraps an existing JVM.
    pub(crate) fn from_vm(vm: JavaVM) -> Self {
        JniInvocation { vm, globals: Mutex::new(HashMap::new()) }
    }

    fn env(&self) -> Result<JNIEnv<'_>> {
        Ok(self.vm.get_env()?)
    }
}

fn return_type(ty: JniType) -> ReturnType {
    match ty {
        JniType::Boolean => ReturnType::Primitive(JPrimitive::Boolean),
        JniType::Byte => ReturnType::Primitive(JPrimitive::Byte),
        JniType::Char => ReturnType::Primitive(JPrimitive::Char),
        JniType::Short => ReturnType::Primitive(JPrimitive::Short),
        JniType::Int => ReturnType::Primitive(JPrimitive::Int),
        JniType::Long => ReturnType::Primitive(JPrimitive::Long),
        JniType::Float => ReturnType::Primitive(JPrimitive::Float),
        JniType::Double => ReturnType::Primitive(JPrimitive::Double),
        JniType::Object => ReturnType::Object,
        JniType::Void => ReturnType::Primitive(JPrimitive::Void),
    }
}

fn java_type(ty: JniType) -> JavaType {
    match return_type(ty) {
        ReturnType::Primitive(prim) => JavaType::Primitive(prim),
        ReturnType::Object | ReturnType::Array => JavaType::Object(String::new()),
    }
}

/// Runs `f` with a [`JValue`] read from the slot of `ty`.
unsafe fn with_jvalue<R>(ty: JniType, value: jvalue, f: impl FnOnce(JValue) -> R) -> R {
    match ty {
        JniType::Boolean => f(JValue::Bool(value.z)),
        JniType::Byte => f(JValue::Byte(value.b)),
        JniType::Char => f(JValue::Char(value.c)),
        JniType::Short => f(JValue::Short(value.s)),
        JniType::Int => f(JValue::Int(value.i)),
        JniType::Long => f(JValue::Long(value.j)),
        JniType::Float => f(JValue::Float(value.f)),
        JniType::Double => f(JValue::Double(value.d)),
        JniType::Object => {
            let obj = JObject::from_raw(value.l);
            f(JValue::Object(&obj))
        }
        JniType::Void => f(JValue::Void),
    }
}

/// Converts the result of a call. A pending exception yields a zero value, which the caller
/// discards after checking for the exception.
fn call_result(result: jni::errors::Result<JValueOwned>) -> Result<jvalue> {
    match result {
        Ok(value) => Ok(value.as_jni()),
        Err(jni::errors::Error::JavaException) => Ok(jvalue { j: 0 }),
        Err(e) => Err(e.into()),
    }
}

/// Maps a failed lookup to `None`, clearing the `NoSuchMethodError` (or similar) it raised.
fn lookup<T>(env: &mut JNIEnv, result: jni::errors::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(
            jni::errors::Error::JavaException
            | jni::errors::Error::MethodNotFound { .. }
            | jni::errors::Error::FieldNotFound { .. }
            | jni::errors::Error::NullPtr(_),
        ) => {
            if env.exception_check()? {
                env.exception_clear()?;
            }
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn to_jsize(len: usize) -> Result<jsize> {
    match jsize::try_from(len) {
        Ok(len) => Ok(len),
        Err(_) => Err(Error::argument_mismatch(format!("array length {len} is too large"))),
    }
}

macro_rules! new_array {
    ($env:expr, $data:expr, $(($variant:ident, $new:ident, $set:ident))*) => {
        match $data {
            ArrayData::Boolean(v) => {
                let array = $env.new_boolean_array(to_jsize(v.len())?)?;
                let buf: Vec<jboolean> = v.iter().map(|x| *x as jboolean).collect();
                $env.set_boolean_array_region(&array, 0, &buf)?;
                JObject::from(array).into_raw()
            }
            $(ArrayData::$variant(v) => {
                let array = $env.$new(to_jsize(v.len())?)?;
                $env.$set(&array, 0, v)?;
                JObject::from(array).into_raw()
            })*
        }
    };
}

macro_rules! get_region {
    ($env:expr, $raw:expr, $element:expr, $start:expr, $len:expr,
     $(($tag:ident, $array:ident, $get:ident, $zero:expr))*) => {
        match $element {
            Tag::Boolean => {
                let array = JBooleanArray::from_raw($raw);
                let mut buf = vec![0 as jboolean; $len];
                $env.get_boolean_array_region(&array, $start, &mut buf)?;
                ArrayData::Boolean(buf.into_iter().map(|x| x != 0).collect())
            }
            $(Tag::$tag => {
                let array = $array::from_raw($raw);
                let mut buf = vec![$zero; $len];
                $env.$get(&array, $start, &mut buf)?;
                ArrayData::$tag(buf)
            })*
            _ => jni_bail!("{} is not a primitive element type", $element),
        }
    };
}

impl NativeInterface for JniInvocation {
    fn attach_current_thread(&self) -> Result<()> {
        self.vm.attach_current_thread_permanently()?;
        Ok(())
    }

    fn find_class(&self, name: &str) -> Result<Option<jclass>> {
        let mut env = self.env()?;
        let result = env.find_class(name);
        Ok(lookup(&mut env, result)?.map(|class| class.into_raw()))
    }
    fn get_method_id(&self, class: jclass, name: &str, sig: &str) -> Result<Option<jmethodID>> {
        let mut env = self.env()?;
        let class = unsafe { JClass::from_raw(class) };
        let result = env.get_method_id(&class, name, sig);
        Ok(lookup(&mut env, result)?.map(JMethodID::into_raw))
    }
    fn get_static_method_id(
        &self,
        class: jclass,
        name: &str,
        sig: &str,
    ) -> Result<Option<jmethodID>> {
        let mut env = self.env()?;
        let class = unsafe { JClass::from_raw(class) };
        let result = env.get_static_method_id(&class, name, sig);
        Ok(lookup(&mut env, result)?.map(JStaticMethodID::into_raw))
    }
    fn get_field_id(&self, class: jclass, name: &str, sig: &str) -> Result<Option<jfieldID>> {
        let mut env = self.env()?;
        let class = unsafe { JClass::from_raw(class) };
        let result = env.get_field_id(&class, name, sig);
        Ok(lookup(&mut env, result)?.map(JFieldID::into_raw))
    }
    fn get_static_field_id(
        &self,
        class: jclass,
        name: &str,
        sig: &str,
    ) -> Result<Option<jfieldID>> {
        let mut env = self.env()?;
        let class = unsafe { JClass::from_raw(class) };
        let result = env.get_static_field_id(&class, name, sig);
        Ok(lookup(&mut env, result)?.map(JStaticFieldID::into_raw))
    }

    fn new_object(&self, class: jclass, ctor: jmethodID, args: &[jvalue]) -> Result<jobject> {
        let mut env = self.env()?;
        let result = unsafe {
            let class = JClass::from_raw(class);
            env.new_object_unchecked(&class, JMethodID::from_raw(ctor), args)
        };
        match result {
            Ok(obj) => Ok(obj.into_raw()),
            Err(jni::errors::Error::JavaException) => Ok(std::ptr::null_mut()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_instance_of(&self, obj: jobject, class: jclass) -> Result<bool> {
        let mut env = self.env()?;
        let (obj, class) = unsafe { (JObject::from_raw(obj), JClass::from_raw(class)) };
        Ok(env.is_instance_of(&obj, &class)?)
    }
    fn new_global_ref(&self, obj: jobject) -> Result<jobject> {
        let env = self.env()?;
        let global = env.new_global_ref(unsafe { JObject::from_raw(obj) })?;
        let raw = global.as_obj().as_raw();
        self.globals.lock().insert(raw as usize, global);
        Ok(raw)
    }
    fn delete_global_ref(&self, obj: jobject) -> Result<()> {
        match self.globals.lock().remove(&(obj as usize)) {
            Some(global) => {
                drop(global);
                Ok(())
            }
            None => jni_bail!("global reference {obj:?} is not owned by this JVM"),
        }
    }
    fn delete_local_ref(&self, obj: jobject) -> Result<()> {
        let env = self.env()?;
        env.delete_local_ref(unsafe { JObject::from_raw(obj) })?;
        Ok(())
    }

    fn take_exception(&self, describe: bool) -> Result<Option<String>> {
        let mut env = self.env()?;
        if !env.exception_check()? {
            return Ok(None);
        }
        let throwable = env.exception_occurred()?;
        if describe {
            env.exception_describe()?;
        }
        env.exception_clear()?;

        let description =
            match env.call_method(&throwable, "toString", "()Ljava/lang/String;", &[]) {
                Ok(value) => {
                    let string = JString::from(value.l()?);
                    let description: String = env.get_string(&string)?.into();
                    env.delete_local_ref(string)?;
                    description
                }
                Err(jni::errors::Error::JavaException) => {
                    env.exception_clear()?;
                    "<exception in toString()>".to_string()
                }
                Err(e) => return Err(e.into()),
            };
        env.delete_local_ref(throwable)?;
        Ok(Some(description))
    }

    fn get_field(&self, obj: jobject, field: jfieldID, ty: JniType) -> Result<jvalue> {
        let mut env = self.env()?;
        let obj = unsafe { JObject::from_raw(obj) };
        let field = unsafe { JFieldID::from_raw(field) };
        #[allow(unused_unsafe)]
        let result = unsafe { env.get_field_unchecked(&obj, field, return_type(ty)) };
        Ok(result?.as_jni())
    }
    fn set_field(&self, obj: jobject, field: jfieldID, ty: JniType, value: jvalue) -> Result<()> {
        let mut env = self.env()?;
        unsafe {
            let obj = JObject::from_raw(obj);
            let field = JFieldID::from_raw(field);
            with_jvalue(ty, value, |value| env.set_field_unchecked(&obj, field, value))?;
        }
        Ok(())
    }
    fn get_static_field(&self, class: jclass, field: jfieldID, ty: JniType) -> Result<jvalue> {
        let mut env = self.env()?;
        let class = unsafe { JClass::from_raw(class) };
        let field = unsafe { JStaticFieldID::from_raw(field) };
        #[allow(unused_unsafe)]
        let result = unsafe { env.get_static_field_unchecked(&class, field, java_type(ty)) };
        Ok(result?.as_jni())
    }
    fn set_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        ty: JniType,
        value: jvalue,
    ) -> Result<()> {
        let mut env = self.env()?;
        unsafe {
            let class = JClass::from_raw(class);
            let field = JStaticFieldID::from_raw(field);
            with_jvalue(ty, value, |value| env.set_static_field(&class, field, value))?;
        }
        Ok(())
    }
    fn call_method(
        &self,
        obj: jobject,
        method: jmethodID,
        ty: JniType,
        args: &[jvalue],
    ) -> Result<jvalue> {
        let mut env = self.env()?;
        let result = unsafe {
            let obj = JObject::from_raw(obj);
            env.call_method_unchecked(&obj, JMethodID::from_raw(method), return_type(ty), args)
        };
        call_result(result)
    }
    fn call_static_method(
        &self,
        class: jclass,
        method: jmethodID,
        ty: JniType,
        args: &[jvalue],
    ) -> Result<jvalue> {
        let mut env = self.env()?;
        let result = unsafe {
            let class = JClass::from_raw(class);
            let method = JStaticMethodID::from_raw(method);
            env.call_static_method_unchecked(&class, method, return_type(ty), args)
        };
        call_result(result)
    }

    fn new_string(&self, value: &str) -> Result<jobject> {
        let env = self.env()?;
        Ok(JObject::from(env.new_string(value)?).into_raw())
    }
    fn get_string(&self, string: jobject) -> Result<String> {
        let mut env = self.env()?;
        let string = unsafe { JString::from_raw(string) };
        let value: String = env.get_string(&string)?.into();
        Ok(value)
    }

    fn new_primitive_array(&self, data: &ArrayData) -> Result<jobject> {
        let env = self.env()?;
        Ok(new_array!(env, data,
            (Byte, new_byte_array, set_byte_array_region)
            (Char, new_char_array, set_char_array_region)
            (Short, new_short_array, set_short_array_region)
            (Int, new_int_array, set_int_array_region)
            (Long, new_long_array, set_long_array_region)
            (Float, new_float_array, set_float_array_region)
            (Double, new_double_array, set_double_array_region)
        ))
    }
    fn new_object_array(&self, element_class: jclass, elements: &[jobject]) -> Result<jobject> {
        let mut env = self.env()?;
        let class = unsafe { JClass::from_raw(element_class) };
        let array = env.new_object_array(to_jsize(elements.len())?, &class, JObject::null())?;
        for (i, element) in elements.iter().enumerate() {
            let element = unsafe { JObject::from_raw(*element) };
            env.set_object_array_element(&array, i as jsize, element)?;
        }
        Ok(JObject::from(array).into_raw())
    }
    fn array_length(&self, array: jobject) -> Result<usize> {
        let env = self.env()?;
        let array = unsafe { JObjectArray::from_raw(array) };
        Ok(env.get_array_length(&array)? as usize)
    }
    fn get_array_region(
        &self,
        array: jobject,
        element: Tag,
        start: usize,
        len: usize,
    ) -> Result<ArrayData> {
        let env = self.env()?;
        let start = to_jsize(start)?;
        Ok(unsafe {
            get_region!(env, array, element, start, len,
                (Byte, JByteArray, get_byte_array_region, 0)
                (Char, JCharArray, get_char_array_region, 0)
                (Short, JShortArray, get_short_array_region, 0)
                (Int, JIntArray, get_int_array_region, 0)
                (Long, JLongArray, get_long_array_region, 0)
                (Float, JFloatArray, get_float_array_region, 0.0)
                (Double, JDoubleArray, get_double_array_region, 0.0)
            )
        })
    }
    fn get_object_array_element(&self, array: jobject, index: usize) -> Result<jobject> {
        let mut env = self.env()?;
        let array = unsafe { JObjectArray::from_raw(array) };
        Ok(env.get_object_array_element(&array, to_jsize(index)?)?.into_raw())
    }
}
