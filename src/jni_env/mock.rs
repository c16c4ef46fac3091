//! An in-memory stand-in for a JVM, recording every native call made through it.

use super::NativeInterface;
use crate::{
    conversions::{java_type::NativeValue, ArrayData, Primitive},
    dispatch::CallKind,
    errors::*,
    JniType,
};
use jni::sys::{jclass, jfieldID, jmethodID, jobject, jvalue};
use jnicall_signatures::Tag;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// What a mock method does when called.
#[derive(Clone)]
pub(crate) enum Behavior {
    Return(Primitive),
    ReturnString(&'static str),
    ReturnInstance(&'static str),
    ReturnArray(ArrayData),
    ReturnObjectArray(&'static str, usize),
    ReturnNull,
    ReturnVoid,
    ReturnArg(usize),
    Throw(&'static str),
}

#[derive(Clone, Copy)]
enum Slot {
    Prim(Primitive),
    Ref(Option<usize>),
}

enum MockObject {
    Class(String),
    Instance { class: usize, fields: HashMap<usize, Slot> },
    String(String),
    Array(ArrayData),
    ObjectArray { class: usize, elements: Vec<Option<usize>> },
    Throwable(String),
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum RefKind {
    Local,
    Global,
}

struct MockField {
    class: usize,
    name: String,
    sig: String,
    is_static: bool,
    ty: JniType,
    static_value: Slot,
}

struct MockMethod {
    class: usize,
    name: String,
    sig: String,
    is_static: bool,
    ret: JniType,
    behavior: Behavior,
}

#[derive(Default)]
struct MockState {
    objects: Vec<MockObject>,
    refs: HashMap<usize, (usize, RefKind)>,
    next_handle: usize,
    classes: HashMap<String, usize>,
    fields: Vec<MockField>,
    methods: Vec<MockMethod>,
    pending: Option<usize>,
    calls: Vec<String>,
    invalid_releases: usize,
}

fn jni_type(sig: &str) -> JniType {
    JniType::of_tag(Tag::of(sig).expect("bad mock descriptor"))
}

fn zero(ty: JniType) -> Slot {
    match ty {
        JniType::Boolean => Slot::Prim(Primitive::Boolean(false)),
        JniType::Byte => Slot::Prim(Primitive::Byte(0)),
        JniType::Char => Slot::Prim(Primitive::Char(0)),
        JniType::Short => Slot::Prim(Primitive::Short(0)),
        JniType::Int => Slot::Prim(Primitive::Int(0)),
        JniType::Long => Slot::Prim(Primitive::Long(0)),
        JniType::Float => Slot::Prim(Primitive::Float(0.0)),
        JniType::Double => Slot::Prim(Primitive::Double(0.0)),
        JniType::Object | JniType::Void => Slot::Ref(None),
    }
}

/// Reads a primitive out of the slot of `ty`.
unsafe fn primitive_from_jvalue(ty: JniType, value: jvalue) -> Option<Primitive> {
    Primitive::from_native(match ty {
        JniType::Boolean => NativeValue::Boolean(value.z),
        JniType::Byte => NativeValue::Byte(value.b),
        JniType::Char => NativeValue::Char(value.c),
        JniType::Short => NativeValue::Short(value.s),
        JniType::Int => NativeValue::Int(value.i),
        JniType::Long => NativeValue::Long(value.j),
        JniType::Float => NativeValue::Float(value.f),
        JniType::Double => NativeValue::Double(value.d),
        JniType::Object | JniType::Void => return None,
    })
}

fn slice(data: &ArrayData, start: usize, len: usize) -> Option<ArrayData> {
    let range = start..start.checked_add(len)?;
    Some(match data {
        ArrayData::Boolean(v) => ArrayData::Boolean(v.get(range)?.to_vec()),
        ArrayData::Byte(v) => ArrayData::Byte(v.get(range)?.to_vec()),
        ArrayData::Char(v) => ArrayData::Char(v.get(range)?.to_vec()),
        ArrayData::Short(v) => ArrayData::Short(v.get(range)?.to_vec()),
        ArrayData::Int(v) => ArrayData::Int(v.get(range)?.to_vec()),
        ArrayData::Long(v) => ArrayData::Long(v.get(range)?.to_vec()),
        ArrayData::Float(v) => ArrayData::Float(v.get(range)?.to_vec()),
        ArrayData::Double(v) => ArrayData::Double(v.get(range)?.to_vec()),
    })
}

impl MockState {
    fn record(&mut self, name: impl Into<String>) {
        self.calls.push(name.into());
    }

    fn add_object(&mut self, obj: MockObject) -> usize {
        self.objects.push(obj);
        self.objects.len() - 1
    }
    fn new_ref(&mut self, id: usize, kind: RefKind) -> jobject {
        self.next_handle += 8;
        let handle = 0x1000 + self.next_handle;
        self.refs.insert(handle, (id, kind));
        handle as jobject
    }
    fn deref(&self, handle: jobject) -> Result<usize> {
        match self.refs.get(&(handle as usize)) {
            Some((id, _)) => Ok(*id),
            None => jni_bail!("mock: invalid reference {handle:?}"),
        }
    }
    fn deref_nullable(&self, handle: jobject) -> Result<Option<usize>> {
        if handle.is_null() {
            Ok(None)
        } else {
            self.deref(handle).map(Some)
        }
    }

    fn add_class(&mut self, name: &str) -> usize {
        let id = self.add_object(MockObject::Class(name.to_string()));
        self.classes.insert(name.to_string(), id);
        id
    }
    fn class_name(&self, class: usize) -> &str {
        match &self.objects[class] {
            MockObject::Class(name) => name,
            _ => "",
        }
    }
    fn add_field(&mut self, class: usize, name: &str, sig: &str, is_static: bool) {
        let ty = jni_type(sig);
        self.fields.push(MockField {
            class,
            name: name.to_string(),
            sig: sig.to_string(),
            is_static,
            ty,
            static_value: zero(ty),
        });
    }
    fn add_method(&mut self, class: usize, name: &str, sig: &str, is_static: bool, b: Behavior) {
        let ret = &sig[sig.find(')').expect("bad mock method") + 1..];
        self.methods.push(MockMethod {
            class,
            name: name.to_string(),
            sig: sig.to_string(),
            is_static,
            ret: jni_type(ret),
            behavior: b,
        });
    }

    fn new_instance(&mut self, class: usize) -> usize {
        let fields = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.class == class && !f.is_static)
            .map(|(i, f)| (i, zero(f.ty)))
            .collect();
        self.add_object(MockObject::Instance { class, fields })
    }

    fn slot_to_jvalue(&mut self, slot: Slot) -> jvalue {
        match slot {
            Slot::Prim(p) => p.java_value(),
            Slot::Ref(Some(id)) => jvalue { l: self.new_ref(id, RefKind::Local) },
            Slot::Ref(None) => jvalue { l: std::ptr::null_mut() },
        }
    }
    fn jvalue_to_slot(&self, ty: JniType, value: jvalue) -> Result<Slot> {
        match ty {
            JniType::Object => Ok(Slot::Ref(self.deref_nullable(unsafe { value.l })?)),
            _ => match unsafe { primitive_from_jvalue(ty, value) } {
                Some(p) => Ok(Slot::Prim(p)),
                None => jni_bail!("mock: void value"),
            },
        }
    }

    fn field(&self, field: jfieldID, ty: JniType, is_static: bool) -> Result<usize> {
        let index = (field as usize).wrapping_sub(1);
        match self.fields.get(index) {
            Some(f) if f.ty == ty && f.is_static == is_static => Ok(index),
            Some(f) => jni_bail!("mock: field {} accessed through the wrong entry point", f.name),
            None => jni_bail!("mock: invalid field id"),
        }
    }
    fn method(&self, method: jmethodID, ty: JniType, is_static: bool) -> Result<usize> {
        let index = (method as usize).wrapping_sub(1);
        match self.methods.get(index) {
            Some(m) if m.ret == ty && m.is_static == is_static => Ok(index),
            Some(m) => jni_bail!("mock: method {} called through the wrong entry point", m.name),
            None => jni_bail!("mock: invalid method id"),
        }
    }

    fn run(&mut self, method: usize, args: &[jvalue]) -> Result<jvalue> {
        let ret = self.methods[method].ret;
        let behavior = self.methods[method].behavior.clone();
        Ok(match behavior {
            Behavior::Return(p) => p.java_value(),
            Behavior::ReturnString(s) => {
                let id = self.add_object(MockObject::String(s.to_string()));
                jvalue { l: self.new_ref(id, RefKind::Local) }
            }
            Behavior::ReturnInstance(class) => {
                let class = self.classes[class];
                let id = self.new_instance(class);
                jvalue { l: self.new_ref(id, RefKind::Local) }
            }
            Behavior::ReturnArray(data) => {
                let id = self.add_object(MockObject::Array(data));
                jvalue { l: self.new_ref(id, RefKind::Local) }
            }
            Behavior::ReturnObjectArray(class, len) => {
                let class = self.classes[class];
                let elements = (0..len).map(|_| Some(self.new_instance(class))).collect();
                let id = self.add_object(MockObject::ObjectArray { class, elements });
                jvalue { l: self.new_ref(id, RefKind::Local) }
            }
            Behavior::ReturnNull | Behavior::ReturnVoid => jvalue { l: std::ptr::null_mut() },
            Behavior::ReturnArg(i) => {
                let slot = self.jvalue_to_slot(ret, args[i])?;
                self.slot_to_jvalue(slot)
            }
            Behavior::Throw(description) => {
                let id = self.add_object(MockObject::Throwable(description.to_string()));
                self.pending = Some(id);
                jvalue { j: 0 }
            }
        })
    }

    fn find_member<T>(
        &self,
        list: &[T],
        class: jclass,
        matches: impl Fn(&T, usize) -> bool,
    ) -> Result<Option<usize>> {
        let class = self.deref(class)?;
        Ok(list.iter().position(|m| matches(m, class)).map(|i| i + 1))
    }
}

/// A mock JVM, shared between the engine under test and the test itself.
///
/// It holds the classes `TestClass` and `TestSubClass` (plus `java/lang/Object` and
/// `java/lang/String`). For every type `T` in `boolean byte char short int long float double
/// string class` and the arrays of those (`booleanarray`, ..., `classarray`, except strings),
/// `TestClass` has an instance field `vT`, a static field `svT`, an instance method `mvT` and a
/// static method `smvT` returning a fixed value. Array classes are created on lookup.
#[derive(Clone)]
pub(crate) struct MockJvm {
    state: Arc<Mutex<MockState>>,
}

const TYPES: &[(&str, &str)] = &[
    ("boolean", "Z"),
    ("byte", "B"),
    ("char", "C"),
    ("short", "S"),
    ("int", "I"),
    ("long", "J"),
    ("float", "F"),
    ("double", "D"),
    ("string", "Ljava/lang/String;"),
    ("class", "LTestSubClass;"),
    ("booleanarray", "[Z"),
    ("bytearray", "[B"),
    ("chararray", "[C"),
    ("shortarray", "[S"),
    ("intarray", "[I"),
    ("longarray", "[J"),
    ("floatarray", "[F"),
    ("doublearray", "[D"),
    ("classarray", "[LTestSubClass;"),
];

fn fixed_value(name: &str) -> Behavior {
    match name {
        "boolean" => Behavior::Return(Primitive::Boolean(true)),
        "byte" => Behavior::Return(Primitive::Byte(8)),
        "char" => Behavior::Return(Primitive::Char('c' as u16)),
        "short" => Behavior::Return(Primitive::Short(16)),
        "int" => Behavior::Return(Primitive::Int(42)),
        "long" => Behavior::Return(Primitive::Long(64)),
        "float" => Behavior::Return(Primitive::Float(3.5)),
        "double" => Behavior::Return(Primitive::Double(6.25)),
        "string" => Behavior::ReturnString("hello"),
        "class" => Behavior::ReturnInstance("TestSubClass"),
        "booleanarray" => Behavior::ReturnArray(ArrayData::Boolean(vec![true, false])),
        "bytearray" => Behavior::ReturnArray(ArrayData::Byte(vec![1, 2])),
        "chararray" => Behavior::ReturnArray(ArrayData::Char(vec!['a' as u16, 'b' as u16])),
        "shortarray" => Behavior::ReturnArray(ArrayData::Short(vec![3, 4])),
        "intarray" => Behavior::ReturnArray(ArrayData::Int(vec![1, 2, 3])),
        "longarray" => Behavior::ReturnArray(ArrayData::Long(vec![5, 6])),
        "floatarray" => Behavior::ReturnArray(ArrayData::Float(vec![1.5, 2.5])),
        "doublearray" => Behavior::ReturnArray(ArrayData::Double(vec![0.25, 0.5])),
        "classarray" => Behavior::ReturnObjectArray("TestSubClass", 2),
        _ => unreachable!(),
    }
}

impl MockJvm {
    pub(crate) fn new() -> Self {
        let mut state = MockState::default();
        let object = state.add_class("java/lang/Object");
        state.add_class("java/lang/String");
        let test = state.add_class("TestClass");
        let sub = state.add_class("TestSubClass");

        for (name, sig) in TYPES {
            let getter = format!("(){sig}");
            state.add_field(test, &format!("v{name}"), sig, false);
            state.add_field(test, &format!("sv{name}"), sig, true);
            state.add_method(test, &format!("mv{name}"), &getter, false, fixed_value(name));
            state.add_method(test, &format!("smv{name}"), &getter, true, fixed_value(name));
        }
        let methods = [
            ("mvvoid", "()V", false, Behavior::ReturnVoid),
            ("smvvoid", "()V", true, Behavior::ReturnVoid),
            ("mvnull", "()Ljava/lang/Object;", false, Behavior::ReturnNull),
            ("mvthrow", "()I", false, Behavior::Throw("java.lang.IllegalStateException: boom")),
            ("smvthrow", "()V", true, Behavior::Throw("java.lang.RuntimeException")),
            ("echoint", "(I)I", false, Behavior::ReturnArg(0)),
            ("echoobject", "(Ljava/lang/Object;)Ljava/lang/Object;", false, Behavior::ReturnArg(0)),
            ("echostring", "(Ljava/lang/String;)Ljava/lang/String;", false, Behavior::ReturnArg(0)),
            ("echoarray", "([I)[I", true, Behavior::ReturnArg(0)),
            ("toString", "()Ljava/lang/String;", false, Behavior::ReturnString("TestClass")),
            ("<init>", "()V", false, Behavior::ReturnVoid),
            ("<init>", "(I)V", false, Behavior::ReturnVoid),
            ("<init>", "(Z)V", false, Behavior::Throw("java.lang.IllegalArgumentException: no")),
        ];
        for (name, sig, is_static, behavior) in methods {
            state.add_method(test, name, sig, is_static, behavior);
        }

        state.add_field(sub, "name", "Ljava/lang/String;", false);
        state.add_method(sub, "<init>", "()V", false, Behavior::ReturnVoid);
        let to_string = Behavior::ReturnString("TestSubClass");
        state.add_method(sub, "toString", "()Ljava/lang/String;", false, to_string);
        state.add_method(object, "<init>", "()V", false, Behavior::ReturnVoid);

        MockJvm { state: Arc::new(Mutex::new(state)) }
    }

    /// Returns the names of the JNI functions called so far.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }
    /// Returns the names of the typed entry points (`Get*Field`, `Call*Method`, ...) called.
    pub(crate) fn entry_calls(&self) -> Vec<String> {
        let entries: Vec<String> = JniType::ALL
            .iter()
            .flat_map(|ty| CallKind::ALL.iter().map(move |kind| kind.jni_function(*ty)))
            .collect();
        self.calls().into_iter().filter(|c| entries.contains(c)).collect()
    }
    pub(crate) fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Returns the number of live global references.
    pub(crate) fn live_globals(&self) -> usize {
        self.state.lock().refs.values().filter(|(_, kind)| *kind == RefKind::Global).count()
    }
    /// Returns the number of live local references.
    pub(crate) fn live_locals(&self) -> usize {
        self.state.lock().refs.values().filter(|(_, kind)| *kind == RefKind::Local).count()
    }
    /// Returns the number of `DeleteGlobalRef` calls on references that were not live.
    pub(crate) fn invalid_releases(&self) -> usize {
        self.state.lock().invalid_releases
    }
    pub(crate) fn has_pending_exception(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Returns a permanent reference to `TestClass`, without recording a call.
    pub(crate) fn test_class(&self) -> jclass {
        let mut state = self.state.lock();
        let id = state.classes["TestClass"];
        state.new_ref(id, RefKind::Global)
    }
    /// Returns the id of a static field of `TestClass`, without recording a call.
    pub(crate) fn static_field_id(&self, _class: jclass, name: &str) -> jfieldID {
        let state = self.state.lock();
        let index = state.fields.iter().position(|f| f.name == name && f.is_static);
        (index.expect("no such mock field") + 1) as jfieldID
    }
}

impl NativeInterface for MockJvm {
    fn attach_current_thread(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.record("AttachCurrentThread");
        Ok(())
    }

    fn find_class(&self, name: &str) -> Result<Option<jclass>> {
        let mut state = self.state.lock();
        state.record("FindClass");
        let id = match state.classes.get(name).copied() {
            Some(id) => id,
            None if name.starts_with('[') => state.add_class(name),
            None => return Ok(None),
        };
        Ok(Some(state.new_ref(id, RefKind::Local)))
    }
    fn get_method_id(&self, class: jclass, name: &str, sig: &str) -> Result<Option<jmethodID>> {
        let mut state = self.state.lock();
        state.record("GetMethodID");
        let found = state.find_member(&state.methods, class, |m, class| {
            m.class == class && m.name == name && m.sig == sig && !m.is_static
        })?;
        Ok(found.map(|i| i as jmethodID))
    }
    fn get_static_method_id(
        &self,
        class: jclass,
        name: &str,
        sig: &str,
    ) -> Result<Option<jmethodID>> {
        let mut state = self.state.lock();
        state.record("GetStaticMethodID");
        let found = state.find_member(&state.methods, class, |m, class| {
            m.class == class && m.name == name && m.sig == sig && m.is_static
        })?;
        Ok(found.map(|i| i as jmethodID))
    }
    fn get_field_id(&self, class: jclass, name: &str, sig: &str) -> Result<Option<jfieldID>> {
        let mut state = self.state.lock();
        state.record("GetFieldID");
        let found = state.find_member(&state.fields, class, |f, class| {
            f.class == class && f.name == name && f.sig == sig && !f.is_static
        })?;
        Ok(found.map(|i| i as jfieldID))
    }
    fn get_static_field_id(
        &self,
        class: jclass,
        name: &str,
        sig: &str,
    ) -> Result<Option<jfieldID>> {
        let mut state = self.state.lock();
        state.record("GetStaticFieldID");
        let found = state.find_member(&state.fields, class, |f, class| {
            f.class == class && f.name == name && f.sig == sig && f.is_static
        })?;
        Ok(found.map(|i| i as jfieldID))
    }

    fn new_object(&self, class: jclass, ctor: jmethodID, args: &[jvalue]) -> Result<jobject> {
        let mut state = self.state.lock();
        state.record("NewObject");
        let class = state.deref(class)?;
        let ctor = state.method(ctor, JniType::Void, false)?;
        jni_assert!(state.methods[ctor].name == "<init>", "mock: not a constructor");
        state.run(ctor, args)?;
        if state.pending.is_some() {
            return Ok(std::ptr::null_mut());
        }
        let id = state.new_instance(class);
        Ok(state.new_ref(id, RefKind::Local))
    }

    fn is_instance_of(&self, obj: jobject, class: jclass) -> Result<bool> {
        let mut state = self.state.lock();
        state.record("IsInstanceOf");
        let id = match state.deref_nullable(obj)? {
            Some(id) => id,
            None => return Ok(true),
        };
        let target = state.class_name(state.deref(class)?).to_string();
        if target == "java/lang/Object" {
            return Ok(true);
        }
        Ok(match &state.objects[id] {
            MockObject::Instance { class, .. } => state.class_name(*class) == target,
            MockObject::String(_) => target == "java/lang/String",
            MockObject::Array(data) => target == data.signature(),
            MockObject::ObjectArray { class, .. } => {
                target == "[Ljava/lang/Object;"
                    || target == format!("[L{};", state.class_name(*class))
            }
            MockObject::Class(_) => target == "java/lang/Class",
            MockObject::Throwable(_) => false,
        })
    }

    fn new_global_ref(&self, obj: jobject) -> Result<jobject> {
        let mut state = self.state.lock();
        state.record("NewGlobalRef");
        let id = state.deref(obj)?;
        Ok(state.new_ref(id, RefKind::Global))
    }
    fn delete_global_ref(&self, obj: jobject) -> Result<()> {
        let mut state = self.state.lock();
        state.record("DeleteGlobalRef");
        match state.refs.get(&(obj as usize)) {
            Some((_, RefKind::Global)) => {
                state.refs.remove(&(obj as usize));
                Ok(())
            }
            _ => {
                state.invalid_releases += 1;
                jni_bail!("mock: {obj:?} is not a live global reference")
            }
        }
    }
    fn delete_local_ref(&self, obj: jobject) -> Result<()> {
        let mut state = self.state.lock();
        state.record("DeleteLocalRef");
        match state.refs.get(&(obj as usize)) {
            Some((_, RefKind::Local)) => {
                state.refs.remove(&(obj as usize));
                Ok(())
            }
            _ => jni_bail!("mock: {obj:?} is not a live local reference"),
        }
    }

    fn take_exception(&self, _describe: bool) -> Result<Option<String>> {
        let mut state = self.state.lock();
        state.record("ExceptionCheck");
        match state.pending.take() {
            Some(id) => match &state.objects[id] {
                MockObject::Throwable(description) => Ok(Some(description.clone())),
                _ => jni_bail!("mock: pending exception is not a throwable"),
            },
            None => Ok(None),
        }
    }

    fn get_field(&self, obj: jobject, field: jfieldID, ty: JniType) -> Result<jvalue> {
        let mut state = self.state.lock();
        state.record(CallKind::GetField.jni_function(ty));
        let field = state.field(field, ty, false)?;
        let id = state.deref(obj)?;
        let slot = match &state.objects[id] {
            MockObject::Instance { fields, .. } => match fields.get(&field) {
                Some(slot) => *slot,
                None => jni_bail!("mock: field does not belong to the object's class"),
            },
            _ => jni_bail!("mock: not an instance"),
        };
        Ok(state.slot_to_jvalue(slot))
    }
    fn set_field(&self, obj: jobject, field: jfieldID, ty: JniType, value: jvalue) -> Result<()> {
        let mut state = self.state.lock();
        state.record(CallKind::SetField.jni_function(ty));
        let field = state.field(field, ty, false)?;
        let id = state.deref(obj)?;
        let new_slot = state.jvalue_to_slot(ty, value)?;
        match &mut state.objects[id] {
            MockObject::Instance { fields, .. } => match fields.get_mut(&field) {
                Some(slot) => *slot = new_slot,
                None => jni_bail!("mock: field does not belong to the object's class"),
            },
            _ => jni_bail!("mock: not an instance"),
        }
        Ok(())
    }
    fn get_static_field(&self, class: jclass, field: jfieldID, ty: JniType) -> Result<jvalue> {
        let mut state = self.state.lock();
        state.record(CallKind::GetStaticField.jni_function(ty));
        let field = state.field(field, ty, true)?;
        jni_assert!(state.deref(class)? == state.fields[field].class, "mock: wrong class");
        let slot = state.fields[field].static_value;
        Ok(state.slot_to_jvalue(slot))
    }
    fn set_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        ty: JniType,
        value: jvalue,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.record(CallKind::SetStaticField.jni_function(ty));
        let field = state.field(field, ty, true)?;
        jni_assert!(state.deref(class)? == state.fields[field].class, "mock: wrong class");
        let slot = state.jvalue_to_slot(ty, value)?;
        state.fields[field].static_value = slot;
        Ok(())
    }
    fn call_method(
        &self,
        obj: jobject,
        method: jmethodID,
        ty: JniType,
        args: &[jvalue],
    ) -> Result<jvalue> {
        let mut state = self.state.lock();
        state.record(CallKind::CallMethod.jni_function(ty));
        let method = state.method(method, ty, false)?;
        state.deref(obj)?;
        state.run(method, args)
    }
    fn call_static_method(
        &self,
        class: jclass,
        method: jmethodID,
        ty: JniType,
        args: &[jvalue],
    ) -> Result<jvalue> {
        let mut state = self.state.lock();
        state.record(CallKind::CallStaticMethod.jni_function(ty));
        let method = state.method(method, ty, true)?;
        jni_assert!(state.deref(class)? == state.methods[method].class, "mock: wrong class");
        state.run(method, args)
    }

    fn new_string(&self, value: &str) -> Result<jobject> {
        let mut state = self.state.lock();
        state.record("NewStringUTF");
        let id = state.add_object(MockObject::String(value.to_string()));
        Ok(state.new_ref(id, RefKind::Local))
    }
    fn get_string(&self, string: jobject) -> Result<String> {
        let mut state = self.state.lock();
        state.record("GetStringUTFChars");
        let id = state.deref(string)?;
        match &state.objects[id] {
            MockObject::String(s) => Ok(s.clone()),
            _ => jni_bail!("mock: not a string"),
        }
    }

    fn new_primitive_array(&self, data: &ArrayData) -> Result<jobject> {
        let mut state = self.state.lock();
        state.record("NewArray");
        let id = state.add_object(MockObject::Array(data.clone()));
        Ok(state.new_ref(id, RefKind::Local))
    }
    fn new_object_array(&self, element_class: jclass, elements: &[jobject]) -> Result<jobject> {
        let mut state = self.state.lock();
        state.record("NewObjectArray");
        let class = state.deref(element_class)?;
        let elements = elements
            .iter()
            .map(|e| state.deref_nullable(*e))
            .collect::<Result<Vec<_>>>()?;
        let id = state.add_object(MockObject::ObjectArray { class, elements });
        Ok(state.new_ref(id, RefKind::Local))
    }
    fn array_length(&self, array: jobject) -> Result<usize> {
        let mut state = self.state.lock();
        state.record("GetArrayLength");
        let id = state.deref(array)?;
        match &state.objects[id] {
            MockObject::Array(data) => Ok(data.len()),
            MockObject::ObjectArray { elements, .. } => Ok(elements.len()),
            _ => jni_bail!("mock: not an array"),
        }
    }
    fn get_array_region(
        &self,
        array: jobject,
        element: Tag,
        start: usize,
        len: usize,
    ) -> Result<ArrayData> {
        let mut state = self.state.lock();
        state.record("GetArrayRegion");
        let id = state.deref(array)?;
        match &state.objects[id] {
            MockObject::Array(data) if data.element_tag() == element => {
                match slice(data, start, len) {
                    Some(data) => Ok(data),
                    None => jni_bail!("mock: ArrayIndexOutOfBoundsException"),
                }
            }
            _ => jni_bail!("mock: not a {element} array"),
        }
    }
    fn get_object_array_element(&self, array: jobject, index: usize) -> Result<jobject> {
        let mut state = self.state.lock();
        state.record("GetObjectArrayElement");
        let id = state.deref(array)?;
        let element = match &state.objects[id] {
            MockObject::ObjectArray { elements, .. } => match elements.get(index) {
                Some(element) => *element,
                None => jni_bail!("mock: ArrayIndexOutOfBoundsException"),
            },
            _ => jni_bail!("mock: not an object array"),
        };
        Ok(match element {
            Some(id) => state.new_ref(id, RefKind::Local),
            None => std::ptr::null_mut(),
        })
    }
}
