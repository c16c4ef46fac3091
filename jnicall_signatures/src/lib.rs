#![deny(unused_must_use)]

mod jni_sigs;
mod tags;

pub use jni_sigs::ParseError;
pub use tags::{parse_tag, Tag};

/// The signature of a given method.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct MethodSig<'a> {
    pub ret_ty: ReturnType<'a>,
    pub params: Vec<Type<'a>>,
}
impl<'a> MethodSig<'a> {
    /// Creates a new method signature.
    pub fn new(ret_ty: Type<'a>, params: Vec<Type<'a>>) -> Self {
        MethodSig { ret_ty: ReturnType::Ty(ret_ty), params }
    }

    /// Creates a new method signature that returns void.
    pub fn void(params: Vec<Type<'a>>) -> Self {
        MethodSig { ret_ty: ReturnType::Void, params }
    }
}

/// The return type of a given [`MethodSig`].
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum ReturnType<'a> {
    Void,
    Ty(Type<'a>),
}
impl<'a> ReturnType<'a> {
    /// Returns the dispatch tag of this return type.
    pub fn tag(&self) -> Tag {
        match self {
            ReturnType::Void => Tag::Void,
            ReturnType::Ty(ty) => ty.tag(),
        }
    }
}

/// A type signature to be used with JNI.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Type<'a> {
    pub basic_sig: BasicType<'a>,
    pub array_dim: usize,
}
#[allow(non_upper_case_globals)]
impl<'a> Type<'a> {
    pub const Byte: Type<'a> = Type::new(BasicType::Byte);
    pub const Short: Type<'a> = Type::new(BasicType::Short);
    pub const Int: Type<'a> = Type::new(BasicType::Int);
    pub const Long: Type<'a> = Type::new(BasicType::Long);
    pub const Float: Type<'a> = Type::new(BasicType::Float);
    pub const Double: Type<'a> = Type::new(BasicType::Double);
    pub const Boolean: Type<'a> = Type::new(BasicType::Boolean);
    pub const Char: Type<'a> = Type::new(BasicType::Char);

    /// Create a new type for a given basic type.
    pub const fn new(ty: BasicType<'a>) -> Self {
        Type { basic_sig: ty, array_dim: 0 }
    }

    /// Create a new class name.
    pub fn class(package: &[&'a str], name: &'a str) -> Self {
        Type::new(BasicType::Class(ClassName::new(package.to_vec(), name)))
    }

    /// Create a new type for an array.
    pub const fn array(mut self) -> Self {
        self.array_dim += 1;
        self
    }

    /// Create a new type for a multidimensional array.
    pub const fn array_dim(mut self, dims: usize) -> Self {
        self.array_dim += dims;
        self
    }

    /// Returns the dispatch tag of this type.
    ///
    /// Arrays are always tagged [`Tag::Array`], whatever their element type.
    pub fn tag(&self) -> Tag {
        if self.array_dim != 0 {
            Tag::Array
        } else {
            self.basic_sig.tag()
        }
    }

    /// Returns the element type of an array type, stripping a single dimension.
    pub fn element(&self) -> Option<Type<'a>> {
        if self.array_dim == 0 {
            None
        } else {
            Some(Type { basic_sig: self.basic_sig.clone(), array_dim: self.array_dim - 1 })
        }
    }

    /// Returns the class of a non-array object type.
    pub fn class_name(&self) -> Option<&ClassName<'a>> {
        match &self.basic_sig {
            BasicType::Class(class) if self.array_dim == 0 => Some(class),
            _ => None,
        }
    }

    /// Returns whether this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        self.array_dim == 0 && self.basic_sig.is_primitive()
    }

    /// Returns whether values of this type are passed as object references.
    pub fn is_reference(&self) -> bool {
        !self.is_primitive()
    }
}
impl<'a> From<ClassName<'a>> for Type<'a> {
    fn from(cn: ClassName<'a>) -> Self {
        Type::new(BasicType::Class(cn))
    }
}

/// A basic Java type.
///
/// This is a reference to a particular class or a non-array primitive. As arrays can be recursive,
/// [`Type`] is used to represent array dimensionality.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum BasicType<'a> {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Char,
    Class(ClassName<'a>),
}
impl<'a> BasicType<'a> {
    /// Returns the primitive type of a tag, if it has one.
    pub fn primitive(tag: Tag) -> Option<Self> {
        Some(match tag {
            Tag::Byte => BasicType::Byte,
            Tag::Short => BasicType::Short,
            Tag::Int => BasicType::Int,
            Tag::Long => BasicType::Long,
            Tag::Float => BasicType::Float,
            Tag::Double => BasicType::Double,
            Tag::Boolean => BasicType::Boolean,
            Tag::Char => BasicType::Char,
            Tag::Void | Tag::Array | Tag::Object => return None,
        })
    }

    /// Returns whether this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, BasicType::Class(_))
    }

    /// Returns the dispatch tag of this type.
    pub fn tag(&self) -> Tag {
        match self {
            BasicType::Byte => Tag::Byte,
            BasicType::Short => Tag::Short,
            BasicType::Int => Tag::Int,
            BasicType::Long => Tag::Long,
            BasicType::Float => Tag::Float,
            BasicType::Double => Tag::Double,
            BasicType::Boolean => Tag::Boolean,
            BasicType::Char => Tag::Char,
            BasicType::Class(_) => Tag::Object,
        }
    }
}

/// The name of a Java class, including its full package path.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct ClassName<'a> {
    pub package: Vec<&'a str>,
    pub name: &'a str,
}
impl<'a> ClassName<'a> {
    /// Create a new class name.
    pub fn new(package: impl Into<Vec<&'a str>>, name: &'a str) -> Self {
        ClassName { package: package.into(), name }
    }
}
