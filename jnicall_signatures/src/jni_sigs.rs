use crate::*;
use pest::error::{Error, InputLocation};
use pest_consume::{match_nodes, Parser};
use std::fmt::{Display, Formatter, Write};

/// The maximum number of array dimensions a JVM type descriptor may have.
const MAX_ARRAY_DIM: usize = 255;

#[derive(Parser)]
#[grammar = "jni_signature.pest"]
struct JniParser;
type Result<T> = std::result::Result<T, Error<Rule>>;
type Node<'i> = pest_consume::Node<'i, Rule, ()>;

#[pest_consume::parser]
impl JniParser {
    fn ident(input: Node) -> Result<&str> {
        Ok(input.as_str())
    }

    fn path(input: Node) -> Result<ClassName> {
        Ok(match_nodes!(input.children();
            [ident(names)..] => {
                let mut package: Vec<_> = names.collect();
                match package.pop() {
                    Some(name) => ClassName::new(package, name),
                    None => return Err(input.error("empty class name")),
                }
            },
        ))
    }

    fn ty(input: Node) -> Result<Type> {
        let ty = match_nodes!(input.children();
            [ty_array_head(dims).., ty_prim(prim)] => Type::new(prim).array_dim(dims.count()),
            [ty_array_head(dims).., ty_class(class)] =>
                Type::new(BasicType::Class(class)).array_dim(dims.count()),
        );
        if ty.array_dim > MAX_ARRAY_DIM {
            return Err(input.error(format!("array has more than {MAX_ARRAY_DIM} dimensions")));
        }
        Ok(ty)
    }
    fn ty_prim(input: Node) -> Result<BasicType> {
        match Tag::of(input.as_str()).and_then(BasicType::primitive) {
            Some(prim) => Ok(prim),
            None => Err(input.error("not a primitive type")),
        }
    }
    fn ty_class(input: Node) -> Result<ClassName> {
        Ok(match_nodes!(input.children();
            [path(path)] => path,
        ))
    }
    fn ty_array_head(_input: Node) -> Result<()> {
        Ok(())
    }
    fn ty_void(_input: Node) -> Result<()> {
        Ok(())
    }

    fn sig(input: Node) -> Result<MethodSig> {
        Ok(match_nodes!(input.children();
            [ty(params).., sig_ret(ret_ty)] => {
                MethodSig { ret_ty, params: params.collect() }
            },
        ))
    }
    fn sig_ret(input: Node) -> Result<ReturnType> {
        Ok(match_nodes!(input.children();
            [ty(ty)] => ReturnType::Ty(ty),
            [ty_void(_)] => ReturnType::Void,
        ))
    }

    fn full_ty(input: Node) -> Result<Type> {
        Ok(match_nodes!(input.children();
            [ty(ty), EOI(_)] => ty,
        ))
    }
    fn full_sig(input: Node) -> Result<MethodSig> {
        Ok(match_nodes!(input.children();
            [sig(sig), EOI(_)] => sig,
        ))
    }
    fn full_path(input: Node) -> Result<ClassName> {
        Ok(match_nodes!(input.children();
            [path(path), EOI(_)] => path,
        ))
    }
    fn EOI(_input: Node) -> Result<()> {
        Ok(())
    }
}

/// An error encountered while parsing a JNI descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    input: String,
    message: String,
    position: usize,
}
impl ParseError {
    fn from_pest(input: &str, err: Error<Rule>) -> Self {
        let position = match err.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        let message = err.variant.message().into_owned();
        ParseError { input: input.to_string(), message, position }
    }

    pub(crate) fn custom(input: &str, message: impl Into<String>, position: usize) -> Self {
        ParseError { input: input.to_string(), message: message.into(), position }
    }

    /// Returns the descriptor that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the byte offset in the descriptor the error was detected at.
    pub fn position(&self) -> usize {
        self.position
    }
}
impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ParseError { input, message, position } = self;
        write!(f, "invalid descriptor {input:?} at offset {position}: {message}")
    }
}
impl std::error::Error for ParseError {}

fn parse<'a, T>(
    source: &'a str,
    rule: Rule,
    consume: fn(Node<'a>) -> Result<T>,
) -> std::result::Result<T, ParseError> {
    let parse = || -> Result<T> { consume(JniParser::parse(rule, source)?.single()?) };
    parse().map_err(|e| ParseError::from_pest(source, e))
}

impl<'a> MethodSig<'a> {
    /// Parses a method descriptor, e.g. `(ILjava/lang/String;)V`.
    pub fn parse_jni(source: &'a str) -> std::result::Result<Self, ParseError> {
        parse(source, Rule::full_sig, JniParser::full_sig)
    }
}
impl<'a> Type<'a> {
    /// Parses a field descriptor, e.g. `[I`.
    pub fn parse_jni(source: &'a str) -> std::result::Result<Self, ParseError> {
        parse(source, Rule::full_ty, JniParser::full_ty)
    }
}
impl<'a> ClassName<'a> {
    /// Parses a class name in internal form, e.g. `java/lang/String`.
    pub fn parse_jni(source: &'a str) -> std::result::Result<Self, ParseError> {
        parse(source, Rule::full_path, JniParser::full_path)
    }
}

/// Writes a value in JNI descriptor syntax.
trait WriteJni {
    fn write_jni(&self, f: &mut Formatter<'_>) -> std::fmt::Result;
}

struct Jni<'a, T: ?Sized>(&'a T);
impl<T: WriteJni + ?Sized> Display for Jni<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.write_jni(f)
    }
}

struct Internal<'a>(&'a ClassName<'a>);
impl Display for Internal<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for pkg in &self.0.package {
            f.write_str(pkg)?;
            f.write_char('/')?;
        }
        f.write_str(self.0.name)
    }
}

impl WriteJni for MethodSig<'_> {
    fn write_jni(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('(')?;
        for param in &self.params {
            param.write_jni(f)?;
        }
        f.write_char(')')?;
        self.ret_ty.write_jni(f)
    }
}
impl WriteJni for ReturnType<'_> {
    fn write_jni(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnType::Void => f.write_char('V'),
            ReturnType::Ty(ty) => ty.write_jni(f),
        }
    }
}
impl WriteJni for Type<'_> {
    fn write_jni(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.array_dim {
            f.write_char('[')?;
        }
        self.basic_sig.write_jni(f)
    }
}
impl WriteJni for BasicType<'_> {
    fn write_jni(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BasicType::Class(class) => class.write_jni(f),
            prim => f.write_char(prim.tag().as_char()),
        }
    }
}
impl WriteJni for ClassName<'_> {
    fn write_jni(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{};", Internal(self))
    }
}

macro_rules! display_jni {
    ($($ty:ident)*) => {$(
        impl<'a> $ty<'a> {
            /// Displays this value in JNI descriptor syntax.
            pub fn display_jni(&'a self) -> impl Display + 'a {
                Jni(self)
            }
        }
    )*};
}
display_jni!(MethodSig ReturnType Type BasicType ClassName);

impl<'a> ClassName<'a> {
    /// Displays this class name as a JNI internal name, e.g. `java/lang/String`. This is the
    /// form accepted by `FindClass`.
    pub fn display_internal(&'a self) -> impl Display + 'a {
        Internal(self)
    }
}
