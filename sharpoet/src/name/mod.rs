//! Type references.
//!
//! A [`TypeName`] is what a `$T` placeholder renders. The writer decides
//! whether each [`ClassName`] inside it is written short or fully
//! qualified; keywords and type variables are always written as-is.

mod class_name;
mod type_variable;

use std::fmt;

pub use class_name::ClassName;
pub use type_variable::TypeVariableName;

/// A reference to any C# type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// A built-in type keyword (`int`, `string`, `void`, ...).
    Keyword(&'static str),
    /// A named type.
    Class(ClassName),
    /// A constructed generic type, for example `List<int>`.
    Generic { raw: ClassName, args: Vec<TypeName> },
    /// A single-dimensional array.
    Array(Box<TypeName>),
    /// A nullable type, written with a trailing `?`.
    Nullable(Box<TypeName>),
    /// A generic type parameter.
    Variable(TypeVariableName),
}

impl TypeName {
    pub const VOID: Self = Self::Keyword("void");
    pub const BOOL: Self = Self::Keyword("bool");
    pub const BYTE: Self = Self::Keyword("byte");
    pub const SBYTE: Self = Self::Keyword("sbyte");
    pub const CHAR: Self = Self::Keyword("char");
    pub const SHORT: Self = Self::Keyword("short");
    pub const USHORT: Self = Self::Keyword("ushort");
    pub const INT: Self = Self::Keyword("int");
    pub const UINT: Self = Self::Keyword("uint");
    pub const LONG: Self = Self::Keyword("long");
    pub const ULONG: Self = Self::Keyword("ulong");
    pub const FLOAT: Self = Self::Keyword("float");
    pub const DOUBLE: Self = Self::Keyword("double");
    pub const DECIMAL: Self = Self::Keyword("decimal");
    pub const STRING: Self = Self::Keyword("string");
    pub const OBJECT: Self = Self::Keyword("object");

    /// Create an array type reference.
    pub fn array_of(component: impl Into<TypeName>) -> Self {
        Self::Array(Box::new(component.into()))
    }

    /// Create a nullable type reference.
    pub fn nullable(inner: impl Into<TypeName>) -> Self {
        Self::Nullable(Box::new(inner.into()))
    }

    /// Create a constructed generic type reference.
    pub fn generic(raw: ClassName, args: impl IntoIterator<Item = TypeName>) -> Self {
        Self::Generic {
            raw,
            args: args.into_iter().collect(),
        }
    }

    /// Check if this is a built-in keyword type.
    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    /// Check if this is `void`.
    pub fn is_void(&self) -> bool {
        *self == Self::VOID
    }

    /// Check if this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

impl From<ClassName> for TypeName {
    fn from(class: ClassName) -> Self {
        Self::Class(class)
    }
}

impl From<&ClassName> for TypeName {
    fn from(class: &ClassName) -> Self {
        Self::Class(class.clone())
    }
}

impl From<TypeVariableName> for TypeName {
    fn from(variable: TypeVariableName) -> Self {
        Self::Variable(variable)
    }
}

impl From<&TypeName> for TypeName {
    fn from(ty: &TypeName) -> Self {
        ty.clone()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => f.write_str(keyword),
            Self::Class(class) => write!(f, "{class}"),
            Self::Generic { raw, args } => {
                write!(f, "{raw}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Array(component) => write!(f, "{component}[]"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
            Self::Variable(variable) => write!(f, "{variable}"),
        }
    }
}
