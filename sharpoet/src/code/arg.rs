use crate::{
    CodeBlock, TypeSpec,
    name::{ClassName, TypeName, TypeVariableName},
};

/// An argument substituted for a placeholder in a code block format string.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Text: a literal for `$L`, an identifier for `$N`, a string for `$S`.
    Text(String),
    /// `null`, accepted by `$S` and `$L`.
    Null,
    /// A nested code block for `$L`.
    Code(CodeBlock),
    /// A type for `$T`.
    Type(TypeName),
    /// An anonymous type declaration for `$L`.
    Declaration(Box<TypeSpec>),
}

impl Arg {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Null => "null",
            Self::Code(_) => "a code block",
            Self::Type(_) => "a type",
            Self::Declaration(_) => "a declaration",
        }
    }
}

/// Build an argument list from values of mixed types.
///
/// ```
/// use sharpoet::{ClassName, CodeBlock, args};
///
/// let math = ClassName::parse("System.Math");
/// let block = CodeBlock::of("return $T.Sqrt($L)", args![math, "x"]).unwrap();
/// assert_eq!(block.render().unwrap(), "return System.Math.Sqrt(x)");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Arg {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Option<&str>> for Arg {
    fn from(text: Option<&str>) -> Self {
        text.map_or(Self::Null, Self::from)
    }
}

macro_rules! text_args {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

text_args!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool, char);

impl From<ClassName> for Arg {
    fn from(class: ClassName) -> Self {
        Self::Type(class.into())
    }
}

impl From<&ClassName> for Arg {
    fn from(class: &ClassName) -> Self {
        Self::Type(class.into())
    }
}

impl From<TypeName> for Arg {
    fn from(ty: TypeName) -> Self {
        Self::Type(ty)
    }
}

impl From<&TypeName> for Arg {
    fn from(ty: &TypeName) -> Self {
        Self::Type(ty.clone())
    }
}

impl From<TypeVariableName> for Arg {
    fn from(variable: TypeVariableName) -> Self {
        Self::Type(variable.into())
    }
}

impl From<CodeBlock> for Arg {
    fn from(code: CodeBlock) -> Self {
        Self::Code(code)
    }
}

impl From<&CodeBlock> for Arg {
    fn from(code: &CodeBlock) -> Self {
        Self::Code(code.clone())
    }
}

impl From<TypeSpec> for Arg {
    fn from(spec: TypeSpec) -> Self {
        Self::Declaration(Box::new(spec))
    }
}
