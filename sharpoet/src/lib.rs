//! Build C# declarations in memory and emit them as formatted source.
//!
//! A [`CSharpFile`] holds one top-level [`TypeSpec`]. Rendering it runs the
//! writer twice: the first pass records which referenced types can be
//! imported under their simple names, the second writes the text with the
//! `using` directives that pass chose. Two different types that share a
//! simple name are both written fully qualified.
//!
//! # Module Organization
//!
//! - [`code`] - Format strings with `$` placeholders ([`CodeBlock`])
//! - [`name`] - Type references ([`TypeName`], [`ClassName`])
//! - [`spec`] - Declarations (types, members, parameters, attributes)
//! - [`file`] - Compilation units and writing them to disk
//!
//! Modifiers, declaration kinds and layout options come from
//! [`sharpoet_core`] and are re-exported here.

pub mod code;
mod error;
pub mod file;
pub mod name;
pub mod spec;
mod writer;

pub use code::{Arg, CodeBlock, CodeBlockBuilder};
pub use error::{Error, Result};
pub use file::{CSharpFile, CSharpFileBuilder};
pub use name::{ClassName, TypeName, TypeVariableName};
pub use sharpoet_core::{
    FormatConfig, GeneratedFile, Indent, MemberKind, Modifier, Overwrite, TypeKind, WriteResult,
};
pub use spec::{
    AttributeSpec, AttributeSpecBuilder, FieldSpec, FieldSpecBuilder, MethodKind, MethodSpec,
    MethodSpecBuilder, ParameterSpec, ParameterSpecBuilder, PropertySpec, PropertySpecBuilder,
    TypeSpec, TypeSpecBuilder,
};
