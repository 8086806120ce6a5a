//! Declaration specs.
//!
//! Every spec is built through a consuming builder and is immutable once
//! built. `to_builder()` copies a spec into a fresh builder.
//!
//! - [`TypeSpec`] - classes, structs, interfaces, enums, attribute classes
//!   and anonymous types
//! - [`FieldSpec`], [`MethodSpec`], [`PropertySpec`] - members
//! - [`ParameterSpec`] - method and indexer parameters
//! - [`AttributeSpec`] - `[Attribute(...)]` applications

mod attribute;
mod field;
mod method;
mod parameter;
mod property;
mod type_spec;

pub use attribute::{AttributeSpec, AttributeSpecBuilder};
pub use field::{FieldSpec, FieldSpecBuilder};
pub use method::{MethodKind, MethodSpec, MethodSpecBuilder};
pub use parameter::{ParameterSpec, ParameterSpecBuilder};
pub use property::{PropertySpec, PropertySpecBuilder};
pub use type_spec::{TypeSpec, TypeSpecBuilder};
