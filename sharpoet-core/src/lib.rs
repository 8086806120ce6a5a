//! Core catalog and collaborators for sharpoet.
//!
//! This crate holds the data the emission engine consumes as lookup
//! tables (modifiers, declaration-kind rules, identifier rules) and the
//! collaborators around it (formatting configuration, generated-file
//! writing).

mod config;
mod file;
mod indent;
mod kind;
mod modifier;
mod naming;

// Configuration
pub use config::FormatConfig;
// File operations
pub use file::{GeneratedFile, Overwrite, WriteResult, write_file};
pub use indent::Indent;
// Declaration rules
pub use kind::{MemberKind, ModifierError, TypeKind, validate_member};
pub use modifier::Modifier;
// Identifier utilities
pub use naming::{is_keyword, is_operator_token, is_valid_identifier, is_valid_namespace};
