use std::{
    fmt,
    hash::{Hash, Hasher},
};

use super::TypeName;

/// A generic type parameter such as `T`, with optional constraints.
///
/// Two variables are equal when their names are; bounds only affect the
/// `where` clause of the declaring type or method.
#[derive(Debug, Clone)]
pub struct TypeVariableName {
    name: String,
    bounds: Vec<TypeName>,
}

impl TypeVariableName {
    /// Create an unbounded type variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    /// Add a constraint, rendered as `where T : Bound`.
    pub fn bound(mut self, bound: impl Into<TypeName>) -> Self {
        self.bounds.push(bound.into());
        self
    }

    /// Get the variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the `where` constraints.
    pub fn bounds(&self) -> &[TypeName] {
        &self.bounds
    }
}

impl PartialEq for TypeVariableName {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeVariableName {}

impl Hash for TypeVariableName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for TypeVariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
