//! Fully qualified references to named types.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use sharpoet_core::{is_valid_identifier, is_valid_namespace};

use crate::{Error, Result};

/// A reference to a named type: a namespace, an optional enclosing type and a simple name.
///
/// Equality, hashing and ordering only look at the canonical name, so
/// `ClassName::parse("App.Outer+Inner")` and
/// `ClassName::new("App", "Outer").nested_class("Inner")` are the same type.
#[derive(Debug, Clone)]
pub struct ClassName {
    namespace: String,
    enclosing: Option<Box<ClassName>>,
    simple: String,
    canonical: String,
}

impl ClassName {
    /// Create a top-level type reference. An empty namespace is the global namespace.
    pub fn new(namespace: impl Into<String>, simple: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let simple = simple.into();
        let canonical = if namespace.is_empty() {
            simple.clone()
        } else {
            format!("{namespace}.{simple}")
        };
        Self {
            namespace,
            enclosing: None,
            simple,
            canonical,
        }
    }

    /// Create a reference to a type nested in this one.
    pub fn nested_class(&self, simple: impl Into<String>) -> Self {
        let simple = simple.into();
        Self {
            namespace: self.namespace.clone(),
            canonical: format!("{}.{simple}", self.canonical),
            enclosing: Some(Box::new(self.clone())),
            simple,
        }
    }

    /// Parse a dotted (`System.IO.Stream`) or reflection-style (`App.Outer+Inner`) name.
    ///
    /// The last dotted segment before any `+` is the top-level type. Parsing
    /// never fails; malformed names are reported by [`ClassName::validate`].
    pub fn parse(name: &str) -> Self {
        let mut segments = name.split('+');
        let head = segments.next().unwrap_or_default();
        let top = match head.rsplit_once('.') {
            Some((namespace, simple)) => Self::new(namespace, simple),
            None => Self::new("", head),
        };
        segments.fold(top, |outer, simple| outer.nested_class(simple))
    }

    /// Get the namespace, empty for the global namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the unqualified name of this type.
    pub fn simple_name(&self) -> &str {
        &self.simple
    }

    /// The dotted name, for example `App.Outer.Inner`.
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// The enclosing type, if this type is nested.
    pub fn enclosing(&self) -> Option<&ClassName> {
        self.enclosing.as_deref()
    }

    /// The outermost enclosing type, or this type when it is top-level.
    pub fn top_level(&self) -> &ClassName {
        match &self.enclosing {
            Some(enclosing) => enclosing.top_level(),
            None => self,
        }
    }

    /// Simple names from the top-level type down to this one.
    pub fn simple_names(&self) -> Vec<&str> {
        let mut names = match &self.enclosing {
            Some(enclosing) => enclosing.simple_names(),
            None => Vec::new(),
        };
        names.push(&self.simple);
        names
    }

    /// The name with nested types joined by `+`, as the runtime reports it.
    pub fn reflection_name(&self) -> String {
        match &self.enclosing {
            Some(enclosing) => format!("{}+{}", enclosing.reflection_name(), self.simple),
            None => self.canonical.clone(),
        }
    }

    /// Check that every segment of the reference is a legal identifier.
    pub fn validate(&self) -> Result<()> {
        if !self.namespace.is_empty() && !is_valid_namespace(&self.namespace) {
            return Err(Error::invalid_reference(
                &self.canonical,
                format!("'{}' is not a valid namespace", self.namespace),
            ));
        }
        for simple in self.simple_names() {
            if simple.is_empty() {
                return Err(Error::invalid_reference(&self.canonical, "empty simple name"));
            }
            if !is_valid_identifier(simple) {
                return Err(Error::invalid_reference(
                    &self.canonical,
                    format!("'{simple}' is not a valid identifier"),
                ));
            }
        }
        Ok(())
    }
}

impl PartialEq for ClassName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ClassName {}

impl Hash for ClassName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for ClassName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_and_reflection_forms_are_equal() {
        let built = ClassName::new("App.Models", "Outer").nested_class("Inner");
        let parsed = ClassName::parse("App.Models.Outer+Inner");

        assert_eq!(built, parsed);
        assert_eq!(parsed.canonical_name(), "App.Models.Outer.Inner");
        assert_eq!(parsed.reflection_name(), "App.Models.Outer+Inner");
        assert_eq!(parsed.namespace(), "App.Models");
        assert_eq!(parsed.simple_names(), vec!["Outer", "Inner"]);
    }

    #[test]
    fn test_top_level_and_enclosing() {
        let entry = ClassName::parse("System.Collections.Generic.Dictionary+Entry+Key");
        assert_eq!(entry.top_level().canonical_name(), "System.Collections.Generic.Dictionary");
        assert_eq!(entry.enclosing().unwrap().simple_name(), "Entry");
        assert!(entry.top_level().enclosing().is_none());
    }

    #[test]
    fn test_global_namespace() {
        let player = ClassName::parse("Player");
        assert_eq!(player.namespace(), "");
        assert_eq!(player.canonical_name(), "Player");
        assert!(player.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_names() {
        let err = ClassName::parse("System.").validate().unwrap_err();
        assert_eq!(
            err,
            Error::invalid_reference("System.", "empty simple name")
        );

        assert!(ClassName::new("Bad..Ns", "Point").validate().is_err());
        assert!(ClassName::new("App", "class").validate().is_err());
        assert!(ClassName::new("App", "@class").validate().is_ok());
    }

    #[test]
    fn test_ordering_uses_canonical_name() {
        let mut names = vec![
            ClassName::parse("System.IO.Stream"),
            ClassName::parse("Newtonsoft.Json.Linq.JObject"),
            ClassName::parse("System.Collections.Generic.List"),
        ];
        names.sort();
        let canonical: Vec<_> = names.iter().map(ClassName::canonical_name).collect();
        assert_eq!(
            canonical,
            vec![
                "Newtonsoft.Json.Linq.JObject",
                "System.Collections.Generic.List",
                "System.IO.Stream"
            ]
        );
    }
}
