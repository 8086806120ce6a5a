//! C# modifier keywords.

use std::fmt;

/// A C# modifier keyword.
///
/// Variants are declared in the order C# code conventionally spells them,
/// so iterating a `BTreeSet<Modifier>` yields `public static readonly`
/// rather than `readonly static public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Internal,
    Private,
    New,
    Static,
    Const,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Readonly,
    Volatile,
    Extern,
    Unsafe,
    Async,
    Partial,
    Implicit,
    Explicit,
    Operator,
    Ref,
    Out,
    In,
    Params,
    This,
}

impl Modifier {
    /// Access modifiers.
    pub const VISIBILITY: [Modifier; 4] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Internal,
        Modifier::Private,
    ];

    /// Modifiers that may appear on a parameter.
    pub const PARAMETER: [Modifier; 5] = [
        Modifier::Ref,
        Modifier::Out,
        Modifier::In,
        Modifier::Params,
        Modifier::This,
    ];

    /// The keyword spelling of this modifier.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::Private => "private",
            Self::New => "new",
            Self::Static => "static",
            Self::Const => "const",
            Self::Abstract => "abstract",
            Self::Virtual => "virtual",
            Self::Override => "override",
            Self::Sealed => "sealed",
            Self::Readonly => "readonly",
            Self::Volatile => "volatile",
            Self::Extern => "extern",
            Self::Unsafe => "unsafe",
            Self::Async => "async",
            Self::Partial => "partial",
            Self::Implicit => "implicit",
            Self::Explicit => "explicit",
            Self::Operator => "operator",
            Self::Ref => "ref",
            Self::Out => "out",
            Self::In => "in",
            Self::Params => "params",
            Self::This => "this",
        }
    }

    /// Check if this modifier is legal on a parameter.
    pub fn is_parameter_modifier(&self) -> bool {
        Self::PARAMETER.contains(self)
    }

    /// Check if this modifier is an access modifier.
    pub fn is_visibility(&self) -> bool {
        Self::VISIBILITY.contains(self)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_keyword() {
        assert_eq!(Modifier::Public.keyword(), "public");
        assert_eq!(Modifier::Readonly.to_string(), "readonly");
        assert_eq!(Modifier::Params.keyword(), "params");
    }

    #[test]
    fn test_set_iterates_in_csharp_order() {
        let set: BTreeSet<_> = [
            Modifier::Operator,
            Modifier::Explicit,
            Modifier::Static,
            Modifier::Public,
        ]
        .into_iter()
        .collect();
        let spelled: Vec<_> = set.iter().map(Modifier::keyword).collect();
        assert_eq!(spelled, vec!["public", "static", "explicit", "operator"]);
    }

    #[test]
    fn test_groups() {
        assert!(Modifier::Out.is_parameter_modifier());
        assert!(!Modifier::Static.is_parameter_modifier());
        assert!(Modifier::Internal.is_visibility());
        assert!(!Modifier::Sealed.is_visibility());
    }
}
