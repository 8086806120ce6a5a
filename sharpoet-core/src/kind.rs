//! Declaration kinds and the per-kind member rule table.
//!
//! The emission engine never computes which modifiers are implied by a
//! declaration kind; it looks them up here.

use std::{collections::BTreeSet, fmt};

use thiserror::Error;

use crate::Modifier;

/// The kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    /// An attribute class (the annotation-like kind).
    Attribute,
}

/// The kind of a member attached to a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Property,
    Type,
}

const NONE: &[Modifier] = &[];
const PUBLIC: &[Modifier] = &[Modifier::Public];
const PUBLIC_ABSTRACT: &[Modifier] = &[Modifier::Public, Modifier::Abstract];

impl TypeKind {
    /// Keyword introducing the declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Class | Self::Attribute => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
        }
    }

    /// Modifiers implied on fields declared in this kind.
    pub fn implicit_field_modifiers(&self) -> &'static [Modifier] {
        match self {
            Self::Interface => PUBLIC,
            _ => NONE,
        }
    }

    /// Modifiers implied on methods and properties declared in this kind.
    pub fn implicit_method_modifiers(&self) -> &'static [Modifier] {
        match self {
            Self::Interface => PUBLIC_ABSTRACT,
            _ => NONE,
        }
    }

    /// Modifiers implied on types nested in this kind.
    pub fn implicit_type_modifiers(&self) -> &'static [Modifier] {
        match self {
            Self::Interface => PUBLIC,
            _ => NONE,
        }
    }

    /// Modifiers implied on a declaration of this kind when it is itself a member.
    pub fn as_member_modifiers(&self) -> &'static [Modifier] {
        NONE
    }

    /// Check if this kind is class-like (may hold state and concrete members).
    pub fn is_class_like(&self) -> bool {
        matches!(self, Self::Class | Self::Struct)
    }

    /// Check if declarations of this kind are concrete unless marked `abstract`.
    pub fn is_concrete_by_default(&self) -> bool {
        matches!(self, Self::Class | Self::Struct | Self::Attribute)
    }

    /// Check if declarations of this kind may name a base class.
    pub fn allows_superclass(&self) -> bool {
        matches!(self, Self::Class | Self::Attribute)
    }

    /// Check if declarations of this kind may carry an instance initializer block.
    pub fn allows_initializer_block(&self) -> bool {
        matches!(self, Self::Class | Self::Struct | Self::Enum)
    }

    /// Check if members of this kind must spell out visibility and staticness.
    pub fn requires_explicit_member_modifiers(&self) -> bool {
        matches!(self, Self::Interface | Self::Attribute)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Attribute => "attribute",
        };
        f.write_str(name)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Field => "field",
            Self::Method => "method",
            Self::Property => "property",
            Self::Type => "type",
        };
        f.write_str(name)
    }
}

/// A modifier set that breaks a declaration rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModifierError {
    #[error("requires exactly one of {}", spell(.expected))]
    ExactlyOneOf { expected: Vec<Modifier> },

    #[error("allows at most one of {}", spell(.allowed))]
    AtMostOneOf { allowed: Vec<Modifier> },

    #[error("requires modifiers {}", spell(.required))]
    MissingRequired { required: Vec<Modifier> },

    #[error("'{modifier}' is not allowed on a {member}")]
    NotAllowed { modifier: Modifier, member: MemberKind },
}

fn spell(modifiers: &[Modifier]) -> String {
    modifiers
        .iter()
        .map(Modifier::keyword)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate the modifiers of a member about to be attached to a declaration of `kind`.
pub fn validate_member(
    kind: TypeKind,
    member: MemberKind,
    modifiers: &BTreeSet<Modifier>,
) -> Result<(), ModifierError> {
    if member != MemberKind::Type {
        if let Some(modifier) = modifiers.iter().find(|m| m.is_parameter_modifier()) {
            return Err(ModifierError::NotAllowed {
                modifier: *modifier,
                member,
            });
        }
    }

    if member == MemberKind::Method {
        at_most_one_of(modifiers, &[Modifier::Implicit, Modifier::Explicit])?;
        let conversion =
            modifiers.contains(&Modifier::Implicit) || modifiers.contains(&Modifier::Explicit);
        if conversion {
            require_all(modifiers, &[Modifier::Operator])?;
        }
        if modifiers.contains(&Modifier::Operator) {
            require_all(modifiers, &[Modifier::Static])?;
        }
    }

    if kind.requires_explicit_member_modifiers() {
        match member {
            MemberKind::Method | MemberKind::Property => {
                exactly_one_of(modifiers, &[Modifier::Public, Modifier::Private])?;
                exactly_one_of(modifiers, &[Modifier::Abstract, Modifier::Static])?;
            }
            MemberKind::Field => {
                exactly_one_of(modifiers, &[Modifier::Public, Modifier::Private])?;
                require_all(modifiers, &[Modifier::Static])?;
            }
            MemberKind::Type => {}
        }
    }

    if member == MemberKind::Type {
        require_all(modifiers, kind.implicit_type_modifiers())?;
    }

    Ok(())
}

fn exactly_one_of(
    modifiers: &BTreeSet<Modifier>,
    expected: &[Modifier],
) -> Result<(), ModifierError> {
    let count = expected.iter().filter(|m| modifiers.contains(m)).count();
    if count == 1 {
        Ok(())
    } else {
        Err(ModifierError::ExactlyOneOf {
            expected: expected.to_vec(),
        })
    }
}

fn at_most_one_of(
    modifiers: &BTreeSet<Modifier>,
    allowed: &[Modifier],
) -> Result<(), ModifierError> {
    let count = allowed.iter().filter(|m| modifiers.contains(m)).count();
    if count <= 1 {
        Ok(())
    } else {
        Err(ModifierError::AtMostOneOf {
            allowed: allowed.to_vec(),
        })
    }
}

fn require_all(
    modifiers: &BTreeSet<Modifier>,
    required: &[Modifier],
) -> Result<(), ModifierError> {
    if required.iter().all(|m| modifiers.contains(m)) {
        Ok(())
    } else {
        Err(ModifierError::MissingRequired {
            required: required.to_vec(),
        })
    }
}
