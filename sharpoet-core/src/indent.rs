//! Indentation configuration for generated C#.

use serde::Deserialize;

/// Indentation unit for one nesting level.
///
/// Deserializes from `"tab"` or `{ spaces = 4 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indent {
    /// Spaces with the specified width (e.g., 2 or 4).
    Spaces(u8),
    /// Tab character.
    #[default]
    Tab,
}

impl Indent {
    /// 4-space indentation (the `dotnet new` templates).
    pub const DOTNET: Self = Self::Spaces(4);

    /// The string written for one indent level.
    pub fn unit(&self) -> String {
        match self {
            Self::Spaces(width) => " ".repeat(usize::from(*width)),
            Self::Tab => "\t".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_unit() {
        assert_eq!(Indent::Spaces(2).unit(), "  ");
        assert_eq!(Indent::Spaces(4).unit(), "    ");
        assert_eq!(Indent::Spaces(3).unit(), "   ");
        assert_eq!(Indent::Tab.unit(), "\t");
    }

    #[test]
    fn test_default() {
        assert_eq!(Indent::default(), Indent::Tab);
        assert_eq!(Indent::DOTNET, Indent::Spaces(4));
    }
}
