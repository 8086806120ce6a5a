//! Formatting configuration.

use std::path::Path;

use eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::Indent;

/// Layout options applied when a file is rendered.
///
/// # Example
///
/// ```
/// use sharpoet_core::{FormatConfig, Indent};
///
/// let config = FormatConfig::from_toml_str("indent = { spaces = 4 }\ncolumn_limit = 120").unwrap();
/// assert_eq!(config.indent, Indent::Spaces(4));
/// assert_eq!(config.column_limit, 120);
/// assert!(!config.file_scoped_namespace);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Indentation unit.
    pub indent: Indent,
    /// Column after which wrapping spaces (`$W`) turn into line breaks.
    pub column_limit: usize,
    /// Emit `namespace Foo;` instead of a braced namespace block.
    pub file_scoped_namespace: bool,
    /// Omit `using System;` even when `System` types are referenced.
    pub skip_system_imports: bool,
}

impl FormatConfig {
    /// Default column limit.
    pub const COLUMN_LIMIT: usize = 100;

    /// Parse a configuration from TOML source.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).wrap_err("failed to parse format configuration")
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
        Self::from_toml_str(&src).wrap_err_with(|| format!("in '{}'", path.display()))
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            column_limit: Self::COLUMN_LIMIT,
            file_scoped_namespace: false,
            skip_system_imports: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = FormatConfig::from_toml_str("").unwrap();
        assert_eq!(config, FormatConfig::default());
        assert_eq!(config.indent, Indent::Tab);
        assert_eq!(config.column_limit, 100);
    }

    #[test]
    fn test_full_config() {
        let config = FormatConfig::from_toml_str(
            r#"
            indent = "tab"
            column_limit = 80
            file_scoped_namespace = true
            skip_system_imports = true
            "#,
        )
        .unwrap();
        assert_eq!(config.indent, Indent::Tab);
        assert_eq!(config.column_limit, 80);
        assert!(config.file_scoped_namespace);
        assert!(config.skip_system_imports);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(FormatConfig::from_toml_str("tabs = true").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sharpoet.toml");
        std::fs::write(&path, "indent = { spaces = 2 }").unwrap();

        let config = FormatConfig::load(&path).unwrap();
        assert_eq!(config.indent, Indent::Spaces(2));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");
        let err = FormatConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
