use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, ensure};

/// A rendered compilation unit that can be written below an output directory.
pub trait GeneratedFile {
    /// Path of the file relative to the output directory.
    fn relative_path(&self) -> PathBuf;

    /// Render the file content.
    fn render(&self) -> Result<String>;

    /// Write the file below `base`.
    ///
    /// The content is fully rendered before anything touches the disk, so a
    /// failed render never leaves a partial file behind.
    fn write(&self, base: &Path, overwrite: Overwrite) -> Result<WriteResult> {
        ensure!(
            !base.exists() || base.is_dir(),
            "path '{}' exists but is not a directory",
            base.display()
        );
        let path = base.join(self.relative_path());

        if overwrite == Overwrite::IfMissing && path.exists() {
            tracing::debug!(path = %path.display(), "skipped existing file");
            return Ok(WriteResult::Skipped);
        }

        let content = self.render()?;
        write_file(&path, &content)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote generated file");
        Ok(WriteResult::Written)
    }
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write '{}'", path.display()))
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File was skipped (already exists)
    Skipped,
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Always overwrite
    #[default]
    Always,
    /// Only create if the file doesn't exist
    IfMissing,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        path: &'static str,
        content: Option<&'static str>,
    }

    impl GeneratedFile for Fixture {
        fn relative_path(&self) -> PathBuf {
            PathBuf::from(self.path)
        }

        fn render(&self) -> Result<String> {
            match self.content {
                Some(content) => Ok(content.to_string()),
                None => eyre::bail!("render failed"),
            }
        }
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("Point.cs");

        write_file(&path, "nested").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "nested");
    }

    #[test]
    fn test_write_always_overwrites() {
        let temp = TempDir::new().unwrap();
        let file = Fixture {
            path: "App/Point.cs",
            content: Some("updated"),
        };
        fs::create_dir_all(temp.path().join("App")).unwrap();
        fs::write(temp.path().join("App/Point.cs"), "original").unwrap();

        let result = file.write(temp.path(), Overwrite::Always).unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(
            fs::read_to_string(temp.path().join("App/Point.cs")).unwrap(),
            "updated"
        );
    }

    #[test]
    fn test_write_if_missing_skips_existing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Point.cs"), "original").unwrap();
        let file = Fixture {
            path: "Point.cs",
            content: Some("should not write"),
        };

        let result = file.write(temp.path(), Overwrite::IfMissing).unwrap();

        assert_eq!(result, WriteResult::Skipped);
        assert_eq!(
            fs::read_to_string(temp.path().join("Point.cs")).unwrap(),
            "original"
        );
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let file = Fixture {
            path: "App/Broken.cs",
            content: None,
        };

        assert!(file.write(temp.path(), Overwrite::Always).is_err());
        assert!(!temp.path().join("App").exists());
    }

    #[test]
    fn test_base_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("not-a-dir");
        fs::write(&base, "").unwrap();
        let file = Fixture {
            path: "Point.cs",
            content: Some("class Point {}"),
        };

        let err = file.write(&base, Overwrite::Always).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
