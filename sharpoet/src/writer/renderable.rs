//! The seam between declarations and the writer.

use std::collections::{BTreeMap, BTreeSet};

use sharpoet_core::FormatConfig;

use super::CodeWriter;
use crate::{ClassName, Result};

/// Anything the writer can emit: code blocks and every kind of declaration.
pub(crate) trait Renderable {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()>;
}

impl<T: Renderable + ?Sized> Renderable for Box<T> {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.as_ref().emit(writer)
    }
}

/// Render a fragment outside of any file: nothing is imported, so every
/// type outside the global namespace is written fully qualified.
pub(crate) fn render(item: &impl Renderable) -> Result<String> {
    let mut writer = CodeWriter::emitting(
        "",
        &FormatConfig::default(),
        BTreeSet::new(),
        BTreeMap::new(),
    );
    item.emit(&mut writer)?;
    Ok(writer.finish())
}

/// Run the collecting pass over a fragment as if it lived in `namespace`.
pub(crate) fn required_imports(item: &impl Renderable, namespace: &str) -> Result<Vec<ClassName>> {
    let mut writer = CodeWriter::collecting(namespace, &FormatConfig::default(), BTreeSet::new());
    item.emit(&mut writer)?;
    let mut imports: Vec<ClassName> = writer.suggested_imports().into_values().collect();
    imports.sort();
    Ok(imports)
}
