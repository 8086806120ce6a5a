//! A complete C# compilation unit.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::PathBuf,
};

use sharpoet_core::{FormatConfig, GeneratedFile, Indent, is_valid_namespace};

use crate::{
    Arg, ClassName, CodeBlock, CodeBlockBuilder, Error, Result, TypeSpec, writer::CodeWriter,
};

const SYSTEM_NAMESPACE: &str = "System";

/// One top-level type in a namespace, with its `using` directives.
///
/// Rendering runs the writer twice: the first pass decides which types can be
/// imported, the second writes the text with those imports in place.
///
/// # Example
///
/// ```
/// use sharpoet::{CSharpFile, ClassName, MethodSpec, Modifier, TypeName, TypeSpec, args};
///
/// let math = ClassName::parse("System.Math");
/// let norm = MethodSpec::method_builder("Norm")
///     .add_modifiers([Modifier::Public, Modifier::Static])
///     .returns(TypeName::DOUBLE)
///     .parameter(TypeName::DOUBLE, "x")
///     .add_statement("return $T.Abs(x)", args![math])
///     .build()
///     .unwrap();
/// let util = TypeSpec::class_builder("Util")
///     .add_modifiers([Modifier::Public, Modifier::Static])
///     .add_method(norm)
///     .build()
///     .unwrap();
/// let file = CSharpFile::builder("App", util).build().unwrap();
///
/// let source = file.render().unwrap();
/// assert!(source.starts_with("using System;\n\nnamespace App {\n"));
/// assert!(source.contains("return Math.Abs(x);"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CSharpFile {
    namespace: String,
    file_comment: CodeBlock,
    type_spec: TypeSpec,
    usings: BTreeSet<String>,
    static_usings: BTreeSet<ClassName>,
    config: FormatConfig,
}

impl CSharpFile {
    /// Create a builder for a file declaring `type_spec` in `namespace`.
    pub fn builder(namespace: &str, type_spec: TypeSpec) -> CSharpFileBuilder {
        CSharpFileBuilder {
            namespace: namespace.to_string(),
            file_comment: CodeBlock::builder(),
            type_spec,
            usings: BTreeSet::new(),
            static_usings: BTreeSet::new(),
            config: FormatConfig::default(),
        }
    }

    /// Get the namespace, empty for the global namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the top-level type.
    pub fn type_spec(&self) -> &TypeSpec {
        &self.type_spec
    }

    /// Get the comment written above the `using` directives.
    pub fn file_comment(&self) -> &CodeBlock {
        &self.file_comment
    }

    /// Get the explicitly added `using` namespaces.
    pub fn usings(&self) -> &BTreeSet<String> {
        &self.usings
    }

    /// Get the `using static` types.
    pub fn static_usings(&self) -> &BTreeSet<ClassName> {
        &self.static_usings
    }

    /// Get the layout settings.
    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    fn type_name(&self) -> &str {
        self.type_spec.name().unwrap_or_default()
    }

    /// Create a builder initialized from this file.
    pub fn to_builder(&self) -> CSharpFileBuilder {
        CSharpFileBuilder {
            namespace: self.namespace.clone(),
            file_comment: self.file_comment.to_builder(),
            type_spec: self.type_spec.clone(),
            usings: self.usings.clone(),
            static_usings: self.static_usings.clone(),
            config: self.config.clone(),
        }
    }

    /// Render the file to a string.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Render the file into `out`.
    ///
    /// The text is fully rendered before `out` is touched, so a failure
    /// leaves nothing behind.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(namespace = %self.namespace, type_name = self.type_name())
    )]
    pub fn write_to(&self, out: &mut impl fmt::Write) -> Result<()> {
        let collected = self.collecting_pass()?;
        let imports = collected.suggested_imports();

        let mut writer = CodeWriter::emitting(
            &self.namespace,
            &self.config,
            self.static_usings.clone(),
            imports.clone(),
        )
        .with_referenced_names(collected.referenced_names().clone());
        self.emit(&mut writer, &imports)?;
        let source = writer.finish();
        out.write_str(&source)?;
        Ok(())
    }

    /// The types the file imports, sorted by canonical name.
    pub fn imported_types(&self) -> Result<Vec<ClassName>> {
        let mut types: Vec<ClassName> = self
            .collecting_pass()?
            .suggested_imports()
            .into_values()
            .collect();
        types.sort();
        Ok(types)
    }

    /// First pass: emit into a discarding writer that records import claims.
    fn collecting_pass(&self) -> Result<CodeWriter> {
        let mut writer =
            CodeWriter::collecting(&self.namespace, &self.config, self.static_usings.clone());
        self.emit(&mut writer, &BTreeMap::new())?;

        tracing::debug!(
            claimed = writer.suggested_imports().len(),
            ambiguous = ?writer.ambiguous_names(),
            "collected imports"
        );
        Ok(writer)
    }

    fn using_namespaces(&self, imports: &BTreeMap<String, ClassName>) -> BTreeSet<String> {
        imports
            .values()
            .map(ClassName::namespace)
            .filter(|ns| !(self.config.skip_system_imports && *ns == SYSTEM_NAMESPACE))
            .map(str::to_string)
            .chain(self.usings.iter().cloned())
            .collect()
    }

    fn emit(&self, writer: &mut CodeWriter, imports: &BTreeMap<String, ClassName>) -> Result<()> {
        if !self.file_comment.is_empty() {
            writer.emit_comment(&self.file_comment)?;
            writer.emit_and_indent("\n");
        }

        let usings = self.using_namespaces(imports);
        if !usings.is_empty() {
            for namespace in &usings {
                writer.emit_and_indent(&format!("using {namespace};\n"));
            }
            writer.emit_and_indent("\n");
        }

        if !self.static_usings.is_empty() {
            for class in &self.static_usings {
                writer.emit_and_indent(&format!("using static {class};\n"));
            }
            writer.emit_and_indent("\n");
        }

        match (self.namespace.is_empty(), self.config.file_scoped_namespace) {
            (true, _) => self.type_spec.emit_with(writer, None, &[]),
            (false, true) => {
                writer.emit_and_indent(&format!("namespace {};\n\n", self.namespace));
                self.type_spec.emit_with(writer, None, &[])
            }
            (false, false) => {
                writer.emit_and_indent(&format!("namespace {} {{\n", self.namespace));
                writer.indent(1);
                self.type_spec.emit_with(writer, None, &[])?;
                writer.unindent(1)?;
                writer.emit_and_indent("}\n");
                Ok(())
            }
        }
    }
}

impl fmt::Display for CSharpFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f).map_err(|_| fmt::Error)
    }
}

impl GeneratedFile for CSharpFile {
    fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .namespace
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(format!("{}.cs", self.type_name()));
        path
    }

    fn render(&self) -> eyre::Result<String> {
        Ok(CSharpFile::render(self)?)
    }
}

/// Builder for [`CSharpFile`].
#[derive(Debug, Clone)]
pub struct CSharpFileBuilder {
    namespace: String,
    file_comment: CodeBlockBuilder,
    type_spec: TypeSpec,
    usings: BTreeSet<String>,
    static_usings: BTreeSet<ClassName>,
    config: FormatConfig,
}

impl CSharpFileBuilder {
    /// Add a line to the `//` comment at the top of the file.
    pub fn add_file_comment(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.file_comment.add(format, args);
        self
    }

    /// Add a `using` directive for a namespace, whether or not it is needed.
    pub fn add_using(mut self, namespace: &str) -> Self {
        self.usings.insert(namespace.to_string());
        self
    }

    /// Add a `using static` directive. Member accesses written as `$T.Member`
    /// on this type render as `Member`.
    pub fn add_static_using(mut self, class: ClassName) -> Self {
        self.static_usings.insert(class);
        self
    }

    /// Set whether `using System;` is left out.
    pub fn skip_system_imports(mut self, skip: bool) -> Self {
        self.config.skip_system_imports = skip;
        self
    }

    /// Set the indentation unit.
    pub fn indent(mut self, indent: Indent) -> Self {
        self.config.indent = indent;
        self
    }

    /// Set the column at which long lines wrap.
    pub fn column_limit(mut self, column_limit: usize) -> Self {
        self.config.column_limit = column_limit;
        self
    }

    /// Set whether the namespace is written as `namespace N;`.
    pub fn file_scoped_namespace(mut self, file_scoped: bool) -> Self {
        self.config.file_scoped_namespace = file_scoped;
        self
    }

    /// Replace every layout option at once.
    pub fn config(mut self, config: &FormatConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Build the file, validating its namespace and usings.
    pub fn build(self) -> Result<CSharpFile> {
        let context = match self.type_spec.name() {
            Some(name) if self.namespace.is_empty() => format!("file {name}"),
            Some(name) => format!("file {}.{name}", self.namespace),
            None => "file".to_string(),
        };
        let fail = |message: String| Err(Error::construction(&context, message));

        if self.type_spec.name().is_none() {
            return fail("the top-level type must be named".to_string());
        }
        if !self.namespace.is_empty() && !is_valid_namespace(&self.namespace) {
            return fail(format!("'{}' is not a valid namespace", self.namespace));
        }
        if let Some(using) = self.usings.iter().find(|u| !is_valid_namespace(u)) {
            return fail(format!("'{using}' is not a valid using namespace"));
        }
        for class in &self.static_usings {
            class.validate()?;
        }
        if self.config.column_limit == 0 {
            return fail("the column limit must be positive".to_string());
        }

        Ok(CSharpFile {
            file_comment: self.file_comment.build()?,
            namespace: self.namespace,
            type_spec: self.type_spec,
            usings: self.usings,
            static_usings: self.static_usings,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{FieldSpec, TypeName, args};

    fn holder(field_type: impl Into<TypeName>) -> TypeSpec {
        TypeSpec::class_builder("Holder")
            .add_field(FieldSpec::builder(field_type, "value").build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_braced_namespace() {
        let file = CSharpFile::builder("App", holder(ClassName::parse("System.IO.Stream")))
            .indent(Indent::Spaces(4))
            .build()
            .unwrap();
        insta::assert_snapshot!(file.render().unwrap(), @r"
        using System.IO;

        namespace App {
            class Holder {
                Stream value;
            }
        }
        ");
    }

    #[test]
    fn test_file_scoped_namespace() {
        let file = CSharpFile::builder("App.Models", holder(TypeName::INT))
            .file_scoped_namespace(true)
            .build()
            .unwrap();
        assert_eq!(
            file.render().unwrap(),
            "namespace App.Models;\n\nclass Holder {\n\tint value;\n}\n"
        );
    }

    #[test]
    fn test_global_namespace() {
        let file = CSharpFile::builder("", holder(TypeName::INT)).build().unwrap();
        assert_eq!(file.render().unwrap(), "class Holder {\n\tint value;\n}\n");
        assert_eq!(file.relative_path(), Path::new("Holder.cs"));
    }

    #[test]
    fn test_file_comment() {
        let file = CSharpFile::builder("", holder(TypeName::INT))
            .add_file_comment("Generated code.\nDo not edit.", args![])
            .build()
            .unwrap();
        assert!(
            file.render()
                .unwrap()
                .starts_with("// Generated code.\n// Do not edit.\n\nclass Holder {")
        );
    }

    #[test]
    fn test_skip_system_imports_keeps_short_names() {
        let file = CSharpFile::builder("App", holder(ClassName::parse("System.DateTime")))
            .skip_system_imports(true)
            .build()
            .unwrap();
        let source = file.render().unwrap();
        assert!(!source.contains("using System;"));
        assert!(source.contains("\t\tDateTime value;\n"));
        assert_eq!(
            file.imported_types().unwrap(),
            vec![ClassName::parse("System.DateTime")]
        );
    }

    #[test]
    fn test_relative_path() {
        let file = CSharpFile::builder("Company.Product.Models", holder(TypeName::INT))
            .build()
            .unwrap();
        assert_eq!(
            file.relative_path(),
            Path::new("Company").join("Product").join("Models").join("Holder.cs")
        );
    }

    #[test]
    fn test_display_matches_render() {
        let file = CSharpFile::builder("App", holder(TypeName::STRING)).build().unwrap();
        assert_eq!(file.to_string(), file.render().unwrap());
    }

    #[test]
    fn test_build_errors() {
        let anonymous = TypeSpec::anonymous_class_builder("", []).build().unwrap();
        let err = CSharpFile::builder("App", anonymous).build().unwrap_err();
        assert_eq!(err.to_string(), "file: the top-level type must be named");

        let err = CSharpFile::builder("App..Models", holder(TypeName::INT))
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "file App..Models.Holder: 'App..Models' is not a valid namespace"
        );

        let err = CSharpFile::builder("App", holder(TypeName::INT))
            .add_using("System.")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("not a valid using namespace"));
    }

    #[test]
    fn test_to_builder_round_trip() {
        let file = CSharpFile::builder("App", holder(TypeName::INT))
            .add_using("System.Linq")
            .build()
            .unwrap();
        let copy = file.to_builder().build().unwrap();
        assert_eq!(file, copy);

        let scoped = file
            .to_builder()
            .config(&FormatConfig {
                file_scoped_namespace: true,
                ..FormatConfig::default()
            })
            .build()
            .unwrap();
        assert!(
            scoped
                .render()
                .unwrap()
                .starts_with("using System.Linq;\n\nnamespace App;\n")
        );
    }
}
