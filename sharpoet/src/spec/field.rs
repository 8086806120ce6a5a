use std::collections::BTreeSet;

use sharpoet_core::{Modifier, is_valid_identifier};

use crate::{
    Arg, AttributeSpec, CodeBlock, CodeBlockBuilder, Error, Result, args,
    name::TypeName,
    writer::{self, CodeWriter, Renderable},
};

/// A field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    ty: TypeName,
    doc: CodeBlock,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    initializer: Option<CodeBlock>,
}

impl FieldSpec {
    /// Create a builder for a field.
    pub fn builder(ty: impl Into<TypeName>, name: &str) -> FieldSpecBuilder {
        FieldSpecBuilder {
            name: name.to_string(),
            ty: ty.into(),
            doc: CodeBlock::builder(),
            attributes: Vec::new(),
            modifiers: BTreeSet::new(),
            initializer: None,
            error: None,
        }
    }

    /// Get the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the field type.
    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    /// Get the documentation comment.
    pub fn doc(&self) -> &CodeBlock {
        &self.doc
    }

    /// Get the attributes.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Get the modifiers.
    pub fn modifiers(&self) -> &BTreeSet<Modifier> {
        &self.modifiers
    }

    /// Check if this field has `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Static and `const` fields are emitted before instance fields.
    pub fn is_static(&self) -> bool {
        self.has_modifier(Modifier::Static) || self.has_modifier(Modifier::Const)
    }

    /// Get the initializer expression.
    pub fn initializer(&self) -> Option<&CodeBlock> {
        self.initializer.as_ref()
    }

    /// Create a builder initialized from this field.
    pub fn to_builder(&self) -> FieldSpecBuilder {
        FieldSpecBuilder {
            name: self.name.clone(),
            ty: self.ty.clone(),
            doc: self.doc.to_builder(),
            attributes: self.attributes.clone(),
            modifiers: self.modifiers.clone(),
            initializer: self.initializer.clone(),
            error: None,
        }
    }

    /// Render this field on its own, with every type fully qualified.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }

    /// Get the types this field would import if declared in `namespace`.
    pub fn required_imports(&self, namespace: &str) -> Result<Vec<crate::ClassName>> {
        writer::required_imports(self, namespace)
    }

    pub(crate) fn emit_with(&self, writer: &mut CodeWriter, implicit: &[Modifier]) -> Result<()> {
        writer.emit_doc(&self.doc)?;
        writer.emit_attributes(&self.attributes, false)?;
        writer.emit_modifiers(&self.modifiers, implicit);
        match &self.initializer {
            Some(initializer) => writer.emit(
                "$[$T $N = $L$]",
                args![&self.ty, &self.name, initializer],
            ),
            None => writer.emit("$[$T $N$]", args![&self.ty, &self.name]),
        }
    }
}

impl Renderable for FieldSpec {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, &[])
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpecBuilder {
    name: String,
    ty: TypeName,
    doc: CodeBlockBuilder,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    initializer: Option<CodeBlock>,
    error: Option<Error>,
}

impl FieldSpecBuilder {
    /// Add a line of documentation.
    pub fn add_doc(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.doc.add(format, args);
        self
    }

    /// Add an attribute.
    pub fn add_attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add modifiers.
    pub fn add_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    /// Set the initializer expression.
    pub fn initializer(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        match CodeBlock::of(format, args) {
            Ok(initializer) => self.initializer = Some(initializer),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Build the field, returning the first recorded error.
    pub fn build(self) -> Result<FieldSpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !is_valid_identifier(&self.name) {
            return Err(Error::construction(
                format!("field {}", self.name),
                format!("'{}' is not a valid identifier", self.name),
            ));
        }
        Ok(FieldSpec {
            doc: self.doc.build()?,
            name: self.name,
            ty: self.ty,
            attributes: self.attributes,
            modifiers: self.modifiers,
            initializer: self.initializer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassName;

    #[test]
    fn test_field_with_initializer() {
        let field = FieldSpec::builder(TypeName::DOUBLE, "x")
            .add_modifiers([Modifier::Private, Modifier::Readonly])
            .initializer("$L", args![0.5])
            .build()
            .unwrap();
        assert_eq!(field.render().unwrap(), "private readonly double x = 0.5;\n");
    }

    #[test]
    fn test_modifier_order_is_canonical() {
        let field = FieldSpec::builder(TypeName::INT, "Count")
            .add_modifiers([Modifier::Readonly, Modifier::Static, Modifier::Public])
            .build()
            .unwrap();
        assert_eq!(field.render().unwrap(), "public static readonly int Count;\n");
        assert!(field.is_static());
    }

    #[test]
    fn test_doc_and_attribute() {
        let field = FieldSpec::builder(TypeName::STRING, "name")
            .add_doc("The display name.", args![])
            .add_attribute(AttributeSpec::of(ClassName::new("", "NonSerialized")))
            .build()
            .unwrap();
        assert_eq!(
            field.render().unwrap(),
            "/// The display name.\n[NonSerialized]\nstring name;\n"
        );
    }

    #[test]
    fn test_required_imports() {
        let field = FieldSpec::builder(ClassName::parse("System.IO.Stream"), "input")
            .build()
            .unwrap();
        assert_eq!(
            field.required_imports("App").unwrap(),
            vec![ClassName::parse("System.IO.Stream")]
        );
    }

    #[test]
    fn test_invalid_name() {
        let err = FieldSpec::builder(TypeName::INT, "1x").build().unwrap_err();
        assert_eq!(err.to_string(), "field 1x: '1x' is not a valid identifier");
    }
}
