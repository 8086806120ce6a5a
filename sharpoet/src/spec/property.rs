use std::collections::BTreeSet;

use sharpoet_core::{Modifier, is_valid_identifier};

use crate::{
    Arg, AttributeSpec, ClassName, CodeBlock, CodeBlockBuilder, Error, ParameterSpec, Result,
    name::TypeName,
    writer::{self, CodeWriter, Renderable},
};

/// A property or indexer with optional `get` and `set` accessors.
///
/// Each accessor is absent (`None`), auto-implemented (an empty block) or
/// has a body. Rendering picks the shortest form that keeps the meaning:
///
/// - abstract, or every present accessor empty: `T X { get; set; }`
/// - a single-statement getter and no setter: `T X => expr;`
/// - otherwise a braced accessor list where each accessor is `get;`,
///   `get => expr;` or `get { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    name: String,
    indexer: bool,
    ty: TypeName,
    doc: CodeBlock,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    parameters: Vec<ParameterSpec>,
    getter: Option<CodeBlock>,
    setter: Option<CodeBlock>,
    initializer: Option<CodeBlock>,
}

impl PropertySpec {
    /// Create a builder for a property.
    pub fn builder(ty: impl Into<TypeName>, name: &str) -> PropertySpecBuilder {
        PropertySpecBuilder::new(ty.into(), name, false)
    }

    /// Build an indexer, rendered as `T this[...]`.
    pub fn indexer_builder(ty: impl Into<TypeName>) -> PropertySpecBuilder {
        PropertySpecBuilder::new(ty.into(), "this", true)
    }

    /// Get the property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this is an indexer (`this[...]`).
    pub fn is_indexer(&self) -> bool {
        self.indexer
    }

    /// Get the property type.
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

    /// Check if this property has `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Get the indexer parameters.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Get the getter body, empty for an auto getter.
    pub fn getter(&self) -> Option<&CodeBlock> {
        self.getter.as_ref()
    }

    /// Get the setter body, empty for an auto setter.
    pub fn setter(&self) -> Option<&CodeBlock> {
        self.setter.as_ref()
    }

    /// Get the initializer expression.
    pub fn initializer(&self) -> Option<&CodeBlock> {
        self.initializer.as_ref()
    }

    /// Create a builder initialized from this property.
    pub fn to_builder(&self) -> PropertySpecBuilder {
        PropertySpecBuilder {
            name: self.name.clone(),
            indexer: self.indexer,
            ty: self.ty.clone(),
            doc: self.doc.to_builder(),
            attributes: self.attributes.clone(),
            modifiers: self.modifiers.clone(),
            parameters: self.parameters.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            initializer: self.initializer.clone(),
            error: None,
        }
    }

    /// Render this property on its own, with every type fully qualified.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }

    /// Get the types this property would import if declared in `namespace`.
    pub fn required_imports(&self, namespace: &str) -> Result<Vec<ClassName>> {
        writer::required_imports(self, namespace)
    }

    fn accessors(&self) -> impl Iterator<Item = (&'static str, &CodeBlock)> {
        let getter = self.getter.as_ref().map(|body| ("get", body));
        let setter = self.setter.as_ref().map(|body| ("set", body));
        getter.into_iter().chain(setter)
    }

    fn is_auto(&self) -> bool {
        self.accessors().all(|(_, body)| body.is_empty())
    }

    pub(crate) fn emit_with(&self, writer: &mut CodeWriter, implicit: &[Modifier]) -> Result<()> {
        writer.emit_doc(&self.doc)?;
        writer.emit_attributes(&self.attributes, false)?;
        writer.emit_modifiers(&self.modifiers, implicit);
        writer.emit_type(&self.ty)?;
        writer.emit_and_indent(" ");
        writer.emit_and_indent(&self.name);
        if self.indexer {
            writer.emit_and_indent("[");
            for (i, parameter) in self.parameters.iter().enumerate() {
                if i > 0 {
                    writer.emit_and_indent(",");
                    writer.emit_wrapping_space();
                }
                parameter.emit(writer)?;
            }
            writer.emit_and_indent("]");
        }

        let implicitly_abstract =
            implicit.contains(&Modifier::Abstract) && !self.has_modifier(Modifier::Static);
        if self.has_modifier(Modifier::Abstract) || implicitly_abstract || self.is_auto() {
            writer.emit_and_indent(" {");
            for (keyword, _) in self.accessors() {
                writer.emit_and_indent(" ");
                writer.emit_and_indent(keyword);
                writer.emit_and_indent(";");
            }
            writer.emit_and_indent(" }");
            if let Some(initializer) = &self.initializer {
                writer.emit_and_indent(" = ");
                writer.emit_code(initializer)?;
                writer.emit_and_indent(";");
            }
            writer.emit_and_indent("\n");
            return Ok(());
        }

        if self.setter.is_none() {
            if let Some(expression) = self.getter.as_ref().and_then(CodeBlock::single_expression) {
                writer.emit_and_indent(" => ");
                writer.emit_code(&expression)?;
                writer.emit_and_indent(";\n");
                return Ok(());
            }
        }

        writer.emit_and_indent(" {\n");
        writer.indent(1);
        for (keyword, body) in self.accessors() {
            writer.emit_and_indent(keyword);
            if body.is_empty() {
                writer.emit_and_indent(";\n");
            } else if let Some(expression) = body.single_expression() {
                writer.emit_and_indent(" => ");
                writer.emit_code(&expression)?;
                writer.emit_and_indent(";\n");
            } else {
                writer.emit_and_indent(" {\n");
                writer.indent(1);
                writer.emit_code(body)?;
                writer.unindent(1)?;
                writer.emit_and_indent("}\n");
            }
        }
        writer.unindent(1)?;
        writer.emit_and_indent("}\n");
        Ok(())
    }
}

impl Renderable for PropertySpec {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, &[])
    }
}

#[derive(Debug, Clone)]
pub struct PropertySpecBuilder {
    name: String,
    indexer: bool,
    ty: TypeName,
    doc: CodeBlockBuilder,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    parameters: Vec<ParameterSpec>,
    getter: Option<CodeBlock>,
    setter: Option<CodeBlock>,
    initializer: Option<CodeBlock>,
    error: Option<Error>,
}

impl PropertySpecBuilder {
    fn new(ty: TypeName, name: &str, indexer: bool) -> Self {
        Self {
            name: name.to_string(),
            indexer,
            ty,
            doc: CodeBlock::builder(),
            attributes: Vec::new(),
            modifiers: BTreeSet::new(),
            parameters: Vec::new(),
            getter: None,
            setter: None,
            initializer: None,
            error: None,
        }
    }

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

    /// Add an indexer parameter.
    pub fn add_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the `get` body. An empty block makes it auto-implemented.
    pub fn getter(mut self, body: CodeBlock) -> Self {
        self.getter = Some(body);
        self
    }

    /// Add an auto-implemented `get;`.
    pub fn auto_getter(self) -> Self {
        self.getter(CodeBlock::default())
    }

    /// Set the `set` body. An empty block makes it auto-implemented.
    pub fn setter(mut self, body: CodeBlock) -> Self {
        self.setter = Some(body);
        self
    }

    /// Add an auto-implemented `set;`.
    pub fn auto_setter(self) -> Self {
        self.setter(CodeBlock::default())
    }

    /// Initial value of an auto-implemented property.
    pub fn initializer(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        match CodeBlock::of(format, args) {
            Ok(initializer) => self.initializer = Some(initializer),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Build the property, returning the first recorded error.
    pub fn build(self) -> Result<PropertySpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let context = if self.indexer {
            "indexer".to_string()
        } else {
            format!("property {}", self.name)
        };
        let fail = |message: &str| Err(Error::construction(&context, message));

        if !self.indexer && !is_valid_identifier(&self.name) {
            return fail("not a valid identifier");
        }
        if self.getter.is_none() && self.setter.is_none() {
            return fail("a property needs a getter or a setter");
        }
        let has_body = [&self.getter, &self.setter]
            .into_iter()
            .flatten()
            .any(|body| !body.is_empty());
        if self.modifiers.contains(&Modifier::Abstract) && has_body {
            return fail("an abstract property cannot have accessor bodies");
        }
        if self.initializer.is_some() && has_body {
            return fail("only auto-implemented properties can have an initializer");
        }
        if !self.indexer && !self.parameters.is_empty() {
            return fail("only indexers take parameters");
        }
        if self.indexer && self.parameters.is_empty() {
            return fail("an indexer needs at least one parameter");
        }

        Ok(PropertySpec {
            doc: self.doc.build()?,
            name: self.name,
            indexer: self.indexer,
            ty: self.ty,
            attributes: self.attributes,
            modifiers: self.modifiers,
            parameters: self.parameters,
            getter: self.getter,
            setter: self.setter,
            initializer: self.initializer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn block(format: &str) -> CodeBlock {
        CodeBlock::of(format, args![]).unwrap()
    }

    #[test]
    fn test_auto_property_with_initializer() {
        let property = PropertySpec::builder(TypeName::STRING, "Name")
            .add_modifiers([Modifier::Public])
            .auto_getter()
            .auto_setter()
            .initializer("$S", args!["unnamed"])
            .build()
            .unwrap();
        assert_eq!(
            property.render().unwrap(),
            "public string Name { get; set; } = \"unnamed\";\n"
        );
    }

    #[test]
    fn test_single_statement_getter_is_terse() {
        let property = PropertySpec::builder(TypeName::DOUBLE, "Length")
            .add_modifiers([Modifier::Public])
            .getter(block("$[return Math.Sqrt(X * X + Y * Y)$]"))
            .build()
            .unwrap();
        assert_eq!(
            property.render().unwrap(),
            "public double Length => Math.Sqrt(X * X + Y * Y);\n"
        );
    }

    #[test]
    fn test_two_statement_getter_is_braced() {
        let property = PropertySpec::builder(TypeName::DOUBLE, "Length")
            .add_modifiers([Modifier::Public])
            .getter(block("$[var squared = X * X + Y * Y$]$[return Math.Sqrt(squared)$]"))
            .build()
            .unwrap();
        assert_eq!(
            property.render().unwrap(),
            "public double Length {\n\tget {\n\t\tvar squared = X * X + Y * Y;\n\t\treturn Math.Sqrt(squared);\n\t}\n}\n"
        );
    }

    #[test]
    fn test_single_statement_getter_with_auto_setter() {
        let property = PropertySpec::builder(TypeName::INT, "Count")
            .getter(block("$[return count$]"))
            .auto_setter()
            .build()
            .unwrap();
        assert_eq!(
            property.render().unwrap(),
            "int Count {\n\tget => count;\n\tset;\n}\n"
        );
    }

    #[test]
    fn test_getter_and_setter_bodies() {
        let property = PropertySpec::builder(TypeName::INT, "Count")
            .getter(block("$[return count$]"))
            .setter(block("$[count = value$]$[Changed()$]"))
            .build()
            .unwrap();
        assert_eq!(
            property.render().unwrap(),
            "int Count {\n\tget => count;\n\tset {\n\t\tcount = value;\n\t\tChanged();\n\t}\n}\n"
        );
    }

    #[test]
    fn test_abstract_property() {
        let property = PropertySpec::builder(TypeName::INT, "Id")
            .add_modifiers([Modifier::Public, Modifier::Abstract])
            .auto_getter()
            .build()
            .unwrap();
        assert_eq!(property.render().unwrap(), "public abstract int Id { get; }\n");
    }

    #[test]
    fn test_indexer() {
        let indexer = PropertySpec::indexer_builder(TypeName::STRING)
            .add_modifiers([Modifier::Public])
            .add_parameter(ParameterSpec::of(TypeName::INT, "index").unwrap())
            .getter(block("$[return items[index]$]"))
            .build()
            .unwrap();
        assert_eq!(
            indexer.render().unwrap(),
            "public string this[int index] => items[index];\n"
        );
    }

    #[test]
    fn test_construction_errors() {
        let err = PropertySpec::builder(TypeName::INT, "Id").build().unwrap_err();
        assert_eq!(err.to_string(), "property Id: a property needs a getter or a setter");

        let err = PropertySpec::builder(TypeName::INT, "Id")
            .add_modifiers([Modifier::Abstract])
            .getter(block("$[return 1$]"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("abstract property"));

        let err = PropertySpec::builder(TypeName::INT, "Id")
            .getter(block("$[return 1$]"))
            .initializer("$L", args![2])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("initializer"));

        let err = PropertySpec::builder(TypeName::INT, "Id")
            .auto_getter()
            .add_parameter(ParameterSpec::of(TypeName::INT, "i").unwrap())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("only indexers"));
    }
}
