use std::collections::BTreeSet;

use indexmap::IndexMap;
use sharpoet_core::{MemberKind, Modifier, TypeKind, is_valid_identifier, validate_member};

use crate::{
    Arg, AttributeSpec, ClassName, CodeBlock, CodeBlockBuilder, Error, FieldSpec, MethodSpec,
    PropertySpec, Result,
    name::{TypeName, TypeVariableName},
    writer::{self, CodeWriter, Renderable},
};

/// A class, struct, interface, enum or attribute declaration, or an
/// anonymous type used as an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    kind: TypeKind,
    name: Option<String>,
    anonymous_arguments: Option<CodeBlock>,
    doc: CodeBlock,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    type_variables: Vec<TypeVariableName>,
    superclass: Option<TypeName>,
    interfaces: Vec<TypeName>,
    enum_constants: IndexMap<String, TypeSpec>,
    fields: Vec<FieldSpec>,
    static_block: CodeBlock,
    initializer_block: CodeBlock,
    methods: Vec<MethodSpec>,
    properties: Vec<PropertySpec>,
    misc: Vec<CodeBlock>,
    types: Vec<TypeSpec>,
    originating: Vec<String>,
}

impl TypeSpec {
    /// Create a builder for a class.
    pub fn class_builder(name: &str) -> TypeSpecBuilder {
        TypeSpecBuilder::new(TypeKind::Class, Some(name), None)
    }

    /// Create a builder for a struct.
    pub fn struct_builder(name: &str) -> TypeSpecBuilder {
        TypeSpecBuilder::new(TypeKind::Struct, Some(name), None)
    }

    /// Create a builder for an interface.
    pub fn interface_builder(name: &str) -> TypeSpecBuilder {
        TypeSpecBuilder::new(TypeKind::Interface, Some(name), None)
    }

    /// Create a builder for an enum.
    pub fn enum_builder(name: &str) -> TypeSpecBuilder {
        TypeSpecBuilder::new(TypeKind::Enum, Some(name), None)
    }

    /// Build an attribute class. Without an explicit superclass it derives
    /// from `System.Attribute`.
    pub fn attribute_builder(name: &str) -> TypeSpecBuilder {
        TypeSpecBuilder::new(TypeKind::Attribute, Some(name), None)
    }

    /// Build an anonymous type rendered as `new Base(args) { ... }`.
    ///
    /// Anonymous types are also the values of enum constants, where the
    /// arguments become the constant's value.
    pub fn anonymous_class_builder(
        format: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> TypeSpecBuilder {
        match CodeBlock::of(format, args) {
            Ok(arguments) => TypeSpecBuilder::new(TypeKind::Class, None, Some(arguments)),
            Err(err) => {
                let mut builder =
                    TypeSpecBuilder::new(TypeKind::Class, None, Some(CodeBlock::default()));
                builder.error = Some(err);
                builder
            }
        }
    }

    /// Get the declaration kind.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// `None` for anonymous types.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the constructor arguments of an anonymous type.
    pub fn anonymous_arguments(&self) -> Option<&CodeBlock> {
        self.anonymous_arguments.as_ref()
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

    /// Check if this type has `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Get the type parameters.
    pub fn type_variables(&self) -> &[TypeVariableName] {
        &self.type_variables
    }

    /// Get the base class.
    pub fn superclass(&self) -> Option<&TypeName> {
        self.superclass.as_ref()
    }

    /// Get the implemented interfaces.
    pub fn interfaces(&self) -> &[TypeName] {
        &self.interfaces
    }

    /// Get the enum constants in declaration order.
    pub fn enum_constants(&self) -> &IndexMap<String, TypeSpec> {
        &self.enum_constants
    }

    /// Get the fields.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Get the static constructor body.
    pub fn static_block(&self) -> &CodeBlock {
        &self.static_block
    }

    /// Get the instance initializer block.
    pub fn initializer_block(&self) -> &CodeBlock {
        &self.initializer_block
    }

    /// Get the methods and constructors.
    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    /// Get the properties.
    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    /// Get the free-form code blocks.
    pub fn misc_blocks(&self) -> &[CodeBlock] {
        &self.misc
    }

    /// Get the nested types.
    pub fn types(&self) -> &[TypeSpec] {
        &self.types
    }

    /// Handles of whatever this declaration was generated from, including
    /// those of nested types. Never rendered.
    pub fn originating(&self) -> &[String] {
        &self.originating
    }

    /// Create a builder initialized from this type.
    pub fn to_builder(&self) -> TypeSpecBuilder {
        TypeSpecBuilder {
            kind: self.kind,
            name: self.name.clone(),
            anonymous_arguments: self.anonymous_arguments.clone(),
            doc: self.doc.to_builder(),
            attributes: self.attributes.clone(),
            modifiers: self.modifiers.clone(),
            type_variables: self.type_variables.clone(),
            superclass: self.superclass.clone(),
            interfaces: self.interfaces.clone(),
            enum_constants: self.enum_constants.clone(),
            fields: self.fields.clone(),
            static_block: self.static_block.to_builder(),
            initializer_block: self.initializer_block.to_builder(),
            methods: self.methods.clone(),
            properties: self.properties.clone(),
            misc: self.misc.clone(),
            types: self.types.clone(),
            originating: self.originating.clone(),
            error: None,
        }
    }

    /// Render this type on its own, with every type fully qualified.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }

    /// Get the types this type would import if declared in `namespace`.
    pub fn required_imports(&self, namespace: &str) -> Result<Vec<ClassName>> {
        writer::required_imports(self, namespace)
    }

    fn description(&self) -> String {
        describe(self.kind, self.name.as_deref())
    }

    /// The supertypes listed after ` : ` in the header.
    fn supertypes(&self) -> Vec<TypeName> {
        let superclass = match (&self.superclass, self.kind) {
            (Some(superclass), _) => Some(superclass.clone()),
            (None, TypeKind::Attribute) => Some(ClassName::new("System", "Attribute").into()),
            (None, _) => None,
        };
        superclass
            .into_iter()
            .chain(self.interfaces.iter().cloned())
            .collect()
    }

    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        enum_name: Option<&str>,
        implicit: &[Modifier],
    ) -> Result<()> {
        // A declaration inside an open statement must not inherit its
        // continuation indent.
        let statement_line = writer.take_statement_line();
        writer.push_type_variables(&self.type_variables);
        let result = self.emit_declaration(writer, enum_name, implicit);
        writer.pop_type_variables();
        writer.restore_statement_line(statement_line);
        result
    }

    fn emit_declaration(
        &self,
        writer: &mut CodeWriter,
        enum_name: Option<&str>,
        implicit: &[Modifier],
    ) -> Result<()> {
        if let Some(enum_name) = enum_name {
            writer.emit_doc(&self.doc)?;
            writer.emit_attributes(&self.attributes, false)?;
            writer.emit_and_indent(enum_name);
            if let Some(value) = self.anonymous_arguments.as_ref().filter(|v| !v.is_empty()) {
                writer.emit_and_indent(" = ");
                writer.emit_code(value)?;
            }
            return Ok(());
        }

        if let Some(arguments) = &self.anonymous_arguments {
            let object = TypeName::OBJECT;
            let supertype = self
                .interfaces
                .first()
                .or(self.superclass.as_ref())
                .unwrap_or(&object);
            writer.emit_and_indent("new ");
            writer.emit_type(supertype)?;
            writer.emit_and_indent("(");
            writer.emit_code(arguments)?;
            writer.emit_and_indent(") {\n");
        } else {
            self.emit_header(writer, implicit)?;
        }

        let nested = self
            .types
            .iter()
            .filter_map(|spec| spec.name.clone())
            .collect();
        writer.push_scope(self.name.as_deref(), nested);
        writer.indent(1);
        let result = self.emit_members(writer);
        writer.pop_scope();
        result?;
        writer.unindent(1)?;

        writer.emit_and_indent("}");
        if self.anonymous_arguments.is_none() {
            writer.emit_and_indent("\n");
        }
        Ok(())
    }

    fn emit_header(&self, writer: &mut CodeWriter, implicit: &[Modifier]) -> Result<()> {
        // Nested names are not visible in the header.
        writer.push_scope(self.name.as_deref(), Vec::new());
        let result = self.emit_header_in_scope(writer, implicit);
        writer.pop_scope();
        result
    }

    fn emit_header_in_scope(&self, writer: &mut CodeWriter, implicit: &[Modifier]) -> Result<()> {
        writer.emit_doc(&self.doc)?;
        writer.emit_attributes(&self.attributes, false)?;
        let mut hidden = implicit.to_vec();
        hidden.extend_from_slice(self.kind.as_member_modifiers());
        writer.emit_modifiers(&self.modifiers, &hidden);
        writer.emit_and_indent(self.kind.keyword());
        writer.emit_and_indent(" ");
        writer.emit_and_indent(self.name.as_deref().unwrap_or_default());
        writer.emit_type_variables(&self.type_variables);

        for (i, supertype) in self.supertypes().iter().enumerate() {
            writer.emit_and_indent(if i == 0 { " : " } else { ", " });
            writer.emit_type(supertype)?;
        }
        writer.emit_constraints(&self.type_variables)?;
        writer.emit_and_indent(" {\n");
        Ok(())
    }

    fn emit_members(&self, writer: &mut CodeWriter) -> Result<()> {
        let mut first = true;
        let mut separate = |writer: &mut CodeWriter| {
            if !std::mem::take(&mut first) {
                writer.emit_and_indent("\n");
            }
        };

        if !self.enum_constants.is_empty() {
            separate(writer);
            for (i, (name, constant)) in self.enum_constants.iter().enumerate() {
                if i > 0 {
                    writer.emit_and_indent(",\n");
                }
                constant.emit_with(writer, Some(name.as_str()), &[])?;
            }
            writer.emit_and_indent("\n");
        }

        let field_modifiers = self.kind.implicit_field_modifiers();
        for field in self.fields.iter().filter(|f| f.is_static()) {
            separate(writer);
            field.emit_with(writer, field_modifiers)?;
        }

        if !self.static_block.is_empty() {
            separate(writer);
            writer.emit_and_indent("static ");
            writer.emit_and_indent(self.name.as_deref().unwrap_or_default());
            writer.emit_and_indent("() {\n");
            emit_block_body(writer, &self.static_block)?;
        }

        for field in self.fields.iter().filter(|f| !f.is_static()) {
            separate(writer);
            field.emit_with(writer, field_modifiers)?;
        }

        if !self.initializer_block.is_empty() {
            separate(writer);
            writer.emit_and_indent("{\n");
            emit_block_body(writer, &self.initializer_block)?;
        }

        let method_modifiers = self.kind.implicit_method_modifiers();
        for method in &self.methods {
            separate(writer);
            method.emit_with(writer, self.name.as_deref(), method_modifiers)?;
        }

        for property in &self.properties {
            separate(writer);
            property.emit_with(writer, method_modifiers)?;
        }

        for block in &self.misc {
            separate(writer);
            writer.emit_code(block)?;
        }

        let type_modifiers = self.kind.implicit_type_modifiers();
        for spec in &self.types {
            separate(writer);
            spec.emit_with(writer, None, type_modifiers)?;
        }
        Ok(())
    }
}

fn emit_block_body(writer: &mut CodeWriter, body: &CodeBlock) -> Result<()> {
    writer.indent(1);
    writer.emit_code(body)?;
    writer.unindent(1)?;
    writer.emit_and_indent("}\n");
    Ok(())
}

fn describe(kind: TypeKind, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{kind} {name}"),
        None => "anonymous class".to_string(),
    }
}

impl Renderable for TypeSpec {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, None, &[])
    }
}

/// Builder for [`TypeSpec`].
///
/// Members are validated against the declaration kind as they are
/// attached; the first failure is returned by [`TypeSpecBuilder::build`].
#[derive(Debug, Clone)]
pub struct TypeSpecBuilder {
    kind: TypeKind,
    name: Option<String>,
    anonymous_arguments: Option<CodeBlock>,
    doc: CodeBlockBuilder,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    type_variables: Vec<TypeVariableName>,
    superclass: Option<TypeName>,
    interfaces: Vec<TypeName>,
    enum_constants: IndexMap<String, TypeSpec>,
    fields: Vec<FieldSpec>,
    static_block: CodeBlockBuilder,
    initializer_block: CodeBlockBuilder,
    methods: Vec<MethodSpec>,
    properties: Vec<PropertySpec>,
    misc: Vec<CodeBlock>,
    types: Vec<TypeSpec>,
    originating: Vec<String>,
    error: Option<Error>,
}

impl TypeSpecBuilder {
    fn new(kind: TypeKind, name: Option<&str>, anonymous_arguments: Option<CodeBlock>) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            anonymous_arguments,
            doc: CodeBlock::builder(),
            attributes: Vec::new(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            enum_constants: IndexMap::new(),
            fields: Vec::new(),
            static_block: CodeBlock::builder(),
            initializer_block: CodeBlock::builder(),
            methods: Vec::new(),
            properties: Vec::new(),
            misc: Vec::new(),
            types: Vec::new(),
            originating: Vec::new(),
            error: None,
        }
    }

    fn fail(mut self, message: impl Into<String>) -> Self {
        if self.error.is_none() {
            let context = describe(self.kind, self.name.as_deref());
            self.error = Some(Error::construction(context, message));
        }
        self
    }

    fn is_anonymous(&self) -> bool {
        self.anonymous_arguments.is_some()
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
        if self.is_anonymous() {
            return self.fail("anonymous types cannot have modifiers");
        }
        self.modifiers.extend(modifiers);
        self
    }

    /// Add a type parameter.
    pub fn add_type_variable(mut self, variable: TypeVariableName) -> Self {
        if self.is_anonymous() {
            return self.fail("anonymous types cannot have type parameters");
        }
        self.type_variables.push(variable);
        self
    }

    /// Set the base class. Only classes (and attribute classes) have one.
    pub fn superclass(mut self, superclass: impl Into<TypeName>) -> Self {
        let superclass = superclass.into();
        if !self.kind.allows_superclass() {
            return self.fail(format!("only classes can extend {superclass}"));
        }
        if let Some(existing) = &self.superclass {
            let message = format!("superclass already set to {existing}");
            return self.fail(message);
        }
        if superclass.is_keyword() {
            return self.fail(format!("cannot extend the built-in type {superclass}"));
        }
        self.superclass = Some(superclass);
        self
    }

    /// Add an implemented interface (or a base interface, for interfaces).
    pub fn add_interface(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Add an enum constant without an explicit value.
    pub fn add_enum_constant(self, name: &str) -> Self {
        let value = TypeSpec::anonymous_class_builder("", []).build();
        match value {
            Ok(value) => self.add_enum_constant_with(name, value),
            Err(err) => self.fail(err.to_string()),
        }
    }

    /// Add an enum constant whose value is the anonymous type's arguments,
    /// for example `anonymous_class_builder("$L", args![1 << 2])`.
    pub fn add_enum_constant_with(mut self, name: &str, value: TypeSpec) -> Self {
        if self.kind != TypeKind::Enum {
            return self.fail(format!("constant {name}: only enums have constants"));
        }
        if !is_valid_identifier(name) {
            return self.fail(format!("constant {name}: not a valid identifier"));
        }
        if value.anonymous_arguments.is_none() {
            return self.fail(format!("constant {name}: the value must be anonymous"));
        }
        let has_members = !value.fields.is_empty()
            || !value.methods.is_empty()
            || !value.properties.is_empty()
            || !value.types.is_empty();
        if has_members {
            return self.fail(format!("constant {name}: enum constants cannot declare members"));
        }
        self.enum_constants.insert(name.to_string(), value);
        self
    }

    /// Add a field.
    pub fn add_field(mut self, field: FieldSpec) -> Self {
        if let Err(err) = validate_member(self.kind, MemberKind::Field, field.modifiers()) {
            let message = format!("field {}: {err}", field.name());
            return self.fail(message);
        }
        self.fields.push(field);
        self
    }

    /// Append code to the static constructor.
    pub fn add_static_block(mut self, block: &CodeBlock) -> Self {
        if !self.kind.is_class_like() || self.is_anonymous() {
            return self.fail("only classes and structs have static constructors");
        }
        self.static_block.add_code(block);
        self
    }

    /// Append code to the instance initializer block.
    pub fn add_initializer_block(mut self, block: &CodeBlock) -> Self {
        if !self.kind.allows_initializer_block() {
            let message = format!("{} cannot have an initializer block", self.kind);
            return self.fail(message);
        }
        self.initializer_block.add_code(block);
        self
    }

    /// Add a method or constructor.
    pub fn add_method(mut self, method: MethodSpec) -> Self {
        if let Err(err) = validate_member(self.kind, MemberKind::Method, method.modifiers()) {
            let message = format!("method {}: {err}", method_label(&method));
            return self.fail(message);
        }
        if method.is_constructor() && !self.kind.is_class_like() {
            let message = format!("{} cannot declare constructors", self.kind);
            return self.fail(message);
        }
        self.methods.push(method);
        self
    }

    /// Add a property.
    pub fn add_property(mut self, property: PropertySpec) -> Self {
        if let Err(err) = validate_member(self.kind, MemberKind::Property, property.modifiers()) {
            let message = format!("property {}: {err}", property.name());
            return self.fail(message);
        }
        self.properties.push(property);
        self
    }

    /// Append free-form code to the body, after the properties.
    pub fn add_code(mut self, block: CodeBlock) -> Self {
        self.misc.push(block);
        self
    }

    /// Add a nested type. Its originating handles are merged into this one's.
    pub fn add_type(mut self, spec: TypeSpec) -> Self {
        let label = spec.description();
        if spec.name.is_none() {
            return self.fail("nested types must be named");
        }
        if let Err(err) = validate_member(self.kind, MemberKind::Type, spec.modifiers()) {
            return self.fail(format!("nested {label}: {err}"));
        }
        self.originating.extend(spec.originating.iter().cloned());
        self.types.push(spec);
        self
    }

    /// Record a handle of whatever this declaration was generated from.
    pub fn add_originating(mut self, handle: impl Into<String>) -> Self {
        self.originating.push(handle.into());
        self
    }

    /// Build the type, returning the first recorded error.
    pub fn build(self) -> Result<TypeSpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let context = describe(self.kind, self.name.as_deref());
        let fail = |message: String| Err(Error::construction(&context, message));

        if let Some(name) = &self.name {
            if !is_valid_identifier(name) {
                return fail(format!("'{name}' is not a valid identifier"));
            }
        }
        if self.kind == TypeKind::Enum && self.enum_constants.is_empty() {
            return fail("an enum requires at least one constant".to_string());
        }
        if self.kind.is_concrete_by_default() && !self.modifiers.contains(&Modifier::Abstract) {
            let abstract_method = self
                .methods
                .iter()
                .find(|m| m.has_modifier(Modifier::Abstract))
                .map(method_label);
            let abstract_property = self
                .properties
                .iter()
                .find(|p| p.has_modifier(Modifier::Abstract))
                .map(|p| p.name().to_string());
            if let Some(member) = abstract_method.or(abstract_property) {
                return fail(format!("non-abstract type declares abstract member {member}"));
            }
        }
        if self.anonymous_arguments.is_some() {
            let supertypes = usize::from(self.superclass.is_some()) + self.interfaces.len();
            if supertypes > 1 {
                return fail("an anonymous type can extend or implement only one type".to_string());
            }
        }

        Ok(TypeSpec {
            doc: self.doc.build()?,
            static_block: self.static_block.build()?,
            initializer_block: self.initializer_block.build()?,
            kind: self.kind,
            name: self.name,
            anonymous_arguments: self.anonymous_arguments,
            attributes: self.attributes,
            modifiers: self.modifiers,
            type_variables: self.type_variables,
            superclass: self.superclass,
            interfaces: self.interfaces,
            enum_constants: self.enum_constants,
            fields: self.fields,
            methods: self.methods,
            properties: self.properties,
            misc: self.misc,
            types: self.types,
            originating: self.originating,
        })
    }
}

fn method_label(method: &MethodSpec) -> String {
    if method.is_constructor() {
        "constructor".to_string()
    } else {
        method.name().to_string()
    }
}
