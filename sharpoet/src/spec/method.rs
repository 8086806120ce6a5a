use std::collections::BTreeSet;

use sharpoet_core::{Modifier, is_operator_token, is_valid_identifier};

use crate::{
    Arg, AttributeSpec, ClassName, CodeBlock, CodeBlockBuilder, Error, ParameterSpec, Result,
    name::{TypeName, TypeVariableName},
    writer::{self, CodeWriter, Renderable},
};

/// The shape of a method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `T Name(...)`
    Ordinary,
    /// `Name(...)`, named after the enclosing type.
    Constructor,
    /// `T operator +(...)`
    Operator,
    /// `explicit operator T(...)` / `implicit operator T(...)`
    Conversion,
}

/// A method, constructor or operator declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    name: String,
    constructor: bool,
    doc: CodeBlock,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    type_variables: Vec<TypeVariableName>,
    return_type: TypeName,
    parameters: Vec<ParameterSpec>,
    body: CodeBlock,
    constructor_initializer: Option<CodeBlock>,
}

impl MethodSpec {
    /// Build an ordinary method, an operator (`name` is the operator token)
    /// or a conversion operator.
    pub fn method_builder(name: &str) -> MethodSpecBuilder {
        MethodSpecBuilder::new(name, false)
    }

    /// Create a builder for a constructor.
    pub fn constructor_builder() -> MethodSpecBuilder {
        MethodSpecBuilder::new("", true)
    }

    /// Get the method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get what kind of method this is.
    pub fn kind(&self) -> MethodKind {
        if self.constructor {
            MethodKind::Constructor
        } else if self.has_modifier(Modifier::Explicit) || self.has_modifier(Modifier::Implicit) {
            MethodKind::Conversion
        } else if self.has_modifier(Modifier::Operator) {
            MethodKind::Operator
        } else {
            MethodKind::Ordinary
        }
    }

    /// Check if this is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.constructor
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

    /// Check if this method has `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Get the type parameters.
    pub fn type_variables(&self) -> &[TypeVariableName] {
        &self.type_variables
    }

    /// Get the return type, `void` when none was set.
    pub fn return_type(&self) -> &TypeName {
        &self.return_type
    }

    /// Get the parameters.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Get the method body.
    pub fn body(&self) -> &CodeBlock {
        &self.body
    }

    /// Get the `base(...)` or `this(...)` call.
    pub fn constructor_initializer(&self) -> Option<&CodeBlock> {
        self.constructor_initializer.as_ref()
    }

    /// Create a builder initialized from this method.
    pub fn to_builder(&self) -> MethodSpecBuilder {
        MethodSpecBuilder {
            name: self.name.clone(),
            constructor: self.constructor,
            doc: self.doc.to_builder(),
            attributes: self.attributes.clone(),
            modifiers: self.modifiers.clone(),
            type_variables: self.type_variables.clone(),
            return_type: (!self.constructor).then(|| self.return_type.clone()),
            parameters: self.parameters.clone(),
            body: self.body.to_builder(),
            constructor_initializer: self.constructor_initializer.clone(),
            error: None,
        }
    }

    /// Render this method on its own, with every type fully qualified.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }

    /// Get the types this method would import if declared in `namespace`.
    pub fn required_imports(&self, namespace: &str) -> Result<Vec<ClassName>> {
        writer::required_imports(self, namespace)
    }

    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        enclosing_name: Option<&str>,
        implicit: &[Modifier],
    ) -> Result<()> {
        writer.push_type_variables(&self.type_variables);
        let result = self.emit_declaration(writer, enclosing_name, implicit);
        writer.pop_type_variables();
        result
    }

    fn emit_declaration(
        &self,
        writer: &mut CodeWriter,
        enclosing_name: Option<&str>,
        implicit: &[Modifier],
    ) -> Result<()> {
        writer.emit_doc(&self.doc)?;
        writer.emit_attributes(&self.attributes, false)?;

        match self.kind() {
            MethodKind::Constructor => {
                writer.emit_modifiers(&self.modifiers, implicit);
                writer.emit_and_indent(enclosing_name.unwrap_or("Constructor"));
            }
            MethodKind::Conversion => {
                writer.emit_modifiers(&self.modifiers, implicit);
                if self.return_type.is_void() {
                    writer.emit_and_indent(&self.name);
                } else {
                    writer.emit_type(&self.return_type)?;
                }
            }
            MethodKind::Operator => {
                let mut hidden = implicit.to_vec();
                hidden.push(Modifier::Operator);
                writer.emit_modifiers(&self.modifiers, &hidden);
                writer.emit_type(&self.return_type)?;
                writer.emit_and_indent(" operator ");
                writer.emit_and_indent(&self.name);
            }
            MethodKind::Ordinary => {
                writer.emit_modifiers(&self.modifiers, implicit);
                writer.emit_type(&self.return_type)?;
                writer.emit_and_indent(" ");
                writer.emit_and_indent(&self.name);
                writer.emit_type_variables(&self.type_variables);
            }
        }

        writer.emit_and_indent("(");
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                writer.emit_and_indent(",");
                writer.emit_wrapping_space();
            }
            parameter.emit(writer)?;
        }
        writer.emit_and_indent(")");

        if let Some(initializer) = &self.constructor_initializer {
            writer.emit_and_indent(" : ");
            writer.emit_code(initializer)?;
        }
        writer.emit_constraints(&self.type_variables)?;

        let implicitly_abstract =
            implicit.contains(&Modifier::Abstract) && !self.has_modifier(Modifier::Static);
        if self.has_modifier(Modifier::Abstract)
            || self.has_modifier(Modifier::Extern)
            || implicitly_abstract
        {
            writer.emit_and_indent(";\n");
            return Ok(());
        }

        writer.emit_and_indent(" {\n");
        writer.indent(1);
        writer.emit_code(&self.body)?;
        writer.unindent(1)?;
        writer.emit_and_indent("}\n");
        Ok(())
    }
}

impl Renderable for MethodSpec {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, None, &[])
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpecBuilder {
    name: String,
    constructor: bool,
    doc: CodeBlockBuilder,
    attributes: Vec<AttributeSpec>,
    modifiers: BTreeSet<Modifier>,
    type_variables: Vec<TypeVariableName>,
    return_type: Option<TypeName>,
    parameters: Vec<ParameterSpec>,
    body: CodeBlockBuilder,
    constructor_initializer: Option<CodeBlock>,
    error: Option<Error>,
}

impl MethodSpecBuilder {
    fn new(name: &str, constructor: bool) -> Self {
        Self {
            name: name.to_string(),
            constructor,
            doc: CodeBlock::builder(),
            attributes: Vec::new(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
            return_type: None,
            parameters: Vec::new(),
            body: CodeBlock::builder(),
            constructor_initializer: None,
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

    /// Add a type parameter.
    pub fn add_type_variable(mut self, variable: TypeVariableName) -> Self {
        self.type_variables.push(variable);
        self
    }

    /// Set the return type.
    pub fn returns(mut self, return_type: impl Into<TypeName>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Add a parameter.
    pub fn add_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Add a plain parameter.
    pub fn parameter(self, ty: impl Into<TypeName>, name: &str) -> Self {
        match ParameterSpec::of(ty, name) {
            Ok(parameter) => self.add_parameter(parameter),
            Err(err) => self.fail(err),
        }
    }

    /// Chain to another constructor: `base(...)` or `this(...)`.
    pub fn constructor_initializer(
        mut self,
        format: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> Self {
        match CodeBlock::of(format, args) {
            Ok(initializer) => {
                self.constructor_initializer = Some(initializer);
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Append code to the body.
    pub fn add_code(mut self, block: &CodeBlock) -> Self {
        self.body.add_code(block);
        self
    }

    /// Append a statement to the body.
    pub fn add_statement(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.body.add_statement(format, args);
        self
    }

    /// Open a braced block in the body.
    pub fn begin_control_flow(
        mut self,
        control_flow: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> Self {
        self.body.begin_control_flow(control_flow, args);
        self
    }

    /// Close the current block and open the next one.
    pub fn next_control_flow(
        mut self,
        control_flow: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> Self {
        self.body.next_control_flow(control_flow, args);
        self
    }

    /// Close the current block.
    pub fn end_control_flow(mut self) -> Self {
        self.body.end_control_flow();
        self
    }

    /// Build the method, returning the first recorded error.
    pub fn build(self) -> Result<MethodSpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let context = if self.constructor {
            "constructor".to_string()
        } else {
            format!("method {}", self.name)
        };
        let fail = |message: String| Err(Error::construction(&context, message));

        let body = self.body.build()?;
        let doc = self.doc.build()?;

        if !self.constructor {
            let operator = self.modifiers.contains(&Modifier::Operator);
            let valid = is_valid_identifier(&self.name) || (operator && is_operator_token(&self.name));
            if !valid {
                return fail(format!("'{}' is not a valid method name", self.name));
            }
        } else if self.return_type.is_some() {
            return fail("a constructor cannot declare a return type".to_string());
        }
        if self.constructor_initializer.is_some() && !self.constructor {
            return fail("only constructors can chain to base(...) or this(...)".to_string());
        }
        if self.modifiers.contains(&Modifier::Abstract) && !body.is_empty() {
            return fail("an abstract method cannot have a body".to_string());
        }
        if let Some(position) = self
            .parameters
            .iter()
            .position(|p| p.has_modifier(Modifier::Params))
        {
            let parameter = &self.parameters[position];
            if position + 1 != self.parameters.len() {
                return fail(format!("params parameter '{}' must be last", parameter.name()));
            }
            if !parameter.ty().is_array() {
                return fail(format!("params parameter '{}' must be an array", parameter.name()));
            }
        }

        Ok(MethodSpec {
            name: self.name,
            constructor: self.constructor,
            doc,
            attributes: self.attributes,
            modifiers: self.modifiers,
            type_variables: self.type_variables,
            return_type: self.return_type.unwrap_or(TypeName::VOID),
            parameters: self.parameters,
            body,
            constructor_initializer: self.constructor_initializer,
        })
    }

    fn fail(mut self, err: Error) -> Self {
        self.error.get_or_insert(err);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn point() -> ClassName {
        ClassName::new("", "Point")
    }

    #[test]
    fn test_ordinary_method() {
        let method = MethodSpec::method_builder("Scale")
            .add_modifiers([Modifier::Public])
            .returns(point())
            .parameter(TypeName::DOUBLE, "factor")
            .add_statement("return new $T(x * factor, y * factor)", args![point()])
            .build()
            .unwrap();
        assert_eq!(
            method.render().unwrap(),
            "public Point Scale(double factor) {\n\treturn new Point(x * factor, y * factor);\n}\n"
        );
        assert_eq!(method.kind(), MethodKind::Ordinary);
    }

    #[test]
    fn test_generic_method_with_constraint() {
        let t = TypeVariableName::new("T").bound(ClassName::parse("System.IComparable"));
        let method = MethodSpec::method_builder("Max")
            .add_modifiers([Modifier::Public, Modifier::Static])
            .add_type_variable(t.clone())
            .returns(t.clone())
            .parameter(t.clone(), "a")
            .parameter(t, "b")
            .add_statement("return a.CompareTo(b) >= 0 ? a : b", args![])
            .build()
            .unwrap();
        assert_eq!(
            method.render().unwrap(),
            "public static T Max<T>(T a, T b) where T : System.IComparable {\n\treturn a.CompareTo(b) >= 0 ? a : b;\n}\n"
        );
    }

    #[test]
    fn test_constructor_with_initializer() {
        let ctor = MethodSpec::constructor_builder()
            .add_modifiers([Modifier::Public])
            .parameter(TypeName::STRING, "message")
            .constructor_initializer("base($N)", args!["message"])
            .build()
            .unwrap();
        assert_eq!(
            ctor.render().unwrap(),
            "public Constructor(string message) : base(message) {\n}\n"
        );
    }

    #[test]
    fn test_operator() {
        let add = MethodSpec::method_builder("+")
            .add_modifiers([Modifier::Public, Modifier::Static, Modifier::Operator])
            .returns(point())
            .parameter(point(), "a")
            .parameter(point(), "b")
            .add_statement("return new $T(a.X + b.X, a.Y + b.Y)", args![point()])
            .build()
            .unwrap();
        assert_eq!(add.kind(), MethodKind::Operator);
        assert!(
            add.render()
                .unwrap()
                .starts_with("public static Point operator +(Point a, Point b) {\n")
        );
    }

    #[test]
    fn test_conversion_uses_name_when_void() {
        let conversion = MethodSpec::method_builder("Point")
            .add_modifiers([
                Modifier::Public,
                Modifier::Static,
                Modifier::Explicit,
                Modifier::Operator,
            ])
            .parameter(TypeName::DOUBLE, "value")
            .add_statement("return new Point(value, value)", args![])
            .build()
            .unwrap();
        assert_eq!(conversion.kind(), MethodKind::Conversion);
        assert!(
            conversion
                .render()
                .unwrap()
                .starts_with("public static explicit operator Point(double value) {\n")
        );
    }

    #[test]
    fn test_abstract_method_has_no_body() {
        let method = MethodSpec::method_builder("Area")
            .add_modifiers([Modifier::Public, Modifier::Abstract])
            .returns(TypeName::DOUBLE)
            .build()
            .unwrap();
        assert_eq!(method.render().unwrap(), "public abstract double Area();\n");
    }

    #[test]
    fn test_construction_errors() {
        let err = MethodSpec::method_builder("Area")
            .add_modifiers([Modifier::Abstract])
            .add_statement("return 0", args![])
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "method Area: an abstract method cannot have a body");

        let err = MethodSpec::constructor_builder()
            .returns(TypeName::INT)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "constructor: a constructor cannot declare a return type"
        );

        assert!(MethodSpec::method_builder("+").build().is_err());
        assert!(MethodSpec::method_builder("do").build().is_err());
    }

    #[test]
    fn test_params_must_be_last_array() {
        let values = ParameterSpec::builder(TypeName::array_of(TypeName::INT), "values")
            .add_modifiers([Modifier::Params])
            .build()
            .unwrap();

        let ok = MethodSpec::method_builder("Sum")
            .add_parameter(values.clone())
            .build()
            .unwrap();
        assert_eq!(ok.render().unwrap(), "void Sum(params int[] values) {\n}\n");

        let err = MethodSpec::method_builder("Sum")
            .add_parameter(values)
            .parameter(TypeName::INT, "seed")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must be last"));

        let scalar = ParameterSpec::builder(TypeName::INT, "value")
            .add_modifiers([Modifier::Params])
            .build()
            .unwrap();
        let err = MethodSpec::method_builder("Sum")
            .add_parameter(scalar)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[test]
    fn test_unbalanced_body_is_structural() {
        let err = MethodSpec::method_builder("Loop")
            .begin_control_flow("while (true)", args![])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
    }

    #[test]
    fn test_to_builder_round_trip() {
        let method = MethodSpec::method_builder("Reset")
            .add_statement("x = 0", args![])
            .build()
            .unwrap();
        let copy = method.to_builder().build().unwrap();
        assert_eq!(copy, method);
    }
}
