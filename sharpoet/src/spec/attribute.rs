use indexmap::IndexMap;
use sharpoet_core::is_valid_identifier;

use crate::{
    Arg, CodeBlock, Error, Result,
    name::TypeName,
    writer::{self, CodeWriter, Renderable},
};

/// An attribute application such as `[Obsolete("use Bar", DiagnosticId = "X1")]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    ty: TypeName,
    arguments: Vec<CodeBlock>,
    named_arguments: IndexMap<String, CodeBlock>,
}

impl AttributeSpec {
    /// Create a builder for an attribute of type `ty`.
    pub fn builder(ty: impl Into<TypeName>) -> AttributeSpecBuilder {
        AttributeSpecBuilder {
            ty: ty.into(),
            arguments: Vec::new(),
            named_arguments: IndexMap::new(),
            error: None,
        }
    }

    /// An attribute without arguments.
    pub fn of(ty: impl Into<TypeName>) -> Self {
        Self {
            ty: ty.into(),
            arguments: Vec::new(),
            named_arguments: IndexMap::new(),
        }
    }

    /// Get the attribute type.
    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    /// Get the positional arguments.
    pub fn arguments(&self) -> &[CodeBlock] {
        &self.arguments
    }

    /// Get the named arguments in insertion order.
    pub fn named_arguments(&self) -> &IndexMap<String, CodeBlock> {
        &self.named_arguments
    }

    /// Create a builder initialized from this attribute.
    pub fn to_builder(&self) -> AttributeSpecBuilder {
        AttributeSpecBuilder {
            ty: self.ty.clone(),
            arguments: self.arguments.clone(),
            named_arguments: self.named_arguments.clone(),
            error: None,
        }
    }

    /// Render this attribute on its own, with every type fully qualified.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }
}

impl Renderable for AttributeSpec {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        writer.emit_and_indent("[");
        writer.emit_type(&self.ty)?;
        if !self.arguments.is_empty() || !self.named_arguments.is_empty() {
            writer.emit_and_indent("(");
            let named = self
                .named_arguments
                .iter()
                .map(|(name, value)| (Some(name.as_str()), value));
            let positional = self.arguments.iter().map(|value| (None, value));
            for (i, (name, value)) in positional.chain(named).enumerate() {
                if i > 0 {
                    writer.emit_and_indent(",");
                    writer.emit_wrapping_space();
                }
                if let Some(name) = name {
                    writer.emit_and_indent(name);
                    writer.emit_and_indent(" = ");
                }
                writer.emit_code(value)?;
            }
            writer.emit_and_indent(")");
        }
        writer.emit_and_indent("]");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AttributeSpecBuilder {
    ty: TypeName,
    arguments: Vec<CodeBlock>,
    named_arguments: IndexMap<String, CodeBlock>,
    error: Option<Error>,
}

impl AttributeSpecBuilder {
    /// Add a positional constructor argument.
    pub fn argument(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        match CodeBlock::of(format, args) {
            Ok(value) => self.arguments.push(value),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Add a named argument, for example `AllowMultiple = true`.
    pub fn named_argument(
        mut self,
        name: &str,
        format: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> Self {
        if !is_valid_identifier(name) {
            let err = Error::construction(
                format!("attribute {}", self.ty),
                format!("'{name}' is not a valid argument name"),
            );
            self.fail(err);
            return self;
        }
        match CodeBlock::of(format, args) {
            Ok(value) => {
                self.named_arguments.insert(name.to_string(), value);
            }
            Err(err) => self.fail(err),
        }
        self
    }

    /// Build the attribute, returning the first recorded error.
    pub fn build(self) -> Result<AttributeSpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(AttributeSpec {
            ty: self.ty,
            arguments: self.arguments,
            named_arguments: self.named_arguments,
        })
    }

    fn fail(&mut self, err: Error) {
        self.error.get_or_insert(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassName, args};

    #[test]
    fn test_bare_attribute() {
        let attr = AttributeSpec::of(ClassName::new("", "Serializable"));
        assert_eq!(attr.render().unwrap(), "[Serializable]");
    }

    #[test]
    fn test_positional_then_named_arguments() {
        let attr = AttributeSpec::builder(ClassName::new("", "AttributeUsage"))
            .named_argument("AllowMultiple", "$L", args![true])
            .argument("AttributeTargets.Class", args![])
            .build()
            .unwrap();
        assert_eq!(
            attr.render().unwrap(),
            "[AttributeUsage(AttributeTargets.Class, AllowMultiple = true)]"
        );
    }

    #[test]
    fn test_invalid_named_argument() {
        let err = AttributeSpec::builder(ClassName::new("", "Obsolete"))
            .named_argument("not valid", "$S", args!["x"])
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "attribute Obsolete: 'not valid' is not a valid argument name"
        );
    }
}
