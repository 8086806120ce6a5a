use std::collections::BTreeSet;

use sharpoet_core::{Modifier, is_valid_identifier};

use crate::{
    Arg, AttributeSpec, CodeBlock, Error, Result,
    name::TypeName,
    writer::{self, CodeWriter, Renderable},
};

/// A method, constructor, operator or indexer parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: String,
    ty: TypeName,
    modifiers: BTreeSet<Modifier>,
    attributes: Vec<AttributeSpec>,
    default_value: Option<CodeBlock>,
}

impl ParameterSpec {
    /// Create a builder for a parameter.
    pub fn builder(ty: impl Into<TypeName>, name: &str) -> ParameterSpecBuilder {
        ParameterSpecBuilder {
            name: name.to_string(),
            ty: ty.into(),
            modifiers: BTreeSet::new(),
            attributes: Vec::new(),
            default_value: None,
            error: None,
        }
    }

    /// A plain parameter.
    pub fn of(ty: impl Into<TypeName>, name: &str) -> Result<Self> {
        Self::builder(ty, name).build()
    }

    /// Get the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parameter type.
    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    /// Get the modifiers.
    pub fn modifiers(&self) -> &BTreeSet<Modifier> {
        &self.modifiers
    }

    /// Check if this parameter has `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Get the attributes.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Get the default value.
    pub fn default_value(&self) -> Option<&CodeBlock> {
        self.default_value.as_ref()
    }

    /// Create a builder initialized from this parameter.
    pub fn to_builder(&self) -> ParameterSpecBuilder {
        ParameterSpecBuilder {
            name: self.name.clone(),
            ty: self.ty.clone(),
            modifiers: self.modifiers.clone(),
            attributes: self.attributes.clone(),
            default_value: self.default_value.clone(),
            error: None,
        }
    }

    /// Render this parameter on its own, with every type fully qualified.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }
}

impl Renderable for ParameterSpec {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        writer.emit_attributes(&self.attributes, true)?;
        writer.emit_modifiers(&self.modifiers, &[]);
        writer.emit_type(&self.ty)?;
        writer.emit_and_indent(" ");
        writer.emit_and_indent(&self.name);
        if let Some(default_value) = &self.default_value {
            writer.emit_and_indent(" = ");
            writer.emit_code(default_value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ParameterSpecBuilder {
    name: String,
    ty: TypeName,
    modifiers: BTreeSet<Modifier>,
    attributes: Vec<AttributeSpec>,
    default_value: Option<CodeBlock>,
    error: Option<Error>,
}

impl ParameterSpecBuilder {
    /// Add `ref`, `out`, `in`, `params` or `this`.
    pub fn add_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        for modifier in modifiers {
            if !modifier.is_parameter_modifier() {
                let err = Error::construction(
                    format!("parameter {}", self.name),
                    format!("'{modifier}' is not allowed on a parameter"),
                );
                self.error.get_or_insert(err);
            }
            self.modifiers.insert(modifier);
        }
        self
    }

    /// Add an attribute.
    pub fn add_attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Make the parameter optional with the given default value.
    pub fn default_value(mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        match CodeBlock::of(format, args) {
            Ok(value) => self.default_value = Some(value),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Build the parameter, returning the first recorded error.
    pub fn build(self) -> Result<ParameterSpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !is_valid_identifier(&self.name) {
            return Err(Error::construction(
                format!("parameter {}", self.name),
                format!("'{}' is not a valid identifier", self.name),
            ));
        }
        Ok(ParameterSpec {
            name: self.name,
            ty: self.ty,
            modifiers: self.modifiers,
            attributes: self.attributes,
            default_value: self.default_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassName, args};

    #[test]
    fn test_full_parameter() {
        let param = ParameterSpec::builder(TypeName::INT, "count")
            .add_attribute(AttributeSpec::of(ClassName::new("", "NotNull")))
            .add_modifiers([Modifier::Ref])
            .build()
            .unwrap();
        assert_eq!(param.render().unwrap(), "[NotNull] ref int count");
    }

    #[test]
    fn test_default_value() {
        let param = ParameterSpec::builder(TypeName::STRING, "label")
            .default_value("$S", args!["none"])
            .build()
            .unwrap();
        assert_eq!(param.render().unwrap(), "string label = \"none\"");
    }

    #[test]
    fn test_member_modifier_rejected() {
        let err = ParameterSpec::builder(TypeName::INT, "x")
            .add_modifiers([Modifier::Static])
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter x: 'static' is not allowed on a parameter"
        );
    }

    #[test]
    fn test_invalid_name() {
        assert!(ParameterSpec::of(TypeName::INT, "class").is_err());
        assert!(ParameterSpec::of(TypeName::INT, "@class").is_ok());
    }
}
