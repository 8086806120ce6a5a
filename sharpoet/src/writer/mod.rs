//! The two-pass emission engine.
//!
//! A file is emitted twice. The collecting pass writes nothing; it records
//! which simple name each referenced type would like to be imported under.
//! The emitting pass receives those suggestions as its import table and
//! writes the text, shortening every type whose simple name resolves back
//! to it.
//!
//! Each pass owns all of its tables, so rendering never mutates the model.

mod line_wrapper;
mod renderable;

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use sharpoet_core::{FormatConfig, Modifier};

pub(crate) use renderable::{Renderable, render, required_imports};

use crate::{
    AttributeSpec, ClassName, CodeBlock, Error, Result,
    code::{Arg, Part, string_literal},
    name::{TypeName, TypeVariableName},
};
use line_wrapper::LineWrapper;

/// A type declaration currently being emitted.
#[derive(Debug, Clone)]
struct Scope {
    /// `None` for anonymous types.
    name: Option<String>,
    /// Simple names of the types declared directly inside this one.
    nested: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct CodeWriter {
    out: LineWrapper,
    indent: String,
    indent_level: usize,
    doc: bool,
    comment: bool,
    namespace: String,
    scopes: Vec<Scope>,
    type_variables: Vec<Vec<String>>,
    static_usings: BTreeSet<ClassName>,
    imported_types: BTreeMap<String, ClassName>,
    claims: IndexMap<String, ClassName>,
    ambiguous: BTreeSet<String>,
    /// Simple names written short for types of the current namespace or the
    /// global namespace, with the type that took each one.
    referenced_names: BTreeMap<String, ClassName>,
    trailing_newline: bool,
    /// Lines written so far by the open statement, `None` outside statements.
    statement_line: Option<usize>,
}

impl CodeWriter {
    /// Writer for the first pass: discards text and records import claims.
    pub(crate) fn collecting(
        namespace: &str,
        config: &FormatConfig,
        static_usings: BTreeSet<ClassName>,
    ) -> Self {
        Self::new(namespace, config, static_usings, BTreeMap::new(), true)
    }

    /// Writer for the second pass, shortening names found in `imported_types`.
    pub(crate) fn emitting(
        namespace: &str,
        config: &FormatConfig,
        static_usings: BTreeSet<ClassName>,
        imported_types: BTreeMap<String, ClassName>,
    ) -> Self {
        Self::new(namespace, config, static_usings, imported_types, false)
    }

    fn new(
        namespace: &str,
        config: &FormatConfig,
        static_usings: BTreeSet<ClassName>,
        imported_types: BTreeMap<String, ClassName>,
        discard: bool,
    ) -> Self {
        let indent = config.indent.unit();
        Self {
            out: LineWrapper::new(indent.clone(), config.column_limit, discard),
            indent,
            indent_level: 0,
            doc: false,
            comment: false,
            namespace: namespace.to_string(),
            scopes: Vec::new(),
            type_variables: Vec::new(),
            static_usings,
            imported_types,
            claims: IndexMap::new(),
            ambiguous: BTreeSet::new(),
            referenced_names: BTreeMap::new(),
            // Output starts at the beginning of a line.
            trailing_newline: true,
            statement_line: None,
        }
    }

    /// The written text. Empty for a collecting writer.
    pub(crate) fn finish(self) -> String {
        self.out.finish()
    }

    /// Types worth importing: every claimed simple name that is neither
    /// ambiguous nor already taken by a type of the current namespace.
    pub(crate) fn suggested_imports(&self) -> BTreeMap<String, ClassName> {
        self.claims
            .iter()
            .filter(|(simple, _)| {
                !self.ambiguous.contains(*simple) && !self.referenced_names.contains_key(*simple)
            })
            .map(|(simple, class)| (simple.clone(), class.clone()))
            .collect()
    }

    /// Simple names taken by types of the current or the global namespace.
    pub(crate) fn referenced_names(&self) -> &BTreeMap<String, ClassName> {
        &self.referenced_names
    }

    /// Start from the names the collecting pass saw taken, so the first
    /// reference in this pass already knows about later ones.
    pub(crate) fn with_referenced_names(mut self, names: BTreeMap<String, ClassName>) -> Self {
        self.referenced_names = names;
        self
    }

    /// Simple names claimed by more than one type.
    pub(crate) fn ambiguous_names(&self) -> &BTreeSet<String> {
        &self.ambiguous
    }

    pub(crate) fn indent(&mut self, levels: usize) {
        self.indent_level += levels;
    }

    pub(crate) fn unindent(&mut self, levels: usize) -> Result<()> {
        if levels > self.indent_level {
            return Err(Error::structural(format!(
                "cannot unindent {levels} level(s) from level {}",
                self.indent_level
            )));
        }
        self.indent_level -= levels;
        Ok(())
    }

    pub(crate) fn push_scope(&mut self, name: Option<&str>, nested: Vec<String>) {
        self.scopes.push(Scope {
            name: name.map(str::to_string),
            nested,
        });
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn push_type_variables(&mut self, variables: &[TypeVariableName]) {
        self.type_variables
            .push(variables.iter().map(|v| v.name().to_string()).collect());
    }

    pub(crate) fn pop_type_variables(&mut self) {
        self.type_variables.pop();
    }

    /// Close any open statement and return its line count so a nested
    /// declaration starts with a clean wrapping state.
    pub(crate) fn take_statement_line(&mut self) -> Option<usize> {
        self.statement_line.take()
    }

    pub(crate) fn restore_statement_line(&mut self, statement_line: Option<usize>) {
        self.statement_line = statement_line;
    }

    /// Parse and emit a format string in one step.
    pub(crate) fn emit(&mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> Result<()> {
        let block = CodeBlock::of(format, args)?;
        self.emit_code(&block)
    }

    pub(crate) fn emit_code(&mut self, block: &CodeBlock) -> Result<()> {
        let mut parts = block.parts.iter().peekable();
        while let Some(part) = parts.next() {
            match part {
                Part::Literal(text) | Part::Name(text) => self.emit_and_indent(text),
                Part::Str(Some(value)) => self.emit_and_indent(&string_literal(value)),
                Part::Str(None) => self.emit_and_indent("null"),
                Part::Type(ty) => {
                    if let (TypeName::Class(class), Some(Part::Literal(rest))) = (ty, parts.peek()) {
                        if let Some(member) = self.static_member(class, rest) {
                            self.emit_and_indent(member);
                            parts.next();
                            continue;
                        }
                    }
                    self.emit_type(ty)?;
                }
                Part::Code(code) => self.emit_code(code)?,
                Part::Declaration(spec) => spec.emit(self)?,
                Part::Indent => self.indent(1),
                Part::Unindent => self.unindent(1)?,
                Part::StatementBegin => {
                    if self.statement_line.is_some() {
                        return Err(Error::structural(
                            "statement '$[' opened inside another statement",
                        ));
                    }
                    self.statement_line = Some(0);
                }
                Part::StatementEnd => {
                    self.emit_and_indent(";");
                    if self.statement_line.is_some_and(|lines| lines > 0) {
                        self.unindent(2)?;
                    }
                    self.statement_line = None;
                    self.emit_and_indent("\n");
                }
                Part::WrappingSpace => self.out.wrapping_space(self.indent_level + 2),
                Part::ZeroWidthSpace => self.out.zero_width_space(self.indent_level + 2),
            }
        }
        Ok(())
    }

    /// The member access that remains when `class` is statically imported
    /// and `rest` starts with `.Member`.
    fn static_member<'a>(&self, class: &ClassName, rest: &'a str) -> Option<&'a str> {
        let member = rest.strip_prefix('.')?;
        let starts_identifier = member
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        (starts_identifier && self.static_usings.contains(class)).then_some(member)
    }

    pub(crate) fn emit_type(&mut self, ty: &TypeName) -> Result<()> {
        match ty {
            TypeName::Keyword(keyword) => self.emit_and_indent(keyword),
            TypeName::Class(class) => {
                let name = self.lookup_name(class)?;
                self.emit_and_indent(&name);
            }
            TypeName::Generic { raw, args } => {
                let name = self.lookup_name(raw)?;
                self.emit_and_indent(&name);
                self.emit_and_indent("<");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.emit_and_indent(", ");
                    }
                    self.emit_type(arg)?;
                }
                self.emit_and_indent(">");
            }
            TypeName::Array(component) => {
                self.emit_type(component)?;
                self.emit_and_indent("[]");
            }
            TypeName::Nullable(inner) => {
                self.emit_type(inner)?;
                self.emit_and_indent("?");
            }
            TypeName::Variable(variable) => self.emit_and_indent(variable.name()),
        }
        Ok(())
    }

    /// Emit a `///` documentation comment. Nothing is written for an empty block.
    pub(crate) fn emit_doc(&mut self, doc: &CodeBlock) -> Result<()> {
        if doc.is_empty() {
            return Ok(());
        }
        self.doc = true;
        let result = self.emit_code(doc);
        if result.is_ok() && !self.trailing_newline {
            self.emit_and_indent("\n");
        }
        self.doc = false;
        result
    }

    /// Emit a `//` line comment. Types in comments never claim imports.
    pub(crate) fn emit_comment(&mut self, comment: &CodeBlock) -> Result<()> {
        if comment.is_empty() {
            return Ok(());
        }
        self.comment = true;
        let result = self.emit_code(comment);
        if result.is_ok() && !self.trailing_newline {
            self.emit_and_indent("\n");
        }
        self.comment = false;
        result
    }

    /// Emit attributes, each on its own line or separated by spaces when `inline`.
    pub(crate) fn emit_attributes(&mut self, attributes: &[AttributeSpec], inline: bool) -> Result<()> {
        for attribute in attributes {
            attribute.emit(self)?;
            self.emit_and_indent(if inline { " " } else { "\n" });
        }
        Ok(())
    }

    /// Emit `modifiers` in canonical order, skipping the ones in `implicit`.
    pub(crate) fn emit_modifiers(&mut self, modifiers: &BTreeSet<Modifier>, implicit: &[Modifier]) {
        for modifier in modifiers {
            if !implicit.contains(modifier) {
                self.emit_and_indent(modifier.keyword());
                self.emit_and_indent(" ");
            }
        }
    }

    /// Emit a `<T, U>` parameter list.
    pub(crate) fn emit_type_variables(&mut self, variables: &[TypeVariableName]) {
        if variables.is_empty() {
            return;
        }
        self.emit_and_indent("<");
        for (i, variable) in variables.iter().enumerate() {
            if i > 0 {
                self.emit_and_indent(", ");
            }
            self.emit_and_indent(variable.name());
        }
        self.emit_and_indent(">");
    }

    /// Emit ` where T : A, B` for every bounded variable.
    pub(crate) fn emit_constraints(&mut self, variables: &[TypeVariableName]) -> Result<()> {
        for variable in variables.iter().filter(|v| !v.bounds().is_empty()) {
            self.emit_and_indent(" where ");
            self.emit_and_indent(variable.name());
            self.emit_and_indent(" : ");
            for (i, bound) in variable.bounds().iter().enumerate() {
                if i > 0 {
                    self.emit_and_indent(", ");
                }
                self.emit_type(bound)?;
            }
        }
        Ok(())
    }

    pub(crate) fn emit_wrapping_space(&mut self) {
        self.out.wrapping_space(self.indent_level + 2);
    }

    /// Write `s`, indenting every line that starts fresh and adding the
    /// doc or comment prefix where one is active.
    pub(crate) fn emit_and_indent(&mut self, s: &str) {
        for (i, line) in s.split('\n').enumerate() {
            if i > 0 {
                if (self.doc || self.comment) && self.trailing_newline {
                    self.emit_indentation();
                    self.out.append(if self.doc { "///" } else { "//" });
                }
                self.out.append("\n");
                self.trailing_newline = true;
                if let Some(lines) = self.statement_line {
                    // Continuation lines of a statement are indented twice.
                    if lines == 0 {
                        self.indent(2);
                    }
                    self.statement_line = Some(lines + 1);
                }
            }

            if line.is_empty() {
                continue;
            }
            if self.trailing_newline {
                self.emit_indentation();
                if self.doc {
                    self.out.append("/// ");
                } else if self.comment {
                    self.out.append("// ");
                }
            }
            self.out.append(line);
            self.trailing_newline = false;
        }
    }

    fn emit_indentation(&mut self) {
        for _ in 0..self.indent_level {
            self.out.append(&self.indent);
        }
    }

    /// The shortest name that refers to `class` from the current position.
    fn lookup_name(&mut self, class: &ClassName) -> Result<String> {
        class.validate()?;

        // A type variable shadows any type with the same simple name.
        let top_level = class.top_level();
        if self
            .type_variables
            .iter()
            .flatten()
            .any(|name| name == top_level.simple_name())
        {
            return Ok(qualified_name(class));
        }

        // Find the shortest suffix of the nesting chain that resolves back to
        // `class`, through enclosing declarations first and imports second.
        let simple_names = class.simple_names();
        let mut name_resolved = false;
        let mut current = Some(class);
        while let Some(candidate) = current {
            let resolved = self.resolve(candidate.simple_name());
            name_resolved = resolved.is_some();
            if resolved.as_ref() == Some(candidate) {
                let suffix = candidate.simple_names().len() - 1;
                return Ok(simple_names[suffix..].join("."));
            }
            current = candidate.enclosing();
        }

        // The simple name means something else here.
        if name_resolved {
            return Ok(qualified_name(class));
        }

        // Types of this namespace and of the global namespace need no import,
        // but their simple name is then unavailable to any other type.
        if class.namespace() == self.namespace || class.namespace().is_empty() {
            let simple = top_level.simple_name();
            match self.referenced_names.get(simple) {
                Some(existing) if existing == top_level => {}
                // Inside a namespace its own types hide global ones.
                Some(existing)
                    if existing.namespace().is_empty() && !class.namespace().is_empty() =>
                {
                    self.referenced_names
                        .insert(simple.to_string(), top_level.clone());
                }
                Some(_) => return Ok(qualified_name(class)),
                None => {
                    self.referenced_names
                        .insert(simple.to_string(), top_level.clone());
                }
            }
            return Ok(simple_names.join("."));
        }

        if !self.doc && !self.comment {
            self.claim(class);
        }
        Ok(class.canonical_name().to_string())
    }

    fn resolve(&self, simple: &str) -> Option<ClassName> {
        for depth in (0..self.scopes.len()).rev() {
            if self.scopes[depth].nested.iter().any(|name| name == simple) {
                return Some(self.stack_class_name(depth, simple));
            }
        }

        if let Some(top) = self.scopes.first() {
            if top.name.as_deref() == Some(simple) {
                return Some(ClassName::new(&self.namespace, simple));
            }
        }

        self.imported_types.get(simple).cloned()
    }

    /// The type named `simple` declared inside the scope at `depth`.
    fn stack_class_name(&self, depth: usize, simple: &str) -> ClassName {
        let mut names = self.scopes[..=depth]
            .iter()
            .filter_map(|scope| scope.name.as_deref());
        let top = names.next().unwrap_or_default();
        names
            .fold(ClassName::new(&self.namespace, top), |outer, name| {
                outer.nested_class(name)
            })
            .nested_class(simple)
    }

    /// Ask for `class` to be imported under its top-level simple name.
    ///
    /// The first claim for a simple name wins; a claim by a different type
    /// marks the name ambiguous and neither type is imported.
    fn claim(&mut self, class: &ClassName) {
        let top_level = class.top_level();
        let simple = top_level.simple_name();
        match self.claims.get(simple) {
            Some(existing) if existing != top_level => {
                if self.ambiguous.insert(simple.to_string()) {
                    tracing::trace!(
                        name = simple,
                        first = %existing,
                        second = %top_level,
                        "ambiguous simple name, both types stay qualified"
                    );
                }
            }
            Some(_) => {}
            None => {
                self.claims
                    .insert(simple.to_string(), top_level.clone());
            }
        }
    }
}

/// The fully qualified spelling of `class`. Global types get the `global::`
/// alias so they cannot bind to a type of the current namespace.
fn qualified_name(class: &ClassName) -> String {
    if class.namespace().is_empty() {
        format!("global::{}", class.canonical_name())
    } else {
        class.canonical_name().to_string()
    }
}
