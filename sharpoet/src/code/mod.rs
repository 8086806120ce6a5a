//! Formatted code fragments.
//!
//! A [`CodeBlock`] is parsed once from a format string with `$` placeholders:
//!
//! | placeholder | meaning |
//! |---|---|
//! | `$L` | literal: text, a nested block, an anonymous type, `null` |
//! | `$S` | string literal, escaped and quoted (or `null`) |
//! | `$T` | type reference, shortened by the writer when possible |
//! | `$N` | identifier |
//! | `$>` / `$<` | increase / decrease indentation |
//! | `$[` / `$]` | open / terminate a statement (`$]` writes `;` and a newline) |
//! | `$W` / `$Z` | space / zero-width break the writer may wrap at |
//! | `$$` | a literal `$` |
//!
//! `$L`, `$S`, `$T` and `$N` take either relative (`$L`) or 1-based indexed
//! (`$1L`) arguments, never both in one format string.

mod arg;
mod builder;

use std::fmt::Write as _;

pub use arg::Arg;
pub use builder::CodeBlockBuilder;

use crate::{
    ClassName, Result, TypeSpec,
    name::TypeName,
    writer::{self, CodeWriter, Renderable},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Part {
    Literal(String),
    Name(String),
    Str(Option<String>),
    Type(TypeName),
    Code(CodeBlock),
    Declaration(Box<TypeSpec>),
    Indent,
    Unindent,
    StatementBegin,
    StatementEnd,
    WrappingSpace,
    ZeroWidthSpace,
}

/// An immutable fragment of code with its placeholders already resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBlock {
    pub(crate) parts: Vec<Part>,
    statements: usize,
}

impl CodeBlock {
    /// Create an empty block builder.
    pub fn builder() -> CodeBlockBuilder {
        CodeBlockBuilder::default()
    }

    /// Parse a single format string.
    pub fn of(format: &str, args: impl IntoIterator<Item = Arg>) -> Result<Self> {
        let mut builder = Self::builder();
        builder.add(format, args);
        builder.build()
    }

    /// Concatenate blocks with `separator` between each pair.
    pub fn join<'a>(blocks: impl IntoIterator<Item = &'a CodeBlock>, separator: &str) -> Self {
        let mut joined = Self::default();
        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 && !separator.is_empty() {
                joined.parts.push(Part::Literal(separator.to_string()));
            }
            joined.parts.extend(block.parts.iter().cloned());
            joined.statements += block.statements;
        }
        joined
    }

    /// Create a builder that continues this block.
    pub fn to_builder(&self) -> CodeBlockBuilder {
        CodeBlockBuilder::from_block(self)
    }

    /// Check if this block renders nothing.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of statements terminated at the top level of this block.
    ///
    /// Statements inside control flow do not count.
    pub fn statement_count(&self) -> usize {
        self.statements
    }

    /// The expression of a block that is exactly one statement, with a
    /// leading `return ` removed.
    ///
    /// Property accessors use this to decide between `get => expr;` and a
    /// braced body.
    pub fn single_expression(&self) -> Option<CodeBlock> {
        if self.statements != 1 {
            return None;
        }
        match self.parts.as_slice() {
            [Part::Code(inner)] => inner.single_expression(),
            [Part::StatementBegin, inner @ .., Part::StatementEnd] => {
                if inner.iter().any(|part| {
                    matches!(
                        part,
                        Part::StatementBegin | Part::StatementEnd | Part::Indent | Part::Unindent
                    )
                }) {
                    return None;
                }
                let mut parts = inner.to_vec();
                if let Some(Part::Literal(first)) = parts.first_mut() {
                    if let Some(rest) = first.strip_prefix("return ") {
                        *first = rest.to_string();
                    }
                    if first.is_empty() {
                        parts.remove(0);
                    }
                }
                Some(CodeBlock {
                    parts,
                    statements: 0,
                })
            }
            _ => None,
        }
    }

    /// Render the block on its own, with every type fully qualified unless
    /// it lives in the global namespace.
    pub fn render(&self) -> Result<String> {
        writer::render(self)
    }

    /// Types a file in `namespace` would import to render this block.
    pub fn required_imports(&self, namespace: &str) -> Result<Vec<ClassName>> {
        writer::required_imports(self, namespace)
    }
}

impl Renderable for CodeBlock {
    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        writer.emit_code(self)
    }
}

/// Quote and escape `value` as a C# string literal.
pub(crate) fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("plain"), "\"plain\"");
        assert_eq!(
            string_literal("say \"hi\"\n\tC:\\temp"),
            "\"say \\\"hi\\\"\\n\\tC:\\\\temp\""
        );
        assert_eq!(string_literal("\u{1b}"), "\"\\u001b\"");
    }

    #[test]
    fn test_statement_count_ignores_nested_flow() {
        let mut builder = CodeBlock::builder();
        builder
            .add_statement("var total = 0", args![])
            .begin_control_flow("foreach (var item in items)", args![])
            .add_statement("total += item", args![])
            .end_control_flow()
            .add_statement("return total", args![]);
        assert_eq!(builder.build().unwrap().statement_count(), 2);
    }

    #[test]
    fn test_appended_block_adds_its_count() {
        let inner = CodeBlock::of("$[a()$]$[b()$]", args![]).unwrap();
        let mut builder = CodeBlock::builder();
        builder.add_statement("c()", args![]).add_code(&inner);
        let block = builder.build().unwrap();
        assert_eq!(block.statement_count(), 3);
        assert_eq!(block.render().unwrap(), "c();\na();\nb();\n");
    }

    #[test]
    fn test_single_expression_strips_return() {
        let mut builder = CodeBlock::builder();
        builder.add_statement("return $N * 2", args!["value"]);
        let block = builder.build().unwrap();
        let expr = block.single_expression().unwrap();
        assert_eq!(expr.render().unwrap(), "value * 2");
    }

    #[test]
    fn test_single_expression_requires_exactly_one_statement() {
        let two = CodeBlock::of("$[a()$]$[b()$]", args![]).unwrap();
        assert!(two.single_expression().is_none());
        assert!(CodeBlock::default().single_expression().is_none());

        let mut builder = CodeBlock::builder();
        builder
            .begin_control_flow("if (x)", args![])
            .add_statement("return 1", args![])
            .end_control_flow();
        assert!(builder.build().unwrap().single_expression().is_none());
    }

    #[test]
    fn test_join() {
        let blocks = [
            CodeBlock::of("$S", args!["a"]).unwrap(),
            CodeBlock::of("$L", args![2]).unwrap(),
        ];
        let joined = CodeBlock::join(&blocks, ", ");
        assert_eq!(joined.render().unwrap(), "\"a\", 2");
    }

    #[test]
    fn test_to_builder_continues_block() {
        let block = CodeBlock::of("$[a()$]", args![]).unwrap();
        let mut builder = block.to_builder();
        builder.add_statement("b()", args![]);
        let extended = builder.build().unwrap();
        assert_eq!(extended.statement_count(), 2);
        assert_eq!(block.statement_count(), 1);
    }

    #[test]
    fn test_required_imports() {
        let list = ClassName::parse("System.Collections.Generic.List");
        let local = ClassName::new("App", "Point");
        let block = CodeBlock::of(
            "var points = new $T()",
            args![TypeName::generic(list.clone(), [local.into()])],
        )
        .unwrap();
        assert_eq!(block.required_imports("App").unwrap(), vec![list]);
    }
}
