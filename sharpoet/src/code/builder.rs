//! Mutable builder for [`CodeBlock`].

use super::{Arg, CodeBlock, Part};
use crate::{Error, Result};

/// Fluent builder for code blocks.
///
/// Calls chain through `&mut self`. The first malformed call is remembered
/// and returned by [`CodeBlockBuilder::build`]; later calls become no-ops.
///
/// # Example
///
/// ```
/// use sharpoet::{CodeBlock, args};
///
/// let mut builder = CodeBlock::builder();
/// builder
///     .begin_control_flow("if ($N > 0)", args!["count"])
///     .add_statement("return $S", args!["positive"])
///     .next_control_flow("else", args![])
///     .add_statement("return $S", args![None::<&str>])
///     .end_control_flow();
/// let block = builder.build().unwrap();
///
/// assert_eq!(
///     block.render().unwrap(),
///     "if (count > 0) {\n\treturn \"positive\";\n} else {\n\treturn null;\n}\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBlockBuilder {
    parts: Vec<Part>,
    statements: usize,
    flow_depth: usize,
    /// Indentation opened by `$>` and not yet closed by `$<`.
    indent_depth: isize,
    statement_open: bool,
    error: Option<Error>,
}

impl CodeBlockBuilder {
    pub(super) fn from_block(block: &CodeBlock) -> Self {
        Self {
            parts: block.parts.clone(),
            statements: block.statements,
            indent_depth: indent_profile(&block.parts).0,
            ..Self::default()
        }
    }

    /// Append formatted code.
    pub fn add(&mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> &mut Self {
        if self.error.is_none() {
            let args: Vec<Arg> = args.into_iter().collect();
            if let Err(err) = self.parse(format, &args) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Append a statement. The terminating `;` and newline are added.
    pub fn add_statement(&mut self, format: &str, args: impl IntoIterator<Item = Arg>) -> &mut Self {
        self.add(&format!("$[{format}$]"), args)
    }

    /// Append another block verbatim.
    pub fn add_code(&mut self, block: &CodeBlock) -> &mut Self {
        if self.error.is_none() {
            if let Err(err) = self.splice(block) {
                self.error = Some(err);
                return self;
            }
            if self.flow_depth == 0 {
                self.statements += block.statements;
            }
            self.parts.extend(block.parts.iter().cloned());
        }
        self
    }

    /// Open a braced block, for example `if (x)` or `foreach (var item in items)`.
    pub fn begin_control_flow(
        &mut self,
        control_flow: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> &mut Self {
        self.add(&format!("{control_flow} {{\n$>"), args);
        self.flow_depth += 1;
        self
    }

    /// Close the current block and open the next one, for example `else if (y)`.
    pub fn next_control_flow(
        &mut self,
        control_flow: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> &mut Self {
        if self.flow_depth == 0 {
            return self.fail(format!("'{control_flow}' continues a control flow that was never opened"));
        }
        self.add(&format!("$<}} {control_flow} {{\n$>"), args)
    }

    /// Close the current block.
    pub fn end_control_flow(&mut self) -> &mut Self {
        if self.flow_depth == 0 {
            return self.fail("control flow closed without being opened");
        }
        self.flow_depth -= 1;
        self.add("$<}\n", [])
    }

    /// Close the current block with a trailing clause, for example `} while (x);`.
    pub fn end_control_flow_with(
        &mut self,
        control_flow: &str,
        args: impl IntoIterator<Item = Arg>,
    ) -> &mut Self {
        if self.flow_depth == 0 {
            return self.fail(format!("'{control_flow}' closes a control flow that was never opened"));
        }
        self.flow_depth -= 1;
        self.add(&format!("$<}} {control_flow};\n"), args)
    }

    /// Increase the indentation of the following lines.
    pub fn indent(&mut self) -> &mut Self {
        self.add("$>", [])
    }

    /// Undo one [`CodeBlockBuilder::indent`].
    pub fn unindent(&mut self) -> &mut Self {
        self.add("$<", [])
    }

    /// Check if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Finish the block.
    pub fn build(&self) -> Result<CodeBlock> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.flow_depth > 0 {
            return Err(Error::structural(format!(
                "{} control flow(s) left open",
                self.flow_depth
            )));
        }
        if self.statement_open {
            return Err(Error::structural("statement '$[' was never closed with '$]'"));
        }
        Ok(CodeBlock {
            parts: self.parts.clone(),
            statements: self.statements,
        })
    }

    fn fail(&mut self, message: impl Into<String>) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(Error::structural(message));
        }
        self
    }

    /// Account for a nested block before its parts are spliced in.
    fn splice(&mut self, block: &CodeBlock) -> Result<()> {
        if self.statement_open && opens_statement(&block.parts) {
            return Err(Error::structural(
                "statement '$[' opened inside another statement",
            ));
        }
        let (net, lowest) = indent_profile(&block.parts);
        if self.indent_depth + lowest < 0 {
            return Err(unindent_error());
        }
        self.indent_depth += net;
        Ok(())
    }

    fn parse(&mut self, format: &str, args: &[Arg]) -> Result<()> {
        let mut used = vec![false; args.len()];
        let mut next_relative = 0;
        let mut relative = false;
        let mut indexed = false;
        let mut literal = String::new();
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            let Some(kind) = chars.next() else {
                return Err(Error::structural(format!("dangling '$' at the end of '{format}'")));
            };
            if !digits.is_empty() && !matches!(kind, 'L' | 'S' | 'T' | 'N') {
                return Err(Error::structural(format!("'${digits}{kind}' cannot be indexed")));
            }

            let part = match kind {
                '$' => {
                    literal.push('$');
                    continue;
                }
                '>' => {
                    self.indent_depth += 1;
                    Part::Indent
                }
                '<' => {
                    if self.indent_depth == 0 {
                        return Err(unindent_error());
                    }
                    self.indent_depth -= 1;
                    Part::Unindent
                }
                '[' => {
                    if self.statement_open {
                        return Err(Error::structural("statement '$[' opened inside another statement"));
                    }
                    self.statement_open = true;
                    Part::StatementBegin
                }
                ']' => {
                    if !self.statement_open {
                        return Err(Error::structural("'$]' without an open statement"));
                    }
                    self.statement_open = false;
                    if self.flow_depth == 0 {
                        self.statements += 1;
                    }
                    Part::StatementEnd
                }
                'W' => Part::WrappingSpace,
                'Z' => Part::ZeroWidthSpace,
                'L' | 'S' | 'T' | 'N' => {
                    let index = if digits.is_empty() {
                        relative = true;
                        next_relative += 1;
                        next_relative - 1
                    } else {
                        indexed = true;
                        match digits.parse::<usize>() {
                            Ok(n) if n > 0 => n - 1,
                            _ => {
                                return Err(Error::structural(format!(
                                    "argument index '{digits}' must start at 1"
                                )));
                            }
                        }
                    };
                    if relative && indexed {
                        return Err(Error::structural(
                            "cannot mix indexed and relative placeholders",
                        ));
                    }
                    let Some(arg) = args.get(index) else {
                        return Err(Error::structural(format!(
                            "'{format}' needs argument {} but {} were given",
                            index + 1,
                            args.len()
                        )));
                    };
                    used[index] = true;
                    self.argument_part(kind, arg)?
                }
                other => {
                    return Err(Error::structural(format!("invalid placeholder '${other}'")));
                }
            };

            if !literal.is_empty() {
                self.parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            self.parts.push(part);
        }

        if !literal.is_empty() {
            self.parts.push(Part::Literal(literal));
        }
        if let Some(unused) = used.iter().position(|used| !used) {
            return Err(Error::structural(format!(
                "argument {} is unused in '{format}'",
                unused + 1
            )));
        }
        Ok(())
    }

    fn argument_part(&mut self, kind: char, arg: &Arg) -> Result<Part> {
        let part = match (kind, arg) {
            ('L', Arg::Text(text)) => Part::Literal(text.clone()),
            ('L', Arg::Null) => Part::Literal("null".to_string()),
            ('L', Arg::Type(ty)) => Part::Literal(ty.to_string()),
            ('L', Arg::Code(code)) => {
                self.splice(code)?;
                if self.flow_depth == 0 {
                    self.statements += code.statements;
                }
                Part::Code(code.clone())
            }
            ('L', Arg::Declaration(spec)) => Part::Declaration(spec.clone()),
            ('S', Arg::Text(text)) => Part::Str(Some(text.clone())),
            ('S', Arg::Null) => Part::Str(None),
            ('T', Arg::Type(ty)) => Part::Type(ty.clone()),
            ('N', Arg::Text(name)) => Part::Name(name.clone()),
            (kind, arg) => {
                return Err(Error::structural(format!(
                    "'${kind}' cannot take {}",
                    arg.describe()
                )));
            }
        };
        Ok(part)
    }
}

fn unindent_error() -> Error {
    Error::structural("'$<' unindents past the level the block started at")
}

/// Whether `parts` open a statement, looking through nested blocks.
fn opens_statement(parts: &[Part]) -> bool {
    parts.iter().any(|part| match part {
        Part::StatementBegin => true,
        Part::Code(code) => opens_statement(&code.parts),
        _ => false,
    })
}

/// Net indentation change of `parts` and the lowest level reached on the
/// way, both relative to where the parts start.
fn indent_profile(parts: &[Part]) -> (isize, isize) {
    let mut level = 0;
    let mut lowest = 0;
    for part in parts {
        match part {
            Part::Indent => level += 1,
            Part::Unindent => {
                level -= 1;
                lowest = lowest.min(level);
            }
            Part::Code(code) => {
                let (net, low) = indent_profile(&code.parts);
                lowest = lowest.min(level + low);
                level += net;
            }
            _ => {}
        }
    }
    (level, lowest)
}
