//! Deferred-space line wrapping.
//!
//! Text following a wrapping space is buffered until it is known whether it
//! still fits before the column limit. If it does, the space is written;
//! otherwise a newline and the continuation indent are.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flush {
    /// Newline plus continuation indent.
    Wrap,
    /// A single space.
    Space,
    /// Nothing (zero-width break).
    Empty,
}

#[derive(Debug)]
pub(crate) struct LineWrapper {
    out: String,
    discard: bool,
    indent: String,
    column_limit: usize,
    buffer: String,
    column: usize,
    indent_level: usize,
    next_flush: Option<Flush>,
}

impl LineWrapper {
    /// A discarding wrapper tracks columns but keeps no text.
    pub(crate) fn new(indent: String, column_limit: usize, discard: bool) -> Self {
        Self {
            out: String::new(),
            discard,
            indent,
            column_limit,
            buffer: String::new(),
            column: 0,
            indent_level: 0,
            next_flush: None,
        }
    }

    pub(crate) fn append(&mut self, s: &str) {
        if let Some(pending) = self.next_flush {
            let next_newline = s.find('\n');
            let width = s.chars().count();
            if next_newline.is_none() && self.column + width <= self.column_limit {
                self.buffer.push_str(s);
                self.column += width;
                return;
            }
            let wrap = match next_newline {
                None => true,
                Some(at) => self.column + s[..at].chars().count() > self.column_limit,
            };
            self.flush(if wrap { Flush::Wrap } else { pending });
        }

        self.write(s);
        self.column = match s.rfind('\n') {
            Some(at) => s[at + 1..].chars().count(),
            None => self.column + s.chars().count(),
        };
    }

    /// A space that becomes a newline indented `indent_level` levels if the
    /// following text would overflow.
    pub(crate) fn wrapping_space(&mut self, indent_level: usize) {
        if let Some(pending) = self.next_flush {
            self.flush(pending);
        }
        // The deferred space still occupies a column.
        self.column += 1;
        self.next_flush = Some(Flush::Space);
        self.indent_level = indent_level;
    }

    /// A break that writes nothing unless the line has to wrap.
    pub(crate) fn zero_width_space(&mut self, indent_level: usize) {
        if self.column == 0 {
            return;
        }
        if let Some(pending) = self.next_flush {
            self.flush(pending);
        }
        self.next_flush = Some(Flush::Empty);
        self.indent_level = indent_level;
    }

    pub(crate) fn finish(mut self) -> String {
        if let Some(pending) = self.next_flush {
            self.flush(pending);
        }
        self.out
    }

    fn flush(&mut self, flush: Flush) {
        match flush {
            Flush::Wrap => {
                self.write("\n");
                for _ in 0..self.indent_level {
                    if !self.discard {
                        self.out.push_str(&self.indent);
                    }
                }
                self.column = self.indent_level * self.indent.chars().count()
                    + self.buffer.chars().count();
            }
            Flush::Space => self.write(" "),
            Flush::Empty => {}
        }
        let buffer = std::mem::take(&mut self.buffer);
        self.write(&buffer);
        self.next_flush = None;
    }

    fn write(&mut self, s: &str) {
        if !self.discard {
            self.out.push_str(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(limit: usize) -> LineWrapper {
        LineWrapper::new("  ".to_string(), limit, false)
    }

    #[test]
    fn test_space_kept_when_text_fits() {
        let mut out = wrapper(10);
        out.append("abcde");
        out.wrapping_space(2);
        out.append("fghi");
        assert_eq!(out.finish(), "abcde fghi");
    }

    #[test]
    fn test_wraps_past_limit() {
        let mut out = wrapper(10);
        out.append("abcde");
        out.wrapping_space(2);
        out.append("fghij");
        assert_eq!(out.finish(), "abcde\n    fghij");
    }

    #[test]
    fn test_zero_width_wrap() {
        let mut out = wrapper(10);
        out.append("abcdefgh(");
        out.zero_width_space(1);
        out.append("ijklm");
        assert_eq!(out.finish(), "abcdefgh(\n  ijklm");
    }

    #[test]
    fn test_zero_width_ignored_at_line_start() {
        let mut out = wrapper(10);
        out.zero_width_space(1);
        out.append("abc");
        assert_eq!(out.finish(), "abc");
    }

    #[test]
    fn test_newline_resets_column() {
        let mut out = wrapper(10);
        out.append("abcdefghij\n");
        out.append("abc");
        out.wrapping_space(1);
        out.append("def");
        assert_eq!(out.finish(), "abcdefghij\nabc def");
    }

    #[test]
    fn test_discarding_keeps_no_text() {
        let mut out = LineWrapper::new("\t".to_string(), 100, true);
        out.append("anything");
        out.wrapping_space(1);
        out.append("more");
        assert_eq!(out.finish(), "");
    }
}
