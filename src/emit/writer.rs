//! Indentation-aware text builder the artifact writers assemble files with.
//!
//! Blocks go through [`CodeWriter::scope`], which writes the opener, indents,
//! runs the body closure, and closes the bracket on its own line. The close
//! happens on every path out of the closure, so an emitted file can never end
//! up with an unbalanced block no matter how a writer is composed.

/// Bracket pair for a scope. The open text is appended to the opener line;
/// the close text lands on its own line at the outer indent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeBrackets {
    pub open: &'static str,
    pub close: &'static str,
}

impl ScopeBrackets {
    /// Plain brace block: `opener {` ... `}`.
    pub const BRACE: ScopeBrackets = ScopeBrackets {
        open: " {",
        close: "}",
    };

    /// Brace block closed as a statement: `opener {` ... `};`.
    pub const BRACE_STMT: ScopeBrackets = ScopeBrackets {
        open: " {",
        close: "};",
    };

    /// Brace block closed as a list element: `opener {` ... `},`.
    pub const BRACE_ITEM: ScopeBrackets = ScopeBrackets {
        open: " {",
        close: "},",
    };

    /// Square-bracket block in expression position: `opener[` ... `]`.
    pub const SQUARE: ScopeBrackets = ScopeBrackets {
        open: "[",
        close: "]",
    };

    /// Square-bracket block closed as a list element: `opener[` ... `],`.
    pub const SQUARE_ITEM: ScopeBrackets = ScopeBrackets {
        open: "[",
        close: "],",
    };
}

/// Accumulates generated text, one tab per indent level.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One indented line. An empty `text` writes a bare newline so blank
    /// lines carry no trailing tabs.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push('\t');
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Verbatim text, no indentation and no trailing newline.
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Brace scope: `opener {`, the body one level deeper, then `}`.
    pub fn scope(&mut self, opener: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.scope_with(opener, ScopeBrackets::BRACE, body);
    }

    /// Scope with an explicit bracket pair.
    pub fn scope_with(
        &mut self,
        opener: impl AsRef<str>,
        brackets: ScopeBrackets,
        body: impl FnOnce(&mut Self),
    ) {
        self.line(format!("{}{}", opener.as_ref(), brackets.open));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line(brackets.close);
    }

    /// The accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}
