//! Positional diagnostics.
//!
//! Errors are accumulated while a pass keeps running, then rendered in one
//! go. Line and column are recomputed from the token index only here, on
//! the reporting path.

use crate::lexer::Token;

use std::io::{self, Write};

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub token: Token,
    pub context: String,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    pub list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Render every diagnostic with its source citation: file label,
    /// 1-based line, the offending line and a caret under the token. Tabs
    /// before the token are reproduced as tabs so the caret stays aligned.
    pub fn render(
        &self,
        label: &str,
        src: &str,
        out: &mut impl Write,
    ) -> io::Result<()> {
        for d in &self.list {
            let index = d.token.index as usize;
            let mut line = 1;
            let mut line_start = 0;
            for (i, b) in src.bytes().enumerate().take(index) {
                if b == b'\n' {
                    line += 1;
                    line_start = i + 1;
                }
            }
            let line_end = src[line_start..]
                .find('\n')
                .map_or(src.len(), |n| line_start + n);
            writeln!(
                out,
                "Error in {} at {}:{}: {}",
                d.context, label, line, d.message
            )?;
            writeln!(out, "{}", &src[line_start..line_end])?;
            let mut caret = String::new();
            for c in src[line_start..index.min(line_end)].chars() {
                caret.push(if c == '\t' { '\t' } else { ' ' });
            }
            let width = d.token.text(src).chars().count().max(1);
            caret.extend(std::iter::repeat('^').take(width));
            writeln!(out, "{caret}")?;
        }
        Ok(())
    }
}

/// Error sink handed through a pass. The context names the declaration
/// being visited so messages read "Error in table Foo ...".
#[derive(Debug, Default)]
pub struct Reporter {
    context: String,
    diags: Diagnostics,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter {
            context: "schema".to_owned(),
            diags: Diagnostics::default(),
        }
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn error(&mut self, token: Token, message: impl Into<String>) {
        self.diags.list.push(Diagnostic {
            token,
            context: self.context.clone(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> usize {
        self.diags.len()
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    #[test]
    fn caret_alignment_with_tabs() {
        let src = "table T {\n\tbad_name: UInt8\n}\n";
        let token = Token {
            kind: TokenKind::Identifier,
            index: 11,
            len: 8,
        };
        let mut rep = Reporter::new();
        rep.set_context("table T");
        rep.error(token, "Name must be camelCase");
        let mut out = Vec::new();
        rep.into_diagnostics()
            .render("demo.fp", src, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Error in table T at demo.fp:2: Name must be camelCase\n\
             \tbad_name: UInt8\n\
             \t^^^^^^^^\n"
        );
    }
}
