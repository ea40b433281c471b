//! Schema tokenizer. Tokens are `(kind, index, len)` slices into the
//! source text, nothing is copied.

use num_enum::TryFromPrimitive;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Colon,
    ColonColon,
    Semicolon,
    Comma,
    Equal,
    LBrace,
    RBrace,
    Bool,
    Bytes,
    Text,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    List,
    Optional,
    Inplace,
    Enum,
    Struct,
    Table,
    Union,
    Namespace,
    True,
    False,
    Identifier,
    Number,
    MagicId,
    DocComment,
    Bad,
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub index: u32,
    pub len: u32,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.index as usize..(self.index + self.len) as usize]
    }

    pub fn end(&self) -> u32 {
        self.index + self.len
    }
}

/// Single byte punctuation, keyed by the byte itself.
#[derive(Clone, Copy, TryFromPrimitive)]
#[repr(u8)]
enum Punct {
    Colon = b':',
    Semicolon = b';',
    Comma = b',',
    Equal = b'=',
    LBrace = b'{',
    RBrace = b'}',
}

impl Punct {
    fn kind(self) -> TokenKind {
        match self {
            Punct::Colon => TokenKind::Colon,
            Punct::Semicolon => TokenKind::Semicolon,
            Punct::Comma => TokenKind::Comma,
            Punct::Equal => TokenKind::Equal,
            Punct::LBrace => TokenKind::LBrace,
            Punct::RBrace => TokenKind::RBrace,
        }
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "Bool" => TokenKind::Bool,
        "Bytes" => TokenKind::Bytes,
        "Text" => TokenKind::Text,
        "Int8" => TokenKind::Int8,
        "Int16" => TokenKind::Int16,
        "Int32" => TokenKind::Int32,
        "Int64" => TokenKind::Int64,
        "UInt8" => TokenKind::UInt8,
        "UInt16" => TokenKind::UInt16,
        "UInt32" => TokenKind::UInt32,
        "UInt64" => TokenKind::UInt64,
        "Float32" => TokenKind::Float32,
        "Float64" => TokenKind::Float64,
        "List" | "list" => TokenKind::List,
        "Optional" | "optional" => TokenKind::Optional,
        "inplace" => TokenKind::Inplace,
        "enum" => TokenKind::Enum,
        "struct" => TokenKind::Struct,
        "table" => TokenKind::Table,
        "union" => TokenKind::Union,
        "namespace" => TokenKind::Namespace,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => return None,
    })
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    cur: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            cur: 0,
        }
    }

    fn token(&self, kind: TokenKind, index: usize, len: usize) -> Token {
        Token {
            kind,
            index: index as u32,
            len: len as u32,
        }
    }

    fn peek(&self, ahead: usize) -> u8 {
        self.bytes.get(self.cur + ahead).copied().unwrap_or(0)
    }

    fn starts_with(&self, at: usize, pat: &str) -> bool {
        self.bytes[at..].starts_with(pat.as_bytes())
    }

    /// Consume one source line, leaving the cursor on the newline.
    fn skip_line(&mut self) {
        while self.cur < self.bytes.len() && self.bytes[self.cur] != b'\n' {
            self.cur += 1;
        }
    }

    /// A maximal run of `///` or `##` lines forms one doc comment token.
    fn doc_line_run(&mut self) -> Token {
        let start = self.cur;
        self.skip_line();
        let mut end = self.cur;
        loop {
            let mut probe = self.cur;
            if probe < self.bytes.len() {
                probe += 1; // the newline
            }
            while probe < self.bytes.len()
                && matches!(self.bytes[probe], b' ' | b'\t' | b'\r')
            {
                probe += 1;
            }
            if self.starts_with(probe, "///") || self.starts_with(probe, "##")
            {
                self.cur = probe;
                self.skip_line();
                end = self.cur;
            } else {
                break;
            }
        }
        self.token(TokenKind::DocComment, start, end - start)
    }

    /// `/** ... */` block. The token spans the whole comment.
    fn doc_block(&mut self) -> Token {
        let start = self.cur;
        let mut probe = self.cur + 3;
        while probe < self.bytes.len() && !self.starts_with(probe, "*/") {
            probe += 1;
        }
        if probe >= self.bytes.len() {
            // unterminated, surface the opener and stop scanning
            self.cur = self.bytes.len();
            return self.token(TokenKind::Bad, start, 1);
        }
        self.cur = probe + 2;
        self.token(TokenKind::DocComment, start, self.cur - start)
    }

    /// Nested `/* ... */`, skipped entirely. Returns a token only for an
    /// unterminated comment.
    fn block_comment(&mut self) -> Option<Token> {
        let start = self.cur;
        let mut depth = 1;
        self.cur += 2;
        while depth != 0 && self.cur < self.bytes.len() {
            if self.starts_with(self.cur, "/*") {
                depth += 1;
                self.cur += 2;
            } else if self.starts_with(self.cur, "*/") {
                depth -= 1;
                self.cur += 2;
            } else {
                self.cur += 1;
            }
        }
        if depth != 0 {
            return Some(self.token(TokenKind::Bad, start, 1));
        }
        None
    }

    fn identifier(&mut self) -> Token {
        let start = self.cur;
        self.cur += 1;
        while self.peek(0) == b'_' || self.peek(0).is_ascii_alphanumeric() {
            self.cur += 1;
        }
        let text = &self.src[start..self.cur];
        let kind = keyword(text).unwrap_or(TokenKind::Identifier);
        self.token(kind, start, self.cur - start)
    }

    fn magic(&mut self) -> Token {
        let start = self.cur;
        self.cur += 1;
        while self.peek(0).is_ascii_hexdigit() {
            self.cur += 1;
        }
        self.token(TokenKind::MagicId, start, self.cur - start)
    }

    /// Deliberately permissive, the annotator range checks the value.
    fn number(&mut self) -> Token {
        let start = self.cur;
        if self.peek(0) == b'-' {
            self.cur += 1;
        }
        while self.peek(0).is_ascii_digit() {
            self.cur += 1;
        }
        if self.peek(0) == b'.' {
            self.cur += 1;
            while self.peek(0).is_ascii_digit() {
                self.cur += 1;
            }
        }
        if matches!(self.peek(0), b'e' | b'E') {
            self.cur += 1;
            if matches!(self.peek(0), b'+' | b'-') {
                self.cur += 1;
            }
            while self.peek(0).is_ascii_digit() {
                self.cur += 1;
            }
        }
        self.token(TokenKind::Number, start, self.cur - start)
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(&b) = self.bytes.get(self.cur) else {
                return self.token(TokenKind::Eof, self.bytes.len(), 0);
            };
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.cur += 1;
                }
                b':' if self.peek(1) == b':' => {
                    let t = self.token(TokenKind::ColonColon, self.cur, 2);
                    self.cur += 2;
                    return t;
                }
                b'#' => {
                    if self.peek(1) == b'#' {
                        return self.doc_line_run();
                    }
                    self.skip_line();
                }
                b'/' if self.peek(1) == b'/' => {
                    if self.peek(2) == b'/' {
                        return self.doc_line_run();
                    }
                    self.skip_line();
                }
                b'/' if self.peek(1) == b'*' => {
                    if self.peek(2) == b'*' && self.peek(3) != b'/' {
                        return self.doc_block();
                    }
                    if let Some(bad) = self.block_comment() {
                        return bad;
                    }
                }
                b'@' => return self.magic(),
                b'-' | b'0'..=b'9' => return self.number(),
                _ => {
                    if let Ok(p) = Punct::try_from(b) {
                        let t = self.token(p.kind(), self.cur, 1);
                        self.cur += 1;
                        return t;
                    }
                    if b == b'_' || b.is_ascii_alphabetic() {
                        return self.identifier();
                    }
                    // one bad character, the parser reports it
                    let width = self.src[self.cur..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    let t = self.token(TokenKind::Bad, self.cur, width);
                    self.cur += width;
                    return t;
                }
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields every token including the final `Eof`, then ends.
    fn next(&mut self) -> Option<Token> {
        if self.cur > self.bytes.len() {
            return None;
        }
        let t = self.next_token();
        if t.kind == TokenKind::Eof {
            self.cur = self.bytes.len() + 1;
        }
        Some(t)
    }
}
