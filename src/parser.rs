//! Recursive descent parser over the token stream. State is the single
//! lookahead token plus the doc comment waiting to be attached.

use crate::ast::{
    Decl, Document, EnumDecl, EnumValue, Member, NamespaceDecl, StructDecl,
    TableDecl, TypeExpr, UnionDecl,
};
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Clone, Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, ParseError>;

pub fn parse_document(src: &str) -> Result<Document> {
    Parser::new(src).document()
}

fn kind_name(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        Colon => "':'",
        ColonColon => "'::'",
        Semicolon => "';'",
        Comma => "','",
        Equal => "'='",
        LBrace => "'{'",
        RBrace => "'}'",
        Bool => "'Bool'",
        Bytes => "'Bytes'",
        Text => "'Text'",
        Int8 => "'Int8'",
        Int16 => "'Int16'",
        Int32 => "'Int32'",
        Int64 => "'Int64'",
        UInt8 => "'UInt8'",
        UInt16 => "'UInt16'",
        UInt32 => "'UInt32'",
        UInt64 => "'UInt64'",
        Float32 => "'Float32'",
        Float64 => "'Float64'",
        List => "'List'",
        Optional => "'Optional'",
        Inplace => "'inplace'",
        Enum => "'enum'",
        Struct => "'struct'",
        Table => "'table'",
        Union => "'union'",
        Namespace => "'namespace'",
        True => "'true'",
        False => "'false'",
        Identifier => "an identifier",
        Number => "a number",
        MagicId => "a magic id",
        DocComment => "a doc comment",
        Bad => "a stray character",
        Eof => "end of file",
    }
}

const SCALARS: [TokenKind; 11] = [
    TokenKind::Bool,
    TokenKind::Int8,
    TokenKind::Int16,
    TokenKind::Int32,
    TokenKind::Int64,
    TokenKind::UInt8,
    TokenKind::UInt16,
    TokenKind::UInt32,
    TokenKind::UInt64,
    TokenKind::Float32,
    TokenKind::Float64,
];

struct Parser<'a> {
    src: &'a str,
    lexer: Lexer<'a>,
    token: Token,
    pending_doc: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let mut parser = Parser {
            src,
            lexer: Lexer::new(src),
            token: Token {
                kind: TokenKind::Eof,
                index: 0,
                len: 0,
            },
            pending_doc: None,
        };
        parser.advance();
        parser
    }

    /// Step to the next non-doc token. A doc comment survives only into
    /// the position directly after it, anything older is discarded.
    fn advance(&mut self) {
        self.pending_doc = None;
        loop {
            self.token = self.lexer.next_token();
            if self.token.kind == TokenKind::DocComment {
                self.pending_doc = Some(self.token);
            } else {
                return;
            }
        }
    }

    fn unexpected(&self, accepted: &[TokenKind]) -> ParseError {
        let list = accepted
            .iter()
            .map(|k| kind_name(*k))
            .collect::<Vec<_>>()
            .join(", ");
        let message = if accepted.len() == 1 {
            format!("Expected {} got {}", list, kind_name(self.token.kind))
        } else {
            format!(
                "Expected one of {} got {}",
                list,
                kind_name(self.token.kind)
            )
        };
        ParseError {
            token: self.token,
            message,
        }
    }

    fn consume(&mut self, accepted: &[TokenKind]) -> Result<Token> {
        if !accepted.contains(&self.token.kind) {
            return Err(self.unexpected(accepted));
        }
        let token = self.token;
        self.advance();
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.token.kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self) {
        if matches!(self.token.kind, TokenKind::Comma | TokenKind::Semicolon)
        {
            self.advance();
        }
    }

    fn document(&mut self) -> Result<Document> {
        let mut decls = Vec::new();
        while self.token.kind != TokenKind::Eof {
            let doc = self.pending_doc.take();
            let token = self.consume(&[
                TokenKind::Namespace,
                TokenKind::Enum,
                TokenKind::Struct,
                TokenKind::Table,
                TokenKind::Union,
            ])?;
            let decl = match token.kind {
                TokenKind::Namespace => self.namespace(token)?,
                TokenKind::Enum => {
                    let ident = self.consume(&[TokenKind::Identifier])?;
                    let mut decl = self.enum_body(token)?;
                    decl.ident = Some(ident);
                    decl.doc = doc;
                    Decl::Enum(decl)
                }
                TokenKind::Struct => {
                    let ident = self.consume(&[TokenKind::Identifier])?;
                    Decl::Struct(StructDecl {
                        token,
                        ident: Some(ident),
                        doc,
                        members: self.members(false)?,
                    })
                }
                TokenKind::Table => {
                    let ident = self.consume(&[TokenKind::Identifier])?;
                    let magic = self.magic()?;
                    Decl::Table(TableDecl {
                        token,
                        ident: Some(ident),
                        magic,
                        doc,
                        members: self.members(false)?,
                    })
                }
                TokenKind::Union => {
                    let ident = self.consume(&[TokenKind::Identifier])?;
                    Decl::Union(UnionDecl {
                        token,
                        ident: Some(ident),
                        doc,
                        members: self.members(true)?,
                    })
                }
                _ => unreachable!(),
            };
            decls.push(decl);
            self.eat_separator();
        }
        Ok(Document { decls })
    }

    fn namespace(&mut self, token: Token) -> Result<Decl> {
        let mut name = String::new();
        loop {
            let part = self.consume(&[TokenKind::Identifier])?;
            name.push_str(part.text(self.src));
            let sep = self
                .consume(&[TokenKind::ColonColon, TokenKind::Semicolon])?;
            if sep.kind == TokenKind::Semicolon {
                break;
            }
            name.push_str("::");
        }
        Ok(Decl::Namespace(NamespaceDecl { token, name }))
    }

    /// `{ value { sep value } }`, identifier already consumed by caller.
    fn enum_body(&mut self, token: Token) -> Result<EnumDecl> {
        self.consume(&[TokenKind::LBrace])?;
        let mut values = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.pending_doc.take();
            if self.token.kind != TokenKind::Identifier {
                return Err(self.unexpected(&[
                    TokenKind::RBrace,
                    TokenKind::Identifier,
                ]));
            }
            let ident = self.consume(&[TokenKind::Identifier])?;
            values.push(EnumValue { ident, doc });
            self.eat_separator();
        }
        Ok(EnumDecl {
            token,
            ident: None,
            doc: None,
            values,
        })
    }

    /// Optional `@XXXXXXXX` after a table name. Format is checked here so
    /// the error points at the token, requiredness is semantic.
    fn magic(&mut self) -> Result<Option<Token>> {
        if self.token.kind != TokenKind::MagicId {
            return Ok(None);
        }
        let token = self.consume(&[TokenKind::MagicId])?;
        let digits = &token.text(self.src)[1..];
        let well_formed = digits.len() == 8
            && digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));
        if !well_formed {
            return Err(ParseError {
                token,
                message: "Malformed magic, expected 8 uppercase \
                          hexadecimal digits"
                    .to_owned(),
            });
        }
        Ok(Some(token))
    }

    fn members(&mut self, union_body: bool) -> Result<Vec<Member>> {
        self.consume(&[TokenKind::LBrace])?;
        let mut members = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.pending_doc.take();
            if self.token.kind != TokenKind::Identifier {
                return Err(self.unexpected(&[
                    TokenKind::RBrace,
                    TokenKind::Identifier,
                ]));
            }
            let ident = self.consume(&[TokenKind::Identifier])?;
            if union_body && self.token.kind == TokenKind::LBrace {
                // `arm { ... }` shorthand for an inline table
                let body = self.members(false)?;
                members.push(Member {
                    ident,
                    doc,
                    optional: None,
                    list: None,
                    inplace: None,
                    type_: TypeExpr::InlineTable(TableDecl {
                        token: ident,
                        ident: None,
                        magic: None,
                        doc: None,
                        members: body,
                    }),
                    default: None,
                });
                self.eat_separator();
                continue;
            }
            self.consume(&[TokenKind::Colon])?;
            let mut optional = None;
            let mut list = None;
            let mut inplace = None;
            loop {
                let slot = match self.token.kind {
                    TokenKind::Optional => &mut optional,
                    TokenKind::List => &mut list,
                    TokenKind::Inplace => &mut inplace,
                    _ => break,
                };
                if slot.is_some() {
                    return Err(ParseError {
                        token: self.token,
                        message: "Duplicate modifier".to_owned(),
                    });
                }
                *slot = Some(self.token);
                self.advance();
            }
            let type_ = self.type_expr()?;
            let default = if self.eat(TokenKind::Equal) {
                Some(self.consume(&[
                    TokenKind::True,
                    TokenKind::False,
                    TokenKind::Number,
                    TokenKind::Identifier,
                ])?)
            } else {
                None
            };
            members.push(Member {
                ident,
                doc,
                optional,
                list,
                inplace,
                type_,
                default,
            });
            self.eat_separator();
        }
        Ok(members)
    }

    fn type_expr(&mut self) -> Result<TypeExpr> {
        match self.token.kind {
            k if SCALARS.contains(&k) => {
                Ok(TypeExpr::Primitive(self.consume(&[k])?))
            }
            TokenKind::Text | TokenKind::Bytes => {
                Ok(TypeExpr::Primitive(self.consume(&[self.token.kind])?))
            }
            TokenKind::Identifier => {
                Ok(TypeExpr::Named(self.consume(&[TokenKind::Identifier])?))
            }
            TokenKind::Enum => {
                let token = self.consume(&[TokenKind::Enum])?;
                Ok(TypeExpr::InlineEnum(self.enum_body(token)?))
            }
            TokenKind::Struct => {
                let token = self.consume(&[TokenKind::Struct])?;
                Ok(TypeExpr::InlineStruct(StructDecl {
                    token,
                    ident: None,
                    doc: None,
                    members: self.members(false)?,
                }))
            }
            TokenKind::Table => {
                let token = self.consume(&[TokenKind::Table])?;
                let magic = self.magic()?;
                Ok(TypeExpr::InlineTable(TableDecl {
                    token,
                    ident: None,
                    magic,
                    doc: None,
                    members: self.members(false)?,
                }))
            }
            TokenKind::Union => {
                let token = self.consume(&[TokenKind::Union])?;
                Ok(TypeExpr::InlineUnion(UnionDecl {
                    token,
                    ident: None,
                    doc: None,
                    members: self.members(true)?,
                }))
            }
            _ => {
                let mut accepted = SCALARS.to_vec();
                accepted.extend([
                    TokenKind::Text,
                    TokenKind::Bytes,
                    TokenKind::Identifier,
                    TokenKind::Enum,
                    TokenKind::Struct,
                    TokenKind::Table,
                    TokenKind::Union,
                ]);
                Err(self.unexpected(&accepted))
            }
        }
    }
}
