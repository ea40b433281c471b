//! Semantic analysis: resolve names, validate every rule, assign wire
//! offsets and bits, compute default byte images.
//!
//! The pass walks top-level declarations in order and fills the four name
//! tables incrementally, so a type reference must resolve to something
//! declared earlier in the document. Errors are accumulated in the
//! reporter and the pass keeps going, an [`ir::Schema`] is only handed
//! out when the run was clean.

use crate::ast::{self, Decl, TypeExpr};
use crate::ir::{
    ArmKind, BitRef, EnumDef, EnumId, EnumValueDef, Field, FieldKind,
    ListElem, ScalarDefault, Schema, StructDef, StructId, TableDef,
    TableId, UnionArm, UnionDef, UnionId,
};
use crate::keywords::is_reserved;
use crate::layout::{
    BitAlloc, Primitive, ENUM_SENTINEL, MAX_ENUM_VALUES, POINTER_BYTES,
    UNION_BYTES,
};
use crate::lexer::{Token, TokenKind};
use crate::report::{Diagnostics, Reporter};

use std::collections::HashMap;

use num_traits::Bounded;

pub fn annotate(
    src: &str,
    document: &ast::Document,
) -> Result<Schema, Diagnostics> {
    let mut annotater = Annotater {
        src,
        reporter: Reporter::new(),
        schema: Schema::default(),
        enums: HashMap::new(),
        structs: HashMap::new(),
        tables: HashMap::new(),
        unions: HashMap::new(),
    };
    annotater.document(document);
    if annotater.reporter.errors() == 0 {
        Ok(annotater.schema)
    } else {
        Err(annotater.reporter.into_diagnostics())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Struct,
    Table,
}

/// Ids of inline declarations hoisted out of the current member.
#[derive(Default, Clone, Copy)]
struct Hoisted {
    enum_: Option<EnumId>,
    struct_: Option<StructId>,
    table: Option<TableId>,
    union_: Option<UnionId>,
}

struct Annotater<'a> {
    src: &'a str,
    reporter: Reporter,
    schema: Schema,
    enums: HashMap<String, (Token, EnumId)>,
    structs: HashMap<String, (Token, StructId)>,
    tables: HashMap<String, (Token, TableId)>,
    unions: HashMap<String, (Token, UnionId)>,
}

fn ucamel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        }
        None => String::new(),
    }
}

fn primitive_of(kind: TokenKind) -> Option<Primitive> {
    Some(match kind {
        TokenKind::Bool => Primitive::Bool,
        TokenKind::UInt8 => Primitive::UInt8,
        TokenKind::Int8 => Primitive::Int8,
        TokenKind::UInt16 => Primitive::UInt16,
        TokenKind::Int16 => Primitive::Int16,
        TokenKind::UInt32 => Primitive::UInt32,
        TokenKind::Int32 => Primitive::Int32,
        TokenKind::UInt64 => Primitive::UInt64,
        TokenKind::Int64 => Primitive::Int64,
        TokenKind::Float32 => Primitive::Float32,
        TokenKind::Float64 => Primitive::Float64,
        _ => return None,
    })
}

/// Is the member an `optional` int or bool, the cases that take a
/// presence bit from the shared byte?
fn wants_presence_bit(member: &ast::Member) -> bool {
    if member.optional.is_none() || member.list.is_some() {
        return false;
    }
    match &member.type_ {
        TypeExpr::Primitive(t) => matches!(
            primitive_of(t.kind),
            Some(p) if p == Primitive::Bool || !p.is_float()
        ),
        _ => false,
    }
}

impl<'a> Annotater<'a> {
    fn text(&self, token: Token) -> &'a str {
        token.text(self.src)
    }

    fn error(&mut self, token: Token, message: impl Into<String>) {
        self.reporter.error(token, message);
    }

    fn document(&mut self, document: &ast::Document) {
        for decl in &document.decls {
            match decl {
                Decl::Namespace(ns) => {
                    self.reporter.set_context("namespace");
                    self.schema.namespace = Some(ns.name.clone());
                }
                Decl::Enum(d) => {
                    let ident = d.ident.unwrap_or(d.token);
                    self.reporter
                        .set_context(format!("enum {}", self.text(ident)));
                    let name = self.validate_uname(ident);
                    let def = self.visit_enum(d, name.clone());
                    let id = self.add_enum(def);
                    self.enums.insert(name, (ident, id));
                }
                Decl::Struct(d) => {
                    let ident = d.ident.unwrap_or(d.token);
                    self.reporter.set_context(format!(
                        "struct {}",
                        self.text(ident)
                    ));
                    let name = self.validate_uname(ident);
                    let (default, fields) = self.visit_content(
                        &name,
                        &d.members,
                        ContentKind::Struct,
                        false,
                    );
                    let id = self.add_struct(StructDef {
                        name: name.clone(),
                        doc: self.clean_doc(d.doc),
                        bytes: default.len() as u32,
                        fields,
                    });
                    self.structs.insert(name, (ident, id));
                }
                Decl::Table(d) => {
                    let ident = d.ident.unwrap_or(d.token);
                    self.reporter.set_context(format!(
                        "table {}",
                        self.text(ident)
                    ));
                    let name = self.validate_uname(ident);
                    let magic = self.assign_magic(d, true);
                    let (default, fields) = self.visit_content(
                        &name,
                        &d.members,
                        ContentKind::Table,
                        false,
                    );
                    let id = self.add_table(TableDef {
                        name: name.clone(),
                        doc: self.clean_doc(d.doc),
                        magic,
                        bytes: default.len() as u32,
                        default,
                        fields,
                    });
                    self.tables.insert(name, (ident, id));
                }
                Decl::Union(d) => {
                    let ident = d.ident.unwrap_or(d.token);
                    self.reporter.set_context(format!(
                        "union {}",
                        self.text(ident)
                    ));
                    let name = self.validate_uname(ident);
                    let arms = self.visit_union(&name, &d.members, false);
                    let id = self.add_union(UnionDef {
                        name: name.clone(),
                        doc: self.clean_doc(d.doc),
                        arms,
                    });
                    self.unions.insert(name, (ident, id));
                }
            }
        }
    }

    fn add_enum(&mut self, def: EnumDef) -> EnumId {
        let id = EnumId(self.schema.enums.len() as u32);
        self.schema.enums.push(def);
        id
    }

    fn add_struct(&mut self, def: StructDef) -> StructId {
        let id = StructId(self.schema.structs.len() as u32);
        self.schema.structs.push(def);
        id
    }

    fn add_table(&mut self, def: TableDef) -> TableId {
        let id = TableId(self.schema.tables.len() as u32);
        self.schema.tables.push(def);
        id
    }

    fn add_union(&mut self, def: UnionDef) -> UnionId {
        let id = UnionId(self.schema.unions.len() as u32);
        self.schema.unions.push(def);
        id
    }

    /// Validate a declared type name and report clashes with any earlier
    /// declaration of any kind.
    fn validate_uname(&mut self, token: Token) -> String {
        let name = self.text(token).to_owned();
        let first_upper = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase());
        if !first_upper || name.contains('_') {
            self.error(token, "Name must be CamelCase");
        }
        if is_reserved(&name) {
            self.error(token, "Illegal name");
        }
        let previous = self
            .enums
            .get(&name)
            .map(|(t, _)| *t)
            .or_else(|| self.structs.get(&name).map(|(t, _)| *t))
            .or_else(|| self.tables.get(&name).map(|(t, _)| *t))
            .or_else(|| self.unions.get(&name).map(|(t, _)| *t));
        if let Some(prev) = previous {
            self.error(token, "Duplicate name");
            self.error(prev, "Previously defined here");
        }
        name
    }

    /// Validate a member name and reserve the accessor names derived from
    /// it so no two members generate colliding readers or writers.
    fn member_name(
        &mut self,
        token: Token,
        name: &str,
        seen: &mut HashMap<String, Token>,
        union_arm: bool,
    ) {
        let first_lower = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase());
        if !first_lower || name.contains('_') {
            self.error(token, "Name must be camelCase");
        }
        if is_reserved(name) {
            self.error(token, format!("Illegal name '{name}'"));
        }
        let upper = ucamel(name);
        let mut reserved = vec![
            name.to_owned(),
            format!("get{upper}"),
            format!("add{upper}"),
        ];
        reserved.push(if union_arm {
            format!("is{upper}")
        } else {
            format!("has{upper}")
        });
        for n in reserved {
            if let Some(prev) = seen.get(&n).copied() {
                self.error(token, "Name conflict");
                self.error(prev, "Conflicts with this");
            }
            seen.insert(n, token);
        }
    }

    fn visit_enum(&mut self, decl: &ast::EnumDecl, name: String) -> EnumDef {
        let mut values: Vec<EnumValueDef> = Vec::new();
        for value in &decl.values {
            let vname = self.text(value.ident).to_owned();
            if values.iter().any(|v| v.name == vname) {
                self.error(value.ident, "Duplicate name");
                continue;
            }
            let doc = self.clean_doc(value.doc);
            values.push(EnumValueDef {
                name: vname,
                doc,
                index: (values.len() & 0xFF) as u8,
            });
        }
        if values.len() > MAX_ENUM_VALUES {
            self.error(decl.ident.unwrap_or(decl.token), "Too many enum values");
        }
        EnumDef {
            name,
            doc: self.clean_doc(decl.doc),
            values,
        }
    }

    /// Parse and range check the magic. Whether one is required depends
    /// on the context: inline tables inside an inplace chain may omit it.
    fn assign_magic(
        &mut self,
        decl: &ast::TableDecl,
        required: bool,
    ) -> Option<u32> {
        match decl.magic {
            None => {
                if required {
                    self.error(
                        decl.token,
                        "Magic required in non-inline context",
                    );
                }
                None
            }
            Some(token) => {
                let digits = &self.text(token)[1..];
                let value = u32::from_str_radix(digits, 16).unwrap_or(0);
                if value == 0 {
                    self.error(token, "Magic outside range");
                    return None;
                }
                Some(value)
            }
        }
    }

    /// Strip comment markers and surrounding blank lines, keeping the
    /// text as an array of lines for the emitters.
    fn clean_doc(&self, token: Option<Token>) -> Vec<String> {
        let Some(token) = token else {
            return Vec::new();
        };
        let mut lines: Vec<String> = Vec::new();
        for raw in self.text(token).split('\n') {
            let mut line = raw.trim();
            if let Some(rest) = line
                .strip_prefix("/**")
                .or_else(|| line.strip_prefix("///"))
            {
                line = rest;
            } else if let Some(rest) = line
                .strip_prefix("##")
                .or_else(|| line.strip_prefix("*/"))
                .or_else(|| line.strip_prefix("//"))
            {
                line = rest;
            } else if let Some(rest) = line
                .strip_prefix('#')
                .or_else(|| line.strip_prefix('*'))
            {
                line = rest;
            }
            line = line.strip_prefix(' ').unwrap_or(line);
            if !lines.is_empty() || !line.is_empty() {
                lines.push(line.to_owned());
            }
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        if let Some(last) = lines.last_mut() {
            if let Some(stripped) = last.strip_suffix("*/") {
                *last = stripped.trim_end().to_owned();
            }
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    fn int_literal<T>(&mut self, token: Option<Token>) -> i128
    where
        T: Bounded + Into<i128>,
    {
        let Some(token) = token else {
            return 0;
        };
        let min: i128 = T::min_value().into();
        let max: i128 = T::max_value().into();
        match self.text(token).parse::<i128>() {
            Ok(v) if (min..=max).contains(&v) => v,
            Ok(v) => {
                self.error(
                    token,
                    format!(
                        "Value {v} outside allowed range {min} to {max}"
                    ),
                );
                0
            }
            Err(_) => {
                self.error(token, "Must be an integer");
                0
            }
        }
    }

    fn float_literal(&mut self, token: Option<Token>, absent: f64) -> f64 {
        let Some(token) = token else {
            return absent;
        };
        match self.text(token).parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                self.error(token, "Must be a float");
                absent
            }
        }
    }

    /// Hoist inline declarations out of a member so their sizes and ids
    /// are known before the slot is laid out.
    fn hoist_inline(
        &mut self,
        member: &ast::Member,
        synthetic: &str,
        kind: ContentKind,
        inplace_context: bool,
    ) -> Hoisted {
        let mut hoisted = Hoisted::default();
        match &member.type_ {
            TypeExpr::InlineEnum(d) => {
                let def = self.visit_enum(d, synthetic.to_owned());
                hoisted.enum_ = Some(self.add_enum(def));
            }
            TypeExpr::InlineStruct(d) => {
                let (default, fields) = self.visit_content(
                    synthetic,
                    &d.members,
                    ContentKind::Struct,
                    false,
                );
                hoisted.struct_ = Some(self.add_struct(StructDef {
                    name: synthetic.to_owned(),
                    doc: Vec::new(),
                    bytes: default.len() as u32,
                    fields,
                }));
            }
            TypeExpr::InlineTable(d) => {
                let inplace = match kind {
                    ContentKind::Table => member.inplace.is_some(),
                    ContentKind::Struct => inplace_context,
                };
                let magic = self.assign_magic(d, !inplace);
                let (default, fields) = self.visit_content(
                    synthetic,
                    &d.members,
                    ContentKind::Table,
                    inplace,
                );
                hoisted.table = Some(self.add_table(TableDef {
                    name: synthetic.to_owned(),
                    doc: Vec::new(),
                    magic,
                    bytes: default.len() as u32,
                    default,
                    fields,
                }));
            }
            TypeExpr::InlineUnion(d) => {
                let arms = self.visit_union(
                    synthetic,
                    &d.members,
                    member.inplace.is_some(),
                );
                hoisted.union_ = Some(self.add_union(UnionDef {
                    name: synthetic.to_owned(),
                    doc: Vec::new(),
                    arms,
                }));
            }
            _ => {}
        }
        hoisted
    }

    /// Element type of a `List` member.
    fn list_elem(
        &mut self,
        member: &ast::Member,
        hoisted: Hoisted,
    ) -> ListElem {
        let fallback = ListElem::Primitive(Primitive::UInt8);
        match &member.type_ {
            TypeExpr::Primitive(t) => match t.kind {
                TokenKind::Text => ListElem::Text,
                TokenKind::Bytes => ListElem::Bytes,
                kind => primitive_of(kind)
                    .map(ListElem::Primitive)
                    .unwrap_or(fallback),
            },
            TypeExpr::Named(t) => {
                let name = self.text(*t);
                if let Some((_, id)) = self.enums.get(name) {
                    ListElem::Enum(*id)
                } else if let Some((_, id)) = self.structs.get(name) {
                    ListElem::Struct(*id)
                } else if let Some((_, id)) = self.tables.get(name) {
                    ListElem::Table(*id)
                } else if self.unions.contains_key(name) {
                    self.error(*t, "Lists of unions are not supported");
                    fallback
                } else {
                    self.error(*t, "Unknown type");
                    fallback
                }
            }
            TypeExpr::InlineEnum(_) => hoisted
                .enum_
                .map(ListElem::Enum)
                .unwrap_or(fallback),
            TypeExpr::InlineStruct(_) => hoisted
                .struct_
                .map(ListElem::Struct)
                .unwrap_or(fallback),
            TypeExpr::InlineTable(_) => hoisted
                .table
                .map(ListElem::Table)
                .unwrap_or(fallback),
            TypeExpr::InlineUnion(d) => {
                self.error(d.token, "Lists of unions are not supported");
                fallback
            }
        }
    }

    /// Lay out the members of a struct or table: assign offsets, widths,
    /// presence bits, and build the default byte image.
    fn visit_content(
        &mut self,
        name: &str,
        members: &[ast::Member],
        kind: ContentKind,
        inplace_context: bool,
    ) -> (Vec<u8>, Vec<Field>) {
        let mut offset: u32 = 0;
        let mut default: Vec<u8> = Vec::new();
        let mut bits = BitAlloc::new();
        let mut seen: HashMap<String, Token> = HashMap::new();
        let mut fields: Vec<Field> = Vec::new();
        let mut inplace_member: Option<Token> = None;

        for m in members {
            let doc = self.clean_doc(m.doc);
            let mname = self.text(m.ident).to_owned();
            let synthetic = format!("{name}{}", ucamel(&mname));
            let hoisted =
                self.hoist_inline(m, &synthetic, kind, inplace_context);

            self.member_name(m.ident, &mname, &mut seen, false);

            if kind == ContentKind::Struct {
                for t in [m.optional, m.list, m.inplace].into_iter().flatten()
                {
                    self.error(t, "Not allowed in structs");
                }
            }
            if kind == ContentKind::Table {
                if let Some(t) = m.inplace {
                    if let Some(prev) = inplace_member {
                        self.error(
                            t,
                            "More than one inplace member defined",
                        );
                        self.error(prev, "Previously defined here");
                    } else {
                        inplace_member = Some(t);
                    }
                }
            }

            // presence bit for optional ints and bools, floats encode
            // absence as NaN instead
            let mut has = None;
            if kind == ContentKind::Table && wants_presence_bit(m) {
                let (byte, bit) = bits.alloc(|| {
                    let at = offset;
                    default.push(0);
                    offset += 1;
                    at
                });
                has = Some(BitRef { offset: byte, bit });
            }

            let inplace = kind == ContentKind::Table && m.inplace.is_some();
            let (slot_bytes, slot_offset, field_kind) = if m.list.is_some()
            {
                if let Some(t) = m.optional {
                    self.error(t, "Lists are always optional");
                }
                let elem = self.list_elem(m, hoisted);
                default.extend_from_slice(&[0, 0, 0, 0]);
                (POINTER_BYTES, offset, FieldKind::List { elem, inplace })
            } else {
                match &m.type_ {
                    TypeExpr::Primitive(t)
                        if t.kind == TokenKind::Bool
                            && kind == ContentKind::Table =>
                    {
                        if let Some(ip) = m.inplace {
                            self.error(ip, "Basic types may not be inplace");
                        }
                        let (byte, bit) = bits.alloc(|| {
                            let at = offset;
                            default.push(0);
                            offset += 1;
                            at
                        });
                        (0, byte, FieldKind::Bool { bit, has })
                    }
                    TypeExpr::Primitive(t)
                        if matches!(
                            t.kind,
                            TokenKind::Text | TokenKind::Bytes
                        ) =>
                    {
                        if kind == ContentKind::Struct {
                            self.error(*t, "Not allowed in structs");
                        }
                        if let Some(opt) = m.optional {
                            self.error(opt, "Always optional");
                        }
                        default.extend_from_slice(&[0, 0, 0, 0]);
                        let fk = if t.kind == TokenKind::Text {
                            FieldKind::Text { inplace }
                        } else {
                            FieldKind::Bytes { inplace }
                        };
                        (POINTER_BYTES, offset, fk)
                    }
                    TypeExpr::Primitive(t) => {
                        if let Some(ip) = m.inplace {
                            self.error(ip, "Basic types may not be inplace");
                        }
                        let prim = primitive_of(t.kind)
                            .unwrap_or(Primitive::UInt8);
                        let (value, width) = self.scalar_default(
                            m,
                            prim,
                            &mut default,
                        );
                        (
                            width,
                            offset,
                            FieldKind::Scalar {
                                prim,
                                default: value,
                                has,
                            },
                        )
                    }
                    type_ => {
                        self.reference_slot(
                            m, type_, hoisted, kind, &mut bits,
                            &mut offset, &mut default,
                        )
                    }
                }
            };

            self.check_literal(m, kind, &field_kind);

            fields.push(Field {
                name: mname,
                doc,
                offset: slot_offset,
                bytes: slot_bytes,
                kind: field_kind,
            });
            offset += slot_bytes;
        }

        debug_assert_eq!(default.len() as u32, offset);
        (default, fields)
    }

    /// Slot for a member whose type is a reference to (or inline
    /// declaration of) an enum, struct, table or union.
    #[allow(clippy::too_many_arguments)]
    fn reference_slot(
        &mut self,
        m: &ast::Member,
        type_: &TypeExpr,
        hoisted: Hoisted,
        kind: ContentKind,
        bits: &mut BitAlloc,
        offset: &mut u32,
        default: &mut Vec<u8>,
    ) -> (u32, u32, FieldKind) {
        enum Resolved {
            Enum(EnumId),
            Struct(StructId),
            Table(TableId),
            Union(UnionId),
            Unknown,
        }
        let resolved = match type_ {
            TypeExpr::Named(t) => {
                let name = self.text(*t);
                if let Some((_, id)) = self.enums.get(name) {
                    Resolved::Enum(*id)
                } else if let Some((_, id)) = self.structs.get(name) {
                    Resolved::Struct(*id)
                } else if let Some((_, id)) = self.tables.get(name) {
                    Resolved::Table(*id)
                } else if let Some((_, id)) = self.unions.get(name) {
                    Resolved::Union(*id)
                } else {
                    self.error(*t, "Unknown type");
                    Resolved::Unknown
                }
            }
            TypeExpr::InlineEnum(_) => hoisted
                .enum_
                .map(Resolved::Enum)
                .unwrap_or(Resolved::Unknown),
            TypeExpr::InlineStruct(_) => hoisted
                .struct_
                .map(Resolved::Struct)
                .unwrap_or(Resolved::Unknown),
            TypeExpr::InlineTable(_) => hoisted
                .table
                .map(Resolved::Table)
                .unwrap_or(Resolved::Unknown),
            TypeExpr::InlineUnion(_) => hoisted
                .union_
                .map(Resolved::Union)
                .unwrap_or(Resolved::Unknown),
            TypeExpr::Primitive(_) => Resolved::Unknown,
        };
        let inplace = kind == ContentKind::Table && m.inplace.is_some();
        match resolved {
            Resolved::Enum(id) => {
                if let Some(ip) = m.inplace {
                    self.error(ip, "Enums may not be inplace");
                }
                if let Some(opt) = m.optional {
                    self.error(opt, "Always optional");
                }
                let mut index = ENUM_SENTINEL;
                if let Some(value) = m.default {
                    if value.kind == TokenKind::Identifier {
                        let vname = self.text(value);
                        match self
                            .schema
                            .enum_def(id)
                            .values
                            .iter()
                            .find(|v| v.name == vname)
                        {
                            Some(v) => index = v.index,
                            None => {
                                self.error(value, "Not member of enum")
                            }
                        }
                    }
                }
                default.push(index);
                (1, *offset, FieldKind::Enum { id, default: index })
            }
            Resolved::Struct(id) => {
                if let Some(ip) = m.inplace {
                    self.error(ip, "Structs may not be inplace");
                }
                let mut has = None;
                if kind == ContentKind::Table && m.optional.is_some() {
                    let (byte, bit) = bits.alloc(|| {
                        let at = *offset;
                        default.push(0);
                        *offset += 1;
                        at
                    });
                    has = Some(BitRef { offset: byte, bit });
                }
                let bytes = self.schema.struct_def(id).bytes;
                default.extend(std::iter::repeat(0).take(bytes as usize));
                (bytes, *offset, FieldKind::Struct { id, has })
            }
            Resolved::Table(id) => {
                if kind == ContentKind::Struct {
                    self.error(type_.token(), "Not allowed in structs");
                }
                if let Some(opt) = m.optional {
                    self.error(opt, "Always optional");
                }
                default.extend_from_slice(&[0, 0, 0, 0]);
                (POINTER_BYTES, *offset, FieldKind::Table { id, inplace })
            }
            Resolved::Union(id) => {
                if kind == ContentKind::Struct {
                    self.error(type_.token(), "Not allowed in structs");
                }
                if let Some(opt) = m.optional {
                    self.error(opt, "Always optional");
                }
                default.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
                (UNION_BYTES, *offset, FieldKind::Union { id, inplace })
            }
            Resolved::Unknown => (
                0,
                *offset,
                FieldKind::Scalar {
                    prim: Primitive::UInt8,
                    default: ScalarDefault::UInt(0),
                    has: None,
                },
            ),
        }
    }

    /// Parse the default literal of a sized scalar (or struct bool) and
    /// append its byte image. Returns the value and the slot width.
    fn scalar_default(
        &mut self,
        m: &ast::Member,
        prim: Primitive,
        default: &mut Vec<u8>,
    ) -> (ScalarDefault, u32) {
        let optional = m.optional.is_some();
        let value = match prim {
            Primitive::Bool => {
                // struct context, one full byte, no default allowed
                default.push(0);
                ScalarDefault::UInt(0)
            }
            Primitive::UInt8 => {
                let v = self.int_literal::<u8>(m.default);
                default.push(v as u8);
                ScalarDefault::UInt(v as u64)
            }
            Primitive::Int8 => {
                let v = self.int_literal::<i8>(m.default);
                default.extend_from_slice(&(v as i8).to_le_bytes());
                ScalarDefault::Int(v as i64)
            }
            Primitive::UInt16 => {
                let v = self.int_literal::<u16>(m.default);
                default.extend_from_slice(&(v as u16).to_le_bytes());
                ScalarDefault::UInt(v as u64)
            }
            Primitive::Int16 => {
                let v = self.int_literal::<i16>(m.default);
                default.extend_from_slice(&(v as i16).to_le_bytes());
                ScalarDefault::Int(v as i64)
            }
            Primitive::UInt32 => {
                let v = self.int_literal::<u32>(m.default);
                default.extend_from_slice(&(v as u32).to_le_bytes());
                ScalarDefault::UInt(v as u64)
            }
            Primitive::Int32 => {
                let v = self.int_literal::<i32>(m.default);
                default.extend_from_slice(&(v as i32).to_le_bytes());
                ScalarDefault::Int(v as i64)
            }
            Primitive::UInt64 => {
                let v = self.int_literal::<u64>(m.default);
                default.extend_from_slice(&(v as u64).to_le_bytes());
                ScalarDefault::UInt(v as u64)
            }
            Primitive::Int64 => {
                let v = self.int_literal::<i64>(m.default);
                default.extend_from_slice(&(v as i64).to_le_bytes());
                ScalarDefault::Int(v as i64)
            }
            Primitive::Float32 => {
                let absent = if optional { f64::NAN } else { 0.0 };
                let v = self.float_literal(m.default, absent);
                default.extend_from_slice(&(v as f32).to_le_bytes());
                ScalarDefault::Float(v)
            }
            Primitive::Float64 => {
                let absent = if optional { f64::NAN } else { 0.0 };
                let v = self.float_literal(m.default, absent);
                default.extend_from_slice(&v.to_le_bytes());
                ScalarDefault::Float(v)
            }
        };
        (value, prim.bytes())
    }

    /// The rules about where a `= literal` may appear at all.
    fn check_literal(
        &mut self,
        m: &ast::Member,
        kind: ContentKind,
        field_kind: &FieldKind,
    ) {
        let Some(value) = m.default else {
            return;
        };
        if kind == ContentKind::Struct {
            self.error(value, "Not allowed in structs");
        } else if m.optional.is_some() {
            self.error(value, "Not allowed for optionals");
        } else if m.list.is_some() {
            self.error(value, "Not allowed for lists");
        } else {
            match value.kind {
                TokenKind::True | TokenKind::False => {
                    self.error(
                        value,
                        "Booleans cannot have default values",
                    );
                }
                TokenKind::Number => {
                    let numeric = matches!(
                        field_kind,
                        FieldKind::Scalar { prim, .. }
                            if *prim != Primitive::Bool
                    );
                    if !numeric {
                        self.error(value, "Only allowed for number types");
                    }
                }
                TokenKind::Identifier => {
                    if !matches!(field_kind, FieldKind::Enum { .. }) {
                        self.error(value, "Only allowed for enums");
                    }
                }
                _ => self.error(value, "Unhandled value"),
            }
        }
    }

    /// Union arms: only table, text, bytes and list members, the union
    /// itself encodes absence.
    fn visit_union(
        &mut self,
        name: &str,
        members: &[ast::Member],
        inplace_context: bool,
    ) -> Vec<UnionArm> {
        let mut seen: HashMap<String, Token> = HashMap::new();
        let mut arms: Vec<UnionArm> = Vec::new();
        for m in members {
            let doc = self.clean_doc(m.doc);
            let mname = self.text(m.ident).to_owned();
            let synthetic = format!("{name}{}", ucamel(&mname));

            let mut hoisted = Hoisted::default();
            match &m.type_ {
                TypeExpr::InlineTable(d) => {
                    let magic = self.assign_magic(d, !inplace_context);
                    let (table_default, table_fields) = self
                        .visit_content(
                            &synthetic,
                            &d.members,
                            ContentKind::Table,
                            inplace_context,
                        );
                    hoisted.table = Some(self.add_table(TableDef {
                        name: synthetic.clone(),
                        doc: Vec::new(),
                        magic,
                        bytes: table_default.len() as u32,
                        default: table_default,
                        fields: table_fields,
                    }));
                }
                TypeExpr::InlineEnum(d) => {
                    self.error(d.token, "Not allowed in unions")
                }
                TypeExpr::InlineStruct(d) => {
                    self.error(d.token, "Not allowed in unions")
                }
                TypeExpr::InlineUnion(d) => {
                    self.error(d.token, "Not allowed in unions")
                }
                _ => {}
            }

            self.member_name(m.ident, &mname, &mut seen, true);
            for t in [m.optional, m.inplace, m.default]
                .into_iter()
                .flatten()
            {
                self.error(t, "Not allowed in unions");
            }

            let kind = if m.list.is_some() {
                ArmKind::List(self.list_elem(m, hoisted))
            } else {
                match &m.type_ {
                    TypeExpr::Primitive(t)
                        if t.kind == TokenKind::Text =>
                    {
                        ArmKind::Text
                    }
                    TypeExpr::Primitive(t)
                        if t.kind == TokenKind::Bytes =>
                    {
                        ArmKind::Bytes
                    }
                    TypeExpr::Primitive(t) => {
                        self.error(*t, "Not allowed in unions");
                        ArmKind::Text
                    }
                    TypeExpr::Named(t) => {
                        let tname = self.text(*t);
                        if let Some((_, id)) = self.tables.get(tname) {
                            ArmKind::Table(*id)
                        } else if self.enums.contains_key(tname)
                            || self.structs.contains_key(tname)
                            || self.unions.contains_key(tname)
                        {
                            self.error(*t, "Not allowed in unions");
                            ArmKind::Text
                        } else {
                            self.error(*t, "Unknown type");
                            ArmKind::Text
                        }
                    }
                    TypeExpr::InlineTable(_) => hoisted
                        .table
                        .map(ArmKind::Table)
                        .unwrap_or(ArmKind::Text),
                    _ => ArmKind::Text,
                }
            };
            arms.push(UnionArm {
                name: mname,
                doc,
                tag: (arms.len() + 1) as u16,
                kind,
            });
        }
        arms
    }
}
