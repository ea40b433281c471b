//! Annotated intermediate representation.
//!
//! This is the read-only view code emitters consume: resolved references,
//! computed offsets and widths, default byte images, magics and doc
//! comments. It is built from scratch by the annotator, the parse tree is
//! never mutated, and it exposes no tokens or source text beyond the
//! identifier strings themselves.

use crate::layout::Primitive;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EnumId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StructId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TableId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct UnionId(pub u32);

#[derive(Clone, Debug, Default, Serialize)]
pub struct Schema {
    pub namespace: Option<String>,
    pub enums: Vec<EnumDef>,
    pub structs: Vec<StructDef>,
    pub tables: Vec<TableDef>,
    pub unions: Vec<UnionDef>,
}

impl Schema {
    pub fn enum_def(&self, id: EnumId) -> &EnumDef {
        &self.enums[id.0 as usize]
    }

    pub fn struct_def(&self, id: StructId) -> &StructDef {
        &self.structs[id.0 as usize]
    }

    pub fn table_def(&self, id: TableId) -> &TableDef {
        &self.tables[id.0 as usize]
    }

    pub fn union_def(&self, id: UnionId) -> &UnionDef {
        &self.unions[id.0 as usize]
    }

    pub fn table_by_name(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// 8-bit enumeration, values numbered 0..k in declaration order.
#[derive(Clone, Debug, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub doc: Vec<String>,
    pub values: Vec<EnumValueDef>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumValueDef {
    pub name: String,
    pub doc: Vec<String>,
    pub index: u8,
}

/// Packed fixed-size record, no header, no tail.
#[derive(Clone, Debug, Serialize)]
pub struct StructDef {
    pub name: String,
    pub doc: Vec<String>,
    pub bytes: u32,
    pub fields: Vec<Field>,
}

/// Variable-size record: magic, size, fixed part, optional inplace tail.
#[derive(Clone, Debug, Serialize)]
pub struct TableDef {
    pub name: String,
    pub doc: Vec<String>,
    /// Absent only for an inline table inside an inplace chain.
    pub magic: Option<u32>,
    /// Width of the fixed part, equals `default.len()`.
    pub bytes: u32,
    /// Byte image of a freshly constructed record.
    pub default: Vec<u8>,
    pub fields: Vec<Field>,
}

impl TableDef {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Tagged choice. On the wire: 2 byte tag, 4 byte offset or length.
#[derive(Clone, Debug, Serialize)]
pub struct UnionDef {
    pub name: String,
    pub doc: Vec<String>,
    pub arms: Vec<UnionArm>,
}

impl UnionDef {
    pub fn arm(&self, name: &str) -> Option<&UnionArm> {
        self.arms.iter().find(|a| a.name == name)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct UnionArm {
    pub name: String,
    pub doc: Vec<String>,
    /// 1-based, tag 0 means the union is not set.
    pub tag: u16,
    pub kind: ArmKind,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub enum ArmKind {
    Table(TableId),
    Text,
    Bytes,
    List(ListElem),
}

/// Position of one presence or value bit in the shared bool byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BitRef {
    pub offset: u32,
    pub bit: u8,
}

#[derive(Clone, Debug, Serialize)]
pub struct Field {
    pub name: String,
    pub doc: Vec<String>,
    /// Byte offset of the slot within the fixed part. For a table bool
    /// this is the shared bit byte.
    pub offset: u32,
    /// Slot width; 0 for bit packed table bools.
    pub bytes: u32,
    pub kind: FieldKind,
}

impl Field {
    /// The presence bit, if this member encodes absence through one.
    pub fn presence(&self) -> Option<BitRef> {
        match &self.kind {
            FieldKind::Bool { has, .. }
            | FieldKind::Scalar { has, .. }
            | FieldKind::Struct { has, .. } => *has,
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub enum ScalarDefault {
    Int(i64),
    UInt(u64),
    Float(f64),
}

#[derive(Clone, Copy, Debug, Serialize)]
pub enum FieldKind {
    /// Table bool, one value bit in the shared byte.
    Bool { bit: u8, has: Option<BitRef> },
    /// Sized integer or float, or a one-byte struct bool.
    Scalar {
        prim: Primitive,
        default: ScalarDefault,
        has: Option<BitRef>,
    },
    /// One byte holding the value index, `0xFF` when absent.
    Enum { id: EnumId, default: u8 },
    Struct { id: StructId, has: Option<BitRef> },
    Table { id: TableId, inplace: bool },
    Text { inplace: bool },
    Bytes { inplace: bool },
    List { elem: ListElem, inplace: bool },
    Union { id: UnionId, inplace: bool },
}

#[derive(Clone, Copy, Debug, Serialize)]
pub enum ListElem {
    Primitive(Primitive),
    Enum(EnumId),
    Struct(StructId),
    Table(TableId),
    Text,
    Bytes,
}
