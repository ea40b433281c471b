//! Message reader. Borrows a finished byte image and walks it with the
//! offsets the annotator computed. All accessors are bounds checked and
//! fall back to the compiled default when a message written by an older
//! schema is shorter than the compiled fixed part. Malformed input is an
//! error, never a panic.

use super::WireScalar;
use crate::layout::TABLE_HEADER_BYTES;

use anyhow::{anyhow, ensure, Result};

/// A table inside a message: absolute offset of its fixed part and the
/// on-wire size, which may be smaller than the compiled record width.
#[derive(Clone, Copy, Debug)]
pub struct TableIn {
    fixed: u32,
    size: u32,
}

impl TableIn {
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// A list inside a message: offset of the first element and the element
/// count. Element width is the caller's knowledge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListIn {
    first: u32,
    len: u32,
}

impl ListIn {
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data }
    }

    fn read(&self, offset: u32, len: u32) -> Result<&'a [u8]> {
        let start = offset as usize;
        let end = start + len as usize;
        ensure!(
            end <= self.data.len(),
            "Out of bounds read at {offset}+{len} in a message of {} bytes",
            self.data.len()
        );
        Ok(&self.data[start..end])
    }

    fn read_u32(&self, offset: u32) -> Result<u32> {
        Ok(u32::read_from(self.read(offset, 4)?))
    }

    /// The root table sits at byte 0 of the message.
    pub fn root(&self, magic: u32) -> Result<TableIn> {
        self.table_at(0, magic)
    }

    /// Validate a table header at `start` and capture its extent.
    pub fn table_at(&self, start: u32, magic: u32) -> Result<TableIn> {
        let found = self.read_u32(start)?;
        ensure!(
            found == magic,
            "Magic mismatch, expected {magic:08X} got {found:08X}"
        );
        let size = self.read_u32(start + 4)?;
        let fixed = start + TABLE_HEADER_BYTES;
        self.read(fixed, size)?;
        Ok(TableIn { fixed, size })
    }

    // ------------------------------------------------------------------
    // fixed-part getters

    /// Scalar slot with the compiled default as fallback for messages
    /// with a shorter fixed part.
    pub fn get_scalar<T: WireScalar>(
        &self,
        table: TableIn,
        offset: u32,
        default: T,
    ) -> T {
        if offset + T::BYTES as u32 > table.size {
            return default;
        }
        match self.read(table.fixed + offset, T::BYTES as u32) {
            Ok(raw) => T::read_from(raw),
            Err(_) => default,
        }
    }

    /// A presence or value bit, clear when the byte is beyond the wire
    /// size.
    pub fn get_bit(&self, table: TableIn, offset: u32, bit: u8) -> bool {
        if offset >= table.size {
            return false;
        }
        match self.read(table.fixed + offset, 1) {
            Ok(raw) => raw[0] & (1 << bit) != 0,
            Err(_) => false,
        }
    }

    /// Struct image, `None` when truncated away (read as all defaults).
    pub fn get_struct(
        &self,
        table: TableIn,
        offset: u32,
        bytes: u32,
    ) -> Option<&'a [u8]> {
        if offset + bytes > table.size {
            return None;
        }
        self.read(table.fixed + offset, bytes).ok()
    }

    /// Pointer slot. Zero or truncated means absent.
    pub fn get_ptr(&self, table: TableIn, offset: u32) -> Option<u32> {
        if offset + 4 > table.size {
            return None;
        }
        match self.read_u32(table.fixed + offset) {
            Ok(0) | Err(_) => None,
            Ok(target) => Some(target),
        }
    }

    pub fn get_table(
        &self,
        table: TableIn,
        offset: u32,
        magic: u32,
    ) -> Result<Option<TableIn>> {
        match self.get_ptr(table, offset) {
            None => Ok(None),
            Some(target) => self.table_at(target, magic).map(Some),
        }
    }

    pub fn get_text(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<&'a str>> {
        match self.get_ptr(table, offset) {
            None => Ok(None),
            Some(target) => self.text_at(target).map(Some),
        }
    }

    pub fn get_bytes(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<&'a [u8]>> {
        match self.get_ptr(table, offset) {
            None => Ok(None),
            Some(target) => self.bytes_at(target).map(Some),
        }
    }

    pub fn get_list(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<ListIn>> {
        match self.get_ptr(table, offset) {
            None => Ok(None),
            Some(target) => self.list_at(target).map(Some),
        }
    }

    /// Union slot: tag and raw payload word. Tag 0 is an absent union,
    /// as is a slot beyond the wire size.
    pub fn get_union(&self, table: TableIn, offset: u32) -> (u16, u32) {
        let tag = self.get_scalar::<u16>(table, offset, 0);
        let payload = self.get_scalar::<u32>(table, offset + 2, 0);
        (tag, payload)
    }

    // ------------------------------------------------------------------
    // object accessors by absolute offset

    pub fn text_at(&self, start: u32) -> Result<&'a str> {
        let size = self.read_u32(start)?;
        let raw = self.read(start + 4, size)?;
        std::str::from_utf8(raw)
            .map_err(|e| anyhow!("Invalid utf-8 in text: {e}"))
    }

    pub fn bytes_at(&self, start: u32) -> Result<&'a [u8]> {
        let size = self.read_u32(start)?;
        self.read(start + 4, size)
    }

    pub fn list_at(&self, start: u32) -> Result<ListIn> {
        let len = self.read_u32(start)?;
        Ok(ListIn {
            first: start + 4,
            len,
        })
    }

    // ------------------------------------------------------------------
    // list elements

    fn item_offset(&self, list: ListIn, index: u32, stride: u32) -> Result<u32> {
        ensure!(
            index < list.len,
            "List index {index} out of bounds, length {}",
            list.len
        );
        Ok(list.first + index * stride)
    }

    pub fn list_scalar<T: WireScalar>(
        &self,
        list: ListIn,
        index: u32,
    ) -> Result<T> {
        let at = self.item_offset(list, index, T::BYTES as u32)?;
        Ok(T::read_from(self.read(at, T::BYTES as u32)?))
    }

    /// Bool elements are packed LSB first within each byte.
    pub fn list_bool(&self, list: ListIn, index: u32) -> Result<bool> {
        ensure!(
            index < list.len,
            "List index {index} out of bounds, length {}",
            list.len
        );
        let raw = self.read(list.first + index / 8, 1)?;
        Ok(raw[0] & (1 << (index % 8)) != 0)
    }

    pub fn list_struct(
        &self,
        list: ListIn,
        index: u32,
        stride: u32,
    ) -> Result<&'a [u8]> {
        let at = self.item_offset(list, index, stride)?;
        self.read(at, stride)
    }

    fn list_ptr(&self, list: ListIn, index: u32) -> Result<Option<u32>> {
        let at = self.item_offset(list, index, 4)?;
        Ok(match self.read_u32(at)? {
            0 => None,
            target => Some(target),
        })
    }

    pub fn list_table(
        &self,
        list: ListIn,
        index: u32,
        magic: u32,
    ) -> Result<Option<TableIn>> {
        match self.list_ptr(list, index)? {
            None => Ok(None),
            Some(target) => self.table_at(target, magic).map(Some),
        }
    }

    pub fn list_text(
        &self,
        list: ListIn,
        index: u32,
    ) -> Result<Option<&'a str>> {
        match self.list_ptr(list, index)? {
            None => Ok(None),
            Some(target) => self.text_at(target).map(Some),
        }
    }

    pub fn list_bytes(
        &self,
        list: ListIn,
        index: u32,
    ) -> Result<Option<&'a [u8]>> {
        match self.list_ptr(list, index)? {
            None => Ok(None),
            Some(target) => self.bytes_at(target).map(Some),
        }
    }

    // ------------------------------------------------------------------
    // inplace tails
    //
    // The single inplace member's payload starts right after the fixed
    // part, its size is in the fixed-part slot.

    /// First byte after the table's fixed part.
    pub fn tail(&self, table: TableIn) -> u32 {
        table.fixed + table.size
    }

    pub fn inplace_text(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<&'a str>> {
        match self.get_scalar::<u32>(table, offset, 0) {
            0 => Ok(None),
            size => self.tail_text(table, size).map(Some),
        }
    }

    pub fn inplace_bytes(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<&'a [u8]>> {
        match self.get_scalar::<u32>(table, offset, 0) {
            0 => Ok(None),
            size => self.read(self.tail(table), size).map(Some),
        }
    }

    pub fn inplace_list(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<ListIn>> {
        match self.get_scalar::<u32>(table, offset, 0) {
            0 => Ok(None),
            len => Ok(Some(ListIn {
                first: self.tail(table),
                len,
            })),
        }
    }

    pub fn inplace_table(
        &self,
        table: TableIn,
        offset: u32,
    ) -> Result<Option<TableIn>> {
        match self.get_scalar::<u32>(table, offset, 0) {
            0 => Ok(None),
            size => {
                let fixed = self.tail(table);
                self.read(fixed, size)?;
                Ok(Some(TableIn { fixed, size }))
            }
        }
    }

    // union payloads stored inplace: the length is the payload word

    pub fn tail_text(&self, table: TableIn, size: u32) -> Result<&'a str> {
        let raw = self.read(self.tail(table), size)?;
        std::str::from_utf8(raw)
            .map_err(|e| anyhow!("Invalid utf-8 in text: {e}"))
    }

    pub fn tail_bytes(
        &self,
        table: TableIn,
        size: u32,
    ) -> Result<&'a [u8]> {
        self.read(self.tail(table), size)
    }

    pub fn tail_table(&self, table: TableIn, size: u32) -> Result<TableIn> {
        let fixed = self.tail(table);
        self.read(fixed, size)?;
        Ok(TableIn { fixed, size })
    }

    pub fn tail_list(&self, table: TableIn, len: u32) -> ListIn {
        ListIn {
            first: self.tail(table),
            len,
        }
    }
}
