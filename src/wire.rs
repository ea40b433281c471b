//! Runtime helpers over the binary message format.
//!
//! Generated readers and writers call into this surface: a [`Writer`]
//! building a message image object by object, and a [`Reader`] walking a
//! finished image. The byte contract is the one the annotator lays out:
//! everything little endian, offsets absolute from byte 0, the root
//! table first.

pub mod reader;
pub mod writer;

pub use reader::{ListIn, Reader, TableIn};
pub use writer::{
    BoolListRef, BytesRef, OffsetListRef, ScalarListRef, StructListRef,
    TableRef, TextRef, Writer,
};

/// Fixed width little endian scalars as stored in slots and lists.
pub trait WireScalar: Copy {
    const BYTES: usize;
    fn write_to(self, out: &mut [u8]);
    fn read_from(inp: &[u8]) -> Self;
}

macro_rules! impl_wire_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl WireScalar for $t {
            const BYTES: usize = std::mem::size_of::<$t>();

            fn write_to(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn read_from(inp: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(inp);
                Self::from_le_bytes(raw)
            }
        }
    )*}
}

impl_wire_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);
