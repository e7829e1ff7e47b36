//! Cursor used by the descriptor and value readers.

use tds_protocol::ByteCursor;
use tds_protocol::codec::{read_b_varchar, read_us_varchar};

use crate::error::TypeError;

/// Forward-only reader over the bytes holding a type descriptor and value.
///
/// The reader is limited to `min(remaining, bytes.len())` bytes, so a caller
/// can hand over a larger buffer together with the length it is allowed to
/// consume.
#[derive(Debug, Clone, Copy)]
pub struct ValueReader<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> ValueReader<'a> {
    /// Create a reader over `bytes`, limited to `remaining` bytes.
    #[must_use]
    pub fn new(bytes: &'a [u8], remaining: usize) -> Self {
        let limit = remaining.min(bytes.len());
        Self {
            cursor: ByteCursor::new(&bytes[..limit]),
        }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Bytes left to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Check whether everything has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cursor.remaining() == 0
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], TypeError> {
        Ok(self.cursor.read_bytes(n)?)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], TypeError> {
        Ok(self.cursor.read_array()?)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, TypeError> {
        Ok(self.cursor.read_u8()?)
    }

    pub(crate) fn u16_le(&mut self) -> Result<u16, TypeError> {
        Ok(self.cursor.read_u16_le()?)
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32, TypeError> {
        Ok(self.cursor.read_u32_le()?)
    }

    pub(crate) fn u64_le(&mut self) -> Result<u64, TypeError> {
        self.array().map(u64::from_le_bytes)
    }

    pub(crate) fn b_varchar(&mut self) -> Result<String, TypeError> {
        Ok(read_b_varchar(&mut self.cursor)?)
    }

    pub(crate) fn us_varchar(&mut self) -> Result<String, TypeError> {
        Ok(read_us_varchar(&mut self.cursor)?)
    }
}
