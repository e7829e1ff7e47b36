//! Low-level reading and writing utilities for TDS wire data.
//!
//! [`ByteCursor`] is the forward-only reader every decoder in the workspace
//! walks a payload with. Each read is bounds-checked against the borrowed
//! slice and reports a [`ProtocolError`] instead of panicking, so a peer
//! sending a short or lying packet can never cause an out-of-bounds access.

use bytes::BufMut;

use crate::error::ProtocolError;

/// Forward-only cursor over a borrowed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current absolute offset from the start of the buffer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the underlying buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The unread tail of the buffer.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.remaining() < needed {
            return Err(ProtocolError::IncompletePacket {
                expected: needed,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read `n` bytes as a borrowed slice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16, ProtocolError> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, ProtocolError> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Advance by `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), ProtocolError> {
        self.read_bytes(n).map(|_| ())
    }

    /// Move to an absolute offset from the start of the buffer.
    ///
    /// Seeking exactly to the end is allowed; it leaves nothing to read.
    pub fn seek(&mut self, offset: usize) -> Result<(), ProtocolError> {
        if offset > self.buf.len() {
            return Err(ProtocolError::SeekOutOfBounds {
                offset,
                len: self.buf.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }
}

/// Read a UTF-16LE string of `char_count` code units.
pub fn read_utf16_string(
    src: &mut ByteCursor<'_>,
    char_count: usize,
) -> Result<String, ProtocolError> {
    let bytes = src.read_bytes(char_count * 2)?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| ProtocolError::InvalidUtf16)
}

/// Read a length-prefixed UTF-16LE string (1-byte length in characters).
pub fn read_b_varchar(src: &mut ByteCursor<'_>) -> Result<String, ProtocolError> {
    let len = src.read_u8()? as usize;
    read_utf16_string(src, len)
}

/// Read a length-prefixed UTF-16LE string (2-byte length in characters).
pub fn read_us_varchar(src: &mut ByteCursor<'_>) -> Result<String, ProtocolError> {
    let len = src.read_u16_le()? as usize;
    read_utf16_string(src, len)
}

/// Write a length-prefixed UTF-16LE string (1-byte length).
pub fn write_b_varchar(dst: &mut impl BufMut, s: &str) {
    let chars: Vec<u16> = s.encode_utf16().collect();
    let len = chars.len().min(255) as u8;
    dst.put_u8(len);
    for &c in &chars[..len as usize] {
        dst.put_u16_le(c);
    }
}

/// Write a length-prefixed UTF-16LE string (2-byte length).
pub fn write_us_varchar(dst: &mut impl BufMut, s: &str) {
    let chars: Vec<u16> = s.encode_utf16().collect();
    // 0xFFFF is the procedure-id sentinel, so names stop one short of it.
    let len = chars.len().min(0xFFFE) as u16;
    dst.put_u16_le(len);
    for &c in &chars[..len as usize] {
        dst.put_u16_le(c);
    }
}

/// Write a UTF-16LE string without length prefix.
pub fn write_utf16_string(dst: &mut impl BufMut, s: &str) {
    for c in s.encode_utf16() {
        dst.put_u16_le(c);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_cursor_reads_little_endian() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_cursor_short_read_does_not_advance() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&data);
        let err = cursor.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            ProtocolError::IncompletePacket {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_cursor_seek_bounds() {
        let data = [0u8; 8];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek(8).unwrap();
        assert_eq!(cursor.remaining(), 0);
        assert!(matches!(
            cursor.seek(9),
            Err(ProtocolError::SeekOutOfBounds { offset: 9, len: 8 })
        ));
        cursor.seek(2).unwrap();
        assert_eq!(cursor.rest().len(), 6);
    }

    #[test]
    fn test_b_varchar_roundtrip() {
        let original = "Hello, 世界!";
        let mut buf = BytesMut::new();
        write_b_varchar(&mut buf, original);

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(read_b_varchar(&mut cursor).unwrap(), original);
    }

    #[test]
    fn test_us_varchar_roundtrip() {
        let original = "Test string with Unicode: αβγ";
        let mut buf = BytesMut::new();
        write_us_varchar(&mut buf, original);

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(read_us_varchar(&mut cursor).unwrap(), original);
    }

    #[test]
    fn test_lone_surrogate_is_rejected() {
        let data = [0x00, 0xD8];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            read_utf16_string(&mut cursor, 1),
            Err(ProtocolError::InvalidUtf16)
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn over_reads_fail_without_advancing(
                data in prop::collection::vec(any::<u8>(), 0..64),
                start in any::<prop::sample::Index>(),
                extra in 1usize..64,
            ) {
                let mut cursor = ByteCursor::new(&data);
                cursor.seek(start.index(data.len() + 1)).unwrap();
                let before = cursor.position();
                let remaining = cursor.remaining();

                prop_assert_eq!(
                    cursor.read_bytes(remaining + extra),
                    Err(ProtocolError::IncompletePacket {
                        expected: remaining + extra,
                        actual: remaining,
                    })
                );
                prop_assert!(cursor.skip(remaining + extra).is_err());
                if remaining < 4 {
                    prop_assert!(cursor.read_u32_le().is_err());
                }
                prop_assert_eq!(cursor.position(), before);
                prop_assert_eq!(cursor.rest(), &data[before..]);
            }

            #[test]
            fn seeks_past_the_end_fail_without_moving(
                data in prop::collection::vec(any::<u8>(), 0..64),
                past in 1usize..1024,
            ) {
                let mut cursor = ByteCursor::new(&data);
                let _ = cursor.read_u8();
                let before = cursor.position();
                prop_assert_eq!(
                    cursor.seek(data.len() + past),
                    Err(ProtocolError::SeekOutOfBounds {
                        offset: data.len() + past,
                        len: data.len(),
                    })
                );
                prop_assert_eq!(cursor.position(), before);
            }

            #[test]
            fn in_bounds_reads_return_the_slice(
                data in prop::collection::vec(any::<u8>(), 0..64),
                n in any::<prop::sample::Index>(),
            ) {
                let mut cursor = ByteCursor::new(&data);
                let n = n.index(data.len() + 1);
                prop_assert_eq!(cursor.read_bytes(n).unwrap(), &data[..n]);
                prop_assert_eq!(cursor.remaining(), data.len() - n);
            }
        }
    }
}
