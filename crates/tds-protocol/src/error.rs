//! Protocol-level error type.

use thiserror::Error;

/// Errors raised while reading TDS wire structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Not enough bytes to complete a read.
    #[error("incomplete packet: expected {expected} bytes, have {actual}")]
    IncompletePacket {
        /// Bytes required by the read.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Absolute seek outside the buffer.
    #[error("seek to offset {offset} outside buffer of {len} bytes")]
    SeekOutOfBounds {
        /// Requested absolute offset.
        offset: usize,
        /// Length of the buffer.
        len: usize,
    },

    /// Unknown packet type byte.
    #[error("invalid packet type: 0x{0:02X}")]
    InvalidPacketType(u8),

    /// Unknown packet status bits.
    #[error("invalid packet status: 0x{0:02X}")]
    InvalidPacketStatus(u8),

    /// Header length smaller than the header itself.
    #[error("invalid packet length: {0}")]
    InvalidPacketLength(u16),

    /// Procedure ID at or beyond the catalog size.
    #[error("procedure id {0} is outside the well-known procedure catalog")]
    InvalidProcId(u16),

    /// Procedure ID inside the catalog range that names no procedure.
    #[error("procedure id {0} is not mapped to a well-known procedure")]
    UnmappedProcId(u16),

    /// UTF-16 data that does not decode.
    #[error("invalid UTF-16 string data")]
    InvalidUtf16,
}

impl ProtocolError {
    /// Whether this error means the input ran out or pointed past its end.
    #[must_use]
    pub const fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::IncompletePacket { .. } | Self::SeekOutOfBounds { .. }
        )
    }
}
