//! Type decoding error types.

use tds_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while reading a type descriptor or a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TypeError {
    /// Buffer too small for the descriptor or value.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// Type byte that names no supported TDS type.
    #[error("unsupported TDS type 0x{0:02X}")]
    UnsupportedType(u8),

    /// A length that the type does not allow.
    #[error("invalid {type_name} length: {length}")]
    InvalidLength {
        /// SQL type name.
        type_name: &'static str,
        /// Offending length.
        length: usize,
    },

    /// Invalid encoding in string data.
    #[error("invalid string encoding: {0}")]
    InvalidEncoding(String),

    /// Invalid date/time value.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    /// Invalid decimal value.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),
}

impl From<ProtocolError> for TypeError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::IncompletePacket { expected, actual } => Self::BufferTooSmall {
                needed: expected,
                available: actual,
            },
            ProtocolError::SeekOutOfBounds { offset, len } => Self::BufferTooSmall {
                needed: offset,
                available: len,
            },
            ProtocolError::InvalidUtf16 => {
                Self::InvalidEncoding("invalid UTF-16 string data".to_string())
            }
            other => Self::InvalidEncoding(other.to_string()),
        }
    }
}
