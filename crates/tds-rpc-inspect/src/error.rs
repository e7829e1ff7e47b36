//! RPC decoding error types.

use mssql_types::TypeError;
use tds_protocol::{PacketType, ProtocolError};
use thiserror::Error;

/// Errors that can occur while decoding an RPC Request.
///
/// Every error is terminal for the decode call: no partial request is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The packet is not an RPC Request.
    #[error("expected an RPC request packet, got {actual:?}")]
    WrongPacketType {
        /// Type tag of the packet that was passed in.
        actual: PacketType,
    },

    /// A fixed-size read or a seek ran past the end of the payload.
    #[error("truncated RPC packet: {source}")]
    TruncatedPacket {
        /// The failed read.
        #[source]
        source: ProtocolError,
    },

    /// Procedure ID at or beyond the size of the well-known catalog.
    #[error("procedure id {0} is out of range")]
    InvalidProcedureId(u16),

    /// Procedure ID in range that maps to no well-known procedure.
    #[error("procedure id {0} is unmapped")]
    UnmappedProcedureId(u16),

    /// The procedure name is empty or not valid UTF-16.
    #[error("invalid procedure name")]
    InvalidProcedureName,

    /// The type/value subsystem rejected a parameter.
    #[error("failed to decode parameter {index}: {source}")]
    ParameterDecodeFailure {
        /// Zero-based position of the parameter in the call.
        index: usize,
        /// Underlying descriptor or value error.
        #[source]
        source: TypeError,
    },
}

impl DecodeError {
    /// Check if the packet ended before a complete structure could be read.
    ///
    /// This covers `TruncatedPacket` and parameter failures caused by a
    /// value running past the end of the payload.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        match self {
            Self::TruncatedPacket { .. } => true,
            Self::ParameterDecodeFailure { source, .. } => {
                matches!(source, TypeError::BufferTooSmall { .. })
            }
            _ => false,
        }
    }

    /// Check if the procedure identifier was rejected.
    #[must_use]
    pub fn is_procedure_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidProcedureId(_)
                | Self::UnmappedProcedureId(_)
                | Self::InvalidProcedureName
        )
    }
}

impl From<ProtocolError> for DecodeError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidProcId(id) => Self::InvalidProcedureId(id),
            ProtocolError::UnmappedProcId(id) => Self::UnmappedProcedureId(id),
            ProtocolError::InvalidUtf16 => Self::InvalidProcedureName,
            // Only length and seek failures remain on the decode path.
            source => Self::TruncatedPacket { source },
        }
    }
}
