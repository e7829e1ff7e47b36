//! RPC Request decoding.
//!
//! The payload is walked once, front to back:
//!
//! 1. `ALL_HEADERS`: a u32 total length, skipped by seeking to that offset.
//! 2. `NameLenProcID`: a UTF-16 name, or `0xFFFF` and a catalog ID.
//! 3. `OptionFlags`: u16 flags and two bytes ahead of the first value.
//! 4. Parameters, handed to the type/value decoder.
//!
//! Name-addressed calls stop after step 2 with no parameters. Any failure
//! aborts the decode.

use tds_protocol::{ByteCursor, Packet, PacketType, ProtocolError, RpcOptionFlags};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::params::Parameters;
use crate::request::{Procedure, RpcRequest};

/// Size of the `ALL_HEADERS` length field, counted in its own value.
const HEADERS_LENGTH_SIZE: usize = 4;

/// Option flags plus the two bytes that precede the first value.
const OPTIONS_SIZE: usize = 4;

/// Decode an RPC Request packet with the default configuration.
///
/// Only the first parameter value is decoded; see [`RpcDecoder`] to decode
/// all of them.
pub fn decode_rpc_request(packet: &Packet) -> Result<RpcRequest, DecodeError> {
    RpcDecoder::default().decode(packet)
}

/// Procedure and options of a call, with where its parameters start.
struct CallHead {
    procedure: Procedure,
    options: RpcOptionFlags,
    parameters_start: Option<usize>,
}

/// Decoder for RPC Request packets.
///
/// Holds only its configuration; one decoder can serve any number of
/// threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RpcDecoder {
    config: DecoderConfig,
}

impl RpcDecoder {
    /// Create a decoder with the given configuration.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The decoder's configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a packet into an [`RpcRequest`].
    pub fn decode(&self, packet: &Packet) -> Result<RpcRequest, DecodeError> {
        let _span =
            tracing::trace_span!("tds.rpc.decode", packet_len = packet.payload().len()).entered();

        let result = self.decode_request(packet);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "failed to decode RPC request");
        }
        result
    }

    /// Decode the procedure and options, returning the parameters as a lazy
    /// sequence over the packet's payload.
    ///
    /// Nothing past the option flags is read until the sequence is
    /// advanced.
    pub fn parameters<'a>(&self, packet: &'a Packet) -> Result<Parameters<'a>, DecodeError> {
        let head = read_head(packet)?;
        self.parameters_from(packet, &head)
    }

    fn decode_request(&self, packet: &Packet) -> Result<RpcRequest, DecodeError> {
        let head = read_head(packet)?;
        let max_display_len = self.config.max_display_len;
        let parameters = self
            .parameters_from(packet, &head)?
            .map(|param| param.map(|p| p.render(max_display_len)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RpcRequest::new(
            packet.clone(),
            head.procedure,
            head.options,
            parameters,
        ))
    }

    fn parameters_from<'a>(
        &self,
        packet: &'a Packet,
        head: &CallHead,
    ) -> Result<Parameters<'a>, DecodeError> {
        match head.parameters_start {
            Some(start) => Parameters::new(packet.payload(), start, &self.config),
            None => Ok(Parameters::empty()),
        }
    }
}

fn read_head(packet: &Packet) -> Result<CallHead, DecodeError> {
    if packet.packet_type() != PacketType::Rpc {
        return Err(DecodeError::WrongPacketType {
            actual: packet.packet_type(),
        });
    }

    let mut cursor = ByteCursor::new(packet.payload());
    skip_headers(&mut cursor)?;

    let procedure = Procedure::decode(&mut cursor)?;
    tracing::trace!(procedure = %procedure, "read procedure identifier");

    if let Procedure::Named(name) = &procedure {
        if name.is_empty() {
            return Err(DecodeError::InvalidProcedureName);
        }
        return Ok(CallHead {
            procedure,
            options: RpcOptionFlags::empty(),
            parameters_start: None,
        });
    }

    let [lo, hi, ..] = cursor.read_array::<OPTIONS_SIZE>()?;
    let options = RpcOptionFlags::from_bits_retain(u16::from_le_bytes([lo, hi]));
    tracing::trace!(flags = options.bits(), "read option flags");

    Ok(CallHead {
        procedure,
        options,
        parameters_start: Some(cursor.position() - 2),
    })
}

fn skip_headers(cursor: &mut ByteCursor<'_>) -> Result<(), DecodeError> {
    let headers_length = cursor.read_u32_le()? as usize;
    tracing::trace!(headers_length, "skipping headers");

    // The length counts its own four bytes; anything shorter would point
    // back into the length field.
    if headers_length < HEADERS_LENGTH_SIZE {
        return Err(DecodeError::TruncatedPacket {
            source: ProtocolError::SeekOutOfBounds {
                offset: headers_length,
                len: cursor.len(),
            },
        });
    }

    cursor.seek(headers_length)?;
    Ok(())
}
