//! TDS packet header and packet definitions.

use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::ByteCursor;
use crate::error::ProtocolError;

/// Size of the fixed header that precedes every packet payload.
pub const PACKET_HEADER_SIZE: usize = 8;

/// Largest packet the header's length field can describe.
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// Message type carried in the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Ad hoc T-SQL text.
    SqlBatch = 0x01,
    /// Login from a pre-7.0 client.
    PreTds7Login = 0x02,
    /// RPC Request: a procedure call with typed parameters.
    Rpc = 0x03,
    /// Server response stream.
    TabularResult = 0x04,
    /// Cancel of the running request.
    Attention = 0x06,
    /// Bulk insert rows.
    BulkLoad = 0x07,
    /// Federated authentication token.
    FedAuthToken = 0x08,
    /// Distributed transaction request.
    TransactionManager = 0x0E,
    /// Login7 record.
    Tds7Login = 0x10,
    /// SSPI negotiation blob.
    Sspi = 0x11,
    /// Pre-login handshake.
    PreLogin = 0x12,
}

impl PacketType {
    const ALL: [Self; 11] = [
        Self::SqlBatch,
        Self::PreTds7Login,
        Self::Rpc,
        Self::TabularResult,
        Self::Attention,
        Self::BulkLoad,
        Self::FedAuthToken,
        Self::TransactionManager,
        Self::Tds7Login,
        Self::Sspi,
        Self::PreLogin,
    ];

    /// Look up the packet type for a header type byte.
    pub fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        Self::try_from(value)
    }
}

impl TryFrom<u8> for PacketType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| *ty as u8 == value)
            .ok_or(ProtocolError::InvalidPacketType(value))
    }
}

bitflags! {
    /// Status bits in the second header byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PacketStatus: u8 {
        /// More packets of this message follow.
        const NORMAL = 0x00;
        /// Last packet of the message.
        const END_OF_MESSAGE = 0x01;
        /// Sender asks the receiver to drop this message.
        const IGNORE_EVENT = 0x02;
        /// Reset the session before running the request.
        const RESET_CONNECTION = 0x08;
        /// Reset the session but keep its transaction.
        const RESET_CONNECTION_KEEP_TRANSACTION = 0x10;
    }
}

/// The 8-byte header in front of every packet payload.
///
/// `length` and `spid` are big-endian on the wire, unlike the payload.
/// The trailing window byte is always zero and not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Message type.
    pub packet_type: PacketType,
    /// Status bits.
    pub status: PacketStatus,
    /// Header plus payload length in bytes.
    pub length: u16,
    /// Server session the packet belongs to.
    pub spid: u16,
    /// Sequence number within the message, modulo 256.
    pub packet_id: u8,
}

impl PacketHeader {
    /// A header for the first packet of a client message.
    #[must_use]
    pub const fn new(packet_type: PacketType, status: PacketStatus, length: u16) -> Self {
        Self {
            packet_type,
            status,
            length,
            spid: 0,
            packet_id: 1,
        }
    }

    /// Read a header from the cursor.
    pub fn decode(src: &mut ByteCursor<'_>) -> Result<Self, ProtocolError> {
        let packet_type = PacketType::try_from(src.read_u8()?)?;
        let raw_status = src.read_u8()?;
        let status =
            PacketStatus::from_bits(raw_status).ok_or(ProtocolError::InvalidPacketStatus(raw_status))?;
        let length = u16::from_be_bytes(src.read_array()?);
        let spid = u16::from_be_bytes(src.read_array()?);
        let packet_id = src.read_u8()?;
        src.skip(1)?;

        Ok(Self {
            packet_type,
            status,
            length,
            spid,
            packet_id,
        })
    }

    /// Write the header in wire order.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.packet_type as u8);
        dst.put_u8(self.status.bits());
        dst.put_u16(self.length);
        dst.put_u16(self.spid);
        dst.put_u8(self.packet_id);
        dst.put_u8(0);
    }

    /// Bytes of payload announced by the header.
    #[must_use]
    pub const fn payload_length(&self) -> usize {
        (self.length as usize).saturating_sub(PACKET_HEADER_SIZE)
    }
}

/// A TDS packet as handed over by the transport: a type tag and its payload.
///
/// The payload is immutable; decoders borrow it through [`Packet::payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    packet_type: PacketType,
    payload: Bytes,
}

impl Packet {
    /// Create a packet from a type tag and payload bytes.
    #[must_use]
    pub fn new(packet_type: PacketType, payload: impl Into<Bytes>) -> Self {
        Self {
            packet_type,
            payload: payload.into(),
        }
    }

    /// Parse a single framed packet (header followed by payload).
    ///
    /// The buffer must hold at least the length announced by the header;
    /// anything beyond it is ignored.
    pub fn from_wire(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut cursor = ByteCursor::new(data);
        let header = PacketHeader::decode(&mut cursor)?;

        if (header.length as usize) < PACKET_HEADER_SIZE {
            return Err(ProtocolError::InvalidPacketLength(header.length));
        }

        let payload = cursor.read_bytes(header.payload_length())?;
        Ok(Self::new(header.packet_type, Bytes::copy_from_slice(payload)))
    }

    /// Frame this packet as a single end-of-message packet.
    ///
    /// Payloads longer than a packet can carry are truncated to fit.
    #[must_use]
    pub fn to_wire(&self) -> Bytes {
        let payload_len = self.payload.len().min(MAX_PACKET_SIZE - PACKET_HEADER_SIZE);
        let header = PacketHeader::new(
            self.packet_type,
            PacketStatus::END_OF_MESSAGE,
            (PACKET_HEADER_SIZE + payload_len) as u16,
        );

        let mut buf = BytesMut::with_capacity(PACKET_HEADER_SIZE + payload_len);
        header.encode(&mut buf);
        buf.put_slice(&self.payload[..payload_len]);
        buf.freeze()
    }

    /// The packet type tag.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// The payload bytes (excluding the 8-byte header).
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_wire_layout() {
        let header = PacketHeader {
            packet_type: PacketType::Rpc,
            status: PacketStatus::END_OF_MESSAGE,
            length: 0x0102,
            spid: 54,
            packet_id: 3,
        };

        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(&buf[..], [0x03, 0x01, 0x01, 0x02, 0x00, 0x36, 0x03, 0x00]);

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(PacketHeader::decode(&mut cursor).unwrap(), header);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_payload_length_excludes_header() {
        let header = PacketHeader::new(PacketType::Rpc, PacketStatus::END_OF_MESSAGE, 46);
        assert_eq!(header.payload_length(), 38);
        let short = PacketHeader::new(PacketType::Rpc, PacketStatus::END_OF_MESSAGE, 3);
        assert_eq!(short.payload_length(), 0);
    }

    #[test]
    fn test_packet_type_lookup() {
        assert_eq!(PacketType::from_u8(0x03), Ok(PacketType::Rpc));
        assert_eq!(PacketType::try_from(0x0E), Ok(PacketType::TransactionManager));
        assert_eq!(
            PacketType::try_from(0x05),
            Err(ProtocolError::InvalidPacketType(0x05))
        );
    }

    #[test]
    fn test_unknown_status_bits() {
        let wire = [0x03, 0x40, 0x00, 0x08, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(
            Packet::from_wire(&wire),
            Err(ProtocolError::InvalidPacketStatus(0x40))
        );
    }

    #[test]
    fn test_packet_from_wire() {
        let packet = Packet::new(PacketType::Rpc, Bytes::from_static(b"\x04\x00\x00\x00"));
        let wire = packet.to_wire();
        assert_eq!(wire.len(), 12);
        assert_eq!(Packet::from_wire(&wire).unwrap(), packet);
    }

    #[test]
    fn test_packet_from_wire_short_payload() {
        let mut wire = Packet::new(PacketType::Rpc, Bytes::from_static(b"abcd"))
            .to_wire()
            .to_vec();
        wire.truncate(10);
        assert!(matches!(
            Packet::from_wire(&wire),
            Err(ProtocolError::IncompletePacket {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_packet_from_wire_bad_length() {
        let wire = [0x03, 0x01, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(
            Packet::from_wire(&wire),
            Err(ProtocolError::InvalidPacketLength(4))
        );
    }
}
