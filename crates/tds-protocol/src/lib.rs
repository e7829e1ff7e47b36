//! # tds-protocol
//!
//! Wire-level building blocks of the MS-TDS (Tabular Data Stream) protocol
//! used by Microsoft SQL Server, as needed to inspect client requests.
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. It contains no networking logic
//! and never panics on malformed input: every read goes through the
//! bounds-checked [`ByteCursor`] and reports a [`ProtocolError`].
//!
//! ## Example
//!
//! ```rust
//! use tds_protocol::{ByteCursor, ProcId, ProcName};
//!
//! let data = [0xFF, 0xFF, 0x0A, 0x00];
//! let mut cursor = ByteCursor::new(&data);
//! let name = ProcName::decode(&mut cursor).unwrap();
//! assert_eq!(name.proc_id(), Some(ProcId::ExecuteSql));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod error;
pub mod packet;
pub mod rpc;
pub mod types;

pub use codec::ByteCursor;
pub use error::ProtocolError;
pub use packet::{MAX_PACKET_SIZE, PACKET_HEADER_SIZE, Packet, PacketHeader, PacketStatus, PacketType};
pub use rpc::{CATALOG_SIZE, ParamStatus, ProcId, ProcName, RPC_PROC_ID_SENTINEL, RpcOptionFlags};
pub use types::{LengthPrefix, TypeId};
