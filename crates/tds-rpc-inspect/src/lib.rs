//! # tds-rpc-inspect
//!
//! Decoder for the SQL Server TDS RPC Request packet, for intermediaries
//! that observe client traffic (auditing, logging, policy checks).
//!
//! An RPC Request invokes a stored procedure either by UTF-16 name or by
//! one of fifteen well-known IDs (`sp_executesql`, `sp_prepexec`, the
//! cursor procedures, ...), followed by typed parameter values. The decoder
//! turns a [`Packet`] into an [`RpcRequest`] carrying the procedure name
//! and the rendered parameter values.
//!
//! ## Design
//!
//! Decoding is pure and synchronous. Every read is bounds-checked and a
//! malformed or truncated packet yields a [`DecodeError`], never a panic or
//! a partial result. By default only the first parameter is decoded;
//! [`ParameterMode::All`] reads every parameter record.
//!
//! ## Example
//!
//! ```rust
//! use tds_protocol::{Packet, PacketType};
//! use tds_rpc_inspect::decode_rpc_request;
//!
//! let payload = [
//!     0x04, 0x00, 0x00, 0x00, // headers length (no headers)
//!     0xFF, 0xFF, 0x0A, 0x00, // sp_executesql by ID
//!     0x00, 0x00, 0x00, 0x00, // option flags, reserved
//!     0x38, 0x2A, 0x00, 0x00, 0x00, // INT 42
//! ];
//! let packet = Packet::new(PacketType::Rpc, payload.to_vec());
//!
//! let request = decode_rpc_request(&packet).unwrap();
//! assert_eq!(request.proc_name(), "Sp_ExecuteSql");
//! assert_eq!(request.parameters(), ["42"]);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod params;
pub mod request;

pub use config::{ConfigError, DEFAULT_MAX_PARAMETERS, DecoderConfig, ParameterMode};
pub use decoder::{RpcDecoder, decode_rpc_request};
pub use error::DecodeError;
pub use params::{Parameters, RpcParameter};
pub use request::{Procedure, RpcRequest};

pub use tds_protocol::{Packet, PacketType, ProcId, RpcOptionFlags};
