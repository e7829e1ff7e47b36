//! # mssql-types
//!
//! Decoding of SQL Server parameter values as they appear in TDS RPC
//! requests.
//!
//! Every RPC parameter carries a TYPE_INFO descriptor followed by the value
//! itself. [`read_type_info`] reads the descriptor and [`read_value`] reads
//! the value it describes, both from a [`ValueReader`] that is limited to
//! the bytes the caller is allowed to consume.
//!
//! ## Features
//!
//! - `chrono` (default): Date/time values decode to chrono types
//! - `uuid` (default): UNIQUEIDENTIFIER decodes to `uuid::Uuid`
//! - `decimal` (default): DECIMAL, NUMERIC and MONEY decode to `rust_decimal::Decimal`
//! - `encoding`: Collation-aware decoding of non-UTF-8 VARCHAR data
//!
//! ## Type Mappings
//!
//! | SQL Server Type | [`SqlValue`] variant |
//! |-----------------|-----------|
//! | `BIT` | `Bool` |
//! | `TINYINT` | `TinyInt` |
//! | `SMALLINT` | `SmallInt` |
//! | `INT` | `Int` |
//! | `BIGINT` | `BigInt` |
//! | `REAL` | `Float` |
//! | `FLOAT` | `Double` |
//! | `DECIMAL`/`NUMERIC`/`MONEY` | `Decimal` |
//! | `CHAR`/`VARCHAR`/`NCHAR`/`NVARCHAR` | `String` |
//! | `BINARY`/`VARBINARY`/`IMAGE` | `Binary` |
//! | `DATE` | `Date` |
//! | `TIME` | `Time` |
//! | `DATETIME`/`DATETIME2` | `DateTime` |
//! | `DATETIMEOFFSET` | `DateTimeOffset` |
//! | `UNIQUEIDENTIFIER` | `Uuid` |
//! | `XML` | `Xml` |
//!
//! ## Example
//!
//! ```rust
//! use mssql_types::{SqlValue, ValueReader, read_type_info, read_value};
//!
//! // INTN(4) carrying 42
//! let bytes = [0x26, 0x04, 0x04, 0x2A, 0x00, 0x00, 0x00];
//! let mut reader = ValueReader::new(&bytes, bytes.len());
//! let info = read_type_info(&mut reader).unwrap();
//! assert_eq!(read_value(&mut reader, &info).unwrap(), SqlValue::Int(42));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod decode;
pub mod error;
pub mod reader;
pub mod type_info;
pub mod value;

pub use decode::{decode_utf16_string, read_value};
pub use error::TypeError;
pub use reader::ValueReader;
pub use type_info::{Collation, TypeInfo, read_type_info};
pub use value::SqlValue;
