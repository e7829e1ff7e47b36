//! Lazy parameter sequence.
//!
//! After the option flags an RPC request carries its parameter records.
//! Each record is a `B_VARCHAR` name, a status byte, a TYPE_INFO and the
//! value. [`Parameters`] walks these records on demand, handing each
//! descriptor and value to `mssql-types`.
//!
//! In [`ParameterMode::First`] the name and status are skipped as two
//! reserved bytes and only the first value is read. For an unnamed first
//! parameter this is exactly the record header, so both modes agree on the
//! first value.
//!
//! An ID-addressed call always carries a first value: running out of bytes
//! after the reserved bytes is a truncation, not an empty parameter list.

use mssql_types::{SqlValue, TypeError, TypeInfo, ValueReader, read_type_info, read_value};
use tds_protocol::{ByteCursor, ParamStatus, TypeId, codec::read_b_varchar};

use crate::config::{DecoderConfig, ParameterMode};
use crate::error::DecodeError;

/// Bytes skipped in front of the first value in [`ParameterMode::First`].
const RESERVED_LEN: usize = 2;

/// One decoded parameter record.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcParameter {
    /// Parameter name, empty for positional parameters.
    pub name: String,
    /// Status flags.
    pub status: ParamStatus,
    /// Type descriptor the value was read with.
    pub type_info: TypeInfo,
    /// The value.
    pub value: SqlValue,
}

impl RpcParameter {
    /// TDS type of the parameter.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_info.type_id
    }

    /// Render the value for display, cut to `max_len` characters when set.
    #[must_use]
    pub fn render(&self, max_len: Option<usize>) -> String {
        render_value(&self.value, max_len)
    }
}

pub(crate) fn render_value(value: &SqlValue, max_len: Option<usize>) -> String {
    let text = value.to_string();
    match max_len {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}

/// Restartable iterator over the parameter records of a request.
///
/// Cloning yields an independent iterator at the same position. The
/// iterator fuses after the first error.
#[derive(Debug, Clone)]
pub struct Parameters<'a> {
    cursor: ByteCursor<'a>,
    mode: ParameterMode,
    max_parameters: usize,
    index: usize,
    done: bool,
}

impl<'a> Parameters<'a> {
    /// Iterate over `payload` from `start`, the first byte after the
    /// option flags.
    pub(crate) fn new(
        payload: &'a [u8],
        start: usize,
        config: &DecoderConfig,
    ) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(payload);
        cursor.seek(start)?;
        let max_parameters = match config.parameter_mode {
            ParameterMode::First => 1,
            ParameterMode::All => config.max_parameters,
        };
        Ok(Self {
            cursor,
            mode: config.parameter_mode,
            max_parameters,
            index: 0,
            done: false,
        })
    }

    /// A sequence with no parameters, as for name-addressed calls.
    pub(crate) fn empty() -> Self {
        Self {
            cursor: ByteCursor::new(&[]),
            mode: ParameterMode::First,
            max_parameters: 0,
            index: 0,
            done: true,
        }
    }

    /// Number of parameters produced so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining_bytes(&self) -> usize {
        self.cursor.remaining()
    }

    /// Decode the next parameter record.
    ///
    /// Returns `None` once the payload is exhausted or the parameter limit
    /// is reached.
    pub fn next_parameter(&mut self) -> Option<Result<RpcParameter, DecodeError>> {
        if self.done {
            return None;
        }
        if self.index >= self.max_parameters {
            self.done = true;
            if self.cursor.remaining() > 0 {
                tracing::trace!(
                    decoded = self.index,
                    trailing_bytes = self.cursor.remaining(),
                    "parameter limit reached, ignoring trailing bytes"
                );
            }
            return None;
        }

        let result = self.read_record();
        match &result {
            Ok(Some(param)) => {
                tracing::trace!(
                    index = self.index,
                    name = %param.name,
                    sql_type = %param.type_info.sql_type(),
                    "decoded parameter"
                );
                self.index += 1;
            }
            Ok(None) => self.done = true,
            Err(_) => self.done = true,
        }
        result.transpose()
    }

    fn read_record(&mut self) -> Result<Option<RpcParameter>, DecodeError> {
        let index = self.index;
        let fail = |source: TypeError| DecodeError::ParameterDecodeFailure { index, source };

        let (name, status) = match self.mode {
            ParameterMode::First => {
                self.cursor.skip(RESERVED_LEN)?;
                (String::new(), ParamStatus::empty())
            }
            ParameterMode::All => {
                if self.cursor.remaining() == 0 {
                    return Ok(None);
                }
                let name = read_b_varchar(&mut self.cursor).map_err(|e| fail(e.into()))?;
                let status = self.cursor.read_u8().map_err(|e| fail(e.into()))?;
                (name, ParamStatus::from_bits_retain(status))
            }
        };

        // A record header must be followed by at least a type byte.
        if self.cursor.remaining() == 0 {
            return Err(fail(TypeError::BufferTooSmall {
                needed: 1,
                available: 0,
            }));
        }

        let rest = self.cursor.rest();
        let mut reader = ValueReader::new(rest, rest.len());
        let type_info = read_type_info(&mut reader).map_err(fail)?;
        let value = read_value(&mut reader, &type_info).map_err(fail)?;
        self.cursor.skip(reader.position())?;

        Ok(Some(RpcParameter {
            name,
            status,
            type_info,
            value,
        }))
    }
}

impl Iterator for Parameters<'_> {
    type Item = Result<RpcParameter, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_parameter()
    }
}

impl std::iter::FusedIterator for Parameters<'_> {}
