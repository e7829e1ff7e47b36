//! TDS binary decoding for SQL values.
//!
//! [`read_value`] reads the value that follows a TYPE_INFO descriptor. The
//! descriptor's length prefix decides how many bytes belong to the value,
//! and the payload is then interpreted per type.

use bytes::Bytes;
use tds_protocol::{LengthPrefix, TypeId};

use crate::error::TypeError;
use crate::reader::ValueReader;
use crate::type_info::TypeInfo;
use crate::value::SqlValue;

/// PLP total length announcing a NULL value.
const PLP_NULL: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// Read one value described by `type_info` from the reader.
pub fn read_value(reader: &mut ValueReader<'_>, type_info: &TypeInfo) -> Result<SqlValue, TypeError> {
    let payload = match type_info.length_prefix() {
        LengthPrefix::Fixed(0) => return Ok(SqlValue::Null),
        LengthPrefix::Fixed(size) => reader.take(size)?.to_vec(),
        LengthPrefix::Byte => {
            let len = reader.u8()? as usize;
            if len == 0 {
                return Ok(SqlValue::Null);
            }
            reader.take(len)?.to_vec()
        }
        LengthPrefix::UShort => {
            let len = reader.u16_le()?;
            if len == 0xFFFF {
                return Ok(SqlValue::Null);
            }
            reader.take(len as usize)?.to_vec()
        }
        LengthPrefix::Long => {
            let len = reader.u32_le()?;
            if len == 0xFFFF_FFFF {
                return Ok(SqlValue::Null);
            }
            reader.take(len as usize)?.to_vec()
        }
        LengthPrefix::Plp => match read_plp(reader)? {
            Some(data) => data,
            None => return Ok(SqlValue::Null),
        },
    };

    decode_payload(&payload, type_info)
}

/// Read a PLP body, returning `None` for NULL.
fn read_plp(reader: &mut ValueReader<'_>) -> Result<Option<Vec<u8>>, TypeError> {
    let total = reader.u64_le()?;
    if total == PLP_NULL {
        return Ok(None);
    }

    let mut data = Vec::new();
    loop {
        let chunk_len = reader.u32_le()? as usize;
        if chunk_len == 0 {
            break;
        }
        data.extend_from_slice(reader.take(chunk_len)?);
    }
    Ok(Some(data))
}

/// Interpret the payload bytes of a non-NULL value.
fn decode_payload(data: &[u8], type_info: &TypeInfo) -> Result<SqlValue, TypeError> {
    let type_id = type_info.type_id;
    match type_id {
        TypeId::Null => Ok(SqlValue::Null),

        TypeId::Int1 | TypeId::Int2 | TypeId::Int4 | TypeId::Int8 | TypeId::IntN => {
            decode_int(data)
        }
        TypeId::Bit | TypeId::BitN => match data {
            [b] => Ok(SqlValue::Bool(*b != 0)),
            _ => Err(invalid_length(type_id, data)),
        },
        TypeId::Float4 | TypeId::Float8 | TypeId::FloatN => decode_float(data),
        TypeId::Money | TypeId::Money4 | TypeId::MoneyN => decode_money(data),
        TypeId::DateTime | TypeId::DateTime4 | TypeId::DateTimeN => decode_datetime(data),

        TypeId::Guid => decode_guid(data),
        TypeId::Decimal | TypeId::Numeric | TypeId::DecimalN | TypeId::NumericN => {
            decode_decimal(data, type_info.scale.unwrap_or(0))
        }

        TypeId::Date => decode_date(data),
        TypeId::Time => decode_time(data, type_info.scale.unwrap_or(7)),
        TypeId::DateTime2 => decode_datetime2(data, type_info.scale.unwrap_or(7)),
        TypeId::DateTimeOffset => decode_datetimeoffset(data, type_info.scale.unwrap_or(7)),

        TypeId::NVarChar | TypeId::NChar | TypeId::NText => {
            decode_utf16_string(data).map(SqlValue::String)
        }
        TypeId::Xml => decode_utf16_string(data).map(SqlValue::Xml),
        TypeId::BigVarChar | TypeId::BigChar | TypeId::VarChar | TypeId::Char | TypeId::Text => {
            Ok(SqlValue::String(decode_varchar(data, type_info)))
        }

        TypeId::BigVarBinary
        | TypeId::BigBinary
        | TypeId::VarBinary
        | TypeId::Binary
        | TypeId::Image => Ok(SqlValue::Binary(Bytes::copy_from_slice(data))),

        TypeId::Variant | TypeId::Udt | TypeId::Tvp => {
            Err(TypeError::UnsupportedType(type_id as u8))
        }
    }
}

fn invalid_length(type_id: TypeId, data: &[u8]) -> TypeError {
    TypeError::InvalidLength {
        type_name: type_id.sql_name(),
        length: data.len(),
    }
}

fn decode_int(data: &[u8]) -> Result<SqlValue, TypeError> {
    match *data {
        [b] => Ok(SqlValue::TinyInt(b)),
        [a, b] => Ok(SqlValue::SmallInt(i16::from_le_bytes([a, b]))),
        [a, b, c, d] => Ok(SqlValue::Int(i32::from_le_bytes([a, b, c, d]))),
        [a, b, c, d, e, f, g, h] => Ok(SqlValue::BigInt(i64::from_le_bytes([
            a, b, c, d, e, f, g, h,
        ]))),
        _ => Err(invalid_length(TypeId::IntN, data)),
    }
}

fn decode_float(data: &[u8]) -> Result<SqlValue, TypeError> {
    match *data {
        [a, b, c, d] => Ok(SqlValue::Float(f32::from_le_bytes([a, b, c, d]))),
        [a, b, c, d, e, f, g, h] => Ok(SqlValue::Double(f64::from_le_bytes([
            a, b, c, d, e, f, g, h,
        ]))),
        _ => Err(invalid_length(TypeId::FloatN, data)),
    }
}

/// MONEY is a 64-bit count of ten-thousandths, high half first.
fn decode_money(data: &[u8]) -> Result<SqlValue, TypeError> {
    let units: i64 = match *data {
        [a, b, c, d] => i64::from(i32::from_le_bytes([a, b, c, d])),
        [a, b, c, d, e, f, g, h] => {
            let high = i64::from(i32::from_le_bytes([a, b, c, d]));
            let low = i64::from(u32::from_le_bytes([e, f, g, h]));
            (high << 32) | low
        }
        _ => return Err(invalid_length(TypeId::MoneyN, data)),
    };

    #[cfg(feature = "decimal")]
    {
        Ok(SqlValue::Decimal(rust_decimal::Decimal::new(units, 4)))
    }
    #[cfg(not(feature = "decimal"))]
    {
        Ok(SqlValue::Double(units as f64 / 10_000.0))
    }
}

#[cfg(feature = "uuid")]
fn decode_guid(data: &[u8]) -> Result<SqlValue, TypeError> {
    let raw: [u8; 16] = data
        .try_into()
        .map_err(|_| invalid_length(TypeId::Guid, data))?;

    // SQL Server stores UUIDs in mixed-endian format: the first three
    // groups are little-endian, the last eight bytes as-is.
    let mut bytes = raw;
    bytes[..4].reverse();
    bytes[4..6].reverse();
    bytes[6..8].reverse();

    Ok(SqlValue::Uuid(uuid::Uuid::from_bytes(bytes)))
}

#[cfg(not(feature = "uuid"))]
fn decode_guid(data: &[u8]) -> Result<SqlValue, TypeError> {
    if data.len() != 16 {
        return Err(invalid_length(TypeId::Guid, data));
    }
    Ok(SqlValue::Binary(Bytes::copy_from_slice(data)))
}

#[cfg(feature = "decimal")]
fn decode_decimal(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    use rust_decimal::Decimal;

    // Sign byte (0 = negative) followed by a 4, 8, 12 or 16 byte mantissa.
    let (&sign, mantissa_bytes) = data
        .split_first()
        .ok_or_else(|| invalid_length(TypeId::DecimalN, data))?;
    if !matches!(mantissa_bytes.len(), 4 | 8 | 12 | 16) {
        return Err(invalid_length(TypeId::DecimalN, data));
    }

    let mut raw = [0u8; 16];
    raw[..mantissa_bytes.len()].copy_from_slice(mantissa_bytes);
    let mantissa = i128::try_from(u128::from_le_bytes(raw))
        .map_err(|_| TypeError::InvalidDecimal("mantissa exceeds 127 bits".to_string()))?;

    let mut decimal = Decimal::try_from_i128_with_scale(mantissa, u32::from(scale))
        .map_err(|e| TypeError::InvalidDecimal(e.to_string()))?;
    if sign == 0 {
        decimal.set_sign_negative(true);
    }

    Ok(SqlValue::Decimal(decimal))
}

#[cfg(not(feature = "decimal"))]
fn decode_decimal(data: &[u8], _scale: u8) -> Result<SqlValue, TypeError> {
    if data.is_empty() {
        return Err(invalid_length(TypeId::DecimalN, data));
    }
    Ok(SqlValue::Binary(Bytes::copy_from_slice(data)))
}

/// Little-endian unsigned integer of up to eight bytes.
#[cfg(feature = "chrono")]
fn le_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Number of bytes holding the time part for a given scale.
fn time_bytes_for_scale(scale: u8) -> usize {
    match scale {
        0..=2 => 3,
        3..=4 => 4,
        _ => 5,
    }
}

#[cfg(feature = "chrono")]
mod temporal {
    use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

    use super::{TypeError, le_uint};

    pub(super) fn days_from_year_one(days: u64) -> Result<NaiveDate, TypeError> {
        NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|base| base.checked_add_signed(Duration::days(days as i64)))
            .ok_or_else(|| TypeError::InvalidDateTime(format!("day {days} out of range")))
    }

    pub(super) fn days_from_1900(days: i64) -> Result<NaiveDate, TypeError> {
        NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|base| base.checked_add_signed(Duration::days(days)))
            .ok_or_else(|| TypeError::InvalidDateTime(format!("day {days} out of range")))
    }

    /// Time of day from `10^-scale` second intervals.
    pub(super) fn time_from_intervals(bytes: &[u8], scale: u8) -> Result<NaiveTime, TypeError> {
        let intervals = le_uint(bytes);
        let nanos = intervals
            .checked_mul(10u64.pow(9u32.saturating_sub(u32::from(scale.min(7)))))
            .ok_or_else(|| TypeError::InvalidDateTime("time overflow".to_string()))?;
        NaiveTime::from_num_seconds_from_midnight_opt(
            (nanos / 1_000_000_000) as u32,
            (nanos % 1_000_000_000) as u32,
        )
        .ok_or_else(|| TypeError::InvalidDateTime(format!("{intervals} intervals past midnight")))
    }

    pub(super) fn with_offset(
        utc: NaiveDateTime,
        offset_minutes: i16,
    ) -> Result<chrono::DateTime<FixedOffset>, TypeError> {
        let offset = FixedOffset::east_opt(i32::from(offset_minutes) * 60)
            .ok_or_else(|| TypeError::InvalidDateTime(format!("invalid offset: {offset_minutes}")))?;
        Ok(offset.from_utc_datetime(&utc))
    }
}

#[cfg(feature = "chrono")]
fn decode_datetime(data: &[u8]) -> Result<SqlValue, TypeError> {
    match *data {
        // SMALLDATETIME: days since 1900-01-01 + minutes since midnight
        [a, b, c, d] => {
            let days = u16::from_le_bytes([a, b]);
            let minutes = u16::from_le_bytes([c, d]);
            let date = temporal::days_from_1900(i64::from(days))?;
            let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                u32::from(minutes) * 60,
                0,
            )
            .ok_or_else(|| TypeError::InvalidDateTime(format!("{minutes} minutes")))?;
            Ok(SqlValue::DateTime(date.and_time(time)))
        }
        // DATETIME: days since 1900-01-01 + 1/300 second ticks
        [a, b, c, d, e, f, g, h] => {
            let days = i32::from_le_bytes([a, b, c, d]);
            let ticks = u32::from_le_bytes([e, f, g, h]);
            let date = temporal::days_from_1900(i64::from(days))?;
            let total_ms = u64::from(ticks) * 10 / 3;
            let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                (total_ms / 1000) as u32,
                ((total_ms % 1000) * 1_000_000) as u32,
            )
            .ok_or_else(|| TypeError::InvalidDateTime(format!("{ticks} ticks")))?;
            Ok(SqlValue::DateTime(date.and_time(time)))
        }
        _ => Err(invalid_length(TypeId::DateTimeN, data)),
    }
}

#[cfg(feature = "chrono")]
fn decode_date(data: &[u8]) -> Result<SqlValue, TypeError> {
    if data.len() != 3 {
        return Err(invalid_length(TypeId::Date, data));
    }
    temporal::days_from_year_one(le_uint(data)).map(SqlValue::Date)
}

#[cfg(feature = "chrono")]
fn decode_time(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    if data.len() != time_bytes_for_scale(scale) {
        return Err(invalid_length(TypeId::Time, data));
    }
    temporal::time_from_intervals(data, scale).map(SqlValue::Time)
}

#[cfg(feature = "chrono")]
fn decode_datetime2(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    let time_len = time_bytes_for_scale(scale);
    if data.len() != time_len + 3 {
        return Err(invalid_length(TypeId::DateTime2, data));
    }
    let time = temporal::time_from_intervals(&data[..time_len], scale)?;
    let date = temporal::days_from_year_one(le_uint(&data[time_len..]))?;
    Ok(SqlValue::DateTime(date.and_time(time)))
}

#[cfg(feature = "chrono")]
fn decode_datetimeoffset(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    let time_len = time_bytes_for_scale(scale);
    if data.len() != time_len + 5 {
        return Err(invalid_length(TypeId::DateTimeOffset, data));
    }
    let time = temporal::time_from_intervals(&data[..time_len], scale)?;
    let date = temporal::days_from_year_one(le_uint(&data[time_len..time_len + 3]))?;
    let offset = i16::from_le_bytes([data[time_len + 3], data[time_len + 4]]);
    temporal::with_offset(date.and_time(time), offset).map(SqlValue::DateTimeOffset)
}

// Without chrono the temporal payloads are surfaced raw, after the same
// length checks.
#[cfg(not(feature = "chrono"))]
fn decode_datetime(data: &[u8]) -> Result<SqlValue, TypeError> {
    match data.len() {
        4 | 8 => Ok(SqlValue::Binary(Bytes::copy_from_slice(data))),
        _ => Err(invalid_length(TypeId::DateTimeN, data)),
    }
}

#[cfg(not(feature = "chrono"))]
fn decode_date(data: &[u8]) -> Result<SqlValue, TypeError> {
    match data.len() {
        3 => Ok(SqlValue::Binary(Bytes::copy_from_slice(data))),
        _ => Err(invalid_length(TypeId::Date, data)),
    }
}

#[cfg(not(feature = "chrono"))]
fn decode_time(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    if data.len() != time_bytes_for_scale(scale) {
        return Err(invalid_length(TypeId::Time, data));
    }
    Ok(SqlValue::Binary(Bytes::copy_from_slice(data)))
}

#[cfg(not(feature = "chrono"))]
fn decode_datetime2(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    if data.len() != time_bytes_for_scale(scale) + 3 {
        return Err(invalid_length(TypeId::DateTime2, data));
    }
    Ok(SqlValue::Binary(Bytes::copy_from_slice(data)))
}

#[cfg(not(feature = "chrono"))]
fn decode_datetimeoffset(data: &[u8], scale: u8) -> Result<SqlValue, TypeError> {
    if data.len() != time_bytes_for_scale(scale) + 5 {
        return Err(invalid_length(TypeId::DateTimeOffset, data));
    }
    Ok(SqlValue::Binary(Bytes::copy_from_slice(data)))
}

fn decode_varchar(data: &[u8], type_info: &TypeInfo) -> String {
    // Try UTF-8 first (most common case and zero-cost for ASCII)
    if let Ok(s) = std::str::from_utf8(data) {
        return s.to_owned();
    }

    #[cfg(feature = "encoding")]
    if let Some(encoding) = type_info.collation.as_ref().and_then(|c| c.encoding()) {
        let (decoded, _, had_errors) = encoding.decode(data);
        if !had_errors {
            return decoded.into_owned();
        }
    }

    #[cfg(not(feature = "encoding"))]
    let _ = type_info;

    String::from_utf8_lossy(data).into_owned()
}

/// Decode a UTF-16LE string from bytes.
pub fn decode_utf16_string(data: &[u8]) -> Result<String, TypeError> {
    if data.len() % 2 != 0 {
        return Err(TypeError::InvalidEncoding(
            "UTF-16 data must have even length".to_string(),
        ));
    }

    let utf16: Vec<u16> = data
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&utf16).map_err(|e| TypeError::InvalidEncoding(e.to_string()))
}
