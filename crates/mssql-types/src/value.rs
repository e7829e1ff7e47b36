//! SQL value representation.

use std::fmt;

use bytes::Bytes;

/// A decoded RPC parameter value.
///
/// Variants gated on a feature fall back to [`SqlValue::Binary`] (or
/// [`SqlValue::Double`] for money) when the feature is disabled.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlValue {
    /// Any type whose length prefix announced NULL.
    #[default]
    Null,
    /// `bit`.
    Bool(bool),
    /// `tinyint`.
    TinyInt(u8),
    /// `smallint`.
    SmallInt(i16),
    /// `int`.
    Int(i32),
    /// `bigint`.
    BigInt(i64),
    /// `real`.
    Float(f32),
    /// `float`.
    Double(f64),
    /// Character data of any width, Unicode or collation-encoded.
    String(String),
    /// Raw bytes, including types decoded without their feature.
    Binary(Bytes),
    /// Exact numerics and money, money at scale 4.
    #[cfg(feature = "decimal")]
    Decimal(rust_decimal::Decimal),
    /// `uniqueidentifier`, byte order already fixed up.
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    /// `date`.
    #[cfg(feature = "chrono")]
    Date(chrono::NaiveDate),
    /// `time(n)`.
    #[cfg(feature = "chrono")]
    Time(chrono::NaiveTime),
    /// `datetime`, `smalldatetime` and `datetime2(n)`.
    #[cfg(feature = "chrono")]
    DateTime(chrono::NaiveDateTime),
    /// `datetimeoffset(n)`, in the sender's offset.
    #[cfg(feature = "chrono")]
    DateTimeOffset(chrono::DateTime<chrono::FixedOffset>),
    /// `xml` document text.
    Xml(String),
}

impl SqlValue {
    /// Whether the value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        *self == Self::Null
    }

    /// Text of character and XML values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) | Self::Xml(text) => Some(text),
            _ => None,
        }
    }

    /// Bytes of binary values.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Self::Binary(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::TinyInt(v) => write!(f, "{v}"),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) | Self::Xml(v) => f.write_str(v),
            Self::Binary(v) => {
                f.write_str("0x")?;
                for byte in v.iter() {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
            #[cfg(feature = "decimal")]
            Self::Decimal(v) => write!(f, "{v}"),
            #[cfg(feature = "uuid")]
            Self::Uuid(v) => write!(f, "{v:X}"),
            #[cfg(feature = "chrono")]
            Self::Date(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::Time(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::DateTime(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::DateTimeOffset(v) => write!(f, "{v}"),
        }
    }
}
