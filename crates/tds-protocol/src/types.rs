//! TDS data type definitions.
//!
//! This module defines the SQL Server data types as they appear in the
//! TYPE_INFO of an RPC parameter.

/// TDS data type identifiers.
///
/// These correspond to the type byte that opens every TYPE_INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    // Fixed-length types (no length prefix)
    /// `NULL` literal, no value bytes.
    Null = 0x1F,
    /// `tinyint`.
    Int1 = 0x30,
    /// `bit`.
    Bit = 0x32,
    /// `smallint`.
    Int2 = 0x34,
    /// `int`.
    Int4 = 0x38,
    /// `bigint`.
    Int8 = 0x7F,
    /// `real`.
    Float4 = 0x3B,
    /// `float`.
    Float8 = 0x3E,
    /// `money`.
    Money = 0x3C,
    /// `smallmoney`.
    Money4 = 0x7A,
    /// `datetime`.
    DateTime = 0x3D,
    /// `smalldatetime`.
    DateTime4 = 0x3A,

    // Byte-length prefixed types
    /// Nullable `uniqueidentifier`.
    Guid = 0x24,
    /// Nullable integer of 1, 2, 4 or 8 bytes.
    IntN = 0x26,
    /// Pre-7.0 `decimal`.
    Decimal = 0x37,
    /// Pre-7.0 `numeric`.
    Numeric = 0x3F,
    /// Nullable `bit`.
    BitN = 0x68,
    /// Nullable `decimal`.
    DecimalN = 0x6A,
    /// Nullable `numeric`.
    NumericN = 0x6C,
    /// Nullable `real` or `float`.
    FloatN = 0x6D,
    /// Nullable `money` or `smallmoney`.
    MoneyN = 0x6E,
    /// Nullable `datetime` or `smalldatetime`.
    DateTimeN = 0x6F,
    /// Pre-7.0 `char`.
    Char = 0x2F,
    /// Pre-7.0 `varchar`.
    VarChar = 0x27,
    /// Pre-7.0 `binary`.
    Binary = 0x2D,
    /// Pre-7.0 `varbinary`.
    VarBinary = 0x25,

    // Date/time types (SQL Server 2008+), byte-length prefixed
    /// `date`, three bytes of days.
    Date = 0x28,
    /// `time(n)`.
    Time = 0x29,
    /// `datetime2(n)`.
    DateTime2 = 0x2A,
    /// `datetimeoffset(n)`.
    DateTimeOffset = 0x2B,

    // Two-byte length prefixed types (0xFFFF max length switches to PLP)
    /// `varchar(n)` and `varchar(max)`.
    BigVarChar = 0xA7,
    /// `varbinary(n)` and `varbinary(max)`.
    BigVarBinary = 0xA5,
    /// `char(n)`.
    BigChar = 0xAF,
    /// `binary(n)`.
    BigBinary = 0xAD,
    /// `nchar(n)`.
    NChar = 0xEF,
    /// `nvarchar(n)` and `nvarchar(max)`.
    NVarChar = 0xE7,

    // Four-byte length prefixed types
    /// `text`.
    Text = 0x23,
    /// `image`.
    Image = 0x22,
    /// `ntext`.
    NText = 0x63,
    /// `sql_variant`.
    Variant = 0x62,

    // Special types
    /// CLR user-defined type.
    Udt = 0xF0,
    /// `xml`, always PLP.
    Xml = 0xF1,
    /// Table-valued parameter.
    Tvp = 0xF3,
}

/// How the value that follows a TYPE_INFO announces its own length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// No prefix; the value is always this many bytes.
    Fixed(usize),
    /// One-byte length, zero means NULL.
    Byte,
    /// Two-byte length, `0xFFFF` means NULL.
    UShort,
    /// Four-byte length.
    Long,
    /// Partially length-prefixed chunks.
    Plp,
}

impl TypeId {
    /// Every type byte this crate knows.
    pub const ALL: [Self; 43] = [
        Self::Null,
        Self::Int1,
        Self::Bit,
        Self::Int2,
        Self::Int4,
        Self::Int8,
        Self::Float4,
        Self::Float8,
        Self::Money,
        Self::Money4,
        Self::DateTime,
        Self::DateTime4,
        Self::Guid,
        Self::IntN,
        Self::Decimal,
        Self::Numeric,
        Self::BitN,
        Self::DecimalN,
        Self::NumericN,
        Self::FloatN,
        Self::MoneyN,
        Self::DateTimeN,
        Self::Char,
        Self::VarChar,
        Self::Binary,
        Self::VarBinary,
        Self::Date,
        Self::Time,
        Self::DateTime2,
        Self::DateTimeOffset,
        Self::BigVarChar,
        Self::BigVarBinary,
        Self::BigChar,
        Self::BigBinary,
        Self::NChar,
        Self::NVarChar,
        Self::Text,
        Self::Image,
        Self::NText,
        Self::Variant,
        Self::Udt,
        Self::Xml,
        Self::Tvp,
    ];

    /// Look up the type for a TYPE_INFO type byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Whether values of this type have no length prefix.
    #[must_use]
    pub const fn is_fixed_length(&self) -> bool {
        self.fixed_size().is_some()
    }

    /// Value size in bytes for fixed-length types.
    #[must_use]
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Null => Some(0),
            Self::Int1 | Self::Bit => Some(1),
            Self::Int2 => Some(2),
            Self::Int4 | Self::Float4 | Self::Money4 | Self::DateTime4 => Some(4),
            Self::Int8 | Self::Float8 | Self::Money | Self::DateTime => Some(8),
            _ => None,
        }
    }

    /// Length prefix used by values of this type.
    ///
    /// `max_length` is the length announced in the TYPE_INFO; a two-byte
    /// type announcing `0xFFFF` is a `(max)` type and switches to PLP.
    #[must_use]
    pub const fn length_prefix(&self, max_length: Option<u32>) -> LengthPrefix {
        if let Some(size) = self.fixed_size() {
            return LengthPrefix::Fixed(size);
        }
        match self {
            Self::BigVarChar
            | Self::BigVarBinary
            | Self::BigChar
            | Self::BigBinary
            | Self::NChar
            | Self::NVarChar => match max_length {
                Some(0xFFFF) => LengthPrefix::Plp,
                _ => LengthPrefix::UShort,
            },
            Self::Text | Self::Image | Self::NText | Self::Variant => LengthPrefix::Long,
            Self::Xml | Self::Udt | Self::Tvp => LengthPrefix::Plp,
            _ => LengthPrefix::Byte,
        }
    }

    /// Whether values are UTF-16LE text.
    #[must_use]
    pub const fn is_unicode(&self) -> bool {
        matches!(self, Self::NChar | Self::NVarChar | Self::NText)
    }

    /// Whether the TYPE_INFO for this type carries a collation.
    #[must_use]
    pub const fn has_collation(&self) -> bool {
        matches!(
            self,
            Self::BigVarChar | Self::BigChar | Self::NVarChar | Self::NChar | Self::Text | Self::NText
        )
    }

    /// The SQL Server name of this type.
    #[must_use]
    pub const fn sql_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int1 => "tinyint",
            Self::Bit | Self::BitN => "bit",
            Self::Int2 => "smallint",
            Self::Int4 | Self::IntN => "int",
            Self::Int8 => "bigint",
            Self::Float4 => "real",
            Self::Float8 | Self::FloatN => "float",
            Self::Money | Self::MoneyN => "money",
            Self::Money4 => "smallmoney",
            Self::DateTime | Self::DateTimeN => "datetime",
            Self::DateTime4 => "smalldatetime",
            Self::Guid => "uniqueidentifier",
            Self::Decimal | Self::DecimalN => "decimal",
            Self::Numeric | Self::NumericN => "numeric",
            Self::Char | Self::BigChar => "char",
            Self::VarChar | Self::BigVarChar => "varchar",
            Self::Binary | Self::BigBinary => "binary",
            Self::VarBinary | Self::BigVarBinary => "varbinary",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime2 => "datetime2",
            Self::DateTimeOffset => "datetimeoffset",
            Self::NChar => "nchar",
            Self::NVarChar => "nvarchar",
            Self::Text => "text",
            Self::Image => "image",
            Self::NText => "ntext",
            Self::Variant => "sql_variant",
            Self::Udt => "udt",
            Self::Xml => "xml",
            Self::Tvp => "table",
        }
    }
}

impl TryFrom<u8> for TypeId {
    type Error = u8;

    /// Fails with the unknown byte.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| *ty as u8 == value)
            .ok_or(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_byte() {
        assert_eq!(TypeId::from_u8(0x38), Some(TypeId::Int4));
        assert_eq!(TypeId::try_from(0x6F), Ok(TypeId::DateTimeN));
        assert_eq!(TypeId::try_from(0x99), Err(0x99));
    }

    #[test]
    fn test_table_round_trips_every_byte() {
        for ty in TypeId::ALL {
            assert_eq!(TypeId::from_u8(ty as u8), Some(ty));
        }
        let known = (0..=u8::MAX).filter_map(TypeId::from_u8).count();
        assert_eq!(known, TypeId::ALL.len());
    }

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(TypeId::Int4.fixed_size(), Some(4));
        assert_eq!(TypeId::DateTime4.fixed_size(), Some(4));
        assert!(!TypeId::NVarChar.is_fixed_length());
        assert!(!TypeId::IntN.is_fixed_length());
    }

    #[test]
    fn test_length_prefix() {
        assert_eq!(TypeId::Int4.length_prefix(None), LengthPrefix::Fixed(4));
        assert_eq!(TypeId::IntN.length_prefix(Some(4)), LengthPrefix::Byte);
        assert_eq!(TypeId::NVarChar.length_prefix(Some(200)), LengthPrefix::UShort);
        assert_eq!(TypeId::NVarChar.length_prefix(Some(0xFFFF)), LengthPrefix::Plp);
        assert_eq!(TypeId::Xml.length_prefix(None), LengthPrefix::Plp);
        assert_eq!(TypeId::NText.length_prefix(Some(100)), LengthPrefix::Long);
    }

    #[test]
    fn test_sql_name() {
        assert_eq!(TypeId::IntN.sql_name(), "int");
        assert_eq!(TypeId::BigVarBinary.sql_name(), "varbinary");
    }
}
