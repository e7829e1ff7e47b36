//! TYPE_INFO descriptors.
//!
//! A descriptor precedes every RPC parameter value and tells the value
//! reader how many bytes follow and how to interpret them.

use tds_protocol::{LengthPrefix, TypeId};

use crate::error::TypeError;
use crate::reader::ValueReader;

/// TDS type information for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// The TDS type ID.
    pub type_id: TypeId,
    /// Maximum length announced for variable-length types.
    pub max_length: Option<u32>,
    /// Precision for decimal types.
    pub precision: Option<u8>,
    /// Scale for decimal and time types.
    pub scale: Option<u8>,
    /// Collation for character types.
    pub collation: Option<Collation>,
}

/// SQL Server collation information (5 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collation {
    /// LCID (low 20 bits), flags and version.
    pub info: u32,
    /// SQL sort ID.
    pub sort_id: u8,
}

/// UTF-8 collation flag bit (SQL Server 2019+).
const UTF8_COLLATION_FLAG: u32 = 0x0800_0000;

impl Collation {
    /// Locale ID.
    #[must_use]
    pub const fn lcid(&self) -> u32 {
        self.info & 0x000F_FFFF
    }

    /// Check if this collation uses UTF-8 encoding.
    #[must_use]
    pub const fn is_utf8(&self) -> bool {
        (self.info & UTF8_COLLATION_FLAG) != 0
    }

    /// Get the encoding for this collation.
    ///
    /// Returns `None` for locales without a known single code page.
    #[cfg(feature = "encoding")]
    #[must_use]
    pub fn encoding(&self) -> Option<&'static encoding_rs::Encoding> {
        if self.is_utf8() {
            return Some(encoding_rs::UTF_8);
        }
        match code_page_for_lcid(self.lcid())? {
            874 => Some(encoding_rs::WINDOWS_874),
            932 => Some(encoding_rs::SHIFT_JIS),
            936 => Some(encoding_rs::GBK),
            949 => Some(encoding_rs::EUC_KR),
            950 => Some(encoding_rs::BIG5),
            1250 => Some(encoding_rs::WINDOWS_1250),
            1251 => Some(encoding_rs::WINDOWS_1251),
            1252 => Some(encoding_rs::WINDOWS_1252),
            1253 => Some(encoding_rs::WINDOWS_1253),
            1254 => Some(encoding_rs::WINDOWS_1254),
            1255 => Some(encoding_rs::WINDOWS_1255),
            1256 => Some(encoding_rs::WINDOWS_1256),
            1257 => Some(encoding_rs::WINDOWS_1257),
            1258 => Some(encoding_rs::WINDOWS_1258),
            _ => None,
        }
    }
}

/// Windows code page for a locale, keyed on the primary language.
#[cfg(feature = "encoding")]
fn code_page_for_lcid(lcid: u32) -> Option<u16> {
    match lcid {
        0x0404 | 0x0C04 | 0x1404 => return Some(950),
        0x0804 | 0x1004 => return Some(936),
        _ => {}
    }
    match lcid & 0x3FF {
        0x11 => Some(932),
        0x12 => Some(949),
        0x1E => Some(874),
        0x2A => Some(1258),
        0x05 | 0x0E | 0x15 | 0x18 | 0x1B | 0x1C | 0x24 => Some(1250),
        0x02 | 0x19 | 0x22 | 0x23 | 0x2F | 0x3F | 0x40 | 0x44 | 0x50 => Some(1251),
        0x08 => Some(1253),
        0x1F | 0x2C => Some(1254),
        0x0D => Some(1255),
        0x01 | 0x20 | 0x29 => Some(1256),
        0x25..=0x27 => Some(1257),
        0x1A => Some(if lcid == 0x041A { 1250 } else { 1251 }),
        0x04 => None,
        _ => Some(1252),
    }
}

impl TypeInfo {
    /// Create type info carrying only a type ID.
    #[must_use]
    pub const fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            max_length: None,
            precision: None,
            scale: None,
            collation: None,
        }
    }

    /// Set the announced maximum length.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set precision and scale.
    #[must_use]
    pub const fn with_precision_scale(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Set the scale of a time type.
    #[must_use]
    pub const fn with_scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    /// How the value following this descriptor is length-prefixed.
    #[must_use]
    pub const fn length_prefix(&self) -> LengthPrefix {
        self.type_id.length_prefix(self.max_length)
    }

    /// SQL Server type name, with the length or precision where it has one.
    #[must_use]
    pub fn sql_type(&self) -> String {
        let name = self.type_id.sql_name();
        match (self.type_id, self.max_length, self.precision, self.scale) {
            (TypeId::DecimalN | TypeId::NumericN | TypeId::Decimal | TypeId::Numeric, _, Some(p), Some(s)) => {
                format!("{name}({p}, {s})")
            }
            (TypeId::Time | TypeId::DateTime2 | TypeId::DateTimeOffset, _, _, Some(s)) => {
                format!("{name}({s})")
            }
            (_, Some(0xFFFF), _, _) if self.length_prefix() == LengthPrefix::Plp => {
                format!("{name}(max)")
            }
            (TypeId::NVarChar | TypeId::NChar, Some(len), _, _) => format!("{name}({})", len / 2),
            (
                TypeId::BigVarChar
                | TypeId::BigChar
                | TypeId::BigVarBinary
                | TypeId::BigBinary
                | TypeId::VarChar
                | TypeId::Char
                | TypeId::VarBinary
                | TypeId::Binary,
                Some(len),
                _,
                _,
            ) => format!("{name}({len})"),
            _ => name.to_string(),
        }
    }
}

/// Read a TYPE_INFO descriptor from the reader's current position.
pub fn read_type_info(reader: &mut ValueReader<'_>) -> Result<TypeInfo, TypeError> {
    let raw = reader.u8()?;
    let type_id = TypeId::from_u8(raw).ok_or(TypeError::UnsupportedType(raw))?;
    let info = TypeInfo::new(type_id);

    match type_id {
        // Fixed-length types have no additional metadata
        TypeId::Null
        | TypeId::Int1
        | TypeId::Bit
        | TypeId::Int2
        | TypeId::Int4
        | TypeId::Int8
        | TypeId::Float4
        | TypeId::Float8
        | TypeId::Money
        | TypeId::Money4
        | TypeId::DateTime
        | TypeId::DateTime4
        | TypeId::Date => Ok(info),

        TypeId::IntN
        | TypeId::BitN
        | TypeId::FloatN
        | TypeId::MoneyN
        | TypeId::DateTimeN
        | TypeId::Guid
        | TypeId::Char
        | TypeId::VarChar
        | TypeId::Binary
        | TypeId::VarBinary => Ok(info.with_max_length(u32::from(reader.u8()?))),

        TypeId::Decimal | TypeId::Numeric | TypeId::DecimalN | TypeId::NumericN => {
            let [len, precision, scale] = reader.array::<3>()?;
            Ok(info
                .with_max_length(u32::from(len))
                .with_precision_scale(precision, scale))
        }

        TypeId::Time | TypeId::DateTime2 | TypeId::DateTimeOffset => {
            Ok(info.with_scale(reader.u8()?))
        }

        TypeId::BigVarBinary | TypeId::BigBinary => {
            Ok(info.with_max_length(u32::from(reader.u16_le()?)))
        }

        TypeId::BigVarChar | TypeId::BigChar | TypeId::NVarChar | TypeId::NChar => {
            let max_length = u32::from(reader.u16_le()?);
            let collation = read_collation(reader)?;
            Ok(TypeInfo {
                collation: Some(collation),
                ..info.with_max_length(max_length)
            })
        }

        TypeId::Text | TypeId::NText => {
            let max_length = reader.u32_le()?;
            let collation = read_collation(reader)?;
            Ok(TypeInfo {
                collation: Some(collation),
                ..info.with_max_length(max_length)
            })
        }

        TypeId::Image => Ok(info.with_max_length(reader.u32_le()?)),

        TypeId::Xml => {
            let schema_present = reader.u8()?;
            if schema_present != 0 {
                let _ = reader.b_varchar()?; // db name
                let _ = reader.b_varchar()?; // owning schema
                let _ = reader.us_varchar()?; // xml schema collection
            }
            Ok(info)
        }

        TypeId::Variant | TypeId::Udt | TypeId::Tvp => Err(TypeError::UnsupportedType(raw)),
    }
}

fn read_collation(reader: &mut ValueReader<'_>) -> Result<Collation, TypeError> {
    let info = reader.u32_le()?;
    let sort_id = reader.u8()?;
    Ok(Collation { info, sort_id })
}
