//! Column descriptors and type bounds
//!
//! A [`ColumnDescriptor`] is the structured form of one `SHOW FULL COLUMNS` row.
//! The [`TypeBounds`] trait derives classifications and safe numeric/text
//! bounds from a column's type. Bounds are engine constants keyed by base type
//! and signedness; they are never derived from the display width.
//!
//! `bigint` and decimal/float bounds are not implemented and report
//! [`ColscopeError::NotImplemented`], which stays distinct from
//! [`ColscopeError::UnsupportedTypeCase`] (input the engine knows no rule for).

use colscope_core::{ColscopeError, Result};
use serde::{Deserialize, Serialize};

use crate::type_string::{BaseType, TypeDescriptor};

pub const MIN_TINYINT_VALUE: i64 = -128;
pub const MAX_TINYINT_VALUE: i64 = 127;
pub const MIN_SMALLINT_VALUE: i64 = -32_768;
pub const MAX_SMALLINT_VALUE: i64 = 32_767;
pub const MIN_MEDIUMINT_VALUE: i64 = -8_388_608;
pub const MAX_MEDIUMINT_VALUE: i64 = 8_388_607;
pub const MIN_INT_VALUE: i64 = -2_147_483_648;
pub const MAX_INT_VALUE: i64 = 2_147_483_647;

pub const MAX_TINYINT_UNSIGNED_VALUE: i64 = 255;
pub const MAX_SMALLINT_UNSIGNED_VALUE: i64 = 65_535;
pub const MAX_MEDIUMINT_UNSIGNED_VALUE: i64 = 16_777_215;
pub const MAX_INT_UNSIGNED_VALUE: i64 = 4_294_967_295;

pub const MAX_TEXT_LENGTH: u32 = 65_535;
pub const MAX_MEDIUMTEXT_LENGTH: u32 = 16_777_215;

/// Fixed `(min, max)` range of an integer type, if one is defined
pub fn integer_range(base_type: &BaseType, unsigned: bool) -> Option<(i64, i64)> {
    let range = match (base_type, unsigned) {
        (BaseType::TinyInt, false) => (MIN_TINYINT_VALUE, MAX_TINYINT_VALUE),
        (BaseType::TinyInt, true) => (0, MAX_TINYINT_UNSIGNED_VALUE),
        (BaseType::SmallInt, false) => (MIN_SMALLINT_VALUE, MAX_SMALLINT_VALUE),
        (BaseType::SmallInt, true) => (0, MAX_SMALLINT_UNSIGNED_VALUE),
        (BaseType::MediumInt, false) => (MIN_MEDIUMINT_VALUE, MAX_MEDIUMINT_VALUE),
        (BaseType::MediumInt, true) => (0, MAX_MEDIUMINT_UNSIGNED_VALUE),
        (BaseType::Int, false) => (MIN_INT_VALUE, MAX_INT_VALUE),
        (BaseType::Int, true) => (0, MAX_INT_UNSIGNED_VALUE),
        _ => return None,
    };
    Some(range)
}

/// Classification and bounds derived from a column type
pub trait TypeBounds {
    fn type_descriptor(&self) -> &TypeDescriptor;

    /// Name used in error messages
    fn subject(&self) -> &str;

    fn is_integer_type(&self) -> bool {
        self.type_descriptor().base_type.is_integer()
    }

    fn is_decimal_type(&self) -> bool {
        self.type_descriptor().base_type.is_decimal()
    }

    fn is_numeric_type(&self) -> bool {
        self.type_descriptor().base_type.is_numeric()
    }

    fn is_text_type(&self) -> bool {
        self.type_descriptor().base_type.is_text()
    }

    fn is_timestamp_type(&self) -> bool {
        self.type_descriptor().base_type.is_timestamp()
    }

    fn is_boolean_type(&self) -> bool {
        self.type_descriptor().base_type.is_boolean()
    }

    fn is_unsigned(&self) -> bool {
        self.type_descriptor().unsigned
    }

    /// Maximum text length, or `None` for non-text columns.
    fn max_text_length(&self) -> Result<Option<u32>> {
        let descriptor = self.type_descriptor();
        if !descriptor.base_type.is_text() {
            return Ok(None);
        }
        if let Some(length) = descriptor.length {
            return Ok(Some(length));
        }
        match &descriptor.base_type {
            BaseType::Text => Ok(Some(MAX_TEXT_LENGTH)),
            BaseType::MediumText => Ok(Some(MAX_MEDIUMTEXT_LENGTH)),
            other => Err(ColscopeError::UnsupportedTypeCase(format!(
                "no maximum length known for {} ({})",
                other,
                self.subject()
            ))),
        }
    }

    fn min_numeric_value(&self) -> Result<i64> {
        numeric_range(self).map(|(min, _)| min)
    }

    fn max_numeric_value(&self) -> Result<i64> {
        numeric_range(self).map(|(_, max)| max)
    }
}

fn numeric_range<T: TypeBounds + ?Sized>(target: &T) -> Result<(i64, i64)> {
    let descriptor = target.type_descriptor();
    if !descriptor.base_type.is_numeric() {
        return Err(ColscopeError::NotNumeric(target.subject().to_string()));
    }
    integer_range(&descriptor.base_type, descriptor.unsigned).ok_or_else(|| {
        ColscopeError::NotImplemented(format!(
            "numeric bounds for {}{} ({})",
            descriptor.base_type,
            if descriptor.unsigned { " unsigned" } else { "" },
            target.subject()
        ))
    })
}

impl TypeBounds for TypeDescriptor {
    fn type_descriptor(&self) -> &TypeDescriptor {
        self
    }

    fn subject(&self) -> &str {
        &self.full
    }
}

/// One described column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_name: String,
    /// 1-based position among all columns
    pub ordinal_position: u32,
    pub column_type: TypeDescriptor,
    pub default_value: Option<String>,
    pub nullable: bool,
    pub unsigned: bool,
    pub is_primary_key: bool,
    /// 1-based position within the primary key; set iff `is_primary_key`
    pub primary_key_position: Option<u32>,
    pub is_auto_increment: bool,
    pub extra: String,
    pub comment: Option<String>,
    pub collation: Option<String>,
}

impl ColumnDescriptor {
    /// Base type name without `unsigned`
    pub fn data_type(&self) -> &str {
        self.column_type.data_type()
    }

    pub fn data_type_full(&self) -> &str {
        self.column_type.data_type_full()
    }

    /// Generated (virtual or stored) column
    pub fn is_generated(&self) -> bool {
        self.extra.contains("GENERATED")
    }
}

impl TypeBounds for ColumnDescriptor {
    fn type_descriptor(&self) -> &TypeDescriptor {
        &self.column_type
    }

    fn subject(&self) -> &str {
        &self.column_name
    }
}
