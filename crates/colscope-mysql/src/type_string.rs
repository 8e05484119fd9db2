//! MySQL column type strings
//!
//! Parses the `Type` column of `SHOW FULL COLUMNS` (e.g. `decimal(10,2) unsigned`)
//! into a [`TypeDescriptor`]. Grammars are tried in a fixed order and the first
//! match wins:
//!
//! 1. `(var)char(N)` - length
//! 2. `decimal(P,S)` - precision and scale
//! 3. `float(P,S)` - precision and scale
//! 4. `(tiny|small|medium|big)int(N)` - display width, stored as length
//! 5. anything else - base type from the leading token, no qualifiers

use serde::{Deserialize, Serialize};
use std::fmt;

const UNSIGNED_MARKER: &str = " unsigned";

/// Engine-level column type, independent of any length qualifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Float,
    Double,
    Real,
    Decimal,
    Char,
    VarChar,
    TinyText,
    Text,
    SmallText,
    MediumText,
    BigText,
    Timestamp,
    DateTime,
    /// Any other type, with the token as the engine reported it
    Other(String),
}

impl BaseType {
    /// Map a type keyword (case-insensitive) to a base type.
    pub fn from_keyword(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "tinyint" => BaseType::TinyInt,
            "smallint" => BaseType::SmallInt,
            "mediumint" => BaseType::MediumInt,
            "int" => BaseType::Int,
            "bigint" => BaseType::BigInt,
            "float" => BaseType::Float,
            "double" => BaseType::Double,
            "real" => BaseType::Real,
            "decimal" => BaseType::Decimal,
            "char" => BaseType::Char,
            "varchar" => BaseType::VarChar,
            "tinytext" => BaseType::TinyText,
            "text" => BaseType::Text,
            "smalltext" => BaseType::SmallText,
            "mediumtext" => BaseType::MediumText,
            "bigtext" => BaseType::BigText,
            "timestamp" => BaseType::Timestamp,
            "datetime" => BaseType::DateTime,
            _ => BaseType::Other(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BaseType::TinyInt => "tinyint",
            BaseType::SmallInt => "smallint",
            BaseType::MediumInt => "mediumint",
            BaseType::Int => "int",
            BaseType::BigInt => "bigint",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Real => "real",
            BaseType::Decimal => "decimal",
            BaseType::Char => "char",
            BaseType::VarChar => "varchar",
            BaseType::TinyText => "tinytext",
            BaseType::Text => "text",
            BaseType::SmallText => "smalltext",
            BaseType::MediumText => "mediumtext",
            BaseType::BigText => "bigtext",
            BaseType::Timestamp => "timestamp",
            BaseType::DateTime => "datetime",
            BaseType::Other(token) => token,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::TinyInt
                | BaseType::SmallInt
                | BaseType::MediumInt
                | BaseType::Int
                | BaseType::BigInt
        )
    }

    pub fn is_decimal(&self) -> bool {
        matches!(
            self,
            BaseType::Float | BaseType::Double | BaseType::Real | BaseType::Decimal
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_decimal()
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            BaseType::TinyText
                | BaseType::Text
                | BaseType::SmallText
                | BaseType::MediumText
                | BaseType::BigText
                | BaseType::Char
                | BaseType::VarChar
        )
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, BaseType::Timestamp | BaseType::DateTime)
    }

    /// MySQL has no boolean column type; `BOOLEAN` is stored as `tinyint`.
    pub fn is_boolean(&self) -> bool {
        matches!(self, BaseType::TinyInt)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of a column type string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// The type string exactly as the engine reported it
    pub full: String,
    pub base_type: BaseType,
    /// Length of char/varchar, or display width of an integer type
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub unsigned: bool,
}

impl TypeDescriptor {
    /// Type name without the `unsigned` attribute, e.g. `varchar` or `int`
    pub fn data_type(&self) -> &str {
        self.base_type.as_str()
    }

    /// Type string as reported by the engine, e.g. `int(10) unsigned`
    pub fn data_type_full(&self) -> &str {
        &self.full
    }
}

impl std::str::FromStr for TypeDescriptor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse(s))
    }
}

/// Whether the raw type string carries the `unsigned` attribute
pub fn is_unsigned(raw: &str) -> bool {
    raw.contains(UNSIGNED_MARKER)
}

/// Parse a raw MySQL column type string.
pub fn parse(raw: &str) -> TypeDescriptor {
    let unsigned = is_unsigned(raw);
    let stripped = raw.replace(UNSIGNED_MARKER, "");
    let stripped = stripped.trim();

    let grammar = GRAMMARS
        .iter()
        .find_map(|matcher| matcher(stripped))
        .unwrap_or_else(|| Grammar::Bare(BaseType::from_keyword(leading_token(stripped))));

    let mut descriptor = TypeDescriptor {
        full: raw.to_string(),
        base_type: BaseType::Other(String::new()),
        length: None,
        precision: None,
        scale: None,
        unsigned,
    };
    match grammar {
        Grammar::Length(base_type, length) | Grammar::DisplayWidth(base_type, length) => {
            descriptor.base_type = base_type;
            descriptor.length = Some(length);
        }
        Grammar::PrecisionScale(base_type, precision, scale) => {
            descriptor.base_type = base_type;
            descriptor.precision = Some(precision);
            descriptor.scale = Some(scale);
        }
        Grammar::Bare(base_type) => descriptor.base_type = base_type,
    }
    descriptor
}

/// Which grammar matched, with its captured qualifiers
#[derive(Debug, PartialEq, Eq)]
enum Grammar {
    Length(BaseType, u32),
    PrecisionScale(BaseType, u32, u32),
    /// Integer display width. Never a range bound.
    DisplayWidth(BaseType, u32),
    Bare(BaseType),
}

type Matcher = fn(&str) -> Option<Grammar>;

const GRAMMARS: [Matcher; 4] = [match_char, match_decimal, match_float, match_integer];

fn match_char(s: &str) -> Option<Grammar> {
    let (base_type, rest) = match strip_keyword(s, "varchar") {
        Some(rest) => (BaseType::VarChar, rest),
        None => (BaseType::Char, strip_keyword(s, "char")?),
    };
    let length = single_arg(rest)?;
    Some(Grammar::Length(base_type, length))
}

fn match_decimal(s: &str) -> Option<Grammar> {
    let (precision, scale) = pair_args(strip_keyword(s, "decimal")?)?;
    Some(Grammar::PrecisionScale(BaseType::Decimal, precision, scale))
}

fn match_float(s: &str) -> Option<Grammar> {
    let (precision, scale) = pair_args(strip_keyword(s, "float")?)?;
    Some(Grammar::PrecisionScale(BaseType::Float, precision, scale))
}

fn match_integer(s: &str) -> Option<Grammar> {
    const INTEGER_KEYWORDS: [(&str, BaseType); 5] = [
        ("tinyint", BaseType::TinyInt),
        ("smallint", BaseType::SmallInt),
        ("mediumint", BaseType::MediumInt),
        ("bigint", BaseType::BigInt),
        ("int", BaseType::Int),
    ];
    INTEGER_KEYWORDS.iter().find_map(|(keyword, base_type)| {
        let width = single_arg(strip_keyword(s, keyword)?)?;
        Some(Grammar::DisplayWidth(base_type.clone(), width))
    })
}

/// Strip a case-insensitive keyword prefix
fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let head = s.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &s[keyword.len()..])
}

/// Leading run of ASCII digits as a `u32`, plus the remainder
fn digits(s: &str) -> Option<(u32, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse::<u32>().ok()?;
    Some((value, &s[end..]))
}

/// `(N)` at the start of `s`
fn single_arg(s: &str) -> Option<u32> {
    let (value, rest) = digits(s.strip_prefix('(')?)?;
    rest.starts_with(')').then_some(value)
}

/// `(N,M)` at the start of `s`
fn pair_args(s: &str) -> Option<(u32, u32)> {
    let (first, rest) = digits(s.strip_prefix('(')?)?;
    let (second, rest) = digits(rest.strip_prefix(',')?)?;
    rest.starts_with(')').then_some((first, second))
}

fn leading_token(s: &str) -> &str {
    s.split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("")
}
