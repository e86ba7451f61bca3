//! Value model shared by keys and attributes.
//!
//! ```text
//! ValueType   closed set of storable kinds (type tag)
//! Value       one dynamically typed scalar (defaults, literals, decoded keys)
//! DecimalNN   raw scaled integer; the scale lives in the ValueType
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Largest scale accepted by `Decimal32`.
pub const DECIMAL32_MAX_SCALE: u8 = 9;
/// Largest scale accepted by `Decimal64`.
pub const DECIMAL64_MAX_SCALE: u8 = 18;
/// Largest scale accepted by `Decimal128`.
pub const DECIMAL128_MAX_SCALE: u8 = 38;

/// Type tag of a key column or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueType {
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Unsigned 128-bit integer.
    UInt128,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// IEEE-754 single precision.
    Float32,
    /// IEEE-754 double precision.
    Float64,
    /// Fixed-point decimal over `i32` with the given scale.
    Decimal32(u8),
    /// Fixed-point decimal over `i64` with the given scale.
    Decimal64(u8),
    /// Fixed-point decimal over `i128` with the given scale.
    Decimal128(u8),
    /// Variable-length byte string.
    String,
}

impl ValueType {
    /// Raw width in bytes for fixed-width types, `None` for strings.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::UInt8 | Self::Int8 => Some(1),
            Self::UInt16 | Self::Int16 => Some(2),
            Self::UInt32 | Self::Int32 | Self::Float32 | Self::Decimal32(_) => Some(4),
            Self::UInt64 | Self::Int64 | Self::Float64 | Self::Decimal64(_) => Some(8),
            Self::UInt128 | Self::Decimal128(_) => Some(16),
            Self::String => None,
        }
    }

    /// Decimal scale, if this is a decimal type.
    #[must_use]
    pub const fn decimal_scale(&self) -> Option<u8> {
        match self {
            Self::Decimal32(s) | Self::Decimal64(s) | Self::Decimal128(s) => Some(*s),
            _ => None,
        }
    }

    fn check_scale(self) -> std::result::Result<Self, String> {
        let (scale, max) = match self {
            Self::Decimal32(s) => (s, DECIMAL32_MAX_SCALE),
            Self::Decimal64(s) => (s, DECIMAL64_MAX_SCALE),
            Self::Decimal128(s) => (s, DECIMAL128_MAX_SCALE),
            _ => return Ok(self),
        };
        if scale > max {
            return Err(format!("scale {scale} of {self} exceeds {max}"));
        }
        Ok(self)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt8 => f.write_str("UInt8"),
            Self::UInt16 => f.write_str("UInt16"),
            Self::UInt32 => f.write_str("UInt32"),
            Self::UInt64 => f.write_str("UInt64"),
            Self::UInt128 => f.write_str("UInt128"),
            Self::Int8 => f.write_str("Int8"),
            Self::Int16 => f.write_str("Int16"),
            Self::Int32 => f.write_str("Int32"),
            Self::Int64 => f.write_str("Int64"),
            Self::Float32 => f.write_str("Float32"),
            Self::Float64 => f.write_str("Float64"),
            Self::Decimal32(s) => write!(f, "Decimal32({s})"),
            Self::Decimal64(s) => write!(f, "Decimal64({s})"),
            Self::Decimal128(s) => write!(f, "Decimal128({s})"),
            Self::String => f.write_str("String"),
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let simple = match s {
            "UInt8" => Some(Self::UInt8),
            "UInt16" => Some(Self::UInt16),
            "UInt32" => Some(Self::UInt32),
            "UInt64" => Some(Self::UInt64),
            "UInt128" => Some(Self::UInt128),
            "Int8" => Some(Self::Int8),
            "Int16" => Some(Self::Int16),
            "Int32" => Some(Self::Int32),
            "Int64" => Some(Self::Int64),
            "Float32" => Some(Self::Float32),
            "Float64" => Some(Self::Float64),
            "String" => Some(Self::String),
            _ => None,
        };
        if let Some(ty) = simple {
            return Ok(ty);
        }

        let (head, rest) = s
            .split_once('(')
            .ok_or_else(|| format!("unknown type '{s}'"))?;
        let scale = rest
            .strip_suffix(')')
            .and_then(|inner| inner.trim().parse::<u8>().ok())
            .ok_or_else(|| format!("invalid decimal scale in '{s}'"))?;
        let ty = match head.trim() {
            "Decimal32" => Self::Decimal32(scale),
            "Decimal64" => Self::Decimal64(scale),
            "Decimal128" => Self::Decimal128(scale),
            other => return Err(format!("unknown type '{other}'")),
        };
        ty.check_scale()
    }
}

impl TryFrom<String> for ValueType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

/// Raw value of a `Decimal32` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Decimal32(pub i32);

/// Raw value of a `Decimal64` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Decimal64(pub i64);

/// Raw value of a `Decimal128` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Decimal128(pub i128);

/// Renders a raw scaled integer, e.g. `(12345, 2)` as `123.45`.
#[must_use]
pub fn format_decimal(raw: i128, scale: u8) -> String {
    if scale == 0 {
        return raw.to_string();
    }
    let digits = raw.unsigned_abs().to_string();
    let scale = usize::from(scale);
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let sign = if raw < 0 { "-" } else { "" };
    format!("{sign}{int_part}.{frac_part}")
}

fn pow10(scale: u8) -> Option<i128> {
    10i128.checked_pow(u32::from(scale))
}

fn parse_decimal(text: &str, scale: u8) -> std::result::Result<i128, String> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err("empty decimal".to_string());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err("not a decimal number".to_string());
    }
    if frac_part.len() > usize::from(scale) {
        return Err(format!("more than {scale} fractional digits"));
    }

    let overflow = || "decimal overflow".to_string();
    let factor = pow10(scale).ok_or_else(overflow)?;
    let int_value: i128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };
    let frac_value: i128 = if frac_part.is_empty() {
        0
    } else {
        let pad = pow10(scale - frac_part.len() as u8).ok_or_else(overflow)?;
        frac_part.parse::<i128>().map_err(|_| overflow())? * pad
    };
    let magnitude = int_value
        .checked_mul(factor)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// One dynamically typed scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `UInt8` value.
    UInt8(u8),
    /// `UInt16` value.
    UInt16(u16),
    /// `UInt32` value.
    UInt32(u32),
    /// `UInt64` value.
    UInt64(u64),
    /// `UInt128` value.
    UInt128(u128),
    /// `Int8` value.
    Int8(i8),
    /// `Int16` value.
    Int16(i16),
    /// `Int32` value.
    Int32(i32),
    /// `Int64` value.
    Int64(i64),
    /// `Float32` value.
    Float32(f32),
    /// `Float64` value.
    Float64(f64),
    /// `Decimal32` value with its scale.
    Decimal32(Decimal32, u8),
    /// `Decimal64` value with its scale.
    Decimal64(Decimal64, u8),
    /// `Decimal128` value with its scale.
    Decimal128(Decimal128, u8),
    /// `String` value.
    String(String),
}

impl Value {
    /// Type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::UInt8(_) => ValueType::UInt8,
            Self::UInt16(_) => ValueType::UInt16,
            Self::UInt32(_) => ValueType::UInt32,
            Self::UInt64(_) => ValueType::UInt64,
            Self::UInt128(_) => ValueType::UInt128,
            Self::Int8(_) => ValueType::Int8,
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
            Self::Decimal32(_, s) => ValueType::Decimal32(*s),
            Self::Decimal64(_, s) => ValueType::Decimal64(*s),
            Self::Decimal128(_, s) => ValueType::Decimal128(*s),
            Self::String(_) => ValueType::String,
        }
    }

    /// Zero value of a type: `0`, `0.0` or the empty string.
    #[must_use]
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::UInt8 => Self::UInt8(0),
            ValueType::UInt16 => Self::UInt16(0),
            ValueType::UInt32 => Self::UInt32(0),
            ValueType::UInt64 => Self::UInt64(0),
            ValueType::UInt128 => Self::UInt128(0),
            ValueType::Int8 => Self::Int8(0),
            ValueType::Int16 => Self::Int16(0),
            ValueType::Int32 => Self::Int32(0),
            ValueType::Int64 => Self::Int64(0),
            ValueType::Float32 => Self::Float32(0.0),
            ValueType::Float64 => Self::Float64(0.0),
            ValueType::Decimal32(s) => Self::Decimal32(Decimal32(0), s),
            ValueType::Decimal64(s) => Self::Decimal64(Decimal64(0), s),
            ValueType::Decimal128(s) => Self::Decimal128(Decimal128(0), s),
            ValueType::String => Self::String(String::new()),
        }
    }

    /// Parses a textual literal into a value of `value_type`.
    ///
    /// An empty literal yields the zero value, so an attribute declared with
    /// `null_value = ""` defaults to `0` / empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLiteral`] if the text does not parse or does
    /// not fit the type.
    pub fn parse_literal(value_type: ValueType, text: &str) -> Result<Self> {
        if value_type == ValueType::String {
            return Ok(Self::String(text.to_string()));
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::zero(value_type));
        }

        let invalid = |reason: String| Error::InvalidLiteral {
            literal: text.to_string(),
            value_type,
            reason,
        };
        let value = match value_type {
            ValueType::UInt8 => trimmed.parse().map(Self::UInt8).map_err(|e| invalid(e.to_string()))?,
            ValueType::UInt16 => trimmed.parse().map(Self::UInt16).map_err(|e| invalid(e.to_string()))?,
            ValueType::UInt32 => trimmed.parse().map(Self::UInt32).map_err(|e| invalid(e.to_string()))?,
            ValueType::UInt64 => trimmed.parse().map(Self::UInt64).map_err(|e| invalid(e.to_string()))?,
            ValueType::UInt128 => trimmed.parse().map(Self::UInt128).map_err(|e| invalid(e.to_string()))?,
            ValueType::Int8 => trimmed.parse().map(Self::Int8).map_err(|e| invalid(e.to_string()))?,
            ValueType::Int16 => trimmed.parse().map(Self::Int16).map_err(|e| invalid(e.to_string()))?,
            ValueType::Int32 => trimmed.parse().map(Self::Int32).map_err(|e| invalid(e.to_string()))?,
            ValueType::Int64 => trimmed.parse().map(Self::Int64).map_err(|e| invalid(e.to_string()))?,
            ValueType::Float32 => {
                let v: f32 = trimmed.parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
                if !v.is_finite() && !names_non_finite(trimmed) {
                    return Err(invalid("out of range".to_string()));
                }
                Self::Float32(v)
            }
            ValueType::Float64 => {
                let v: f64 = trimmed.parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
                if !v.is_finite() && !names_non_finite(trimmed) {
                    return Err(invalid("out of range".to_string()));
                }
                Self::Float64(v)
            }
            ValueType::Decimal32(_) | ValueType::Decimal64(_) | ValueType::Decimal128(_) => {
                let scale = value_type.decimal_scale().unwrap_or(0);
                let raw = parse_decimal(trimmed, scale).map_err(invalid)?;
                Self::decimal_from_raw(value_type, raw).map_err(invalid)?
            }
            ValueType::String => Self::String(text.to_string()),
        };
        Ok(value)
    }

    fn decimal_from_raw(value_type: ValueType, raw: i128) -> std::result::Result<Self, String> {
        let out_of_range = || format!("{raw} is out of range");
        match value_type {
            ValueType::Decimal32(s) => i32::try_from(raw)
                .map(|v| Self::Decimal32(Decimal32(v), s))
                .map_err(|_| out_of_range()),
            ValueType::Decimal64(s) => i64::try_from(raw)
                .map(|v| Self::Decimal64(Decimal64(v), s))
                .map_err(|_| out_of_range()),
            ValueType::Decimal128(s) => Ok(Self::Decimal128(Decimal128(raw), s)),
            other => Err(format!("{other} is not a decimal type")),
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Self::UInt8(v) => Some(i128::from(*v)),
            Self::UInt16(v) => Some(i128::from(*v)),
            Self::UInt32(v) => Some(i128::from(*v)),
            Self::UInt64(v) => Some(i128::from(*v)),
            Self::UInt128(v) => i128::try_from(*v).ok(),
            Self::Int8(v) => Some(i128::from(*v)),
            Self::Int16(v) => Some(i128::from(*v)),
            Self::Int32(v) => Some(i128::from(*v)),
            Self::Int64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            Self::Decimal32(v, s) => Some(v.0 as f64 / 10f64.powi(i32::from(*s))),
            Self::Decimal64(v, s) => Some(v.0 as f64 / 10f64.powi(i32::from(*s))),
            Self::Decimal128(v, s) => Some(v.0 as f64 / 10f64.powi(i32::from(*s))),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    fn decimal_raw(&self) -> Option<(i128, u8)> {
        match self {
            Self::Decimal32(v, s) => Some((i128::from(v.0), *s)),
            Self::Decimal64(v, s) => Some((i128::from(v.0), *s)),
            Self::Decimal128(v, s) => Some((v.0, *s)),
            _ => None,
        }
    }

    /// Converts this value into `target`, checking ranges.
    ///
    /// Integers widen and narrow with range checks, integral floats become
    /// integers, numbers rescale into decimals, strings are parsed as
    /// literals. Nothing is silently truncated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLiteral`] when the value cannot be represented.
    pub fn convert_to(&self, target: ValueType) -> Result<Self> {
        if self.value_type() == target {
            return Ok(self.clone());
        }
        if let Self::String(text) = self {
            return Self::parse_literal(target, text);
        }

        let invalid = |reason: &str| Error::InvalidLiteral {
            literal: self.to_string(),
            value_type: target,
            reason: reason.to_string(),
        };

        match target {
            ValueType::String => Err(invalid("numbers are not implicitly converted to strings")),
            ValueType::Float32 => {
                let v = self.as_f64().ok_or_else(|| invalid("not a number"))?;
                let narrowed = v as f32;
                if v.is_finite() && !narrowed.is_finite() {
                    return Err(invalid("out of range"));
                }
                Ok(Self::Float32(narrowed))
            }
            ValueType::Float64 => self
                .as_f64()
                .map(Self::Float64)
                .ok_or_else(|| invalid("not a number")),
            ValueType::Decimal32(scale) | ValueType::Decimal64(scale) | ValueType::Decimal128(scale) => {
                let raw = if let Some((raw, from_scale)) = self.decimal_raw() {
                    rescale(raw, from_scale, scale).ok_or_else(|| invalid("precision loss"))?
                } else if let Some(int) = self.as_i128() {
                    pow10(scale)
                        .and_then(|f| int.checked_mul(f))
                        .ok_or_else(|| invalid("decimal overflow"))?
                } else {
                    // Floats go through their shortest decimal rendering.
                    return Self::parse_literal(target, &self.to_string());
                };
                Self::decimal_from_raw(target, raw).map_err(|reason| invalid(&reason))
            }
            _ => {
                let int = self.integral().ok_or_else(|| invalid("not an integral value"))?;
                integer_into(int, target).ok_or_else(|| invalid("out of range"))
            }
        }
    }

    fn integral(&self) -> Option<i128> {
        if let Some(v) = self.as_i128() {
            return Some(v);
        }
        if let Some((raw, scale)) = self.decimal_raw() {
            let factor = pow10(scale)?;
            return (raw % factor == 0).then_some(raw / factor);
        }
        let f = self.as_f64()?;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7e38 {
            Some(f as i128)
        } else {
            None
        }
    }
}

/// True if a float literal spells out infinity or NaN rather than
/// overflowing into it.
fn names_non_finite(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|name| unsigned.eq_ignore_ascii_case(name))
}

fn rescale(raw: i128, from: u8, to: u8) -> Option<i128> {
    if to >= from {
        raw.checked_mul(pow10(to - from)?)
    } else {
        let factor = pow10(from - to)?;
        (raw % factor == 0).then_some(raw / factor)
    }
}

fn integer_into(v: i128, target: ValueType) -> Option<Value> {
    Some(match target {
        ValueType::UInt8 => Value::UInt8(u8::try_from(v).ok()?),
        ValueType::UInt16 => Value::UInt16(u16::try_from(v).ok()?),
        ValueType::UInt32 => Value::UInt32(u32::try_from(v).ok()?),
        ValueType::UInt64 => Value::UInt64(u64::try_from(v).ok()?),
        ValueType::UInt128 => Value::UInt128(u128::try_from(v).ok()?),
        ValueType::Int8 => Value::Int8(i8::try_from(v).ok()?),
        ValueType::Int16 => Value::Int16(i16::try_from(v).ok()?),
        ValueType::Int32 => Value::Int32(i32::try_from(v).ok()?),
        ValueType::Int64 => Value::Int64(i64::try_from(v).ok()?),
        _ => return None,
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::UInt128(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal32(v, s) => f.write_str(&format_decimal(i128::from(v.0), *s)),
            Self::Decimal64(v, s) => f.write_str(&format_decimal(i128::from(v.0), *s)),
            Self::Decimal128(v, s) => f.write_str(&format_decimal(v.0, *s)),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

macro_rules! value_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

value_from_primitive!(
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u128 => UInt128,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);
