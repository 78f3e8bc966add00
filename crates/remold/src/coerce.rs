//! Scalar coercion rules.
//!
//! Each function converts a source [`Value`] into one scalar target kind,
//! strict or weak. Strict permits same-kind identity, cross-numeric
//! conversion (float→int truncates toward zero, out-of-range fails), deferred
//! [`Value::Number`] literals, and string→bytes. Weak mode layers on the
//! lossy conversions: scalars render to strings, strings parse base-10 into
//! numbers, bools and numbers convert through `0`/`1`.
//!
//! Width fitting is not decided here: integer results are returned at full
//! width and the engine's checked slot assignment rejects what does not fit.

use crate::value::Value;

/// Why a scalar conversion produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Unfit {
    /// No conversion path between the kinds in the active mode.
    Unconvertible,

    /// A textual value failed to parse.
    Parse { message: String },

    /// A numeric value does not fit the target's range.
    OutOfRange { value: String },
}

impl Unfit {
    fn parse(err: impl std::fmt::Display) -> Self {
        Unfit::Parse {
            message: err.to_string(),
        }
    }

    fn out_of_range(value: impl std::fmt::Display) -> Self {
        Unfit::OutOfRange {
            value: value.to_string(),
        }
    }
}

pub(crate) fn to_bool(value: &Value, weak: bool) -> Result<bool, Unfit> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(n) if weak => Ok(*n != 0),
        Value::Uint(n) if weak => Ok(*n != 0),
        Value::Float(n) if weak => Ok(*n != 0.0),
        Value::Number(s) if weak => Ok(parse_float(s)? != 0.0),
        Value::String(s) if weak => parse_bool(s),
        _ => Err(Unfit::Unconvertible),
    }
}

pub(crate) fn to_int(value: &Value, weak: bool) -> Result<i64, Unfit> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Uint(n) => i64::try_from(*n).map_err(|_| Unfit::out_of_range(n)),
        Value::Float(n) => float_to_int(*n),
        Value::Number(s) => int_literal(s),
        Value::Bool(b) if weak => Ok(i64::from(*b)),
        Value::String(s) if weak => {
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse::<i64>().map_err(Unfit::parse)
            }
        }
        _ => Err(Unfit::Unconvertible),
    }
}

pub(crate) fn to_uint(value: &Value, weak: bool) -> Result<u64, Unfit> {
    match value {
        Value::Uint(n) => Ok(*n),
        Value::Int(n) => u64::try_from(*n).map_err(|_| Unfit::out_of_range(n)),
        Value::Float(n) => float_to_uint(*n),
        Value::Number(s) => uint_literal(s),
        Value::Bool(b) if weak => Ok(u64::from(*b)),
        Value::String(s) if weak => {
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse::<u64>().map_err(Unfit::parse)
            }
        }
        _ => Err(Unfit::Unconvertible),
    }
}

pub(crate) fn to_float(value: &Value, weak: bool) -> Result<f64, Unfit> {
    match value {
        Value::Float(n) => Ok(*n),
        Value::Int(n) => Ok(*n as f64),
        Value::Uint(n) => Ok(*n as f64),
        Value::Number(s) => parse_float(s),
        Value::Bool(b) if weak => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) if weak => {
            if s.is_empty() {
                Ok(0.0)
            } else {
                s.parse::<f64>().map_err(Unfit::parse)
            }
        }
        _ => Err(Unfit::Unconvertible),
    }
}

pub(crate) fn to_string_value(value: &Value, weak: bool) -> Result<String, Unfit> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(s) => Ok(s.clone()),
        Value::Bool(b) if weak => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Int(n) if weak => Ok(n.to_string()),
        Value::Uint(n) if weak => Ok(n.to_string()),
        Value::Float(n) if weak => Ok(n.to_string()),
        Value::Bytes(bytes) if weak => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => Err(Unfit::Unconvertible),
    }
}

fn parse_bool(s: &str) -> Result<bool, Unfit> {
    if s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else if s == "1" || s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else {
        Err(Unfit::parse(format!("invalid boolean literal '{s}'")))
    }
}

fn parse_float(s: &str) -> Result<f64, Unfit> {
    s.parse::<f64>().map_err(Unfit::parse)
}

/// Resolve a deferred numeric literal for a signed target. Literals beyond
/// `i64` are out of range, not parse failures; fractional literals truncate.
fn int_literal(s: &str) -> Result<i64, Unfit> {
    if let Ok(n) = s.parse::<i64>() {
        return Ok(n);
    }
    if s.parse::<u64>().is_ok() {
        return Err(Unfit::out_of_range(s));
    }
    float_to_int(parse_float(s)?)
}

fn uint_literal(s: &str) -> Result<u64, Unfit> {
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    if s.parse::<i64>().is_ok() {
        // Parsed signed but not unsigned: the literal is negative.
        return Err(Unfit::out_of_range(s));
    }
    float_to_uint(parse_float(s)?)
}

const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F: f64 = 9_223_372_036_854_775_808.0;
const U64_END_F: f64 = 18_446_744_073_709_551_616.0;

fn float_to_int(f: f64) -> Result<i64, Unfit> {
    let t = f.trunc();
    if t.is_finite() && t >= I64_MIN_F && t < I64_END_F {
        Ok(t as i64)
    } else {
        Err(Unfit::out_of_range(f))
    }
}

fn float_to_uint(f: f64) -> Result<u64, Unfit> {
    let t = f.trunc();
    if t.is_finite() && t >= 0.0 && t < U64_END_F {
        Ok(t as u64)
    } else {
        Err(Unfit::out_of_range(f))
    }
}
