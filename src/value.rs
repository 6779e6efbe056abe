//! The typed value model: kind tags, the [`Value`] sum type, and coercion
//! from lexed text.
//!
//! Seven scalar kinds — bool, char, int (`i32`), long (`i64`), float (`f32`),
//! double (`f64`), string — each with a homogeneous array counterpart. A
//! parameter is registered with a [`ValueKind`]; every set attempt coerces
//! the lexed text against that kind and either produces a [`Value`] or a
//! [`CoerceError`], never a partially converted result. Array coercion is
//! all-or-nothing: one bad element rejects the whole literal.
//!
//! [`Value`] reads like a dynamic value type: `kind()`, `as_int()`,
//! `as_str_array()`, and so on, plus a `Display` impl that renders the
//! canonical literal form (what the parsers would accept back).

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::lex::RawValue;

/// Type tag declared at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Char,
    Int,
    Long,
    Float,
    Double,
    Str,
    BoolArray,
    CharArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    StrArray,
}

impl ValueKind {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            ValueKind::BoolArray
                | ValueKind::CharArray
                | ValueKind::IntArray
                | ValueKind::LongArray
                | ValueKind::FloatArray
                | ValueKind::DoubleArray
                | ValueKind::StrArray
        )
    }
}

/// A coerced, strongly typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    BoolArray(Vec<bool>),
    CharArray(Vec<char>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StrArray(Vec<String>),
}

/// Why a literal did not coerce to the declared kind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("invalid {kind} literal '{literal}'")]
    Invalid { kind: &'static str, literal: String },

    #[error("value '{literal}' overflows {kind}")]
    Overflow { kind: &'static str, literal: String },

    #[error("expected an array value, got scalar '{literal}'")]
    ExpectedArray { literal: String },

    #[error("expected a scalar value, got an array")]
    ExpectedScalar,

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<CoerceError>,
    },
}

fn invalid(kind: &'static str, literal: &str) -> CoerceError {
    CoerceError::Invalid {
        kind,
        literal: literal.to_string(),
    }
}

/// Parse one of the accepted boolean spellings, case-insensitively.
pub(crate) fn parse_bool(literal: &str) -> Option<bool> {
    match literal.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A char literal is one character, or a two-character backslash escape.
fn parse_char(literal: &str) -> Option<char> {
    let mut chars = literal.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, _) => Some(c),
        (Some('\\'), Some(esc), None) => match esc {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => None,
        },
        _ => None,
    }
}

fn parse_int(literal: &str) -> Result<i32, CoerceError> {
    match literal.parse::<i64>() {
        Ok(wide) => i32::try_from(wide).map_err(|_| CoerceError::Overflow {
            kind: "int",
            literal: literal.to_string(),
        }),
        // Distinguish "too big" from "not a number".
        Err(_) if literal.parse::<i128>().is_ok() => Err(CoerceError::Overflow {
            kind: "int",
            literal: literal.to_string(),
        }),
        Err(_) => Err(invalid("int", literal)),
    }
}

fn parse_long(literal: &str) -> Result<i64, CoerceError> {
    match literal.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(_) if literal.parse::<i128>().is_ok() => Err(CoerceError::Overflow {
            kind: "long",
            literal: literal.to_string(),
        }),
        Err(_) => Err(invalid("long", literal)),
    }
}

fn parse_float(literal: &str) -> Result<f32, CoerceError> {
    literal.parse().map_err(|_| invalid("float", literal))
}

fn parse_double(literal: &str) -> Result<f64, CoerceError> {
    literal.parse().map_err(|_| invalid("double", literal))
}

fn coerce_scalar(kind: ValueKind, literal: &str) -> Result<Value, CoerceError> {
    match kind {
        ValueKind::Bool => parse_bool(literal)
            .map(Value::Bool)
            .ok_or_else(|| invalid("bool", literal)),
        ValueKind::Char => parse_char(literal)
            .map(Value::Char)
            .ok_or_else(|| invalid("char", literal)),
        ValueKind::Int => parse_int(literal).map(Value::Int),
        ValueKind::Long => parse_long(literal).map(Value::Long),
        ValueKind::Float => parse_float(literal).map(Value::Float),
        ValueKind::Double => parse_double(literal).map(Value::Double),
        ValueKind::Str => Ok(Value::Str(literal.to_string())),
        ValueKind::BoolArray
        | ValueKind::CharArray
        | ValueKind::IntArray
        | ValueKind::LongArray
        | ValueKind::FloatArray
        | ValueKind::DoubleArray
        | ValueKind::StrArray => Err(CoerceError::ExpectedArray {
            literal: literal.to_string(),
        }),
    }
}

fn each<T>(
    elems: &[String],
    f: impl Fn(&str) -> Result<T, CoerceError>,
) -> Result<Vec<T>, CoerceError> {
    elems
        .iter()
        .enumerate()
        .map(|(i, e)| {
            f(e).map_err(|err| CoerceError::Element {
                index: i + 1,
                source: Box::new(err),
            })
        })
        .collect()
}

fn coerce_array(kind: ValueKind, elems: &[String]) -> Result<Value, CoerceError> {
    match kind {
        ValueKind::BoolArray => Ok(Value::BoolArray(each(elems, |e| {
            parse_bool(e).ok_or_else(|| invalid("bool", e))
        })?)),
        ValueKind::CharArray => Ok(Value::CharArray(each(elems, |e| {
            parse_char(e).ok_or_else(|| invalid("char", e))
        })?)),
        ValueKind::IntArray => Ok(Value::IntArray(each(elems, parse_int)?)),
        ValueKind::LongArray => Ok(Value::LongArray(each(elems, parse_long)?)),
        ValueKind::FloatArray => Ok(Value::FloatArray(each(elems, parse_float)?)),
        ValueKind::DoubleArray => Ok(Value::DoubleArray(each(elems, parse_double)?)),
        ValueKind::StrArray => Ok(Value::StrArray(elems.to_vec())),
        ValueKind::Bool
        | ValueKind::Char
        | ValueKind::Int
        | ValueKind::Long
        | ValueKind::Float
        | ValueKind::Double
        | ValueKind::Str => Err(CoerceError::ExpectedScalar),
    }
}

impl Value {
    /// Coerce lexed text against a declared kind. No partial results: either
    /// a fully typed [`Value`] or an error describing the first mismatch.
    pub(crate) fn coerce(kind: ValueKind, raw: &RawValue) -> Result<Value, CoerceError> {
        match raw {
            RawValue::Scalar(literal) => coerce_scalar(kind, literal),
            RawValue::Array(elems) => coerce_array(kind, elems),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Char(_) => ValueKind::Char,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::BoolArray(_) => ValueKind::BoolArray,
            Value::CharArray(_) => ValueKind::CharArray,
            Value::IntArray(_) => ValueKind::IntArray,
            Value::LongArray(_) => ValueKind::LongArray,
            Value::FloatArray(_) => ValueKind::FloatArray,
            Value::DoubleArray(_) => ValueKind::DoubleArray,
            Value::StrArray(_) => ValueKind::StrArray,
        }
    }

    pub fn is_array(&self) -> bool {
        self.kind().is_array()
    }

    /// Element count for arrays; 0 for scalars.
    pub fn array_len(&self) -> usize {
        match self {
            Value::BoolArray(v) => v.len(),
            Value::CharArray(v) => v.len(),
            Value::IntArray(v) => v.len(),
            Value::LongArray(v) => v.len(),
            Value::FloatArray(v) => v.len(),
            Value::DoubleArray(v) => v.len(),
            Value::StrArray(v) => v.len(),
            _ => 0,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Value::BoolArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char_array(&self) -> Option<&[char]> {
        match self {
            Value::CharArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Value::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Value::LongArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Value::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double_array(&self) -> Option<&[f64]> {
        match self {
            Value::DoubleArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            Value::StrArray(v) => Some(v),
            _ => None,
        }
    }
}

/// Write a string literal, quoting it when the bare form would be ambiguous.
fn write_str_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let needs_quotes = s.is_empty()
        || s.contains([',', '[', ']', '#', '\'', '"'])
        || s.chars().any(char::is_whitespace);
    if needs_quotes {
        let q = if s.contains('"') { '\'' } else { '"' };
        write!(f, "{q}{s}{q}")
    } else {
        write!(f, "{s}")
    }
}

fn write_array<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Double(x) => write!(f, "{x}"),
            Value::Str(s) => write_str_literal(f, s),
            Value::BoolArray(v) => write_array(f, v),
            Value::CharArray(v) => write_array(f, v),
            Value::IntArray(v) => write_array(f, v),
            Value::LongArray(v) => write_array(f, v),
            Value::FloatArray(v) => write_array(f, v),
            Value::DoubleArray(v) => write_array(f, v),
            Value::StrArray(v) => {
                write!(f, "[")?;
                for (i, s) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_str_literal(f, s)?;
                }
                write!(f, "]")
            }
        }
    }
}
