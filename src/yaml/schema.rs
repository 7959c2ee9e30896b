//! Implicit typing schemas and tagged-scalar application
//!
//! A schema decides which untagged plain scalars become which runtime
//! types. Explicitly tagged scalars (`!!int`, `!!bool`, ...) are parsed
//! under the Core rules regardless of schema, and an invalid lexeme for
//! the declared type is an error.

use crate::yaml::document::ScalarKind;
use crate::yaml::tag::core;
use crate::{Error, Position, Result};
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Implicit typing policy for untagged scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schema {
    /// Everything stays a string
    Failsafe,
    /// Exact-case `true`/`false`/`null`, JSON number grammar
    Json,
    /// Case-insensitive booleans and nulls, `~`, underscores and base
    /// prefixes in numbers, `.inf`/`.nan` floats
    #[default]
    Core,
}

fn core_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([-+]?[0-9][0-9_]*|0b[01_]+|0o[0-7_]+|0x[0-9a-fA-F_]+)$")
            .expect("valid core int pattern")
    })
}

fn core_float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[-+]?(\.[0-9_]+|[0-9][0-9_]*(\.[0-9_]*)?([eE][-+]?[0-9]+)?)$")
            .expect("valid core float pattern")
    })
}

fn core_inf_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-+]?\.(?i:inf)$").expect("valid inf pattern"))
}

fn core_nan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.(?i:nan)$").expect("valid nan pattern"))
}

fn json_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").expect("valid json int pattern"))
}

fn json_float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][-+]?[0-9]+)?$")
            .expect("valid json float pattern")
    })
}

impl Schema {
    /// Resolve the runtime type of an untagged plain scalar
    pub fn resolve_implicit(&self, value: &str) -> ScalarKind {
        match self {
            Self::Failsafe => ScalarKind::Str,
            Self::Json => Self::resolve_json(value),
            Self::Core => Self::resolve_core(value),
        }
    }

    fn resolve_json(value: &str) -> ScalarKind {
        match value {
            "null" => return ScalarKind::Null,
            "true" => return ScalarKind::Bool(true),
            "false" => return ScalarKind::Bool(false),
            _ => {}
        }
        if json_int_re().is_match(value) {
            if let Ok(int) = value.parse::<i64>() {
                return ScalarKind::Int(int);
            }
        }
        if json_float_re().is_match(value) {
            if let Ok(float) = value.parse::<f64>() {
                return ScalarKind::Float(float);
            }
        }
        ScalarKind::Str
    }

    fn resolve_core(value: &str) -> ScalarKind {
        if is_core_null(value) {
            return ScalarKind::Null;
        }
        if let Some(b) = parse_core_bool(value) {
            return ScalarKind::Bool(b);
        }
        if core_int_re().is_match(value) {
            if let Some(int) = parse_core_int(value) {
                return ScalarKind::Int(int);
            }
            // out of range for i64: fall through to a float reading
            let digits: String = value.chars().filter(|c| *c != '_').collect();
            if let Ok(float) = digits.parse::<f64>() {
                return ScalarKind::Float(float);
            }
            return ScalarKind::Str;
        }
        if let Some(float) = parse_core_float(value) {
            return ScalarKind::Float(float);
        }
        ScalarKind::Str
    }
}

fn is_core_null(value: &str) -> bool {
    value.is_empty() || value == "~" || value.eq_ignore_ascii_case("null")
}

fn parse_core_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_core_int(value: &str) -> Option<i64> {
    let cleaned: String = value.chars().filter(|c| *c != '_').collect();
    if let Some(digits) = cleaned.strip_prefix("0x") {
        return i64::from_str_radix(digits, 16).ok();
    }
    if let Some(digits) = cleaned.strip_prefix("0o") {
        return i64::from_str_radix(digits, 8).ok();
    }
    if let Some(digits) = cleaned.strip_prefix("0b") {
        return i64::from_str_radix(digits, 2).ok();
    }
    cleaned.parse::<i64>().ok()
}

fn parse_core_float(value: &str) -> Option<f64> {
    if core_inf_re().is_match(value) {
        return Some(if value.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    if core_nan_re().is_match(value) {
        return Some(f64::NAN);
    }
    if !core_float_re().is_match(value) {
        return None;
    }
    let cleaned: String = value.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok()
}

/// Parse a scalar under an explicit core tag
///
/// Returns `Ok(None)` when the tag does not select a scalar type (custom
/// tags and collection tags are handled elsewhere).
pub(crate) fn apply_scalar_tag(
    uri: &str,
    value: &str,
    position: Position,
) -> Result<Option<ScalarKind>> {
    match uri {
        core::STR => Ok(Some(ScalarKind::Str)),
        core::NULL => {
            if is_core_null(value) {
                Ok(Some(ScalarKind::Null))
            } else {
                Err(Error::construction(
                    position,
                    format!("'{}' is not a valid !!null value", value),
                ))
            }
        }
        core::BOOL => parse_core_bool(value).map(ScalarKind::Bool).map(Some).ok_or_else(|| {
            Error::construction(position, format!("'{}' is not a valid !!bool value", value))
        }),
        core::INT => parse_core_int(value).map(ScalarKind::Int).map(Some).ok_or_else(|| {
            Error::construction(position, format!("'{}' is not a valid !!int value", value))
        }),
        core::FLOAT => {
            // integers are acceptable float lexemes under an explicit tag
            parse_core_float(value)
                .or_else(|| parse_core_int(value).map(|i| i as f64))
                .map(ScalarKind::Float)
                .map(Some)
                .ok_or_else(|| {
                    Error::construction(
                        position,
                        format!("'{}' is not a valid !!float value", value),
                    )
                })
        }
        core::BINARY => {
            let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(cleaned.as_bytes())
                .map(ScalarKind::Binary)
                .map(Some)
                .map_err(|_| {
                    Error::construction(
                        position,
                        format!("'{}' is not valid base64 for !!binary", value),
                    )
                })
        }
        core::TIMESTAMP => parse_timestamp(value).map(ScalarKind::Timestamp).map(Some).ok_or_else(
            || {
                Error::construction(
                    position,
                    format!("'{}' is not a valid !!timestamp value", value),
                )
            },
        ),
        _ => Ok(None),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp);
    }
    // space-separated variant: 2001-12-14 21:59:43.10 -05:00
    if let Ok(timestamp) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f %:z") {
        return Some(timestamp);
    }
    // date only: midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset());
    }
    None
}
