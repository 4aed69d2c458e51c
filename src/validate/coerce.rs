//! Type coercion rules applied before constraint checks.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::BoolCoercion;
use crate::property::TemporalFormat;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(\d+Y)?(\d+M)?(\d+W)?(\d+D)?(T(\d+H)?(\d+M)?(\d+([.,]\d+)?S)?)?$")
        .expect("static duration pattern")
});

static TIME_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Z|[+-]\d{2}:?\d{2})$").expect("static offset pattern"));

/// Textual representation of any scalar.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            // 3.0 is still an integer literal
            n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub fn boolean(value: &Value, policy: BoolCoercion) -> Option<bool> {
    match (value, policy) {
        (Value::Bool(b), _) => Some(*b),
        (Value::String(s), BoolCoercion::Lenient) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// The literal, if it parses in the given ISO-8601 flavour.
pub fn temporal<'a>(value: &'a Value, format: TemporalFormat) -> Option<&'a str> {
    let literal = value.as_str()?;
    let ok = match format {
        TemporalFormat::Date => NaiveDate::parse_from_str(literal, "%Y-%m-%d").is_ok(),
        TemporalFormat::DateTime => {
            DateTime::parse_from_rfc3339(literal).is_ok()
                || NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        }
        TemporalFormat::Time => {
            let local = TIME_OFFSET.replace(literal, "");
            NaiveTime::parse_from_str(&local, "%H:%M:%S%.f").is_ok()
        }
        TemporalFormat::Duration => {
            literal.len() > 1 && !literal.ends_with('T') && ISO_DURATION.is_match(literal)
        }
    };
    ok.then_some(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_literals_and_numeric_strings() {
        assert_eq!(integer(&json!(42)), Some(42));
        assert_eq!(integer(&json!("42")), Some(42));
        assert_eq!(integer(&json!(3.0)), Some(3));
        assert_eq!(integer(&json!(3.5)), None);
        assert_eq!(integer(&json!("x")), None);
        assert_eq!(float(&json!("1.5")), Some(1.5));
        assert_eq!(float(&json!(true)), None);
    }

    #[test]
    fn boolean_policy() {
        assert_eq!(boolean(&json!(true), BoolCoercion::Strict), Some(true));
        assert_eq!(boolean(&json!("true"), BoolCoercion::Strict), None);
        assert_eq!(boolean(&json!("false"), BoolCoercion::Lenient), Some(false));
        assert_eq!(boolean(&json!("yes"), BoolCoercion::Lenient), None);
        assert_eq!(boolean(&json!(1), BoolCoercion::Lenient), None);
    }

    #[test]
    fn iso_8601_flavours() {
        assert!(temporal(&json!("2014-03-01"), TemporalFormat::Date).is_some());
        assert!(temporal(&json!("2014-13-01"), TemporalFormat::Date).is_none());
        assert!(temporal(&json!("2014-03-01T12:00:00Z"), TemporalFormat::DateTime).is_some());
        assert!(temporal(&json!("2014-03-01T12:00:00"), TemporalFormat::DateTime).is_some());
        assert!(temporal(&json!("2014-03-01"), TemporalFormat::DateTime).is_none());
        assert!(temporal(&json!("13:37:00"), TemporalFormat::Time).is_some());
        assert!(temporal(&json!("13:37:00.25+01:00"), TemporalFormat::Time).is_some());
        assert!(temporal(&json!("25:00:00"), TemporalFormat::Time).is_none());
        assert!(temporal(&json!("P1M"), TemporalFormat::Duration).is_some());
        assert!(temporal(&json!("P1DT2H30M"), TemporalFormat::Duration).is_some());
        assert!(temporal(&json!("P"), TemporalFormat::Duration).is_none());
        assert!(temporal(&json!("P1DT"), TemporalFormat::Duration).is_none());
        assert!(temporal(&json!(20140301), TemporalFormat::Date).is_none());
    }
}
