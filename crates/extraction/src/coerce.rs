use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use rowforge_core::{
    CanonicalType, CanonicalValue, ExtractError, ExtractResult, Primitive,
};

/// Convert a resolved native leaf into the requested canonical type.
///
/// Null maps to canonical null for every target and never fails. The matrix
/// is permissive in the numeric, boolean and date directions; it only fails
/// where no sensible representation exists, e.g. a date value asked for as
/// an integer.
pub fn coerce(
    value: &Primitive<'_>,
    target: CanonicalType,
) -> ExtractResult<CanonicalValue> {
    if value.is_null() {
        return Ok(CanonicalValue::Null);
    }
    match target {
        CanonicalType::String => {
            Ok(CanonicalValue::String(text_form(value)))
        }
        CanonicalType::Boolean => {
            Ok(CanonicalValue::Boolean(boolean_form(value)))
        }
        CanonicalType::Integer => {
            integer_form(value).map(CanonicalValue::Integer)
        }
        CanonicalType::Number => number_form(value).map(CanonicalValue::Number),
        CanonicalType::BigDecimal => {
            decimal_form(value).map(CanonicalValue::BigDecimal)
        }
        CanonicalType::Date => date_form(value).map(CanonicalValue::Date),
        CanonicalType::Binary => {
            Ok(CanonicalValue::Binary(binary_form(value)))
        }
    }
}

/// Canonical textual form; total over all primitive categories.
fn text_form(value: &Primitive<'_>) -> String {
    match value {
        Primitive::Null => "null".to_string(),
        Primitive::Text(s) => (*s).to_string(),
        Primitive::Integer(i) => i.to_string(),
        Primitive::Float(f) => f.to_string(),
        Primitive::Boolean(b) => b.to_string(),
        Primitive::DateTime(d) => d.to_rfc3339(),
        Primitive::Binary(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Nonzero numerics and epochs are true; text is true only for the
/// case-insensitive literals Y, T and 1. Everything else is false, never an
/// error.
fn boolean_form(value: &Primitive<'_>) -> bool {
    fn text_true(s: &str) -> bool {
        s.eq_ignore_ascii_case("y")
            || s.eq_ignore_ascii_case("t")
            || s == "1"
    }
    match value {
        Primitive::Null => false,
        Primitive::Boolean(b) => *b,
        Primitive::Integer(i) => *i != 0,
        Primitive::Float(f) => *f != 0.0,
        Primitive::DateTime(d) => d.timestamp_millis() != 0,
        Primitive::Text(s) => text_true(s),
        Primitive::Binary(b) => text_true(&String::from_utf8_lossy(b)),
    }
}

fn integer_form(value: &Primitive<'_>) -> ExtractResult<i64> {
    match value {
        Primitive::Integer(i) => Ok(*i),
        Primitive::Float(f) => Ok(*f as i64),
        Primitive::Text(s) => s
            .parse::<i64>()
            .map_err(|_| conversion_error(value, CanonicalType::Integer)),
        // blobs may carry the textual form of a number
        Primitive::Binary(b) => String::from_utf8_lossy(b)
            .parse::<i64>()
            .map_err(|_| conversion_error(value, CanonicalType::Integer)),
        _ => Err(conversion_error(value, CanonicalType::Integer)),
    }
}

fn number_form(value: &Primitive<'_>) -> ExtractResult<f64> {
    match value {
        Primitive::Integer(i) => Ok(*i as f64),
        Primitive::Float(f) => Ok(*f),
        Primitive::Text(s) => s
            .parse::<f64>()
            .map_err(|_| conversion_error(value, CanonicalType::Number)),
        Primitive::Binary(b) => String::from_utf8_lossy(b)
            .parse::<f64>()
            .map_err(|_| conversion_error(value, CanonicalType::Number)),
        _ => Err(conversion_error(value, CanonicalType::Number)),
    }
}

fn decimal_form(value: &Primitive<'_>) -> ExtractResult<Decimal> {
    match value {
        Primitive::Integer(i) => Ok(Decimal::from(*i)),
        Primitive::Float(f) => Decimal::from_f64(*f)
            .ok_or_else(|| conversion_error(value, CanonicalType::BigDecimal)),
        Primitive::Text(s) => s
            .parse::<Decimal>()
            .map_err(|_| conversion_error(value, CanonicalType::BigDecimal)),
        Primitive::Binary(b) => String::from_utf8_lossy(b)
            .parse::<Decimal>()
            .map_err(|_| conversion_error(value, CanonicalType::BigDecimal)),
        _ => Err(conversion_error(value, CanonicalType::BigDecimal)),
    }
}

/// Numerics are epoch milliseconds; dates pass through. Nothing else has a
/// date reading.
fn date_form(value: &Primitive<'_>) -> ExtractResult<DateTime<Utc>> {
    match value {
        Primitive::DateTime(d) => Ok(*d),
        Primitive::Integer(i) => DateTime::from_timestamp_millis(*i)
            .ok_or_else(|| conversion_error(value, CanonicalType::Date)),
        Primitive::Float(f) => DateTime::from_timestamp_millis(*f as i64)
            .ok_or_else(|| conversion_error(value, CanonicalType::Date)),
        _ => Err(conversion_error(value, CanonicalType::Date)),
    }
}

fn binary_form(value: &Primitive<'_>) -> Vec<u8> {
    match value {
        Primitive::Binary(b) => b.to_vec(),
        Primitive::Text(s) => s.as_bytes().to_vec(),
        other => text_form(other).into_bytes(),
    }
}

fn conversion_error(
    value: &Primitive<'_>,
    to: CanonicalType,
) -> ExtractError {
    ExtractError::TypeConversion {
        from: value.category().as_str().into(),
        to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_coerces_to_null_for_every_target() {
        for target in [
            CanonicalType::String,
            CanonicalType::Boolean,
            CanonicalType::Integer,
            CanonicalType::Number,
            CanonicalType::BigDecimal,
            CanonicalType::Date,
            CanonicalType::Binary,
        ] {
            assert_eq!(
                coerce(&Primitive::Null, target).unwrap(),
                CanonicalValue::Null
            );
        }
    }

    #[test]
    fn test_boolean_text_literals() {
        for yes in ["Y", "y", "T", "t", "1"] {
            assert_eq!(
                coerce(&Primitive::Text(yes), CanonicalType::Boolean).unwrap(),
                CanonicalValue::Boolean(true),
                "{yes} should be true"
            );
        }
        for no in ["N", "0", "", "yes", "true"] {
            assert_eq!(
                coerce(&Primitive::Text(no), CanonicalType::Boolean).unwrap(),
                CanonicalValue::Boolean(false),
                "{no} should be false"
            );
        }
    }

    #[test]
    fn test_nonzero_numerics_and_epochs_are_true() {
        assert_eq!(
            coerce(&Primitive::Integer(-3), CanonicalType::Boolean).unwrap(),
            CanonicalValue::Boolean(true)
        );
        assert_eq!(
            coerce(&Primitive::Float(0.0), CanonicalType::Boolean).unwrap(),
            CanonicalValue::Boolean(false)
        );
        let epoch = DateTime::from_timestamp_millis(0).unwrap();
        assert_eq!(
            coerce(&Primitive::DateTime(epoch), CanonicalType::Boolean)
                .unwrap(),
            CanonicalValue::Boolean(false)
        );
    }

    #[test]
    fn test_float_truncates_to_integer() {
        assert_eq!(
            coerce(&Primitive::Float(3.9), CanonicalType::Integer).unwrap(),
            CanonicalValue::Integer(3)
        );
    }

    #[test]
    fn test_blob_reads_as_textual_number() {
        assert_eq!(
            coerce(&Primitive::Binary(b"451"), CanonicalType::Integer)
                .unwrap(),
            CanonicalValue::Integer(451)
        );
        assert_eq!(
            coerce(&Primitive::Binary(b"4.5"), CanonicalType::Number).unwrap(),
            CanonicalValue::Number(4.5)
        );
    }

    #[test]
    fn test_text_decimal_is_exact() {
        assert_eq!(
            coerce(&Primitive::Text("12.3400"), CanonicalType::BigDecimal)
                .unwrap(),
            CanonicalValue::BigDecimal("12.3400".parse().unwrap())
        );
    }

    #[test]
    fn test_epoch_millis_to_date_and_back() {
        let coerced =
            coerce(&Primitive::Integer(86_400_000), CanonicalType::Date)
                .unwrap();
        let CanonicalValue::Date(d) = coerced else {
            panic!("expected date");
        };
        assert_eq!(d.timestamp_millis(), 86_400_000);
    }

    #[test]
    fn test_text_has_no_date_reading() {
        let err = coerce(&Primitive::Text("2020-01-01"), CanonicalType::Date)
            .unwrap_err();
        assert_eq!(err.kind(), "type conversion error");
    }

    #[test]
    fn test_date_renders_rfc3339_text() {
        let d = DateTime::from_timestamp_millis(0).unwrap();
        assert_eq!(
            coerce(&Primitive::DateTime(d), CanonicalType::String).unwrap(),
            CanonicalValue::String("1970-01-01T00:00:00+00:00".into())
        );
    }

    #[test]
    fn test_non_numeric_text_fails_numeric_targets() {
        assert!(coerce(&Primitive::Text("ann"), CanonicalType::Integer)
            .is_err());
        assert!(
            coerce(&Primitive::Text("ann"), CanonicalType::Number).is_err()
        );
    }

    #[test]
    fn test_binary_passthrough_and_text_bytes() {
        assert_eq!(
            coerce(&Primitive::Binary(b"\x00\x01"), CanonicalType::Binary)
                .unwrap(),
            CanonicalValue::Binary(vec![0, 1])
        );
        assert_eq!(
            coerce(&Primitive::Integer(7), CanonicalType::Binary).unwrap(),
            CanonicalValue::Binary(b"7".to_vec())
        );
    }
}
