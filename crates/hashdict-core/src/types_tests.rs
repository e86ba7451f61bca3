//! Tests for the value model.

use crate::types::*;

#[test]
fn test_value_type_parse_and_display() {
    for text in ["UInt8", "Int64", "Float32", "String", "Decimal64(4)", "Decimal128(38)"] {
        let ty: ValueType = text.parse().unwrap();
        assert_eq!(ty.to_string(), text);
    }
    assert_eq!(" Decimal32( 2 ) ".parse::<ValueType>(), Ok(ValueType::Decimal32(2)));
}

#[test]
fn test_value_type_parse_rejects_unknown_and_bad_scale() {
    assert!("Varchar".parse::<ValueType>().is_err());
    assert!("Decimal32(x)".parse::<ValueType>().is_err());
    assert!("Decimal32(10)".parse::<ValueType>().is_err());
    assert!("Decimal64(19)".parse::<ValueType>().is_err());
    assert!("Decimal256(2)".parse::<ValueType>().is_err());
}

#[test]
fn test_value_type_serde_as_string() {
    let json = serde_json::to_string(&ValueType::Decimal64(3)).unwrap();
    assert_eq!(json, "\"Decimal64(3)\"");
    let back: ValueType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ValueType::Decimal64(3));
}

#[test]
fn test_fixed_width() {
    assert_eq!(ValueType::UInt8.fixed_width(), Some(1));
    assert_eq!(ValueType::Float32.fixed_width(), Some(4));
    assert_eq!(ValueType::Decimal64(2).fixed_width(), Some(8));
    assert_eq!(ValueType::UInt128.fixed_width(), Some(16));
    assert_eq!(ValueType::String.fixed_width(), None);
}

#[test]
fn test_format_decimal() {
    assert_eq!(format_decimal(12345, 2), "123.45");
    assert_eq!(format_decimal(-5, 3), "-0.005");
    assert_eq!(format_decimal(7, 0), "7");
    assert_eq!(format_decimal(0, 2), "0.00");
}

#[test]
fn test_parse_literal_numbers() {
    assert_eq!(Value::parse_literal(ValueType::UInt16, "42").unwrap(), Value::UInt16(42));
    assert_eq!(Value::parse_literal(ValueType::Int8, " -7 ").unwrap(), Value::Int8(-7));
    assert_eq!(Value::parse_literal(ValueType::Float64, "0.25").unwrap(), Value::Float64(0.25));
}

#[test]
fn test_parse_literal_empty_is_zero() {
    assert_eq!(Value::parse_literal(ValueType::UInt32, "").unwrap(), Value::UInt32(0));
    assert_eq!(
        Value::parse_literal(ValueType::Decimal32(2), "").unwrap(),
        Value::Decimal32(Decimal32(0), 2)
    );
    assert_eq!(Value::parse_literal(ValueType::String, "").unwrap(), Value::String(String::new()));
}

#[test]
fn test_parse_literal_string_keeps_whitespace() {
    assert_eq!(
        Value::parse_literal(ValueType::String, "  padded ").unwrap(),
        Value::String("  padded ".to_string())
    );
}

#[test]
fn test_parse_literal_decimal() {
    assert_eq!(
        Value::parse_literal(ValueType::Decimal64(3), "1.5").unwrap(),
        Value::Decimal64(Decimal64(1500), 3)
    );
    assert_eq!(
        Value::parse_literal(ValueType::Decimal32(2), "-.25").unwrap(),
        Value::Decimal32(Decimal32(-25), 2)
    );
    assert!(Value::parse_literal(ValueType::Decimal32(2), "1.234").is_err());
    assert!(Value::parse_literal(ValueType::Decimal32(0), "3000000000").is_err());
    assert!(Value::parse_literal(ValueType::Decimal64(2), "1e5").is_err());
}

#[test]
fn test_parse_literal_out_of_range() {
    let err = Value::parse_literal(ValueType::UInt8, "256").unwrap_err();
    assert_eq!(err.code(), "HDICT-009");
    assert!(Value::parse_literal(ValueType::UInt32, "-1").is_err());
    assert!(Value::parse_literal(ValueType::Int64, "abc").is_err());
}

#[test]
fn test_convert_integers_with_range_checks() {
    assert_eq!(Value::UInt8(7).convert_to(ValueType::Int64).unwrap(), Value::Int64(7));
    assert_eq!(Value::Int64(200).convert_to(ValueType::UInt8).unwrap(), Value::UInt8(200));
    assert!(Value::Int64(300).convert_to(ValueType::UInt8).is_err());
    assert!(Value::Int32(-1).convert_to(ValueType::UInt64).is_err());
}

#[test]
fn test_convert_floats() {
    assert_eq!(Value::Float64(3.0).convert_to(ValueType::UInt16).unwrap(), Value::UInt16(3));
    assert!(Value::Float64(3.5).convert_to(ValueType::UInt16).is_err());
    assert_eq!(Value::UInt32(2).convert_to(ValueType::Float32).unwrap(), Value::Float32(2.0));
}

#[test]
fn test_float_overflow_is_an_error() {
    let err = Value::Float64(1e300).convert_to(ValueType::Float32).unwrap_err();
    assert_eq!(err.code(), "HDICT-009");
    assert!(Value::Float64(-1e300).convert_to(ValueType::Float32).is_err());
    assert!(Value::parse_literal(ValueType::Float32, "1e300").is_err());
    assert!(Value::parse_literal(ValueType::Float64, "1e400").is_err());
    assert!(Value::from("1e300").convert_to(ValueType::Float32).is_err());

    // Spelled-out non-finite values are kept.
    assert_eq!(
        Value::Float64(f64::INFINITY).convert_to(ValueType::Float32).unwrap(),
        Value::Float32(f32::INFINITY)
    );
    assert_eq!(
        Value::parse_literal(ValueType::Float32, "-inf").unwrap(),
        Value::Float32(f32::NEG_INFINITY)
    );
    assert!(matches!(
        Value::parse_literal(ValueType::Float64, "NaN").unwrap(),
        Value::Float64(v) if v.is_nan()
    ));
    assert_eq!(
        Value::Float64(1.5).convert_to(ValueType::Float32).unwrap(),
        Value::Float32(1.5)
    );
}

#[test]
fn test_convert_decimals() {
    assert_eq!(
        Value::UInt32(3).convert_to(ValueType::Decimal64(2)).unwrap(),
        Value::Decimal64(Decimal64(300), 2)
    );
    assert_eq!(
        Value::Decimal32(Decimal32(150), 2).convert_to(ValueType::Decimal128(4)).unwrap(),
        Value::Decimal128(Decimal128(15000), 4)
    );
    assert_eq!(
        Value::Float64(0.19).convert_to(ValueType::Decimal32(2)).unwrap(),
        Value::Decimal32(Decimal32(19), 2)
    );
    // Dropping non-zero fractional digits is refused.
    assert!(Value::Decimal64(Decimal64(155), 2)
        .convert_to(ValueType::Decimal64(1))
        .is_err());
    assert_eq!(
        Value::Decimal64(Decimal64(400), 2).convert_to(ValueType::Int32).unwrap(),
        Value::Int32(4)
    );
}

#[test]
fn test_convert_strings_parse_and_numbers_do_not_stringify() {
    assert_eq!(Value::from("12").convert_to(ValueType::UInt64).unwrap(), Value::UInt64(12));
    assert!(Value::UInt64(12).convert_to(ValueType::String).is_err());
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Decimal64(Decimal64(-1234), 2).to_string(), "-12.34");
    assert_eq!(Value::from("fr").to_string(), "fr");
    assert_eq!(Value::from(5u8).to_string(), "5");
}

#[test]
fn test_zero_matches_type() {
    for ty in [
        ValueType::UInt8,
        ValueType::Int64,
        ValueType::Float32,
        ValueType::Decimal128(5),
        ValueType::String,
    ] {
        assert_eq!(Value::zero(ty).value_type(), ty);
    }
}
