//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Provides exact parsing from strings or JSON numbers and the fixed-point
//! output format shared by every surface of the crate.

use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits in every formatted output value.
pub const FIXED_SCALE: u32 = 10;

/// Lossless decimal numeric type for financial calculations.
///
/// Backed by rust_decimal to avoid floating-point drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(RustDecimal);

/// Reason a raw value could not be read as a decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDecimal {
    #[error("empty value")]
    Empty,
    #[error("unexpected whitespace or separator")]
    Malformed,
    #[error("{0}")]
    Rejected(String),
    /// Parsed fine, but a total built from it left the representable range.
    #[error("arithmetic overflow")]
    Overflow,
}

impl Decimal {
    /// Create a Decimal from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// Plain (`-12.50`) and scientific (`1.5e3`) notation are accepted. Values
    /// that cannot be represented without dropping digits are rejected rather
    /// than rounded.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, InvalidDecimal> {
        if s.is_empty() {
            return Err(InvalidDecimal::Empty);
        }
        // rust_decimal skips `_` while parsing; stored data must not rely on that.
        if s.chars().any(|c| c.is_whitespace() || c == '_') {
            return Err(InvalidDecimal::Malformed);
        }

        match RustDecimal::from_str_exact(s) {
            Ok(value) => Ok(Decimal(value)),
            Err(_) if s.contains(['e', 'E']) => RustDecimal::from_scientific(s)
                .map(Decimal)
                .map_err(|e| InvalidDecimal::Rejected(e.to_string())),
            Err(e) => Err(InvalidDecimal::Rejected(e.to_string())),
        }
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Format with exactly [`FIXED_SCALE`] fractional digits.
    ///
    /// Extra digits are rounded half away from zero; short values are padded
    /// with zeros. A value that rounds to zero prints without a sign.
    pub fn to_fixed_string(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(FIXED_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let rounded = if rounded.is_zero() {
            RustDecimal::ZERO
        } else {
            rounded
        };

        let text = rounded.to_string();
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
        format!(
            "{}.{:0<width$}",
            int_part,
            frac_part,
            width = FIXED_SCALE as usize
        )
    }

    /// Get the underlying RustDecimal.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self + rhs`, or `None` when the result is out of range.
    pub fn checked_add(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    /// `self - rhs`, or `None` when the result is out of range.
    pub fn checked_sub(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    /// `self * rhs`, or `None` when the result is out of range.
    pub fn checked_mul(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = InvalidDecimal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

/// A decimal-bearing field that failed to parse, or whose value pushed a
/// computed total out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal in `{field}` for {key}: {value:?} ({reason})")]
pub struct ParseError {
    /// Field name, e.g. `debit` or `avgPrice`.
    pub field: &'static str,
    /// Asset or symbol the field belongs to.
    pub key: String,
    /// Raw value as supplied.
    pub value: String,
    pub reason: InvalidDecimal,
}

/// A caller-supplied decimal value, kept raw until a computation reads it.
///
/// Accepts JSON strings and JSON numbers. `serde_json` is built with
/// `arbitrary_precision`, so numbers arrive with their literal digits and
/// never pass through `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecimalInput {
    Text(String),
    Number(serde_json::Number),
}

impl DecimalInput {
    /// The raw value as text.
    pub fn as_text(&self) -> String {
        match self {
            DecimalInput::Text(s) => s.clone(),
            DecimalInput::Number(n) => n.to_string(),
        }
    }

    /// Parse exactly, attributing failures to `field` of `key`.
    ///
    /// # Errors
    /// Returns [`ParseError`] when the value is not a valid decimal.
    pub fn parse_field(&self, field: &'static str, key: &str) -> Result<Decimal, ParseError> {
        let parsed = match self {
            DecimalInput::Text(s) => Decimal::from_str_canonical(s),
            DecimalInput::Number(n) => Decimal::from_str_canonical(&n.to_string()),
        };

        parsed.map_err(|reason| ParseError {
            field,
            key: key.to_string(),
            value: self.as_text(),
            reason,
        })
    }
}

impl Default for DecimalInput {
    fn default() -> Self {
        DecimalInput::Text("0".to_string())
    }
}

impl fmt::Display for DecimalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalInput::Text(s) => f.write_str(s),
            DecimalInput::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for DecimalInput {
    fn from(value: &str) -> Self {
        DecimalInput::Text(value.to_string())
    }
}

impl From<String> for DecimalInput {
    fn from(value: String) -> Self {
        DecimalInput::Text(value)
    }
}

impl From<i64> for DecimalInput {
    fn from(value: i64) -> Self {
        DecimalInput::Number(value.into())
    }
}

impl From<u64> for DecimalInput {
    fn from(value: u64) -> Self {
        DecimalInput::Number(value.into())
    }
}

impl From<Decimal> for DecimalInput {
    fn from(value: Decimal) -> Self {
        DecimalInput::Text(value.to_canonical_string())
    }
}

impl Serialize for DecimalInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecimalInput::Text(s) => serializer.serialize_str(s),
            DecimalInput::Number(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DecimalInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalInputVisitor)
    }
}

struct DecimalInputVisitor;

impl<'de> Visitor<'de> for DecimalInputVisitor {
    type Value = DecimalInput;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DecimalInput, E> {
        Ok(DecimalInput::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<DecimalInput, E> {
        Ok(DecimalInput::Text(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DecimalInput, E> {
        Ok(DecimalInput::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DecimalInput, E> {
        Ok(DecimalInput::from(v))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<DecimalInput, E> {
        Err(E::custom(
            "binary floating-point values are not accepted; send the decimal as a string",
        ))
    }

    // arbitrary_precision hands numbers over as a single-entry map.
    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<DecimalInput, A::Error> {
        let number =
            serde_json::Number::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(DecimalInput::Number(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_decimal_parse_preserves_digits() {
        assert_eq!(d("0.000000000001").to_canonical_string(), "0.000000000001");
        assert_eq!(d("-123.456").to_canonical_string(), "-123.456");
        assert_eq!(
            d("999999999.999999999").to_canonical_string(),
            "999999999.999999999"
        );
    }

    #[test]
    fn test_decimal_parse_scientific() {
        assert_eq!(d("1.5e3").to_canonical_string(), "1500");
        assert_eq!(d("25e-2").to_canonical_string(), "0.25");
    }

    #[test]
    fn test_decimal_parse_rejects_garbage() {
        assert_eq!(Decimal::from_str_canonical(""), Err(InvalidDecimal::Empty));
        assert_eq!(
            Decimal::from_str_canonical(" 1"),
            Err(InvalidDecimal::Malformed)
        );
        assert_eq!(
            Decimal::from_str_canonical("1_000"),
            Err(InvalidDecimal::Malformed)
        );
        assert!(Decimal::from_str_canonical("abc").is_err());
        assert!(Decimal::from_str_canonical("1.2.3").is_err());
        assert!(Decimal::from_str_canonical("NaN").is_err());
    }

    #[test]
    fn test_fixed_string_pads() {
        assert_eq!(d("2").to_fixed_string(), "2.0000000000");
        assert_eq!(d("-950").to_fixed_string(), "-950.0000000000");
        assert_eq!(d("0").to_fixed_string(), "0.0000000000");
        assert_eq!(d("1.25").to_fixed_string(), "1.2500000000");
    }

    #[test]
    fn test_fixed_string_rounds_half_away_from_zero() {
        assert_eq!(d("0.00000000005").to_fixed_string(), "0.0000000001");
        assert_eq!(d("0.00000000004").to_fixed_string(), "0.0000000000");
        assert_eq!(d("-0.00000000005").to_fixed_string(), "-0.0000000001");
        assert_eq!(d("1.23456789015").to_fixed_string(), "1.2345678902");
    }

    #[test]
    fn test_fixed_string_negative_zero_has_no_sign() {
        assert_eq!(d("-0.00000000001").to_fixed_string(), "0.0000000000");
        assert_eq!(d("-0").to_fixed_string(), "0.0000000000");
    }

    #[test]
    fn test_fixed_string_large_value_keeps_scale() {
        assert_eq!(
            d("123456789012345678").to_fixed_string(),
            "123456789012345678.0000000000"
        );
    }

    #[test]
    fn test_decimal_arithmetic() {
        let a = d("10.5");
        let b = d("2.5");
        assert_eq!(a.checked_add(b).unwrap().to_canonical_string(), "13");
        assert_eq!(a.checked_sub(b).unwrap().to_canonical_string(), "8");
        assert_eq!(a.checked_mul(b).unwrap().to_canonical_string(), "26.25");
        assert_eq!((-a).to_canonical_string(), "-10.5");
    }

    #[test]
    fn test_decimal_exact_where_float_drifts() {
        let sum = d("0.1").checked_add(d("0.2")).unwrap();
        assert_eq!(sum, d("0.3"));
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let max = d("79228162514264337593543950335");
        assert_eq!(max.checked_add(d("1")), None);
        assert_eq!((-max).checked_sub(d("1")), None);
        assert_eq!(d("1e15").checked_mul(d("1e15")), None);
        assert_eq!(max.checked_sub(d("1")), Some(d("79228162514264337593543950334")));
    }

    #[test]
    fn test_input_parse_field_reports_context() {
        let err = DecimalInput::from("abc")
            .parse_field("debit", "USD")
            .unwrap_err();
        assert_eq!(err.field, "debit");
        assert_eq!(err.key, "USD");
        assert_eq!(err.value, "abc");
        assert!(err.to_string().contains("debit"));
    }

    #[test]
    fn test_input_from_number_and_text() {
        assert_eq!(
            DecimalInput::from(42i64).parse_field("qty", "BTC").unwrap(),
            d("42")
        );
        assert_eq!(
            DecimalInput::from("0.1").parse_field("qty", "BTC").unwrap(),
            d("0.1")
        );
        assert_eq!(DecimalInput::from(d("1.50")), DecimalInput::from("1.5"));
    }

    #[test]
    fn test_input_deserializes_string_and_number() {
        let text: DecimalInput = serde_json::from_str("\"12.30\"").unwrap();
        assert_eq!(text, DecimalInput::Text("12.30".to_string()));

        let number: DecimalInput = serde_json::from_str("0.1000000000000000055511").unwrap();
        assert_eq!(
            number.parse_field("price", "BTC").unwrap(),
            d("0.1000000000000000055511")
        );

        let int: DecimalInput = serde_json::from_str("-7").unwrap();
        assert_eq!(int.parse_field("qty", "BTC").unwrap(), d("-7"));
    }

    #[test]
    fn test_input_rejects_non_numeric_json() {
        assert!(serde_json::from_str::<DecimalInput>("true").is_err());
        assert!(serde_json::from_str::<DecimalInput>("null").is_err());
    }

    #[test]
    fn test_input_serializes_as_supplied() {
        let text = serde_json::to_string(&DecimalInput::from("1.50")).unwrap();
        assert_eq!(text, "\"1.50\"");
        let number = serde_json::to_string(&DecimalInput::from(3i64)).unwrap();
        assert_eq!(number, "3");
    }
}
