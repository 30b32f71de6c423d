use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Edit input that never fails to parse: non-numeric content degrades to `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Points(pub i64);

impl Points {
    pub fn value(self) -> i64 {
        self.0
    }

    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (sign, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (-1, &trimmed[1..]),
            Some(b'+') => (1, &trimmed[1..]),
            _ => (1, trimmed),
        };

        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());

        digits[..end]
            .parse::<i64>()
            .map(|value| Self(sign * value))
            .unwrap_or_default()
    }

    fn from_float(value: f64) -> Self {
        if value.is_finite() {
            Self(value.trunc() as i64)
        } else {
            Self::default()
        }
    }
}

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Points> for i64 {
    fn from(value: Points) -> Self {
        value.0
    }
}

struct PointsVisitor;

impl<'de> Visitor<'de> for PointsVisitor {
    type Value = Points;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Points, E> {
        Ok(Points(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Points, E> {
        Ok(Points(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Points, E> {
        Ok(Points::from_float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Points, E> {
        Ok(Points::parse_lenient(value))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Points, E> {
        Ok(Points::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Points, E> {
        Ok(Points::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Points, E> {
        Ok(Points::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Points, D::Error> {
        deserializer.deserialize_any(PointsVisitor)
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PointsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::Points;

    fn parse(json: &str) -> i64 {
        serde_json::from_str::<Points>(json)
            .expect("points input should always deserialize")
            .value()
    }

    #[test]
    fn numbers_are_taken_as_is_or_truncated() {
        assert_eq!(parse("20"), 20);
        assert_eq!(parse("-3"), -3);
        assert_eq!(parse("2.7"), 2);
    }

    #[test]
    fn numeric_strings_read_leading_integer() {
        assert_eq!(parse(r#""25""#), 25);
        assert_eq!(parse(r#"" 12abc""#), 12);
        assert_eq!(parse(r#""-4""#), -4);
    }

    #[test]
    fn non_numeric_input_degrades_to_zero() {
        assert_eq!(parse(r#""abc""#), 0);
        assert_eq!(parse(r#""""#), 0);
        assert_eq!(parse("null"), 0);
        assert_eq!(parse("true"), 0);
        assert_eq!(parse(r#""-""#), 0);
    }
}
