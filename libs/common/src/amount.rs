//! Lenient decoding for monetary amounts.
//!
//! The backend serializes `Decimal` columns either as JSON numbers or as
//! decimal strings depending on the endpoint.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a decimal string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        v.trim()
            .parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<f64, D::Error> {
        d.deserialize_any(AmountVisitor)
    }
}

/// Deserialize an amount from a number, a decimal string, or `null` (as `0`).
pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    d.deserialize_any(AmountVisitor)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(with = "super")]
        amount: f64,
    }

    #[test]
    fn accepts_numbers_strings_and_null() {
        let a: Row = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"amount": "88.00"}"#).unwrap();
        let c: Row = serde_json::from_str(r#"{"amount": 7}"#).unwrap();
        let d: Row = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(a.amount, 12.5);
        assert_eq!(b.amount, 88.0);
        assert_eq!(c.amount, 7.0);
        assert_eq!(d.amount, 0.0);
    }

    #[test]
    fn rejects_garbage_strings() {
        assert!(serde_json::from_str::<Row>(r#"{"amount": "twelve"}"#).is_err());
    }
}
