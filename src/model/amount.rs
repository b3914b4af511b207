//! Amount type for handling monetary values received from the wallet service.
//!
//! The service may send amounts as JSON numbers (`-20`) or as numeric strings (`"-20.00"`), the
//! latter being what a SQL `NUMERIC` column usually turns into. Both decode into the same
//! `Amount`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Represents a signed dollar amount.
///
/// Negative amounts are expenses and positive amounts are income.
///
/// # Examples
///
/// ```
/// # use wallet_sync::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-20.00").unwrap();
/// assert_eq!(amount.to_string(), "-$20.00");
/// assert!(amount.is_negative());
/// ```
///
/// Dollar signs and thousands separators are accepted:
/// ```
/// # use wallet_sync::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-$1,500.00").unwrap();
/// let b = Amount::from_str("-1500").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Adds `rhs`, returning `None` if the result does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Subtracts `rhs`, returning `None` if the result does not fit in a `Decimal`.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00", "$50.00" and "-50.00" are all accepted
        let without_dollar = match trimmed.strip_prefix('-') {
            Some(after_minus) => match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            },
            None => trimmed.strip_prefix('$').unwrap_or(trimmed).to_string(),
        };

        let without_commas = without_dollar.replace(',', "");
        Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map(Amount)
            .map_err(AmountError)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", num))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Plain decimal string, no dollar sign, so that precision survives the round trip
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // The shortest round-trip representation of the float, so 0.1 stays 0.1
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("-20.00").unwrap();
        assert_eq!(amount.value(), dec("-20"));
    }

    #[test]
    fn test_parse_with_dollar_and_commas() {
        let amount = Amount::from_str("-$60,000.00").unwrap();
        assert_eq!(amount.value(), dec("-60000"));
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert!(Amount::from_str("  ").unwrap().is_zero());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Amount::from_str("twenty").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from(80).to_string(), "$80.00");
        assert_eq!(Amount::from(-1234).to_string(), "-$1,234.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("-20").unwrap();
        let b: Amount = serde_json::from_str("\"-20.00\"").unwrap();
        let c: Amount = serde_json::from_str("-20.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_deserialize_float_keeps_short_form() {
        let a: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(a.value(), dec("0.1"));
    }

    #[test]
    fn test_deserialize_rejects_bool() {
        assert!(serde_json::from_str::<Amount>("true").is_err());
    }

    #[test]
    fn test_serialize_plain_string() {
        let json = serde_json::to_string(&Amount::from_str("-$20.50").unwrap()).unwrap();
        assert_eq!(json, "\"-20.50\"");
    }

    #[test]
    fn test_sign_checks() {
        let zero = Amount::ZERO;
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Amount::from(5).is_positive());
        assert!(Amount::from(-5).is_negative());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Amount::from(100) - Amount::from(20), Amount::from(80));
        assert_eq!(Amount::from(-20).abs(), Amount::from(20));
        assert_eq!(-Amount::from(3) + Amount::from(3), Amount::ZERO);
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            Amount::from(100).checked_sub(Amount::from(20)),
            Some(Amount::from(80))
        );
        assert_eq!(Amount::from(-3).checked_add(Amount::from(3)), Some(Amount::ZERO));

        let max = Amount::new(Decimal::MAX);
        let min = Amount::new(Decimal::MIN);
        assert_eq!(min.checked_sub(Amount::from(1)), None);
        assert_eq!(max.checked_add(Amount::from(1)), None);
        assert_eq!(max.checked_sub(max), Some(Amount::ZERO));
    }
}
