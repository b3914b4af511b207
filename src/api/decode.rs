//! Decode-with-fallback for the two read payloads.
//!
//! A body that is not JSON at all is an error. A body that is JSON but has the wrong shape is
//! not: it decodes to the empty collection or the zero summary so that the display degrades
//! instead of failing.

use crate::error::Res;
use crate::model::{Amount, Summary, Transactions};
use anyhow::Context;
use serde_json::{Map, Value};
use tracing::warn;

/// Decodes the body of `GET /transactions/{user_id}`.
pub(super) fn transactions(body: &str) -> Res<Transactions> {
    let value: Value =
        serde_json::from_str(body).context("The transactions response is not valid JSON")?;
    transactions_value(value)
}

/// Decodes an already-parsed transactions payload.
pub(super) fn transactions_value(value: Value) -> Res<Transactions> {
    match value {
        Value::Array(_) => serde_json::from_value(value)
            .context("The transactions response holds a record that is not a transaction"),
        other => {
            warn!(
                "Expected a JSON array of transactions but received {}, using an empty list",
                kind(&other)
            );
            Ok(Transactions::default())
        }
    }
}

/// Decodes the body of `GET /transactions/summary/{user_id}`.
pub(super) fn summary(body: &str) -> Res<Summary> {
    let value: Value =
        serde_json::from_str(body).context("The summary response is not valid JSON")?;
    Ok(summary_value(&value))
}

/// Decodes an already-parsed summary payload. This cannot fail.
pub(super) fn summary_value(value: &Value) -> Summary {
    match value {
        Value::Object(map) => Summary::new(
            field(map, "balance"),
            field(map, "income"),
            field(map, "expenses"),
        ),
        other => {
            warn!(
                "Expected a JSON object for the summary but received {}, using zeros",
                kind(other)
            );
            Summary::ZERO
        }
    }
}

fn field(map: &Map<String, Value>, name: &str) -> Amount {
    match map.get(name) {
        None | Some(Value::Null) => Amount::ZERO,
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Unable to read summary field '{name}' from {value}, using zero: {e}");
            Amount::ZERO
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transactions_array() {
        let body = r#"[{"id":"t1","amount":-20,"category":"food"}]"#;
        let list = transactions(body).unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.contains(&"t1".into()));
    }

    #[test]
    fn test_transactions_empty_array() {
        assert!(transactions("[]").unwrap().is_empty());
    }

    #[test]
    fn test_transactions_non_array_is_empty() {
        for body in ["null", r#"{"error":"nope"}"#, "42", r#""text""#, "true"] {
            let list = transactions(body).unwrap();
            assert!(list.is_empty(), "expected empty list for {body}");
        }
    }

    #[test]
    fn test_transactions_not_json_is_error() {
        let err = transactions("<html>oops</html>").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_transactions_bad_record_is_error() {
        assert!(transactions(r#"[{"amount":5}]"#).is_err());
    }

    #[test]
    fn test_summary_object() {
        let s = summary(r#"{"balance":"80.00","income":"100.00","expenses":"20.00"}"#).unwrap();
        assert_eq!(s, Summary::new(80, 100, 20));
    }

    #[test]
    fn test_summary_non_object_is_zero() {
        for body in ["null", "[]", "[1,2,3]", "7", r#""x""#, "false"] {
            assert_eq!(summary(body).unwrap(), Summary::ZERO, "for {body}");
        }
    }

    #[test]
    fn test_summary_partial_object() {
        let s = summary(r#"{"balance":5,"income":null,"expenses":"lots"}"#).unwrap();
        assert_eq!(s, Summary::new(5, 0, 0));
    }

    #[test]
    fn test_summary_not_json_is_error() {
        assert!(summary("").is_err());
    }

    #[test]
    fn test_summary_inconsistent_is_kept() {
        let s = summary(r#"{"balance":1,"income":100,"expenses":20}"#).unwrap();
        assert_eq!(s.balance(), Amount::from(1));
        assert!(!s.is_consistent());
    }
}
