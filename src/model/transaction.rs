use crate::model::Amount;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The opaque identifier of a transaction, assigned by the wallet service.
///
/// The service may send it as a JSON number or a JSON string; either way it is held as a string
/// and sent back verbatim in the delete path.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = TransactionId;

            fn expecting(&self, f: &mut Formatter) -> fmt::Result {
                f.write_str("a string or integer transaction id")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(TransactionId(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(TransactionId(v.to_string()))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(TransactionId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// The identifier of an authenticated user. It is produced by whatever handles sign-in and is
/// treated as an opaque token here.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Represents one financial movement as returned by `GET /transactions/{user_id}`.
///
/// Only `id` is required. Everything else falls back to its default when the service omits it,
/// so a sparse record still shows up in the list.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) id: TransactionId,
    #[serde(default, alias = "userId")]
    pub(crate) user_id: Option<UserId>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) amount: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) category: String,
    #[serde(default, alias = "createdAt")]
    pub(crate) created_at: Option<String>,
}

impl Transaction {
    pub fn new(id: impl Into<TransactionId>, amount: impl Into<Amount>, category: &str) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Parses `created_at` into a calendar date. Accepts RFC 3339 timestamps, naive
    /// `YYYY-MM-DDTHH:MM:SS` timestamps and plain `YYYY-MM-DD` dates.
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.created_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.date());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    /// True when the record either names no owner or names `user_id` as its owner.
    pub(crate) fn belongs_to(&self, user_id: &UserId) -> bool {
        match &self.user_id {
            Some(owner) => owner == user_id,
            None => true,
        }
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The ordered collection of transactions for one user, in the order the service returned them.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions(Vec<Transaction>);

impl Transactions {
    pub fn new(data: Vec<Transaction>) -> Self {
        Self(data)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.0.iter()
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.0.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.get(id).is_some()
    }

    /// Keeps only the transactions that `belong_to` the user, returning how many were dropped.
    pub(crate) fn retain_owned_by(&mut self, user_id: &UserId) -> usize {
        let before = self.0.len();
        self.0.retain(|t| t.belongs_to(user_id));
        before - self.0.len()
    }
}

impl From<Vec<Transaction>> for Transactions {
    fn from(value: Vec<Transaction>) -> Self {
        Self(value)
    }
}

impl IntoIterator for Transactions {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
