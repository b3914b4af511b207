//! Command handlers for the wallet CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod list;

use crate::api::Mode;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::UserId;
use crate::sync::{LoadOutcome, LogNotifier, TransactionSync};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use delete::delete;
pub use init::init;
pub use list::{list, summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds a `TransactionSync` for `user_id` and runs an explicit load, turning a failed load into
/// an error since a command has nothing else to show.
async fn loaded(config: &Config, mode: Mode, user_id: Option<UserId>) -> Result<TransactionSync> {
    let user_id = user_id
        .ok_or_else(|| anyhow!("A user ID is required, pass --user-id or set WALLET_USER_ID"))
        .pub_result(ErrorType::Request)?;
    let sync = TransactionSync::from_config(config, mode, Arc::new(LogNotifier), None)?;
    match sync.load(Some(&user_id)).await {
        LoadOutcome::Failed {
            error_type,
            message,
        } => Err(Error::new(
            error_type,
            anyhow!(message).context(format!("Unable to load transactions for {user_id}")),
        )),
        outcome => {
            debug!("Load for {user_id} finished with {outcome:?}");
            Ok(sync)
        }
    }
}
