//! Delete command handler.

use crate::api::Mode;
use crate::args::DeleteArgs;
use crate::commands::{loaded, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{TransactionId, UserId};
use crate::{Config, Result};
use anyhow::{anyhow, ensure};

/// Deletes one transaction from the service and reloads the user's data.
///
/// The user's data is loaded first so that the reload after the delete has an active user. A
/// failed delete is returned as an `ErrorType::Network` error carrying the feedback message.
pub async fn delete(
    config: Config,
    mode: Mode,
    user_id: Option<UserId>,
    args: &DeleteArgs,
) -> Result<Out<TransactionId>> {
    let id = args.id();
    ensure_id(&id).pub_result(ErrorType::Request)?;

    let sync = loaded(&config, mode, user_id).await?;
    let feedback = sync.delete_by_id(&id).await;
    if feedback.is_error() {
        return Err(Error::new(
            ErrorType::Network,
            anyhow!("{}", feedback.message()),
        ));
    }

    let remaining = sync.snapshot().await.transactions().len();
    let message = format!(
        "{} ({} transaction{} remaining)",
        feedback.message(),
        remaining,
        if remaining == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, id))
}

fn ensure_id(id: &TransactionId) -> anyhow::Result<()> {
    ensure!(!id.is_empty(), "A transaction ID is required");
    Ok(())
}
