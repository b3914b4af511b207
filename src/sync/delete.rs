//! The deletion coordinator. A delete is confirmed by the service before anything local changes,
//! and the store is then rebuilt by a full reload rather than by removing the row locally.

use crate::api::Gateway;
use crate::error::{ErrorType, IntoResult};
use crate::model::TransactionId;
use crate::sync::load::Loader;
use crate::sync::store::LoadKind;
use crate::sync::{Feedback, Notify};
use crate::Result;
use anyhow::anyhow;
use std::sync::Arc;
use tracing::{debug, error};

const SUCCESS_TITLE: &str = "Success";
const SUCCESS_MESSAGE: &str = "Transaction deleted successfully";
const ERROR_TITLE: &str = "Error";

#[derive(Clone)]
pub(crate) struct Deleter {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notify>,
}

impl Deleter {
    pub(crate) fn new(gateway: Arc<dyn Gateway>, notifier: Arc<dyn Notify>) -> Self {
        Self { gateway, notifier }
    }

    /// Deletes the transaction remotely, reloads through `loader` on success, and hands exactly
    /// one `Feedback` to the notifier. The same `Feedback` is returned.
    pub(crate) async fn delete_by_id(&self, loader: &Loader, id: &TransactionId) -> Feedback {
        let feedback = match self.delete(id).await {
            Err(e) => {
                error!("Error deleting transaction {id}: {e:?}");
                Feedback::error(ERROR_TITLE, e.message())
            }
            Ok(()) => {
                // Load failures are logged by the loader; the delete itself has succeeded.
                let outcome = loader.load(LoadKind::Background).await;
                debug!("Reload after deleting {id}: {outcome:?}");
                Feedback::success(SUCCESS_TITLE, SUCCESS_MESSAGE)
            }
        };
        self.notifier.notify(&feedback);
        feedback
    }

    async fn delete(&self, id: &TransactionId) -> Result<()> {
        if id.is_empty() {
            return Err(anyhow!("Transaction ID must not be empty")).pub_result(ErrorType::Request);
        }
        self.gateway.delete_transaction(id).await
    }
}
