//! The load coordinator: fetches the transaction list and the summary concurrently and installs
//! both into the `Store` together.

use crate::api::Gateway;
use crate::error::ErrorType;
use crate::model::UserId;
use crate::sync::store::{LoadKind, Store};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What happens when loads overlap.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum LoadOrdering {
    /// Every load that completes installs its result, so the store reflects whichever load
    /// finished last, even if it started first.
    #[default]
    LastWriteWins,
    /// A load's result is discarded if a load that started after it has already been installed.
    LatestStarted,
}

serde_plain::derive_display_from_serialize!(LoadOrdering);
serde_plain::derive_fromstr_from_deserialize!(LoadOrdering);

/// How a load ended. Loads never return an error; a failure is reported here and logged, and
/// the store keeps its previous data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Both fetches succeeded and the result was installed.
    Applied,
    /// There is no active user, so nothing was fetched.
    Skipped,
    /// At least one fetch failed. Nothing was installed.
    Failed {
        error_type: ErrorType,
        message: String,
    },
    /// Both fetches succeeded but the result no longer applied when it arrived: the active user
    /// had changed, or a newer load had already been installed.
    Discarded,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied)
    }
}

#[derive(Clone)]
pub(crate) struct Loader {
    gateway: Arc<dyn Gateway>,
    store: Store,
    ordering: LoadOrdering,
}

impl Loader {
    pub(crate) fn new(gateway: Arc<dyn Gateway>, store: Store, ordering: LoadOrdering) -> Self {
        Self {
            gateway,
            store,
            ordering,
        }
    }

    pub(crate) fn ordering(&self) -> LoadOrdering {
        self.ordering
    }

    pub(crate) fn set_ordering(&mut self, ordering: LoadOrdering) {
        self.ordering = ordering;
    }

    /// Loads data for the active user. The flag that `kind` raises is cleared when this returns,
    /// whatever the outcome, and also if the returned future is dropped before completion.
    pub(crate) async fn load(&self, kind: LoadKind) -> LoadOutcome {
        let _guard = self.store.flag_guard(kind);

        let Some(user_id) = self.store.user_id().await else {
            debug!("No active user, skipping load");
            return LoadOutcome::Skipped;
        };

        let generation = self.store.begin_load();
        debug!("Starting load {generation} ({kind:?}) for {user_id}");

        let fetched = tokio::try_join!(
            self.gateway.fetch_transactions(&user_id),
            self.gateway.fetch_summary(&user_id),
        );

        let (mut transactions, summary) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("Error fetching data for {user_id}: {e:?}");
                return LoadOutcome::Failed {
                    error_type: e.error_type(),
                    message: e.message(),
                };
            }
        };

        let dropped = transactions.retain_owned_by(&user_id);
        if dropped > 0 {
            warn!("Dropped {dropped} transactions that do not belong to {user_id}");
        }
        if !summary.is_consistent() {
            warn!(
                "Summary for {user_id} is inconsistent: balance {}, income {}, expenses {}",
                summary.balance(),
                summary.income(),
                summary.expenses()
            );
        }

        let count = transactions.len();
        if self
            .store
            .install(&user_id, generation, self.ordering, transactions, summary)
            .await
        {
            debug!("Load {generation} installed {count} transactions for {user_id}");
            LoadOutcome::Applied
        } else {
            LoadOutcome::Discarded
        }
    }

    /// Makes `user_id` the active user, if it is not already, and loads for it.
    pub(crate) async fn load_user(&self, user_id: Option<&UserId>, kind: LoadKind) -> LoadOutcome {
        match user_id.filter(|u| !u.is_empty()) {
            None => {
                // Not signed in yet. Existing data stays as it is.
                drop(self.store.flag_guard(kind));
                LoadOutcome::Skipped
            }
            Some(user_id) => {
                self.store.set_user(Some(user_id.clone())).await;
                self.load(kind).await
            }
        }
    }
}
