//! The transaction sync layer.
//!
//! `TransactionSync` is what a presentation layer holds: it exposes read-only snapshots of the
//! `Store` and the commands that change it (load, refresh, delete). The store is only ever
//! mutated through these commands.

mod delete;
mod load;
mod notify;
mod store;

pub use load::{LoadOrdering, LoadOutcome};
pub use notify::{Feedback, LogNotifier, Notify};
pub use store::{Snapshot, Store};

use crate::api::{self, Gateway, Mode};
use crate::model::{TransactionId, UserId};
use crate::{Config, Result};
use delete::Deleter;
use load::Loader;
use std::sync::Arc;
use store::LoadKind;

/// Keeps the transactions and summary of one user in sync with the wallet service.
///
/// Cloning yields another handle to the same store.
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// use std::sync::Arc;
/// use wallet_sync::model::UserId;
/// use wallet_sync::sync::{LogNotifier, TransactionSync};
/// use wallet_sync::{TestGateway, DEMO_USER};
///
/// let sync = TransactionSync::new(
///     Arc::new(TestGateway::seeded()),
///     Arc::new(LogNotifier),
///     Some(UserId::from(DEMO_USER)),
/// );
/// sync.refresh().await;
/// let snapshot = sync.snapshot().await;
/// assert_eq!(snapshot.transactions().len(), 5);
/// assert!(!snapshot.is_loading());
/// # }
/// ```
#[derive(Clone)]
pub struct TransactionSync {
    store: Store,
    loader: Loader,
    deleter: Deleter,
}

impl TransactionSync {
    /// Creates a `TransactionSync` with an empty store for `user_id`. Nothing is fetched until
    /// `load` or `refresh` is called.
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notify>,
        user_id: Option<UserId>,
    ) -> Self {
        let store = Store::new(user_id);
        Self {
            loader: Loader::new(gateway.clone(), store.clone(), LoadOrdering::default()),
            deleter: Deleter::new(gateway, notifier),
            store,
        }
    }

    /// Creates a `TransactionSync` with the gateway for `mode` and the settings in `config`.
    pub fn from_config(
        config: &Config,
        mode: Mode,
        notifier: Arc<dyn Notify>,
        user_id: Option<UserId>,
    ) -> Result<Self> {
        let gateway = api::gateway(config, mode)?;
        Ok(Self::new(gateway, notifier, user_id).with_ordering(config.load_ordering()))
    }

    pub fn with_ordering(mut self, ordering: LoadOrdering) -> Self {
        self.loader.set_ordering(ordering);
        self
    }

    pub fn ordering(&self) -> LoadOrdering {
        self.loader.ordering()
    }

    /// The underlying store, for reading.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.store.snapshot().await
    }

    pub async fn user_id(&self) -> Option<UserId> {
        self.store.user_id().await
    }

    /// Changes the active user. Data belonging to the previous user is cleared right away, and
    /// any load still in flight for them is discarded when it completes.
    pub async fn set_user(&self, user_id: Option<UserId>) {
        self.store.set_user(user_id).await
    }

    /// Loads transactions and summary for `user_id`, raising the loading flag while it runs.
    ///
    /// With no user (or an empty one) nothing is fetched and existing data is left alone; only
    /// the loading flag is cleared. A different user than the active one becomes the active user
    /// first.
    ///
    /// Failures never surface as an error. They are logged, reported in the `LoadOutcome`, and
    /// leave the previous data in place.
    pub async fn load(&self, user_id: Option<&UserId>) -> LoadOutcome {
        self.loader.load_user(user_id, LoadKind::Explicit).await
    }

    /// Reloads for the active user, raising the refreshing flag instead of the loading flag.
    pub async fn refresh(&self) -> LoadOutcome {
        self.loader.load(LoadKind::Refresh).await
    }

    /// Deletes a transaction on the service and, if that succeeds, reloads for the active user.
    /// Exactly one `Feedback` is sent to the notifier and returned.
    pub async fn delete_by_id(&self, id: &TransactionId) -> Feedback {
        self.deleter.delete_by_id(&self.loader, id).await
    }
}
