//! The state store: the last-known transactions and summary for the active user, plus the
//! loading and refreshing flags.
//!
//! Data lives behind one `RwLock` so that a reader always gets transactions and a summary that
//! were installed together. The flags are atomics outside the lock so that a drop guard can clear
//! them without awaiting.

use crate::model::{Summary, Transactions, UserId};
use crate::sync::LoadOrdering;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A consistent, read-only copy of the sync state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    user_id: Option<UserId>,
    transactions: Transactions,
    summary: Summary,
    is_loading: bool,
    is_refreshing: bool,
}

impl Snapshot {
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn transactions(&self) -> &Transactions {
        &self.transactions
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// True from construction until the first load settles, and during an explicit load.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True while a user-triggered refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }
}

#[derive(Debug, Default)]
struct Data {
    user_id: Option<UserId>,
    transactions: Transactions,
    summary: Summary,
    /// The generation of the load whose result is currently installed.
    installed: u64,
}

impl Data {
    fn replace_transactions(&mut self, transactions: Transactions) {
        self.transactions = transactions;
    }

    fn replace_summary(&mut self, summary: Summary) {
        self.summary = summary;
    }
}

#[derive(Debug)]
struct Inner {
    data: RwLock<Data>,
    loading: AtomicBool,
    refreshing: AtomicBool,
    /// The generation handed to the most recently started load.
    started: AtomicU64,
}

/// Holds the sync state for one user at a time. Cloning a `Store` yields another handle to the
/// same state.
///
/// Only the load and deletion paths in this crate can mutate it; everything else reads
/// snapshots.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Creates an empty store for `user_id`. The loading flag starts raised since nothing has
    /// been loaded yet.
    pub fn new(user_id: Option<UserId>) -> Self {
        Self {
            inner: Arc::new(Inner {
                data: RwLock::new(Data {
                    user_id: user_id.filter(|u| !u.is_empty()),
                    ..Data::default()
                }),
                loading: AtomicBool::new(true),
                refreshing: AtomicBool::new(false),
                started: AtomicU64::new(0),
            }),
        }
    }

    /// Returns a copy of the whole state taken under a single read lock.
    pub async fn snapshot(&self) -> Snapshot {
        let data = self.inner.data.read().await;
        Snapshot {
            user_id: data.user_id.clone(),
            transactions: data.transactions.clone(),
            summary: data.summary,
            is_loading: self.is_loading(),
            is_refreshing: self.is_refreshing(),
        }
    }

    pub async fn user_id(&self) -> Option<UserId> {
        self.inner.data.read().await.user_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refreshing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_loading(&self, value: bool) {
        self.inner.loading.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_refreshing(&self, value: bool) {
        self.inner.refreshing.store(value, Ordering::SeqCst);
    }

    /// Makes `user_id` the active user. Switching to a different user, or to no user, empties
    /// the data so that nothing belonging to the previous user stays visible. Setting the user
    /// that is already active changes nothing.
    pub(crate) async fn set_user(&self, user_id: Option<UserId>) {
        let user_id = user_id.filter(|u| !u.is_empty());
        let mut data = self.inner.data.write().await;
        if data.user_id == user_id {
            return;
        }
        debug!(
            "Active user changed from {:?} to {:?}, clearing data",
            data.user_id, user_id
        );
        data.user_id = user_id;
        data.replace_transactions(Transactions::default());
        data.replace_summary(Summary::ZERO);
        // Results of loads started before the switch must not land under the new user.
        data.installed = self.inner.started.load(Ordering::SeqCst);
    }

    /// Hands out the generation number for a load that is about to start.
    pub(crate) fn begin_load(&self) -> u64 {
        self.inner.started.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Installs the result of the load numbered `generation`, made for `user_id`. Returns false,
    /// and changes nothing, when the result no longer applies: the active user has changed since,
    /// or `ordering` is `LatestStarted` and a newer load has already installed its result.
    pub(crate) async fn install(
        &self,
        user_id: &UserId,
        generation: u64,
        ordering: LoadOrdering,
        transactions: Transactions,
        summary: Summary,
    ) -> bool {
        let mut data = self.inner.data.write().await;
        if data.user_id.as_ref() != Some(user_id) {
            debug!("Discarding load {generation} for {user_id}, it is no longer the active user");
            return false;
        }
        if ordering == LoadOrdering::LatestStarted && generation < data.installed {
            debug!(
                "Discarding load {generation}, load {} has already been installed",
                data.installed
            );
            return false;
        }
        // Both halves are replaced under the same write lock, so no reader sees one without
        // the other.
        data.replace_transactions(transactions);
        data.replace_summary(summary);
        data.installed = data.installed.max(generation);
        true
    }

    /// Raises the flag for `kind` and returns a guard that clears it when dropped.
    pub(crate) fn flag_guard(&self, kind: LoadKind) -> FlagGuard {
        match kind {
            LoadKind::Explicit => self.set_loading(true),
            LoadKind::Refresh => self.set_refreshing(true),
            LoadKind::Background => {}
        }
        FlagGuard {
            store: self.clone(),
            kind,
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(None)
    }
}

/// How a load was triggered, which decides the flag it raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadKind {
    /// An explicit load raises the loading flag.
    Explicit,
    /// A user-triggered refresh raises the refreshing flag.
    Refresh,
    /// The reload after a delete raises nothing.
    Background,
}

/// Clears the loading flag, and the refreshing flag for a refresh, when dropped. This runs on
/// success, on failure, and when the load future is dropped mid-flight.
#[must_use]
pub(crate) struct FlagGuard {
    store: Store,
    kind: LoadKind,
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        if self.kind == LoadKind::Refresh {
            self.store.set_refreshing(false);
        }
        self.store.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transaction;

    fn one(id: &str) -> Transactions {
        Transactions::new(vec![Transaction::new(id, -20, "food")])
    }

    #[tokio::test]
    async fn test_new_store() {
        let store = Store::new(Some(UserId::from("u1")));
        let snap = store.snapshot().await;
        assert_eq!(snap.user_id().unwrap().as_str(), "u1");
        assert!(snap.transactions().is_empty());
        assert_eq!(*snap.summary(), Summary::ZERO);
        assert!(snap.is_loading());
        assert!(!snap.is_refreshing());
    }

    #[tokio::test]
    async fn test_empty_user_is_no_user() {
        let store = Store::new(Some(UserId::from("  ")));
        assert!(store.user_id().await.is_none());
    }

    /// Installs `transactions` with a matching summary for the active user.
    async fn install(store: &Store, transactions: Transactions, summary: Summary) -> bool {
        let user = store.user_id().await.unwrap();
        let generation = store.begin_load();
        store
            .install(&user, generation, LoadOrdering::LastWriteWins, transactions, summary)
            .await
    }

    #[tokio::test]
    async fn test_install_replaces_both() {
        let store = Store::new(Some(UserId::from("u1")));
        assert!(install(&store, one("a"), Summary::new(1, 1, 0)).await);
        assert!(install(&store, one("b"), Summary::new(2, 2, 0)).await);
        let snap = store.snapshot().await;
        assert_eq!(*snap.transactions(), one("b"));
        assert_eq!(*snap.summary(), Summary::new(2, 2, 0));
    }

    #[tokio::test]
    async fn test_set_user_clears_on_change_only() {
        let store = Store::new(Some(UserId::from("u1")));
        install(&store, one("a"), Summary::new(1, 1, 0)).await;

        store.set_user(Some(UserId::from("u1"))).await;
        assert_eq!(store.snapshot().await.transactions().len(), 1);

        store.set_user(Some(UserId::from("u2"))).await;
        assert!(store.snapshot().await.transactions().is_empty());
        assert_eq!(*store.snapshot().await.summary(), Summary::ZERO);

        install(&store, one("b"), Summary::new(1, 1, 0)).await;
        store.set_user(None).await;
        assert!(store.user_id().await.is_none());
        assert!(store.snapshot().await.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_install_rejects_other_user() {
        let store = Store::new(Some(UserId::from("u1")));
        let generation = store.begin_load();
        let applied = store
            .install(
                &UserId::from("u2"),
                generation,
                LoadOrdering::LastWriteWins,
                one("a"),
                Summary::new(1, 1, 0),
            )
            .await;
        assert!(!applied);
        assert!(store.snapshot().await.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_install_ordering() {
        let user = UserId::from("u1");
        let store = Store::new(Some(user.clone()));
        let older = store.begin_load();
        let newer = store.begin_load();

        assert!(
            store
                .install(&user, newer, LoadOrdering::LatestStarted, one("new"), Summary::ZERO)
                .await
        );
        assert!(
            !store
                .install(&user, older, LoadOrdering::LatestStarted, one("old"), Summary::ZERO)
                .await
        );
        assert_eq!(*store.snapshot().await.transactions(), one("new"));

        // Last write wins lets the older result through.
        assert!(
            store
                .install(&user, older, LoadOrdering::LastWriteWins, one("old"), Summary::ZERO)
                .await
        );
        assert_eq!(*store.snapshot().await.transactions(), one("old"));
    }

    #[tokio::test]
    async fn test_flag_guard() {
        let store = Store::default();
        store.set_loading(false);

        let guard = store.flag_guard(LoadKind::Explicit);
        assert!(store.is_loading());
        drop(guard);
        assert!(!store.is_loading());

        let guard = store.flag_guard(LoadKind::Refresh);
        assert!(store.is_refreshing());
        assert!(!store.is_loading());
        drop(guard);
        assert!(!store.is_refreshing());

        store.set_loading(true);
        let guard = store.flag_guard(LoadKind::Background);
        drop(guard);
        assert!(!store.is_loading());
    }
}
