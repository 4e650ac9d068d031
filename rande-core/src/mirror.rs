//! Best-effort replication of the three collections to a remote document
//! store.
//!
//! Local state stays authoritative: the mirror never blocks a local write
//! and never rolls one back. While enabled, remote changes overwrite the
//! local slots unconditionally (last writer wins; no merge is attempted).

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::collection::Collection;
use crate::error::{RandeError, RandeResult};
use crate::remote::{DocumentStore, RemoteDocument};
use crate::store::LocalStore;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Mirror lifecycle status. Only `Enabled` holds live subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Disabled,
    Starting,
    Enabled,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SyncStatus::Disabled => "disabled",
            SyncStatus::Starting => "starting",
            SyncStatus::Enabled => "enabled",
        };
        write!(f, "{name}")
    }
}

/// Notifications emitted for external observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The mirror transitioned lifecycle phase.
    Status(SyncStatus),
    /// A collection's local slot was overwritten from the remote store;
    /// dependent views should re-render it.
    Updated(Collection),
}

/// Overwrite the remote document for a collection with the given items,
/// stamped with the current time. Never retried.
pub async fn push_items<S: DocumentStore>(
    remote: &S,
    collection: Collection,
    items: Vec<Value>,
) -> RandeResult<()> {
    remote
        .set(collection, RemoteDocument::now(items))
        .await
        .map_err(|e| RandeError::RemoteWrite {
            collection,
            message: e.to_string(),
        })
}

/// The mirror sync component.
///
/// Lifecycle: `Disabled -> Starting -> Enabled`, and back to `Disabled`
/// via [`MirrorSync::disable`]. `enable` while already enabled is a no-op.
pub struct MirrorSync<S> {
    store: LocalStore,
    remote: Option<S>,
    state: SyncStatus,
    watchers: Vec<JoinHandle<()>>,
    events: broadcast::Sender<SyncEvent>,
}

impl<S: DocumentStore> MirrorSync<S> {
    pub fn new(store: LocalStore, remote: Option<S>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        MirrorSync {
            store,
            remote,
            state: SyncStatus::Disabled,
            watchers: Vec::new(),
            events,
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.state
    }

    /// Subscribe to status and updated-collection notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SyncEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    /// Connect to the remote store, reconcile each collection, then keep
    /// the local slots overwritten from the remote until [`disable`].
    ///
    /// Any remote failure aborts enabling and leaves the mirror in
    /// `Starting`; no subscription applies until `Enabled` is reached.
    ///
    /// [`disable`]: MirrorSync::disable
    pub async fn enable(&mut self) -> RandeResult<()> {
        if self.state == SyncStatus::Enabled {
            return Ok(());
        }
        self.state = SyncStatus::Starting;
        self.emit(SyncEvent::Status(SyncStatus::Starting));

        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| RandeError::Config("no remote store configured".into()))?;

        remote
            .connect()
            .await
            .map_err(|e| RandeError::RemoteUnavailable(e.to_string()))?;

        for collection in Collection::ALL {
            self.reconcile(remote, collection).await?;
        }

        // Mark all three collections as reconciled now, regardless of
        // which branch each one took.
        let now = Utc::now();
        for collection in Collection::ALL {
            self.store.record_synced_at(collection, now)?;
        }

        for collection in Collection::ALL {
            let changes = remote.watch(collection).await?;
            self.watchers.push(spawn_watcher(
                self.store.clone(),
                collection,
                changes,
                self.events.clone(),
            ));
        }

        self.state = SyncStatus::Enabled;
        self.emit(SyncEvent::Status(SyncStatus::Enabled));
        Ok(())
    }

    /// Compare the remote document against the local last-synced-at marker:
    /// pull if the remote is strictly newer, push if the remote was never
    /// written, otherwise leave both sides alone.
    async fn reconcile(&self, remote: &S, collection: Collection) -> RandeResult<()> {
        let marker = self
            .store
            .last_synced_at(collection)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let document = remote
            .get(collection)
            .await
            .map_err(|e| RandeError::RemoteUnavailable(e.to_string()))?;

        match document {
            Some(doc) if doc.updated_at > marker => {
                self.store.save(collection, &doc.items)?;
            }
            // Remote exists but is not newer than the marker: no pull, no
            // push. Local edits made since the marker are not propagated
            // here; steady-state saves push them.
            Some(_) => {}
            None => {
                let items: Vec<Value> = self.store.load(collection);
                push_items(remote, collection, items).await?;
            }
        }
        Ok(())
    }

    /// Overwrite the remote document for a collection. Fails with
    /// `RemoteWrite`; the local slot is untouched either way.
    pub async fn push(&self, collection: Collection, items: Vec<Value>) -> RandeResult<()> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| RandeError::Config("no remote store configured".into()))?;
        push_items(remote, collection, items).await
    }

    /// Stop applying remote changes and transition to `Disabled`.
    ///
    /// Idempotent. Only future subscription callbacks are stopped; an
    /// in-flight `enable` on another task is not cancelled.
    pub fn disable(&mut self) {
        for watcher in self.watchers.drain(..) {
            watcher.abort();
        }
        self.state = SyncStatus::Disabled;
        self.emit(SyncEvent::Status(SyncStatus::Disabled));
    }
}

/// Apply remote change notifications to the local slot until the channel
/// closes or the task is aborted by `disable`.
fn spawn_watcher(
    store: LocalStore,
    collection: Collection,
    mut changes: mpsc::Receiver<RemoteDocument>,
    events: broadcast::Sender<SyncEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(document) = changes.recv().await {
            if let Err(e) = store.save(collection, &document.items) {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "failed to apply remote update"
                );
                continue;
            }
            let _ = events.send(SyncEvent::Updated(collection));
        }
    })
}
