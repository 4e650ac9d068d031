//! Mirror sync behavior against an in-memory document store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::timeout;

use rande_core::Collection;
use rande_core::error::{RandeError, RandeResult};
use rande_core::mirror::{MirrorSync, SyncEvent, SyncStatus};
use rande_core::remote::{DocumentStore, RemoteDocument};
use rande_core::store::LocalStore;

#[derive(Default)]
struct MemoryStoreInner {
    documents: HashMap<Collection, RemoteDocument>,
    get_calls: usize,
    set_calls: usize,
    watch_calls: usize,
    watch_senders: HashMap<Collection, mpsc::Sender<RemoteDocument>>,
}

/// In-memory stand-in for a remote document store, with call counters and
/// a handle for injecting subscription changes.
#[derive(Clone, Default)]
struct MemoryStore(Arc<Mutex<MemoryStoreInner>>);

impl MemoryStore {
    fn with_document(self, collection: Collection, document: RemoteDocument) -> Self {
        self.0
            .lock()
            .unwrap()
            .documents
            .insert(collection, document);
        self
    }

    fn document(&self, collection: Collection) -> Option<RemoteDocument> {
        self.0.lock().unwrap().documents.get(&collection).cloned()
    }

    fn counts(&self) -> (usize, usize, usize) {
        let inner = self.0.lock().unwrap();
        (inner.get_calls, inner.set_calls, inner.watch_calls)
    }

    /// Deliver a change on the collection's subscription, as the remote
    /// store would after any write.
    async fn notify(&self, collection: Collection, document: RemoteDocument) {
        let sender = self
            .0
            .lock()
            .unwrap()
            .watch_senders
            .get(&collection)
            .cloned()
            .expect("no active watch for collection");
        sender.send(document).await.unwrap();
    }
}

impl DocumentStore for MemoryStore {
    async fn connect(&self) -> RandeResult<()> {
        Ok(())
    }

    async fn get(&self, collection: Collection) -> RandeResult<Option<RemoteDocument>> {
        let mut inner = self.0.lock().unwrap();
        inner.get_calls += 1;
        Ok(inner.documents.get(&collection).cloned())
    }

    async fn set(&self, collection: Collection, document: RemoteDocument) -> RandeResult<()> {
        let mut inner = self.0.lock().unwrap();
        inner.set_calls += 1;
        inner.documents.insert(collection, document);
        Ok(())
    }

    async fn watch(&self, collection: Collection) -> RandeResult<mpsc::Receiver<RemoteDocument>> {
        let (tx, rx) = mpsc::channel(8);
        let mut inner = self.0.lock().unwrap();
        inner.watch_calls += 1;
        inner.watch_senders.insert(collection, tx);
        Ok(rx)
    }
}

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[tokio::test]
async fn enable_twice_reconciles_and_subscribes_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    let remote = MemoryStore::default();

    let mut mirror = MirrorSync::new(store, Some(remote.clone()));
    mirror.enable().await.unwrap();
    assert_eq!(mirror.status(), SyncStatus::Enabled);

    // One get, one first-contact push and one watch per collection
    assert_eq!(remote.counts(), (3, 3, 3));

    mirror.enable().await.unwrap();
    assert_eq!(remote.counts(), (3, 3, 3));
    assert_eq!(mirror.status(), SyncStatus::Enabled);
}

#[tokio::test]
async fn enable_without_remote_fails_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let mut mirror: MirrorSync<MemoryStore> = MirrorSync::new(store, None);
    match mirror.enable().await {
        Err(RandeError::Config(_)) => {}
        other => panic!("expected Config error, got {other:?}"),
    }
    assert_eq!(mirror.status(), SyncStatus::Starting);
}

#[tokio::test]
async fn reconciliation_pulls_when_remote_is_newer() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    store.record_synced_at(Collection::Events, t(1_000)).unwrap();

    let remote_items = vec![json!({"id": 1, "title": "A"})];
    let remote = MemoryStore::default().with_document(
        Collection::Events,
        RemoteDocument {
            items: remote_items.clone(),
            updated_at: t(2_000),
        },
    );

    let mut mirror = MirrorSync::new(store.clone(), Some(remote));
    mirror.enable().await.unwrap();

    let local: Vec<Value> = store.load(Collection::Events);
    assert_eq!(local, remote_items);
}

#[tokio::test]
async fn reconciliation_pulls_when_no_marker_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let remote_items = vec![json!({"id": 1, "title": "A"})];
    let remote = MemoryStore::default().with_document(
        Collection::Events,
        RemoteDocument {
            items: remote_items.clone(),
            updated_at: t(1),
        },
    );

    let mut mirror = MirrorSync::new(store.clone(), Some(remote));
    mirror.enable().await.unwrap();

    let local: Vec<Value> = store.load(Collection::Events);
    assert_eq!(local, remote_items);
}

#[tokio::test]
async fn reconciliation_pushes_when_remote_document_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    let local_items = vec![json!({"id": 1, "title": "A"})];
    store.save(Collection::Events, &local_items).unwrap();

    let remote = MemoryStore::default();
    let before = Utc::now();

    let mut mirror = MirrorSync::new(store, Some(remote.clone()));
    mirror.enable().await.unwrap();

    let document = remote.document(Collection::Events).unwrap();
    assert_eq!(document.items, local_items);
    assert!(document.updated_at >= before);
}

#[tokio::test]
async fn reconciliation_does_nothing_when_remote_is_not_newer() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    // Marker equal to the remote updatedAt: neither side moves.
    store.record_synced_at(Collection::Events, t(5_000)).unwrap();
    let local_items = vec![json!({"id": 1, "title": "A"})];
    store.save(Collection::Events, &local_items).unwrap();

    let remote_items = vec![json!({"id": 2, "title": "B"})];
    let remote = MemoryStore::default().with_document(
        Collection::Events,
        RemoteDocument {
            items: remote_items.clone(),
            updated_at: t(5_000),
        },
    );

    let mut mirror = MirrorSync::new(store.clone(), Some(remote.clone()));
    mirror.enable().await.unwrap();

    let local: Vec<Value> = store.load(Collection::Events);
    assert_eq!(local, local_items, "no pull may happen");
    assert_eq!(
        remote.document(Collection::Events).unwrap().items,
        remote_items,
        "no push may happen"
    );
}

#[tokio::test]
async fn enable_advances_all_markers() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    let before = Utc::now();

    let mut mirror = MirrorSync::new(store.clone(), Some(MemoryStore::default()));
    mirror.enable().await.unwrap();

    for collection in Collection::ALL {
        let marker = store.last_synced_at(collection).unwrap();
        assert!(marker >= before);
    }
}

#[tokio::test]
async fn subscription_overwrites_local_slot_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    store
        .save(Collection::Papers, &[json!({"id": 1, "title": "old"})])
        .unwrap();

    let remote = MemoryStore::default();
    let mut mirror = MirrorSync::new(store.clone(), Some(remote.clone()));
    mirror.enable().await.unwrap();

    let mut events = mirror.subscribe();
    let new_items = vec![json!({"id": 2, "title": "X"}), json!({"id": 3, "title": "Y"})];
    remote
        .notify(Collection::Papers, RemoteDocument::now(new_items.clone()))
        .await;

    let event = timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("no notification arrived")
        .unwrap();
    assert_eq!(event, SyncEvent::Updated(Collection::Papers));

    let local: Vec<Value> = store.load(Collection::Papers);
    assert_eq!(local, new_items);
}

#[tokio::test]
async fn disable_stops_applying_remote_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let remote = MemoryStore::default();
    let mut mirror = MirrorSync::new(store.clone(), Some(remote.clone()));
    let mut events = mirror.subscribe();
    mirror.enable().await.unwrap();
    mirror.disable();
    assert_eq!(mirror.status(), SyncStatus::Disabled);

    // Watchers are gone; a late change must not be applied.
    let late = vec![json!({"id": 9})];
    let sender = remote
        .0
        .lock()
        .unwrap()
        .watch_senders
        .get(&Collection::Events)
        .cloned()
        .unwrap();
    let _ = sender.send(RemoteDocument::now(late)).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    let local: Vec<Value> = store.load(Collection::Events);
    assert!(local.is_empty());

    // Status events were emitted in lifecycle order
    let mut statuses = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SyncEvent::Status(status) = event {
            statuses.push(status);
        }
    }
    assert_eq!(
        statuses,
        vec![SyncStatus::Starting, SyncStatus::Enabled, SyncStatus::Disabled]
    );
}

#[tokio::test]
async fn push_overwrites_the_remote_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let remote = MemoryStore::default().with_document(
        Collection::Notes,
        RemoteDocument {
            items: vec![json!({"id": 1})],
            updated_at: t(1_000),
        },
    );

    let mirror = MirrorSync::new(store, Some(remote.clone()));
    let items = vec![json!({"id": 2}), json!({"id": 3})];
    mirror.push(Collection::Notes, items.clone()).await.unwrap();

    let document = remote.document(Collection::Notes).unwrap();
    assert_eq!(document.items, items);
    assert!(document.updated_at > t(1_000));
}

#[tokio::test]
async fn push_without_remote_fails_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let mirror: MirrorSync<MemoryStore> = MirrorSync::new(store, None);
    assert!(matches!(
        mirror.push(Collection::Notes, Vec::new()).await,
        Err(RandeError::Config(_))
    ));
}

#[tokio::test]
async fn disable_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let mut mirror: MirrorSync<MemoryStore> = MirrorSync::new(store, None);
    mirror.disable();
    mirror.disable();
    assert_eq!(mirror.status(), SyncStatus::Disabled);
}
