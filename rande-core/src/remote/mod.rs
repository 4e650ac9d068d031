//! Remote document store access.

pub mod protocol;
pub mod provider;

pub use protocol::{DocumentChange, RemoteDocument};
pub use provider::{Provider, ProviderStore};

use tokio::sync::mpsc;

use crate::collection::Collection;
use crate::error::RandeResult;

/// Contract required of the remote document store: point read,
/// full-document write, and change subscription, per collection.
///
/// Production uses `ProviderStore`; tests substitute an in-memory store.
pub trait DocumentStore {
    /// Establish/verify the connection. Called once before reconciliation.
    async fn connect(&self) -> RandeResult<()>;

    /// Read the collection's document, or `None` if it was never written.
    async fn get(&self, collection: Collection) -> RandeResult<Option<RemoteDocument>>;

    /// Create-or-replace the collection's document.
    async fn set(&self, collection: Collection, document: RemoteDocument) -> RandeResult<()>;

    /// Open a continuous subscription. Every write to the collection's
    /// document (including our own) is delivered on the returned channel.
    async fn watch(&self, collection: Collection) -> RandeResult<mpsc::Receiver<RemoteDocument>>;
}
