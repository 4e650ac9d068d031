//! Defines the JSON protocol used for communication between rande and
//! document-store provider binaries over stdin/stdout.
//!
//! The protocol is language-agnostic: any executable that speaks it can
//! serve as a remote document store. Providers manage their own
//! credentials; rande just passes provider-specific parameters through
//! from the `[remote]` config table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::collection::Collection;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Connect,
    GetDocument,
    SetDocument,
    Watch,
}

/// Request sent from rande to the provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the provider to rande.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap()
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap()
    }
}

/// One mirrored document: the full record sequence for a collection plus
/// the timestamp of the write that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub items: Vec<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl RemoteDocument {
    /// A document stamped with the current wall-clock time.
    pub fn now(items: Vec<serde_json::Value>) -> Self {
        RemoteDocument {
            items,
            updated_at: Utc::now(),
        }
    }
}

/// Verify the provider can reach the remote store with the given params.
#[derive(Debug, Serialize, Deserialize)]
pub struct Connect {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for Connect {
    type Response = ();
    fn command() -> Command {
        Command::Connect
    }
}

/// Point read of one collection's document.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetDocument {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub collection: Collection,
}

impl ProviderCommand for GetDocument {
    type Response = Option<RemoteDocument>;
    fn command() -> Command {
        Command::GetDocument
    }
}

/// Create-or-replace write of one collection's document.
#[derive(Debug, Serialize, Deserialize)]
pub struct SetDocument {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub collection: Collection,
    pub document: RemoteDocument,
}

impl ProviderCommand for SetDocument {
    type Response = ();
    fn command() -> Command {
        Command::SetDocument
    }
}

/// Open a long-lived subscription to one collection's document.
///
/// Unlike the one-shot commands, the provider process stays alive and
/// emits one `DocumentChange` JSON object per stdout line for every write
/// to the document (including the subscriber's own writes), until killed.
#[derive(Debug, Serialize, Deserialize)]
pub struct Watch {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub collection: Collection,
}

/// A change notification emitted on the watch stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChange {
    pub collection: Collection,
    pub document: RemoteDocument,
}
