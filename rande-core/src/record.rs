//! Record types for the three collections.
//!
//! Field names serialize in camelCase so documents round-trip against a
//! mirror that older clients wrote to.

use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{RandeError, RandeResult};

/// Record identifier: milliseconds since the Unix epoch at creation time.
///
/// Wall-clock derived, unique within a collection and monotonically
/// increasing in practice. Serialized as a bare integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

impl RecordId {
    /// Assign a fresh id from the current wall clock.
    ///
    /// Two records created within the same millisecond must not share an
    /// id, so the second one is bumped past the first.
    pub fn now() -> Self {
        let clock = Utc::now().timestamp_millis();
        let mut last = LAST_ISSUED.load(Ordering::Relaxed);
        loop {
            let candidate = clock.max(last + 1);
            match LAST_ISSUED.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return RecordId(candidate),
                Err(actual) => last = actual,
            }
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(RecordId)
    }
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    /// Calendar day; events carry no time component.
    pub date: NaiveDate,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A dated research note owned by one researcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub user_id: i64,
    /// Denormalized display name of the owning researcher.
    pub user_name: String,
    /// Week label, e.g. "23".
    pub week: String,
    pub research_content: String,
    pub results: String,
    pub next_plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A paper library entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: RecordId,
    pub title: String,
    pub authors: Option<String>,
    pub year: Option<i32>,
    pub journal: Option<String>,
    pub description: Option<String>,
    /// Attached file, if one was uploaded.
    pub file: Option<Attachment>,
    /// External link to the paper.
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A file attached to a paper: original name plus base64-encoded bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub data: String,
}

impl Attachment {
    /// Largest accepted file, measured before encoding.
    pub const MAX_SIZE: u64 = 10 * 1024 * 1024;

    /// Encode file bytes into an attachment, rejecting oversized files.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> RandeResult<Self> {
        if bytes.len() as u64 > Self::MAX_SIZE {
            return Err(RandeError::AttachmentTooLarge(bytes.len() as u64));
        }
        Ok(Attachment {
            name: name.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Decode the payload back into the original file bytes.
    pub fn decode(&self) -> RandeResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| RandeError::Serialization(format!("attachment payload: {e}")))
    }
}

/// A researcher who can own notes. The set comes from configuration; the
/// current selection is session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Researcher {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_within_a_burst() {
        let ids: Vec<RecordId> = (0..100).map(|_| RecordId::now()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn attachment_rejects_oversized_files() {
        let bytes = vec![0u8; (Attachment::MAX_SIZE + 1) as usize];
        match Attachment::from_bytes("big.pdf", &bytes) {
            Err(RandeError::AttachmentTooLarge(size)) => {
                assert_eq!(size, Attachment::MAX_SIZE + 1)
            }
            other => panic!("expected AttachmentTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn attachment_decodes_to_original_bytes() {
        let attachment = Attachment {
            name: "hello.txt".to_string(),
            data: "aGVsbG8=".to_string(),
        };
        assert_eq!(attachment.decode().unwrap(), b"hello");
    }

    #[test]
    fn note_serializes_with_wire_field_names() {
        let now = Utc::now();
        let note = Note {
            id: RecordId(1_700_000_000_000),
            user_id: 1,
            user_name: "Jane".to_string(),
            week: "23".to_string(),
            research_content: "content".to_string(),
            results: "results".to_string(),
            next_plan: "plan".to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], 1_700_000_000_000i64);
        assert!(json.get("researchContent").is_some());
        assert!(json.get("nextPlan").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("research_content").is_none());
    }
}
