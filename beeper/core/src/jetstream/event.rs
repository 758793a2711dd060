//! Jetstream Wire Events
//!
//! Each websocket text frame is one JSON event. Only commit events carry a
//! collection; identity and account events are position markers as far as
//! the dashboard is concerned.

use serde::{Deserialize, Serialize};

/// Top-level event kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Commit,
    Identity,
    Account,
    /// Kinds added to the stream after this client was written
    #[serde(other)]
    Unknown,
}

/// Repository operation carried by a commit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOperation {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

/// A record-level change in one repository
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub rev: String,
    pub operation: CommitOperation,
    /// Record type namespace, e.g. `org.xcvr.lrc.message`
    pub collection: String,
    #[serde(default)]
    pub rkey: String,
    /// Record body (absent on deletes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
}

/// One event from the stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JetstreamEvent {
    /// Author DID
    pub did: String,
    /// Stream position in microseconds since the Unix epoch
    pub time_us: i64,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<Commit>,
}

impl JetstreamEvent {
    /// Decode one text frame
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Collection of the commit payload, if there is one
    pub fn collection(&self) -> Option<&str> {
        self.commit.as_ref().map(|c| c.collection.as_str())
    }
}
