//! Collection Allow-List
//!
//! The set of record types the dashboard reacts to. The same list is sent
//! to the server in the subscription query and re-checked on every event
//! before it reaches the handler.

use serde::{Deserialize, Serialize};

/// Collections watched by default: profile, channel, message, signet
pub const DEFAULT_COLLECTIONS: [&str; 4] = [
    "org.xcvr.actor.profile",
    "org.xcvr.feed.channel",
    "org.xcvr.lrc.message",
    "org.xcvr.lrc.signet",
];

/// Allowed collection names.
///
/// Entries are exact NSIDs or `prefix.*` wildcards, the same syntax the
/// event source accepts in `wantedCollections`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WantedCollections(Vec<String>);

impl Default for WantedCollections {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTIONS)
    }
}

impl WantedCollections {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(Into::into).collect())
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Does `collection` pass the filter?
    ///
    /// An empty list passes nothing; the server treats an empty list as
    /// "everything", which is never what a notifier wants.
    pub fn matches(&self, collection: &str) -> bool {
        self.0.iter().any(|entry| match entry.strip_suffix(".*") {
            Some(prefix) => collection
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.')),
            None => entry == collection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_watches_four_collections() {
        let wanted = WantedCollections::default();
        assert_eq!(wanted.entries().len(), 4);
        for collection in DEFAULT_COLLECTIONS {
            assert!(wanted.matches(collection));
        }
    }

    #[test]
    fn test_exact_match_only() {
        let wanted = WantedCollections::default();
        assert!(!wanted.matches("app.bsky.feed.post"));
        assert!(!wanted.matches("org.xcvr.lrc"));
        assert!(!wanted.matches("org.xcvr.lrc.message.extra"));
        assert!(!wanted.matches(""));
    }

    #[test]
    fn test_wildcard_prefix() {
        let wanted = WantedCollections::new(["org.xcvr.lrc.*"]);
        assert!(wanted.matches("org.xcvr.lrc.message"));
        assert!(wanted.matches("org.xcvr.lrc.signet"));
        assert!(!wanted.matches("org.xcvr.lrcx.message"));
        assert!(!wanted.matches("org.xcvr.lrc"));
        assert!(!wanted.matches("org.xcvr.feed.channel"));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let wanted = WantedCollections::new(Vec::<String>::new());
        assert!(wanted.is_empty());
        assert!(!wanted.matches("org.xcvr.lrc.message"));
    }
}
