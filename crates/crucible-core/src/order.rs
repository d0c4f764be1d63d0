//! Ordering directives for contributed extensions.
//!
//! Every extension entry carries a [`LoadingOrder`] telling the resolver where
//! the entry wants to sit relative to its siblings: anywhere, pinned first,
//! pinned last, or before/after a named peer.
//!
//! # Textual grammar
//!
//! Descriptor documents carry the directive as a plain string, consumed via
//! [`LoadingOrder::parse`]:
//!
//! - `FIRST`, `LAST`, `ANY` — case-insensitive literals.
//! - `BEFORE:<peerId>` / `AFTER:<peerId>` — case-insensitive prefix; the peer
//!   id is the remainder of the string, taken verbatim.
//! - Anything else (including an absent value) defaults to `ANY`.

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

// ─── LoadingOrder ─────────────────────────────────────────────────────────────

/// Where an extension entry wants to be placed within its extension point.
///
/// At most one entry per point may be `First` and at most one `Last`; the
/// resolver rejects a second of either as an ordering conflict. `Before` and
/// `After` reference a peer by the identifier the peer registered under; a
/// reference to an id nobody carries is tolerated and behaves like `Any`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadingOrder {
    /// No constraint; keeps its relative registration order.
    #[default]
    Any,
    /// Pinned to the front of the resolved sequence.
    First,
    /// Pinned to the back of the resolved sequence.
    Last,
    /// Placed somewhere before the entry whose own id matches.
    Before(Arc<str>),
    /// Placed somewhere after the entry whose own id matches.
    After(Arc<str>),
}

impl LoadingOrder {
    /// Parses a descriptor-supplied directive string.
    ///
    /// Never fails: unrecognised or absent input is [`LoadingOrder::Any`].
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return LoadingOrder::Any;
        };
        if raw.eq_ignore_ascii_case("first") {
            LoadingOrder::First
        } else if raw.eq_ignore_ascii_case("last") {
            LoadingOrder::Last
        } else if raw.eq_ignore_ascii_case("any") {
            LoadingOrder::Any
        } else if let Some(peer) = strip_prefix_ignore_case(raw, "before:") {
            LoadingOrder::Before(Arc::from(peer))
        } else if let Some(peer) = strip_prefix_ignore_case(raw, "after:") {
            LoadingOrder::After(Arc::from(peer))
        } else {
            LoadingOrder::Any
        }
    }

    /// Convenience constructor for `Before(peer)`.
    pub fn before(peer: &str) -> Self {
        LoadingOrder::Before(Arc::from(peer))
    }

    /// Convenience constructor for `After(peer)`.
    pub fn after(peer: &str) -> Self {
        LoadingOrder::After(Arc::from(peer))
    }

    /// Returns the referenced peer id for `Before`/`After` directives.
    pub fn peer(&self) -> Option<&str> {
        match self {
            LoadingOrder::Before(peer) | LoadingOrder::After(peer) => Some(peer),
            _ => None,
        }
    }

    /// Returns `true` for the unconstrained directive.
    pub fn is_any(&self) -> bool {
        matches!(self, LoadingOrder::Any)
    }
}

fn strip_prefix_ignore_case<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    if raw.len() >= prefix.len() && raw[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&raw[prefix.len()..])
    } else {
        None
    }
}

impl fmt::Display for LoadingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingOrder::Any => f.write_str("any"),
            LoadingOrder::First => f.write_str("first"),
            LoadingOrder::Last => f.write_str("last"),
            LoadingOrder::Before(peer) => write!(f, "before:{peer}"),
            LoadingOrder::After(peer) => write!(f, "after:{peer}"),
        }
    }
}

// Serialized through the textual grammar, so descriptor documents and the
// in-memory representation round-trip through the same parse function.
impl Serialize for LoadingOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LoadingOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LoadingOrder::parse(Some(&raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive_literals() {
        assert_eq!(LoadingOrder::parse(Some("FIRST")), LoadingOrder::First);
        assert_eq!(LoadingOrder::parse(Some("first")), LoadingOrder::First);
        assert_eq!(LoadingOrder::parse(Some("Last")), LoadingOrder::Last);
        assert_eq!(LoadingOrder::parse(Some("aNy")), LoadingOrder::Any);
    }

    #[test]
    fn parses_prefix_forms_keeping_remainder_verbatim() {
        assert_eq!(
            LoadingOrder::parse(Some("BEFORE:com.example.other")),
            LoadingOrder::before("com.example.other")
        );
        assert_eq!(
            LoadingOrder::parse(Some("After:Mixed.Case.Id")),
            LoadingOrder::after("Mixed.Case.Id")
        );
        // The peer id is the untrimmed remainder.
        assert_eq!(
            LoadingOrder::parse(Some("before: spaced")),
            LoadingOrder::before(" spaced")
        );
    }

    #[test]
    fn anything_else_defaults_to_any() {
        assert_eq!(LoadingOrder::parse(None), LoadingOrder::Any);
        assert_eq!(LoadingOrder::parse(Some("")), LoadingOrder::Any);
        assert_eq!(LoadingOrder::parse(Some("sideways")), LoadingOrder::Any);
        assert_eq!(LoadingOrder::parse(Some("before")), LoadingOrder::Any);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for order in [
            LoadingOrder::Any,
            LoadingOrder::First,
            LoadingOrder::Last,
            LoadingOrder::before("a.b"),
            LoadingOrder::after("c.d"),
        ] {
            let text = order.to_string();
            assert_eq!(LoadingOrder::parse(Some(&text)), order);
        }
    }

    #[test]
    fn serde_uses_the_textual_grammar() {
        let json = serde_json::to_string(&LoadingOrder::before("x.y")).unwrap();
        assert_eq!(json, "\"before:x.y\"");
        let back: LoadingOrder = serde_json::from_str("\"AFTER:peer\"").unwrap();
        assert_eq!(back, LoadingOrder::after("peer"));
        let any: LoadingOrder = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(any, LoadingOrder::Any);
    }
}
