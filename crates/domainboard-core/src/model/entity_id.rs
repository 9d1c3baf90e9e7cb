// ── Core identity types ──
//
// EntityId and DomainName form the foundation of every listing type.
// EntityId hides whether the server sent a string or numeric id;
// DomainName carries the normalized natural key used by search.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use domainboard_api::WireId;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for any listing or ticket.
///
/// Stored in its textual form so `7` from the wire and `"7"` typed on a
/// command line compare equal.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s.trim().to_owned())
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_owned())
    }
}

impl From<&WireId> for EntityId {
    fn from(id: &WireId) -> Self {
        Self(id.to_string())
    }
}

// ── DomainName ──────────────────────────────────────────────────────

/// Strip scheme and trailing slash from a user- or file-supplied name.
///
/// Trims whitespace, removes a leading `https://` or `http://` (exact,
/// case-sensitive prefix) and a trailing `/`, repeating until nothing
/// changes so the result is a fixed point.
pub fn normalize_domain_name(raw: &str) -> String {
    let mut current = raw;
    loop {
        let mut next = current.trim();
        if let Some(rest) = next.strip_prefix("https://") {
            next = rest;
        } else if let Some(rest) = next.strip_prefix("http://") {
            next = rest;
        }
        if let Some(rest) = next.strip_suffix('/') {
            next = rest;
        }
        if next == current {
            return next.to_owned();
        }
        current = next;
    }
}

/// A listing's domain name, normalized on construction.
///
/// Display keeps the original casing; [`key`](Self::key) gives the
/// case-insensitive form used for equality lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_domain_name(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased lookup key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive equality with another (already normalized) name.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids_compare_by_text() {
        let wire = EntityId::from(&WireId::Number(7));
        let typed: EntityId = "7".parse().unwrap();
        assert_eq!(wire, typed);
    }

    #[test]
    fn default_id_is_empty() {
        assert!(EntityId::default().is_empty());
        assert_eq!(EntityId::default(), EntityId::from("  "));
    }

    #[test]
    fn normalization_strips_scheme_and_slash() {
        assert_eq!(normalize_domain_name("  https://Example.com/ "), "Example.com");
        assert_eq!(normalize_domain_name("http://shop.io"), "shop.io");
        assert_eq!(normalize_domain_name("news.org/"), "news.org");
        assert_eq!(normalize_domain_name(""), "");
    }

    #[test]
    fn normalization_prefix_is_case_sensitive() {
        assert_eq!(normalize_domain_name("HTTPS://a.com"), "HTTPS://a.com");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "https://a.com/",
            "http://https://a.com//",
            " https:// b.com / ",
            "https://",
            "/",
            "plain.net",
            "http://x.org/path/",
        ];
        for raw in samples {
            let once = normalize_domain_name(raw);
            assert_eq!(normalize_domain_name(&once), once, "not a fixed point for {raw:?}");
        }
    }

    #[test]
    fn domain_name_matches_ignoring_case() {
        let name = DomainName::new("https://Example.com/");
        assert_eq!(name.as_str(), "Example.com");
        assert!(name.matches("example.COM"));
        assert_eq!(name.key(), "example.com");
    }
}
