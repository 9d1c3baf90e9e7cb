// ── Cross-reference lookups ──
//
// Same-panel grouping and bulk search by pasted or uploaded lists.
// Both are pure over an in-memory listing set.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Domain, normalize_domain_name};

/// Lines processed between cooperative yields in the chunked search.
const SEARCH_CHUNK: usize = 10;

// ── Same-panel grouping ─────────────────────────────────────────────

/// Every other listing hosted behind the exact same panel credentials.
///
/// Fails with [`CoreError::IncompletePanel`] when the source lacks any of
/// link, username or password. No matches is an empty `Vec`.
pub fn same_panel<'a>(source: &Domain, all: &'a [Domain]) -> Result<Vec<&'a Domain>, CoreError> {
    if !source.has_panel_access() {
        return Err(CoreError::IncompletePanel {
            domain: source.domain_name.to_string(),
        });
    }
    let matches: Vec<&Domain> = all
        .iter()
        .filter(|d| {
            d.id != source.id
                && d.panel_link == source.panel_link
                && d.panel_username == source.panel_username
                && d.panel_password == source.panel_password
        })
        .collect();
    debug!(domain = %source.domain_name, matches = matches.len(), "same-panel lookup");
    Ok(matches)
}

// ── Bulk search ─────────────────────────────────────────────────────

/// One searched line and what it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRow {
    /// The normalized input line.
    pub input: String,
    pub found: bool,
    pub domain: Option<Domain>,
}

/// Outcome of a bulk search. `found + not_found == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub rows: Vec<SearchRow>,
}

impl SearchReport {
    fn push(&mut self, row: SearchRow) {
        self.total += 1;
        if row.found {
            self.found += 1;
        } else {
            self.not_found += 1;
        }
        self.rows.push(row);
    }

    pub fn found_rows(&self) -> impl Iterator<Item = &SearchRow> {
        self.rows.iter().filter(|r| r.found)
    }

    pub fn missing_rows(&self) -> impl Iterator<Item = &SearchRow> {
        self.rows.iter().filter(|r| !r.found)
    }
}

/// Normalized, non-empty search terms in input order.
pub fn search_terms(input: &str) -> Vec<String> {
    input
        .lines()
        .map(normalize_domain_name)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Lowercased name → first listing with that name.
fn name_index(all: &[Domain]) -> HashMap<String, &Domain> {
    let mut index = HashMap::with_capacity(all.len());
    for d in all {
        index.entry(d.domain_name.key()).or_insert(d);
    }
    index
}

fn resolve(index: &HashMap<String, &Domain>, term: String) -> SearchRow {
    let domain = index.get(&term.to_lowercase()).map(|d| (*d).clone());
    SearchRow {
        input: term,
        found: domain.is_some(),
        domain,
    }
}

/// Match each input line exactly (ignoring case) against listing names.
pub fn bulk_search(input: &str, all: &[Domain]) -> SearchReport {
    let index = name_index(all);
    let mut report = SearchReport::default();
    for term in search_terms(input) {
        report.push(resolve(&index, term));
    }
    debug!(
        total = report.total,
        found = report.found,
        "bulk search complete"
    );
    report
}

/// Same result as [`bulk_search`], yielding to the runtime every few
/// lines and reporting `(processed, total)` after each chunk.
pub async fn bulk_search_chunked<P>(input: &str, all: &[Domain], mut progress: P) -> SearchReport
where
    P: FnMut(usize, usize),
{
    let terms = search_terms(input);
    let total = terms.len();
    let index = name_index(all);
    let mut report = SearchReport::default();

    for (i, term) in terms.into_iter().enumerate() {
        report.push(resolve(&index, term));
        let processed = i + 1;
        if processed % SEARCH_CHUNK == 0 || processed == total {
            progress(processed, total);
            tokio::task::yield_now().await;
        }
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityId;
    use crate::query::tests::domain;
    use pretty_assertions::assert_eq;

    fn with_panel(id: &str, name: &str, link: &str, user: &str, pass: &str) -> Domain {
        Domain {
            panel_link: link.into(),
            panel_username: user.into(),
            panel_password: pass.into(),
            ..domain(id, name, 0, None)
        }
    }

    #[test]
    fn same_panel_excludes_source() {
        let all = vec![
            with_panel("1", "a.com", "https://cp", "root", "pw"),
            with_panel("2", "b.com", "https://cp", "root", "pw"),
            with_panel("3", "c.com", "https://cp", "root", "other"),
        ];
        let group = same_panel(&all[0], &all).unwrap();
        let ids: Vec<&EntityId> = group.iter().map(|d| &d.id).collect();
        assert_eq!(ids, vec![&EntityId::from("2")]);
    }

    #[test]
    fn same_panel_without_match_is_empty() {
        let all = vec![
            with_panel("1", "a.com", "https://cp", "root", "pw"),
            with_panel("2", "b.com", "https://cp2", "root", "pw"),
        ];
        assert!(same_panel(&all[0], &all).unwrap().is_empty());
    }

    #[test]
    fn same_panel_requires_complete_source() {
        let source = with_panel("1", "a.com", "https://cp", "", "pw");
        let err = same_panel(&source, std::slice::from_ref(&source)).unwrap_err();
        assert!(matches!(err, CoreError::IncompletePanel { .. }));
    }

    #[test]
    fn bulk_search_normalizes_and_counts() {
        let all = vec![
            domain("1", "Alpha.com", 0, None),
            domain("2", "bravo.org", 0, None),
        ];
        let input = "https://alpha.com/\n\n   \nBRAVO.ORG\nmissing.net\n";
        let report = bulk_search(input, &all);

        assert_eq!((report.total, report.found, report.not_found), (3, 2, 1));
        assert_eq!(report.found + report.not_found, report.total);
        let inputs: Vec<_> = report.rows.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["alpha.com", "BRAVO.ORG", "missing.net"]);
        assert_eq!(
            report.rows[0].domain.as_ref().unwrap().id,
            EntityId::from("1")
        );
        assert_eq!(report.missing_rows().count(), 1);
    }

    #[test]
    fn empty_input_is_an_empty_report() {
        assert_eq!(bulk_search(" \n\n", &[]), SearchReport::default());
    }

    #[tokio::test]
    async fn chunked_search_matches_plain_search() {
        let all: Vec<Domain> = (0..30)
            .map(|i| domain(&i.to_string(), &format!("site{i}.com"), 0, None))
            .collect();
        let input: String = (0..25).map(|i| format!("site{}.com\n", i * 2)).collect();

        let mut ticks = Vec::new();
        let chunked = bulk_search_chunked(&input, &all, |done, total| ticks.push((done, total))).await;

        assert_eq!(chunked, bulk_search(&input, &all));
        assert_eq!(chunked.found, 15);
        assert_eq!(ticks, vec![(10, 25), (20, 25), (25, 25)]);
    }
}
