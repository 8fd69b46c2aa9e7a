//! Catalog of known names and best-match lookup
//!
//! The catalog is a read-only snapshot taken once per batch. Matching is a
//! first-hit heuristic, not a ranking: ties go to the earliest entry in
//! sorted order.

use std::collections::BTreeSet;

/// De-duplicated, sorted snapshot of catalog names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    /// Build from raw names. Duplicates and blank names are dropped; case is kept.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| !name.trim().is_empty())
            .collect();
        Self {
            names: set.into_iter().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact, case-sensitive membership
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .is_ok()
    }

    /// Best match for `label`, see [`find_best_match`]
    #[inline]
    #[must_use]
    pub fn best_match(&self, label: &str) -> Option<&str> {
        find_best_match(label, self)
    }
}

/// Find the catalog entry that best matches `label`.
///
/// First hit wins:
/// 1. exact, case-sensitive membership
/// 2. case-insensitive equality
/// 3. case-insensitive substring in either direction
#[must_use]
pub fn find_best_match<'c>(label: &str, catalog: &'c Catalog) -> Option<&'c str> {
    if let Ok(idx) = catalog
        .names
        .binary_search_by(|probe| probe.as_str().cmp(label))
    {
        return Some(catalog.names[idx].as_str());
    }

    let target = label.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }

    let lowered: Vec<(String, &str)> = catalog
        .names
        .iter()
        .map(|name| (name.to_lowercase(), name.as_str()))
        .collect();

    if let Some((_, name)) = lowered.iter().find(|(lower, _)| *lower == target) {
        return Some(*name);
    }

    lowered
        .iter()
        .find(|(lower, _)| lower.contains(&target) || target.contains(lower.as_str()))
        .map(|(_, name)| *name)
}
