//! Priority resolver: maps marker names to sort keys and orders markers.
//!
//! Pure functions only. Malformed or empty names are ranked as unmatched.

use std::cmp::Ordering;

use crate::domain::entities::{simple_name, Marker, OrderConfig, PriorityList, SortSettings};

/// A priority list resolved for one sort invocation.
///
/// Built once per node from [`SortSettings::effective`], so every marker
/// of that node is ranked against the same list.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveOrder<'a> {
    patterns: &'a PriorityList,
    unmatched_rank: usize,
}

impl<'a> EffectiveOrder<'a> {
    /// `-1` (or any negative position) ranks unmatched markers after every pattern.
    pub fn new(config: &'a OrderConfig) -> Self {
        let unmatched_rank =
            usize::try_from(config.unmatched_position).unwrap_or(config.annotation_order.len());
        Self {
            patterns: &config.annotation_order,
            unmatched_rank,
        }
    }

    pub fn resolve(settings: &'a SortSettings) -> Self {
        Self::new(settings.effective())
    }

    pub fn unmatched_rank(&self) -> usize {
        self.unmatched_rank
    }

    /// Index of the first matching pattern, if any.
    ///
    /// Exact qualified name beats exact simple name, which beats the first
    /// wildcard whose prefix is a dot-prefix of `name`.
    pub fn matched_rank(&self, name: &str) -> Option<usize> {
        if let Some(idx) = self.patterns.position(name) {
            return Some(idx);
        }
        if let Some(idx) = self.patterns.position(simple_name(name)) {
            return Some(idx);
        }
        self.patterns.iter().position(|pattern| {
            pattern
                .strip_suffix(".*")
                .is_some_and(|prefix| is_dot_prefix(prefix, name))
        })
    }

    /// Sort key for a qualified name.
    pub fn rank(&self, name: &str) -> usize {
        self.matched_rank(name).unwrap_or(self.unmatched_rank)
    }

    /// Rank plus whether a pattern matched.
    ///
    /// Unmatched markers occupy the slot in front of the pattern at their
    /// position, so they sort before a marker matching that pattern.
    fn sort_key(&self, name: &str) -> (usize, bool) {
        match self.matched_rank(name) {
            Some(rank) => (rank, true),
            None => (self.unmatched_rank, false),
        }
    }

    /// Order over names: rank first, then [`tie_break`].
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.sort_key(a)
            .cmp(&self.sort_key(b))
            .then_with(|| tie_break(a, b))
    }

    /// Markers in priority order. Stable, so identical names keep source order.
    ///
    /// [`tie_break`] is not transitive across packages, which the std sorts
    /// reject, so this is an insertion sort. Its output has every adjacent
    /// pair in order, which makes a second pass a no-op.
    pub fn sort_markers(&self, markers: &[Marker]) -> Vec<Marker> {
        let mut sorted: Vec<Marker> = Vec::with_capacity(markers.len());
        for marker in markers {
            let mut at = sorted.len();
            while at > 0
                && self.compare(sorted[at - 1].qualified_name(), marker.qualified_name())
                    == Ordering::Greater
            {
                at -= 1;
            }
            sorted.insert(at, marker.clone());
        }
        sorted
    }
}

/// `name` starts with `prefix` followed by a dot.
fn is_dot_prefix(prefix: &str, name: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('.'))
}

fn split_package(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or(("", name))
}

/// Order between equally ranked names.
///
/// Different packages: plain comparison of the full names. Same package:
/// shorter simple name first, then lexicographic. Lengths and comparisons
/// are in UTF-16 code units, as Java strings measure them.
pub fn tie_break(a: &str, b: &str) -> Ordering {
    let (pkg_a, class_a) = split_package(a);
    let (pkg_b, class_b) = split_package(b);
    if pkg_a != pkg_b {
        return utf16_cmp(a, b);
    }
    class_a
        .encode_utf16()
        .count()
        .cmp(&class_b.encode_utf16().count())
        .then_with(|| utf16_cmp(class_a, class_b))
}

fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Sort marker texts for a node against the effective layer of `settings`.
pub fn sorted_marker_texts(markers: &[Marker], settings: &SortSettings) -> Vec<String> {
    EffectiveOrder::resolve(settings)
        .sort_markers(markers)
        .into_iter()
        .map(|m| m.text().to_string())
        .collect()
}
