//! Domain entities: markers, qualifiers and the ordering configuration

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display entry standing in for "every marker not matched by a pattern".
pub const UNMATCHED_SENTINEL: &str = "[ALL OTHER ANNOTATIONS]";

/// `unmatched_position` value meaning "after every listed pattern".
pub const UNMATCHED_LAST: i32 = -1;

/// A marker (annotation) attached to a declaration.
///
/// Only the name and the literal text matter; two markers with the same
/// text are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    /// Dot-separated qualified name, empty when unresolvable
    qualified_name: String,
    /// Exact source text to reinstate, arguments included (e.g. `@Size(max = 3)`)
    text: String,
}

impl Marker {
    pub fn new(qualified_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            text: text.into(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Substring after the last `.`, or the whole name.
pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map(|(_, simple)| simple)
        .unwrap_or(qualified_name)
}

/// Name of the marker as written, used when the full text cannot be reattached.
///
/// `@Size(max = 3)` → `Size`, `@javax.annotation.Nonnull` → `javax.annotation.Nonnull`
pub fn bare_marker_name(text: &str) -> &str {
    let head = text
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or(text);
    head.strip_prefix('@').unwrap_or(head)
}

/// A boolean attribute of a declaration that is not a marker (`public`, `static`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualifier(String);

impl Qualifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free list of patterns. Earlier entries rank higher.
///
/// A pattern is an exact qualified name, an exact simple name, or a
/// package wildcard `prefix.*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PriorityList(Vec<String>);

impl PriorityList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a pattern. Blank input, duplicates and the unmatched sentinel are ignored.
    ///
    /// Returns whether the pattern was added.
    pub fn push(&mut self, pattern: &str) -> bool {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern == UNMATCHED_SENTINEL || self.contains(pattern) {
            return false;
        }
        self.0.push(pattern.to_string());
        true
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.0.iter().any(|p| p == pattern)
    }

    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.0.iter().position(|p| p == pattern)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for PriorityList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = PriorityList::new();
        for pattern in iter {
            list.push(pattern.as_ref());
        }
        list
    }
}

impl From<Vec<String>> for PriorityList {
    fn from(patterns: Vec<String>) -> Self {
        patterns.into_iter().collect()
    }
}

impl From<PriorityList> for Vec<String> {
    fn from(list: PriorityList) -> Self {
        list.0
    }
}

/// One ordering configuration: a priority list plus where unmatched markers go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderConfig {
    pub annotation_order: PriorityList,
    /// Index into `annotation_order`; `-1` sends unmatched markers last
    pub unmatched_position: i32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            annotation_order: PriorityList::new(),
            unmatched_position: UNMATCHED_LAST,
        }
    }
}

impl OrderConfig {
    pub fn new(annotation_order: PriorityList, unmatched_position: i32) -> Self {
        Self {
            annotation_order,
            unmatched_position,
        }
    }

    /// Editable view: the patterns with [`UNMATCHED_SENTINEL`] at the unmatched position.
    pub fn to_display_list(&self) -> Vec<String> {
        let mut items: Vec<String> = self.annotation_order.as_slice().to_vec();
        let at = usize::try_from(self.unmatched_position)
            .ok()
            .filter(|&pos| pos <= items.len())
            .unwrap_or(items.len());
        items.insert(at, UNMATCHED_SENTINEL.to_string());
        items
    }

    /// Inverse of [`OrderConfig::to_display_list`]: strip the sentinel and record its index.
    pub fn from_display_list<S: AsRef<str>>(items: &[S]) -> Self {
        let unmatched_position = items
            .iter()
            .position(|item| item.as_ref() == UNMATCHED_SENTINEL)
            .and_then(|pos| i32::try_from(pos).ok())
            .unwrap_or(UNMATCHED_LAST);
        Self {
            annotation_order: items.iter().map(AsRef::as_ref).collect(),
            unmatched_position,
        }
    }
}

/// Both configuration layers. A non-empty project list fully shadows the global one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSettings {
    pub global: OrderConfig,
    pub project: Option<OrderConfig>,
}

impl SortSettings {
    pub fn new(global: OrderConfig, project: Option<OrderConfig>) -> Self {
        Self { global, project }
    }

    /// The layer ranking is done against: the project pair when its list is
    /// non-empty, the global pair otherwise.
    pub fn effective(&self) -> &OrderConfig {
        match &self.project {
            Some(project) if !project.annotation_order.is_empty() => project,
            _ => &self.global,
        }
    }

    pub fn has_project_override(&self) -> bool {
        !std::ptr::eq(self.effective(), &self.global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_dotted_name_when_simple_name_then_returns_last_segment() {
        assert_eq!(simple_name("java.lang.Override"), "Override");
        assert_eq!(simple_name("Override"), "Override");
        assert_eq!(simple_name(""), "");
    }

    #[test]
    fn given_marker_text_when_bare_name_then_strips_at_and_arguments() {
        assert_eq!(bare_marker_name("@Size(max = 3)"), "Size");
        assert_eq!(bare_marker_name("@a.b.Nonnull"), "a.b.Nonnull");
        assert_eq!(bare_marker_name("@Json (x)"), "Json");
    }

    #[test]
    fn given_duplicates_and_blanks_when_push_then_ignored() {
        let mut list = PriorityList::new();
        assert!(list.push(" Override "));
        assert!(!list.push("Override"));
        assert!(!list.push("   "));
        assert!(!list.push(UNMATCHED_SENTINEL));
        assert_eq!(list.as_slice(), &["Override".to_string()]);
    }

    #[test]
    fn given_unmatched_last_when_display_list_then_sentinel_at_end() {
        let config = OrderConfig::new(["A", "B"].into_iter().collect(), UNMATCHED_LAST);
        assert_eq!(config.to_display_list(), vec!["A", "B", UNMATCHED_SENTINEL]);
    }

    #[test]
    fn given_display_list_when_round_tripped_then_position_kept() {
        let items = vec!["A", UNMATCHED_SENTINEL, "B"];
        let config = OrderConfig::from_display_list(&items);
        assert_eq!(config.unmatched_position, 1);
        assert_eq!(config.annotation_order.as_slice(), &["A".to_string(), "B".to_string()]);
        assert_eq!(config.to_display_list(), items);
    }

    #[test]
    fn given_display_list_without_sentinel_when_parsed_then_unmatched_last() {
        let config = OrderConfig::from_display_list(&["A"]);
        assert_eq!(config.unmatched_position, UNMATCHED_LAST);
    }

    #[test]
    fn given_empty_project_list_when_effective_then_global_wins() {
        let global = OrderConfig::new(["A"].into_iter().collect(), 0);
        let settings = SortSettings::new(global.clone(), Some(OrderConfig::default()));
        assert_eq!(settings.effective(), &global);
        assert!(!settings.has_project_override());
    }

    #[test]
    fn given_project_list_when_effective_then_project_shadows_global() {
        let global = OrderConfig::new(["A"].into_iter().collect(), 0);
        let project = OrderConfig::new(["B"].into_iter().collect(), UNMATCHED_LAST);
        let settings = SortSettings::new(global, Some(project.clone()));
        assert_eq!(settings.effective(), &project);
        assert!(settings.has_project_override());
    }
}
