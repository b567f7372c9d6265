//! Tree rewriter: applies the priority order to every declaration of a tree.
//!
//! Visit order per declaration: fields, methods, constructors, nested
//! declarations (recursively), then the declaration's own markers.
//! Nodes with fewer than two markers are never touched.

use tracing::{debug, instrument, warn};

use crate::domain::entities::{bare_marker_name, Marker, SortSettings};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{DeclarationNode, MemberKind};
use crate::domain::resolver::sorted_marker_texts;

/// A node whose rewrite failed for a reason other than invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteFailure {
    pub node: String,
    pub message: String,
}

/// Outcome of rewriting one or more declaration trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Nodes whose markers were detached and reattached
    pub resorted: usize,
    /// Resorted nodes whose marker order actually changed
    pub reordered: usize,
    /// Nodes skipped because the host invalidated them
    pub skipped: usize,
    pub failures: Vec<RewriteFailure>,
}

impl RewriteReport {
    pub fn merge(&mut self, other: RewriteReport) {
        self.resorted += other.resorted;
        self.reordered += other.reordered;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rewrites declaration trees against one settings snapshot.
pub struct TreeRewriter<'a> {
    settings: &'a SortSettings,
}

impl<'a> TreeRewriter<'a> {
    pub fn new(settings: &'a SortSettings) -> Self {
        Self { settings }
    }

    /// Sort markers on `node` and on every declaration nested in it.
    ///
    /// Failures are contained per node: a failing member never stops its
    /// siblings from being sorted.
    #[instrument(level = "debug", skip_all, fields(node = %node.label()))]
    pub fn rewrite_declaration<N: DeclarationNode>(&self, node: &mut N) -> RewriteReport {
        let mut report = RewriteReport::default();
        self.walk(node, &mut report);
        report
    }

    fn walk<N: DeclarationNode>(&self, node: &mut N, report: &mut RewriteReport) {
        for kind in MemberKind::LEAVES {
            for member in node.members_mut(kind) {
                if member.marker_count() >= 2 {
                    self.apply(member, report);
                }
            }
        }

        for inner in node.members_mut(MemberKind::Inner) {
            self.walk(inner, report);
        }

        if !node.is_valid() {
            debug!("leaving markers of invalid declaration {}", node.label());
            report.skipped += 1;
        } else if node.marker_count() >= 2 {
            self.apply(node, report);
        }
    }

    fn apply<N: DeclarationNode>(&self, node: &mut N, report: &mut RewriteReport) {
        let label = node.label();
        match self.resort_markers(node) {
            Ok(changed) => {
                report.resorted += 1;
                if changed {
                    report.reordered += 1;
                }
            }
            Err(DomainError::InvalidNode(_)) => {
                debug!("declaration invalidated during rewrite: {}", label);
                report.skipped += 1;
            }
            Err(e) => {
                warn!("rewrite failed for {}: {}", label, e);
                report.failures.push(RewriteFailure {
                    node: label,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Detach all markers and qualifiers of `node` and reattach them:
    /// markers in priority order, then qualifiers in their original order.
    ///
    /// Returns whether the marker order changed. On error the node is
    /// restored to its state before the call.
    pub fn resort_markers<N: DeclarationNode>(&self, node: &mut N) -> DomainResult<bool> {
        ensure_valid(node)?;
        let snapshot = node.snapshot();
        let result = self.reattach(node);
        if result.is_err() {
            node.restore(snapshot);
        }
        result
    }

    fn reattach<N: DeclarationNode>(&self, node: &mut N) -> DomainResult<bool> {
        let markers = node.markers();
        let qualifiers = node.qualifiers();
        let sorted = sorted_marker_texts(&markers, self.settings);

        for marker in &markers {
            ensure_valid(node)?;
            node.remove_marker(marker)?;
        }
        for qualifier in &qualifiers {
            ensure_valid(node)?;
            node.set_qualifier(qualifier, false)?;
        }
        for text in &sorted {
            ensure_valid(node)?;
            attach_marker(node, text)?;
        }
        for qualifier in &qualifiers {
            ensure_valid(node)?;
            node.set_qualifier(qualifier, true)?;
        }

        let reattached = node.marker_count();
        if reattached != markers.len() {
            return Err(DomainError::rewrite_failed(
                node.label(),
                format!("expected {} markers after rewrite, found {}", markers.len(), reattached),
            ));
        }

        let changed = markers.iter().map(Marker::text).ne(sorted.iter().map(String::as_str));
        debug!(node = %node.label(), changed, "resorted {} markers", markers.len());
        Ok(changed)
    }
}

fn ensure_valid<N: DeclarationNode>(node: &N) -> DomainResult<()> {
    if node.is_valid() {
        Ok(())
    } else {
        Err(DomainError::InvalidNode(node.label()))
    }
}

/// Structured attach, falling back to the bare name when the text does not parse.
///
/// Losing the arguments is preferred over losing the marker.
fn attach_marker<N: DeclarationNode>(node: &mut N, text: &str) -> DomainResult<Marker> {
    match node.add_marker(text) {
        Err(DomainError::MarkerParse { text, reason }) => {
            debug!("falling back to bare marker for `{}`: {}", text, reason);
            node.add_bare_marker(bare_marker_name(&text))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{OrderConfig, Qualifier, UNMATCHED_LAST};
    use crate::domain::memory::MemoryDeclaration;

    fn settings(patterns: &[&str], unmatched: i32) -> SortSettings {
        SortSettings::new(OrderConfig::new(patterns.iter().collect(), unmatched), None)
    }

    fn texts(node: &MemoryDeclaration) -> Vec<String> {
        node.markers().iter().map(|m| m.text().to_string()).collect()
    }

    #[test]
    fn given_unsorted_node_when_resorting_then_markers_ordered_and_qualifiers_kept() {
        let settings = settings(&["Override", "Deprecated"], 2);
        let mut node = MemoryDeclaration::new("m")
            .with_marker("Deprecated", "@Deprecated")
            .with_qualifier("public")
            .with_marker("Foo", "@Foo(1)")
            .with_marker("Override", "@Override")
            .with_qualifier("static");

        let changed = TreeRewriter::new(&settings).resort_markers(&mut node).unwrap();

        assert!(changed);
        assert_eq!(texts(&node), vec!["@Override", "@Deprecated", "@Foo(1)"]);
        assert_eq!(
            node.qualifiers(),
            vec![Qualifier::new("public"), Qualifier::new("static")]
        );
    }

    #[test]
    fn given_unparseable_marker_when_resorting_then_bare_name_is_attached() {
        let settings = settings(&["B", "A"], UNMATCHED_LAST);
        let mut node = MemoryDeclaration::new("m")
            .with_marker("A", "@A(x = \"1\")")
            .with_marker("B", "@B")
            .rejecting_marker_text("@A(x = \"1\")");

        TreeRewriter::new(&settings).resort_markers(&mut node).unwrap();

        assert_eq!(texts(&node), vec!["@B", "@A"]);
    }

    #[test]
    fn given_node_invalidated_mid_rewrite_when_rewriting_then_sibling_still_sorted() {
        let settings = settings(&["B", "A"], UNMATCHED_LAST);
        let mut root = MemoryDeclaration::new("C")
            .with_member(
                MemberKind::Field,
                MemoryDeclaration::new("f1")
                    .with_marker("A", "@A")
                    .with_marker("B", "@B")
                    .invalidated_after(1),
            )
            .with_member(
                MemberKind::Field,
                MemoryDeclaration::new("f2")
                    .with_marker("A", "@A")
                    .with_marker("B", "@B"),
            );

        let report = TreeRewriter::new(&settings).rewrite_declaration(&mut root);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.resorted, 1);
        assert!(report.failures.is_empty());
        let f2 = &root.members(MemberKind::Field)[1];
        assert_eq!(texts(f2), vec!["@B", "@A"]);
    }

    #[test]
    fn given_failing_node_when_rewriting_then_failure_reported_and_others_sorted() {
        let settings = settings(&["B", "A"], UNMATCHED_LAST);
        let mut root = MemoryDeclaration::new("C")
            .with_marker("A", "@A")
            .with_marker("B", "@B")
            .with_member(
                MemberKind::Method,
                MemoryDeclaration::new("broken")
                    .with_marker("A", "@A")
                    .with_marker("B", "@B")
                    .failing_removals(),
            );

        let report = TreeRewriter::new(&settings).rewrite_declaration(&mut root);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].node, "broken");
        assert_eq!(texts(&root), vec!["@B", "@A"]);
        assert_eq!(texts(&root.members(MemberKind::Method)[0]), vec!["@A", "@B"]);
    }

    #[test]
    fn given_failure_after_detaching_when_resorting_then_node_restored() {
        let settings = settings(&["B", "A"], UNMATCHED_LAST);
        let mut node = MemoryDeclaration::new("m")
            .with_marker("A", "@A")
            .with_qualifier("public")
            .with_marker("B", "@B")
            .invalidated_after(3);
        let before = (texts(&node), node.qualifiers());

        let err = TreeRewriter::new(&settings)
            .resort_markers(&mut node)
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidNode(_)));
        assert_eq!((texts(&node), node.qualifiers()), before);
    }
}
