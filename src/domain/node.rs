//! Capability interface over a host source tree.
//!
//! The rewriter only sees this trait; mapping real syntax trees onto it is
//! the host's job (see `infrastructure::java` and `domain::memory`).

use crate::domain::entities::{Marker, Qualifier};
use crate::domain::error::DomainResult;

/// Child groups of a declaration, in the order the rewriter visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
    Inner,
}

impl MemberKind {
    /// Members resorted in place. `Inner` declarations are recursed into instead.
    pub const LEAVES: [MemberKind; 3] = [MemberKind::Field, MemberKind::Method, MemberKind::Constructor];
}

/// A declaration bearing markers, qualifiers and nested declarations.
///
/// Mutating calls must fail with [`crate::domain::DomainError::InvalidNode`]
/// once the node has been invalidated by the host.
pub trait DeclarationNode {
    /// Marker and qualifier state captured before a rewrite.
    type Snapshot;

    /// Human-readable identification, used in logs and error reports.
    fn label(&self) -> String;

    fn is_valid(&self) -> bool;

    /// Markers in current source order.
    fn markers(&self) -> Vec<Marker>;

    /// Qualifiers explicitly set on the node, in current source order.
    fn qualifiers(&self) -> Vec<Qualifier>;

    fn remove_marker(&mut self, marker: &Marker) -> DomainResult<()>;

    /// Attach a marker parsed from its full text.
    ///
    /// Fails with `MarkerParse` when the text is not a well-formed marker.
    fn add_marker(&mut self, text: &str) -> DomainResult<Marker>;

    /// Attach a marker from its bare name, without arguments.
    fn add_bare_marker(&mut self, name: &str) -> DomainResult<Marker>;

    fn set_qualifier(&mut self, qualifier: &Qualifier, value: bool) -> DomainResult<()>;

    fn snapshot(&self) -> Self::Snapshot;

    /// Put markers and qualifiers back exactly as captured, so the host
    /// sees no edit at all.
    fn restore(&mut self, snapshot: Self::Snapshot);

    /// Children of one group, in declaration order.
    fn members_mut(&mut self, kind: MemberKind) -> Vec<&mut Self>
    where
        Self: Sized;

    fn marker_count(&self) -> usize {
        self.markers().len()
    }
}
