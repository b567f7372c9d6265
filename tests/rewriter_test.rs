//! Tests for TreeRewriter against the in-memory declaration host

use annosort::domain::{
    DeclarationNode, MemberKind, MemoryDeclaration, OrderConfig, Qualifier, SortSettings,
    TreeRewriter, UNMATCHED_LAST,
};
use annosort::util::testing;

fn settings(patterns: &[&str], unmatched: i32) -> SortSettings {
    SortSettings::new(OrderConfig::new(patterns.iter().collect(), unmatched), None)
}

fn texts(node: &MemoryDeclaration) -> Vec<String> {
    node.markers().iter().map(|m| m.text().to_string()).collect()
}

fn sorted_multiset(node: &MemoryDeclaration) -> Vec<String> {
    let mut all = texts(node);
    all.sort();
    all
}

fn mixed_node() -> MemoryDeclaration {
    MemoryDeclaration::new("m")
        .with_qualifier("public")
        .with_marker("x.b.Foo", "@Foo")
        .with_marker("java.lang.Deprecated", "@Deprecated")
        .with_qualifier("static")
        .with_marker("x.b.Fo", "@Fo(1)")
        .with_marker("java.lang.Override", "@Override")
        .with_marker("a.Zed", "@a.Zed")
        .with_qualifier("final")
}

#[test]
fn given_priority_list_when_rewriting_then_listed_markers_first() {
    testing::init_test_setup();
    // Arrange
    let settings = settings(&["Override", "Deprecated"], 2);
    let mut node = MemoryDeclaration::new("m")
        .with_marker("java.lang.Deprecated", "@Deprecated")
        .with_marker("java.lang.Override", "@Override")
        .with_marker("Foo", "@Foo");

    // Act
    TreeRewriter::new(&settings).rewrite_declaration(&mut node);

    // Assert
    assert_eq!(texts(&node), vec!["@Override", "@Deprecated", "@Foo"]);
}

#[test]
fn given_resorted_node_when_resorting_again_then_order_stable() {
    let settings = settings(&["Override", "Deprecated"], UNMATCHED_LAST);
    let mut node = mixed_node();
    let rewriter = TreeRewriter::new(&settings);

    rewriter.resort_markers(&mut node).unwrap();
    let once = texts(&node);
    let changed = rewriter.resort_markers(&mut node).unwrap();

    assert!(!changed);
    assert_eq!(texts(&node), once);
}

#[test]
fn given_mixed_node_when_rewriting_then_content_and_qualifiers_preserved() {
    let settings = settings(&["Override", "Deprecated"], UNMATCHED_LAST);
    let mut node = mixed_node();
    let before = sorted_multiset(&node);
    let qualifiers = node.qualifiers();

    TreeRewriter::new(&settings).resort_markers(&mut node).unwrap();

    assert_eq!(sorted_multiset(&node), before);
    assert_eq!(node.qualifiers(), qualifiers);
    assert_eq!(
        texts(&node),
        vec!["@Override", "@Deprecated", "@a.Zed", "@Fo(1)", "@Foo"]
    );
}

#[test]
fn given_nested_declarations_when_rewriting_root_then_every_level_sorted() {
    let settings = settings(&["A", "B"], UNMATCHED_LAST);
    let deeper = MemoryDeclaration::new("Deeper")
        .with_marker("B", "@B")
        .with_marker("A", "@A");
    let inner = MemoryDeclaration::new("Inner")
        .with_member(MemberKind::Inner, deeper)
        .with_member(
            MemberKind::Constructor,
            MemoryDeclaration::new("Inner()")
                .with_marker("B", "@B")
                .with_marker("A", "@A"),
        );
    let mut root = MemoryDeclaration::new("Outer")
        .with_marker("B", "@B")
        .with_marker("A", "@A")
        .with_member(MemberKind::Inner, inner);

    let report = TreeRewriter::new(&settings).rewrite_declaration(&mut root);

    assert_eq!(report.resorted, 3);
    assert_eq!(report.reordered, 3);
    assert_eq!(texts(&root), vec!["@A", "@B"]);
    let inner = &root.members(MemberKind::Inner)[0];
    assert_eq!(texts(&inner.members(MemberKind::Constructor)[0]), vec!["@A", "@B"]);
    assert_eq!(texts(&inner.members(MemberKind::Inner)[0]), vec!["@A", "@B"]);
}

#[test]
fn given_zero_or_one_marker_when_rewriting_then_node_never_mutated() {
    let settings = settings(&["A"], UNMATCHED_LAST);
    let mut root = MemoryDeclaration::new("C")
        .with_marker("Z", "@Z")
        .with_qualifier("public")
        .with_member(MemberKind::Field, MemoryDeclaration::new("f").with_qualifier("private"))
        .with_member(
            MemberKind::Method,
            MemoryDeclaration::new("m").with_marker("Z", "@Z"),
        );

    let report = TreeRewriter::new(&settings).rewrite_declaration(&mut root);

    assert_eq!(report.resorted, 0);
    assert_eq!(root.mutations(), 0);
    assert_eq!(root.members(MemberKind::Field)[0].mutations(), 0);
    assert_eq!(root.members(MemberKind::Method)[0].mutations(), 0);
}

#[test]
fn given_project_order_when_rewriting_then_global_order_ignored() {
    let global = OrderConfig::new(["Deprecated"].into_iter().collect(), UNMATCHED_LAST);
    let project = OrderConfig::new(["lombok.*"].into_iter().collect(), UNMATCHED_LAST);
    let settings = SortSettings::new(global, Some(project));
    let mut node = MemoryDeclaration::new("C")
        .with_marker("java.lang.Deprecated", "@Deprecated")
        .with_marker("lombok.Data", "@Data");

    TreeRewriter::new(&settings).resort_markers(&mut node).unwrap();

    assert_eq!(texts(&node), vec!["@Data", "@Deprecated"]);
}

#[test]
fn given_unmatched_first_when_rewriting_then_unlisted_markers_lead() {
    let settings = settings(&["A", "B"], 0);
    let mut node = MemoryDeclaration::new("m")
        .with_marker("A", "@A")
        .with_marker("B", "@B")
        .with_marker("x.Other", "@x.Other");

    TreeRewriter::new(&settings).resort_markers(&mut node).unwrap();

    assert_eq!(texts(&node), vec!["@x.Other", "@A", "@B"]);
}

#[test]
fn given_invalid_root_when_rewriting_then_members_still_sorted() {
    let settings = settings(&["A", "B"], UNMATCHED_LAST);
    let mut root = MemoryDeclaration::new("C")
        .with_marker("B", "@B")
        .with_marker("A", "@A")
        .with_member(
            MemberKind::Field,
            MemoryDeclaration::new("f")
                .with_marker("B", "@B")
                .with_marker("A", "@A"),
        );
    root.invalidate();

    let report = TreeRewriter::new(&settings).rewrite_declaration(&mut root);

    assert_eq!(report.skipped, 1);
    assert_eq!(report.resorted, 1);
    assert_eq!(texts(&root), vec!["@B", "@A"]);
    assert_eq!(texts(&root.members(MemberKind::Field)[0]), vec!["@A", "@B"]);
}

#[test]
fn given_unparseable_marker_when_rewriting_then_bare_name_kept_and_count_unchanged() {
    let settings = settings(&["Size", "NotNull"], UNMATCHED_LAST);
    let mut node = MemoryDeclaration::new("f")
        .with_marker("NotNull", "@NotNull")
        .with_marker("Size", "@Size(max = )")
        .rejecting_marker_text("@Size(max = )")
        .with_qualifier("private");

    let report = TreeRewriter::new(&settings).rewrite_declaration(&mut node);

    assert!(report.failures.is_empty());
    assert_eq!(texts(&node), vec!["@Size", "@NotNull"]);
    assert_eq!(node.qualifiers(), vec![Qualifier::new("private")]);
}
