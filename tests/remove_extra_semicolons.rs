use rewrite_engine::java::JavaKind;
use rewrite_engine::recipes::RemoveExtraSemicolons;
use rewrite_engine::tree::{Marker, MarkerKind};
use rewrite_engine::{Engine, EngineConfig, JavaParser, Node, Recipe, SourceParser};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn engine() -> Engine {
    Engine::new(EngineConfig::default().with_parallel(false))
}

fn rewrite(before: &str) -> String {
    let source = JavaParser::new().parse(Path::new("Test.java"), before);
    let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(RemoveExtraSemicolons::new())];
    let result = engine().run(&recipes, vec![source]);
    assert!(result.failures.is_empty(), "{:?}", result.failures);
    result.changes[0].after.clone()
}

fn find_all<'a>(node: &'a Arc<Node>, kind: JavaKind, out: &mut Vec<&'a Arc<Node>>) {
    if node.is_kind(kind) {
        out.push(node);
    }
    for child in node.child_nodes() {
        find_all(child, kind, out);
    }
}

#[test]
fn enum_semicolons() {
    let before = "public enum FRUITS {\n    BANANA,\n    APPLE;\n}\n";
    assert_eq!(rewrite(before), "public enum FRUITS {\n    BANANA,\n    APPLE\n}\n");
}

#[test]
fn enum_semicolons_with_other_members_stay() {
    let before = "public enum FRUITS {\n    BANANA,\n    APPLE;\n    \n    void hiFruit() {}\n}\n";
    assert_eq!(rewrite(before), before);
}

#[test]
fn empty_block_statements() {
    let before = "class Test {\n    void test() {\n        ;\n    }\n}\n";
    assert_eq!(rewrite(before), "class Test {\n    void test() {\n    }\n}\n");
}

#[test]
fn try_with_resources_keeps_separators() {
    let before = "import java.io.*;\nclass Test {\n    void test() {\n        try (ByteArrayInputStream b = new ByteArrayInputStream(new byte[10]);\n              Reader r = new InputStreamReader(b);) {\n        }\n    }\n}\n";
    let after = "import java.io.*;\nclass Test {\n    void test() {\n        try (ByteArrayInputStream b = new ByteArrayInputStream(new byte[10]);\n              Reader r = new InputStreamReader(b)) {\n        }\n    }\n}\n";

    let recipe = RemoveExtraSemicolons::new();
    let parsed = JavaParser::new().parse(Path::new("Test.java"), before).unwrap();
    let mut visitor = recipe.visitor().unwrap();
    let root = rewrite_engine::walk(&mut visitor, parsed.root());
    assert_eq!(root.print(), after);

    let mut resources = Vec::new();
    find_all(&root, JavaKind::Resource, &mut resources);
    assert_eq!(resources.len(), 2);
    assert!(resources[0].markers().has(MarkerKind::Separator));
    assert!(!resources[1].markers().has(MarkerKind::Semicolon));
}

#[test]
fn terminator_marker_is_what_prints_the_semicolon() {
    let before = "enum E { A, B; }";
    let parsed = JavaParser::new().parse(Path::new("E.java"), before).unwrap();
    let mut constants = Vec::new();
    find_all(parsed.root(), JavaKind::EnumConstant, &mut constants);
    assert!(matches!(
        constants[1].markers().get(MarkerKind::Semicolon),
        Some(Marker::Semicolon { .. })
    ));
    assert_eq!(rewrite(before), "enum E { A, B }");
}

#[test]
fn unchanged_file_is_reported_unchanged() {
    let source = JavaParser::new().parse(Path::new("Clean.java"), "class Clean {}\n");
    let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(RemoveExtraSemicolons::new())];
    let result = engine().run(&recipes, vec![source]);
    let change = &result.changes[0];
    assert_eq!(change.path, PathBuf::from("Clean.java"));
    assert!(!change.changed);
    assert!(change.diff().is_empty());
}
