use proptest::prelude::*;
use rewrite_engine::java::parse_compilation_unit;
use rewrite_engine::recipes::RemoveExtraSemicolons;
use rewrite_engine::yaml::parse_document;
use rewrite_engine::{walk, Recipe};
use std::sync::Arc;

fn trivia() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(" "),
        Just("  "),
        Just("\n"),
        Just("\n    "),
        Just("\r\n\t"),
        Just(" /* note */ "),
        Just(" // note\n"),
    ]
}

fn statement() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("int v = 1;"),
        Just(";"),
        Just("{ }"),
        Just("return;"),
        Just("helper(1, \"two\");"),
    ]
}

fn java_member() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| format!("int f{n} = {n};")),
        Just(";".to_string()),
        (prop::collection::vec((trivia(), statement()), 0..5), trivia()).prop_map(|(body, close)| {
            let mut text = String::from("void m() {");
            for (ws, stmt) in body {
                text.push_str(ws);
                text.push_str(stmt);
            }
            text.push_str(close);
            text.push('}');
            text
        }),
    ]
}

fn java_unit() -> impl Strategy<Value = String> {
    (trivia(), prop::collection::vec((trivia(), java_member()), 0..6), trivia()).prop_map(
        |(lead, members, close)| {
            let mut text = format!("class Generated{lead}{{");
            for (ws, member) in members {
                text.push_str(ws);
                text.push_str(&member);
            }
            text.push_str(close);
            text.push_str("}\n");
            text
        },
    )
}

fn yaml_scalar() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9.]{1,8}",
        "[a-z ]{1,6}".prop_map(|s| format!("'{s}'")),
        "[a-z]{1,6}".prop_map(|s| format!("\"{s}\"")),
        Just(String::new()),
    ]
}

fn yaml_comment() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just(" # trailing"), Just("   #x")]
}

fn yaml_leaf() -> impl Strategy<Value = (String, String, String, &'static str)> {
    ("[a-z]{1,5}(\\.[a-z]{1,5})?", "[ ]{0,1}", yaml_scalar(), yaml_comment())
}

/// Two levels of mappings with comments, blank lines and dotted keys.
fn yaml_document() -> impl Strategy<Value = String> {
    let nested = prop::collection::vec(yaml_leaf(), 1..4);
    let entry = prop_oneof![
        yaml_leaf().prop_map(|(key, gap, value, comment)| {
            let sep = if value.is_empty() { "" } else { " " };
            format!("{key}{gap}:{sep}{value}{comment}\n")
        }),
        ("[a-z]{1,5}", nested, prop_oneof![Just(2usize), Just(4)]).prop_map(
            |(key, children, indent)| {
                let pad = " ".repeat(indent);
                let mut text = format!("{key}:\n");
                for (child, gap, value, comment) in children {
                    let sep = if value.is_empty() { "" } else { " " };
                    text.push_str(&format!("{pad}{child}{gap}:{sep}{value}{comment}\n"));
                }
                text
            },
        ),
        Just("# standalone\n".to_string()),
        Just("\n".to_string()),
    ];
    (prop::bool::ANY, prop::collection::vec(entry, 0..6)).prop_map(|(marker, entries)| {
        let mut text = if marker { "---\n".to_string() } else { String::new() };
        text.extend(entries);
        text
    })
}

proptest! {
    #[test]
    fn java_prints_back_exactly(source in java_unit()) {
        let root = parse_compilation_unit(&source).unwrap();
        prop_assert_eq!(root.print(), source);
    }

    #[test]
    fn removing_semicolons_is_idempotent(source in java_unit()) {
        let root = Arc::new(parse_compilation_unit(&source).unwrap());
        let recipe = RemoveExtraSemicolons::new();
        let once = walk(&mut recipe.visitor().unwrap(), &root);
        let reparsed = Arc::new(parse_compilation_unit(&once.print()).unwrap());
        let twice = walk(&mut recipe.visitor().unwrap(), &reparsed);
        prop_assert_eq!(twice.print(), once.print());
    }

    #[test]
    fn yaml_prints_back_exactly(source in yaml_document()) {
        let root = parse_document(&source).unwrap();
        prop_assert_eq!(root.print(), source);
    }

    #[test]
    fn any_yaml_that_parses_prints_back(source in "[a-z:#'\" .\\n-]{0,40}") {
        if let Ok(root) = parse_document(&source) {
            prop_assert_eq!(root.print(), source);
        }
    }
}
