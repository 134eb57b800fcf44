use super::*;

#[test]
fn endnotes_collect_and_emit() {
    rendered(
        "x[^first] y[^second]",
        concat!(
            "((p \"x\"",
            " (sup (@ (id . \"fnref:1\"))",
            " (a (@ (href . \"#fn:1\") (role . \"doc-noteref\")) \"1\"))",
            " \" y\"",
            " (sup (@ (id . \"fnref:2\"))",
            " (a (@ (href . \"#fn:2\") (role . \"doc-noteref\")) \"2\")))",
            " (ol (@ (class . \"zs-endnotes\"))",
            " (li (@ (id . \"fn:1\") (role . \"doc-endnote\") (value . \"1\"))",
            " \"first\" \" \"",
            " (a (@ (href . \"#fnref:1\") (role . \"doc-backlink\")) \"\u{21a9}\"))",
            " (li (@ (id . \"fn:2\") (role . \"doc-endnote\") (value . \"2\"))",
            " \"second\" \" \"",
            " (a (@ (href . \"#fnref:2\") (role . \"doc-backlink\")) \"\u{21a9}\"))))",
        ),
    );
}

#[test]
fn a_note_inside_a_note_is_emitted_too() {
    rendered(
        "a[^outer [^inner]]",
        concat!(
            "((p \"a\"",
            " (sup (@ (id . \"fnref:1\"))",
            " (a (@ (href . \"#fn:1\") (role . \"doc-noteref\")) \"1\")))",
            " (ol (@ (class . \"zs-endnotes\"))",
            " (li (@ (id . \"fn:1\") (role . \"doc-endnote\") (value . \"1\"))",
            " \"outer \"",
            " (sup (@ (id . \"fnref:2\"))",
            " (a (@ (href . \"#fn:2\") (role . \"doc-noteref\")) \"2\"))",
            " \" \"",
            " (a (@ (href . \"#fnref:1\") (role . \"doc-backlink\")) \"\u{21a9}\"))",
            " (li (@ (id . \"fn:2\") (role . \"doc-endnote\") (value . \"2\"))",
            " \"inner\" \" \"",
            " (a (@ (href . \"#fnref:2\") (role . \"doc-backlink\")) \"\u{21a9}\"))))",
        ),
    );
}

#[test]
fn the_unique_prefix_scopes_note_ids() {
    let options = Options {
        unique: "note-".to_owned(),
        ..Options::default()
    };
    let tree = crate::to_html_tree("x[^a]", &options).unwrap();
    let printed = tree.to_string();
    assert!(printed.contains("fnref:note-1"), "{}", printed);
    assert!(printed.contains("\"fn:note-1\""), "{}", printed);
}

#[test]
fn no_notes_no_list() {
    rendered("hello", "((p \"hello\"))");
}
