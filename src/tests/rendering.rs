use super::*;

#[test]
fn paragraph() {
    rendered("Hello.", "((p \"Hello.\"))");
}

#[test]
fn soft_break_renders_as_newline() {
    rendered("a\nb", "((p \"a\" \"\\n\" \"b\"))");
}

#[test]
fn hard_break_renders_as_br() {
    rendered("a  \nb", "((p \"a\" (br) \"b\"))");
}

#[test]
fn heading_with_external_fragment() {
    let tree = eval_tree(
        "(BLOCK (HEADING 1 () \"\" \"Hello\" (TEXT \"Hello\")))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), "((h1 (@ (id . \"Hello\")) \"Hello\"))");
}

#[test]
fn heading_offset_shifts_the_tag() {
    rendered_opts(
        "=== H",
        Options {
            heading_offset: 1,
            ..Options::default()
        },
        "((h2 \"H\"))",
    );
}

#[test]
fn thematic_break() {
    rendered("---", "((hr))");
}

#[test]
fn external_link_carries_the_class() {
    rendered(
        "[[E|https://example.org]]",
        "((p (a (@ (class . \"external\") (href . \"https://example.org\")) \"E\")))",
    );
}

#[test]
fn query_link_escapes_the_expression() {
    rendered(
        "[[query:tag:rust]]",
        "((p (a (@ (href . \"?q=tag%3Arust\")) \"tag:rust\")))",
    );
}

#[test]
fn broken_link_is_flagged() {
    let tree = eval_tree(
        "(BLOCK (PARA (LINK-BROKEN () \"12345678901234\")))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(
        tree.to_string(),
        "((p (a (@ (class . \"broken\") (href . \"12345678901234\")) \"12345678901234\")))",
    );
}

#[test]
fn no_links_mode_renders_spans() {
    rendered_opts(
        "[[E|https://example.org]]",
        Options {
            no_links: true,
            ..Options::default()
        },
        "((p (span \"E\")))",
    );
}

#[test]
fn lists() {
    rendered("* one\n* two", "((ul (li \"one\") (li \"two\")))");
    rendered("# a", "((ol (li \"a\")))");
}

#[test]
fn quotation_list() {
    rendered("> a\n> b", "((blockquote (p \"a\" \"\\n\" \"b\")))");
}

#[test]
fn description_list() {
    rendered("; t\n: d", "((dl (dt \"t\") (dd \"d\")))");
}

#[test]
fn verbatim_code_gets_a_language_class() {
    rendered(
        "```go\nfmt.Println()\n```",
        "((pre (code (@ (class . \"language-go\")) \"fmt.Println()\")))",
    );
}

#[test]
fn visible_space_transform() {
    rendered("``a b``{-}", "((p (code \"a\u{2423}b\")))");
}

#[test]
fn unsafe_html_is_dropped() {
    let tree = eval_tree(
        "(BLOCK (VERBATIM-HTML () \"<script>alert(1)</script>\"))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), "()");

    let tree = eval_tree(
        "(BLOCK (PARA (LITERAL-HTML () \"<iframe src=x>\")))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), "((p))");
}

#[test]
fn safe_html_passes_through_unescaped() {
    let tree = eval_tree(
        "(BLOCK (VERBATIM-HTML () \"<b>ok</b>\"))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), "((NO-ESCAPE \"<b>ok</b>\"))");
}

#[test]
fn comments_render_only_when_marked() {
    let tree = eval_tree(
        "(BLOCK (VERBATIM-COMMENT ((\"-\" . \"\")) \"shown\"))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), "((COMMENT \"shown\"))");

    let tree = eval_tree(
        "(BLOCK (VERBATIM-COMMENT () \"hidden\"))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), "()");
}

#[test]
fn french_quotes_include_no_break_spaces() {
    rendered_opts(
        "\"\"Bonjour\"\"",
        Options {
            lang: "fr".to_owned(),
            ..Options::default()
        },
        "((p (span \"\u{ab}\u{a0}\" \"Bonjour\" \"\u{a0}\u{bb}\")))",
    );
}

#[test]
fn nested_quotes_alternate() {
    rendered_opts(
        "\"\"a ::\"\"b\"\"::{} c\"\"",
        Options {
            lang: "en".to_owned(),
            ..Options::default()
        },
        concat!(
            "((p (span \"\u{201c}\" \"a \"",
            " (span (span \"\u{2018}\" \"b\" \"\u{2019}\"))",
            " \" c\" \"\u{201d}\")))",
        ),
    );
}

#[test]
fn quote_language_strips_subtags() {
    rendered_opts(
        "\"\"x\"\"",
        Options {
            lang: "de-AT".to_owned(),
            ..Options::default()
        },
        "((p (span \"\u{201e}\" \"x\" \"\u{201c}\")))",
    );
}

#[test]
fn lang_attribute_scopes_quotes() {
    rendered(
        "::\"\"q\"\"::{lang=fr}",
        "((p (span (@ (lang . \"fr\")) (span \"\u{ab}\u{a0}\" \"q\" \"\u{a0}\u{bb}\"))))",
    );
}

#[test]
fn table_alignment_classes() {
    rendered(
        "|=<H1|=H2>\n|a|b",
        concat!(
            "((table",
            " (thead (tr (th (@ (class . \"left\")) \"H1\") (th (@ (class . \"right\")) \"H2\")))",
            " (tbody (tr (td (@ (class . \"left\")) \"a\") (td (@ (class . \"right\")) \"b\")))))",
        ),
    );
}

#[test]
fn region_classes_and_citations() {
    rendered(":::alert\nx\n:::", "((div (@ (class . \"alert\")) (p \"x\")))");
    rendered(
        "<<<\nw\n<<< Auth",
        "((blockquote (p \"w\") (cite \"Auth\")))",
    );
}

#[test]
fn embeds() {
    rendered(
        "{{alt|https://example.org/i.png}}",
        "((p (img (@ (alt . \"alt\") (src . \"https://example.org/i.png\")))))",
    );
    rendered(
        "{{https://example.org/d.svg}}",
        "((p (figure (embed (@ (src . \"https://example.org/d.svg\") (type . \"image/svg+xml\"))))))",
    );
}

#[test]
fn zettel_svg_embed_uses_the_id_path() {
    let tree = eval_tree(
        "(BLOCK (PARA (EMBED () (ZETTEL \"12345678901234\") \"svg\")))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(
        tree.to_string(),
        "((p (figure (embed (@ (src . \"/12345678901234.svg\") (type . \"image/svg+xml\"))))))",
    );
}

#[test]
fn blob_embeds_use_data_urls() {
    let tree = eval_tree(
        "(BLOCK (PARA (EMBED-BLOB () \"png\" \"AAAA\")))",
        Options::default(),
    )
    .unwrap();
    pretty_assertions::assert_eq!(
        tree.to_string(),
        "((p (img (@ (src . \"data:image/png;base64,AAAA\")))))",
    );
}

#[test]
fn citations_and_marks() {
    rendered("[@k, see]", "((p (span \"k\" \", \" \"see\")))");
    rendered("[!m|lbl]", "((p (a (@ (id . \"m\")) \"lbl\")))");
}

#[test]
fn transclusion() {
    rendered(
        "{{{https://example.org/i.png}}}",
        "((p (img (@ (src . \"https://example.org/i.png\")))))",
    );
    rendered("{{{00001234000000}}}", "()");
}

#[test]
fn unknown_tags_are_an_error() {
    let err = eval_tree("(BLOCK (BOGUS))", Options::default()).unwrap_err();
    assert_eq!(err, EvalError::UnknownTag("BOGUS"));
}

#[test]
fn the_first_error_latches() {
    let options = Options::default();
    let mut env = Environment::new(&options);
    let bad = crate::sx::read("(BLOCK (BOGUS))").unwrap();
    assert!(html::evaluate_blocks(&mut env, &bad).is_err());
    let good = crate::sx::read("(BLOCK (PARA (TEXT \"x\")))").unwrap();
    assert!(html::evaluate_blocks(&mut env, &good).is_err());
}
