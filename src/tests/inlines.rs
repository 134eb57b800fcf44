use super::*;

#[test]
fn emphasis() {
    parsed("__a__", "(BLOCK (PARA (FORMAT-EMPH () (TEXT \"a\"))))");
}

#[test]
fn strong_inside_text() {
    parsed(
        "a **b** c",
        "(BLOCK (PARA (TEXT \"a \") (FORMAT-STRONG () (TEXT \"b\")) (TEXT \" c\")))",
    );
}

#[test]
fn formats_nest() {
    parsed(
        "**__x__**",
        "(BLOCK (PARA (FORMAT-STRONG () (FORMAT-EMPH () (TEXT \"x\")))))",
    );
}

#[test]
fn insert_delete_super_sub() {
    parsed(">>new>>", "(BLOCK (PARA (FORMAT-INSERT () (TEXT \"new\"))))");
    parsed("~~old~~", "(BLOCK (PARA (FORMAT-DELETE () (TEXT \"old\"))))");
    parsed("x^^2^^", "(BLOCK (PARA (TEXT \"x\") (FORMAT-SUPER () (TEXT \"2\"))))");
    parsed("x,,i,,", "(BLOCK (PARA (TEXT \"x\") (FORMAT-SUB () (TEXT \"i\"))))");
}

#[test]
fn highlight_and_quote() {
    parsed("##hl##", "(BLOCK (PARA (FORMAT-MARK () (TEXT \"hl\"))))");
    parsed("\"\"q\"\"", "(BLOCK (PARA (FORMAT-QUOTE () (TEXT \"q\"))))");
}

#[test]
fn format_spans_lines() {
    parsed(
        "__a\nb__",
        "(BLOCK (PARA (FORMAT-EMPH () (TEXT \"a\") (SOFT) (TEXT \"b\"))))",
    );
}

#[test]
fn unclosed_format_is_text() {
    parsed("__abc", "(BLOCK (PARA (TEXT \"__abc\")))");
}

#[test]
fn literals() {
    parsed("``a<b``", "(BLOCK (PARA (LITERAL-CODE () \"a<b\")))");
    parsed("''rm -rf''", "(BLOCK (PARA (LITERAL-INPUT () \"rm -rf\")))");
    parsed("==done==", "(BLOCK (PARA (LITERAL-OUTPUT () \"done\")))");
    parsed("$$x^2$$", "(BLOCK (PARA (LITERAL-MATH () \"x^2\")))");
}

#[test]
fn named_entity() {
    parsed("a &amp; b", "(BLOCK (PARA (TEXT \"a & b\")))");
}

#[test]
fn numeric_entities() {
    parsed("&#65;&#x42;", "(BLOCK (PARA (TEXT \"AB\")))");
}

#[test]
fn entity_below_space_is_rejected() {
    parsed("&#10;", "(BLOCK (PARA (TEXT \"&#10;\")))");
    parsed("&bogusname;", "(BLOCK (PARA (TEXT \"&bogusname;\")))");
}

#[test]
fn backslash_escapes() {
    parsed("a\\_b", "(BLOCK (PARA (TEXT \"a_b\")))");
}

#[test]
fn backslash_at_line_end_is_a_hard_break() {
    parsed("a\\\nb", "(BLOCK (PARA (TEXT \"a\") (HARD) (TEXT \"b\")))");
}

#[test]
fn double_hyphen_is_an_en_dash() {
    parsed("1--2", "(BLOCK (PARA (TEXT \"1\u{2013}2\")))");
}

#[test]
fn inline_comment_runs_to_line_end() {
    parsed(
        "x %% note",
        "(BLOCK (PARA (TEXT \"x \") (LITERAL-COMMENT () \"note\")))",
    );
}

#[test]
fn link_external() {
    parsed(
        "[[Example|https://example.org]]",
        "(BLOCK (PARA (LINK-EXTERNAL () \"https://example.org\" (TEXT \"Example\"))))",
    );
}

#[test]
fn link_query() {
    parsed(
        "[[query:tag:rust]]",
        "(BLOCK (PARA (LINK-QUERY () \"tag:rust\")))",
    );
}

#[test]
fn link_states() {
    parsed(
        "[[12345678901234]]",
        "(BLOCK (PARA (LINK-ZETTEL () \"12345678901234\")))",
    );
    parsed(
        "[[12345678901234#sec]]",
        "(BLOCK (PARA (LINK-ZETTEL () \"12345678901234#sec\")))",
    );
    parsed(
        "[[docs/readme.txt]]",
        "(BLOCK (PARA (LINK-HOSTED () \"docs/readme.txt\")))",
    );
    parsed("[[//static/x]]", "(BLOCK (PARA (LINK-BASED () \"/static/x\")))");
    parsed("[[#top]]", "(BLOCK (PARA (LINK-SELF () \"#top\")))");
    parsed(
        "[[00000000000000]]",
        "(BLOCK (PARA (LINK-INVALID () \"00000000000000\")))",
    );
}

#[test]
fn link_with_attributes() {
    parsed(
        "[[x|https://example.org]]{.ext}",
        "(BLOCK (PARA (LINK-EXTERNAL ((\"class\" . \"ext\")) \"https://example.org\" (TEXT \"x\"))))",
    );
}

#[test]
fn unclosed_link_is_text() {
    parsed("[[nope", "(BLOCK (PARA (TEXT \"[[nope\")))");
}

#[test]
fn embed_with_label() {
    parsed(
        "{{alt text|https://example.org/i.png}}",
        "(BLOCK (PARA (EMBED () (EXTERNAL \"https://example.org/i.png\") \"png\" (TEXT \"alt text\"))))",
    );
}

#[test]
fn embed_syntax_from_extension() {
    parsed(
        "{{https://example.org/d.svg}}",
        "(BLOCK (PARA (EMBED () (EXTERNAL \"https://example.org/d.svg\") \"svg\")))",
    );
}

#[test]
fn citation() {
    parsed("[@knuth84]", "(BLOCK (PARA (CITE () \"knuth84\")))");
    parsed(
        "[@knuth84, p. 7]",
        "(BLOCK (PARA (CITE () \"knuth84\" (TEXT \"p. 7\"))))",
    );
}

#[test]
fn endnote() {
    parsed("[^a note]", "(BLOCK (PARA (ENDNOTE () (TEXT \"a note\"))))");
}

#[test]
fn mark() {
    parsed("[!anchor]", "(BLOCK (PARA (MARK \"anchor\" \"\" \"\")))");
    parsed(
        "[!a|lbl]",
        "(BLOCK (PARA (MARK \"a\" \"\" \"\" (TEXT \"lbl\"))))",
    );
}

#[test]
fn link_like_nesting_is_capped() {
    let v = crate::parse_document("[^a [^b [^c [^d [^e [^f]]]]]]");
    let printed = v.to_string();
    // The sixth level is beyond the cap and stays literal text inside the
    // fifth note.
    assert!(printed.contains("(ENDNOTE () (TEXT \"e [^f]\"))"), "{}", printed);
}

#[test]
fn inline_only_parsing() {
    let v = crate::postprocess::process(&crate::parse_inlines("a __b__"));
    pretty_assertions::assert_eq!(
        v.to_string(),
        "(INLINE (TEXT \"a \") (FORMAT-EMPH () (TEXT \"b\")))"
    );
}
