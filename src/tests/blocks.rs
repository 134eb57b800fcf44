use super::*;

#[test]
fn heading() {
    parsed("=== Hello", "(BLOCK (HEADING 1 () \"\" \"\" (TEXT \"Hello\")))");
}

#[test]
fn heading_with_attributes() {
    parsed(
        "=== Hello {-}",
        "(BLOCK (HEADING 1 ((\"-\" . \"\")) \"\" \"\" (TEXT \"Hello\")))",
    );
}

#[test]
fn heading_levels() {
    parsed("==== Deep", "(BLOCK (HEADING 2 () \"\" \"\" (TEXT \"Deep\")))");
    parsed(
        "======== Max",
        "(BLOCK (HEADING 5 () \"\" \"\" (TEXT \"Max\")))",
    );
}

#[test]
fn heading_needs_three_markers() {
    parsed("== x", "(BLOCK (PARA (TEXT \"== x\")))");
}

#[test]
fn thematic_break() {
    parsed("---", "(BLOCK (THEMATIC ()))");
    parsed("--- {.wide}", "(BLOCK (THEMATIC ((\"class\" . \"wide\"))))");
}

#[test]
fn thematic_break_with_text_is_a_paragraph() {
    // The double hyphen turns into an en-dash on the paragraph fallback.
    parsed("--- x", "(BLOCK (PARA (TEXT \"\u{2013}- x\")))");
}

#[test]
fn verbatim_code() {
    parsed(
        "```go\nfmt.Println()\n```",
        "(BLOCK (VERBATIM-CODE ((\"\" . \"go\")) \"fmt.Println()\"))",
    );
}

#[test]
fn verbatim_multiline_body() {
    parsed(
        "~~~\none\ntwo\n~~~",
        "(BLOCK (VERBATIM-EVAL () \"one\\ntwo\"))",
    );
}

#[test]
fn verbatim_longer_close_run() {
    parsed("```\nx\n`````", "(BLOCK (VERBATIM-CODE () \"x\"))");
}

#[test]
fn verbatim_comment() {
    parsed("%%%\nhidden\n%%%", "(BLOCK (VERBATIM-COMMENT () \"hidden\"))");
}

#[test]
fn verbatim_math() {
    parsed("$$$\nE = mc^2\n$$$", "(BLOCK (VERBATIM-MATH () \"E = mc^2\"))");
}

#[test]
fn verbatim_unclosed_is_a_paragraph() {
    parsed(
        "```\ncode",
        "(BLOCK (PARA (TEXT \"```\") (SOFT) (TEXT \"code\")))",
    );
}

#[test]
fn region_block() {
    parsed(
        ":::note\ninner\n:::",
        "(BLOCK (REGION-BLOCK ((\"\" . \"note\")) (BLOCK (PARA (TEXT \"inner\")))))",
    );
}

#[test]
fn region_quote_with_citation() {
    parsed(
        "<<<\nwise\n<<< Someone",
        "(BLOCK (REGION-QUOTE () (BLOCK (PARA (TEXT \"wise\"))) (TEXT \"Someone\")))",
    );
}

#[test]
fn verse_hardens_spaces_and_breaks() {
    parsed(
        "\"\"\"\na b\nc d\n\"\"\"",
        "(BLOCK (REGION-VERSE () (BLOCK (PARA (TEXT \"a\u{a0}b\") (HARD) (TEXT \"c\u{a0}d\")))))",
    );
}

#[test]
fn paragraph_lines_join_with_soft_breaks() {
    parsed("a\nb", "(BLOCK (PARA (TEXT \"a\") (SOFT) (TEXT \"b\")))");
}

#[test]
fn blank_line_separates_paragraphs() {
    parsed(
        "a\n\nb",
        "(BLOCK (PARA (TEXT \"a\")) (PARA (TEXT \"b\")))",
    );
}

#[test]
fn failed_block_line_flows_back_into_paragraph() {
    parsed(
        "text\n--- x",
        "(BLOCK (PARA (TEXT \"text\") (SOFT) (TEXT \"\u{2013}- x\")))",
    );
}

#[test]
fn heading_ends_paragraph() {
    parsed(
        "text\n=== Head",
        "(BLOCK (PARA (TEXT \"text\")) (HEADING 1 () \"\" \"\" (TEXT \"Head\")))",
    );
}

#[test]
fn trailing_spaces_promote_soft_to_hard() {
    parsed("a  \nb", "(BLOCK (PARA (TEXT \"a\") (HARD) (TEXT \"b\")))");
}

#[test]
fn leading_spaces_are_trimmed() {
    parsed(" hello", "(BLOCK (PARA (TEXT \"hello\")))");
}

#[test]
fn description_list() {
    parsed(
        "; term\n: def",
        "(BLOCK (DESCRIPTION () ((TEXT \"term\")) (BLOCK (BLOCK (PARA (TEXT \"def\"))))))",
    );
}

#[test]
fn description_list_alternation() {
    parsed(
        "; t1\n: d1\n: d2\n; t2\n: d3",
        concat!(
            "(BLOCK (DESCRIPTION ()",
            " ((TEXT \"t1\"))",
            " (BLOCK (BLOCK (PARA (TEXT \"d1\"))) (BLOCK (PARA (TEXT \"d2\"))))",
            " ((TEXT \"t2\"))",
            " (BLOCK (BLOCK (PARA (TEXT \"d3\"))))))",
        ),
    );
}

#[test]
fn description_without_term_is_a_paragraph() {
    parsed(": alone", "(BLOCK (PARA (TEXT \": alone\")))");
}

#[test]
fn transclusion() {
    parsed(
        "{{{https://example.org/pic.png}}}",
        "(BLOCK (TRANSCLUDE () (EXTERNAL \"https://example.org/pic.png\")))",
    );
    parsed(
        "{{{00001234000000}}}",
        "(BLOCK (TRANSCLUDE () (ZETTEL \"00001234000000\")))",
    );
}

#[test]
fn empty_input_is_empty() {
    pretty_assertions::assert_eq!(crate::parse_document("").to_string(), "()");
    pretty_assertions::assert_eq!(crate::parse_document("\n\n").to_string(), "()");
}

#[test]
fn postprocess_is_idempotent_on_blocks() {
    idempotent("=== Hello {-}");
    idempotent("a  \nb");
    idempotent("\"\"\"\na b\nc d\n\"\"\"");
    idempotent("; t1\n: d1\n: d2");
    idempotent("text\n--- x");
}
