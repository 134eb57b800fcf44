use super::*;

#[test]
fn every_form_in_one_block() {
    parsed(
        "::x::{key=val .c1 .c2 =dflt flag}",
        concat!(
            "(BLOCK (PARA (FORMAT-SPAN",
            " ((\"\" . \"dflt\") (\"class\" . \"c1 c2\") (\"flag\" . \"\") (\"key\" . \"val\"))",
            " (TEXT \"x\"))))",
        ),
    );
}

#[test]
fn quoted_values() {
    parsed(
        "::x::{title=\"a b\"}",
        "(BLOCK (PARA (FORMAT-SPAN ((\"title\" . \"a b\")) (TEXT \"x\"))))",
    );
}

#[test]
fn quoted_values_with_escapes() {
    parsed(
        "::x::{title=\"say \\\"hi\\\"\"}",
        "(BLOCK (PARA (FORMAT-SPAN ((\"title\" . \"say \\\"hi\\\"\")) (TEXT \"x\"))))",
    );
}

#[test]
fn comma_separators() {
    parsed(
        "::x::{a=1,b=2}",
        "(BLOCK (PARA (FORMAT-SPAN ((\"a\" . \"1\") (\"b\" . \"2\")) (TEXT \"x\"))))",
    );
}

#[test]
fn malformed_attributes_stay_text() {
    parsed(
        "::x::{unclosed",
        "(BLOCK (PARA (FORMAT-SPAN () (TEXT \"x\")) (TEXT \"{unclosed\")))",
    );
}

#[test]
fn block_attributes_may_span_lines() {
    parsed(
        "--- {.w\n.v}",
        "(BLOCK (THEMATIC ((\"class\" . \"w v\"))))",
    );
}

#[test]
fn later_values_overwrite() {
    parsed(
        "::x::{k=1 k=2}",
        "(BLOCK (PARA (FORMAT-SPAN ((\"k\" . \"2\")) (TEXT \"x\"))))",
    );
}
