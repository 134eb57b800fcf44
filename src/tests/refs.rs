use pretty_assertions::assert_eq;

use crate::{RefState, Reference};

#[track_caller]
fn scanned(input: &str, state: RefState, value: &str) {
    let r = Reference::scan(input);
    assert_eq!(r.state, state, "input: {:?}", input);
    assert_eq!(r.value, value, "input: {:?}", input);
}

#[test]
fn zettel_identifiers() {
    scanned("12345678901234", RefState::Zettel, "12345678901234");
    scanned("00000001000000", RefState::Zettel, "00000001000000");
    scanned("12345678901234#frag", RefState::Zettel, "12345678901234#frag");
}

#[test]
fn the_zero_identifier_is_invalid() {
    scanned("00000000000000", RefState::Invalid, "00000000000000");
}

#[test]
fn short_digit_runs_are_not_identifiers() {
    scanned("1234", RefState::Hosted, "1234");
    scanned("123456789012345", RefState::Hosted, "123456789012345");
}

#[test]
fn empty_fragment_is_not_a_zettel() {
    // Falls through to path classification.
    scanned("12345678901234#", RefState::Hosted, "12345678901234#");
}

#[test]
fn query_expressions() {
    scanned("query:tag:rust", RefState::Query, "tag:rust");
}

#[test]
fn based_and_hosted_paths() {
    scanned("//static/css", RefState::Based, "/static/css");
    scanned("/top", RefState::Hosted, "/top");
    scanned("./here", RefState::Hosted, "./here");
    scanned("../up", RefState::Hosted, "../up");
    scanned("plain/path.txt", RefState::Hosted, "plain/path.txt");
}

#[test]
fn self_fragments() {
    scanned("#section", RefState::SelfRef, "#section");
    scanned("#", RefState::Invalid, "#");
}

#[test]
fn external_urls() {
    scanned(
        "https://example.org",
        RefState::External,
        "https://example.org",
    );
    scanned("mailto:a@b.example", RefState::External, "mailto:a@b.example");
}

#[test]
fn junk_is_invalid() {
    scanned("", RefState::Invalid, "");
    scanned("two words", RefState::Invalid, "two words");
}

#[test]
fn printing_round_trips() {
    for input in [
        "12345678901234",
        "12345678901234#frag",
        "#section",
        "/top",
        "//static/css",
        "./here",
        "query:tag:rust",
        "https://example.org",
        "plain/path.txt",
    ] {
        let r = Reference::scan(input);
        assert!(r.is_valid(), "input: {:?}", input);
        assert_eq!(Reference::scan(&r.to_string()), r, "input: {:?}", input);
    }
}

#[test]
fn value_encoding_round_trips() {
    let r = Reference::scan("12345678901234");
    assert_eq!(r.to_value().to_string(), "(ZETTEL \"12345678901234\")");
    assert_eq!(Reference::from_value(&r.to_value()), Some(r));
}

#[test]
fn zid_strips_the_fragment() {
    let r = Reference::scan("12345678901234#frag");
    assert_eq!(r.zid(), Some("12345678901234"));
    assert_eq!(Reference::scan("#frag").zid(), None);
}
