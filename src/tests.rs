mod attributes;
mod blocks;
mod endnotes;
mod inlines;
mod refs;
mod rendering;

use crate::{html, postprocess, Environment, EvalError, Options, Value};

/// Asserts the canonical printed form of the parsed and post-processed
/// document.
#[track_caller]
pub(crate) fn parsed(input: &str, expected: &str) {
    let v = crate::parse_document(input);
    pretty_assertions::assert_eq!(v.to_string(), expected, "input: {:?}", input);
}

/// Asserts that post-processing is idempotent on the given input.
#[track_caller]
pub(crate) fn idempotent(input: &str) {
    let once = crate::parse_document(input);
    let twice = postprocess::process(&once);
    pretty_assertions::assert_eq!(twice.to_string(), once.to_string(), "input: {:?}", input);
}

/// Asserts the printed HTML tree of a full pipeline run with default
/// options.
#[track_caller]
pub(crate) fn rendered(input: &str, expected: &str) {
    rendered_opts(input, Options::default(), expected);
}

#[track_caller]
pub(crate) fn rendered_opts(input: &str, options: Options, expected: &str) {
    let tree = crate::to_html_tree(input, &options).unwrap();
    pretty_assertions::assert_eq!(tree.to_string(), expected, "input: {:?}", input);
}

/// Evaluates an AST given in canonical printed form.
#[track_caller]
pub(crate) fn eval_tree(ast: &str, options: Options) -> Result<Value, EvalError> {
    let v = crate::sx::read(ast).unwrap();
    let mut env = Environment::new(&options);
    html::evaluate_blocks(&mut env, &v)
}
