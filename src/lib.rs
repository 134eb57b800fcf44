//! A parser and evaluator for [Zettelmarkup], the lightweight markup
//! language of zettel notes.
//!
//! The pipeline has three stages, each feeding the next:
//!
//! 1. [`parse_blocks`] turns UTF-8 input into the raw AST — an
//!    S-expression tree of tagged lists (see [`sx`]);
//! 2. [`postprocess::process`] normalises it (merges text runs, trims
//!    whitespace, infers table headers and alignments);
//! 3. [`html::evaluate_blocks`] translates the normalised tree into an
//!    HTML-shaped S-expression for a downstream writer.
//!
//! Parsing never fails: markup that doesn't parse becomes literal text.
//!
//! ```
//! let ast = zettelmark::parse_document("=== Hello\nSome __text__.");
//! assert!(ast.to_string().starts_with("(BLOCK (HEADING 1 ()"));
//! ```
//!
//! Rendering goes through an [`Environment`] carrying per-document state
//! (language stack, endnotes, unique id prefix):
//!
//! ```
//! use zettelmark::{Environment, Options};
//!
//! let ast = zettelmark::parse_document("* one\n* two");
//! let options = Options::default();
//! let mut env = Environment::new(&options);
//! let tree = zettelmark::html::evaluate_blocks(&mut env, &ast).unwrap();
//! assert_eq!(tree.to_string(), "((ul (li \"one\") (li \"two\")))");
//! ```
//!
//! [Zettelmarkup]: https://zettelstore.de/manual/h/00001007000000

mod attrs;
mod character_set;
mod ctype;
mod cursor;
mod encode;
mod entity;
pub mod html;
mod nodes;
mod parser;
pub mod postprocess;
mod refs;
mod strings;
pub mod sx;

#[cfg(test)]
mod tests;

pub use attrs::Attributes;
pub use cursor::Cursor;
pub use html::{Environment, EvalError, Options};
pub use refs::{RefState, Reference};
pub use sx::{Symbol, Value};

/// Parses a document into the raw `(BLOCK …)` AST, without
/// post-processing.
pub fn parse_blocks(src: &str) -> Value {
    encode::encode_block_slice(&parser::parse_block_slice(src))
}

/// Parses inline-only material (titles, metadata values) into a raw
/// `(INLINE …)` AST.
pub fn parse_inlines(src: &str) -> Value {
    encode::encode_inline_slice(&parser::parse_inline_slice(src))
}

/// Parses and post-processes a document: the canonical AST.
pub fn parse_document(src: &str) -> Value {
    postprocess::process(&parse_blocks(src))
}

/// Parses, post-processes, and evaluates a document to its HTML tree,
/// with collected endnotes appended as a trailing list.
pub fn to_html_tree(src: &str, options: &Options) -> Result<Value, EvalError> {
    let ast = parse_document(src);
    let mut env = Environment::new(options);
    let out = html::evaluate_blocks(&mut env, &ast)?;
    let notes = html::endnotes(&mut env);
    if notes.is_nil() {
        return Ok(out);
    }
    let mut items: Vec<Value> = out.iter().cloned().collect();
    items.push(notes);
    Ok(Value::list(items))
}
