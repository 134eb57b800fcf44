//! The HTML evaluator: walks a post-processed AST and produces the
//! HTML-as-S-expression tree.
//!
//! Elements are `(tag (@ (key . "value") …) child…)`; the attribute
//! marker is omitted when there are no attributes.  String children are
//! escaped by the consumer's writer, except under `(NO-ESCAPE …)`.
//! Endnotes collect into the environment during the walk and materialise
//! through [`endnotes`] afterwards.

mod context;

use thiserror::Error;

use crate::attrs::Attributes;
use crate::refs::{RefState, Reference};
use crate::strings;
use crate::sx::{parse_list, sym, ShapeError, Symbol, Value};

pub use context::Environment;
use context::Endnote;

/// Options for one evaluation.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// The document language, seeding the language stack.  Nodes carrying
    /// a `lang` attribute push onto it for their subtree.
    pub lang: String,

    /// Added to every heading's level before the `h<n>` tag is emitted.
    pub heading_offset: i64,

    /// Prepended to every generated identifier (endnote ids, heading and
    /// mark fragments) so several documents can share one DOM.
    pub unique: String,

    /// Renders every link-like node as a span instead of an anchor; for
    /// preview contexts.
    pub no_links: bool,
}

/// Evaluation failure.  The first one is recorded on the environment;
/// partial output up to the failure point may still be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown tag {0:?}")]
    UnknownTag(&'static str),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("expected a {0}")]
    UnexpectedShape(&'static str),
}

/// Evaluates a `(BLOCK …)` tree to a list of HTML elements.
pub fn evaluate_blocks(env: &mut Environment, v: &Value) -> Result<Value, EvalError> {
    if let Some(e) = env.error() {
        return Err(e.clone());
    }
    if v.is_nil() {
        return Ok(Value::Nil);
    }
    if v.node_tag() != Some(sym::BLOCK) {
        let e = EvalError::UnexpectedShape("BLOCK list");
        env.err = Some(e.clone());
        return Err(e);
    }
    let out = eval_blocks(env, v.tail());
    finish(env, Value::list(out))
}

/// Evaluates an `(INLINE …)` tree to a list of HTML nodes.
pub fn evaluate_inlines(env: &mut Environment, v: &Value) -> Result<Value, EvalError> {
    if let Some(e) = env.error() {
        return Err(e.clone());
    }
    if v.is_nil() {
        return Ok(Value::Nil);
    }
    if v.node_tag() != Some(sym::INLINE) {
        let e = EvalError::UnexpectedShape("INLINE list");
        env.err = Some(e.clone());
        return Err(e);
    }
    let out = eval_inlines(env, v.tail());
    finish(env, Value::list(out))
}

/// Materialises the endnotes collected so far as a trailing ordered list,
/// or nil when none were collected.  A note body may register further
/// notes; they are rendered by the same call.
pub fn endnotes(env: &mut Environment) -> Value {
    if env.endnotes.is_empty() {
        return Value::Nil;
    }
    let mut ol_attrs = Attributes::new();
    ol_attrs.set("class", "zs-endnotes");
    let mut items = Vec::new();
    let mut i = 0;
    while i < env.endnotes.len() {
        let note = env.endnotes[i].clone();
        let n = i + 1;
        let note_id = format!("{}{}", env.options.unique, n);
        let rendered = env.scoped_lang(&note.attrs, |env| eval_inlines(env, &note.inlines));

        let mut li_attrs = Attributes::new();
        li_attrs.set("id", &format!("fn:{}", note_id));
        li_attrs.set("role", "doc-endnote");
        li_attrs.set("value", &n.to_string());

        let mut back_attrs = Attributes::new();
        back_attrs.set("href", &format!("#fnref:{}", note_id));
        back_attrs.set("role", "doc-backlink");

        let mut children = rendered;
        children.push(Value::string(" "));
        children.push(element(
            sym::A,
            attrs_value(&back_attrs),
            vec![Value::string("\u{21a9}")],
        ));
        items.push(element(sym::LI, attrs_value(&li_attrs), children));
        i += 1;
    }
    element(sym::OL, attrs_value(&ol_attrs), items)
}

/// Flattens an inline tree to its plain text, as used for `alt` texts.
pub fn text_of(v: &Value) -> String {
    let mut out = String::new();
    collect_text(v, &mut out);
    out
}

fn finish(env: &Environment, v: Value) -> Result<Value, EvalError> {
    match env.error() {
        Some(e) => Err(e.clone()),
        None => Ok(v),
    }
}

fn fail(env: &mut Environment, err: EvalError) -> Value {
    if env.err.is_none() {
        env.err = Some(err);
    }
    Value::Nil
}

fn shape(env: &mut Environment, v: &Value, spec: &str) -> Option<Vec<Value>> {
    match parse_list(v, spec) {
        Ok(fields) => Some(fields),
        Err(e) => {
            fail(env, e.into());
            None
        }
    }
}

fn eval_blocks(env: &mut Environment, list: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    for child in list.iter() {
        let v = eval_block(env, child);
        if !v.is_nil() {
            out.push(v);
        }
    }
    out
}

fn eval_block(env: &mut Environment, v: &Value) -> Value {
    if env.err.is_some() {
        return Value::Nil;
    }
    let Some(tag) = v.node_tag() else {
        return fail(env, EvalError::UnexpectedShape("tagged block node"));
    };
    match tag {
        sym::PARA => {
            let children = eval_inlines(env, v.tail());
            element(sym::P, Value::Nil, children)
        }
        sym::HEADING => eval_heading(env, v),
        sym::THEMATIC => {
            let Some(f) = shape(env, v.tail(), "o") else {
                return Value::Nil;
            };
            let a = html_attrs(&Attributes::from_value(&f[0]));
            element(sym::HR, attrs_value(&a), Vec::new())
        }
        sym::REGION_BLOCK | sym::REGION_VERSE => eval_region(env, v, sym::DIV),
        sym::REGION_QUOTE => eval_region(env, v, sym::BLOCKQUOTE),
        sym::VERBATIM_CODE
        | sym::VERBATIM_EVAL
        | sym::VERBATIM_COMMENT
        | sym::VERBATIM_HTML
        | sym::VERBATIM_MATH
        | sym::VERBATIM_ZETTEL => eval_verbatim(env, v, tag),
        sym::ORDERED => eval_list(env, v, sym::OL),
        sym::UNORDERED => eval_list(env, v, sym::UL),
        sym::QUOTATION => eval_quotation(env, v),
        sym::DESCRIPTION => eval_description(env, v),
        sym::TABLE => eval_table(env, v),
        sym::TRANSCLUDE => eval_transclude(env, v),
        _ => fail(env, EvalError::UnknownTag(tag.name())),
    }
}

fn eval_heading(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "iossr") else {
        return Value::Nil;
    };
    let level = f[0].as_int().unwrap();
    let attrs = Attributes::from_value(&f[1]);
    let fragment = f[3].as_str().unwrap().to_owned();
    let children = env.scoped_lang(&attrs, |env| eval_inlines(env, &f[4]));

    let mut a = html_attrs(&attrs);
    if !fragment.is_empty() {
        a.set("id", &format!("{}{}", env.options.unique, fragment));
    }
    let level = (level + env.options.heading_offset).clamp(1, 6);
    let tag = [sym::H1, sym::H2, sym::H3, sym::H4, sym::H5, sym::H6][(level - 1) as usize];
    element(tag, attrs_value(&a), children)
}

fn eval_region(env: &mut Environment, v: &Value, tag: Symbol) -> Value {
    let Some(f) = shape(env, v.tail(), "opr") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let mut a = html_attrs(&attrs);
    if let Some(d) = attrs.get("") {
        if !d.is_empty() {
            a.add_class(d);
        }
    }
    let children = env.scoped_lang(&attrs, |env| {
        let mut ch = eval_blocks(env, f[1].tail());
        let cite = eval_inlines(env, &f[2]);
        if !cite.is_empty() {
            ch.push(element(sym::CITE_TAG, Value::Nil, cite));
        }
        ch
    });
    element(tag, attrs_value(&a), children)
}

fn eval_verbatim(env: &mut Environment, v: &Value, tag: Symbol) -> Value {
    let Some(f) = shape(env, v.tail(), "os") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let content = f[1].as_str().unwrap();
    match tag {
        sym::VERBATIM_ZETTEL => Value::Nil,
        sym::VERBATIM_HTML => {
            if strings::is_unsafe_html(content) {
                Value::Nil
            } else {
                element(sym::NO_ESCAPE, Value::Nil, vec![Value::string(content)])
            }
        }
        sym::VERBATIM_COMMENT => {
            let mut a = html_attrs(&attrs);
            if a.remove("-").is_some() {
                element(sym::COMMENT, Value::Nil, vec![Value::string(content)])
            } else {
                Value::Nil
            }
        }
        _ => {
            let (a, content) = code_styling(&attrs, content);
            let code = element(sym::CODE, attrs_value(&a), vec![Value::string(content)]);
            element(sym::PRE, Value::Nil, vec![code])
        }
    }
}

/// The default attribute of a code-like node is its language and becomes
/// `class="language-<val>"`; a `-` attribute makes spaces visible.
fn code_styling(attrs: &Attributes, content: &str) -> (Attributes, String) {
    let mut a = attrs.clone();
    if let Some(lang) = a.remove("") {
        if !lang.is_empty() {
            a.add_class(&format!("language-{}", lang));
        }
    }
    let content = if a.remove("-").is_some() {
        strings::make_visible(content)
    } else {
        content.to_owned()
    };
    (a, content)
}

fn eval_list(env: &mut Environment, v: &Value, tag: Symbol) -> Value {
    let Some(f) = shape(env, v.tail(), "or") else {
        return Value::Nil;
    };
    let a = html_attrs(&Attributes::from_value(&f[0]));
    let mut items = Vec::new();
    for item in f[1].iter() {
        let content = eval_item_content(env, item);
        items.push(element(sym::LI, Value::Nil, content));
    }
    element(tag, attrs_value(&a), items)
}

/// The content of a list item or description: a lone paragraph contributes
/// its inlines directly, anything else its blocks.
fn eval_item_content(env: &mut Environment, item: &Value) -> Vec<Value> {
    let blocks = item.tail();
    let mut iter = blocks.iter();
    if let Some(first) = iter.next() {
        if iter.next().is_none() && first.node_tag() == Some(sym::PARA) {
            return eval_inlines(env, first.tail());
        }
    }
    eval_blocks(env, blocks)
}

fn eval_quotation(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "or") else {
        return Value::Nil;
    };
    let a = html_attrs(&Attributes::from_value(&f[0]));
    let mut children = Vec::new();
    for item in f[1].iter() {
        children.extend(eval_blocks(env, item.tail()));
    }
    element(sym::BLOCKQUOTE, attrs_value(&a), children)
}

fn eval_description(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "or") else {
        return Value::Nil;
    };
    let a = html_attrs(&Attributes::from_value(&f[0]));
    let mut children = Vec::new();
    let mut iter = f[1].iter();
    while let Some(term) = iter.next() {
        let dt = eval_inlines(env, term);
        children.push(element(sym::DT, Value::Nil, dt));
        if let Some(descr) = iter.next() {
            for item in descr.tail().iter() {
                let content = eval_item_content(env, item);
                children.push(element(sym::DD, Value::Nil, content));
            }
        }
    }
    element(sym::DL, attrs_value(&a), children)
}

fn eval_table(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "or") else {
        return Value::Nil;
    };
    let header = &f[0];
    let mut children = Vec::new();
    if header.is_pair() {
        let tr = element(sym::TR, Value::Nil, eval_row(env, header, sym::TH));
        children.push(element(sym::THEAD, Value::Nil, vec![tr]));
    }
    let rows: Vec<Value> = f[1]
        .iter()
        .map(|row| element(sym::TR, Value::Nil, eval_row(env, row, sym::TD)))
        .collect();
    if !rows.is_empty() {
        children.push(element(sym::TBODY, Value::Nil, rows));
    }
    element(sym::TABLE_TAG, Value::Nil, children)
}

fn eval_row(env: &mut Environment, row: &Value, cell_tag: Symbol) -> Vec<Value> {
    let mut cells = Vec::new();
    for cell in row.iter() {
        let class = match cell.node_tag() {
            Some(sym::CELL_LEFT) => Some("left"),
            Some(sym::CELL_CENTER) => Some("center"),
            Some(sym::CELL_RIGHT) => Some("right"),
            _ => None,
        };
        let mut a = Attributes::new();
        if let Some(c) = class {
            a.set("class", c);
        }
        let children = eval_inlines(env, cell.tail());
        cells.push(element(cell_tag, attrs_value(&a), children));
    }
    cells
}

fn eval_transclude(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "op") else {
        return Value::Nil;
    };
    let Some(reference) = Reference::from_value(&f[1]) else {
        return fail(env, EvalError::UnexpectedShape("reference"));
    };
    // Resolution against the note store happens elsewhere; only external
    // material can be shown directly.
    match reference.state {
        RefState::External => {
            let mut a = html_attrs(&Attributes::from_value(&f[0]));
            a.set("src", &reference.value);
            let img = element(sym::IMG, attrs_value(&a), Vec::new());
            element(sym::P, Value::Nil, vec![img])
        }
        _ => Value::Nil,
    }
}

fn eval_inlines(env: &mut Environment, list: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    for child in list.iter() {
        let v = eval_inline(env, child);
        if !v.is_nil() {
            out.push(v);
        }
    }
    out
}

fn eval_inline(env: &mut Environment, v: &Value) -> Value {
    if env.err.is_some() {
        return Value::Nil;
    }
    if v.as_str().is_some() {
        return v.clone();
    }
    let Some(tag) = v.node_tag() else {
        return fail(env, EvalError::UnexpectedShape("tagged inline node"));
    };
    match tag {
        sym::TEXT => {
            let Some(f) = shape(env, v.tail(), "s") else {
                return Value::Nil;
            };
            f[0].clone()
        }
        sym::SPACE => Value::string(" "),
        sym::SOFT => Value::string("\n"),
        sym::HARD => element(sym::BR, Value::Nil, Vec::new()),
        sym::LINK_ZETTEL
        | sym::LINK_SELF
        | sym::LINK_FOUND
        | sym::LINK_BROKEN
        | sym::LINK_HOSTED
        | sym::LINK_BASED
        | sym::LINK_QUERY
        | sym::LINK_EXTERNAL
        | sym::LINK_INVALID => eval_link(env, v, tag),
        sym::EMBED => eval_embed(env, v),
        sym::EMBED_BLOB => eval_embed_blob(env, v),
        sym::CITE => eval_cite(env, v),
        sym::ENDNOTE => eval_endnote(env, v),
        sym::MARK => eval_mark(env, v),
        sym::FORMAT_EMPH
        | sym::FORMAT_STRONG
        | sym::FORMAT_INSERT
        | sym::FORMAT_DELETE
        | sym::FORMAT_SUPER
        | sym::FORMAT_SUB
        | sym::FORMAT_QUOTE
        | sym::FORMAT_MARK
        | sym::FORMAT_SPAN => eval_format(env, v, tag),
        sym::LITERAL_CODE
        | sym::LITERAL_HTML
        | sym::LITERAL_INPUT
        | sym::LITERAL_OUTPUT
        | sym::LITERAL_MATH
        | sym::LITERAL_COMMENT
        | sym::LITERAL_ZETTEL => eval_literal(env, v, tag),
        _ => fail(env, EvalError::UnknownTag(tag.name())),
    }
}

fn eval_link(env: &mut Environment, v: &Value, tag: Symbol) -> Value {
    let Some(f) = shape(env, v.tail(), "osr") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let raw = f[1].as_str().unwrap();
    let mut children = env.scoped_lang(&attrs, |env| eval_inlines(env, &f[2]));
    if children.is_empty() {
        children.push(Value::string(raw));
    }
    if env.options.no_links || tag == sym::LINK_INVALID {
        return element(sym::SPAN, attrs_value(&html_attrs(&attrs)), children);
    }
    let mut a = html_attrs(&attrs);
    match tag {
        sym::LINK_BROKEN => {
            a.set("href", raw);
            a.add_class("broken");
        }
        sym::LINK_EXTERNAL => {
            a.set("href", raw);
            a.add_class("external");
        }
        sym::LINK_QUERY => {
            a.set("href", &format!("?q={}", query_escape(raw)));
        }
        _ => {
            a.set("href", raw);
        }
    }
    element(sym::A, attrs_value(&a), children)
}

fn eval_embed(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "opsr") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let Some(reference) = Reference::from_value(&f[1]) else {
        return fail(env, EvalError::UnexpectedShape("reference"));
    };
    let syntax = f[2].as_str().unwrap();

    if syntax == "svg" {
        let src = match reference.zid() {
            Some(zid) => format!("/{}.svg", zid),
            None => reference.value.clone(),
        };
        let mut a = html_attrs(&attrs);
        a.set("type", "image/svg+xml");
        a.set("src", &src);
        let embed = element(sym::EMBED_TAG, attrs_value(&a), Vec::new());
        return element(sym::FIGURE, Value::Nil, vec![embed]);
    }

    let mut a = html_attrs(&attrs);
    a.set("src", &reference.value);
    let alt = text_of(&f[3]);
    if !alt.is_empty() {
        a.set("alt", &alt);
    }
    element(sym::IMG, attrs_value(&a), Vec::new())
}

fn eval_embed_blob(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "ossr") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let syntax = f[1].as_str().unwrap();
    let data = f[2].as_str().unwrap();
    let mut a = html_attrs(&attrs);
    a.set("src", &format!("data:image/{};base64,{}", syntax, data));
    let alt = text_of(&f[3]);
    if !alt.is_empty() {
        a.set("alt", &alt);
    }
    element(sym::IMG, attrs_value(&a), Vec::new())
}

fn eval_cite(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "osr") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let key = f[1].as_str().unwrap();
    let inner = env.scoped_lang(&attrs, |env| eval_inlines(env, &f[2]));
    let mut children = vec![Value::string(key)];
    if !inner.is_empty() {
        children.push(Value::string(", "));
        children.extend(inner);
    }
    element(sym::SPAN, attrs_value(&html_attrs(&attrs)), children)
}

fn eval_endnote(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "or") else {
        return Value::Nil;
    };
    let mut attrs = Attributes::from_value(&f[0]);
    if attrs.get("lang").is_none() && !env.lang().is_empty() {
        // Freeze the language in effect; the body renders at emission.
        let lang = env.lang().to_owned();
        attrs.set("lang", &lang);
    }
    let n = env.endnotes.len() + 1;
    let note_id = format!("{}{}", env.options.unique, n);
    env.endnotes.push(Endnote {
        attrs,
        inlines: f[1].clone(),
    });

    let mut sup_attrs = Attributes::new();
    sup_attrs.set("id", &format!("fnref:{}", note_id));
    let mut a_attrs = Attributes::new();
    a_attrs.set("href", &format!("#fn:{}", note_id));
    a_attrs.set("role", "doc-noteref");
    let link = element(
        sym::A,
        attrs_value(&a_attrs),
        vec![Value::string(n.to_string())],
    );
    element(sym::SUP, attrs_value(&sup_attrs), vec![link])
}

fn eval_mark(env: &mut Environment, v: &Value) -> Value {
    let Some(f) = shape(env, v.tail(), "sssr") else {
        return Value::Nil;
    };
    let mark = f[0].as_str().unwrap();
    let fragment = f[2].as_str().unwrap();
    let children = eval_inlines(env, &f[3]);
    if env.options.no_links {
        return element(sym::SPAN, Value::Nil, children);
    }
    let mut a = Attributes::new();
    let anchor = if fragment.is_empty() { mark } else { fragment };
    if !anchor.is_empty() {
        a.set("id", &format!("{}{}", env.options.unique, anchor));
    }
    element(sym::A, attrs_value(&a), children)
}

fn eval_format(env: &mut Environment, v: &Value, tag: Symbol) -> Value {
    let Some(f) = shape(env, v.tail(), "or") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    if tag == sym::FORMAT_QUOTE {
        return eval_quote_format(env, &attrs, &f[1]);
    }
    let html_tag = match tag {
        sym::FORMAT_EMPH => sym::EM,
        sym::FORMAT_STRONG => sym::STRONG,
        sym::FORMAT_INSERT => sym::INS,
        sym::FORMAT_DELETE => sym::DEL,
        sym::FORMAT_SUPER => sym::SUP,
        sym::FORMAT_SUB => sym::SUB,
        sym::FORMAT_MARK => sym::MARK_TAG,
        _ => sym::SPAN,
    };
    let children = env.scoped_lang(&attrs, |env| eval_inlines(env, &f[1]));
    let mut a = html_attrs(&attrs);
    if let Some(d) = attrs.get("") {
        if !d.is_empty() {
            a.add_class(d);
        }
    }
    element(html_tag, attrs_value(&a), children)
}

/// Quote characters by language and nesting depth.  Resolution strips
/// BCP-47 subtags right to left until a key matches, falling back to the
/// neutral pair.
const QUOTE_TABLE: &[(&str, [&str; 4], bool)] = &[
    ("", ["\"", "\"", "\"", "\""], false),
    ("en", ["\u{201c}", "\u{201d}", "\u{2018}", "\u{2019}"], false),
    ("de", ["\u{201e}", "\u{201c}", "\u{201a}", "\u{2018}"], false),
    ("fr", ["\u{ab}", "\u{bb}", "\u{2039}", "\u{203a}"], true),
];

fn quote_chars(lang: &str, secondary: bool) -> (&'static str, &'static str, bool) {
    let mut key = lang;
    let entry = loop {
        if let Some(e) = QUOTE_TABLE.iter().find(|(k, _, _)| *k == key) {
            break e;
        }
        match key.rsplit_once('-') {
            Some((head, _)) => key = head,
            None => break &QUOTE_TABLE[0],
        }
    };
    let q = &entry.1;
    if secondary {
        (q[2], q[3], entry.2)
    } else {
        (q[0], q[1], entry.2)
    }
}

fn eval_quote_format(env: &mut Environment, attrs: &Attributes, inlines: &Value) -> Value {
    let secondary = env.quote_nesting % 2 == 1;
    let children = env.scoped_lang(attrs, |env| {
        let (open, close, nbsp) = quote_chars(env.lang(), secondary);
        env.quote_nesting += 1;
        let mut ch = Vec::new();
        ch.push(Value::string(if nbsp {
            format!("{}\u{a0}", open)
        } else {
            open.to_owned()
        }));
        ch.extend(eval_inlines(env, inlines));
        ch.push(Value::string(if nbsp {
            format!("\u{a0}{}", close)
        } else {
            close.to_owned()
        }));
        env.quote_nesting -= 1;
        ch
    });
    element(sym::SPAN, attrs_value(&html_attrs(attrs)), children)
}

fn eval_literal(env: &mut Environment, v: &Value, tag: Symbol) -> Value {
    let Some(f) = shape(env, v.tail(), "os") else {
        return Value::Nil;
    };
    let attrs = Attributes::from_value(&f[0]);
    let content = f[1].as_str().unwrap();
    match tag {
        sym::LITERAL_ZETTEL => Value::Nil,
        sym::LITERAL_HTML => {
            if strings::is_unsafe_html(content) {
                Value::Nil
            } else {
                element(sym::NO_ESCAPE, Value::Nil, vec![Value::string(content)])
            }
        }
        sym::LITERAL_COMMENT => {
            let mut a = html_attrs(&attrs);
            if a.remove("-").is_some() {
                element(sym::COMMENT, Value::Nil, vec![Value::string(content)])
            } else {
                Value::Nil
            }
        }
        _ => {
            let (a, content) = code_styling(&attrs, content);
            let html_tag = match tag {
                sym::LITERAL_INPUT => sym::KBD,
                sym::LITERAL_OUTPUT => sym::SAMP,
                _ => sym::CODE,
            };
            element(html_tag, attrs_value(&a), vec![Value::string(content)])
        }
    }
}

/// Copies a node's attributes for HTML output, dropping the default
/// attribute (its meaning is per-node).
fn html_attrs(a: &Attributes) -> Attributes {
    let mut a = a.clone();
    a.remove("");
    a
}

/// Encodes an attribute set as the `(@ (key . "value") …)` marker, or nil
/// when empty.  Keys are symbols, values strings.
fn attrs_value(a: &Attributes) -> Value {
    if a.is_empty() {
        return Value::Nil;
    }
    let pairs: Vec<Value> = a
        .iter()
        .map(|(k, v)| Value::cons(Value::symbol(k), Value::string(v)))
        .collect();
    Value::cons(Value::Symbol(sym::ATTR), Value::list(pairs))
}

fn element(tag: Symbol, attrs: Value, children: Vec<Value>) -> Value {
    let mut items = Vec::with_capacity(children.len() + 1);
    if !attrs.is_nil() {
        items.push(attrs);
    }
    items.extend(children);
    Value::tagged(tag, items)
}

fn query_escape(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn collect_text(list: &Value, out: &mut String) {
    for node in list.iter() {
        let Some(tag) = node.node_tag() else {
            if let Some(s) = node.as_str() {
                out.push_str(s);
            }
            continue;
        };
        match tag {
            sym::TEXT => {
                if let Some(s) = node.head().and_then(Value::as_str) {
                    out.push_str(s);
                }
            }
            sym::SPACE | sym::SOFT | sym::HARD => out.push(' '),
            sym::FORMAT_EMPH
            | sym::FORMAT_STRONG
            | sym::FORMAT_INSERT
            | sym::FORMAT_DELETE
            | sym::FORMAT_SUPER
            | sym::FORMAT_SUB
            | sym::FORMAT_QUOTE
            | sym::FORMAT_MARK
            | sym::FORMAT_SPAN
            | sym::ENDNOTE => collect_text(rest_after(node, 1), out),
            sym::CITE
            | sym::LINK_ZETTEL
            | sym::LINK_SELF
            | sym::LINK_FOUND
            | sym::LINK_BROKEN
            | sym::LINK_HOSTED
            | sym::LINK_BASED
            | sym::LINK_QUERY
            | sym::LINK_EXTERNAL
            | sym::LINK_INVALID => collect_text(rest_after(node, 2), out),
            sym::EMBED | sym::MARK => collect_text(rest_after(node, 3), out),
            sym::LITERAL_CODE | sym::LITERAL_INPUT | sym::LITERAL_OUTPUT | sym::LITERAL_MATH => {
                if let Some(s) = rest_after(node, 1).car().and_then(Value::as_str) {
                    out.push_str(s);
                }
            }
            _ => {}
        }
    }
}

/// The children of a tagged node after its first `n` fixed fields.
fn rest_after(node: &Value, n: usize) -> &Value {
    let mut cur = node.tail();
    for _ in 0..n {
        match cur.cdr() {
            Some(next) => cur = next,
            // Ran out of spine; a non-pair iterates as empty.
            None => return cur,
        }
    }
    cur
}
