//! The normalisation pass between parsing and evaluation.
//!
//! A pure tree-to-tree transformation: text runs merge, whitespace at the
//! edges of inline lists disappears, trailing spaces before a soft break
//! promote it to a hard one, quotation-list items coalesce, and tables get
//! their header row and column alignments.  The pass is idempotent, so
//! already-normalised trees pass through unchanged.

use crate::strings;
use crate::sx::{sym, Symbol, Value};

/// Normalises a parsed tree.  Returns `Value::Nil` when nothing remains.
pub fn process(v: &Value) -> Value {
    process_node(v, &Env::default()).unwrap_or(Value::Nil)
}

#[derive(Clone, Copy, Default)]
struct Env {
    /// Inside a verse region: spaces harden to no-break spaces and soft
    /// breaks to hard ones, and leading whitespace survives.
    in_verse: bool,
    /// The enclosing node needs this block list positionally; keep it
    /// even when it normalises to empty.
    no_block: bool,
}

impl Env {
    fn keep_block(self) -> Env {
        Env {
            no_block: true,
            ..self
        }
    }

    fn plain(self) -> Env {
        Env {
            no_block: false,
            ..self
        }
    }
}

fn process_node(v: &Value, env: &Env) -> Option<Value> {
    let tag = match v.node_tag() {
        Some(tag) => tag,
        None => return Some(v.clone()),
    };
    match tag {
        sym::BLOCK => process_block_list(v, env),
        sym::INLINE => {
            let ins = normalize_inlines(v.tail(), env);
            if ins.is_empty() {
                return None;
            }
            Some(Value::tagged(sym::INLINE, ins))
        }
        sym::PARA => {
            let ins = normalize_inlines(v.tail(), env);
            if ins.is_empty() {
                return None;
            }
            Some(Value::tagged(sym::PARA, ins))
        }
        sym::HEADING => process_heading(v, env),
        sym::THEMATIC | sym::TRANSCLUDE => Some(v.clone()),
        sym::REGION_BLOCK | sym::REGION_QUOTE => process_region(v, tag, env),
        sym::REGION_VERSE => process_region(v, tag, &Env {
            in_verse: true,
            ..*env
        }),
        sym::VERBATIM_CODE
        | sym::VERBATIM_EVAL
        | sym::VERBATIM_COMMENT
        | sym::VERBATIM_HTML
        | sym::VERBATIM_MATH
        | sym::VERBATIM_ZETTEL => {
            let content = v.iter().nth(2).and_then(Value::as_str);
            if content.map_or(true, str::is_empty) {
                return None;
            }
            Some(v.clone())
        }
        sym::ORDERED | sym::UNORDERED => process_list(v, tag, env),
        sym::QUOTATION => process_quotation(v, env),
        sym::DESCRIPTION => process_description(v, env),
        sym::TABLE => process_table(v, env),
        _ => process_inline(v, tag, env),
    }
}

fn process_block_list(v: &Value, env: &Env) -> Option<Value> {
    let mut items = Vec::new();
    for child in v.tail().iter() {
        if let Some(p) = process_node(child, &env.plain()) {
            items.push(p);
        }
    }
    if items.is_empty() && !env.no_block {
        return None;
    }
    Some(Value::tagged(sym::BLOCK, items))
}

fn process_heading(v: &Value, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let level = iter.next()?.clone();
    let attrs = iter.next()?.clone();
    let slug = iter.next()?.clone();
    let fragment = iter.next()?.clone();
    let ins = normalize_inlines(iter.remainder(), env);
    if ins.is_empty() {
        return None;
    }
    let mut items = vec![level, attrs, slug, fragment];
    items.extend(ins);
    Some(Value::tagged(sym::HEADING, items))
}

fn process_region(v: &Value, tag: Symbol, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let attrs = iter.next()?.clone();
    let blocks = iter.next()?;
    let blocks = process_node(blocks, &env.keep_block())?;
    let citation = normalize_inlines(iter.remainder(), env);
    let mut items = vec![attrs, blocks];
    items.extend(citation);
    Some(Value::tagged(tag, items))
}

fn process_list(v: &Value, tag: Symbol, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let attrs = iter.next()?.clone();
    let mut items = vec![attrs];
    let mut any = false;
    for item in iter {
        if let Some(p) = process_node(item, &env.keep_block()) {
            items.push(p);
            any = true;
        }
    }
    if !any {
        return None;
    }
    Some(Value::tagged(tag, items))
}

/// Consecutive items holding exactly one paragraph merge into a single
/// paragraph joined by soft breaks — the defining semantic of quotation
/// lists.
fn process_quotation(v: &Value, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let attrs = iter.next()?.clone();
    let mut processed = Vec::new();
    for item in iter {
        if let Some(p) = process_node(item, &env.keep_block()) {
            processed.push(p);
        }
    }
    if processed.is_empty() {
        return None;
    }

    let mut items = vec![attrs];
    let mut run: Vec<Value> = Vec::new();
    for item in processed {
        match single_para_inlines(&item) {
            Some(ins) => run.push(ins),
            None => {
                flush_quotation_run(&mut items, &mut run);
                items.push(item);
            }
        }
    }
    flush_quotation_run(&mut items, &mut run);
    Some(Value::tagged(sym::QUOTATION, items))
}

/// The inline tail of an item of the shape `(BLOCK (PARA …))`.
fn single_para_inlines(item: &Value) -> Option<Value> {
    if item.node_tag()? != sym::BLOCK {
        return None;
    }
    let tail = item.tail();
    if tail.len() != 1 {
        return None;
    }
    let para = tail.car()?;
    if para.node_tag()? != sym::PARA {
        return None;
    }
    Some(para.tail().clone())
}

fn flush_quotation_run(items: &mut Vec<Value>, run: &mut Vec<Value>) {
    if run.is_empty() {
        return;
    }
    let mut merged = Vec::new();
    for (i, ins) in run.drain(..).enumerate() {
        if i > 0 {
            merged.push(Value::tagged(sym::SOFT, []));
        }
        merged.extend(ins.iter().cloned());
    }
    items.push(Value::tagged(
        sym::BLOCK,
        [Value::tagged(sym::PARA, merged)],
    ));
}

fn process_description(v: &Value, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let attrs = iter.next()?.clone();
    let mut items = vec![attrs];
    let mut any = false;
    loop {
        let Some(term) = iter.next() else {
            break;
        };
        any = true;
        items.push(Value::list(normalize_inlines(term, env)));
        match iter.next() {
            Some(descr) => {
                let descr_items: Vec<Value> = descr
                    .tail()
                    .iter()
                    .filter_map(|item| process_node(item, &env.keep_block()))
                    .collect();
                items.push(Value::tagged(sym::BLOCK, descr_items));
            }
            None => items.push(Value::tagged(sym::BLOCK, [])),
        }
    }
    if !any {
        return None;
    }
    Some(Value::tagged(sym::DESCRIPTION, items))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Default,
    Left,
    Center,
    Right,
}

impl Align {
    fn cell_tag(self) -> Symbol {
        match self {
            Align::Default => sym::CELL,
            Align::Left => sym::CELL_LEFT,
            Align::Center => sym::CELL_CENTER,
            Align::Right => sym::CELL_RIGHT,
        }
    }

    fn from_cell_tag(tag: Symbol) -> Align {
        match tag {
            sym::CELL_LEFT => Align::Left,
            sym::CELL_CENTER => Align::Center,
            sym::CELL_RIGHT => Align::Right,
            _ => Align::Default,
        }
    }

    fn from_marker(c: char) -> Option<Align> {
        match c {
            '<' => Some(Align::Left),
            ':' => Some(Align::Center),
            '>' => Some(Align::Right),
            _ => None,
        }
    }
}

struct Cell {
    align: Align,
    inlines: Vec<Value>,
}

fn process_table(v: &Value, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let header_value = iter.next()?;
    let mut header: Vec<Cell> = decode_row(header_value, env);
    let mut rows: Vec<Vec<Cell>> = iter.map(|row| decode_row(row, env)).collect();

    // Split the first row off as the header when its first cell opens
    // with `=`.  A non-empty header slot means the split already
    // happened on an earlier pass.
    if header.is_empty() && !header_value.is_pair() {
        let is_header = rows.first().map_or(false, |row| {
            row.first().map_or(false, |cell| {
                leading_text(&cell.inlines).map_or(false, |t| t.starts_with('='))
            })
        });
        if is_header {
            header = rows.remove(0);
            for cell in &mut header {
                strip_header_markers(cell);
            }
        }
    }

    if header.is_empty() && rows.is_empty() {
        return None;
    }

    let width = header
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let aligns: Vec<Align> = (0..width)
        .map(|i| header.get(i).map_or(Align::Default, |c| c.align))
        .collect();

    let header_out = if header.is_empty() {
        Value::Nil
    } else {
        encode_aligned_row(header, &aligns)
    };
    let mut items = vec![header_out];
    for row in rows {
        items.push(encode_aligned_row(row, &aligns));
    }
    Some(Value::tagged(sym::TABLE, items))
}

fn decode_row(row: &Value, env: &Env) -> Vec<Cell> {
    row.iter()
        .filter_map(|cell| {
            let tag = cell.node_tag()?;
            Some(Cell {
                align: Align::from_cell_tag(tag),
                inlines: normalize_inlines(cell.tail(), env),
            })
        })
        .collect()
}

/// The text of the first inline of a header cell, used for the header and
/// alignment markers.
fn leading_text(inlines: &[Value]) -> Option<&str> {
    let first = inlines.first()?;
    if first.node_tag()? != sym::TEXT {
        return None;
    }
    first.head()?.as_str()
}

/// Removes the `=` header marker and the optional alignment marker, which
/// sits either directly behind the `=` or at the end of the cell.
fn strip_header_markers(cell: &mut Cell) {
    let Some(text) = leading_text(&cell.inlines) else {
        return;
    };
    let Some(mut text) = text.strip_prefix('=').map(str::to_owned) else {
        return;
    };
    let mut align = text
        .chars()
        .next()
        .and_then(Align::from_marker);
    if let Some(a) = align {
        text.remove(0);
        cell.align = a;
    } else {
        // No marker up front: look at the end of the cell's last text.
        align = trailing_marker(&mut cell.inlines, &mut text);
        if let Some(a) = align {
            cell.align = a;
        }
    }
    replace_leading_text(&mut cell.inlines, text);
}

fn trailing_marker(inlines: &mut [Value], first_text: &mut String) -> Option<Align> {
    let single = inlines.len() == 1;
    let last = inlines.last_mut()?;
    if last.node_tag()? != sym::TEXT {
        return None;
    }
    let text = last.head()?.as_str()?;
    let align = text.chars().last().and_then(Align::from_marker)?;
    let stripped = text[..text.len() - 1].to_owned();
    if single {
        // The first and last text are the same node; keep the already
        // de-marked copy consistent instead.
        first_text.truncate(first_text.len().saturating_sub(1));
    } else {
        *last = Value::tagged(sym::TEXT, [Value::string(stripped)]);
    }
    Some(align)
}

fn replace_leading_text(inlines: &mut Vec<Value>, text: String) {
    if text.is_empty() {
        inlines.remove(0);
    } else {
        inlines[0] = Value::tagged(sym::TEXT, [Value::string(text)]);
    }
}

/// Re-encodes a row, giving alignment-less cells their column's alignment
/// and padding short rows with empty aligned cells.
fn encode_aligned_row(row: Vec<Cell>, aligns: &[Align]) -> Value {
    let mut cells = Vec::with_capacity(aligns.len());
    for (i, cell) in row.into_iter().enumerate() {
        let align = if cell.align == Align::Default {
            aligns.get(i).copied().unwrap_or(Align::Default)
        } else {
            cell.align
        };
        cells.push(Value::tagged(align.cell_tag(), cell.inlines));
    }
    for align in aligns.iter().skip(cells.len()) {
        cells.push(Value::tagged(align.cell_tag(), []));
    }
    Value::list(cells)
}

/// Rebuilds an inline node with normalised children; unknown tags pass
/// through untouched.
fn process_inline(v: &Value, tag: Symbol, env: &Env) -> Option<Value> {
    match tag {
        sym::TEXT | sym::SOFT | sym::HARD | sym::SPACE => Some(v.clone()),
        sym::LINK_ZETTEL
        | sym::LINK_SELF
        | sym::LINK_FOUND
        | sym::LINK_BROKEN
        | sym::LINK_HOSTED
        | sym::LINK_BASED
        | sym::LINK_QUERY
        | sym::LINK_EXTERNAL
        | sym::LINK_INVALID => rebuild_with_inlines(v, tag, 2, env),
        sym::EMBED => rebuild_with_inlines(v, tag, 3, env),
        sym::EMBED_BLOB => Some(v.clone()),
        sym::CITE => rebuild_with_inlines(v, tag, 2, env),
        sym::ENDNOTE => rebuild_with_inlines(v, tag, 1, env),
        sym::MARK => rebuild_with_inlines(v, tag, 3, env),
        sym::FORMAT_EMPH
        | sym::FORMAT_STRONG
        | sym::FORMAT_INSERT
        | sym::FORMAT_DELETE
        | sym::FORMAT_SUPER
        | sym::FORMAT_SUB
        | sym::FORMAT_QUOTE
        | sym::FORMAT_MARK
        | sym::FORMAT_SPAN => rebuild_with_inlines(v, tag, 1, env),
        sym::LITERAL_CODE
        | sym::LITERAL_HTML
        | sym::LITERAL_INPUT
        | sym::LITERAL_OUTPUT
        | sym::LITERAL_MATH
        | sym::LITERAL_COMMENT
        | sym::LITERAL_ZETTEL => Some(v.clone()),
        _ => Some(v.clone()),
    }
}

/// Keeps the first `fixed` children of the node as they are and
/// normalises the rest as an inline list.
fn rebuild_with_inlines(v: &Value, tag: Symbol, fixed: usize, env: &Env) -> Option<Value> {
    let mut iter = v.tail().iter();
    let mut items = Vec::new();
    for _ in 0..fixed {
        items.push(iter.next()?.clone());
    }
    items.extend(normalize_inlines(iter.remainder(), env));
    Some(Value::tagged(tag, items))
}

/// The inline normaliser of the post-processor: six steps producing the
/// canonical inline list.
fn normalize_inlines(children: &Value, env: &Env) -> Vec<Value> {
    // 1. Recurse, fold SPACE into text, and drop what normalises away.
    let mut out: Vec<Value> = Vec::new();
    for child in children.iter() {
        let Some(p) = process_node(child, &env.plain()) else {
            continue;
        };
        if p.node_tag() == Some(sym::SPACE) {
            out.push(make_text(" "));
        } else {
            out.push(p);
        }
    }

    // 2. Verse: spaces become no-break spaces, soft breaks become hard.
    if env.in_verse {
        for item in &mut out {
            match item.node_tag() {
                Some(sym::TEXT) => {
                    if let Some(t) = item.head().and_then(Value::as_str) {
                        if t.contains(' ') {
                            *item = make_text(&strings::make_non_breaking(t));
                        }
                    }
                }
                Some(sym::SOFT) => *item = Value::tagged(sym::HARD, []),
                _ => {}
            }
        }
    }

    // 3. Strip leading whitespace.
    if !env.in_verse {
        while let Some(text) = text_of(out.first()) {
            let trimmed = text.trim_start_matches([' ', '\t']).to_owned();
            if trimmed == text {
                break;
            }
            if trimmed.is_empty() {
                out.remove(0);
            } else {
                out[0] = make_text(&trimmed);
                break;
            }
        }
    }

    // 4. Merge adjacent texts.
    let mut merged: Vec<Value> = Vec::with_capacity(out.len());
    for item in out {
        if item.node_tag() == Some(sym::TEXT) {
            if let (Some(prev), Some(cur)) = (text_of(merged.last()), text_of(Some(&item))) {
                let joined = format!("{}{}", prev, cur);
                *merged.last_mut().unwrap() = make_text(&joined);
                continue;
            }
        }
        merged.push(item);
    }
    let mut out = merged;

    // 5. Trailing spaces before a soft break force a hard break.
    let mut promoted: Vec<Value> = Vec::with_capacity(out.len());
    for item in out.drain(..) {
        if item.node_tag() == Some(sym::SOFT) {
            if let Some(text) = text_of(promoted.last()) {
                let trimmed = strings::rtrim_slice(&text);
                if trimmed.len() != text.len() {
                    if trimmed.is_empty() {
                        promoted.pop();
                    } else {
                        *promoted.last_mut().unwrap() = make_text(trimmed);
                    }
                    promoted.push(Value::tagged(sym::HARD, []));
                    continue;
                }
            }
        }
        promoted.push(item);
    }
    let mut out = promoted;

    // 6. Strip trailing breaks and whitespace.
    loop {
        match out.last().and_then(Value::node_tag) {
            Some(sym::SOFT) | Some(sym::HARD) => {
                out.pop();
            }
            Some(sym::TEXT) => {
                let Some(text) = text_of(out.last()) else {
                    break;
                };
                let trimmed = strings::rtrim_slice(&text).to_owned();
                if trimmed.len() == text.len() {
                    break;
                }
                if trimmed.is_empty() {
                    out.pop();
                } else {
                    *out.last_mut().unwrap() = make_text(&trimmed);
                    break;
                }
            }
            _ => break,
        }
    }

    out
}

fn make_text(s: &str) -> Value {
    Value::tagged(sym::TEXT, [Value::string(s)])
}

fn text_of(v: Option<&Value>) -> Option<String> {
    let v = v?;
    if v.node_tag()? != sym::TEXT {
        return None;
    }
    v.head()?.as_str().map(str::to_owned)
}
