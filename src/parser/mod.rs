//! The Zettelmarkup parser: a hand-written recursive descent over the
//! input cursor.
//!
//! Block dispatch looks at the first character of a line; every production
//! that cannot complete restores the cursor position, and the caller falls
//! back to paragraph mode, so no input is ever rejected.

mod inlines;

use std::cmp::min;

use smallvec::SmallVec;

use crate::attrs::Attributes;
use crate::cursor::Cursor;
use crate::nodes::{
    block, BlockLink, BlockNode, DescriptionTerm, InlineNode, ListKind, NodeDescription,
    NodeHeading, NodeList, NodeRegion, NodeTable, NodeVerbatim, RegionKind, TableCell, TableRow,
    VerbatimKind,
};
use crate::refs::Reference;

/// Block and region recursion is clamped here; an overflowing production
/// behaves like a failed one and reverts to literal text.
const MAX_NESTING: usize = 50;

/// Cites, endnotes, and marks nested through link labels are clamped here.
const MAX_LINK_LIKE: usize = 5;

/// U+02CB MODIFIER LETTER GRAVE ACCENT, accepted as a verbatim and literal
/// delimiter alongside the ASCII backtick.
const MOD_GRAVE: char = '\u{02cb}';

/// A tentative production outcome: `None` means the production failed and
/// the caller falls through to paragraph mode; `Some(None)` means it
/// consumed the line without emitting a new top-level block.
type ParseResult = Option<Option<BlockLink>>;

pub(crate) struct Parser<'s> {
    inp: Cursor<'s>,
    lists: SmallVec<[BlockLink; 8]>,
    table: Option<BlockLink>,
    descrl: Option<BlockLink>,
    last_para: Option<BlockLink>,
    nesting: usize,
    link_like: usize,
}

/// Parses a full document into a slice of blocks.
pub(crate) fn parse_block_slice(src: &str) -> Vec<BlockLink> {
    let mut p = Parser::new(src);
    let mut bs = Vec::new();
    while p.inp.ch().is_some() {
        p.parse_block(&mut bs);
    }
    bs
}

/// Parses inline-only input, as used for titles and metadata values.
pub(crate) fn parse_inline_slice(src: &str) -> Vec<InlineNode> {
    let mut p = Parser::new(src);
    let mut ins = Vec::new();
    while let Some(i) = p.parse_inline() {
        ins.push(i);
    }
    ins
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Parser<'s> {
        Parser {
            inp: Cursor::new(src),
            lists: SmallVec::new(),
            table: None,
            descrl: None,
            last_para: None,
            nesting: 0,
            link_like: 0,
        }
    }

    fn clear_stacked(&mut self) {
        self.lists.clear();
        self.table = None;
        self.descrl = None;
    }

    /// A blank line closes the table and marks a paragraph boundary inside
    /// every open list item and description, without closing them: a later
    /// indented line continues the item with a fresh paragraph.
    fn cleanup_after_blank_line(&mut self) {
        for ln in &self.lists {
            if let BlockNode::List(nl) = &mut *ln.borrow_mut() {
                if let Some(item) = nl.items.last_mut() {
                    item.push(block(BlockNode::Null));
                }
            }
        }
        if let Some(dl) = &self.descrl {
            if let BlockNode::Description(nd) = &mut *dl.borrow_mut() {
                if let Some(term) = nd.terms.last_mut() {
                    if let Some(descr) = term.descriptions.last_mut() {
                        descr.push(block(BlockNode::Null));
                    }
                }
            }
        }
        self.table = None;
    }

    fn parse_block(&mut self, bs: &mut Vec<BlockLink>) {
        let pos = self.inp.pos();
        if self.nesting <= MAX_NESTING {
            self.nesting += 1;
            let parsed = match self.inp.ch() {
                None => Some(None),
                Some('\n') | Some('\r') => {
                    self.inp.eat_eol();
                    self.cleanup_after_blank_line();
                    Some(None)
                }
                Some(':') => self.parse_colon(),
                Some('@' | '`' | MOD_GRAVE | '%' | '~' | '$') => {
                    self.clear_stacked();
                    self.parse_verbatim()
                }
                Some('"' | '<') => {
                    self.clear_stacked();
                    self.parse_region()
                }
                Some('=') => {
                    self.clear_stacked();
                    self.parse_heading()
                }
                Some('-') => {
                    self.clear_stacked();
                    self.parse_thematic()
                }
                Some('*' | '#' | '>') => self.parse_nested_list(),
                Some(';') => self.parse_def_term(),
                Some(' ') => {
                    self.table = None;
                    if self.parse_indent() {
                        Some(None)
                    } else {
                        None
                    }
                }
                Some('|') => self.parse_row(),
                Some('{') => self.parse_transclusion(),
                _ => None,
            };
            self.nesting -= 1;
            if let Some(bn) = parsed {
                if let Some(bn) = bn {
                    bs.push(bn);
                }
                self.last_para = None;
                return;
            }
        }

        self.inp.set_pos(pos);
        self.clear_stacked();
        let ins = self.parse_para();
        if let Some(last) = self.last_para.clone() {
            if let BlockNode::Para(v) = &mut *last.borrow_mut() {
                v.extend(ins);
                return;
            }
        }
        let pn = block(BlockNode::Para(ins));
        self.last_para = Some(pn.clone());
        bs.push(pn);
    }

    /// A paragraph runs until a blank line or until a line that starts with
    /// a block-dispatch character; the dispatch then decides whether the
    /// line really opens a block or flows back into this paragraph.
    fn parse_para(&mut self) -> Vec<InlineNode> {
        let mut ins = Vec::new();
        loop {
            match self.parse_inline() {
                None => return ins,
                Some(i) => {
                    let brk = matches!(i, InlineNode::Soft | InlineNode::Hard);
                    ins.push(i);
                    if brk && is_block_start(self.inp.ch()) {
                        return ins;
                    }
                }
            }
        }
    }

    /// A single-line paragraph, including the break that ends it.
    fn parse_line_para(&mut self) -> Option<Vec<InlineNode>> {
        let mut ins = Vec::new();
        loop {
            match self.parse_inline() {
                None => break,
                Some(i) => {
                    let brk = matches!(i, InlineNode::Soft | InlineNode::Hard);
                    ins.push(i);
                    if brk {
                        break;
                    }
                }
            }
        }
        if ins.is_empty() {
            None
        } else {
            Some(ins)
        }
    }

    fn parse_colon(&mut self) -> ParseResult {
        if self.inp.peek() == Some(':') {
            self.clear_stacked();
            return self.parse_region();
        }
        self.parse_def_descr()
    }

    fn parse_verbatim(&mut self) -> ParseResult {
        let fch = self.inp.ch()?;
        let cnt = self.inp.count_run(fch);
        if cnt < 3 {
            return None;
        }
        let kind = match fch {
            '@' => VerbatimKind::Zettel,
            '`' | MOD_GRAVE => VerbatimKind::Code,
            '%' => VerbatimKind::Comment,
            '~' => VerbatimKind::Eval,
            '$' => VerbatimKind::Math,
            _ => return None,
        };
        let attrs = self.parse_opening_line_attributes()?;
        if !self.inp.eat_eol() {
            // An opening line at end of source has no content to close.
            return None;
        }

        let mut content = String::new();
        let mut first = true;
        loop {
            if self.inp.ch() == Some(fch) {
                let pos = self.inp.pos();
                let cnt2 = self.inp.count_run(fch);
                if cnt2 >= cnt {
                    self.inp.skip_space();
                    if self.inp.is_eol_or_eos() {
                        self.inp.eat_eol();
                        return Some(Some(block(BlockNode::Verbatim(NodeVerbatim {
                            kind,
                            attrs,
                            content,
                        }))));
                    }
                }
                self.inp.set_pos(pos);
            }
            if self.inp.ch().is_none() {
                return None;
            }
            let line = self.inp.skip_to_eol();
            self.inp.eat_eol();
            if !first {
                content.push('\n');
            }
            first = false;
            content.push_str(line);
        }
    }

    fn parse_region(&mut self) -> ParseResult {
        let fch = self.inp.ch()?;
        let kind = match fch {
            ':' => RegionKind::Block,
            '<' => RegionKind::Quote,
            '"' => RegionKind::Verse,
            _ => return None,
        };
        let cnt = self.inp.count_run(fch);
        if cnt < 3 {
            return None;
        }
        let attrs = self.parse_opening_line_attributes()?;
        self.inp.eat_eol();

        let saved_para = self.last_para.take();
        let mut blocks = Vec::new();
        loop {
            if self.inp.ch().is_none() {
                // Unclosed regions revert to text.
                self.last_para = saved_para;
                return None;
            }
            if self.inp.ch() == Some(fch) {
                let pos = self.inp.pos();
                let cnt2 = self.inp.count_run(fch);
                if cnt2 >= cnt {
                    self.inp.skip_space();
                    let citation = if self.inp.is_eol_or_eos() {
                        self.inp.eat_eol();
                        Vec::new()
                    } else {
                        self.parse_line_para().unwrap_or_default()
                    };
                    self.clear_stacked();
                    return Some(Some(block(BlockNode::Region(NodeRegion {
                        kind,
                        attrs,
                        blocks,
                        citation,
                    }))));
                }
                self.inp.set_pos(pos);
            }
            self.parse_block(&mut blocks);
        }
    }

    fn parse_heading(&mut self) -> ParseResult {
        let cnt = self.inp.count_run('=');
        if cnt < 3 {
            return None;
        }
        if !self.inp.is_space() {
            return None;
        }
        self.inp.skip_space();
        let mut hn = NodeHeading {
            level: (min(cnt, 7) - 2) as i64,
            attrs: Attributes::new(),
            slug: String::new(),
            fragment: String::new(),
            inlines: Vec::new(),
        };
        loop {
            if self.inp.is_eol_or_eos() {
                self.inp.eat_eol();
                break;
            }
            if self.inp.ch() == Some('{') {
                let pos = self.inp.pos();
                if let Some(a) = self.parse_attributes(false) {
                    self.inp.skip_space();
                    if self.inp.is_eol_or_eos() {
                        self.inp.eat_eol();
                        hn.attrs = a;
                        break;
                    }
                }
                self.inp.set_pos(pos);
            }
            match self.parse_inline() {
                Some(i) => hn.inlines.push(i),
                None => break,
            }
        }
        Some(Some(block(BlockNode::Heading(hn))))
    }

    fn parse_thematic(&mut self) -> ParseResult {
        let cnt = self.inp.count_run('-');
        if cnt < 3 {
            return None;
        }
        let attrs = self.parse_trailing_attributes()?;
        self.inp.eat_eol();
        Some(Some(block(BlockNode::Thematic(attrs))))
    }

    fn parse_nested_list(&mut self) -> ParseResult {
        let mut kinds: SmallVec<[ListKind; 8]> = SmallVec::new();
        while let Some(c) = self.inp.ch() {
            match c {
                '*' => kinds.push(ListKind::Unordered),
                '#' => kinds.push(ListKind::Ordered),
                '>' => kinds.push(ListKind::Quotation),
                _ => break,
            }
            self.inp.next();
        }

        // A quotation prefix at end of line yields an empty item; all
        // other prefixes require a space before their content.
        let empty_item =
            *kinds.last().unwrap() == ListKind::Quotation && self.inp.is_eol_or_eos();
        if !empty_item {
            if !self.inp.is_space() {
                return None;
            }
            self.inp.next();
        }

        if kinds.len() < self.lists.len() {
            self.lists.truncate(kinds.len());
        }
        let mut outermost_new = None;
        for (i, &kind) in kinds.iter().enumerate() {
            let kept = i < self.lists.len() && {
                match &*self.lists[i].borrow() {
                    BlockNode::List(nl) => nl.kind == kind,
                    _ => false,
                }
            };
            if kept {
                continue;
            }
            self.lists.truncate(i);
            let ln = block(BlockNode::List(NodeList {
                kind,
                attrs: Attributes::new(),
                items: Vec::new(),
            }));
            if i == 0 {
                outermost_new = Some(ln.clone());
            } else {
                let parent = self.lists[i - 1].clone();
                if let BlockNode::List(pl) = &mut *parent.borrow_mut() {
                    match pl.items.last_mut() {
                        Some(item) => item.push(ln.clone()),
                        None => pl.items.push(vec![ln.clone()]),
                    }
                };
            }
            self.lists.push(ln);
        }

        let item = if empty_item {
            Vec::new()
        } else {
            match self.parse_line_para() {
                Some(ins) => vec![block(BlockNode::Para(ins))],
                None => Vec::new(),
            }
        };
        let deepest = self.lists.last().unwrap().clone();
        if let BlockNode::List(nl) = &mut *deepest.borrow_mut() {
            nl.items.push(item);
        }
        Some(outermost_new)
    }

    /// Indentation continues the item of the list at the matching depth,
    /// or the most recent description.
    fn parse_indent(&mut self) -> bool {
        let cnt = self.inp.count_run(' ');
        if !self.lists.is_empty() {
            let depth = min(cnt, self.lists.len());
            if depth == 0 {
                return false;
            }
            self.lists.truncate(depth);
            let ln = self.lists[depth - 1].clone();
            let Some(ins) = self.parse_line_para() else {
                return false;
            };
            if let BlockNode::List(nl) = &mut *ln.borrow_mut() {
                if let Some(item) = nl.items.last_mut() {
                    extend_item(item, ins);
                    return true;
                }
            }
            return false;
        }
        if let Some(dl) = self.descrl.clone() {
            if cnt == 0 {
                return false;
            }
            let Some(ins) = self.parse_line_para() else {
                return false;
            };
            if let BlockNode::Description(nd) = &mut *dl.borrow_mut() {
                if let Some(term) = nd.terms.last_mut() {
                    match term.descriptions.last_mut() {
                        Some(descr) => extend_item(descr, ins),
                        // No description yet: the line continues the term.
                        None => term.term.extend(ins),
                    }
                    return true;
                }
            }
            return false;
        }
        false
    }

    fn parse_def_term(&mut self) -> ParseResult {
        self.inp.next();
        if !self.inp.is_space() {
            return None;
        }
        self.inp.skip_space();
        let term = self.parse_line_para()?;

        let (dl, is_new) = match self.descrl.clone() {
            Some(dl) => (dl, false),
            None => (
                block(BlockNode::Description(NodeDescription {
                    attrs: Attributes::new(),
                    terms: Vec::new(),
                })),
                true,
            ),
        };
        if let BlockNode::Description(nd) = &mut *dl.borrow_mut() {
            nd.terms.push(DescriptionTerm {
                term,
                descriptions: Vec::new(),
            });
        }
        self.descrl = Some(dl.clone());
        Some(if is_new { Some(dl) } else { None })
    }

    fn parse_def_descr(&mut self) -> ParseResult {
        self.inp.next();
        if !self.inp.is_space() {
            return None;
        }
        self.inp.skip_space();
        let dl = self.descrl.clone()?;
        let ins = self.parse_line_para()?;
        if let BlockNode::Description(nd) = &mut *dl.borrow_mut() {
            let term = nd.terms.last_mut()?;
            term.descriptions.push(vec![block(BlockNode::Para(ins))]);
        }
        Some(None)
    }

    fn parse_row(&mut self) -> ParseResult {
        if self.inp.peek() == Some('%') {
            // A comment row is consumed and dropped.
            self.inp.skip_to_eol();
            self.inp.eat_eol();
            return Some(None);
        }
        let mut row: TableRow = Vec::new();
        loop {
            self.inp.next();
            if let Some(cell) = self.parse_cell() {
                row.push(cell);
            }
            if self.inp.ch() != Some('|') {
                break;
            }
        }
        self.inp.eat_eol();

        if let Some(t) = self.table.clone() {
            if let BlockNode::Table(nt) = &mut *t.borrow_mut() {
                nt.rows.push(row);
            }
            return Some(None);
        }
        let t = block(BlockNode::Table(NodeTable { rows: vec![row] }));
        self.table = Some(t.clone());
        Some(Some(t))
    }

    /// A cell ends at the next `|` or at end of line.  A cell that would
    /// be empty at end of line is a trailing delimiter, not a cell.
    fn parse_cell(&mut self) -> Option<TableCell> {
        let mut ins = Vec::new();
        loop {
            if self.inp.is_eol_or_eos() {
                if ins.is_empty() {
                    return None;
                }
                return Some(TableCell { inlines: ins });
            }
            if self.inp.ch() == Some('|') {
                return Some(TableCell { inlines: ins });
            }
            match self.parse_inline() {
                Some(i) => ins.push(i),
                None => return Some(TableCell { inlines: ins }),
            }
        }
    }

    fn parse_transclusion(&mut self) -> ParseResult {
        let cnt = self.inp.count_run('{');
        if cnt < 3 {
            return None;
        }
        let start = self.inp.pos();
        let target = loop {
            match self.inp.ch() {
                None | Some('\n') | Some('\r') => return None,
                Some('}') => {
                    let end = self.inp.pos();
                    let cnt2 = self.inp.count_run('}');
                    if cnt2 >= 3 {
                        break self.inp.slice(start, end);
                    }
                }
                _ => {
                    self.inp.next();
                }
            }
        };
        let attrs = self.parse_trailing_attributes()?;
        self.inp.eat_eol();
        let reference = Reference::scan(crate::strings::trim_slice(target));
        Some(Some(block(BlockNode::Transclude(attrs, reference))))
    }

    /// The attribute tail of a verbatim or region opening line: an
    /// optional syntax word that becomes the default attribute, then an
    /// optional brace block, then nothing else before the line ends.
    fn parse_opening_line_attributes(&mut self) -> Option<Attributes> {
        self.inp.skip_space();
        let mut attrs = Attributes::new();
        if !self.inp.is_eol_or_eos() && self.inp.ch() != Some('{') {
            let start = self.inp.pos();
            while let Some(c) = self.inp.ch() {
                if c == ' ' || c == '\t' || c == '{' || c == '\n' || c == '\r' {
                    break;
                }
                self.inp.next();
            }
            attrs.set_default(self.inp.slice(start, self.inp.pos()));
            self.inp.skip_space();
        }
        if self.inp.ch() == Some('{') {
            let a = self.parse_attributes(true)?;
            for (k, v) in a.iter() {
                attrs.set(k, v);
            }
            self.inp.skip_space();
        }
        if !self.inp.is_eol_or_eos() {
            return None;
        }
        Some(attrs)
    }

    /// An optional brace block before the end of the line.
    fn parse_trailing_attributes(&mut self) -> Option<Attributes> {
        self.inp.skip_space();
        let mut attrs = Attributes::new();
        if self.inp.ch() == Some('{') {
            attrs = self.parse_attributes(true)?;
            self.inp.skip_space();
        }
        if !self.inp.is_eol_or_eos() {
            return None;
        }
        Some(attrs)
    }

    /// Parses a `{…}` attribute block.  Inline attributes must close on
    /// the line they open; block attributes may span lines.  On failure
    /// the cursor is restored and `None` returned.
    fn parse_attributes(&mut self, multi_line: bool) -> Option<Attributes> {
        let pos = self.inp.pos();
        match self.parse_attributes_inner(multi_line) {
            Some(a) => Some(a),
            None => {
                self.inp.set_pos(pos);
                None
            }
        }
    }

    fn parse_attributes_inner(&mut self, multi_line: bool) -> Option<Attributes> {
        self.inp.next(); // step over '{'
        let mut a = Attributes::new();
        loop {
            self.skip_attribute_separators(multi_line)?;
            match self.inp.ch()? {
                '}' => {
                    self.inp.next();
                    return Some(a);
                }
                '.' => {
                    self.inp.next();
                    let name = self.read_attribute_name();
                    if name.is_empty() {
                        return None;
                    }
                    a.add_class(name);
                }
                '=' => {
                    self.inp.next();
                    let value = self.read_attribute_value()?;
                    a.set_default(&value);
                }
                _ => {
                    let key = self.read_attribute_name();
                    if key.is_empty() {
                        return None;
                    }
                    if self.inp.ch() == Some('=') {
                        self.inp.next();
                        let value = self.read_attribute_value()?;
                        a.set(key, &value);
                    } else {
                        a.set(key, "");
                    }
                }
            }
        }
    }

    fn skip_attribute_separators(&mut self, multi_line: bool) -> Option<()> {
        loop {
            match self.inp.ch() {
                Some(' ') | Some('\t') | Some(',') => {
                    self.inp.next();
                }
                Some('\n') | Some('\r') if multi_line => {
                    self.inp.eat_eol();
                }
                None => return None,
                _ => return Some(()),
            }
        }
    }

    fn read_attribute_name(&mut self) -> &'s str {
        let start = self.inp.pos();
        while let Some(c) = self.inp.ch() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                self.inp.next();
            } else {
                break;
            }
        }
        self.inp.slice(start, self.inp.pos())
    }

    fn read_attribute_value(&mut self) -> Option<String> {
        if self.inp.ch() == Some('"') {
            self.inp.next();
            let mut value = String::new();
            loop {
                match self.inp.ch()? {
                    '"' => {
                        self.inp.next();
                        return Some(value);
                    }
                    '\n' | '\r' => return None,
                    '\\' => {
                        self.inp.next();
                        let c = self.inp.ch()?;
                        value.push(c);
                        self.inp.next();
                    }
                    c => {
                        value.push(c);
                        self.inp.next();
                    }
                }
            }
        }
        let start = self.inp.pos();
        while let Some(c) = self.inp.ch() {
            if c == ' ' || c == '\t' || c == ',' || c == '}' || c == '\n' || c == '\r' {
                break;
            }
            self.inp.next();
        }
        Some(self.inp.slice(start, self.inp.pos()).to_owned())
    }
}

/// Extends a list item or description with one more line of content:
/// merged into its trailing paragraph, or — after a blank line marked the
/// boundary — opening a fresh paragraph in its place.
fn extend_item(item: &mut Vec<BlockLink>, ins: Vec<InlineNode>) {
    if let Some(last) = item.last() {
        let mut last = last.borrow_mut();
        match &mut *last {
            BlockNode::Null => {
                *last = BlockNode::Para(ins);
                return;
            }
            BlockNode::Para(v) => {
                v.extend(ins);
                return;
            }
            _ => {}
        }
    }
    item.push(block(BlockNode::Para(ins)));
}

/// Every character that can start a block production; a paragraph pauses
/// at a line starting with one of these and lets block dispatch decide.
fn is_block_start(ch: Option<char>) -> bool {
    match ch {
        None => true,
        Some(c) => matches!(
            c,
            '\n' | '\r'
                | ':'
                | '@'
                | '`'
                | MOD_GRAVE
                | '%'
                | '~'
                | '$'
                | '"'
                | '<'
                | '='
                | '-'
                | '*'
                | '#'
                | '>'
                | ';'
                | ' '
                | '|'
                | '{'
        ),
    }
}
