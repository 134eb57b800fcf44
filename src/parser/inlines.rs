//! Inline-level parsing: one dispatch on the current character per call,
//! returning one inline node or `None` at end of source.
//!
//! Formatting and literal forms open and close with a doubled delimiter;
//! link-like forms (`[[…]]`, `{{…}}`, `[@…]`, `[^…]`, `[!…]`) scan their
//! raw span first and parse the label part with a sub-parser, which keeps
//! the nesting caps simple to enforce.

use crate::attrs::Attributes;
use crate::character_set::character_set;
use crate::nodes::{
    FormatKind, InlineNode, LiteralKind, NodeCite, NodeEmbed, NodeLink, NodeMark,
};
use crate::refs::Reference;
use crate::strings::trim_slice;

use super::{Parser, MAX_LINK_LIKE, MAX_NESTING, MOD_GRAVE};

const EN_DASH: &str = "\u{2013}";

/// Characters that end a plain text run.  Spaces stay inside text runs;
/// the post-processor merges and trims them.
const INLINE_SPECIAL: [bool; 256] = character_set(b"\n\r[]{}()%&\\-_*>~^,\"#:'`=$|");

fn is_inline_special(c: char) -> bool {
    c == MOD_GRAVE || ((c as u32) < 256 && INLINE_SPECIAL[c as usize])
}

impl<'s> Parser<'s> {
    /// Parses one inline node.  Returns `None` only at end of source; any
    /// character that fails to open a construct becomes literal text.
    pub(crate) fn parse_inline(&mut self) -> Option<InlineNode> {
        let ch = self.inp.ch()?;
        if matches!(ch, '\n' | '\r') {
            self.inp.eat_eol();
            return Some(InlineNode::Soft);
        }
        if ch == '\\' {
            return Some(self.parse_backslash());
        }

        let pos = self.inp.pos();
        let parsed = match ch {
            '[' => match self.inp.peek() {
                Some('[') => self.parse_link(),
                Some('@') => self.parse_cite(),
                Some('^') => self.parse_endnote(),
                Some('!') => self.parse_mark(),
                _ => None,
            },
            '{' if self.inp.peek() == Some('{') => self.parse_embed(),
            '%' if self.inp.peek() == Some('%') => Some(self.parse_comment()),
            '&' => self.inp.scan_entity().map(InlineNode::Text),
            '-' if self.inp.peek() == Some('-') => {
                self.inp.next();
                self.inp.next();
                Some(InlineNode::Text(EN_DASH.to_owned()))
            }
            '_' => self.parse_format(FormatKind::Emph, '_'),
            '*' => self.parse_format(FormatKind::Strong, '*'),
            '>' => self.parse_format(FormatKind::Insert, '>'),
            '~' => self.parse_format(FormatKind::Delete, '~'),
            '^' => self.parse_format(FormatKind::Super, '^'),
            ',' => self.parse_format(FormatKind::Sub, ','),
            '"' => self.parse_format(FormatKind::Quote, '"'),
            '#' => self.parse_format(FormatKind::Mark, '#'),
            ':' => self.parse_format(FormatKind::Span, ':'),
            '`' | MOD_GRAVE => self.parse_literal(LiteralKind::Code, ch),
            '\'' => self.parse_literal(LiteralKind::Input, '\''),
            '=' => self.parse_literal(LiteralKind::Output, '='),
            '$' => self.parse_literal(LiteralKind::Math, '$'),
            _ => None,
        };
        match parsed {
            Some(n) => Some(n),
            None => {
                self.inp.set_pos(pos);
                Some(self.parse_text())
            }
        }
    }

    /// A run of plain text: at least one character, up to the next special
    /// character.
    fn parse_text(&mut self) -> InlineNode {
        let start = self.inp.pos();
        self.inp.next();
        while let Some(c) = self.inp.ch() {
            if is_inline_special(c) {
                break;
            }
            self.inp.next();
        }
        InlineNode::Text(self.inp.slice(start, self.inp.pos()).to_owned())
    }

    /// `\x` escapes one code point; a backslash at end of line forces a
    /// hard break.
    fn parse_backslash(&mut self) -> InlineNode {
        self.inp.next();
        match self.inp.ch() {
            None => InlineNode::Text("\\".to_owned()),
            Some('\n') | Some('\r') => {
                self.inp.eat_eol();
                InlineNode::Hard
            }
            Some(c) => {
                self.inp.next();
                InlineNode::Text(c.to_string())
            }
        }
    }

    fn parse_comment(&mut self) -> InlineNode {
        self.inp.count_run('%');
        let attrs = self.parse_optional_inline_attributes();
        self.inp.skip_space();
        let text = self.inp.skip_to_eol().to_owned();
        InlineNode::Literal(LiteralKind::Comment, attrs, text)
    }

    fn parse_format(&mut self, kind: FormatKind, delim: char) -> Option<InlineNode> {
        if self.inp.peek() != Some(delim) || self.nesting > MAX_NESTING {
            return None;
        }
        self.inp.next();
        self.inp.next();
        self.nesting += 1;
        let mut ins = Vec::new();
        let result = loop {
            match self.inp.ch() {
                None => break None,
                Some(c) if c == delim && self.inp.peek() == Some(delim) => {
                    self.inp.next();
                    self.inp.next();
                    let attrs = self.parse_optional_inline_attributes();
                    break Some(InlineNode::Format(kind, attrs, ins));
                }
                _ => match self.parse_inline() {
                    Some(i) => ins.push(i),
                    None => break None,
                },
            }
        };
        self.nesting -= 1;
        result
    }

    /// Literal forms capture raw content without inline recursion and must
    /// close on the line they open.
    fn parse_literal(&mut self, kind: LiteralKind, delim: char) -> Option<InlineNode> {
        if self.inp.peek() != Some(delim) {
            return None;
        }
        self.inp.next();
        self.inp.next();
        let start = self.inp.pos();
        loop {
            match self.inp.ch() {
                None | Some('\n') | Some('\r') => return None,
                Some(c) if c == delim && self.inp.peek() == Some(delim) => {
                    let content = self.inp.slice(start, self.inp.pos()).to_owned();
                    self.inp.next();
                    self.inp.next();
                    let attrs = self.parse_optional_inline_attributes();
                    return Some(InlineNode::Literal(kind, attrs, content));
                }
                _ => {
                    self.inp.next();
                }
            }
        }
    }

    fn parse_link(&mut self) -> Option<InlineNode> {
        if self.link_like >= MAX_LINK_LIKE {
            return None;
        }
        self.inp.next();
        self.inp.next();
        let (label, target) = self.scan_link_body('[', ']')?;
        let attrs = self.parse_optional_inline_attributes();
        let target = trim_slice(target);
        if target.is_empty() {
            return None;
        }
        let reference = Reference::scan(target);
        let inlines = match label {
            Some(text) => self.parse_label(text),
            None => Vec::new(),
        };
        Some(InlineNode::Link(NodeLink {
            attrs,
            reference,
            inlines,
        }))
    }

    fn parse_embed(&mut self) -> Option<InlineNode> {
        if self.link_like >= MAX_LINK_LIKE {
            return None;
        }
        self.inp.next();
        self.inp.next();
        let (label, target) = self.scan_link_body('{', '}')?;
        let attrs = self.parse_optional_inline_attributes();
        let target = trim_slice(target);
        if target.is_empty() {
            return None;
        }
        let reference = Reference::scan(target);
        let syntax = extension_of(target);
        let inlines = match label {
            Some(text) => self.parse_label(text),
            None => Vec::new(),
        };
        Some(InlineNode::Embed(NodeEmbed {
            attrs,
            reference,
            syntax,
            inlines,
        }))
    }

    fn parse_cite(&mut self) -> Option<InlineNode> {
        if self.link_like >= MAX_LINK_LIKE {
            return None;
        }
        self.inp.next();
        self.inp.next();
        let start = self.inp.pos();
        while let Some(c) = self.inp.ch() {
            if matches!(c, ',' | '|' | ']' | ' ' | '\t' | '\n' | '\r') {
                break;
            }
            self.inp.next();
        }
        let key = self.inp.slice(start, self.inp.pos());
        if key.is_empty() {
            return None;
        }
        let inlines = match self.inp.ch()? {
            ']' => {
                self.inp.next();
                Vec::new()
            }
            ',' | '|' | ' ' | '\t' => {
                self.inp.next();
                self.inp.skip_space();
                let body = self.scan_to_bracket_close()?;
                self.parse_label(body)
            }
            _ => return None,
        };
        let attrs = self.parse_optional_inline_attributes();
        Some(InlineNode::Cite(NodeCite {
            attrs,
            key: key.to_owned(),
            inlines,
        }))
    }

    fn parse_endnote(&mut self) -> Option<InlineNode> {
        if self.link_like >= MAX_LINK_LIKE {
            return None;
        }
        self.inp.next();
        self.inp.next();
        let body = self.scan_to_bracket_close()?;
        let inlines = self.parse_label(body);
        let attrs = self.parse_optional_inline_attributes();
        Some(InlineNode::Endnote(attrs, inlines))
    }

    fn parse_mark(&mut self) -> Option<InlineNode> {
        if self.link_like >= MAX_LINK_LIKE {
            return None;
        }
        self.inp.next();
        self.inp.next();
        let start = self.inp.pos();
        while let Some(c) = self.inp.ch() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                self.inp.next();
            } else {
                break;
            }
        }
        let mark = self.inp.slice(start, self.inp.pos()).to_owned();
        if mark.is_empty() {
            return None;
        }
        let inlines = match self.inp.ch()? {
            ']' => {
                self.inp.next();
                Vec::new()
            }
            '|' => {
                self.inp.next();
                let body = self.scan_to_bracket_close()?;
                self.parse_label(body)
            }
            _ => return None,
        };
        Some(InlineNode::Mark(NodeMark {
            mark,
            slug: String::new(),
            fragment: String::new(),
            inlines,
        }))
    }

    /// Scans the body of a link or embed to its doubled closing delimiter,
    /// tracking nesting of the single delimiters and the first top-level
    /// `|` separating the label from the target.  The body must stay on
    /// one line.
    fn scan_link_body(&mut self, open: char, close: char) -> Option<(Option<&'s str>, &'s str)> {
        let start = self.inp.pos();
        let mut sep = None;
        let mut depth = 0i32;
        loop {
            let c = self.inp.ch()?;
            if matches!(c, '\n' | '\r') {
                return None;
            }
            if c == close {
                if depth == 0 && self.inp.peek() == Some(close) {
                    let end = self.inp.pos();
                    self.inp.next();
                    self.inp.next();
                    return Some(match sep {
                        Some(p) => (Some(self.inp.slice(start, p)), self.inp.slice(p + 1, end)),
                        None => (None, self.inp.slice(start, end)),
                    });
                }
                if depth > 0 {
                    depth -= 1;
                }
                self.inp.next();
            } else if c == open {
                depth += 1;
                self.inp.next();
            } else if c == '|' && depth == 0 && sep.is_none() {
                sep = Some(self.inp.pos());
                self.inp.next();
            } else {
                self.inp.next();
            }
        }
    }

    /// Scans to the single `]` closing a cite, endnote, or mark body,
    /// tracking bracket nesting, on one line.
    fn scan_to_bracket_close(&mut self) -> Option<&'s str> {
        let start = self.inp.pos();
        let mut depth = 0i32;
        loop {
            match self.inp.ch()? {
                '\n' | '\r' => return None,
                '[' => {
                    depth += 1;
                    self.inp.next();
                }
                ']' => {
                    if depth == 0 {
                        let end = self.inp.pos();
                        self.inp.next();
                        return Some(self.inp.slice(start, end));
                    }
                    depth -= 1;
                    self.inp.next();
                }
                _ => {
                    self.inp.next();
                }
            }
        }
    }

    /// Parses a captured label span with a sub-parser carrying the
    /// incremented nesting counters.
    fn parse_label(&mut self, src: &str) -> Vec<InlineNode> {
        let mut sub = Parser::new(src);
        sub.nesting = self.nesting;
        sub.link_like = self.link_like + 1;
        let mut ins = Vec::new();
        while let Some(i) = sub.parse_inline() {
            ins.push(i);
        }
        ins
    }

    fn parse_optional_inline_attributes(&mut self) -> Attributes {
        if self.inp.ch() == Some('{') {
            if let Some(a) = self.parse_attributes(false) {
                return a;
            }
        }
        Attributes::new()
    }
}

/// The lower-cased file extension of an embed target, driving the syntax
/// slot; empty when the target has none.
fn extension_of(target: &str) -> String {
    let path = target
        .split(['#', '?'])
        .next()
        .unwrap_or(target);
    match path.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty() && ext.len() <= 8 && ext.bytes().all(|b| b.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => String::new(),
    }
}
