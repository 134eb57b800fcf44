//! Encoding of the parser's node tree into the raw S-expression AST.
//!
//! Every node becomes a tagged proper list with the layout the rest of
//! the pipeline dispatches on; the parser-internal `Null` paragraph
//! markers disappear here.

use crate::nodes::{
    BlockLink, BlockNode, FormatKind, InlineNode, ListKind, LiteralKind, RegionKind, TableRow,
    VerbatimKind,
};
use crate::refs::RefState;
use crate::sx::{sym, Symbol, Value};

/// Encodes a block slice as `(BLOCK …)`.
pub(crate) fn encode_block_slice(blocks: &[BlockLink]) -> Value {
    Value::tagged(sym::BLOCK, encode_blocks(blocks))
}

/// Encodes an inline slice as `(INLINE …)`.
pub(crate) fn encode_inline_slice(inlines: &[InlineNode]) -> Value {
    Value::tagged(sym::INLINE, encode_inlines(inlines))
}

fn encode_blocks(blocks: &[BlockLink]) -> Vec<Value> {
    blocks
        .iter()
        .filter_map(|b| encode_block(&b.borrow()))
        .collect()
}

fn encode_block(node: &BlockNode) -> Option<Value> {
    match node {
        BlockNode::Para(ins) => Some(Value::tagged(sym::PARA, encode_inlines(ins))),

        BlockNode::Heading(h) => {
            let mut items = vec![
                Value::Int(h.level),
                h.attrs.to_value(),
                Value::string(h.slug.as_str()),
                Value::string(h.fragment.as_str()),
            ];
            items.extend(encode_inlines(&h.inlines));
            Some(Value::tagged(sym::HEADING, items))
        }

        BlockNode::Thematic(attrs) => Some(Value::tagged(sym::THEMATIC, [attrs.to_value()])),

        BlockNode::Verbatim(v) => {
            let tag = match v.kind {
                VerbatimKind::Code => sym::VERBATIM_CODE,
                VerbatimKind::Eval => sym::VERBATIM_EVAL,
                VerbatimKind::Comment => sym::VERBATIM_COMMENT,
                VerbatimKind::Math => sym::VERBATIM_MATH,
                VerbatimKind::Zettel => sym::VERBATIM_ZETTEL,
            };
            Some(Value::tagged(
                tag,
                [v.attrs.to_value(), Value::string(v.content.as_str())],
            ))
        }

        BlockNode::Region(r) => {
            let tag = match r.kind {
                RegionKind::Block => sym::REGION_BLOCK,
                RegionKind::Quote => sym::REGION_QUOTE,
                RegionKind::Verse => sym::REGION_VERSE,
            };
            let mut items = vec![
                r.attrs.to_value(),
                Value::tagged(sym::BLOCK, encode_blocks(&r.blocks)),
            ];
            items.extend(encode_inlines(&r.citation));
            Some(Value::tagged(tag, items))
        }

        BlockNode::List(l) => {
            let tag = match l.kind {
                ListKind::Unordered => sym::UNORDERED,
                ListKind::Ordered => sym::ORDERED,
                ListKind::Quotation => sym::QUOTATION,
            };
            let mut items = vec![l.attrs.to_value()];
            for item in &l.items {
                items.push(Value::tagged(sym::BLOCK, encode_blocks(item)));
            }
            Some(Value::tagged(tag, items))
        }

        BlockNode::Description(d) => {
            let mut items = vec![d.attrs.to_value()];
            for term in &d.terms {
                items.push(Value::list(encode_inlines(&term.term)));
                items.push(Value::tagged(
                    sym::BLOCK,
                    term.descriptions
                        .iter()
                        .map(|descr| Value::tagged(sym::BLOCK, encode_blocks(descr)))
                        .collect::<Vec<_>>(),
                ));
            }
            Some(Value::tagged(sym::DESCRIPTION, items))
        }

        BlockNode::Table(t) => {
            // The header slot is always present; the post-processor may
            // move the first row into it.
            let mut items = vec![Value::Nil];
            for row in &t.rows {
                items.push(encode_row(row));
            }
            Some(Value::tagged(sym::TABLE, items))
        }

        BlockNode::Transclude(attrs, reference) => Some(Value::tagged(
            sym::TRANSCLUDE,
            [attrs.to_value(), reference.to_value()],
        )),

        BlockNode::Null => None,
    }
}

fn encode_row(row: &TableRow) -> Value {
    Value::list(
        row.iter()
            .map(|cell| Value::tagged(sym::CELL, encode_inlines(&cell.inlines)))
            .collect::<Vec<_>>(),
    )
}

fn encode_inlines(inlines: &[InlineNode]) -> Vec<Value> {
    inlines.iter().map(encode_inline).collect()
}

fn encode_inline(node: &InlineNode) -> Value {
    match node {
        InlineNode::Text(s) => Value::tagged(sym::TEXT, [Value::string(s.as_str())]),
        InlineNode::Soft => Value::tagged(sym::SOFT, []),
        InlineNode::Hard => Value::tagged(sym::HARD, []),

        InlineNode::Link(l) => {
            let mut items = vec![
                l.attrs.to_value(),
                Value::string(l.reference.value.as_str()),
            ];
            items.extend(encode_inlines(&l.inlines));
            Value::tagged(link_tag(l.reference.state), items)
        }

        InlineNode::Embed(e) => {
            let mut items = vec![
                e.attrs.to_value(),
                e.reference.to_value(),
                Value::string(e.syntax.as_str()),
            ];
            items.extend(encode_inlines(&e.inlines));
            Value::tagged(sym::EMBED, items)
        }

        InlineNode::Cite(c) => {
            let mut items = vec![c.attrs.to_value(), Value::string(c.key.as_str())];
            items.extend(encode_inlines(&c.inlines));
            Value::tagged(sym::CITE, items)
        }

        InlineNode::Endnote(attrs, ins) => {
            let mut items = vec![attrs.to_value()];
            items.extend(encode_inlines(ins));
            Value::tagged(sym::ENDNOTE, items)
        }

        InlineNode::Mark(m) => {
            let mut items = vec![
                Value::string(m.mark.as_str()),
                Value::string(m.slug.as_str()),
                Value::string(m.fragment.as_str()),
            ];
            items.extend(encode_inlines(&m.inlines));
            Value::tagged(sym::MARK, items)
        }

        InlineNode::Format(kind, attrs, ins) => {
            let tag = match kind {
                FormatKind::Emph => sym::FORMAT_EMPH,
                FormatKind::Strong => sym::FORMAT_STRONG,
                FormatKind::Insert => sym::FORMAT_INSERT,
                FormatKind::Delete => sym::FORMAT_DELETE,
                FormatKind::Super => sym::FORMAT_SUPER,
                FormatKind::Sub => sym::FORMAT_SUB,
                FormatKind::Quote => sym::FORMAT_QUOTE,
                FormatKind::Mark => sym::FORMAT_MARK,
                FormatKind::Span => sym::FORMAT_SPAN,
            };
            let mut items = vec![attrs.to_value()];
            items.extend(encode_inlines(ins));
            Value::tagged(tag, items)
        }

        InlineNode::Literal(kind, attrs, content) => {
            let tag = match kind {
                LiteralKind::Code => sym::LITERAL_CODE,
                LiteralKind::Input => sym::LITERAL_INPUT,
                LiteralKind::Output => sym::LITERAL_OUTPUT,
                LiteralKind::Math => sym::LITERAL_MATH,
                LiteralKind::Comment => sym::LITERAL_COMMENT,
            };
            Value::tagged(tag, [attrs.to_value(), Value::string(content.as_str())])
        }
    }
}

fn link_tag(state: RefState) -> Symbol {
    match state {
        RefState::Zettel => sym::LINK_ZETTEL,
        RefState::SelfRef => sym::LINK_SELF,
        RefState::Found => sym::LINK_FOUND,
        RefState::Broken => sym::LINK_BROKEN,
        RefState::Hosted => sym::LINK_HOSTED,
        RefState::Based => sym::LINK_BASED,
        RefState::Query => sym::LINK_QUERY,
        RefState::External => sym::LINK_EXTERNAL,
        RefState::Invalid => sym::LINK_INVALID,
    }
}
