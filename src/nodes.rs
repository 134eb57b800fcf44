//! The Zettelmarkup AST as the parser builds it.
//!
//! These are the working types of the block and inline parsers; the
//! encoded S-expression form (see [`crate::encode`]) is what leaves the
//! parser.  Constructs that stay open across input lines — nested lists,
//! tables, description lists — are held behind [`BlockLink`] handles so
//! later lines can extend them in place.

use std::cell::RefCell;
use std::rc::Rc;

use crate::attrs::Attributes;
use crate::refs::Reference;

/// A shared, mutable handle to a block node.
pub type BlockLink = Rc<RefCell<BlockNode>>;

pub fn block(node: BlockNode) -> BlockLink {
    Rc::new(RefCell::new(node))
}

/// The block-level node kinds.
#[derive(Debug, Clone)]
pub enum BlockNode {
    /// **Block**.  Inline content gathered into one paragraph.
    Para(Vec<InlineNode>),

    /// **Block**.  A heading introduced by `=== `.  The slug and fragment
    /// start empty; an external indexer fills them in.
    Heading(NodeHeading),

    /// **Block**.  A thematic break (`---`).
    Thematic(Attributes),

    /// **Block**.  A verbatim block whose content is opaque to the parser.
    Verbatim(NodeVerbatim),

    /// **Block**.  A delimited region carrying nested blocks and an
    /// optional trailing citation line.
    Region(NodeRegion),

    /// **Block**.  A nested list; every item is a slice of blocks.
    List(NodeList),

    /// **Block**.  A description list of terms and their descriptions.
    Description(NodeDescription),

    /// **Block**.  A table; header and alignment are inferred later by the
    /// post-processor.
    Table(NodeTable),

    /// **Block**.  A transclusion request (`{{{…}}}`).
    Transclude(Attributes, Reference),

    /// Marks a paragraph boundary inside an open list item after a blank
    /// line.  Never survives encoding.
    Null,
}

#[derive(Debug, Clone)]
pub struct NodeHeading {
    pub level: i64,
    pub attrs: Attributes,
    pub slug: String,
    pub fragment: String,
    pub inlines: Vec<InlineNode>,
}

/// Verbatim kinds the parser can produce.  `VERBATIM-HTML` exists in the
/// interchange vocabulary but only arrives from outside, via the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbatimKind {
    Code,
    Eval,
    Comment,
    Math,
    Zettel,
}

#[derive(Debug, Clone)]
pub struct NodeVerbatim {
    pub kind: VerbatimKind,
    pub attrs: Attributes,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Block,
    Quote,
    Verse,
}

#[derive(Debug, Clone)]
pub struct NodeRegion {
    pub kind: RegionKind,
    pub attrs: Attributes,
    pub blocks: Vec<BlockLink>,
    pub citation: Vec<InlineNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
    Quotation,
}

/// One item of a nested list is a slice of blocks.
pub type ItemSlice = Vec<BlockLink>;

#[derive(Debug, Clone)]
pub struct NodeList {
    pub kind: ListKind,
    pub attrs: Attributes,
    pub items: Vec<ItemSlice>,
}

#[derive(Debug, Clone)]
pub struct NodeDescription {
    pub attrs: Attributes,
    pub terms: Vec<DescriptionTerm>,
}

/// A term and the descriptions attached to it so far.
#[derive(Debug, Clone)]
pub struct DescriptionTerm {
    pub term: Vec<InlineNode>,
    pub descriptions: Vec<ItemSlice>,
}

#[derive(Debug, Clone)]
pub struct NodeTable {
    pub rows: Vec<TableRow>,
}

pub type TableRow = Vec<TableCell>;

#[derive(Debug, Clone)]
pub struct TableCell {
    pub inlines: Vec<InlineNode>,
}

/// The inline-level node kinds.
#[derive(Debug, Clone)]
pub enum InlineNode {
    /// **Inline**.  Literal text.  Space runs stay inside the text; the
    /// post-processor merges and trims.
    Text(String),

    /// **Inline**.  A line break the renderer may ignore.
    Soft,

    /// **Inline**.  A forced line break.
    Hard,

    /// **Inline**.  A hyperlink; the reference state picks the node tag.
    Link(NodeLink),

    /// **Inline**.  Embedded material (`{{…}}`).
    Embed(NodeEmbed),

    /// **Inline**.  A citation (`[@key …]`).
    Cite(NodeCite),

    /// **Inline**.  An endnote (`[^…]`), collected during evaluation.
    Endnote(Attributes, Vec<InlineNode>),

    /// **Inline**.  An anchor (`[!name|…]`) usable as a link target.
    Mark(NodeMark),

    /// **Inline**.  Formatted text with a doubled delimiter.
    Format(FormatKind, Attributes, Vec<InlineNode>),

    /// **Inline**.  Raw content captured between doubled delimiters.
    Literal(LiteralKind, Attributes, String),
}

#[derive(Debug, Clone)]
pub struct NodeLink {
    pub attrs: Attributes,
    pub reference: Reference,
    pub inlines: Vec<InlineNode>,
}

#[derive(Debug, Clone)]
pub struct NodeEmbed {
    pub attrs: Attributes,
    pub reference: Reference,
    /// The syntax hint, derived from the target's file extension.
    pub syntax: String,
    pub inlines: Vec<InlineNode>,
}

#[derive(Debug, Clone)]
pub struct NodeCite {
    pub attrs: Attributes,
    pub key: String,
    pub inlines: Vec<InlineNode>,
}

#[derive(Debug, Clone)]
pub struct NodeMark {
    pub mark: String,
    pub slug: String,
    pub fragment: String,
    pub inlines: Vec<InlineNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Emph,
    Strong,
    Insert,
    Delete,
    Super,
    Sub,
    Quote,
    Mark,
    Span,
}

/// Literal kinds the parser can produce; `LITERAL-HTML` and
/// `LITERAL-ZETTEL` arrive only via the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Code,
    Input,
    Output,
    Math,
    Comment,
}
