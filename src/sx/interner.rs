//! The process-wide symbol pool.
//!
//! Symbols compare by pool id; two symbols are equal exactly when their
//! names are equal.  The pool is append-only: names are leaked into the
//! process so `Symbol::name` can hand out `&'static str` without holding
//! the pool lock.  Reads vastly outnumber writes, so the pool sits behind
//! a read/write lock and the whole tag vocabulary is interned up front,
//! letting the evaluator dispatch on plain `match`.

use std::fmt;
use std::sync::{OnceLock, RwLock};

use rustc_hash::FxHashMap;

/// An interned symbol.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

struct Pool {
    names: Vec<&'static str>,
    index: FxHashMap<&'static str, u32>,
}

fn pool() -> &'static RwLock<Pool> {
    static POOL: OnceLock<RwLock<Pool>> = OnceLock::new();
    POOL.get_or_init(|| {
        let mut pool = Pool {
            names: Vec::with_capacity(PREDEFINED.len()),
            index: FxHashMap::default(),
        };
        for &name in PREDEFINED {
            let id = pool.names.len() as u32;
            pool.names.push(name);
            pool.index.insert(name, id);
        }
        RwLock::new(pool)
    })
}

impl Symbol {
    /// Interns `name`, returning the existing symbol if the pool already
    /// knows it.
    pub fn intern(name: &str) -> Symbol {
        if let Some(&id) = pool().read().unwrap().index.get(name) {
            return Symbol(id);
        }
        let mut pool = pool().write().unwrap();
        if let Some(&id) = pool.index.get(name) {
            return Symbol(id);
        }
        let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let id = pool.names.len() as u32;
        pool.names.push(name);
        pool.index.insert(name, id);
        Symbol(id)
    }

    pub fn name(self) -> &'static str {
        pool().read().unwrap().names[self.0 as usize]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! predefined {
    ($($konst:ident => $text:literal,)*) => {
        #[allow(non_camel_case_types, dead_code)]
        #[repr(u32)]
        enum Predef { $($konst),* }

        /// The fixed tag vocabulary, interned before any lookup happens so
        /// these constants can be used in `match` patterns.
        pub mod sym {
            use super::{Predef, Symbol};
            $(pub const $konst: Symbol = Symbol(Predef::$konst as u32);)*
        }

        const PREDEFINED: &[&str] = &[$($text),*];
    };
}

predefined! {
    // Top-level containers.
    BLOCK => "BLOCK",
    INLINE => "INLINE",

    // Block nodes.
    PARA => "PARA",
    HEADING => "HEADING",
    THEMATIC => "THEMATIC",
    REGION_BLOCK => "REGION-BLOCK",
    REGION_QUOTE => "REGION-QUOTE",
    REGION_VERSE => "REGION-VERSE",
    VERBATIM_CODE => "VERBATIM-CODE",
    VERBATIM_EVAL => "VERBATIM-EVAL",
    VERBATIM_COMMENT => "VERBATIM-COMMENT",
    VERBATIM_HTML => "VERBATIM-HTML",
    VERBATIM_MATH => "VERBATIM-MATH",
    VERBATIM_ZETTEL => "VERBATIM-ZETTEL",
    ORDERED => "ORDERED",
    UNORDERED => "UNORDERED",
    QUOTATION => "QUOTATION",
    DESCRIPTION => "DESCRIPTION",
    TABLE => "TABLE",
    CELL => "CELL",
    CELL_LEFT => "CELL-LEFT",
    CELL_CENTER => "CELL-CENTER",
    CELL_RIGHT => "CELL-RIGHT",
    TRANSCLUDE => "TRANSCLUDE",

    // Inline nodes.
    TEXT => "TEXT",
    SPACE => "SPACE",
    SOFT => "SOFT",
    HARD => "HARD",
    LINK_ZETTEL => "LINK-ZETTEL",
    LINK_SELF => "LINK-SELF",
    LINK_FOUND => "LINK-FOUND",
    LINK_BROKEN => "LINK-BROKEN",
    LINK_HOSTED => "LINK-HOSTED",
    LINK_BASED => "LINK-BASED",
    LINK_QUERY => "LINK-QUERY",
    LINK_EXTERNAL => "LINK-EXTERNAL",
    LINK_INVALID => "LINK-INVALID",
    EMBED => "EMBED",
    EMBED_BLOB => "EMBED-BLOB",
    CITE => "CITE",
    ENDNOTE => "ENDNOTE",
    MARK => "MARK",
    FORMAT_EMPH => "FORMAT-EMPH",
    FORMAT_STRONG => "FORMAT-STRONG",
    FORMAT_INSERT => "FORMAT-INSERT",
    FORMAT_DELETE => "FORMAT-DELETE",
    FORMAT_SUPER => "FORMAT-SUPER",
    FORMAT_SUB => "FORMAT-SUB",
    FORMAT_QUOTE => "FORMAT-QUOTE",
    FORMAT_MARK => "FORMAT-MARK",
    FORMAT_SPAN => "FORMAT-SPAN",
    LITERAL_CODE => "LITERAL-CODE",
    LITERAL_HTML => "LITERAL-HTML",
    LITERAL_INPUT => "LITERAL-INPUT",
    LITERAL_OUTPUT => "LITERAL-OUTPUT",
    LITERAL_MATH => "LITERAL-MATH",
    LITERAL_COMMENT => "LITERAL-COMMENT",
    LITERAL_ZETTEL => "LITERAL-ZETTEL",

    // Reference states.
    ZETTEL => "ZETTEL",
    SELF => "SELF",
    FOUND => "FOUND",
    BROKEN => "BROKEN",
    HOSTED => "HOSTED",
    BASED => "BASED",
    QUERY => "QUERY",
    EXTERNAL => "EXTERNAL",
    INVALID => "INVALID",

    // HTML tree vocabulary.
    ATTR => "@",
    NO_ESCAPE => "NO-ESCAPE",
    COMMENT => "COMMENT",
    A => "a",
    BLOCKQUOTE => "blockquote",
    BR => "br",
    CITE_TAG => "cite",
    CODE => "code",
    DD => "dd",
    DEL => "del",
    DIV => "div",
    DL => "dl",
    DT => "dt",
    EM => "em",
    EMBED_TAG => "embed",
    FIGURE => "figure",
    H1 => "h1",
    H2 => "h2",
    H3 => "h3",
    H4 => "h4",
    H5 => "h5",
    H6 => "h6",
    HR => "hr",
    IMG => "img",
    INS => "ins",
    KBD => "kbd",
    LI => "li",
    MARK_TAG => "mark",
    OL => "ol",
    P => "p",
    PRE => "pre",
    SAMP => "samp",
    SPAN => "span",
    STRONG => "strong",
    SUB => "sub",
    SUP => "sup",
    TABLE_TAG => "table",
    TBODY => "tbody",
    TD => "td",
    TH => "th",
    THEAD => "thead",
    TR => "tr",
    UL => "ul",
}
