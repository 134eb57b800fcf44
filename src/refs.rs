//! Reference scanning and classification.
//!
//! A reference is the textual target of a link, embed, or transclusion.
//! Scanning is total: every input maps to some state, with `Invalid` as
//! the sink for everything malformed.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::ctype::isdigit;
use crate::sx::{sym, Symbol, Value};

/// The reserved all-zero zettel identifier, explicitly invalid.
pub const INVALID_ZID: &str = "00000000000000";

/// Prefix marking a query-expression reference.
pub const QUERY_PREFIX: &str = "query:";

const ZID_LENGTH: usize = 14;

/// Classification of a reference target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefState {
    /// A 14-digit zettel identifier, optionally with a fragment.
    Zettel,
    /// A fragment within the current document.
    SelfRef,
    /// A zettel identifier known to resolve.  Never produced by scanning;
    /// assigned by an external resolver.
    Found,
    /// A zettel identifier known not to resolve.  Assigned externally.
    Broken,
    /// A path served by the same host.
    Hosted,
    /// A host-relative path (written with a doubled slash).
    Based,
    /// A query expression for the note store.
    Query,
    /// An absolute URL pointing somewhere else.
    External,
    Invalid,
}

impl RefState {
    pub fn symbol(self) -> Symbol {
        match self {
            RefState::Zettel => sym::ZETTEL,
            RefState::SelfRef => sym::SELF,
            RefState::Found => sym::FOUND,
            RefState::Broken => sym::BROKEN,
            RefState::Hosted => sym::HOSTED,
            RefState::Based => sym::BASED,
            RefState::Query => sym::QUERY,
            RefState::External => sym::EXTERNAL,
            RefState::Invalid => sym::INVALID,
        }
    }

    pub fn from_symbol(s: Symbol) -> Option<RefState> {
        match s {
            sym::ZETTEL => Some(RefState::Zettel),
            sym::SELF => Some(RefState::SelfRef),
            sym::FOUND => Some(RefState::Found),
            sym::BROKEN => Some(RefState::Broken),
            sym::HOSTED => Some(RefState::Hosted),
            sym::BASED => Some(RefState::Based),
            sym::QUERY => Some(RefState::Query),
            sym::EXTERNAL => Some(RefState::External),
            sym::INVALID => Some(RefState::Invalid),
            _ => None,
        }
    }
}

/// A classified reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub state: RefState,
    pub value: String,
}

impl Reference {
    pub fn new(state: RefState, value: impl Into<String>) -> Reference {
        Reference {
            state,
            value: value.into(),
        }
    }

    /// Classifies a trimmed textual reference.
    pub fn scan(s: &str) -> Reference {
        if s.is_empty() || s == INVALID_ZID {
            return Reference::new(RefState::Invalid, s);
        }
        if let Some(r) = scan_zettel(s) {
            return r;
        }
        if let Some(rest) = s.strip_prefix(QUERY_PREFIX) {
            return Reference::new(RefState::Query, rest);
        }
        if let Some(based) = s.strip_prefix('/') {
            if based.starts_with('/') {
                return Reference::new(RefState::Based, based);
            }
            return Reference::new(RefState::Hosted, s);
        }
        if s.starts_with("./") || s.starts_with("../") {
            return Reference::new(RefState::Hosted, s);
        }
        if let Some(frag) = s.strip_prefix('#') {
            if frag.is_empty() || frag.contains(char::is_whitespace) {
                return Reference::new(RefState::Invalid, s);
            }
            return Reference::new(RefState::SelfRef, s);
        }
        if s.contains(char::is_whitespace) {
            return Reference::new(RefState::Invalid, s);
        }
        match Url::parse(s) {
            Ok(_) => Reference::new(RefState::External, s),
            Err(url::ParseError::RelativeUrlWithoutBase) => Reference::new(RefState::Hosted, s),
            Err(_) => Reference::new(RefState::Invalid, s),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state != RefState::Invalid
    }

    pub fn is_zettel(&self) -> bool {
        matches!(
            self.state,
            RefState::Zettel | RefState::Found | RefState::Broken
        )
    }

    /// The zettel identifier without any fragment, for zettel-like states.
    pub fn zid(&self) -> Option<&str> {
        if !self.is_zettel() {
            return None;
        }
        Some(match self.value.split_once('#') {
            Some((zid, _)) => zid,
            None => &self.value,
        })
    }

    /// Encodes the reference as its two-element list `(STATE "value")`.
    pub fn to_value(&self) -> Value {
        Value::tagged(self.state.symbol(), [Value::string(self.value.as_str())])
    }

    /// Decodes a `(STATE "value")` list.
    pub fn from_value(v: &Value) -> Option<Reference> {
        let state = RefState::from_symbol(v.node_tag()?)?;
        let value = v.head()?.as_str()?;
        Some(Reference::new(state, value))
    }
}

fn scan_zettel(s: &str) -> Option<Reference> {
    let (zid, frag) = match s.split_once('#') {
        Some((zid, frag)) => (zid, Some(frag)),
        None => (s, None),
    };
    if zid.len() != ZID_LENGTH || !zid.bytes().all(isdigit) {
        return None;
    }
    // The all-zero identifier is invalid with or without a fragment.
    if zid.bytes().all(|b| b == b'0') {
        return None;
    }
    if let Some(frag) = frag {
        if frag.is_empty() || frag.contains(char::is_whitespace) {
            return None;
        }
    }
    Some(Reference::new(RefState::Zettel, s))
}

impl fmt::Display for Reference {
    /// Prints the textual form scanning started from: `Based` restores its
    /// doubled slash, `Query` its prefix.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.state {
            RefState::Based => write!(f, "/{}", self.value),
            RefState::Query => write!(f, "{}{}", QUERY_PREFIX, self.value),
            _ => f.write_str(&self.value),
        }
    }
}

impl FromStr for Reference {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Reference, Infallible> {
        Ok(Reference::scan(s))
    }
}
