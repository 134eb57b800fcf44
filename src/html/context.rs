use smallvec::SmallVec;

use crate::attrs::Attributes;
use crate::html::{EvalError, Options};
use crate::sx::Value;

/// Per-evaluation state.  An environment serves one document on one
/// thread; run parallel evaluations on separate environments.
pub struct Environment<'o> {
    /// [`Options`] in use in this evaluation.
    pub options: &'o Options,

    pub(super) err: Option<EvalError>,
    pub(super) langs: SmallVec<[String; 4]>,
    pub(super) quote_nesting: u32,
    pub(super) endnotes: Vec<Endnote>,
}

/// One collected endnote: its attributes (carrying the language in effect)
/// and the raw inline list, rendered at emission time because a body may
/// itself contain further endnotes.
#[derive(Clone)]
pub(super) struct Endnote {
    pub(super) attrs: Attributes,
    pub(super) inlines: Value,
}

impl<'o> Environment<'o> {
    pub fn new(options: &'o Options) -> Self {
        let mut langs = SmallVec::new();
        if !options.lang.is_empty() {
            langs.push(options.lang.clone());
        }
        Environment {
            options,
            err: None,
            langs,
            quote_nesting: 0,
            endnotes: Vec::new(),
        }
    }

    /// The first error recorded during evaluation, if any.  Once set,
    /// further evaluation through this environment is a no-op.
    pub fn error(&self) -> Option<&EvalError> {
        self.err.as_ref()
    }

    /// The language currently in effect.
    pub(super) fn lang(&self) -> &str {
        self.langs.last().map(String::as_str).unwrap_or("")
    }

    /// Runs `f` with the node's `lang` attribute (if any) pushed onto the
    /// language stack.
    pub(super) fn scoped_lang<R>(
        &mut self,
        attrs: &Attributes,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let pushed = match attrs.get("lang") {
            Some(lang) if !lang.is_empty() => {
                self.langs.push(lang.to_owned());
                true
            }
            _ => false,
        };
        let r = f(self);
        if pushed {
            self.langs.pop();
        }
        r
    }
}
