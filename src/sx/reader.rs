//! A reader for the canonical printed form, the inverse of the value
//! layer's `Display`.  `read(print(v)) == v` for every tree the pipeline
//! produces.

use thiserror::Error;

use crate::ctype::{is_line_end, isspace};

use super::{Symbol, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedChar(char, usize),
    #[error("trailing input after the first value at byte {0}")]
    TrailingInput(usize),
    #[error("integer out of range at byte {0}")]
    IntOutOfRange(usize),
}

/// Reads exactly one value from `src`, ignoring surrounding whitespace.
pub fn read(src: &str) -> Result<Value, ReadError> {
    let mut r = Reader {
        src: src.as_bytes(),
        pos: 0,
    };
    r.skip_ws();
    let v = r.datum()?;
    r.skip_ws();
    if r.pos < r.src.len() {
        return Err(ReadError::TrailingInput(r.pos));
    }
    Ok(v)
}

struct Reader<'s> {
    src: &'s [u8],
    pos: usize,
}

impl<'s> Reader<'s> {
    fn skip_ws(&mut self) {
        while let Some(&b) = self.src.get(self.pos) {
            if isspace(b) || is_line_end(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn datum(&mut self) -> Result<Value, ReadError> {
        match self.byte() {
            None => Err(ReadError::UnexpectedEnd),
            Some(b'(') => self.list(),
            Some(b'"') => self.string(),
            Some(b'#') => self.boolean(),
            Some(b')') => Err(ReadError::UnexpectedChar(')', self.pos)),
            Some(b) if b.is_ascii_digit() => self.number(),
            Some(b'-') if self.peek_digit() => self.number(),
            Some(_) => self.symbol(),
        }
    }

    fn peek_digit(&self) -> bool {
        self.src
            .get(self.pos + 1)
            .map_or(false, |b| b.is_ascii_digit())
    }

    fn list(&mut self) -> Result<Value, ReadError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.byte() {
                None => return Err(ReadError::UnexpectedEnd),
                Some(b')') => {
                    self.pos += 1;
                    return Ok(Value::list(items));
                }
                Some(b'.') if self.at_dot() => {
                    self.pos += 1;
                    self.skip_ws();
                    let tail = self.datum()?;
                    self.skip_ws();
                    if self.byte() != Some(b')') {
                        return Err(ReadError::UnexpectedChar('.', self.pos));
                    }
                    self.pos += 1;
                    return Ok(items
                        .into_iter()
                        .rev()
                        .fold(tail, |tail, head| Value::cons(head, tail)));
                }
                Some(_) => items.push(self.datum()?),
            }
        }
    }

    /// A lone `.` is the dotted-pair marker; `.foo` is a symbol.
    fn at_dot(&self) -> bool {
        matches!(
            self.src.get(self.pos + 1),
            None | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'(') | Some(b')')
        )
    }

    fn string(&mut self) -> Result<Value, ReadError> {
        self.pos += 1;
        let mut out = String::new();
        let rest = &self.src[self.pos..];
        let mut chars = std::str::from_utf8(rest).unwrap_or("").char_indices();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos += i + 1;
                    return Ok(Value::string(out));
                }
                '\\' => match chars.next() {
                    Some((_, '"')) => out.push('"'),
                    Some((_, '\\')) => out.push('\\'),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((j, other)) => {
                        return Err(ReadError::UnexpectedChar(other, self.pos + j))
                    }
                    None => return Err(ReadError::UnexpectedEnd),
                },
                _ => out.push(ch),
            }
        }
        Err(ReadError::UnexpectedEnd)
    }

    fn boolean(&mut self) -> Result<Value, ReadError> {
        match self.src.get(self.pos + 1) {
            Some(b't') => {
                self.pos += 2;
                Ok(Value::Bool(true))
            }
            Some(b'f') => {
                self.pos += 2;
                Ok(Value::Bool(false))
            }
            Some(&b) => Err(ReadError::UnexpectedChar(b as char, self.pos + 1)),
            None => Err(ReadError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<Value, ReadError> {
        let start = self.pos;
        if self.byte() == Some(b'-') {
            self.pos += 1;
        }
        while self.byte().map_or(false, |b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ReadError::IntOutOfRange(start))
    }

    fn symbol(&mut self) -> Result<Value, ReadError> {
        let start = self.pos;
        while let Some(b) = self.byte() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'(' | b')' | b'"' => break,
                _ => self.pos += 1,
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| ReadError::UnexpectedChar('\u{fffd}', start))?;
        Ok(Value::Symbol(Symbol::intern(text)))
    }
}
