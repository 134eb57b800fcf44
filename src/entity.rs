use std::char;
use std::cmp::min;

use entities::ENTITIES;

use crate::ctype::{isalpha, isdigit};

pub const ENTITY_MIN_LENGTH: usize = 2;
pub const ENTITY_MAX_LENGTH: usize = 31;

fn isxdigit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}

/// Decodes one entity reference at the start of `text`, which begins just
/// after the `&`.  Returns the decoded characters and the number of input
/// bytes consumed (including the terminating `;`).
///
/// Numeric references below U+0020 and non-scalar values are rejected, as
/// are names that are not pure ASCII letters or not in the HTML5 table.  A
/// rejected reference returns `None` and the caller keeps the raw text.
pub fn unescape(text: &str) -> Option<(String, usize)> {
    let text = text.as_bytes();
    if text.len() >= 3 && text[0] == b'#' {
        let mut codepoint: u32 = 0;
        let mut i;

        let num_digits = if isdigit(text[1]) {
            i = 1;
            while i < text.len() && isdigit(text[i]) {
                codepoint = (codepoint * 10) + (text[i] as u32 - '0' as u32);
                codepoint = min(codepoint, 0x11_0000);
                i += 1;
            }
            i - 1
        } else if text[1] == b'x' || text[1] == b'X' {
            i = 2;
            while i < text.len() && isxdigit(text[i]) {
                codepoint = (codepoint * 16) + ((text[i] as u32 | 32) % 39 - 9);
                codepoint = min(codepoint, 0x11_0000);
                i += 1;
            }
            i - 2
        } else {
            return None;
        };

        if num_digits >= 1 && num_digits <= 8 && i < text.len() && text[i] == b';' {
            if codepoint < 0x20 {
                return None;
            }
            return char::from_u32(codepoint).map(|ch| (ch.to_string(), i + 1));
        }
        return None;
    }

    let size = min(text.len(), ENTITY_MAX_LENGTH);
    for i in ENTITY_MIN_LENGTH..size {
        if text[i] == b';' {
            return lookup(&text[..i]).map(|e| (e.to_string(), i + 1));
        }
        if !isalpha(text[i]) {
            return None;
        }
    }
    None
}

fn lookup(text: &[u8]) -> Option<&'static str> {
    if !text.iter().all(|&ch| isalpha(ch)) {
        return None;
    }
    let entity_str = format!("&{};", std::str::from_utf8(text).ok()?);

    ENTITIES
        .iter()
        .find(|e| e.entity == entity_str)
        .map(|e| e.characters)
}
