//! Byte and code-point helpers shared by the string functions.
//!
//! String columns are not required to hold valid UTF-8. The character-aware
//! helpers decode leniently: each byte that does not start a valid sequence
//! counts as one replacement character and is kept as a one-byte unit, so a
//! slice taken at a unit boundary never splits a well-formed code point.

/// Iterator over the code points of a byte string, with their source bytes.
#[derive(Debug, Clone)]
pub struct Runes<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Runes<'a> {
    type Item = (char, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let (ch, width) = decode_rune(self.rest);
        let (unit, rest) = self.rest.split_at(width);
        self.rest = rest;
        Some((ch, unit))
    }
}

/// Returns an iterator over the code points of `bytes`.
#[must_use]
pub fn runes(bytes: &[u8]) -> Runes<'_> {
    Runes { rest: bytes }
}

/// Decodes the first code point of a non-empty byte string.
///
/// Returns the character and the number of bytes it occupies. Invalid input
/// decodes as `U+FFFD` of width 1.
#[must_use]
pub fn decode_rune(bytes: &[u8]) -> (char, usize) {
    let Some(&lead) = bytes.first() else {
        return (char::REPLACEMENT_CHARACTER, 0);
    };
    let width = match lead {
        0x00..=0x7F => return (char::from(lead), 1),
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    if bytes.len() < width {
        return (char::REPLACEMENT_CHARACTER, 1);
    }
    match std::str::from_utf8(&bytes[..width]) {
        Ok(s) => s
            .chars()
            .next()
            .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, width)),
        Err(_) => (char::REPLACEMENT_CHARACTER, 1),
    }
}

/// Number of code points in `bytes`.
#[must_use]
pub fn char_len(bytes: &[u8]) -> usize {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.chars().count();
    }
    runes(bytes).count()
}

/// Byte length of the first `n` code points (or all of them).
#[must_use]
pub fn char_prefix_len(bytes: &[u8], n: usize) -> usize {
    runes(bytes).take(n).map(|(_, unit)| unit.len()).sum()
}

/// Byte offset at which the last `n` code points start.
#[must_use]
pub fn char_suffix_start(bytes: &[u8], n: usize) -> usize {
    let total = char_len(bytes);
    char_prefix_len(bytes, total.saturating_sub(n))
}

/// Byte range of the code points `[start, start + len)`, clamped.
#[must_use]
pub fn char_range(bytes: &[u8], start: usize, len: usize) -> (usize, usize) {
    let begin = char_prefix_len(bytes, start);
    let end = begin + char_prefix_len(&bytes[begin..], len);
    (begin, end)
}

/// Position of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at 0.
#[must_use]
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Position of the last occurrence of `needle` in `haystack`.
#[must_use]
pub fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Decodes to code points, lower-casing each one when `fold` is set.
///
/// Every code point maps to exactly one code point, so indexes into the
/// result are character positions in the source.
#[must_use]
pub fn fold_chars(bytes: &[u8], fold: bool) -> Vec<char> {
    runes(bytes)
        .map(|(c, _)| {
            if fold {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Position of the first occurrence of `needle` in `haystack`, by element.
#[must_use]
pub fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
