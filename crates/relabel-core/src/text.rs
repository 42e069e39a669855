//! Literal byte-level substitution and small text utilities.
//!
//! Matching works on raw bytes rather than `&str` so files that are not
//! valid UTF-8 (Latin-1 comments, stray bytes) are rewritten byte-exactly.
//! The search text is escaped before compilation: rules are plain substrings,
//! never patterns.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**

use std::borrow::Cow;

use regex::bytes::{NoExpand, Regex};

use crate::rules::Rule;

/// Number of leading bytes inspected by [`looks_binary`].
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Compiled form of a [`Rule`].
///
/// Occurrences are found leftmost-first and never overlap, so `"aaa"` with
/// search text `"aa"` has exactly one occurrence.
#[derive(Debug, Clone)]
pub struct LiteralReplacer {
    pattern: Regex,
    replacement: Vec<u8>,
}

impl LiteralReplacer {
    pub fn new(rule: &Rule) -> Result<Self, regex::Error> {
        Ok(LiteralReplacer {
            pattern: Regex::new(&regex::escape(&rule.search))?,
            replacement: rule.replace.as_bytes().to_vec(),
        })
    }

    /// Byte offset of the first occurrence, if any.
    pub fn find(&self, content: &[u8]) -> Option<usize> {
        self.pattern.find(content).map(|m| m.start())
    }

    /// Count non-overlapping occurrences.
    pub fn count(&self, content: &[u8]) -> usize {
        self.pattern.find_iter(content).count()
    }

    /// Replace every non-overlapping occurrence, scanning left to right.
    ///
    /// Returns `Cow::Borrowed` when there is nothing to replace.
    pub fn replace_all<'a>(&self, content: &'a [u8]) -> Cow<'a, [u8]> {
        self.pattern
            .replace_all(content, NoExpand(self.replacement.as_slice()))
    }
}

/// Heuristic binary detection: a NUL byte within the first
/// [`BINARY_SNIFF_LEN`] bytes.
pub fn looks_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(BINARY_SNIFF_LEN)];
    head.contains(&0)
}

/// Convert a byte offset to 1-indexed line and column.
///
/// Columns count bytes, not characters. If `offset` exceeds content length,
/// returns the position at end of content.
pub fn byte_offset_to_position(content: &[u8], offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for &byte in &content[..offset] {
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
