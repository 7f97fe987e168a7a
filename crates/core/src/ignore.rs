//! Post-hoc classification of low-value diffs.
//!
//! A pure, total, deterministic rule chain over the operation text.
//! Matching blocks keep their bboxes and texts; only `block_type` flips
//! to `Ignored`, so highlighting still has the geometry if it wants it.

use std::fmt;

use crate::model::{BlockType, DiffBlock, DiffKind};

/// Why a diff was classified as not worth surfacing. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Empty,
    SpacesOnly,
    UnderscoresOnly,
    SpacesAndUnderscores,
    SpacesUnderscoresNewlines,
    /// A lone comma or period. Marked as possibly belonging to an
    /// adjacent operation; no pairing is performed here.
    PairablePunctuation,
    FormattingOnly,
    SpacesAndPeriods,
    HashesOnly,
    HashesAndSpaces,
    HashesAndPeriods,
    EqualContent,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty text",
            Self::SpacesOnly => "spaces only",
            Self::UnderscoresOnly => "underscore placeholder",
            Self::SpacesAndUnderscores => "spaces and underscores",
            Self::SpacesUnderscoresNewlines => "spaces, underscores and newlines",
            Self::PairablePunctuation => "single punctuation, possibly paired",
            Self::FormattingOnly => "formatting characters only",
            Self::SpacesAndPeriods => "spaces and periods",
            Self::HashesOnly => "hashes only",
            Self::HashesAndSpaces => "hashes and spaces",
            Self::HashesAndPeriods => "hashes and periods",
            Self::EqualContent => "equal content",
        };
        f.write_str(s)
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\u{3000}'
}

fn is_underscore(c: char) -> bool {
    c == '_' || c == '\u{FF3F}'
}

fn is_period(c: char) -> bool {
    matches!(c, '.' | '\u{FF0E}' | '\u{3002}')
}

fn is_pairable(c: char) -> bool {
    matches!(c, ',' | '\u{FF0C}') || is_period(c)
}

/// Classifies one operation's text. Total and deterministic: the same
/// `(kind, text)` always yields the same answer.
pub fn classify(kind: DiffKind, text: &str) -> Option<IgnoreReason> {
    if text.is_empty() {
        return Some(IgnoreReason::Empty);
    }
    let chars: Vec<char> = text.chars().collect();

    if chars.iter().all(|c| is_space(*c)) {
        return Some(IgnoreReason::SpacesOnly);
    }
    if chars.iter().all(|c| is_underscore(*c)) {
        return Some(IgnoreReason::UnderscoresOnly);
    }
    if chars.iter().all(|c| is_space(*c) || is_underscore(*c)) {
        return Some(IgnoreReason::SpacesAndUnderscores);
    }
    if chars
        .iter()
        .all(|c| is_space(*c) || is_underscore(*c) || *c == '\n')
    {
        return Some(IgnoreReason::SpacesUnderscoresNewlines);
    }
    if chars.len() == 1 && is_pairable(chars[0]) {
        return Some(IgnoreReason::PairablePunctuation);
    }
    if chars.iter().all(|c| c.is_whitespace() || c.is_control()) {
        return Some(IgnoreReason::FormattingOnly);
    }
    if chars.iter().all(|c| is_space(*c) || is_period(*c)) {
        return Some(IgnoreReason::SpacesAndPeriods);
    }
    if chars.iter().all(|c| *c == '#') {
        return Some(IgnoreReason::HashesOnly);
    }
    if chars.iter().all(|c| *c == '#' || is_space(*c)) {
        return Some(IgnoreReason::HashesAndSpaces);
    }
    if chars.iter().all(|c| *c == '#' || is_period(*c)) {
        return Some(IgnoreReason::HashesAndPeriods);
    }
    if kind == DiffKind::Equal {
        return Some(IgnoreReason::EqualContent);
    }
    None
}

/// Runs the classifier over every block, flipping matches to `Ignored`.
/// Returns how many Added/Deleted blocks were newly suppressed.
pub fn apply_ignore_rules(blocks: &mut [DiffBlock]) -> usize {
    let mut flipped = 0;
    for block in blocks.iter_mut() {
        let (kind, text) = match block.block_type {
            BlockType::Added => (DiffKind::Insert, block.new_text.as_str()),
            BlockType::Deleted => (DiffKind::Delete, block.old_text.as_str()),
            BlockType::Ignored => (DiffKind::Equal, block.old_text.as_str()),
        };
        if classify(kind, text).is_some() && block.block_type != BlockType::Ignored {
            block.block_type = BlockType::Ignored;
            flipped += 1;
        }
    }
    flipped
}
