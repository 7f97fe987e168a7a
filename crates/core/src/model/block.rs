//! The diff block: one diff operation enriched with bbox, page, text and
//! navigation metadata.

use serde::{Deserialize, Serialize};

use crate::geom::Rect;
use crate::model::record::CharRecord;

/// Visual classification of a block. EQUAL operations become `Ignored`
/// at construction time; the ignore policy may flip `Added`/`Deleted`
/// blocks to `Ignored` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockType {
    Added,
    Deleted,
    Ignored,
}

/// Coarse content class of the characters a block consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharCategory {
    Digits,
    Letters,
    Symbols,
    Mixed,
    Unknown,
}

impl CharCategory {
    /// Classifies a run of consumed records. Whitespace is not counted;
    /// an upstream per-record hint wins over Unicode inspection.
    pub fn of_records<'a>(records: impl Iterator<Item = &'a CharRecord>) -> Self {
        let mut seen_digit = false;
        let mut seen_letter = false;
        let mut seen_symbol = false;
        for record in records {
            match char_class(record) {
                Some(CharCategory::Digits) => seen_digit = true,
                Some(CharCategory::Letters) => seen_letter = true,
                Some(CharCategory::Symbols) => seen_symbol = true,
                _ => {}
            }
        }
        match (seen_digit, seen_letter, seen_symbol) {
            (true, false, false) => Self::Digits,
            (false, true, false) => Self::Letters,
            (false, false, true) => Self::Symbols,
            (false, false, false) => Self::Unknown,
            _ => Self::Mixed,
        }
    }
}

fn char_class(record: &CharRecord) -> Option<CharCategory> {
    if let Some(hint) = record.category.as_deref() {
        match hint {
            "digit" | "digits" | "number" => return Some(CharCategory::Digits),
            "letter" | "letters" => return Some(CharCategory::Letters),
            "symbol" | "symbols" => return Some(CharCategory::Symbols),
            _ => {}
        }
    }
    let ch = record.ch;
    if ch.is_whitespace() {
        None
    } else if ch.is_numeric() {
        Some(CharCategory::Digits)
    } else if ch.is_alphabetic() {
        Some(CharCategory::Letters)
    } else {
        Some(CharCategory::Symbols)
    }
}

/// Half-open `[start, end)` character range within a bbox's full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// One diff operation enriched with bbox, page, text and navigation
/// metadata — the output unit of this crate.
///
/// The `prev_*_bboxes` lists are navigation anchors: when a block has no
/// bboxes of its own on a side (an insertion has nothing on the old
/// side), the UI jumps to the nearest preceding content instead. They are
/// always concrete lists after construction, falling back to the block's
/// own bboxes and finally to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Distinct rects touched on document A, first-encounter order.
    pub old_bboxes: Vec<Rect>,
    /// Distinct rects touched on document B, first-encounter order.
    pub new_bboxes: Vec<Rect>,
    pub prev_old_bboxes: Vec<Rect>,
    pub prev_new_bboxes: Vec<Rect>,
    /// Page numbers parallel to `old_bboxes`.
    pub page_a: Vec<u32>,
    /// Page numbers parallel to `new_bboxes`.
    pub page_b: Vec<u32>,
    /// Characters consumed from document A, stream order.
    pub old_text: String,
    /// Characters consumed from document B, stream order.
    pub new_text: String,
    /// Full document-wide text of every touched bbox on A, concatenated
    /// in encounter order. Ground truth for hallucination validation.
    pub all_text_a: String,
    pub all_text_b: String,
    /// Where this operation's text falls inside `all_text_a`.
    pub diff_ranges_a: Vec<TextRange>,
    pub diff_ranges_b: Vec<TextRange>,
    /// Document-level character offset where the operation starts on A,
    /// `None` when the operation does not touch A.
    pub index_a: Option<usize>,
    pub index_b: Option<usize>,
    pub category: CharCategory,
}

impl DiffBlock {
    /// The text that defines this block's size for validation purposes:
    /// the inserted text for additions, the deleted text for deletions,
    /// the longer side otherwise.
    pub fn relevant_text(&self) -> &str {
        match self.block_type {
            BlockType::Added => &self.new_text,
            BlockType::Deleted => &self.old_text,
            BlockType::Ignored => {
                if self.old_text.chars().count() >= self.new_text.chars().count() {
                    &self.old_text
                } else {
                    &self.new_text
                }
            }
        }
    }

    /// Number of distinct bboxes the block touches, max across sides.
    pub fn touched_bbox_count(&self) -> usize {
        self.old_bboxes.len().max(self.new_bboxes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ch: char) -> CharRecord {
        CharRecord::new(1, ch, None)
    }

    #[test]
    fn classifies_uniform_and_mixed_runs() {
        let digits: Vec<_> = "2024".chars().map(rec).collect();
        assert_eq!(CharCategory::of_records(digits.iter()), CharCategory::Digits);

        let letters: Vec<_> = "total".chars().map(rec).collect();
        assert_eq!(
            CharCategory::of_records(letters.iter()),
            CharCategory::Letters
        );

        let mixed: Vec<_> = "a1".chars().map(rec).collect();
        assert_eq!(CharCategory::of_records(mixed.iter()), CharCategory::Mixed);

        let symbols: Vec<_> = "#%".chars().map(rec).collect();
        assert_eq!(
            CharCategory::of_records(symbols.iter()),
            CharCategory::Symbols
        );
    }

    #[test]
    fn whitespace_only_run_is_unknown() {
        let blanks: Vec<_> = " \n\t".chars().map(rec).collect();
        assert_eq!(
            CharCategory::of_records(blanks.iter()),
            CharCategory::Unknown
        );
    }

    #[test]
    fn upstream_hint_wins_over_inspection() {
        let mut record = rec('O');
        record.category = Some("digit".to_string());
        assert_eq!(
            CharCategory::of_records(std::iter::once(&record)),
            CharCategory::Digits
        );
    }

    #[test]
    fn block_type_uses_uppercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&BlockType::Added).unwrap(),
            "\"ADDED\""
        );
    }
}
