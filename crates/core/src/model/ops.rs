//! Diff operations consumed from the external text-diff algorithm.
//!
//! The diff runs over the two documents' newline-stripped concatenated
//! text, so operation text normally contains no newlines; the base length
//! accessor strips them defensively either way.

use serde::{Deserialize, Serialize};

/// Kind of one diff span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffKind {
    Equal,
    Insert,
    Delete,
}

impl DiffKind {
    /// Whether this operation consumes characters from document A.
    pub const fn touches_a(self) -> bool {
        matches!(self, Self::Equal | Self::Delete)
    }

    /// Whether this operation consumes characters from document B.
    pub const fn touches_b(self) -> bool {
        matches!(self, Self::Equal | Self::Insert)
    }
}

/// One span of the diff. Sequence order is semantically significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOperation {
    pub kind: DiffKind,
    pub text: String,
}

impl DiffOperation {
    pub fn new(kind: DiffKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Character count of the operation text in diff space, i.e. with
    /// newlines stripped the way the upstream diff saw the documents.
    pub fn base_len(&self) -> usize {
        self.text.chars().filter(|c| *c != '\n').count()
    }
}
