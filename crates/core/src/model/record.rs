//! Input character stream: one OCR-extracted character per record, tagged
//! with its page and bounding box.
//!
//! Records are produced by an external layout-extraction step and arrive
//! already normalized (markdown artifacts stripped, newlines preserved as
//! real characters).

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geom::{BboxKey, Rect};

/// Hash map preserving first-insertion order, keyed with the fast
/// non-cryptographic hasher used throughout the crate.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// One character of extracted text with its page and optional bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharRecord {
    /// 1-based page number.
    pub page: u32,
    /// The character itself. Newlines are real records in the stream.
    #[serde(rename = "char")]
    pub ch: char,
    /// Bounding box in page-raster coordinates, if the extractor produced
    /// one. Virtual characters (inferred spaces, newlines) have none.
    #[serde(default)]
    pub bbox: Option<Rect>,
    /// Optional upstream classification hint ("digit", "letter", "symbol").
    #[serde(default)]
    pub category: Option<String>,
}

impl CharRecord {
    pub fn new(page: u32, ch: char, bbox: Option<Rect>) -> Self {
        Self {
            page,
            ch,
            bbox,
            category: None,
        }
    }

    /// The grouping key for this record, if it has a usable bbox.
    ///
    /// Returns `Ok(None)` for records without a bbox and an error for
    /// bboxes that cannot be canonicalized.
    pub fn bbox_key(&self) -> crate::error::Result<Option<BboxKey>> {
        match self.bbox {
            Some(bbox) => Ok(Some(BboxKey::new(self.page, bbox)?)),
            None => Ok(None),
        }
    }
}

/// Ordered character stream for one document.
#[derive(Debug, Clone, Default)]
pub struct CharStream {
    records: Vec<CharRecord>,
}

impl CharStream {
    pub fn new(records: Vec<CharRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CharRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full document text, newlines included.
    pub fn text(&self) -> String {
        self.records.iter().map(|r| r.ch).collect()
    }

    /// Highest page number present in the stream (0 for an empty stream).
    pub fn page_count(&self) -> u32 {
        self.records.iter().map(|r| r.page).max().unwrap_or(0)
    }
}

/// Full text and run-start offset of one visual bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct BboxRun {
    /// Stream offset of the first record carrying this key.
    pub start: usize,
    /// Concatenated text of every record carrying this key, in stream order.
    pub text: String,
}

/// Per-document index from bbox key to its run, built in one pass.
///
/// The run text spans the whole document: a key that recurs later in the
/// stream keeps its first start offset and accumulates the extra text.
#[derive(Debug, Default)]
pub struct RunIndex {
    runs: FxIndexMap<BboxKey, BboxRun>,
}

impl RunIndex {
    pub fn build(stream: &CharStream) -> Self {
        let mut runs: FxIndexMap<BboxKey, BboxRun> = FxIndexMap::default();
        for (i, record) in stream.records().iter().enumerate() {
            let key = match record.bbox_key() {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(err) => {
                    warn!(index = i, %err, "skipping record with malformed bbox");
                    continue;
                }
            };
            runs.entry(key)
                .or_insert_with(|| BboxRun {
                    start: i,
                    text: String::new(),
                })
                .text
                .push(record.ch);
        }
        Self { runs }
    }

    pub fn get(&self, key: &BboxKey) -> Option<&BboxRun> {
        self.runs.get(key)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
