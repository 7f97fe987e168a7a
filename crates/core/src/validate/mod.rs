//! Hallucination validation: re-OCR small suspect diff regions and drop
//! blocks the subtraction algebra proves to be recognition artifacts.
//!
//! Everything here fails open. A missing page raster, a degenerate crop
//! or a recognition error keeps the block; an unavailable engine skips
//! the whole run. The worst outcome of a broken validator is extra noise
//! in the diff view, never a silently discarded genuine difference.

pub mod engine;
pub mod images;
pub mod subtraction;

pub use engine::RecognizeEngine;
pub use images::{DocSide, PageImageStore};
pub use subtraction::{SubtractionCheck, ValidationMethod, normalize_spaces};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DiffError, Result};
use crate::geom::Rect;
use crate::model::record::FxIndexMap;
use crate::model::{BlockType, DiffBlock};

/// Tunables for eligibility and the optional similarity fallback.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Blocks with relevant text at or above this length are left alone.
    pub max_text_len: usize,
    /// Blocks touching more than this many bboxes are left alone.
    pub max_bboxes: usize,
    /// Levenshtein-improvement fallback. Ships disabled: it accepted
    /// genuine one-character edits in short noisy strings.
    pub enable_similarity: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_text_len: 30,
            max_bboxes: 2,
            enable_similarity: false,
        }
    }
}

/// Whether a validation run actually examined blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ValidationStatus {
    Ran,
    #[serde(rename_all = "camelCase")]
    Skipped {
        reason: String,
    },
}

/// Audit record for one examined block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAudit {
    pub block_index: usize,
    pub operation_type: BlockType,
    pub recognized_old_text: String,
    pub recognized_new_text: String,
    pub validation_passed: bool,
    pub validation_method: Option<ValidationMethod>,
}

/// Result of a validation run.
#[derive(Debug)]
pub struct ValidationReport {
    /// Surviving blocks, original order preserved.
    pub blocks: Vec<DiffBlock>,
    pub removed: usize,
    pub audits: Vec<BlockAudit>,
    pub status: ValidationStatus,
}

/// Decides when to re-OCR small suspect blocks and removes the ones the
/// subtraction law proves spurious.
pub struct HallucinationValidator<'a> {
    engine: &'a dyn RecognizeEngine,
    images: PageImageStore,
    config: ValidatorConfig,
}

impl<'a> HallucinationValidator<'a> {
    pub fn new(engine: &'a dyn RecognizeEngine, images: PageImageStore) -> Self {
        Self::with_config(engine, images, ValidatorConfig::default())
    }

    pub fn with_config(
        engine: &'a dyn RecognizeEngine,
        images: PageImageStore,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            engine,
            images,
            config,
        }
    }

    /// Small and localized enough to justify a secondary OCR pass.
    pub fn is_eligible(&self, block: &DiffBlock) -> bool {
        let len = block.relevant_text().chars().count();
        let boxes = block.touched_bbox_count();
        len < self.config.max_text_len && boxes >= 1 && boxes <= self.config.max_bboxes
    }

    /// A comparison drowning in tiny diffs relative to its page count is
    /// not worth cross-checking; a handful of them is.
    pub fn should_trigger(&self, blocks: &[DiffBlock], total_pages: u32) -> bool {
        let eligible = blocks.iter().filter(|b| self.is_eligible(b)).count();
        let threshold = (total_pages as usize * 2).max(1);
        eligible < threshold
    }

    /// Runs the full validation pass over `blocks`.
    pub fn validate(&self, blocks: Vec<DiffBlock>, total_pages: u32) -> ValidationReport {
        if !self.engine.is_available() {
            return Self::skipped(blocks, "secondary recognition engine unavailable");
        }
        if !self.should_trigger(&blocks, total_pages) {
            return Self::skipped(blocks, "eligible block count at or above page threshold");
        }

        let mut audits = Vec::new();
        let mut keep = vec![true; blocks.len()];
        let mut removed = 0usize;

        for (index, block) in blocks.iter().enumerate() {
            if !self.is_eligible(block) {
                continue;
            }
            let side = match block.block_type {
                BlockType::Added => DocSide::B,
                BlockType::Deleted => DocSide::A,
                // Nothing to subtract from an already-ignored block.
                BlockType::Ignored => continue,
            };
            match self.check_block(index, block, side) {
                Ok(audit) => {
                    if audit.validation_passed {
                        keep[index] = false;
                        removed += 1;
                    }
                    audits.push(audit);
                }
                Err(err) => {
                    warn!(block = index, %err, "validation failed, keeping block");
                }
            }
        }

        let blocks = blocks
            .into_iter()
            .zip(keep)
            .filter_map(|(block, kept)| kept.then_some(block))
            .collect();

        ValidationReport {
            blocks,
            removed,
            audits,
            status: ValidationStatus::Ran,
        }
    }

    fn skipped(blocks: Vec<DiffBlock>, reason: &str) -> ValidationReport {
        debug!(reason, "validation skipped");
        ValidationReport {
            blocks,
            removed: 0,
            audits: Vec::new(),
            status: ValidationStatus::Skipped {
                reason: reason.to_string(),
            },
        }
    }

    /// Crops, re-recognizes and algebraically tests one block's touched
    /// side. Each bbox is recognized independently; the concatenation is
    /// only formed afterwards, because the seam heuristics need per-bbox
    /// texts.
    fn check_block(&self, index: usize, block: &DiffBlock, side: DocSide) -> Result<BlockAudit> {
        let (bboxes, pages, diff_text, target_text) = match side {
            DocSide::A => (
                &block.old_bboxes,
                &block.page_a,
                &block.old_text,
                &block.all_text_a,
            ),
            DocSide::B => (
                &block.new_bboxes,
                &block.page_b,
                &block.new_text,
                &block.all_text_b,
            ),
        };

        let mut by_page: FxIndexMap<u32, Vec<(usize, Rect)>> = FxIndexMap::default();
        for (ordinal, (&bbox, &page)) in bboxes.iter().zip(pages.iter()).enumerate() {
            by_page.entry(page).or_default().push((ordinal, bbox));
        }

        let mut recognized: Vec<(usize, String)> = Vec::with_capacity(bboxes.len());
        for (&page, regions) in &by_page {
            let page_image = self.images.load_page(side, page)?;
            for &(ordinal, bbox) in regions {
                let crop = match self.images.crop(&page_image, bbox) {
                    Ok(crop) => crop,
                    Err(DiffError::CropDegenerate { .. }) => {
                        warn!(block = index, ordinal, "degenerate crop skipped");
                        continue;
                    }
                    Err(err) => return Err(err),
                };
                self.images.persist_crop(&crop, index, side, ordinal)?;
                let text = self.engine.recognize(&crop)?;
                recognized.push((ordinal, text));
            }
        }
        recognized.sort_by_key(|(ordinal, _)| *ordinal);
        let bbox_texts: Vec<String> = recognized.into_iter().map(|(_, text)| text).collect();
        let recognized_text: String = bbox_texts.concat();

        let method = subtraction::evaluate(
            &SubtractionCheck {
                diff_text,
                target_text,
                recognized: &recognized_text,
                bbox_texts: &bbox_texts,
            },
            self.config.enable_similarity,
        );

        let (recognized_old_text, recognized_new_text) = match side {
            DocSide::A => (recognized_text, String::new()),
            DocSide::B => (String::new(), recognized_text),
        };

        Ok(BlockAudit {
            block_index: index,
            operation_type: block.block_type,
            recognized_old_text,
            recognized_new_text,
            validation_passed: method.is_some(),
            validation_method: method,
        })
    }
}
