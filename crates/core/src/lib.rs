//! mirador - page-anchored diff blocks for OCR document comparison.
//!
//! Turns a generic character-level diff between two OCR-derived documents
//! into bbox-anchored blocks for visual highlighting and navigation, and
//! cross-checks small suspect blocks against a secondary OCR pass to weed
//! out recognition artifacts.

pub mod builder;
pub mod error;
pub mod geom;
pub mod ignore;
pub mod model;
pub mod validate;

pub use builder::BlockBuilder;
pub use error::{DiffError, Result};
pub use ignore::{IgnoreReason, apply_ignore_rules, classify};
pub use model::{
    BlockType, CharCategory, CharRecord, CharStream, DiffBlock, DiffKind, DiffOperation, TextRange,
};
pub use validate::{
    BlockAudit, DocSide, HallucinationValidator, PageImageStore, RecognizeEngine, ValidationReport,
    ValidationStatus, ValidatorConfig,
};
