//! Secondary recognition engine boundary.
//!
//! The engine itself (Tesseract, a PaddleOCR runtime, a remote service) is
//! outside this crate; the validator only needs a way to ask "what text is
//! in this crop" and a cheap availability probe checked once per run.

use image::DynamicImage;

use crate::error::Result;

/// A callable secondary OCR engine.
pub trait RecognizeEngine {
    /// Whether the engine can serve requests right now. Checked once at
    /// the start of a validation run; a `false` answer skips the whole
    /// run rather than failing it.
    fn is_available(&self) -> bool {
        true
    }

    /// Recognizes the text in one cropped region image.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}
