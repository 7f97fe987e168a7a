//! Task-scoped page raster store.
//!
//! Holds the directory of pre-rendered page images for one comparison
//! task, loads pages on demand, cuts clamped crops out of them and
//! persists each crop next to the rasters for audit.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{DiffError, Result};
use crate::geom::{Rect, clamp_to_image};

/// Which document a page raster belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocSide {
    A,
    B,
}

impl DocSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }
}

/// Page raster directory for one comparison task.
///
/// Pages are keyed `{side}_page_{n}.png`; crops are written under a
/// `crops/` subdirectory which is created eagerly so a failing mkdir
/// surfaces before any OCR work starts.
pub struct PageImageStore {
    root: PathBuf,
    crops: PathBuf,
}

impl PageImageStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let crops = root.join("crops");
        fs::create_dir_all(&crops)?;
        Ok(Self { root, crops })
    }

    pub fn page_path(&self, side: DocSide, page: u32) -> PathBuf {
        self.root.join(format!("{}_page_{}.png", side.as_str(), page))
    }

    /// Loads one page raster.
    pub fn load_page(&self, side: DocSide, page: u32) -> Result<DynamicImage> {
        let path = self.page_path(side, page);
        if !path.exists() {
            return Err(DiffError::ImageUnavailable(path.display().to_string()));
        }
        Ok(image::open(&path)?)
    }

    /// Cuts `bbox` out of a page raster, clamped to the image bounds.
    pub fn crop(&self, page_image: &DynamicImage, bbox: Rect) -> Result<DynamicImage> {
        let (width, height) = (page_image.width(), page_image.height());
        let Some((x, y, w, h)) = clamp_to_image(bbox, width, height) else {
            return Err(DiffError::CropDegenerate {
                x: bbox.0.max(0.0) as u32,
                y: bbox.1.max(0.0) as u32,
                width: 0,
                height: 0,
            });
        };
        Ok(page_image.crop_imm(x, y, w, h))
    }

    /// Persists one crop for audit. Named by block, side and bbox ordinal
    /// so reruns overwrite rather than accumulate.
    pub fn persist_crop(
        &self,
        crop: &DynamicImage,
        block_index: usize,
        side: DocSide,
        ordinal: usize,
    ) -> Result<PathBuf> {
        let path = self
            .crops
            .join(format!("block{}_{}_{}.png", block_index, side.as_str(), ordinal));
        crop.save(&path)?;
        Ok(path)
    }
}
