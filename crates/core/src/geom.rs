//! Geometric types shared across the crate.
//!
//! Provides the rectangle alias used for character bounding boxes and the
//! canonical grouping key that identifies a visual run of characters.

use crate::error::{DiffError, Result};

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is the top-left
/// corner and (x1, y1) the bottom-right, in page-raster coordinates.
pub type Rect = (f64, f64, f64, f64);

/// Canonical identity of a visual character run: page number plus the
/// bounding box with coordinates truncated toward zero.
///
/// Characters recognized into the same layout item share a bbox up to
/// sub-pixel jitter; truncation makes the key stable against that jitter
/// and usable as a hash-map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BboxKey {
    pub page: u32,
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BboxKey {
    /// Canonicalizes a page/bbox pair into a grouping key.
    ///
    /// Fails with [`DiffError::MalformedKey`] when any coordinate is not a
    /// finite number, which is the only way a typed rect cannot be keyed.
    pub fn new(page: u32, bbox: Rect) -> Result<Self> {
        let (x0, y0, x1, y1) = bbox;
        for v in [x0, y0, x1, y1] {
            if !v.is_finite() {
                return Err(DiffError::MalformedKey {
                    page,
                    msg: format!("non-finite coordinate {v}"),
                });
            }
        }
        Ok(Self {
            page,
            x0: x0.trunc() as i64,
            y0: y0.trunc() as i64,
            x1: x1.trunc() as i64,
            y1: y1.trunc() as i64,
        })
    }
}

/// Clamps a rect to integer pixel bounds of a `width` x `height` image.
///
/// Returns `None` when the clamped region is empty, which callers treat as
/// a degenerate crop and skip.
pub fn clamp_to_image(bbox: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let (x0, y0, x1, y1) = bbox;
    let left = x0.max(0.0).min(f64::from(width)) as u32;
    let top = y0.max(0.0).min(f64::from(height)) as u32;
    let right = x1.max(0.0).min(f64::from(width)) as u32;
    let bottom = y1.max(0.0).min(f64::from(height)) as u32;
    if right <= left || bottom <= top {
        return None;
    }
    Some((left, top, right - left, bottom - top))
}
