//! Navigation-anchor inheritance between consecutive blocks.
//!
//! A block that touches only one document still needs somewhere to point
//! on the other side; it inherits the previous block's bboxes (or that
//! block's own inherited anchors) so UI navigation never dead-ends.

use crate::geom::Rect;
use crate::model::{BlockType, DiffBlock};

fn inherit(own: &[Rect], inherited: &[Rect]) -> Vec<Rect> {
    if own.is_empty() {
        inherited.to_vec()
    } else {
        own.to_vec()
    }
}

/// Links `block` to the immediately preceding block, then applies the
/// own-bbox fallback so both anchor lists are always populated when the
/// block has any bboxes at all.
pub(crate) fn link_previous(block: &mut DiffBlock, prev: Option<&DiffBlock>) {
    if let Some(prev) = prev {
        match block.block_type {
            BlockType::Added => {
                block.prev_new_bboxes = inherit(&prev.new_bboxes, &prev.prev_new_bboxes);
                block.prev_old_bboxes = inherit(&prev.old_bboxes, &prev.prev_old_bboxes);
                if !prev.page_a.is_empty() {
                    block.page_a = prev.page_a.clone();
                }
            }
            BlockType::Deleted => {
                block.prev_old_bboxes = inherit(&prev.old_bboxes, &prev.prev_old_bboxes);
                block.prev_new_bboxes = inherit(&prev.new_bboxes, &prev.prev_new_bboxes);
                if !prev.page_b.is_empty() {
                    block.page_b = prev.page_b.clone();
                }
            }
            BlockType::Ignored => {
                block.prev_old_bboxes = block.old_bboxes.clone();
                block.prev_new_bboxes = block.new_bboxes.clone();
            }
        }
    }

    if block.prev_old_bboxes.is_empty() {
        block.prev_old_bboxes = block.old_bboxes.clone();
    }
    if block.prev_new_bboxes.is_empty() {
        block.prev_new_bboxes = block.new_bboxes.clone();
    }
}
