//! Tests for the post-hoc ignore pass over built blocks.

use mirador_core::geom::Rect;
use mirador_core::model::{CharRecord, CharStream, DiffKind, DiffOperation};
use mirador_core::{BlockBuilder, BlockType, IgnoreReason, apply_ignore_rules, classify};

const BOX_A: Rect = (10.0, 10.0, 50.0, 20.0);
const BOX_B: Rect = (10.0, 12.0, 52.0, 22.0);

fn stream(text: &str, bbox: Rect) -> CharStream {
    CharStream::new(
        text.chars()
            .map(|c| CharRecord::new(1, c, (c != '\n').then_some(bbox)))
            .collect(),
    )
}

#[test]
fn lone_fullwidth_period_block_is_ignored() {
    let stream_a = stream("ab\u{FF0E}", BOX_A);
    let stream_b = stream("ab", BOX_B);
    let ops = vec![
        DiffOperation::new(DiffKind::Equal, "ab"),
        DiffOperation::new(DiffKind::Delete, "\u{FF0E}"),
    ];

    let mut blocks = BlockBuilder::new(&ops, &stream_a, &stream_b).build();
    assert_eq!(blocks[1].block_type, BlockType::Deleted);

    let flipped = apply_ignore_rules(&mut blocks);
    assert_eq!(flipped, 1);
    assert_eq!(blocks[1].block_type, BlockType::Ignored);
    assert_eq!(
        classify(DiffKind::Delete, "\u{FF0E}"),
        Some(IgnoreReason::PairablePunctuation)
    );
    assert_eq!(
        IgnoreReason::PairablePunctuation.to_string(),
        "single punctuation, possibly paired"
    );
}

#[test]
fn ignoring_keeps_geometry_intact() {
    let stream_a = stream("ab", BOX_A);
    let stream_b = stream("ab___", BOX_B);
    let ops = vec![
        DiffOperation::new(DiffKind::Equal, "ab"),
        DiffOperation::new(DiffKind::Insert, "___"),
    ];

    let mut blocks = BlockBuilder::new(&ops, &stream_a, &stream_b).build();
    let bboxes_before = blocks[1].new_bboxes.clone();
    let text_before = blocks[1].new_text.clone();

    apply_ignore_rules(&mut blocks);

    assert_eq!(blocks[1].block_type, BlockType::Ignored);
    assert_eq!(blocks[1].new_bboxes, bboxes_before);
    assert_eq!(blocks[1].new_text, text_before);
}

#[test]
fn substantive_diffs_survive_the_pass() {
    let stream_a = stream("ab", BOX_A);
    let stream_b = stream("abXY", BOX_B);
    let ops = vec![
        DiffOperation::new(DiffKind::Equal, "ab"),
        DiffOperation::new(DiffKind::Insert, "XY"),
    ];

    let mut blocks = BlockBuilder::new(&ops, &stream_a, &stream_b).build();
    let flipped = apply_ignore_rules(&mut blocks);

    assert_eq!(flipped, 0);
    assert_eq!(blocks[1].block_type, BlockType::Added);
}
