//! Block construction: walks the diff operation list and both character
//! streams in lockstep, reconciling newline-stripped diff offsets against
//! the newline-preserving streams, and emits one enriched block per
//! operation.

mod continuity;
mod length;

pub use length::reconcile_length;

use tracing::warn;

use crate::geom::{BboxKey, Rect};
use crate::model::record::FxIndexMap;
use crate::model::{
    BlockType, CharCategory, CharRecord, CharStream, DiffBlock, DiffKind, DiffOperation, RunIndex,
    TextRange,
};

/// Everything one operation consumed from one side.
struct SideTake {
    text: String,
    bboxes: Vec<Rect>,
    pages: Vec<u32>,
    all_text: String,
    ranges: Vec<TextRange>,
    consumed: usize,
    first: usize,
    last: usize,
}

impl SideTake {
    fn empty() -> Self {
        Self {
            text: String::new(),
            bboxes: Vec::new(),
            pages: Vec::new(),
            all_text: String::new(),
            ranges: Vec::new(),
            consumed: 0,
            first: 0,
            last: 0,
        }
    }
}

/// Builds the ordered block list for one document pair.
pub struct BlockBuilder<'a> {
    ops: &'a [DiffOperation],
    stream_a: &'a CharStream,
    stream_b: &'a CharStream,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(ops: &'a [DiffOperation], stream_a: &'a CharStream, stream_b: &'a CharStream) -> Self {
        Self {
            ops,
            stream_a,
            stream_b,
        }
    }

    /// Walks every operation once and returns the enriched block list,
    /// navigation anchors already linked.
    pub fn build(&self) -> Vec<DiffBlock> {
        let runs_a = RunIndex::build(self.stream_a);
        let runs_b = RunIndex::build(self.stream_b);

        let mut cursor_a = 0usize;
        let mut cursor_b = 0usize;
        let mut blocks: Vec<DiffBlock> = Vec::with_capacity(self.ops.len());

        for op in self.ops {
            let base = op.base_len();

            let (take_a, index_a) = if op.kind.touches_a() {
                let len = reconcile_length(self.stream_a.records(), cursor_a, base);
                let take = consume_side(self.stream_a, &runs_a, cursor_a, len);
                let start = cursor_a;
                cursor_a += take.consumed;
                (take, Some(start))
            } else {
                (SideTake::empty(), None)
            };

            let (take_b, index_b) = if op.kind.touches_b() {
                let len = reconcile_length(self.stream_b.records(), cursor_b, base);
                let take = consume_side(self.stream_b, &runs_b, cursor_b, len);
                let start = cursor_b;
                cursor_b += take.consumed;
                (take, Some(start))
            } else {
                (SideTake::empty(), None)
            };

            let category = categorize(op.kind, self.stream_a, &take_a, self.stream_b, &take_b);

            let mut block = DiffBlock {
                block_type: match op.kind {
                    DiffKind::Equal => BlockType::Ignored,
                    DiffKind::Insert => BlockType::Added,
                    DiffKind::Delete => BlockType::Deleted,
                },
                old_bboxes: take_a.bboxes,
                new_bboxes: take_b.bboxes,
                prev_old_bboxes: Vec::new(),
                prev_new_bboxes: Vec::new(),
                page_a: take_a.pages,
                page_b: take_b.pages,
                old_text: take_a.text,
                new_text: take_b.text,
                all_text_a: take_a.all_text,
                all_text_b: take_b.all_text,
                diff_ranges_a: take_a.ranges,
                diff_ranges_b: take_b.ranges,
                index_a,
                index_b,
                category,
            };

            continuity::link_previous(&mut block, blocks.last());
            blocks.push(block);
        }

        blocks
    }
}

/// Slices `len` records from `cursor`, groups them by bbox in encounter
/// order, and resolves each group's range inside its run's full text.
fn consume_side(stream: &CharStream, runs: &RunIndex, cursor: usize, len: usize) -> SideTake {
    let end = (cursor + len).min(stream.len());
    let consumed = &stream.records()[cursor..end];
    let text: String = consumed.iter().map(|r| r.ch).collect();

    struct Group {
        bbox: Rect,
        first_index: usize,
        count: usize,
    }

    let mut groups: FxIndexMap<BboxKey, Group> = FxIndexMap::default();
    for (offset, record) in consumed.iter().enumerate() {
        let Some(bbox) = record.bbox else { continue };
        let key = match BboxKey::new(record.page, bbox) {
            Ok(key) => key,
            Err(err) => {
                warn!(index = cursor + offset, %err, "skipping bbox group");
                continue;
            }
        };
        groups
            .entry(key)
            .or_insert(Group {
                bbox,
                first_index: cursor + offset,
                count: 0,
            })
            .count += 1;
    }

    let mut bboxes = Vec::with_capacity(groups.len());
    let mut pages = Vec::with_capacity(groups.len());
    let mut all_text = String::new();
    let mut ranges = Vec::new();
    let mut prefix = 0usize;

    for (key, group) in &groups {
        let Some(run) = runs.get(key) else {
            warn!(page = key.page, "bbox group without an indexed run");
            continue;
        };
        bboxes.push(group.bbox);
        pages.push(key.page);
        let offset = group.first_index - run.start;
        let range = TextRange::new(prefix + offset, prefix + offset + group.count);
        if !range.is_empty() {
            ranges.push(range);
        }
        all_text.push_str(&run.text);
        prefix += run.text.chars().count();
    }

    SideTake {
        text,
        bboxes,
        pages,
        all_text,
        ranges,
        consumed: end - cursor,
        first: cursor,
        last: end,
    }
}

/// Category from the operation's preferred side, falling back to the
/// other side when the preferred one classified as unknown.
fn categorize(
    kind: DiffKind,
    stream_a: &CharStream,
    take_a: &SideTake,
    stream_b: &CharStream,
    take_b: &SideTake,
) -> CharCategory {
    let consumed_a = &stream_a.records()[take_a.first..take_a.last];
    let consumed_b = &stream_b.records()[take_b.first..take_b.last];
    let (preferred, fallback): (&[CharRecord], &[CharRecord]) = match kind {
        DiffKind::Insert => (consumed_b, consumed_a),
        DiffKind::Equal | DiffKind::Delete => (consumed_a, consumed_b),
    };
    let category = CharCategory::of_records(preferred.iter());
    if category != CharCategory::Unknown {
        return category;
    }
    CharCategory::of_records(fallback.iter())
}
