use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mirador_core::BlockBuilder;
use mirador_core::geom::Rect;
use mirador_core::model::{CharRecord, CharStream, DiffKind, DiffOperation};

const LINE_WIDTH: usize = 60;
const LINES_PER_PAGE: usize = 40;

/// Synthesizes a document of `pages` pages, one bbox per line, with a
/// newline record between lines.
fn generate_stream(pages: usize, mutate_every: usize) -> (CharStream, CharStream) {
    let mut records_a = Vec::new();
    let mut records_b = Vec::new();
    let mut glyph = 0usize;

    for page in 0..pages {
        for line in 0..LINES_PER_PAGE {
            let y0 = 40.0 + (line as f64) * 18.0;
            let bbox: Rect = (36.0, y0, 560.0, y0 + 12.0);
            for _ in 0..LINE_WIDTH {
                let ch = char::from(b'a' + (glyph % 26) as u8);
                glyph += 1;
                records_a.push(CharRecord::new(page as u32 + 1, ch, Some(bbox)));
                let ch_b = if glyph % mutate_every == 0 {
                    char::from(b'A' + (glyph % 26) as u8)
                } else {
                    ch
                };
                records_b.push(CharRecord::new(page as u32 + 1, ch_b, Some(bbox)));
            }
            records_a.push(CharRecord::new(page as u32 + 1, '\n', None));
            records_b.push(CharRecord::new(page as u32 + 1, '\n', None));
        }
    }
    (CharStream::new(records_a), CharStream::new(records_b))
}

/// Derives an operation list from the two streams' stripped texts: equal
/// runs punctuated by one-character delete/insert pairs.
fn generate_ops(stream_a: &CharStream, stream_b: &CharStream) -> Vec<DiffOperation> {
    let a: Vec<char> = stream_a.text().chars().filter(|c| *c != '\n').collect();
    let b: Vec<char> = stream_b.text().chars().filter(|c| *c != '\n').collect();

    let mut ops = Vec::new();
    let mut run = String::new();
    for (ca, cb) in a.iter().zip(b.iter()) {
        if ca == cb {
            run.push(*ca);
        } else {
            if !run.is_empty() {
                ops.push(DiffOperation::new(DiffKind::Equal, std::mem::take(&mut run)));
            }
            ops.push(DiffOperation::new(DiffKind::Delete, ca.to_string()));
            ops.push(DiffOperation::new(DiffKind::Insert, cb.to_string()));
        }
    }
    if !run.is_empty() {
        ops.push(DiffOperation::new(DiffKind::Equal, run));
    }
    ops
}

fn bench_block_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_builder");
    for pages in [1usize, 4, 16] {
        let (stream_a, stream_b) = generate_stream(pages, 97);
        let ops = generate_ops(&stream_a, &stream_b);
        group.bench_with_input(BenchmarkId::new("build", pages), &pages, |bencher, _| {
            bencher.iter(|| {
                let blocks = BlockBuilder::new(&ops, &stream_a, &stream_b).build();
                black_box(blocks)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_block_builder);
criterion_main!(benches);
