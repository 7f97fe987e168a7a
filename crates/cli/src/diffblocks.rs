//! diffblocks - Build page-anchored diff blocks from OCR character
//! streams and a precomputed text diff.
//!
//! Reads the two documents' character streams and the diff operation
//! list as JSON, runs block construction and the ignore pass, optionally
//! cross-checks small blocks against a secondary OCR engine, and writes
//! the block list as JSON.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde_json::Value;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use mirador_core::validate::{HallucinationValidator, PageImageStore, RecognizeEngine};
use mirador_core::{
    BlockBuilder, CharRecord, CharStream, DiffOperation, ValidationStatus, apply_ignore_rules,
};

/// Build page-anchored diff blocks from OCR character streams and a
/// precomputed character diff.
#[derive(Parser, Debug)]
#[command(name = "diffblocks")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Character stream of document A (JSON array of records)
    stream_a: PathBuf,

    /// Character stream of document B (JSON array of records)
    stream_b: PathBuf,

    /// Diff operation list over the two streams (JSON array)
    operations: PathBuf,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Pretty-print the output JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Cross-check small blocks against a secondary OCR pass
    #[arg(long, action = ArgAction::SetTrue)]
    validate: bool,

    /// Directory of pre-rendered page rasters ({a|b}_page_N.png)
    #[arg(long = "image-dir")]
    image_dir: Option<PathBuf>,

    /// Total page count of the compared documents (default: derived from
    /// the streams)
    #[arg(long = "total-pages")]
    total_pages: Option<u32>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// Placeholder for an external secondary OCR engine. Always reports
/// itself unavailable, so a validation request degrades to a logged skip
/// instead of failing the comparison.
struct UnconfiguredEngine;

impl RecognizeEngine for UnconfiguredEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn recognize(&self, _image: &image::DynamicImage) -> mirador_core::Result<String> {
        Err(mirador_core::DiffError::ServiceUnavailable)
    }
}

fn read_json(path: &PathBuf) -> Result<Value> {
    let mut text = String::new();
    File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .read_to_string(&mut text)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_stream(path: &PathBuf) -> Result<CharStream> {
    let records: Vec<CharRecord> = serde_json::from_value(read_json(path)?)
        .with_context(|| format!("invalid character records in {}", path.display()))?;
    Ok(CharStream::new(records))
}

/// Parses the operation list entry by entry so one unrecognized kind
/// drops that entry instead of rejecting the whole file.
fn read_operations(path: &PathBuf) -> Result<Vec<DiffOperation>> {
    let entries = match read_json(path)? {
        Value::Array(entries) => entries,
        _ => anyhow::bail!("{} is not a JSON array", path.display()),
    };
    let mut ops = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<DiffOperation>(entry) {
            Ok(op) => ops.push(op),
            Err(err) => warn!(entry = i, %err, "skipping unrecognized diff operation"),
        }
    }
    Ok(ops)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let stream_a = read_stream(&args.stream_a)?;
    let stream_b = read_stream(&args.stream_b)?;
    let ops = read_operations(&args.operations)?;

    let mut blocks = BlockBuilder::new(&ops, &stream_a, &stream_b).build();
    let suppressed = apply_ignore_rules(&mut blocks);
    info!(
        blocks = blocks.len(),
        suppressed, "built diff blocks"
    );

    if args.validate {
        let image_dir = args
            .image_dir
            .as_ref()
            .context("--validate requires --image-dir")?;
        let total_pages = args
            .total_pages
            .unwrap_or_else(|| stream_a.page_count().max(stream_b.page_count()));

        let store = PageImageStore::new(image_dir)?;
        let engine = UnconfiguredEngine;
        let validator = HallucinationValidator::new(&engine, store);
        let report = validator.validate(blocks, total_pages);

        match &report.status {
            ValidationStatus::Ran => {
                info!(removed = report.removed, "validation finished");
                for audit in &report.audits {
                    info!(
                        block = audit.block_index,
                        passed = audit.validation_passed,
                        "validation audit"
                    );
                }
            }
            ValidationStatus::Skipped { reason } => {
                info!(reason = %reason, "validation skipped");
            }
        }
        blocks = report.blocks;
    }

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    if args.pretty {
        serde_json::to_writer_pretty(&mut output, &blocks)?;
    } else {
        serde_json::to_writer(&mut output, &blocks)?;
    }
    writeln!(output)?;
    output.flush()?;

    Ok(())
}
