//! Consumed-length reconciliation between diff space and stream space.
//!
//! The upstream diff runs over newline-stripped text while the character
//! streams keep newlines as real records, so an operation of length L in
//! diff space may cover more than L records.

use tracing::warn;

use crate::model::CharRecord;

/// Cap on one-by-one newline growth. A run of consecutive newline records
/// longer than this is upstream garbage, not layout.
pub(crate) const MAX_GROWTH_ITERATIONS: usize = 100;

/// Widens a diff-space base length into the number of stream records the
/// operation actually covers from `cursor`.
///
/// Takes the base slice, grows once by the count of embedded newlines in
/// it, then grows one record at a time while each newly appended record is
/// itself a newline. Stops at the first non-newline append, at the end of
/// the stream, or at [`MAX_GROWTH_ITERATIONS`] (best-effort length, logged).
///
/// The result is always >= `base`; callers clamp to the stream end when
/// slicing.
pub fn reconcile_length(records: &[CharRecord], cursor: usize, base: usize) -> usize {
    let slice_end = (cursor + base).min(records.len());
    if cursor >= slice_end {
        return base;
    }
    let embedded = records[cursor..slice_end]
        .iter()
        .filter(|r| r.ch == '\n')
        .count();
    if embedded == 0 {
        return base;
    }

    let mut actual = base + embedded;
    let mut probe = cursor + base;
    let mut iterations = 0usize;
    loop {
        if iterations >= MAX_GROWTH_ITERATIONS {
            warn!(
                cursor,
                base, actual, "newline growth hit iteration cap, returning best-effort length"
            );
            break;
        }
        if probe >= (cursor + actual).min(records.len()) {
            break;
        }
        if records[probe].ch != '\n' {
            break;
        }
        actual += 1;
        probe += 1;
        iterations += 1;
    }
    actual
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(text: &str) -> Vec<CharRecord> {
        text.chars().map(|c| CharRecord::new(1, c, None)).collect()
    }

    #[test]
    fn no_newlines_returns_base() {
        let records = stream_of("abcdef");
        assert_eq!(reconcile_length(&records, 0, 4), 4);
    }

    #[test]
    fn one_embedded_newline_grows_by_one() {
        // Diff saw "abc"; the stream spells it "ab\nc".
        let records = stream_of("ab\ncd");
        assert_eq!(reconcile_length(&records, 0, 3), 4);
    }

    #[test]
    fn appended_newlines_grow_one_by_one() {
        // Two newlines inside the base slice, and the growth lands on two
        // more newline records which each need covering in turn.
        let records = stream_of("a\n\n\n\nbc");
        assert_eq!(reconcile_length(&records, 0, 3), 7);
    }

    #[test]
    fn growth_stops_at_first_non_newline_append() {
        let records = stream_of("a\nb\ncd");
        // Base slice "a\nb" grows by 1; the appended record is '\n' which
        // grows once more; the next append 'c' stops the loop.
        assert_eq!(reconcile_length(&records, 0, 3), 5);
    }

    #[test]
    fn result_is_never_below_base() {
        let records = stream_of("\n\n\n");
        for base in 0..5 {
            assert!(reconcile_length(&records, 0, base) >= base);
        }
    }

    #[test]
    fn long_newline_run_respects_iteration_cap() {
        let mut text = String::from("a");
        text.push_str(&"\n".repeat(400));
        text.push('b');
        let records = stream_of(&text);
        let actual = reconcile_length(&records, 0, 2);
        assert!(actual >= 2);
        assert!(actual <= 2 + 400);
    }

    #[test]
    fn cursor_at_stream_end_returns_base() {
        let records = stream_of("ab");
        assert_eq!(reconcile_length(&records, 2, 3), 3);
    }
}
