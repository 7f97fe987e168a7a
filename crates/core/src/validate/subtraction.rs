//! The algebra that decides whether a diff is a recognition artifact.
//!
//! Core idea: if a block's text were really present in the document, then
//! removing it from the bbox's full text should reproduce what an
//! independent second OCR pass reads from the same pixels. When removal
//! reconstructs the re-recognized text, the diff came from inconsistent
//! recognition, not from the page.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// How a block passed validation, for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "method")]
pub enum ValidationMethod {
    /// Removing occurrence `occurrence` of the diff text reconstructed
    /// the re-recognized text, with or without space normalization.
    #[serde(rename_all = "camelCase")]
    Subtraction { occurrence: usize, normalized: bool },
    /// Single-bbox suffix comparison.
    #[serde(rename_all = "camelCase")]
    TailMatch { occurrence: usize },
    /// Two-bbox boundary-context comparison.
    #[serde(rename_all = "camelCase")]
    DualBboxMatch { occurrence: usize },
    /// Levenshtein-improvement fallback. Off by default.
    Similarity,
}

/// One side's inputs to the acceptance test.
pub struct SubtractionCheck<'a> {
    /// The block's own text on this side.
    pub diff_text: &'a str,
    /// Full document-wide text of the touched bboxes (ground truth).
    pub target_text: &'a str,
    /// Concatenation of the re-recognized crop texts.
    pub recognized: &'a str,
    /// Re-recognized text of each crop, in bbox encounter order.
    pub bbox_texts: &'a [String],
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}')
}

/// Collapses whitespace runs to single spaces, then drops spaces between
/// adjacent CJK characters — a recognizer frequently disagrees with
/// itself about inter-glyph spacing in CJK runs.
pub fn normalize_spaces(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text.trim(), " ");
    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' '
            && i > 0
            && i + 1 < chars.len()
            && is_cjk(chars[i - 1])
            && is_cjk(chars[i + 1])
        {
            continue;
        }
        out.push(c);
    }
    out
}

fn find_occurrences(target: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > target.len() {
        return Vec::new();
    }
    (0..=target.len() - needle.len())
        .filter(|&i| &target[i..i + needle.len()] == needle)
        .collect()
}

fn remove_span(target: &[char], pos: usize, len: usize) -> String {
    target[..pos].iter().chain(&target[pos + len..]).collect()
}

fn last_n(text: &str, n: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    (chars.len() >= n).then(|| chars[chars.len() - n..].iter().collect())
}

fn first_n(text: &str, n: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    (chars.len() >= n).then(|| chars[..n].iter().collect())
}

/// Runs the subtraction law and its supplementary heuristics. Returns the
/// first accepting method, or `None` when the diff survives as genuine.
pub fn evaluate(check: &SubtractionCheck<'_>, enable_similarity: bool) -> Option<ValidationMethod> {
    let target: Vec<char> = check.target_text.chars().collect();
    let needle: Vec<char> = check.diff_text.chars().collect();
    let occurrences = find_occurrences(&target, &needle);
    if occurrences.is_empty() {
        return None;
    }

    // Direct subtraction: raw first, then space-normalized.
    for normalized in [false, true] {
        for (occurrence, &pos) in occurrences.iter().enumerate() {
            let remainder = remove_span(&target, pos, needle.len());
            let matched = if normalized {
                normalize_spaces(&remainder) == normalize_spaces(check.recognized)
            } else {
                remainder == check.recognized
            };
            if matched {
                return Some(ValidationMethod::Subtraction {
                    occurrence,
                    normalized,
                });
            }
        }
    }

    for (occurrence, &pos) in occurrences.iter().enumerate() {
        // Tail match: the diff sits at the very end of a single bbox's
        // text; agreeing on the last five characters of what remains is
        // enough.
        if check.bbox_texts.len() == 1
            && target.len() > 5
            && pos + needle.len() == target.len()
        {
            let remainder = remove_span(&target, pos, needle.len());
            if let (Some(a), Some(b)) = (last_n(&remainder, 5), last_n(check.recognized, 5)) {
                if a == b {
                    return Some(ValidationMethod::TailMatch { occurrence });
                }
            }
        }

        // Dual-bbox match: the diff straddles two bboxes; compare the two
        // characters on each side of the seam against the re-recognized
        // boundary characters.
        if check.bbox_texts.len() == 2
            && check.bbox_texts.iter().all(|t| t.chars().count() > 2)
            && pos >= 2
            && pos + needle.len() + 2 <= target.len()
        {
            let seam = match (last_n(&check.bbox_texts[0], 2), first_n(&check.bbox_texts[1], 2)) {
                (Some(a), Some(b)) => a + &b,
                _ => continue,
            };
            let before: String = target[pos - 2..pos].iter().collect();
            let after: String = target[pos + needle.len()..pos + needle.len() + 2]
                .iter()
                .collect();
            if seam == before + &after {
                return Some(ValidationMethod::DualBboxMatch { occurrence });
            }
        }
    }

    // Similarity improvement: accepts when removing the diff moves the
    // target strictly closer to the re-recognized text. Disabled by
    // default after observed false positives on short noisy strings.
    if enable_similarity && target.len() < 200 && check.recognized.chars().count() < 200 {
        let baseline = strsim::levenshtein(check.target_text, check.recognized);
        for &pos in &occurrences {
            let remainder = remove_span(&target, pos, needle.len());
            if strsim::levenshtein(&remainder, check.recognized) < baseline {
                return Some(ValidationMethod::Similarity);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check<'a>(
        diff_text: &'a str,
        target_text: &'a str,
        recognized: &'a str,
        bbox_texts: &'a [String],
    ) -> SubtractionCheck<'a> {
        SubtractionCheck {
            diff_text,
            target_text,
            recognized,
            bbox_texts,
        }
    }

    #[test]
    fn direct_subtraction_accepts_exact_reconstruction() {
        let boxes = vec!["INVOICE 2024".to_string()];
        let c = check("X", "INVOICE X2024", "INVOICE 2024", &boxes);
        assert_eq!(
            evaluate(&c, false),
            Some(ValidationMethod::Subtraction {
                occurrence: 0,
                normalized: false
            })
        );
    }

    #[test]
    fn subtraction_tries_every_occurrence() {
        // Removing the first "ab" does not reconstruct; the second does.
        let boxes = vec!["ab-!".to_string()];
        let c = check("ab", "ab-ab!", "ab-!", &boxes);
        assert_eq!(
            evaluate(&c, false),
            Some(ValidationMethod::Subtraction {
                occurrence: 1,
                normalized: false
            })
        );
    }

    #[test]
    fn normalized_subtraction_forgives_spacing() {
        let boxes = vec!["total  sum".to_string()];
        let c = check("X", "total Xsum", "total  sum", &boxes);
        assert_eq!(
            evaluate(&c, false),
            Some(ValidationMethod::Subtraction {
                occurrence: 0,
                normalized: true
            })
        );
    }

    #[test]
    fn cjk_adjacent_spaces_are_stripped() {
        assert_eq!(normalize_spaces("合 计"), "合计");
        assert_eq!(normalize_spaces("a b"), "a b");
    }

    #[test]
    fn tail_match_needs_occurrence_at_end() {
        let boxes = vec!["recognized".to_string()];
        // Diff "99" at the end of the target; last five of the remainder
        // agree with the last five of the recognized text.
        let c = check("99", "amount 123499", "zzzount 1234", &boxes);
        assert_eq!(
            evaluate(&c, false),
            Some(ValidationMethod::TailMatch { occurrence: 0 })
        );

        // Same strings but the diff occurs mid-target: no tail match.
        let c = check("34", "amount 123499", "zzzount 1299", &boxes);
        assert_eq!(evaluate(&c, false), None);
    }

    #[test]
    fn dual_bbox_match_compares_seam_context() {
        let boxes = vec!["headAB".to_string(), "CDtail".to_string()];
        // Target: ...AB <diff> CD...; the recognized boundary chars agree.
        let c = check("XX", "headABXXCDtail", "headABCDxxxx", &boxes);
        assert_eq!(
            evaluate(&c, false),
            Some(ValidationMethod::DualBboxMatch { occurrence: 0 })
        );
    }

    #[test]
    fn no_hypothesis_means_no_acceptance() {
        let boxes = vec!["completely".to_string()];
        let c = check("X", "aXb", "different", &boxes);
        assert_eq!(evaluate(&c, false), None);
    }

    #[test]
    fn diff_absent_from_target_never_accepts() {
        let boxes = vec!["abc".to_string()];
        let c = check("zz", "abc", "abc", &boxes);
        assert_eq!(evaluate(&c, false), None);
    }

    #[test]
    fn similarity_is_off_by_default() {
        let boxes = vec!["abcdef".to_string()];
        // Removal improves distance but reconstructs nothing exactly.
        let c = check("X", "abcXdefg", "abcdef", &boxes);
        assert_eq!(evaluate(&c, false), None);
        assert_eq!(evaluate(&c, true), Some(ValidationMethod::Similarity));
    }
}
