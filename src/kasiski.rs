//! Kasiski examination: find repeated n-grams in the ciphertext and reduce the
//! distances between them to a candidate key length.
//!
//! Two occurrences of the same plaintext fragment that are a multiple of the
//! key length apart encrypt to the same ciphertext, so the true key length
//! divides most of the distances found here.

use crate::alphabet::Ciphertext;
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::collections::hash_map::{Entry, HashMap};
use std::ops::RangeInclusive;
use tracing::{debug, instrument, trace};

/// The n-gram lengths worth searching for repeats
pub const REPEAT_LENGTHS: RangeInclusive<usize> = 3..=4;

/// An n-gram seen at least twice, and the distance between its first two occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatMatch {
    pub ngram: String,
    pub first: usize,
    pub delta: usize,
}

/// How often an n-gram occurs in the ciphertext
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgramCount {
    pub ngram: String,
    pub count: usize,
}

/// The deltas found for a list of phrases, and the phrases which didn't repeat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhraseEvidence {
    pub matches: Vec<RepeatMatch>,
    pub missing: Vec<String>,
}

impl PhraseEvidence {
    /// The deltas of every match, in phrase order
    pub fn deltas(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.delta).collect()
    }
}

/// Find every n-gram of length `n` which occurs at least twice.
///
/// Only the first two occurrences are used for the delta. Self-overlapping
/// n-grams like "aaa" in "aaaa" are reported as well, with a delta smaller
/// than the n-gram itself. Matches are ordered by first occurrence.
#[instrument(skip(ciphertext), fields(len = ciphertext.len()))]
pub fn find_repeats(ciphertext: &Ciphertext, n: usize) -> Result<Vec<RepeatMatch>> {
    if !REPEAT_LENGTHS.contains(&n) {
        return Err(AnalysisError::InvalidNgramLength(n));
    }

    // None once the second occurrence has been recorded
    let mut first_seen: HashMap<&[u8], Option<usize>> = HashMap::new();
    let mut matches = Vec::new();
    for (pos, window) in ciphertext.as_bytes().windows(n).enumerate() {
        match first_seen.entry(window) {
            Entry::Vacant(e) => {
                e.insert(Some(pos));
            }
            Entry::Occupied(mut e) => {
                if let Some(first) = e.get_mut().take() {
                    matches.push(RepeatMatch {
                        ngram: ngram_string(window),
                        first,
                        delta: pos - first,
                    });
                }
            }
        }
    }

    matches.sort_by_key(|m| m.first);
    debug!(found = matches.len(), "repeated n-grams");

    Ok(matches)
}

/// The distance between the first two occurrences of `phrase`
pub fn phrase_delta(ciphertext: &Ciphertext, phrase: &str) -> Result<RepeatMatch> {
    let not_found = || AnalysisError::NotFound {
        phrase: phrase.to_string(),
    };

    let text = ciphertext.as_str();
    if phrase.is_empty() {
        return Err(not_found());
    }
    let first = text.find(phrase).ok_or_else(not_found)?;
    let second = text[first + 1..]
        .find(phrase)
        .map(|off| first + 1 + off)
        .ok_or_else(not_found)?;

    Ok(RepeatMatch {
        ngram: phrase.to_string(),
        first,
        delta: second - first,
    })
}

/// Look up the delta of every phrase, keeping going past phrases that don't repeat
pub fn phrase_deltas<S: AsRef<str>>(ciphertext: &Ciphertext, phrases: &[S]) -> PhraseEvidence {
    let mut evidence = PhraseEvidence::default();
    for phrase in phrases {
        let phrase = phrase.as_ref();
        match phrase_delta(ciphertext, phrase) {
            Ok(m) => evidence.matches.push(m),
            Err(e) => {
                debug!(%e, "dropping phrase");
                evidence.missing.push(phrase.to_string());
            }
        }
    }
    evidence
}

/// Count every n-gram of length `n`, most frequent first, ties in alphabetical order
pub fn ngram_counts(ciphertext: &Ciphertext, n: usize) -> Vec<NgramCount> {
    if n == 0 {
        return Vec::new();
    }

    let mut counts: HashMap<&[u8], usize> = HashMap::new();
    for window in ciphertext.as_bytes().windows(n) {
        *counts.entry(window).or_default() += 1;
    }

    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(window, count)| NgramCount {
            ngram: ngram_string(window),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ngram.cmp(&b.ngram)));
    counts
}

/// Estimate the key length as the GCD of the first `top` deltas.
///
/// The result is a candidate only: a chance repeat pulls it down to a
/// divisor of the true length, so check it with the index of coincidence.
/// ```
/// use kasiski::kasiski::estimate_key_length;
/// assert_eq!(estimate_key_length(&[12, 18, 30], 3).unwrap(), 6);
/// assert!(estimate_key_length(&[], 3).is_err());
/// ```
pub fn estimate_key_length(deltas: &[usize], top: usize) -> Result<usize> {
    let used = &deltas[..top.min(deltas.len())];
    let (&seed, rest) = used.split_first().ok_or_else(|| {
        AnalysisError::InsufficientEvidence("no deltas to estimate the key length from".into())
    })?;
    if used.contains(&0) {
        return Err(AnalysisError::InsufficientEvidence(
            "a delta of zero is not a repeat".into(),
        ));
    }

    let length = rest.iter().fold(seed, |m, &d| gcd(m, d));
    trace!(?used, length, "reduced deltas");

    Ok(length)
}

/// Euclid's algorithm
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn ngram_string(window: &[u8]) -> String {
    // windows of a Ciphertext are always a-z
    String::from_utf8_lossy(window).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct(s: &str) -> Ciphertext {
        Ciphertext::new(s).unwrap()
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(154, 147), 7);
        assert_eq!(gcd(42, 84), 42);
        assert_eq!(gcd(9, 0), 9);
    }

    #[test]
    fn test_estimate_key_length() {
        assert_eq!(estimate_key_length(&[12, 18, 30], 3).unwrap(), 6);
        assert_eq!(estimate_key_length(&[42, 84], 5).unwrap(), 42);
    }

    #[test]
    fn test_estimate_key_length_uses_prefix() {
        // the 46 is a chance repeat, only the first two deltas are trusted
        assert_eq!(estimate_key_length(&[154, 147, 46], 2).unwrap(), 7);
        assert_eq!(estimate_key_length(&[154, 147, 46], 3).unwrap(), 1);
    }

    #[test]
    fn test_estimate_key_length_empty_fails() {
        assert!(matches!(
            estimate_key_length(&[], 5),
            Err(AnalysisError::InsufficientEvidence(_))
        ));
        assert!(estimate_key_length(&[12, 18], 0).is_err());
    }

    #[test]
    fn test_estimate_key_length_zero_delta_fails() {
        assert!(estimate_key_length(&[12, 0], 2).is_err());
    }

    #[test]
    fn test_find_repeats() {
        let matches = find_repeats(&ct("abcxyzabcqqxyz"), 3).unwrap();
        assert_eq!(
            matches,
            [
                RepeatMatch {
                    ngram: "abc".into(),
                    first: 0,
                    delta: 6
                },
                RepeatMatch {
                    ngram: "xyz".into(),
                    first: 3,
                    delta: 8
                },
            ]
        );
    }

    #[test]
    fn test_find_repeats_ignores_third_occurrence() {
        let matches = find_repeats(&ct("abcdabcdxyzabcd"), 4).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].ngram, "abcd");
        assert_eq!(matches[0].delta, 4);
    }

    #[test]
    fn test_find_repeats_self_overlap() {
        let matches = find_repeats(&ct("aaaa"), 3).unwrap();
        assert_eq!(matches[0].delta, 1);
    }

    #[test]
    fn test_find_repeats_bad_length_fails() {
        assert_eq!(
            find_repeats(&ct("abcabc"), 2),
            Err(AnalysisError::InvalidNgramLength(2))
        );
        assert!(find_repeats(&ct("abcabc"), 5).is_err());
    }

    #[test]
    fn test_find_repeats_short_text() {
        assert!(find_repeats(&ct("ab"), 3).unwrap().is_empty());
    }

    #[test]
    fn test_phrase_delta() {
        let text = format!("abc{}{}wgbnxyz", "wgbn", "q".repeat(38));
        let m = phrase_delta(&ct(&text), "wgbn").unwrap();
        assert_eq!(m.first, 3);
        assert_eq!(m.delta, 42);
    }

    #[test]
    fn test_phrase_delta_single_occurrence_fails() {
        assert_eq!(
            phrase_delta(&ct("abcdefabc"), "def"),
            Err(AnalysisError::NotFound {
                phrase: "def".into()
            })
        );
        assert!(phrase_delta(&ct("abcdef"), "zzz").is_err());
    }

    #[test]
    fn test_phrase_deltas_keeps_going() {
        let evidence = phrase_deltas(&ct("abcxyzabcqqxyz"), &["abc", "nope", "xyz"]);
        assert_eq!(evidence.deltas(), [6, 8]);
        assert_eq!(evidence.missing, ["nope"]);
    }

    #[test]
    fn test_ngram_counts() {
        let counts = ngram_counts(&ct("abababc"), 2);
        assert_eq!(
            counts[0],
            NgramCount {
                ngram: "ab".into(),
                count: 3
            }
        );
        assert_eq!(counts[1].ngram, "ba");
        assert_eq!(counts[2].ngram, "bc");
        assert_eq!(counts.len(), 3);
    }
}
