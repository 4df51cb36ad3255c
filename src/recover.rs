//! Recover the key one letter at a time.
//!
//! Each bin was enciphered with a single shift, so shifting its histogram
//! back by the right amount makes it line up with the language's letter
//! frequencies. The Mg score of shift `s` is the weighted overlap
//!
//! ```text
//! Mg(s) = 1/N * sum_j p[j] * count[(j + s) mod 26]
//! ```
//!
//! and the highest score wins.

use crate::alphabet::{Histogram, ALPHABET_SIZE};
use crate::bins::Bins;
use crate::error::{AnalysisError, Result};
use crate::profile::FrequencyProfile;
use crate::vigenere::Key;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

/// The Mg score of every shift for a single bin, indexed by shift
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MgTable {
    pub scores: [f64; ALPHABET_SIZE],
}

impl MgTable {
    /// The highest scoring shift, the lowest shift wins a tie
    pub fn best_shift(&self) -> u8 {
        let mut best = 0;
        for (shift, &score) in self.scores.iter().enumerate().skip(1) {
            if score > self.scores[best] {
                best = shift;
            }
        }
        best as u8
    }

    /// Shifts ordered from best to worst score
    pub fn ranked(&self) -> Vec<(u8, f64)> {
        let mut ranked: Vec<_> = (0..ALPHABET_SIZE as u8)
            .zip(self.scores.iter().copied())
            .collect();
        // stable, so equal scores stay in shift order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Score all 26 shifts of one bin against the profile
/// ```
/// use kasiski::profile::FrequencyProfile;
/// use kasiski::recover::mg_scores;
/// let mut counts = [0; 26];
/// counts[4] = 10;
/// let table = mg_scores(&counts, &FrequencyProfile::english()).unwrap();
/// assert!((table.scores[0] - 0.12702).abs() < 1e-9);
/// ```
pub fn mg_scores(counts: &Histogram, profile: &FrequencyProfile) -> Result<MgTable> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return Err(AnalysisError::InsufficientEvidence(
            "cannot score an empty bin".into(),
        ));
    }

    let probs = profile.probs();
    let n = total as f64;
    let scores = std::array::from_fn(|shift| {
        probs
            .iter()
            .enumerate()
            .map(|(j, p)| p * counts[(j + shift) % ALPHABET_SIZE] as f64)
            .sum::<f64>()
            / n
    });

    Ok(MgTable { scores })
}

/// The shift a bin was most likely enciphered with
pub fn recover_shift(counts: &Histogram, profile: &FrequencyProfile) -> Result<u8> {
    Ok(mg_scores(counts, profile)?.best_shift())
}

/// Score every bin, in parallel, keeping the results in bin order
#[instrument(skip_all, fields(key_length = bins.key_length()))]
pub fn mg_tables(bins: &Bins, profile: &FrequencyProfile) -> Result<Vec<MgTable>> {
    let tables: Vec<Result<MgTable>> = bins
        .histograms()
        .par_iter()
        .map(|counts| mg_scores(counts, profile))
        .collect();

    // sequential so that the lowest failing bin is the one reported
    tables.into_iter().collect()
}

/// Build the key from the best shift of each bin's table, in bin order
pub fn key_from_tables(tables: &[MgTable]) -> Result<Key> {
    let shifts: Vec<u8> = tables.iter().map(MgTable::best_shift).collect();
    let key = Key::from_shifts(shifts)?;
    debug!(%key, "recovered key");

    Ok(key)
}

/// Recover one key letter per bin
pub fn recover_key(bins: &Bins, profile: &FrequencyProfile) -> Result<Key> {
    key_from_tables(&mg_tables(bins, profile)?)
}
