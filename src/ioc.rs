use crate::alphabet::{Ciphertext, Histogram, ALPHABET_SIZE};
use crate::bins::Bins;
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::debug;

/// The index of coincidence of uniformly random letters
pub const RANDOM_IOC: f64 = 1.0 / ALPHABET_SIZE as f64;

/// Which normalisation to use for the index of coincidence
/// https://en.wikipedia.org/wiki/Index_of_coincidence
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub enum IocVariant {
    /// sum(n * (n - 1)) / (N * (N - 1)), the chance of drawing two equal letters without replacement
    #[default]
    Unbiased,
    /// sum(n^2) / N^2, drawing with replacement
    Squared,
}

/// Calculate the index of coincidence of a letter histogram, needs at least two letters
/// ```
/// use kasiski::ioc::{index_of_coincidence, IocVariant};
/// let mut counts = [0; 26];
/// counts[4] = 5;
/// assert_eq!(index_of_coincidence(&counts, IocVariant::Unbiased).unwrap(), 1.0);
/// ```
pub fn index_of_coincidence(counts: &Histogram, variant: IocVariant) -> Result<f64> {
    let total: usize = counts.iter().sum();
    if total < 2 {
        return Err(AnalysisError::InsufficientEvidence(format!(
            "index of coincidence needs at least 2 letters, got {total}"
        )));
    }

    let n = total as f64;
    let ioc = match variant {
        IocVariant::Unbiased => {
            let pairs: usize = counts.iter().map(|&c| c * c.saturating_sub(1)).sum();
            pairs as f64 / (n * (n - 1.0))
        }
        IocVariant::Squared => {
            let squares: usize = counts.iter().map(|&c| c * c).sum();
            squares as f64 / (n * n)
        }
    };

    Ok(ioc)
}

/// Mean bin IC for one candidate key length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthScore {
    pub key_length: usize,
    pub mean_ioc: Option<f64>,
}

/// Compute the mean bin IC of each key length in the range.
///
/// Right lengths (and their multiples) score near the language's expected
/// IC, wrong ones near [`RANDOM_IOC`]. Which to pick is left to the caller.
pub fn survey_key_lengths(
    ciphertext: &Ciphertext,
    lengths: RangeInclusive<usize>,
    variant: IocVariant,
) -> Vec<LengthScore> {
    lengths
        .filter(|&m| m > 0)
        .take_while(|&m| m <= ciphertext.len())
        .filter_map(|m| Bins::new(ciphertext, m).ok())
        .map(|bins| {
            let score = LengthScore {
                key_length: bins.key_length(),
                mean_ioc: bins.mean_ioc(variant),
            };
            debug!(
                key_length = score.key_length,
                mean_ioc = ?score.mean_ioc,
                "surveyed key length"
            );
            score
        })
        .collect()
}
