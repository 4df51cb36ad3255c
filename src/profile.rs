use crate::alphabet::{index_of, ALPHABET_SIZE};
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use tracing::debug;

/// Letter probabilities for English, a-z in order
/// https://en.wikipedia.org/wiki/Letter_frequency
const ENGLISH_FREQ: [f64; ALPHABET_SIZE] = [
    0.08167, 0.01492, 0.02782, 0.04253, 0.12702, 0.02228, 0.02015, 0.06094, 0.06966, 0.00153,
    0.00772, 0.04025, 0.02406, 0.06749, 0.07507, 0.01929, 0.00095, 0.05987, 0.06327, 0.09056,
    0.02758, 0.00978, 0.02360, 0.00150, 0.01974, 0.00074,
];

/// The expected probability of each letter in the plaintext language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyProfile {
    probs: [f64; ALPHABET_SIZE],
}

impl FrequencyProfile {
    /// The built in English profile
    pub fn english() -> Self {
        Self {
            probs: ENGLISH_FREQ,
        }
    }

    /// Build a profile from already parsed `(letter, probability)` records.
    ///
    /// Every letter a-z must appear exactly once with a finite, non-negative
    /// probability. Records are numbered from 1 in errors.
    pub fn from_records(records: impl IntoIterator<Item = (char, f64)>) -> Result<Self> {
        let mut builder = Builder::default();
        for (n, (letter, prob)) in records.into_iter().enumerate() {
            builder.add(n + 1, &format!("{letter}:{prob}"), letter, prob)?;
        }
        builder.finish()
    }

    /// Parse a profile from text, one `letter<delim>probability` record per line.
    ///
    /// The delimiter is either `:` or whitespace, blank lines and lines
    /// starting with `#` are skipped.
    /// ```
    /// use kasiski::profile::FrequencyProfile;
    /// let text: String = (b'a'..=b'z').map(|c| format!("{}:0.0384615\n", c as char)).collect();
    /// let profile = FrequencyProfile::parse(&text).unwrap();
    /// assert_eq!(profile.prob(b'q').unwrap(), 0.0384615);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut builder = Builder::default();
        for (n, line) in text.lines().enumerate() {
            let record = line.trim();
            if record.is_empty() || record.starts_with('#') {
                continue;
            }

            let invalid = |reason: &str| AnalysisError::InvalidProfile {
                line: n + 1,
                record: record.to_string(),
                reason: reason.to_string(),
            };

            let mut chars = record.chars();
            let letter = chars.next().ok_or_else(|| invalid("empty record"))?;
            let rest = chars.as_str();
            let value = rest
                .strip_prefix(':')
                .or_else(|| rest.strip_prefix(char::is_whitespace))
                .ok_or_else(|| invalid("expected ':' or whitespace after the letter"))?
                .trim();
            let prob: f64 = value
                .parse()
                .map_err(|_| invalid("probability is not a number"))?;

            builder.add(n + 1, record, letter, prob)?;
        }
        let profile = builder.finish()?;
        debug!(expected_ioc = profile.expected_ioc(), "loaded frequency profile");
        Ok(profile)
    }

    /// The probabilities for a-z in order
    pub fn probs(&self) -> &[f64; ALPHABET_SIZE] {
        &self.probs
    }

    /// The probability of a single lowercase letter
    pub fn prob(&self, letter: u8) -> Result<f64> {
        Ok(self.probs[index_of(letter)? as usize])
    }

    /// The index of coincidence of text drawn from this distribution
    pub fn expected_ioc(&self) -> f64 {
        self.probs.iter().map(|p| p * p).sum()
    }

    /// Sum of all the probabilities, should be close to 1
    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }
}

impl Default for FrequencyProfile {
    fn default() -> Self {
        Self::english()
    }
}

#[derive(Default)]
struct Builder {
    probs: [Option<f64>; ALPHABET_SIZE],
}

impl Builder {
    fn add(&mut self, line: usize, record: &str, letter: char, prob: f64) -> Result<()> {
        let invalid = |reason: &str| AnalysisError::InvalidProfile {
            line,
            record: record.to_string(),
            reason: reason.to_string(),
        };

        if !letter.is_ascii_lowercase() {
            return Err(invalid("letter must be in a-z"));
        }
        if !prob.is_finite() || prob < 0.0 {
            return Err(invalid("probability must be finite and non-negative"));
        }

        let slot = &mut self.probs[(letter as u8 - b'a') as usize];
        if slot.is_some() {
            return Err(invalid("duplicate letter"));
        }
        *slot = Some(prob);

        Ok(())
    }

    fn finish(self) -> Result<FrequencyProfile> {
        let missing: String = self
            .probs
            .iter()
            .zip('a'..='z')
            .filter(|(p, _)| p.is_none())
            .map(|(_, c)| c)
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::InvalidProfile {
                line: 0,
                record: String::new(),
                reason: format!("missing letters {missing}"),
            });
        }

        Ok(FrequencyProfile {
            probs: self.probs.map(|p| p.unwrap_or_default()),
        })
    }
}
