use crate::alphabet::Ciphertext;
use crate::bins::Bins;
use crate::error::Result;
use crate::ioc::IocVariant;
use crate::kasiski::{estimate_key_length, find_repeats, phrase_deltas, PhraseEvidence};
use crate::profile::FrequencyProfile;
use crate::recover::{key_from_tables, mg_tables, MgTable};
use crate::vigenere::{decrypt, Key};
use serde::Serialize;
use tracing::{info, instrument};

/// Where the key length evidence comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    /// Phrases picked by the caller, usually from the n-gram frequency tables
    Phrases(Vec<String>),
    /// Every repeated n-gram of this length, in order of first occurrence
    Repeats(usize),
    /// Skip the Kasiski examination and use this key length
    KeyLength(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// How many deltas to reduce with the GCD
    pub top: usize,
    pub variant: IocVariant,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            top: 5,
            variant: IocVariant::Unbiased,
        }
    }
}

/// Everything worked out on the way from ciphertext to plaintext
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Empty when the key length was given
    pub evidence: PhraseEvidence,
    pub key_length: usize,
    /// Per bin, `None` where the bin was too small
    pub iocs: Vec<Option<f64>>,
    pub mg_tables: Vec<MgTable>,
    pub key: Key,
    pub plaintext: String,
}

/// Run the whole pipeline: deltas, key length, bins, IC, key and plaintext
#[instrument(skip_all, fields(len = ciphertext.len()))]
pub fn analyze(
    ciphertext: &Ciphertext,
    evidence: &Evidence,
    profile: &FrequencyProfile,
    options: &Options,
) -> Result<Analysis> {
    let (evidence, key_length) = match evidence {
        Evidence::KeyLength(m) => (PhraseEvidence::default(), *m),
        Evidence::Phrases(phrases) => {
            let found = phrase_deltas(ciphertext, phrases);
            let m = estimate_key_length(&found.deltas(), options.top)?;
            (found, m)
        }
        Evidence::Repeats(n) => {
            let found = PhraseEvidence {
                matches: find_repeats(ciphertext, *n)?,
                missing: Vec::new(),
            };
            let m = estimate_key_length(&found.deltas(), options.top)?;
            (found, m)
        }
    };
    info!(key_length, "using key length");

    let bins = Bins::new(ciphertext, key_length)?;
    let iocs = bins
        .iocs(options.variant)
        .into_iter()
        .map(Result::ok)
        .collect();
    let mg_tables = mg_tables(&bins, profile)?;
    let key = key_from_tables(&mg_tables)?;
    let plaintext = decrypt(ciphertext.as_bytes(), &key)?;
    info!(%key, "recovered key");

    Ok(Analysis {
        evidence,
        key_length,
        iocs,
        mg_tables,
        key,
        plaintext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_forced_key_length() {
        let ct = Ciphertext::new("lxfopvefrnhr").unwrap();
        let analysis = analyze(
            &ct,
            &Evidence::KeyLength(5),
            &FrequencyProfile::english(),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(analysis.key_length, 5);
        assert_eq!(analysis.key.len(), 5);
        assert_eq!(analysis.mg_tables.len(), 5);
        assert_eq!(analysis.plaintext.len(), ct.len());
        assert!(analysis.evidence.matches.is_empty());
    }

    #[test]
    fn test_forced_key_length_longer_than_text_fails() {
        let ct = Ciphertext::new("lxfopvefrnhr").unwrap();
        for m in [13, usize::MAX / 8] {
            let result = analyze(
                &ct,
                &Evidence::KeyLength(m),
                &FrequencyProfile::english(),
                &Options::default(),
            );
            assert!(matches!(result, Err(AnalysisError::InsufficientEvidence(_))));
        }
    }

    #[test]
    fn test_no_repeats_is_insufficient_evidence() {
        let ct = Ciphertext::new("abcdefghijklmnopqrstuvwxyz").unwrap();
        let result = analyze(
            &ct,
            &Evidence::Repeats(3),
            &FrequencyProfile::english(),
            &Options::default(),
        );
        assert!(matches!(result, Err(AnalysisError::InsufficientEvidence(_))));
    }

    #[test]
    fn test_missing_phrases_are_reported() {
        let ct = Ciphertext::new("abcxyzabcqqxyzabc").unwrap();
        let phrases = vec!["abc".to_string(), "nope".to_string()];
        let analysis = analyze(
            &ct,
            &Evidence::Phrases(phrases),
            &FrequencyProfile::english(),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(analysis.key_length, 6);
        assert_eq!(analysis.evidence.missing, ["nope"]);
    }
}
