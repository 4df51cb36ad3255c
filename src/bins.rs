use crate::alphabet::{count_indices, Ciphertext, Histogram};
use crate::error::{AnalysisError, Result};
use crate::ioc::{index_of_coincidence, IocVariant};
use serde::Serialize;

/// The letters of a ciphertext split by position modulo the key length.
///
/// Bin `i` holds every letter enciphered with key letter `i`, if the key
/// length guess is right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bins {
    histograms: Vec<Histogram>,
}

impl Bins {
    /// Split the ciphertext into `key_length` bins.
    ///
    /// Every position is used. A key longer than the ciphertext would
    /// leave bins with nothing in them, so it is rejected up front.
    /// ```
    /// use kasiski::alphabet::Ciphertext;
    /// use kasiski::bins::Bins;
    /// let bins = Bins::new(&Ciphertext::new("abcabd").unwrap(), 3).unwrap();
    /// assert_eq!(bins.histogram(2).unwrap()[2..4], [1, 1]);
    /// ```
    pub fn new(ciphertext: &Ciphertext, key_length: usize) -> Result<Self> {
        if key_length == 0 {
            return Err(AnalysisError::InvalidKeyLength);
        }
        if key_length > ciphertext.len() {
            return Err(AnalysisError::InsufficientEvidence(format!(
                "key length {key_length} is longer than the {} letter ciphertext",
                ciphertext.len()
            )));
        }

        let letters: Vec<u8> = ciphertext.indices().collect();
        let histograms = (0..key_length)
            .map(|offset| count_indices(letters.iter().skip(offset).step_by(key_length).copied()))
            .collect();

        Ok(Self { histograms })
    }

    /// The key length these bins were built for
    pub fn key_length(&self) -> usize {
        self.histograms.len()
    }

    pub fn histogram(&self, bin: usize) -> Option<&Histogram> {
        self.histograms.get(bin)
    }

    pub fn histograms(&self) -> &[Histogram] {
        &self.histograms
    }

    /// Number of letters in each bin
    pub fn sizes(&self) -> Vec<usize> {
        self.histograms.iter().map(|h| h.iter().sum()).collect()
    }

    /// The index of coincidence of every bin, failures are kept per bin
    pub fn iocs(&self, variant: IocVariant) -> Vec<Result<f64>> {
        self.histograms
            .iter()
            .map(|h| index_of_coincidence(h, variant))
            .collect()
    }

    /// Mean IC over the bins which have one, `None` if none of them do
    pub fn mean_ioc(&self, variant: IocVariant) -> Option<f64> {
        let iocs: Vec<f64> = self.iocs(variant).into_iter().flatten().collect();
        (!iocs.is_empty()).then(|| iocs.iter().sum::<f64>() / iocs.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_partition_every_position() {
        let ct = Ciphertext::new("lxfopvefrnhr").unwrap();
        let bins = Bins::new(&ct, 5).unwrap();
        assert_eq!(bins.key_length(), 5);
        assert_eq!(bins.sizes(), [3, 3, 2, 2, 2]);
        assert_eq!(bins.sizes().iter().sum::<usize>(), ct.len());
    }

    #[test]
    fn test_bin_contents() {
        // bin 0 is positions 0, 5, 10 => l, v, h
        let ct = Ciphertext::new("lxfopvefrnhr").unwrap();
        let bins = Bins::new(&ct, 5).unwrap();
        let h = bins.histogram(0).unwrap();
        assert_eq!(h[(b'l' - b'a') as usize], 1);
        assert_eq!(h[(b'v' - b'a') as usize], 1);
        assert_eq!(h[(b'h' - b'a') as usize], 1);
    }

    #[test]
    fn test_zero_key_length_fails() {
        let ct = Ciphertext::new("abc").unwrap();
        assert_eq!(Bins::new(&ct, 0), Err(AnalysisError::InvalidKeyLength));
    }

    #[test]
    fn test_key_longer_than_text_fails() {
        let ct = Ciphertext::new("ab").unwrap();
        assert!(matches!(
            Bins::new(&ct, 3),
            Err(AnalysisError::InsufficientEvidence(_))
        ));
        assert_eq!(Bins::new(&ct, 2).unwrap().sizes(), [1, 1]);
    }

    #[test]
    fn test_huge_key_length_fails() {
        let ct = Ciphertext::new("lxfopvefrnhr").unwrap();
        assert!(Bins::new(&ct, usize::MAX / 8).is_err());
        assert!(Bins::new(&ct, usize::MAX).is_err());
    }

    #[test]
    fn test_empty_ciphertext_has_no_bins() {
        let ct = Ciphertext::new("").unwrap();
        assert!(Bins::new(&ct, 1).is_err());
    }

    #[test]
    fn test_single_letter_bins_have_no_ioc() {
        let ct = Ciphertext::new("abcd").unwrap();
        let bins = Bins::new(&ct, 4).unwrap();
        assert!(bins.iocs(IocVariant::Unbiased).iter().all(Result::is_err));
        assert_eq!(bins.mean_ioc(IocVariant::Unbiased), None);
    }

    #[test]
    fn test_mean_ioc_skips_small_bins() {
        let ct = Ciphertext::new("aaaab").unwrap();
        let bins = Bins::new(&ct, 4).unwrap();
        // bin 0 is "ab", the rest hold one letter each
        assert_eq!(bins.mean_ioc(IocVariant::Unbiased), Some(0.0));
    }
}
