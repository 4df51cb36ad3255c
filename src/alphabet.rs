use crate::error::{AnalysisError, Result};
use std::fmt;
use std::str::FromStr;

/// Number of letters in the alphabet, a-z
pub const ALPHABET_SIZE: usize = 26;

/// A count of each letter a-z in some text
pub type Histogram = [usize; ALPHABET_SIZE];

/// Map a lowercase ASCII letter to its index 0-25
/// ```
/// use kasiski::alphabet::index_of;
/// assert_eq!(index_of(b'a').unwrap(), 0);
/// assert_eq!(index_of(b'z').unwrap(), 25);
/// assert!(index_of(b'A').is_err());
/// ```
pub fn index_of(letter: u8) -> Result<u8> {
    index_at(letter, 0)
}

/// Map an index to its lowercase letter, indices wrap around the alphabet
/// ```
/// use kasiski::alphabet::letter_of;
/// assert_eq!(letter_of(0), b'a');
/// assert_eq!(letter_of(27), b'b');
/// ```
pub fn letter_of(index: u8) -> u8 {
    b'a' + index % ALPHABET_SIZE as u8
}

fn index_at(letter: u8, position: usize) -> Result<u8> {
    match letter {
        b'a'..=b'z' => Ok(letter - b'a'),
        _ => Err(AnalysisError::InvalidCharacter {
            character: char::from(letter),
            position,
        }),
    }
}

/// Convert a string of lowercase letters to their indices,
/// failing on the first character outside a-z
pub fn to_indices(text: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    text.as_ref()
        .iter()
        .enumerate()
        .map(|(pos, &ch)| index_at(ch, pos))
        .collect()
}

/// Convert letter indices back into a lowercase string
pub fn to_letters(indices: &[u8]) -> String {
    indices.iter().map(|&i| char::from(letter_of(i))).collect()
}

/// Count the occurrences of each letter index
pub fn count_indices(indices: impl IntoIterator<Item = u8>) -> Histogram {
    let mut counts = [0; ALPHABET_SIZE];
    for i in indices {
        counts[i as usize % ALPHABET_SIZE] += 1;
    }
    counts
}

/// Lowercase the text and drop everything that isn't a letter.
///
/// The analysis never does this itself, callers that read free text
/// should run it first.
/// ```
/// use kasiski::alphabet::normalize;
/// assert_eq!(normalize("Attack at DAWN!"), "attackatdawn");
/// ```
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Ciphertext that is known to only contain the letters a-z
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ciphertext {
    letters: Vec<u8>,
}

impl Ciphertext {
    pub fn new(text: impl AsRef<[u8]>) -> Result<Self> {
        let letters = text.as_ref().to_vec();
        to_indices(&letters)?;
        Ok(Self { letters })
    }

    /// The raw lowercase ASCII letters
    pub fn as_bytes(&self) -> &[u8] {
        &self.letters
    }

    pub fn as_str(&self) -> &str {
        // every byte was checked to be in a-z
        std::str::from_utf8(&self.letters).unwrap_or_default()
    }

    /// The letters as indices 0-25
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.letters.iter().map(|ch| ch - b'a')
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl FromStr for Ciphertext {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
