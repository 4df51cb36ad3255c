use crate::alphabet::{letter_of, to_indices, to_letters, ALPHABET_SIZE};
use crate::error::{AnalysisError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-empty Vigenere key, stored as shifts 0-25
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    shifts: Vec<u8>,
}

impl Key {
    /// Build a key from lowercase letters
    /// ```
    /// use kasiski::vigenere::Key;
    /// assert_eq!(Key::new("lemon").unwrap().shifts(), [11, 4, 12, 14, 13]);
    /// assert!(Key::new("").is_err());
    /// ```
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self> {
        Self::from_shifts(to_indices(key)?)
    }

    /// Build a key from shifts, each taken modulo 26
    pub fn from_shifts(shifts: impl Into<Vec<u8>>) -> Result<Self> {
        let mut shifts = shifts.into();
        if shifts.is_empty() {
            return Err(AnalysisError::InvalidKey);
        }
        shifts.iter_mut().for_each(|s| *s %= ALPHABET_SIZE as u8);
        Ok(Self { shifts })
    }

    pub fn shifts(&self) -> &[u8] {
        &self.shifts
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// Always false, keys cannot be empty
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Replace the letter at `position`, for fixing up a recovered key by hand
    pub fn with_letter(mut self, position: usize, letter: u8) -> Result<Self> {
        let shift = to_indices([letter])?[0];
        let slot = self
            .shifts
            .get_mut(position)
            .ok_or(AnalysisError::InvalidKey)?;
        *slot = shift;
        Ok(self)
    }
}

impl FromStr for Key {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_letters(&self.shifts))
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Encrypt lowercase plaintext with the key
/// ```
/// use kasiski::vigenere::{encrypt, Key};
/// let key = Key::new("lemon").unwrap();
/// assert_eq!(encrypt("attackatdawn", &key).unwrap(), "lxfopvefrnhr");
/// ```
pub fn encrypt(plaintext: impl AsRef<[u8]>, key: &Key) -> Result<String> {
    shift_with_key(plaintext, key, |p, k| p + k)
}

/// Decrypt lowercase ciphertext with the key
/// ```
/// use kasiski::vigenere::{decrypt, Key};
/// let key = Key::new("lemon").unwrap();
/// assert_eq!(decrypt("lxfopvefrnhr", &key).unwrap(), "attackatdawn");
/// ```
pub fn decrypt(ciphertext: impl AsRef<[u8]>, key: &Key) -> Result<String> {
    shift_with_key(ciphertext, key, |c, k| c + ALPHABET_SIZE as u8 - k)
}

fn shift_with_key(text: impl AsRef<[u8]>, key: &Key, op: impl Fn(u8, u8) -> u8) -> Result<String> {
    let indices = to_indices(text)?;
    let shifted = indices
        .iter()
        .zip(key.shifts.iter().cycle())
        .map(|(&t, &k)| char::from(letter_of(op(t, k))))
        .collect();

    Ok(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_lemon() {
        let key = Key::new("lemon").unwrap();
        assert_eq!(encrypt("attackatdawn", &key).unwrap(), "lxfopvefrnhr");
    }

    #[test]
    fn test_decrypt_lemon() {
        let key: Key = "lemon".parse().unwrap();
        assert_eq!(decrypt("lxfopvefrnhr", &key).unwrap(), "attackatdawn");
    }

    #[test]
    fn test_round_trip() {
        let plain = "thequickbrownfoxjumpsoverthelazydog";
        for key in ["a", "z", "ab", "lemon", "mdzxwjq", "averyveryverylongkeyindeedwowitslong"] {
            let key = Key::new(key).unwrap();
            let enc = encrypt(plain, &key).unwrap();
            assert_eq!(decrypt(&enc, &key).unwrap(), plain);
        }
    }

    #[test]
    fn test_key_a_is_identity() {
        let key = Key::new("aaa").unwrap();
        assert_eq!(encrypt("hello", &key).unwrap(), "hello");
    }

    #[test]
    fn test_empty_text() {
        let key = Key::new("key").unwrap();
        assert_eq!(encrypt("", &key).unwrap(), "");
    }

    #[test]
    fn test_empty_key_fails() {
        assert_eq!(Key::new(""), Err(AnalysisError::InvalidKey));
        assert_eq!(Key::from_shifts(Vec::<u8>::new()), Err(AnalysisError::InvalidKey));
    }

    #[test]
    fn test_invalid_characters_fail() {
        let key = Key::new("lemon").unwrap();
        assert_eq!(
            encrypt("attack at dawn", &key),
            Err(AnalysisError::InvalidCharacter {
                character: ' ',
                position: 6
            })
        );
        assert!(decrypt("LXFOPV", &key).is_err());
        assert!(Key::new("Lemon").is_err());
    }

    #[test]
    fn test_from_shifts_wraps() {
        let key = Key::from_shifts(vec![26u8, 27]).unwrap();
        assert_eq!(key.to_string(), "ab");
    }

    #[test]
    fn test_with_letter() {
        let key = Key::new("mdzxwjr").unwrap().with_letter(6, b'q').unwrap();
        assert_eq!(key.to_string(), "mdzxwjq");
        assert!(key.with_letter(7, b'a').is_err());
    }
}
