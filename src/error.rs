use thiserror::Error;

/// Everything that can go wrong while analysing or transforming a ciphertext
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A caller supplied phrase occurs fewer than two times
    #[error("phrase {phrase:?} does not occur twice in the ciphertext")]
    NotFound { phrase: String },

    #[error("insufficient evidence: {0}")]
    InsufficientEvidence(String),

    #[error("invalid frequency profile record {record:?} on line {line}: {reason}")]
    InvalidProfile {
        line: usize,
        record: String,
        reason: String,
    },

    #[error("key cannot be empty")]
    InvalidKey,

    #[error("key length must be at least 1")]
    InvalidKeyLength,

    #[error("n-gram length {0} is not supported, expected 3 or 4")]
    InvalidNgramLength(usize),

    /// Input contained something other than a lowercase ASCII letter
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
