// #![deny(missing_docs)]

pub mod alphabet;
pub mod analysis;
pub mod bins;
pub mod error;
pub mod ioc;
pub mod kasiski;
pub mod profile;
pub mod recover;
pub mod vigenere;

pub use error::{AnalysisError, Result};
