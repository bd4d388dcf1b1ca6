//! # Secret Generator
//!
//! Policy-driven random value generation for `AutoGenerated` claims.
//!
//! Every character is drawn independently and uniformly from the charset of the
//! requested [`Encoding`]. Random bytes come from the operating system CSPRNG and
//! are mapped onto the charset by rejection sampling, so no charset position is
//! favoured. A failing entropy source is reported as [`GenerationError`]; there is
//! no fallback to a weaker generator.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroize;

const CHARSET_DIGITS: &str = "0123456789";
const CHARSET_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CHARSET_SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?/";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("secure random source failed: {0}")]
    Entropy(String),
}

/// Character class of generated values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// `0-9`
    Digits,
    /// `0-9a-zA-Z`
    #[default]
    Alphanumeric,
    /// Alphanumeric plus a fixed punctuation set
    Symbols,
}

impl Encoding {
    /// Parse an encoding name, case-insensitively
    ///
    /// Unknown and empty names fall back to [`Encoding::Alphanumeric`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "digits" => Self::Digits,
            "symbols" => Self::Symbols,
            _ => Self::Alphanumeric,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Digits => "digits",
            Self::Alphanumeric => "alphanumeric",
            Self::Symbols => "symbols",
        }
    }

    /// Characters a generated value may contain
    #[must_use]
    pub fn charset(&self) -> Vec<u8> {
        let parts: &[&str] = match self {
            Self::Digits => &[CHARSET_DIGITS],
            Self::Alphanumeric => &[CHARSET_DIGITS, CHARSET_LETTERS],
            Self::Symbols => &[CHARSET_DIGITS, CHARSET_LETTERS, CHARSET_SYMBOLS],
        };
        parts.iter().flat_map(|p| p.bytes()).collect()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of random bytes for the generator
pub trait EntropySource: Send + Sync + fmt::Debug {
    /// Fill `dest` with random bytes or fail without partial fallback
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying source cannot produce bytes.
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), GenerationError>;
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), GenerationError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| GenerationError::Entropy(e.to_string()))
    }
}

/// Upper bound on random bytes requested from the entropy source at once
const READ_CHUNK: usize = 256;

/// Generates secret values of a fixed length from an [`Encoding`]
#[derive(Debug, Clone)]
pub struct SecretGenerator {
    entropy: Arc<dyn EntropySource>,
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl SecretGenerator {
    #[must_use]
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Generate one value of exactly `length` characters
    ///
    /// The caller must have checked `length` against the allowed range; this
    /// function does not clamp or reject lengths. Random bytes are drawn in
    /// chunks of at most 256, so only the value itself scales with `length`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the entropy source fails.
    pub fn generate(&self, length: usize, encoding: Encoding) -> Result<String, GenerationError> {
        let charset = encoding.charset();
        // Largest multiple of the charset size that fits in a byte; bytes at or
        // above it are discarded so every charset index is equally likely.
        let limit = 256 - (256 % charset.len());

        let mut value = String::with_capacity(length);
        let mut buf = vec![0u8; length.clamp(16, READ_CHUNK)];
        while value.len() < length {
            if let Err(e) = self.entropy.try_fill(&mut buf) {
                buf.zeroize();
                value.zeroize();
                return Err(e);
            }
            for &byte in &buf {
                if value.len() == length {
                    break;
                }
                let byte = usize::from(byte);
                if byte < limit {
                    value.push(char::from(charset[byte % charset.len()]));
                }
            }
        }
        buf.zeroize();
        Ok(value)
    }
}
