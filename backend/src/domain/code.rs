//! Verification codes and their generator.
//!
//! A code is the short-lived, out-of-band credential gating account
//! consultation and loan registration. Codes must be unguessable and
//! non-enumerable: eight bytes from the operating system RNG, hex-encoded.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Raw entropy per code, before encoding.
const CODE_BYTES: usize = 8;

/// Hex digits kept when fingerprinting a code for logs.
const FINGERPRINT_LEN: usize = 8;

/// Validation errors returned when constructing a [`VerificationCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeValidationError {
    /// Code is empty after trimming whitespace.
    Empty,
    /// Code contains leading or trailing whitespace.
    ContainsWhitespace,
}

impl fmt::Display for CodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "verification code must not be empty"),
            Self::ContainsWhitespace => {
                write!(f, "verification code must not contain surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for CodeValidationError {}

/// Opaque verification code token.
///
/// The raw code only ever travels to the customer's contact channel; logs
/// and errors must use [`VerificationCode::fingerprint`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Construct a code from text submitted back by an agent.
    pub fn new(value: impl Into<String>) -> Result<Self, CodeValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CodeValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CodeValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Short SHA-256 digest prefix, safe to log.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::VerificationCode;
    ///
    /// let code = VerificationCode::new("deadbeefcafef00d").expect("valid code");
    /// assert_eq!(code.fingerprint().len(), 8);
    /// ```
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for VerificationCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Source of fresh verification codes.
///
/// Generation is infallible: the entropy space is effectively inexhaustible
/// and collisions are handled by the issuance retry loop, not the generator.
pub trait CodeGenerator: Send + Sync {
    /// Produce a fresh code.
    fn generate(&self) -> VerificationCode;
}

/// Production generator backed by the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> VerificationCode {
        let mut bytes = [0_u8; CODE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        VerificationCode(hex::encode(bytes))
    }
}
