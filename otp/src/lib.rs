//! One-time code generation.
//!
//! Codes are short decimal strings delivered out of band. The generator is a
//! trait so tests can supply fixed codes; production uses the operating
//! system's randomness.

pub mod error;
pub mod os;

pub use error::OtpError;
pub use os::OsCodeSource;

/// Shortest code length accepted by [`validate_length`].
pub const MIN_DIGITS: u32 = 4;
/// Longest code length accepted by [`validate_length`]. `10^9` still fits in a `u32`.
pub const MAX_DIGITS: u32 = 9;

/// Trait for producing one-time codes.
pub trait CodeSource {
    /// Produce a code of exactly `digits` decimal digits (leading zeros kept).
    fn generate(&self, digits: u32) -> Result<String, OtpError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

/// Reject code lengths outside `[MIN_DIGITS, MAX_DIGITS]`.
pub fn validate_length(digits: u32) -> Result<(), OtpError> {
    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        Ok(())
    } else {
        Err(OtpError::InvalidLength {
            digits,
            min: MIN_DIGITS,
            max: MAX_DIGITS,
        })
    }
}

/// Zero-pad `value` to `digits` characters.
pub fn format_code(value: u32, digits: u32) -> String {
    format!("{:0width$}", value, width = digits as usize)
}

/// Whether `candidate` looks like a code of `digits` digits.
pub fn is_well_formed(candidate: &str, digits: u32) -> bool {
    candidate.len() == digits as usize && candidate.bytes().all(|b| b.is_ascii_digit())
}
