//! Codes drawn from the operating system's CSPRNG.

use crate::{format_code, validate_length, CodeSource, OtpError};

/// A [`CodeSource`] backed by `getrandom`.
///
/// Uses rejection sampling so every code in `[0, 10^digits)` is equally likely.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsCodeSource;

impl OsCodeSource {
    fn next_u32(&self) -> Result<u32, OtpError> {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).map_err(|e| OtpError::Randomness(e.to_string()))?;
        Ok(u32::from_le_bytes(buf))
    }
}

impl CodeSource for OsCodeSource {
    fn generate(&self, digits: u32) -> Result<String, OtpError> {
        validate_length(digits)?;
        let modulus = 10u32.pow(digits);
        // Largest multiple of `modulus` that fits; values above it would bias low codes.
        let zone = u32::MAX - (u32::MAX % modulus);
        loop {
            let candidate = self.next_u32()?;
            if candidate < zone {
                return Ok(format_code(candidate % modulus, digits));
            }
        }
    }

    fn name(&self) -> &str {
        "os"
    }
}
