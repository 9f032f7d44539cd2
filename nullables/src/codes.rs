//! Nullable code source: predictable one-time codes.

use credo_otp::{validate_length, CodeSource, OtpError};
use std::sync::Mutex;

/// A code source for testing.
///
/// Returns pre-configured codes in order, wrapping around at the end.
pub struct NullCodeSource {
    codes: Vec<String>,
    index: Mutex<usize>,
}

impl NullCodeSource {
    /// Create with a sequence of codes.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        assert!(!codes.is_empty(), "NullCodeSource needs at least one code");
        Self {
            codes,
            index: Mutex::new(0),
        }
    }

    /// Create with a single code returned for every call.
    pub fn constant(code: &str) -> Self {
        Self::new([code])
    }

    /// How many codes have been handed out.
    pub fn issued(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl CodeSource for NullCodeSource {
    fn generate(&self, digits: u32) -> Result<String, OtpError> {
        validate_length(digits)?;
        let mut idx = self.index.lock().unwrap();
        let code = self.codes[*idx % self.codes.len()].clone();
        *idx += 1;
        Ok(code)
    }

    fn name(&self) -> &str {
        "null-codes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_codes() {
        let source = NullCodeSource::new(["111111", "222222"]);
        assert_eq!(source.generate(6).unwrap(), "111111");
        assert_eq!(source.generate(6).unwrap(), "222222");
        assert_eq!(source.generate(6).unwrap(), "111111");
        assert_eq!(source.issued(), 3);
    }

    #[test]
    fn still_checks_length() {
        assert!(NullCodeSource::constant("1").generate(2).is_err());
    }
}
