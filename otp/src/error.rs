use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("code length {digits} outside supported range {min}..={max}")]
    InvalidLength { digits: u32, min: u32, max: u32 },

    #[error("randomness unavailable: {0}")]
    Randomness(String),
}
