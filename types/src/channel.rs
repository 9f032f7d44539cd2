//! Out-of-band delivery channels for one-time codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::IdError;

/// The channel a one-time code is delivered over. The email and phone
/// steps run the same protocol, parameterized by channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::Phone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "phone" | "sms" => Ok(Self::Phone),
            other => Err(IdError::UnknownVariant {
                kind: "channel",
                value: other.to_string(),
            }),
        }
    }
}
