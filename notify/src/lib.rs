//! Notification dispatch boundary.
//!
//! The workflow generates codes; delivering them over email or SMS belongs to
//! an external provider. Providers implement [`CodeNotifier`]. A failed send
//! must never leave a half-issued code behind, so callers only persist the
//! new code after [`CodeNotifier::send_code`] returns `Ok`.

pub mod console;
pub mod error;

pub use console::ConsoleNotifier;
pub use error::NotifyError;

use credo_types::Channel;

/// Fire-and-confirm delivery of a generated code.
pub trait CodeNotifier {
    /// Deliver `code` to `destination` (an email address or phone number).
    fn send_code(&self, channel: Channel, destination: &str, code: &str)
        -> Result<(), NotifyError>;
}

/// Basic shape checks on a destination before it is handed to a provider.
pub fn validate_destination(channel: Channel, destination: &str) -> Result<(), NotifyError> {
    let d = destination.trim();
    let ok = match channel {
        Channel::Email => {
            let mut parts = d.splitn(2, '@');
            let local = parts.next().unwrap_or_default();
            let domain = parts.next().unwrap_or_default();
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        Channel::Phone => {
            let digits = d.strip_prefix('+').unwrap_or(d);
            (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        }
    };
    if ok {
        Ok(())
    } else {
        Err(NotifyError::InvalidDestination {
            channel,
            destination: destination.to_string(),
        })
    }
}
