//! Nullable notifier: record code deliveries without sending them.

use credo_notify::{CodeNotifier, NotifyError};
use credo_types::Channel;
use std::cell::{Cell, RefCell};

/// One recorded delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentCode {
    pub channel: Channel,
    pub destination: String,
    pub code: String,
}

/// A test notifier that records codes instead of delivering them.
#[derive(Default)]
pub struct NullNotifier {
    sent: RefCell<Vec<SentCode>>,
    failing: Cell<bool>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following delivery fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Get all deliveries (for assertions).
    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.borrow().clone()
    }

    /// The most recent code delivered over `channel`.
    pub fn last_code(&self, channel: Channel) -> Option<String> {
        self.sent
            .borrow()
            .iter()
            .rev()
            .find(|s| s.channel == channel)
            .map(|s| s.code.clone())
    }
}

impl CodeNotifier for NullNotifier {
    fn send_code(
        &self,
        channel: Channel,
        destination: &str,
        code: &str,
    ) -> Result<(), NotifyError> {
        if self.failing.get() {
            return Err(NotifyError::DeliveryFailed {
                channel,
                reason: "null notifier set to fail".into(),
            });
        }
        self.sent.borrow_mut().push(SentCode {
            channel,
            destination: destination.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_fails_on_demand() {
        let n = NullNotifier::new();
        n.send_code(Channel::Email, "a@b.io", "123456").unwrap();
        assert_eq!(n.last_code(Channel::Email).as_deref(), Some("123456"));
        assert_eq!(n.last_code(Channel::Phone), None);

        n.set_failing(true);
        assert!(n.send_code(Channel::Phone, "+15550000000", "1").is_err());
        assert_eq!(n.sent().len(), 1);
    }
}
