//! Development notifier: writes codes to the log instead of sending them.

use credo_types::Channel;
use tracing::Level;

use crate::{validate_destination, CodeNotifier, NotifyError};

/// Level of the delivery event. WARN, so the code still shows under the
/// CLI's default `warn` filter.
pub const DELIVERY_LEVEL: Level = Level::WARN;

/// Emits each code as a `tracing` event at [`DELIVERY_LEVEL`].
///
/// Only for local operation; the code appears in plain text in the logs.
/// A filter stricter than `warn` hides it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl CodeNotifier for ConsoleNotifier {
    fn send_code(
        &self,
        channel: Channel,
        destination: &str,
        code: &str,
    ) -> Result<(), NotifyError> {
        validate_destination(channel, destination)?;
        tracing::event!(
            DELIVERY_LEVEL,
            %channel,
            destination,
            code,
            "verification code issued (console delivery)"
        );
        Ok(())
    }
}
