use credo_types::Channel;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid {channel} destination: {destination}")]
    InvalidDestination { channel: Channel, destination: String },

    #[error("{channel} delivery failed: {reason}")]
    DeliveryFailed { channel: Channel, reason: String },
}
