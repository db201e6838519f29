use thiserror::Error;

/// Failure of a single channel attempt. Never escapes the dispatcher.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("{channel} channel is not configured")]
    NotConfigured { channel: &'static str },

    #[error("{channel} transport failed: {message}")]
    Transport {
        channel: &'static str,
        message: String,
    },
}

impl ChannelError {
    pub fn not_configured(channel: &'static str) -> Self {
        Self::NotConfigured { channel }
    }

    pub fn transport(channel: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            channel,
            message: message.into(),
        }
    }
}
