use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::{
    clients::{
        NotificationChannel,
        deep_link::DeepLinkChannel,
        direct::DirectMessageChannel,
        email::{EmailChannel, MailTransport},
    },
    config::Config,
    models::{outcome::DispatchOutcome, request::NotificationRequest},
};

/// Tries each channel in priority order and stops at the first success.
///
/// Channels that are not configured are skipped without an attempt. A
/// failing channel is logged and the next one tried; only the last error
/// is kept for the final outcome.
pub struct NotificationDispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Standard chain: direct API, email, then the link handoff when
    /// enabled.
    pub fn from_config(
        config: &Config,
        http_client: Client,
        mail_transport: Arc<dyn MailTransport>,
    ) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = vec![
            Box::new(DirectMessageChannel::new(config, http_client)),
            Box::new(EmailChannel::new(config, mail_transport)),
        ];

        if config.link_fallback_enabled {
            channels.push(Box::new(DeepLinkChannel::new(config)));
        }

        let dispatcher = Self::new(channels);
        info!(
            channels = ?dispatcher.channel_names(),
            configured = ?dispatcher.configured_channel_names(),
            "Notification dispatcher initialized"
        );
        dispatcher
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|channel| channel.name()).collect()
    }

    pub fn configured_channel_names(&self) -> Vec<&'static str> {
        self.channels
            .iter()
            .filter(|channel| channel.is_configured())
            .map(|channel| channel.name())
            .collect()
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> DispatchOutcome {
        info!(
            request_id = %request.request_id,
            kind = ?request.kind,
            "Dispatching staff notification"
        );

        let mut last_error = None;

        for channel in &self.channels {
            if !channel.is_configured() {
                debug!(channel = channel.name(), "Channel not configured, skipping");
                continue;
            }

            match channel.send(request).await {
                Ok(delivery) => {
                    info!(
                        request_id = %request.request_id,
                        channel = channel.name(),
                        method = %delivery.method,
                        kind = ?delivery.kind,
                        "Notification dispatched"
                    );
                    return delivery.into();
                }
                Err(e) => {
                    warn!(
                        request_id = %request.request_id,
                        channel = channel.name(),
                        error = %e,
                        "Notification channel failed, trying next"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        match last_error {
            Some(message) => {
                error!(
                    request_id = %request.request_id,
                    error = %message,
                    "All notification channels failed"
                );
                DispatchOutcome::all_failed(message)
            }
            None => {
                error!(
                    request_id = %request.request_id,
                    "No notification channel is configured"
                );
                DispatchOutcome::not_configured()
            }
        }
    }
}
