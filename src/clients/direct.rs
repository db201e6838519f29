use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{
    clients::{NotificationChannel, deep_link::DeepLinkChannel},
    config::Config,
    error::ChannelError,
    models::{
        outcome::{ChannelDelivery, DispatchMethod},
        request::NotificationRequest,
    },
    render::MessageRenderer,
};

const CHANNEL: &str = "whatsapp-direct";

/// Sends the message through the CallMeBot WhatsApp API. When the API
/// refuses or is unreachable the channel hands back a deep link instead
/// of an error.
pub struct DirectMessageChannel {
    http_client: Client,
    endpoint: String,
    api_key: Option<String>,
    target_number: String,
    renderer: MessageRenderer,
    fallback: DeepLinkChannel,
}

impl DirectMessageChannel {
    pub fn new(config: &Config, http_client: Client) -> Self {
        info!(endpoint = %config.callmebot_url, "Direct WhatsApp client initialized");

        Self {
            http_client,
            endpoint: config.callmebot_url.clone(),
            api_key: config.callmebot_api_key().map(str::to_string),
            target_number: config.staff_number(),
            renderer: MessageRenderer::new(config),
            fallback: DeepLinkChannel::new(config),
        }
    }

    async fn send_via_api(&self, api_key: &str, message: &str) -> Result<(), ChannelError> {
        debug!(target = %self.target_number, "Sending message via CallMeBot");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("phone", self.target_number.as_str()),
                ("text", message),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| ChannelError::transport(CHANNEL, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::transport(CHANNEL, e.to_string()))?;

        debug!(%status, body = %body, "CallMeBot response");

        if status.is_success() && (body.contains("OK") || body.contains("Message queued")) {
            Ok(())
        } else {
            Err(ChannelError::transport(
                CHANNEL,
                format!("CallMeBot returned status {}: {}", status, body.trim()),
            ))
        }
    }
}

#[async_trait]
impl NotificationChannel for DirectMessageChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, request: &NotificationRequest) -> Result<ChannelDelivery, ChannelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ChannelError::not_configured(CHANNEL))?;

        let message = self.renderer.render_text(request);

        match self.send_via_api(api_key, &message).await {
            Ok(()) => {
                info!(
                    request_id = %request.request_id,
                    "WhatsApp message sent directly"
                );
                Ok(ChannelDelivery::delivered(DispatchMethod::WhatsappDirect))
            }
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "Direct WhatsApp send failed, falling back to handoff link"
                );
                self.fallback.send(request).await
            }
        }
    }
}
