use async_trait::async_trait;
use tracing::info;

use crate::{
    clients::NotificationChannel,
    config::Config,
    error::ChannelError,
    models::{outcome::ChannelDelivery, request::NotificationRequest},
    render::{MessageRenderer, deep_link},
};

/// Prepares a pre-filled link to the staff number. Nothing is sent; staff
/// open the link by hand.
pub struct DeepLinkChannel {
    messaging_host: String,
    target_number: String,
    renderer: MessageRenderer,
}

impl DeepLinkChannel {
    pub fn new(config: &Config) -> Self {
        Self {
            messaging_host: config.messaging_host.clone(),
            target_number: config.staff_number(),
            renderer: MessageRenderer::new(config),
        }
    }

    pub fn link_for(&self, request: &NotificationRequest) -> String {
        let message = self.renderer.render_text(request);
        deep_link(&self.messaging_host, &self.target_number, &message)
    }
}

#[async_trait]
impl NotificationChannel for DeepLinkChannel {
    fn name(&self) -> &'static str {
        "whatsapp-link"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, request: &NotificationRequest) -> Result<ChannelDelivery, ChannelError> {
        let link = self.link_for(request);

        info!(
            request_id = %request.request_id,
            target = %self.target_number,
            "WhatsApp handoff link prepared"
        );

        Ok(ChannelDelivery::handoff(link))
    }
}
