use std::sync::Arc;

use anyhow::{Context, Error, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    clients::NotificationChannel,
    config::Config,
    error::ChannelError,
    models::{
        outcome::{ChannelDelivery, DispatchMethod},
        request::NotificationRequest,
    },
    render::{MessageRenderer, email_subject},
};

const CHANNEL: &str = "email";
const IMPLICIT_TLS_PORT: u16 = 465;

/// A file to attach, referenced by URL rather than carried inline.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<AttachmentRef>,
}

/// Mail delivery back-end. Either the message went out or an error comes
/// back.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), Error>;
}

pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    http_client: Client,
}

impl SmtpMailTransport {
    pub fn new(config: &Config, http_client: Client) -> Result<Self, Error> {
        let relay = if uses_implicit_tls(config.smtp_port) {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        };

        let mut builder = relay
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(config.smtp_port)
            .timeout(Some(config.http_timeout()));

        if let Some((user, pass)) = config.email_credentials() {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            implicit_tls = uses_implicit_tls(config.smtp_port),
            "SMTP transport initialized"
        );

        Ok(Self {
            mailer: builder.build(),
            http_client,
        })
    }

    async fn fetch_attachment(&self, attachment: &AttachmentRef) -> Result<SinglePart, Error> {
        debug!(url = %attachment.url, filename = %attachment.filename, "Fetching attachment");

        let response = self
            .http_client
            .get(&attachment.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch attachment {}", attachment.url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "Attachment {} returned status {}",
                attachment.url,
                status
            ));
        }

        let bytes = response.bytes().await?;
        let content_type = ContentType::parse(attachment.content_type)
            .map_err(|e| anyhow!("Invalid content type {}: {}", attachment.content_type, e))?;

        Ok(Attachment::new(attachment.filename.clone()).body(bytes.to_vec(), content_type))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: OutgoingEmail) -> Result<(), Error> {
        let from = email
            .from
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid sender address {}: {}", email.from, e))?;
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid recipient address {}: {}", email.to, e))?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(email.html));
        for attachment in &email.attachments {
            body = body.singlepart(self.fetch_attachment(attachment).await?);
        }

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .multipart(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| anyhow!("SMTP send failed: {}", e))?;

        Ok(())
    }
}

/// Port 465 speaks TLS from the first byte. Every other port (587, 25)
/// upgrades with STARTTLS.
pub fn uses_implicit_tls(port: u16) -> bool {
    port == IMPLICIT_TLS_PORT
}

/// Sends the HTML summary with photo and audio attached.
pub struct EmailChannel {
    transport: Arc<dyn MailTransport>,
    sender: Option<String>,
    recipient: String,
    renderer: MessageRenderer,
}

impl EmailChannel {
    pub fn new(config: &Config, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            sender: config.email_credentials().map(|(user, _)| user.to_string()),
            recipient: config.target_email.clone(),
            renderer: MessageRenderer::new(config),
        }
    }

    pub fn compose(&self, sender: &str, request: &NotificationRequest) -> OutgoingEmail {
        let mut attachments = Vec::new();

        if let Some(photo) = request.photo() {
            attachments.push(AttachmentRef {
                filename: format!("photo_{}.jpg", request.request_id),
                url: self.renderer.media_url(photo),
                content_type: "image/jpeg",
            });
        }

        if let Some(audio) = request.audio() {
            attachments.push(AttachmentRef {
                filename: format!("audio_{}.wav", request.request_id),
                url: self.renderer.media_url(audio),
                content_type: "audio/wav",
            });
        }

        OutgoingEmail {
            from: sender.to_string(),
            to: self.recipient.clone(),
            subject: email_subject(request),
            html: self.renderer.render_email_html(request),
            attachments,
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    fn is_configured(&self) -> bool {
        self.sender.is_some()
    }

    async fn send(&self, request: &NotificationRequest) -> Result<ChannelDelivery, ChannelError> {
        let sender = self
            .sender
            .as_deref()
            .ok_or_else(|| ChannelError::not_configured(CHANNEL))?;

        let email = self.compose(sender, request);

        debug!(
            request_id = %request.request_id,
            attachments = email.attachments.len(),
            "Sending notification email"
        );

        self.transport
            .send(email)
            .await
            .map_err(|e| ChannelError::transport(CHANNEL, format!("{:#}", e)))?;

        info!(request_id = %request.request_id, "Notification email sent");

        Ok(ChannelDelivery::delivered(DispatchMethod::Email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::RequestKind;

    struct NoopTransport;

    #[async_trait]
    impl MailTransport for NoopTransport {
        async fn send(&self, _email: OutgoingEmail) -> Result<(), Error> {
            Ok(())
        }
    }

    fn channel(vars: &[(&str, &str)]) -> EmailChannel {
        let config = Config::from_vars(vars.iter().copied()).unwrap();
        EmailChannel::new(&config, Arc::new(NoopTransport))
    }

    #[test]
    fn configured_only_with_both_credentials() {
        assert!(!channel(&[]).is_configured());
        assert!(!channel(&[("EMAIL_USER", "staff@example.com")]).is_configured());
        assert!(
            channel(&[("EMAIL_USER", "staff@example.com"), ("EMAIL_PASS", "pw")]).is_configured()
        );
    }

    #[test]
    fn attachments_are_named_after_the_request() {
        let channel = channel(&[("APP_URL", "https://ebf.example")]);
        let request = NotificationRequest::new("Jean", "+225", RequestKind::Audio, "d", "abc123")
            .with_photo("/uploads/photos/p.jpg")
            .with_audio("https://cdn.example/a.wav");

        let email = channel.compose("staff@example.com", &request);

        assert_eq!(email.subject, "🆕 NOUVELLE DEMANDE - Jean");
        assert_eq!(email.to, "ebfbouake@gmail.com");
        assert_eq!(
            email.attachments,
            vec![
                AttachmentRef {
                    filename: "photo_abc123.jpg".to_string(),
                    url: "https://ebf.example/uploads/photos/p.jpg".to_string(),
                    content_type: "image/jpeg",
                },
                AttachmentRef {
                    filename: "audio_abc123.wav".to_string(),
                    url: "https://cdn.example/a.wav".to_string(),
                    content_type: "audio/wav",
                },
            ]
        );
    }

    #[test]
    fn only_port_465_uses_implicit_tls() {
        assert!(uses_implicit_tls(465));
        assert!(!uses_implicit_tls(587));
        assert!(!uses_implicit_tls(25));
    }

    #[tokio::test]
    async fn smtp_transport_builds_for_starttls_port() {
        let config = Config::from_vars([("SMTP_PORT", "587")]).unwrap();
        assert!(SmtpMailTransport::new(&config, Client::new()).is_ok());
    }

    #[test]
    fn no_attachments_without_media() {
        let request = NotificationRequest::new("Jean", "+225", RequestKind::Text, "d", "abc123");
        let email = channel(&[]).compose("staff@example.com", &request);
        assert!(email.attachments.is_empty());
    }
}
