use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use request_notifier::{
    clients::{
        NotificationChannel,
        email::{MailTransport, OutgoingEmail},
    },
    config::Config,
    error::ChannelError,
    models::{
        outcome::{ChannelDelivery, DispatchMethod},
        request::{NotificationRequest, RequestKind},
    },
};

/// Mail transport that records every email and optionally fails.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failure: Option<String>,
}

impl RecordingTransport {
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(message.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: OutgoingEmail) -> Result<(), Error> {
        self.sent.lock().unwrap().push(email);

        match &self.failure {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

/// Scripted channel for ordering tests.
pub struct StubChannel {
    pub name: &'static str,
    pub configured: bool,
    pub result: Result<DispatchMethod, String>,
    pub attempts: Arc<AtomicU32>,
}

impl StubChannel {
    pub fn new(
        name: &'static str,
        configured: bool,
        result: Result<DispatchMethod, String>,
    ) -> (Self, Arc<AtomicU32>) {
        let attempts = Arc::new(AtomicU32::new(0));
        (
            Self {
                name,
                configured,
                result,
                attempts: Arc::clone(&attempts),
            },
            attempts,
        )
    }
}

#[async_trait]
impl NotificationChannel for StubChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, _request: &NotificationRequest) -> Result<ChannelDelivery, ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match &self.result {
            Ok(method) => Ok(ChannelDelivery::delivered(*method)),
            Err(message) => Err(ChannelError::transport(self.name, message.clone())),
        }
    }
}

pub fn config(vars: &[(&str, &str)]) -> Config {
    Config::from_vars(vars.iter().copied()).expect("test config")
}

pub fn email_vars() -> Vec<(&'static str, &'static str)> {
    vec![
        ("EMAIL_USER", "staff@example.com"),
        ("EMAIL_PASS", "app-password"),
        ("TARGET_EMAIL", "office@example.com"),
        ("APP_URL", "https://ebf.example"),
    ]
}

pub fn jean_request() -> NotificationRequest {
    NotificationRequest::new(
        "Jean",
        "+2250700000000",
        RequestKind::Text,
        "19/10/2026",
        "req-jean",
    )
    .with_neighborhood("Zone 4")
    .with_description("Circuit breaker trips")
}
