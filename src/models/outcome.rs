use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMethod {
    WhatsappDirect,
    Email,
    WhatsappLink,
    AllFailed,
    NotConfigured,
}

impl DispatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMethod::WhatsappDirect => "whatsapp-direct",
            DispatchMethod::Email => "email",
            DispatchMethod::WhatsappLink => "whatsapp-link",
            DispatchMethod::AllFailed => "all-failed",
            DispatchMethod::NotConfigured => "not-configured",
        }
    }
}

impl Display for DispatchMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a successful channel actually delivered the message or only
/// prepared a link for staff to send by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryKind {
    Delivered,
    HandoffPrepared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDelivery {
    pub method: DispatchMethod,
    pub kind: DeliveryKind,
    pub link: Option<String>,
}

impl ChannelDelivery {
    pub fn delivered(method: DispatchMethod) -> Self {
        Self {
            method,
            kind: DeliveryKind::Delivered,
            link: None,
        }
    }

    pub fn handoff(link: String) -> Self {
        Self {
            method: DispatchMethod::WhatsappLink,
            kind: DeliveryKind::HandoffPrepared,
            link: Some(link),
        }
    }
}

pub const NOT_CONFIGURED_MESSAGE: &str = "no notification channel is configured";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub success: bool,
    pub method: DispatchMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeliveryKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_link: Option<String>,
}

impl DispatchOutcome {
    pub fn not_configured() -> Self {
        Self {
            success: false,
            method: DispatchMethod::NotConfigured,
            kind: None,
            error: Some(NOT_CONFIGURED_MESSAGE.to_string()),
            whatsapp_link: None,
        }
    }

    pub fn all_failed(error: String) -> Self {
        Self {
            success: false,
            method: DispatchMethod::AllFailed,
            kind: None,
            error: Some(error),
            whatsapp_link: None,
        }
    }
}

impl From<ChannelDelivery> for DispatchOutcome {
    fn from(delivery: ChannelDelivery) -> Self {
        Self {
            success: true,
            method: delivery.method,
            kind: Some(delivery.kind),
            error: None,
            whatsapp_link: delivery.link,
        }
    }
}
