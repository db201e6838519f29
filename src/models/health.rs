use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    pub email: bool,
    pub whatsapp_direct: bool,
    pub whatsapp_link: bool,
    pub whatsapp_link_in_chain: bool,
}

impl ChannelStatus {
    /// True when at least one channel would be tried by the dispatcher.
    pub fn any_in_chain(&self) -> bool {
        self.email || self.whatsapp_direct || self.whatsapp_link_in_chain
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub channels: ChannelStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationReport {
    pub config: ChannelStatus,
    pub instructions: String,
}
