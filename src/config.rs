use std::{fmt, time::Duration};

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::health::ChannelStatus;

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub email_user: Option<String>,
    #[serde(default)]
    pub email_pass: Option<String>,
    #[serde(default = "default_target_email")]
    pub target_email: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub callmebot_api_key: Option<String>,
    #[serde(default = "default_callmebot_url")]
    pub callmebot_url: String,
    #[serde(default = "default_target_whatsapp_number")]
    pub target_whatsapp_number: String,
    #[serde(default)]
    pub link_fallback_enabled: bool,

    #[serde(default = "default_app_url")]
    pub app_url: String,
    #[serde(default = "default_maps_host")]
    pub maps_host: String,
    #[serde(default = "default_messaging_host")]
    pub messaging_host: String,
    #[serde(default = "default_business_name")]
    pub business_name: String,

    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_target_email() -> String {
    "ebfbouake@gmail.com".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_callmebot_url() -> String {
    "https://api.callmebot.com/whatsapp.php".to_string()
}

fn default_target_whatsapp_number() -> String {
    "22549615701".to_string()
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_maps_host() -> String {
    "www.google.com".to_string()
}

fn default_messaging_host() -> String {
    "wa.me".to_string()
}

fn default_business_name() -> String {
    "EBF Bouaké".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    10
}

fn default_server_port() -> u16 {
    3000
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    /// Builds a config from explicit `(NAME, value)` pairs instead of the
    /// process environment. Unset variables take their defaults.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<Vec<(String, String)>>();

        envy::from_iter::<_, Self>(pairs)
            .map_err(|e| anyhow!("Invalid configuration value: {}", e))
    }

    pub fn email_credentials(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.email_user)?, non_empty(&self.email_pass)?))
    }

    pub fn callmebot_api_key(&self) -> Option<&str> {
        non_empty(&self.callmebot_api_key)
    }

    /// Staff number in the digits-only form the messaging host expects.
    pub fn staff_number(&self) -> String {
        self.target_whatsapp_number.trim().trim_start_matches('+').to_string()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn channel_status(&self) -> ChannelStatus {
        ChannelStatus {
            email: self.email_credentials().is_some(),
            whatsapp_direct: self.callmebot_api_key().is_some(),
            whatsapp_link: true,
            whatsapp_link_in_chain: self.link_fallback_enabled,
        }
    }

    pub fn setup_instructions(&self) -> String {
        let status = self.channel_status();
        let mut instructions = String::from("Configuration des services de notification:\n\n");

        if !status.email {
            instructions.push_str("📧 Email (non configuré) - méthode principale:\n");
            instructions.push_str("1. Utiliser un compte Gmail avec un mot de passe d'application\n");
            instructions.push_str("2. Configurer les variables d'environnement:\n");
            instructions.push_str("   - EMAIL_USER=your_email@gmail.com\n");
            instructions.push_str("   - EMAIL_PASS=your_app_password\n");
            instructions.push_str("   - TARGET_EMAIL=target_email@example.com\n\n");
        }

        if !status.whatsapp_direct {
            instructions.push_str("📱 Envoi direct WhatsApp (non configuré):\n");
            instructions.push_str("1. Obtenir une clé API sur https://callmebot.com\n");
            instructions.push_str("2. Configurer les variables d'environnement:\n");
            instructions.push_str("   - CALLMEBOT_API_KEY=votre_clé_api\n");
            instructions.push_str("   - TARGET_WHATSAPP_NUMBER=22549615701\n\n");
        }

        instructions.push_str("🔗 Lien WhatsApp (toujours disponible):\n");
        instructions.push_str(
            "Cette méthode nécessite l'ouverture manuelle de WhatsApp. \
             Activer LINK_FALLBACK_ENABLED=true pour l'utiliser en dernier recours.\n\n",
        );

        instructions.push_str("Pour tester la configuration: POST /api/notifications/test");

        instructions
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("email_user", &self.email_user)
            .field("email_pass", &self.email_pass.as_ref().map(|_| "<redacted>"))
            .field("target_email", &self.target_email)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field(
                "callmebot_api_key",
                &self.callmebot_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("callmebot_url", &self.callmebot_url)
            .field("target_whatsapp_number", &self.target_whatsapp_number)
            .field("link_fallback_enabled", &self.link_fallback_enabled)
            .field("app_url", &self.app_url)
            .field("maps_host", &self.maps_host)
            .field("messaging_host", &self.messaging_host)
            .field("business_name", &self.business_name)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("server_port", &self.server_port)
            .finish()
    }
}
