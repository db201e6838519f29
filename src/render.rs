//! Staff-facing message formatting.
//!
//! Every function here is pure: the same request and config always render
//! to the same bytes.

use crate::{
    config::Config,
    models::request::{NotificationRequest, RequestKind},
};

const NEW_REQUEST_EMOJI: &str = "🆕";
const STATUS_LABEL: &str = "Nouveau";
const UNKNOWN_NEIGHBORHOOD: &str = "Non spécifié";
const CALL_TO_ACTION: &str = "💡 Contactez le client rapidement pour planifier le diagnostic gratuit!";

#[derive(Debug, Clone)]
pub struct MessageRenderer {
    app_url: String,
    maps_host: String,
    business_name: String,
}

impl MessageRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            app_url: config.app_url.trim_end_matches('/').to_string(),
            maps_host: config.maps_host.clone(),
            business_name: config.business_name.clone(),
        }
    }

    /// Maps link for the request, present only when coordinates are known.
    /// A link supplied upstream wins over the one derived here.
    pub fn maps_link(&self, request: &NotificationRequest) -> Option<String> {
        let coordinates = request.coordinates?;

        match &request.maps_link {
            Some(link) => Some(link.clone()),
            None => Some(format!(
                "https://{}/maps?q={:.6},{:.6}",
                self.maps_host, coordinates.latitude, coordinates.longitude
            )),
        }
    }

    /// Absolute URL for a stored upload; references that are already
    /// absolute pass through.
    pub fn media_url(&self, reference: &str) -> String {
        if reference.starts_with("http") {
            reference.to_string()
        } else if reference.starts_with('/') {
            format!("{}{}", self.app_url, reference)
        } else {
            format!("{}/{}", self.app_url, reference)
        }
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/dashboard", self.app_url)
    }

    fn header(&self) -> String {
        format!(
            "{emoji} NOUVELLE DEMANDE {} {emoji}",
            self.business_name.to_uppercase(),
            emoji = NEW_REQUEST_EMOJI
        )
    }

    /// Plain-text body used by the messaging channels.
    pub fn render_text(&self, request: &NotificationRequest) -> String {
        let mut message = format!("{}\n\n", self.header());

        message.push_str(&format!("📞 Client: {}\n", request.customer_name));
        message.push_str(&format!("📱 Téléphone: {}\n", request.customer_phone));
        message.push_str(&format!(
            "📍 Quartier: {}\n",
            neighborhood_or_default(request)
        ));

        if let Some(maps_link) = self.maps_link(request) {
            message.push_str(&format!("🗺️ Position GPS: {}\n", maps_link));
        }

        message.push_str(&format!("📅 Date: {}\n", request.submitted_at));
        message.push_str(&format!("📝 Type: {}\n", request.kind.label()));
        message.push_str(&format!("🔍 Statut: {}\n\n", STATUS_LABEL));

        if let Some(text) = request.problem_text() {
            let heading = match request.kind {
                RequestKind::Text => "📄 Description",
                RequestKind::Audio => "📝 Transcription",
            };
            message.push_str(&format!("{}:\n{}\n\n", heading, text));
        }

        let photo = request.photo();
        let audio = request.audio();

        if let Some(photo) = photo {
            message.push_str(&format!("📷 Photo: {}\n", self.media_url(photo)));
        }
        if let Some(audio) = audio {
            message.push_str(&format!("🎵 Message audio: {}\n", self.media_url(audio)));
        }
        if photo.is_some() || audio.is_some() {
            message.push('\n');
        }

        message.push_str(&format!("🔗 Gérer la demande: {}\n\n", self.dashboard_url()));
        message.push_str(CALL_TO_ACTION);

        message
    }

    /// HTML body for the email channel.
    pub fn render_email_html(&self, request: &NotificationRequest) -> String {
        let mut html = format!(
            r#"<h2 style="color: #1f2937; font-family: Arial, sans-serif;">{}</h2>
<table style="border-collapse: collapse; width: 100%; font-family: Arial, sans-serif; border: 1px solid #e5e7eb;">
"#,
            escape_html(&self.header())
        );

        html.push_str(&table_row("📞 Client:", &escape_html(&request.customer_name)));
        html.push_str(&table_row(
            "📱 Téléphone:",
            &escape_html(&request.customer_phone),
        ));
        html.push_str(&table_row(
            "📍 Quartier:",
            &escape_html(neighborhood_or_default(request)),
        ));

        if let Some(maps_link) = self.maps_link(request) {
            html.push_str(&table_row(
                "🗺️ Position GPS:",
                &format!(
                    r#"<a href="{}" style="color: #2563eb; text-decoration: none; font-weight: 500;">📍 Voir sur Google Maps</a>"#,
                    escape_html(&maps_link)
                ),
            ));
        }

        html.push_str(&table_row("📅 Date:", &escape_html(&request.submitted_at)));
        html.push_str(&table_row("📝 Type:", request.kind.label()));
        html.push_str(&table_row(
            "🔍 Statut:",
            &format!(
                r#"<span style="background-color: #fef3c7; color: #92400e; padding: 4px 8px; border-radius: 4px; font-size: 12px; font-weight: bold;">{}</span>"#,
                STATUS_LABEL
            ),
        ));
        html.push_str("</table>\n");

        if let Some(text) = request.problem_text() {
            let (heading, background, border, color) = match request.kind {
                RequestKind::Text => ("📄 Description:", "#f8fafc", "#3b82f6", "#1e40af"),
                RequestKind::Audio => ("📝 Transcription:", "#fefce8", "#eab308", "#a16207"),
            };
            html.push_str(&format!(
                r#"<div style="margin-top: 20px; padding: 15px; background-color: {background}; border-left: 4px solid {border}; border-radius: 4px;">
<h3 style="color: {color}; margin-top: 0; font-family: Arial, sans-serif;">{heading}</h3>
<p style="color: #374151; line-height: 1.6; margin-bottom: 0; font-family: Arial, sans-serif;">{}</p>
</div>
"#,
                escape_html(text).replace('\n', "<br>")
            ));
        }

        let photo = request.photo();
        let audio = request.audio();
        if photo.is_some() || audio.is_some() {
            html.push_str(r#"<ul style="font-family: Arial, sans-serif; color: #374151;">"#);
            if let Some(photo) = photo {
                html.push_str(&media_item("📷 Photo", &self.media_url(photo)));
            }
            if let Some(audio) = audio {
                html.push_str(&media_item("🎵 Message audio", &self.media_url(audio)));
            }
            html.push_str("</ul>\n");
        }

        html.push_str(&format!(
            r#"<div style="margin-top: 25px; padding: 20px; background-color: #eff6ff; border-radius: 8px; text-align: center; border: 1px solid #dbeafe;">
<p style="margin: 0 0 10px 0; font-weight: bold; color: #1e40af; font-family: Arial, sans-serif;">🔗 Gérer la demande:</p>
<a href="{}" style="display: inline-block; background-color: #3b82f6; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; font-weight: bold; font-family: Arial, sans-serif;">Accéder au tableau de bord</a>
</div>
<div style="margin-top: 20px; padding: 15px; background-color: #f0fdf4; border-radius: 8px; border: 1px solid #bbf7d0;">
<p style="margin: 0; color: #166534; font-style: italic; font-family: Arial, sans-serif;">{}</p>
</div>
<div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; text-align: center; color: #6b7280; font-size: 12px; font-family: Arial, sans-serif;">
<p style="margin: 0;">Email envoyé automatiquement par {} - demande du {}</p>
</div>
"#,
            escape_html(&self.dashboard_url()),
            CALL_TO_ACTION,
            escape_html(&self.business_name),
            escape_html(&request.submitted_at)
        ));

        html
    }
}

pub fn email_subject(request: &NotificationRequest) -> String {
    format!(
        "{} NOUVELLE DEMANDE - {}",
        NEW_REQUEST_EMOJI, request.customer_name
    )
}

/// Pre-filled link that opens the messaging app on the staff number.
pub fn deep_link(messaging_host: &str, target_number: &str, message: &str) -> String {
    format!(
        "https://{}/{}?text={}",
        messaging_host,
        target_number,
        urlencoding::encode(message)
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn neighborhood_or_default(request: &NotificationRequest) -> &str {
    request
        .neighborhood
        .as_deref()
        .filter(|neighborhood| !neighborhood.trim().is_empty())
        .unwrap_or(UNKNOWN_NEIGHBORHOOD)
}

fn table_row(label: &str, value: &str) -> String {
    format!(
        r#"<tr>
<td style="padding: 12px; border: 1px solid #d1d5db; font-weight: bold; color: #374151;">{}</td>
<td style="padding: 12px; border: 1px solid #d1d5db; color: #1f2937;">{}</td>
</tr>
"#,
        label, value
    )
}

fn media_item(label: &str, url: &str) -> String {
    let url = escape_html(url);
    format!(r#"<li>{}: <a href="{url}">{url}</a></li>"#, label)
}
