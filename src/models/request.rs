use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestKind {
    Text,
    Audio,
}

impl RequestKind {
    /// Label shown to staff in rendered messages.
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Text => "Texte",
            RequestKind::Audio => "Audio",
        }
    }

    pub fn from_input_type(input_type: &str) -> Self {
        if input_type.trim().eq_ignore_ascii_case("audio") {
            RequestKind::Audio
        } else {
            RequestKind::Text
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One customer submission, as handed to the dispatcher.
///
/// Built once by the intake layer and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub neighborhood: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Maps link computed upstream; used verbatim when coordinates are known.
    pub maps_link: Option<String>,
    pub kind: RequestKind,
    pub description: Option<String>,
    pub transcription: Option<String>,
    pub audio_reference: Option<String>,
    pub photo_reference: Option<String>,
    pub has_photo: bool,
    /// Already formatted for display.
    pub submitted_at: String,
    pub request_id: String,
}

impl NotificationRequest {
    pub fn new(
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
        kind: RequestKind,
        submitted_at: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
            neighborhood: None,
            coordinates: None,
            maps_link: None,
            kind,
            description: None,
            transcription: None,
            audio_reference: None,
            photo_reference: None,
            has_photo: false,
            submitted_at: submitted_at.into(),
            request_id: request_id.into(),
        }
    }

    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_maps_link(mut self, maps_link: impl Into<String>) -> Self {
        self.maps_link = Some(maps_link.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_transcription(mut self, transcription: impl Into<String>) -> Self {
        self.transcription = Some(transcription.into());
        self
    }

    pub fn with_audio(mut self, audio_reference: impl Into<String>) -> Self {
        self.audio_reference = Some(audio_reference.into());
        self
    }

    pub fn with_photo(mut self, photo_reference: impl Into<String>) -> Self {
        self.photo_reference = Some(photo_reference.into());
        self.has_photo = true;
        self
    }

    /// Text shown as the problem statement, depending on the request kind.
    pub fn problem_text(&self) -> Option<&str> {
        let text = match self.kind {
            RequestKind::Text => self.description.as_deref(),
            RequestKind::Audio => self.transcription.as_deref(),
        };
        text.filter(|text| !text.trim().is_empty())
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo_reference
            .as_deref()
            .filter(|reference| self.has_photo && !reference.is_empty())
    }

    pub fn audio(&self) -> Option<&str> {
        self.audio_reference
            .as_deref()
            .filter(|reference| !reference.is_empty())
    }
}

/// Parses the intake form's `"lat,lng"` position field.
pub fn parse_position(position: &str) -> Option<Coordinates> {
    let mut parts = position.split(',');
    let latitude = parts.next()?.trim().parse::<f64>().ok()?;
    let longitude = parts.next()?.trim().parse::<f64>().ok()?;

    if parts.next().is_some() || !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }

    Some(Coordinates {
        latitude,
        longitude,
    })
}
