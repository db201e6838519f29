use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{Local, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    clients::email::SmtpMailTransport,
    config::Config,
    dispatcher::NotificationDispatcher,
    models::{
        health::{ConfigurationReport, HealthCheckResponse, HealthStatus},
        outcome::DispatchOutcome,
        request::{NotificationRequest, RequestKind, parse_position},
        response::ApiResponse,
    },
};

pub struct AppState {
    pub config: Config,
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: NotificationDispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Wires the production channels: reqwest for HTTP back-ends, SMTP
    /// for email.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        let mail_transport = Arc::new(SmtpMailTransport::new(&config, http_client.clone())?);
        let dispatcher = NotificationDispatcher::from_config(&config, http_client, mail_transport);

        Ok(Self::new(config, dispatcher))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/notifications/config", get(configuration_status))
        .route("/api/notifications/test", post(send_test_notification))
        .route("/api/requests", post(create_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = Arc::new(AppState::from_config(config)?);

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn today() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let channels = state.config.channel_status();

    let status = if channels.any_in_chain() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthCheckResponse {
        status,
        timestamp: Utc::now(),
        channels,
    })
}

async fn configuration_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = ConfigurationReport {
        config: state.config.channel_status(),
        instructions: state.config.setup_instructions(),
    };

    Json(ApiResponse::success(
        report,
        "Configuration des notifications".to_string(),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestNotificationBody {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<RequestKind>,
    pub description: Option<String>,
    pub transcription: Option<String>,
    pub audio_url: Option<String>,
    pub photo_url: Option<String>,
    pub request_date: Option<String>,
    pub request_id: Option<String>,
}

impl TestNotificationBody {
    pub fn into_request(self) -> NotificationRequest {
        let mut request = NotificationRequest::new(
            self.customer_name.unwrap_or_else(|| "Client Test".to_string()),
            self.customer_phone
                .unwrap_or_else(|| "+22500000000".to_string()),
            self.kind.unwrap_or(RequestKind::Text),
            self.request_date.unwrap_or_else(today),
            self.request_id
                .unwrap_or_else(|| format!("test-{}", Uuid::new_v4())),
        );

        if let Some(neighborhood) = self.neighborhood {
            request = request.with_neighborhood(neighborhood);
        }
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            request = request.with_coordinates(latitude, longitude);
        }
        if let Some(description) = self.description {
            request = request.with_description(description);
        }
        if let Some(transcription) = self.transcription {
            request = request.with_transcription(transcription);
        }
        if let Some(audio_url) = self.audio_url {
            request = request.with_audio(audio_url);
        }
        if let Some(photo_url) = self.photo_url {
            request = request.with_photo(photo_url);
        }

        request
    }
}

async fn send_test_notification(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TestNotificationBody>,
) -> Response {
    let request = body.into_request();

    info!(request_id = %request.request_id, "Sending test notification");

    let outcome = state.dispatcher.dispatch(&request).await;

    if outcome.success {
        let message = format!("Notification de test envoyée avec succès via {}", outcome.method);
        (StatusCode::OK, Json(ApiResponse::success(outcome, message))).into_response()
    } else {
        let error = outcome.error.clone().unwrap_or_default();
        let message = format!("Échec de l'envoi de la notification: {}", error);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(outcome, error, message)),
        )
            .into_response()
    }
}

/// Intake form as submitted by the public site, with uploads already
/// stored and referenced by URL.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub position: Option<String>,
    pub input_type: Option<String>,
    pub description: Option<String>,
    pub transcription: Option<String>,
    pub audio_url: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReceipt {
    pub request_id: String,
    pub notification: DispatchOutcome,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn bad_request(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            error.to_string(),
            "Demande invalide".to_string(),
        )),
    )
        .into_response()
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(form): Json<IntakeForm>,
) -> Response {
    let Some(name) = required(form.name) else {
        warn!("Intake rejected: missing name");
        return bad_request("Le nom est obligatoire");
    };
    let Some(phone) = required(form.phone) else {
        warn!("Intake rejected: missing phone");
        return bad_request("Le numéro de téléphone est obligatoire");
    };

    let kind = RequestKind::from_input_type(form.input_type.as_deref().unwrap_or("text"));
    let request_id = Uuid::new_v4().to_string();

    let mut request = NotificationRequest::new(name, phone, kind, today(), request_id.clone());

    if let Some(neighborhood) = required(form.neighborhood) {
        request = request.with_neighborhood(neighborhood);
    }
    if let Some(coordinates) = form.position.as_deref().and_then(parse_position) {
        request = request.with_coordinates(coordinates.latitude, coordinates.longitude);
    }
    if kind == RequestKind::Text {
        if let Some(description) = required(form.description) {
            request = request.with_description(description);
        }
    }
    if let Some(transcription) = required(form.transcription) {
        request = request.with_transcription(transcription);
    }
    if let Some(audio_url) = required(form.audio_url) {
        request = request.with_audio(audio_url);
    }
    if let Some(photo_url) = required(form.photo_url) {
        request = request.with_photo(photo_url);
    }

    info!(request_id = %request_id, kind = ?kind, "Service request received");

    let notification = state.dispatcher.dispatch(&request).await;

    if notification.success {
        info!(
            request_id = %request_id,
            method = %notification.method,
            "Staff notified of new request"
        );
    } else {
        error!(
            request_id = %request_id,
            method = %notification.method,
            error = ?notification.error,
            "Staff notification failed; request needs manual follow-up"
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            IntakeReceipt {
                request_id,
                notification,
            },
            "Demande reçue".to_string(),
        )),
    )
        .into_response()
}
