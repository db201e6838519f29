use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::DateTime;
use reqwest::Client;
use request_notifier::{
    api::{AppState, router},
    dispatcher::NotificationDispatcher,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::support::{RecordingTransport, config, email_vars};

fn app(vars: &[(&str, &str)], transport: &RecordingTransport) -> Router {
    let config = config(vars);
    let dispatcher =
        NotificationDispatcher::from_config(&config, Client::new(), Arc::new(transport.clone()));

    router(Arc::new(AppState::new(config, dispatcher)))
}

async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await?;

    Ok((status, serde_json::from_slice(&body)?))
}

fn post_json(uri: &str, body: Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?)
}

/// Test: Intake relays the form to the dispatcher
#[tokio::test]
async fn test_intake_dispatches_notification() -> Result<()> {
    let transport = RecordingTransport::default();
    let app = app(&email_vars(), &transport);

    let (status, body) = send(
        app,
        post_json(
            "/api/requests",
            json!({
                "name": "Jean",
                "phone": "+2250700000000",
                "neighborhood": "Zone 4",
                "position": "7.6934, -5.0354",
                "inputType": "text",
                "description": "Circuit breaker trips",
                "photoUrl": "/uploads/photos/1700000000-panel.jpg"
            }),
        )?,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["notification"]["success"], true);
    assert_eq!(body["data"]["notification"]["method"], "email");

    let request_id = body["data"]["requestId"].as_str().expect("request id");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("Zone 4"));
    assert!(sent[0].html.contains("Circuit breaker trips"));
    assert!(sent[0].html.contains("maps?q=7.693400,-5.035400"));
    assert_eq!(sent[0].attachments.len(), 1);
    assert_eq!(
        sent[0].attachments[0].filename,
        format!("photo_{}.jpg", request_id)
    );

    Ok(())
}

/// Test: Intake still succeeds for the submitter when notification fails
#[tokio::test]
async fn test_intake_succeeds_when_notification_fails() -> Result<()> {
    let transport = RecordingTransport::default();
    let app = app(&[], &transport);

    let (status, body) = send(
        app,
        post_json(
            "/api/requests",
            json!({ "name": "Jean", "phone": "+2250700000000", "inputType": "audio" }),
        )?,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["notification"]["success"], false);
    assert_eq!(body["data"]["notification"]["method"], "not-configured");

    Ok(())
}

/// Test: Intake rejects submissions without name or phone
#[tokio::test]
async fn test_intake_requires_name_and_phone() -> Result<()> {
    let transport = RecordingTransport::default();

    let (status, body) = send(
        app(&email_vars(), &transport),
        post_json("/api/requests", json!({ "phone": "+2250700000000" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Le nom est obligatoire");

    let (status, body) = send(
        app(&email_vars(), &transport),
        post_json("/api/requests", json!({ "name": "Jean", "phone": "  " }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le numéro de téléphone est obligatoire");

    assert!(transport.sent().is_empty(), "Rejected intake must not notify");

    Ok(())
}

/// Test: Test endpoint fills defaults and reports the method
#[tokio::test]
async fn test_test_notification_defaults() -> Result<()> {
    let transport = RecordingTransport::default();
    let app = app(&email_vars(), &transport);

    let (status, body) = send(app, post_json("/api/notifications/test", json!({}))?).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["method"], "email");

    let sent = transport.sent();
    assert_eq!(sent[0].subject, "🆕 NOUVELLE DEMANDE - Client Test");

    Ok(())
}

/// Test: Test endpoint surfaces a total failure as a server error
#[tokio::test]
async fn test_test_notification_failure_is_500() -> Result<()> {
    let transport = RecordingTransport::failing("smtp unreachable");
    let app = app(&email_vars(), &transport);

    let (status, body) = send(
        app,
        post_json(
            "/api/notifications/test",
            json!({ "customerName": "Awa", "type": "AUDIO", "transcription": "Sparking outlet" }),
        )?,
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["method"], "all-failed");
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("smtp unreachable")
    );

    Ok(())
}

/// Test: Configuration endpoint reflects the environment
#[tokio::test]
async fn test_configuration_status() -> Result<()> {
    let transport = RecordingTransport::default();
    let app = app(&email_vars(), &transport);

    let request = Request::builder()
        .uri("/api/notifications/config")
        .body(Body::empty())?;
    let (status, body) = send(app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["config"]["email"], true);
    assert_eq!(body["data"]["config"]["whatsappDirect"], false);
    assert_eq!(body["data"]["config"]["whatsappLink"], true);
    assert!(
        body["data"]["instructions"]
            .as_str()
            .unwrap_or_default()
            .contains("CALLMEBOT_API_KEY")
    );

    Ok(())
}

/// Test: Health reports degraded when nothing would be tried
#[tokio::test]
async fn test_health_check() -> Result<()> {
    let transport = RecordingTransport::default();

    let request = Request::builder().uri("/health").body(Body::empty())?;
    let (status, body) = send(app(&email_vars(), &transport), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    let timestamp = body["timestamp"].as_str().expect("timestamp");
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());

    let request = Request::builder().uri("/health").body(Body::empty())?;
    let (_, body) = send(app(&[], &transport), request).await?;
    assert_eq!(body["status"], "degraded");

    Ok(())
}
