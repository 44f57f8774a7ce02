//! Google Drive push notification handlers
//!
//! `x-goog-channel-id` is logged but not checked against a registered
//! channel, so any caller can trigger extraction of arbitrary file ids.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use paperlens_common::errors::{AppError, Result};

const RESOURCE_STATE_HEADER: &str = "x-goog-resource-state";
const CHANNEL_ID_HEADER: &str = "x-goog-channel-id";
const RESOURCE_ID_HEADER: &str = "x-goog-resource-id";

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub challenge: Option<String>,
    pub verification_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub challenge: Option<String>,
}

/// Notification body; only the changed file ids are used
#[derive(Debug, Default, Deserialize)]
pub struct ChangeNotification {
    #[serde(default)]
    pub changed: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded_files: Option<usize>,
}

impl NotificationResponse {
    fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            processed_files: None,
            succeeded_files: None,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Echo the challenge when the verification token matches
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<ChallengeResponse>> {
    if query.verification_token.as_deref() != Some(state.config.webhook.verification_token.as_str()) {
        return Err(AppError::Forbidden {
            message: "Invalid verification token".to_string(),
        });
    }

    tracing::info!("Drive webhook verified");

    Ok(Json(ChallengeResponse {
        challenge: query.challenge,
    }))
}

/// Handle a change notification by extracting every changed file
///
/// Extracted records are only logged; saving stays an explicit user action.
pub async fn notify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<NotificationResponse>> {
    let resource_state = header_str(&headers, RESOURCE_STATE_HEADER);

    if resource_state == Some("sync") {
        tracing::info!("Drive webhook sync received");
        return Ok(Json(NotificationResponse::message("Sync received")));
    }

    let notification: ChangeNotification = if body.is_empty() {
        ChangeNotification::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidFormat {
            message: format!("Invalid notification body: {}", e),
        })?
    };

    tracing::info!(
        channel_id = header_str(&headers, CHANNEL_ID_HEADER).unwrap_or_default(),
        resource_id = header_str(&headers, RESOURCE_ID_HEADER).unwrap_or_default(),
        resource_state = resource_state.unwrap_or_default(),
        changed = notification.changed.len(),
        "Drive webhook notification"
    );

    if notification.changed.is_empty() {
        return Ok(Json(NotificationResponse::message("No files to process")));
    }

    let outcome = state.trigger.process(&notification.changed).await;

    Ok(Json(NotificationResponse {
        message: "Webhook processed successfully".to_string(),
        processed_files: Some(outcome.total),
        succeeded_files: Some(outcome.succeeded),
    }))
}
