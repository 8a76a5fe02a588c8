//! Newsletter subscriptions, held in memory for the life of the process.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::state::{AppState, Subscriptions};

pub const STATUS_SUBSCRIBED: &str = "subscribed";

#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionUpdate {
    pub email: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionMessage {
    pub message: &'static str,
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    if !email.contains('@') {
        return Err(AppError::Validation(format!("Invalid email address '{email}'")));
    }
    Ok(email.to_string())
}

pub async fn subscribe(subscriptions: &Subscriptions, email: &str) -> Result<(), AppError> {
    let email = normalize_email(email)?;
    subscriptions
        .write()
        .await
        .insert(email.clone(), STATUS_SUBSCRIBED.to_string());
    info!("Subscribed {email}");
    Ok(())
}

pub async fn update(subscriptions: &Subscriptions, email: &str, status: &str) -> Result<(), AppError> {
    let email = normalize_email(email)?;
    let mut map = subscriptions.write().await;
    let entry = map
        .get_mut(&email)
        .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;
    *entry = status.to_string();
    Ok(())
}

/// POST /api/subscribe
pub async fn handle_subscribe(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SubscriptionRequest>,
) -> Result<Json<SubscriptionMessage>, AppError> {
    subscribe(&state.subscriptions, &req.email).await?;
    Ok(Json(SubscriptionMessage {
        message: "Subscription successful",
    }))
}

/// PUT /api/subscribe
pub async fn handle_update(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SubscriptionUpdate>,
) -> Result<Json<SubscriptionMessage>, AppError> {
    update(&state.subscriptions, &req.email, &req.status).await?;
    Ok(Json(SubscriptionMessage {
        message: "Subscription updated successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_then_update() {
        let subs = Subscriptions::default();
        subscribe(&subs, " ada@example.com ").await.unwrap();
        assert_eq!(subs.read().await["ada@example.com"], STATUS_SUBSCRIBED);

        update(&subs, "ada@example.com", "unsubscribed").await.unwrap();
        assert_eq!(subs.read().await["ada@example.com"], "unsubscribed");
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let subs = Subscriptions::default();
        let err = update(&subs, "nobody@example.com", "x").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_email_without_at_rejected() {
        let subs = Subscriptions::default();
        assert!(matches!(
            subscribe(&subs, "not-an-email").await,
            Err(AppError::Validation(_))
        ));
        assert!(subs.read().await.is_empty());
    }
}
