use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::payments::gateway::amount_to_cents;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub title: String,
    pub amount: f64,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub status: String,
}

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/payment", post(charge))
}

#[instrument(skip(state, payload))]
pub async fn charge(
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let description = format!("Payment for: {}", payload.title);
    let status = state
        .payments
        .charge(amount_to_cents(payload.amount), &description, &payload.token)
        .await
        .map_err(|e| ApiError::Gateway(e.to_string()))?;

    info!(status = %status, "payment charged");
    Ok(Json(PaymentResponse { status }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_response_serialization() {
        let json = serde_json::to_string(&PaymentResponse {
            status: "succeeded".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"succeeded"}"#);
    }
}
