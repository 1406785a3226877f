//! Checkout session endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::identity::MaybeIdentity;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub client_secret: String,
    pub order_id: String,
}

/// POST /checkout/create-session: authorize the payment and create the
/// pending order.
///
/// The body is taken raw so that anonymous callers are rejected before it is
/// parsed.
#[tracing::instrument(skip_all)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    MaybeIdentity(identity): MaybeIdentity,
    body: Bytes,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let session = state
        .orchestrator
        .create_checkout_session(identity.as_ref(), &body)
        .await?;

    Ok(Json(CreateSessionResponse {
        client_secret: session.client_secret,
        order_id: session.order_id.to_string(),
    }))
}
