//! Stripe PaymentIntents client.
//!
//! Creates one PaymentIntent per checkout session. The browser confirms the
//! intent with the returned client secret; capture happens outside checkout.
//!
//! # API Reference
//!
//! - Base URL: `https://api.stripe.com/v1`
//! - Authentication: secret key via `Authorization: Bearer <key>`
//! - Request bodies are form-encoded

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::payment::{AuthorizationRequest, PaymentAuthorization, PaymentProcessor};
use crate::error::PaymentError;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Payment processor backed by Stripe PaymentIntents.
#[derive(Clone)]
pub struct StripePaymentProcessor {
    inner: Arc<StripeInner>,
}

struct StripeInner {
    client: reqwest::Client,
    base_url: String,
}

impl StripePaymentProcessor {
    /// Creates a client for the live Stripe API.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(secret_key: &SecretString) -> Result<Self, PaymentError> {
        Self::with_base_url(secret_key, BASE_URL)
    }

    /// Creates a client against another base URL, such as a local mock.
    pub fn with_base_url(
        secret_key: &SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", secret_key.expose_secret()))
                .map_err(|e| PaymentError::Parse(format!("Invalid secret key format: {e}")))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(StripeInner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    async fn parse_error(response: reqwest::Response) -> PaymentError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => {
                let message = body
                    .error
                    .message
                    .or(body.error.code.clone())
                    .unwrap_or_else(|| "unknown error".to_string());
                if status == 402 || body.error.kind.as_deref() == Some("card_error") {
                    PaymentError::Declined(body.error.code.unwrap_or(message))
                } else {
                    PaymentError::Api { status, message }
                }
            }
            Err(_) => PaymentError::Api {
                status,
                message: text,
            },
        }
    }
}

/// Builds the form fields of a PaymentIntent creation request.
fn intent_form(request: &AuthorizationRequest) -> Vec<(&'static str, String)> {
    vec![
        ("amount", request.amount.cents().to_string()),
        ("currency", request.currency.clone()),
        ("automatic_payment_methods[enabled]", "true".to_string()),
        (
            "metadata[orderNumber]",
            request.metadata.order_number.to_string(),
        ),
        ("metadata[userId]", request.metadata.user_id.to_string()),
        (
            "metadata[shippingMode]",
            request.metadata.shipping_mode.as_str().to_string(),
        ),
    ]
}

#[async_trait]
impl PaymentProcessor for StripePaymentProcessor {
    #[tracing::instrument(skip(self, request), fields(order_number = %request.metadata.order_number))]
    async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let url = format!("{}/payment_intents", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .form(&intent_form(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(format!("Failed to parse response: {e}")))?;
        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Parse("PaymentIntent has no client_secret".to_string()))?;

        tracing::debug!(intent_id = %intent.id, "payment intent created");

        Ok(PaymentAuthorization {
            id: intent.id,
            client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Form;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use common::UserId;
    use domain::{Money, OrderNumber, ShippingMode};

    use super::*;
    use crate::services::payment::PaymentMetadata;

    fn request(cents: i64) -> AuthorizationRequest {
        AuthorizationRequest {
            amount: Money::from_cents(cents),
            currency: "eur".to_string(),
            metadata: PaymentMetadata {
                order_number: OrderNumber::parse("ORD-LOYW3V28-7QX2").unwrap(),
                user_id: UserId::new("u1").unwrap(),
                shipping_mode: ShippingMode::RelayPoint,
            },
        }
    }

    async fn create_intent(
        headers: AxumHeaders,
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer sk_test_123");
        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": { "type": "invalid_request_error", "message": "Invalid API Key provided" }
                })),
            );
        }
        if form.get("amount").map(String::as_str) == Some("402") {
            return (
                StatusCode::PAYMENT_REQUIRED,
                Json(serde_json::json!({
                    "error": { "type": "card_error", "code": "card_declined", "message": "Your card was declined." }
                })),
            );
        }
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": "pi_3Nabc",
                "client_secret": "pi_3Nabc_secret_xyz",
                "amount": form.get("amount").and_then(|a| a.parse::<i64>().ok()),
                "metadata": {
                    "orderNumber": form.get("metadata[orderNumber]"),
                    "shippingMode": form.get("metadata[shippingMode]"),
                },
            })),
        )
    }

    async fn mock_stripe() -> String {
        let app = Router::new().route("/v1/payment_intents", post(create_intent));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[test]
    fn test_intent_form_fields() {
        let form: HashMap<_, _> = intent_form(&request(9599)).into_iter().collect();
        assert_eq!(form["amount"], "9599");
        assert_eq!(form["currency"], "eur");
        assert_eq!(form["automatic_payment_methods[enabled]"], "true");
        assert_eq!(form["metadata[orderNumber]"], "ORD-LOYW3V28-7QX2");
        assert_eq!(form["metadata[userId]"], "u1");
        assert_eq!(form["metadata[shippingMode]"], "RELAY_POINT");
    }

    #[tokio::test]
    async fn test_authorize_creates_intent() {
        let base_url = mock_stripe().await;
        let key = SecretString::from("sk_test_123");
        let processor = StripePaymentProcessor::with_base_url(&key, base_url).unwrap();

        let auth = processor.authorize(request(9599)).await.unwrap();
        assert_eq!(auth.id, "pi_3Nabc");
        assert_eq!(auth.client_secret, "pi_3Nabc_secret_xyz");
    }

    #[tokio::test]
    async fn test_card_error_is_declined() {
        let base_url = mock_stripe().await;
        let key = SecretString::from("sk_test_123");
        let processor = StripePaymentProcessor::with_base_url(&key, base_url).unwrap();

        let result = processor.authorize(request(402)).await;
        assert!(matches!(result, Err(PaymentError::Declined(code)) if code == "card_declined"));
    }

    #[tokio::test]
    async fn test_bad_key_is_api_error() {
        let base_url = mock_stripe().await;
        let key = SecretString::from("sk_test_wrong");
        let processor = StripePaymentProcessor::with_base_url(&key, base_url).unwrap();

        let result = processor.authorize(request(100)).await;
        assert!(matches!(result, Err(PaymentError::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_processor_is_http_error() {
        let key = SecretString::from("sk_test_123");
        let processor =
            StripePaymentProcessor::with_base_url(&key, "http://127.0.0.1:1/v1").unwrap();

        let result = processor.authorize(request(100)).await;
        assert!(matches!(result, Err(PaymentError::Http(_))));
    }
}
