//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CartServiceError, CheckoutError};
use domain::{CartError, FieldError};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No identity on a route that requires one.
    Unauthenticated,
    /// Bad request from the client.
    BadRequest {
        message: String,
        details: Vec<FieldError>,
    },
    /// Checkout session failure.
    Checkout(CheckoutError),
    /// Cart maintenance failure.
    Cart(CartServiceError),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_number: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldError>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
            retryable: None,
            order_number: None,
            details: Vec::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Authentication required", "UNAUTHENTICATED"),
            ),
            ApiError::BadRequest { message, details } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    details,
                    ..ErrorBody::new(message, "BAD_REQUEST")
                },
            ),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Cart(err) => cart_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, ErrorBody) {
    let code = err.code();
    let retryable = Some(err.is_retryable());

    match &err {
        CheckoutError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("Authentication required", code),
        ),
        CheckoutError::InvalidBody(validation) => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                retryable,
                details: validation.field_errors().to_vec(),
                ..ErrorBody::new(validation.to_string(), code)
            },
        ),
        CheckoutError::EmptyCart => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                retryable,
                ..ErrorBody::new("Your cart is empty", code)
            },
        ),
        CheckoutError::PaymentAuthorizationFailed { .. } => {
            tracing::error!(error = %err, "checkout payment authorization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    retryable,
                    ..ErrorBody::new(
                        "Payment could not be authorized. Please try again.",
                        code,
                    )
                },
            )
        }
        CheckoutError::OrderPersistenceFailed { order_number, .. } => {
            tracing::error!(error = %err, "checkout order persistence failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    retryable,
                    order_number: Some(order_number.to_string()),
                    ..ErrorBody::new(
                        format!(
                            "Your payment was authorized but the order could not be recorded. \
                             Please contact support with order number {order_number}."
                        ),
                        code,
                    )
                },
            )
        }
    }
}

fn cart_error_to_response(err: CartServiceError) -> (StatusCode, ErrorBody) {
    match &err {
        CartServiceError::Cart(CartError::ItemNotFound { .. }) => (
            StatusCode::NOT_FOUND,
            ErrorBody::new(err.to_string(), "ITEM_NOT_FOUND"),
        ),
        CartServiceError::Cart(_) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new(err.to_string(), "INVALID_CART_ITEM"),
        ),
        CartServiceError::Store(_) => {
            tracing::error!(error = %err, "cart store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Cart is temporarily unavailable", "CART_STORE_ERROR"),
            )
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<CartServiceError> for ApiError {
    fn from(err: CartServiceError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(CartServiceError::Cart(err))
    }
}
