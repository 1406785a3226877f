//! Request identity extractors.
//!
//! The storefront runs behind an authenticating gateway that forwards the
//! signed-in shopper as `x-user-id` and `x-user-email` headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use checkout::Identity;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

fn identity_from_parts(parts: &Parts) -> Option<Identity> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    };
    Identity::new(header(USER_ID_HEADER)?, header(USER_EMAIL_HEADER)?)
}

/// Extractor yielding the identity when present, never rejecting.
///
/// Used where the handler itself decides how to treat anonymous callers.
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(identity_from_parts(parts)))
    }
}

/// Extractor that requires a signed-in shopper.
///
/// Rejects with `401 UNAUTHENTICATED` when either header is missing or blank.
pub struct RequireIdentity(pub Identity);

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts)
            .map(RequireIdentity)
            .ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/cart");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_identity_from_headers() {
        let mut parts = parts(&[
            (USER_ID_HEADER, "user-42"),
            (USER_EMAIL_HEADER, "camille@example.com"),
        ]);

        let RequireIdentity(identity) = RequireIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(identity.user_id.as_str(), "user-42");
        assert_eq!(identity.email, "camille@example.com");
    }

    #[tokio::test]
    async fn test_missing_email_is_anonymous() {
        let mut parts = parts(&[(USER_ID_HEADER, "user-42")]);

        let MaybeIdentity(identity) = MaybeIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(identity.is_none());

        let result = RequireIdentity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_blank_user_id_is_anonymous() {
        let mut parts = parts(&[
            (USER_ID_HEADER, "  "),
            (USER_EMAIL_HEADER, "camille@example.com"),
        ]);

        let MaybeIdentity(identity) = MaybeIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(identity.is_none());
    }
}
