//! Payment processor trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::UserId;
use domain::{Money, OrderNumber, ShippingMode};
use rand::Rng;
use tokio::sync::RwLock;

use crate::error::PaymentError;

/// Tags attached to an authorization so it can be matched to its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMetadata {
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub shipping_mode: ShippingMode,
}

/// A request to hold funds for a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Amount in the minor currency unit.
    pub amount: Money,

    /// Lower-case ISO currency code.
    pub currency: String,
    pub metadata: PaymentMetadata,
}

/// Result of a successful payment authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAuthorization {
    /// The authorization ID assigned by the processor.
    pub id: String,

    /// Secret the browser uses to complete the payment.
    pub client_secret: String,
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Requests an authorization for the given amount.
    async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError>;
}

#[async_trait]
impl<T: PaymentProcessor + ?Sized> PaymentProcessor for Arc<T> {
    async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError> {
        (**self).authorize(request).await
    }
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    authorizations: Vec<(PaymentAuthorization, AuthorizationRequest)>,
    next_id: u32,
}

/// In-memory payment processor for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentProcessor {
    state: Arc<RwLock<InMemoryPaymentState>>,
    fail_on_authorize: Arc<AtomicBool>,
}

impl InMemoryPaymentProcessor {
    /// Creates a new in-memory payment processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the processor to decline authorizations.
    pub fn set_fail_on_authorize(&self, fail: bool) {
        self.fail_on_authorize.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of authorizations granted.
    pub async fn authorization_count(&self) -> usize {
        self.state.read().await.authorizations.len()
    }

    /// Returns the granted authorization requests in order.
    pub async fn authorized_requests(&self) -> Vec<AuthorizationRequest> {
        self.state
            .read()
            .await
            .authorizations
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Returns true if an authorization exists with the given ID.
    pub async fn has_authorization(&self, id: &str) -> bool {
        self.state
            .read()
            .await
            .authorizations
            .iter()
            .any(|(auth, _)| auth.id == id)
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryPaymentProcessor {
    async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError> {
        if self.fail_on_authorize.load(Ordering::SeqCst) {
            return Err(PaymentError::Declined("card_declined".to_string()));
        }

        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = format!("pi_{:04}", state.next_id);
        let secret: u64 = rand::rng().random();
        let authorization = PaymentAuthorization {
            client_secret: format!("{id}_secret_{secret:016x}"),
            id,
        };
        state
            .authorizations
            .push((authorization.clone(), request));

        Ok(authorization)
    }
}
