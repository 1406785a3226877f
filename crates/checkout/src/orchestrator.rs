//! Checkout session orchestration.

use std::time::Instant;

use chrono::Utc;
use common::{CreatorId, OrderId, UserId};
use domain::{Cart, CartItem, CheckoutRequest, CheckoutTotals, NewOrder, OrderNumber};
use serde::Serialize;
use store::{CartStore, CreatorDirectory, OrderStore};
use tracing::field::Empty;

use crate::error::CheckoutError;
use crate::identity::Identity;
use crate::phase::CheckoutPhase;
use crate::services::payment::{AuthorizationRequest, PaymentMetadata, PaymentProcessor};

/// Default charge currency.
pub const DEFAULT_CURRENCY: &str = "eur";

/// Where the charged cart came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartSource {
    /// The user's stored cart.
    Stored,
    /// Items submitted with the request because the stored cart was empty
    /// or unreadable.
    ClientSnapshot,
}

/// Outcome of a successful checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Secret the browser uses to confirm the payment.
    pub client_secret: String,
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub totals: CheckoutTotals,
    pub phase: CheckoutPhase,
    pub cart_source: CartSource,

    /// False when the order was placed but the stored cart could not be
    /// emptied.
    pub cart_cleared: bool,
}

/// Creates checkout sessions: one payment authorization and one pending
/// order per call.
///
/// Each call is independent. A retry after failure generates a new order
/// number and requests a new authorization.
pub struct CheckoutOrchestrator<C, O, D, P>
where
    C: CartStore,
    O: OrderStore,
    D: CreatorDirectory,
    P: PaymentProcessor,
{
    carts: C,
    orders: O,
    creators: D,
    payments: P,
    currency: String,
}

impl<C, O, D, P> CheckoutOrchestrator<C, O, D, P>
where
    C: CartStore,
    O: OrderStore,
    D: CreatorDirectory,
    P: PaymentProcessor,
{
    /// Creates a new orchestrator charging in the default currency.
    pub fn new(carts: C, orders: O, creators: D, payments: P) -> Self {
        Self {
            carts,
            orders,
            creators,
            payments,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Sets the charge currency (lower-case ISO code).
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Runs one checkout attempt for the caller.
    ///
    /// `identity` is `None` for anonymous requests, which are rejected before
    /// the body is read.
    #[tracing::instrument(skip_all, fields(user_id = Empty, order_number = Empty))]
    pub async fn create_checkout_session(
        &self,
        identity: Option<&Identity>,
        body: &[u8],
    ) -> Result<CheckoutSession, CheckoutError> {
        metrics::counter!("checkout_sessions_total").increment(1);
        let start = Instant::now();

        let result = self.run(identity, body).await;

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        if let Err(e) = &result {
            metrics::counter!("checkout_sessions_failed_total", "reason" => e.reason())
                .increment(1);
            if e.phase().requires_reconciliation() {
                metrics::counter!("checkout_partial_failures_total").increment(1);
            }
        }
        result
    }

    async fn run(
        &self,
        identity: Option<&Identity>,
        body: &[u8],
    ) -> Result<CheckoutSession, CheckoutError> {
        // 1. Auth gate
        let identity = identity.ok_or(CheckoutError::Unauthenticated)?;
        let user_id = &identity.user_id;
        tracing::Span::current().record("user_id", user_id.as_str());

        // 2. Body validation
        let mut request = CheckoutRequest::parse(body)?;

        // 3. Cart resolution
        let snapshot = std::mem::take(&mut request.items);
        let (cart, cart_source) = self.resolve_cart(user_id, snapshot).await?;

        // 4. Totals, computed once for both the charge and the order
        let totals = CheckoutTotals::compute(&cart, &request.carrier)?;

        // 5. Creator attribution
        let creator_id = self.resolve_creator(&cart).await;

        // 6. Order number
        let order_number = OrderNumber::generate();
        tracing::Span::current().record("order_number", order_number.as_str());

        // 7. Payment authorization
        let authorization = self
            .payments
            .authorize(AuthorizationRequest {
                amount: totals.total,
                currency: self.currency.clone(),
                metadata: PaymentMetadata {
                    order_number: order_number.clone(),
                    user_id: user_id.clone(),
                    shipping_mode: request.shipping_mode,
                },
            })
            .await
            .map_err(|source| {
                tracing::warn!(error = %source, "payment authorization failed");
                CheckoutError::PaymentAuthorizationFailed {
                    order_number: order_number.clone(),
                    source,
                }
            })?;
        let mut phase = CheckoutPhase::Authorized;
        tracing::info!(
            authorization_id = %authorization.id,
            amount = totals.total.cents(),
            %phase,
            "payment authorized"
        );

        // 8. Order persistence
        let order = NewOrder::pending(
            order_number.clone(),
            creator_id,
            user_id.clone(),
            identity.email.as_str(),
            &request,
            &totals,
            authorization.id.as_str(),
        );
        let record = match self.orders.create(order).await {
            Ok(record) => record,
            Err(source) => {
                phase = CheckoutPhase::AuthorizedButUnpersisted;
                tracing::error!(
                    authorization_id = %authorization.id,
                    amount = totals.total.cents(),
                    %phase,
                    error = %source,
                    "order not persisted after payment authorization"
                );
                return Err(CheckoutError::OrderPersistenceFailed {
                    order_number,
                    authorization_id: authorization.id,
                    source,
                });
            }
        };
        phase = CheckoutPhase::Persisted;

        // 9. Cart clearing, best effort
        let cart_cleared = match self.carts.clear(user_id).await {
            Ok(()) => true,
            Err(e) => {
                metrics::counter!("checkout_cart_clear_failed_total").increment(1);
                tracing::warn!(
                    order_id = %record.id,
                    error = %e,
                    "cart not cleared after order creation"
                );
                false
            }
        };

        tracing::info!(order_id = %record.id, %phase, "checkout session created");

        Ok(CheckoutSession {
            client_secret: authorization.client_secret,
            order_id: record.id,
            order_number,
            totals,
            phase,
            cart_source,
            cart_cleared,
        })
    }

    /// Picks the stored cart when it has items, else the client snapshot.
    async fn resolve_cart(
        &self,
        user_id: &UserId,
        snapshot: Vec<CartItem>,
    ) -> Result<(Cart, CartSource), CheckoutError> {
        match self.carts.find_by_user(user_id).await {
            Ok(Some(cart)) if !cart.is_empty() => return Ok((cart, CartSource::Stored)),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "stored cart unreadable"),
        }

        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        metrics::counter!("checkout_cart_fallback_total").increment(1);
        tracing::info!(lines = snapshot.len(), "using client cart snapshot");
        Ok((
            Cart::restore(Some(user_id.clone()), snapshot, Utc::now()),
            CartSource::ClientSnapshot,
        ))
    }

    /// Attributes the order to the creator of the first line.
    async fn resolve_creator(&self, cart: &Cart) -> CreatorId {
        let Some(slug) = cart.items().first().map(CartItem::creator_slug) else {
            return CreatorId::unknown();
        };

        match self.creators.find_by_slug(slug).await {
            Ok(Some(creator_id)) => creator_id,
            Ok(None) => {
                tracing::warn!(slug, "creator not found");
                CreatorId::unknown()
            }
            Err(e) => {
                tracing::warn!(slug, error = %e, "creator lookup failed");
                CreatorId::unknown()
            }
        }
    }
}
