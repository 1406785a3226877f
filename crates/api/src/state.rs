//! Shared application state.

use std::sync::Arc;

use checkout::{CartService, CheckoutOrchestrator, InMemoryPaymentProcessor, PaymentProcessor};
use store::{
    CartStore, CreatorDirectory, InMemoryCartStore, InMemoryCreatorDirectory, InMemoryOrderStore,
    OrderStore,
};

/// Orchestrator over type-erased backends, chosen at startup.
pub type Orchestrator = CheckoutOrchestrator<
    Arc<dyn CartStore>,
    Arc<dyn OrderStore>,
    Arc<dyn CreatorDirectory>,
    Arc<dyn PaymentProcessor>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub carts: CartService<Arc<dyn CartStore>>,
    pub backends: BackendInfo,
}

/// Names of the configured backends, reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendInfo {
    pub store: &'static str,
    pub payments: &'static str,
}

/// Handles to the in-memory backends behind an in-memory [`AppState`].
#[derive(Clone, Default)]
pub struct InMemoryBackends {
    pub carts: InMemoryCartStore,
    pub orders: InMemoryOrderStore,
    pub creators: InMemoryCreatorDirectory,
    pub payments: InMemoryPaymentProcessor,
}

impl AppState {
    /// Wires the checkout services over the given backends.
    pub fn new(
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        creators: Arc<dyn CreatorDirectory>,
        payments: Arc<dyn PaymentProcessor>,
        currency: &str,
        backends: BackendInfo,
    ) -> Self {
        let orchestrator = CheckoutOrchestrator::new(carts.clone(), orders, creators, payments)
            .with_currency(currency);

        Self {
            orchestrator,
            carts: CartService::new(carts),
            backends,
        }
    }

    /// Creates a state backed entirely by in-memory stores and payments.
    ///
    /// Returns the backend handles so callers can seed data or inject
    /// failures.
    pub fn in_memory(currency: &str) -> (Self, InMemoryBackends) {
        let backends = InMemoryBackends::default();
        let state = Self::new(
            Arc::new(backends.carts.clone()),
            Arc::new(backends.orders.clone()),
            Arc::new(backends.creators.clone()),
            Arc::new(backends.payments.clone()),
            currency,
            BackendInfo {
                store: "memory",
                payments: "memory",
            },
        );
        (state, backends)
    }
}
