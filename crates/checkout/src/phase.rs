//! How far a checkout session got.

use serde::Serialize;

/// Progress of a checkout session across the payment and persistence steps.
///
/// ```text
/// NotStarted ──► Authorized ──┬──► Persisted
///                             └──► AuthorizedButUnpersisted
/// ```
///
/// `AuthorizedButUnpersisted` means the processor holds funds that no local
/// order accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum CheckoutPhase {
    /// No payment authorization was requested, or it failed.
    #[default]
    NotStarted,

    /// The processor authorized the payment; no order exists yet.
    Authorized,

    /// The payment is authorized but the order could not be saved.
    AuthorizedButUnpersisted,

    /// The pending order is saved with its authorization reference.
    Persisted,
}

impl CheckoutPhase {
    /// Returns true if an authorization exists without a matching order.
    pub fn requires_reconciliation(&self) -> bool {
        matches!(self, CheckoutPhase::AuthorizedButUnpersisted)
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::NotStarted => "NotStarted",
            CheckoutPhase::Authorized => "Authorized",
            CheckoutPhase::AuthorizedButUnpersisted => "AuthorizedButUnpersisted",
            CheckoutPhase::Persisted => "Persisted",
        }
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
