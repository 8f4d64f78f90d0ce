//! Application state shared across all request handlers.

use std::sync::Arc;

use topup_core::attestation::AttestationVerifier;
use topup_core::flow::OrderFlow;
use topup_core::identity::{AuthMode, IdentityVerifier};

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// The order flow: the only write path to the order store.
    pub flow: Arc<OrderFlow>,
    /// External identity verification capability.
    pub identity: Arc<dyn IdentityVerifier>,
    /// External bot-attestation verification capability.
    pub attestation: Arc<dyn AttestationVerifier>,
    /// Strict (production) or relaxed (emulated/test) identity posture.
    pub auth_mode: AuthMode,
}

impl AppState {
    pub fn new(
        flow: Arc<OrderFlow>,
        identity: Arc<dyn IdentityVerifier>,
        attestation: Arc<dyn AttestationVerifier>,
        auth_mode: AuthMode,
    ) -> Self {
        Self {
            flow,
            identity,
            attestation,
            auth_mode,
        }
    }
}
