//! Bot-attestation token verification.
//!
//! Every order endpoint requires an opaque attestation token, checked
//! against an external attestation service before any business logic
//! runs. The trait keeps the service pluggable; disabling attestation in
//! config swaps in [`AllowAllAttestation`].

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttestationError {
    #[error("attestation token rejected")]
    Invalid,
}

#[async_trait::async_trait]
pub trait AttestationVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), AttestationError>;
}

/// Verifier that posts the token to an external attestation service and
/// accepts on any 2xx answer.
#[derive(Debug, Clone)]
pub struct HttpAttestationVerifier {
    client: reqwest::Client,
    verify_url: Url,
}

impl HttpAttestationVerifier {
    pub fn new(verify_url: Url) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            verify_url,
        }
    }
}

#[derive(serde::Serialize)]
struct AttestationRequest<'a> {
    token: &'a str,
}

#[async_trait::async_trait]
impl AttestationVerifier for HttpAttestationVerifier {
    async fn verify(&self, token: &str) -> Result<(), AttestationError> {
        let response = self
            .client
            .post(self.verify_url.clone())
            .json(&AttestationRequest { token })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "attestation service unreachable");
                AttestationError::Invalid
            })?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AttestationError::Invalid)
        }
    }
}

/// Accepts every token. Used when attestation is disabled in config
/// (local development, emulated environments).
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAttestation;

#[async_trait::async_trait]
impl AttestationVerifier for AllowAllAttestation {
    async fn verify(&self, _token: &str) -> Result<(), AttestationError> {
        Ok(())
    }
}

/// Accepts exactly one token. Test double.
#[derive(Debug, Clone)]
pub struct StaticAttestationVerifier {
    accepted: String,
}

impl StaticAttestationVerifier {
    pub fn new(accepted: &str) -> Self {
        Self {
            accepted: accepted.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl AttestationVerifier for StaticAttestationVerifier {
    async fn verify(&self, token: &str) -> Result<(), AttestationError> {
        if token == self.accepted {
            Ok(())
        } else {
            Err(AttestationError::Invalid)
        }
    }
}
