//! Caller identity resolution.
//!
//! Token verification itself is an external capability behind the
//! [`IdentityVerifier`] trait; this module decides how a request's
//! identity is established from the verifier's answer, the operating mode,
//! and an optional body-supplied fallback id.

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

use crate::entities::AuthSource;

/// Upper bound on a subject id.
pub const MAX_UID_LEN: usize = 128;

/// How strictly identity is enforced.
///
/// `Strict` is the production posture: a verified bearer credential is
/// mandatory. `Relaxed` matches the emulated/test environment, where a
/// missing credential falls back to the `uid` field of the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Strict,
    Relaxed,
}

/// A subject as reported by the external verifier.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email_verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("missing bearer credential")]
    MissingAuth,
    #[error("bearer credential rejected")]
    InvalidToken,
    #[error("identity email is not verified")]
    EmailNotVerified,
}

/// The resolved caller of a request.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub uid: String,
    pub source: AuthSource,
    /// Only known for token-derived identities.
    pub email_verified: Option<bool>,
}

#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Resolve the caller: token first, body fallback only in relaxed mode.
///
/// The fallback uid is passed through untrimmed-empty or not; the caller's
/// uid validation owns the final say.
pub async fn resolve_identity(
    verifier: &dyn IdentityVerifier,
    mode: AuthMode,
    bearer: Option<&str>,
    fallback_uid: Option<&str>,
) -> Result<ResolvedIdentity, IdentityError> {
    match bearer {
        Some(token) => {
            let verified = verifier.verify(token).await?;
            if verified.uid.is_empty() {
                return Err(IdentityError::InvalidToken);
            }
            Ok(ResolvedIdentity {
                uid: verified.uid,
                source: AuthSource::Token,
                email_verified: Some(verified.email_verified),
            })
        }
        None => match mode {
            AuthMode::Strict => Err(IdentityError::MissingAuth),
            AuthMode::Relaxed => Ok(ResolvedIdentity {
                uid: fallback_uid.unwrap_or_default().trim().to_string(),
                source: AuthSource::Body,
                email_verified: None,
            }),
        },
    }
}

/// Create-order's extra gate: outside relaxed mode, a token identity with
/// an unverified email may not place orders.
pub fn require_verified_email(
    mode: AuthMode,
    identity: &ResolvedIdentity,
) -> Result<(), IdentityError> {
    if mode == AuthMode::Strict && identity.email_verified == Some(false) {
        return Err(IdentityError::EmailNotVerified);
    }
    Ok(())
}

/// Verifier that delegates to an external identity service over HTTP.
///
/// The service receives `{"token": "..."}` and answers
/// `{"uid": "...", "emailVerified": bool}`; anything else — transport
/// failure included — counts as a rejected credential.
#[derive(Debug, Clone)]
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    verify_url: Url,
}

impl HttpIdentityVerifier {
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
struct VerifyTokenRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyTokenResponse {
    uid: String,
    #[serde(default)]
    email_verified: bool,
}

#[async_trait::async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .post(self.verify_url.clone())
            .json(&VerifyTokenRequest { token })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "identity verifier unreachable");
                IdentityError::InvalidToken
            })?;
        if !response.status().is_success() {
            return Err(IdentityError::InvalidToken);
        }
        let body: VerifyTokenResponse = response
            .json()
            .await
            .map_err(|_| IdentityError::InvalidToken)?;
        if body.uid.is_empty() {
            return Err(IdentityError::InvalidToken);
        }
        Ok(VerifiedIdentity {
            uid: body.uid,
            email_verified: body.email_verified,
        })
    }
}

/// Fixed token table. Backs tests and local runs without an identity
/// service.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: &str, uid: &str, email_verified: bool) -> Self {
        self.identities.insert(
            token.to_string(),
            VerifiedIdentity {
                uid: uid.to_string(),
                email_verified,
            },
        );
        self
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> StaticIdentityVerifier {
        StaticIdentityVerifier::new().with_identity("good-token", "user-1", true)
    }

    #[tokio::test]
    async fn token_wins_over_fallback() {
        let resolved = resolve_identity(
            &verifier(),
            AuthMode::Relaxed,
            Some("good-token"),
            Some("someone-else"),
        )
        .await
        .unwrap();
        assert_eq!(resolved.uid, "user-1");
        assert_eq!(resolved.source, AuthSource::Token);
    }

    #[tokio::test]
    async fn bad_token_is_rejected_in_any_mode() {
        for mode in [AuthMode::Strict, AuthMode::Relaxed] {
            let err = resolve_identity(&verifier(), mode, Some("bad"), Some("u"))
                .await
                .unwrap_err();
            assert_eq!(err, IdentityError::InvalidToken);
        }
    }

    #[tokio::test]
    async fn strict_mode_requires_a_token() {
        let err = resolve_identity(&verifier(), AuthMode::Strict, None, Some("u"))
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::MissingAuth);
    }

    #[tokio::test]
    async fn relaxed_mode_falls_back_to_body_uid() {
        let resolved = resolve_identity(&verifier(), AuthMode::Relaxed, None, Some(" user-2 "))
            .await
            .unwrap();
        assert_eq!(resolved.uid, "user-2");
        assert_eq!(resolved.source, AuthSource::Body);
        assert_eq!(resolved.email_verified, None);
    }

    #[tokio::test]
    async fn unverified_email_blocks_create_in_strict_mode() {
        let verifier = StaticIdentityVerifier::new().with_identity("t", "user-3", false);
        let resolved = resolve_identity(&verifier, AuthMode::Strict, Some("t"), None)
            .await
            .unwrap();
        assert_eq!(
            require_verified_email(AuthMode::Strict, &resolved),
            Err(IdentityError::EmailNotVerified)
        );
        assert_eq!(require_verified_email(AuthMode::Relaxed, &resolved), Ok(()));
    }
}
