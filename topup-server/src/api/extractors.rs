//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `Attested` — verifies the `X-Attestation-Token` header against the
//!   configured attestation service before any business logic runs.
//!
//! Identity resolution is not an extractor: in relaxed mode it needs the
//! request body's fallback uid, so it runs inside the handlers instead.

use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use axum::Json;
use topup_sdk::objects::{ErrorBody, ErrorCode};

use crate::state::AppState;

/// Header carrying the opaque bot-attestation token.
pub const ATTESTATION_HEADER: &str = "x-attestation-token";

/// Proof that the request carried a valid attestation token.
pub struct Attested;

/// Errors returned by the [`Attested`] extractor.
#[derive(Debug)]
pub enum AttestationRejection {
    Missing,
    Invalid,
}

impl IntoResponse for AttestationRejection {
    fn into_response(self) -> Response {
        let code = match self {
            AttestationRejection::Missing => ErrorCode::MissingAttestation,
            AttestationRejection::Invalid => ErrorCode::InvalidAttestation,
        };
        (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(code))).into_response()
    }
}

impl FromRequestParts<AppState> for Attested {
    type Rejection = AttestationRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(ATTESTATION_HEADER)
            .ok_or(AttestationRejection::Missing)?
            .to_str()
            .map_err(|_| AttestationRejection::Invalid)?
            .trim();
        if token.is_empty() {
            return Err(AttestationRejection::Missing);
        }

        state
            .attestation
            .verify(token)
            .await
            .map_err(|_| AttestationRejection::Invalid)?;
        Ok(Attested)
    }
}
