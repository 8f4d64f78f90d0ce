//! HTTP API: routing, error mapping, extractors.

pub mod extractors;
pub mod orders;

#[cfg(test)]
mod tests;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use topup_core::destino::DestinoError;
use topup_core::flow::FlowError;
use topup_core::identity::IdentityError;
use topup_sdk::objects::{ErrorBody, ErrorCode};

/// Unified handler error. Every failure path collapses into one
/// `(status, {ok:false, error})` response; internal detail stays in the
/// logs.
#[derive(Debug)]
pub enum ApiError {
    InvalidJsonBody,
    InvalidOrderId,
    Identity(IdentityError),
    Flow(FlowError),
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError::Identity(err)
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        ApiError::Flow(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            ApiError::InvalidJsonBody => (StatusCode::BAD_REQUEST, ErrorCode::InvalidJsonBody),
            ApiError::InvalidOrderId => (StatusCode::BAD_REQUEST, ErrorCode::InvalidOrderId),
            ApiError::Identity(IdentityError::MissingAuth) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::MissingAuth)
            }
            ApiError::Identity(IdentityError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::InvalidIdToken)
            }
            ApiError::Identity(IdentityError::EmailNotVerified) => {
                (StatusCode::FORBIDDEN, ErrorCode::EmailNotVerified)
            }
            ApiError::Flow(FlowError::InvalidUid) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidUid),
            ApiError::Flow(FlowError::InvalidProductId) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidProductId)
            }
            ApiError::Flow(FlowError::UnknownProductId) => {
                (StatusCode::BAD_REQUEST, ErrorCode::UnknownProductId)
            }
            ApiError::Flow(FlowError::ProductNotPublished) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ProductNotPublished)
            }
            ApiError::Flow(FlowError::Destino(DestinoError::Invalid)) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidDestino)
            }
            ApiError::Flow(FlowError::Destino(DestinoError::InvalidCubacelNumber)) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidCubacelNumber)
            }
            ApiError::Flow(FlowError::Destino(DestinoError::InvalidNautaEmail)) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidNautaEmail)
            }
            ApiError::Flow(FlowError::InvalidProductAmount) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InvalidProductAmount,
            ),
            ApiError::Flow(FlowError::OrderNotFound) => {
                (StatusCode::NOT_FOUND, ErrorCode::OrderNotFound)
            }
            ApiError::Flow(FlowError::NotAllowedChannel) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAllowedChannel)
            }
            ApiError::Flow(FlowError::Forbidden) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            ApiError::Flow(FlowError::InvalidStatus { .. }) => {
                (StatusCode::CONFLICT, ErrorCode::InvalidStatus)
            }
            ApiError::Flow(FlowError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Flow(FlowError::Store(e)) = &self {
            tracing::error!(error = %e, "order store failure");
        }
        if let ApiError::Flow(FlowError::InvalidProductAmount) = &self {
            tracing::error!("catalog produced a non-positive amount");
        }
        let (status, code) = self.status_and_code();
        (status, Json(ErrorBody::new(code))).into_response()
    }
}
