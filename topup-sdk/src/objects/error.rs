use serde::{Deserialize, Serialize};

/// Machine-readable error codes returned in the `error` field of failed
/// responses.
///
/// The wire form is SCREAMING_SNAKE_CASE (`"UNKNOWN_PRODUCT_ID"`, …) and is
/// part of the public API contract; clients branch on these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidJsonBody,
    InvalidUid,
    InvalidProductId,
    UnknownProductId,
    ProductNotPublished,
    InvalidDestino,
    InvalidCubacelNumber,
    InvalidNautaEmail,
    InvalidOrderId,
    MissingAuth,
    InvalidIdToken,
    MissingAttestation,
    InvalidAttestation,
    EmailNotVerified,
    Forbidden,
    NotAllowedChannel,
    OrderNotFound,
    InvalidStatus,
    InvalidProductAmount,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::InvalidJsonBody => "INVALID_JSON_BODY",
            ErrorCode::InvalidUid => "INVALID_UID",
            ErrorCode::InvalidProductId => "INVALID_PRODUCT_ID",
            ErrorCode::UnknownProductId => "UNKNOWN_PRODUCT_ID",
            ErrorCode::ProductNotPublished => "PRODUCT_NOT_PUBLISHED",
            ErrorCode::InvalidDestino => "INVALID_DESTINO",
            ErrorCode::InvalidCubacelNumber => "INVALID_CUBACEL_NUMBER",
            ErrorCode::InvalidNautaEmail => "INVALID_NAUTA_EMAIL",
            ErrorCode::InvalidOrderId => "INVALID_ORDER_ID",
            ErrorCode::MissingAuth => "MISSING_AUTH",
            ErrorCode::InvalidIdToken => "INVALID_ID_TOKEN",
            ErrorCode::MissingAttestation => "MISSING_ATTESTATION",
            ErrorCode::InvalidAttestation => "INVALID_ATTESTATION",
            ErrorCode::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotAllowedChannel => "NOT_ALLOWED_CHANNEL",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::InvalidProductAmount => "INVALID_PRODUCT_AMOUNT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}
