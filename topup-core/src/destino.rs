//! Destination validation and normalization.
//!
//! The destination format depends on the product kind: Cubacel top-ups go
//! to a Cuban mobile number, Nauta top-ups to a `@nauta.cu` /
//! `@nauta.com.cu` mailbox. Both validators normalize before checking so
//! the stored destination has a single canonical form.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::catalog::ProductKind;

/// Upper bound on the raw destination, checked before any kind-specific
/// validation.
pub const MAX_DESTINO_LEN: usize = 128;

/// Cuban country calling code, used both to strip a dialed prefix and to
/// rebuild the canonical `+53XXXXXXXX` form.
const CUBA_CALLING_CODE: &str = "53";

static NAUTA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@nauta(\.com)?\.cu$").expect("nauta regex compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DestinoError {
    /// Empty or oversized destination, rejected before kind checks.
    #[error("destination is empty or exceeds {MAX_DESTINO_LEN} characters")]
    Invalid,
    #[error("destination is not a valid cubacel number")]
    InvalidCubacelNumber,
    #[error("destination is not a valid nauta email")]
    InvalidNautaEmail,
}

/// Validate a raw destination for the given product kind and return its
/// canonical form: `+53` plus eight digits for Cubacel, a lowercased
/// mailbox for Nauta.
pub fn validate_destino(kind: ProductKind, raw: &str) -> Result<String, DestinoError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_DESTINO_LEN {
        return Err(DestinoError::Invalid);
    }
    match kind {
        ProductKind::Cubacel => {
            let local = normalize_cubacel(trimmed);
            if is_valid_cubacel(&local) {
                Ok(format!("+{CUBA_CALLING_CODE}{local}"))
            } else {
                Err(DestinoError::InvalidCubacelNumber)
            }
        }
        ProductKind::Nauta => {
            let email = trimmed.to_lowercase();
            if NAUTA_RE.is_match(&email) {
                Ok(email)
            } else {
                Err(DestinoError::InvalidNautaEmail)
            }
        }
    }
}

/// Reduce phone input to the bare local number: drop separators and an
/// optional `+53`/`53` country prefix. A bare local number already starts
/// with a `5`, so the prefix is only stripped when more digits follow it.
fn normalize_cubacel(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(CUBA_CALLING_CODE) && digits.len() > 8 {
        digits[CUBA_CALLING_CODE.len()..].to_string()
    } else {
        digits
    }
}

/// A valid local Cubacel number is exactly eight digits starting with 5.
fn is_valid_cubacel(local: &str) -> bool {
    local.len() == 8
        && local.starts_with('5')
        && local.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubacel_accepts_bare_local_number() {
        let got = validate_destino(ProductKind::Cubacel, "53712345").unwrap();
        assert_eq!(got, "+5353712345");
    }

    #[test]
    fn cubacel_strips_country_prefix_and_separators() {
        for raw in ["+53 5371 2345", "53 53712345", "+53-5371-2345", "5353712345"] {
            let got = validate_destino(ProductKind::Cubacel, raw).unwrap();
            assert_eq!(got, "+5353712345", "input {raw:?}");
        }
    }

    #[test]
    fn cubacel_rejects_wrong_shape() {
        for raw in [
            "4371234",    // wrong leading digit, short
            "43712345",   // wrong leading digit
            "5371234",    // 7 digits
            "537123456",  // 9 digits
            "53712a45",   // letters survive as fewer digits
            "",
            "   ",
        ] {
            let err = validate_destino(ProductKind::Cubacel, raw).unwrap_err();
            assert!(
                matches!(err, DestinoError::InvalidCubacelNumber | DestinoError::Invalid),
                "input {raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn normalized_cubacel_matches_local_shape() {
        let local = normalize_cubacel("+53 5371 2345");
        assert_eq!(local, "53712345");
        assert!(is_valid_cubacel(&local));
    }

    #[test]
    fn nauta_lowercases_and_accepts_both_domains() {
        assert_eq!(
            validate_destino(ProductKind::Nauta, "  Ana.Perez@NAUTA.CU ").unwrap(),
            "ana.perez@nauta.cu"
        );
        assert_eq!(
            validate_destino(ProductKind::Nauta, "jose@nauta.com.cu").unwrap(),
            "jose@nauta.com.cu"
        );
    }

    #[test]
    fn nauta_rejects_other_domains_and_garbage() {
        for raw in ["ana@gmail.com", "ana@nauta.cu.com", "@nauta.cu", "ana perez@nauta.cu", "ana@@nauta.cu"] {
            assert_eq!(
                validate_destino(ProductKind::Nauta, raw),
                Err(DestinoError::InvalidNautaEmail),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn oversized_destination_fails_generic_check() {
        let raw = "5".repeat(MAX_DESTINO_LEN + 1);
        assert_eq!(
            validate_destino(ProductKind::Cubacel, &raw),
            Err(DestinoError::Invalid)
        );
    }
}
