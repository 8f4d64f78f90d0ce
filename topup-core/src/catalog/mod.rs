//! Product catalog resolution.
//!
//! The order flow depends only on the [`ProductResolver`] trait; the two
//! implementations are a hardcoded table ([`static_table::StaticCatalog`],
//! the original source of truth) and a database-backed lookup
//! ([`pg::PgCatalog`]).

pub mod pg;
pub mod static_table;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

pub use pg::PgCatalog;
pub use static_table::StaticCatalog;

/// Product kind, determining which destination format an order must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductKind {
    /// Mobile top-up; destination is a Cuban mobile number.
    Cubacel,
    /// Internet account top-up; destination is a nauta mailbox.
    Nauta,
}

impl ProductKind {
    /// Parse an explicit catalog `kind` field.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cubacel" => Some(ProductKind::Cubacel),
            "nauta" => Some(ProductKind::Nauta),
            _ => None,
        }
    }

    /// Infer the kind from the product id naming convention
    /// (`cubacel-20`, `nauta-10`, …). Used when the catalog row carries
    /// no explicit kind.
    pub fn infer(product_id: &str) -> Option<Self> {
        if product_id.starts_with("cubacel-") {
            Some(ProductKind::Cubacel)
        } else if product_id.starts_with("nauta-") {
            Some(ProductKind::Nauta)
        } else {
            None
        }
    }
}

/// A product as the order flow sees it: kind plus the sellable price.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct {
    pub product_id: String,
    pub kind: ProductKind,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown product id")]
    Unknown,
    #[error("product is not published")]
    NotPublished,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Currency every catalog price is denominated in.
pub const CATALOG_CURRENCY: &str = "EUR";

/// Sellable price: catalog base price plus the fixed 1.00 margin, rounded
/// to cents.
pub fn sell_price(base_price: Decimal) -> Decimal {
    (base_price + Decimal::new(100, 2)).round_dp(2)
}

#[async_trait::async_trait]
pub trait ProductResolver: Send + Sync {
    /// Look up a product by its (already trimmed and lowercased) id.
    async fn resolve(&self, product_id: &str) -> Result<ResolvedProduct, CatalogError>;
}
