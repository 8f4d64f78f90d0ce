//! The in-process catalog table.
//!
//! Mirrors the original hardcoded server-side catalog. Prices here are
//! base prices; the sellable amount is computed by [`super::sell_price`].

use std::collections::HashMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;

use super::{CATALOG_CURRENCY, CatalogError, ProductKind, ProductResolver, ResolvedProduct, sell_price};

struct StaticProduct {
    kind: ProductKind,
    /// Base price in cents.
    base_cents: i64,
}

static PRODUCTS: LazyLock<HashMap<&'static str, StaticProduct>> = LazyLock::new(|| {
    HashMap::from([
        // --- CUBACEL ---
        ("cubacel-10", StaticProduct { kind: ProductKind::Cubacel, base_cents: 942 }),
        ("cubacel-20", StaticProduct { kind: ProductKind::Cubacel, base_cents: 1984 }),
        ("cubacel-25", StaticProduct { kind: ProductKind::Cubacel, base_cents: 2401 }),
        ("cubacel-30", StaticProduct { kind: ProductKind::Cubacel, base_cents: 3026 }),
        // --- NAUTA ---
        ("nauta-5", StaticProduct { kind: ProductKind::Nauta, base_cents: 400 }),
        ("nauta-10", StaticProduct { kind: ProductKind::Nauta, base_cents: 900 }),
    ])
});

/// Catalog backed by the hardcoded product table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

#[async_trait::async_trait]
impl ProductResolver for StaticCatalog {
    async fn resolve(&self, product_id: &str) -> Result<ResolvedProduct, CatalogError> {
        let product = PRODUCTS.get(product_id).ok_or(CatalogError::Unknown)?;
        Ok(ResolvedProduct {
            product_id: product_id.to_string(),
            kind: product.kind,
            amount: sell_price(Decimal::new(product.base_cents, 2)),
            currency: CATALOG_CURRENCY.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_product_resolves_with_margin() {
        let product = StaticCatalog.resolve("cubacel-20").await.unwrap();
        assert_eq!(product.kind, ProductKind::Cubacel);
        assert_eq!(product.amount, Decimal::new(2084, 2));
        assert_eq!(product.currency, "EUR");
    }

    #[tokio::test]
    async fn unknown_product_is_distinguishable() {
        let err = StaticCatalog.resolve("cubacel-99").await.unwrap_err();
        assert!(matches!(err, CatalogError::Unknown));
    }

    #[tokio::test]
    async fn every_amount_is_positive() {
        for id in ["cubacel-10", "cubacel-20", "cubacel-25", "cubacel-30", "nauta-5", "nauta-10"] {
            let product = StaticCatalog.resolve(id).await.unwrap();
            assert!(product.amount > Decimal::ZERO, "{id}");
        }
    }
}
