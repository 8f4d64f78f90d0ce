//! Database-backed catalog lookup.

use sqlx::PgPool;

use super::{CATALOG_CURRENCY, CatalogError, ProductKind, ProductResolver, ResolvedProduct, sell_price};
use crate::store::StoreError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CatalogRow {
    product_id: String,
    kind: Option<String>,
    base_price: rust_decimal::Decimal,
    published: bool,
}

/// Catalog backed by the `catalog_products` table. Rows are written by an
/// out-of-band import job; this resolver only reads.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductResolver for PgCatalog {
    async fn resolve(&self, product_id: &str) -> Result<ResolvedProduct, CatalogError> {
        let row = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT product_id, kind, base_price, published
            FROM catalog_products
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let Some(row) = row else {
            return Err(CatalogError::Unknown);
        };
        if !row.published {
            return Err(CatalogError::NotPublished);
        }

        let kind = row
            .kind
            .as_deref()
            .and_then(ProductKind::parse)
            .or_else(|| ProductKind::infer(&row.product_id));
        let Some(kind) = kind else {
            // A row we cannot classify cannot be sold; treat it as absent.
            tracing::warn!(product_id = %row.product_id, "catalog row has no resolvable kind");
            return Err(CatalogError::Unknown);
        };

        Ok(ResolvedProduct {
            product_id: row.product_id,
            kind,
            amount: sell_price(row.base_price),
            currency: CATALOG_CURRENCY.to_string(),
        })
    }
}
