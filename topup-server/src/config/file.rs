//! TOML file configuration structures.
//!
//! These structs directly map to the `topup-config.toml` file format.

use serde::Deserialize;
use std::net::SocketAddr;
use topup_core::identity::AuthMode;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub attestation: AttestationConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Identity configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// `strict` demands a verified bearer credential on every call;
    /// `relaxed` (emulated/test environments) allows the body uid
    /// fallback.
    pub mode: AuthMode,
    /// Endpoint of the external identity verification service. Required
    /// in strict mode.
    #[serde(default)]
    pub verify_url: Option<Url>,
}

/// Bot-attestation configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct AttestationConfig {
    /// Attestation is on unless explicitly disabled for local runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub verify_url: Option<Url>,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verify_url: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// CORS configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API cross-origin. Empty means no
    /// cross-origin access.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Catalog configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// The hardcoded product table.
    #[default]
    Static,
    /// The `catalog_products` table.
    Database,
}
