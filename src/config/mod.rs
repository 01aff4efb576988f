//! Configuration types for the auth guard.
//!
//! # Overview
//!
//! - [`AuthConfig`]: process-wide guard settings, built once at startup
//! - [`AuthConfigBuilder`]: a builder for constructing [`AuthConfig`] instances
//! - [`EmbeddingContext`]: the embedding flag and required scopes the
//!   decision engine reads on every request
//! - [`BasePaths`]: the registered online/offline auth base paths plus the
//!   global routing prefix
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`BasePath`]: validated newtypes
//!
//! # Example
//!
//! ```rust
//! use shopify_auth_guard::{AuthConfig, ApiKey, ApiSecretKey, BasePath};
//!
//! let config = AuthConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .scopes("write_shipping".parse().unwrap())
//!     .online_base_path(BasePath::new("user").unwrap())
//!     .offline_base_path(BasePath::new("shop").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(config.embedding_context().is_embedded());
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, BasePath, ShopDomain};

use crate::auth::{AccessMode, AuthScopes};
use crate::error::ConfigError;

/// Configuration for the auth guard.
///
/// `AuthConfig` is immutable once built and is `Clone + Send + Sync`, so it
/// can be shared across every request handler without synchronization.
///
/// # Key Rotation
///
/// The `old_api_secret_key` field supports seamless key rotation. Session
/// tokens are verified with the primary key first, then with the old key if
/// one is configured.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    embedding: EmbeddingContext,
    base_paths: BasePaths,
    redirect_scheme: String,
}

impl AuthConfig {
    /// Creates a new builder for constructing an `AuthConfig`.
    #[must_use]
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the embedding context read by the decision engine.
    #[must_use]
    pub const fn embedding_context(&self) -> &EmbeddingContext {
        &self.embedding
    }

    /// Returns the registered auth base paths.
    #[must_use]
    pub const fn base_paths(&self) -> &BasePaths {
        &self.base_paths
    }

    /// Returns the scheme used for generated reauthorization URLs.
    #[must_use]
    pub fn redirect_scheme(&self) -> &str {
        &self.redirect_scheme
    }
}

// Verify AuthConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthConfig>();
};

/// Whether the app runs embedded in the Shopify admin, and which scopes it
/// currently requires.
///
/// Established once at startup and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmbeddingContext {
    is_embedded: bool,
    required_scopes: AuthScopes,
}

impl EmbeddingContext {
    /// Creates a new embedding context.
    #[must_use]
    pub const fn new(is_embedded: bool, required_scopes: AuthScopes) -> Self {
        Self {
            is_embedded,
            required_scopes,
        }
    }

    /// Returns `true` if the app is loaded inside the admin iframe.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns the scope set every session must have been granted.
    #[must_use]
    pub const fn required_scopes(&self) -> &AuthScopes {
        &self.required_scopes
    }
}

/// The auth base paths registered for each access mode, plus the global
/// routing prefix they are mounted under.
///
/// A mode whose base path is `None` has no auth flow registered; the guard
/// cannot send clients through reauthorization for that mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasePaths {
    global_prefix: BasePath,
    online: Option<BasePath>,
    offline: Option<BasePath>,
}

impl BasePaths {
    /// Creates a new set of base paths.
    #[must_use]
    pub const fn new(
        global_prefix: BasePath,
        online: Option<BasePath>,
        offline: Option<BasePath>,
    ) -> Self {
        Self {
            global_prefix,
            online,
            offline,
        }
    }

    /// Returns the global routing prefix.
    #[must_use]
    pub const fn global_prefix(&self) -> &BasePath {
        &self.global_prefix
    }

    /// Returns the base path registered for `mode`, if any.
    #[must_use]
    pub const fn for_mode(&self, mode: AccessMode) -> Option<&BasePath> {
        match mode {
            AccessMode::Online => self.online.as_ref(),
            AccessMode::Offline => self.offline.as_ref(),
        }
    }
}

/// Builder for constructing [`AuthConfig`] instances.
///
/// Required fields are `api_key` and `api_secret_key`.
///
/// # Defaults
///
/// - `is_embedded`: `true`
/// - `scopes`: Empty
/// - `global_prefix`: Empty
/// - `online_base_path` / `offline_base_path`: not registered
/// - `redirect_scheme`: `https`
/// - `old_api_secret_key`: `None`
#[derive(Debug, Default)]
pub struct AuthConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    is_embedded: Option<bool>,
    global_prefix: Option<BasePath>,
    online_base_path: Option<BasePath>,
    offline_base_path: Option<BasePath>,
    redirect_scheme: Option<String>,
}

impl AuthConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the old API secret key for key rotation support.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the scopes the app requires.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Sets the global routing prefix every route is mounted under.
    #[must_use]
    pub fn global_prefix(mut self, prefix: BasePath) -> Self {
        self.global_prefix = Some(prefix);
        self
    }

    /// Registers the base path of the online (per-user) auth flow.
    #[must_use]
    pub fn online_base_path(mut self, path: BasePath) -> Self {
        self.online_base_path = Some(path);
        self
    }

    /// Registers the base path of the offline (shop-level) auth flow.
    #[must_use]
    pub fn offline_base_path(mut self, path: BasePath) -> Self {
        self.offline_base_path = Some(path);
        self
    }

    /// Sets the scheme of generated reauthorization URLs.
    #[must_use]
    pub fn redirect_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.redirect_scheme = Some(scheme.into());
        self
    }

    /// Builds the [`AuthConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` are not set, and [`ConfigError::InvalidScheme`] if the
    /// redirect scheme is neither `http` nor `https`.
    pub fn build(self) -> Result<AuthConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        let redirect_scheme = self
            .redirect_scheme
            .map(|scheme| scheme.to_ascii_lowercase())
            .unwrap_or_else(|| "https".to_string());
        if redirect_scheme != "https" && redirect_scheme != "http" {
            return Err(ConfigError::InvalidScheme {
                scheme: redirect_scheme,
            });
        }

        Ok(AuthConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            embedding: EmbeddingContext::new(
                self.is_embedded.unwrap_or(true),
                self.scopes.unwrap_or_default(),
            ),
            base_paths: BasePaths::new(
                self.global_prefix.unwrap_or_default(),
                self.online_base_path,
                self.offline_base_path,
            ),
            redirect_scheme,
        })
    }
}
