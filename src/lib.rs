//! # Shopify Auth Guard
//!
//! Session validation and reauthorization for Shopify apps served with axum.
//!
//! ## Overview
//!
//! On every protected request the guard decides, without performing any
//! OAuth exchange itself, whether the request's session is currently valid
//! for the access mode its route requires. If it is not, the client is told
//! how to reauthorize:
//!
//! - **Embedded clients** (App Bridge `fetch` calls carrying
//!   `Authorization: Bearer <session token>`) get a 401 with the
//!   `X-Shopify-Api-Request-Failure-Reauthorize` and
//!   `X-Shopify-API-Request-Failure-Reauthorize-Url` headers.
//! - **Top-level navigations** to offline routes with a `shop` query
//!   parameter get a 302 to the offline auth endpoint.
//! - Everything else gets `{"message":"No session found"}`.
//!
//! A session is valid when its granted scopes equal the app's configured
//! scopes, it holds an access token, and it has not expired. A token issued
//! under a different scope grant is never trusted, however fresh.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Router};
//! use shopify_auth_guard::auth::{JwtTokenDecoder, MemorySessionStorage, StorageSessionResolver};
//! use shopify_auth_guard::guard::{require_shopify_auth, Shop, ShopifyAuth};
//! use shopify_auth_guard::{AccessMode, AccessPolicy, ApiKey, ApiSecretKey, AuthConfig, BasePath, RouteGroup};
//!
//! async fn orders(Shop(shop): Shop) -> String {
//!     format!("orders of {shop}")
//! }
//!
//! let config = AuthConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-secret").unwrap())
//!     .scopes("write_shipping".parse().unwrap())
//!     .online_base_path(BasePath::new("user").unwrap())
//!     .offline_base_path(BasePath::new("shop").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let policy = AccessPolicy::builder()
//!     .group(RouteGroup::new("shop").access_mode(AccessMode::Offline).route("/shop/orders"))
//!     .build()
//!     .unwrap();
//!
//! let storage = Arc::new(MemorySessionStorage::new());
//! let resolver = StorageSessionResolver::new(
//!     storage,
//!     Arc::new(JwtTokenDecoder::from_config(&config)),
//!     config.embedding_context().is_embedded(),
//! );
//! let auth = ShopifyAuth::new(&config, Arc::new(resolver), policy);
//!
//! let app: Router = Router::new()
//!     .route("/shop/orders", get(orders))
//!     .route_layer(middleware::from_fn_with_state(auth, require_shopify_auth));
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is built once and passed explicitly
//! - **Fail-fast validation**: newtypes and builders validate on construction
//! - **Fail-closed**: lookup and decoding failures deny, they never authorize
//! - **Thread-safe**: all shared types are `Send + Sync`

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod path;

// Re-export public types at crate root for convenience
pub use auth::{AccessMode, AuthScopes, Session};
pub use config::{
    ApiKey, ApiSecretKey, AuthConfig, AuthConfigBuilder, BasePath, BasePaths, EmbeddingContext,
    ShopDomain,
};
pub use error::ConfigError;
pub use guard::{AccessPolicy, Decision, ReauthDecisionEngine, ReauthResponder, RouteGroup};
