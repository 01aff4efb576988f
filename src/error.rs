//! Configuration error types for the auth guard.
//!
//! All configuration constructors return `Result<T, ConfigError>` so that a
//! misconfigured guard fails at startup rather than on the first request.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth_guard::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the guard.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A base path or routing prefix is invalid.
    #[error("Invalid base path '{path}': {reason}")]
    InvalidBasePath {
        /// The invalid path that was provided.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// The redirect scheme is invalid.
    #[error("Invalid redirect scheme '{scheme}'. Expected 'http' or 'https'.")]
    InvalidScheme {
        /// The invalid scheme that was provided.
        scheme: String,
    },

    /// A route was registered more than once in an access policy.
    #[error("Route '{route}' is registered more than once in the access policy")]
    DuplicateRoute {
        /// The route key that was duplicated.
        route: String,
    },
}
