//! Error types for session token decoding, storage and resolution.
//!
//! None of these reach an HTTP client directly: the decision engine treats a
//! failed lookup as "no session" and a failed decode as "no shop derivable".
//!
//! # Example
//!
//! ```rust
//! use shopify_auth_guard::auth::AuthError;
//!
//! let error = AuthError::InvalidSessionToken {
//!     reason: "signature mismatch".to_string(),
//! };
//! assert!(error.to_string().contains("signature mismatch"));
//! ```

use thiserror::Error;

/// Errors produced while turning a request into a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The bearer session token could not be decoded or verified.
    #[error("Invalid session token: {reason}")]
    InvalidSessionToken {
        /// Why decoding failed.
        reason: String,
    },

    /// A shop identifier taken from the request is not a valid shop domain.
    #[error("Invalid shop: {reason}")]
    InvalidShop {
        /// Why the shop was rejected.
        reason: String,
    },

    /// The session store failed.
    #[error("Session storage error: {reason}")]
    Storage {
        /// Description of the storage failure.
        reason: String,
    },
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert!(AuthError::InvalidSessionToken {
            reason: "expired".to_string()
        }
        .to_string()
        .contains("expired"));
        assert!(AuthError::Storage {
            reason: "connection reset".to_string()
        }
        .to_string()
        .contains("connection reset"));
        assert!(AuthError::InvalidShop {
            reason: "bad".to_string()
        }
        .to_string()
        .starts_with("Invalid shop"));
    }

    #[test]
    fn test_auth_error_implements_std_error() {
        let error: &dyn std::error::Error = &AuthError::Storage {
            reason: "unavailable".to_string(),
        };
        let _ = error;
    }
}
