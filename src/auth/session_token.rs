//! App Bridge session token decoding.
//!
//! An embedded app authenticates its `fetch` calls with a short-lived JWT
//! issued by App Bridge and sent as `Authorization: Bearer <token>`. The guard
//! decodes it to find out which shop (and, for online access, which user) a
//! request belongs to.
//!
//! # JWT Structure
//!
//! - `iss`: Issuer (e.g., `https://shop.myshopify.com/admin`)
//! - `dest`: Destination shop (e.g., `https://shop.myshopify.com`)
//! - `aud`: Audience, the app's API key
//! - `sub`: Subject, the admin user ID (optional)
//! - `exp`, `nbf`, `iat`: Expiry, not-before and issued-at timestamps
//! - `jti`: JWT ID
//! - `sid`: Session ID (optional)
//!
//! Verification is delegated to [`TokenDecoder`] so that tests and
//! alternative verifiers can be swapped in; [`JwtTokenDecoder`] is the
//! HS256 implementation keyed by the app's secret.

use crate::auth::AuthError;
use crate::config::{ApiKey, ApiSecretKey, AuthConfig, ShopDomain};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Leeway for time-based claims, in seconds.
const JWT_LEEWAY_SECS: u64 = 10;

/// Decoded claims of an App Bridge session token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionTokenPayload {
    /// Issuer, the Shopify admin URL that issued the token.
    pub iss: String,

    /// Destination, the shop URL the token is scoped to.
    pub dest: String,

    /// Audience, the app's API key.
    pub aud: String,

    /// Subject, the admin user ID for online tokens.
    pub sub: Option<String>,

    /// Expiration timestamp (Unix timestamp).
    pub exp: i64,

    /// Not before timestamp (Unix timestamp).
    pub nbf: i64,

    /// Issued at timestamp (Unix timestamp).
    pub iat: i64,

    /// JWT ID.
    pub jti: String,

    /// Shopify session ID.
    pub sid: Option<String>,
}

impl SessionTokenPayload {
    /// Returns the shop taken from the `dest` claim.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidShop`] if `dest` is not a shop URL.
    pub fn shop(&self) -> Result<ShopDomain, AuthError> {
        ShopDomain::from_url(&self.dest).map_err(|e| AuthError::InvalidShop {
            reason: e.to_string(),
        })
    }

    /// Returns the admin user ID for admin session tokens.
    ///
    /// `Some` only when `iss` ends with `/admin` and `sub` is all digits.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        if !self.iss.ends_with("/admin") {
            return None;
        }

        self.sub
            .as_deref()
            .filter(|sub| !sub.is_empty() && sub.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Verifies a bearer session token and returns its claims.
///
/// Implementations must be cheap to call concurrently; the guard calls
/// `decode` from every request task.
pub trait TokenDecoder: Send + Sync {
    /// Decodes and verifies `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSessionToken`] if the token is malformed,
    /// badly signed, expired, or issued for another app.
    fn decode(&self, token: &str) -> Result<SessionTokenPayload, AuthError>;
}

/// HS256 session token verifier keyed by the app's API secret.
///
/// Verification tries the primary secret first, then the old secret if one
/// is configured, and finally checks that `aud` equals the API key.
#[derive(Clone, Debug)]
pub struct JwtTokenDecoder {
    api_key: ApiKey,
    secret: ApiSecretKey,
    old_secret: Option<ApiSecretKey>,
}

impl JwtTokenDecoder {
    /// Creates a decoder from explicit credentials.
    #[must_use]
    pub const fn new(api_key: ApiKey, secret: ApiSecretKey, old_secret: Option<ApiSecretKey>) -> Self {
        Self {
            api_key,
            secret,
            old_secret,
        }
    }

    /// Creates a decoder from the guard configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.api_key().clone(),
            config.api_secret_key().clone(),
            config.old_api_secret_key().cloned(),
        )
    }

    fn decode_with_key(
        token: &str,
        secret: &str,
    ) -> Result<SessionTokenPayload, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = JWT_LEEWAY_SECS;
        // aud is checked against the API key after decoding
        validation.validate_aud = false;
        validation.validate_nbf = true;

        let key = DecodingKey::from_secret(secret.as_bytes());
        decode::<SessionTokenPayload>(token, &key, &validation).map(|data| data.claims)
    }
}

impl TokenDecoder for JwtTokenDecoder {
    fn decode(&self, token: &str) -> Result<SessionTokenPayload, AuthError> {
        let payload = match Self::decode_with_key(token, self.secret.as_ref()) {
            Ok(payload) => payload,
            Err(primary_err) => {
                let invalid = || AuthError::InvalidSessionToken {
                    reason: format!("Error decoding session token: {primary_err}"),
                };
                let old_secret = self.old_secret.as_ref().ok_or_else(invalid)?;
                Self::decode_with_key(token, old_secret.as_ref()).map_err(|_| invalid())?
            }
        };

        if payload.aud != self.api_key.as_ref() {
            return Err(AuthError::InvalidSessionToken {
                reason: "Session token had invalid API key".to_string(),
            });
        }

        Ok(payload)
    }
}

// Verify the decoder types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionTokenPayload>();
    assert_send_sync::<JwtTokenDecoder>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct TestClaims {
        iss: String,
        dest: String,
        aud: String,
        sub: Option<String>,
        exp: i64,
        nbf: i64,
        iat: i64,
        jti: String,
        sid: Option<String>,
    }

    fn valid_claims() -> TestClaims {
        let now = chrono::Utc::now().timestamp();
        TestClaims {
            iss: "https://testing-shop.myshopify.com/admin".to_string(),
            dest: "https://testing-shop.myshopify.com".to_string(),
            aud: "test-api-key".to_string(),
            sub: Some("1".to_string()),
            exp: now + 300,
            nbf: now - 10,
            iat: now,
            jti: "4321".to_string(),
            sid: Some("abc123".to_string()),
        }
    }

    fn encode_jwt(claims: &TestClaims, secret: &str) -> String {
        let key = EncodingKey::from_secret(secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &key).unwrap()
    }

    fn decoder(old_secret: Option<&str>) -> JwtTokenDecoder {
        JwtTokenDecoder::new(
            ApiKey::new("test-api-key").unwrap(),
            ApiSecretKey::new("test-secret").unwrap(),
            old_secret.map(|s| ApiSecretKey::new(s).unwrap()),
        )
    }

    #[test]
    fn test_decode_valid_token() {
        let claims = valid_claims();
        let payload = decoder(None).decode(&encode_jwt(&claims, "test-secret")).unwrap();

        assert_eq!(payload.dest, claims.dest);
        assert_eq!(payload.jti, "4321");
        assert_eq!(payload.shop().unwrap().as_ref(), "testing-shop.myshopify.com");
    }

    #[test]
    fn test_decode_falls_back_to_old_secret() {
        let token = encode_jwt(&valid_claims(), "old-secret");

        assert!(decoder(None).decode(&token).is_err());
        assert!(decoder(Some("old-secret")).decode(&token).is_ok());
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = encode_jwt(&valid_claims(), "wrong-secret");
        let result = decoder(Some("old-secret")).decode(&token);

        match result {
            Err(AuthError::InvalidSessionToken { reason }) => {
                assert!(reason.contains("Error decoding session token"));
            }
            other => panic!("Expected InvalidSessionToken, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_foreign_audience() {
        let mut claims = valid_claims();
        claims.aud = "another-app".to_string();
        let result = decoder(None).decode(&encode_jwt(&claims, "test-secret"));

        assert_eq!(
            result,
            Err(AuthError::InvalidSessionToken {
                reason: "Session token had invalid API key".to_string()
            })
        );
    }

    #[test]
    fn test_decode_rejects_expired_token_beyond_leeway() {
        let mut claims = valid_claims();
        claims.exp = chrono::Utc::now().timestamp() - 3600;
        assert!(decoder(None).decode(&encode_jwt(&claims, "test-secret")).is_err());

        claims.exp = chrono::Utc::now().timestamp() - 5;
        assert!(decoder(None).decode(&encode_jwt(&claims, "test-secret")).is_ok());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decoder(None).decode("not-a-jwt").is_err());
        assert!(decoder(None).decode("").is_err());
    }

    #[test]
    fn test_shop_rejects_non_shop_destination() {
        let mut claims = valid_claims();
        claims.dest = "https://attacker.example.com".to_string();
        let payload = decoder(None).decode(&encode_jwt(&claims, "test-secret")).unwrap();

        assert!(matches!(payload.shop(), Err(AuthError::InvalidShop { .. })));
    }

    #[test]
    fn test_user_id_requires_admin_issuer_and_numeric_subject() {
        let mut claims = valid_claims();
        let payload = decoder(None).decode(&encode_jwt(&claims, "test-secret")).unwrap();
        assert_eq!(payload.user_id(), Some("1"));

        claims.sub = Some("gid-1".to_string());
        let payload = decoder(None).decode(&encode_jwt(&claims, "test-secret")).unwrap();
        assert_eq!(payload.user_id(), None);

        claims.sub = Some("1".to_string());
        claims.iss = "https://testing-shop.myshopify.com".to_string();
        let payload = decoder(None).decode(&encode_jwt(&claims, "test-secret")).unwrap();
        assert_eq!(payload.user_id(), None);
    }
}
