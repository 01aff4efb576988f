//! Stored sessions as seen by the guard.
//!
//! Sessions are created by the OAuth callback and owned by a
//! [`SessionStorage`](crate::auth::SessionStorage). The guard only reads them.

use crate::auth::{AccessMode, AuthScopes};
use crate::config::ShopDomain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session for one shop.
///
/// A session is only meaningful together with the access mode it was issued
/// under, recorded in `is_online`.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use shopify_auth_guard::{Session, ShopDomain};
///
/// let shop = ShopDomain::new("my-store").unwrap();
/// let session = Session::new(
///     Session::offline_id(&shop),
///     shop,
///     Some("access-token".to_string()),
///     "read_products".parse().unwrap(),
///     false, // offline session
///     None,  // no expiration
/// );
///
/// assert_eq!(session.id, "offline_my-store.myshopify.com");
/// assert!(session.is_valid_for(&"read_products".parse().unwrap(), Utc::now()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Storage key of this session.
    pub id: String,

    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token, once the OAuth flow has completed.
    pub access_token: Option<String>,

    /// The OAuth scopes granted to this session.
    #[serde(rename = "scope")]
    pub scopes: AuthScopes,

    /// Whether this is an online (user-specific) session.
    pub is_online: bool,

    /// When this session expires, if applicable.
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new session with the specified parameters.
    #[must_use]
    pub const fn new(
        id: String,
        shop: ShopDomain,
        access_token: Option<String>,
        scopes: AuthScopes,
        is_online: bool,
        expires: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            shop,
            access_token,
            scopes,
            is_online,
            expires,
        }
    }

    /// Returns the storage key of the offline session for `shop`.
    #[must_use]
    pub fn offline_id(shop: &ShopDomain) -> String {
        format!("offline_{}", shop.as_ref())
    }

    /// Returns the storage key of the online session for a user of `shop`.
    #[must_use]
    pub fn online_id(shop: &ShopDomain, user_id: &str) -> String {
        format!("{}_{user_id}", shop.as_ref())
    }

    /// Returns the access mode this session was issued under.
    #[must_use]
    pub const fn access_mode(&self) -> AccessMode {
        if self.is_online {
            AccessMode::Online
        } else {
            AccessMode::Offline
        }
    }

    /// Returns `true` if this session has expired at `now`.
    ///
    /// Sessions without an expiration time never expire. A session expiring
    /// exactly at `now` is still valid.
    #[must_use]
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires < now)
    }

    /// Returns `true` if an access token is present and non-empty.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns `true` if this session can be trusted for a request at `now`.
    ///
    /// That requires a granted scope set exactly equal to `required_scopes`,
    /// an access token, and no expiry before `now`. A grant that differs from
    /// the required set fails even when the token itself is still live.
    #[must_use]
    pub fn is_valid_for(&self, required_scopes: &AuthScopes, now: DateTime<Utc>) -> bool {
        self.scopes == *required_scopes && self.has_access_token() && !self.expired_at(now)
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
