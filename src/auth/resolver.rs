//! Finding the current session of a request.
//!
//! [`SessionResolver`] is the seam between the guard and the application's
//! session store. [`StorageSessionResolver`] derives the storage key the way
//! Shopify apps conventionally do:
//!
//! - **Embedded apps** identify the caller with the App Bridge bearer token.
//!   Online access looks up `<shop>_<user id>`, where the user id is the
//!   numeric `sub` of an admin token. Offline access looks up
//!   `offline_<shop>`.
//! - **Non-embedded apps** carry the session id in the
//!   [`SESSION_COOKIE`] cookie.
//!
//! A session issued for the other access mode is never returned.

use crate::auth::{AccessMode, AuthError, Session, SessionStorage, TokenDecoder};
use crate::guard::RequestContext;
use async_trait::async_trait;
use std::sync::Arc;

/// Cookie holding the session id of non-embedded apps.
pub const SESSION_COOKIE: &str = "shopify_app_session";

/// Looks up the session a request belongs to.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Returns the session for `request` under `mode`, or `None` if the
    /// request carries no usable session reference.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the reference cannot be decoded or the
    /// store fails. The guard treats any error as "no session".
    async fn resolve(
        &self,
        request: &RequestContext,
        mode: AccessMode,
    ) -> Result<Option<Session>, AuthError>;
}

/// [`SessionResolver`] reading from a [`SessionStorage`].
pub struct StorageSessionResolver<S> {
    storage: Arc<S>,
    decoder: Arc<dyn TokenDecoder>,
    is_embedded: bool,
}

impl<S: SessionStorage> StorageSessionResolver<S> {
    /// Creates a resolver over `storage`.
    pub fn new(storage: Arc<S>, decoder: Arc<dyn TokenDecoder>, is_embedded: bool) -> Self {
        Self {
            storage,
            decoder,
            is_embedded,
        }
    }

    fn session_id(
        &self,
        request: &RequestContext,
        mode: AccessMode,
    ) -> Result<Option<String>, AuthError> {
        if !self.is_embedded {
            return Ok(request.cookie(SESSION_COOKIE));
        }

        let Some(token) = request.bearer_token() else {
            return Ok(None);
        };
        let payload = self.decoder.decode(token)?;
        let shop = payload.shop()?;

        Ok(match mode {
            AccessMode::Offline => Some(Session::offline_id(&shop)),
            AccessMode::Online => payload
                .user_id()
                .map(|user| Session::online_id(&shop, user)),
        })
    }
}

#[async_trait]
impl<S: SessionStorage> SessionResolver for StorageSessionResolver<S> {
    async fn resolve(
        &self,
        request: &RequestContext,
        mode: AccessMode,
    ) -> Result<Option<Session>, AuthError> {
        let Some(id) = self.session_id(request, mode)? else {
            return Ok(None);
        };

        let session = self.storage.load_session(&id).await?;
        Ok(session.filter(|session| {
            let matches = session.access_mode() == mode;
            if !matches {
                tracing::debug!(
                    session_id = %session.id,
                    required = %mode,
                    "ignoring session issued for another access mode"
                );
            }
            matches
        }))
    }
}
