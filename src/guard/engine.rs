//! The reauthorization decision engine.
//!
//! Given the session resolved for a request (or none), the access mode the
//! route requires and the request's embedding signals, the engine decides
//! between four terminal outcomes:
//!
//! 1. A session whose scopes equal the required scopes, that holds an access
//!    token and is not expired, is [`Decision::Authorized`].
//! 2. Otherwise an embedded app's bearer request gets
//!    [`Decision::ReauthViaHeader`], for the session's shop or else the shop
//!    in the token's `dest` claim.
//! 3. Otherwise an offline route with a `shop` query parameter gets
//!    [`Decision::ReauthViaRedirect`].
//! 4. Everything else is [`Decision::Denied`].
//!
//! A stale or under-scoped session is treated exactly like no session from
//! step 2 on. Resolver and decoder failures never escape the engine.

use crate::auth::{AccessMode, Session, SessionResolver, TokenDecoder};
use crate::config::{EmbeddingContext, ShopDomain};
use crate::guard::{Decision, RequestContext};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Decides, per request, whether to authorize or how to reauthorize.
///
/// Holds only immutable configuration and is shared freely across request
/// tasks.
#[derive(Clone)]
pub struct ReauthDecisionEngine {
    embedding: EmbeddingContext,
    decoder: Arc<dyn TokenDecoder>,
}

impl fmt::Debug for ReauthDecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReauthDecisionEngine")
            .field("embedding", &self.embedding)
            .finish_non_exhaustive()
    }
}

impl ReauthDecisionEngine {
    /// Creates an engine for the given embedding context.
    #[must_use]
    pub fn new(embedding: EmbeddingContext, decoder: Arc<dyn TokenDecoder>) -> Self {
        Self { embedding, decoder }
    }

    /// Returns the embedding context.
    #[must_use]
    pub const fn embedding(&self) -> &EmbeddingContext {
        &self.embedding
    }

    /// Resolves the session for `request` and decides on it.
    ///
    /// The resolver call is the only suspension point. A resolver error is
    /// logged and treated as "no session found". The session is returned
    /// alongside the decision so that an authorized request can carry it to
    /// its handler.
    pub async fn evaluate(
        &self,
        resolver: &dyn SessionResolver,
        mode: AccessMode,
        request: &RequestContext,
    ) -> (Decision, Option<Session>) {
        let session = match resolver.resolve(request, mode).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, mode = %mode, "session lookup failed; treating as no session");
                None
            }
        };

        let decision = self.decide(session.as_ref(), mode, request);
        (decision, session)
    }

    /// Decides on an already resolved session at the current time.
    #[must_use]
    pub fn decide(
        &self,
        session: Option<&Session>,
        mode: AccessMode,
        request: &RequestContext,
    ) -> Decision {
        self.decide_at(session, mode, request, Utc::now())
    }

    /// Decides on an already resolved session at `now`.
    #[must_use]
    pub fn decide_at(
        &self,
        session: Option<&Session>,
        mode: AccessMode,
        request: &RequestContext,
        now: DateTime<Utc>,
    ) -> Decision {
        let decision = self.decide_inner(session, mode, request, now);
        tracing::debug!(
            shop = decision.shop().map(ShopDomain::as_ref),
            mode = %mode,
            decision = %decision,
            "auth decision"
        );
        decision
    }

    fn decide_inner(
        &self,
        session: Option<&Session>,
        mode: AccessMode,
        request: &RequestContext,
        now: DateTime<Utc>,
    ) -> Decision {
        if let Some(session) = session {
            if session.is_valid_for(self.embedding.required_scopes(), now) {
                return Decision::Authorized;
            }
            tracing::debug!(
                session_id = %session.id,
                scopes_changed = session.scopes != *self.embedding.required_scopes(),
                "session is stale or under-scoped"
            );
        }

        if self.embedding.is_embedded() {
            if let Some(token) = request.bearer_token() {
                let shop = match session {
                    Some(session) => Some(session.shop.clone()),
                    None => self.shop_from_token(token),
                };
                return shop.map_or(Decision::Denied, |shop| Decision::ReauthViaHeader { shop });
            }
        }

        if mode == AccessMode::Offline {
            if let Some(shop) = request.query_param("shop") {
                return match ShopDomain::new(shop) {
                    Ok(shop) => Decision::ReauthViaRedirect { shop },
                    Err(e) => {
                        tracing::warn!(error = %e, "rejecting invalid shop query parameter");
                        Decision::Denied
                    }
                };
            }
        }

        Decision::Denied
    }

    fn shop_from_token(&self, token: &str) -> Option<ShopDomain> {
        let shop = self.decoder.decode(token).and_then(|payload| payload.shop());
        match shop {
            Ok(shop) => Some(shop),
            Err(e) => {
                tracing::warn!(error = %e, "no shop derivable from bearer token");
                None
            }
        }
    }
}

// Verify ReauthDecisionEngine is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReauthDecisionEngine>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, AuthScopes, SessionTokenPayload};
    use async_trait::async_trait;
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::Duration;
    use std::collections::HashMap;

    /// Treats the token itself as the `dest` claim.
    struct DestDecoder;

    impl TokenDecoder for DestDecoder {
        fn decode(&self, token: &str) -> Result<SessionTokenPayload, AuthError> {
            if token == "bad" {
                return Err(AuthError::InvalidSessionToken {
                    reason: "bad signature".to_string(),
                });
            }
            Ok(SessionTokenPayload {
                iss: format!("{token}/admin"),
                dest: token.to_string(),
                aud: "test-api-key".to_string(),
                sub: Some("1".to_string()),
                exp: 0,
                nbf: 0,
                iat: 0,
                jti: "jti".to_string(),
                sid: None,
            })
        }
    }

    struct FixedResolver(Result<Option<Session>, AuthError>);

    #[async_trait]
    impl SessionResolver for FixedResolver {
        async fn resolve(
            &self,
            _request: &RequestContext,
            _mode: AccessMode,
        ) -> Result<Option<Session>, AuthError> {
            self.0.clone()
        }
    }

    fn scopes(s: &str) -> AuthScopes {
        s.parse().unwrap()
    }

    fn engine(is_embedded: bool) -> ReauthDecisionEngine {
        ReauthDecisionEngine::new(
            EmbeddingContext::new(is_embedded, scopes("write_shipping")),
            Arc::new(DestDecoder),
        )
    }

    fn shop() -> ShopDomain {
        ShopDomain::new("testing-shop").unwrap()
    }

    fn session(granted: &str, token: Option<&str>, expires: Option<DateTime<Utc>>) -> Session {
        Session::new(
            Session::offline_id(&shop()),
            shop(),
            token.map(str::to_string),
            scopes(granted),
            false,
            expires,
        )
    }

    fn request(bearer: Option<&str>, query_shop: Option<&str>) -> RequestContext {
        let mut headers = HeaderMap::new();
        if let Some(token) = bearer {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
        }
        let mut query = HashMap::new();
        if let Some(shop) = query_shop {
            query.insert("shop".to_string(), shop.to_string());
        }
        RequestContext::new(headers, query)
    }

    const DEST: &str = "https://testing-shop.myshopify.com";

    #[test]
    fn test_valid_session_is_authorized_regardless_of_request() {
        let now = Utc::now();
        let valid = session("write_shipping", Some("token"), Some(now + Duration::hours(1)));

        for embedded in [true, false] {
            for req in [
                request(None, None),
                request(Some(DEST), None),
                request(None, Some("testing-shop.myshopify.com")),
            ] {
                for mode in [AccessMode::Online, AccessMode::Offline] {
                    assert_eq!(
                        engine(embedded).decide_at(Some(&valid), mode, &req, now),
                        Decision::Authorized
                    );
                }
            }
        }
    }

    #[test]
    fn test_session_expiring_now_is_still_valid() {
        let now = Utc::now();
        let session = session("write_shipping", Some("token"), Some(now));
        assert_eq!(
            engine(true).decide_at(Some(&session), AccessMode::Online, &request(None, None), now),
            Decision::Authorized
        );
    }

    #[test]
    fn test_changed_scopes_are_never_authorized() {
        let now = Utc::now();
        let future = Some(now + Duration::days(1));

        for granted in ["read_products", "write_shipping,read_orders", ""] {
            let stale = session(granted, Some("token"), future);
            for embedded in [true, false] {
                for mode in [AccessMode::Online, AccessMode::Offline] {
                    let decision = engine(embedded).decide_at(
                        Some(&stale),
                        mode,
                        &request(None, Some("testing-shop")),
                        now,
                    );
                    assert!(!decision.is_authorized(), "granted {granted:?} was authorized");
                }
            }
        }
    }

    #[test]
    fn test_scope_comparison_ignores_order_and_implied_scopes() {
        let engine = ReauthDecisionEngine::new(
            EmbeddingContext::new(true, scopes("write_products,read_orders")),
            Arc::new(DestDecoder),
        );
        let session = session("read_orders, write_products, read_products", Some("t"), None);

        assert_eq!(
            engine.decide(Some(&session), AccessMode::Online, &request(None, None)),
            Decision::Authorized
        );
    }

    #[test]
    fn test_missing_token_or_expired_session_is_not_authorized() {
        let now = Utc::now();
        let no_token = session("write_shipping", None, None);
        let empty_token = session("write_shipping", Some(""), None);
        let expired = session("write_shipping", Some("token"), Some(now - Duration::seconds(1)));

        for stale in [no_token, empty_token, expired] {
            assert_eq!(
                engine(false).decide_at(Some(&stale), AccessMode::Online, &request(None, None), now),
                Decision::Denied
            );
        }
    }

    #[test]
    fn test_embedded_bearer_without_session_reauthorizes_via_header() {
        let decision = engine(true).decide(None, AccessMode::Online, &request(Some(DEST), None));
        assert_eq!(decision, Decision::ReauthViaHeader { shop: shop() });
    }

    #[test]
    fn test_embedded_bearer_prefers_session_shop() {
        let other = ShopDomain::new("other-shop").unwrap();
        let mut stale = session("read_products", Some("token"), None);
        stale.shop = other.clone();

        // the token would decode to testing-shop, but the session wins
        let decision = engine(true).decide(Some(&stale), AccessMode::Offline, &request(Some(DEST), None));
        assert_eq!(decision, Decision::ReauthViaHeader { shop: other });
    }

    #[test]
    fn test_embedded_bearer_with_undecodable_token_is_denied() {
        // no redirect fallback even for offline routes with a shop query
        let decision = engine(true).decide(
            None,
            AccessMode::Offline,
            &request(Some("bad"), Some("testing-shop.myshopify.com")),
        );
        assert_eq!(decision, Decision::Denied);
    }

    #[test]
    fn test_embedded_bearer_with_invalid_dest_is_denied() {
        let decision = engine(true).decide(None, AccessMode::Online, &request(Some("https://evil.example.com"), None));
        assert_eq!(decision, Decision::Denied);
    }

    #[test]
    fn test_bearer_is_ignored_when_not_embedded() {
        let decision = engine(false).decide(None, AccessMode::Online, &request(Some(DEST), None));
        assert_eq!(decision, Decision::Denied);

        let decision = engine(false).decide(
            None,
            AccessMode::Offline,
            &request(Some(DEST), Some("testing-shop.myshopify.com")),
        );
        assert_eq!(decision, Decision::ReauthViaRedirect { shop: shop() });
    }

    #[test]
    fn test_offline_without_bearer_redirects_with_query_shop() {
        for embedded in [true, false] {
            let decision = engine(embedded).decide(
                None,
                AccessMode::Offline,
                &request(None, Some("testing-shop.myshopify.com")),
            );
            assert_eq!(decision, Decision::ReauthViaRedirect { shop: shop() });
        }
    }

    #[test]
    fn test_online_without_bearer_never_redirects() {
        let decision = engine(true).decide(
            None,
            AccessMode::Online,
            &request(None, Some("testing-shop.myshopify.com")),
        );
        assert_eq!(decision, Decision::Denied);
    }

    #[test]
    fn test_invalid_query_shop_is_denied() {
        let decision = engine(false).decide(
            None,
            AccessMode::Offline,
            &request(None, Some("evil.example.com")),
        );
        assert_eq!(decision, Decision::Denied);
    }

    #[test]
    fn test_no_session_no_bearer_no_shop_is_denied_for_any_mode() {
        for embedded in [true, false] {
            for mode in [AccessMode::Online, AccessMode::Offline] {
                assert_eq!(
                    engine(embedded).decide(None, mode, &request(None, None)),
                    Decision::Denied
                );
            }
        }
    }

    #[tokio::test]
    async fn test_evaluate_returns_session_with_decision() {
        let valid = session("write_shipping", Some("token"), None);
        let resolver = FixedResolver(Ok(Some(valid.clone())));

        let (decision, session) = engine(true)
            .evaluate(&resolver, AccessMode::Offline, &request(None, None))
            .await;

        assert_eq!(decision, Decision::Authorized);
        assert_eq!(session, Some(valid));
    }

    #[tokio::test]
    async fn test_evaluate_folds_resolver_errors_into_no_session() {
        let resolver = FixedResolver(Err(AuthError::Storage {
            reason: "connection reset".to_string(),
        }));

        let (decision, session) = engine(true)
            .evaluate(&resolver, AccessMode::Online, &request(Some(DEST), None))
            .await;

        assert_eq!(decision, Decision::ReauthViaHeader { shop: shop() });
        assert_eq!(session, None);
    }
}
