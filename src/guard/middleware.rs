//! axum integration.
//!
//! [`ShopifyAuth`] bundles the decision engine, session resolver, access
//! policy and responder into cloneable router state. Mount
//! [`require_shopify_auth`] as a route layer so that the matched route
//! pattern is available for the policy lookup:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/shop/orders", get(list_orders))
//!     .route_layer(middleware::from_fn_with_state(auth.clone(), require_shopify_auth));
//! ```
//!
//! Handlers behind the layer can extract the authorized [`CurrentSession`]
//! or just its [`Shop`].

use crate::auth::{JwtTokenDecoder, Session, SessionResolver, TokenDecoder};
use crate::config::{AuthConfig, BasePath, ShopDomain};
use crate::guard::responder::NO_SESSION_MESSAGE;
use crate::guard::{AccessPolicy, Decision, ReauthDecisionEngine, ReauthResponder, RequestContext};
use crate::path::strip_route_prefix;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, MatchedPath, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;
use std::sync::Arc;

struct Inner {
    engine: ReauthDecisionEngine,
    resolver: Arc<dyn SessionResolver>,
    policy: AccessPolicy,
    global_prefix: BasePath,
    responder: ReauthResponder,
}

/// Shared guard state for an axum router.
#[derive(Clone)]
pub struct ShopifyAuth {
    inner: Arc<Inner>,
}

impl fmt::Debug for ShopifyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyAuth")
            .field("engine", &self.inner.engine)
            .field("policy", &self.inner.policy)
            .field("responder", &self.inner.responder)
            .finish_non_exhaustive()
    }
}

impl ShopifyAuth {
    /// Creates the guard state, verifying session tokens with the
    /// configured API secret.
    #[must_use]
    pub fn new(config: &AuthConfig, resolver: Arc<dyn SessionResolver>, policy: AccessPolicy) -> Self {
        Self::with_decoder(config, Arc::new(JwtTokenDecoder::from_config(config)), resolver, policy)
    }

    /// Creates the guard state with a custom session token decoder.
    #[must_use]
    pub fn with_decoder(
        config: &AuthConfig,
        decoder: Arc<dyn TokenDecoder>,
        resolver: Arc<dyn SessionResolver>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine: ReauthDecisionEngine::new(config.embedding_context().clone(), decoder),
                resolver,
                policy,
                global_prefix: config.base_paths().global_prefix().clone(),
                responder: ReauthResponder::from_config(config),
            }),
        }
    }

    /// Returns the access policy.
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.inner.policy
    }

    /// Guards one request.
    ///
    /// The route key is the matched route pattern if the router recorded
    /// one, otherwise the request path. A route that is not declared in the
    /// policy as matched is looked up again without the global prefix, so
    /// routers nested under the prefix resolve their own patterns. Returns
    /// the authorized session, or the response to answer the request with.
    ///
    /// # Errors
    ///
    /// Returns the rendered reauthorization or denial response for any
    /// decision other than [`Decision::Authorized`].
    pub async fn authorize(&self, parts: &Parts) -> Result<Session, Response> {
        let route = parts
            .extensions
            .get::<MatchedPath>()
            .map_or_else(|| parts.uri.path(), MatchedPath::as_str);
        let route = self.route_key(route);
        let mode = self.inner.policy.required_access_mode(route);
        let request = RequestContext::from_parts(parts);

        let (decision, session) = self
            .inner
            .engine
            .evaluate(self.inner.resolver.as_ref(), mode, &request)
            .await;

        match (decision, session) {
            (Decision::Authorized, Some(session)) => Ok(session),
            (decision, _) => {
                tracing::debug!(route, mode = %mode, decision = %decision, "request not authorized");
                Err(self.inner.responder.render(&decision, &request))
            }
        }
    }

    fn route_key<'a>(&self, route: &'a str) -> &'a str {
        if self.inner.policy.contains(route) {
            route
        } else {
            strip_route_prefix(route, &self.inner.global_prefix)
        }
    }
}

/// Middleware guarding every route it is layered on.
///
/// Authorized requests reach their handler with a [`CurrentSession`]
/// extension; all others are answered by the responder.
pub async fn require_shopify_auth(
    State(auth): State<ShopifyAuth>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    match auth.authorize(&parts).await {
        Ok(session) => {
            parts.extensions.insert(CurrentSession(session));
            next.run(Request::from_parts(parts, body)).await
        }
        Err(response) => response,
    }
}

/// The session a request was authorized with.
#[derive(Clone, Debug)]
pub struct CurrentSession(pub Session);

/// The shop a request was authorized for.
#[derive(Clone, Debug)]
pub struct Shop(pub ShopDomain);

/// Rejection for [`CurrentSession`] and [`Shop`] when the handler is not
/// behind [`require_shopify_auth`].
#[derive(Debug)]
pub struct MissingSession;

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": NO_SESSION_MESSAGE })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(MissingSession)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Shop
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        Ok(Self(session.shop))
    }
}

// Verify ShopifyAuth is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyAuth>();
};
