//! The parts of an incoming request the guard looks at.

use axum::extract::Query;
use axum::http::header::{AUTHORIZATION, HOST};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;

/// Headers, decoded query parameters and host of one request.
///
/// Built once per request from [`Parts`] and shared by the session resolver,
/// the decision engine and the responder.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    headers: HeaderMap,
    query: HashMap<String, String>,
    host: Option<String>,
}

impl RequestContext {
    /// Creates a context from raw components.
    ///
    /// The host is taken from the `Host` header.
    #[must_use]
    pub fn new(headers: HeaderMap, query: HashMap<String, String>) -> Self {
        let host = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            headers,
            query,
            host,
        }
    }

    /// Captures the context of a request.
    ///
    /// A query string that cannot be decoded is treated as empty. Requests
    /// without a `Host` header (HTTP/2) fall back to the URI authority.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let query = match Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
            Ok(Query(query)) => query,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable query string");
                HashMap::new()
            }
        };

        let mut context = Self::new(parts.headers.clone(), query);
        if context.host.is_none() {
            context.host = parts.uri.authority().map(|a| a.as_str().to_string());
        }
        context
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the token of an `Authorization: Bearer <token>` header.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Returns a non-empty query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the host (with port, if any) the request was addressed to.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the value of a request cookie.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        CookieJar::from_headers(&self.headers)
            .get(name)
            .map(|cookie| cookie.value().to_string())
    }
}
