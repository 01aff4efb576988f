//! HTTP translation of non-authorized decisions.
//!
//! | Decision              | Response                                            |
//! |-----------------------|-----------------------------------------------------|
//! | `ReauthViaHeader`     | 401, reauthorize headers, JSON body                 |
//! | `ReauthViaRedirect`   | 302 to the offline auth endpoint                    |
//! | `Denied`              | 403, `{"message":"No session found"}`               |
//!
//! Rendering never fails: when an auth URL cannot be built (no base path
//! registered for the mode, no usable host) the response degrades to the
//! generic denial.

use crate::auth::AccessMode;
use crate::config::{AuthConfig, BasePaths, ShopDomain};
use crate::guard::{Decision, RequestContext};
use crate::path::auth_path;
use axum::http::header::LOCATION;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Header telling an embedded client that it must reauthorize.
pub const REAUTHORIZE_HEADER: &str = "X-Shopify-Api-Request-Failure-Reauthorize";

/// Header carrying the URL an embedded client must reauthorize through.
pub const REAUTHORIZE_URL_HEADER: &str = "X-Shopify-API-Request-Failure-Reauthorize-Url";

/// Message of the 401 reauthorization body.
pub const REAUTHORIZE_MESSAGE: &str = "Reauthorization Required (See Headers)";

/// Message of the generic denial body.
pub const NO_SESSION_MESSAGE: &str = "No session found";

// `http` stores header names lowercased; the constants above keep the casing
// clients have historically matched on.
static REAUTHORIZE: HeaderName =
    HeaderName::from_static("x-shopify-api-request-failure-reauthorize");
static REAUTHORIZE_URL: HeaderName =
    HeaderName::from_static("x-shopify-api-request-failure-reauthorize-url");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReauthorizeBody {
    status_code: u16,
    timestamp: String,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct DeniedBody {
    message: &'static str,
}

/// Builds auth URLs and renders decisions as HTTP responses.
#[derive(Clone, Debug)]
pub struct ReauthResponder {
    base_paths: BasePaths,
    scheme: String,
}

impl ReauthResponder {
    /// Creates a responder for the given base paths and URL scheme.
    #[must_use]
    pub fn new(base_paths: BasePaths, scheme: impl Into<String>) -> Self {
        Self {
            base_paths,
            scheme: scheme.into(),
        }
    }

    /// Creates a responder from the guard configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.base_paths().clone(), config.redirect_scheme())
    }

    /// Returns the absolute auth URL for `shop` under the base path of
    /// `mode`, on the host the request was addressed to.
    ///
    /// Returns `None` if no base path is registered for `mode` or the request
    /// has no usable host.
    #[must_use]
    pub fn auth_url(
        &self,
        mode: AccessMode,
        shop: &ShopDomain,
        request: &RequestContext,
    ) -> Option<String> {
        let Some(base_path) = self.base_paths.for_mode(mode) else {
            tracing::error!(mode = %mode, "no auth base path registered");
            return None;
        };

        let Some(host) = request.host().filter(|host| is_valid_host(host)) else {
            tracing::error!(host = ?request.host(), "request has no usable host");
            return None;
        };

        Some(format!(
            "{}://{}/{}?shop={}",
            self.scheme,
            host,
            auth_path(self.base_paths.global_prefix(), base_path),
            urlencoding::encode(shop.as_ref())
        ))
    }

    /// Renders `decision` for `request`.
    ///
    /// [`Decision::Authorized`] has no response of its own; passing it here
    /// is logged and rendered as a denial.
    #[must_use]
    pub fn render(&self, decision: &Decision, request: &RequestContext) -> Response {
        match decision {
            Decision::ReauthViaHeader { shop } => self
                .reauthorize_via_header(shop, request)
                .unwrap_or_else(denied),
            Decision::ReauthViaRedirect { shop } => self
                .reauthorize_via_redirect(shop, request)
                .unwrap_or_else(denied),
            Decision::Denied => denied(),
            Decision::Authorized => {
                tracing::error!("asked to render an authorized decision");
                denied()
            }
        }
    }

    fn reauthorize_via_header(&self, shop: &ShopDomain, request: &RequestContext) -> Option<Response> {
        let url = self.auth_url(AccessMode::Online, shop, request)?;
        let url = header_value(&url)?;

        let body = ReauthorizeBody {
            status_code: StatusCode::UNAUTHORIZED.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message: REAUTHORIZE_MESSAGE,
        };

        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert(REAUTHORIZE.clone(), HeaderValue::from_static("1"));
        headers.insert(REAUTHORIZE_URL.clone(), url);
        Some(response)
    }

    fn reauthorize_via_redirect(&self, shop: &ShopDomain, request: &RequestContext) -> Option<Response> {
        let url = self.auth_url(AccessMode::Offline, shop, request)?;
        let location = header_value(&url)?;

        Some((StatusCode::FOUND, [(LOCATION, location)]).into_response())
    }
}

/// Renders the generic denial.
#[must_use]
pub fn denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(DeniedBody {
            message: NO_SESSION_MESSAGE,
        }),
    )
        .into_response()
}

fn header_value(url: &str) -> Option<HeaderValue> {
    match HeaderValue::from_str(url) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "auth URL is not a valid header value");
            None
        }
    }
}

// host or host:port; no userinfo, path, query or whitespace
fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
}
