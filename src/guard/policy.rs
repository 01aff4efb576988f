//! Per-route access requirements.
//!
//! Routes are declared once at startup, either on their own or inside a
//! [`RouteGroup`] (the set of handlers mounted by one router or controller).
//! A mode set on the route itself wins over the group's mode; with neither,
//! the route requires [`AccessMode::Online`].
//!
//! # Example
//!
//! ```rust
//! use shopify_auth_guard::{AccessMode, AccessPolicy, RouteGroup};
//!
//! let policy = AccessPolicy::builder()
//!     .group(
//!         RouteGroup::new("shop")
//!             .access_mode(AccessMode::Offline)
//!             .route("/shop/orders")
//!             .route_with_mode("/shop/me", AccessMode::Online),
//!     )
//!     .route("/graphql")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(policy.required_access_mode("/shop/orders"), AccessMode::Offline);
//! assert_eq!(policy.required_access_mode("/shop/me"), AccessMode::Online);
//! assert_eq!(policy.required_access_mode("/graphql"), AccessMode::Online);
//! ```

use crate::auth::AccessMode;
use crate::error::ConfigError;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
struct RouteAccess {
    group_mode: Option<AccessMode>,
    handler_mode: Option<AccessMode>,
}

impl RouteAccess {
    fn resolve(&self) -> AccessMode {
        self.handler_mode.or(self.group_mode).unwrap_or_default()
    }
}

/// A named set of routes sharing a group-level access mode.
#[derive(Clone, Debug, Default)]
pub struct RouteGroup {
    name: String,
    mode: Option<AccessMode>,
    routes: Vec<(String, Option<AccessMode>)>,
}

impl RouteGroup {
    /// Creates an empty group without a group-level mode.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the mode inherited by member routes that declare none.
    #[must_use]
    pub const fn access_mode(mut self, mode: AccessMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Adds a route that inherits the group's mode.
    #[must_use]
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.routes.push((route.into(), None));
        self
    }

    /// Adds a route with its own mode, overriding the group's.
    #[must_use]
    pub fn route_with_mode(mut self, route: impl Into<String>, mode: AccessMode) -> Self {
        self.routes.push((route.into(), Some(mode)));
        self
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable mapping from route key to required [`AccessMode`].
///
/// Route keys are matched exactly. With axum they are the route patterns
/// passed to `Router::route`, e.g. `/products/:id`. When the guarded router
/// is nested under the configured global prefix,
/// [`MatchedPath`](axum::extract::MatchedPath) carries the prefix too; if
/// that key is not declared, the middleware retries without the prefix, so
/// keys may be declared either with or without it.
#[derive(Clone, Debug, Default)]
pub struct AccessPolicy {
    routes: HashMap<String, RouteAccess>,
}

impl AccessPolicy {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// Returns the access mode `route` requires.
    ///
    /// The route's own mode takes precedence over its group's; unknown
    /// routes and routes without any marker require online access.
    #[must_use]
    pub fn required_access_mode(&self, route: &str) -> AccessMode {
        self.routes
            .get(route)
            .map_or_else(AccessMode::default, RouteAccess::resolve)
    }

    /// Returns `true` if `route` was declared.
    #[must_use]
    pub fn contains(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }
}

/// Builder for [`AccessPolicy`].
#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    groups: Vec<RouteGroup>,
    routes: Vec<(String, Option<AccessMode>)>,
}

impl AccessPolicyBuilder {
    /// Adds a group of routes.
    #[must_use]
    pub fn group(mut self, group: RouteGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds an ungrouped route with no explicit mode.
    #[must_use]
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.routes.push((route.into(), None));
        self
    }

    /// Adds an ungrouped route with an explicit mode.
    #[must_use]
    pub fn route_with_mode(mut self, route: impl Into<String>, mode: AccessMode) -> Self {
        self.routes.push((route.into(), Some(mode)));
        self
    }

    /// Builds the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRoute`] if a route key is declared
    /// more than once, across groups or within one.
    pub fn build(self) -> Result<AccessPolicy, ConfigError> {
        let grouped = self.groups.into_iter().flat_map(|group| {
            let group_mode = group.mode;
            group
                .routes
                .into_iter()
                .map(move |(route, handler_mode)| (route, group_mode, handler_mode))
        });
        let ungrouped = self
            .routes
            .into_iter()
            .map(|(route, handler_mode)| (route, None, handler_mode));

        let mut routes = HashMap::new();
        for (route, group_mode, handler_mode) in grouped.chain(ungrouped) {
            if routes.contains_key(&route) {
                return Err(ConfigError::DuplicateRoute { route });
            }
            routes.insert(
                route,
                RouteAccess {
                    group_mode,
                    handler_mode,
                },
            );
        }

        Ok(AccessPolicy { routes })
    }
}

// Verify AccessPolicy is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AccessPolicy>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmarked_and_unknown_routes_default_to_online() {
        let policy = AccessPolicy::builder()
            .route("/plain")
            .group(RouteGroup::new("bare").route("/bare/list"))
            .build()
            .unwrap();

        assert_eq!(policy.required_access_mode("/plain"), AccessMode::Online);
        assert_eq!(policy.required_access_mode("/bare/list"), AccessMode::Online);
        assert_eq!(policy.required_access_mode("/missing"), AccessMode::Online);
        assert!(!policy.contains("/missing"));
    }

    #[test]
    fn test_route_inherits_group_mode() {
        let policy = AccessPolicy::builder()
            .group(
                RouteGroup::new("shop")
                    .access_mode(AccessMode::Offline)
                    .route("/shop/orders"),
            )
            .build()
            .unwrap();

        assert_eq!(policy.required_access_mode("/shop/orders"), AccessMode::Offline);
    }

    #[test]
    fn test_handler_mode_overrides_group_mode() {
        let policy = AccessPolicy::builder()
            .group(
                RouteGroup::new("shop")
                    .access_mode(AccessMode::Offline)
                    .route_with_mode("/shop/me", AccessMode::Online),
            )
            .group(
                RouteGroup::new("user")
                    .access_mode(AccessMode::Online)
                    .route_with_mode("/user/sync", AccessMode::Offline),
            )
            .build()
            .unwrap();

        assert_eq!(policy.required_access_mode("/shop/me"), AccessMode::Online);
        assert_eq!(policy.required_access_mode("/user/sync"), AccessMode::Offline);
    }

    #[test]
    fn test_ungrouped_route_with_mode() {
        let policy = AccessPolicy::builder()
            .route_with_mode("/webhooks/sync", AccessMode::Offline)
            .build()
            .unwrap();

        assert_eq!(policy.required_access_mode("/webhooks/sync"), AccessMode::Offline);
    }

    #[test]
    fn test_duplicate_routes_are_rejected() {
        let result = AccessPolicy::builder()
            .group(RouteGroup::new("a").route("/same"))
            .route("/same")
            .build();

        assert_eq!(
            result.unwrap_err(),
            ConfigError::DuplicateRoute {
                route: "/same".to_string()
            }
        );
    }

    #[test]
    fn test_route_group_name() {
        assert_eq!(RouteGroup::new("shop").name(), "shop");
    }
}
