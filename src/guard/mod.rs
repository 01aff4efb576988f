//! Request guarding.
//!
//! For every protected request:
//!
//! 1. [`AccessPolicy`] says which [`AccessMode`](crate::AccessMode) the route
//!    requires.
//! 2. A [`SessionResolver`](crate::auth::SessionResolver) looks up the
//!    request's session for that mode.
//! 3. [`ReauthDecisionEngine`] turns session and request into a [`Decision`].
//! 4. Anything but [`Decision::Authorized`] is rendered by
//!    [`ReauthResponder`].
//!
//! [`ShopifyAuth`] and [`require_shopify_auth`] wire these steps into an
//! axum router.

mod decision;
mod engine;
mod middleware;
mod policy;
mod request;
pub mod responder;

pub use decision::Decision;
pub use engine::ReauthDecisionEngine;
pub use middleware::{require_shopify_auth, CurrentSession, MissingSession, Shop, ShopifyAuth};
pub use policy::{AccessPolicy, AccessPolicyBuilder, RouteGroup};
pub use request::RequestContext;
pub use responder::ReauthResponder;
