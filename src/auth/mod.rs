//! Sessions, scopes and session tokens.
//!
//! This module holds everything the guard needs to turn a request into a
//! [`Session`] (or the absence of one):
//!
//! - [`AccessMode`]: online (per-user) or offline (per-shop) access
//! - [`AuthScopes`]: a set of OAuth scopes with implied scope handling
//! - [`Session`]: a stored session, read-only from the guard's perspective
//! - [`TokenDecoder`] / [`JwtTokenDecoder`]: App Bridge session token decoding
//! - [`SessionStorage`] / [`MemorySessionStorage`]: keyed session storage
//! - [`SessionResolver`] / [`StorageSessionResolver`]: finding a request's session
//!
//! # Session Types
//!
//! - **Offline sessions** are app-level tokens stored under
//!   `offline_<shop>`. Used for background work and most API routes.
//! - **Online sessions** are user-specific tokens that expire, stored under
//!   `<shop>_<user id>`.

mod access_mode;
mod error;
mod resolver;
mod scopes;
mod session;
mod session_token;
mod storage;

pub use access_mode::{AccessMode, ParseAccessModeError};
pub use error::AuthError;
pub use resolver::{SessionResolver, StorageSessionResolver, SESSION_COOKIE};
pub use scopes::AuthScopes;
pub use session::Session;
pub use session_token::{JwtTokenDecoder, SessionTokenPayload, TokenDecoder};
pub use storage::{MemorySessionStorage, SessionStorage};
