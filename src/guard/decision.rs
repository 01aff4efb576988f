//! The outcome of guarding one request.

use crate::config::ShopDomain;
use std::fmt;

/// What to do with a protected request.
///
/// Produced fresh for every request and never persisted. Every variant is
/// terminal: the request either proceeds or is answered by the
/// [`ReauthResponder`](crate::guard::ReauthResponder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// A valid session exists; the request proceeds to its handler.
    Authorized,

    /// An embedded client must re-run OAuth; answered with 401 and the
    /// reauthorization headers.
    ReauthViaHeader {
        /// The shop to reauthorize.
        shop: ShopDomain,
    },

    /// A top-level navigation must re-run offline OAuth; answered with a 302
    /// to the offline auth endpoint.
    ReauthViaRedirect {
        /// The shop to reauthorize.
        shop: ShopDomain,
    },

    /// No tenant identity is derivable; answered with the generic denial.
    Denied,
}

impl Decision {
    /// Returns `true` for [`Decision::Authorized`].
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Returns the shop of a reauthorization decision.
    #[must_use]
    pub const fn shop(&self) -> Option<&ShopDomain> {
        match self {
            Self::ReauthViaHeader { shop } | Self::ReauthViaRedirect { shop } => Some(shop),
            Self::Authorized | Self::Denied => None,
        }
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::ReauthViaHeader { .. } => "reauth_via_header",
            Self::ReauthViaRedirect { .. } => "reauth_via_redirect",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
