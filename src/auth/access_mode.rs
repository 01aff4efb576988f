//! Access levels a route can require.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of credential a route requires.
///
/// - **Online**: a short-lived token tied to one admin user. The default.
/// - **Offline**: a long-lived token for the shop as a whole.
///
/// # Example
///
/// ```rust
/// use shopify_auth_guard::AccessMode;
///
/// assert_eq!(AccessMode::default(), AccessMode::Online);
/// assert_eq!("offline".parse::<AccessMode>().unwrap(), AccessMode::Offline);
/// assert_eq!(AccessMode::Offline.to_string(), "offline");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Per-user access.
    #[default]
    Online,
    /// Shop-level access.
    Offline,
}

impl AccessMode {
    /// Returns the lowercase string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    /// Returns `true` for [`AccessMode::Online`].
    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown access mode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown access mode '{0}'. Expected 'online' or 'offline'.")]
pub struct ParseAccessModeError(String);

impl FromStr for AccessMode {
    type Err = ParseAccessModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(ParseAccessModeError(s.to_string())),
        }
    }
}
