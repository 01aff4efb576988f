//! OAuth scope sets.
//!
//! [`AuthScopes`] is the normalized set of permission strings a session was
//! granted, and the set the app currently requires. The guard compares the
//! two with set equality: a session whose grant differs in any way from the
//! required set has to go through reauthorization.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A normalized set of OAuth scopes.
///
/// Parsing trims whitespace, drops empty entries and duplicates, and expands
/// implied scopes so that equality compares effective grants:
///
/// - `write_products` implies `read_products`
/// - `unauthenticated_write_products` implies `unauthenticated_read_products`
///
/// Equality ignores ordering entirely.
///
/// # Example
///
/// ```rust
/// use shopify_auth_guard::AuthScopes;
///
/// let granted: AuthScopes = "write_orders, read_products".parse().unwrap();
/// let required: AuthScopes = "read_products,read_orders,write_orders".parse().unwrap();
/// assert_eq!(granted, required);
///
/// let narrower: AuthScopes = "read_products".parse().unwrap();
/// assert_ne!(narrower, required);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: HashSet<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes, implied scopes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if `scope` is part of this set.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Returns an iterator over the scopes.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn add_implied_scopes(&mut self) {
        let implied: Vec<String> = self
            .scopes
            .iter()
            .filter_map(|scope| Self::implied_scope(scope))
            .collect();

        self.scopes.extend(implied);
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = HashSet::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            scopes.insert(scope.to_string());
        }

        let mut auth_scopes = Self { scopes };
        auth_scopes.add_implied_scopes();

        Ok(auth_scopes)
    }
}

impl From<Vec<String>> for AuthScopes {
    fn from(scopes: Vec<String>) -> Self {
        let scopes: HashSet<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mut auth_scopes = Self { scopes };
        auth_scopes.add_implied_scopes();

        auth_scopes
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scopes: Vec<&str> = self.iter().collect();
        scopes.sort_unstable();
        write!(f, "{}", scopes.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_scopes_parses_comma_separated() {
        let scopes: AuthScopes = "read_products, write_orders".parse().unwrap();
        assert!(scopes.contains("read_products"));
        assert!(scopes.contains("write_orders"));
    }

    #[test]
    fn test_auth_scopes_handles_implied_scopes() {
        let scopes: AuthScopes = "write_products".parse().unwrap();
        assert!(scopes.contains("write_products"));
        assert!(scopes.contains("read_products"));
        assert_eq!(scopes.len(), 2);

        let scopes: AuthScopes = "unauthenticated_write_products".parse().unwrap();
        assert!(scopes.contains("unauthenticated_read_products"));
    }

    #[test]
    fn test_auth_scopes_equality_ignores_order_and_duplicates() {
        let a: AuthScopes = "read_products,write_shipping".parse().unwrap();
        let b: AuthScopes = "write_shipping, read_products, read_products".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_auth_scopes_equality_is_not_subset_or_substring() {
        let required: AuthScopes = "write_shipping".parse().unwrap();

        let narrower: AuthScopes = "read_shipping".parse().unwrap();
        assert_ne!(narrower, required);

        let broader: AuthScopes = "write_shipping,read_orders".parse().unwrap();
        assert_ne!(broader, required);

        let prefixed: AuthScopes = "write_shipping_rates".parse().unwrap();
        assert_ne!(prefixed, required);
    }

    #[test]
    fn test_auth_scopes_rejects_invalid_characters() {
        let result: Result<AuthScopes, _> = "read products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_auth_scopes_from_vec() {
        let scopes = AuthScopes::from(vec!["write_orders".to_string(), " ".to_string()]);
        assert!(scopes.contains("read_orders"));
        assert_eq!(scopes.len(), 2);
    }

    #[test]
    fn test_auth_scopes_serializes_to_sorted_comma_separated_string() {
        let scopes: AuthScopes = "write_orders".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, r#""read_orders,write_orders""#);
    }

    #[test]
    fn test_auth_scopes_deserializes_from_comma_separated_string() {
        let scopes: AuthScopes = serde_json::from_str(r#""read_products,write_orders""#).unwrap();
        assert!(scopes.contains("read_orders"));
    }
}
