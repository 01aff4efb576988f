//! Validated newtype wrappers for configuration values.
//!
//! Invalid values are rejected on construction with clear error messages, so
//! the guard never has to re-validate them per request.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Shopify API key.
///
/// The key is the expected `aud` claim of App Bridge session tokens.
///
/// # Example
///
/// ```rust
/// use shopify_auth_guard::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// The `Debug` implementation masks the value, displaying only
/// `ApiSecretKey(*****)`, so the secret never reaches logs.
///
/// # Example
///
/// ```rust
/// use shopify_auth_guard::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated Shopify shop domain, the tenant identifier.
///
/// Short names are normalized to the full `shop.myshopify.com` form. Any
/// other domain is rejected, which keeps arbitrary hosts out of the
/// reauthorization URLs built from request data.
///
/// # Example
///
/// ```rust
/// use shopify_auth_guard::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// let domain = ShopDomain::from_url("https://my-store.myshopify.com").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is invalid.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into();
        let domain = domain.trim().to_lowercase();

        if domain.is_empty() {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        let (shop_name, full_domain) = if let Some(shop_name) = domain.strip_suffix(Self::SUFFIX) {
            (shop_name.to_string(), domain)
        } else if domain.contains('.') {
            return Err(ConfigError::InvalidShopDomain { domain });
        } else {
            (domain.clone(), format!("{}{}", domain, Self::SUFFIX))
        };

        if !Self::is_valid_shop_name(&shop_name) {
            return Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain,
        })
    }

    /// Creates a shop domain from a URL such as a session token's `dest`
    /// claim, stripping the `https://` scheme prefix first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if what remains is not a
    /// valid shop domain.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        Self::new(url.strip_prefix("https://").unwrap_or(url))
    }

    /// Returns the shop name portion of the domain.
    ///
    /// For `my-store.myshopify.com`, this returns `my-store`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    fn is_valid_shop_name(name: &str) -> bool {
        if name.is_empty() {
            return false;
        }

        // Lowercase letters, digits and hyphens, no leading/trailing hyphen
        if name.starts_with('-') || name.ends_with('-') {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated URL path used as an auth base path or global routing prefix.
///
/// The path may be empty. Leading and trailing slashes are accepted and are
/// normalized away when the path is joined with other segments.
///
/// # Example
///
/// ```rust
/// use shopify_auth_guard::BasePath;
///
/// let path = BasePath::new("/user/").unwrap();
/// assert_eq!(path.as_ref(), "/user/");
///
/// assert!(BasePath::new("user?shop=x").is_err());
/// assert!(BasePath::new("").is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
    /// Creates a new validated base path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBasePath`] if the path contains a query
    /// string, a fragment, whitespace, or a `..` segment.
    pub fn new(path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();

        let reason = if path.contains('?') {
            Some("must not contain a query string")
        } else if path.contains('#') {
            Some("must not contain a fragment")
        } else if path.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else if path.split('/').any(|segment| segment == "..") {
            Some("must not contain '..' segments")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConfigError::InvalidBasePath { path, reason }),
            None => Ok(Self(path)),
        }
    }

    /// Returns `true` if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.split('/').all(str::is_empty)
    }
}

impl AsRef<str> for BasePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
