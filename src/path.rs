//! URL path composition for auth routes.
//!
//! Base paths and the global routing prefix are configured independently and
//! may each carry leading or trailing slashes, or be empty. [`join_paths`]
//! combines them so that generated URLs never contain `//` and never end in a
//! slash before the query string.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth_guard::path::join_paths;
//!
//! assert_eq!(join_paths(["", "user", "callback"]), "user/callback");
//! assert_eq!(join_paths(["/", "user/", "/callback"]), "user/callback");
//! assert_eq!(join_paths(["/api/", "//shop", "auth"]), "/api/shop/auth");
//! ```

use crate::config::BasePath;

/// Joins path segments with single `/` separators.
///
/// Empty segments (and segments made only of slashes) are no-ops, and runs of
/// `/` inside or between segments collapse into one. The result starts with
/// `/` only if the first non-empty segment does; it never ends with `/`.
///
/// Joining is idempotent: `join_paths([join_paths([a, b]), c])` equals
/// `join_paths([a, b, c])`.
pub fn join_paths<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut leading_slash = None;
    let mut parts: Vec<String> = Vec::new();

    for segment in segments {
        let segment = segment.as_ref();
        let mut pieces = segment.split('/').filter(|piece| !piece.is_empty()).peekable();
        if pieces.peek().is_none() {
            continue;
        }

        leading_slash.get_or_insert_with(|| segment.starts_with('/'));
        parts.extend(pieces.map(str::to_string));
    }

    let joined = parts.join("/");
    if leading_slash == Some(true) {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Returns the path of the auth endpoint under `base_path`, relative to the
/// host root (no leading slash).
///
/// For an empty prefix and base path `user` this is `user/auth`.
#[must_use]
pub fn auth_path(global_prefix: &BasePath, base_path: &BasePath) -> String {
    let path = join_paths([global_prefix.as_ref(), base_path.as_ref(), "auth"]);
    relative(&path).to_string()
}

/// Returns the absolute OAuth callback path under `base_path`, as passed to
/// the provider by an OAuth start handler.
///
/// For an empty prefix and base path `user` this is `/user/callback`.
#[must_use]
pub fn callback_path(global_prefix: &BasePath, base_path: &BasePath) -> String {
    let path = join_paths([global_prefix.as_ref(), base_path.as_ref(), "callback"]);
    format!("/{}", relative(&path))
}

/// Removes the global routing prefix from a matched route.
///
/// A router nested under the prefix reports routes with the prefix in front
/// (`/api/shop/orders` for `/shop/orders` nested under `/api`). Routes not
/// under the prefix are returned unchanged, as are all routes when the
/// prefix is empty.
#[must_use]
pub fn strip_route_prefix<'a>(route: &'a str, global_prefix: &BasePath) -> &'a str {
    let prefix = join_paths([global_prefix.as_ref()]);
    let prefix = relative(&prefix);
    if prefix.is_empty() {
        return route;
    }

    match relative(route).strip_prefix(prefix) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => route,
    }
}

fn relative(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
