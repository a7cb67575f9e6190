//! Path normalization shared by registration, matching and reverse routing.

/// Normalize a path: single leading slash, no trailing slash, no empty
/// segments. The empty path maps to the root.
///
/// # Examples
///
/// ```
/// use waymark_routers::path::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("users/"), "/users");
/// assert_eq!(normalize_path("//api//v1/"), "/api/v1");
/// ```
pub fn normalize_path(path: &str) -> String {
	let mut normalized = String::with_capacity(path.len() + 1);
	for segment in path.split('/').filter(|s| !s.is_empty()) {
		normalized.push('/');
		normalized.push_str(segment);
	}

	if normalized.is_empty() {
		normalized.push('/');
	}
	normalized
}

/// Normalize an incoming request path: single leading slash, no trailing
/// slash, empty maps to the root. Interior empty segments are kept, so
/// `/users//42` does not match `/users/{id}`.
///
/// # Examples
///
/// ```
/// use waymark_routers::path::normalize_request_path;
///
/// assert_eq!(normalize_request_path(""), "/");
/// assert_eq!(normalize_request_path("//users/42/"), "/users/42");
/// assert_eq!(normalize_request_path("/users//42"), "/users//42");
/// ```
pub fn normalize_request_path(path: &str) -> String {
	let trimmed = path.trim_matches('/');
	let mut normalized = String::with_capacity(trimmed.len() + 1);
	normalized.push('/');
	normalized.push_str(trimmed);
	normalized
}

/// Join a prefix and a path into a normalized path.
///
/// # Examples
///
/// ```
/// use waymark_routers::path::join_paths;
///
/// assert_eq!(join_paths("/api/", "/users"), "/api/users");
/// assert_eq!(join_paths("", "users"), "/users");
/// assert_eq!(join_paths("/api", "/"), "/api");
/// ```
pub fn join_paths(prefix: &str, path: &str) -> String {
	normalize_path(&format!("{}/{}", prefix, path))
}
