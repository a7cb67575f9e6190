//! Read-only request view consumed by the matcher.

use http::header::HOST;

/// The three request properties routing depends on.
pub trait RequestView {
	/// Request method as sent by the client (any case).
	fn method(&self) -> &str;

	/// URI path, without query string.
	fn path(&self) -> &str;

	/// Host name without port; empty when unknown.
	fn host(&self) -> &str;
}

/// Plain owned request triad, useful for tests and tooling.
///
/// # Examples
///
/// ```
/// use waymark_routers::{RequestParts, RequestView};
///
/// let req = RequestParts::new("get", "/users/42").with_host("api.example.com");
/// assert_eq!(req.method(), "get");
/// assert_eq!(req.host(), "api.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
	method: String,
	path: String,
	host: String,
}

impl RequestParts {
	/// Create a request for `localhost`.
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			path: path.into(),
			host: "localhost".to_string(),
		}
	}

	/// Set the host; a trailing `:port` is dropped.
	pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
		self.host = strip_port(host.as_ref()).to_string();
		self
	}
}

impl RequestView for RequestParts {
	fn method(&self) -> &str {
		&self.method
	}

	fn path(&self) -> &str {
		&self.path
	}

	fn host(&self) -> &str {
		&self.host
	}
}

impl<B> RequestView for http::Request<B> {
	fn method(&self) -> &str {
		http::Request::method(self).as_str()
	}

	fn path(&self) -> &str {
		self.uri().path()
	}

	fn host(&self) -> &str {
		if let Some(host) = self.uri().host() {
			return host;
		}
		self.headers()
			.get(HOST)
			.and_then(|v| v.to_str().ok())
			.map(strip_port)
			.unwrap_or("")
	}
}

impl<T: RequestView + ?Sized> RequestView for &T {
	fn method(&self) -> &str {
		(**self).method()
	}

	fn path(&self) -> &str {
		(**self).path()
	}

	fn host(&self) -> &str {
		(**self).host()
	}
}

fn strip_port(host: &str) -> &str {
	// Bracketed IPv6 literals keep their colons.
	if let Some(end) = host.find(']') {
		return &host[..=end];
	}
	match host.rsplit_once(':') {
		Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
		_ => host,
	}
}
