//! Routing error types.

use thiserror::Error;

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Errors raised while registering, matching or reversing routes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoutingError {
	/// A setup step needs configuration that was not provided.
	#[error("missing configuration: {0}")]
	MissingConfiguration(String),

	/// No route exists for a name, or strict matching found no candidate.
	#[error("route not found: {0}")]
	RouteNotFound(String),

	/// Reverse routing left a required placeholder without a value.
	#[error("missing required parameter \"{parameter}\" for route \"{route}\"")]
	MissingRouteParameter {
		/// Route name being reversed.
		route: String,
		/// Placeholder that received no value.
		parameter: String,
	},

	/// A path template (or one of its validation rules) is not a valid pattern.
	#[error("invalid pattern for route {route}: {source}")]
	InvalidPattern {
		/// Route label.
		route: String,
		/// Underlying regex error.
		#[source]
		source: regex::Error,
	},

	/// Registration attempted after the collection was sealed.
	#[error("route collection is sealed; no further registration is allowed")]
	CollectionSealed,

	/// A query ran before the router was sealed.
	#[error("router is not sealed; call seal() before matching")]
	NotSealed,

	/// The matcher was handed a route still in its building state.
	#[error("route {0} is still being built")]
	RouteNotSealed(String),

	/// A module routes file could not be read or parsed.
	#[error("failed to load module '{module}' from {path}: {message}")]
	ModuleLoad {
		/// Module identifier.
		module: String,
		/// Routes file path.
		path: String,
		/// Parse or read failure.
		message: String,
	},

	/// `modules_glob` is not a valid glob pattern.
	#[error("invalid modules glob: {0}")]
	ModulesGlob(#[from] glob::PatternError),

	/// Filesystem failure during module discovery.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Route table snapshot could not be written or restored.
	#[error("snapshot error: {0}")]
	Snapshot(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_missing_parameter_names_the_parameter() {
		let err = RoutingError::MissingRouteParameter {
			route: "user_detail".to_string(),
			parameter: "user_id".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"missing required parameter \"user_id\" for route \"user_detail\""
		);
	}

	#[rstest]
	fn test_route_not_found_display() {
		assert_eq!(
			RoutingError::RouteNotFound("GET /nope".to_string()).to_string(),
			"route not found: GET /nope"
		);
	}
}
