//! # Waymark Routers
//!
//! Request routing for Waymark: resolves a request's method, path and host to
//! a registered route, extracts path parameters, and generates paths back from
//! route names.
//!
//! ## Features
//!
//! - Path templates with required (`{id}`) and optional (`{slug?}`) placeholders
//! - Per-parameter validation rules (`numeric`, `alpha`, `regex:...`)
//! - Route groups with inherited prefix, middleware, validation and defaults
//! - Subdomain constraints, localized alternate paths and redirects
//! - Longest-prefix fallback routes
//! - Diagnostic matching with a per-candidate trace
//! - Module route files (TOML or JSON) and route table snapshots
//!
//! ## Quick Start
//!
//! ```
//! use waymark_routers::{GroupOptions, RequestParts, Router};
//!
//! let mut router = Router::default();
//! router.get("/", "HomeController@index").unwrap().name("home");
//!
//! let mut api = router.group(GroupOptions::new().with_prefix("/api").with_middleware("auth"));
//! api.get("/users/{id}", "UserController@show")
//!     .unwrap()
//!     .name("users.show")
//!     .valid("id", "numeric");
//! api.fallback("ApiController@notFound").unwrap();
//!
//! router.seal().unwrap();
//!
//! let found = router
//!     .match_request(&RequestParts::new("GET", "/api/users/42"))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(found.param("id"), Some("42"));
//! assert_eq!(found.route.middleware(), ["auth"]);
//!
//! let missing = router
//!     .match_request(&RequestParts::new("GET", "/api/unknown"))
//!     .unwrap()
//!     .unwrap();
//! assert!(missing.is_fallback());
//!
//! assert_eq!(router.url("users.show", &[("id", "7")]).unwrap(), "/api/users/7");
//! ```

pub mod collection;
pub mod error;
pub mod group;
pub mod loader;
pub mod matcher;
pub mod path;
pub mod pattern;
pub mod request;
pub mod reverse;
pub mod route;
pub mod router;

pub use collection::{RouteBuilder, RouteCollection};
pub use error::{RoutingError, RoutingResult};
pub use group::{GroupNode, GroupOptions, PendingRoute, RouteGroup};
pub use loader::{DiscoveredModule, ModuleLoader};
pub use matcher::{AttemptStatus, Diagnostics, MatchAttempt, MatchResult, RouteMatch, RouteMatcher};
pub use request::{RequestParts, RequestView};
pub use reverse::UrlParams;
pub use route::{
	FallbackTarget, Handler, IntoMiddleware, IntoRules, ParamValue, RouteDefinition,
	RouteExtensions, RouteState, ValidationRule,
};
pub use router::Router;

/// Commonly used types.
pub mod prelude {
	pub use crate::{
		GroupNode, GroupOptions, Handler, MatchResult, PendingRoute, RequestParts, RequestView,
		RouteMatch, Router, RoutingError, RoutingResult,
	};
}
