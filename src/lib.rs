//! # Waymark
//!
//! HTTP request routing: register routes with path templates, group them
//! under shared prefixes and middleware, load them from module route files,
//! match incoming requests and generate paths back from route names.
//!
//! This crate re-exports the Waymark crates:
//!
//! - [`routers`] - route definitions, groups, matching and reverse routing
//! - [`conf`] - layered router settings
//!
//! ## Quick Start
//!
//! ```
//! use waymark::prelude::*;
//!
//! let mut router = Router::new(RouterSettings::default());
//! router
//!     .get("/posts/{slug?}", "PostController@show")
//!     .unwrap()
//!     .name("posts.show")
//!     .default("slug", "latest");
//! router.fallback("NotFoundController").unwrap();
//! router.seal().unwrap();
//!
//! let found = router.match_or_fail(&RequestParts::new("GET", "/posts")).unwrap();
//! assert_eq!(found.param("slug"), Some("latest"));
//!
//! let missing = router.match_or_fail(&RequestParts::new("GET", "/missing")).unwrap();
//! assert!(missing.is_fallback());
//! ```

pub use waymark_conf as conf;
pub use waymark_routers as routers;

pub use waymark_conf::{RouterSettings, SettingsBuilder};
pub use waymark_routers::{
	GroupNode, GroupOptions, Handler, MatchResult, ModuleLoader, PendingRoute, RequestParts,
	RequestView, RouteCollection, RouteDefinition, RouteGroup, RouteMatch, Router, RoutingError,
	RoutingResult,
};

pub mod prelude {
	pub use crate::{
		GroupNode, GroupOptions, Handler, MatchResult, PendingRoute, RequestParts, RequestView,
		RouteMatch, Router, RouterSettings, RoutingError, RoutingResult, SettingsBuilder,
	};
}
