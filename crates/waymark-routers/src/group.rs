//! Route groups: shared prefix, middleware, validation and defaults.
//!
//! Groups can be used two ways:
//!
//! - live, through [`Router::group`], where every registration goes straight
//!   into the router with the group's options applied;
//! - as a tree of [`GroupNode`]s built up front and mounted once with
//!   [`Router::mount`].
//!
//! Both paths compose options with [`GroupOptions::nest`] and register routes
//! through the same code, so the result does not depend on the style used.

use crate::collection::RouteBuilder;
use crate::error::RoutingResult;
use crate::path::{join_paths, normalize_path};
use crate::route::{
	FALLBACK, FallbackTarget, Handler, IntoMiddleware, IntoRules, ParamValue, REDIRECT,
	RouteDefinition, ValidationRule,
};
use crate::router::Router;
use indexmap::IndexMap;

/// Options shared by every route of a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupOptions {
	pub prefix: String,
	pub middleware: Vec<String>,
	pub validation: IndexMap<String, Vec<ValidationRule>>,
	pub defaults: IndexMap<String, ParamValue>,
}

impl GroupOptions {
	pub fn new() -> Self {
		<Self as Default>::default()
	}

	/// Set the path prefix.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::GroupOptions;
	///
	/// let options = GroupOptions::new().with_prefix("/api").with_middleware("auth");
	/// assert_eq!(options.full_path("users"), "/api/users");
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Append middleware.
	pub fn with_middleware(mut self, middleware: impl IntoMiddleware) -> Self {
		self.middleware.extend(middleware.into_middleware());
		self
	}

	/// Set validation rules for a parameter.
	pub fn valid(mut self, param: impl Into<String>, rules: impl IntoRules) -> Self {
		self.validation.insert(param.into(), rules.into_rules());
		self
	}

	/// Set a default for a parameter.
	pub fn default(mut self, param: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.defaults.insert(param.into(), value.into());
		self
	}

	/// Compose `child` under `self`.
	///
	/// Prefixes are joined and middleware concatenated (parent first, no
	/// dedup). Validation and defaults are merged key by key with the child
	/// winning.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::GroupOptions;
	///
	/// let parent = GroupOptions::new().with_prefix("/api").with_middleware("auth");
	/// let child = GroupOptions::new().with_prefix("v1").with_middleware(["auth", "throttle"]);
	///
	/// let nested = parent.nest(&child);
	/// assert_eq!(nested.prefix, "/api/v1");
	/// assert_eq!(nested.middleware, ["auth", "auth", "throttle"]);
	/// ```
	pub fn nest(&self, child: &GroupOptions) -> GroupOptions {
		let mut validation = self.validation.clone();
		validation.extend(child.validation.clone());
		let mut defaults = self.defaults.clone();
		defaults.extend(child.defaults.clone());

		GroupOptions {
			prefix: join_paths(&self.prefix, &child.prefix),
			middleware: self
				.middleware
				.iter()
				.chain(&child.middleware)
				.cloned()
				.collect(),
			validation,
			defaults,
		}
	}

	/// Full path of `path` registered under this group.
	pub fn full_path(&self, path: &str) -> String {
		join_paths(&self.prefix, path)
	}

	/// Register `route` under these options.
	///
	/// Order: full path, then group middleware followed by route middleware,
	/// then group validation and defaults, then route validation and
	/// defaults (route entries overwrite group entries with the same key).
	pub(crate) fn register<'a>(
		&self,
		router: &'a mut Router,
		route: PendingRoute,
		module: Option<&str>,
	) -> RoutingResult<RouteBuilder<'a>> {
		let definition = RouteDefinition::new(&route.method, self.full_path(&route.path), route.handler);
		let mut builder = router
			.collection_mut()
			.add(definition)?
			.middleware(self.middleware.clone())
			.middleware(route.middleware);

		for (param, rules) in &self.validation {
			builder = builder.valid(param.clone(), rules.clone());
		}
		for (param, value) in &self.defaults {
			builder = builder.default(param.clone(), value.clone());
		}
		for (param, rules) in route.validation {
			builder = builder.valid(param, rules);
		}
		for (param, value) in route.defaults {
			builder = builder.default(param, value);
		}
		if let Some(name) = route.name {
			builder = builder.name(name);
		}
		if let Some(module) = module {
			builder = builder.module(module);
		}
		Ok(builder)
	}
}

/// A route waiting to be registered through a group.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRoute {
	pub method: String,
	pub path: String,
	pub handler: Handler,
	pub name: Option<String>,
	pub middleware: Vec<String>,
	pub validation: IndexMap<String, Vec<ValidationRule>>,
	pub defaults: IndexMap<String, ParamValue>,
}

impl PendingRoute {
	pub fn new(method: impl Into<String>, path: impl Into<String>, handler: impl Into<Handler>) -> Self {
		Self {
			method: method.into(),
			path: path.into(),
			handler: handler.into(),
			name: None,
			middleware: Vec::new(),
			validation: IndexMap::new(),
			defaults: IndexMap::new(),
		}
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn middleware(mut self, middleware: impl IntoMiddleware) -> Self {
		self.middleware.extend(middleware.into_middleware());
		self
	}

	pub fn valid(mut self, param: impl Into<String>, rules: impl IntoRules) -> Self {
		self.validation.insert(param.into(), rules.into_rules());
		self
	}

	pub fn default(mut self, param: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.defaults.insert(param.into(), value.into());
		self
	}
}

/// A live group bound to a router.
///
/// # Examples
///
/// ```
/// use waymark_routers::{GroupOptions, Router};
///
/// let mut router = Router::default();
/// let mut api = router.group(GroupOptions::new().with_prefix("/api").with_middleware("auth"));
/// api.get("/users", "UserController@index").unwrap();
///
/// let mut admin = api.group(GroupOptions::new().with_prefix("/admin").with_middleware("admin"));
/// admin.get("/stats", "StatsController@show").unwrap();
///
/// let stats = router.routes().iter().last().unwrap();
/// assert_eq!(stats.path(), "/api/admin/stats");
/// assert_eq!(stats.middleware(), ["auth", "admin"]);
/// ```
pub struct RouteGroup<'r> {
	router: &'r mut Router,
	options: GroupOptions,
}

impl<'r> RouteGroup<'r> {
	pub(crate) fn new(router: &'r mut Router, options: GroupOptions) -> Self {
		Self { router, options }
	}

	/// Composed options of this group.
	pub fn options(&self) -> &GroupOptions {
		&self.options
	}

	pub fn get(&mut self, path: &str, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		self.add_route("GET", path, handler)
	}

	pub fn post(&mut self, path: &str, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		self.add_route("POST", path, handler)
	}

	pub fn put(&mut self, path: &str, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		self.add_route("PUT", path, handler)
	}

	pub fn patch(&mut self, path: &str, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		self.add_route("PATCH", path, handler)
	}

	pub fn delete(&mut self, path: &str, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		self.add_route("DELETE", path, handler)
	}

	/// Register a route with any method under this group.
	pub fn add_route(
		&mut self,
		method: &str,
		path: &str,
		handler: impl Into<Handler>,
	) -> RoutingResult<RouteBuilder<'_>> {
		self.add(PendingRoute::new(method, path, handler))
	}

	/// Register a fully described route under this group.
	pub fn add(&mut self, route: PendingRoute) -> RoutingResult<RouteBuilder<'_>> {
		self.options.register(self.router, route, None)
	}

	/// Redirect `from` (under the group prefix) to `to`.
	pub fn redirect(&mut self, from: &str, to: &str, status: u16) -> RoutingResult<RouteBuilder<'_>> {
		Ok(self
			.add_route(REDIRECT, from, to)?
			.attr("status", status))
	}

	/// Fallback for unmatched paths under the group prefix.
	pub fn fallback(&mut self, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		let handler = handler.into();
		let prefix = normalize_path(&self.options.prefix);
		let builder = self.add_route(FALLBACK, "/", handler.clone())?;
		Ok(builder.fallback_target(FallbackTarget { handler, prefix }))
	}

	/// Nested group with options composed under this one.
	pub fn group(&mut self, options: GroupOptions) -> RouteGroup<'_> {
		let options = self.options.nest(&options);
		RouteGroup::new(self.router, options)
	}

	/// Nested group handed to `define`.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::{GroupOptions, Router};
	///
	/// let mut router = Router::default();
	/// router
	///     .group(GroupOptions::new().with_prefix("/api"))
	///     .nest(GroupOptions::new().with_prefix("/v1"), |v1| {
	///         v1.get("/ping", "ping")?;
	///         v1.nest(GroupOptions::new().with_prefix("/admin"), |admin| {
	///             admin.get("/stats", "stats")?;
	///             Ok(())
	///         })
	///     })
	///     .unwrap();
	///
	/// let paths: Vec<_> = router.routes().iter().map(|r| r.path()).collect();
	/// assert_eq!(paths, ["/api/v1/ping", "/api/v1/admin/stats"]);
	/// ```
	pub fn nest<F>(&mut self, options: GroupOptions, define: F) -> RoutingResult<()>
	where
		F: FnOnce(&mut RouteGroup<'_>) -> RoutingResult<()>,
	{
		define(&mut self.group(options))
	}

	/// Mount an explicit group tree under this group.
	pub fn mount(&mut self, node: GroupNode) -> RoutingResult<usize> {
		node.materialize(self.router, &self.options)
	}

	/// Load a module's routes under this group, optionally under `prefix`.
	pub fn module(&mut self, identifier: &str, prefix: Option<&str>) -> RoutingResult<usize> {
		let options = self
			.options
			.nest(&GroupOptions::new().with_prefix(prefix.unwrap_or_default()));
		self.router.load_module(identifier, &options)
	}

	/// Add validation rules for routes registered after this call.
	pub fn valid(&mut self, param: impl Into<String>, rules: impl IntoRules) -> &mut Self {
		self.options.validation.insert(param.into(), rules.into_rules());
		self
	}

	/// Add a default for routes registered after this call.
	pub fn default(&mut self, param: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
		self.options.defaults.insert(param.into(), value.into());
		self
	}

	/// Add middleware for routes registered after this call.
	pub fn middleware(&mut self, middleware: impl IntoMiddleware) -> &mut Self {
		self.options.middleware.extend(middleware.into_middleware());
		self
	}
}

/// One node of an explicit group tree.
///
/// Routes and child groups keep their declaration order when mounted.
///
/// # Examples
///
/// ```
/// use waymark_routers::{GroupNode, GroupOptions, PendingRoute, Router};
///
/// let tree = GroupNode::new(GroupOptions::new().with_prefix("/api").with_middleware("auth"))
///     .route(PendingRoute::new("GET", "/users", "UserController@index").name("users"))
///     .nest(
///         GroupNode::new(GroupOptions::new().with_prefix("/admin").with_middleware("admin"))
///             .route(PendingRoute::new("GET", "/stats", "StatsController@show")),
///     );
///
/// let mut router = Router::default();
/// assert_eq!(router.mount(tree).unwrap(), 2);
/// assert_eq!(router.routes().by_name("users").unwrap().path(), "/api/users");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupNode {
	options: GroupOptions,
	entries: Vec<GroupEntry>,
}

#[derive(Debug, Clone, PartialEq)]
enum GroupEntry {
	Route(PendingRoute),
	Group(GroupNode),
}

impl GroupNode {
	pub fn new(options: GroupOptions) -> Self {
		Self {
			options,
			entries: Vec::new(),
		}
	}

	/// Add a route to this node.
	pub fn route(mut self, route: PendingRoute) -> Self {
		self.entries.push(GroupEntry::Route(route));
		self
	}

	/// Add a child group.
	pub fn nest(mut self, child: GroupNode) -> Self {
		self.entries.push(GroupEntry::Group(child));
		self
	}

	/// Register every route of the tree, depth first, returning the count.
	pub(crate) fn materialize(self, router: &mut Router, parent: &GroupOptions) -> RoutingResult<usize> {
		let options = parent.nest(&self.options);
		let mut registered = 0;
		for entry in self.entries {
			match entry {
				GroupEntry::Route(route) => {
					options.register(router, route, None)?;
					registered += 1;
				}
				GroupEntry::Group(child) => registered += child.materialize(router, &options)?,
			}
		}
		Ok(registered)
	}
}
