//! The router facade: registration, matching and reverse routing.

use crate::collection::{RouteBuilder, RouteCollection};
use crate::error::{RoutingError, RoutingResult};
use crate::group::{GroupNode, GroupOptions, PendingRoute, RouteGroup};
use crate::loader::ModuleLoader;
use crate::matcher::{MatchResult, RouteMatch, RouteMatcher};
use crate::request::RequestView;
use crate::reverse::{UrlParams, reverse, reverse_template, url_params};
use crate::route::{FALLBACK, FallbackTarget, Handler, REDIRECT, RouteDefinition};
use waymark_conf::RouterSettings;

/// Route registry and matcher.
///
/// Routes are registered while the router is open. [`seal`](Self::seal)
/// freezes the table and compiles every pattern; matching requires a sealed
/// router, reverse routing works in both states.
///
/// # Examples
///
/// ```
/// use waymark_routers::{RequestParts, Router};
///
/// let mut router = Router::default();
/// router
///     .get("/users/{id}", "UserController@show")
///     .unwrap()
///     .name("user_detail")
///     .valid("id", "numeric");
/// router.seal().unwrap();
///
/// let found = router
///     .match_request(&RequestParts::new("GET", "/users/42"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(found.param("id"), Some("42"));
///
/// assert_eq!(router.url("user_detail", &[("id", "7")]).unwrap(), "/users/7");
/// ```
#[derive(Debug, Default)]
pub struct Router {
	settings: RouterSettings,
	routes: RouteCollection,
	matcher: Option<RouteMatcher>,
}

impl Router {
	/// Create an open router.
	pub fn new(settings: RouterSettings) -> Self {
		Self {
			settings,
			routes: RouteCollection::new(),
			matcher: None,
		}
	}

	pub fn settings(&self) -> &RouterSettings {
		&self.settings
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

	/// Register a route with any method.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::CollectionSealed`] after [`seal`](Self::seal).
	pub fn add_route(
		&mut self,
		method: &str,
		path: &str,
		handler: impl Into<Handler>,
	) -> RoutingResult<RouteBuilder<'_>> {
		self.routes.add(RouteDefinition::new(method, path, handler))
	}

	/// Redirect `from` to `to` whatever the request method.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::{RequestParts, Router};
	///
	/// let mut router = Router::default();
	/// router.redirect("/old-blog", "/blog", 301).unwrap();
	/// router.seal().unwrap();
	///
	/// let found = router.match_or_fail(&RequestParts::new("POST", "/old-blog")).unwrap();
	/// assert_eq!(found.route.handler().as_name(), Some("/blog"));
	/// assert_eq!(found.route.extensions().status, Some(301));
	/// ```
	pub fn redirect(&mut self, from: &str, to: &str, status: u16) -> RoutingResult<RouteBuilder<'_>> {
		Ok(self.add_route(REDIRECT, from, to)?.attr("status", status))
	}

	/// Fallback for any unmatched path.
	pub fn fallback(&mut self, handler: impl Into<Handler>) -> RoutingResult<RouteBuilder<'_>> {
		let handler = handler.into();
		let target = FallbackTarget {
			handler: handler.clone(),
			prefix: "/".to_string(),
		};
		Ok(self.add_route(FALLBACK, "/", handler)?.fallback_target(target))
	}

	/// Live group with `options`.
	pub fn group(&mut self, options: GroupOptions) -> RouteGroup<'_> {
		RouteGroup::new(self, GroupOptions::new().nest(&options))
	}

	/// Live group handed to `define`.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::{GroupOptions, Router};
	///
	/// let mut router = Router::default();
	/// router
	///     .group_with(GroupOptions::new().with_prefix("/admin").with_middleware("auth"), |admin| {
	///         admin.get("/dashboard", "DashboardController@index")?;
	///         Ok(())
	///     })
	///     .unwrap();
	///
	/// assert_eq!(router.routes().get(0).unwrap().path(), "/admin/dashboard");
	/// ```
	pub fn group_with<F>(&mut self, options: GroupOptions, define: F) -> RoutingResult<()>
	where
		F: FnOnce(&mut RouteGroup<'_>) -> RoutingResult<()>,
	{
		define(&mut self.group(options))
	}

	/// Register every route of a group tree. Returns the number registered.
	pub fn mount(&mut self, node: GroupNode) -> RoutingResult<usize> {
		node.materialize(self, &GroupOptions::new())
	}

	/// Load the routes of module `identifier`, optionally under `prefix`.
	///
	/// # Errors
	///
	/// - [`RoutingError::MissingConfiguration`] without `modules_path`.
	/// - [`RoutingError::ModuleLoad`] when a routes file cannot be parsed.
	pub fn module(&mut self, identifier: &str, prefix: Option<&str>) -> RoutingResult<usize> {
		let options = GroupOptions::new().with_prefix(prefix.unwrap_or_default());
		self.load_module(identifier, &options)
	}

	pub(crate) fn load_module(&mut self, identifier: &str, options: &GroupOptions) -> RoutingResult<usize> {
		let routes: Vec<PendingRoute> = ModuleLoader::new(&self.settings).read(identifier)?;
		let count = routes.len();
		for route in routes {
			options.register(self, route, Some(identifier))?;
		}
		tracing::info!(module = identifier, routes = count, prefix = %options.prefix, "loaded module routes");
		Ok(count)
	}

	/// Freeze the route table and compile every pattern.
	///
	/// Sealing twice is a no-op.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::InvalidPattern`] if a template or `regex:` rule
	/// does not compile. The collection is then frozen, [`is_sealed`](Self::is_sealed)
	/// stays false and queries fail with [`RoutingError::NotSealed`] until
	/// [`load_routes`](Self::load_routes) reopens the table.
	pub fn seal(&mut self) -> RoutingResult<()> {
		if self.matcher.is_some() {
			return Ok(());
		}
		self.routes.seal();
		self.matcher = Some(RouteMatcher::compile(&self.routes)?);
		tracing::debug!(routes = self.routes.len(), "sealed router");
		Ok(())
	}

	pub fn is_sealed(&self) -> bool {
		self.matcher.is_some()
	}

	fn matcher(&self) -> RoutingResult<&RouteMatcher> {
		self.matcher.as_ref().ok_or(RoutingError::NotSealed)
	}

	/// Match a request, falling back to fallback routes.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::NotSealed`] before [`seal`](Self::seal).
	pub fn match_request<R>(&self, request: &R) -> RoutingResult<Option<RouteMatch>>
	where
		R: RequestView + ?Sized,
	{
		Ok(self.matcher()?.match_request(&self.routes, request))
	}

	/// Match a request or fail with [`RoutingError::RouteNotFound`].
	pub fn match_or_fail<R>(&self, request: &R) -> RoutingResult<RouteMatch>
	where
		R: RequestView + ?Sized,
	{
		self.match_request(request)?.ok_or_else(|| {
			RoutingError::RouteNotFound(format!(
				"{} {}",
				request.method().to_ascii_uppercase(),
				request.path()
			))
		})
	}

	/// Match a request and report every candidate evaluated.
	pub fn inspect<R>(&self, request: &R) -> RoutingResult<MatchResult>
	where
		R: RequestView + ?Sized,
	{
		Ok(self.matcher()?.inspect(&self.routes, request))
	}

	/// Path of the route named `name`.
	///
	/// # Errors
	///
	/// - [`RoutingError::RouteNotFound`] for an unknown name.
	/// - [`RoutingError::MissingRouteParameter`] when a required placeholder
	///   has neither a value nor a default.
	pub fn url(&self, name: &str, params: &[(&str, &str)]) -> RoutingResult<String> {
		self.url_with(name, &url_params(params))
	}

	/// Like [`url`](Self::url) with arbitrary parameter values.
	pub fn url_with(&self, name: &str, params: &UrlParams) -> RoutingResult<String> {
		reverse(self.named(name)?, params)
	}

	/// Path of the route named `name` in language `lang`, using its
	/// localized template when one exists.
	pub fn url_for_locale(&self, name: &str, lang: &str, params: &[(&str, &str)]) -> RoutingResult<String> {
		let route = self.named(name)?;
		let template = route
			.extensions()
			.i18n
			.get(lang)
			.map_or(route.path(), String::as_str);
		reverse_template(route, template, &url_params(params))
	}

	fn named(&self, name: &str) -> RoutingResult<&RouteDefinition> {
		self.routes
			.by_name(name)
			.ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))
	}

	/// Registered routes in match order.
	pub fn routes(&self) -> &RouteCollection {
		&self.routes
	}

	/// Copy of the route table, for snapshots.
	pub fn export_routes(&self) -> RouteCollection {
		self.routes.clone()
	}

	/// Replace the route table. The router is open afterwards and must be
	/// sealed again before matching.
	pub fn load_routes(&mut self, mut routes: RouteCollection) {
		tracing::debug!(routes = routes.len(), "loaded route table");
		routes.unseal();
		self.routes = routes;
		self.matcher = None;
	}

	pub(crate) fn collection_mut(&mut self) -> &mut RouteCollection {
		&mut self.routes
	}
}
