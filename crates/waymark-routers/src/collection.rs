//! Ordered route storage with a name index.

use crate::error::{RoutingError, RoutingResult};
use crate::route::{IntoMiddleware, IntoRules, ParamValue, RouteDefinition};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Routes in registration order plus a name -> slot index.
///
/// Registration order is match priority. A name registered twice points at the
/// latest route carrying it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteCollection {
	routes: Vec<RouteDefinition>,
	#[serde(default)]
	names: IndexMap<String, usize>,
	#[serde(skip)]
	sealed: bool,
}

impl RouteCollection {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a route and return a builder for further configuration.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::CollectionSealed`] once the collection is sealed.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::{RouteCollection, RouteDefinition};
	///
	/// let mut routes = RouteCollection::new();
	/// let _ = routes
	///     .add(RouteDefinition::new("GET", "/users", "UserController@index"))
	///     .unwrap()
	///     .name("users.index");
	///
	/// assert_eq!(routes.by_name("users.index").unwrap().path(), "/users");
	/// ```
	pub fn add(&mut self, route: RouteDefinition) -> RoutingResult<RouteBuilder<'_>> {
		if self.sealed {
			return Err(RoutingError::CollectionSealed);
		}

		let slot = self.routes.len();
		if let Some(name) = route.name() {
			self.names.insert(name.to_string(), slot);
		}
		tracing::debug!(
			method = %route.method(),
			path = %route.path(),
			name = ?route.name(),
			"registered route"
		);
		self.routes.push(route);

		Ok(RouteBuilder {
			collection: self,
			slot,
		})
	}

	/// Route at `slot`.
	pub fn get(&self, slot: usize) -> Option<&RouteDefinition> {
		self.routes.get(slot)
	}

	/// Latest route registered under `name`.
	pub fn by_name(&self, name: &str) -> Option<&RouteDefinition> {
		self.names.get(name).and_then(|&slot| self.routes.get(slot))
	}

	/// Slot of the latest route registered under `name`.
	pub fn slot_of(&self, name: &str) -> Option<usize> {
		self.names.get(name).copied()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, RouteDefinition> {
		self.routes.iter()
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Route names in first-registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.names.keys().map(String::as_str)
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	/// Freeze the collection and every route in it.
	pub fn seal(&mut self) {
		for route in &mut self.routes {
			route.seal();
		}
		self.sealed = true;
	}

	/// Reopen the collection and every route in it for registration.
	pub(crate) fn unseal(&mut self) {
		for route in &mut self.routes {
			route.unseal();
		}
		self.sealed = false;
	}

	/// Serialize the route table.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::{RouteCollection, RouteDefinition};
	///
	/// let mut routes = RouteCollection::new();
	/// let _ = routes.add(RouteDefinition::new("GET", "/", "home")).unwrap().name("home");
	///
	/// let restored = RouteCollection::from_json(&routes.to_json().unwrap()).unwrap();
	/// assert_eq!(restored.by_name("home").unwrap().handler().as_name(), Some("home"));
	/// assert!(!restored.is_sealed());
	/// ```
	pub fn to_json(&self) -> RoutingResult<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Restore a route table written by [`to_json`](Self::to_json).
	///
	/// Routes come back in their building state. A name index entry pointing
	/// past the end of the route list is rejected.
	pub fn from_json(json: &str) -> RoutingResult<Self> {
		let collection: Self = serde_json::from_str(json)?;
		if let Some((name, slot)) = collection
			.names
			.iter()
			.find(|&(_, &slot)| slot >= collection.routes.len())
		{
			return Err(RoutingError::Snapshot(serde::de::Error::custom(format!(
				"name '{}' points at missing route slot {}",
				name, slot
			))));
		}
		Ok(collection)
	}

	fn route_mut(&mut self, slot: usize) -> &mut RouteDefinition {
		&mut self.routes[slot]
	}

	fn rename(&mut self, slot: usize, name: String) {
		if let Some(old) = self.routes[slot].name()
			&& self.names.get(old) == Some(&slot)
		{
			self.names.shift_remove(old);
		}
		self.names.insert(name.clone(), slot);
		self.routes[slot].set_name(name);
	}
}

impl<'a> IntoIterator for &'a RouteCollection {
	type Item = &'a RouteDefinition;
	type IntoIter = std::slice::Iter<'a, RouteDefinition>;

	fn into_iter(self) -> Self::IntoIter {
		self.routes.iter()
	}
}

/// Fluent configuration of a freshly registered route.
///
/// Every method consumes and returns the builder so calls chain:
///
/// ```
/// use waymark_routers::Router;
///
/// let mut router = Router::default();
/// let _ = router
///     .get("/users/{id}", "UserController@show")
///     .unwrap()
///     .name("user_detail")
///     .valid("id", "numeric")
///     .middleware("auth");
/// ```
pub struct RouteBuilder<'a> {
	collection: &'a mut RouteCollection,
	slot: usize,
}

impl<'a> RouteBuilder<'a> {
	/// Name the route, replacing any previous name. The name index always
	/// points at the latest route given a name.
	pub fn name(self, name: impl Into<String>) -> Self {
		self.collection.rename(self.slot, name.into());
		self
	}

	/// Append one or more middleware references.
	pub fn middleware(self, middleware: impl IntoMiddleware) -> Self {
		self.collection
			.route_mut(self.slot)
			.push_middleware(middleware.into_middleware());
		self
	}

	/// Set the validation rules of a parameter, replacing earlier rules.
	pub fn valid(self, param: impl Into<String>, rules: impl IntoRules) -> Self {
		self.collection
			.route_mut(self.slot)
			.set_validation(param.into(), rules.into_rules());
		self
	}

	/// Set a parameter default. The placeholder becomes optional.
	pub fn default(self, param: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.collection
			.route_mut(self.slot)
			.set_default(param.into(), value.into());
		self
	}

	/// Set one extension attribute.
	pub fn attr(self, key: &str, value: impl Into<Value>) -> Self {
		self.collection
			.route_mut(self.slot)
			.extensions_mut()
			.set(key, value.into());
		self
	}

	/// Set several extension attributes.
	pub fn meta<K, V>(self, entries: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: AsRef<str>,
		V: Into<Value>,
	{
		let route = self.collection.route_mut(self.slot);
		for (key, value) in entries {
			route.extensions_mut().set(key.as_ref(), value.into());
		}
		self
	}

	/// Require the host to start with `<subdomain>.`.
	pub fn subdomain(self, subdomain: impl Into<String>) -> Self {
		self.collection.route_mut(self.slot).extensions_mut().subdomain = Some(subdomain.into());
		self
	}

	/// Add a localized alternate path for `lang`.
	pub fn i18n(self, lang: impl Into<String>, path: impl AsRef<str>) -> Self {
		self.collection
			.route_mut(self.slot)
			.extensions_mut()
			.i18n
			.insert(lang.into(), crate::path::normalize_path(path.as_ref()));
		self
	}

	pub(crate) fn fallback_target(self, target: crate::route::FallbackTarget) -> Self {
		self.collection.route_mut(self.slot).extensions_mut().fallback = Some(target);
		self
	}

	pub(crate) fn module(self, module: impl Into<String>) -> Self {
		self.collection.route_mut(self.slot).set_module(module.into());
		self
	}

	/// The route as configured so far.
	pub fn route(&self) -> &RouteDefinition {
		&self.collection.routes[self.slot]
	}

	/// Slot of the route in its collection.
	pub fn slot(&self) -> usize {
		self.slot
	}
}
