//! Route definitions and their metadata.

use crate::path::normalize_path;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Parameter and default values. Captured path segments are always strings;
/// defaults may be any JSON value.
pub type ParamValue = Value;

/// Pseudo-method matched on path alone.
pub const REDIRECT: &str = "REDIRECT";

/// Pseudo-method of fallback routes.
pub const FALLBACK: &str = "FALLBACK";

/// Redirect status when none was given.
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Opaque handler reference.
///
/// The router stores and returns handlers but never inspects or calls them.
/// Named handlers survive a snapshot round trip; opaque ones do not.
#[derive(Clone)]
pub enum Handler {
	/// Handler referenced by name (controller path, redirect target, ...).
	Named(String),
	/// Any in-process value, e.g. a closure.
	Opaque(OpaqueHandler),
}

/// Type-erased handler value with a display label.
#[derive(Clone)]
pub struct OpaqueHandler {
	label: String,
	value: Arc<dyn Any + Send + Sync>,
}

impl Handler {
	/// Wrap an arbitrary value as an opaque handler.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::Handler;
	///
	/// let handler = Handler::opaque("users.list", 42_u32);
	/// assert_eq!(handler.downcast_ref::<u32>(), Some(&42));
	/// assert_eq!(handler.as_name(), None);
	/// ```
	pub fn opaque<T>(label: impl Into<String>, value: T) -> Self
	where
		T: Any + Send + Sync,
	{
		Self::Opaque(OpaqueHandler {
			label: label.into(),
			value: Arc::new(value),
		})
	}

	/// Name of a named handler.
	pub fn as_name(&self) -> Option<&str> {
		match self {
			Self::Named(name) => Some(name),
			Self::Opaque(_) => None,
		}
	}

	/// Borrow the value inside an opaque handler.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Named(_) => None,
			Self::Opaque(opaque) => opaque.value.downcast_ref(),
		}
	}
}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
			Self::Opaque(opaque) => f.debug_tuple("Opaque").field(&opaque.label).finish(),
		}
	}
}

impl PartialEq for Handler {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Named(a), Self::Named(b)) => a == b,
			(Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(&a.value, &b.value),
			_ => false,
		}
	}
}

impl From<&str> for Handler {
	fn from(name: &str) -> Self {
		Self::Named(name.to_string())
	}
}

impl From<String> for Handler {
	fn from(name: String) -> Self {
		Self::Named(name)
	}
}

impl Serialize for Handler {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Named(name) => serializer.serialize_str(name),
			Self::Opaque(opaque) => {
				let mut map = serializer.serialize_map(Some(1))?;
				map.serialize_entry("opaque", &opaque.label)?;
				map.end()
			}
		}
	}
}

impl<'de> Deserialize<'de> for Handler {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct HandlerVisitor;

		impl Visitor<'_> for HandlerVisitor {
			type Value = Handler;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a handler name (opaque handlers cannot be restored)")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Handler, E> {
				Ok(Handler::Named(v.to_string()))
			}

			fn visit_string<E: de::Error>(self, v: String) -> Result<Handler, E> {
				Ok(Handler::Named(v))
			}
		}

		deserializer.deserialize_str(HandlerVisitor)
	}
}

/// One validation rule token.
///
/// Each recognized rule narrows the character class of its placeholder;
/// unrecognized tokens are kept but leave the default class in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationRule {
	/// `numeric`: digits only.
	Numeric,
	/// `int`: digits only.
	Int,
	/// `alpha`: ASCII letters only.
	Alpha,
	/// `alphanumeric`: ASCII letters and digits.
	Alphanumeric,
	/// `regex:<expr>`: the expression, verbatim.
	Regex(String),
	/// Anything else.
	Other(String),
}

impl ValidationRule {
	/// Parse a rule token.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::ValidationRule;
	///
	/// assert_eq!(ValidationRule::parse("numeric"), ValidationRule::Numeric);
	/// assert_eq!(
	///     ValidationRule::parse("regex:[a-z]{2}"),
	///     ValidationRule::Regex("[a-z]{2}".to_string())
	/// );
	/// ```
	pub fn parse(token: &str) -> Self {
		match token {
			"numeric" => Self::Numeric,
			"int" => Self::Int,
			"alpha" => Self::Alpha,
			"alphanumeric" => Self::Alphanumeric,
			_ => match token.strip_prefix("regex:") {
				Some(expr) => Self::Regex(expr.to_string()),
				None => Self::Other(token.to_string()),
			},
		}
	}

	/// Character class this rule imposes, if it is recognized.
	pub fn char_class(&self) -> Option<&str> {
		match self {
			Self::Numeric | Self::Int => Some("[0-9]+"),
			Self::Alpha => Some("[a-zA-Z]+"),
			Self::Alphanumeric => Some("[a-zA-Z0-9]+"),
			Self::Regex(expr) => Some(expr),
			Self::Other(_) => None,
		}
	}

	/// The token this rule was parsed from.
	pub fn token(&self) -> String {
		match self {
			Self::Numeric => "numeric".to_string(),
			Self::Int => "int".to_string(),
			Self::Alpha => "alpha".to_string(),
			Self::Alphanumeric => "alphanumeric".to_string(),
			Self::Regex(expr) => format!("regex:{}", expr),
			Self::Other(token) => token.clone(),
		}
	}
}

impl From<String> for ValidationRule {
	fn from(token: String) -> Self {
		Self::parse(&token)
	}
}

impl From<&str> for ValidationRule {
	fn from(token: &str) -> Self {
		Self::parse(token)
	}
}

impl From<ValidationRule> for String {
	fn from(rule: ValidationRule) -> Self {
		rule.token()
	}
}

/// Conversion into an ordered rule list: a single token or a sequence.
pub trait IntoRules {
	fn into_rules(self) -> Vec<ValidationRule>;
}

impl IntoRules for &str {
	fn into_rules(self) -> Vec<ValidationRule> {
		vec![ValidationRule::parse(self)]
	}
}

impl IntoRules for String {
	fn into_rules(self) -> Vec<ValidationRule> {
		vec![ValidationRule::from(self)]
	}
}

impl IntoRules for ValidationRule {
	fn into_rules(self) -> Vec<ValidationRule> {
		vec![self]
	}
}

impl<T: Into<ValidationRule>> IntoRules for Vec<T> {
	fn into_rules(self) -> Vec<ValidationRule> {
		self.into_iter().map(Into::into).collect()
	}
}

impl<T: Into<ValidationRule>, const N: usize> IntoRules for [T; N] {
	fn into_rules(self) -> Vec<ValidationRule> {
		self.into_iter().map(Into::into).collect()
	}
}

/// Conversion into an ordered middleware list: one reference or several.
pub trait IntoMiddleware {
	fn into_middleware(self) -> Vec<String>;
}

impl IntoMiddleware for &str {
	fn into_middleware(self) -> Vec<String> {
		vec![self.to_string()]
	}
}

impl IntoMiddleware for String {
	fn into_middleware(self) -> Vec<String> {
		vec![self]
	}
}

impl<T: Into<String>> IntoMiddleware for Vec<T> {
	fn into_middleware(self) -> Vec<String> {
		self.into_iter().map(Into::into).collect()
	}
}

impl<T: Into<String>, const N: usize> IntoMiddleware for [T; N] {
	fn into_middleware(self) -> Vec<String> {
		self.into_iter().map(Into::into).collect()
	}
}

/// Where a fallback route applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackTarget {
	/// Handler returned for unmatched requests under `prefix`.
	pub handler: Handler,
	/// Literal path prefix the fallback covers.
	pub prefix: String,
}

/// Typed extension slots carried by a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteExtensions {
	/// Required leading host label, e.g. `api` for `api.example.com`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subdomain: Option<String>,
	/// Alternate path templates keyed by language tag, in declaration order.
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub i18n: IndexMap<String, String>,
	/// Fallback target for fallback routes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fallback: Option<FallbackTarget>,
	/// Redirect status code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<u16>,
	/// Free-form metadata.
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub meta: IndexMap<String, Value>,
	/// `_fallback_prefix` seen before `_fallback`.
	#[serde(skip)]
	pending_fallback_prefix: Option<String>,
}

impl RouteExtensions {
	/// Set an attribute by key.
	///
	/// Well-known keys (`subdomain`, `i18n`, `status`, `_fallback`,
	/// `_fallback_prefix`) land in their typed slot when the value has the
	/// expected shape; everything else is kept in `meta`.
	pub fn set(&mut self, key: &str, value: Value) {
		match (key, value) {
			("subdomain", Value::String(subdomain)) => self.subdomain = Some(subdomain),
			("i18n", Value::Object(map)) if map.values().all(Value::is_string) => {
				self.i18n = map
					.into_iter()
					.filter_map(|(lang, path)| path.as_str().map(|p| (lang, normalize_path(p))))
					.collect();
			}
			("status", Value::Number(n)) if n.as_u64().is_some_and(|s| s <= u16::MAX as u64) => {
				self.status = n.as_u64().map(|s| s as u16);
			}
			("_fallback", Value::String(handler)) => match &mut self.fallback {
				Some(target) => target.handler = Handler::Named(handler),
				None => {
					self.fallback = Some(FallbackTarget {
						handler: Handler::Named(handler),
						prefix: self
							.pending_fallback_prefix
							.take()
							.unwrap_or_else(|| "/".to_string()),
					})
				}
			},
			("_fallback_prefix", Value::String(prefix)) => match &mut self.fallback {
				Some(target) => target.prefix = normalize_path(&prefix),
				None => self.pending_fallback_prefix = Some(normalize_path(&prefix)),
			},
			(key, value) => {
				self.meta.insert(key.to_string(), value);
			}
		}
	}
}

/// Lifecycle of a route definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteState {
	/// Registered; fluent configuration still allowed.
	#[default]
	Building,
	/// Frozen for matching.
	Sealed,
}

/// One method + path registration and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
	method: String,
	path: String,
	handler: Handler,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	middleware: Vec<String>,
	#[serde(default)]
	validation: IndexMap<String, Vec<ValidationRule>>,
	#[serde(default)]
	defaults: IndexMap<String, ParamValue>,
	#[serde(default)]
	module: Option<String>,
	#[serde(default)]
	extensions: RouteExtensions,
	#[serde(skip)]
	state: RouteState,
}

impl RouteDefinition {
	/// Create a route in the building state.
	///
	/// The method is uppercased and the path normalized.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_routers::RouteDefinition;
	///
	/// let route = RouteDefinition::new("get", "users/{id}/", "UserController@show");
	/// assert_eq!(route.method(), "GET");
	/// assert_eq!(route.path(), "/users/{id}");
	/// assert_eq!(route.label(), "GET /users/{id}");
	/// ```
	pub fn new(method: impl AsRef<str>, path: impl AsRef<str>, handler: impl Into<Handler>) -> Self {
		Self {
			method: method.as_ref().to_ascii_uppercase(),
			path: normalize_path(path.as_ref()),
			handler: handler.into(),
			name: None,
			middleware: Vec::new(),
			validation: IndexMap::new(),
			defaults: IndexMap::new(),
			module: None,
			extensions: RouteExtensions::default(),
			state: RouteState::Building,
		}
	}

	/// Sealed `FALLBACK` route standing in for an unmatched request.
	pub(crate) fn synthesized_fallback(path: &str, handler: Handler, middleware: Vec<String>) -> Self {
		let mut route = Self::new(FALLBACK, path, handler);
		route.middleware = middleware;
		route.state = RouteState::Sealed;
		route
	}

	pub fn method(&self) -> &str {
		&self.method
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn handler(&self) -> &Handler {
		&self.handler
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn middleware(&self) -> &[String] {
		&self.middleware
	}

	pub fn validation(&self) -> &IndexMap<String, Vec<ValidationRule>> {
		&self.validation
	}

	pub fn defaults(&self) -> &IndexMap<String, ParamValue> {
		&self.defaults
	}

	pub fn module(&self) -> Option<&str> {
		self.module.as_deref()
	}

	pub fn extensions(&self) -> &RouteExtensions {
		&self.extensions
	}

	pub fn state(&self) -> RouteState {
		self.state
	}

	pub fn is_sealed(&self) -> bool {
		self.state == RouteState::Sealed
	}

	/// Status of a `REDIRECT` route, `None` for any other method.
	pub fn redirect_status(&self) -> Option<u16> {
		(self.method == REDIRECT).then(|| self.extensions.status.unwrap_or(DEFAULT_REDIRECT_STATUS))
	}

	/// Name, or `"METHOD PATH"` for unnamed routes.
	pub fn label(&self) -> String {
		match &self.name {
			Some(name) => name.clone(),
			None => format!("{} {}", self.method, self.path),
		}
	}

	/// Whether `name` is declared optional (`{name?}`) or has a default.
	pub fn is_optional_param(&self, name: &str) -> bool {
		self.defaults.contains_key(name)
			|| crate::pattern::parse_template(&self.path)
				.iter()
				.any(|p| p.name() == Some(name) && p.is_optional())
	}

	pub(crate) fn seal(&mut self) {
		self.state = RouteState::Sealed;
	}

	pub(crate) fn unseal(&mut self) {
		self.state = RouteState::Building;
	}

	pub(crate) fn set_name(&mut self, name: String) {
		debug_assert!(!self.is_sealed());
		self.name = Some(name);
	}

	pub(crate) fn push_middleware(&mut self, middleware: Vec<String>) {
		debug_assert!(!self.is_sealed());
		self.middleware.extend(middleware);
	}

	pub(crate) fn set_validation(&mut self, param: String, rules: Vec<ValidationRule>) {
		debug_assert!(!self.is_sealed());
		self.validation.insert(param, rules);
	}

	pub(crate) fn set_default(&mut self, param: String, value: ParamValue) {
		debug_assert!(!self.is_sealed());
		self.defaults.insert(param, value);
	}

	pub(crate) fn set_module(&mut self, module: String) {
		debug_assert!(!self.is_sealed());
		self.module = Some(module);
	}

	pub(crate) fn extensions_mut(&mut self) -> &mut RouteExtensions {
		debug_assert!(!self.is_sealed());
		&mut self.extensions
	}
}
