//! Request matching against a sealed route collection.
//!
//! Patterns are compiled once, when the router is sealed, into a table keyed
//! by collection slot. Each slot holds the primary pattern and one pattern
//! per localized alternate path.

use crate::collection::RouteCollection;
use crate::error::{RoutingError, RoutingResult};
use crate::path::normalize_request_path;
use crate::pattern::CompiledPattern;
use crate::request::RequestView;
use crate::route::{ParamValue, REDIRECT, RouteDefinition};
use indexmap::IndexMap;
use serde::Serialize;

/// A matched route and its resolved parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
	/// The route that matched, or a synthesized `FALLBACK` route.
	pub route: RouteDefinition,
	/// Defaults overlaid by captured path segments.
	pub parameters: IndexMap<String, ParamValue>,
}

impl RouteMatch {
	/// Parameter value as a string.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.parameters.get(name).and_then(ParamValue::as_str)
	}

	pub fn is_fallback(&self) -> bool {
		self.route.method() == crate::route::FALLBACK
	}
}

/// Outcome of evaluating one candidate during inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
	MethodMismatch,
	Mismatch,
	Matched,
}

/// One evaluated candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchAttempt {
	/// Route name, or `"METHOD PATH"`.
	pub route: String,
	pub status: AttemptStatus,
	/// Compiled pattern text of the primary template.
	pub pattern: String,
}

/// The request as the matcher saw it, plus every evaluated candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
	pub method: String,
	pub path: String,
	pub host: String,
	pub attempts: Vec<MatchAttempt>,
}

/// Result of [`RouteMatcher::inspect`].
///
/// Attempts stop at the first match, so a successful result lists only the
/// candidates evaluated up to and including the winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
	pub found: bool,
	pub route: Option<RouteDefinition>,
	pub parameters: IndexMap<String, ParamValue>,
	pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
struct CompiledRoute {
	primary: CompiledPattern,
	alternates: Vec<(String, CompiledPattern)>,
}

/// Compiled pattern table for one sealed collection.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
	compiled: Vec<CompiledRoute>,
}

impl RouteMatcher {
	/// Compile every route of `routes`.
	///
	/// # Errors
	///
	/// - [`RoutingError::RouteNotSealed`] if a route is still being built.
	/// - [`RoutingError::InvalidPattern`] if a template or `regex:` rule does
	///   not compile.
	pub fn compile(routes: &RouteCollection) -> RoutingResult<Self> {
		let mut compiled = Vec::with_capacity(routes.len());

		for route in routes {
			if !route.is_sealed() {
				return Err(RoutingError::RouteNotSealed(route.label()));
			}

			let compile = |template: &str| {
				CompiledPattern::compile(template, route.validation(), route.defaults()).map_err(
					|source| RoutingError::InvalidPattern {
						route: route.label(),
						source,
					},
				)
			};

			let primary = compile(route.path())?;
			let alternates = route
				.extensions()
				.i18n
				.iter()
				.map(|(lang, template)| Ok((lang.clone(), compile(template)?)))
				.collect::<RoutingResult<Vec<_>>>()?;

			compiled.push(CompiledRoute {
				primary,
				alternates,
			});
		}

		tracing::debug!(routes = compiled.len(), "compiled route patterns");
		Ok(Self { compiled })
	}

	/// Compiled primary pattern of the route at `slot`.
	pub fn pattern(&self, slot: usize) -> Option<&str> {
		self.compiled.get(slot).map(|c| c.primary.as_str())
	}

	/// Find the first route matching `request`, then try fallbacks.
	pub fn match_request<R>(&self, routes: &RouteCollection, request: &R) -> Option<RouteMatch>
	where
		R: RequestView + ?Sized,
	{
		let path = normalize_request_path(request.path());
		self.walk(routes, request.method(), &path, request.host(), |_| {})
			.or_else(|| Self::fallback(routes, &path))
	}

	/// Like [`match_request`](Self::match_request), recording every evaluated
	/// candidate.
	pub fn inspect<R>(&self, routes: &RouteCollection, request: &R) -> MatchResult
	where
		R: RequestView + ?Sized,
	{
		let path = normalize_request_path(request.path());
		let mut attempts = Vec::new();
		let matched = self
			.walk(routes, request.method(), &path, request.host(), |attempt| {
				attempts.push(attempt)
			})
			.or_else(|| Self::fallback(routes, &path));

		let diagnostics = Diagnostics {
			method: request.method().to_ascii_uppercase(),
			path,
			host: request.host().to_string(),
			attempts,
		};

		match matched {
			Some(m) => MatchResult {
				found: true,
				route: Some(m.route),
				parameters: m.parameters,
				diagnostics,
			},
			None => MatchResult {
				found: false,
				route: None,
				parameters: IndexMap::new(),
				diagnostics,
			},
		}
	}

	fn walk(
		&self,
		routes: &RouteCollection,
		method: &str,
		path: &str,
		host: &str,
		mut record: impl FnMut(MatchAttempt),
	) -> Option<RouteMatch> {
		for (route, compiled) in routes.iter().zip(&self.compiled) {
			let attempt = |status| MatchAttempt {
				route: route.label(),
				status,
				pattern: compiled.primary.as_str().to_string(),
			};

			if route.method() != REDIRECT && !route.method().eq_ignore_ascii_case(method) {
				tracing::trace!(route = %route.label(), "method mismatch");
				record(attempt(AttemptStatus::MethodMismatch));
				continue;
			}

			if let Some(subdomain) = &route.extensions().subdomain
				&& !host_has_subdomain(host, subdomain)
			{
				tracing::trace!(route = %route.label(), %host, "subdomain mismatch");
				record(attempt(AttemptStatus::Mismatch));
				continue;
			}

			let localized = || {
				compiled.alternates.iter().find_map(|(lang, pattern)| {
					pattern.captures(path).map(|mut captures| {
						captures.insert("lang".to_string(), lang.clone());
						captures
					})
				})
			};

			match compiled.primary.captures(path).or_else(localized) {
				Some(captures) => {
					tracing::trace!(route = %route.label(), "matched");
					record(attempt(AttemptStatus::Matched));
					return Some(RouteMatch {
						route: route.clone(),
						parameters: merge_defaults(route, captures),
					});
				}
				None => {
					tracing::trace!(route = %route.label(), "pattern mismatch");
					record(attempt(AttemptStatus::Mismatch));
				}
			}
		}
		None
	}

	/// Longest literal prefix wins; the first registration wins ties.
	fn fallback(routes: &RouteCollection, path: &str) -> Option<RouteMatch> {
		let mut best: Option<(usize, &RouteDefinition)> = None;

		for route in routes {
			let Some(target) = &route.extensions().fallback else {
				continue;
			};
			let len = target.prefix.len();
			if path.starts_with(&target.prefix) && best.is_none_or(|(longest, _)| len > longest) {
				best = Some((len, route));
			}
		}

		let (_, winner) = best?;
		let target = winner.extensions().fallback.as_ref()?;
		tracing::debug!(path, prefix = %target.prefix, "falling back");

		Some(RouteMatch {
			route: RouteDefinition::synthesized_fallback(
				path,
				target.handler.clone(),
				winner.middleware().to_vec(),
			),
			parameters: IndexMap::new(),
		})
	}
}

fn host_has_subdomain(host: &str, subdomain: &str) -> bool {
	host.strip_prefix(subdomain)
		.is_some_and(|rest| rest.starts_with('.'))
}

fn merge_defaults(
	route: &RouteDefinition,
	captures: IndexMap<String, String>,
) -> IndexMap<String, ParamValue> {
	let mut parameters = route.defaults().clone();
	for (name, value) in captures {
		parameters.insert(name, ParamValue::String(value));
	}
	parameters
}
