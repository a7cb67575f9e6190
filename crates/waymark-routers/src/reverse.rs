//! Reverse routing: path generation from a named route.

use crate::error::{RoutingError, RoutingResult};
use crate::path::normalize_path;
use crate::pattern::{TemplateSegment, parse_template};
use crate::route::{ParamValue, RouteDefinition};
use indexmap::IndexMap;

/// Parameter values supplied to reverse routing.
pub type UrlParams = IndexMap<String, ParamValue>;

/// Build a [`UrlParams`] map from string pairs.
///
/// # Examples
///
/// ```
/// use waymark_routers::reverse::url_params;
///
/// let params = url_params(&[("id", "42")]);
/// assert_eq!(params["id"], "42");
/// ```
pub fn url_params(pairs: &[(&str, &str)]) -> UrlParams {
	pairs
		.iter()
		.map(|(k, v)| (k.to_string(), ParamValue::String(v.to_string())))
		.collect()
}

/// String form of a parameter value as it appears in a path.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use waymark_routers::reverse::stringify_param;
///
/// assert_eq!(stringify_param(&json!("abc")), "abc");
/// assert_eq!(stringify_param(&json!(42)), "42");
/// assert_eq!(stringify_param(&json!(true)), "true");
/// assert_eq!(stringify_param(&json!(null)), "");
/// ```
pub fn stringify_param(value: &ParamValue) -> String {
	match value {
		ParamValue::String(s) => s.clone(),
		ParamValue::Null => String::new(),
		other => other.to_string(),
	}
}

/// Generate a path for `route` from its primary template.
pub fn reverse(route: &RouteDefinition, params: &UrlParams) -> RoutingResult<String> {
	reverse_template(route, route.path(), params)
}

/// Generate a path for `route` from `template`.
///
/// Each placeholder takes, in order of preference: the supplied value, the
/// route default, or nothing if the placeholder is optional. The result is
/// normalized, so an omitted optional segment leaves no separator behind.
///
/// # Errors
///
/// Returns [`RoutingError::MissingRouteParameter`] for the first required
/// placeholder without a value.
pub fn reverse_template(
	route: &RouteDefinition,
	template: &str,
	params: &UrlParams,
) -> RoutingResult<String> {
	let mut result = String::with_capacity(template.len());

	for segment in parse_template(template) {
		match segment {
			TemplateSegment::Literal(text) => result.push_str(&text),
			TemplateSegment::Placeholder {
				name,
				optional,
				leading_slash,
			} => {
				let value = match params.get(&name).or_else(|| route.defaults().get(&name)) {
					Some(value) => stringify_param(value),
					None if optional => String::new(),
					None => {
						return Err(RoutingError::MissingRouteParameter {
							route: route.label(),
							parameter: name,
						});
					}
				};
				if leading_slash {
					result.push('/');
				}
				result.push_str(&value);
			}
		}
	}

	Ok(normalize_path(&result))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn route(path: &str) -> RouteDefinition {
		RouteDefinition::new("GET", path, "h")
	}

	#[rstest]
	#[case("/users/{id}", &[("id", "42")], "/users/42")]
	#[case("/users/{id}/posts/{post_id}", &[("id", "1"), ("post_id", "2")], "/users/1/posts/2")]
	#[case("/blog/{slug?}", &[], "/blog")]
	#[case("/blog/{slug?}", &[("slug", "hello")], "/blog/hello")]
	#[case("/", &[("unused", "x")], "/")]
	fn test_reverse(#[case] path: &str, #[case] params: &[(&str, &str)], #[case] expected: &str) {
		assert_eq!(reverse(&route(path), &url_params(params)).unwrap(), expected);
	}

	#[rstest]
	fn test_reverse_uses_defaults() {
		let mut route = route("/list/{page}");
		route.set_default("page".to_string(), json!(3));

		assert_eq!(reverse(&route, &UrlParams::new()).unwrap(), "/list/3");
	}

	#[rstest]
	fn test_supplied_value_beats_default() {
		let mut route = route("/list/{page}");
		route.set_default("page".to_string(), json!(3));

		let params = url_params(&[("page", "9")]);

		assert_eq!(reverse(&route, &params).unwrap(), "/list/9");
	}

	#[rstest]
	fn test_missing_required_parameter() {
		// Arrange
		let mut route = route("/users/{user_id}");
		route.set_name("user_detail".to_string());

		// Act
		let err = reverse(&route, &UrlParams::new()).unwrap_err();

		// Assert
		assert!(matches!(
			&err,
			RoutingError::MissingRouteParameter { route, parameter }
				if route == "user_detail" && parameter == "user_id"
		));
		assert!(err.to_string().contains("\"user_id\""));
	}

	#[rstest]
	fn test_empty_value_collapses_separator() {
		let params = url_params(&[("a", ""), ("b", "x")]);
		assert_eq!(reverse(&route("/{a}/{b}"), &params).unwrap(), "/x");
	}
}
