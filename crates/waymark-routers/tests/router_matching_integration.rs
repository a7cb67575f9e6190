//! Router matching integration tests
//!
//! Exercises registration, matching, fallback, inspection and reverse routing
//! through the public `Router` API.

use rstest::{fixture, rstest};
use serde_json::json;
use waymark_routers::{AttemptStatus, GroupOptions, RequestParts, Router, RoutingError};

#[fixture]
fn router() -> Router {
	let mut router = Router::default();
	router.get("/", "HomeController@index").unwrap().name("home");
	router.get("/about", "PageController@about").unwrap().name("about");
	router
		.get("/users/{id}", "UserController@show")
		.unwrap()
		.name("users.show")
		.valid("id", "numeric");
	router
		.get("/blog/{slug?}", "BlogController@show")
		.unwrap()
		.name("blog")
		.default("slug", "index");
	router.post("/users", "UserController@store").unwrap().name("users.store");
	router
}

fn sealed(mut router: Router) -> Router {
	router.seal().unwrap();
	router
}

#[rstest]
#[case("GET", "/about", Some("about"))]
#[case("get", "/about", Some("about"))]
#[case("POST", "/about", None)]
#[case("POST", "/users", Some("users.store"))]
#[case("GET", "/users", None)]
#[case("GET", "/", Some("home"))]
#[case("GET", "", Some("home"))]
fn test_static_routes(
	router: Router,
	#[case] method: &str,
	#[case] path: &str,
	#[case] expected: Option<&str>,
) {
	let router = sealed(router);

	let found = router.match_request(&RequestParts::new(method, path)).unwrap();

	assert_eq!(found.as_ref().and_then(|m| m.route.name()), expected);
}

#[rstest]
#[case("/users/42", Some("42"))]
#[case("/users/42/", Some("42"))]
#[case("/users/abc", None)]
#[case("/users/", None)]
fn test_numeric_parameter(router: Router, #[case] path: &str, #[case] id: Option<&str>) {
	let router = sealed(router);

	let found = router.match_request(&RequestParts::new("GET", path)).unwrap();

	assert_eq!(found.as_ref().and_then(|m| m.param("id")), id);
}

#[rstest]
#[case("/blog", "index")]
#[case("/blog/", "index")]
#[case("/blog/hi", "hi")]
fn test_optional_parameter_with_default(router: Router, #[case] path: &str, #[case] slug: &str) {
	let router = sealed(router);

	let found = router
		.match_request(&RequestParts::new("GET", path))
		.unwrap()
		.unwrap();

	assert_eq!(found.parameters["slug"], json!(slug));
}

#[rstest]
fn test_http_request_view(router: Router) {
	// Arrange
	let router = sealed(router);
	let request = http::Request::builder()
		.method("GET")
		.uri("https://example.com/users/7?expand=true")
		.body(())
		.unwrap();

	// Act
	let found = router.match_request(&request).unwrap().unwrap();

	// Assert
	assert_eq!(found.route.name(), Some("users.show"));
	assert_eq!(found.param("id"), Some("7"));
}

#[rstest]
#[case(&[("id", "42")], "users.show")]
#[case(&[("slug", "rust-routing")], "blog")]
#[case(&[], "blog")]
fn test_reverse_then_match_round_trip(
	router: Router,
	#[case] params: &[(&str, &str)],
	#[case] name: &str,
) {
	// Arrange
	let router = sealed(router);

	// Act
	let path = router.url(name, params).unwrap();
	let found = router
		.match_request(&RequestParts::new("GET", &path))
		.unwrap()
		.unwrap();

	// Assert
	assert_eq!(found.route.name(), Some(name));
	for (key, value) in params {
		assert_eq!(found.param(key), Some(*value));
	}
}

#[rstest]
fn test_url_missing_parameter() {
	let mut router = Router::default();
	router
		.get("/users/{user_id}", "UserController@show")
		.unwrap()
		.name("user_detail");

	let err = router.url("user_detail", &[]).unwrap_err();

	assert!(matches!(
		&err,
		RoutingError::MissingRouteParameter { parameter, .. } if parameter == "user_id"
	));
	assert!(err.to_string().contains("missing required parameter \"user_id\""));
}

#[rstest]
fn test_url_uses_latest_registration_for_duplicate_name() {
	let mut router = Router::default();
	router.get("/v1/status", "StatusV1").unwrap().name("status");
	router.get("/v2/status", "StatusV2").unwrap().name("status");

	assert_eq!(router.url("status", &[]).unwrap(), "/v2/status");
}

#[rstest]
fn test_fallback_prefix_selection() {
	// Arrange
	let mut router = Router::default();
	router.fallback("NotFoundController").unwrap();
	router
		.group(GroupOptions::new().with_prefix("/api").with_middleware("json"))
		.fallback("ApiNotFoundController")
		.unwrap();
	let router = sealed(router);

	// Act
	let api = router.match_request(&RequestParts::new("GET", "/api/x")).unwrap().unwrap();
	let web = router.match_request(&RequestParts::new("GET", "/x")).unwrap().unwrap();

	// Assert
	assert_eq!(api.route.handler().as_name(), Some("ApiNotFoundController"));
	assert_eq!(api.route.middleware(), ["json"]);
	assert_eq!(api.route.method(), "FALLBACK");
	assert_eq!(web.route.handler().as_name(), Some("NotFoundController"));
	assert_eq!(web.route.path(), "/x");
}

#[rstest]
fn test_match_or_fail_without_fallback(router: Router) {
	let router = sealed(router);

	let result = router.match_or_fail(&RequestParts::new("GET", "/missing"));

	assert!(matches!(result, Err(RoutingError::RouteNotFound(_))));
}

#[rstest]
fn test_subdomain_and_redirect() {
	// Arrange
	let mut router = Router::default();
	router
		.get("/dashboard", "AdminController@dashboard")
		.unwrap()
		.subdomain("admin");
	router.redirect("/home", "/", 301).unwrap();
	let router = sealed(router);

	// Act
	let admin = router
		.match_request(&RequestParts::new("GET", "/dashboard").with_host("admin.example.com"))
		.unwrap();
	let public = router
		.match_request(&RequestParts::new("GET", "/dashboard").with_host("www.example.com"))
		.unwrap();
	let redirect = router
		.match_request(&RequestParts::new("PUT", "/home"))
		.unwrap()
		.unwrap();

	// Assert
	assert!(admin.is_some());
	assert!(public.is_none());
	assert_eq!(redirect.route.redirect_status(), Some(301));
	assert_eq!(redirect.route.handler().as_name(), Some("/"));
}

#[rstest]
fn test_localized_paths() {
	let mut router = Router::default();
	router
		.get("/contact", "ContactController@show")
		.unwrap()
		.name("contact")
		.attr("i18n", json!({"de": "/kontakt", "fr": "/contactez-nous"}));
	let router = sealed(router);

	let found = router
		.match_request(&RequestParts::new("GET", "/kontakt"))
		.unwrap()
		.unwrap();

	assert_eq!(found.param("lang"), Some("de"));
	assert_eq!(router.url_for_locale("contact", "fr", &[]).unwrap(), "/contactez-nous");
}

#[rstest]
fn test_inspect_total_mismatch() {
	// Arrange
	let mut router = Router::default();
	router
		.get("/users/{user_id}", "UserController@show")
		.unwrap()
		.name("user_detail")
		.valid("user_id", "numeric");
	let router = sealed(router);

	// Act
	let result = router.inspect(&RequestParts::new("GET", "/users/abc")).unwrap();

	// Assert
	assert!(!result.found);
	assert_eq!(result.diagnostics.attempts.len(), 1);
	assert_eq!(result.diagnostics.attempts[0].route, "user_detail");
	assert_eq!(result.diagnostics.attempts[0].status, AttemptStatus::Mismatch);
}

#[rstest]
fn test_inspect_reports_each_status(router: Router) {
	let router = sealed(router);

	let result = router.inspect(&RequestParts::new("POST", "/users")).unwrap();

	assert!(result.found);
	let statuses: Vec<_> = result
		.diagnostics
		.attempts
		.iter()
		.map(|a| a.status)
		.collect();
	assert_eq!(
		statuses,
		vec![
			AttemptStatus::MethodMismatch,
			AttemptStatus::MethodMismatch,
			AttemptStatus::MethodMismatch,
			AttemptStatus::MethodMismatch,
			AttemptStatus::Matched,
		]
	);
	let json = serde_json::to_value(&result).unwrap();
	assert_eq!(json["diagnostics"]["attempts"][0]["status"], "method_mismatch");
	assert_eq!(json["route"]["name"], "users.store");
}

#[rstest]
fn test_router_is_shareable_once_sealed(router: Router) {
	fn assert_send_sync<T: Send + Sync>(_: &T) {}

	let router = sealed(router);
	assert_send_sync(&router);

	std::thread::scope(|scope| {
		for _ in 0..4 {
			scope.spawn(|| {
				let found = router.match_request(&RequestParts::new("GET", "/users/1")).unwrap();
				assert!(found.is_some());
			});
		}
	});
}
