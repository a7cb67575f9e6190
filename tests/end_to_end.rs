//! End-to-end routing through the facade crate
//!
//! Settings are read from a TOML file, module routes are loaded from disk and
//! requests built with the `http` crate are matched against the sealed router.

use rstest::rstest;
use serial_test::serial;
use std::fs;
use waymark::prelude::*;

#[rstest]
#[serial(waymark_env)]
fn test_settings_file_to_matched_request() {
	// Arrange
	let root = tempfile::tempdir().unwrap();
	let modules = root.path().join("modules");
	fs::create_dir_all(modules.join("accounts")).unwrap();
	fs::write(
		modules.join("accounts").join("routes.json"),
		r#"{"routes": [
			{"method": "GET", "path": "/{id}", "handler": "AccountController@show",
			 "name": "accounts.show", "validation": {"id": "numeric"}},
			{"method": "POST", "path": "/", "handler": "AccountController@store"}
		]}"#,
	)
	.unwrap();
	let settings_file = root.path().join("waymark.toml");
	fs::write(
		&settings_file,
		format!(
			"modules_path = {:?}\nroutes_file = \"routes.json\"\n",
			modules.display().to_string()
		),
	)
	.unwrap();

	// Act
	let settings = RouterSettings::from_file(&settings_file).unwrap();
	let mut router = Router::new(settings);
	router
		.group(GroupOptions::new().with_prefix("/api").with_middleware("auth"))
		.module("accounts", Some("/accounts"))
		.unwrap();
	router.fallback("NotFoundController").unwrap();
	router.seal().unwrap();

	let request = http::Request::builder()
		.method("GET")
		.uri("http://app.example.com/api/accounts/12")
		.body(())
		.unwrap();
	let found = router.match_or_fail(&request).unwrap();

	// Assert
	assert_eq!(found.route.name(), Some("accounts.show"));
	assert_eq!(found.route.module(), Some("accounts"));
	assert_eq!(found.route.middleware(), ["auth"]);
	assert_eq!(found.param("id"), Some("12"));
	assert_eq!(router.url("accounts.show", &[("id", "5")]).unwrap(), "/api/accounts/5");

	let unmatched = router
		.match_or_fail(&RequestParts::new("GET", "/api/accounts/twelve"))
		.unwrap();
	assert!(unmatched.is_fallback());
}

#[rstest]
fn test_inspect_explains_miss() {
	let mut router = Router::new(RouterSettings::default());
	router.post("/login", "SessionController@store").unwrap();
	router.seal().unwrap();

	let result: MatchResult = router.inspect(&RequestParts::new("GET", "/login")).unwrap();

	assert!(!result.found);
	assert_eq!(result.diagnostics.attempts.len(), 1);
	assert!(matches!(
		router.match_or_fail(&RequestParts::new("GET", "/login")),
		Err(RoutingError::RouteNotFound(_))
	));
}
