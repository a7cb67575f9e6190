//! Module loading and route table snapshot integration tests

use rstest::rstest;
use std::fs;
use std::path::Path;
use waymark_conf::RouterSettings;
use waymark_routers::{
	GroupOptions, Handler, ModuleLoader, RequestParts, RouteCollection, Router, RoutingError,
};

fn write_routes(base: &Path, module: &str, file: &str, content: &str) {
	let dir = base.join(module);
	fs::create_dir_all(&dir).unwrap();
	fs::write(dir.join(file), content).unwrap();
}

const BLOG_ROUTES: &str = r#"
[[routes]]
method = "GET"
path = "/posts"
handler = "PostController@index"
name = "blog.index"

[[routes]]
method = "GET"
path = "/posts/{id}"
handler = "PostController@show"
name = "blog.show"
middleware = ["cache"]
validation = { id = "numeric" }
"#;

#[rstest]
fn test_module_routes_under_prefix() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	write_routes(dir.path(), "blog", "routes.toml", BLOG_ROUTES);
	let mut router = Router::new(RouterSettings::with_modules_path(dir.path()));

	// Act
	let count = router.module("blog", Some("/blog")).unwrap();
	router.seal().unwrap();

	// Assert
	assert_eq!(count, 2);
	let found = router
		.match_request(&RequestParts::new("GET", "/blog/posts/5"))
		.unwrap()
		.unwrap();
	assert_eq!(found.route.name(), Some("blog.show"));
	assert_eq!(found.route.module(), Some("blog"));
	assert_eq!(found.route.middleware(), ["cache"]);
	assert_eq!(router.url("blog.index", &[]).unwrap(), "/blog/posts");
}

#[rstest]
fn test_module_inside_group_inherits_options() {
	let dir = tempfile::tempdir().unwrap();
	write_routes(dir.path(), "blog", "routes.toml", BLOG_ROUTES);
	let mut router = Router::new(RouterSettings::with_modules_path(dir.path()));

	router
		.group(GroupOptions::new().with_prefix("/site").with_middleware("web"))
		.module("blog", None)
		.unwrap();

	let route = router.routes().by_name("blog.show").unwrap();
	assert_eq!(route.path(), "/site/posts/{id}");
	assert_eq!(route.middleware(), ["web", "cache"]);
}

#[rstest]
fn test_module_without_configuration() {
	let mut router = Router::default();

	let result = router.module("blog", None);

	assert!(matches!(result, Err(RoutingError::MissingConfiguration(_))));
}

#[rstest]
fn test_discover_then_load_every_module() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	write_routes(dir.path(), "blog", "routes.toml", BLOG_ROUTES);
	write_routes(
		dir.path(),
		"shop",
		"routes.toml",
		"[[routes]]\nmethod = \"GET\"\npath = \"/cart\"\nhandler = \"CartController@show\"\n",
	);
	let mut router = Router::new(RouterSettings::with_modules_path(dir.path()));

	// Act
	let modules = ModuleLoader::new(router.settings()).discover().unwrap();
	for module in &modules {
		let prefix = format!("/{}", module.name);
		router.module(&module.name, Some(prefix.as_str())).unwrap();
	}

	// Assert
	let paths: Vec<_> = router.routes().iter().map(|r| r.path()).collect();
	assert_eq!(paths, ["/blog/posts", "/blog/posts/{id}", "/shop/cart"]);
}

#[rstest]
fn test_snapshot_round_trip_restores_matching() {
	// Arrange
	let mut router = Router::default();
	router
		.get("/users/{id}", "UserController@show")
		.unwrap()
		.name("users.show")
		.valid("id", "numeric")
		.subdomain("api")
		.i18n("de", "/benutzer/{id}");
	router.redirect("/people/{id}", "/users/{id}", 301).unwrap();
	router.fallback("NotFoundController").unwrap();
	router.seal().unwrap();

	// Act
	let json = router.export_routes().to_json().unwrap();
	let mut restored = Router::default();
	restored.load_routes(RouteCollection::from_json(&json).unwrap());
	restored.seal().unwrap();

	// Assert
	assert!(restored.routes().iter().eq(router.routes().iter()));
	let request = RequestParts::new("GET", "/benutzer/3").with_host("api.example.com");
	let found = restored.match_request(&request).unwrap().unwrap();
	assert_eq!(found.param("id"), Some("3"));
	assert_eq!(found.param("lang"), Some("de"));
	let redirect = restored
		.match_request(&RequestParts::new("GET", "/people/3"))
		.unwrap()
		.unwrap();
	assert_eq!(redirect.route.redirect_status(), Some(301));
	let missing = restored
		.match_request(&RequestParts::new("GET", "/nowhere"))
		.unwrap()
		.unwrap();
	assert!(missing.is_fallback());
}

#[rstest]
fn test_snapshot_rejects_opaque_handlers() {
	let mut router = Router::default();
	router
		.get("/health", Handler::opaque("health_check", 42_u32))
		.unwrap()
		.name("health");

	let json = router.export_routes().to_json().unwrap();

	assert!(json.contains(r#"{"opaque":"health_check"}"#));
	assert!(matches!(
		RouteCollection::from_json(&json),
		Err(RoutingError::Snapshot(_))
	));
}

#[rstest]
fn test_snapshot_rejects_dangling_name() {
	let json = r#"{"routes": [], "names": {"ghost": 0}}"#;

	assert!(matches!(
		RouteCollection::from_json(json),
		Err(RoutingError::Snapshot(_))
	));
}
