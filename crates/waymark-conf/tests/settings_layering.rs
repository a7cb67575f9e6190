//! Settings layering across file and environment sources

use rstest::rstest;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use waymark_conf::sources::{EnvSource, TomlFileSource};
use waymark_conf::{RouterSettings, SettingsBuilder};

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
	let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[rstest]
fn test_toml_file_populates_settings() {
	// Arrange
	let file = write_toml("modules_path = \"/srv/modules\"\nroutes_file = \"routes.json\"\n");

	// Act
	let settings = SettingsBuilder::new()
		.add_source(Box::new(TomlFileSource::new(file.path())))
		.build()
		.unwrap();

	// Assert
	assert_eq!(settings.modules_path_list(), &[PathBuf::from("/srv/modules")]);
	assert_eq!(settings.routes_file, "routes.json");
}

#[rstest]
#[serial(waymark_env)]
fn test_environment_overrides_file() {
	// Arrange
	let file = write_toml("routes_file = \"from_file.toml\"\n");
	unsafe {
		std::env::set_var("WAYMARK_LAYER_ROUTES_FILE", "from_env.toml");
	}

	// Act
	let settings = SettingsBuilder::new()
		.add_source(Box::new(TomlFileSource::new(file.path())))
		.add_source(Box::new(EnvSource::new().with_prefix("WAYMARK_LAYER_")))
		.build();
	unsafe {
		std::env::remove_var("WAYMARK_LAYER_ROUTES_FILE");
	}

	// Assert
	assert_eq!(settings.unwrap().routes_file, "from_env.toml");
}

#[rstest]
#[serial(waymark_env)]
fn test_from_file_without_environment() {
	let file = write_toml("modules_path = [\"/a\", \"/b\"]\n");

	let settings = RouterSettings::from_file(file.path()).unwrap();

	assert_eq!(settings.modules_path_list().len(), 2);
	assert_eq!(settings.routes_file, "routes.toml");
}

#[rstest]
fn test_builder_chaining_helpers() {
	let settings = RouterSettings::with_modules_path("/one")
		.add_modules_path("/two")
		.with_routes_file("routes.json");

	assert_eq!(
		settings.modules_path_list(),
		&[PathBuf::from("/one"), PathBuf::from("/two")]
	);
	assert_eq!(settings.routes_file, "routes.json");
}
