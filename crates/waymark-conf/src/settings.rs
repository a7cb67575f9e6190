//! Router settings and the builder that layers sources into them.

use crate::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, auto_source};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name looked up inside each module directory when none is configured.
pub const DEFAULT_ROUTES_FILE: &str = "routes.toml";

/// Settings consumed by the router during setup.
///
/// `modules_path` accepts either a single path or a list of paths in every
/// source format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// Directories searched for `<module>/<routes_file>`.
	#[serde(deserialize_with = "deserialize_path_list")]
	pub modules_path: Option<Vec<PathBuf>>,
	/// Routes file name inside a module directory.
	pub routes_file: String,
	/// Glob, relative to each search path, selecting module routes files
	/// (e.g. `*/http/routes.json`). The first component of a match names the
	/// module. Overrides `routes_file` for lookup when set.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub modules_glob: Option<String>,
}

impl RouterSettings {
	/// Settings with a single module search path.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_conf::RouterSettings;
	///
	/// let settings = RouterSettings::with_modules_path("/srv/app/modules");
	/// assert_eq!(settings.modules_path_list().len(), 1);
	/// assert_eq!(settings.routes_file, "routes.toml");
	/// ```
	pub fn with_modules_path(path: impl Into<PathBuf>) -> Self {
		Self {
			modules_path: Some(vec![path.into()]),
			..Self::default()
		}
	}

	/// Add another module search path.
	pub fn add_modules_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.modules_path
			.get_or_insert_with(Vec::new)
			.push(path.into());
		self
	}

	/// Override the routes file name.
	pub fn with_routes_file(mut self, routes_file: impl Into<String>) -> Self {
		self.routes_file = routes_file.into();
		self
	}

	/// Select module routes files with a glob instead of `routes_file`.
	///
	/// # Examples
	///
	/// ```
	/// use waymark_conf::RouterSettings;
	///
	/// let settings = RouterSettings::with_modules_path("modules").with_modules_glob("*/routes.*");
	/// assert_eq!(settings.modules_glob.as_deref(), Some("*/routes.*"));
	/// ```
	pub fn with_modules_glob(mut self, pattern: impl Into<String>) -> Self {
		self.modules_glob = Some(pattern.into());
		self
	}

	/// Configured search paths, empty when none are set.
	pub fn modules_path_list(&self) -> &[PathBuf] {
		self.modules_path.as_deref().unwrap_or(&[])
	}

	/// Load settings from `path` layered under `WAYMARK_*` environment variables.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
		SettingsBuilder::new()
			.add_source(auto_source(path)?)
			.add_source(Box::new(EnvSource::new()))
			.build()
	}
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			modules_path: None,
			routes_file: DEFAULT_ROUTES_FILE.to_string(),
			modules_glob: None,
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(PathBuf),
	Many(Vec<PathBuf>),
}

fn deserialize_path_list<'de, D>(deserializer: D) -> Result<Option<Vec<PathBuf>>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<OneOrMany>::deserialize(deserializer)?;
	Ok(value.map(|v| match v {
		OneOrMany::One(path) => vec![path],
		OneOrMany::Many(paths) => paths,
	}))
}

/// Merges configuration sources by priority and deserializes the result.
///
/// # Examples
///
/// ```
/// use waymark_conf::SettingsBuilder;
/// use waymark_conf::sources::DefaultSource;
/// use serde_json::Value;
///
/// let settings = SettingsBuilder::new()
///     .add_source(Box::new(
///         DefaultSource::new().with_value("modules_path", Value::String("/srv/modules".into())),
///     ))
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.modules_path_list().len(), 1);
/// ```
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Create a builder seeded with the built-in defaults.
	pub fn new() -> Self {
		let defaults = DefaultSource::new().with_value(
			"routes_file",
			Value::String(DEFAULT_ROUTES_FILE.to_string()),
		);
		Self {
			sources: vec![Box::new(defaults)],
		}
	}

	/// Add a configuration source.
	pub fn add_source(mut self, source: Box<dyn ConfigSource>) -> Self {
		self.sources.push(source);
		self
	}

	/// Merge every source, lowest priority first, into a flat map.
	pub fn merged(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut ordered: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
		ordered.sort_by_key(|s| s.priority());

		let mut merged = IndexMap::new();
		for source in ordered {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"loaded router settings source"
			);
			merged.extend(values);
		}
		Ok(merged)
	}

	/// Build [`RouterSettings`] from the merged sources.
	pub fn build(self) -> Result<RouterSettings, SourceError> {
		let merged = self.merged()?;
		let object = Value::Object(merged.into_iter().collect());
		serde_json::from_value(object).map_err(|e| SourceError::Deserialize(e.to_string()))
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_default_settings_have_no_modules_path() {
		let settings = RouterSettings::default();
		assert!(settings.modules_path.is_none());
		assert!(settings.modules_path_list().is_empty());
		assert_eq!(settings.routes_file, DEFAULT_ROUTES_FILE);
		assert!(settings.modules_glob.is_none());
	}

	#[rstest]
	fn test_modules_glob_from_source() {
		let source = DefaultSource::new()
			.with_value("modules_glob", Value::String("src/*/routes.json".into()));

		let settings = SettingsBuilder::new().add_source(Box::new(source)).build().unwrap();

		assert_eq!(settings.modules_glob.as_deref(), Some("src/*/routes.json"));
		assert_eq!(settings.routes_file, DEFAULT_ROUTES_FILE);
	}

	#[rstest]
	#[case(serde_json::json!({"modules_path": "/one"}), 1)]
	#[case(serde_json::json!({"modules_path": ["/one", "/two"]}), 2)]
	#[case(serde_json::json!({}), 0)]
	fn test_modules_path_accepts_one_or_many(#[case] raw: Value, #[case] expected: usize) {
		let settings: RouterSettings = serde_json::from_value(raw).unwrap();
		assert_eq!(settings.modules_path_list().len(), expected);
	}

	#[rstest]
	fn test_higher_priority_source_wins() {
		// Arrange
		let low = DefaultSource::new().with_value("routes_file", Value::String("low.toml".into()));
		struct High;
		impl ConfigSource for High {
			fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
				let mut map = IndexMap::new();
				map.insert("routes_file".to_string(), Value::String("high.toml".into()));
				Ok(map)
			}
			fn priority(&self) -> u8 {
				80
			}
			fn description(&self) -> String {
				"high".to_string()
			}
		}

		// Act
		let settings = SettingsBuilder::new()
			.add_source(Box::new(High))
			.add_source(Box::new(low))
			.build()
			.unwrap();

		// Assert
		assert_eq!(settings.routes_file, "high.toml");
	}

	#[rstest]
	fn test_builder_reports_invalid_shape() {
		let bad = DefaultSource::new().with_value("routes_file", Value::Bool(true));
		let result = SettingsBuilder::new().add_source(Box::new(bad)).build();
		assert!(matches!(result, Err(SourceError::Deserialize(_))));
	}
}
