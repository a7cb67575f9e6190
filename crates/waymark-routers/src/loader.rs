//! Module route files.
//!
//! A module is a directory under one of the configured search paths holding a
//! routes file (`routes.toml` unless configured otherwise):
//!
//! ```toml
//! [[routes]]
//! method = "GET"
//! path = "/posts/{id}"
//! handler = "PostController@show"
//! name = "posts.show"
//! middleware = ["auth"]
//! validation = { id = "numeric" }
//! defaults = { format = "html" }
//! ```
//!
//! JSON files hold either a bare array of records or `{ "routes": [...] }`.
//!
//! With `modules_glob` set, routes files are whatever the glob matches below
//! each search path, and the first path component of a match names the module.

use crate::error::{RoutingError, RoutingResult};
use crate::group::PendingRoute;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use waymark_conf::RouterSettings;

/// A module directory found by [`ModuleLoader::discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
	/// Directory name, used as the module identifier.
	pub name: String,
	/// Search path the module was found under.
	pub base_path: PathBuf,
	/// Routes file inside the module directory.
	pub routes_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
	fn from(value: OneOrMany) -> Self {
		match value {
			OneOrMany::One(item) => vec![item],
			OneOrMany::Many(items) => items,
		}
	}
}

/// One record of a routes file. Records without a method, path or handler
/// are skipped.
#[derive(Debug, Deserialize)]
struct ModuleRecord {
	method: Option<String>,
	path: Option<String>,
	handler: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	middleware: Option<OneOrMany>,
	#[serde(default)]
	validation: IndexMap<String, OneOrMany>,
	#[serde(default)]
	defaults: IndexMap<String, Value>,
}

impl ModuleRecord {
	fn into_pending(self) -> Option<PendingRoute> {
		let (Some(method), Some(path), Some(handler)) = (self.method, self.path, self.handler) else {
			return None;
		};

		let mut route = PendingRoute::new(method, path, handler);
		route.name = self.name;
		if let Some(middleware) = self.middleware {
			route = route.middleware(Vec::from(middleware));
		}
		for (param, rules) in self.validation {
			route = route.valid(param, Vec::from(rules));
		}
		route.defaults = self.defaults;
		Some(route)
	}
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoutesDocument {
	List(Vec<ModuleRecord>),
	Table {
		#[serde(default)]
		routes: Vec<ModuleRecord>,
	},
}

impl RoutesDocument {
	fn into_records(self) -> Vec<ModuleRecord> {
		match self {
			Self::List(records) | Self::Table { routes: records } => records,
		}
	}
}

/// Finds and reads module routes files.
pub struct ModuleLoader<'a> {
	settings: &'a RouterSettings,
}

impl<'a> ModuleLoader<'a> {
	pub fn new(settings: &'a RouterSettings) -> Self {
		Self { settings }
	}

	fn search_paths(&self) -> RoutingResult<&'a [PathBuf]> {
		match &self.settings.modules_path {
			Some(paths) => Ok(paths),
			None => Err(RoutingError::MissingConfiguration(
				"modules_path configuration is required to load modules".to_string(),
			)),
		}
	}

	/// List every module directory holding a routes file, search path by
	/// search path, sorted by name within each.
	///
	/// # Errors
	///
	/// - [`RoutingError::MissingConfiguration`] without `modules_path`.
	/// - [`RoutingError::ModulesGlob`] when `modules_glob` is not a valid pattern.
	pub fn discover(&self) -> RoutingResult<Vec<DiscoveredModule>> {
		let mut modules = Vec::new();

		for base in self.search_paths()? {
			if !base.is_dir() {
				tracing::debug!("Module search path does not exist: {}", base.display());
				continue;
			}

			let mut found = match &self.settings.modules_glob {
				Some(pattern) => glob_modules(base, pattern)?,
				None => self.scan_modules(base)?,
			};
			found.sort_by(|a, b| a.name.cmp(&b.name));
			modules.extend(found);
		}

		tracing::info!("Discovered {} route modules", modules.len());
		Ok(modules)
	}

	fn scan_modules(&self, base: &Path) -> RoutingResult<Vec<DiscoveredModule>> {
		let mut found = Vec::new();
		for entry in fs::read_dir(base)? {
			let path = entry?.path();
			let routes_path = path.join(&self.settings.routes_file);
			if !path.is_dir() || !routes_path.is_file() {
				continue;
			}
			let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
				continue;
			};
			found.push(DiscoveredModule {
				name: name.to_string(),
				base_path: base.to_path_buf(),
				routes_path,
			});
		}
		Ok(found)
	}

	/// Routes files of `identifier` that exist, in search path order.
	pub fn routes_files(&self, identifier: &str) -> RoutingResult<Vec<PathBuf>> {
		let Some(pattern) = &self.settings.modules_glob else {
			return Ok(self
				.search_paths()?
				.iter()
				.map(|base| base.join(identifier).join(&self.settings.routes_file))
				.filter(|path| path.is_file())
				.collect());
		};

		let mut files = Vec::new();
		for base in self.search_paths()? {
			files.extend(
				glob_modules(base, pattern)?
					.into_iter()
					.filter(|module| module.name == identifier)
					.map(|module| module.routes_path),
			);
		}
		Ok(files)
	}

	/// Read every record of `identifier` from all search paths.
	///
	/// # Errors
	///
	/// - [`RoutingError::MissingConfiguration`] without `modules_path`.
	/// - [`RoutingError::ModuleLoad`] when a routes file cannot be parsed.
	pub fn read(&self, identifier: &str) -> RoutingResult<Vec<PendingRoute>> {
		let files = self.routes_files(identifier)?;
		if files.is_empty() {
			tracing::warn!(
				module = identifier,
				routes_file = %self.settings.routes_file,
				"module has no routes file in any search path"
			);
		}

		let mut routes = Vec::new();
		for file in files {
			routes.extend(read_routes_file(&file, identifier)?);
		}
		Ok(routes)
	}
}

/// Files under `base` matching `pattern`, named by their first component.
fn glob_modules(base: &Path, pattern: &str) -> RoutingResult<Vec<DiscoveredModule>> {
	let Some(base_str) = base.to_str() else {
		tracing::debug!("Skipping non UTF-8 module search path: {}", base.display());
		return Ok(Vec::new());
	};
	let full = format!("{}/{}", glob::Pattern::escape(base_str), pattern.trim_start_matches('/'));

	let mut found = Vec::new();
	for entry in glob::glob(&full)? {
		let routes_path = match entry {
			Ok(path) => path,
			Err(e) => {
				tracing::debug!("Skipping unreadable glob match: {}", e);
				continue;
			}
		};
		if !routes_path.is_file() {
			continue;
		}
		let Ok(relative) = routes_path.strip_prefix(base) else {
			continue;
		};
		// A match directly under the search path belongs to no module.
		if relative.components().count() < 2 {
			continue;
		}
		let Some(Component::Normal(name)) = relative.components().next() else {
			continue;
		};
		let Some(name) = name.to_str() else {
			continue;
		};
		found.push(DiscoveredModule {
			name: name.to_string(),
			base_path: base.to_path_buf(),
			routes_path,
		});
	}
	Ok(found)
}

/// Parse one routes file, dropping incomplete records.
pub fn read_routes_file(path: &Path, module: &str) -> RoutingResult<Vec<PendingRoute>> {
	let load_error = |message: String| RoutingError::ModuleLoad {
		module: module.to_string(),
		path: path.display().to_string(),
		message,
	};

	let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
	let document: RoutesDocument = match path.extension().and_then(|e| e.to_str()) {
		Some("toml") => toml::from_str(&content).map_err(|e| load_error(e.to_string()))?,
		Some("json") => serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?,
		other => {
			return Err(load_error(format!(
				"unsupported routes file extension: {}",
				other.unwrap_or("<none>")
			)));
		}
	};

	let records = document.into_records();
	let total = records.len();
	let routes: Vec<_> = records
		.into_iter()
		.filter_map(ModuleRecord::into_pending)
		.collect();

	if routes.len() < total {
		tracing::warn!(
			module,
			path = %path.display(),
			skipped = total - routes.len(),
			"skipped route records without method, path or handler"
		);
	}
	Ok(routes)
}
