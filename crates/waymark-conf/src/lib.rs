//! # Waymark Configuration
//!
//! Layered settings for the Waymark router. Values are gathered from
//! configuration sources (defaults, TOML/JSON files, `WAYMARK_*` environment
//! variables), merged by priority and deserialized into [`RouterSettings`].
//!
//! ## Quick Start
//!
//! ```
//! use waymark_conf::{RouterSettings, SettingsBuilder};
//! use waymark_conf::sources::TomlFileSource;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(Box::new(TomlFileSource::new("waymark.toml")))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(settings.routes_file, "routes.toml");
//! ```

pub mod settings;
pub mod sources;

pub use settings::{DEFAULT_ROUTES_FILE, RouterSettings, SettingsBuilder};
pub use sources::{ConfigSource, SourceError};
