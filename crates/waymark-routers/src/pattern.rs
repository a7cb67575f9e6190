//! Path template parsing and compilation.
//!
//! Templates use `{name}` for a required placeholder and `{name?}` for an
//! optional one:
//!
//! - `/users` - exact match
//! - `/users/{id}` - one segment captured as `id`
//! - `/blog/{slug?}` - `/blog` and `/blog/<slug>` both match
//!
//! The parser is shared by the compiler and by reverse routing, so both agree
//! on what a placeholder is.

use crate::route::{ParamValue, ValidationRule};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

/// Maximum allowed size for a compiled route regex (in bytes).
const MAX_ROUTE_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Character class used when no recognized rule applies.
const DEFAULT_CLASS: &str = "[^/]+";

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
	/// Text matched literally.
	Literal(String),
	/// A `{name}` or `{name?}` placeholder.
	Placeholder {
		name: String,
		/// Declared with a trailing `?`.
		optional: bool,
		/// The `/` in front of the placeholder belongs to it.
		leading_slash: bool,
	},
}

impl TemplateSegment {
	/// Placeholder name, `None` for literals.
	pub fn name(&self) -> Option<&str> {
		match self {
			Self::Literal(_) => None,
			Self::Placeholder { name, .. } => Some(name),
		}
	}

	/// Whether the placeholder was declared with `?`.
	pub fn is_optional(&self) -> bool {
		matches!(self, Self::Placeholder { optional: true, .. })
	}
}

/// Split a template into literals and placeholders.
///
/// Braces that do not enclose a valid identifier are kept as literal text.
///
/// # Examples
///
/// ```
/// use waymark_routers::pattern::{TemplateSegment, parse_template};
///
/// let segments = parse_template("/users/{id}");
/// assert_eq!(segments[0], TemplateSegment::Literal("/users".to_string()));
/// assert_eq!(segments[1].name(), Some("id"));
/// ```
pub fn parse_template(template: &str) -> Vec<TemplateSegment> {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		literal.push_str(&rest[..open]);
		let after = &rest[open + 1..];

		let Some(close) = after.find('}') else {
			literal.push_str(&rest[open..]);
			rest = "";
			break;
		};

		let inner = &after[..close];
		let (name, optional) = match inner.strip_suffix('?') {
			Some(name) => (name, true),
			None => (inner, false),
		};

		if is_identifier(name) {
			let leading_slash = literal.ends_with('/');
			if leading_slash {
				literal.pop();
			}
			if !literal.is_empty() {
				segments.push(TemplateSegment::Literal(std::mem::take(&mut literal)));
			}
			segments.push(TemplateSegment::Placeholder {
				name: name.to_string(),
				optional,
				leading_slash,
			});
		} else {
			literal.push('{');
			literal.push_str(inner);
			literal.push('}');
		}
		rest = &after[close + 1..];
	}

	literal.push_str(rest);
	if !literal.is_empty() {
		segments.push(TemplateSegment::Literal(literal));
	}
	segments
}

/// Placeholder names of a template, left to right.
///
/// # Examples
///
/// ```
/// use waymark_routers::pattern::extract_param_names;
///
/// assert_eq!(
///     extract_param_names("/users/{user_id}/posts/{post_id?}"),
///     vec!["user_id", "post_id"]
/// );
/// ```
pub fn extract_param_names(template: &str) -> Vec<String> {
	parse_template(template)
		.into_iter()
		.filter_map(|segment| match segment {
			TemplateSegment::Placeholder { name, .. } => Some(name),
			TemplateSegment::Literal(_) => None,
		})
		.collect()
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Character class for a placeholder: the last recognized rule wins.
fn placeholder_class<'a>(rules: Option<&'a Vec<ValidationRule>>) -> &'a str {
	rules
		.into_iter()
		.flatten()
		.filter_map(ValidationRule::char_class)
		.last()
		.unwrap_or(DEFAULT_CLASS)
}

/// A template compiled to an anchored regex.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	template: String,
	regex: Regex,
	param_names: Vec<String>,
}

impl CompiledPattern {
	/// Compile `template` using the route's validation rules and defaults.
	///
	/// A placeholder with a default is optional even without `?`.
	///
	/// # Examples
	///
	/// ```
	/// use indexmap::IndexMap;
	/// use waymark_routers::pattern::CompiledPattern;
	///
	/// let pattern = CompiledPattern::compile("/users/{id}", &IndexMap::new(), &IndexMap::new()).unwrap();
	/// assert_eq!(pattern.as_str(), "^/users/(?P<id>[^/]+)/?$");
	/// ```
	pub fn compile(
		template: &str,
		validation: &IndexMap<String, Vec<ValidationRule>>,
		defaults: &IndexMap<String, ParamValue>,
	) -> Result<Self, regex::Error> {
		let segments = parse_template(template);
		let mut body = String::new();
		let mut param_names = Vec::new();

		for (index, segment) in segments.iter().enumerate() {
			match segment {
				TemplateSegment::Literal(text) => {
					let mut text = collapse_separators(text);
					if index + 1 == segments.len() {
						// The trailing separator is matched by the anchor suffix.
						while text.ends_with('/') {
							text.pop();
						}
					}
					body.push_str(&regex::escape(&text));
				}
				TemplateSegment::Placeholder {
					name,
					optional,
					leading_slash,
				} => {
					let class = placeholder_class(validation.get(name));
					let optional = *optional || defaults.contains_key(name);
					let slash = if *leading_slash { "/" } else { "" };
					if optional {
						body.push_str(&format!("(?:{}(?P<{}>{}))?", slash, name, class));
					} else {
						body.push_str(&format!("{}(?P<{}>{})", slash, name, class));
					}
					param_names.push(name.clone());
				}
			}
		}

		let regex_str = format!("^{}/?$", body);
		let regex = RegexBuilder::new(&regex_str)
			.size_limit(MAX_ROUTE_REGEX_SIZE)
			.build()?;

		Ok(Self {
			template: template.to_string(),
			regex,
			param_names,
		})
	}

	/// Compiled regex text.
	pub fn as_str(&self) -> &str {
		self.regex.as_str()
	}

	/// Template this pattern was compiled from.
	pub fn template(&self) -> &str {
		&self.template
	}

	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Match a normalized path, returning the captured placeholders in
	/// template order. Optional placeholders that did not participate are
	/// absent.
	pub fn captures(&self, path: &str) -> Option<IndexMap<String, String>> {
		let caps = self.regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
				.collect(),
		)
	}

	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}
}

fn collapse_separators(text: &str) -> String {
	let mut collapsed = String::with_capacity(text.len());
	for c in text.chars() {
		if c == '/' && collapsed.ends_with('/') {
			continue;
		}
		collapsed.push(c);
	}
	collapsed
}
