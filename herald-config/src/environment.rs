//! Environment-backed configuration.
//!
//! Supports nested objects and arrays through a key convention:
//!
//! 1. Object properties are referenced with the `.` separator.
//! 2. Array elements are referenced with the `__N__` token.
//!
//! ```text
//! application.name = "My Application"
//! application.authors__0__ = "John Doe"
//! service.protocols__0__.name = "http"
//! service.protocols__0__.port = 80
//! ```
//!
//! so `get("service")` yields a structured value with a `protocols` array.

use async_trait::async_trait;
use herald_common::error::ConfigError;

use crate::provider::{ConfigProvider, Fetch, TaggedValue};

/// Reads configuration from a snapshot of the process environment.
///
/// Environment values carry no revalidation tags; every fetch returns the
/// current snapshot untagged.
pub struct EnvironmentProvider {
    vars: Vec<(String, String)>,
}

impl EnvironmentProvider {
    pub const OBJECT_SEPARATOR: char = '.';
    pub const ARRAY_TOKEN: &'static str = "__";

    /// Snapshot the process environment. Keys are sorted so array elements
    /// assemble in index order.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut vars: Vec<_> = vars.into_iter().collect();
        vars.sort_by(|left, right| left.0.cmp(&right.0));
        Self { vars }
    }

    /// Assemble the value for `key`, structured when nested keys exist.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<toml::Value> {
        let entries: Vec<(&str, &str)> = self
            .vars
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(key).and_then(|rest| {
                    (rest.is_empty()
                        || rest.starts_with(Self::OBJECT_SEPARATOR)
                        || rest.starts_with(Self::ARRAY_TOKEN))
                    .then_some((rest, value.as_str()))
                })
            })
            .collect();

        match entries.as_slice() {
            [] => None,
            [("", value)] => Some(scalar(value)),
            _ => {
                let mut root = toml::Value::Table(toml::value::Table::new());
                for (rest, value) in entries {
                    if rest.is_empty() {
                        continue;
                    }
                    insert(&mut root, &steps(rest), scalar(value));
                }
                Some(root)
            }
        }
    }
}

impl Default for EnvironmentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigProvider for EnvironmentProvider {
    async fn fetch(&self, key: &str, _tag: Option<&str>) -> Result<Fetch, ConfigError> {
        Ok(self
            .value(key)
            .map_or(Fetch::Absent, |value| Fetch::Value(TaggedValue::untagged(value))))
    }
}

enum Step {
    Field(String),
    Index(usize),
}

/// Parse the key remainder after the looked-up prefix into field and
/// array-index steps.
fn steps(rest: &str) -> Vec<Step> {
    let mut steps = Vec::new();

    for piece in rest.split(EnvironmentProvider::OBJECT_SEPARATOR) {
        if piece.is_empty() {
            continue;
        }

        match array_segment(piece) {
            Some((name, index)) => {
                if !name.is_empty() {
                    steps.push(Step::Field(name.to_string()));
                }
                steps.push(Step::Index(index));
            }
            None => steps.push(Step::Field(piece.to_string())),
        }
    }

    steps
}

/// Split a `name__N__` segment into its name and index, when well-formed.
fn array_segment(piece: &str) -> Option<(&str, usize)> {
    let start = piece.find(EnvironmentProvider::ARRAY_TOKEN)?;
    let digits = piece[start + 2..].strip_suffix(EnvironmentProvider::ARRAY_TOKEN)?;
    let index = digits.parse().ok()?;
    Some((&piece[..start], index))
}

fn insert(target: &mut toml::Value, steps: &[Step], value: toml::Value) {
    match steps {
        [] => *target = value,
        [Step::Field(name), rest @ ..] => {
            if !target.is_table() {
                *target = toml::Value::Table(toml::value::Table::new());
            }
            if let toml::Value::Table(table) = target {
                let entry = table
                    .entry(name.clone())
                    .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
                insert(entry, rest, value);
            }
        }
        [Step::Index(index), rest @ ..] => {
            if !target.is_array() {
                *target = toml::Value::Array(Vec::new());
            }
            if let toml::Value::Array(items) = target {
                while items.len() <= *index {
                    items.push(toml::Value::Table(toml::value::Table::new()));
                }
                insert(&mut items[*index], rest, value);
            }
        }
    }
}

/// Source values are strings; recover the obvious primitive types so typed
/// deserialisation works for numbers and booleans.
pub(crate) fn scalar(value: &str) -> toml::Value {
    if let Ok(integer) = value.parse::<i64>() {
        return toml::Value::Integer(integer);
    }
    if let Ok(float) = value.parse::<f64>() {
        return toml::Value::Float(float);
    }
    if let Ok(boolean) = value.parse::<bool>() {
        return toml::Value::Boolean(boolean);
    }

    toml::Value::String(value.to_string())
}
