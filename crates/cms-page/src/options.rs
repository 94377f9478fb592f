//! Breadcrumb rendering options.
//!
//! Options reach the breadcrumb template unchanged, so templates may read
//! keys this crate does not know about. Recognized keys are typed; the rest
//! are kept in [`BreadcrumbOptions::extra`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// CSS class applied to the breadcrumb container by default.
pub const DEFAULT_CONTAINER_CLASS: &str = "sonata-page-breadcrumbs";

/// Options passed to breadcrumb templates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreadcrumbOptions {
    /// Rendered after each ancestor.
    pub separator: String,
    /// CSS class of the current page entry.
    pub current_class: String,
    /// Rendered before the current page entry.
    pub last_separator: String,
    /// Prepend the home page when the ancestor chain does not start with it.
    pub force_view_home_page: bool,
    /// HTML attributes of the breadcrumb container.
    pub container_attr: BTreeMap<String, String>,
    /// Unrecognized options, passed through to the template.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BreadcrumbOptions {
    fn default() -> Self {
        Self {
            separator: String::new(),
            current_class: String::new(),
            last_separator: String::new(),
            force_view_home_page: true,
            container_attr: BTreeMap::from([(
                "class".to_owned(),
                DEFAULT_CONTAINER_CLASS.to_owned(),
            )]),
            extra: Map::new(),
        }
    }
}

/// Invalid breadcrumb options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// Options were not a map.
    #[error("Breadcrumb options must be a map, got {0}")]
    NotAMap(&'static str),
    /// A recognized option has the wrong type.
    #[error("Invalid breadcrumb option: {0}")]
    InvalidValue(#[from] serde_json::Error),
}

impl BreadcrumbOptions {
    /// Defaults with `overrides` applied key by key.
    ///
    /// The merge is shallow: an overriding `container_attr` replaces the
    /// default attributes entirely.
    pub fn merged(overrides: Map<String, Value>) -> Result<Self, OptionsError> {
        let mut merged = match serde_json::to_value(Self::default())? {
            Value::Object(defaults) => defaults,
            _ => Map::new(),
        };
        merged.extend(overrides);
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Options from a template-supplied value: `null` means defaults.
    pub fn from_json(value: Value) -> Result<Self, OptionsError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(overrides) => Self::merged(overrides),
            Value::Bool(_) => Err(OptionsError::NotAMap("a boolean")),
            Value::Number(_) => Err(OptionsError::NotAMap("a number")),
            Value::String(_) => Err(OptionsError::NotAMap("a string")),
            Value::Array(_) => Err(OptionsError::NotAMap("a list")),
        }
    }
}
