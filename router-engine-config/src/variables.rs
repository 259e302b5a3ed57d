//! String variables referenced from the engine configuration.
//!
//! Large or secret values (URLs, header values, static payloads) are not always written into the
//! composed configuration as literals. They may instead point at an environment variable, or be a
//! placeholder the router fills in itself. Resolution never fails: anything that cannot be
//! resolved becomes the empty string.

use std::collections::HashMap;
use std::env;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// A value that is either written inline or resolved when the configuration is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationVariable {
    /// Literal content
    #[serde(rename_all = "camelCase")]
    Static { content: String },
    /// Read from the process environment, falling back to `default_value` when unset
    #[serde(rename_all = "camelCase")]
    Env {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    /// Filled in by the router itself; compiles to an empty string
    #[serde(rename_all = "camelCase")]
    Placeholder { name: String },
}

impl ConfigurationVariable {
    /// A variable whose value is `content` itself.
    pub fn literal(content: impl Into<String>) -> Self {
        ConfigurationVariable::Static {
            content: content.into(),
        }
    }

    /// A variable read from the environment variable `name`.
    pub fn env(name: impl Into<String>, default_value: Option<String>) -> Self {
        ConfigurationVariable::Env {
            name: name.into(),
            default_value,
        }
    }
}

impl Default for ConfigurationVariable {
    fn default() -> Self {
        ConfigurationVariable::literal(String::new())
    }
}

impl From<&str> for ConfigurationVariable {
    fn from(content: &str) -> Self {
        ConfigurationVariable::literal(content)
    }
}

/// Resolves [`ConfigurationVariable`]s to their string value.
///
/// Implementations must not fail: a variable that cannot be resolved yields an empty string.
pub trait StringVariableLoader: Send + Sync {
    /// Resolve a single variable.
    fn load(&self, variable: &ConfigurationVariable) -> String;
}

/// Resolves variables against the process environment.
#[derive(Debug, Clone, Default, buildstructor::Builder)]
pub struct EnvironmentVariables {
    /// Values consulted before the process environment.
    env_vars: HashMap<String, String>,
}

impl EnvironmentVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(value) = self.env_vars.get(name) {
            return Some(value.clone());
        }
        env::var(name).ok()
    }
}

impl StringVariableLoader for EnvironmentVariables {
    fn load(&self, variable: &ConfigurationVariable) -> String {
        match variable {
            ConfigurationVariable::Static { content } => content.clone(),
            ConfigurationVariable::Env {
                name,
                default_value,
            } => match self.lookup(name) {
                Some(value) => value,
                None => {
                    tracing::trace!(
                        "environment variable '{}' is not set, using its default value",
                        name
                    );
                    default_value.clone().unwrap_or_default()
                }
            },
            ConfigurationVariable::Placeholder { .. } => String::new(),
        }
    }
}
