//! Execution settings passed alongside the composed configuration.

mod events;
mod headers;

use std::str::FromStr;
use std::time::Duration;

use displaydoc::Display;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub use self::events::EventProvider;
pub use self::events::EventSource;
pub use self::events::EventsConfiguration;
pub use self::headers::HeaderLocation;
pub use self::headers::HeaderRuleOperation;
pub use self::headers::HeaderRules;
pub use self::headers::RequestHeaderRule;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not parse engine settings: {0}
    InvalidSettings(serde_yaml::Error),
    /// could not parse router configuration: {0}
    InvalidRouterConfig(serde_json::Error),
}

/// Settings that apply to a whole router instance, as opposed to the composed graph.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct RouterEngineConfiguration {
    /// Engine execution tuning
    pub execution: EngineExecutionConfiguration,
    /// Header forwarding rules for subgraph requests
    pub headers: HeaderRules,
    /// Event sources backing publish/subscribe data sources
    pub events: EventsConfiguration,
}

#[buildstructor::buildstructor]
impl RouterEngineConfiguration {
    #[builder]
    pub fn new(
        execution: Option<EngineExecutionConfiguration>,
        headers: Option<HeaderRules>,
        events: Option<EventsConfiguration>,
    ) -> Self {
        Self {
            execution: execution.unwrap_or_default(),
            headers: headers.unwrap_or_default(),
            events: events.unwrap_or_default(),
        }
    }
}

impl FromStr for RouterEngineConfiguration {
    type Err = ConfigurationError;

    /// Parse settings from YAML (and therefore JSON).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str(s).map_err(ConfigurationError::InvalidSettings)
    }
}

/// Engine execution tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct EngineExecutionConfiguration {
    /// Include type and field usage information in query plans (default: false)
    pub include_info: bool,
    /// Coalesce identical in-flight subgraph requests (default: true)
    pub enable_single_flight: bool,
    /// Upper bound of resolvers running concurrently for one request (default: 1024)
    pub max_concurrent_resolvers: usize,
    /// Read timeout of subscription websockets (default: 5s)
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub websocket_read_timeout: Duration,
}

impl Default for EngineExecutionConfiguration {
    fn default() -> Self {
        Self {
            include_info: false,
            enable_single_flight: true,
            max_concurrent_resolvers: 1024,
            websocket_read_timeout: Duration::from_secs(5),
        }
    }
}

/// The JSON schema of [`RouterEngineConfiguration`].
pub fn generate_config_schema() -> RootSchema {
    schemars::schema_for!(RouterEngineConfiguration)
}
