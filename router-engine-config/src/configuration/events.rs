use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Event sources backing publish/subscribe data sources.
///
/// Passed through untouched: connecting to the sources is the job of the connector handed to
/// the [`DefaultFactoryResolver`](crate::factory::DefaultFactoryResolver).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct EventsConfiguration {
    /// Configured event sources
    pub sources: Vec<EventSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventSource {
    /// The broker implementation
    pub provider: EventProvider,
    /// Connection URL of the broker
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventProvider {
    Nats,
}
