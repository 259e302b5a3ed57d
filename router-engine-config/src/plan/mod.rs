//! The compiled plan configuration handed to the execution engine.

pub mod federation;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use displaydoc::Display;
use regex::Regex;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

pub use self::federation::FederationMetaData;
use crate::factory::PlannerFactory;

/// Everything the execution engine needs to plan and dispatch operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanConfiguration {
    pub default_flush_interval_millis: i64,
    /// Include type and field usage information in query plans.
    pub include_info: bool,
    pub fields: Vec<FieldConfiguration>,
    pub types: Vec<TypeConfiguration>,
    pub data_sources: Vec<DataSourceConfiguration>,
}

impl PlanConfiguration {
    pub fn data_source(&self, id: &str) -> Option<&DataSourceConfiguration> {
        self.data_sources.iter().find(|ds| ds.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConfiguration {
    pub type_name: String,
    pub field_name: String,
    pub arguments: Vec<ArgumentConfiguration>,
    pub has_authorization_rule: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentConfiguration {
    pub name: String,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    FieldArgument,
    ObjectField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeConfiguration {
    pub type_name: String,
    pub rename_to: String,
}

/// A compiled data source.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceConfiguration {
    pub id: String,
    #[serde(serialize_with = "serialize_factory")]
    pub factory: Arc<dyn PlannerFactory>,
    pub custom: CustomConfiguration,
    pub root_nodes: Vec<TypeField>,
    pub child_nodes: Vec<TypeField>,
    pub directives: Vec<DirectiveConfiguration>,
    pub federation_meta_data: FederationMetaData,
}

// Factories are compared by kind: a graphql factory is created per data source and is never
// pointer equal to another one.
impl PartialEq for DataSourceConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.factory.kind() == other.factory.kind()
            && self.custom == other.custom
            && self.root_nodes == other.root_nodes
            && self.child_nodes == other.child_nodes
            && self.directives == other.directives
            && self.federation_meta_data == other.federation_meta_data
    }
}

fn serialize_factory<S>(factory: &Arc<dyn PlannerFactory>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(factory.kind())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeField {
    pub type_name: String,
    pub field_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveConfiguration {
    pub directive_name: String,
    pub rename_to: String,
}

/// Kind specific configuration of a compiled data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomConfiguration {
    Graphql(GraphQLConfiguration),
    Static(StaticConfiguration),
    #[serde(rename = "pubsub")]
    PubSub(PubSubConfiguration),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLConfiguration {
    pub fetch: FetchConfiguration,
    pub federation: FederationConfiguration,
    pub subscription: SubscriptionConfiguration,
    pub upstream_schema: String,
    pub custom_scalar_type_fields: Vec<SingleTypeField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchConfiguration {
    pub url: String,
    #[serde(with = "http_serde::method")]
    pub method: http::Method,
    /// Names are case insensitive; a header may carry several values.
    #[serde(with = "http_serde::header_map")]
    pub header: http::HeaderMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FederationConfiguration {
    pub enabled: bool,
    pub service_sdl: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionConfiguration {
    pub url: String,
    pub use_sse: bool,
    pub sse_method_post: bool,
    pub forwarded_client_header_names: Vec<String>,
    #[serde(with = "serde_regex")]
    pub forwarded_client_header_regular_expressions: Vec<Regex>,
}

impl PartialEq for SubscriptionConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && self.use_sse == other.use_sse
            && self.sse_method_post == other.sse_method_post
            && self.forwarded_client_header_names == other.forwarded_client_header_names
            && self
                .forwarded_client_header_regular_expressions
                .iter()
                .map(Regex::as_str)
                .eq(other
                    .forwarded_client_header_regular_expressions
                    .iter()
                    .map(Regex::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleTypeField {
    pub type_name: String,
    pub field_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticConfiguration {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PubSubConfiguration {
    pub events: Vec<EventConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventConfiguration {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub type_name: String,
    pub field_name: String,
    pub topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Publish,
    Request,
    Subscribe,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Publish => "publish",
            EventType::Request => "request",
            EventType::Subscribe => "subscribe",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// invalid event type: "{0}"
#[derive(Debug, Clone, Display, Error, PartialEq, Eq)]
pub struct InvalidEventType(pub String);

impl FromStr for EventType {
    type Err = InvalidEventType;

    /// Case insensitive, so that both `PUBLISH` and `publish` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "publish" => Ok(EventType::Publish),
            "request" => Ok(EventType::Request),
            "subscribe" => Ok(EventType::Subscribe),
            _ => Err(InvalidEventType(s.to_string())),
        }
    }
}
