//! The composed router configuration, as produced by composition.
//!
//! This is the input of the [`Loader`](crate::Loader). It is read-only for the duration of a
//! compilation and mirrors the JSON emitted by the control plane (camelCase keys, upper case
//! enum values).

mod interned;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

pub use self::interned::InternedString;
pub use self::interned::MissingInternedString;
pub use self::interned::StringStorage;
use crate::configuration::ConfigurationError;
use crate::variables::ConfigurationVariable;

/// Root of a composed router configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterConfig {
    pub version: String,
    pub engine_config: EngineConfiguration,
    pub subgraphs: Vec<Subgraph>,
}

impl FromStr for RouterConfig {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(ConfigurationError::InvalidRouterConfig)
    }
}

/// A subgraph taking part in the composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subgraph {
    pub id: String,
    pub name: String,
    pub routing_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfiguration {
    /// Flush interval for streamed responses, in milliseconds.
    pub default_flush_interval: i64,
    pub field_configurations: Vec<FieldConfiguration>,
    pub type_configurations: Vec<TypeConfiguration>,
    pub datasource_configurations: Vec<DataSourceConfiguration>,
    pub string_storage: StringStorage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfiguration {
    pub type_name: String,
    pub field_name: String,
    pub arguments_configuration: Vec<ArgumentConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_configuration: Option<AuthorizationConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArgumentConfiguration {
    pub name: String,
    pub source_type: ArgumentSource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArgumentSource {
    #[default]
    ObjectField,
    FieldArgument,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizationConfiguration {
    pub requires_authentication: bool,
    /// Any one of these scope sets grants access.
    pub required_or_scopes: Vec<Scopes>,
}

/// Scopes that must all be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scopes {
    pub required_and_scopes: Vec<String>,
}

impl Scopes {
    pub fn new<S: Into<String>>(scopes: impl IntoIterator<Item = S>) -> Self {
        Scopes {
            required_and_scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeConfiguration {
    pub type_name: String,
    pub rename_to: String,
}

/// A single upstream the router can resolve fields from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfiguration {
    pub id: String,
    /// The kind tag together with its kind specific payload.
    #[serde(flatten)]
    pub custom: DataSourceCustom,
    #[serde(default)]
    pub root_nodes: Vec<TypeField>,
    #[serde(default)]
    pub child_nodes: Vec<TypeField>,
    #[serde(default)]
    pub directives: Vec<DirectiveConfiguration>,
    #[serde(default)]
    pub keys: Vec<RequiredField>,
    #[serde(default)]
    pub provides: Vec<RequiredField>,
    #[serde(default)]
    pub requires: Vec<RequiredField>,
    #[serde(default)]
    pub entity_interfaces: Vec<EntityInterfaceConfiguration>,
    #[serde(default)]
    pub interface_objects: Vec<EntityInterfaceConfiguration>,
}

impl DataSourceConfiguration {
    /// A data source without nodes, directives or federation declarations.
    pub fn new(id: impl Into<String>, custom: DataSourceCustom) -> Self {
        Self {
            id: id.into(),
            custom,
            root_nodes: Vec::new(),
            child_nodes: Vec::new(),
            directives: Vec::new(),
            keys: Vec::new(),
            provides: Vec::new(),
            requires: Vec::new(),
            entity_interfaces: Vec::new(),
            interface_objects: Vec::new(),
        }
    }
}

/// The kinds of data source this crate knows how to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    Graphql,
    Static,
    PubSub,
}

impl DataSourceKind {
    pub const ALL: [DataSourceKind; 3] = [
        DataSourceKind::Graphql,
        DataSourceKind::Static,
        DataSourceKind::PubSub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Graphql => "GRAPHQL",
            DataSourceKind::Static => "STATIC",
            DataSourceKind::PubSub => "PUBSUB",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind tag and payload of a data source.
///
/// Kinds that are not built in deserialize to [`DataSourceCustom::Other`] so that a registered
/// [`FactoryResolver`](crate::factory::FactoryResolver) gets a chance to claim them. A built in
/// kind with a malformed payload is an error, never `Other`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum DataSourceCustom {
    #[serde(rename = "GRAPHQL")]
    Graphql {
        #[serde(rename = "customGraphql")]
        config: GraphQLDataSourceCustom,
    },
    #[serde(rename = "STATIC")]
    Static {
        #[serde(rename = "customStatic")]
        config: StaticDataSourceCustom,
    },
    #[serde(rename = "PUBSUB")]
    PubSub {
        #[serde(rename = "customEvents")]
        config: EventsDataSourceCustom,
    },
    #[serde(untagged)]
    Other { kind: String },
}

impl<'de> Deserialize<'de> for DataSourceCustom {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let kind = match fields.remove("kind") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::invalid_type(
                    de::Unexpected::Other(&other.to_string()),
                    &"a data source kind",
                ))
            }
            None => return Err(de::Error::missing_field("kind")),
        };

        let builtin = DataSourceKind::ALL
            .into_iter()
            .find(|builtin| builtin.as_str() == kind);
        Ok(match builtin {
            Some(DataSourceKind::Graphql) => DataSourceCustom::Graphql {
                config: payload(&mut fields, "customGraphql")?,
            },
            Some(DataSourceKind::Static) => DataSourceCustom::Static {
                config: payload(&mut fields, "customStatic")?,
            },
            Some(DataSourceKind::PubSub) => DataSourceCustom::PubSub {
                config: payload(&mut fields, "customEvents")?,
            },
            None => DataSourceCustom::Other { kind },
        })
    }
}

fn payload<T, E>(fields: &mut Map<String, Value>, field: &'static str) -> Result<T, E>
where
    T: DeserializeOwned,
    E: de::Error,
{
    let value = fields
        .remove(field)
        .ok_or_else(|| E::missing_field(field))?;
    T::deserialize(value).map_err(|err| E::custom(format_args!("invalid {field}: {err}")))
}

impl DataSourceCustom {
    /// The built in kind, if this is one.
    pub fn kind(&self) -> Option<DataSourceKind> {
        match self {
            DataSourceCustom::Graphql { .. } => Some(DataSourceKind::Graphql),
            DataSourceCustom::Static { .. } => Some(DataSourceKind::Static),
            DataSourceCustom::PubSub { .. } => Some(DataSourceKind::PubSub),
            DataSourceCustom::Other { .. } => None,
        }
    }

    /// The kind tag as declared in the configuration.
    pub fn kind_name(&self) -> &str {
        match self {
            DataSourceCustom::Other { kind } => kind,
            builtin => builtin.kind().map_or("", |kind| kind.as_str()),
        }
    }
}

impl From<GraphQLDataSourceCustom> for DataSourceCustom {
    fn from(config: GraphQLDataSourceCustom) -> Self {
        DataSourceCustom::Graphql { config }
    }
}

impl From<StaticDataSourceCustom> for DataSourceCustom {
    fn from(config: StaticDataSourceCustom) -> Self {
        DataSourceCustom::Static { config }
    }
}

impl From<EventsDataSourceCustom> for DataSourceCustom {
    fn from(config: EventsDataSourceCustom) -> Self {
        DataSourceCustom::PubSub { config }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLDataSourceCustom {
    pub fetch: FetchConfiguration,
    pub subscription: GraphQLSubscriptionConfiguration,
    pub federation: GraphQLFederationConfiguration,
    pub upstream_schema: InternedString,
    pub custom_scalar_type_fields: Vec<SingleTypeField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchConfiguration {
    pub url: ConfigurationVariable,
    pub method: HttpMethod,
    /// Header name to the values sent with every fetch.
    pub header: BTreeMap<String, HttpHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpHeader {
    pub values: Vec<ConfigurationVariable>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
    Options,
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLSubscriptionConfiguration {
    pub enabled: bool,
    /// Defaults to the fetch URL when it resolves to an empty string.
    pub url: ConfigurationVariable,
    /// Superseded by `protocol`; only read when `protocol` is absent.
    #[serde(rename = "useSSE", skip_serializing_if = "Option::is_none")]
    pub use_sse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<GraphQLSubscriptionProtocol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum GraphQLSubscriptionProtocol {
    #[serde(rename = "WS")]
    Ws,
    #[serde(rename = "SSE")]
    Sse,
    #[serde(rename = "SSE_POST")]
    SsePost,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLFederationConfiguration {
    pub enabled: bool,
    pub service_sdl: ConfigurationVariable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SingleTypeField {
    pub type_name: String,
    pub field_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticDataSourceCustom {
    pub data: ConfigurationVariable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventsDataSourceCustom {
    pub events: Vec<EventConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventConfiguration {
    /// `PUBLISH`, `REQUEST` or `SUBSCRIBE`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub type_name: String,
    pub field_name: String,
    pub topic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeField {
    pub type_name: String,
    pub field_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectiveConfiguration {
    pub directive_name: String,
}

/// A `@key`, `@provides` or `@requires` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequiredField {
    pub type_name: String,
    pub field_name: String,
    pub selection_set: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityInterfaceConfiguration {
    pub interface_type_name: String,
    pub concrete_type_names: Vec<String>,
}
