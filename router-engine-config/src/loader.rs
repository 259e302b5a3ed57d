//! Compiles a [`RouterConfig`] into the engine's [`PlanConfiguration`].

use std::sync::Arc;

use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;

use crate::configuration::RouterEngineConfiguration;
use crate::error::CompileError;
use crate::factory::FactoryResolver;
use crate::factory::PlannerFactory;
use crate::headers::DefaultHeaderPropagation;
use crate::headers::HeaderPropagation;
use crate::plan;
use crate::plan::federation;
use crate::plan::CustomConfiguration;
use crate::plan::PlanConfiguration;
use crate::source;
use crate::source::ArgumentSource;
use crate::source::DataSourceCustom;
use crate::source::RouterConfig;
use crate::subscription::select_transport;
use crate::variables::EnvironmentVariables;
use crate::variables::StringVariableLoader;

/// Compiles composed router configurations.
///
/// A loader holds no state besides its resolvers and collaborators, all fixed at construction,
/// so a single instance can compile concurrently from several threads.
pub struct Loader {
    resolvers: Vec<Arc<dyn FactoryResolver>>,
    // type and field usage information in the plan
    include_info: bool,
    variables: Arc<dyn StringVariableLoader>,
    header_propagation: Arc<dyn HeaderPropagation>,
}

impl Loader {
    /// Resolvers are asked in order for the factory of each data source. Put overrides first and
    /// the [`DefaultFactoryResolver`](crate::factory::DefaultFactoryResolver) last.
    pub fn new(include_info: bool, resolvers: Vec<Arc<dyn FactoryResolver>>) -> Self {
        Self {
            resolvers,
            include_info,
            variables: Arc::new(EnvironmentVariables::default()),
            header_propagation: Arc::new(DefaultHeaderPropagation),
        }
    }

    /// Resolve string variables with `variables` instead of the process environment.
    pub fn with_variables(mut self, variables: Arc<dyn StringVariableLoader>) -> Self {
        self.variables = variables;
        self
    }

    /// Compute forwarded client headers with `header_propagation`.
    pub fn with_header_propagation(mut self, header_propagation: Arc<dyn HeaderPropagation>) -> Self {
        self.header_propagation = header_propagation;
        self
    }

    /// Compile `router_config`.
    ///
    /// Data sources no resolver claims are left out of the plan. Any other failure aborts the
    /// whole compilation; there is never a partial plan.
    pub fn compile(
        &self,
        router_config: &RouterConfig,
        engine: &RouterEngineConfiguration,
    ) -> Result<PlanConfiguration, CompileError> {
        let engine_config = &router_config.engine_config;
        let span = tracing::debug_span!(
            "compile_engine_configuration",
            version = %router_config.version,
            data_sources = engine_config.datasource_configurations.len()
        );
        let _guard = span.enter();

        let mut data_sources = Vec::with_capacity(engine_config.datasource_configurations.len());
        for data_source in &engine_config.datasource_configurations {
            let Some(factory) = self.resolve_factory(data_source)? else {
                tracing::trace!(
                    data_source = %data_source.id,
                    kind = data_source.custom.kind_name(),
                    "no planner factory, the data source is not served by this router"
                );
                continue;
            };

            let custom = self.custom_configuration(router_config, engine, data_source)?;
            data_sources.push(plan::DataSourceConfiguration {
                id: data_source.id.clone(),
                factory,
                custom,
                root_nodes: type_fields(&data_source.root_nodes),
                child_nodes: type_fields(&data_source.child_nodes),
                directives: data_source
                    .directives
                    .iter()
                    .map(|directive| plan::DirectiveConfiguration {
                        directive_name: directive.directive_name.clone(),
                        // directives are never renamed
                        rename_to: directive.directive_name.clone(),
                    })
                    .collect(),
                federation_meta_data: federation::assemble(data_source),
            });
            tracing::debug!(
                data_source = %data_source.id,
                kind = data_source.custom.kind_name(),
                "compiled data source"
            );
        }

        Ok(PlanConfiguration {
            default_flush_interval_millis: engine_config.default_flush_interval,
            include_info: self.include_info,
            fields: engine_config
                .field_configurations
                .iter()
                .map(field_configuration)
                .collect(),
            types: engine_config
                .type_configurations
                .iter()
                .map(|configuration| plan::TypeConfiguration {
                    type_name: configuration.type_name.clone(),
                    rename_to: configuration.rename_to.clone(),
                })
                .collect(),
            data_sources,
        })
    }

    fn resolve_factory(
        &self,
        data_source: &source::DataSourceConfiguration,
    ) -> Result<Option<Arc<dyn PlannerFactory>>, CompileError> {
        for resolver in &self.resolvers {
            let factory =
                resolver
                    .resolve(data_source)
                    .map_err(|source| CompileError::ResolveFactory {
                        data_source: data_source.id.clone(),
                        source,
                    })?;
            if factory.is_some() {
                return Ok(factory);
            }
        }
        Ok(None)
    }

    fn custom_configuration(
        &self,
        router_config: &RouterConfig,
        engine: &RouterEngineConfiguration,
        data_source: &source::DataSourceConfiguration,
    ) -> Result<CustomConfiguration, CompileError> {
        match &data_source.custom {
            DataSourceCustom::Static { config } => {
                Ok(CustomConfiguration::Static(plan::StaticConfiguration {
                    data: self.variables.load(&config.data),
                }))
            }
            DataSourceCustom::Graphql { config } => self
                .graphql_configuration(router_config, engine, &data_source.id, config)
                .map(CustomConfiguration::Graphql),
            DataSourceCustom::PubSub { config } => {
                pubsub_configuration(&data_source.id, config).map(CustomConfiguration::PubSub)
            }
            DataSourceCustom::Other { kind } => Err(CompileError::UnknownDataSourceKind {
                data_source: data_source.id.clone(),
                kind: kind.clone(),
            }),
        }
    }

    fn graphql_configuration(
        &self,
        router_config: &RouterConfig,
        engine: &RouterEngineConfiguration,
        id: &str,
        config: &source::GraphQLDataSourceCustom,
    ) -> Result<plan::GraphQLConfiguration, CompileError> {
        let fetch_url = self.variables.load(&config.fetch.url);
        // names differing only in case end up under the same header
        let mut header = HeaderMap::new();
        for (name, values) in &config.fetch.header {
            let invalid_header = |source: http::Error| CompileError::InvalidFetchHeader {
                data_source: id.to_string(),
                name: name.clone(),
                source,
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|err| invalid_header(err.into()))?;
            for value in &values.values {
                let value = HeaderValue::from_str(&self.variables.load(value))
                    .map_err(|err| invalid_header(err.into()))?;
                header.append(header_name.clone(), value);
            }
        }

        let mut subscription_url = self.variables.load(&config.subscription.url);
        if subscription_url.is_empty() {
            subscription_url = fetch_url.clone();
        }
        let transport = select_transport(config.subscription.protocol, config.subscription.use_sse);

        let upstream_schema = router_config
            .engine_config
            .string_storage
            .load(&config.upstream_schema)
            .map_err(|source| CompileError::UpstreamSchema {
                data_source: id.to_string(),
                source,
            })?;

        let custom_scalar_type_fields = config
            .custom_scalar_type_fields
            .iter()
            .map(|field| plan::SingleTypeField {
                type_name: field.type_name.clone(),
                field_name: field.field_name.clone(),
            })
            .collect();

        let forwarded = self
            .header_propagation
            .forwarded_headers(&engine.headers, &router_config.subgraphs, &subscription_url)
            .map_err(|source| CompileError::HeaderRules {
                data_source: id.to_string(),
                source,
            })?;

        Ok(plan::GraphQLConfiguration {
            fetch: plan::FetchConfiguration {
                url: fetch_url,
                method: config.fetch.method.into(),
                header,
            },
            federation: plan::FederationConfiguration {
                enabled: config.federation.enabled,
                service_sdl: self.variables.load(&config.federation.service_sdl),
            },
            subscription: plan::SubscriptionConfiguration {
                url: subscription_url,
                use_sse: transport.use_sse,
                sse_method_post: transport.sse_method_post,
                forwarded_client_header_names: forwarded.names,
                forwarded_client_header_regular_expressions: forwarded.regexes,
            },
            upstream_schema,
            custom_scalar_type_fields,
        })
    }
}

fn pubsub_configuration(
    id: &str,
    config: &source::EventsDataSourceCustom,
) -> Result<plan::PubSubConfiguration, CompileError> {
    let events = config
        .events
        .iter()
        .map(|event| {
            let event_type =
                event
                    .event_type
                    .parse()
                    .map_err(|source| CompileError::InvalidEventType {
                        data_source: id.to_string(),
                        event_type: event.event_type.clone(),
                        source,
                    })?;
            Ok(plan::EventConfiguration {
                event_type,
                type_name: event.type_name.clone(),
                field_name: event.field_name.clone(),
                topic: event.topic.clone(),
            })
        })
        .collect::<Result<_, CompileError>>()?;
    Ok(plan::PubSubConfiguration { events })
}

fn type_fields(nodes: &[source::TypeField]) -> Vec<plan::TypeField> {
    nodes
        .iter()
        .map(|node| plan::TypeField {
            type_name: node.type_name.clone(),
            field_names: node.field_names.clone(),
        })
        .collect()
}

fn field_configuration(configuration: &source::FieldConfiguration) -> plan::FieldConfiguration {
    plan::FieldConfiguration {
        type_name: configuration.type_name.clone(),
        field_name: configuration.field_name.clone(),
        arguments: configuration
            .arguments_configuration
            .iter()
            .map(|argument| plan::ArgumentConfiguration {
                name: argument.name.clone(),
                source_type: match argument.source_type {
                    ArgumentSource::FieldArgument => plan::SourceType::FieldArgument,
                    ArgumentSource::ObjectField => plan::SourceType::ObjectField,
                },
            })
            .collect(),
        has_authorization_rule: has_authorization_rule(configuration),
    }
}

fn has_authorization_rule(configuration: &source::FieldConfiguration) -> bool {
    configuration
        .authorization_configuration
        .as_ref()
        .is_some_and(|authorization| {
            authorization.requires_authentication
                || !authorization.required_or_scopes.is_empty()
        })
}
