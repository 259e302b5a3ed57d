use std::sync::Arc;

use displaydoc::Display;
use thiserror::Error;
use tower::BoxError;
use tracing::Dispatch;

use super::FactoryResolver;
use super::GraphQLFactory;
use super::HttpClient;
use super::PlannerFactory;
use super::PubSubConnector;
use super::PubSubFactory;
use super::StaticFactory;
use super::Transport;
use super::TransportFactory;
use crate::source::DataSourceConfiguration;
use crate::source::DataSourceCustom;

/// invalid datasource kind "{0}"
#[derive(Debug, Clone, Display, Error, PartialEq, Eq)]
pub struct InvalidDataSourceKind(pub String);

/// Resolves the built in data source kinds.
///
/// Meant to be the last resolver of a [`Loader`](crate::Loader): every kind it does not know is
/// an error rather than a pass.
#[derive(Debug)]
pub struct DefaultFactoryResolver {
    graphql: GraphQLFactory,
    static_data: Arc<StaticFactory>,
    pubsub: Arc<PubSubFactory>,
}

impl DefaultFactoryResolver {
    /// Create the shared HTTP clients and factories of a router instance.
    ///
    /// The clients are built once from `transport_factory` and shared by every graphql factory
    /// this resolver hands out. `logger` receives planner diagnostics.
    pub fn new(
        transport_factory: &dyn TransportFactory,
        base_transport: Arc<dyn Transport>,
        connector: Arc<dyn PubSubConnector>,
        enable_single_flight: bool,
        logger: Option<Dispatch>,
    ) -> Self {
        let http_client = HttpClient::new(
            Some(transport_factory.default_transport_timeout()),
            transport_factory.round_tripper(enable_single_flight, base_transport.clone()),
        );
        let streaming_client = HttpClient::new(
            None,
            transport_factory.round_tripper(enable_single_flight, base_transport),
        );
        if let Some(proxy) = transport_factory.default_http_proxy_url() {
            tracing::debug!(proxy = %proxy, "subgraph requests use an HTTP proxy");
        }

        Self {
            graphql: GraphQLFactory::new(
                Arc::new(http_client),
                Arc::new(streaming_client),
                logger,
            ),
            static_data: Arc::new(StaticFactory),
            pubsub: Arc::new(PubSubFactory::new(connector)),
        }
    }
}

impl FactoryResolver for DefaultFactoryResolver {
    fn resolve(
        &self,
        data_source: &DataSourceConfiguration,
    ) -> Result<Option<Arc<dyn PlannerFactory>>, BoxError> {
        let factory: Arc<dyn PlannerFactory> = match &data_source.custom {
            // a new factory per data source, sharing the clients
            DataSourceCustom::Graphql { .. } => Arc::new(self.graphql.clone()),
            DataSourceCustom::Static { .. } => self.static_data.clone(),
            DataSourceCustom::PubSub { .. } => self.pubsub.clone(),
            DataSourceCustom::Other { kind } => {
                return Err(InvalidDataSourceKind(kind.clone()).into());
            }
        };
        Ok(Some(factory))
    }
}
