use std::any::Any;
use std::sync::Arc;

use tracing::Dispatch;

use super::HttpClient;
use super::PlannerFactory;
use crate::source::DataSourceKind;

/// Planner factory for remote GraphQL subgraphs.
#[derive(Debug, Clone)]
pub struct GraphQLFactory {
    http_client: Arc<HttpClient>,
    streaming_client: Arc<HttpClient>,
    logger: Option<Dispatch>,
}

impl GraphQLFactory {
    pub fn new(
        http_client: Arc<HttpClient>,
        streaming_client: Arc<HttpClient>,
        logger: Option<Dispatch>,
    ) -> Self {
        Self {
            http_client,
            streaming_client,
            logger,
        }
    }

    /// Client used for queries and mutations.
    pub fn http_client(&self) -> &Arc<HttpClient> {
        &self.http_client
    }

    /// Client used for subscriptions over server-sent events.
    pub fn streaming_client(&self) -> &Arc<HttpClient> {
        &self.streaming_client
    }

    /// Where planner diagnostics go; nowhere when `None`.
    pub fn logger(&self) -> Option<&Dispatch> {
        self.logger.as_ref()
    }
}

impl PlannerFactory for GraphQLFactory {
    fn kind(&self) -> &str {
        DataSourceKind::Graphql.as_str()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
