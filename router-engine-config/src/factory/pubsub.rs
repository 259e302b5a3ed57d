use std::any::Any;
use std::sync::Arc;

use super::PlannerFactory;
use super::PubSubConnector;
use crate::source::DataSourceKind;

/// Planner factory for publish/subscribe data sources.
#[derive(Debug, Clone)]
pub struct PubSubFactory {
    connector: Arc<dyn PubSubConnector>,
}

impl PubSubFactory {
    pub fn new(connector: Arc<dyn PubSubConnector>) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &Arc<dyn PubSubConnector> {
        &self.connector
    }
}

impl PlannerFactory for PubSubFactory {
    fn kind(&self) -> &str {
        DataSourceKind::PubSub.as_str()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
