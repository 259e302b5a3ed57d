use std::any::Any;

use super::PlannerFactory;
use crate::source::DataSourceKind;

/// Planner factory for data sources answering with a fixed payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFactory;

impl PlannerFactory for StaticFactory {
    fn kind(&self) -> &str {
        DataSourceKind::Static.as_str()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
