//! Planner factories and the resolvers that pick them.
//!
//! The [`Loader`](crate::Loader) asks its [`FactoryResolver`]s, in order, for the
//! [`PlannerFactory`] of every data source. The first resolver returning a factory wins;
//! `Ok(None)` passes the data source on to the next resolver. Registering a resolver ahead of
//! [`DefaultFactoryResolver`] is how callers override or extend the built in kinds.

mod default;
mod graphql;
mod pubsub;
mod static_data;
mod transport;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tower::BoxError;

#[cfg(test)]
pub(crate) use self::default::tests::resolver as test_resolver;
pub use self::default::DefaultFactoryResolver;
pub use self::default::InvalidDataSourceKind;
pub use self::graphql::GraphQLFactory;
pub use self::pubsub::PubSubFactory;
pub use self::static_data::StaticFactory;
pub use self::transport::HttpClient;
pub use self::transport::PubSubConnector;
pub use self::transport::Transport;
pub use self::transport::TransportFactory;
use crate::source::DataSourceConfiguration;

/// Builds fetch plans for the fields served by one kind of data source.
///
/// Planning itself belongs to the execution engine; the factory carries whatever shared
/// resources (HTTP clients, broker connections) the engine's planners need.
pub trait PlannerFactory: fmt::Debug + Send + Sync + 'static {
    /// The data source kind this factory plans for, e.g. `GRAPHQL`.
    fn kind(&self) -> &str;

    /// Allows the engine to recover the concrete factory.
    fn as_any(&self) -> &dyn Any;
}

/// Picks the planner factory of a data source.
#[cfg_attr(test, automock)]
pub trait FactoryResolver: Send + Sync {
    /// `Ok(None)` when this resolver does not handle the data source.
    ///
    /// An error aborts the compilation, even if a later resolver would have matched.
    fn resolve(
        &self,
        data_source: &DataSourceConfiguration,
    ) -> Result<Option<Arc<dyn PlannerFactory>>, BoxError>;
}
