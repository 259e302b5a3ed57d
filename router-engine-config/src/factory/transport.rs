use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use tower::BoxError;
use url::Url;

/// Sends a single HTTP request to a subgraph.
pub trait Transport: fmt::Debug + Send + Sync {
    fn round_trip(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'static, Result<http::Response<Bytes>, BoxError>>;
}

/// Wraps the router's base transport with its request pipeline.
pub trait TransportFactory: Send + Sync {
    /// Decorate `transport`, coalescing identical in-flight requests when
    /// `enable_single_flight` is set.
    fn round_tripper(
        &self,
        enable_single_flight: bool,
        transport: Arc<dyn Transport>,
    ) -> Arc<dyn Transport>;

    fn default_transport_timeout(&self) -> Duration;

    fn default_http_proxy_url(&self) -> Option<Url>;
}

/// Publishes and subscribes to broker topics for publish/subscribe data sources.
pub trait PubSubConnector: fmt::Debug + Send + Sync {
    fn publish(&self, topic: &str, data: Bytes) -> BoxFuture<'static, Result<(), BoxError>>;

    fn subscribe(
        &self,
        topic: &str,
    ) -> BoxFuture<'static, Result<BoxStream<'static, Bytes>, BoxError>>;
}

/// A transport together with its request timeout.
///
/// Shared by every planner factory created from the same resolver.
#[derive(Debug, Clone)]
pub struct HttpClient {
    timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(timeout: Option<Duration>, transport: Arc<dyn Transport>) -> Self {
        Self { timeout, transport }
    }

    /// `None` for streaming clients, which must not time out mid stream.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}
