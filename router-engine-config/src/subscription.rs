//! Subscription transport selection for GraphQL data sources.

use crate::source::GraphQLSubscriptionProtocol;

/// How the engine opens subscriptions against a subgraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionTransport {
    /// Server-sent events instead of websockets.
    pub use_sse: bool,
    /// Open the event stream with a POST request.
    pub sse_method_post: bool,
}

/// Select the subscription transport.
///
/// `protocol` always wins. The legacy `use_sse` flag is only read for configurations composed
/// before the protocol was introduced, even when both are present and disagree.
pub fn select_transport(
    protocol: Option<GraphQLSubscriptionProtocol>,
    use_sse: Option<bool>,
) -> SubscriptionTransport {
    match protocol {
        Some(GraphQLSubscriptionProtocol::Ws) => SubscriptionTransport {
            use_sse: false,
            sse_method_post: false,
        },
        Some(GraphQLSubscriptionProtocol::Sse) => SubscriptionTransport {
            use_sse: true,
            sse_method_post: false,
        },
        Some(GraphQLSubscriptionProtocol::SsePost) => SubscriptionTransport {
            use_sse: true,
            sse_method_post: true,
        },
        None => SubscriptionTransport {
            use_sse: use_sse.unwrap_or_default(),
            sse_method_post: false,
        },
    }
}
