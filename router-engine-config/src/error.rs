//! Compilation errors.
use displaydoc::Display;
use thiserror::Error;
use tower::BoxError;

use crate::headers::HeaderRuleError;
use crate::plan::InvalidEventType;
use crate::source::MissingInternedString;

/// Error types for [`Loader::compile`](crate::Loader::compile).
///
/// Compilation is deterministic: the same configuration always fails the same way, so none of
/// these are worth retrying.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// could not resolve a planner factory for data source {data_source}: {source}
    ResolveFactory {
        /// The data source being resolved.
        data_source: String,
        /// The error returned by the resolver.
        source: BoxError,
    },

    /// could not load GraphQL schema for data source {data_source}: {source}
    UpstreamSchema {
        data_source: String,
        source: MissingInternedString,
    },

    /// invalid event type "{event_type}" for data source "{data_source}": {source}
    InvalidEventType {
        data_source: String,
        event_type: String,
        source: InvalidEventType,
    },

    /// invalid fetch header {name} for data source {data_source}: {source}
    InvalidFetchHeader {
        data_source: String,
        name: String,
        source: http::Error,
    },

    /// error parsing header rules for data source {data_source}: {source}
    HeaderRules {
        data_source: String,
        source: HeaderRuleError,
    },

    /// unknown data source type "{kind}" for data source {data_source}
    UnknownDataSourceKind { data_source: String, kind: String },
}

impl CompileError {
    /// The data source the error was raised for.
    pub fn data_source(&self) -> &str {
        match self {
            CompileError::ResolveFactory { data_source, .. }
            | CompileError::UpstreamSchema { data_source, .. }
            | CompileError::InvalidEventType { data_source, .. }
            | CompileError::InvalidFetchHeader { data_source, .. }
            | CompileError::HeaderRules { data_source, .. }
            | CompileError::UnknownDataSourceKind { data_source, .. } => data_source,
        }
    }
}
