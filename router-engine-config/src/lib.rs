//! Compiles a composed router configuration into the plan configuration of the execution engine.
//!
//! The [`Loader`] turns the engine section of a [`RouterConfig`](source::RouterConfig) into a
//! [`PlanConfiguration`](plan::PlanConfiguration): every data source is paired with the
//! [`PlannerFactory`](factory::PlannerFactory) able to plan it, string variables are resolved and
//! the client headers forwarded to each subscription endpoint are computed from the router's
//! [`HeaderRules`](configuration::HeaderRules).

#![warn(unreachable_pub)]

pub mod configuration;
mod error;
pub mod factory;
pub mod headers;
mod loader;
pub mod plan;
pub mod source;
pub mod subscription;
pub mod variables;

pub use error::CompileError;
pub use loader::Loader;
