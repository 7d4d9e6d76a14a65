//! `linkup-nodes` crate — the `ExecutableNode` trait, the field schema model,
//! and the Linkup web-search node with its `linkupApi` credential.
//!
//! The host owns scheduling, parameter resolution and credential storage.
//! It reaches this crate through [`ExecutableNode`] and supplies outbound
//! HTTP through [`HttpHelpers`]; [`client::ReqwestHelpers`] is a ready-made
//! helper for hosts without their own.

pub mod client;
pub mod credentials;
pub mod description;
pub mod error;
pub mod http;
pub mod linkup;
pub mod mock;
pub mod registry;
pub mod router;
pub mod schema;
pub mod traits;

pub use error::{HttpError, NodeError, SchemaError};
pub use traits::{ExecutableNode, ExecutionContext, HttpHelpers};

#[cfg(test)]
mod linkup_tests;
#[cfg(test)]
mod client_tests;
