// Public fallible APIs in this crate share one concrete error contract (`NodepubError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod jcr;
pub mod mime;
pub mod models;
pub mod node;
pub mod query;
pub(crate) mod remote;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::RestClient;
pub use config::ClientConfig;
pub use error::{ErrorPayload, NodepubError, Result};
pub use models::{
    ChildNodeDefinition, ColumnTypes, NodeType, PropertyDefinition, ProtocolVersion, QueryRow,
    QueryValue, Repository, Server, Severity, Status, Workspace,
};
pub use query::{QueryLanguage, QueryOptions};
pub use transport::{HttpTransport, Method, Request, Response, Transport};
