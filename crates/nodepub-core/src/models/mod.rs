mod node_type;
mod query;
mod server;
mod status;

pub use node_type::{ChildNodeDefinition, NodeType, PropertyDefinition};
pub use query::{ColumnTypes, QueryRow, QueryValue};
pub use server::{ProtocolVersion, Repository, Server, Workspace};
pub use status::{Severity, Status};
