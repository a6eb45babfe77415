use std::collections::BTreeMap;

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::codec::{decode_node_types, decode_repositories, decode_workspaces, determine_version};
use crate::error::{NodepubError, Result};
use crate::models::{NodeType, ProtocolVersion, Repository, Server, Workspace};
use crate::node::{DescriptorNode, node_types_url};
use crate::transport::{Request, Transport};

use super::RestClient;

const LEGACY_API_SEGMENT: &str = "v1";
const DEFAULT_WORKSPACE: &str = "default";
const SYSTEM_WORKSPACE: &str = "system";

impl<T: Transport> RestClient<T> {
    /// Checks that the server answers discovery and settles the base URL for later calls.
    ///
    /// Servers speaking protocol v2 expose publishing only under the `v1` sub-path, so the
    /// returned server points there. Discovery always goes to the URL the caller supplied, so
    /// validating an already validated server gives the same result.
    pub fn validate(&self, server: &Server) -> Result<Server> {
        let server = server.unvalidated();
        let url = DescriptorNode::Server(server.clone()).url()?;
        let resp = self
            .remote()
            .send(&server, Request::get(url))
            .map_err(|err| {
                warn!(server = %server, error = %err, "server unreachable");
                NodepubError::Validation {
                    server: server.url().to_string(),
                    message: format!("server is unreachable: {err}"),
                }
            })?;
        if resp.status != StatusCode::OK {
            warn!(server = %server, status = resp.status.as_u16(), "validation failed");
            return Err(NodepubError::Validation {
                server: server.url().to_string(),
                message: format!("discovery returned status {}", resp.status.as_u16()),
            });
        }

        let version = determine_version(&resp.body)?;
        let validated = match version {
            ProtocolVersion::V1 => server.as_validated(server.url(), version),
            ProtocolVersion::V2 => {
                let original = server.url().trim_end_matches('/');
                server.as_validated(format!("{original}/{LEGACY_API_SEGMENT}"), version)
            }
        };
        info!(
            server = %server,
            protocol = %version,
            base_url = validated.base_url(),
            "server validated"
        );
        Ok(validated)
    }

    pub fn get_repositories(&self, server: &Server) -> Result<Vec<Repository>> {
        let url = DescriptorNode::Server(server.clone()).url()?;
        let resp = self.remote().send(server, Request::get(url))?;
        if resp.status != StatusCode::OK {
            return Err(NodepubError::RemoteOperation {
                operation: "get_repositories",
                status: resp.status.as_u16(),
                message: format!("could not list repositories on {server}"),
            });
        }
        decode_repositories(server, &resp.body)
    }

    pub fn get_workspaces(&self, repository: &Repository) -> Result<Vec<Workspace>> {
        let server = repository.server();
        let url = DescriptorNode::Repository(repository.clone()).url()?;
        let resp = self.remote().send(server, Request::get(url))?;
        if resp.status != StatusCode::OK {
            return Err(NodepubError::RemoteOperation {
                operation: "get_workspaces",
                status: resp.status.as_u16(),
                message: format!(
                    "could not list workspaces of repository {} on {server}",
                    repository.name()
                ),
            });
        }
        decode_workspaces(repository, &resp.body)
    }

    /// Node types registered in the repository, keyed by name.
    pub fn get_node_types(&self, repository: &Repository) -> Result<BTreeMap<String, NodeType>> {
        let workspaces = self.get_workspaces(repository)?;
        let workspace = pick_node_type_workspace(&workspaces).ok_or_else(|| {
            NodepubError::Validation {
                server: repository.server().url().to_string(),
                message: format!("repository {} has no workspaces", repository.name()),
            }
        })?;
        debug!(workspace = %workspace, "reading node types");

        let url = node_types_url(workspace)?;
        let resp = self.remote().send(workspace.server(), Request::get(url.clone()))?;
        if resp.status != StatusCode::OK {
            return Err(NodepubError::RemoteOperation {
                operation: "get_node_types",
                status: resp.status.as_u16(),
                message: format!("could not read node types from {url}"),
            });
        }
        decode_node_types(&resp.body)
    }
}

/// Prefers `default`, then any non-system workspace, then `system`.
fn pick_node_type_workspace(workspaces: &[Workspace]) -> Option<&Workspace> {
    workspaces
        .iter()
        .find(|ws| ws.name().eq_ignore_ascii_case(DEFAULT_WORKSPACE))
        .or_else(|| {
            workspaces
                .iter()
                .find(|ws| !ws.name().eq_ignore_ascii_case(SYSTEM_WORKSPACE))
        })
        .or_else(|| workspaces.first())
}
