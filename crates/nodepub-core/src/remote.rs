use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::error::{NodepubError, Result};
use crate::models::{Server, Workspace};
use crate::node::{FolderNode, PathNode, segments_of};
use crate::transport::{JSON_CONTENT_TYPE, Method, Request, Response, Transport};

/// Existence checks and create/update/delete calls against node URLs.
///
/// Every call re-reads remote state, so an interrupted multi-step operation can simply be run
/// again.
pub(crate) struct Remote<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> Remote<'a, T> {
    pub(crate) const fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub(crate) fn send(&self, server: &Server, request: Request) -> Result<Response> {
        self.transport.send(server, request)
    }

    /// GET on the URL; only 200 counts as existing.
    pub(crate) fn path_exists(&self, server: &Server, url: &Url) -> Result<bool> {
        let resp = self.send(server, Request::get(url.clone()))?;
        let exists = resp.status == StatusCode::OK;
        debug!(%url, status = resp.status.as_u16(), exists, "existence check");
        Ok(exists)
    }

    /// Makes sure every folder from the workspace root down to `folder_path` exists, creating
    /// missing ones parent-first.
    pub(crate) fn ensure_folder_exists(&self, workspace: &Workspace, folder_path: &str) -> Result<()> {
        let segments = segments_of(folder_path)?;
        if segments.is_empty() {
            return Ok(());
        }

        let server = workspace.server();
        let target = FolderNode::new(workspace.clone(), folder_path);
        if self.path_exists(server, &target.url()?)? {
            return Ok(());
        }

        let mut prefix = String::new();
        for segment in segments {
            prefix.push('/');
            prefix.push_str(segment);
            let folder = FolderNode::new(workspace.clone(), prefix.clone());
            if !self.path_exists(server, &folder.url()?)? {
                self.create_node(&PathNode::Folder(folder))?;
            }
        }
        Ok(())
    }

    /// POST expecting 201.
    pub(crate) fn create_node(&self, node: &PathNode) -> Result<()> {
        self.write_node(node, Method::Post, StatusCode::CREATED, "create")
    }

    /// PUT expecting 200.
    pub(crate) fn update_node(&self, node: &PathNode) -> Result<()> {
        self.write_node(node, Method::Put, StatusCode::OK, "update")
    }

    fn write_node(
        &self,
        node: &PathNode,
        method: Method,
        expected: StatusCode,
        operation: &'static str,
    ) -> Result<()> {
        let workspace = node.workspace().ok_or_else(|| NodepubError::RemoteOperation {
            operation,
            status: 0,
            message: format!("{} cannot be written", node.describe()),
        })?;
        let body = node.content()?.unwrap_or_default();
        let url = node.write_url()?;
        debug!(%url, %method, node = %node.describe(), "writing node");

        let request = Request::new(method, url).with_body(JSON_CONTENT_TYPE, body);
        let resp = self.send(workspace.server(), request)?;
        if resp.status != expected {
            warn!(
                status = resp.status.as_u16(),
                node = %node.describe(),
                operation,
                "unexpected status writing node"
            );
            return Err(NodepubError::RemoteOperation {
                operation,
                status: resp.status.as_u16(),
                message: format!(
                    "could not {operation} {} in workspace {}: {}",
                    node.describe(),
                    workspace,
                    resp.body.trim()
                ),
            });
        }
        Ok(())
    }

    /// DELETE on the URL; success is 204, which the caller checks.
    pub(crate) fn delete(&self, server: &Server, url: &Url) -> Result<StatusCode> {
        let resp = self.send(server, Request::delete(url.clone()))?;
        debug!(%url, status = resp.status.as_u16(), "delete");
        Ok(resp.status)
    }
}
