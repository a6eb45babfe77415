use std::path::Path;

use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use crate::codec::decode_file_contents;
use crate::error::{NodepubError, Result};
use crate::jcr::CONTENT_PROPERTY;
use crate::models::{Status, Workspace};
use crate::node::{FileNode, FolderNode, PathNode, file_name, file_url, item_url};
use crate::transport::{Request, Transport};

use super::RestClient;

impl<T: Transport> RestClient<T> {
    /// Remote URL the local `file` would be published to under the folder at `path`.
    pub fn file_url(&self, file: &Path, path: &str, workspace: &Workspace) -> Result<Url> {
        if file.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is a directory, not a file", file.display()),
            )
            .into());
        }
        file_url(workspace, path, &file_name(file)?)
    }

    pub fn file_exists(&self, file: &Path, workspace: &Workspace, path: &str) -> Result<bool> {
        let url = self.file_url(file, path, workspace)?;
        self.remote().path_exists(workspace.server(), &url)
    }

    /// Publishes `file` into the folder at `path`, creating missing folders first.
    ///
    /// Running it again for an already published file updates the node in place.
    pub fn publish(&self, workspace: &Workspace, path: &str, file: &Path) -> Status {
        self.publish_versioned(workspace, path, file, false)
    }

    /// Like [`RestClient::publish`], adding `mix:versionable` to the file node when asked.
    pub fn publish_versioned(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
        use_versioning: bool,
    ) -> Status {
        match self.try_publish(workspace, path, file, use_versioning) {
            Ok(()) => {
                info!(file = %file.display(), path, workspace = %workspace, "published");
                Status::ok()
            }
            Err(err) => {
                info!(file = %file.display(), path, error = %err, "publish failed");
                Status::error(
                    format!(
                        "failed to publish {} to {path} in workspace {workspace}",
                        file.display()
                    ),
                    err,
                )
            }
        }
    }

    fn try_publish(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
        use_versioning: bool,
    ) -> Result<()> {
        let remote = self.remote();
        let node = FileNode::new(workspace.clone(), path, file, use_versioning)?;
        if remote.path_exists(workspace.server(), &node.url()?)? {
            debug!(file = node.name(), "already published, updating");
            return remote.update_node(&PathNode::File(node));
        }
        remote.ensure_folder_exists(workspace, path)?;
        remote.create_node(&PathNode::File(node))
    }

    /// Deletes the published copy of `file` from the folder at `path`.
    ///
    /// Only the file name is used, so the local file may already be gone.
    pub fn unpublish(&self, workspace: &Workspace, path: &str, file: &Path) -> Status {
        match self.try_unpublish(workspace, path, file) {
            Ok(status) => status,
            Err(err) => {
                info!(file = %file.display(), path, error = %err, "unpublish failed");
                Status::error(
                    format!(
                        "failed to unpublish {} from {path} in workspace {workspace}",
                        file.display()
                    ),
                    err,
                )
            }
        }
    }

    fn try_unpublish(&self, workspace: &Workspace, path: &str, file: &Path) -> Result<Status> {
        let remote = self.remote();
        let server = workspace.server();
        let url = file_url(workspace, path, &file_name(file)?)?;
        let status = remote.delete(server, &url)?;
        if status == StatusCode::NO_CONTENT {
            info!(%url, "unpublished");
            return Ok(Status::ok());
        }
        if !remote.path_exists(server, &url)? {
            info!(%url, "unpublish skipped, nothing was published");
            return Ok(Status::info(format!(
                "{} was never published to {path} in workspace {workspace}",
                file.display()
            )));
        }
        Err(NodepubError::RemoteOperation {
            operation: "unpublish",
            status: status.as_u16(),
            message: format!("{url} still exists after delete"),
        })
    }

    /// Marks the folder at `path` as a publish area, creating it and its parents if needed.
    pub fn mark_as_publish_area(
        &self,
        workspace: &Workspace,
        path: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Status {
        let result = self.try_mark(workspace, path, title, description);
        match result {
            Ok(()) => {
                info!(path, workspace = %workspace, "marked as publish area");
                Status::ok()
            }
            Err(err) => Status::error(
                format!("failed to mark {path} in workspace {workspace} as a publish area"),
                err,
            ),
        }
    }

    /// Removes the publish-area marker. A folder that does not exist is left alone.
    pub fn unmark_as_publish_area(&self, workspace: &Workspace, path: &str) -> Status {
        let result = self.try_unmark(workspace, path);
        match result {
            Ok(()) => {
                info!(path, workspace = %workspace, "publish area marker removed");
                Status::ok()
            }
            Err(err) => Status::error(
                format!("failed to unmark {path} in workspace {workspace} as a publish area"),
                err,
            ),
        }
    }

    fn try_mark(
        &self,
        workspace: &Workspace,
        path: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let remote = self.remote();
        let path = trim_trailing_slash(path);
        remote.ensure_folder_exists(workspace, parent_of(path))?;
        let folder =
            FolderNode::new(workspace.clone(), path).marked_as_publish_area(title, description);
        if remote.path_exists(workspace.server(), &folder.url()?)? {
            remote.update_node(&PathNode::Folder(folder))
        } else {
            remote.create_node(&PathNode::Folder(folder))
        }
    }

    fn try_unmark(&self, workspace: &Workspace, path: &str) -> Result<()> {
        let remote = self.remote();
        let folder = FolderNode::new(workspace.clone(), trim_trailing_slash(path))
            .unmarked_as_publish_area();
        if !remote.path_exists(workspace.server(), &folder.url()?)? {
            debug!(path, "no folder to unmark");
            return Ok(());
        }
        remote.update_node(&PathNode::Folder(folder))
    }

    /// Published bytes of `file`, or `None` when the server has no such content.
    pub fn get_file_contents(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
    ) -> Result<Option<Vec<u8>>> {
        let name = file_name(file)?;
        let url = item_url(workspace, path, &[name.as_str(), CONTENT_PROPERTY])?;
        let resp = self.remote().send(workspace.server(), Request::get(url))?;
        if resp.status != StatusCode::OK {
            debug!(status = resp.status.as_u16(), file = %name, "no published contents");
            return Ok(None);
        }
        decode_file_contents(&resp.body).map(Some)
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_strips_last_segment() {
        assert_eq!(parent_of("/a/b/c"), "/a/b");
        assert_eq!(parent_of("/a"), "/");
        assert_eq!(parent_of("a"), "/");
    }

    #[test]
    fn trailing_slashes_are_trimmed_but_root_survives() {
        assert_eq!(trim_trailing_slash("/site/"), "/site");
        assert_eq!(trim_trailing_slash("/site//"), "/site");
        assert_eq!(trim_trailing_slash("/"), "/");
    }
}
