use reqwest::Url;

use crate::codec::NodeDocument;
use crate::error::Result;
use crate::jcr::TERSE_RESPONSE_QUERY;
use crate::models::Workspace;

mod descriptor;
mod file;
mod folder;

pub use descriptor::{
    DescriptorNode, discovery_url, item_url, node_types_url, query_plan_url, query_url,
    repository_url, workspace_url,
};
pub(crate) use descriptor::segments_of;
pub use file::{FileNode, file_url};
pub(crate) use file::file_name;
pub use folder::FolderNode;

/// Any addressable location the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    Folder(FolderNode),
    File(FileNode),
    Descriptor(DescriptorNode),
}

impl PathNode {
    pub fn url(&self) -> Result<Url> {
        match self {
            Self::Folder(folder) => folder.url(),
            Self::File(file) => file.url(),
            Self::Descriptor(descriptor) => descriptor.url(),
        }
    }

    /// URL used for create and update calls. File writes ask for a terse response.
    pub fn write_url(&self) -> Result<Url> {
        let mut url = self.url()?;
        if matches!(self, Self::File(_)) {
            url.set_query(Some(TERSE_RESPONSE_QUERY));
        }
        Ok(url)
    }

    /// Desired remote state, without any lazily attached payload.
    #[must_use]
    pub fn document(&self) -> Option<NodeDocument> {
        match self {
            Self::Folder(folder) => Some(folder.document()),
            Self::File(file) => Some(file.document()),
            Self::Descriptor(_) => None,
        }
    }

    /// Request body for a create or update, reading file bytes when this is a file node.
    pub fn content(&self) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Folder(folder) => folder.document().to_bytes().map(Some),
            Self::File(file) => file.content().map(Some),
            Self::Descriptor(_) => Ok(None),
        }
    }

    #[must_use]
    pub fn workspace(&self) -> Option<&Workspace> {
        match self {
            Self::Folder(folder) => Some(folder.workspace()),
            Self::File(file) => Some(file.workspace()),
            Self::Descriptor(DescriptorNode::Workspace(workspace)) => Some(workspace),
            Self::Descriptor(_) => None,
        }
    }

    /// Short label for logs and error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Folder(folder) => format!("folder {}", folder.path()),
            Self::File(file) => format!("file {} in {}", file.name(), file.path()),
            Self::Descriptor(DescriptorNode::Server(server)) => format!("server {server}"),
            Self::Descriptor(DescriptorNode::Repository(repository)) => {
                format!("repository {}", repository.name())
            }
            Self::Descriptor(DescriptorNode::Workspace(workspace)) => {
                format!("workspace {workspace}")
            }
        }
    }
}

impl From<FolderNode> for PathNode {
    fn from(node: FolderNode) -> Self {
        Self::Folder(node)
    }
}

impl From<FileNode> for PathNode {
    fn from(node: FileNode) -> Self {
        Self::File(node)
    }
}

impl From<DescriptorNode> for PathNode {
    fn from(node: DescriptorNode) -> Self {
        Self::Descriptor(node)
    }
}
