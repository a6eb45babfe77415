use reqwest::Url;

use crate::error::{NodepubError, Result};
use crate::models::{Repository, Server, Workspace};

const ITEMS_SEGMENT: &str = "items";
const QUERY_SEGMENT: &str = "query";
const QUERY_PLAN_SEGMENT: &str = "queryPlan";
const NODE_TYPES_PATH: [&str; 2] = ["jcr:system", "jcr:nodeTypes"];
const NODE_TYPES_QUERY: &str = "depth=-1";

/// Discovery endpoints: the server root, a repository, or a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorNode {
    Server(Server),
    Repository(Repository),
    Workspace(Workspace),
}

impl DescriptorNode {
    pub fn url(&self) -> Result<Url> {
        match self {
            Self::Server(server) => discovery_url(server),
            Self::Repository(repository) => repository_url(repository),
            Self::Workspace(workspace) => workspace_url(workspace),
        }
    }
}

/// Appends each segment to `base`, percent-encoding segments individually.
pub(crate) fn join_segments<'a>(
    base: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|err| NodepubError::InvalidUrl(format!("{base}: {err}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| NodepubError::InvalidUrl(format!("{base}: cannot be a base url")))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

pub(crate) fn segments_of(path: &str) -> Result<Vec<&str>> {
    let mut out = Vec::new();
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(NodepubError::InvalidUrl(format!(
                "path traversal is not allowed: {path}"
            )));
        }
        out.push(segment);
    }
    Ok(out)
}

pub fn discovery_url(server: &Server) -> Result<Url> {
    join_segments(server.base_url(), [""])
}

pub fn repository_url(repository: &Repository) -> Result<Url> {
    join_segments(repository.server().base_url(), [repository.name()])
}

pub fn workspace_url(workspace: &Workspace) -> Result<Url> {
    join_segments(
        workspace.server().base_url(),
        [workspace.repository().name(), workspace.name()],
    )
}

/// URL of the node at `path` (plus optional trailing segments) inside the workspace.
pub fn item_url<'a>(
    workspace: &'a Workspace,
    path: &'a str,
    trailing: &[&'a str],
) -> Result<Url> {
    let segments = [
        workspace.repository().name(),
        workspace.name(),
        ITEMS_SEGMENT,
    ]
    .into_iter()
    .chain(segments_of(path)?)
    .chain(trailing.iter().copied());
    join_segments(workspace.server().base_url(), segments)
}

pub fn query_url(workspace: &Workspace) -> Result<Url> {
    join_segments(
        workspace.server().base_url(),
        [workspace.repository().name(), workspace.name(), QUERY_SEGMENT],
    )
}

pub fn query_plan_url(workspace: &Workspace) -> Result<Url> {
    join_segments(
        workspace.server().base_url(),
        [
            workspace.repository().name(),
            workspace.name(),
            QUERY_PLAN_SEGMENT,
        ],
    )
}

pub fn node_types_url(workspace: &Workspace) -> Result<Url> {
    let mut url = item_url(workspace, "", &NODE_TYPES_PATH)?;
    url.set_query(Some(NODE_TYPES_QUERY));
    Ok(url)
}
