use reqwest::Url;

use crate::codec::NodeDocument;
use crate::error::Result;
use crate::jcr::{DESCRIPTION_PROPERTY, FOLDER_NODE_TYPE, PUBLISH_AREA_NODE_TYPE, TITLE_PROPERTY};
use crate::models::Workspace;
use crate::node::descriptor::item_url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PublishArea {
    Untouched,
    Marked {
        title: Option<String>,
        description: Option<String>,
    },
    Unmarked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    workspace: Workspace,
    path: String,
    publish_area: PublishArea,
}

impl FolderNode {
    pub fn new(workspace: Workspace, path: impl Into<String>) -> Self {
        Self {
            workspace,
            path: path.into(),
            publish_area: PublishArea::Untouched,
        }
    }

    /// Adds the publish-area mixin; blank title/description are left out.
    #[must_use]
    pub fn marked_as_publish_area(mut self, title: Option<&str>, description: Option<&str>) -> Self {
        let keep = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string)
        };
        self.publish_area = PublishArea::Marked {
            title: keep(title),
            description: keep(description),
        };
        self
    }

    /// Clears the publish-area mixin on the next update.
    #[must_use]
    pub fn unmarked_as_publish_area(mut self) -> Self {
        self.publish_area = PublishArea::Unmarked;
        self
    }

    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> Result<Url> {
        item_url(&self.workspace, &self.path, &[])
    }

    #[must_use]
    pub fn document(&self) -> NodeDocument {
        let doc = NodeDocument::new(FOLDER_NODE_TYPE);
        match &self.publish_area {
            PublishArea::Untouched => doc,
            PublishArea::Marked { title, description } => {
                let mut doc = doc.with_mixin(PUBLISH_AREA_NODE_TYPE);
                if let Some(title) = title {
                    doc = doc.with_property(TITLE_PROPERTY, title.as_str());
                }
                if let Some(description) = description {
                    doc = doc.with_property(DESCRIPTION_PROPERTY, description.as_str());
                }
                doc
            }
            PublishArea::Unmarked => NodeDocument {
                mixins: Some(Vec::new()),
                ..doc
            },
        }
    }
}
