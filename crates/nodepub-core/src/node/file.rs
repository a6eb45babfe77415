use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::codec::{NodeDocument, encode_binary, format_timestamp};
use crate::error::Result;
use crate::jcr::{
    CONTENT_PROPERTY, DATA_PROPERTY, FILE_NODE_TYPE, LAST_MODIFIED_PROPERTY, MIME_TYPE_PROPERTY,
    RESOURCE_NODE_TYPE, VERSIONABLE_NODE_TYPE,
};
use crate::mime::infer_mime;
use crate::models::Workspace;
use crate::node::descriptor::item_url;

/// A local file published as an `nt:file` node under the folder at `path`.
///
/// Construction reads file metadata only. The bytes are read when [`FileNode::content`] is
/// called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    workspace: Workspace,
    path: String,
    file: PathBuf,
    name: String,
    versionable: bool,
    mime_type: &'static str,
    last_modified: DateTime<Utc>,
}

impl FileNode {
    pub fn new(
        workspace: Workspace,
        path: impl Into<String>,
        file: impl Into<PathBuf>,
        versionable: bool,
    ) -> Result<Self> {
        let file = file.into();
        let metadata = fs::metadata(&file)?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory, not a file", file.display()),
            )
            .into());
        }
        let name = file_name(&file)?;
        let last_modified = DateTime::<Utc>::from(metadata.modified()?);

        Ok(Self {
            workspace,
            path: path.into(),
            mime_type: infer_mime(&name),
            name,
            file,
            versionable,
            last_modified,
        })
    }

    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Path of the containing folder in the workspace.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub const fn is_versionable(&self) -> bool {
        self.versionable
    }

    pub fn url(&self) -> Result<Url> {
        file_url(&self.workspace, &self.path, &self.name)
    }

    /// URL of the embedded `jcr:content` child holding the bytes.
    pub fn contents_url(&self) -> Result<Url> {
        item_url(&self.workspace, &self.path, &[self.name.as_str(), CONTENT_PROPERTY])
    }

    /// Node document without the binary payload.
    #[must_use]
    pub fn document(&self) -> NodeDocument {
        let content = NodeDocument::new(RESOURCE_NODE_TYPE)
            .with_property(MIME_TYPE_PROPERTY, self.mime_type)
            .with_property(LAST_MODIFIED_PROPERTY, format_timestamp(self.last_modified));
        let doc = NodeDocument::new(FILE_NODE_TYPE).with_child(CONTENT_PROPERTY, content);
        if self.versionable {
            doc.with_mixin(VERSIONABLE_NODE_TYPE)
        } else {
            doc
        }
    }

    /// Serialized node document including the base64 file bytes.
    pub fn content(&self) -> Result<Vec<u8>> {
        let mut doc = self.document();
        self.materialize_content(&mut doc)?;
        doc.to_bytes()
    }

    fn materialize_content(&self, doc: &mut NodeDocument) -> Result<()> {
        let bytes = fs::read(&self.file)?;
        if let Some(content) = doc.children.get_mut(CONTENT_PROPERTY) {
            content
                .properties
                .insert(DATA_PROPERTY.to_string(), encode_binary(&bytes).into());
        }
        Ok(())
    }
}

/// Remote URL of a file named `name` inside the folder at `path`.
pub fn file_url(workspace: &Workspace, path: &str, name: &str) -> Result<Url> {
    item_url(workspace, path, &[name])
}

pub(crate) fn file_name(file: &Path) -> Result<String> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no usable file name", file.display()),
            )
            .into()
        })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tempfile::tempdir;

    use super::*;
    use crate::codec::decode_binary;
    use crate::error::NodepubError;
    use crate::models::{Repository, Server};

    fn workspace() -> Workspace {
        let server = Server::new("http://localhost:8080/resources", "admin", "admin");
        Workspace::new("default", Repository::new("repo", server))
    }

    #[test]
    fn url_appends_encoded_file_name_to_folder_path() {
        let temp = tempdir().expect("tempdir");
        let src = temp.path().join("release notes.md");
        fs::write(&src, "# notes").expect("write");

        let node = FileNode::new(workspace(), "/docs/2024", &src, false).expect("node");
        assert_eq!(
            node.url().expect("url").as_str(),
            "http://localhost:8080/resources/repo/default/items/docs/2024/release%20notes.md"
        );
        assert_eq!(
            node.contents_url().expect("url").as_str(),
            "http://localhost:8080/resources/repo/default/items/docs/2024/release%20notes.md/jcr:content"
        );
    }

    #[test]
    fn document_has_metadata_but_no_data_until_content_is_requested() {
        let temp = tempdir().expect("tempdir");
        let src = temp.path().join("data.json");
        fs::write(&src, "{}").expect("write");

        let node = FileNode::new(workspace(), "/docs", &src, true).expect("node");
        let first = node.document().to_json();
        let second = node.document().to_json();
        assert_eq!(first, second);

        let props = &first["properties"];
        assert_eq!(props["jcr:primaryType"], "nt:file");
        assert_eq!(props["jcr:mixinTypes"], serde_json::json!(["mix:versionable"]));
        let content = &first["children"]["jcr:content"]["properties"];
        assert_eq!(content["jcr:primaryType"], "nt:resource");
        assert_eq!(content["jcr:mimeType"], "application/json");
        let modified = content["jcr:lastModified"].as_str().expect("timestamp");
        assert!(modified.ends_with('Z'));
        assert_eq!(modified.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(content.get("jcr:data").is_none());
    }

    #[test]
    fn content_round_trips_payload_bytes() {
        let temp = tempdir().expect("tempdir");
        let src = temp.path().join("blob.bin");
        let payload = vec![0_u8, 1, 2, 254, 255, b'\n'];
        fs::write(&src, &payload).expect("write");

        let node = FileNode::new(workspace(), "/bin", &src, false).expect("node");
        let body: Value = serde_json::from_slice(&node.content().expect("content")).expect("json");
        let encoded = body["children"]["jcr:content"]["properties"]["jcr:data"]
            .as_str()
            .expect("data");
        assert_eq!(decode_binary(encoded).expect("decode"), payload);
        assert!(node.document().to_json()["children"]["jcr:content"]["properties"]
            .get("jcr:data")
            .is_none());
    }

    #[test]
    fn missing_file_fails_at_construction() {
        let temp = tempdir().expect("tempdir");
        let err = FileNode::new(workspace(), "/docs", temp.path().join("absent.txt"), false)
            .expect_err("must fail");
        assert!(matches!(err, NodepubError::Io(_)));
    }

    #[test]
    fn directory_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let err = FileNode::new(workspace(), "/docs", temp.path(), false).expect_err("must fail");
        assert!(matches!(err, NodepubError::Io(ref inner) if inner.kind() == io::ErrorKind::InvalidInput));
    }

    #[test]
    fn unreadable_content_fails_at_read_time() {
        let temp = tempdir().expect("tempdir");
        let src = temp.path().join("gone.txt");
        fs::write(&src, "soon gone").expect("write");
        let node = FileNode::new(workspace(), "/docs", &src, false).expect("node");
        fs::remove_file(&src).expect("remove");

        assert!(node.url().is_ok());
        assert!(matches!(node.content(), Err(NodepubError::Io(_))));
    }
}
