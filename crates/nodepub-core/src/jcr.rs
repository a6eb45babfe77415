//! Node type, property and wire key names understood by the repository server.

pub const PROPERTIES_KEY: &str = "properties";
pub const CHILDREN_KEY: &str = "children";

pub const PRIMARY_TYPE_PROPERTY: &str = "jcr:primaryType";
pub const MIXIN_TYPES_PROPERTY: &str = "jcr:mixinTypes";
pub const CONTENT_PROPERTY: &str = "jcr:content";
pub const DATA_PROPERTY: &str = "jcr:data";
pub const LAST_MODIFIED_PROPERTY: &str = "jcr:lastModified";
pub const MIME_TYPE_PROPERTY: &str = "jcr:mimeType";
pub const TITLE_PROPERTY: &str = "jcr:title";
pub const DESCRIPTION_PROPERTY: &str = "jcr:description";

pub const FOLDER_NODE_TYPE: &str = "nt:folder";
pub const FILE_NODE_TYPE: &str = "nt:file";
pub const RESOURCE_NODE_TYPE: &str = "nt:resource";
pub const VERSIONABLE_NODE_TYPE: &str = "mix:versionable";
pub const PUBLISH_AREA_NODE_TYPE: &str = "mode:publishArea";

/// Query parameter asking the server not to echo the created node back.
pub const TERSE_RESPONSE_QUERY: &str = "mode:includeNode=false";
