use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::error::{NodepubError, Result};
use crate::jcr::{
    CHILDREN_KEY, DATA_PROPERTY, MIXIN_TYPES_PROPERTY, PRIMARY_TYPE_PROPERTY, PROPERTIES_KEY,
};
use crate::models::{
    ChildNodeDefinition, NodeType, PropertyDefinition, ProtocolVersion, QueryRow, QueryValue,
    Repository, Server, Workspace,
};

pub const REPOSITORIES_KEY: &str = "repositories";
pub const WORKSPACES_KEY: &str = "workspaces";
const NAME_KEY: &str = "name";
const TYPES_KEY: &str = "types";
const ROWS_KEY: &str = "rows";

/// Column-name suffixes marking a base64-encoded binary cell in a query row.
pub const BINARY_SUFFIXES: [&str; 2] = ["/base64/", "_base64"];

/// Desired remote state of one node: primary type, mixins, properties and embedded children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeDocument {
    pub primary_type: String,
    /// `None` leaves the server's mixins untouched; `Some(vec![])` clears them.
    pub mixins: Option<Vec<String>>,
    pub properties: Map<String, Value>,
    pub children: BTreeMap<String, NodeDocument>,
}

impl NodeDocument {
    pub fn new(primary_type: impl Into<String>) -> Self {
        Self {
            primary_type: primary_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixins.get_or_insert_with(Vec::new).push(mixin.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, child: Self) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            PRIMARY_TYPE_PROPERTY.to_string(),
            Value::String(self.primary_type.clone()),
        );
        if let Some(mixins) = &self.mixins {
            properties.insert(MIXIN_TYPES_PROPERTY.to_string(), json!(mixins));
        }
        for (name, value) in &self.properties {
            properties.insert(name.clone(), value.clone());
        }

        let mut document = Map::new();
        document.insert(PROPERTIES_KEY.to_string(), Value::Object(properties));
        if !self.children.is_empty() {
            let children = self
                .children
                .iter()
                .map(|(name, child)| (name.clone(), child.to_json()))
                .collect::<Map<_, _>>();
            document.insert(CHILDREN_KEY.to_string(), Value::Object(children));
        }
        Value::Object(document)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_json())?)
    }
}

/// Formats a timestamp as `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
#[must_use]
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[must_use]
pub fn encode_binary(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_binary(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded.trim())?)
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|err| NodepubError::malformed_json(err, body))
}

fn parse_object(body: &str) -> Result<Map<String, Value>> {
    match parse_body(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(NodepubError::decode("expected a JSON object", body)),
    }
}

/// Classifies a repository-discovery body: a `repositories` array means protocol v2.
pub fn determine_version(body: &str) -> Result<ProtocolVersion> {
    let doc = parse_body(body)?;
    if doc.get(REPOSITORIES_KEY).is_some_and(Value::is_array) {
        return Ok(ProtocolVersion::V2);
    }
    Ok(ProtocolVersion::V1)
}

/// Reads the entry names of a collection document.
///
/// Accepts both `{"<key>": [{"name": ..}, ..]}` and the flatter `{"<name>": {..}, ..}` shape.
fn collection_names(body: &str, key: &str) -> Result<Vec<String>> {
    let doc = parse_object(body)?;
    if let Some(entries) = doc.get(key).and_then(Value::as_array) {
        return entries
            .iter()
            .map(|entry| {
                entry
                    .get(NAME_KEY)
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
                    .ok_or_else(|| {
                        NodepubError::decode(format!("`{key}` entry without a `name`"), body)
                    })
            })
            .collect();
    }
    Ok(doc.keys().cloned().collect())
}

pub fn decode_repositories(server: &Server, body: &str) -> Result<Vec<Repository>> {
    Ok(collection_names(body, REPOSITORIES_KEY)?
        .into_iter()
        .map(|name| Repository::new(name, server.clone()))
        .collect())
}

pub fn decode_workspaces(repository: &Repository, body: &str) -> Result<Vec<Workspace>> {
    Ok(collection_names(body, WORKSPACES_KEY)?
        .into_iter()
        .map(|name| Workspace::new(name, repository.clone()))
        .collect())
}

fn strip_binary_suffix(column: &str) -> Option<&str> {
    BINARY_SUFFIXES
        .iter()
        .find_map(|suffix| column.strip_suffix(suffix))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

pub fn decode_query_rows(body: &str) -> Result<Vec<QueryRow>> {
    let doc = parse_object(body)?;

    let mut column_types = BTreeMap::new();
    if let Some(types) = doc.get(TYPES_KEY) {
        let types = types
            .as_object()
            .ok_or_else(|| NodepubError::decode("`types` is not an object", body))?;
        for (column, kind) in types {
            if let Some(kind) = scalar_text(kind) {
                column_types.insert(column.clone(), kind);
            }
        }
    }
    let column_types = Arc::new(column_types);

    let rows = doc
        .get(ROWS_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| NodepubError::decode("missing `rows` array", body))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let row = row
            .as_object()
            .ok_or_else(|| NodepubError::decode("query row is not an object", body))?;
        let mut values = BTreeMap::new();
        for (column, value) in row {
            if let Some(name) = strip_binary_suffix(column) {
                let encoded = value.as_str().ok_or_else(|| {
                    NodepubError::decode(format!("binary column `{column}` is not a string"), body)
                })?;
                values.insert(name.to_string(), QueryValue::Binary(decode_binary(encoded)?));
            } else if let Some(text) = scalar_text(value) {
                values.insert(column.clone(), QueryValue::Text(text));
            }
        }
        out.push(QueryRow::new(Arc::clone(&column_types), values));
    }
    Ok(out)
}

/// Extracts the decoded `jcr:data` bytes from a `jcr:content` node document.
pub fn decode_file_contents(body: &str) -> Result<Vec<u8>> {
    let doc = parse_object(body)?;
    let encoded = doc
        .get(PROPERTIES_KEY)
        .and_then(|props| props.get(DATA_PROPERTY))
        .and_then(Value::as_str)
        .ok_or_else(|| NodepubError::decode(format!("missing `{DATA_PROPERTY}`"), body))?;
    decode_binary(encoded)
}

const NODE_TYPE_NAME: &str = "jcr:nodeTypeName";
const SUPERTYPES: &str = "jcr:supertypes";
const IS_MIXIN: &str = "jcr:isMixin";
const IS_ABSTRACT: &str = "jcr:isAbstract";
const IS_QUERYABLE: &str = "jcr:isQueryable";
const PRIMARY_ITEM_NAME: &str = "jcr:primaryItemName";
const PROPERTY_DEFINITION: &str = "jcr:propertyDefinition";
const CHILD_NODE_DEFINITION: &str = "jcr:childNodeDefinition";
const DEFINITION_NAME: &str = "jcr:name";
const REQUIRED_TYPE: &str = "jcr:requiredType";
const MULTIPLE: &str = "jcr:multiple";
const MANDATORY: &str = "jcr:mandatory";
const AUTOCREATED: &str = "jcr:autoCreated";
const REQUIRED_PRIMARY_TYPES: &str = "jcr:requiredPrimaryTypes";
const DEFAULT_PRIMARY_TYPE: &str = "jcr:defaultPrimaryType";
const RESIDUAL_NAME: &str = "*";

fn flag(props: &Map<String, Value>, key: &str) -> bool {
    match props.get(key) {
        Some(Value::Bool(value)) => *value,
        Some(Value::String(raw)) => raw.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn text(props: &Map<String, Value>, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn text_list(props: &Map<String, Value>, key: &str) -> Vec<String> {
    match props.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(ToString::to_string))
            .collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}

fn properties_of(node: &Value) -> Map<String, Value> {
    node.get(PROPERTIES_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Same-name siblings arrive as `name`, `name[2]`, `name[3]`, ...
fn is_sibling_of(key: &str, base: &str) -> bool {
    key == base || key.strip_prefix(base).is_some_and(|rest| rest.starts_with('['))
}

fn decode_node_type(key: &str, node: &Value) -> NodeType {
    let props = properties_of(node);
    let mut property_definitions = Vec::new();
    let mut child_node_definitions = Vec::new();

    if let Some(children) = node.get(CHILDREN_KEY).and_then(Value::as_object) {
        for (child_key, child) in children {
            let child_props = properties_of(child);
            if is_sibling_of(child_key, PROPERTY_DEFINITION) {
                property_definitions.push(PropertyDefinition {
                    name: text(&child_props, DEFINITION_NAME)
                        .unwrap_or_else(|| RESIDUAL_NAME.to_string()),
                    required_type: text(&child_props, REQUIRED_TYPE)
                        .unwrap_or_else(|| "UNDEFINED".to_string()),
                    multiple: flag(&child_props, MULTIPLE),
                    mandatory: flag(&child_props, MANDATORY),
                    autocreated: flag(&child_props, AUTOCREATED),
                });
            } else if is_sibling_of(child_key, CHILD_NODE_DEFINITION) {
                child_node_definitions.push(ChildNodeDefinition {
                    name: text(&child_props, DEFINITION_NAME)
                        .unwrap_or_else(|| RESIDUAL_NAME.to_string()),
                    required_primary_types: text_list(&child_props, REQUIRED_PRIMARY_TYPES),
                    default_primary_type: text(&child_props, DEFAULT_PRIMARY_TYPE),
                });
            }
        }
    }

    NodeType {
        name: text(&props, NODE_TYPE_NAME).unwrap_or_else(|| key.to_string()),
        supertypes: text_list(&props, SUPERTYPES),
        is_mixin: flag(&props, IS_MIXIN),
        is_abstract: flag(&props, IS_ABSTRACT),
        is_queryable: flag(&props, IS_QUERYABLE),
        primary_item_name: text(&props, PRIMARY_ITEM_NAME),
        property_definitions,
        child_node_definitions,
    }
}

/// Decodes the `jcr:system/jcr:nodeTypes` subtree into node types keyed by name.
pub fn decode_node_types(body: &str) -> Result<BTreeMap<String, NodeType>> {
    let doc = parse_object(body)?;
    let children = doc
        .get(CHILDREN_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| NodepubError::decode("missing `children` of node types", body))?;

    Ok(children
        .iter()
        .map(|(key, node)| {
            let node_type = decode_node_type(key, node);
            (node_type.name.clone(), node_type)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn server() -> Server {
        Server::new("http://localhost:8080/resources", "admin", "admin")
    }

    #[test]
    fn timestamp_is_utc_with_millis_and_z_suffix() {
        let value = Utc
            .timestamp_millis_opt(1_700_000_000_123)
            .single()
            .expect("timestamp");
        assert_eq!(format_timestamp(value), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn document_omits_children_and_mixins_when_absent() {
        let doc = NodeDocument::new("nt:folder").to_json();
        assert_eq!(doc, json!({"properties": {"jcr:primaryType": "nt:folder"}}));
    }

    #[test]
    fn document_nests_children_and_keeps_explicit_empty_mixins() {
        let mut folder = NodeDocument::new("nt:folder");
        folder.mixins = Some(Vec::new());
        let doc = NodeDocument::new("nt:file")
            .with_mixin("mix:versionable")
            .with_child("jcr:content", NodeDocument::new("nt:resource"))
            .to_json();
        assert_eq!(doc["properties"]["jcr:mixinTypes"], json!(["mix:versionable"]));
        assert_eq!(
            doc["children"]["jcr:content"]["properties"]["jcr:primaryType"],
            "nt:resource"
        );
        assert_eq!(folder.to_json()["properties"]["jcr:mixinTypes"], json!([]));
    }

    #[test]
    fn version_two_requires_repositories_array() {
        assert_eq!(
            determine_version(r#"{"repositories":[{"name":"repo"}]}"#).expect("v2"),
            ProtocolVersion::V2
        );
        assert_eq!(
            determine_version(r#"{"repositories":"not-an-array"}"#).expect("v1"),
            ProtocolVersion::V1
        );
        assert_eq!(
            determine_version(r#"{"repo":{"repository":{"name":"repo"}}}"#).expect("v1"),
            ProtocolVersion::V1
        );
        assert_eq!(determine_version("[]").expect("v1"), ProtocolVersion::V1);
    }

    #[test]
    fn version_detection_rejects_non_json() {
        let err = determine_version("<html>").expect_err("must fail");
        assert!(matches!(err, NodepubError::ProtocolDecode { ref body, .. } if body == "<html>"));
        let parse_error = std::error::Error::source(&err).expect("parser error kept");
        assert!(parse_error.is::<serde_json::Error>());
    }

    #[test]
    fn both_repository_shapes_decode_to_same_set() {
        let v1 = decode_repositories(
            &server(),
            r#"{"docs":{"repository":{"name":"docs"}},"media":{"repository":{"name":"media"}}}"#,
        )
        .expect("v1");
        let v2 = decode_repositories(
            &server(),
            r#"{"repositories":[{"name":"docs"},{"name":"media"}]}"#,
        )
        .expect("v2");
        let names = |repos: &[Repository]| {
            let mut names = repos.iter().map(|r| r.name().to_string()).collect::<Vec<_>>();
            names.sort();
            names
        };
        assert_eq!(names(&v1), vec!["docs", "media"]);
        assert_eq!(names(&v1), names(&v2));
        assert!(v1.iter().all(|repo| repo.server() == &server()));
    }

    #[test]
    fn repository_entry_without_name_is_a_decode_error() {
        let err = decode_repositories(&server(), r#"{"repositories":[{"id":1}]}"#)
            .expect_err("must fail");
        assert_eq!(err.code(), "PROTOCOL_DECODE");
    }

    #[test]
    fn workspaces_bind_to_originating_repository() {
        let repository = Repository::new("docs", server());
        let workspaces = decode_workspaces(
            &repository,
            r#"{"workspaces":[{"name":"default"},{"name":"system"}]}"#,
        )
        .expect("decode");
        assert_eq!(workspaces.len(), 2);
        assert_eq!(workspaces[0].name(), "default");
        assert_eq!(workspaces[1].repository(), &repository);

        let flat = decode_workspaces(&repository, r#"{"default":{"workspace":{}}}"#)
            .expect("decode flat");
        assert_eq!(flat[0].name(), "default");
    }

    #[test]
    fn query_rows_split_binary_and_text_columns() {
        let rows = decode_query_rows(
            r#"{"types":{"x":"STRING","y":"BINARY"},
                "rows":[{"x":"hello","y_base64":"aGk="},{"x":"bye","y/base64/":"aGk="}]}"#,
        )
        .expect("decode");
        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.value("x").and_then(QueryValue::as_str), Some("hello"));
        assert_eq!(first.value("y").and_then(QueryValue::as_bytes), Some(&b"hi"[..]));
        assert!(first.value("y_base64").is_none());
        assert_eq!(first.column_type("y"), Some("BINARY"));
        assert!(Arc::ptr_eq(first.column_types(), rows[1].column_types()));
        assert_eq!(rows[1].value("y").and_then(QueryValue::as_bytes), Some(&b"hi"[..]));
    }

    #[test]
    fn query_rows_render_scalars_and_drop_nulls() {
        let rows = decode_query_rows(r#"{"rows":[{"n":3,"flag":true,"gone":null}]}"#)
            .expect("decode");
        assert_eq!(rows[0].value("n").and_then(QueryValue::as_str), Some("3"));
        assert_eq!(rows[0].value("flag").and_then(QueryValue::as_str), Some("true"));
        assert!(rows[0].value("gone").is_none());
        assert!(rows[0].column_types().is_empty());
    }

    #[test]
    fn query_result_without_rows_is_a_decode_error() {
        let err = decode_query_rows(r#"{"types":{}}"#).expect_err("must fail");
        match err {
            NodepubError::ProtocolDecode {
                message,
                body,
                source,
            } => {
                assert!(message.contains("rows"));
                assert_eq!(body, r#"{"types":{}}"#);
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_contents_decode_data_property() {
        let bytes = decode_file_contents(
            r#"{"properties":{"jcr:primaryType":"nt:resource","jcr:data":"aGVsbG8="}}"#,
        )
        .expect("decode");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn node_types_decode_definitions_and_string_flags() {
        let body = r#"{
            "properties": {"jcr:primaryType": "rep:nodeTypes"},
            "children": {
                "nt:file": {
                    "properties": {
                        "jcr:nodeTypeName": "nt:file",
                        "jcr:supertypes": ["nt:hierarchyNode"],
                        "jcr:isMixin": "false",
                        "jcr:isAbstract": false,
                        "jcr:isQueryable": "true",
                        "jcr:primaryItemName": "jcr:content"
                    },
                    "children": {
                        "jcr:childNodeDefinition": {
                            "properties": {
                                "jcr:name": "jcr:content",
                                "jcr:requiredPrimaryTypes": ["nt:base"],
                                "jcr:mandatory": "true"
                            }
                        }
                    }
                },
                "mix:versionable": {
                    "properties": {"jcr:isMixin": true, "jcr:supertypes": "mix:referenceable"},
                    "children": {
                        "jcr:propertyDefinition": {
                            "properties": {"jcr:name": "jcr:isCheckedOut", "jcr:requiredType": "Boolean", "jcr:mandatory": "true"}
                        },
                        "jcr:propertyDefinition[2]": {
                            "properties": {"jcr:requiredType": "Reference", "jcr:multiple": "true"}
                        }
                    }
                }
            }
        }"#;
        let types = decode_node_types(body).expect("decode");
        let file = &types["nt:file"];
        assert_eq!(file.supertypes, vec!["nt:hierarchyNode"]);
        assert!(!file.is_mixin);
        assert!(file.is_queryable);
        assert_eq!(file.primary_item_name.as_deref(), Some("jcr:content"));
        assert_eq!(file.child_node_definitions[0].name, "jcr:content");
        assert_eq!(file.child_node_definitions[0].required_primary_types, vec!["nt:base"]);

        let versionable = &types["mix:versionable"];
        assert!(versionable.is_mixin);
        assert_eq!(versionable.supertypes, vec!["mix:referenceable"]);
        assert_eq!(versionable.property_definitions.len(), 2);
        let residual = versionable
            .property_definitions
            .iter()
            .find(|def| def.name == "*")
            .expect("residual definition");
        assert!(residual.multiple);
        assert_eq!(residual.required_type, "Reference");
    }
}
