use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeType {
    pub name: String,
    pub supertypes: Vec<String>,
    pub is_mixin: bool,
    pub is_abstract: bool,
    pub is_queryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_item_name: Option<String>,
    pub property_definitions: Vec<PropertyDefinition>,
    pub child_node_definitions: Vec<ChildNodeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub required_type: String,
    pub multiple: bool,
    pub mandatory: bool,
    pub autocreated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildNodeDefinition {
    pub name: String,
    pub required_primary_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_primary_type: Option<String>,
}
