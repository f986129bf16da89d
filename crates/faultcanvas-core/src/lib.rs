use serde::{Deserialize, Serialize};
use std::fmt;

pub mod constants;
pub mod document;
pub mod node_type;

pub use document::{GraphDocument, starter_edges, starter_nodes};
pub use node_type::{NodeType, NodeTypeParseError, TreeKind};

/// Identifier of a node. The root id is fixed per document
/// (`constants::ROOT_NODE_ID`); all other ids are minted as UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        EdgeId(value.to_owned())
    }
}

impl From<String> for EdgeId {
    fn from(value: String) -> Self {
        EdgeId(value)
    }
}

/// Tag shared by every node and edge of one tentative (grayed) branch
/// during a pending deletion proposal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub String);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BranchId {
    fn from(value: &str) -> Self {
        BranchId(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Display payload of a node. `is_grayed`/`branch_id` are set only while
/// the node belongs to a tentative subtree (see the session's gray-out
/// manager); committed state carries neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_grayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<BranchId>,
}

impl NodeData {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_grayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            position: Position::default(),
            data: NodeData::labeled(node_type.label()),
        }
    }
}

/// The only edge kind the editor produces. Kept as a closed enum so the
/// wire shape stays explicit rather than a free-form string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
    #[default]
    Workflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

impl Edge {
    /// Workflow edge with the conventional `"<source>-><target>"` id.
    pub fn workflow(source: NodeId, target: NodeId) -> Self {
        Self {
            id: EdgeId(format!("{source}->{target}")),
            source,
            target,
            edge_type: EdgeType::Workflow,
            animated: false,
            data: None,
        }
    }

    pub fn is_grayed(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.is_grayed)
    }

    pub fn branch_id(&self) -> Option<&BranchId> {
        self.data.as_ref().and_then(|d| d.branch_id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_wire_shape_matches_persisted_json() {
        let node = Node {
            id: NodeId::from("1"),
            node_type: NodeType::OrGate,
            position: Position::new(10.0, 20.0),
            data: NodeData::labeled("OR Gate"),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "orGate");
        assert_eq!(json["position"]["x"], 10.0);
        assert_eq!(json["data"]["label"], "OR Gate");
        assert!(json["data"].get("isGrayed").is_none());
    }

    #[test]
    fn grayed_flags_round_trip() {
        let mut node = Node::new("n", NodeType::BasicEvent);
        node.data.is_grayed = true;
        node.data.branch_id = Some(BranchId::from("b-1"));

        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains(r#""isGrayed":true"#));
        assert!(json.contains(r#""branchId":"b-1""#));

        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn edge_defaults_deserialize() {
        let edge: Edge = serde_json::from_str(
            r#"{"id":"1->2","source":"1","target":"2","type":"workflow"}"#,
        )
        .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Workflow);
        assert!(!edge.animated);
        assert!(edge.data.is_none());
    }

    #[test]
    fn workflow_edge_id_is_source_arrow_target() {
        let edge = Edge::workflow(NodeId::from("a"), NodeId::from("b"));
        assert_eq!(edge.id, EdgeId::from("a->b"));
    }
}
