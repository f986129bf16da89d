use crate::constants::ROOT_NODE_ID;
use crate::node_type::{NodeType, TreeKind};
use crate::{Edge, Node, NodeId};
use serde::{Deserialize, Serialize};

/// Persisted shape of one tree diagram, keyed by `tree_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub tree_id: String,
    #[serde(default)]
    pub kind: TreeKind,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    pub fn empty(tree_id: impl Into<String>, kind: TreeKind) -> Self {
        Self {
            tree_id: tree_id.into(),
            kind,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// An empty node set means nothing was stored yet; callers fall back
    /// to the starter graph.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn starter(tree_id: impl Into<String>, kind: TreeKind) -> Self {
        Self {
            tree_id: tree_id.into(),
            kind,
            nodes: starter_nodes(),
            edges: starter_edges(),
        }
    }
}

/// The default graph every new tree begins with: an OR gate root with two
/// basic-event children.
pub fn starter_nodes() -> Vec<Node> {
    vec![
        Node::new(ROOT_NODE_ID, NodeType::OrGate),
        Node::new("2", NodeType::BasicEvent),
        Node::new("3", NodeType::BasicEvent),
    ]
}

pub fn starter_edges() -> Vec<Edge> {
    vec![
        Edge::workflow(NodeId::from(ROOT_NODE_ID), NodeId::from("2")),
        Edge::workflow(NodeId::from(ROOT_NODE_ID), NodeId::from("3")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_graph_is_root_with_two_children() {
        let nodes = starter_nodes();
        let edges = starter_edges();
        assert_eq!(nodes.len(), 3);
        assert_eq!(edges.len(), 2);
        assert_eq!(nodes[0].id, NodeId::from(ROOT_NODE_ID));
        assert_eq!(nodes[0].node_type, NodeType::OrGate);
        assert!(edges.iter().all(|e| e.source == nodes[0].id));
    }

    #[test]
    fn document_round_trips_with_camel_case_key() {
        let doc = GraphDocument::starter("ft-1", TreeKind::HeatBalanceFaultTree);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["treeId"], "ft-1");
        assert_eq!(json["kind"], "heatBalanceFaultTree");

        let back: GraphDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_kind_defaults_to_fault_tree() {
        let doc: GraphDocument =
            serde_json::from_str(r#"{"treeId":"t","nodes":[],"edges":[]}"#).unwrap();
        assert_eq!(doc.kind, TreeKind::FaultTree);
        assert!(doc.is_empty());
    }
}
