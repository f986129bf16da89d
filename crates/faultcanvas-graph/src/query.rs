//! Read-only queries over an immutable `(nodes, edges)` snapshot.
//!
//! The snapshot is owned by the caller; every function here borrows it and
//! returns either borrowed nodes/edges or cloned subsets. Nothing in this
//! module mutates graph state.

use faultcanvas_core::{Edge, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Children of `id`: targets of its outgoing edges, in edge order.
pub fn outgoers<'a>(id: &NodeId, nodes: &'a [Node], edges: &[Edge]) -> Vec<&'a Node> {
    edges
        .iter()
        .filter(|edge| edge.source == *id)
        .filter_map(|edge| nodes.iter().find(|node| node.id == edge.target))
        .collect()
}

/// Parents of `id`. A well-formed tree yields at most one entry for any
/// non-root node, but the query itself does not enforce arity.
pub fn incomers<'a>(id: &NodeId, nodes: &'a [Node], edges: &[Edge]) -> Vec<&'a Node> {
    edges
        .iter()
        .filter(|edge| edge.target == *id)
        .filter_map(|edge| nodes.iter().find(|node| node.id == edge.source))
        .collect()
}

/// Every edge incident to at least one of `ids`.
pub fn connected_edges<'a>(ids: &[NodeId], edges: &'a [Edge]) -> Vec<&'a Edge> {
    let id_set: HashSet<&NodeId> = ids.iter().collect();
    edges
        .iter()
        .filter(|edge| id_set.contains(&edge.source) || id_set.contains(&edge.target))
        .collect()
}

/// The reachable subtree under a node, as owned copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id.clone()).collect()
    }
}

/// Collects everything reachable from `root` along outgoing edges.
///
/// Returned nodes are the strict descendants of `root` (the root itself is
/// excluded); returned edges are all edges incident to the visited set,
/// which includes the edge terminating at `root`. Callers that splice the
/// subtree out filter that one edge, exactly as the deletion cases need.
///
/// Explicit worklist with a visited set: a revisit is a no-op, so malformed
/// input with diamonds or cycles terminates instead of recursing forever.
pub fn subgraph(root: &NodeId, nodes: &[Node], edges: &[Edge]) -> Subgraph {
    let mut visited: HashSet<NodeId> = HashSet::new();
    visited.insert(root.clone());

    let mut frontier: Vec<NodeId> = vec![root.clone()];
    let mut collected: Vec<Node> = Vec::new();

    while let Some(current) = frontier.pop() {
        for child in outgoers(&current, nodes, edges) {
            if visited.insert(child.id.clone()) {
                collected.push(child.clone());
                frontier.push(child.id.clone());
            }
        }
    }

    let member_ids: Vec<NodeId> = visited.into_iter().collect();
    let mut seen_edges: HashSet<&faultcanvas_core::EdgeId> = HashSet::new();
    let incident = connected_edges(&member_ids, edges)
        .into_iter()
        .filter(|edge| seen_edges.insert(&edge.id))
        .cloned()
        .collect();

    Subgraph {
        nodes: collected,
        edges: incident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultcanvas_core::NodeType;

    fn node(id: &str, node_type: NodeType) -> Node {
        Node::new(id, node_type)
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge::workflow(NodeId::from(source), NodeId::from(target))
    }

    fn sample_tree() -> (Vec<Node>, Vec<Edge>) {
        // 1 (or) -> 2 (and) -> 4, 5; 1 -> 3
        let nodes = vec![
            node("1", NodeType::OrGate),
            node("2", NodeType::AndGate),
            node("3", NodeType::BasicEvent),
            node("4", NodeType::BasicEvent),
            node("5", NodeType::BasicEvent),
        ];
        let edges = vec![
            edge("1", "2"),
            edge("1", "3"),
            edge("2", "4"),
            edge("2", "5"),
        ];
        (nodes, edges)
    }

    #[test]
    fn outgoers_follow_edge_order() {
        let (nodes, edges) = sample_tree();
        let children = outgoers(&NodeId::from("1"), &nodes, &edges);
        let ids: Vec<_> = children.iter().map(|n| n.id.0.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[test]
    fn incomers_finds_single_parent() {
        let (nodes, edges) = sample_tree();
        let parents = incomers(&NodeId::from("4"), &nodes, &edges);
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, NodeId::from("2"));
        assert!(incomers(&NodeId::from("1"), &nodes, &edges).is_empty());
    }

    #[test]
    fn subgraph_excludes_root_includes_incoming_edge() {
        let (nodes, edges) = sample_tree();
        let sub = subgraph(&NodeId::from("2"), &nodes, &edges);

        let mut ids: Vec<_> = sub.nodes.iter().map(|n| n.id.0.clone()).collect();
        ids.sort();
        assert_eq!(ids, ["4", "5"]);

        let mut edge_ids: Vec<_> = sub.edges.iter().map(|e| e.id.0.clone()).collect();
        edge_ids.sort();
        // the edge terminating at "2" is part of the incident set
        assert_eq!(edge_ids, ["1->2", "2->4", "2->5"]);
    }

    #[test]
    fn subgraph_terminates_on_cyclic_input() {
        let nodes = vec![node("a", NodeType::OrGate), node("b", NodeType::AndGate)];
        let edges = vec![edge("a", "b"), edge("b", "a")];
        let sub = subgraph(&NodeId::from("a"), &nodes, &edges);
        assert_eq!(sub.nodes.len(), 1);
        assert_eq!(sub.nodes[0].id, NodeId::from("b"));
    }

    #[test]
    fn subgraph_of_leaf_is_only_its_incoming_edge() {
        let (nodes, edges) = sample_tree();
        let sub = subgraph(&NodeId::from("3"), &nodes, &edges);
        assert!(sub.nodes.is_empty());
        assert_eq!(sub.edges.len(), 1);
        assert_eq!(sub.edges[0].id.0, "1->3");
    }
}
