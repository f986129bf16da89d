//! Structural invariant checks for committed tree state.
//!
//! These are diagnostics, not repair: a violation in committed state is a
//! programming or data-integrity error, and callers are expected to surface
//! it loudly rather than patch the graph up silently.

use crate::query::outgoers;
use faultcanvas_core::{Edge, Node, NodeId};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InvariantViolation {
    /// No node without an incoming edge, or more than one.
    RootCount(usize),
    /// A non-root node with zero or multiple incoming edges.
    ParentArity { node: NodeId, parents: usize },
    /// A NOT gate without exactly one child.
    NotGateArity { node: NodeId, children: usize },
    /// A logic gate with exactly one child (zero is allowed only
    /// transiently, mid-computation).
    GateUnderfilled { node: NodeId, children: usize },
    /// A leaf-type node with children.
    LeafWithChildren { node: NodeId, children: usize },
    /// An edge referencing a node that does not exist.
    DanglingEdge { edge: faultcanvas_core::EdgeId },
}

/// Checks the structural tree rules over a committed `(nodes, edges)`
/// snapshot: one root, single parents, gate arities, childless leaves,
/// no dangling edges.
///
/// A pending gray-out proposal relaxes the NOT-gate arity rule: a NOT gate
/// whose only child is grayed is awaiting a branch decision and is reported
/// only when `grayout_pending` is false.
pub fn check_invariants(
    nodes: &[Node],
    edges: &[Edge],
    grayout_pending: bool,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let ids: HashMap<&NodeId, &Node> = nodes.iter().map(|node| (&node.id, node)).collect();
    for edge in edges {
        if !ids.contains_key(&edge.source) || !ids.contains_key(&edge.target) {
            violations.push(InvariantViolation::DanglingEdge {
                edge: edge.id.clone(),
            });
        }
    }

    let mut parent_count: HashMap<&NodeId, usize> = HashMap::new();
    for edge in edges {
        *parent_count.entry(&edge.target).or_default() += 1;
    }

    let roots = nodes
        .iter()
        .filter(|node| !parent_count.contains_key(&node.id))
        .count();
    if roots != 1 && !nodes.is_empty() {
        violations.push(InvariantViolation::RootCount(roots));
    }

    for node in nodes {
        let parents = parent_count.get(&node.id).copied().unwrap_or(0);
        if parents > 1 {
            violations.push(InvariantViolation::ParentArity {
                node: node.id.clone(),
                parents,
            });
        }

        let children = outgoers(&node.id, nodes, edges);
        let child_count = children.len();
        if node.node_type == faultcanvas_core::NodeType::NotGate {
            let only_grayed_children = children.iter().all(|child| child.data.is_grayed);
            if child_count != 1 && !(grayout_pending && only_grayed_children) {
                violations.push(InvariantViolation::NotGateArity {
                    node: node.id.clone(),
                    children: child_count,
                });
            }
        } else if node.node_type.is_logic_gate() {
            if child_count == 1 {
                violations.push(InvariantViolation::GateUnderfilled {
                    node: node.id.clone(),
                    children: child_count,
                });
            }
        } else if node.node_type.is_leaf() && child_count != 0 {
            violations.push(InvariantViolation::LeafWithChildren {
                node: node.id.clone(),
                children: child_count,
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultcanvas_core::{NodeType, starter_edges, starter_nodes};

    #[test]
    fn starter_graph_is_well_formed() {
        assert!(check_invariants(&starter_nodes(), &starter_edges(), false).is_empty());
    }

    #[test]
    fn reports_underfilled_gate_and_leaf_children() {
        let nodes = vec![
            Node::new("1", NodeType::AndGate),
            Node::new("2", NodeType::BasicEvent),
            Node::new("3", NodeType::BasicEvent),
        ];
        let edges = vec![
            Edge::workflow(NodeId::from("1"), NodeId::from("2")),
            Edge::workflow(NodeId::from("2"), NodeId::from("3")),
        ];
        let violations = check_invariants(&nodes, &edges, false);
        assert!(violations.contains(&InvariantViolation::GateUnderfilled {
            node: NodeId::from("1"),
            children: 1,
        }));
        assert!(violations.contains(&InvariantViolation::LeafWithChildren {
            node: NodeId::from("2"),
            children: 1,
        }));
    }

    #[test]
    fn not_gate_needs_exactly_one_child() {
        let nodes = vec![
            Node::new("1", NodeType::NotGate),
            Node::new("2", NodeType::BasicEvent),
            Node::new("3", NodeType::BasicEvent),
        ];
        let edges = vec![
            Edge::workflow(NodeId::from("1"), NodeId::from("2")),
            Edge::workflow(NodeId::from("1"), NodeId::from("3")),
        ];
        let violations = check_invariants(&nodes, &edges, false);
        assert!(violations.contains(&InvariantViolation::NotGateArity {
            node: NodeId::from("1"),
            children: 2,
        }));
    }

    #[test]
    fn violations_serialize_for_diagnostics() {
        let violation = InvariantViolation::ParentArity {
            node: NodeId::from("x"),
            parents: 2,
        };
        let json = serde_json::to_string(&violation).unwrap();
        assert!(json.contains("ParentArity"));
        assert!(json.contains(r#""parents":2"#));
    }

    #[test]
    fn dangling_edge_is_reported() {
        let nodes = vec![Node::new("1", NodeType::BasicEvent)];
        let edges = vec![Edge::workflow(NodeId::from("1"), NodeId::from("ghost"))];
        let violations = check_invariants(&nodes, &edges, false);
        assert!(
            violations
                .iter()
                .any(|v| matches!(v, InvariantViolation::DanglingEdge { .. }))
        );
    }
}
