//! Content fingerprint used to gate redundant graph replacement.
//!
//! A freshly fetched document that is structurally identical to what is
//! already applied must not restart layout and animation; the signature is
//! the order-insensitive equality check that decides this. It only guards
//! the load-from-store path; user mutations are never gated.

use faultcanvas_core::{Edge, EdgeType, Node};

fn edge_type_name(edge_type: EdgeType) -> &'static str {
    match edge_type {
        EdgeType::Workflow => "workflow",
    }
}

/// Stable, order-insensitive fingerprint of a graph. Retains node
/// id/type/rounded-position and edge id/source/target/type; display data
/// (labels, gray flags) is deliberately excluded.
pub fn signature(nodes: &[Node], edges: &[Edge]) -> String {
    let mut node_records: Vec<String> = nodes
        .iter()
        .map(|node| {
            format!(
                "N:{}|{}|{}|{}",
                node.id,
                node.node_type,
                node.position.x.round() as i64,
                node.position.y.round() as i64
            )
        })
        .collect();
    node_records.sort();

    let mut edge_records: Vec<String> = edges
        .iter()
        .map(|edge| {
            format!(
                "E:{}|{}|{}|{}",
                edge.id,
                edge.source,
                edge.target,
                edge_type_name(edge.edge_type)
            )
        })
        .collect();
    edge_records.sort();

    node_records.push(String::new());
    node_records.extend(edge_records);
    node_records.join(";")
}

/// True iff there is no previous signature or the signatures differ.
pub fn should_apply(prev: Option<&str>, next: &str) -> bool {
    prev != Some(next)
}

/// Stateful wrapper carried by the session across reloads.
#[derive(Debug, Default, Clone)]
pub struct ApplyGuard {
    last: Option<String>,
}

impl ApplyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `next` and reports whether the caller should replace live
    /// state with it.
    pub fn check(&mut self, nodes: &[Node], edges: &[Edge]) -> bool {
        let next = signature(nodes, edges);
        let apply = should_apply(self.last.as_deref(), &next);
        self.last = Some(next);
        apply
    }

    pub fn last_signature(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultcanvas_core::{Position, starter_edges, starter_nodes};
    use proptest::prelude::*;

    #[test]
    fn identical_graphs_share_a_signature() {
        let (nodes, edges) = (starter_nodes(), starter_edges());
        assert_eq!(signature(&nodes, &edges), signature(&nodes, &edges));
    }

    #[test]
    fn order_of_nodes_and_edges_is_irrelevant() {
        let (nodes, edges) = (starter_nodes(), starter_edges());
        let mut shuffled_nodes = nodes.clone();
        shuffled_nodes.reverse();
        let mut shuffled_edges = edges.clone();
        shuffled_edges.reverse();
        assert_eq!(
            signature(&nodes, &edges),
            signature(&shuffled_nodes, &shuffled_edges)
        );
    }

    #[test]
    fn position_changes_change_the_signature() {
        let (mut nodes, edges) = (starter_nodes(), starter_edges());
        let original = signature(&nodes, &edges);
        nodes[1].position = Position::new(10.0, 0.0);
        assert_ne!(original, signature(&nodes, &edges));
    }

    #[test]
    fn sub_pixel_jitter_is_ignored() {
        let (mut nodes, edges) = (starter_nodes(), starter_edges());
        let original = signature(&nodes, &edges);
        nodes[1].position = Position::new(0.1, -0.2);
        assert_eq!(original, signature(&nodes, &edges));
    }

    #[test]
    fn guard_applies_first_then_skips_identical() {
        let (nodes, edges) = (starter_nodes(), starter_edges());
        let mut guard = ApplyGuard::new();
        assert!(guard.check(&nodes, &edges));
        assert!(!guard.check(&nodes, &edges));

        let mut grown = nodes.clone();
        grown.push(faultcanvas_core::Node::new("4", faultcanvas_core::NodeType::BasicEvent));
        assert!(guard.check(&grown, &edges));
    }

    proptest! {
        #[test]
        fn signature_invariant_under_permutation(seed in 0u64..1000) {
            let (mut nodes, mut edges) = (starter_nodes(), starter_edges());
            // cheap deterministic shuffle
            let node_turn = (seed as usize) % nodes.len().max(1);
            let edge_turn = (seed as usize) % edges.len().max(1);
            nodes.rotate_left(node_turn);
            edges.rotate_left(edge_turn);
            if seed % 2 == 0 {
                nodes.reverse();
            }
            prop_assert_eq!(
                signature(&starter_nodes(), &starter_edges()),
                signature(&nodes, &edges)
            );
        }
    }
}
