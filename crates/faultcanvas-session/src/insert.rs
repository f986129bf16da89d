//! Canvas insertions: NOT gates on edge click, basic events on gate
//! double-click.

use faultcanvas_core::constants::NODE_HEIGHT;
use faultcanvas_core::{Edge, EdgeId, NodeId, NodeType, Position};
use faultcanvas_events::NotificationKind;

use crate::SessionError;
use crate::session::TreeGraphSession;

impl TreeGraphSession {
    /// Inserts a NOT gate in the middle of the clicked edge. Clicking an
    /// edge that already touches a NOT gate does nothing, so NOT gates
    /// never chain back to back. An in-flight gray-out proposal is
    /// abandoned first.
    pub fn handle_edge_click(&mut self, edge_id: &EdgeId) -> Result<(), SessionError> {
        if self.is_subgraph_grayed() {
            self.abandon_proposal();
        }

        let Some(edge) = self.find_edge(edge_id).cloned() else {
            return Ok(());
        };
        let (Some(source), Some(target)) =
            (self.find_node(&edge.source), self.find_node(&edge.target))
        else {
            tracing::warn!(edge = %edge.id, "edge endpoint missing, click ignored");
            return Ok(());
        };
        if source.node_type == NodeType::NotGate || target.node_type == NodeType::NotGate {
            return Ok(());
        }
        let midpoint = Position::new(
            (source.position.x + target.position.x) / 2.0,
            (source.position.y + target.position.y) / 2.0,
        );

        self.record_snapshot();

        let not_gate = self.new_not_gate(midpoint);
        let not_gate_id = not_gate.id.clone();
        self.nodes.push(not_gate);
        self.edges.retain(|existing| existing.id != edge.id);
        self.edges
            .push(Edge::workflow(edge.source.clone(), not_gate_id.clone()));
        self.edges.push(Edge::workflow(not_gate_id, edge.target));

        self.commit(None);
        Ok(())
    }

    /// Appends a fresh basic-event child below the double-clicked gate and
    /// asks the viewport to focus it. Leaves and NOT gates ignore the
    /// gesture.
    pub fn handle_double_click(&mut self, node_id: &NodeId) -> Result<(), SessionError> {
        if self.is_subgraph_grayed() {
            self.notify(NotificationKind::GenericError);
            return Err(SessionError::ProposalPending);
        }
        let Some(parent) = self.find_node(node_id).cloned() else {
            return Ok(());
        };
        if parent.node_type.is_leaf() || parent.node_type == NodeType::NotGate {
            return Ok(());
        }

        self.record_snapshot();

        let child = self.new_basic_event(Position::new(
            parent.position.x,
            parent.position.y + NODE_HEIGHT,
        ));
        let child_id = child.id.clone();
        self.edges
            .push(Edge::workflow(parent.id.clone(), child_id.clone()));
        self.nodes.push(child);

        self.commit(Some(child_id));
        Ok(())
    }
}
