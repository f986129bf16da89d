//! The node-type transition engine: validation and the five structural
//! reshapes behind the context menu.

use std::collections::HashSet;

use faultcanvas_core::constants::ROOT_NODE_ID;
use faultcanvas_core::{Edge, EdgeId, Node, NodeId, NodeType, Position};
use faultcanvas_events::{ContextMenuAction, NotificationKind};
use faultcanvas_graph::{connected_edges, incomers, outgoers, subgraph};

use crate::SessionError;
use crate::session::TreeGraphSession;

impl TreeGraphSession {
    /// Checks a context-menu action against the structural rules without
    /// mutating anything. `None` means the action may proceed.
    pub fn validate_context_menu(
        &self,
        node_id: &NodeId,
        action: ContextMenuAction,
    ) -> Option<NotificationKind> {
        let node = self.find_node(node_id)?;

        match action {
            ContextMenuAction::Retype { node_type } => {
                let is_root = node_id.0 == ROOT_NODE_ID;
                if is_root && (node_type.is_leaf() || node_type == NodeType::NotGate) {
                    return Some(NotificationKind::UpdateRootNode);
                }
                None
            }
            ContextMenuAction::DeleteNode | ContextMenuAction::DeleteSubtree => {
                if node_id.0 == ROOT_NODE_ID {
                    return Some(NotificationKind::DeleteRootNode);
                }
                if node.node_type.is_leaf() {
                    let parents = incomers(node_id, &self.nodes, &self.edges);
                    let parent = parents.first()?;
                    let siblings = outgoers(&parent.id, &self.nodes, &self.edges);
                    if parent.node_type.is_logic_gate() && siblings.len() == 2 {
                        return Some(NotificationKind::AtleastTwoChildren);
                    }
                    if parent.node_type == NodeType::NotGate && siblings.len() == 1 {
                        return Some(NotificationKind::NotGateChild);
                    }
                }
                None
            }
        }
    }

    /// Applies a context-menu action. A rejected action publishes its
    /// notification and leaves the graph untouched; an action on an
    /// unknown node is a silent no-op. While a gray-out proposal is
    /// pending, structural actions are rejected until the branch decision
    /// lands.
    pub fn handle_context_menu(
        &mut self,
        node_id: &NodeId,
        action: ContextMenuAction,
    ) -> Result<(), SessionError> {
        if self.is_subgraph_grayed() {
            self.notify(NotificationKind::GenericError);
            return Err(SessionError::ProposalPending);
        }
        let Some(clicked) = self.find_node(node_id).cloned() else {
            return Ok(());
        };
        if let Some(kind) = self.validate_context_menu(node_id, action) {
            self.notify(kind);
            return Ok(());
        }

        match action {
            ContextMenuAction::Retype { node_type } => self.retype_node(&clicked, node_type),
            ContextMenuAction::DeleteNode => self.delete_node(&clicked),
            ContextMenuAction::DeleteSubtree => self.delete_subtree(&clicked),
        }
    }

    /// The five retype cases. Children are reshaped so the new type's
    /// arity rules hold immediately after the commit:
    ///
    /// 1. leaf -> logic gate: two fresh basic-event children
    /// 2. any -> leaf: the whole subtree below is discarded
    /// 3. NOT -> logic gate: one extra basic-event child (total two)
    /// 4. logic gate -> NOT: subtree discarded, one fresh child
    /// 5. logic gate -> logic gate: label swap only
    fn retype_node(&mut self, clicked: &Node, new_type: NodeType) -> Result<(), SessionError> {
        let current = clicked.node_type;
        if current == new_type {
            return Ok(());
        }
        self.record_snapshot();

        let mut added_nodes: Vec<Node> = Vec::new();
        let mut added_edges: Vec<Edge> = Vec::new();
        let mut removed_nodes: HashSet<NodeId> = HashSet::new();
        let mut removed_edges: HashSet<EdgeId> = HashSet::new();

        if current.is_leaf() && new_type.is_logic_gate() {
            for _ in 0..2 {
                let child = self.new_basic_event(child_position(clicked));
                added_edges.push(Edge::workflow(clicked.id.clone(), child.id.clone()));
                added_nodes.push(child);
            }
        } else if new_type.is_leaf() {
            let below = subgraph(&clicked.id, &self.nodes, &self.edges);
            removed_nodes.extend(below.node_ids());
            removed_edges.extend(
                below
                    .edges
                    .iter()
                    .filter(|edge| edge.target != clicked.id)
                    .map(|edge| edge.id.clone()),
            );
        } else if current == NodeType::NotGate {
            // gaining a gate type, the single existing child stays
            let child = self.new_basic_event(child_position(clicked));
            added_edges.push(Edge::workflow(clicked.id.clone(), child.id.clone()));
            added_nodes.push(child);
        } else if new_type == NodeType::NotGate {
            let below = subgraph(&clicked.id, &self.nodes, &self.edges);
            removed_nodes.extend(below.node_ids());
            removed_edges.extend(
                below
                    .edges
                    .iter()
                    .filter(|edge| edge.target != clicked.id)
                    .map(|edge| edge.id.clone()),
            );
            let child = self.new_basic_event(child_position(clicked));
            added_edges.push(Edge::workflow(clicked.id.clone(), child.id.clone()));
            added_nodes.push(child);
        }

        self.nodes.retain(|node| !removed_nodes.contains(&node.id));
        self.edges.retain(|edge| !removed_edges.contains(&edge.id));
        if let Some(node) = self.find_node_mut(&clicked.id) {
            node.node_type = new_type;
            node.data.label = Some(new_type.label().to_owned());
        }
        self.nodes.extend(added_nodes);
        self.edges.extend(added_edges);

        self.commit(None);
        Ok(())
    }

    /// Splices the node out, reconnecting each parent to each child. When
    /// the node is a logic gate directly under a NOT gate the splice would
    /// hand the NOT gate several children, so the deletion becomes a
    /// gray-out proposal instead.
    fn delete_node(&mut self, clicked: &Node) -> Result<(), SessionError> {
        let (parent_ids, parent_is_not_gate) = {
            let parents = incomers(&clicked.id, &self.nodes, &self.edges);
            let ids: Vec<NodeId> = parents.iter().map(|node| node.id.clone()).collect();
            let is_not_gate = parents
                .first()
                .is_some_and(|node| node.node_type == NodeType::NotGate);
            (ids, is_not_gate)
        };
        if parent_ids.is_empty() {
            return Ok(());
        }

        if clicked.node_type.is_logic_gate() && parent_is_not_gate {
            let children = outgoers(&clicked.id, &self.nodes, &self.edges);
            if children.len() > 1 {
                return self.propose_deletion(&clicked.id);
            }
        }

        self.record_snapshot();

        let child_ids: Vec<NodeId> = outgoers(&clicked.id, &self.nodes, &self.edges)
            .iter()
            .map(|node| node.id.clone())
            .collect();
        let removed: HashSet<EdgeId> = connected_edges(
            std::slice::from_ref(&clicked.id),
            &self.edges,
        )
        .iter()
        .map(|edge| edge.id.clone())
        .collect();

        self.nodes.retain(|node| node.id != clicked.id);
        self.edges.retain(|edge| !removed.contains(&edge.id));
        for parent_id in &parent_ids {
            for child_id in &child_ids {
                self.edges
                    .push(Edge::workflow(parent_id.clone(), child_id.clone()));
            }
        }

        self.commit(None);
        Ok(())
    }

    /// Discards everything below the node and collapses it into a basic
    /// event.
    fn delete_subtree(&mut self, clicked: &Node) -> Result<(), SessionError> {
        self.record_snapshot();

        let below = subgraph(&clicked.id, &self.nodes, &self.edges);
        let removed_nodes: HashSet<NodeId> = below.node_ids().into_iter().collect();
        let removed_edges: HashSet<EdgeId> = below
            .edges
            .iter()
            .filter(|edge| edge.target != clicked.id)
            .map(|edge| edge.id.clone())
            .collect();

        self.nodes.retain(|node| !removed_nodes.contains(&node.id));
        self.edges.retain(|edge| !removed_edges.contains(&edge.id));
        if let Some(node) = self.find_node_mut(&clicked.id) {
            node.node_type = NodeType::BasicEvent;
            node.data.label = Some(NodeType::BasicEvent.label().to_owned());
        }

        self.commit(None);
        Ok(())
    }
}

fn child_position(parent: &Node) -> Position {
    Position::new(
        parent.position.x,
        parent.position.y + faultcanvas_core::constants::NODE_HEIGHT,
    )
}
