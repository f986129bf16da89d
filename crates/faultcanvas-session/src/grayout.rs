//! Gray-out deletion proposals.
//!
//! Deleting a logic gate directly under a NOT gate is ambiguous: the NOT
//! gate can keep exactly one of the doomed gate's branches. Instead of
//! guessing, the whole subtree is grayed in place, each branch gets a
//! shared tag, and the user picks the survivor by hovering (solid
//! preview) and clicking (commit). At most one proposal is in flight; a
//! second one is rejected until the first resolves.

use std::collections::HashSet;

use faultcanvas_core::{BranchId, Edge, EdgeData, NodeId};
use faultcanvas_events::NotificationKind;
use faultcanvas_graph::{incomers, outgoers, subgraph};
use uuid::Uuid;

use crate::SessionError;
use crate::session::TreeGraphSession;

/// The state of one unresolved deletion. Held by the session while the
/// grayed subtree awaits a branch decision.
#[derive(Debug, Clone)]
pub struct PendingDeletionProposal {
    /// The gate the user asked to delete.
    pub doomed_node_id: NodeId,
    /// Its NOT-gate parent, which adopts the surviving branch.
    pub not_gate_id: NodeId,
    /// One tag per immediate child of the doomed gate.
    pub branches: Vec<BranchId>,
}

fn edge_data(edge: &mut Edge) -> &mut EdgeData {
    edge.data.get_or_insert_with(EdgeData::default)
}

impl TreeGraphSession {
    pub fn is_subgraph_grayed(&self) -> bool {
        self.pending.is_some()
    }

    /// Grays the subtree under `node_id` and tags each immediate-child
    /// branch. Only one proposal may be in flight at a time.
    pub(crate) fn propose_deletion(&mut self, node_id: &NodeId) -> Result<(), SessionError> {
        if self.pending.is_some() {
            self.notify(NotificationKind::GenericError);
            return Err(SessionError::ProposalPending);
        }
        let Some(doomed) = self.find_node(node_id).cloned() else {
            return Ok(());
        };
        let not_gate_id = incomers(node_id, &self.nodes, &self.edges)
            .first()
            .map(|node| node.id.clone())
            .ok_or_else(|| {
                SessionError::BrokenInvariant(format!("node {node_id} has no parent"))
            })?;

        // The snapshot is taken now, before any flags land, so an undo
        // after the eventual commit restores the pre-proposal tree.
        self.record_snapshot();

        let child_ids: Vec<NodeId> = outgoers(node_id, &self.nodes, &self.edges)
            .iter()
            .map(|node| node.id.clone())
            .collect();

        let mut branches = Vec::with_capacity(child_ids.len());
        for child_id in &child_ids {
            let branch = BranchId(Uuid::new_v4().to_string());
            let below = subgraph(child_id, &self.nodes, &self.edges);
            let mut member_nodes: HashSet<NodeId> = below.node_ids().into_iter().collect();
            member_nodes.insert(child_id.clone());
            // `below.edges` covers the edge from the doomed gate into the
            // branch root as well as every edge inside the branch.
            let member_edges: HashSet<_> = below.edges.iter().map(|edge| edge.id.clone()).collect();

            for node in &mut self.nodes {
                if member_nodes.contains(&node.id) {
                    node.data.is_grayed = true;
                    node.data.branch_id = Some(branch.clone());
                }
            }
            for edge in &mut self.edges {
                if member_edges.contains(&edge.id) {
                    edge.animated = true;
                    let data = edge_data(edge);
                    data.is_grayed = true;
                    data.branch_id = Some(branch.clone());
                }
            }
            branches.push(branch);
        }

        // The doomed gate itself and its incoming edge gray out without a
        // branch tag; no branch choice can keep them.
        if let Some(node) = self.find_node_mut(node_id) {
            node.data.is_grayed = true;
        }
        for edge in &mut self.edges {
            if edge.target == *node_id {
                edge.animated = true;
                edge_data(edge).is_grayed = true;
            }
        }

        self.pending = Some(PendingDeletionProposal {
            doomed_node_id: doomed.id,
            not_gate_id,
            branches,
        });
        Ok(())
    }

    /// Hover preview: the hovered branch renders solid while the pointer
    /// stays over it. Purely cosmetic, no persistence, no layout.
    pub fn preview_enter(&mut self, branch_id: Option<&BranchId>) {
        self.set_branch_grayed(branch_id, false);
    }

    /// Reverts the hover preview.
    pub fn preview_leave(&mut self, branch_id: Option<&BranchId>) {
        self.set_branch_grayed(branch_id, true);
    }

    fn set_branch_grayed(&mut self, branch_id: Option<&BranchId>, grayed: bool) {
        if self.pending.is_none() {
            return;
        }
        let Some(branch) = branch_id else {
            return;
        };
        for node in &mut self.nodes {
            if node.data.branch_id.as_ref() == Some(branch) {
                node.data.is_grayed = grayed;
            }
        }
        for edge in &mut self.edges {
            if edge.branch_id() == Some(branch) {
                edge.animated = grayed;
                edge_data(edge).is_grayed = grayed;
            }
        }
    }

    /// Commits a branch choice: the chosen branch is adopted by the NOT
    /// gate, every other grayed branch and the doomed gate disappear, and
    /// all gray-out flags are stripped.
    pub fn commit_branch(&mut self, branch_id: Option<&BranchId>) -> Result<(), SessionError> {
        let Some(pending) = self.pending.as_ref() else {
            return Ok(());
        };
        let Some(branch) = branch_id else {
            return Ok(());
        };
        if !pending.branches.contains(branch) {
            tracing::warn!(%branch, "branch not part of the pending proposal");
            return Ok(());
        }
        let doomed_id = pending.doomed_node_id.clone();
        let not_gate_id = pending.not_gate_id.clone();

        // Restrict to the chosen branch plus everything untagged.
        self.nodes.retain(|node| {
            node.data.branch_id.is_none() || node.data.branch_id.as_ref() == Some(branch)
        });
        self.edges
            .retain(|edge| edge.branch_id().is_none() || edge.branch_id() == Some(branch));

        // The surviving branch root is the one remaining child of the
        // doomed gate.
        let mut remaining = self
            .edges
            .iter()
            .filter(|edge| edge.source == doomed_id)
            .map(|edge| edge.target.clone());
        let new_root = match (remaining.next(), remaining.next()) {
            (Some(root), None) => root,
            (first, second) => {
                return Err(SessionError::BrokenInvariant(format!(
                    "expected one surviving child of {doomed_id}, found {:?} and {:?}",
                    first, second
                )));
            }
        };

        self.nodes.retain(|node| node.id != doomed_id);
        self.edges
            .retain(|edge| edge.source != doomed_id && edge.target != doomed_id);
        self.edges.push(Edge::workflow(not_gate_id, new_root));

        self.clear_grayout_flags();
        self.pending = None;
        self.commit(None);
        Ok(())
    }

    /// Drops the proposal and restores the tree to fully solid. Since the
    /// proposal never persisted, neither does the abandonment; the
    /// snapshot taken at proposal time is left in place and undoing it is
    /// a harmless identity restore.
    pub fn abandon_proposal(&mut self) {
        if self.pending.take().is_none() {
            return;
        }
        self.clear_grayout_flags();
    }

    fn clear_grayout_flags(&mut self) {
        for node in &mut self.nodes {
            node.data.is_grayed = false;
            node.data.branch_id = None;
        }
        for edge in &mut self.edges {
            edge.animated = false;
            if let Some(data) = edge.data.as_mut() {
                data.is_grayed = false;
                data.branch_id = None;
                if *data == EdgeData::default() {
                    edge.data = None;
                }
            }
        }
    }
}
