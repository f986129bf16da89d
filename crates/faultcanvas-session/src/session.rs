//! Session state and the commit/relayout/persist spine shared by every
//! mutation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use faultcanvas_core::constants::{DEFAULT_HISTORY_LIMIT, LABEL_QUIET_PERIOD_MS};
use faultcanvas_core::{
    Edge, EdgeData, EdgeId, GraphDocument, Node, NodeId, NodeType, Position, TreeKind,
};
use faultcanvas_events::{LabelTarget, NotificationBus, NotificationKind};
use faultcanvas_graph::{
    ApplyGuard, LayoutConfig, LayoutTransition, TransitionFrame, check_invariants, compute_layout,
};
use faultcanvas_storage::GraphStore;
use uuid::Uuid;

use crate::grayout::PendingDeletionProposal;
use crate::history::{GraphSnapshot, UndoRedoManager};
use crate::label::LabelDebouncer;

pub struct TreeGraphSession {
    pub(crate) tree_id: String,
    pub(crate) kind: TreeKind,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) history: UndoRedoManager,
    pub(crate) pending: Option<PendingDeletionProposal>,
    pub(crate) transition: Option<LayoutTransition>,
    pub(crate) guard: ApplyGuard,
    pub(crate) labels: LabelDebouncer,
    pub(crate) layout: LayoutConfig,
    pub(crate) store: Arc<dyn GraphStore>,
    pub(crate) notifications: NotificationBus,
}

impl TreeGraphSession {
    pub fn new(
        tree_id: impl Into<String>,
        kind: TreeKind,
        store: Arc<dyn GraphStore>,
        notifications: NotificationBus,
    ) -> Self {
        Self {
            tree_id: tree_id.into(),
            kind,
            nodes: Vec::new(),
            edges: Vec::new(),
            history: UndoRedoManager::new(DEFAULT_HISTORY_LIMIT),
            pending: None,
            transition: None,
            guard: ApplyGuard::new(),
            labels: LabelDebouncer::new(Duration::from_millis(LABEL_QUIET_PERIOD_MS)),
            layout: LayoutConfig::default(),
            store,
            notifications,
        }
    }

    /// Fetches the persisted document and applies it, falling back to the
    /// starter graph when the store has nothing usable. A re-fetch that is
    /// structurally identical to the live graph is skipped entirely so it
    /// cannot restart the layout animation.
    pub fn load(&mut self) {
        let document = match self.store.fetch_graph(&self.tree_id) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(tree_id = %self.tree_id, %error, "fetch failed");
                self.notify(NotificationKind::LoadFailed);
                GraphDocument::empty(&self.tree_id, self.kind)
            }
        };

        let seeded = document.is_empty();
        let document = if seeded {
            GraphDocument::starter(&self.tree_id, self.kind)
        } else {
            document
        };

        if !self.guard.check(&document.nodes, &document.edges) {
            tracing::debug!(tree_id = %self.tree_id, "fetched graph unchanged, not reapplied");
            return;
        }

        self.kind = document.kind;
        self.nodes = document.nodes;
        self.edges = document.edges;
        self.pending = None;
        self.history.clear();
        self.relayout(None);

        // A seeded starter tree is written back so it shows up in the
        // store's listing; the guard re-records the laid-out positions
        // first so the next fetch is not treated as a new document.
        if seeded {
            self.guard.check(&self.nodes, &self.edges);
            self.persist();
        }
    }

    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn pending_proposal(&self) -> Option<&PendingDeletionProposal> {
        self.pending.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn document(&self) -> GraphDocument {
        GraphDocument {
            tree_id: self.tree_id.clone(),
            kind: self.kind,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    pub fn find_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    pub(crate) fn find_node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == *id)
    }

    pub fn find_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == *id)
    }

    pub(crate) fn notify(&self, kind: NotificationKind) {
        self.notifications.publish(kind);
    }

    pub(crate) fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    pub(crate) fn record_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    /// Finishes a structural mutation: records the new signature, lays the
    /// tree out, animates toward it and persists.
    pub(crate) fn commit(&mut self, focus: Option<NodeId>) {
        debug_assert!(
            check_invariants(&self.nodes, &self.edges, self.pending.is_some()).is_empty(),
            "committed graph violates tree invariants: {:?}",
            check_invariants(&self.nodes, &self.edges, self.pending.is_some())
        );
        self.relayout(focus);
        // signature and store both see the laid-out positions, so a
        // subsequent refetch of this exact document is skipped
        self.guard.check(&self.nodes, &self.edges);
        self.persist();
    }

    /// Computes the target layout, replaces live positions with it and
    /// starts an animation from the previously displayed positions. A
    /// superseded in-flight animation is cancelled first.
    pub(crate) fn relayout(&mut self, focus: Option<NodeId>) {
        if let Some(active) = self.transition.take() {
            active.cancel();
        }
        let target = compute_layout(&self.nodes, &self.edges, &self.layout);
        self.transition = Some(LayoutTransition::start(
            &self.nodes,
            target.clone(),
            self.layout.duration,
            focus,
        ));
        self.nodes = target;
    }

    /// Advances the layout animation; the returned frame is what a
    /// renderer should display. Completed and cancelled transitions are
    /// dropped, and a completion carries the one-shot focus request.
    pub fn tick(&mut self) -> Option<TransitionFrame> {
        let transition = self.transition.as_mut()?;
        let frame = transition.tick();
        match frame {
            TransitionFrame::Active { .. } => {}
            TransitionFrame::Completed { .. } | TransitionFrame::Cancelled => {
                self.transition = None;
            }
        }
        Some(frame)
    }

    /// Writes the document through the store. Failure is surfaced as a
    /// notification and logged; the in-memory session keeps editing.
    pub(crate) fn persist(&mut self) {
        // a full write covers any label edit still waiting on its debounce
        self.labels.reset();
        if let Err(error) = self.store.store_graph(&self.document()) {
            tracing::warn!(tree_id = %self.tree_id, %error, "persist failed");
            self.notify(NotificationKind::GenericError);
        }
    }

    pub fn undo(&mut self) -> bool {
        // stacks carry committed state only, so flags come off first
        self.abandon_proposal();
        let current = self.snapshot();
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        self.apply_snapshot(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.abandon_proposal();
        let current = self.snapshot();
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        self.apply_snapshot(next);
        true
    }

    fn apply_snapshot(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.pending = None;
        self.relayout(None);
        self.guard.check(&self.nodes, &self.edges);
        self.persist();
    }

    /// Updates a label in place and arms the debounced persist.
    pub fn edit_label(&mut self, target: LabelTarget, id: &str, label: &str, now: Instant) {
        let updated = match target {
            LabelTarget::Node => {
                if let Some(node) = self.find_node_mut(&NodeId::from(id)) {
                    node.data.label = Some(label.to_owned());
                    true
                } else {
                    false
                }
            }
            LabelTarget::Edge => {
                let edge_id = EdgeId::from(id);
                if let Some(edge) = self.edges.iter_mut().find(|edge| edge.id == edge_id) {
                    edge.data.get_or_insert_with(EdgeData::default).label =
                        Some(label.to_owned());
                    true
                } else {
                    false
                }
            }
        };
        if updated {
            self.labels.touch(now);
        }
    }

    /// Persists pending label edits once their quiet period has elapsed.
    /// Returns whether a flush happened. While a gray-out proposal is
    /// pending the flush waits, so preview flags never reach storage.
    pub fn flush_labels(&mut self, now: Instant) -> bool {
        if self.pending.is_some() {
            return false;
        }
        if self.labels.take_due(now) {
            self.persist();
            true
        } else {
            false
        }
    }

    pub(crate) fn new_basic_event(&self, position: Position) -> Node {
        let mut node = Node::new(Uuid::new_v4().to_string(), NodeType::BasicEvent);
        node.position = position;
        node
    }

    pub(crate) fn new_not_gate(&self, position: Position) -> Node {
        let mut node = Node::new(Uuid::new_v4().to_string(), NodeType::NotGate);
        node.position = position;
        node
    }
}
