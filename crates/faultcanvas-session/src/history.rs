//! Bounded undo/redo over whole-graph snapshots.
//!
//! Snapshots are taken once per user-visible structural mutation, before
//! the mutation applies. The stacks hold committed state only; gray-out
//! flags never appear in a snapshot because proposals snapshot before
//! tagging.

use faultcanvas_core::{Edge, Node};

#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }
}

#[derive(Debug)]
pub struct UndoRedoManager {
    past: Vec<GraphSnapshot>,
    future: Vec<GraphSnapshot>,
    limit: usize,
}

impl UndoRedoManager {
    pub fn new(limit: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            limit,
        }
    }

    /// Pushes the pre-mutation state and discards any redo branch. When
    /// the stack is full the oldest snapshot falls off the bottom.
    pub fn record(&mut self, snapshot: GraphSnapshot) {
        if self.past.len() == self.limit {
            self.past.remove(0);
        }
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Steps back one snapshot, parking `current` on the redo stack.
    pub fn undo(&mut self, current: GraphSnapshot) -> Option<GraphSnapshot> {
        let previous = self.past.pop()?;
        self.future.push(current);
        Some(previous)
    }

    /// Re-applies the most recently undone snapshot.
    pub fn redo(&mut self, current: GraphSnapshot) -> Option<GraphSnapshot> {
        let next = self.future.pop()?;
        self.past.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultcanvas_core::{Node, NodeType, starter_edges, starter_nodes};

    fn snapshot(marker: &str) -> GraphSnapshot {
        GraphSnapshot::new(vec![Node::new(marker, NodeType::BasicEvent)], Vec::new())
    }

    #[test]
    fn undo_then_redo_restores_both_states() {
        let mut history = UndoRedoManager::new(10);
        let before = GraphSnapshot::new(starter_nodes(), starter_edges());
        history.record(before.clone());

        let after = snapshot("after");
        let restored = history.undo(after.clone()).unwrap();
        assert_eq!(restored, before);
        assert!(history.can_redo());

        let replayed = history.redo(before.clone()).unwrap();
        assert_eq!(replayed, after);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn record_discards_the_redo_branch() {
        let mut history = UndoRedoManager::new(10);
        history.record(snapshot("a"));
        history.undo(snapshot("b")).unwrap();
        assert!(history.can_redo());

        history.record(snapshot("c"));
        assert!(!history.can_redo());
    }

    #[test]
    fn capacity_drops_the_oldest_snapshot() {
        let mut history = UndoRedoManager::new(2);
        history.record(snapshot("a"));
        history.record(snapshot("b"));
        history.record(snapshot("c"));

        assert_eq!(history.undo(snapshot("live")).unwrap(), snapshot("c"));
        assert_eq!(history.undo(snapshot("c")).unwrap(), snapshot("b"));
        assert!(history.undo(snapshot("b")).is_none());
    }

    #[test]
    fn undo_on_empty_history_leaves_redo_untouched() {
        let mut history = UndoRedoManager::new(4);
        assert!(history.undo(snapshot("live")).is_none());
        assert!(!history.can_redo());
    }
}
