//! Routes UI events to the session's operations.

use std::time::Instant;

use faultcanvas_events::{EditorEvent, EventListener};

use crate::SessionError;
use crate::session::TreeGraphSession;

impl TreeGraphSession {
    pub fn dispatch(&mut self, event: &EditorEvent) -> Result<(), SessionError> {
        match event {
            EditorEvent::NodeContextMenu { node_id, action } => {
                self.handle_context_menu(node_id, *action)
            }
            EditorEvent::NodeDoubleClick { node_id } => self.handle_double_click(node_id),
            EditorEvent::EdgeClick { edge_id } => self.handle_edge_click(edge_id),
            EditorEvent::GrayedNodeEnter { branch_id } => {
                self.preview_enter(branch_id.as_ref());
                Ok(())
            }
            EditorEvent::GrayedNodeLeave { branch_id } => {
                self.preview_leave(branch_id.as_ref());
                Ok(())
            }
            EditorEvent::GrayedNodeClick { branch_id } => self.commit_branch(branch_id.as_ref()),
            EditorEvent::LabelEdited { target, id, label } => {
                self.edit_label(*target, id, label, Instant::now());
                Ok(())
            }
            EditorEvent::Undo => {
                self.undo();
                Ok(())
            }
            EditorEvent::Redo => {
                self.redo();
                Ok(())
            }
        }
    }
}

impl EventListener for TreeGraphSession {
    fn handle_event(&mut self, event: &EditorEvent) {
        if let Err(error) = self.dispatch(event) {
            tracing::error!(%error, "event rejected");
        }
    }
}
