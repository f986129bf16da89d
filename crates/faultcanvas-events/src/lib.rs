//! The UI event surface and the notification surface, as data.
//!
//! The editor core consumes these events; it does not own the widgets that
//! produce them. Notifications travel the other way: validation rejections
//! and persistence failures are published fire-and-forget and rendered by
//! whatever toast surface the shell provides.

use crossbeam_channel::{Receiver, Sender, unbounded};
use faultcanvas_core::{BranchId, EdgeId, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// What the user picked from a node's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ContextMenuAction {
    /// Replace the node's type, reshaping its children as needed.
    Retype { node_type: NodeType },
    /// Splice the node out (or propose a gray-out when ambiguous).
    DeleteNode,
    /// Remove everything below the node and turn it into a basic event.
    DeleteSubtree,
}

/// Which labeled element a text edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelTarget {
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    NodeContextMenu {
        node_id: NodeId,
        action: ContextMenuAction,
    },
    /// Double-clicking a gate appends a basic-event child.
    NodeDoubleClick {
        node_id: NodeId,
    },
    /// Clicking an edge inserts a NOT gate between its endpoints.
    EdgeClick {
        edge_id: EdgeId,
    },

    // Gray-out preview surface; branch ids come from the hovered node's
    // data and may be absent on non-branch (placeholder) nodes.
    GrayedNodeEnter {
        branch_id: Option<BranchId>,
    },
    GrayedNodeLeave {
        branch_id: Option<BranchId>,
    },
    GrayedNodeClick {
        branch_id: Option<BranchId>,
    },

    LabelEdited {
        target: LabelTarget,
        id: String,
        label: String,
    },

    Undo,
    Redo,
}

/// The named validation / failure kinds surfaced to the user. The first
/// four map 1:1 onto the transition engine's validation rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    DeleteRootNode,
    NotGateChild,
    AtleastTwoChildren,
    UpdateRootNode,
    LoadFailed,
    GenericError,
}

impl NotificationKind {
    pub fn message(self) -> &'static str {
        match self {
            NotificationKind::DeleteRootNode => "Cannot delete the root node",
            NotificationKind::NotGateChild => "A NOT gate requires a child",
            NotificationKind::AtleastTwoChildren => "A gate needs at least 2 children",
            NotificationKind::UpdateRootNode => "Cannot update the root node to this type",
            NotificationKind::LoadFailed => "Failed to load the tree, starting from scratch",
            NotificationKind::GenericError => "Something went wrong",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            NotificationKind::DeleteRootNode
            | NotificationKind::NotGateChild
            | NotificationKind::AtleastTwoChildren
            | NotificationKind::UpdateRootNode => Severity::Warning,
            NotificationKind::LoadFailed | NotificationKind::GenericError => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub severity: Severity,
}

impl Notification {
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
        }
    }
}

/// Fire-and-forget notification channel. Cloning hands out additional
/// publishers; a dropped receiver silently discards notifications, which is
/// exactly the fire-and-forget contract.
#[derive(Clone)]
pub struct NotificationBus {
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Notification> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Notification> {
        self.rx.clone()
    }

    pub fn publish(&self, kind: NotificationKind) {
        tracing::debug!(?kind, "notification");
        let _ = self.tx.send(Notification::new(kind));
    }

    pub fn drain(&self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.rx.try_recv() {
            out.push(notification);
        }
        out
    }
}

/// Event channel from the UI surface toward the session.
#[derive(Clone)]
pub struct EventBus {
    tx: Sender<EditorEvent>,
    rx: Receiver<EditorEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<EditorEvent> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<EditorEvent> {
        self.rx.clone()
    }

    pub fn publish(&self, event: EditorEvent) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener, in arrival order.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to editor events.
pub trait EventListener {
    fn handle_event(&mut self, event: &EditorEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_bus_publish_receive() {
        let bus = EventBus::new();
        bus.publish(EditorEvent::NodeContextMenu {
            node_id: NodeId::from("n1"),
            action: ContextMenuAction::Retype {
                node_type: NodeType::AndGate,
            },
        });

        match bus.receiver().recv().unwrap() {
            EditorEvent::NodeContextMenu { node_id, action } => {
                assert_eq!(node_id, NodeId::from("n1"));
                assert_eq!(
                    action,
                    ContextMenuAction::Retype {
                        node_type: NodeType::AndGate
                    }
                );
            }
            other => panic!("expected context menu event, got {other:?}"),
        }
    }

    #[test]
    fn notification_kinds_serialize_kebab_case() {
        let json = serde_json::to_string(&NotificationKind::DeleteRootNode).unwrap();
        assert_eq!(json, r#""delete-root-node""#);
        let json = serde_json::to_string(&NotificationKind::AtleastTwoChildren).unwrap();
        assert_eq!(json, r#""atleast-two-children""#);
    }

    #[test]
    fn validation_kinds_default_to_warnings() {
        assert_eq!(
            Notification::new(NotificationKind::NotGateChild).severity,
            Severity::Warning
        );
        assert_eq!(
            Notification::new(NotificationKind::LoadFailed).severity,
            Severity::Error
        );
    }

    #[test]
    fn notification_bus_drains_in_order() {
        let bus = NotificationBus::new();
        bus.publish(NotificationKind::DeleteRootNode);
        bus.publish(NotificationKind::GenericError);
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, NotificationKind::DeleteRootNode);
        assert_eq!(drained[1].kind, NotificationKind::GenericError);
        assert!(bus.drain().is_empty());
    }
}
