//! The editor session: live graph state plus every interactive mutation.
//!
//! A [`TreeGraphSession`] owns one tree's nodes and edges and applies the
//! context-menu transitions, gray-out deletion proposals, insertions,
//! label edits and undo/redo on top of them. Each structural commit
//! recomputes the layout, starts an animated transition toward it and
//! persists the document through the configured [`GraphStore`].

use thiserror::Error;

mod dispatch;
mod grayout;
mod history;
mod insert;
mod label;
mod session;
mod transition;


pub use grayout::PendingDeletionProposal;
pub use history::{GraphSnapshot, UndoRedoManager};
pub use label::LabelDebouncer;
pub use session::TreeGraphSession;

#[doc(no_inline)]
pub use faultcanvas_storage::GraphStore;

#[derive(Error, Debug)]
pub enum SessionError {
    /// A gray-out deletion proposal is already awaiting a branch decision.
    #[error("a deletion proposal is already pending")]
    ProposalPending,
    /// The graph reached a state a committed tree must never be in.
    #[error("graph invariant broken: {0}")]
    BrokenInvariant(String),
}
