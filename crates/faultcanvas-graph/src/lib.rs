pub mod invariants;
pub mod layout;
pub mod query;
pub mod signature;

pub use invariants::{InvariantViolation, check_invariants};
pub use layout::{
    CancellationToken, LayoutConfig, LayoutTransition, TransitionFrame, compute_layout,
};
pub use query::{Subgraph, connected_edges, incomers, outgoers, subgraph};
pub use signature::{ApplyGuard, should_apply, signature};
