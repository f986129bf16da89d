//! Shared layout and editing constants.

/// The root node id is fixed per document and never deleted.
pub const ROOT_NODE_ID: &str = "1";

/// Horizontal footprint of a node in the hierarchical layout.
pub const NODE_WIDTH: f64 = 180.0;

/// Vertical distance between tree levels.
pub const NODE_HEIGHT: f64 = 150.0;

/// Uniform multiplier applied between siblings.
pub const NODE_SEPARATION: f64 = 1.25;

/// Duration of the animated transition toward a freshly computed layout.
pub const LAYOUT_ANIMATION_MS: u64 = 300;

/// Quiet period after which a label edit is persisted.
pub const LABEL_QUIET_PERIOD_MS: u64 = 500;

/// Maximum undo/redo snapshots retained per session.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
