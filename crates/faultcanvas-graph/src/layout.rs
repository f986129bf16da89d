//! Hierarchical tree layout and the animated transition toward it.
//!
//! `compute_layout` is a pure function of `(nodes, edges)`: depth decides
//! the row, leaves are assigned sequential horizontal slots, and every
//! interior node is centered over its children. Re-running it on identical
//! input yields identical positions.
//!
//! `LayoutTransition` is the cancellable per-mutation animation task: it
//! interpolates node positions against wall-clock elapsed time and performs
//! one exact snap to the target once the duration is exceeded.

use faultcanvas_core::constants::{
    LAYOUT_ANIMATION_MS, NODE_HEIGHT, NODE_SEPARATION, NODE_WIDTH,
};
use faultcanvas_core::{Edge, Node, NodeId, Position};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    pub separation: f64,
    pub duration: Duration,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            separation: NODE_SEPARATION,
            duration: Duration::from_millis(LAYOUT_ANIMATION_MS),
        }
    }
}

/// Computes target positions for every node reachable from the root.
///
/// Assumes a well-formed tree (exactly one root, single parent). On
/// malformed input the function logs and returns the nodes unchanged; it
/// does not attempt repair.
pub fn compute_layout(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let targets: HashSet<&NodeId> = edges.iter().map(|edge| &edge.target).collect();
    let mut roots = nodes.iter().filter(|node| !targets.contains(&node.id));
    let root = match (roots.next(), roots.next()) {
        (Some(root), None) => root,
        (first, second) => {
            tracing::warn!(
                first = ?first.map(|n| &n.id),
                second = ?second.map(|n| &n.id),
                "layout precondition violated: expected exactly one root"
            );
            return nodes.to_vec();
        }
    };

    let mut children: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in edges {
        children.entry(&edge.source).or_default().push(&edge.target);
    }

    // Pre-order via explicit stack; walked forward it visits leaves left
    // to right, walked backward it visits children before parents.
    let mut depth: HashMap<&NodeId, usize> = HashMap::new();
    let mut preorder: Vec<&NodeId> = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(&NodeId, usize)> = vec![(&root.id, 0)];
    let mut seen: HashSet<&NodeId> = HashSet::new();
    while let Some((id, level)) = stack.pop() {
        if !seen.insert(id) {
            tracing::warn!(%id, "layout precondition violated: revisited node");
            continue;
        }
        depth.insert(id, level);
        preorder.push(id);
        if let Some(kids) = children.get(id) {
            for kid in kids.iter().rev() {
                stack.push((kid, level + 1));
            }
        }
    }

    let slot_width = config.node_width * config.separation;
    let mut x: HashMap<&NodeId, f64> = HashMap::new();

    // Leaves take sequential slots in pre-order, so siblings sit left to
    // right in edge order.
    let mut next_slot = 0usize;
    for id in &preorder {
        if children.get(*id).filter(|kids| !kids.is_empty()).is_none() {
            x.insert(id, next_slot as f64 * slot_width);
            next_slot += 1;
        }
    }

    // Reversed, pre-order yields children before parents, so every
    // interior node centers over positions already assigned.
    for id in preorder.iter().rev() {
        if let Some(kids) = children.get(*id).filter(|kids| !kids.is_empty()) {
            let first = x.get(kids[0]).copied().unwrap_or(0.0);
            let last = x.get(kids[kids.len() - 1]).copied().unwrap_or(first);
            x.insert(id, (first + last) / 2.0);
        }
    }

    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            match (x.get(&node.id), depth.get(&node.id)) {
                (Some(&slot_x), Some(&level)) => {
                    node.position = Position::new(slot_x, level as f64 * config.node_height);
                }
                _ => {
                    tracing::warn!(id = %node.id, "node unreachable from root, keeping position");
                }
            }
            node
        })
        .collect()
}

/// Cooperative stop flag shared between the session and an in-flight
/// layout animation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
struct Motion {
    node: Node,
    from: Position,
    to: Position,
}

/// One frame of an animated layout transition. Every frame carries a
/// complete node array, so a superseded animation can never leave behind a
/// partially written snapshot.
#[derive(Debug, Clone)]
pub enum TransitionFrame {
    /// The animation was cancelled or has already delivered its final
    /// frame; the caller should drop the transition.
    Cancelled,
    Active {
        nodes: Vec<Node>,
    },
    Completed {
        nodes: Vec<Node>,
        /// One-shot viewport focus request, delivered exactly once.
        focus: Option<NodeId>,
    },
}

#[derive(Debug)]
pub struct LayoutTransition {
    motions: Vec<Motion>,
    duration: Duration,
    started: Instant,
    token: CancellationToken,
    focus: Option<NodeId>,
    finished: bool,
}

impl LayoutTransition {
    /// Starts a transition from the currently displayed positions toward
    /// `target`. Nodes without a current position (freshly created) appear
    /// directly at their target.
    pub fn start(
        current: &[Node],
        target: Vec<Node>,
        duration: Duration,
        focus: Option<NodeId>,
    ) -> Self {
        let current_positions: HashMap<&NodeId, Position> =
            current.iter().map(|node| (&node.id, node.position)).collect();
        let motions = target
            .into_iter()
            .map(|node| {
                let from = current_positions
                    .get(&node.id)
                    .copied()
                    .unwrap_or(node.position);
                let to = node.position;
                Motion { node, from, to }
            })
            .collect();

        Self {
            motions,
            duration,
            started: Instant::now(),
            token: CancellationToken::new(),
            focus,
            finished: false,
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the animation using the caller's wall clock.
    pub fn tick(&mut self) -> TransitionFrame {
        self.frame(self.started.elapsed())
    }

    /// Computes the frame for the given elapsed time. Linear interpolation
    /// up to the duration, then a single exact snap to the targets so
    /// floating-point drift never accumulates into the final state.
    pub fn frame(&mut self, elapsed: Duration) -> TransitionFrame {
        if self.finished || self.token.is_cancelled() {
            return TransitionFrame::Cancelled;
        }

        if elapsed > self.duration {
            self.finished = true;
            let nodes = self
                .motions
                .iter()
                .map(|motion| {
                    let mut node = motion.node.clone();
                    node.position = motion.to;
                    node
                })
                .collect();
            return TransitionFrame::Completed {
                nodes,
                focus: self.focus.take(),
            };
        }

        let s = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let nodes = self
            .motions
            .iter()
            .map(|motion| {
                let mut node = motion.node.clone();
                node.position = Position::new(
                    motion.from.x + (motion.to.x - motion.from.x) * s,
                    motion.from.y + (motion.to.y - motion.from.y) * s,
                );
                node
            })
            .collect();
        TransitionFrame::Active { nodes }
    }
}
