//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices: a node's parent is stored as a
//! `NodeId`, so upward traversal never needs shared ownership.

use arcade_core::GameState;

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Using indices instead of pointers avoids Rc/RefCell overhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Statistics for a single MCTS node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStats {
    /// Number of iterations whose backpropagation passed through this node.
    pub visit_count: u32,

    /// Sum of rewards from all those iterations (not averaged).
    pub total_reward: f64,
}

impl NodeStats {
    /// Mean reward per visit.
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn mean_reward(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.visit_count)
        }
    }
}

/// A node in the MCTS tree.
///
/// Owns the snapshot of the position it represents. The child slots are
/// sized from that snapshot's legal actions when the node is built and
/// never grow or shrink afterwards.
#[derive(Clone, Debug)]
pub struct Node<S: GameState> {
    state: S,

    /// Legal actions at `state`, in enumeration order. Slot `i` of
    /// `children` is reached by `actions[i]`.
    actions: Vec<S::Action>,

    children: Vec<Option<NodeId>>,

    /// Action that led to this node (None for root).
    action: Option<S::Action>,

    parent: Option<NodeId>,

    depth: usize,

    pub stats: NodeStats,
}

impl<S: GameState> Node<S> {
    /// Create the root node of a search.
    pub fn root(state: S) -> Self {
        Self::build(state, None, None, 0)
    }

    /// Create a node reached from `parent` (at `parent_depth`) by `action`.
    pub fn child(state: S, parent: NodeId, parent_depth: usize, action: S::Action) -> Self {
        Self::build(state, Some(parent), Some(action), parent_depth + 1)
    }

    fn build(state: S, parent: Option<NodeId>, action: Option<S::Action>, depth: usize) -> Self {
        let actions = state.available_actions();
        let children = vec![None; actions.len()];
        Self {
            state,
            actions,
            children,
            action,
            parent,
            depth,
            stats: NodeStats::default(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn actions(&self) -> &[S::Action] {
        &self.actions
    }

    pub fn children(&self) -> &[Option<NodeId>] {
        &self.children
    }

    pub fn action(&self) -> Option<S::Action> {
        self.action
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Index of the first child slot not yet materialized.
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.children.iter().position(Option::is_none)
    }

    /// True when every child slot holds a node (vacuously true for leaves).
    pub fn is_fully_expanded(&self) -> bool {
        self.first_empty_slot().is_none()
    }

    /// Install a child in an empty slot.
    pub(crate) fn set_child(&mut self, slot: usize, child: NodeId) {
        debug_assert!(self.children[slot].is_none(), "child slot {} already filled", slot);
        self.children[slot] = Some(child);
    }
}
