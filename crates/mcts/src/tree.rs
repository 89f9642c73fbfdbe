//! Arena-allocated MCTS tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>>. Nodes are
//! only ever appended; the whole arena is dropped with the tree.

use crate::node::{Node, NodeId};
use arcade_core::GameState;

/// Arena-allocated MCTS tree rooted at one decision's starting state.
#[derive(Clone, Debug)]
pub struct Tree<S: GameState> {
    nodes: Vec<Node<S>>,
}

impl<S: GameState> Tree<S> {
    /// Create a tree holding only a root for `state`.
    pub fn new(state: S) -> Self {
        Self {
            nodes: vec![Node::root(state)],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.0]
    }

    /// Build a child of `parent` from an already advanced state and
    /// install it in the given slot, returning its ID.
    pub fn attach(&mut self, parent: NodeId, slot: usize, state: S, action: S::Action) -> NodeId {
        let parent_depth = self.get(parent).depth();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::child(state, parent, parent_depth, action));
        self.get_mut(parent).set_child(slot, id);
        id
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (never true, the root always exists).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<S> {
        self.get(NodeId::ROOT)
    }

    /// Iterate over every node ID in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Walk from `id` up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, S> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Materialized children of a node as `(slot, id)` pairs.
    pub fn materialized_children(&self, id: NodeId) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.get(id)
            .children()
            .iter()
            .enumerate()
            .filter_map(|(slot, child)| child.map(|c| (slot, c)))
    }
}

/// Iterator over a node and its ancestors, ending at the root.
pub struct Ancestors<'a, S: GameState> {
    tree: &'a Tree<S>,
    next: Option<NodeId>,
}

impl<S: GameState> Iterator for Ancestors<'_, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.get(current).parent();
        Some(current)
    }
}
