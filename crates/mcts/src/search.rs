//! Monte Carlo Tree Search implementation.
//!
//! Each iteration runs select -> expand -> evaluate -> backpropagate on an
//! arena tree rebuilt from scratch for every decision. The loop is anytime:
//! it stops when the remaining budget drops under the iteration margin and
//! always returns an action the root state allows.

use crate::{
    clock::Deadline,
    config::{DecisionRule, MctsConfig},
    evaluator::Evaluator,
    node::{NodeId, NodeStats},
    tree::Tree,
};
use arcade_core::{action_at, ArcadeError, GameState, Result};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, trace};

/// Statistics of one root slot after a search.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildSummary<A> {
    pub action: A,

    /// `None` if the slot was never materialized.
    pub stats: Option<NodeStats>,
}

/// Result of an MCTS search.
#[derive(Clone, Debug)]
pub struct SearchResult<A> {
    /// Action chosen by the configured decision rule.
    pub best_action: A,

    /// Root slot of `best_action`.
    pub best_slot: usize,

    /// True when no root child was materialized and the last enumerated
    /// action was returned by default.
    pub fallback: bool,

    /// Completed iterations (equals the root's visit count).
    pub iterations: u32,

    /// Nodes in the tree, root included.
    pub nodes: usize,

    pub elapsed: Duration,

    /// One entry per root slot, in enumeration order.
    pub children: Vec<ChildSummary<A>>,
}

/// Where tree descent stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Selection {
    /// `slot` of `parent` is empty and should be materialized.
    Expand { parent: NodeId, slot: usize },

    /// Terminal, depth-capped or action-less node to evaluate as is.
    Leaf(NodeId),
}

/// UCT score of a child seen from its parent.
///
/// `(total / n) + weight * sqrt(2 * ln(parent_visits) / n)`. Only defined
/// for visited children; the search guarantees `n >= 1` by materializing
/// every slot of a node before scoring any of them.
pub fn uct_value(parent_visits: u32, child: &NodeStats, weight: f64) -> f64 {
    let n = f64::from(child.visit_count);
    let exploration = (2.0 * f64::from(parent_visits).ln() / n).sqrt();
    child.total_reward / n + weight * exploration
}

/// Anytime Monte Carlo Tree Search with UCT selection.
///
/// Generic over:
/// - `S`: The game state being searched
/// - `E`: The evaluation strategy (rollouts plus heuristics)
/// - `R`: The random number generator used by evaluation
pub struct Mcts<S: GameState, E, R> {
    config: MctsConfig,
    evaluator: E,
    rng: R,

    /// Tree of the most recent search, replaced by the next one.
    tree: Option<Tree<S>>,
}

impl<S, E, R> Mcts<S, E, R>
where
    S: GameState,
    E: Evaluator<S>,
    R: Rng,
{
    /// Create a new MCTS instance.
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Self {
        Self {
            config,
            evaluator,
            rng,
            tree: None,
        }
    }

    /// Tree built by the last call to `search` or `decide`.
    pub fn tree(&self) -> Option<&Tree<S>> {
        self.tree.as_ref()
    }

    /// Pick the next action for `state` within `budget`.
    ///
    /// # Errors
    /// Returns `ArcadeError::NoLegalActions` if `state` offers no action.
    pub fn decide(&mut self, state: &S, budget: Duration) -> Result<S::Action> {
        self.search(state, budget).map(|result| result.best_action)
    }

    /// Run MCTS from `state` for at most `budget`, returning search results.
    pub fn search(&mut self, state: &S, budget: Duration) -> Result<SearchResult<S::Action>> {
        self.search_until(state, Deadline::new(budget))
    }

    /// Run MCTS from `state` until `deadline` (or the iteration cap).
    pub fn search_until(
        &mut self,
        state: &S,
        deadline: Deadline,
    ) -> Result<SearchResult<S::Action>> {
        self.tree = None;
        let mut tree = Tree::new(state.clone());

        if tree.root().actions().is_empty() {
            return Err(ArcadeError::NoLegalActions);
        }

        let margin = self.config.iteration_margin();
        let mut iterations: u32 = 0;

        while deadline.has_at_least(margin)
            && self.config.max_iterations.map_or(true, |max| iterations < max)
        {
            self.iterate(&mut tree, &deadline)?;
            iterations += 1;
        }

        let result = self.extract(&tree, iterations, deadline.elapsed())?;

        debug!(
            iterations,
            nodes = result.nodes,
            elapsed_us = result.elapsed.as_micros() as u64,
            slot = result.best_slot,
            fallback = result.fallback,
            "search finished"
        );

        self.tree = Some(tree);
        Ok(result)
    }

    /// Run a single iteration: select -> expand -> evaluate -> backpropagate.
    fn iterate(&mut self, tree: &mut Tree<S>, deadline: &Deadline) -> Result<()> {
        let leaf = match self.select(tree) {
            Selection::Expand { parent, slot } => Self::expand(tree, parent, slot)?,
            Selection::Leaf(id) => id,
        };

        let node = tree.get(leaf);
        let value = self
            .evaluator
            .evaluate(node.state(), node.depth(), deadline, &mut self.rng);

        Self::backpropagate(tree, leaf, value);
        Ok(())
    }

    /// Descend from the root until a node has an empty slot, or is a
    /// terminal / depth-capped / action-less leaf.
    ///
    /// Every child of a node is materialized before any of them is
    /// descended into, which is what keeps `uct_value` away from
    /// unvisited children.
    fn select(&self, tree: &Tree<S>) -> Selection {
        let mut current = NodeId::ROOT;

        loop {
            let node = tree.get(current);
            if node.state().is_terminal() || node.depth() >= self.config.expansion_depth {
                return Selection::Leaf(current);
            }

            if let Some(slot) = node.first_empty_slot() {
                return Selection::Expand {
                    parent: current,
                    slot,
                };
            }

            match self.best_child(tree, current) {
                Some(child) => current = child,
                None => return Selection::Leaf(current),
            }
        }
    }

    /// Materialize `slot` of `parent` with one state transition.
    fn expand(tree: &mut Tree<S>, parent: NodeId, slot: usize) -> Result<NodeId> {
        let node = tree.get(parent);
        let action = action_at(node.actions(), slot)?;
        let mut state = node.state().clone();
        state.advance(action);
        Ok(tree.attach(parent, slot, state, action))
    }

    /// Child of a fully expanded node with the highest UCT value.
    ///
    /// Scans slots in order and keeps the first strictly better value. The
    /// running best starts at the last slot, so it is only returned when
    /// no child scores above `f64::MIN` (e.g. every value is NaN).
    /// Returns `None` for a node with no slots.
    fn best_child(&self, tree: &Tree<S>, id: NodeId) -> Option<NodeId> {
        let node = tree.get(id);
        debug_assert!(node.is_fully_expanded(), "UCT on a partially expanded node");

        let mut best = (*node.children().last()?)?;
        let mut best_value = f64::MIN;
        let parent_visits = node.stats.visit_count;

        for &child in node.children().iter().flatten() {
            let value = uct_value(
                parent_visits,
                &tree.get(child).stats,
                self.config.exploration_weight,
            );
            if value > best_value {
                best_value = value;
                best = child;
            }
        }

        Some(best)
    }

    /// Add one visit and `value` to `from` and each of its ancestors.
    fn backpropagate(tree: &mut Tree<S>, from: NodeId, value: f64) {
        let path: Vec<NodeId> = tree.ancestors(from).collect();
        for id in path {
            let stats = &mut tree.get_mut(id).stats;
            stats.visit_count += 1;
            stats.total_reward += value;
        }
    }

    /// Read the recommended action off the root's materialized children.
    fn extract(
        &self,
        tree: &Tree<S>,
        iterations: u32,
        elapsed: Duration,
    ) -> Result<SearchResult<S::Action>> {
        let root = tree.root();

        let children: Vec<ChildSummary<S::Action>> = root
            .actions()
            .iter()
            .zip(root.children())
            .map(|(&action, child)| ChildSummary {
                action,
                stats: child.map(|id| tree.get(id).stats),
            })
            .collect();

        let rank = |stats: &NodeStats| match self.config.decision_rule {
            DecisionRule::TotalReward => stats.total_reward,
            DecisionRule::MeanReward => stats.mean_reward(),
        };

        // Default to the last enumerated action when nothing was expanded
        let mut best_slot = children.len().saturating_sub(1);
        let mut best_value = f64::MIN;
        for (slot, summary) in children.iter().enumerate() {
            if let Some(stats) = &summary.stats {
                let value = rank(stats);
                if value > best_value {
                    best_value = value;
                    best_slot = slot;
                }
            }
        }

        let fallback = children.iter().all(|c| c.stats.is_none());
        if fallback {
            trace!(slot = best_slot, "no root child expanded, using default action");
        }

        Ok(SearchResult {
            best_action: action_at(root.actions(), best_slot)?,
            best_slot,
            fallback,
            iterations,
            nodes: tree.len(),
            elapsed,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::RolloutEvaluator;
    use crate::games::{Counter, CounterAction, GridChase};
    use arcade_core::Outcome;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LONG_BUDGET: Duration = Duration::from_secs(10);

    fn create_mcts<S: GameState>(
        config: MctsConfig,
        seed: u64,
    ) -> Mcts<S, RolloutEvaluator, ChaCha8Rng> {
        let evaluator = RolloutEvaluator::from_config(&config);
        Mcts::new(config, evaluator, ChaCha8Rng::seed_from_u64(seed))
    }

    // Never-ending game with three actions and no reward.
    #[derive(Clone)]
    struct Walker;

    impl GameState for Walker {
        type Action = u8;

        fn available_actions(&self) -> Vec<u8> {
            vec![0, 1, 2]
        }

        fn advance(&mut self, _action: u8) {}

        fn is_terminal(&self) -> bool {
            false
        }

        fn score(&self) -> f64 {
            0.0
        }

        fn outcome(&self) -> Outcome {
            Outcome::Ongoing
        }
    }

    // Action 1 strands the game: not over, but nothing left to do. Only
    // stranding on the first move scores.
    #[derive(Clone)]
    struct Strandable {
        waited: u32,
        stranded: bool,
    }

    impl GameState for Strandable {
        type Action = u8;

        fn available_actions(&self) -> Vec<u8> {
            if self.stranded {
                Vec::new()
            } else {
                vec![0, 1]
            }
        }

        fn advance(&mut self, action: u8) {
            if action == 1 {
                self.stranded = true;
            } else {
                self.waited += 1;
            }
        }

        fn is_terminal(&self) -> bool {
            false
        }

        fn score(&self) -> f64 {
            if self.stranded && self.waited == 0 {
                50.0
            } else {
                0.0
            }
        }

        fn outcome(&self) -> Outcome {
            Outcome::Ongoing
        }
    }

    #[test]
    fn test_stranded_node_is_evaluated_as_leaf() {
        let mut mcts = create_mcts(MctsConfig::with_iterations(200), 5);
        let result = mcts
            .search(
                &Strandable {
                    waited: 0,
                    stranded: false,
                },
                LONG_BUDGET,
            )
            .unwrap();

        assert_eq!(result.iterations, 200);
        assert_eq!(result.best_action, 1);

        let tree = mcts.tree().unwrap();
        assert_eq!(tree.root().stats.visit_count, 200);

        let stranded = tree.root().children()[1].unwrap();
        let node = tree.get(stranded);
        assert!(node.children().is_empty());
        assert_eq!(tree.materialized_children(stranded).count(), 0);
        assert!(node.stats.visit_count > 1);

        // Every visit scores the stranded state itself, no playout
        let expected = 50.0 * f64::from(node.stats.visit_count);
        assert_eq!(node.stats.total_reward, expected);
    }

    #[test]
    fn test_counter_prefers_increment() {
        let mut mcts = create_mcts(MctsConfig::with_iterations(50), 42);
        let result = mcts.search(&Counter::new(), LONG_BUDGET).unwrap();

        assert_eq!(result.iterations, 50);
        assert_eq!(result.best_action, CounterAction::Increment);
        assert_eq!(result.best_slot, 0);
        assert!(!result.fallback);

        let tree = mcts.tree().unwrap();
        assert_eq!(tree.root().stats.visit_count, 50);

        // Winning leaves contribute the win constant exactly once per visit
        let mut winning_leaves = 0;
        for id in tree.ids() {
            let node = tree.get(id);
            if node.state().outcome() == Outcome::Win {
                winning_leaves += 1;
                let expected = f64::from(node.stats.visit_count) * 100_000.0;
                assert_eq!(node.stats.total_reward, expected);
            }
        }
        assert_eq!(winning_leaves, 1);
    }

    #[test]
    fn test_stop_branch_only_collects_losses() {
        let mut mcts = create_mcts(MctsConfig::with_iterations(50), 3);
        let result = mcts.search(&Counter::new(), LONG_BUDGET).unwrap();

        let stop = result.children[1].stats.unwrap();
        assert_eq!(stop.total_reward, -5_000.0 * f64::from(stop.visit_count));
    }

    #[test]
    fn test_uct_after_first_round_is_finite() {
        let state = GridChase::demo();
        let width = state.available_actions().len() as u32;
        let mut mcts = create_mcts(MctsConfig::with_iterations(width), 11);
        mcts.search(&state, LONG_BUDGET).unwrap();

        let tree = mcts.tree().unwrap();
        let root = tree.root();
        assert!(root.is_fully_expanded());
        assert_eq!(root.stats.visit_count, width);

        for (_, child) in tree.materialized_children(NodeId::ROOT) {
            let stats = tree.get(child).stats;
            assert_eq!(stats.visit_count, 1);
            let value = uct_value(root.stats.visit_count, &stats, 0.1);
            assert!(value.is_finite(), "non-finite UCT value {}", value);
        }

        // The next selection goes through UCT at the root
        assert!(mcts.best_child(tree, NodeId::ROOT).is_some());
        assert!(matches!(mcts.select(tree), Selection::Expand { .. }));
    }

    #[test]
    fn test_uct_single_visit_parent() {
        let stats = NodeStats {
            visit_count: 1,
            total_reward: 4.0,
        };
        // ln(1) = 0: exploration vanishes, no NaN
        assert_eq!(uct_value(1, &stats, 0.1), 4.0);
    }

    #[test]
    fn test_zero_budget_falls_back_to_last_action() {
        let state = GridChase::demo();
        let mut mcts = create_mcts(MctsConfig::default(), 0);
        let result = mcts.search(&state, Duration::ZERO).unwrap();

        let actions = state.available_actions();
        assert!(result.fallback);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.nodes, 1);
        assert_eq!(result.best_slot, actions.len() - 1);
        assert_eq!(result.best_action, *actions.last().unwrap());
    }

    #[test]
    fn test_no_legal_actions() {
        let mut state = Counter::new();
        state.advance(CounterAction::Stop);

        let mut mcts = create_mcts(MctsConfig::default(), 0);
        let err = mcts.decide(&state, LONG_BUDGET).unwrap_err();
        assert_eq!(err, ArcadeError::NoLegalActions);
        assert!(mcts.tree().is_none());
    }

    #[test]
    fn test_tree_respects_depth_cap() {
        let config = MctsConfig {
            expansion_depth: 3,
            max_iterations: Some(200),
            ..Default::default()
        };
        let mut mcts = create_mcts(config, 5);
        mcts.search(&Walker, LONG_BUDGET).unwrap();

        let tree = mcts.tree().unwrap();
        // Full ternary tree down to depth 3
        assert_eq!(tree.len(), 1 + 3 + 9 + 27);
        assert!(tree.ids().all(|id| tree.get(id).depth() <= 3));
    }

    #[test]
    fn test_backpropagate_walks_to_root() {
        let mut tree = Tree::new(Counter::new());
        let mut state = Counter::new();
        state.advance(CounterAction::Increment);
        let child = tree.attach(NodeId::ROOT, 0, state.clone(), CounterAction::Increment);
        state.advance(CounterAction::Increment);
        let grandchild = tree.attach(child, 0, state, CounterAction::Increment);

        Mcts::<Counter, RolloutEvaluator, ChaCha8Rng>::backpropagate(&mut tree, grandchild, 2.5);
        Mcts::<Counter, RolloutEvaluator, ChaCha8Rng>::backpropagate(&mut tree, child, -1.0);

        assert_eq!(tree.get(grandchild).stats.visit_count, 1);
        assert_eq!(tree.get(child).stats.visit_count, 2);
        assert_eq!(tree.get(child).stats.total_reward, 1.5);
        assert_eq!(tree.root().stats.visit_count, 2);
        assert_eq!(tree.root().stats.total_reward, 1.5);
    }

    fn two_child_tree(first: NodeStats, second: NodeStats) -> Tree<Counter> {
        let mut tree = Tree::new(Counter::new());
        for (slot, action) in [CounterAction::Increment, CounterAction::Stop]
            .into_iter()
            .enumerate()
        {
            let mut state = Counter::new();
            state.advance(action);
            tree.attach(NodeId::ROOT, slot, state, action);
        }
        tree.get_mut(NodeId(1)).stats = first;
        tree.get_mut(NodeId(2)).stats = second;
        tree.get_mut(NodeId::ROOT).stats = NodeStats {
            visit_count: first.visit_count + second.visit_count,
            total_reward: first.total_reward + second.total_reward,
        };
        tree
    }

    #[test]
    fn test_decision_rules() {
        let busy = NodeStats {
            visit_count: 10,
            total_reward: 100.0,
        };
        let rare = NodeStats {
            visit_count: 1,
            total_reward: 50.0,
        };
        let tree = two_child_tree(busy, rare);

        let total = create_mcts::<Counter>(MctsConfig::default(), 0);
        let result = total.extract(&tree, 11, Duration::ZERO).unwrap();
        assert_eq!(result.best_action, CounterAction::Increment);

        let mean = create_mcts::<Counter>(
            MctsConfig {
                decision_rule: DecisionRule::MeanReward,
                ..Default::default()
            },
            0,
        );
        let result = mean.extract(&tree, 11, Duration::ZERO).unwrap();
        assert_eq!(result.best_action, CounterAction::Stop);
    }

    #[test]
    fn test_uct_ties_keep_first_slot() {
        let same = NodeStats {
            visit_count: 1,
            total_reward: 5.0,
        };
        let tree = two_child_tree(same, same);
        let mcts = create_mcts::<Counter>(MctsConfig::default(), 0);

        assert_eq!(mcts.best_child(&tree, NodeId::ROOT), Some(NodeId(1)));
    }

    #[test]
    fn test_uct_nan_values_fall_to_last_slot() {
        let broken = NodeStats {
            visit_count: 1,
            total_reward: f64::NAN,
        };
        let tree = two_child_tree(broken, broken);
        let mcts = create_mcts::<Counter>(MctsConfig::default(), 0);

        assert_eq!(mcts.best_child(&tree, NodeId::ROOT), Some(NodeId(2)));
    }

    #[test]
    fn test_mcts_deterministic() {
        let run_search = |seed: u64| {
            let mut mcts = create_mcts(MctsConfig::with_iterations(150), seed);
            mcts.search(&GridChase::demo(), LONG_BUDGET).unwrap()
        };

        let result1 = run_search(12345);
        let result2 = run_search(12345);

        // Same seed should produce same results
        assert_eq!(result1.best_action, result2.best_action);
        assert_eq!(result1.children, result2.children);
        assert_eq!(result1.nodes, result2.nodes);
    }

    #[test]
    fn test_search_starts_fresh_tree() {
        let mut mcts = create_mcts(MctsConfig::with_iterations(30), 8);
        mcts.search(&GridChase::demo(), LONG_BUDGET).unwrap();
        mcts.search(&GridChase::demo(), LONG_BUDGET).unwrap();

        // Statistics do not carry over between decisions
        assert_eq!(mcts.tree().unwrap().root().stats.visit_count, 30);
    }
}
