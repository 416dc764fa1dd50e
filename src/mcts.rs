// Monte Carlo Tree Search over the adversarial two-snake game.
//
// The tree persists across frames. Each node exclusively owns its children;
// back-propagation walks the explicit descent path recorded during
// selection instead of parent pointers, so re-rooting (moving a child out
// and replacing the root) automatically drops the old root and every
// sibling subtree.
//
// Score convention: playout outcomes are signed from the AI's perspective
// (+1 AI win, -1 opponent win, 0 draw). A node accumulates the outcome
// sign-flipped when its turn-owner is the opponent; score comparisons
// during selection and commit convert back to the AI's perspective, so the
// AI maximizes and the opponent minimizes.

use log::warn;
use rand::Rng;

use crate::config::MctsConfig;
use crate::sim::DuelState;
use crate::types::{Coord, Direction, SnakeBody};

/// One node of the game tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub state: DuelState,
    pub visits: u32,
    pub score: f64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(state: DuelState) -> Self {
        TreeNode {
            state,
            visits: 0,
            score: 0.0,
            children: Vec::new(),
        }
    }

    /// Attaches all legal one-step successors for this node's turn-owner.
    /// Terminal states are never expanded; calling twice is a no-op.
    fn expand(&mut self) {
        if !self.children.is_empty() || self.state.check_status().is_terminal() {
            return;
        }
        self.children = self
            .state
            .successors()
            .into_iter()
            .map(TreeNode::new)
            .collect();
    }

    /// Mean score from the AI's perspective. Unvisited nodes are neutral.
    fn ai_perspective_mean(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        let score = if self.state.ai_to_move {
            self.score
        } else {
            -self.score
        };
        score / self.visits as f64
    }

    /// UCB1 value of this node as a child, from the perspective of the
    /// selecting parent's turn-owner. Unvisited children sort first.
    fn ucb1(&self, parent_visits: u32, c: f64, ai_selecting: bool) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let exploit = if ai_selecting {
            self.ai_perspective_mean()
        } else {
            -self.ai_perspective_mean()
        };
        let explore = c * ((parent_visits.max(1) as f64).ln() / self.visits as f64).sqrt();
        exploit + explore
    }
}

/// Persistent game tree, owning exactly one root node
#[derive(Debug, Clone)]
pub struct Tree {
    root: TreeNode,
}

impl Tree {
    pub fn new(state: DuelState) -> Self {
        Tree {
            root: TreeNode::new(state),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Test and diagnostic access to the root node
    pub fn root_mut(&mut self) -> &mut TreeNode {
        &mut self.root
    }

    /// Advances the tree one ply by re-rooting at the child whose recorded
    /// opponent head matches the live opponent head. Returns false when no
    /// child matches, in which case the caller must rebuild.
    pub fn advance_to_opponent_head(&mut self, head: Coord) -> bool {
        match self
            .root
            .children
            .iter()
            .position(|child| child.state.opponent_head() == head)
        {
            Some(index) => {
                let child = self.root.children.swap_remove(index);
                self.root = child;
                true
            }
            None => false,
        }
    }

    /// Runs the fixed iteration budget: select, expand, simulate,
    /// back-propagate.
    pub fn run_iterations<R: Rng>(&mut self, config: &MctsConfig, rng: &mut R) {
        for _ in 0..config.iterations {
            self.iterate(config, rng);
        }
    }

    fn iterate<R: Rng>(&mut self, config: &MctsConfig, rng: &mut R) {
        // Selection: descend by UCB1 until a node with no children
        let mut path: Vec<usize> = Vec::new();
        {
            let mut node = &self.root;
            while !node.children.is_empty() {
                let ai_selecting = node.state.ai_to_move;
                let parent_visits = node.visits;
                let c = config.exploration_constant;
                let best = node
                    .children
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        let ua = a.ucb1(parent_visits, c, ai_selecting);
                        let ub = b.ucb1(parent_visits, c, ai_selecting);
                        ua.partial_cmp(&ub).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(index, _)| index)
                    .unwrap_or(0);
                path.push(best);
                node = &node.children[best];
            }
        }

        // Expansion, then simulate from a random fresh child if any exist
        let selected = self.node_at_mut(&path);
        selected.expand();
        if !selected.children.is_empty() {
            path.push(rng.random_range(0..selected.children.len()));
        }

        let playout_root = self.node_at_mut(&path);
        let outcome =
            f64::from(playout_root.state.random_playout(rng, config.playout_move_cap).signed());

        // Back-propagation along the descent path, root included
        let mut node = &mut self.root;
        node.visits += 1;
        node.score += if node.state.ai_to_move { outcome } else { -outcome };
        for &index in &path {
            node = &mut node.children[index];
            node.visits += 1;
            node.score += if node.state.ai_to_move { outcome } else { -outcome };
        }
    }

    fn node_at_mut(&mut self, path: &[usize]) -> &mut TreeNode {
        let mut node = &mut self.root;
        for &index in path {
            node = &mut node.children[index];
        }
        node
    }

    /// Commits the best root move: picks the child with the best mean score
    /// for the AI, discarding candidates whose head would collide with the
    /// AI's live body or leave the board. The last remaining child is
    /// accepted even when unsafe, since the game must still advance.
    /// Re-roots the tree at the chosen child and returns the direction.
    pub fn commit_move(&mut self, live_ai_body: &SnakeBody) -> Option<Direction> {
        if self.root.children.is_empty() {
            return None;
        }

        loop {
            let best = self.best_child_index();
            let candidate = &self.root.children[best];
            let head = candidate.state.ai_head();
            let in_bounds = head.x >= 0
                && head.x < self.root.state.cols
                && head.y >= 0
                && head.y < self.root.state.rows;
            let safe = in_bounds && !live_ai_body.contains(&head);

            if safe || self.root.children.len() == 1 {
                if !safe {
                    warn!("accepting unsafe move to {:?}: no alternative remains", head);
                }
                let from = self.root.state.ai_head();
                let chosen = self.root.children.swap_remove(best);
                let dir = Direction::from_step(from, chosen.state.ai_head());
                debug_assert!(dir.is_some(), "root child is not one step from the root");
                self.root = chosen;
                return dir;
            }

            self.root.children.swap_remove(best);
        }
    }

    fn best_child_index(&self) -> usize {
        self.root
            .children
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.ai_perspective_mean()
                    .partial_cmp(&b.ai_perspective_mean())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}

/// Root synchronization outcome, reported for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSync {
    /// Fresh single-node tree (cold start or recovery from inconsistency)
    Rebuilt,
    /// Re-rooted at the child matching the live opponent head
    Advanced,
}

/// Brings a (possibly absent) tree in sync with the live state. A missing
/// tree, a root whose AI head disagrees with the live head, a childless
/// root, or an unmatched opponent head all trigger a rebuild from scratch.
pub fn sync_root(tree: &mut Option<Tree>, live: &DuelState) -> RootSync {
    let rebuild_needed = match tree {
        None => true,
        Some(t) => {
            t.root().state.ai_head() != live.ai_head() || t.root().children.is_empty()
        }
    };

    if !rebuild_needed {
        let t = tree.as_mut().expect("tree present when advancing");
        if t.advance_to_opponent_head(live.opponent_head()) {
            return RootSync::Advanced;
        }
        warn!("rebuilding game tree: no child matches the live opponent head");
    } else if tree.is_some() {
        warn!("rebuilding game tree: root inconsistent with the live state");
    }

    *tree = Some(Tree::new(live.clone()));
    RootSync::Rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn body(cells: &[(i32, i32)]) -> SnakeBody {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    fn open_state() -> DuelState {
        DuelState::new(
            25,
            25,
            body(&[(12, 12), (11, 12)]),
            body(&[(3, 3), (2, 3)]),
            Coord::new(20, 20),
        )
    }

    fn test_config() -> MctsConfig {
        MctsConfig {
            iterations: 50,
            exploration_constant: std::f64::consts::SQRT_2,
            playout_move_cap: 200,
        }
    }

    #[test]
    fn root_visits_equal_iteration_budget() {
        let mut tree = Tree::new(open_state());
        let config = test_config();
        let mut rng = StdRng::seed_from_u64(1);
        tree.run_iterations(&config, &mut rng);
        assert_eq!(tree.root().visits, config.iterations);
    }

    #[test]
    fn expansion_attaches_one_child_per_legal_move() {
        let mut node = TreeNode::new(open_state());
        node.expand();
        assert_eq!(node.children.len(), 4);
        // Re-expansion is a no-op
        node.expand();
        assert_eq!(node.children.len(), 4);
    }

    #[test]
    fn terminal_node_is_never_expanded() {
        let mut state = open_state();
        state.fruit = state.ai_head();
        let mut node = TreeNode::new(state);
        node.expand();
        assert!(node.children.is_empty());
    }

    #[test]
    fn commit_reroots_at_chosen_child() {
        let mut tree = Tree::new(open_state());
        let config = test_config();
        let mut rng = StdRng::seed_from_u64(3);
        tree.run_iterations(&config, &mut rng);

        let live_body = body(&[(12, 12), (11, 12)]);
        let dir = tree.commit_move(&live_body).expect("a move must be chosen");
        let expected_head = dir.apply(Coord::new(12, 12));
        assert_eq!(tree.root().state.ai_head(), expected_head);
        assert!(!tree.root().state.ai_to_move);
    }

    #[test]
    fn sync_rebuilds_on_mismatched_ai_head() {
        let mut tree = Some(Tree::new(open_state()));
        let mut live = open_state();
        live.ai = body(&[(0, 0), (1, 0)]);
        assert_eq!(sync_root(&mut tree, &live), RootSync::Rebuilt);
        assert_eq!(tree.unwrap().root().state.ai_head(), Coord::new(0, 0));
    }

    #[test]
    fn sync_advances_to_matching_opponent_child() {
        let mut tree = Tree::new(open_state());
        let config = test_config();
        let mut rng = StdRng::seed_from_u64(5);
        tree.run_iterations(&config, &mut rng);
        let live_body = body(&[(12, 12), (11, 12)]);
        tree.commit_move(&live_body).unwrap();

        // Now the root is AI-moved; its children differ by opponent move.
        let mut rng = StdRng::seed_from_u64(6);
        tree.run_iterations(&config, &mut rng);
        let opponent_next = tree.root().children[0].state.opponent_head();

        let mut live = tree.root().state.clone();
        live.ai_to_move = true;
        live.opponent = tree.root().children[0].state.opponent.clone();

        let mut slot = Some(tree);
        assert_eq!(sync_root(&mut slot, &live), RootSync::Advanced);
        let synced = slot.unwrap();
        assert_eq!(synced.root().state.opponent_head(), opponent_next);
        assert_eq!(synced.root().state.ai_head(), live.ai_head());
    }

    #[test]
    fn selector_skips_unsafe_best_child() {
        // Hand-built root with two children: the better-scoring child's head
        // collides with the live AI body, so the selector must fall through
        // to the safe one.
        let base = open_state();
        let mut root = TreeNode::new(base.clone());

        let mut unsafe_state = base.clone();
        unsafe_state.apply(Direction::West); // head onto (11, 12), inside the live body
        unsafe_state.toggle();
        let mut unsafe_child = TreeNode::new(unsafe_state);
        unsafe_child.visits = 10;
        unsafe_child.score = -10.0; // opponent-owned: -10 means 10 AI wins

        let mut safe_state = base.clone();
        safe_state.apply(Direction::East);
        safe_state.toggle();
        let mut safe_child = TreeNode::new(safe_state);
        safe_child.visits = 10;
        safe_child.score = -2.0;

        root.children.push(unsafe_child);
        root.children.push(safe_child);
        root.visits = 20;

        let mut tree = Tree::new(base);
        *tree.root_mut() = root;

        let live_body = body(&[(12, 12), (11, 12), (10, 12), (10, 13)]);
        let dir = tree.commit_move(&live_body).unwrap();
        assert_eq!(dir, Direction::East);
    }

    #[test]
    fn selector_accepts_sole_unsafe_child() {
        let base = open_state();
        let mut root = TreeNode::new(base.clone());

        let mut unsafe_state = base.clone();
        unsafe_state.apply(Direction::West);
        unsafe_state.toggle();
        let mut only_child = TreeNode::new(unsafe_state);
        only_child.visits = 5;
        only_child.score = 3.0;
        root.children.push(only_child);
        root.visits = 5;

        let mut tree = Tree::new(base);
        *tree.root_mut() = root;

        let live_body = body(&[(12, 12), (11, 12), (10, 12)]);
        // The sole child collides, yet it must still be accepted.
        assert_eq!(tree.commit_move(&live_body), Some(Direction::West));
    }
}
