// Two-agent board snapshot and random playout engine for MCTS.
//
// A DuelState is the unit cloned and advanced by the game tree: both snake
// bodies, the fruit, the board bounds and whose turn it is. Moves conserve
// body length (growth is not modeled inside the search); collision rules
// match the live game: wall or body is a loss for the mover, reaching the
// fruit is a win for the mover.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::types::{advance_body, head_of, Coord, Direction, SnakeBody};

/// Terminal classification of a two-agent board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    AiWin,
    OpponentWin,
    Draw,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::InProgress)
    }

    /// Signed outcome from the AI's perspective: +1 win, -1 loss, 0 draw
    pub fn signed(&self) -> i32 {
        match self {
            Status::AiWin => 1,
            Status::OpponentWin => -1,
            Status::InProgress | Status::Draw => 0,
        }
    }
}

/// Immutable-by-convention snapshot of the adversarial two-snake game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelState {
    pub cols: i32,
    pub rows: i32,
    pub ai: SnakeBody,
    pub opponent: SnakeBody,
    pub fruit: Coord,
    /// Turn-owner flag: true when the AI snake moves next
    pub ai_to_move: bool,
}

impl DuelState {
    pub fn new(cols: i32, rows: i32, ai: SnakeBody, opponent: SnakeBody, fruit: Coord) -> Self {
        DuelState {
            cols,
            rows,
            ai,
            opponent,
            fruit,
            ai_to_move: true,
        }
    }

    pub fn ai_head(&self) -> Coord {
        head_of(&self.ai)
    }

    pub fn opponent_head(&self) -> Coord {
        head_of(&self.opponent)
    }

    pub fn active_head(&self) -> Coord {
        if self.ai_to_move {
            self.ai_head()
        } else {
            self.opponent_head()
        }
    }

    fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.cols && coord.y >= 0 && coord.y < self.rows
    }

    fn occupied(&self, coord: Coord) -> bool {
        self.ai.contains(&coord) || self.opponent.contains(&coord)
    }

    /// Legal one-step moves for the active turn-owner: in bounds and not
    /// into either snake body.
    pub fn legal_moves(&self) -> Vec<Direction> {
        let head = self.active_head();
        Direction::all()
            .iter()
            .filter(|&&dir| {
                let next = dir.apply(head);
                self.in_bounds(next) && !self.occupied(next)
            })
            .copied()
            .collect()
    }

    /// Advances the active snake one cell without growing. Legality is the
    /// caller's responsibility; the turn-owner is not toggled here.
    pub fn apply(&mut self, dir: Direction) {
        if self.ai_to_move {
            advance_body(&mut self.ai, dir);
        } else {
            advance_body(&mut self.opponent, dir);
        }
    }

    pub fn toggle(&mut self) {
        self.ai_to_move = !self.ai_to_move;
    }

    /// Classifies the board: a snake whose head occupies the fruit has won.
    /// Crashes are detected at move time (a mover with no legal moves has
    /// lost), so a constructed state is either a fruit win or in progress.
    pub fn check_status(&self) -> Status {
        if self.ai_head() == self.fruit {
            Status::AiWin
        } else if self.opponent_head() == self.fruit {
            Status::OpponentWin
        } else {
            Status::InProgress
        }
    }

    /// All legal successor states for the active turn-owner, with the turn
    /// toggled. Used by MCTS expansion.
    pub fn successors(&self) -> Vec<DuelState> {
        self.legal_moves()
            .into_iter()
            .map(|dir| {
                let mut next = self.clone();
                next.apply(dir);
                next.toggle();
                next
            })
            .collect()
    }

    /// Uniformly random playout to a terminal status. Turn-owners alternate;
    /// a trapped mover loses; a playout exceeding `move_cap` half-moves is a
    /// draw.
    pub fn random_playout<R: Rng>(&self, rng: &mut R, move_cap: u32) -> Status {
        let mut state = self.clone();
        let mut half_moves = 0;

        loop {
            let status = state.check_status();
            if status.is_terminal() {
                return status;
            }
            if half_moves >= move_cap {
                return Status::Draw;
            }

            let legal = state.legal_moves();
            match legal.choose(rng) {
                Some(&dir) => {
                    state.apply(dir);
                    state.toggle();
                }
                None => {
                    // Wall or body on every side: loss for the mover
                    return if state.ai_to_move {
                        Status::OpponentWin
                    } else {
                        Status::AiWin
                    };
                }
            }
            half_moves += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn body(cells: &[(i32, i32)]) -> SnakeBody {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    fn small_state() -> DuelState {
        DuelState::new(
            10,
            10,
            body(&[(5, 5), (4, 5)]),
            body(&[(1, 1), (1, 2)]),
            Coord::new(8, 8),
        )
    }

    #[test]
    fn status_signed_outcomes() {
        assert_eq!(Status::AiWin.signed(), 1);
        assert_eq!(Status::OpponentWin.signed(), -1);
        assert_eq!(Status::Draw.signed(), 0);
    }

    #[test]
    fn fruit_on_head_is_a_win() {
        let mut state = small_state();
        assert_eq!(state.check_status(), Status::InProgress);
        state.fruit = state.ai_head();
        assert_eq!(state.check_status(), Status::AiWin);
    }

    #[test]
    fn legal_moves_exclude_walls_and_bodies() {
        // AI head in a corner with its own body blocking east
        let state = DuelState::new(
            10,
            10,
            body(&[(0, 0), (1, 0)]),
            body(&[(5, 5), (5, 6)]),
            Coord::new(8, 8),
        );
        let moves = state.legal_moves();
        assert_eq!(moves, vec![Direction::South]);
    }

    #[test]
    fn trapped_mover_loses_playout() {
        // AI head boxed into the corner by its own body
        let state = DuelState::new(
            10,
            10,
            body(&[(0, 0), (1, 0), (1, 1), (0, 1)]),
            body(&[(5, 5), (5, 6)]),
            Coord::new(8, 8),
        );
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(state.random_playout(&mut rng, 100), Status::OpponentWin);
    }

    #[test]
    fn playout_reaches_a_terminal_status() {
        let state = small_state();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let status = state.random_playout(&mut rng, 200);
            assert!(status.is_terminal());
        }
    }

    #[test]
    fn successors_alternate_turn_owner() {
        let state = small_state();
        let successors = state.successors();
        assert!(!successors.is_empty());
        for next in &successors {
            assert!(!next.ai_to_move);
            // Only the AI body moved, conserving length
            assert_eq!(next.ai.len(), state.ai.len());
            assert_eq!(next.opponent, state.opponent);
        }
    }
}
