// Decision-making entry point, owned by the surrounding game loop.
//
// The Solver threads the process-wide state the search needs across frames:
// the configured strategy, the DirectionMap produced by the deterministic
// pathfinders, and the persistent MCTS tree. The caller drives it through
// three entry points: on_fruit_spawned (plan / invalidate), on_fruit_eaten
// (invalidate), and decide (one direction per frame).
//
// Strategy selection is a single explicit policy: the configured mode alone
// decides which search runs.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Config, SolverMode};
use crate::grid::Grid;
use crate::mcts::{self, Tree};
use crate::pathfinder::{DirectionMap, Pathfinder};
use crate::sim::DuelState;
use crate::types::{head_of, Coord, Direction, SnakeBody};

pub struct Solver {
    config: Config,
    direction_map: DirectionMap,
    tree: Option<Tree>,
    rng: StdRng,
}

impl Solver {
    pub fn new(config: Config) -> Self {
        let rng = StdRng::from_os_rng();
        Self::with_rng(config, rng)
    }

    /// Seeded constructor for reproducible tests and replays
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        let cols = config.board.cols;
        Solver {
            config,
            direction_map: DirectionMap::new(cols),
            tree: None,
            rng,
        }
    }

    pub fn mode(&self) -> SolverMode {
        self.config.solver.mode
    }

    /// Number of path steps still planned (deterministic modes)
    pub fn planned_steps(&self) -> usize {
        self.direction_map.len()
    }

    /// Whether a game tree is currently cached (MCTS mode)
    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    /// Caller notification: a fruit appeared at `fruit`. Deterministic
    /// modes plan a full path immediately; MCTS only drops its cached tree
    /// since the goal it was searching toward no longer exists.
    pub fn on_fruit_spawned(&mut self, grid: &Grid, ai: &SnakeBody, fruit: Coord) {
        match self.config.solver.mode {
            SolverMode::AStar | SolverMode::IdaStar => self.plan_path(grid, ai, fruit),
            SolverMode::Mcts => {
                self.tree = None;
                // A solo plan from before the spawn targets the old fruit.
                self.direction_map.clear();
            }
        }
    }

    /// Caller notification: the fruit was consumed. Any cached tree is
    /// inconsistent with the live game and must be discarded.
    pub fn on_fruit_eaten(&mut self) {
        self.tree = None;
    }

    fn plan_path(&mut self, grid: &Grid, ai: &SnakeBody, fruit: Coord) {
        let finder = Pathfinder::new(grid, fruit);
        let result = match self.config.solver.mode {
            SolverMode::AStar => finder.astar(ai),
            SolverMode::IdaStar => finder.ida_star(ai, self.config.board.ida_bound_ceiling()),
            SolverMode::Mcts => unreachable!("MCTS mode never plans a path"),
        };

        match result {
            Ok(map) => {
                info!(
                    "planned {} steps from {:?} to fruit {:?}",
                    map.len(),
                    head_of(ai),
                    fruit
                );
                self.direction_map = map;
            }
            Err(e) => {
                // Reported, not retried: the caller holds the last known
                // direction until the board changes.
                warn!("path planning failed: {}", e);
                self.direction_map.clear();
            }
        }
    }

    /// Computes the direction for this frame. Deterministic modes consume
    /// one DirectionMap entry keyed by the current head cell; MCTS syncs
    /// its tree against the live state, runs the iteration budget and
    /// commits the safest best child. `None` means "hold course".
    pub fn decide(
        &mut self,
        grid: &Grid,
        ai: &SnakeBody,
        opponent: Option<&SnakeBody>,
        fruit: Coord,
    ) -> Option<Direction> {
        match self.config.solver.mode {
            SolverMode::AStar | SolverMode::IdaStar => self.direction_map.take(head_of(ai)),
            SolverMode::Mcts => match opponent {
                Some(opponent) => {
                    let live = DuelState::new(
                        grid.cols(),
                        grid.rows(),
                        ai.clone(),
                        opponent.clone(),
                        fruit,
                    );
                    mcts::sync_root(&mut self.tree, &live);
                    let tree = self.tree.as_mut()?;
                    tree.run_iterations(&self.config.mcts, &mut self.rng);
                    tree.commit_move(ai)
                }
                None => self.decide_solo(grid, ai, fruit),
            },
        }
    }

    /// With the opponent gone the adversarial model has nothing left to
    /// search against; chase the fruit with a deterministic plan instead,
    /// replanning whenever the current plan runs out.
    fn decide_solo(&mut self, grid: &Grid, ai: &SnakeBody, fruit: Coord) -> Option<Direction> {
        self.tree = None;
        if let Some(dir) = self.direction_map.take(head_of(ai)) {
            return Some(dir);
        }

        let finder = Pathfinder::new(grid, fruit);
        match finder.astar(ai) {
            Ok(map) => {
                info!(
                    "no opponent on the board: planned {} steps to fruit {:?}",
                    map.len(),
                    fruit
                );
                self.direction_map = map;
                self.direction_map.take(head_of(ai))
            }
            Err(e) => {
                warn!("path planning failed: {}", e);
                None
            }
        }
    }
}
