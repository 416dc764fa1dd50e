// Live game session: the grid, both snakes, the fruit and the score.
//
// The session advances one frame per tick: the solver commits the AI's
// direction, both snakes move, collisions end the game, and eating the
// fruit respawns it at a uniformly random free cell. The opponent snake is
// either driven externally through queue_opponent_direction or by a small
// autopilot that keeps it alive for headless runs.

use std::collections::VecDeque;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::grid::Grid;
use crate::solver::Solver;
use crate::types::{head_of, Coord, Direction, SnakeBody, Tile};

/// One snake in the live game: its body, its heading and the pending
/// direction queue fed by its controller.
struct Snake {
    body: SnakeBody,
    direction: Direction,
    queued: VecDeque<Direction>,
}

impl Snake {
    fn new(head: Coord, direction: Direction) -> Self {
        let mut body = SnakeBody::new();
        body.push_front(head);
        Snake {
            body,
            direction,
            queued: VecDeque::new(),
        }
    }

    fn head(&self) -> Coord {
        head_of(&self.body)
    }

    /// Queues a direction change. Rejected when the queue is full or when
    /// the direction repeats or reverses the most recent heading, so a
    /// buffered double-tap can never fold the snake onto its own neck.
    fn queue_direction(&mut self, dir: Direction, max_queued: usize) -> bool {
        let last = self.queued.back().copied().unwrap_or(self.direction);
        if dir == last || dir == last.opposite() {
            return false;
        }
        if self.queued.len() >= max_queued {
            return false;
        }
        self.queued.push_back(dir);
        true
    }

    /// Replaces the whole queue with a single committed direction. Used for
    /// solver output, which already accounts for the current heading.
    fn commit_direction(&mut self, dir: Direction) {
        self.queued.clear();
        self.queued.push_back(dir);
    }

    fn next_direction(&mut self) -> Direction {
        if let Some(dir) = self.queued.pop_front() {
            self.direction = dir;
        }
        self.direction
    }
}

/// What a snake ran into this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveOutcome {
    Moved,
    AteFruit,
    Crashed,
}

pub struct Session {
    config: Config,
    grid: Grid,
    ai: Snake,
    opponent: Option<Snake>,
    opponent_autopilot: bool,
    fruit: Coord,
    solver: Solver,
    rng: StdRng,
    logger: DebugLogger,
    frame: u64,
    score: u32,
    fruits_eaten: u32,
    next_fruit_score: u32,
    game_over: bool,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let solver = Solver::new(config.clone());
        Self::build(config, solver, StdRng::from_os_rng())
    }

    /// Seeded constructor: both the session's fruit placement and the
    /// solver's playouts become reproducible.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        let solver = Solver::with_seed(config.clone(), seed.wrapping_add(1));
        Self::build(config, solver, StdRng::seed_from_u64(seed))
    }

    fn build(config: Config, solver: Solver, mut rng: StdRng) -> Self {
        let mut grid = Grid::new(config.board.cols, config.board.rows);

        let ai = Snake::new(
            Coord::new(config.board.cols / 2, config.board.rows / 2),
            Direction::East,
        );
        let opponent = Snake::new(Coord::new(3, 3), Direction::East);
        grid.set_tile(ai.head(), Tile::SnakeHead);
        grid.set_tile(opponent.head(), Tile::SnakeHead);

        let fruit = Self::pick_fruit_cell(&grid, &mut rng)
            .unwrap_or_else(|| Coord::new(0, 0));
        grid.set_tile(fruit, Tile::Fruit);

        let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path);
        let next_fruit_score = config.scoring.initial_fruit_score;

        let mut session = Session {
            config,
            grid,
            ai,
            opponent: Some(opponent),
            opponent_autopilot: true,
            fruit,
            solver,
            rng,
            logger,
            frame: 0,
            score: 0,
            fruits_eaten: 0,
            next_fruit_score,
            game_over: false,
        };
        session
            .solver
            .on_fruit_spawned(&session.grid, &session.ai.body, session.fruit);
        session
    }

    /// Switches the opponent to external control (keyboard, replay, tests)
    pub fn set_opponent_autopilot(&mut self, enabled: bool) {
        self.opponent_autopilot = enabled;
    }

    /// Feeds one direction into the opponent's input queue. Returns false
    /// when the input was dropped (full queue, repeat or reversal).
    pub fn queue_opponent_direction(&mut self, dir: Direction) -> bool {
        let max = self.config.board.max_queued_directions;
        match self.opponent.as_mut() {
            Some(snake) => snake.queue_direction(dir, max),
            None => false,
        }
    }

    /// Advances the game one frame. A no-op once the game is over.
    pub fn tick(&mut self) {
        if self.game_over {
            return;
        }
        self.frame += 1;

        let opponent_body = self.opponent.as_ref().map(|s| s.body.clone());
        let chosen = self.solver.decide(
            &self.grid,
            &self.ai.body,
            opponent_body.as_ref(),
            self.fruit,
        );
        if let Some(dir) = chosen {
            self.ai.commit_direction(dir);
        }

        self.logger.log_frame(
            self.frame,
            self.solver.mode().as_str(),
            chosen,
            self.ai.head(),
            self.opponent.as_ref().map(|s| s.head()),
            self.fruit,
            self.score,
        );

        match self.advance_ai() {
            MoveOutcome::Crashed => {
                info!(
                    "game over at frame {}: score {}, {} fruits",
                    self.frame, self.score, self.fruits_eaten
                );
                self.game_over = true;
                return;
            }
            MoveOutcome::AteFruit => {
                self.fruits_eaten += 1;
                self.score += self.next_fruit_score;
                info!(
                    "fruit {} eaten at frame {} for {} points (total {})",
                    self.fruits_eaten, self.frame, self.next_fruit_score, self.score
                );
                self.solver.on_fruit_eaten();
                self.spawn_fruit();
            }
            MoveOutcome::Moved => {}
        }

        if self.opponent.is_some() {
            if self.opponent_autopilot {
                self.drive_opponent();
            }
            match self.advance_opponent() {
                MoveOutcome::Crashed => {
                    info!("opponent crashed at frame {}", self.frame);
                    self.remove_opponent();
                }
                MoveOutcome::AteFruit => {
                    debug!("opponent took the fruit at frame {}", self.frame);
                    self.solver.on_fruit_eaten();
                    self.spawn_fruit();
                }
                MoveOutcome::Moved => {}
            }
        }

        // The fruit loses value while it sits on the board.
        if self.next_fruit_score > self.config.scoring.min_fruit_score {
            self.next_fruit_score -= 1;
        }
    }

    fn advance_ai(&mut self) -> MoveOutcome {
        let min = self.config.board.min_snake_length;
        Self::advance_snake(&mut self.grid, &mut self.ai, min)
    }

    fn advance_opponent(&mut self) -> MoveOutcome {
        let min = self.config.board.min_snake_length;
        match self.opponent.as_mut() {
            Some(snake) => Self::advance_snake(&mut self.grid, snake, min),
            None => MoveOutcome::Moved,
        }
    }

    /// Moves one snake one cell, keeping the grid in sync. Walls and snake
    /// tiles crash the mover. The tail is retained (the snake grows) when
    /// the head lands on fruit or the body is still below minimum length.
    fn advance_snake(grid: &mut Grid, snake: &mut Snake, min_length: usize) -> MoveOutcome {
        let dir = snake.next_direction();
        let new_head = dir.apply(snake.head());

        if !grid.in_bounds(new_head) {
            return MoveOutcome::Crashed;
        }
        let target = grid.tile_at(new_head.x, new_head.y);
        if matches!(target, Tile::SnakeBody | Tile::SnakeHead) {
            return MoveOutcome::Crashed;
        }

        grid.set_tile(snake.head(), Tile::SnakeBody);
        snake.body.push_front(new_head);
        grid.set_tile(new_head, Tile::SnakeHead);

        if target != Tile::Fruit && snake.body.len() > min_length {
            if let Some(tail) = snake.body.pop_back() {
                grid.set_tile(tail, Tile::Empty);
            }
        }

        if target == Tile::Fruit {
            MoveOutcome::AteFruit
        } else {
            MoveOutcome::Moved
        }
    }

    /// Autopilot: keep the current heading while it is safe, otherwise turn
    /// onto a random safe neighbor cell.
    fn drive_opponent(&mut self) {
        let grid = &self.grid;
        let rng = &mut self.rng;
        let snake = match self.opponent.as_mut() {
            Some(s) => s,
            None => return,
        };
        let head = snake.head();
        let upcoming = snake.queued.back().copied().unwrap_or(snake.direction);

        let is_safe = |dir: Direction| {
            let next = dir.apply(head);
            grid.in_bounds(next)
                && !matches!(
                    grid.tile_at(next.x, next.y),
                    Tile::SnakeBody | Tile::SnakeHead
                )
        };

        if is_safe(upcoming) {
            return;
        }

        let mut candidates = Direction::all();
        candidates.shuffle(rng);
        for dir in candidates {
            if dir != upcoming.opposite() && is_safe(dir) {
                snake.commit_direction(dir);
                return;
            }
        }
        // Boxed in: the next advance crashes it regardless.
    }

    fn remove_opponent(&mut self) {
        if let Some(snake) = self.opponent.take() {
            for &cell in snake.body.iter() {
                self.grid.set_tile(cell, Tile::Empty);
            }
        }
    }

    /// Places a new fruit on a uniformly random free cell and replans.
    fn spawn_fruit(&mut self) {
        match Self::pick_fruit_cell(&self.grid, &mut self.rng) {
            Some(cell) => {
                self.grid.set_tile(cell, Tile::Fruit);
                self.fruit = cell;
                self.next_fruit_score = self.config.scoring.initial_fruit_score;
                debug!("fruit spawned at {:?}", cell);
                self.solver
                    .on_fruit_spawned(&self.grid, &self.ai.body, cell);
            }
            None => {
                // No free cell left: the board is full.
                info!("board full at frame {}: no cell for a new fruit", self.frame);
                self.game_over = true;
            }
        }
    }

    fn pick_fruit_cell(grid: &Grid, rng: &mut StdRng) -> Option<Coord> {
        let free = grid.free_cell_count();
        if free == 0 {
            return None;
        }
        grid.nth_free_cell(rng.random_range(0..free))
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn fruits_eaten(&self) -> u32 {
        self.fruits_eaten
    }

    pub fn fruit(&self) -> Coord {
        self.fruit
    }

    pub fn ai_body(&self) -> &SnakeBody {
        &self.ai.body
    }

    pub fn ai_head(&self) -> Coord {
        self.ai.head()
    }

    pub fn opponent_body(&self) -> Option<&SnakeBody> {
        self.opponent.as_ref().map(|s| &s.body)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_rejects_repeat_and_reversal() {
        let mut snake = Snake::new(Coord::new(5, 5), Direction::East);
        assert!(!snake.queue_direction(Direction::East, 3));
        assert!(!snake.queue_direction(Direction::West, 3));
        assert!(snake.queue_direction(Direction::North, 3));
        // Checks run against the most recently queued direction
        assert!(!snake.queue_direction(Direction::North, 3));
        assert!(!snake.queue_direction(Direction::South, 3));
        assert!(snake.queue_direction(Direction::East, 3));
    }

    #[test]
    fn queue_respects_capacity() {
        let mut snake = Snake::new(Coord::new(5, 5), Direction::East);
        assert!(snake.queue_direction(Direction::North, 3));
        assert!(snake.queue_direction(Direction::East, 3));
        assert!(snake.queue_direction(Direction::South, 3));
        assert!(!snake.queue_direction(Direction::East, 3));
    }

    #[test]
    fn snake_grows_until_minimum_length() {
        let mut grid = Grid::new(25, 25);
        let mut snake = Snake::new(Coord::new(5, 5), Direction::East);
        grid.set_tile(snake.head(), Tile::SnakeHead);

        for step in 1..=6 {
            assert_eq!(
                Session::advance_snake(&mut grid, &mut snake, 5),
                MoveOutcome::Moved
            );
            // Grows one cell per frame until min length, then holds
            assert_eq!(snake.body.len(), (step + 1).min(5));
        }
        assert_eq!(snake.head(), Coord::new(11, 5));
        // The vacated cells behind the tail are cleared
        assert_eq!(grid.tile_at(5, 5), Tile::Empty);
        assert_eq!(grid.tile_at(6, 5), Tile::Empty);
        assert_eq!(grid.tile_at(7, 5), Tile::SnakeBody);
    }

    #[test]
    fn eating_fruit_retains_tail() {
        let mut grid = Grid::new(25, 25);
        let mut snake = Snake::new(Coord::new(5, 5), Direction::East);
        grid.set_tile(snake.head(), Tile::SnakeHead);
        grid.set_tile(Coord::new(6, 5), Tile::Fruit);

        assert_eq!(
            Session::advance_snake(&mut grid, &mut snake, 1),
            MoveOutcome::AteFruit
        );
        assert_eq!(snake.body.len(), 2);
        assert_eq!(grid.tile_at(5, 5), Tile::SnakeBody);
        assert_eq!(grid.tile_at(6, 5), Tile::SnakeHead);
    }

    #[test]
    fn wall_and_body_crash_the_mover() {
        let mut grid = Grid::new(10, 10);
        let mut snake = Snake::new(Coord::new(9, 5), Direction::East);
        grid.set_tile(snake.head(), Tile::SnakeHead);
        assert_eq!(
            Session::advance_snake(&mut grid, &mut snake, 1),
            MoveOutcome::Crashed
        );

        let mut blocked = Snake::new(Coord::new(4, 4), Direction::East);
        grid.set_tile(blocked.head(), Tile::SnakeHead);
        grid.set_tile(Coord::new(5, 4), Tile::SnakeBody);
        assert_eq!(
            Session::advance_snake(&mut grid, &mut blocked, 1),
            MoveOutcome::Crashed
        );
    }
}
