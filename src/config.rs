// Configuration module for reading Solver.toml
// All tunable parameters of the decision core live here so that search code
// never hardcodes board dimensions or iteration budgets.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub board: BoardConfig,
    pub solver: SolverConfig,
    pub mcts: MctsConfig,
    pub scoring: ScoringConfig,
    pub debug: DebugConfig,
}

/// Board geometry and live-game constants
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    pub cols: i32,
    pub rows: i32,
    pub min_snake_length: usize,
    pub max_queued_directions: usize,
}

impl BoardConfig {
    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    /// Hard ceiling on the IDA* f-bound: a generous upper bound on the
    /// shortest-path length plus search slack. Exceeding it means "no path
    /// within bound", not a deeper retry.
    pub fn ida_bound_ceiling(&self) -> i32 {
        let max_steps = self.cols + self.rows;
        self.cols + self.rows + max_steps
    }
}

/// Which decision strategy drives the AI snake
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SolverMode {
    AStar,
    IdaStar,
    Mcts,
}

impl SolverMode {
    /// String representation for logging, matching the TOML spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverMode::AStar => "astar",
            SolverMode::IdaStar => "idastar",
            SolverMode::Mcts => "mcts",
        }
    }
}

/// Strategy selection
#[derive(Debug, Deserialize, Clone)]
pub struct SolverConfig {
    pub mode: SolverMode,
}

/// Monte Carlo Tree Search constants
#[derive(Debug, Deserialize, Clone)]
pub struct MctsConfig {
    /// Playout iterations per decision call
    pub iterations: u32,
    /// UCB1 exploration constant C
    pub exploration_constant: f64,
    /// Playouts exceeding this many half-moves classify as a draw
    pub playout_move_cap: u32,
}

/// Fruit score bookkeeping
#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    pub initial_fruit_score: u32,
    pub min_fruit_score: u32,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Solver.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Solver.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Solver.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig {
                cols: 25,
                rows: 25,
                min_snake_length: 5,
                max_queued_directions: 3,
            },
            solver: SolverConfig {
                mode: SolverMode::Mcts,
            },
            mcts: MctsConfig {
                iterations: 200,
                exploration_constant: std::f64::consts::SQRT_2,
                playout_move_cap: 400,
            },
            scoring: ScoringConfig {
                initial_fruit_score: 100,
                min_fruit_score: 10,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "snake_solver_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Solver.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}
