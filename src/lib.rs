pub mod config;
pub mod debug_logger;
pub mod error;
pub mod grid;
pub mod mcts;
pub mod pathfinder;
pub mod session;
pub mod sim;
pub mod solver;
pub mod types;
