use log::info;
use std::env;

use snake_solver::config::Config;
use snake_solver::session::Session;

/// Headless frame cap so a dominant run still terminates
const MAX_FRAMES: u64 = 100_000;

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting snake solver...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    info!(
        "Board {}x{}, mode {}",
        config.board.cols,
        config.board.rows,
        config.solver.mode.as_str()
    );

    let mut session = Session::new(config);
    while !session.is_game_over() && session.frame() < MAX_FRAMES {
        session.tick();
    }

    info!(
        "Finished after {} frames: score {}, {} fruits eaten",
        session.frame(),
        session.score(),
        session.fruits_eaten()
    );
}
