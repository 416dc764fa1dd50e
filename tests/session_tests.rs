// End-to-end checks of the live game session: frame advancement, growth,
// input queue rules and a full planned run that eats fruit.

use snake_solver::config::{Config, SolverMode};
use snake_solver::session::Session;
use snake_solver::types::{Direction, Tile};

fn astar_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.solver.mode = SolverMode::AStar;
    config.debug.enabled = false;
    config
}

#[test]
fn early_frames_advance_and_grow_the_snake() {
    let mut session = Session::with_seed(astar_config(), 21);
    assert_eq!(session.ai_body().len(), 1);

    // Both snakes start far apart, so the first few frames cannot collide.
    for _ in 0..5 {
        session.tick();
    }
    assert!(!session.is_game_over());
    assert_eq!(session.frame(), 5);
    // One cell of growth per frame up to the minimum length
    assert_eq!(session.ai_body().len(), 5);

    let head = session.ai_head();
    assert_eq!(session.grid().tile_at(head.x, head.y), Tile::SnakeHead);
    let fruit = session.fruit();
    assert_eq!(session.grid().tile_at(fruit.x, fruit.y), Tile::Fruit);
}

#[test]
fn opponent_input_queue_applies_turn_rules() {
    let mut session = Session::with_seed(astar_config(), 22);
    session.set_opponent_autopilot(false);

    // The opponent heads east: repeating or reversing is dropped.
    assert!(!session.queue_opponent_direction(Direction::East));
    assert!(!session.queue_opponent_direction(Direction::West));

    assert!(session.queue_opponent_direction(Direction::North));
    assert!(session.queue_opponent_direction(Direction::East));
    assert!(session.queue_opponent_direction(Direction::South));
    // Queue capacity is three
    assert!(!session.queue_opponent_direction(Direction::East));
}

#[test]
fn mcts_session_keeps_playing_after_opponent_crash() {
    let mut config = Config::default_hardcoded();
    config.debug.enabled = false;
    let mut session = Session::with_seed(config, 24);

    // Crash the opponent into the top wall within a few frames; the AI
    // must carry on alone instead of drifting into a wall undirected.
    session.set_opponent_autopilot(false);
    session.queue_opponent_direction(Direction::North);

    for _ in 0..4000 {
        session.tick();
        if session.fruits_eaten() >= 1 {
            break;
        }
    }

    assert!(session.opponent_body().is_none(), "opponent should have crashed");
    assert!(!session.is_game_over());
    assert!(session.fruits_eaten() >= 1);
}

#[test]
fn planned_session_eats_fruit() {
    let mut session = Session::with_seed(astar_config(), 23);

    // Steer the opponent into the top wall so the rest of the run is a
    // single-snake board: it crashes within a few frames, far away from
    // anywhere the planner can reach that quickly.
    session.set_opponent_autopilot(false);
    session.queue_opponent_direction(Direction::North);

    for _ in 0..4000 {
        session.tick();
        if session.fruits_eaten() >= 3 {
            break;
        }
    }

    assert!(session.opponent_body().is_none(), "opponent should have crashed");
    assert!(!session.is_game_over());
    assert!(session.fruits_eaten() >= 3);
    assert!(session.score() > 0);
}
