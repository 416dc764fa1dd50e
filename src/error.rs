// Failure kinds of the deterministic pathfinders. Both variants mean "the
// fruit is not reachable right now" and are recovered by the caller holding
// course or falling back to another strategy, never by retrying the search.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A* exhausted its frontier without any state reaching the fruit.
    #[error("search space exhausted without reaching the fruit")]
    NoPathFound,

    /// IDA* reached the f-bound ceiling without finding the goal.
    #[error("no path within f-bound ceiling {0}")]
    NoPathWithinBound(i32),
}
