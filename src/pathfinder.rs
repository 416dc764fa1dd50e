// Deterministic shortest-path search to the fruit.
//
// Both A* and IDA* operate on SearchState nodes allocated in a per-call
// arena (parent links are arena indices, so the whole graph is dropped when
// the call returns). Neighbor generation clones the parent body, advances
// the head one cell and drops the tail: body length is conserved, growth is
// only observed at the terminal goal check.
//
// The result of either search is a DirectionMap: for every cell on the
// discovered path, the direction to take when standing on it.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::error;

use crate::error::SearchError;
use crate::grid::Grid;
use crate::types::{advance_body, head_of, Coord, Direction, SnakeBody, Tile};

/// Manhattan distance from a head position to the fruit. Admissible for
/// four-directional unit-cost movement.
pub fn heuristic(head: Coord, fruit: Coord) -> i32 {
    head.manhattan_distance(fruit)
}

/// One node of the deterministic search graph
#[derive(Debug, Clone)]
pub struct SearchState {
    pub body: SnakeBody,
    pub moves: i32,
    pub priority: i32,
    parent: Option<usize>,
}

impl SearchState {
    fn start(body: &SnakeBody, fruit: Coord) -> Self {
        SearchState {
            body: body.clone(),
            moves: 0,
            priority: heuristic(head_of(body), fruit),
            parent: None,
        }
    }

    /// Child state: parent body advanced one cell in `dir` without growing.
    fn child(parent: &SearchState, parent_index: usize, dir: Direction, fruit: Coord) -> Self {
        let mut body = parent.body.clone();
        advance_body(&mut body, dir);
        let moves = parent.moves + 1;
        let priority = moves + heuristic(head_of(&body), fruit);
        SearchState {
            body,
            moves,
            priority,
            parent: Some(parent_index),
        }
    }

    pub fn head(&self) -> Coord {
        head_of(&self.body)
    }
}

/// Mapping from encoded cell index (`x + cols * y`) to the direction an
/// agent standing on that cell should take to follow the computed path.
/// Entries are consumed (removed) as the agent uses them.
#[derive(Debug, Clone)]
pub struct DirectionMap {
    cols: i32,
    map: HashMap<usize, Direction>,
}

impl DirectionMap {
    pub fn new(cols: i32) -> Self {
        DirectionMap {
            cols,
            map: HashMap::new(),
        }
    }

    fn insert(&mut self, cell: Coord, dir: Direction) {
        self.map.insert((cell.x + self.cols * cell.y) as usize, dir);
    }

    /// Looks up the direction for the given head cell and removes the entry.
    pub fn take(&mut self, head: Coord) -> Option<Direction> {
        self.map.remove(&((head.x + self.cols * head.y) as usize))
    }

    /// Looks up without consuming (used by tests and diagnostics)
    pub fn peek(&self, head: Coord) -> Option<Direction> {
        self.map
            .get(&((head.x + self.cols * head.y) as usize))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Frontier entry for A*. Min-heap ordered by priority, ties broken by
/// insertion sequence so results are reproducible.
#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    priority: i32,
    seq: u64,
    index: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Deterministic pathfinder over a read-only grid snapshot
pub struct Pathfinder<'a> {
    grid: &'a Grid,
    fruit: Coord,
}

impl<'a> Pathfinder<'a> {
    pub fn new(grid: &'a Grid, fruit: Coord) -> Self {
        Pathfinder { grid, fruit }
    }

    /// A*: min-priority queue on `moves + heuristic` with a full per-call
    /// visited bitmap. Duplicate frontier entries are allowed instead of
    /// decrease-key; stale pops are discarded. Cells occupied by the snake
    /// body are marked visited without expansion.
    pub fn astar(&self, start: &SnakeBody) -> Result<DirectionMap, SearchError> {
        let mut arena = vec![SearchState::start(start, self.fruit)];
        let mut visited = vec![false; (self.grid.cols() * self.grid.rows()) as usize];
        let mut frontier = BinaryHeap::new();
        let mut seq: u64 = 0;

        frontier.push(HeapEntry {
            priority: arena[0].priority,
            seq,
            index: 0,
        });

        while let Some(entry) = frontier.pop() {
            let index = entry.index;
            let head = arena[index].head();

            if head == self.fruit {
                return Ok(self.extract_path(&arena, index));
            }

            let cell = self.grid.cell_index(head);
            if visited[cell] {
                // Stale duplicate left behind by a cheaper route
                continue;
            }
            visited[cell] = true;

            let parent = arena[index].clone();
            for &dir in Direction::all().iter() {
                let next_head = dir.apply(head);
                if !self.grid.in_bounds(next_head) {
                    continue;
                }
                let next_cell = self.grid.cell_index(next_head);
                if self.grid.tile_at(next_head.x, next_head.y) == Tile::SnakeBody {
                    // Prune the blocked cell without expanding it
                    visited[next_cell] = true;
                    continue;
                }
                if visited[next_cell] {
                    continue;
                }

                let child = SearchState::child(&parent, index, dir, self.fruit);
                let child_index = arena.len();
                seq += 1;
                frontier.push(HeapEntry {
                    priority: child.priority,
                    seq,
                    index: child_index,
                });
                arena.push(child);
            }
        }

        Err(SearchError::NoPathFound)
    }

    /// IDA*: iterative deepening on the f-bound, trading memory for
    /// recomputation. The bound starts at the start heuristic and grows one
    /// step per iteration up to `ceiling`.
    pub fn ida_star(&self, start: &SnakeBody, ceiling: i32) -> Result<DirectionMap, SearchError> {
        let mut bound = heuristic(head_of(start), self.fruit);

        while bound <= ceiling {
            let mut arena = vec![SearchState::start(start, self.fruit)];
            let mut visited = vec![false; (self.grid.cols() * self.grid.rows()) as usize];

            if let Some(goal) = self.bounded_dfs(&mut arena, 0, bound, &mut visited) {
                return Ok(self.extract_path(&arena, goal));
            }
            bound += 1;
        }

        Err(SearchError::NoPathWithinBound(ceiling))
    }

    /// Depth-first probe under an f-bound. Prunes neighbors whose heuristic
    /// reaches `bound - 1`, cells already seen this iteration, and cells
    /// occupied by the snake body. Returns the arena index of a goal state.
    fn bounded_dfs(
        &self,
        arena: &mut Vec<SearchState>,
        index: usize,
        bound: i32,
        visited: &mut [bool],
    ) -> Option<usize> {
        if arena[index].head() == self.fruit {
            return Some(index);
        }

        let parent = arena[index].clone();
        let head = parent.head();
        for &dir in Direction::all().iter() {
            let next_head = dir.apply(head);
            if !self.grid.in_bounds(next_head) {
                continue;
            }
            if heuristic(next_head, self.fruit) >= bound - 1 {
                continue;
            }
            let next_cell = self.grid.cell_index(next_head);
            if visited[next_cell] {
                continue;
            }
            visited[next_cell] = true;
            if self.grid.tile_at(next_head.x, next_head.y) == Tile::SnakeBody {
                continue;
            }

            let child_index = arena.len();
            arena.push(SearchState::child(&parent, index, dir, self.fruit));
            if let Some(goal) = self.bounded_dfs(arena, child_index, bound - 1, visited) {
                return Some(goal);
            }
        }

        None
    }

    /// Walks parent links from the goal back to the start, recording at
    /// every parent cell the direction toward its child. The start cell's
    /// entry falls out of the walk as the last recorded step; a zero-move
    /// path (start on fruit) yields an empty map.
    fn extract_path(&self, arena: &[SearchState], goal: usize) -> DirectionMap {
        let mut map = DirectionMap::new(self.grid.cols());
        let mut current = goal;

        while let Some(parent) = arena[current].parent {
            let from = arena[parent].head();
            let to = arena[current].head();
            match Direction::from_step(from, to) {
                Some(dir) => map.insert(from, dir),
                None => {
                    // A non-adjacent parent/child pair means the transition
                    // model is broken, not that the input was bad.
                    debug_assert!(
                        false,
                        "non-adjacent search states: {:?} -> {:?}",
                        from, to
                    );
                    error!("discarding corrupt path step {:?} -> {:?}", from, to);
                }
            }
            current = parent;
        }

        map
    }
}
