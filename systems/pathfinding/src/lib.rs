#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first shortest path search over the tile grid.
//!
//! Neighbours are expanded in [`Direction::EXPANSION_ORDER`] (up, down, left,
//! right) and the first discovery of a tile wins, so ties between equal
//! length paths always resolve the same way.

use std::collections::VecDeque;

use fog_tactics_core::{grid_index, Direction, GridCoord};

/// Sequence of orthogonally adjacent tiles from a start to a destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    cells: Vec<GridCoord>,
}

impl Path {
    /// Tiles along the path, starting tile first.
    #[must_use]
    pub fn cells(&self) -> &[GridCoord] {
        &self.cells
    }

    /// Number of tiles in the path, including the start.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a path holds at least its start tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of steps needed to walk the path.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Tile the path starts on.
    #[must_use]
    pub fn start(&self) -> Option<GridCoord> {
        self.cells.first().copied()
    }

    /// Tile the path ends on.
    #[must_use]
    pub fn destination(&self) -> Option<GridCoord> {
        self.cells.last().copied()
    }

    /// First tile to step onto, absent for the trivial path.
    #[must_use]
    pub fn next_hop(&self) -> Option<GridCoord> {
        self.cells.get(1).copied()
    }

    /// Consumes the path, yielding its tiles.
    #[must_use]
    pub fn into_vec(self) -> Vec<GridCoord> {
        self.cells
    }
}

/// Reusable breadth-first search workspace.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    discovered: Vec<bool>,
    previous: Vec<Option<GridCoord>>,
    queue: VecDeque<GridCoord>,
}

impl Pathfinder {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a shortest path between two tiles of a `columns` x `rows` grid.
    ///
    /// `is_blocked` is consulted for every intermediate tile but never for
    /// `from` or `to`. Returns `None` when either endpoint lies off the grid
    /// or the destination cannot be reached.
    pub fn shortest_path<F>(
        &mut self,
        from: GridCoord,
        to: GridCoord,
        columns: u32,
        rows: u32,
        mut is_blocked: F,
    ) -> Option<Path>
    where
        F: FnMut(GridCoord) -> bool,
    {
        let start_index = grid_index(from, columns, rows)?;
        let goal_index = grid_index(to, columns, rows)?;

        if from == to {
            return Some(Path { cells: vec![from] });
        }

        self.reset(usize::try_from(u64::from(columns) * u64::from(rows)).ok()?);
        self.discovered[start_index] = true;
        self.queue.push_back(from);

        while let Some(cell) = self.queue.pop_front() {
            if cell == to {
                break;
            }

            for direction in Direction::EXPANSION_ORDER {
                let Some(neighbour) = cell.step(direction, columns, rows) else {
                    continue;
                };
                let Some(index) = grid_index(neighbour, columns, rows) else {
                    continue;
                };
                if self.discovered[index] {
                    continue;
                }
                if neighbour != to && is_blocked(neighbour) {
                    continue;
                }

                self.discovered[index] = true;
                self.previous[index] = Some(cell);
                self.queue.push_back(neighbour);
            }
        }

        if !self.discovered[goal_index] {
            return None;
        }

        let mut cells = vec![to];
        let mut cursor = to;
        while cursor != from {
            let index = grid_index(cursor, columns, rows)?;
            cursor = self.previous[index]?;
            cells.push(cursor);
        }
        cells.reverse();
        Some(Path { cells })
    }

    fn reset(&mut self, tile_count: usize) {
        if self.discovered.len() != tile_count {
            self.discovered = vec![false; tile_count];
            self.previous = vec![None; tile_count];
        } else {
            self.discovered.fill(false);
            self.previous.fill(None);
        }
        self.queue.clear();
    }
}
