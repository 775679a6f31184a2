//! The arena grid: cell model, coordinates, compass directions and obstacle
//! placement.
//!
//! The grid is a fixed `rows x cols` array stored in row-major order. It owns
//! no robots; an [`Cell::Occupied`] cell only carries the [`AgentId`] of the
//! robot standing on it, and the roster stays the single owner of robot state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::robot::{AgentHandle, AgentId};

/// A cell coordinate. Signed so that off-grid targets can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    /// Row index, 0 at the top.
    pub row: i32,
    /// Column index, 0 at the left.
    pub col: i32,
}

impl GridPos {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Manhattan distance `|dr| + |dc|`.
    #[must_use]
    pub fn manhattan(self, other: Self) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// Chebyshev distance `max(|dr|, |dc|)`.
    #[must_use]
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Offset by a row/column delta.
    #[must_use]
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The eight compass directions, numbered 1-8 clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Code 1: up.
    North = 1,
    /// Code 2.
    NorthEast = 2,
    /// Code 3: right.
    East = 3,
    /// Code 4.
    SouthEast = 4,
    /// Code 5: down.
    South = 5,
    /// Code 6.
    SouthWest = 6,
    /// Code 7: left.
    West = 7,
    /// Code 8.
    NorthWest = 8,
}

impl Direction {
    /// All directions in code order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Decode a strategy-supplied direction code. Anything outside 1-8 is `None`.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        if (1..=8).contains(&code) {
            Some(Self::ALL[(code - 1) as usize])
        } else {
            None
        }
    }

    /// The 1-8 code of this direction.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Row/column step for one cell in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

/// Terrain hazards placed at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Burns whoever walks through it. Does not block radar or movement.
    Flamethrower,
    /// Traps whoever walks into it. Does not block radar.
    Pit,
    /// Blocks both movement and radar.
    Mound,
}

impl ObstacleKind {
    /// Obstacle kinds in placement-roll order.
    pub const ALL: [ObstacleKind; 3] = [
        ObstacleKind::Flamethrower,
        ObstacleKind::Pit,
        ObstacleKind::Mound,
    ];

    /// Display and radar glyph.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            ObstacleKind::Flamethrower => 'F',
            ObstacleKind::Pit => 'P',
            ObstacleKind::Mound => 'M',
        }
    }
}

/// Contents of one grid cell. Exactly one kind per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing here.
    #[default]
    Empty,
    /// Terrain hazard.
    Obstacle(ObstacleKind),
    /// A live robot stands here.
    Occupied(AgentId),
    /// Wreck of a destroyed robot, carrying its palette glyph.
    Destroyed(char),
}

impl Cell {
    /// Radar glyph for this cell kind.
    #[must_use]
    pub const fn radar_glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Obstacle(kind) => kind.glyph(),
            Cell::Occupied(_) => 'R',
            Cell::Destroyed(_) => 'X',
        }
    }

    /// Whether a radar ray stops after reporting this cell.
    #[must_use]
    pub const fn blocks_radar(self) -> bool {
        matches!(
            self,
            Cell::Occupied(_) | Cell::Destroyed(_) | Cell::Obstacle(ObstacleKind::Mound)
        )
    }

    /// Check if the cell is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The robot standing here, if any.
    #[must_use]
    pub const fn occupant(self) -> Option<AgentId> {
        match self {
            Cell::Occupied(id) => Some(id),
            _ => None,
        }
    }
}

/// Cell count of a `rows` x `cols` arena, or `None` if either side is not
/// positive or the area is above [`MAX_CELLS`].
#[must_use]
pub fn checked_area(rows: i32, cols: i32) -> Option<i32> {
    if rows <= 0 || cols <= 0 {
        return None;
    }
    rows.checked_mul(cols).filter(|&area| area <= MAX_CELLS)
}

/// Largest arena, in cells, that a grid will allocate.
pub const MAX_CELLS: i32 = 1 << 20;

/// The fixed-size arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridWorld {
    rows: i32,
    cols: i32,
    /// Row-major cell storage.
    cells: Vec<Cell>,
}

impl GridWorld {
    /// Create an all-empty grid. Both dimensions must be positive and the
    /// area must not exceed [`MAX_CELLS`].
    pub fn new(rows: i32, cols: i32) -> Result<Self> {
        let area = checked_area(rows, cols).ok_or(ArenaError::InvalidDimensions { rows, cols })?;
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Empty; area as usize],
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Check whether a coordinate lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.row * self.cols + pos.col) as usize)
    }

    /// Bounds-checked cell query.
    #[must_use]
    pub fn cell_at(&self, pos: GridPos) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    pub fn set_cell(&mut self, pos: GridPos, cell: Cell) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = cell;
        }
    }

    /// Reset a cell to empty.
    pub fn clear_cell(&mut self, pos: GridPos) {
        self.set_cell(pos, Cell::Empty);
    }

    /// Leave a wreck marker with the destroyed robot's glyph.
    pub fn mark_destroyed(&mut self, pos: GridPos, glyph: char) {
        self.set_cell(pos, Cell::Destroyed(glyph));
    }

    /// Mark a cell as occupied by a robot.
    pub fn occupy(&mut self, pos: GridPos, id: AgentId) {
        self.set_cell(pos, Cell::Occupied(id));
    }

    /// The cell one step from `pos` in `dir`.
    ///
    /// With `wrap` the step is taken modulo the grid size and always lands on
    /// the grid; without it a step off the edge yields `None`.
    #[must_use]
    pub fn neighbor(&self, pos: GridPos, dir: Direction, wrap: bool) -> Option<GridPos> {
        let (d_row, d_col) = dir.delta();
        let next = pos.offset(d_row, d_col);
        if self.in_bounds(next) {
            Some(next)
        } else if wrap {
            Some(GridPos::new(
                next.row.rem_euclid(self.rows),
                next.col.rem_euclid(self.cols),
            ))
        } else {
            None
        }
    }

    /// Iterate over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (GridPos::new(idx as i32 / cols, idx as i32 % cols), *cell))
    }

    /// Count cells matching a predicate.
    pub fn count(&self, predicate: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|cell| predicate(**cell)).count()
    }

    /// Scatter obstacles over roughly `percent`% of the cells.
    ///
    /// Each attempt draws a random cell and, if it is empty, a random obstacle
    /// kind. Attempts that land on an already-filled cell are skipped without
    /// retry, so the real density may fall slightly short. Returns the number
    /// of obstacles placed.
    pub fn place_obstacles<R: Rng + ?Sized>(&mut self, rng: &mut R, percent: u32) -> usize {
        let attempts = self.area() * percent as usize / 100;
        let mut placed = 0;

        for _ in 0..attempts {
            let pos = GridPos::new(rng.gen_range(0..self.rows), rng.gen_range(0..self.cols));
            if self.cell_at(pos) == Some(Cell::Empty) {
                let kind = ObstacleKind::ALL[rng.gen_range(0..ObstacleKind::ALL.len())];
                self.set_cell(pos, Cell::Obstacle(kind));
                placed += 1;
            }
        }

        tracing::debug!(attempts, placed, "Placed obstacles");
        placed
    }

    /// Pick a uniformly random empty cell by rejection sampling.
    pub fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GridPos> {
        if self.count(Cell::is_empty) == 0 {
            return Err(ArenaError::ArenaFull);
        }
        loop {
            let pos = GridPos::new(rng.gen_range(0..self.rows), rng.gen_range(0..self.cols));
            if self.cell_at(pos) == Some(Cell::Empty) {
                return Ok(pos);
            }
        }
    }

    /// Drop a robot onto a random empty cell and record its position.
    pub fn place_agent<R: Rng + ?Sized>(
        &mut self,
        agent: &mut AgentHandle,
        rng: &mut R,
    ) -> Result<GridPos> {
        let pos = self.random_empty_cell(rng)?;
        self.occupy(pos, agent.id());
        agent.relocate(pos);
        Ok(pos)
    }
}
