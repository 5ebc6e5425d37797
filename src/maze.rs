use crate::error::MazeError;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A grid cell `(x, y)`. `x` grows to the right, `y` grows downward.
pub type Cell = IVec2;

/// Neighbor exploration order shared by every grid walk: right, left, down, up.
pub const NEIGHBOR_ORDER: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Orientation of a wall segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WallKind {
    /// Lies along the top edge of its anchor cell.
    Horizontal,
    /// Lies along the left edge of its anchor cell.
    Vertical,
}

/// Canonical identifier of one grid-edge wall.
///
/// The anchor `(x, y)` names the cell the wall belongs to:
/// a horizontal wall sits *above* the cell, a vertical wall sits to its *left*.
/// Walls on the far right and bottom boundary are anchored one past the last
/// column/row.
///
/// Renderers consume the string form (`wall-h-X-Y` / `wall-v-X-Y`), so
/// [`Display`](fmt::Display), [`FromStr`] and serde all use it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WallId {
    pub kind: WallKind,
    pub x: i32,
    pub y: i32,
}

impl WallId {
    pub const fn horizontal(x: i32, y: i32) -> Self {
        Self {
            kind: WallKind::Horizontal,
            x,
            y,
        }
    }

    pub const fn vertical(x: i32, y: i32) -> Self {
        Self {
            kind: WallKind::Vertical,
            x,
            y,
        }
    }

    /// The wall above `cell`.
    pub const fn above(cell: Cell) -> Self {
        Self::horizontal(cell.x, cell.y)
    }

    /// The wall to the left of `cell`.
    pub const fn left_of(cell: Cell) -> Self {
        Self::vertical(cell.x, cell.y)
    }

    /// The wall separating two orthogonally adjacent cells.
    ///
    /// Moving down checks the wall above the destination, moving up the wall
    /// above the source; moving right checks the wall left of the destination,
    /// moving left the wall left of the source. Returns `None` when the cells
    /// are not neighbors.
    pub fn between(from: Cell, to: Cell) -> Option<Self> {
        match to - from {
            IVec2 { x: 0, y: 1 } => Some(Self::above(to)),
            IVec2 { x: 0, y: -1 } => Some(Self::above(from)),
            IVec2 { x: 1, y: 0 } => Some(Self::left_of(to)),
            IVec2 { x: -1, y: 0 } => Some(Self::left_of(from)),
            _ => None,
        }
    }

    /// Whether this wall can exist on a `width` x `height` grid.
    pub fn fits(&self, width: i32, height: i32) -> bool {
        match self.kind {
            WallKind::Horizontal => (0..width).contains(&self.x) && (0..=height).contains(&self.y),
            WallKind::Vertical => (0..=width).contains(&self.x) && (0..height).contains(&self.y),
        }
    }

    /// Whether this wall lies on the outer edge of a `width` x `height` grid.
    pub fn is_boundary(&self, width: i32, height: i32) -> bool {
        match self.kind {
            WallKind::Horizontal => self.y == 0 || self.y == height,
            WallKind::Vertical => self.x == 0 || self.x == width,
        }
    }
}

impl fmt::Display for WallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            WallKind::Horizontal => 'h',
            WallKind::Vertical => 'v',
        };
        write!(f, "wall-{tag}-{}-{}", self.x, self.y)
    }
}

impl FromStr for WallId {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MazeError::ParseWallId(s.to_owned());
        let rest = s.strip_prefix("wall-").ok_or_else(malformed)?;
        let mut parts = rest.splitn(3, '-');
        let kind = match parts.next() {
            Some("h") => WallKind::Horizontal,
            Some("v") => WallKind::Vertical,
            _ => return Err(malformed()),
        };
        let mut coord = || -> Result<i32, MazeError> {
            parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(malformed)
        };
        let x = coord()?;
        let y = coord()?;
        Ok(Self { kind, x, y })
    }
}

impl From<WallId> for String {
    fn from(wall: WallId) -> Self {
        wall.to_string()
    }
}

impl TryFrom<String> for WallId {
    type Error = MazeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Every wall on the outer edge of a `width` x `height` grid.
pub fn boundary_walls(width: i32, height: i32) -> impl Iterator<Item = WallId> {
    let top_bottom = (0..width).flat_map(move |x| [WallId::horizontal(x, 0), WallId::horizontal(x, height)]);
    let left_right = (0..height).flat_map(move |y| [WallId::vertical(0, y), WallId::vertical(width, y)]);
    top_bottom.chain(left_right)
}

/// Every wall a `width` x `height` grid can hold, boundary included.
pub fn all_walls(width: i32, height: i32) -> impl Iterator<Item = WallId> {
    let horizontal = (0..=height).flat_map(move |y| (0..width).map(move |x| WallId::horizontal(x, y)));
    let vertical = (0..height).flat_map(move |y| (0..=width).map(move |x| WallId::vertical(x, y)));
    horizontal.chain(vertical)
}

/// A rectangular grid maze.
///
/// Immutable once built: [`Maze::new`] validates the dimensions, the start and
/// goal cells and every wall anchor, and closes the outer boundary. Both the
/// interpreter and the path finder only ever read it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MazeRepr", into = "MazeRepr")]
pub struct Maze {
    width: i32,
    height: i32,
    start: Cell,
    goal: Cell,
    walls: BTreeSet<WallId>,
}

/// Wire form of a [`Cell`]: `{"x": 0, "y": 0}`.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub(crate) struct CellRepr {
    pub x: i32,
    pub y: i32,
}

impl From<Cell> for CellRepr {
    fn from(cell: Cell) -> Self {
        Self { x: cell.x, y: cell.y }
    }
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Self {
        IVec2::new(repr.x, repr.y)
    }
}

/// Wire form of a [`Maze`]; decoding goes through [`Maze::new`].
#[derive(Serialize, Deserialize)]
struct MazeRepr {
    width: i32,
    height: i32,
    start: CellRepr,
    goal: CellRepr,
    walls: BTreeSet<WallId>,
}

impl TryFrom<MazeRepr> for Maze {
    type Error = MazeError;

    fn try_from(repr: MazeRepr) -> Result<Self, Self::Error> {
        Maze::new(
            repr.width,
            repr.height,
            repr.start.into(),
            repr.goal.into(),
            repr.walls,
        )
    }
}

impl From<Maze> for MazeRepr {
    fn from(maze: Maze) -> Self {
        Self {
            width: maze.width,
            height: maze.height,
            start: maze.start.into(),
            goal: maze.goal.into(),
            walls: maze.walls,
        }
    }
}

impl Maze {
    /// Builds a maze, adding the outer boundary walls to `walls`.
    ///
    /// # Errors
    ///
    /// - [`MazeError::InvalidDimension`] if `width` or `height` is below 1.
    /// - [`MazeError::CellOutOfBounds`] if `start` or `goal` is off the grid.
    /// - [`MazeError::WallOutOfRange`] if a wall is anchored off the grid.
    pub fn new(
        width: i32,
        height: i32,
        start: Cell,
        goal: Cell,
        walls: impl IntoIterator<Item = WallId>,
    ) -> Result<Self, MazeError> {
        if width < 1 || height < 1 {
            return Err(MazeError::InvalidDimension { width, height });
        }

        let mut maze = Self {
            width,
            height,
            start,
            goal,
            walls: boundary_walls(width, height).collect(),
        };

        for cell in [start, goal] {
            if !maze.contains(cell) {
                return Err(MazeError::CellOutOfBounds { cell });
            }
        }

        for wall in walls {
            if !wall.fits(width, height) {
                return Err(MazeError::WallOutOfRange { wall });
            }
            maze.walls.insert(wall);
        }

        Ok(maze)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn walls(&self) -> &BTreeSet<WallId> {
        &self.walls
    }

    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Number of walls that are not part of the outer boundary.
    pub fn interior_wall_count(&self) -> usize {
        self.walls
            .iter()
            .filter(|w| !w.is_boundary(self.width, self.height))
            .count()
    }

    /// Manhattan distance from start to goal: a lower bound on moves that ignores walls.
    pub fn manhattan_distance(&self) -> u32 {
        let d = (self.goal - self.start).abs();
        (d.x + d.y) as u32
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    pub fn has_wall(&self, wall: WallId) -> bool {
        self.walls.contains(&wall)
    }

    /// Whether the robot may step from `from` to `to`: both cells on the grid,
    /// orthogonally adjacent, and no wall between them.
    pub fn is_open(&self, from: Cell, to: Cell) -> bool {
        self.contains(from)
            && self.contains(to)
            && WallId::between(from, to).is_some_and(|wall| !self.has_wall(wall))
    }

    /// Cells reachable in one move from `cell`, in [`NEIGHBOR_ORDER`].
    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        NEIGHBOR_ORDER
            .into_iter()
            .map(move |delta| cell + delta)
            .filter(move |&next| self.is_open(cell, next))
    }
}

/// ASCII drawing, one text row per wall row and per cell row.
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..=self.height {
            for x in 0..self.width {
                let edge = if self.has_wall(WallId::horizontal(x, y)) { "---" } else { "   " };
                write!(f, "+{edge}")?;
            }
            writeln!(f, "+")?;

            if y == self.height {
                break;
            }
            for x in 0..=self.width {
                let edge = if self.has_wall(WallId::vertical(x, y)) { '|' } else { ' ' };
                if x == self.width {
                    writeln!(f, "{edge}")?;
                    break;
                }
                let cell = IVec2::new(x, y);
                let mark = if cell == self.start {
                    " S "
                } else if cell == self.goal {
                    " G "
                } else {
                    "   "
                };
                write!(f, "{edge}{mark}")?;
            }
        }
        Ok(())
    }
}
