//! Contract violations on maze construction.
//!
//! Runtime outcomes of a user program (collisions, budget exhaustion, missing
//! the goal) are not errors; they are reported through
//! [`crate::interpreter::Outcome`].

use crate::maze::{Cell, WallId};
use thiserror::Error;

/// Failure to build or decode a [`crate::maze::Maze`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    /// Width and height must both be at least 1.
    #[error("invalid maze dimensions {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    /// Start or goal lies outside the grid.
    #[error("cell {cell} is outside the maze")]
    CellOutOfBounds { cell: Cell },

    /// A wall is anchored outside the range the grid can address.
    #[error("wall {wall} is outside the maze")]
    WallOutOfRange { wall: WallId },

    /// A string was not of the form `wall-h-X-Y` or `wall-v-X-Y`.
    #[error("malformed wall id {0:?}")]
    ParseWallId(String),
}
