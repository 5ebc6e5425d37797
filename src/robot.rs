//! Robot pose and turning.

use crate::maze::{Cell, CellRepr};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compass heading of the robot on the grid (`Down` is +Y).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    /// Unit step taken by a forward move in this heading.
    pub const fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    /// Heading after a 90° counter-clockwise turn: up → left → down → right → up.
    pub const fn turned_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Heading after a 90° clockwise turn: up → right → down → left → up.
    pub const fn turned_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// The heading whose [`delta`](Self::delta) equals `delta`, if it is a unit step.
    pub fn from_delta(delta: IVec2) -> Option<Self> {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .find(|d| d.delta() == delta)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// Position and heading of the robot.
///
/// Only the interpreter mutates a robot during a run; callers reset it
/// between runs. Serialized flat as `{"x", "y", "direction"}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RobotRepr", into = "RobotRepr")]
pub struct Robot {
    pub position: Cell,
    pub direction: Direction,
}

#[derive(Serialize, Deserialize)]
struct RobotRepr {
    #[serde(flatten)]
    position: CellRepr,
    direction: Direction,
}

impl From<RobotRepr> for Robot {
    fn from(repr: RobotRepr) -> Self {
        Self::new(repr.position.into(), repr.direction)
    }
}

impl From<Robot> for RobotRepr {
    fn from(robot: Robot) -> Self {
        Self {
            position: robot.position.into(),
            direction: robot.direction,
        }
    }
}

impl Robot {
    pub const fn new(position: Cell, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// The cell directly ahead.
    pub fn ahead(&self) -> Cell {
        self.position + self.direction.delta()
    }

    pub fn turn_left(&mut self) {
        self.direction = self.direction.turned_left();
    }

    pub fn turn_right(&mut self) {
        self.direction = self.direction.turned_right();
    }
}
