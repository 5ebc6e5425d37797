//! # robomaze
//!
//! The algorithmic core of a block-programming maze game: a learner snaps
//! together move, turn and repeat blocks to steer a robot from the start cell
//! to the goal.
//!
//! - [`generator`] builds perfect mazes (randomized Kruskal over cell edges).
//! - [`solver`] finds the shortest path and turns it into a hint program.
//! - [`interpreter`] runs a block [`Program`] against the maze, with nested
//!   repeats, collision detection, a step budget, pacing and cancellation.
//! - [`trace`] replays a recorded run forward and backward.
//!
//! All of them share the wall encoding in [`maze`]: a horizontal wall sits
//! above its anchor cell, a vertical wall to its left.

pub mod codegen;
pub mod error;
pub mod generator;
pub mod interpreter;
pub mod maze;
pub mod program;
pub mod robot;
pub mod session;
pub mod solver;
pub mod trace;

pub use error::*;
pub use generator::{generate, generate_with_rng};
pub use interpreter::*;
pub use maze::*;
pub use program::*;
pub use robot::*;
pub use session::*;
pub use solver::{hint, path_to_blocks, shortest_path};
pub use trace::*;
