//! Caller-owned bundle of the state a single play session needs.

use crate::error::MazeError;
use crate::generator;
use crate::interpreter::{ExecutionResult, InterpreterConfig, execute};
use crate::maze::Maze;
use crate::program::Program;
use crate::robot::{Direction, Robot};
use crate::solver;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Facts about a finished run that progress and achievement layers consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub success: bool,
    pub stars: u8,
    pub block_count: usize,
    pub used_loop: bool,
}

/// One maze, one starting robot and the program being edited.
///
/// Generation, solving and execution are pure functions over these values;
/// the session just keeps them together so the UI does not need global state.
#[derive(Clone, Debug)]
pub struct Session {
    maze: Maze,
    initial_robot: Robot,
    program: Program,
    config: InterpreterConfig,
}

impl Session {
    /// Starts a session on `maze` with the robot on the start cell facing right.
    pub fn new(maze: Maze) -> Self {
        Self {
            initial_robot: Robot::new(maze.start(), Direction::Right),
            maze,
            program: Program::new(),
            config: InterpreterConfig::default(),
        }
    }

    /// Starts a session on a freshly generated perfect maze.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::InvalidDimension`] if `width` or `height` is below 1.
    pub fn generate<R: Rng + ?Sized>(width: i32, height: i32, rng: &mut R) -> Result<Self, MazeError> {
        generator::generate_with_rng(width, height, rng).map(Self::new)
    }

    /// Replaces the interpreter configuration (builder pattern).
    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn initial_robot(&self) -> Robot {
        self.initial_robot
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    pub fn set_program(&mut self, program: Program) {
        self.program = program;
    }

    /// Places the robot somewhere other than the start cell for the next runs.
    pub fn set_initial_robot(&mut self, robot: Robot) {
        self.initial_robot = robot;
    }

    /// Puts the robot back on the start cell facing right.
    pub fn reset_robot(&mut self) {
        self.initial_robot = Robot::new(self.maze.start(), Direction::Right);
    }

    /// Runs the current program with the session configuration.
    pub fn run(&self) -> ExecutionResult {
        execute(self.initial_robot, &self.maze, &self.program, &self.config)
    }

    /// Runs the current program with trace recording on, for the step debugger.
    pub fn run_debug(&self) -> ExecutionResult {
        let config = self.config.clone().with_trace();
        execute(self.initial_robot, &self.maze, &self.program, &config)
    }

    /// Blocks that walk the shortest path from the starting pose.
    pub fn hint(&self) -> Option<Program> {
        solver::hint(&self.maze, self.initial_robot.direction)
    }

    pub fn summary(&self, result: &ExecutionResult) -> RunSummary {
        RunSummary {
            success: result.success,
            stars: result.stars,
            block_count: self.program.block_count(),
            used_loop: self.program.uses_loops(),
        }
    }
}
