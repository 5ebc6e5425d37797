//! Interpreter that runs a block [`Program`] against a [`Robot`] inside a [`Maze`].
//!
//! The entry points are [`execute`] for a run to completion and
//! [`execute_paced`], which awaits a caller-supplied future after every
//! primitive so a renderer can animate the robot. Both are thin drivers over
//! [`Execution`], a resumable state machine that callers may also step by hand.
//!
//! # Loops
//!
//! Repeat blocks are brackets in a flat list. The interpreter keeps an explicit
//! stack of repeat frames instead of recursing, so nesting depth is bounded only by
//! memory. A `repeatStart` without a matching `repeatEnd` repeats the rest of
//! the program; a `repeatEnd` with no open repeat does nothing.
//!
//! # Step budget
//!
//! Before running, the fully unrolled primitive count is computed
//! ([`Program::unrolled_len`]). A program whose count reaches
//! [`InterpreterConfig::max_steps`] is rejected up front with
//! [`Outcome::StepBudgetExceeded`], which makes runaway loops cost nothing.

use crate::maze::Maze;
use crate::program::{Block, BlockKind, Program};
use crate::robot::Robot;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace, warn};

/// Star thresholds, expressed as allowed steps above the Manhattan lower bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarThresholds {
    pub three: u32,
    pub two: u32,
    pub one: u32,
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self {
            three: 2,
            two: 5,
            one: 10,
        }
    }
}

impl StarThresholds {
    /// Rates a successful run of `steps` against the lower bound `optimal`.
    pub fn rate(&self, steps: u32, optimal: u32) -> u8 {
        let slack = |extra: u32| optimal.saturating_add(extra);
        if steps <= slack(self.three) {
            3
        } else if steps <= slack(self.two) {
            2
        } else if steps <= slack(self.one) {
            1
        } else {
            0
        }
    }
}

/// Configuration for program execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Step ceiling. A program whose unrolled length reaches it never runs.
    pub max_steps: u32,
    /// Efficiency scoring for successful runs.
    pub stars: StarThresholds,
    /// Record a [`DebugStep`] per executed primitive.
    pub record_trace: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            stars: StarThresholds::default(),
            record_trace: false,
        }
    }
}

impl InterpreterConfig {
    /// Same configuration with trace recording switched on (builder pattern).
    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// Program completed with the robot on the goal.
    Success,
    /// A `forward` was blocked by a wall or the grid edge.
    WallCollision,
    /// The unrolled program reaches the step ceiling.
    StepBudgetExceeded,
    /// Program completed with the robot elsewhere.
    GoalNotReached,
    /// The caller's [`CancelToken`] fired.
    Cancelled,
}

/// Record of one executed primitive instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStep {
    /// Position of the block in the flat program.
    pub block_index: usize,
    pub block_id: String,
    #[serde(rename = "blockType")]
    pub block_kind: BlockKind,
    pub robot_before: Robot,
    pub robot_after: Robot,
    /// Human-readable description of what happened.
    pub action: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Verdict of a complete run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub outcome: Outcome,
    pub success: bool,
    /// Shown to the learner as-is.
    pub message: String,
    pub final_robot: Robot,
    /// Primitive instructions executed successfully.
    pub steps: u32,
    /// 0-3, only non-zero on success.
    pub stars: u8,
    /// Present when [`InterpreterConfig::record_trace`] was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<DebugStep>>,
}

/// Shared flag that stops an [`Execution`] before its next primitive.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One active repeat: body spans `start + 1 .. end`, where `end` is the
/// matching `repeatEnd` or the program length for an unclosed repeat.
#[derive(Clone, Copy, Debug)]
struct Frame {
    start: usize,
    end: usize,
    remaining: u32,
}

/// What a call to [`Execution::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepEvent {
    /// A primitive ran; `robot` is the new pose and `steps` the running count.
    Executed { robot: Robot, steps: u32 },
    /// The run is over. Further calls keep returning the same outcome.
    Halted(Outcome),
}

/// A resumable run of one program.
pub struct Execution<'a> {
    maze: &'a Maze,
    blocks: &'a [Block],
    config: &'a InterpreterConfig,
    ends: Vec<Option<usize>>,
    bodies: Vec<u64>,
    unrolled: u64,
    robot: Robot,
    pc: usize,
    frames: Vec<Frame>,
    steps: u32,
    trace: Option<Vec<DebugStep>>,
    cancel: Option<CancelToken>,
    halted: Option<Outcome>,
}

impl<'a> Execution<'a> {
    /// Prepares a run. Over-budget programs are halted immediately.
    pub fn new(
        robot: Robot,
        maze: &'a Maze,
        program: &'a Program,
        config: &'a InterpreterConfig,
    ) -> Self {
        let ends = program.matching_ends();
        let bodies = program.body_lengths();
        let unrolled = program.unrolled_len();
        let blocks = program.blocks();

        let unclosed = blocks
            .iter()
            .zip(&ends)
            .filter(|(b, end)| b.kind == BlockKind::RepeatStart && end.is_none())
            .count();
        let closed = ends.iter().flatten().count();
        let stray = blocks
            .iter()
            .filter(|b| b.kind == BlockKind::RepeatEnd)
            .count()
            - closed;
        if unclosed > 0 || stray > 0 {
            warn!(unclosed, stray, "program has unmatched repeat blocks");
        }

        let halted = if unrolled >= u64::from(config.max_steps) {
            debug!(unrolled, max_steps = config.max_steps, "program exceeds step budget");
            Some(Outcome::StepBudgetExceeded)
        } else {
            None
        };

        Self {
            maze,
            blocks,
            config,
            ends,
            bodies,
            unrolled,
            robot,
            pc: 0,
            frames: Vec::new(),
            steps: 0,
            trace: config.record_trace.then(Vec::new),
            cancel: None,
            halted,
        }
    }

    /// Checks `token` before every primitive (builder pattern).
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn robot(&self) -> Robot {
        self.robot
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.halted
    }

    /// Advances past loop markers to the next primitive and executes it.
    pub fn step(&mut self) -> StepEvent {
        let blocks = self.blocks;
        loop {
            if let Some(outcome) = self.halted {
                return StepEvent::Halted(outcome);
            }
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return self.halt(Outcome::Cancelled);
            }

            if let Some(frame) = self.frames.last_mut()
                && self.pc >= frame.end
            {
                frame.remaining -= 1;
                if frame.remaining > 0 {
                    self.pc = frame.start + 1;
                } else {
                    self.pc = frame.end + 1;
                    self.frames.pop();
                }
                continue;
            }

            let Some(block) = blocks.get(self.pc) else {
                let outcome = if self.robot.position == self.maze.goal() {
                    Outcome::Success
                } else {
                    Outcome::GoalNotReached
                };
                return self.halt(outcome);
            };

            let before = self.robot;
            match block.kind {
                BlockKind::RepeatStart => {
                    let end = self.ends[self.pc].unwrap_or(blocks.len());
                    let remaining = block.iterations();
                    // Bodies that unroll to nothing are skipped without iterating.
                    if remaining == 0 || self.bodies[self.pc] == 0 {
                        self.pc = end + 1;
                    } else {
                        self.frames.push(Frame {
                            start: self.pc,
                            end,
                            remaining,
                        });
                        self.pc += 1;
                    }
                }
                // Only stray ends get here; matched ones are consumed by their frame.
                BlockKind::RepeatEnd => self.pc += 1,
                BlockKind::Forward => return self.forward(before),
                BlockKind::TurnLeft => {
                    self.robot.turn_left();
                    let action = format!("Turned left, now facing {}", self.robot.direction);
                    return self.complete(before, action);
                }
                BlockKind::TurnRight => {
                    self.robot.turn_right();
                    let action = format!("Turned right, now facing {}", self.robot.direction);
                    return self.complete(before, action);
                }
                BlockKind::Wait => return self.complete(before, "Waited 1 second".to_owned()),
            }
        }
    }

    fn forward(&mut self, before: Robot) -> StepEvent {
        let target = before.ahead();
        if !self.maze.is_open(before.position, target) {
            self.record(self.pc, before, "Attempted to move forward".to_owned(), Some("Hit a wall!"));
            return self.halt(Outcome::WallCollision);
        }
        self.robot.position = target;
        self.complete(before, format!("Moved forward to ({}, {})", target.x, target.y))
    }

    /// Counts the primitive at `pc` as a successful step and moves past it.
    fn complete(&mut self, before: Robot, action: String) -> StepEvent {
        let index = self.pc;
        self.steps += 1;
        self.pc += 1;
        trace!(
            index,
            kind = %self.blocks[index].kind,
            x = self.robot.position.x,
            y = self.robot.position.y,
            steps = self.steps,
            "executed block"
        );
        self.record(index, before, action, None);

        StepEvent::Executed {
            robot: self.robot,
            steps: self.steps,
        }
    }

    fn record(&mut self, index: usize, before: Robot, action: String, error: Option<&str>) {
        let blocks = self.blocks;
        let Some(trace) = self.trace.as_mut() else {
            return;
        };
        let block = &blocks[index];
        trace.push(DebugStep {
            block_index: index,
            block_id: block.id.clone(),
            block_kind: block.kind,
            robot_before: before,
            robot_after: self.robot,
            action,
            success: error.is_none(),
            error_message: error.map(str::to_owned),
        });
    }

    fn halt(&mut self, outcome: Outcome) -> StepEvent {
        self.halted = Some(outcome);
        StepEvent::Halted(outcome)
    }

    /// Runs to completion (if not already halted) and produces the verdict.
    pub fn finish(mut self) -> ExecutionResult {
        let outcome = loop {
            if let StepEvent::Halted(outcome) = self.step() {
                break outcome;
            }
        };

        let pos = self.robot.position;
        let (message, stars) = match outcome {
            Outcome::Success => (
                format!("Success! Reached the goal in {} steps.", self.steps),
                self.config
                    .stars
                    .rate(self.steps, self.maze.manhattan_distance()),
            ),
            Outcome::WallCollision => (
                format!(
                    "Robot hit a wall at ({}, {}) facing {}. Try a different path.",
                    pos.x, pos.y, self.robot.direction
                ),
                0,
            ),
            Outcome::StepBudgetExceeded => (
                format!(
                    "Program too long: {} steps reach the limit of {}. Check for infinite loops.",
                    self.unrolled, self.config.max_steps
                ),
                0,
            ),
            Outcome::GoalNotReached => (
                format!("Goal not reached: the robot stopped at ({}, {}).", pos.x, pos.y),
                0,
            ),
            Outcome::Cancelled => ("Execution cancelled.".to_owned(), 0),
        };

        debug!(?outcome, steps = self.steps, stars, "program finished");

        ExecutionResult {
            outcome,
            success: outcome == Outcome::Success,
            message,
            final_robot: self.robot,
            steps: self.steps,
            stars,
            trace: self.trace,
        }
    }
}

/// Runs `program` to completion.
pub fn execute(
    robot: Robot,
    maze: &Maze,
    program: &Program,
    config: &InterpreterConfig,
) -> ExecutionResult {
    Execution::new(robot, maze, program, config).finish()
}

/// Runs `program`, awaiting `on_step(robot, steps)` after every primitive.
///
/// The await is the only suspension point. `cancel` is checked before each
/// primitive, so cancelling while `on_step` is pending stops the run before
/// the next instruction.
pub async fn execute_paced<F, Fut>(
    robot: Robot,
    maze: &Maze,
    program: &Program,
    config: &InterpreterConfig,
    cancel: CancelToken,
    mut on_step: F,
) -> ExecutionResult
where
    F: FnMut(Robot, u32) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut execution = Execution::new(robot, maze, program, config).with_cancel(cancel);
    while let StepEvent::Executed { robot, steps } = execution.step() {
        on_step(robot, steps).await;
    }
    execution.finish()
}
