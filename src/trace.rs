//! Forward/backward replay over a recorded execution trace.

use crate::interpreter::DebugStep;
use crate::robot::Robot;

/// Cursor over the [`DebugStep`]s of one run.
///
/// Position `None` means "before the first step", where the displayed pose is
/// the robot the run started from. Navigation only re-applies recorded poses.
#[derive(Clone, Debug)]
pub struct TraceCursor<'a> {
    initial: Robot,
    steps: &'a [DebugStep],
    position: Option<usize>,
}

impl<'a> TraceCursor<'a> {
    pub fn new(initial: Robot, steps: &'a [DebugStep]) -> Self {
        Self {
            initial,
            steps,
            position: None,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the step last applied, if any.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn current(&self) -> Option<&'a DebugStep> {
        self.position.and_then(|i| self.steps.get(i))
    }

    /// The pose to show at the current position.
    pub fn robot(&self) -> Robot {
        self.current().map_or(self.initial, |step| step.robot_after)
    }

    pub fn is_at_end(&self) -> bool {
        match self.position {
            Some(i) => i + 1 >= self.steps.len(),
            None => self.steps.is_empty(),
        }
    }

    /// Applies the next step. Returns it, or `None` at the end of the trace.
    pub fn step_forward(&mut self) -> Option<&'a DebugStep> {
        let next = self.position.map_or(0, |i| i + 1);
        let step = self.steps.get(next)?;
        self.position = Some(next);
        Some(step)
    }

    /// Undoes the current step and returns the pose it started from.
    /// Returns `None` when already before the first step.
    pub fn step_backward(&mut self) -> Option<Robot> {
        let current = self.position?;
        let before = self.steps[current].robot_before;
        self.position = current.checked_sub(1);
        Some(before)
    }

    /// Jumps to step `index`. Out-of-range indices leave the cursor unchanged.
    pub fn seek(&mut self, index: usize) -> Option<&'a DebugStep> {
        let step = self.steps.get(index)?;
        self.position = Some(index);
        Some(step)
    }

    pub fn reset(&mut self) {
        self.position = None;
    }
}
