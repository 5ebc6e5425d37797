//! Block programs authored in the visual editor.
//!
//! A [`Program`] is a flat list of [`Block`]s in which `repeatStart` and
//! `repeatEnd` act as brackets. Nesting is recovered on demand by a
//! depth-balanced scan ([`Program::matching_ends`]); malformed nesting is
//! tolerated rather than rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Repeat count used when a `repeatStart` block carries none.
pub const DEFAULT_REPEAT_COUNT: u32 = 2;

/// The fixed instruction set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Forward,
    TurnLeft,
    TurnRight,
    Wait,
    RepeatStart,
    RepeatEnd,
}

impl BlockKind {
    /// Whether executing this block consumes a step (loop markers do not).
    pub const fn is_primitive(self) -> bool {
        !matches!(self, BlockKind::RepeatStart | BlockKind::RepeatEnd)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockKind::Forward => "forward",
            BlockKind::TurnLeft => "turnLeft",
            BlockKind::TurnRight => "turnRight",
            BlockKind::Wait => "wait",
            BlockKind::RepeatStart => "repeatStart",
            BlockKind::RepeatEnd => "repeatEnd",
        })
    }
}

/// One instruction of a user program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Only meaningful on [`BlockKind::RepeatStart`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            repeat_count: None,
        }
    }

    pub fn repeat(id: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::RepeatStart,
            repeat_count: Some(count),
        }
    }

    /// Iterations of a repeat body; falls back to [`DEFAULT_REPEAT_COUNT`].
    pub fn iterations(&self) -> u32 {
        self.repeat_count.unwrap_or(DEFAULT_REPEAT_COUNT)
    }
}

/// An ordered block sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    blocks: Vec<Block>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a program from bare kinds, numbering ids `b0`, `b1`, ...
    ///
    /// Repeat markers get [`DEFAULT_REPEAT_COUNT`]; use [`Program::push`] with
    /// [`Block::repeat`] for explicit counts.
    pub fn from_kinds(kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| Block::new(format!("b{i}"), kind))
            .collect()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks placed in the editor, loop markers included.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the program contains any repeat construct.
    pub fn uses_loops(&self) -> bool {
        self.blocks.iter().any(|b| b.kind == BlockKind::RepeatStart)
    }

    /// For every block index, the index of the matching `repeatEnd` when that
    /// block is a `repeatStart` whose bracket closes.
    ///
    /// Each `repeatEnd` closes the innermost still-open `repeatStart`, which is
    /// the depth-balanced match. Unclosed starts map to `None`; a `repeatEnd`
    /// with nothing open closes nothing.
    pub fn matching_ends(&self) -> Vec<Option<usize>> {
        let mut ends = vec![None; self.blocks.len()];
        let mut open = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            match block.kind {
                BlockKind::RepeatStart => open.push(i),
                BlockKind::RepeatEnd => {
                    if let Some(start) = open.pop() {
                        ends[start] = Some(i);
                    }
                }
                _ => {}
            }
        }
        ends
    }

    /// Number of primitive instructions a full run would execute, with repeat
    /// bodies multiplied out. Saturates at `u64::MAX`.
    ///
    /// Follows the interpreter's bracket rules: an unclosed `repeatStart`
    /// repeats everything after it, a stray `repeatEnd` is ignored.
    pub fn unrolled_len(&self) -> u64 {
        self.unroll().0
    }

    /// For every `repeatStart` index, the unrolled primitive count of a single
    /// pass over its body (nested repeats multiplied out). Zero elsewhere.
    ///
    /// A repeat whose body length is zero never executes anything, however
    /// many times it is asked to run.
    pub fn body_lengths(&self) -> Vec<u64> {
        self.unroll().1
    }

    fn unroll(&self) -> (u64, Vec<u64>) {
        let mut bodies = vec![0; self.blocks.len()];
        let mut frames = vec![UnrollFrame {
            start: None,
            times: 1,
            body: 0,
        }];
        for (i, block) in self.blocks.iter().enumerate() {
            match block.kind {
                BlockKind::RepeatStart => frames.push(UnrollFrame {
                    start: Some(i),
                    times: u64::from(block.iterations()),
                    body: 0,
                }),
                BlockKind::RepeatEnd => {
                    if frames.len() > 1 {
                        close_frame(&mut frames, &mut bodies);
                    }
                }
                _ => {
                    if let Some(top) = frames.last_mut() {
                        top.body = top.body.saturating_add(1);
                    }
                }
            }
        }
        while frames.len() > 1 {
            close_frame(&mut frames, &mut bodies);
        }
        let total = frames
            .first()
            .map_or(0, |root| root.times.saturating_mul(root.body));
        (total, bodies)
    }
}

/// A repeat being measured; the root frame has no start block.
struct UnrollFrame {
    start: Option<usize>,
    times: u64,
    body: u64,
}

fn close_frame(frames: &mut Vec<UnrollFrame>, bodies: &mut [u64]) {
    if let Some(frame) = frames.pop() {
        if let Some(start) = frame.start {
            bodies[start] = frame.body;
        }
        if let Some(parent) = frames.last_mut() {
            parent.body = parent.body.saturating_add(frame.times.saturating_mul(frame.body));
        }
    }
}

impl FromIterator<Block> for Program {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Block>> for Program {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}
