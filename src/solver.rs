//! Shortest paths through a maze and hint programs derived from them.

use crate::maze::{Cell, Maze};
use crate::program::{Block, BlockKind, Program};
use crate::robot::Direction;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Breadth-first shortest path from `maze.start()` to `maze.goal()`, both ends included.
///
/// Neighbors are explored right, left, down, up, so among several shortest
/// paths the result is always the same one. Returns an empty path when the goal
/// is unreachable, which only happens on hand-authored mazes.
pub fn shortest_path(maze: &Maze) -> Vec<Cell> {
    let start = maze.start();
    let goal = maze.goal();

    let mut came_from: HashMap<Cell, Option<Cell>> = HashMap::with_capacity(maze.cell_count());
    let mut queue = VecDeque::new();
    came_from.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return reconstruct_path(&came_from, goal);
        }
        for next in maze.open_neighbors(current) {
            if let Entry::Vacant(slot) = came_from.entry(next) {
                slot.insert(Some(current));
                queue.push_back(next);
            }
        }
    }

    debug!(
        start = ?start,
        goal = ?goal,
        visited = came_from.len(),
        "goal unreachable"
    );
    Vec::new()
}

fn reconstruct_path(came_from: &HashMap<Cell, Option<Cell>>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(&Some(prev)) = came_from.get(&cursor) {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

/// Translates a cell path into blocks for a robot initially facing `facing`.
///
/// Each step emits the turns needed to face the next cell (one `turnLeft`,
/// one `turnRight`, or two `turnRight` for a reversal) followed by `forward`.
/// Consecutive cells that are not orthogonal neighbors are skipped.
pub fn path_to_blocks(path: &[Cell], facing: Direction) -> Program {
    let mut program = Program::new();
    let mut heading = facing;
    for pair in path.windows(2) {
        let Some(wanted) = Direction::from_delta(pair[1] - pair[0]) else {
            continue;
        };
        if wanted == heading.turned_left() {
            emit(&mut program, BlockKind::TurnLeft);
        } else if wanted == heading.turned_right() {
            emit(&mut program, BlockKind::TurnRight);
        } else if wanted != heading {
            emit(&mut program, BlockKind::TurnRight);
            emit(&mut program, BlockKind::TurnRight);
        }
        heading = wanted;
        emit(&mut program, BlockKind::Forward);
    }
    program
}

fn emit(program: &mut Program, kind: BlockKind) {
    let id = format!("hint-{}", program.len());
    program.push(Block::new(id, kind));
}

/// A program that walks the shortest path, or `None` when the goal is unreachable.
pub fn hint(maze: &Maze, facing: Direction) -> Option<Program> {
    let path = shortest_path(maze);
    if path.is_empty() {
        return None;
    }
    Some(path_to_blocks(&path, facing))
}
