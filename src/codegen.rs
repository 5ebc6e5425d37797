//! Text renderings of a block program, shown next to the editor so learners
//! can see what their blocks look like as code.

use crate::program::{Block, BlockKind, Program};
use std::fmt::Write as _;

/// Plain-language listing between `START` and `END`, two-space indent per loop.
pub fn pseudo_code(program: &Program) -> String {
    let mut out = String::from("START\n");
    let mut depth = 0usize;
    for block in program.blocks() {
        let indent = "  ".repeat(depth);
        match block.kind {
            BlockKind::Forward => line(&mut out, &indent, "Move Forward"),
            BlockKind::TurnLeft => line(&mut out, &indent, "Turn Left 90°"),
            BlockKind::TurnRight => line(&mut out, &indent, "Turn Right 90°"),
            BlockKind::Wait => line(&mut out, &indent, "Wait 1 second"),
            BlockKind::RepeatStart => {
                line(&mut out, &indent, &format!("Repeat {} times:", block.iterations()));
                depth += 1;
            }
            BlockKind::RepeatEnd => depth = depth.saturating_sub(1),
        }
    }
    out.push_str("END");
    out
}

/// A Python function body using `for _ in range(n):` loops.
pub fn python(program: &Program) -> String {
    let mut out = String::from("# RoboMaze Program\n\ndef solve_maze():\n");
    let mut depth = 1usize;
    for block in program.blocks() {
        let indent = "    ".repeat(depth);
        match block.kind {
            BlockKind::Forward => line(&mut out, &indent, "move_forward()"),
            BlockKind::TurnLeft => line(&mut out, &indent, "turn_left()"),
            BlockKind::TurnRight => line(&mut out, &indent, "turn_right()"),
            BlockKind::Wait => line(&mut out, &indent, "wait(1)"),
            BlockKind::RepeatStart => {
                line(&mut out, &indent, &format!("for _ in range({}):", block.iterations()));
                depth += 1;
            }
            BlockKind::RepeatEnd => {
                if depth > 1 {
                    depth -= 1;
                }
            }
        }
    }
    if program.is_empty() {
        line(&mut out, "    ", "pass");
    }
    out.push_str("\n# Run the solution\nsolve_maze()\n");
    out
}

/// A JavaScript function with counted `for` loops; braces close on `repeatEnd`.
pub fn javascript(program: &Program) -> String {
    let mut out = String::from("// RoboMaze Program\n\nfunction solveMaze() {\n");
    let mut depth = 1usize;
    for block in program.blocks() {
        let indent = "  ".repeat(depth);
        match block.kind {
            BlockKind::Forward => line(&mut out, &indent, "moveForward();"),
            BlockKind::TurnLeft => line(&mut out, &indent, "turnLeft();"),
            BlockKind::TurnRight => line(&mut out, &indent, "turnRight();"),
            BlockKind::Wait => line(&mut out, &indent, "wait(1);"),
            BlockKind::RepeatStart => {
                let header = format!("for (let i = 0; i < {}; i++) {{", block.iterations());
                line(&mut out, &indent, &header);
                depth += 1;
            }
            BlockKind::RepeatEnd => {
                if depth > 1 {
                    depth -= 1;
                    line(&mut out, &"  ".repeat(depth), "}");
                }
            }
        }
    }
    // Unclosed loops still need their braces.
    while depth > 1 {
        depth -= 1;
        line(&mut out, &"  ".repeat(depth), "}");
    }
    out.push_str("}\n\n// Run the solution\nsolveMaze();\n");
    out
}

/// One-line tooltip text for a block.
pub fn describe(block: &Block) -> String {
    match block.kind {
        BlockKind::Forward => "Move Forward - Takes one step in the current direction".to_owned(),
        BlockKind::TurnLeft => "Turn Left - Rotates 90° counterclockwise".to_owned(),
        BlockKind::TurnRight => "Turn Right - Rotates 90° clockwise".to_owned(),
        BlockKind::Wait => "Wait - Pauses for 1 second".to_owned(),
        BlockKind::RepeatStart => format!(
            "Repeat {}x - Executes blocks inside multiple times",
            block.iterations()
        ),
        BlockKind::RepeatEnd => "End Repeat - Marks the end of a repeat block".to_owned(),
    }
}

fn line(out: &mut String, indent: &str, text: &str) {
    let _ = writeln!(out, "{indent}{text}");
}
