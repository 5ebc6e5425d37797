// tests/program_execution.rs
use futures::executor::block_on;
use glam::IVec2;
use robomaze::{
    Block, BlockKind, CancelToken, Direction, InterpreterConfig, Maze, Outcome, Program, Robot,
    StarThresholds, WallId, execute, execute_paced,
};
use std::future::ready;

use BlockKind::*;

/// 5x3 grid, start (0, 1), goal (4, 1), with a wall between (2, 0) and (2, 1).
fn level_one() -> Maze {
    Maze::new(
        5,
        3,
        IVec2::new(0, 1),
        IVec2::new(4, 1),
        [WallId::horizontal(2, 1)],
    )
    .unwrap()
}

fn open_room(width: i32, height: i32, goal: IVec2) -> Maze {
    Maze::new(width, height, IVec2::ZERO, goal, []).unwrap()
}

fn start_robot(maze: &Maze) -> Robot {
    Robot::new(maze.start(), Direction::Right)
}

fn traced() -> InterpreterConfig {
    InterpreterConfig::default().with_trace()
}

#[test]
fn level_one_straight_run_earns_three_stars() {
    let maze = level_one();
    let program = Program::from_kinds([Forward, Forward, Forward, Forward]);
    let result = execute(start_robot(&maze), &maze, &program, &traced());

    assert!(result.success, "{}", result.message);
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.steps, 4);
    assert_eq!(result.stars, 3);
    assert_eq!(result.final_robot.position, IVec2::new(4, 1));
    assert_eq!(result.trace.as_ref().map(Vec::len), Some(4));
}

#[test]
fn repeat_body_is_unrolled_in_steps_and_trace() {
    let maze = open_room(3, 3, IVec2::new(1, 0));
    let mut program = Program::new();
    program.push(Block::new("f", Forward));
    program.push(Block::repeat("r", 3));
    program.push(Block::new("t", TurnRight));
    program.push(Block::new("e", RepeatEnd));

    let result = execute(start_robot(&maze), &maze, &program, &traced());
    assert_eq!(result.steps, 4);

    let trace = result.trace.unwrap();
    let turns: Vec<_> = trace.iter().filter(|s| s.block_kind == TurnRight).collect();
    assert_eq!(turns.len(), 3);
    assert!(turns.iter().all(|s| s.block_index == 2 && s.block_id == "t"));
    assert_eq!(trace[1].action, "Turned right, now facing down");
    assert_eq!(result.final_robot.direction, Direction::Up);
}

#[test]
fn nested_repeats_multiply() {
    // repeat 2 { repeat 2 { forward } turnRight } on a 3x3 room walks a hook.
    let maze = open_room(3, 3, IVec2::new(2, 2));
    let mut program = Program::new();
    program.push(Block::repeat("outer", 2));
    program.push(Block::repeat("inner", 2));
    program.push(Block::new("f", Forward));
    program.push(Block::new("inner-end", RepeatEnd));
    program.push(Block::new("t", TurnRight));
    program.push(Block::new("outer-end", RepeatEnd));

    let result = execute(start_robot(&maze), &maze, &program, &InterpreterConfig::default());
    assert!(result.success, "{}", result.message);
    assert_eq!(result.steps, 6);
    assert_eq!(result.final_robot.direction, Direction::Left);
    // optimal 4, steps 6 -> still within +2
    assert_eq!(result.stars, 3);
}

#[test]
fn interior_wall_stops_the_robot() {
    let maze = level_one();
    let program = Program::from_kinds([Forward, Forward, TurnLeft, Forward, Forward]);
    let result = execute(start_robot(&maze), &maze, &program, &traced());

    assert_eq!(result.outcome, Outcome::WallCollision);
    assert!(!result.success);
    assert!(result.message.contains("hit a wall"), "{}", result.message);
    assert_eq!(result.steps, 3);
    assert_eq!(result.stars, 0);
    assert_eq!(
        result.final_robot,
        Robot::new(IVec2::new(2, 1), Direction::Up)
    );

    let trace = result.trace.unwrap();
    assert_eq!(trace.len(), 4);
    let last = trace.last().unwrap();
    assert!(!last.success);
    assert_eq!(last.block_index, 3);
    assert_eq!(last.error_message.as_deref(), Some("Hit a wall!"));
    assert_eq!(last.robot_before, last.robot_after);
}

#[test]
fn boundary_counts_as_a_wall() {
    let maze = level_one();
    let program = Program::from_kinds([TurnRight, TurnRight, Forward]);
    let result = execute(start_robot(&maze), &maze, &program, &InterpreterConfig::default());
    assert_eq!(result.outcome, Outcome::WallCollision);
    assert_eq!(result.final_robot.position, IVec2::new(0, 1));
}

#[test]
fn failure_inside_loop_aborts_everything() {
    let maze = open_room(3, 1, IVec2::new(2, 0));
    let mut program = Program::new();
    program.push(Block::repeat("r", 5));
    program.push(Block::new("f", Forward));
    program.push(Block::new("e", RepeatEnd));
    program.push(Block::new("w", Wait));

    let result = execute(start_robot(&maze), &maze, &program, &traced());
    assert_eq!(result.outcome, Outcome::WallCollision);
    assert_eq!(result.steps, 2);
    assert!(result.trace.unwrap().iter().all(|s| s.block_kind == Forward));
}

#[test]
fn looping_in_a_closed_cell_hits_the_budget() {
    let maze = Maze::new(1, 1, IVec2::ZERO, IVec2::ZERO, []).unwrap();
    let mut program = Program::new();
    program.push(Block::repeat("r", 1000));
    program.push(Block::new("f", Forward));
    program.push(Block::new("e", RepeatEnd));

    let result = execute(start_robot(&maze), &maze, &program, &traced());
    assert_eq!(result.outcome, Outcome::StepBudgetExceeded);
    assert!(result.message.contains("Program too long"), "{}", result.message);
    assert_eq!(result.steps, 0);
    assert_eq!(result.final_robot, start_robot(&maze));
    assert_eq!(result.trace, Some(Vec::new()));
}

#[test]
fn deeply_nested_huge_counts_return_promptly() {
    let maze = open_room(2, 2, IVec2::ONE);
    let mut program = Program::new();
    for i in 0..64 {
        program.push(Block::repeat(format!("r{i}"), u32::MAX));
    }
    program.push(Block::new("t", TurnLeft));
    let result = execute(start_robot(&maze), &maze, &program, &InterpreterConfig::default());
    assert_eq!(result.outcome, Outcome::StepBudgetExceeded);
}

#[test]
fn empty_repeats_with_huge_counts_return_promptly() {
    let maze = Maze::new(1, 1, IVec2::ZERO, IVec2::ZERO, []).unwrap();
    let mut program = Program::new();
    program.push(Block::repeat("outer", u32::MAX));
    program.push(Block::repeat("inner", u32::MAX));
    program.push(Block::new("e1", RepeatEnd));
    program.push(Block::new("e0", RepeatEnd));
    assert_eq!(program.unrolled_len(), 0);

    let result = execute(start_robot(&maze), &maze, &program, &traced());
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.steps, 0);
    assert_eq!(result.trace, Some(Vec::new()));

    let mut single = Program::new();
    single.push(Block::repeat("r", 200_000_000));
    single.push(Block::new("e", RepeatEnd));
    let result = execute(start_robot(&maze), &maze, &single, &traced());
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.steps, 0);
}

#[test]
fn empty_repeat_bodies_execute_nothing() {
    let maze = open_room(3, 1, IVec2::new(2, 0));

    let closed = Program::from_kinds([RepeatStart, RepeatEnd]);
    let result = execute(start_robot(&maze), &maze, &closed, &traced());
    assert_eq!(result.outcome, Outcome::GoalNotReached);
    assert_eq!(result.steps, 0);

    let nested = Program::from_kinds([RepeatStart, RepeatStart, RepeatEnd, RepeatEnd, Forward]);
    let result = execute(start_robot(&maze), &maze, &nested, &traced());
    assert_eq!(result.outcome, Outcome::GoalNotReached);
    assert_eq!(result.steps, 1);
    assert_eq!(result.final_robot.position, IVec2::new(1, 0));

    let mut unclosed = Program::from_kinds([Forward, Forward]);
    unclosed.push(Block::repeat("tail", u32::MAX));
    let result = execute(start_robot(&maze), &maze, &unclosed, &traced());
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.steps, 2);
}

#[test]
fn empty_repeat_inside_a_loop_is_skipped_each_pass() {
    let maze = open_room(4, 1, IVec2::new(3, 0));
    let mut program = Program::new();
    program.push(Block::repeat("outer", 3));
    program.push(Block::repeat("never", 0));
    program.push(Block::new("w", Wait));
    program.push(Block::new("e2", RepeatEnd));
    program.push(Block::repeat("empty", u32::MAX));
    program.push(Block::new("e1", RepeatEnd));
    program.push(Block::new("f", Forward));
    program.push(Block::new("e0", RepeatEnd));

    let result = execute(start_robot(&maze), &maze, &program, &traced());
    assert!(result.success, "{}", result.message);
    assert_eq!(result.steps, 3);
}

#[test]
fn budget_takes_precedence_over_a_later_collision() {
    // The first block runs into the boundary, but the loop after it reaches
    // the ceiling, so the run is rejected before anything moves.
    let maze = open_room(2, 1, IVec2::new(1, 0));
    let mut program = Program::new();
    program.push(Block::new("up", TurnLeft));
    program.push(Block::new("bump", Forward));
    program.push(Block::repeat("r", 1000));
    program.push(Block::new("w", Wait));
    program.push(Block::new("e", RepeatEnd));

    let result = execute(start_robot(&maze), &maze, &program, &traced());
    assert_eq!(result.outcome, Outcome::StepBudgetExceeded);
    assert_eq!(result.steps, 0);
    assert_eq!(result.final_robot, start_robot(&maze));

    let config = InterpreterConfig {
        max_steps: 2000,
        ..traced()
    };
    let result = execute(start_robot(&maze), &maze, &program, &config);
    assert_eq!(result.outcome, Outcome::WallCollision);
    assert_eq!(result.steps, 1);
}

#[test]
fn budget_is_configurable() {
    let maze = open_room(4, 1, IVec2::new(3, 0));
    let program = Program::from_kinds([Forward, Forward, Forward]);
    let tight = InterpreterConfig {
        max_steps: 3,
        ..InterpreterConfig::default()
    };
    assert_eq!(
        execute(start_robot(&maze), &maze, &program, &tight).outcome,
        Outcome::StepBudgetExceeded
    );
    let roomy = InterpreterConfig {
        max_steps: 4,
        ..InterpreterConfig::default()
    };
    assert!(execute(start_robot(&maze), &maze, &program, &roomy).success);
}

#[test]
fn star_thresholds_are_configurable() {
    let maze = open_room(2, 1, IVec2::new(1, 0));
    let program = Program::from_kinds([Wait, Wait, Forward]);
    let strict = InterpreterConfig {
        stars: StarThresholds {
            three: 0,
            two: 1,
            one: 2,
        },
        ..InterpreterConfig::default()
    };
    let result = execute(start_robot(&maze), &maze, &program, &strict);
    assert!(result.success);
    assert_eq!(result.stars, 1);
}

#[test]
fn stopping_short_is_goal_not_reached() {
    let maze = level_one();
    let program = Program::from_kinds([Forward, Wait]);
    let result = execute(start_robot(&maze), &maze, &program, &InterpreterConfig::default());
    assert_eq!(result.outcome, Outcome::GoalNotReached);
    assert!(result.message.contains("Goal not reached"));
    assert_eq!(result.steps, 2);
    assert_eq!(result.stars, 0);
}

#[test]
fn passing_through_the_goal_is_not_enough() {
    let maze = open_room(3, 1, IVec2::new(1, 0));
    let program = Program::from_kinds([Forward, Forward]);
    let result = execute(start_robot(&maze), &maze, &program, &InterpreterConfig::default());
    assert_eq!(result.outcome, Outcome::GoalNotReached);
}

#[test]
fn four_turns_restore_heading() {
    let maze = level_one();
    for kind in [TurnLeft, TurnRight] {
        let program = Program::from_kinds([kind; 4]);
        let result = execute(start_robot(&maze), &maze, &program, &InterpreterConfig::default());
        assert_eq!(result.final_robot, start_robot(&maze));
        assert_eq!(result.steps, 4);
    }
}

#[test]
fn execution_is_deterministic() {
    let maze = level_one();
    let program = Program::from_kinds([
        RepeatStart, Forward, RepeatEnd, TurnLeft, Forward, Wait,
    ]);
    let config = traced();
    let first = execute(start_robot(&maze), &maze, &program, &config);
    let second = execute(start_robot(&maze), &maze, &program, &config);
    assert_eq!(first, second);
}

#[test]
fn paced_run_matches_sync_run() {
    let maze = level_one();
    let program = Program::from_kinds([Forward, Forward, Forward, Forward]);
    let config = InterpreterConfig::default();

    let mut seen = Vec::new();
    let paced = block_on(execute_paced(
        start_robot(&maze),
        &maze,
        &program,
        &config,
        CancelToken::new(),
        |robot, steps| {
            seen.push((robot.position, steps));
            ready(())
        },
    ));

    assert_eq!(paced, execute(start_robot(&maze), &maze, &program, &config));
    assert_eq!(
        seen,
        vec![
            (IVec2::new(1, 1), 1),
            (IVec2::new(2, 1), 2),
            (IVec2::new(3, 1), 3),
            (IVec2::new(4, 1), 4)
        ]
    );
}

#[test]
fn cancelling_between_steps_stops_the_run() {
    let maze = level_one();
    let program = Program::from_kinds([Forward, Forward, Forward, Forward]);
    let config = InterpreterConfig::default();
    let token = CancelToken::new();
    let handle = token.clone();

    let mut calls = 0;
    let result = block_on(execute_paced(
        start_robot(&maze),
        &maze,
        &program,
        &config,
        token,
        |_, steps| {
            calls += 1;
            if steps == 2 {
                handle.cancel();
            }
            ready(())
        },
    ));

    assert_eq!(result.outcome, Outcome::Cancelled);
    assert_eq!(result.steps, 2);
    assert_eq!(calls, 2);
    assert_eq!(result.final_robot.position, IVec2::new(2, 1));
}

#[test]
fn pre_cancelled_token_runs_nothing() {
    let maze = level_one();
    let program = Program::from_kinds([Forward]);
    let token = CancelToken::new();
    token.cancel();
    let result = block_on(execute_paced(
        start_robot(&maze),
        &maze,
        &program,
        &InterpreterConfig::default(),
        token,
        |_, _| ready(()),
    ));
    assert_eq!(result.outcome, Outcome::Cancelled);
    assert_eq!(result.steps, 0);
}
