//! Perfect-maze generation by randomized Kruskal.
//!
//! Every cell starts in its own set. Adjacency edges are shuffled and each
//! edge whose endpoints still lie in different sets is carved open, so the
//! carved passages form a spanning tree: exactly one simple path between any
//! two cells.

use crate::error::MazeError;
use crate::maze::{Cell, Maze, WallId, all_walls};
use glam::IVec2;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::debug;

/// Disjoint sets over cell indices with path compression and union by size.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    /// Representative of `x`'s set.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`. Returns `false` if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }
}

/// An adjacency edge between two cells and the wall that separates them.
#[derive(Debug, Clone, Copy)]
struct Edge {
    a: Cell,
    b: Cell,
    wall: WallId,
}

/// Generates a perfect maze using the thread-local RNG.
///
/// # Errors
///
/// Returns [`MazeError::InvalidDimension`] if `width` or `height` is below 1.
pub fn generate(width: i32, height: i32) -> Result<Maze, MazeError> {
    generate_with_rng(width, height, &mut rand::rng())
}

/// Generates a perfect maze, drawing the edge order from `rng`.
///
/// Start is `(0, 0)` and goal is `(width - 1, height - 1)`. The same seed
/// always yields the same maze.
///
/// # Errors
///
/// Returns [`MazeError::InvalidDimension`] if `width` or `height` is below 1.
pub fn generate_with_rng<R: Rng + ?Sized>(
    width: i32,
    height: i32,
    rng: &mut R,
) -> Result<Maze, MazeError> {
    if width < 1 || height < 1 {
        return Err(MazeError::InvalidDimension { width, height });
    }

    let index = |cell: Cell| cell_index(cell, width);
    let mut sets = UnionFind::new((width as usize) * (height as usize));
    let mut walls: BTreeSet<WallId> = all_walls(width, height).collect();

    let mut edges = Vec::with_capacity(2 * (width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let a = IVec2::new(x, y);
            if x + 1 < width {
                let b = a + IVec2::X;
                edges.push(Edge { a, b, wall: WallId::left_of(b) });
            }
            if y + 1 < height {
                let b = a + IVec2::Y;
                edges.push(Edge { a, b, wall: WallId::above(b) });
            }
        }
    }

    edges.shuffle(rng);

    let mut carved = 0usize;
    for edge in &edges {
        if sets.union(index(edge.a), index(edge.b)) {
            walls.remove(&edge.wall);
            carved += 1;
        }
    }

    debug!(width, height, edges = edges.len(), carved, "generated maze");

    Maze::new(
        width,
        height,
        IVec2::ZERO,
        IVec2::new(width - 1, height - 1),
        walls,
    )
}

/// Row-major union-find slot of `cell`, computed in `usize` so wide grids
/// cannot overflow `i32`.
fn cell_index(cell: Cell, width: i32) -> usize {
    cell.y as usize * width as usize + cell.x as usize
}
