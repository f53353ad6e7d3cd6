//! Breadth-first pathfinding on walkable tiles.

use crate::game::grid::{Grid, TILE_WALKABLE};
use std::collections::VecDeque;

/// Shortest 4-neighbour path over code-1 tiles from `start` to `goal`,
/// inclusive of both endpoints; `path[0]` is always `start`. Returns an
/// empty path when the goal is unreachable, in which case the caller holds
/// position this tick.
pub fn bfs_path(grid: &Grid, start: (i32, i32), goal: (i32, i32)) -> Vec<(i32, i32)> {
    if !grid.in_bounds(start.0, start.1) || !grid.in_bounds(goal.0, goal.1) {
        return Vec::new();
    }

    let rows = grid.rows();
    let cols = grid.cols();
    let idx = |x: i32, y: i32| x as usize * cols + y as usize;

    let mut prev: Vec<Option<(i32, i32)>> = vec![None; rows * cols];
    let mut visited = vec![false; rows * cols];
    let mut queue = VecDeque::new();

    visited[idx(start.0, start.1)] = true;
    queue.push_back(start);

    const DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    let mut reached = false;
    while let Some((cx, cy)) = queue.pop_front() {
        if (cx, cy) == goal {
            reached = true;
            break;
        }
        for (dx, dy) in DIRS {
            let (nx, ny) = (cx + dx, cy + dy);
            if grid.tile(nx, ny) == Some(TILE_WALKABLE) && !visited[idx(nx, ny)] {
                visited[idx(nx, ny)] = true;
                prev[idx(nx, ny)] = Some((cx, cy));
                queue.push_back((nx, ny));
            }
        }
    }

    if !reached {
        return Vec::new();
    }

    let mut path = vec![goal];
    let mut cur = goal;
    while cur != start {
        match prev[idx(cur.0, cur.1)] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
