//! Minimal faces of a planar straight-line graph.

use std::collections::HashSet;

use crate::math::polygon_2d::signed_area;
use crate::math::{Point2, EPSILON};

/// Returns the inner faces of the graph as counter-clockwise loops of
/// point indices.
///
/// Edges that lie on no cycle (dangling walls, bridges between rooms) are
/// dropped first. Each remaining half-edge is walked by turning to the
/// clockwise-next neighbour at every node, which traces bounded faces
/// counter-clockwise and the outer boundary of each component clockwise.
/// Only the counter-clockwise loops are kept.
#[must_use]
pub fn inner_cycles(points: &[Point2], edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for &(a, b) in edges {
        if a == b || a >= points.len() || b >= points.len() || adjacency[a].contains(&b) {
            continue;
        }
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let bridges = find_bridges(&adjacency);
    for &(a, b) in &bridges {
        adjacency[a].retain(|&n| n != b);
        adjacency[b].retain(|&n| n != a);
    }

    // Sort neighbours counter-clockwise by angle around each node.
    for (node, neighbours) in adjacency.iter_mut().enumerate() {
        let origin = points[node];
        neighbours.sort_by(|&a, &b| {
            let angle_a = (points[a].y - origin.y).atan2(points[a].x - origin.x);
            let angle_b = (points[b].y - origin.y).atan2(points[b].x - origin.x);
            angle_a.total_cmp(&angle_b)
        });
    }

    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut cycles = Vec::new();

    for start in 0..adjacency.len() {
        for &first in &adjacency[start] {
            if visited.contains(&(start, first)) {
                continue;
            }
            let face = walk_face(start, first, &adjacency, &mut visited);
            if face.len() < 3 {
                continue;
            }
            let polygon: Vec<Point2> = face.iter().map(|&i| points[i]).collect();
            if signed_area(&polygon) > EPSILON {
                cycles.push(face);
            }
        }
    }

    cycles
}

/// Follows half-edges from `from -> to` until the walk returns to its start.
fn walk_face(
    from: usize,
    to: usize,
    adjacency: &[Vec<usize>],
    visited: &mut HashSet<(usize, usize)>,
) -> Vec<usize> {
    let mut face = Vec::new();
    let (mut u, mut v) = (from, to);
    loop {
        if !visited.insert((u, v)) {
            break;
        }
        face.push(u);
        let neighbours = &adjacency[v];
        let Some(k) = neighbours.iter().position(|&n| n == u) else {
            break;
        };
        let w = neighbours[(k + neighbours.len() - 1) % neighbours.len()];
        u = v;
        v = w;
        if (u, v) == (from, to) {
            break;
        }
    }
    face
}

/// Tarjan's bridge search, iterative so deep wall chains cannot overflow the stack.
fn find_bridges(adjacency: &[Vec<usize>]) -> Vec<(usize, usize)> {
    let n = adjacency.len();
    let mut discovery = vec![usize::MAX; n];
    let mut low = vec![0; n];
    let mut timer = 0;
    let mut bridges = Vec::new();

    for root in 0..n {
        if discovery[root] != usize::MAX {
            continue;
        }
        discovery[root] = timer;
        low[root] = timer;
        timer += 1;
        // (node, parent, index of the next neighbour to visit)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];

        while let Some(top) = stack.len().checked_sub(1) {
            let (v, parent, next) = stack[top];
            if let Some(&w) = adjacency[v].get(next) {
                stack[top].2 += 1;
                if Some(w) == parent {
                    continue;
                }
                if discovery[w] == usize::MAX {
                    discovery[w] = timer;
                    low[w] = timer;
                    timer += 1;
                    stack.push((w, Some(v), 0));
                } else {
                    low[v] = low[v].min(discovery[w]);
                }
            } else {
                stack.pop();
                if let Some(p) = parent {
                    low[p] = low[p].min(low[v]);
                    if low[v] > discovery[p] {
                        bridges.push((p, v));
                    }
                }
            }
        }
    }

    bridges
}
