//! Exact solver: Held–Karp dynamic programming over visited-subset bitmasks.
//!
//! `memo[[node, subset]]` is the cheapest cost of a path that leaves `start`,
//! visits exactly the nodes in `subset` and ends at `node`. Entries are only
//! written for subsets holding both the start bit and the bit of `node`.
//! Runs in O(2^N · N^2) time and O(2^N · N) space.

use crate::{check_start, SolveResult};
use ndarray::Array2;
use tsp_challenges::{DistanceMatrix, Error, Result};

/// Largest node count accepted by [`solve`].
pub const MAX_NODES: usize = 20;

pub fn solve(matrix: &DistanceMatrix, start: usize) -> Result<SolveResult> {
    let num_nodes = matrix.num_nodes();
    if num_nodes > MAX_NODES {
        return Err(Error::TooManyNodes {
            nodes: num_nodes,
            max: MAX_NODES,
        });
    }
    check_start(matrix, start)?;

    let memo = fill_memo(matrix, start);
    let cost = min_tour_cost(&memo, matrix, start);
    let tour = backtrack(&memo, matrix, start);
    Ok(SolveResult { cost, tour })
}

#[inline]
fn contains(subset: usize, node: usize) -> bool {
    subset & (1 << node) != 0
}

fn fill_memo(matrix: &DistanceMatrix, start: usize) -> Array2<f64> {
    let num_nodes = matrix.num_nodes();
    let mut memo = Array2::from_elem((num_nodes, 1usize << num_nodes), f64::INFINITY);

    for i in (0..num_nodes).filter(|&i| i != start) {
        memo[[i, (1 << start) | (1 << i)]] = matrix.get(start, i);
    }

    for size in 3..=num_nodes {
        for subset in Subsets::new(size, num_nodes) {
            if !contains(subset, start) {
                continue;
            }
            for next in 0..num_nodes {
                if next == start || !contains(subset, next) {
                    continue;
                }
                let state = subset ^ (1 << next);
                let mut best = f64::INFINITY;
                for end in 0..num_nodes {
                    if end == start || end == next || !contains(subset, end) {
                        continue;
                    }
                    let cost = memo[[end, state]] + matrix.get(end, next);
                    if cost < best {
                        best = cost;
                    }
                }
                memo[[next, subset]] = best;
            }
        }
    }
    memo
}

fn min_tour_cost(memo: &Array2<f64>, matrix: &DistanceMatrix, start: usize) -> f64 {
    let num_nodes = matrix.num_nodes();
    let full = (1usize << num_nodes) - 1;
    let mut best = f64::INFINITY;
    for end in (0..num_nodes).filter(|&end| end != start) {
        let cost = memo[[end, full]] + matrix.get(end, start);
        if cost < best {
            best = cost;
        }
    }
    best
}

/// Rebuilds the optimal tour from the back. Ties go to the lowest index.
fn backtrack(memo: &Array2<f64>, matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let num_nodes = matrix.num_nodes();
    let mut tour = vec![start; num_nodes + 1];
    let mut state = (1usize << num_nodes) - 1;
    let mut last = start;

    for position in (1..num_nodes).rev() {
        let mut chosen: Option<(usize, f64)> = None;
        for candidate in 0..num_nodes {
            if candidate == start || !contains(state, candidate) {
                continue;
            }
            let cost = memo[[candidate, state]] + matrix.get(candidate, last);
            if chosen.map_or(true, |(_, best)| cost < best) {
                chosen = Some((candidate, cost));
            }
        }
        if let Some((node, _)) = chosen {
            tour[position] = node;
            state ^= 1 << node;
            last = node;
        }
    }
    tour
}

/// All `size`-bit subsets of `num_nodes` bits in increasing order (Gosper's hack).
struct Subsets {
    next: usize,
    limit: usize,
}

impl Subsets {
    fn new(size: usize, num_nodes: usize) -> Self {
        Self {
            next: (1usize << size) - 1,
            limit: 1usize << num_nodes,
        }
    }
}

impl Iterator for Subsets {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next;
        if current >= self.limit {
            return None;
        }
        if current == 0 {
            self.next = self.limit;
            return Some(0);
        }
        let lowest = current & current.wrapping_neg();
        let ripple = current + lowest;
        self.next = (((ripple ^ current) >> 2) / lowest) | ripple;
        Some(current)
    }
}
