//! Exhaustive search over every ordering of the non-start nodes.
//!
//! [`BruteForce`] evaluates one permutation per [`BruteForce::advance`] call
//! so a host can spread the search across frames. [`solve_eager`] drives the
//! same stepper to completion, which keeps both modes in lockstep.

use crate::{
    check_start,
    permutation::{factorial, Permutations},
    SolveResult,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tsp_challenges::{DistanceMatrix, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BruteForceResult {
    pub cost: f64,
    pub tour: Vec<usize>,
    pub permutation_count: u64,
}

impl From<BruteForceResult> for SolveResult {
    fn from(result: BruteForceResult) -> Self {
        SolveResult {
            cost: result.cost,
            tour: result.tour,
        }
    }
}

/// Snapshot of an incremental search between two steps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BruteForceProgress {
    pub cost: f64,
    pub tour: Vec<usize>,
    pub iterations: u64,
    pub done: bool,
}

pub fn solve_eager(matrix: &DistanceMatrix, start: usize) -> Result<BruteForceResult> {
    let mut solver = BruteForce::new(matrix, start)?;
    while !solver.advance() {}
    Ok(solver.result())
}

#[derive(Clone, Debug)]
pub struct BruteForce {
    matrix: DistanceMatrix,
    start: usize,
    permutations: Permutations<usize>,
    total: Option<u64>,
    best_cost: f64,
    best_tour: Vec<usize>,
    iterations: u64,
    done: bool,
}

impl BruteForce {
    pub fn new(matrix: &DistanceMatrix, start: usize) -> Result<Self> {
        check_start(matrix, start)?;
        let others: Vec<usize> = (0..matrix.num_nodes()).filter(|&i| i != start).collect();
        Ok(Self {
            matrix: matrix.clone(),
            start,
            total: factorial(others.len()),
            permutations: Permutations::new(others),
            best_cost: f64::INFINITY,
            best_tour: Vec::new(),
            iterations: 0,
            done: false,
        })
    }

    /// Evaluates the next permutation. Returns `true` once every permutation
    /// has been evaluated; further calls do nothing.
    pub fn advance(&mut self) -> bool {
        if self.done {
            return true;
        }
        let Some(order) = self.permutations.next_permutation() else {
            self.finish();
            return true;
        };
        let cost = round_trip_cost(&self.matrix, self.start, order);
        if cost < self.best_cost {
            self.best_cost = cost;
            self.best_tour = closed_tour(self.start, order);
        }
        self.iterations += 1;
        if self.total == Some(self.iterations) {
            self.finish();
        }
        self.done
    }

    /// Steps until `budget` has elapsed or the search is exhausted. At least
    /// one step is taken. Returns the number of steps.
    pub fn advance_for(&mut self, budget: Duration) -> usize {
        let started = Instant::now();
        let mut steps = 0;
        while !self.done {
            self.advance();
            steps += 1;
            if started.elapsed() >= budget {
                break;
            }
        }
        steps
    }

    fn finish(&mut self) {
        self.done = true;
        debug!(
            "brute force finished after {} permutations, best cost {}",
            self.iterations, self.best_cost
        );
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// `(N-1)!`, or `None` if it overflows a `u64`.
    pub fn total_permutations(&self) -> Option<u64> {
        self.total
    }

    pub fn num_nodes(&self) -> usize {
        self.matrix.num_nodes()
    }

    /// Best tour so far. The cost is infinite and the tour empty before the
    /// first step.
    pub fn current_best(&self) -> BruteForceProgress {
        BruteForceProgress {
            cost: self.best_cost,
            tour: self.best_tour.clone(),
            iterations: self.iterations,
            done: self.done,
        }
    }

    pub fn result(&self) -> BruteForceResult {
        BruteForceResult {
            cost: self.best_cost,
            tour: self.best_tour.clone(),
            permutation_count: self.iterations,
        }
    }
}

fn round_trip_cost(matrix: &DistanceMatrix, start: usize, order: &[usize]) -> f64 {
    let mut cost = 0.0;
    let mut previous = start;
    for &node in order {
        cost += matrix.get(previous, node);
        previous = node;
    }
    cost + matrix.get(previous, start)
}

fn closed_tour(start: usize, order: &[usize]) -> Vec<usize> {
    let mut tour = Vec::with_capacity(order.len() + 2);
    tour.push(start);
    tour.extend_from_slice(order);
    tour.push(start);
    tour
}
