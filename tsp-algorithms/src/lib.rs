use serde::{Deserialize, Serialize};
use tsp_challenges::{DistanceMatrix, Error, Result};

pub mod ant_colony;
pub mod brute_force;
pub mod held_karp;
pub mod permutation;

/// A closed tour and its cost. The tour starts and ends at the same node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub cost: f64,
    pub tour: Vec<usize>,
}

pub(crate) fn check_start(matrix: &DistanceMatrix, start: usize) -> Result<()> {
    let nodes = matrix.num_nodes();
    if start >= nodes {
        return Err(Error::StartOutOfRange { start, nodes });
    }
    Ok(())
}

/// Rotates a closed tour so it starts and ends at `start`. Returns `None` if
/// the tour is not closed or never visits `start`.
pub fn rotate_tour(tour: &[usize], start: usize) -> Option<Vec<usize>> {
    let (last, open) = tour.split_last()?;
    if open.first() != Some(last) {
        return None;
    }
    let offset = open.iter().position(|&node| node == start)?;
    let mut rotated = Vec::with_capacity(tour.len());
    rotated.extend_from_slice(&open[offset..]);
    rotated.extend_from_slice(&open[..offset]);
    rotated.push(start);
    Some(rotated)
}
