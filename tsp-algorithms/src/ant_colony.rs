//! Ant colony optimisation with resumable generations.
//!
//! A generation moves through `Idle -> Traveling { stage } -> Closing -> Idle`:
//! [`AntColony::init_generation`] places the ants, each
//! [`AntColony::step_generation`] moves every ant one node, and
//! [`AntColony::finish_generation`] closes the tours, records the best one and
//! updates the pheromone trail. The trail and the best tour persist across
//! generations for the lifetime of the colony.
//!
//! Randomness comes from the injected generator, so a seeded colony replays
//! the same trajectories.

use log::debug;
use ndarray::{Array2, ArrayView2};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tsp_challenges::{DistanceMatrix, Error, Result};
use tsp_structs::config::AntColonyConfig;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// `stage` moves have been made since the generation started.
    Traveling { stage: usize },
    /// Every ant has visited every node; the closing edge is still pending.
    Closing,
}

#[derive(Clone, Debug)]
pub struct Ant {
    start: usize,
    current: usize,
    visited: Vec<bool>,
    tour: Vec<usize>,
    cost: f64,
}

impl Ant {
    fn new(start: usize, num_nodes: usize) -> Self {
        let mut visited = vec![false; num_nodes];
        visited[start] = true;
        let mut tour = Vec::with_capacity(num_nodes + 1);
        tour.push(start);
        Self {
            start,
            current: start,
            visited,
            tour,
            cost: 0.0,
        }
    }

    fn visit(&mut self, node: usize, distance: f64) {
        self.cost += distance;
        self.current = node;
        self.visited[node] = true;
        self.tour.push(node);
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn has_visited(&self, node: usize) -> bool {
        self.visited[node]
    }

    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// Trail strength of an undirected edge, scaled so the strongest edge is 1.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EdgeIntensity {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

pub struct AntColony<R: Rng = SmallRng> {
    matrix: DistanceMatrix,
    config: AntColonyConfig,
    rng: R,
    num_ants: usize,
    ants: Vec<Ant>,
    trail: Array2<f64>,
    delta: Array2<f64>,
    phase: Phase,
    generation: u64,
    generation_best: Option<usize>,
    best_cost: f64,
    best_tour: Vec<usize>,
}

impl AntColony<SmallRng> {
    pub fn seeded(
        num_ants: usize,
        matrix: &DistanceMatrix,
        config: AntColonyConfig,
        seed: u64,
    ) -> Result<Self> {
        Self::new(num_ants, matrix, config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AntColony<R> {
    pub fn new(
        num_ants: usize,
        matrix: &DistanceMatrix,
        config: AntColonyConfig,
        rng: R,
    ) -> Result<Self> {
        if num_ants == 0 {
            return Err(Error::InvalidConfig(
                "colony needs at least one ant".to_string(),
            ));
        }
        config.validate().map_err(Error::InvalidConfig)?;

        let num_nodes = matrix.num_nodes();
        let mut trail = Array2::from_elem((num_nodes, num_nodes), config.initial_trail);
        trail.diag_mut().fill(0.0);

        Ok(Self {
            matrix: matrix.clone(),
            config,
            rng,
            num_ants,
            ants: Vec::with_capacity(num_ants),
            trail,
            delta: Array2::zeros((num_nodes, num_nodes)),
            phase: Phase::Idle,
            generation: 0,
            generation_best: None,
            best_cost: f64::INFINITY,
            best_tour: Vec::new(),
        })
    }

    /// Places every ant on a uniformly random node. Any generation in flight
    /// is discarded.
    pub fn init_generation(&mut self) {
        let num_nodes = self.matrix.num_nodes();
        self.ants.clear();
        for _ in 0..self.num_ants {
            let start = self.rng.gen_range(0..num_nodes);
            self.ants.push(Ant::new(start, num_nodes));
        }
        self.delta.fill(0.0);
        self.generation_best = None;
        self.phase = Phase::Traveling { stage: 0 };
    }

    /// Moves every ant to one unvisited node. Returns `true` once the ants
    /// have visited every node.
    ///
    /// Starts a generation first when idle, and does nothing once the tours
    /// are complete.
    pub fn step_generation(&mut self) -> bool {
        let stage = match self.phase {
            Phase::Idle => {
                self.init_generation();
                0
            }
            Phase::Traveling { stage } => stage,
            Phase::Closing => return true,
        };

        let num_nodes = self.matrix.num_nodes();
        let max_inspections = (self.config.inspection_factor * num_nodes).max(1);
        for ant in self.ants.iter_mut() {
            let next = choose_node(
                &self.matrix,
                &self.trail,
                &self.config,
                &mut self.rng,
                ant,
                max_inspections,
            );
            let distance = self.matrix.get(ant.current, next);
            ant.visit(next, distance);
        }

        let stage = stage + 1;
        if stage + 1 >= num_nodes {
            self.phase = Phase::Closing;
            true
        } else {
            self.phase = Phase::Traveling { stage };
            false
        }
    }

    /// Closes the tours, records the generation's best ant and updates the
    /// trail. Unfinished tours are completed first; does nothing when idle.
    pub fn finish_generation(&mut self) {
        match self.phase {
            Phase::Idle => return,
            Phase::Traveling { .. } => while !self.step_generation() {},
            Phase::Closing => {}
        }

        for ant in self.ants.iter_mut() {
            let distance = self.matrix.get(ant.current, ant.start);
            ant.visit(ant.start, distance);
        }

        let mut generation_best: Option<usize> = None;
        for (i, ant) in self.ants.iter().enumerate() {
            if generation_best.map_or(true, |best| ant.cost < self.ants[best].cost) {
                generation_best = Some(i);
            }
        }
        if let Some(best) = generation_best {
            let ant = &self.ants[best];
            if ant.cost < self.best_cost {
                self.best_cost = ant.cost;
                self.best_tour = ant.tour.clone();
            }
        }
        self.generation_best = generation_best;

        for ant in self.ants.iter() {
            let amount = (self.best_cost / ant.cost).powf(self.config.deposit_power);
            for edge in ant.tour.windows(2) {
                self.delta[[edge[0], edge[1]]] += amount;
            }
        }
        self.update_trail();

        self.generation += 1;
        self.phase = Phase::Idle;
        debug!(
            "generation {}: generation best {}, overall best {}, trail average {}",
            self.generation,
            self.generation_best().map_or(f64::INFINITY, Ant::cost),
            self.best_cost,
            self.trail_average()
        );
    }

    /// Runs a whole generation and returns the cost of its best ant.
    pub fn run_generation(&mut self) -> f64 {
        self.init_generation();
        while !self.step_generation() {}
        self.finish_generation();
        self.generation_best().map_or(f64::INFINITY, Ant::cost)
    }

    /// Evaporates the trail and folds in the deposits, half of each directed
    /// deposit going to either direction of the edge.
    fn update_trail(&mut self) {
        let num_nodes = self.matrix.num_nodes();
        for i in 0..num_nodes {
            for j in 0..num_nodes {
                if i == j {
                    continue;
                }
                let contribution = (self.delta[[i, j]] + self.delta[[j, i]]) / 2.0;
                self.trail[[i, j]] = self.trail[[i, j]] * self.config.fade + contribution;
            }
        }
        self.delta.fill(0.0);
    }

    pub fn desirability(&self, from: usize, to: usize) -> f64 {
        desirability(&self.matrix, &self.trail, &self.config, from, to)
    }

    /// Empty until the first generation finishes.
    pub fn best_tour(&self) -> &[usize] {
        &self.best_tour
    }

    /// Infinite until the first generation finishes.
    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    pub fn trail(&self) -> ArrayView2<'_, f64> {
        self.trail.view()
    }

    /// Mean trail strength over all off-diagonal entries.
    pub fn trail_average(&self) -> f64 {
        let num_nodes = self.matrix.num_nodes();
        let sum: f64 = self
            .trail
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, &value)| value)
            .sum();
        sum / (num_nodes * (num_nodes - 1)) as f64
    }

    /// One entry per unordered pair `from < to`.
    pub fn trail_edges(&self) -> Vec<EdgeIntensity> {
        let num_nodes = self.matrix.num_nodes();
        let mut edges = Vec::with_capacity(num_nodes * (num_nodes - 1) / 2);
        for from in 0..num_nodes {
            for to in from + 1..num_nodes {
                edges.push(EdgeIntensity {
                    from,
                    to,
                    weight: self.trail[[from, to]] + self.trail[[to, from]],
                });
            }
        }
        let max = edges.iter().fold(0.0f64, |max, edge| max.max(edge.weight));
        if max > 0.0 {
            for edge in edges.iter_mut() {
                edge.weight /= max;
            }
        }
        edges
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves made in the current generation.
    pub fn stage(&self) -> usize {
        match self.phase {
            Phase::Idle => 0,
            Phase::Traveling { stage } => stage,
            Phase::Closing => self.matrix.num_nodes() - 1,
        }
    }

    /// Number of finished generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Best ant of the last finished generation, while its ants are still around.
    pub fn generation_best(&self) -> Option<&Ant> {
        self.generation_best.and_then(|i| self.ants.get(i))
    }

    pub fn num_ants(&self) -> usize {
        self.num_ants
    }

    pub fn num_nodes(&self) -> usize {
        self.matrix.num_nodes()
    }

    pub fn config(&self) -> &AntColonyConfig {
        &self.config
    }
}

fn desirability(
    matrix: &DistanceMatrix,
    trail: &Array2<f64>,
    config: &AntColonyConfig,
    from: usize,
    to: usize,
) -> f64 {
    let pheromone = trail[[from, to]].powf(config.pheromone_power);
    let closeness = (1.0 / matrix.get(from, to)).powf(config.distance_power);
    pheromone * closeness
}

/// Roulette over the unvisited nodes, scanned cyclically from the node after
/// the ant's position. A candidate is taken when a fresh uniform draw falls
/// below its normalised desirability; after `max_inspections` candidates the
/// last one inspected is taken regardless. When every desirability has
/// vanished or overflowed, the pick is uniform over the unvisited nodes.
///
/// The ant must have at least one unvisited node.
fn choose_node<R: Rng>(
    matrix: &DistanceMatrix,
    trail: &Array2<f64>,
    config: &AntColonyConfig,
    rng: &mut R,
    ant: &Ant,
    max_inspections: usize,
) -> usize {
    let num_nodes = matrix.num_nodes();
    let from = ant.current;
    let total: f64 = (0..num_nodes)
        .filter(|&to| !ant.visited[to])
        .map(|to| desirability(matrix, trail, config, from, to))
        .sum();
    if !(total.is_finite() && total > 0.0) {
        let unvisited: Vec<usize> = (0..num_nodes).filter(|&to| !ant.visited[to]).collect();
        return unvisited[rng.gen_range(0..unvisited.len())];
    }

    let mut candidate = from;
    let mut inspected = 0;
    loop {
        candidate = (candidate + 1) % num_nodes;
        if ant.visited[candidate] {
            continue;
        }
        inspected += 1;
        let weight = desirability(matrix, trail, config, from, candidate) / total;
        if rng.gen::<f64>() < weight || inspected >= max_inspections {
            return candidate;
        }
    }
}
