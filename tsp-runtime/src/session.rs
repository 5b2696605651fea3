use anyhow::{anyhow, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tsp_algorithms::{
    ant_colony::AntColony,
    brute_force::{self, BruteForce},
    held_karp,
};
use tsp_challenges::{DistanceMatrix, Instance, Node};
use tsp_structs::config::SessionConfig;
use tsp_utils::{u64_from_str, u8s_from_str};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    BruteForce,
    Exact,
    AntColony,
}

/// Latest outcome of one solver. `seconds` and `iterations` accumulate over
/// every frame the solver has run in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub kind: SolverKind,
    pub seconds: f64,
    pub cost: f64,
    pub tour: Vec<usize>,
    pub iterations: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResultBoard {
    pub brute_force: Option<RunRecord>,
    pub exact: Option<RunRecord>,
    pub ant_colony: Option<RunRecord>,
}

impl ResultBoard {
    pub fn get(&self, kind: SolverKind) -> Option<&RunRecord> {
        match kind {
            SolverKind::BruteForce => self.brute_force.as_ref(),
            SolverKind::Exact => self.exact.as_ref(),
            SolverKind::AntColony => self.ant_colony.as_ref(),
        }
    }

    pub fn record(&mut self, record: RunRecord) {
        let slot = match record.kind {
            SolverKind::BruteForce => &mut self.brute_force,
            SolverKind::Exact => &mut self.exact,
            SolverKind::AntColony => &mut self.ant_colony,
        };
        *slot = Some(record);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.brute_force.is_none() && self.exact.is_none() && self.ant_colony.is_none()
    }
}

/// Everything tied to one node set. Rebuilt as a whole whenever the node
/// count changes.
struct Layout {
    instance: Instance,
    colony: AntColony,
    brute: BruteForce,
}

impl Layout {
    fn build(config: &SessionConfig, seed: &str, index: u64) -> Result<Self> {
        let layout_seed = format!("{}_{}_{}", seed, index, config.num_nodes);
        let instance = Instance::generate(
            &u8s_from_str(&layout_seed),
            config.num_nodes,
            config.bounds,
        )?;
        let colony = AntColony::seeded(
            config.num_ants,
            &instance.matrix,
            config.colony.clone(),
            u64_from_str(&format!("{}_colony", layout_seed)),
        )?;
        let brute = BruteForce::new(&instance.matrix, config.start)?;
        Ok(Self {
            instance,
            colony,
            brute,
        })
    }
}

/// Frame-driven host for the three solvers over one generated node set.
///
/// A session starts paused. While running, every [`Session::tick`] spends up
/// to one frame budget on incremental brute force and runs one ant colony
/// generation.
pub struct Session {
    config: SessionConfig,
    seed: String,
    layouts_built: u64,
    layout: Layout,
    running: bool,
    frames: u64,
    brute_solved: bool,
    exact_solved: bool,
    brute_seconds: f64,
    colony_seconds: f64,
    results: ResultBoard,
}

impl Session {
    pub fn new(config: SessionConfig, seed: &str) -> Result<Self> {
        config.validate().map_err(|e| anyhow!("Invalid config: {}", e))?;
        let layout = Layout::build(&config, seed, 0)?;
        info!(
            "session created with {} nodes and {} ants",
            config.num_nodes, config.num_ants
        );
        Ok(Self {
            config,
            seed: seed.to_string(),
            layouts_built: 1,
            layout,
            running: false,
            frames: 0,
            brute_solved: false,
            exact_solved: false,
            brute_seconds: 0.0,
            colony_seconds: 0.0,
            results: ResultBoard::default(),
        })
    }

    /// Changing the node count draws a new node set and replaces the matrix,
    /// both solvers and the result board together. The incremental brute
    /// force toggle is always applied.
    pub fn reconfigure(&mut self, num_nodes: usize, incremental_brute: bool) -> Result<()> {
        if num_nodes != self.config.num_nodes {
            let mut config = self.config.clone();
            config.num_nodes = num_nodes;
            config.validate().map_err(|e| anyhow!("Invalid config: {}", e))?;
            let layout = Layout::build(&config, &self.seed, self.layouts_built)?;

            self.layouts_built += 1;
            self.config = config;
            self.layout = layout;
            self.brute_solved = false;
            self.exact_solved = false;
            self.brute_seconds = 0.0;
            self.colony_seconds = 0.0;
            self.results.clear();
            info!("session reconfigured to {} nodes", num_nodes);
        }
        self.config.incremental_brute = incremental_brute;
        Ok(())
    }

    /// Runs one host frame. Does nothing but count the frame while paused.
    pub fn tick(&mut self) {
        self.frames += 1;
        if !self.running {
            return;
        }
        if self.config.incremental_brute && !self.brute_solved {
            self.step_brute_force();
        }
        self.step_colony();
    }

    fn step_brute_force(&mut self) {
        let budget = Duration::from_micros(self.config.frame_budget_micros);
        let started = Instant::now();
        self.layout.brute.advance_for(budget);
        self.brute_seconds += started.elapsed().as_secs_f64();

        let progress = self.layout.brute.current_best();
        if progress.done {
            self.brute_solved = true;
            info!(
                "incremental brute force finished after {} permutations",
                progress.iterations
            );
        }
        self.results.record(RunRecord {
            kind: SolverKind::BruteForce,
            seconds: self.brute_seconds,
            cost: progress.cost,
            tour: progress.tour,
            iterations: progress.iterations,
        });
    }

    fn step_colony(&mut self) {
        let started = Instant::now();
        self.layout.colony.run_generation();
        self.colony_seconds += started.elapsed().as_secs_f64();

        let colony = &self.layout.colony;
        self.results.record(RunRecord {
            kind: SolverKind::AntColony,
            seconds: self.colony_seconds,
            cost: colony.best_cost(),
            tour: colony.best_tour().to_vec(),
            iterations: colony.generation(),
        });
    }

    /// Flips between running and paused and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Solves the current node set with Held–Karp once. Returns `None` when
    /// the node count is beyond what the exact solver accepts.
    pub fn solve_exact(&mut self) -> Result<Option<&RunRecord>> {
        if !self.exact_solved {
            let num_nodes = self.num_nodes();
            if num_nodes > held_karp::MAX_NODES {
                warn!(
                    "skipping exact solver: {} nodes exceeds the limit of {}",
                    num_nodes,
                    held_karp::MAX_NODES
                );
                return Ok(None);
            }
            let started = Instant::now();
            let result = held_karp::solve(self.matrix(), self.config.start)?;
            self.results.record(RunRecord {
                kind: SolverKind::Exact,
                seconds: started.elapsed().as_secs_f64(),
                cost: result.cost,
                tour: result.tour,
                iterations: 1,
            });
            self.exact_solved = true;
        }
        Ok(self.results.get(SolverKind::Exact))
    }

    /// Solves the current node set by exhaustive search in one call, which
    /// also retires the incremental search.
    pub fn solve_brute_eager(&mut self) -> Result<Option<&RunRecord>> {
        if !self.brute_solved {
            let started = Instant::now();
            let result = brute_force::solve_eager(self.matrix(), self.config.start)?;
            self.results.record(RunRecord {
                kind: SolverKind::BruteForce,
                seconds: started.elapsed().as_secs_f64(),
                cost: result.cost,
                tour: result.tour,
                iterations: result.permutation_count,
            });
            self.brute_solved = true;
        }
        Ok(self.results.get(SolverKind::BruteForce))
    }

    pub fn results(&self) -> &ResultBoard {
        &self.results
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn num_nodes(&self) -> usize {
        self.layout.instance.num_nodes()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.layout.instance.nodes
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.layout.instance.matrix
    }

    pub fn colony(&self) -> &AntColony {
        &self.layout.colony
    }

    pub fn brute_force(&self) -> &BruteForce {
        &self.layout.brute
    }
}
