use crate::serializable_struct;
use serde::{Deserialize, Serialize};

serializable_struct! {
    /// Tunables of the ant colony search.
    AntColonyConfig {
        /// Exponent applied to the trail strength of an edge.
        pheromone_power: f64 = 1.0,
        /// Exponent applied to the inverse edge length. Larger values favour short edges.
        distance_power: f64 = 2.0,
        /// Fraction of the trail that survives each generation.
        fade: f64 = 0.5,
        /// Exponent applied to `best_cost / ant_cost` when depositing.
        deposit_power: f64 = 1.0,
        initial_trail: f64 = 1.0,
        /// Roulette scan gives up after `inspection_factor * num_nodes` candidates.
        inspection_factor: usize = 4,
    }
}

impl AntColonyConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("pheromone_power", self.pheromone_power),
            ("distance_power", self.distance_power),
            ("deposit_power", self.deposit_power),
        ] {
            if !value.is_finite() {
                return Err(format!("{} must be finite, got {}", name, value));
            }
        }
        if !(0.0..=1.0).contains(&self.fade) {
            return Err(format!("fade must be within [0, 1], got {}", self.fade));
        }
        if !self.initial_trail.is_finite() || self.initial_trail <= 0.0 {
            return Err(format!(
                "initial_trail must be finite and positive, got {}",
                self.initial_trail
            ));
        }
        if self.inspection_factor == 0 {
            return Err("inspection_factor must be at least 1".to_string());
        }
        Ok(())
    }
}

serializable_struct! {
    SessionConfig {
        num_nodes: usize = 8,
        /// Nodes are drawn from `[-bounds, bounds]` on both axes.
        bounds: f64 = 20.0,
        num_ants: usize = 40,
        start: usize = 0,
        /// Step brute force under the frame budget instead of solving it eagerly.
        incremental_brute: bool = true,
        frame_budget_micros: u64 = 16_000,
        colony: AntColonyConfig = AntColonyConfig::default(),
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.num_nodes < 2 {
            return Err(format!("num_nodes must be at least 2, got {}", self.num_nodes));
        }
        if !self.bounds.is_normal() || self.bounds < 0.0 {
            return Err(format!("bounds must be a positive normal number, got {}", self.bounds));
        }
        if self.num_ants == 0 {
            return Err("num_ants must be at least 1".to_string());
        }
        if self.start >= self.num_nodes {
            return Err(format!(
                "start ({}) must be below num_nodes ({})",
                self.start, self.num_nodes
            ));
        }
        self.colony.validate()
    }
}
