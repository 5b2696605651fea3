use rand::rngs::mock::StepRng;
use tsp_algorithms::{
    ant_colony::{AntColony, Phase},
    held_karp,
};
use tsp_challenges::{tour_cost, verify_tour, DistanceMatrix, Error, Instance};
use tsp_structs::config::AntColonyConfig;
use tsp_utils::u8s_from_str;

fn uniform_matrix(num_nodes: usize, distance: f64) -> DistanceMatrix {
    let rows = (0..num_nodes)
        .map(|i| {
            (0..num_nodes)
                .map(|j| if i == j { 0.0 } else { distance })
                .collect()
        })
        .collect();
    DistanceMatrix::new(rows).unwrap()
}

fn instance(name: &str, num_nodes: usize) -> Instance {
    Instance::generate(&u8s_from_str(name), num_nodes, 20.0).unwrap()
}

#[test]
fn test_rejects_zero_ants() {
    let matrix = uniform_matrix(3, 1.0);
    assert!(matches!(
        AntColony::seeded(0, &matrix, AntColonyConfig::default(), 0),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_rejects_invalid_config() {
    let matrix = uniform_matrix(3, 1.0);
    let config = AntColonyConfig {
        fade: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        AntColony::seeded(4, &matrix, config, 0),
        Err(Error::InvalidConfig(_))
    ));

    let config = AntColonyConfig {
        initial_trail: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        AntColony::seeded(4, &matrix, config, 0),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_initial_state() {
    let matrix = uniform_matrix(4, 2.0);
    let colony = AntColony::seeded(3, &matrix, AntColonyConfig::default(), 0).unwrap();
    assert_eq!(colony.phase(), Phase::Idle);
    assert_eq!(colony.generation(), 0);
    assert_eq!(colony.best_cost(), f64::INFINITY);
    assert!(colony.best_tour().is_empty());
    assert!(colony.ants().is_empty());
    assert!(colony.generation_best().is_none());
    assert_eq!(colony.trail_average(), 1.0);
    assert_eq!(colony.trail()[[2, 2]], 0.0);
    assert_eq!(colony.desirability(0, 1), 0.25);
    assert_eq!(colony.num_ants(), 3);
    assert_eq!(colony.num_nodes(), 4);
}

#[test]
fn test_step_generation_stages() {
    let matrix = instance("stages", 6).matrix;
    let mut colony = AntColony::seeded(5, &matrix, AntColonyConfig::default(), 3).unwrap();
    colony.init_generation();
    assert_eq!(colony.phase(), Phase::Traveling { stage: 0 });
    assert_eq!(colony.ants().len(), 5);
    for stage in 1..=4 {
        assert!(!colony.step_generation());
        assert_eq!(colony.stage(), stage);
    }
    assert!(colony.step_generation());
    assert_eq!(colony.phase(), Phase::Closing);
    assert_eq!(colony.stage(), 5);

    assert!(colony.step_generation());
    assert!(colony.ants().iter().all(|ant| ant.tour().len() == 6));

    colony.finish_generation();
    assert_eq!(colony.phase(), Phase::Idle);
    assert_eq!(colony.generation(), 1);
    for ant in colony.ants() {
        assert_eq!(
            verify_tour(&matrix, ant.tour(), ant.start()).unwrap(),
            ant.cost()
        );
    }
}

#[test]
fn test_idle_operations() {
    let matrix = uniform_matrix(4, 1.0);
    let mut colony = AntColony::seeded(2, &matrix, AntColonyConfig::default(), 9).unwrap();
    colony.finish_generation();
    assert_eq!(colony.generation(), 0);
    assert_eq!(colony.trail_average(), 1.0);

    assert!(!colony.step_generation());
    assert_eq!(colony.phase(), Phase::Traveling { stage: 1 });
    assert!(colony.ants().iter().all(|ant| ant.tour().len() == 2));
}

#[test]
fn test_finish_completes_unfinished_tours() {
    let matrix = instance("unfinished", 7).matrix;
    let mut colony = AntColony::seeded(4, &matrix, AntColonyConfig::default(), 5).unwrap();
    colony.init_generation();
    colony.step_generation();
    colony.finish_generation();
    assert_eq!(colony.generation(), 1);
    assert_eq!(colony.best_tour().len(), 8);
    assert!(colony.ants().iter().all(|ant| ant.tour().len() == 8));
}

#[test]
fn test_two_node_trail_update() {
    let matrix = DistanceMatrix::new(vec![vec![0.0, 3.0], vec![4.0, 0.0]]).unwrap();
    let mut colony = AntColony::seeded(1, &matrix, AntColonyConfig::default(), 1).unwrap();
    assert_eq!(colony.run_generation(), 7.0);
    assert_eq!(colony.best_cost(), 7.0);
    // Faded to 0.5, plus half of each of the two unit deposits.
    assert_eq!(colony.trail()[[0, 1]], 1.5);
    assert_eq!(colony.trail()[[1, 0]], 1.5);
    assert_eq!(colony.trail_average(), 1.5);
}

#[test]
fn test_deposit_is_shared_between_directions() {
    let matrix = DistanceMatrix::new(vec![
        vec![0.0, 1.0, 50.0],
        vec![50.0, 0.0, 1.0],
        vec![1.0, 50.0, 0.0],
    ])
    .unwrap();
    let mut colony = AntColony::seeded(1, &matrix, AntColonyConfig::default(), 2).unwrap();
    colony.run_generation();
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                assert_eq!(colony.trail()[[i, j]], 1.0);
            }
        }
    }
}

#[test]
fn test_zero_draws_follow_scan_order() {
    let matrix = instance("scan_order", 5).matrix;
    let mut colony =
        AntColony::new(2, &matrix, AntColonyConfig::default(), StepRng::new(0, 0)).unwrap();
    colony.run_generation();
    for ant in colony.ants() {
        assert_eq!(ant.tour(), &[0, 1, 2, 3, 4, 0]);
    }
    assert_eq!(colony.best_tour(), &[0, 1, 2, 3, 4, 0]);
    assert_eq!(colony.best_cost(), tour_cost(&matrix, &[0, 1, 2, 3, 4, 0]));
}

#[test]
fn test_inspection_cap_forces_a_choice() {
    // Every draw is 0.8125, which no candidate weight of 1/3 or 1/2 exceeds,
    // so the ant takes whichever candidate the cap lands on.
    let matrix = uniform_matrix(4, 1.0);
    let rng = StepRng::new(0xD000_0000_0000_0000, 0);
    let mut colony = AntColony::new(1, &matrix, AntColonyConfig::default(), rng).unwrap();
    colony.run_generation();
    assert_eq!(colony.ants()[0].tour(), &[3, 0, 2, 1, 3]);
    assert_eq!(colony.best_cost(), 4.0);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let matrix = instance("reproducible", 8).matrix;
    let mut a = AntColony::seeded(10, &matrix, AntColonyConfig::default(), 77).unwrap();
    let mut b = AntColony::seeded(10, &matrix, AntColonyConfig::default(), 77).unwrap();
    for _ in 0..10 {
        assert_eq!(a.run_generation(), b.run_generation());
    }
    assert_eq!(a.best_tour(), b.best_tour());
    assert_eq!(a.best_cost(), b.best_cost());
    assert_eq!(a.trail(), b.trail());
}

#[test]
fn test_best_cost_never_increases() {
    let matrix = instance("monotone", 9).matrix;
    let mut colony = AntColony::seeded(8, &matrix, AntColonyConfig::default(), 13).unwrap();
    let mut previous = f64::INFINITY;
    for _ in 0..40 {
        let generation_cost = colony.run_generation();
        assert!(colony.best_cost() <= previous);
        assert!(colony.best_cost() <= generation_cost);
        assert_eq!(
            colony.generation_best().map(|ant| ant.cost()),
            Some(generation_cost)
        );
        assert!(colony.trail().iter().all(|&value| value >= 0.0));
        previous = colony.best_cost();
    }
    let start = colony.best_tour()[0];
    assert_eq!(
        verify_tour(&matrix, colony.best_tour(), start).unwrap(),
        colony.best_cost()
    );
}

#[test]
fn test_trail_edges() {
    let matrix = instance("edges", 6).matrix;
    let mut colony = AntColony::seeded(6, &matrix, AntColonyConfig::default(), 21).unwrap();
    let edges = colony.trail_edges();
    assert_eq!(edges.len(), 15);
    assert!(edges.iter().all(|edge| edge.from < edge.to && edge.weight == 1.0));

    for _ in 0..5 {
        colony.run_generation();
    }
    let edges = colony.trail_edges();
    assert_eq!(edges.len(), 15);
    assert!(edges.iter().all(|edge| edge.weight >= 0.0 && edge.weight <= 1.0));
    assert!(edges.iter().any(|edge| edge.weight == 1.0));
}

#[test]
fn test_converges_near_optimum() {
    let matrix = instance("converge", 7).matrix;
    let optimum = held_karp::solve(&matrix, 0).unwrap().cost;
    let mut colony = AntColony::seeded(40, &matrix, AntColonyConfig::default(), 2024).unwrap();
    for _ in 0..50 {
        colony.run_generation();
    }
    assert!(colony.best_cost() <= optimum * 1.25);
    assert!(colony.best_cost() >= optimum - 1e-9);
}
