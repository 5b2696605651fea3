use anyhow::{anyhow, Result};
use clap::{arg, ArgMatches, Command};
use log::info;
use std::{fs, time::Instant};
use tsp_algorithms::{ant_colony::AntColony, brute_force, held_karp, rotate_tour};
use tsp_challenges::{verify_tour, DistanceMatrix, Instance};
use tsp_runtime::{RunRecord, Session, SolverKind};
use tsp_structs::config::SessionConfig;
use tsp_utils::{dejsonify, jsonify, u64_from_str, u8s_from_str};

fn instance_args(command: Command) -> Command {
    command
        .arg(
            arg!(--config [CONFIG] "Session config json string or path to json file")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            arg!(--nodes [NODES] "Number of nodes to generate")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--seed [SEED] "A string used in seed generation")
                .default_value("0")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            arg!(--bounds [BOUNDS] "Nodes are drawn from [-BOUNDS, BOUNDS] on both axes")
                .value_parser(clap::value_parser!(f64)),
        )
}

fn cli() -> Command {
    Command::new("tsp-runtime")
        .about("Generates travelling salesman instances and races solvers over them")
        .arg_required_else_help(true)
        .arg(arg!(-v --verbose "Log per-generation statistics").global(true))
        .subcommand(instance_args(
            Command::new("generate").about("Prints a generated instance as json"),
        ))
        .subcommand(
            instance_args(Command::new("solve").about("Solves an instance with one solver"))
                .arg(arg!(<SOLVER> "Solver to run").value_parser(["exact", "brute", "ants"]))
                .arg(
                    arg!(--start [START] "Node the tour starts and ends at")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--matrix [MATRIX] "Distance matrix json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--ants [ANTS] "Number of ants")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--generations [GENERATIONS] "Ant colony generations to run")
                        .default_value("100")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            instance_args(
                Command::new("simulate").about("Runs a paced session and prints the result board"),
            )
            .arg(
                arg!(--frames [FRAMES] "Number of frames to run")
                    .default_value("600")
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(arg!(--"no-incremental" "Do not step brute force between frames"))
            .arg(arg!(--exact "Solve with Held-Karp before the first frame"))
            .arg(arg!(--eager "Solve with eager brute force before the first frame")),
        )
}

fn main() {
    let matches = cli().get_matches();

    let mut logger = env_logger::Builder::from_default_env();
    logger.target(env_logger::Target::Stderr);
    if matches.get_flag("verbose") {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = match matches.subcommand() {
        Some(("generate", sub_m)) => generate(sub_m),
        Some(("solve", sub_m)) => solve(sub_m),
        Some(("simulate", sub_m)) => simulate(sub_m),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn seed(sub_m: &ArgMatches) -> String {
    sub_m
        .get_one::<String>("seed")
        .cloned()
        .unwrap_or_default()
}

fn generate(sub_m: &ArgMatches) -> Result<()> {
    let config = session_config(sub_m)?;
    let instance = Instance::generate(
        &u8s_from_str(&seed(sub_m)),
        config.num_nodes,
        config.bounds,
    )?;
    println!("{}", jsonify(&instance)?);
    Ok(())
}

fn solve(sub_m: &ArgMatches) -> Result<()> {
    let mut config = session_config(sub_m)?;
    let seed = seed(sub_m);
    let matrix = match sub_m.get_one::<String>("matrix") {
        Some(matrix) => load_matrix(matrix)?,
        None => Instance::generate(&u8s_from_str(&seed), config.num_nodes, config.bounds)?.matrix,
    };
    config.num_nodes = matrix.num_nodes();
    if let Some(start) = sub_m.get_one::<usize>("start") {
        config.start = *start;
    }
    config.validate().map_err(|e| anyhow!("Invalid config: {}", e))?;

    let started = Instant::now();
    let record = match sub_m.get_one::<String>("SOLVER").map(String::as_str) {
        Some("exact") => {
            let result = held_karp::solve(&matrix, config.start)?;
            RunRecord {
                kind: SolverKind::Exact,
                seconds: started.elapsed().as_secs_f64(),
                cost: result.cost,
                tour: result.tour,
                iterations: 1,
            }
        }
        Some("brute") => {
            let result = brute_force::solve_eager(&matrix, config.start)?;
            RunRecord {
                kind: SolverKind::BruteForce,
                seconds: started.elapsed().as_secs_f64(),
                cost: result.cost,
                tour: result.tour,
                iterations: result.permutation_count,
            }
        }
        Some("ants") => {
            let generations = *sub_m.get_one::<u64>("generations").unwrap();
            let mut colony = AntColony::seeded(
                config.num_ants,
                &matrix,
                config.colony.clone(),
                u64_from_str(&seed),
            )?;
            for _ in 0..generations {
                colony.run_generation();
            }
            let tour = rotate_tour(colony.best_tour(), config.start)
                .ok_or_else(|| anyhow!("Ant colony produced no tour"))?;
            let cost = verify_tour(&matrix, &tour, config.start)?;
            RunRecord {
                kind: SolverKind::AntColony,
                seconds: started.elapsed().as_secs_f64(),
                cost,
                tour,
                iterations: colony.generation(),
            }
        }
        _ => return Err(anyhow!("Invalid solver")),
    };
    println!("{}", jsonify(&record)?);
    Ok(())
}

fn simulate(sub_m: &ArgMatches) -> Result<()> {
    let mut config = session_config(sub_m)?;
    if sub_m.get_flag("no-incremental") {
        config.incremental_brute = false;
    }
    let frames = *sub_m.get_one::<u64>("frames").unwrap();

    let mut session = Session::new(config, &seed(sub_m))?;
    if sub_m.get_flag("exact") {
        session.solve_exact()?;
    }
    if sub_m.get_flag("eager") {
        session.solve_brute_eager()?;
    }
    session.set_running(true);
    for _ in 0..frames {
        session.tick();
    }
    info!("simulated {} frames", session.frames());
    println!("{}", jsonify(session.results())?);
    Ok(())
}

fn session_config(sub_m: &ArgMatches) -> Result<SessionConfig> {
    let mut config = match sub_m.get_one::<String>("config") {
        Some(config) => load_config(config)?,
        None => SessionConfig::default(),
    };
    if let Some(nodes) = sub_m.get_one::<usize>("nodes") {
        config.num_nodes = *nodes;
    }
    if let Some(bounds) = sub_m.get_one::<f64>("bounds") {
        config.bounds = *bounds;
    }
    if let Ok(Some(ants)) = sub_m.try_get_one::<usize>("ants") {
        config.num_ants = *ants;
    }
    Ok(config)
}

fn read_json_arg(arg: &str, what: &str) -> Result<String> {
    if arg.ends_with(".json") {
        fs::read_to_string(arg).map_err(|e| anyhow!("Failed to read {} file {}: {}", what, arg, e))
    } else {
        Ok(arg.to_string())
    }
}

fn load_config(config: &str) -> Result<SessionConfig> {
    let config = read_json_arg(config, "config")?;
    dejsonify::<SessionConfig>(&config).map_err(|e| anyhow!("Failed to parse config: {}", e))
}

fn load_matrix(matrix: &str) -> Result<DistanceMatrix> {
    let matrix = read_json_arg(matrix, "matrix")?;
    let rows = dejsonify::<Vec<Vec<f64>>>(&matrix)
        .map_err(|e| anyhow!("Failed to parse matrix: {}", e))?;
    Ok(DistanceMatrix::new(rows)?)
}
