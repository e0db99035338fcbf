use std::time::Instant;

use clap::{App, load_yaml};
use serde_json::json;

use lp_color::color::ConflictModel;
use lp_color::error::ColoringResult;
use lp_color::lp::GoodLpSolver;
use lp_color::search::lp_coloring::lp_coloring;
use lp_color::util::{read_params, export_results};


fn run() -> ColoringResult<()> {
    // parse arguments
    let yaml = load_yaml!("lp_coloring.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    let mut params = read_params(main_args)?;

    // solve it
    let t_start = Instant::now();
    let outcome = lp_coloring(&mut params.graph, GoodLpSolver::new(), &params.settings)?;
    let duration = t_start.elapsed().as_secs_f32();
    println!(
        "LP coloring took {:.3} seconds. cost: {} ({} conflicting edges)",
        duration, outcome.cost, outcome.unresolved_edges
    );
    println!("\t{} \t LP solves", outcome.stats.nb_lp_solves);
    println!("\t{} \t iterations", outcome.stats.nb_iterations);
    println!("\t{} \t odd cycle cuts", outcome.stats.nb_odd_cycle_cuts);
    println!("\t{} \t rounded vertices", outcome.stats.nb_rounded);
    println!("\t{} \t declined roundings", outcome.stats.nb_declined);
    println!("\t{} \t refined edges", outcome.stats.nb_refined_edges);
    let stats = json!({
        "inst_name": params.inst_filename,
        "nb_colors": params.graph.color_count().nb_colors(),
        "time_searched": duration,
        "cost": outcome.cost,
        "unresolved_edges": outcome.unresolved_edges,
        "stats": outcome.stats,
    });

    // export results
    export_results(&params.graph, &stats, params.perf_file, params.sol_file, params.dot_file)
}

/** colors a conflict graph using the LP relaxation */
pub fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
