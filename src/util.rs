use std::fs::File;
use std::io::{BufWriter, Write};

use clap::ArgMatches;
use serde_json::Value;

use crate::{
    color::{ColorCount, ConflictGraph, ConflictModel},
    error::{ColoringError, ColoringResult},
    settings::LpColoringSettings,
};

/** command line parameters of the LP coloring executable */
#[derive(Debug)]
pub struct LpColoringParams {
    /// instance filename
    pub inst_filename: String,
    /// conflict graph read from the instance
    pub graph: ConflictGraph,
    /// run settings
    pub settings: LpColoringSettings,
    /// solution file (`vertex color` per line)
    pub sol_file: Option<String>,
    /// performance statistics file (JSON)
    pub perf_file: Option<String>,
    /// graphviz output of the colored graph
    pub dot_file: Option<String>,
}

fn parse_arg<T:std::str::FromStr>(main_args:&ArgMatches, name:&str, default:T) -> ColoringResult<T> {
    match main_args.value_of(name) {
        None => Ok(default),
        Some(s) => s.parse::<T>()
            .map_err(|_| ColoringError::Parse(format!("invalid value for {}: {}", name, s))),
    }
}

/** reads command line input and the instance */
pub fn read_params(main_args:ArgMatches) -> ColoringResult<LpColoringParams> {
    let inst_filename = main_args.value_of("instance")
        .ok_or_else(|| ColoringError::Parse("missing instance filename".to_string()))?
        .to_string();
    let nb_colors:usize = parse_arg(&main_args, "colors", 4)?;
    let color_count = ColorCount::from_nb_colors(nb_colors)
        .ok_or_else(|| ColoringError::Parse(format!("unsupported number of colors: {} (3 or 4)", nb_colors)))?;
    let threads:usize = parse_arg(&main_args, "threads", 0)?;
    let settings = LpColoringSettings::default()
        .with_threads(threads)
        .with_odd_cycle_cuts(!main_args.is_present("no-cuts"))
        .with_refinement(!main_args.is_present("no-refine"));
    // output files
    let sol_file = main_args.value_of("solution").map(|e| {
        println!("printing solutions in: {}", e);
        e.to_string()
    });
    let perf_file = main_args.value_of("perf").map(|e| {
        println!("printing perfs in: {}", e);
        e.to_string()
    });
    let dot_file = main_args.value_of("dot").map(|e| {
        println!("printing graphviz in: {}", e);
        e.to_string()
    });
    // read instance file
    let graph = ConflictGraph::from_file(inst_filename.as_str(), color_count)?;
    graph.display_statistics();
    println!("=======================");
    Ok(LpColoringParams { inst_filename, graph, settings, sol_file, perf_file, dot_file })
}

/// writes the coloring: one `vertex color` line per vertex
pub fn write_solution(filename:&str, model:&dyn ConflictModel) -> ColoringResult<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    for v in model.vertices() {
        match model.color(v) {
            Some(c) => writeln!(file, "{} {}", v, c)?,
            None => writeln!(file, "{} -", v)?,
        }
    }
    file.flush()?;
    Ok(())
}

/** writes the colored conflict graph in the graphviz format.
Conflicting edges are drawn in bold red.
*/
pub fn write_graphviz(filename:&str, model:&dyn ConflictModel) -> ColoringResult<()> {
    const PALETTE:[&str ; 4] = ["lightblue", "palegreen", "gold", "salmon"];
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "graph conflicts {{")?;
    for v in model.vertices() {
        match model.color(v) {
            Some(c) => writeln!(
                file, "  {} [label=\"{}:{}\", style=filled, fillcolor={}];",
                v, v, c, PALETTE[c as usize % PALETTE.len()]
            )?,
            None => writeln!(file, "  {};", v)?,
        }
    }
    for e in model.edges() {
        let conflict = match (model.color(e.u), model.color(e.v)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if conflict {
            writeln!(file, "  {} -- {} [label={}, color=red, style=bold];", e.u, e.v, e.weight)?;
        } else {
            writeln!(file, "  {} -- {} [label={}];", e.u, e.v, e.weight)?;
        }
    }
    writeln!(file, "}}")?;
    file.flush()?;
    Ok(())
}

/// exports search results to files
pub fn export_results(
    model:&dyn ConflictModel,
    stats:&Value,
    perf_file:Option<String>,
    sol_file:Option<String>,
    dot_file:Option<String>,
) -> ColoringResult<()> {
    // export statistics
    if let Some(filename) = perf_file {
        let mut file = BufWriter::new(File::create(filename)?);
        serde_json::to_writer(&mut file, stats)?;
        file.flush()?;
    }
    // export solution
    if let Some(filename) = sol_file {
        write_solution(filename.as_str(), model)?;
    }
    if let Some(filename) = dot_file {
        write_graphviz(filename.as_str(), model)?;
    }
    Ok(())
}
