use serde::Serialize;

use crate::color::{Color, ColorCode, ColorCount, ConflictModel, Weight, conflict_cost};
use crate::error::ColoringResult;
use crate::lp::LpSolver;
use crate::search::binding_rounding::round_with_binding_analysis;
use crate::search::greedy_refinement::greedy_refinement;
use crate::search::objective_tuning::tune_objective;
use crate::search::odd_cycles::add_odd_cycle_cuts;
use crate::search::relaxation::{NonIntegerSnapshot, RelaxationModel};
use crate::settings::LpColoringSettings;


/** statistics of a coloring run */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// number of LP solves
    pub nb_lp_solves: usize,
    /// iterations of the tune/cut/solve loop
    pub nb_iterations: usize,
    /// odd cycles turned into cutting planes
    pub nb_odd_cycle_cuts: usize,
    /// fractional vertex variables when the loop stopped
    pub nb_fractional_after_loop: usize,
    /// vertices rounded by the binding analysis
    pub nb_rounded: usize,
    /// roundings declined by the binding analysis
    pub nb_declined: usize,
    /// conflicting edges fixed by the greedy refinement
    pub nb_refined_edges: usize,
}

/** result of a coloring run */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColoringOutcome {
    /// colors[v]: final color of v
    pub colors: Vec<Color>,
    /// total weight of the edges whose endpoints share a color
    pub cost: Weight,
    /// number of edges whose endpoints share a color
    pub unresolved_edges: usize,
    /// run statistics
    pub stats: RunStatistics,
}


/** tune objective / add cuts / solve until the number of fractional vertex
variables stops decreasing (or reaches 0). Returns the last snapshot.
The count strictly decreases at each iteration, so there are at most 2n iterations.
*/
pub fn converge<S:LpSolver>(
    relax:&mut RelaxationModel<S>,
    model:&dyn ConflictModel,
    settings:&LpColoringSettings,
    stats:&mut RunStatistics,
) -> ColoringResult<NonIntegerSnapshot> {
    let mut prev_info = NonIntegerSnapshot::unbounded();
    let mut cur_info = relax.snapshot(settings);
    while cur_info.improves_on(&prev_info) {
        stats.nb_iterations += 1;
        log::debug!(
            "iteration {}: {} fractional vertex bits ({} at 0.5)",
            stats.nb_iterations, cur_info.vertex_non_integer, cur_info.vertex_half_integer
        );
        // push the fractional solution away from the current point
        tune_objective(relax, model, settings);
        if settings.odd_cycle_cuts {
            stats.nb_odd_cycle_cuts += add_odd_cycle_cuts(relax, model);
        }
        relax.solve("cut loop")?;
        prev_info = cur_info;
        cur_info = relax.snapshot(settings);
    }
    Ok(cur_info)
}


/** rounds the two bits of a vertex to the nearest integer (half up).
In 3-color mode, (1,1) is not admissible: the smaller bit is dropped (bit0 on ties, giving color 1).
*/
pub fn round_code(values:(f64, f64), color_count:ColorCount) -> ColorCode {
    let (value0, value1) = values;
    let code = ColorCode::new(value0.round() >= 1., value1.round() >= 1.);
    if color_count == ColorCount::Three && code.bit0 && code.bit1 {
        if value0 > value1 {
            ColorCode::new(true, false)
        } else {
            ColorCode::new(false, true)
        }
    } else {
        code
    }
}

/// writes the rounded LP solution into the model (precolored vertices keep their color)
pub fn apply_solution<S:LpSolver>(relax:&RelaxationModel<S>, model:&mut dyn ConflictModel) {
    let color_count = model.color_count();
    for v in model.vertices() {
        let color = match model.precolor(v) {
            Some(c) => c,
            None => round_code(relax.vertex_values(v), color_count).color(),
        };
        model.set_color(v, color);
    }
}


/** relaxed linear programming based coloring of a conflict graph.
 1. build the relaxation (disjunctions, 3-color constraints, anchor or precolors)
 2. solve, then tune the objective and add odd cycle cuts while the number of
    fractional vertex variables decreases
 3. round half-integer vertices using the binding constraints
 4. apply the rounded solution
 5. greedy refinement of the remaining conflicts (skipped if some vertex is precolored)

The final colors are stored in the model and returned with the conflict cost.
*/
pub fn lp_coloring<S:LpSolver>(
    model:&mut dyn ConflictModel,
    solver:S,
    settings:&LpColoringSettings,
) -> ColoringResult<ColoringOutcome> {
    let mut stats = RunStatistics::default();
    if model.nb_vertices() == 0 {
        return Ok(ColoringOutcome { colors:Vec::new(), cost:0, unresolved_edges:0, stats });
    }
    let mut relax = RelaxationModel::build(model, solver, settings)?;
    relax.solve("initial relaxation")?;
    let info = converge(&mut relax, model, settings, &mut stats)?;
    stats.nb_fractional_after_loop = info.vertex_non_integer;
    log::info!(
        "relaxation converged after {} iterations ({} cuts, {} fractional vertex bits)",
        stats.nb_iterations, stats.nb_odd_cycle_cuts, info.vertex_non_integer
    );
    let report = round_with_binding_analysis(&mut relax, model, settings)?;
    stats.nb_rounded = report.nb_rounded;
    stats.nb_declined = report.nb_declined;
    stats.nb_lp_solves = relax.nb_solves();
    apply_solution(&relax, model);
    if settings.refine && !model.has_precolored() {
        stats.nb_refined_edges = greedy_refinement(model);
    }
    let (cost, unresolved_edges) = conflict_cost(model);
    log::info!(
        "lp coloring done: cost {} ({} conflicting edges, {} fixed by refinement)",
        cost, unresolved_edges, stats.nb_refined_edges
    );
    let colors = model.vertices()
        .map(|v| model.color(v).unwrap_or(0))
        .collect();
    Ok(ColoringOutcome { colors, cost, unresolved_edges, stats })
}
