//! LP relaxation based coloring of conflict graphs.

/// continuous relaxation of the 2-bit coloring model
pub mod relaxation;

/// odd cycle detection and cutting planes
pub mod odd_cycles;

/// objective perturbation between two solves
pub mod objective_tuning;

/// rounding of half-integer vertices using the binding constraints
pub mod binding_rounding;

/// greedy post refinement of the conflicting edges
pub mod greedy_refinement;

/// full pipeline: relaxation, convergence loop, rounding, refinement
pub mod lp_coloring;
