use crate::color::{ColorCode, ColorCount, ConflictModel, VertexId};
use crate::error::ColoringResult;
use crate::lp::{ConstraintId, LpSolver, Sense};
use crate::search::relaxation::{NonIntegerSnapshot, RelaxationModel};
use crate::settings::LpColoringSettings;


/** coefficient of a variable in a binding constraint, with the constraint sense */
#[derive(Debug, Clone, Copy, PartialEq)]
struct Direction {
    coeff: f64,
    sense: Sense,
}

impl Default for Direction {
    fn default() -> Self { Self { coeff: 0., sense: Sense::Geq } }
}

impl Direction {
    /// true if both constraints push the variable the same way (or one ignores it)
    fn same_direction(&self, other:&Direction) -> bool {
        if self.coeff == 0. || other.coeff == 0. {
            true
        } else if self.sense == other.sense {
            (self.coeff > 0.) == (other.coeff > 0.)
        } else {
            (self.coeff > 0.) != (other.coeff > 0.)
        }
    }

    /// true if changing the lhs by delta keeps the constraint satisfied
    fn admits(&self, delta:f64, tol:f64) -> bool {
        match self.sense {
            Sense::Geq => delta >= -tol,
            Sense::Leq => delta <= tol,
            Sense::Eq => delta.abs() <= tol,
        }
    }
}

/// why a half-integer vertex was left fractional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// two binding constraints push a variable in opposite directions
    DirectionConflict(ConstraintId),
    /// every code violates some binding constraint
    NoAdmissibleCode(ConstraintId),
    /// every admissible code is already fixed on a neighbor
    NeighborCodes,
}

/// outcome of the binding analysis for one vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDecision {
    /// code compatible with every binding constraint
    Fixed(ColorCode),
    /// rounding declined, the vertex stays fractional
    Declined(DeclineReason),
}

/** counters of the rounding phase */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundingReport {
    /// number of sweeps over the vertices
    pub nb_sweeps: usize,
    /// vertices fixed to an integral code
    pub nb_rounded: usize,
    /// declined roundings (a vertex may be declined in several sweeps)
    pub nb_declined: usize,
}


/** binding analysis of a vertex whose two bits are at (0.5, 0.5).

Every code (b0,b1) is admissible at first, except (1,1) with 3 colors and the
codes in `excluded` (codes fixed on the neighbors of v). For each binding constraint referencing one of the bits, a code is removed if moving
the bits from their value to (b0,b1) changes the lhs against the constraint sense.
Rounding is declined if a binding constraint pushes a bit in the direction
opposite to the previous binding constraint, or if no code survives.
*/
pub fn binding_analysis<S:LpSolver>(
    relax:&RelaxationModel<S>,
    v:VertexId,
    excluded:&[ColorCode],
    settings:&LpColoringSettings
) -> RoundingDecision {
    let solver = relax.solver();
    let bits = [relax.bit(v, 0), relax.bit(v, 1)];
    let values = [solver.value_of(bits[0]), solver.value_of(bits[1])];
    // valid[b0][b1]: code (b0,b1) is still admissible
    let mut valid = [[true, true], [true, true]];
    if relax.color_count() == ColorCount::Three {
        valid[1][1] = false;
    }
    for code in excluded {
        valid[code.bit0 as usize][code.bit1 as usize] = false;
    }
    if valid.iter().all(|row| row.iter().all(|b| !b)) {
        return RoundingDecision::Declined(DeclineReason::NeighborCodes);
    }
    let mut constraints = solver.column(bits[0]);
    constraints.extend(solver.column(bits[1]));
    constraints.sort_unstable();
    constraints.dedup();
    let mut previous = [Direction::default() ; 2];
    for c in constraints {
        if !settings.is_binding(solver.slack_of(c)) { continue; }
        let sense = solver.sense_of(c);
        let current = [
            Direction { coeff: solver.coefficient(c, bits[0]), sense },
            Direction { coeff: solver.coefficient(c, bits[1]), sense },
        ];
        if !current[0].same_direction(&previous[0]) || !current[1].same_direction(&previous[1]) {
            return RoundingDecision::Declined(DeclineReason::DirectionConflict(c));
        }
        for (b0, row) in valid.iter_mut().enumerate() {
            for (b1, is_valid) in row.iter_mut().enumerate() {
                if !*is_valid { continue; }
                let delta = current[0].coeff * (b0 as f64 - values[0])
                    + current[1].coeff * (b1 as f64 - values[1]);
                if !current[0].admits(delta, settings.binding_tol) {
                    *is_valid = false;
                }
            }
        }
        if valid.iter().all(|row| row.iter().all(|b| !b)) {
            return RoundingDecision::Declined(DeclineReason::NoAdmissibleCode(c));
        }
        previous = current;
    }
    for (b0, row) in valid.iter().enumerate() {
        for (b1, is_valid) in row.iter().enumerate() {
            if *is_valid {
                return RoundingDecision::Fixed(ColorCode::new(b0 == 1, b1 == 1));
            }
        }
    }
    unreachable!("binding_analysis: at least one admissible code remains")
}


/** rounds half-integer vertices using the binding analysis.

Each sweep fixes the bounds of every (0.5,0.5) vertex that admits a code, then
re-solves. A vertex never takes a code already fixed on one of its neighbors
(anchor, precolor or earlier in the sweep), so the fixed vertices stay
pairwise compatible. Fixed bounds are never released. Sweeps go on while the
number of fractional vertex variables strictly decreases.
Declined vertices keep their fractional value.
*/
pub fn round_with_binding_analysis<S:LpSolver>(
    relax:&mut RelaxationModel<S>,
    model:&dyn ConflictModel,
    settings:&LpColoringSettings,
) -> ColoringResult<RoundingReport> {
    let mut report = RoundingReport::default();
    let mut prev_info = NonIntegerSnapshot::unbounded();
    let mut cur_info = relax.snapshot(settings);
    while cur_info.improves_on(&prev_info) {
        report.nb_sweeps += 1;
        let mut nb_fixed = 0;
        for v in model.vertices() {
            if relax.fixed_code(v).is_some() { continue; }
            let (value0, value1) = relax.vertex_values(v);
            if !(settings.is_half_integer(value0) && settings.is_half_integer(value1)) { continue; }
            let excluded:Vec<ColorCode> = model.neighbors(v).iter()
                .filter_map(|u| relax.fixed_code(*u))
                .collect();
            match binding_analysis(relax, v, &excluded, settings) {
                RoundingDecision::Fixed(code) => {
                    log::trace!("vertex {} rounded to color {}", v, code.color());
                    relax.fix_vertex(v, code);
                    nb_fixed += 1;
                },
                RoundingDecision::Declined(reason) => {
                    match reason {
                        DeclineReason::DirectionConflict(c) | DeclineReason::NoAdmissibleCode(c) => {
                            log::debug!("rounding declined for vertex {}: {:?} ({})", v, reason, relax.label(c));
                        },
                        DeclineReason::NeighborCodes => {
                            log::debug!("rounding declined for vertex {}: {:?}", v, reason);
                        }
                    }
                    report.nb_declined += 1;
                }
            }
        }
        if nb_fixed == 0 { break; }
        relax.solve("binding rounding")?;
        report.nb_rounded += nb_fixed;
        prev_info = cur_info;
        cur_info = relax.snapshot(settings);
    }
    log::info!(
        "binding rounding: {} rounded, {} declined ({} fractional bits left)",
        report.nb_rounded, report.nb_declined, cur_info.vertex_non_integer
    );
    Ok(report)
}


#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    use crate::color::{ConflictGraph, ConflictModel};
    use crate::error::ColoringError;
    use crate::lp::{LinearExpr, LpStatus, VarId};

    /** LP double: "solving" sets fixed variables to their bound and keeps the
    other values as scripted. Statuses can be queued. */
    #[derive(Debug, Default)]
    struct ScriptedLp {
        bounds: Vec<(f64,f64)>,
        values: Vec<f64>,
        constraints: Vec<(LinearExpr, Sense, f64)>,
        statuses: VecDeque<LpStatus>,
    }

    impl LpSolver for ScriptedLp {
        fn add_variable(&mut self, lower:f64, upper:f64, _obj:f64) -> VarId {
            self.bounds.push((lower, upper));
            self.values.push(0.5);
            VarId(self.bounds.len()-1)
        }
        fn set_bounds(&mut self, var:VarId, lower:f64, upper:f64) { self.bounds[var.0] = (lower, upper); }
        fn bounds(&self, var:VarId) -> (f64,f64) { self.bounds[var.0] }
        fn add_constraint(&mut self, expr:LinearExpr, sense:Sense, rhs:f64) -> ConstraintId {
            let rhs = rhs - expr.constant();
            let mut terms = LinearExpr::new();
            for (v,c) in expr.merged().terms() { terms.add_term(*v, *c); }
            self.constraints.push((terms, sense, rhs));
            ConstraintId(self.constraints.len()-1)
        }
        fn set_objective(&mut self, _expr:LinearExpr) {}
        fn set_threads(&mut self, _threads:usize) {}
        fn optimize(&mut self) -> LpStatus {
            for (v,(l,u)) in self.bounds.iter().enumerate() {
                if l == u { self.values[v] = *l; }
            }
            self.statuses.pop_front().unwrap_or(LpStatus::Optimal)
        }
        fn value_of(&self, var:VarId) -> f64 { self.values[var.0] }
        fn slack_of(&self, c:ConstraintId) -> f64 {
            let (expr, sense, rhs) = &self.constraints[c.0];
            let lhs = expr.evaluate(|v| self.values[v.0]);
            match sense {
                Sense::Geq => lhs - rhs,
                Sense::Leq => rhs - lhs,
                Sense::Eq => -(lhs - rhs).abs(),
            }
        }
        fn coefficient(&self, c:ConstraintId, var:VarId) -> f64 { self.constraints[c.0].0.coefficient(var) }
        fn sense_of(&self, c:ConstraintId) -> Sense { self.constraints[c.0].1 }
        fn column(&self, var:VarId) -> Vec<ConstraintId> {
            (0..self.constraints.len())
                .filter(|c| self.constraints[*c].0.coefficient(var) != 0.)
                .map(ConstraintId)
                .collect()
        }
        fn nb_constraints(&self) -> usize { self.constraints.len() }
    }

    /// relaxation where every free bit is at 0.5
    fn half_model(g:&ConflictGraph) -> RelaxationModel<ScriptedLp> {
        let mut relax = RelaxationModel::build(g, ScriptedLp::default(), &LpColoringSettings::default()).unwrap();
        relax.solve("test").unwrap();
        relax
    }

    #[test]
    fn test_direction() {
        let geq_pos = Direction { coeff:1., sense:Sense::Geq };
        let geq_neg = Direction { coeff:-1., sense:Sense::Geq };
        let leq_neg = Direction { coeff:-1., sense:Sense::Leq };
        assert!(geq_pos.same_direction(&Direction::default()));
        assert!(!geq_pos.same_direction(&geq_neg));
        assert!(geq_pos.same_direction(&leq_neg));
        assert!(geq_pos.admits(0.5, 1e-9));
        assert!(!geq_pos.admits(-0.5, 1e-9));
        assert!(leq_neg.admits(-0.5, 1e-9));
    }

    #[test]
    fn test_binding_disjunction_excludes_anchor_code() {
        // single edge, anchor at vertex 0 = (0,0), vertex 1 at (0.5,0.5):
        // binding: u0+u1+v0+v1 >= 1 only forbids (0,0) for vertex 1
        let g = ConflictGraph::from_pairs(2, &[(0,1)], ColorCount::Four).unwrap();
        let relax = half_model(&g);
        let decision = binding_analysis(&relax, 1, &[], &LpColoringSettings::default());
        assert_eq!(decision, RoundingDecision::Fixed(ColorCode::new(false, true)));
    }

    #[test]
    fn test_three_colors_excludes_last_code() {
        // 3 colors, no edge: bit0 + bit1 <= 1 is binding at (0.5,0.5) and excludes (1,1)
        let g = ConflictGraph::from_pairs(2, &[], ColorCount::Three).unwrap();
        let relax = half_model(&g);
        let decision = binding_analysis(&relax, 1, &[], &LpColoringSettings::default());
        assert_eq!(decision, RoundingDecision::Fixed(ColorCode::new(false, false)));
    }

    #[test]
    fn test_direction_conflict_declines() {
        let g = ConflictGraph::from_pairs(2, &[], ColorCount::Four).unwrap();
        let mut relax = half_model(&g);
        let (b0, b1) = (relax.bit(1, 0), relax.bit(1, 1));
        // b0 + b1 >= 1 then b0 - b1 >= 0: b1 pushed both ways
        relax.add_constraint("T", LinearExpr::new().with_term(b0, 1.).with_term(b1, 1.), Sense::Geq, 1.);
        let c = relax.add_constraint("T", LinearExpr::new().with_term(b0, 1.).with_term(b1, -1.), Sense::Geq, 0.);
        let decision = binding_analysis(&relax, 1, &[], &LpColoringSettings::default());
        assert_eq!(decision, RoundingDecision::Declined(DeclineReason::DirectionConflict(c)));
    }

    #[test]
    fn test_no_admissible_code_declines() {
        let g = ConflictGraph::from_pairs(2, &[], ColorCount::Three).unwrap();
        let mut relax = half_model(&g);
        let (b0, b1) = (relax.bit(1, 0), relax.bit(1, 1));
        // b0 + b1 <= 1 excludes (1,1), b1 <= 0.5 removes (0,1), b0 >= 0.5 removes (0,0),
        // b1 >= 0.5 removes (1,0). Each single-variable constraint leaves the other one free.
        relax.add_constraint("T", LinearExpr::new().with_term(b1, 1.), Sense::Leq, 0.5);
        relax.add_constraint("T", LinearExpr::new().with_term(b0, 1.), Sense::Geq, 0.5);
        let c = relax.add_constraint("T", LinearExpr::new().with_term(b1, 1.), Sense::Geq, 0.5);
        let decision = binding_analysis(&relax, 1, &[], &LpColoringSettings::default());
        assert_eq!(decision, RoundingDecision::Declined(DeclineReason::NoAdmissibleCode(c)));
    }

    #[test]
    fn test_rounding_sweep() {
        let g = ConflictGraph::from_pairs(3, &[(0,1),(1,2)], ColorCount::Four).unwrap();
        let mut relax = half_model(&g);
        let settings = LpColoringSettings::default();
        assert_eq!(relax.snapshot(&settings).vertex_half_integer, 4);
        let report = round_with_binding_analysis(&mut relax, &g, &settings).unwrap();
        assert_eq!(report.nb_rounded, 2);
        assert_eq!(relax.snapshot(&settings).vertex_non_integer, 0);
        for v in g.vertices() {
            assert!(relax.fixed_code(v).is_some());
        }
        // both neighbors of the anchor avoid its code
        assert_ne!(relax.fixed_code(0), Some(ColorCode::new(false, false)));
        assert_ne!(relax.fixed_code(2), Some(ColorCode::new(false, false)));
    }

    #[test]
    fn test_neighbor_codes_are_excluded() {
        let g = ConflictGraph::from_pairs(2, &[], ColorCount::Four).unwrap();
        let relax = half_model(&g);
        let settings = LpColoringSettings::default();
        let excluded = [ColorCode::new(false, false), ColorCode::new(false, true)];
        assert_eq!(
            binding_analysis(&relax, 1, &excluded, &settings),
            RoundingDecision::Fixed(ColorCode::new(true, false))
        );
        let all:Vec<ColorCode> = (0..4).map(ColorCode::from_color).collect();
        assert_eq!(
            binding_analysis(&relax, 1, &all, &settings),
            RoundingDecision::Declined(DeclineReason::NeighborCodes)
        );
    }

    #[test]
    fn test_adjacent_half_vertices_get_different_codes() {
        // triangle, anchor 0 at (0,0), 1 and 2 at (0.5,0.5) in the same sweep
        let g = ConflictGraph::from_pairs(3, &[(0,1),(1,2),(2,0)], ColorCount::Four).unwrap();
        let mut relax = half_model(&g);
        let settings = LpColoringSettings::default();
        let report = round_with_binding_analysis(&mut relax, &g, &settings).unwrap();
        assert_eq!(report.nb_rounded, 2);
        let codes:Vec<ColorCode> = g.vertices()
            .map(|v| relax.fixed_code(v).unwrap())
            .collect();
        assert_eq!(codes[0], ColorCode::new(false, false));
        assert_eq!(codes[1], ColorCode::new(false, true));
        assert_eq!(codes[2], ColorCode::new(true, false));
        assert_eq!(relax.snapshot(&settings).vertex_non_integer, 0);
    }

    #[test]
    fn test_infeasible_sweep_keeps_fixed_bounds() {
        let g = ConflictGraph::from_pairs(3, &[(0,1),(1,2)], ColorCount::Four).unwrap();
        let mut relax = half_model(&g);
        relax.solver_mut().statuses.push_back(LpStatus::Infeasible);
        let res = round_with_binding_analysis(&mut relax, &g, &LpColoringSettings::default());
        assert!(matches!(res, Err(ColoringError::Infeasible { stage:"binding rounding" })));
        for v in g.vertices() {
            assert!(relax.fixed_code(v).is_some());
        }
    }

    #[test]
    fn test_solver_failure_is_propagated() {
        let g = ConflictGraph::from_pairs(2, &[(0,1)], ColorCount::Four).unwrap();
        let mut relax = half_model(&g);
        relax.solver_mut().statuses.push_back(LpStatus::Error);
        let res = round_with_binding_analysis(&mut relax, &g, &LpColoringSettings::default());
        assert!(matches!(res, Err(ColoringError::SolverFailure { .. })));
    }
}
