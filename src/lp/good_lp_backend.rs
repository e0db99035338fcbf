use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, variable};
use good_lp::constraint::{eq, geq, leq};
use good_lp::solvers::minilp::minilp;

use super::{ConstraintId, LinearExpr, LpSolver, LpStatus, Sense, VarId};


/** constraint as recorded by the backend: ∑ coeff.var (sense) rhs */
#[derive(Debug, Clone)]
struct StoredConstraint {
    /// merged terms, without constant
    expr: LinearExpr,
    sense: Sense,
    rhs: f64,
}

/**
LP backend based on `good_lp` with the pure rust `minilp` simplex.

The model (bounds, constraints, objective) is recorded here and a fresh
`good_lp` problem is built at each `optimize` call, so slacks, coefficients
and columns are answered from the records.
minilp is single-threaded: the thread count is only recorded.
*/
#[derive(Debug, Default)]
pub struct GoodLpSolver {
    /// bounds[v]: (lower, upper) of variable v
    bounds: Vec<(f64, f64)>,
    /// objective (minimized)
    objective: LinearExpr,
    /// constraints in creation order
    constraints: Vec<StoredConstraint>,
    /// columns[v]: constraints referencing variable v
    columns: Vec<Vec<ConstraintId>>,
    /// values[v]: value of v at the last optimum
    values: Vec<f64>,
    /// requested number of threads
    threads: usize,
}

impl GoodLpSolver {
    /// creates an empty model
    pub fn new() -> Self { Self::default() }

    /// number of variables
    pub fn nb_variables(&self) -> usize { self.bounds.len() }

    /// requested number of threads
    pub fn threads(&self) -> usize { self.threads }

    /// left hand side of a constraint at the last optimum
    fn lhs(&self, c:&StoredConstraint) -> f64 {
        c.expr.evaluate(|v| self.values[v.0])
    }
}

impl LpSolver for GoodLpSolver {
    fn add_variable(&mut self, lower:f64, upper:f64, objective_coeff:f64) -> VarId {
        let id = VarId(self.bounds.len());
        self.bounds.push((lower, upper));
        self.columns.push(Vec::new());
        self.values.push(lower);
        if objective_coeff != 0. {
            self.objective.add_term(id, objective_coeff);
        }
        id
    }

    fn set_bounds(&mut self, var:VarId, lower:f64, upper:f64) {
        self.bounds[var.0] = (lower, upper);
    }

    fn bounds(&self, var:VarId) -> (f64, f64) { self.bounds[var.0] }

    fn add_constraint(&mut self, expr:LinearExpr, sense:Sense, rhs:f64) -> ConstraintId {
        let id = ConstraintId(self.constraints.len());
        let rhs = rhs - expr.constant();
        let mut terms = LinearExpr::new();
        for (v,c) in expr.merged().terms() {
            terms.add_term(*v, *c);
            self.columns[v.0].push(id);
        }
        self.constraints.push(StoredConstraint { expr:terms, sense, rhs });
        id
    }

    fn set_objective(&mut self, expr:LinearExpr) {
        self.objective = expr.merged();
    }

    fn set_threads(&mut self, threads:usize) {
        if threads > 1 {
            log::debug!("minilp backend is single-threaded ({} threads requested)", threads);
        }
        self.threads = threads;
    }

    fn optimize(&mut self) -> LpStatus {
        let mut problem = ProblemVariables::new();
        let vars:Vec<Variable> = self.bounds.iter()
            .map(|(lower, upper)| problem.add(variable().min(*lower).max(*upper)))
            .collect();
        let to_expression = |e:&LinearExpr| {
            let mut res = Expression::with_capacity(e.terms().len());
            for (v,c) in e.terms() { res.add_mul(*c, vars[v.0]); }
            res
        };
        let objective = to_expression(&self.objective);
        let mut model = problem.minimise(objective).using(minilp);
        for c in &self.constraints {
            let lhs = to_expression(&c.expr);
            model.add_constraint(match c.sense {
                Sense::Geq => geq(lhs, c.rhs),
                Sense::Leq => leq(lhs, c.rhs),
                Sense::Eq => eq(lhs, c.rhs),
            });
        }
        match model.solve() {
            Ok(solution) => {
                self.values = vars.iter().map(|v| solution.value(*v)).collect();
                LpStatus::Optimal
            },
            Err(ResolutionError::Infeasible) => LpStatus::Infeasible,
            Err(ResolutionError::Unbounded) => LpStatus::Unbounded,
            Err(e) => {
                log::warn!("minilp failed: {}", e);
                LpStatus::Error
            }
        }
    }

    fn value_of(&self, var:VarId) -> f64 { self.values[var.0] }

    fn slack_of(&self, constr:ConstraintId) -> f64 {
        let c = &self.constraints[constr.0];
        let lhs = self.lhs(c);
        match c.sense {
            Sense::Geq => lhs - c.rhs,
            Sense::Leq => c.rhs - lhs,
            Sense::Eq => -(lhs - c.rhs).abs(),
        }
    }

    fn coefficient(&self, constr:ConstraintId, var:VarId) -> f64 {
        self.constraints[constr.0].expr.coefficient(var)
    }

    fn sense_of(&self, constr:ConstraintId) -> Sense { self.constraints[constr.0].sense }

    fn column(&self, var:VarId) -> Vec<ConstraintId> { self.columns[var.0].clone() }

    fn nb_constraints(&self) -> usize { self.constraints.len() }
}


#[cfg(test)]
mod tests {
    use super::*;

    const EPS:f64 = 1e-6;

    #[test]
    fn test_small_lp() {
        // min -x - y  s.t. x + 2y <= 2, x,y in [0,1]
        let mut lp = GoodLpSolver::new();
        let x = lp.add_variable(0., 1., -1.);
        let y = lp.add_variable(0., 1., -1.);
        let c = lp.add_constraint(
            LinearExpr::new().with_term(x, 1.).with_term(y, 2.),
            Sense::Leq, 2.
        );
        assert_eq!(lp.optimize(), LpStatus::Optimal);
        assert!((lp.value_of(x) - 1.).abs() < EPS);
        assert!((lp.value_of(y) - 0.5).abs() < EPS);
        assert!(lp.slack_of(c).abs() < EPS);
        assert_eq!(lp.coefficient(c, y), 2.);
        assert_eq!(lp.sense_of(c), Sense::Leq);
        assert_eq!(lp.column(x), vec![c]);
    }

    #[test]
    fn test_constant_moved_to_rhs() {
        // (1 - x) >= 1  <=>  -x >= 0
        let mut lp = GoodLpSolver::new();
        let x = lp.add_variable(0., 1., -1.);
        let mut e = LinearExpr::new();
        e.add_literal(x, true);
        let c = lp.add_constraint(e, Sense::Geq, 1.);
        assert_eq!(lp.optimize(), LpStatus::Optimal);
        assert!(lp.value_of(x).abs() < EPS);
        assert!(lp.slack_of(c).abs() < EPS);
    }

    #[test]
    fn test_fixed_bounds_and_infeasibility() {
        let mut lp = GoodLpSolver::new();
        let x = lp.add_variable(0., 1., 0.);
        let y = lp.add_variable(0., 1., 0.);
        lp.add_constraint(LinearExpr::new().with_term(x, 1.).with_term(y, 1.), Sense::Geq, 1.);
        lp.set_bounds(x, 0., 0.);
        assert_eq!(lp.bounds(x), (0.,0.));
        assert_eq!(lp.optimize(), LpStatus::Optimal);
        assert!((lp.value_of(y) - 1.).abs() < EPS);
        lp.set_bounds(y, 0., 0.);
        assert_eq!(lp.optimize(), LpStatus::Infeasible);
    }
}
