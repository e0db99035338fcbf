//! Linear programming capability used by the coloring pipeline.
//!
//! The pipeline only talks to the [`LpSolver`] trait; any backend able to
//! answer primal values, slacks and coefficients can be plugged in.

/// `good_lp` (minilp) backend
pub mod good_lp_backend;

pub use good_lp_backend::GoodLpSolver;

/// handle on a variable of the linear program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// handle on a constraint of the linear program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub usize);

/// direction of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// lhs >= rhs
    Geq,
    /// lhs <= rhs
    Leq,
    /// lhs = rhs
    Eq,
}

/// terminal status of an optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// optimal solution found
    Optimal,
    /// no feasible point
    Infeasible,
    /// objective unbounded
    Unbounded,
    /// numerical or internal failure of the backend
    Error,
}

/** affine expression: ∑ coeff.var + constant */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// empty expression (value 0)
    pub fn new() -> Self { Self::default() }

    /// adds coeff.var
    pub fn add_term(&mut self, var:VarId, coeff:f64) {
        self.terms.push((var, coeff));
    }

    /// adds a literal: `var`, or `1 - var` if complemented
    pub fn add_literal(&mut self, var:VarId, complemented:bool) {
        if complemented {
            self.constant += 1.;
            self.terms.push((var, -1.));
        } else {
            self.terms.push((var, 1.));
        }
    }

    /// adds a constant
    pub fn add_constant(&mut self, c:f64) { self.constant += c; }

    /// appends every term (and the constant) of another expression
    pub fn extend(&mut self, other:&LinearExpr) {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
    }

    /// builder version of add_term
    pub fn with_term(mut self, var:VarId, coeff:f64) -> Self {
        self.add_term(var, coeff);
        self
    }

    /// terms (may contain the same variable several times unless merged)
    pub fn terms(&self) -> &[(VarId, f64)] { &self.terms }

    /// constant part
    pub fn constant(&self) -> f64 { self.constant }

    /// merges duplicated variables and drops zero coefficients
    pub fn merged(mut self) -> Self {
        self.terms.sort_by_key(|(v,_)| *v);
        let mut res:Vec<(VarId, f64)> = Vec::with_capacity(self.terms.len());
        for (v,c) in self.terms {
            if let Some((last, acc)) = res.last_mut() {
                if *last == v {
                    *acc += c;
                    continue;
                }
            }
            res.push((v,c));
        }
        res.retain(|(_,c)| *c != 0.);
        Self { terms: res, constant: self.constant }
    }

    /// coefficient of a variable (0 if absent)
    pub fn coefficient(&self, var:VarId) -> f64 {
        self.terms.iter().filter(|(v,_)| *v == var).map(|(_,c)| c).sum()
    }

    /// evaluates the expression given variable values
    pub fn evaluate<F:Fn(VarId) -> f64>(&self, value:F) -> f64 {
        self.constant + self.terms.iter().map(|(v,c)| c * value(*v)).sum::<f64>()
    }
}


/**
Continuous LP solver capability (minimization).
Constraint handles and variable handles stay valid for the lifetime of the solver.
*/
pub trait LpSolver {
    /// creates a variable within [lower, upper] with the given objective coefficient
    fn add_variable(&mut self, lower:f64, upper:f64, objective_coeff:f64) -> VarId;

    /// changes the bounds of a variable
    fn set_bounds(&mut self, var:VarId, lower:f64, upper:f64);

    /// bounds of a variable
    fn bounds(&self, var:VarId) -> (f64, f64);

    /// adds `expr (sense) rhs`. The constant part of expr is moved to the right-hand side.
    fn add_constraint(&mut self, expr:LinearExpr, sense:Sense, rhs:f64) -> ConstraintId;

    /// replaces the objective (minimized)
    fn set_objective(&mut self, expr:LinearExpr);

    /// requested number of worker threads (0: backend default)
    fn set_threads(&mut self, threads:usize);

    /// solves the current model
    fn optimize(&mut self) -> LpStatus;

    /// primal value of a variable at the last optimum
    fn value_of(&self, var:VarId) -> f64;

    /// distance between the lhs and the rhs of a constraint at the last optimum (>= 0 if satisfied)
    fn slack_of(&self, constr:ConstraintId) -> f64;

    /// coefficient of a variable in a constraint
    fn coefficient(&self, constr:ConstraintId, var:VarId) -> f64;

    /// direction of a constraint
    fn sense_of(&self, constr:ConstraintId) -> Sense;

    /// constraints referencing a variable
    fn column(&self, var:VarId) -> Vec<ConstraintId>;

    /// number of constraints in the model
    fn nb_constraints(&self) -> usize;
}
