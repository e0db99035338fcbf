use std::collections::HashSet;

use crate::color::{ColorCode, ColorCount, ConflictModel, VertexId};
use crate::error::{ColoringError, ColoringResult};
use crate::lp::{ConstraintId, LinearExpr, LpSolver, LpStatus, Sense, VarId};
use crate::settings::LpColoringSettings;


/** number of non-integer (and exactly half-integer) variables at the current optimum */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonIntegerSnapshot {
    /// fractional vertex variables
    pub vertex_non_integer: usize,
    /// vertex variables at 0.5
    pub vertex_half_integer: usize,
    /// fractional edge variables
    pub edge_non_integer: usize,
    /// edge variables at 0.5
    pub edge_half_integer: usize,
}

impl NonIntegerSnapshot {
    /// snapshot taken before the first solve
    pub fn unbounded() -> Self {
        Self {
            vertex_non_integer: usize::MAX,
            vertex_half_integer: usize::MAX,
            edge_non_integer: usize::MAX,
            edge_half_integer: usize::MAX,
        }
    }

    /// true if some vertex variable is still fractional and strictly fewer than in prev
    pub fn improves_on(&self, prev:&NonIntegerSnapshot) -> bool {
        self.vertex_non_integer > 0 && self.vertex_non_integer < prev.vertex_non_integer
    }
}


/**
Continuous relaxation of the 2-bit coloring problem.
 - bits (2v, 2v+1): color code of vertex v, within [0,1]
 - one variable per edge (bookkeeping only, never constrained)
 - disjunction constraints: the codes of conflicting vertices differ
 - 3 colors: bit0 + bit1 <= 1 for every vertex

Owned by a single coloring run.
*/
#[derive(Debug)]
pub struct RelaxationModel<S:LpSolver> {
    /// LP backend
    solver: S,
    /// color_bits[2v+i]: bit i of vertex v
    color_bits: Vec<VarId>,
    /// edge_bits[e]: variable of edge e
    edge_bits: Vec<VarId>,
    /// current objective (accumulated by the objective tuning)
    objective: LinearExpr,
    /// labels[c]: name of constraint c
    labels: Vec<String>,
    /// next constraint number
    next_constr_id: usize,
    /// vertex sets (sorted) of the odd cycles already cut
    cut_cycles: HashSet<Vec<VertexId>>,
    /// color policy
    color_count: ColorCount,
    /// number of LP solves performed
    nb_solves: usize,
}

impl<S:LpSolver> RelaxationModel<S> {

    /** builds the initial relaxation (zero objective):
     1. two [0,1] variables per vertex, one per edge
     2. four disjunction constraints per conflict edge
     3. bit0 + bit1 <= 1 per vertex if only 3 colors are available
     4. precolored vertices are fixed to their code, otherwise the maximum degree vertex is fixed to (0,0)
    */
    pub fn build(model:&dyn ConflictModel, mut solver:S, settings:&LpColoringSettings) -> ColoringResult<Self> {
        let n = model.nb_vertices();
        solver.set_threads(settings.threads);
        let mut color_bits = Vec::with_capacity(2*n);
        for _ in 0..2*n {
            color_bits.push(solver.add_variable(0., 1., 0.));
        }
        let edge_bits = model.edges().iter()
            .map(|_| solver.add_variable(0., 1., 0.))
            .collect();
        let mut res = Self {
            solver,
            color_bits,
            edge_bits,
            objective: LinearExpr::new(),
            labels: Vec::new(),
            next_constr_id: 0,
            cut_cycles: HashSet::new(),
            color_count: model.color_count(),
            nb_solves: 0,
        };
        res.solver.set_objective(LinearExpr::new());
        // disjunction constraints
        for e in model.edges() {
            if e.weight <= 0 {
                return Err(ColoringError::InvalidEdgeWeight { u:e.u, v:e.v, weight:e.weight });
            }
            if e.u == e.v {
                log::warn!("ignoring self-loop on vertex {}", e.u);
                continue;
            }
            res.add_disjunction(e.u, e.v);
        }
        // 3 colors: code (1,1) forbidden
        if res.color_count == ColorCount::Three {
            for v in model.vertices() {
                let expr = LinearExpr::new()
                    .with_term(res.bit(v, 0), 1.)
                    .with_term(res.bit(v, 1), 1.);
                res.add_constraint("R", expr, Sense::Leq, 1.);
            }
        }
        // precolored vertices keep their color. Without any, fix an anchor.
        if model.has_precolored() {
            for v in model.vertices() {
                if let Some(c) = model.precolor(v) {
                    res.fix_vertex(v, ColorCode::from_color(c));
                }
            }
        } else if let Some(anchor) = max_degree_vertex(model) {
            log::debug!("anchor vertex: {} (degree {})", anchor, model.degree(anchor));
            res.fix_vertex(anchor, ColorCode::new(false, false));
        }
        log::info!(
            "relaxation built: {} variables, {} constraints",
            res.color_bits.len() + res.edge_bits.len(), res.solver.nb_constraints()
        );
        Ok(res)
    }

    /** adds the four constraints forbidding u and v to share the same code.
    For each code (c0,c1): lit(u0)+lit(u1)+lit(v0)+lit(v1) >= 1 where lit(x) is
    x if the code bit is 0 and 1-x otherwise.
    */
    fn add_disjunction(&mut self, u:VertexId, v:VertexId) {
        for code in [(false,false), (true,false), (false,true), (true,true)].iter() {
            let mut expr = LinearExpr::new();
            for w in [u,v].iter() {
                expr.add_literal(self.bit(*w, 0), code.0);
                expr.add_literal(self.bit(*w, 1), code.1);
            }
            self.add_constraint("R", expr, Sense::Geq, 1.);
        }
    }

    /// adds a named constraint to the model
    pub fn add_constraint(&mut self, prefix:&str, expr:LinearExpr, sense:Sense, rhs:f64) -> ConstraintId {
        let label = format!("{}{}", prefix, self.next_constr_id);
        self.next_constr_id += 1;
        let id = self.solver.add_constraint(expr, sense, rhs);
        log::trace!("adding constraint {} ({:?} {})", label, sense, rhs);
        if self.labels.len() <= id.0 {
            self.labels.resize(id.0+1, String::new());
        }
        self.labels[id.0] = label;
        id
    }

    /// name of a constraint
    pub fn label(&self, c:ConstraintId) -> &str {
        self.labels.get(c.0).map_or("?", |s| s.as_str())
    }

    /// registers an odd cycle, returns false if a cycle on the same vertex set was already cut
    pub fn register_cycle(&mut self, cycle:&[VertexId]) -> bool {
        let mut key = cycle.to_vec();
        key.sort_unstable();
        self.cut_cycles.insert(key)
    }

    /// variable of bit i of vertex v
    pub fn bit(&self, v:VertexId, i:usize) -> VarId { self.color_bits[2*v+i] }

    /// value of the two bits of v at the current optimum
    pub fn vertex_values(&self, v:VertexId) -> (f64, f64) {
        (self.solver.value_of(self.bit(v, 0)), self.solver.value_of(self.bit(v, 1)))
    }

    /// number of vertices
    pub fn nb_vertices(&self) -> usize { self.color_bits.len() / 2 }

    /// color policy
    pub fn color_count(&self) -> ColorCount { self.color_count }

    /// fixes both bits of v (lower bound = upper bound)
    pub fn fix_vertex(&mut self, v:VertexId, code:ColorCode) {
        for i in 0..2 {
            let value = code.bit_value(i);
            self.solver.set_bounds(self.bit(v, i), value, value);
        }
    }

    /// fixed code of v, if both bits are fixed
    pub fn fixed_code(&self, v:VertexId) -> Option<ColorCode> {
        let (l0,u0) = self.solver.bounds(self.bit(v, 0));
        let (l1,u1) = self.solver.bounds(self.bit(v, 1));
        if l0 == u0 && l1 == u1 {
            Some(ColorCode::new(l0 > 0.5, l1 > 0.5))
        } else {
            None
        }
    }

    /// current objective
    pub fn objective_mut(&mut self) -> &mut LinearExpr { &mut self.objective }

    /// sends the current objective to the backend
    pub fn push_objective(&mut self) {
        self.solver.set_objective(self.objective.clone());
    }

    /// LP backend
    pub fn solver(&self) -> &S { &self.solver }

    #[cfg(test)]
    pub(crate) fn solver_mut(&mut self) -> &mut S { &mut self.solver }

    /// number of solves performed so far
    pub fn nb_solves(&self) -> usize { self.nb_solves }

    /** solves the model.
    infeasibility is fatal: the relaxation is feasible by construction (all bits at 0.5).
    */
    pub fn solve(&mut self, stage:&'static str) -> ColoringResult<()> {
        self.nb_solves += 1;
        match self.solver.optimize() {
            LpStatus::Optimal => Ok(()),
            LpStatus::Infeasible => Err(ColoringError::Infeasible { stage }),
            status => Err(ColoringError::SolverFailure { stage, status }),
        }
    }

    /// counts non-integer and half-integer variables at the current optimum
    pub fn snapshot(&self, settings:&LpColoringSettings) -> NonIntegerSnapshot {
        let count = |vars:&[VarId]| {
            let mut non_integer = 0;
            let mut half_integer = 0;
            for var in vars {
                let value = self.solver.value_of(*var);
                if !settings.is_integer(value) {
                    non_integer += 1;
                    if settings.is_half_integer(value) { half_integer += 1; }
                }
            }
            (non_integer, half_integer)
        };
        let (vertex_non_integer, vertex_half_integer) = count(&self.color_bits);
        let (edge_non_integer, edge_half_integer) = count(&self.edge_bits);
        NonIntegerSnapshot { vertex_non_integer, vertex_half_integer, edge_non_integer, edge_half_integer }
    }
}


/// returns the vertex with the largest degree (first one in case of ties), None if the graph is empty
pub fn max_degree_vertex(model:&dyn ConflictModel) -> Option<VertexId> {
    let mut res = None;
    let mut max_degree = 0;
    for v in model.vertices() {
        let d = model.degree(v);
        if res.is_none() || d > max_degree {
            res = Some(v);
            max_degree = d;
        }
    }
    res
}
