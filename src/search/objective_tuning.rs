use crate::color::ConflictModel;
use crate::lp::{LpSolver, VarId};
use crate::search::relaxation::RelaxationModel;
use crate::settings::LpColoringSettings;


/// adds `high - low` to the objective: minimizing it moves `high` down and `low` up
fn push_towards(relax:&mut RelaxationModel<impl LpSolver>, high:VarId, low:VarId) {
    let objective = relax.objective_mut();
    objective.add_term(high, 1.);
    objective.add_term(low, -1.);
}

/// adds `low - high` to the objective: minimizing it moves `high` up and `low` down
fn push_apart(relax:&mut RelaxationModel<impl LpSolver>, high:VarId, low:VarId) {
    let objective = relax.objective_mut();
    objective.add_term(low, 1.);
    objective.add_term(high, -1.);
}


/** perturbs the objective to discourage the current fractional optimum.
Terms are accumulated on top of the previous objective:
 - for each vertex with a fractional bit and two different bit values: push the
   larger bit down and the smaller one up
 - for each conflict edge and each bit plane where the endpoint values differ:
   push them further apart
Feasibility is unchanged, only the optimal vertex reached by the next solve.
Returns the number of terms added.
*/
pub fn tune_objective<S:LpSolver>(
    relax:&mut RelaxationModel<S>,
    model:&dyn ConflictModel,
    settings:&LpColoringSettings
) -> usize {
    let mut nb_terms = 0;
    // color bit pairs of each vertex
    for v in model.vertices() {
        let (value0, value1) = relax.vertex_values(v);
        if settings.is_integer(value0) && settings.is_integer(value1) { continue; }
        let (bit0, bit1) = (relax.bit(v, 0), relax.bit(v, 1));
        if value0 > value1 {
            push_towards(relax, bit0, bit1);
            nb_terms += 1;
        } else if value0 < value1 {
            push_towards(relax, bit1, bit0);
            nb_terms += 1;
        }
    }
    // color bits along conflict edges
    for e in model.edges() {
        let (values_u, values_v) = (relax.vertex_values(e.u), relax.vertex_values(e.v));
        for (i, (value_u, value_v)) in [(values_u.0, values_v.0), (values_u.1, values_v.1)].iter().enumerate() {
            let (bit_u, bit_v) = (relax.bit(e.u, i), relax.bit(e.v, i));
            if value_u > value_v {
                push_apart(relax, bit_u, bit_v);
                nb_terms += 1;
            } else if value_u < value_v {
                push_apart(relax, bit_v, bit_u);
                nb_terms += 1;
            }
        }
    }
    relax.push_objective();
    nb_terms
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::color::{ColorCount, ConflictGraph};
    use crate::lp::{GoodLpSolver, LinearExpr, Sense};

    #[test]
    fn test_integral_solution_adds_no_vertex_terms() {
        let g = ConflictGraph::from_pairs(2, &[], ColorCount::Four).unwrap();
        let settings = LpColoringSettings::default();
        let mut relax = RelaxationModel::build(&g, GoodLpSolver::new(), &settings).unwrap();
        relax.solve("test").unwrap();
        assert_eq!(tune_objective(&mut relax, &g, &settings), 0);
        assert!(relax.objective_mut().terms().is_empty());
    }

    #[test]
    fn test_fractional_pair_and_edge() {
        // force vertex 1 to bit0 = 0.75, bit1 = 0.25 with equalities
        let g = ConflictGraph::from_pairs(2, &[(0,1)], ColorCount::Four).unwrap();
        let settings = LpColoringSettings::default();
        let mut relax = RelaxationModel::build(&g, GoodLpSolver::new(), &settings).unwrap();
        let (b0, b1) = (relax.bit(1, 0), relax.bit(1, 1));
        relax.add_constraint("T", LinearExpr::new().with_term(b0, 1.), Sense::Eq, 0.75);
        relax.add_constraint("T", LinearExpr::new().with_term(b1, 1.), Sense::Eq, 0.25);
        relax.solve("test").unwrap();
        // anchor: vertex 0 is (0,0)
        assert_eq!(relax.vertex_values(0), (0., 0.));
        // 1 vertex term + 2 edge terms
        assert_eq!(tune_objective(&mut relax, &g, &settings), 3);
        let objective = relax.objective_mut().clone().merged();
        // vertex: b0 - b1, edge plane 0: u0 - b0, edge plane 1: u1 - b1
        assert_eq!(objective.coefficient(b0), 0.);
        assert_eq!(objective.coefficient(b1), -2.);
        assert_eq!(objective.coefficient(relax.bit(0, 0)), 1.);
        assert_eq!(objective.coefficient(relax.bit(0, 1)), 1.);
    }
}
