use bit_set::BitSet;

use crate::color::{Color, ConflictEdge, ConflictModel, VertexId};


/// colors used by the neighbors of u, other than `other`
fn forbidden_colors(model:&dyn ConflictModel, u:VertexId, other:VertexId) -> BitSet {
    let mut res = BitSet::with_capacity(4);
    for w in model.neighbors(u) {
        if *w == other { continue; }
        if let Some(c) = model.color(*w) {
            res.insert(c as usize);
        }
    }
    res
}

/** tries to resolve a conflict on edge e.
Looks for the first pair of distinct admissible colors (c1,c2) such that c1 is
not used by another neighbor of e.u and c2 by another neighbor of e.v.
Returns true if the edge was in conflict and has been fixed.
*/
pub fn refine_edge(model:&mut dyn ConflictModel, e:&ConflictEdge) -> bool {
    match (model.color(e.u), model.color(e.v)) {
        (Some(a), Some(b)) if a == b => {},
        _ => return false,
    }
    let nb_colors = model.color_count().nb_colors();
    let forbidden_u = forbidden_colors(model, e.u, e.v);
    let forbidden_v = forbidden_colors(model, e.v, e.u);
    for c1 in (0..nb_colors).filter(|c| !forbidden_u.contains(*c)) {
        if let Some(c2) = (0..nb_colors).find(|c| *c != c1 && !forbidden_v.contains(*c)) {
            model.set_color(e.u, c1 as Color);
            model.set_color(e.v, c2 as Color);
            return true;
        }
    }
    false
}

/** greedy post refinement: tries to fix every conflicting edge once, in edge order.
A successful fix never creates a conflict on the neighboring edges.
Returns the number of fixed edges.
*/
pub fn greedy_refinement(model:&mut dyn ConflictModel) -> usize {
    let edges:Vec<ConflictEdge> = model.edges().to_vec();
    let mut count = 0;
    for e in &edges {
        if refine_edge(model, e) {
            log::trace!("conflict ({},{}) resolved", e.u, e.v);
            count += 1;
        }
    }
    count
}
