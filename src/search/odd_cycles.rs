use bit_set::BitSet;

use crate::color::{ConflictModel, VertexId};
use crate::lp::{LinearExpr, LpSolver, Sense};
use crate::search::relaxation::RelaxationModel;


/** returns the odd cycles found by a depth-first search rooted at `root`.

The search labels each discovered vertex with a parity (root: 0, child: opposite of
its parent). A vertex is "on path" between its push and its pop. When a vertex is
backtracked, every neighbor on the path with the same parity closes an odd cycle:
the path is walked back from the top until that neighbor. Only cycles containing
the root are kept. Cycles are not necessarily the shortest ones.

The path is an explicit list of frames (vertex, next neighbor to try).
*/
pub fn odd_cycles(model:&dyn ConflictModel, root:VertexId) -> Vec<Vec<VertexId>> {
    let n = model.nb_vertices();
    let mut res = Vec::new();
    let mut parity:Vec<Option<bool>> = vec![None ; n];
    let mut on_path = BitSet::with_capacity(n);
    let mut path:Vec<(VertexId, usize)> = Vec::with_capacity(n);
    parity[root] = Some(false);
    on_path.insert(root);
    path.push((root, 0));
    while let Some(frame) = path.last_mut() {
        let current = frame.0;
        let neighbors = model.neighbors(current);
        // find the next unlabelled neighbor
        let mut child = None;
        while frame.1 < neighbors.len() {
            let u = neighbors[frame.1];
            frame.1 += 1;
            if parity[u].is_none() {
                child = Some(u);
                break;
            }
        }
        match child {
            Some(u) => { // go deeper
                parity[u] = parity[current].map(|p| !p);
                on_path.insert(u);
                path.push((u, 0));
            },
            None => { // backtrack: detect odd cycles closed by current
                for u in neighbors {
                    if *u == current || !on_path.contains(*u) || parity[*u] != parity[current] {
                        continue;
                    }
                    let mut cycle = Vec::new();
                    for (w,_) in path.iter().rev() {
                        cycle.push(*w);
                        if w == u { break; }
                    }
                    if cycle.contains(&root) {
                        res.push(cycle);
                    }
                }
                path.pop();
                on_path.remove(current);
            }
        }
    }
    res
}


/** adds odd-cycle cutting planes for every vertex of the graph.
For each new odd cycle C of length L, on each bit plane b:
    1 <= ∑_{v∈C} b_v <= L-1
(an odd cycle cannot be 2-colored, so a bit plane cannot be constant along it).
Returns the number of cycles cut.
*/
pub fn add_odd_cycle_cuts<S:LpSolver>(relax:&mut RelaxationModel<S>, model:&dyn ConflictModel) -> usize {
    let mut nb_cuts = 0;
    for v in model.vertices() {
        for cycle in odd_cycles(model, v) {
            debug_assert!(cycle.len() >= 3 && cycle.len() % 2 == 1);
            if !relax.register_cycle(&cycle) { continue; }
            let len = cycle.len() as f64;
            for i in 0..2 {
                let mut expr = LinearExpr::new();
                for u in &cycle { expr.add_term(relax.bit(*u, i), 1.); }
                let prefix = format!("ODD{}_", v);
                relax.add_constraint(&prefix, expr.clone(), Sense::Geq, 1.);
                relax.add_constraint(&prefix, expr, Sense::Leq, len - 1.);
            }
            nb_cuts += 1;
        }
    }
    nb_cuts
}
