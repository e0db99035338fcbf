use std::ops::Range;

use bit_set::BitSet;
use serde::{Deserialize, Serialize};

use crate::dimacs::read_from_file;
use crate::error::{ColoringError, ColoringResult};

/** Vertex Id */
pub type VertexId = usize;

/** discrete color (mask id) */
pub type Color = u8;

/** conflict strength of an edge (must be positive) */
pub type Weight = i64;

/** number of masks available for the decomposition */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorCount {
    /// triple patterning: code (1,1) (color 3) is forbidden
    Three,
    /// quadruple patterning: every 2-bit code is allowed
    Four,
}

impl ColorCount {
    /// number of admissible colors
    pub fn nb_colors(&self) -> usize {
        match self {
            ColorCount::Three => 3,
            ColorCount::Four => 4,
        }
    }

    /// returns true if the color can be used under this policy
    pub fn admits(&self, color:Color) -> bool { (color as usize) < self.nb_colors() }

    /// builds the policy from a number of colors (3 or 4)
    pub fn from_nb_colors(k:usize) -> Option<Self> {
        match k {
            3 => Some(ColorCount::Three),
            4 => Some(ColorCount::Four),
            _ => None,
        }
    }
}

/** 2-bit encoding of a color: color = 2*bit0 + bit1 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorCode {
    /// high bit
    pub bit0: bool,
    /// low bit
    pub bit1: bool,
}

impl ColorCode {
    /// creates a code from its two bits
    pub fn new(bit0:bool, bit1:bool) -> Self { Self { bit0, bit1 } }

    /// decodes a color into its two bits (only the two lowest bits are read)
    pub fn from_color(c:Color) -> Self {
        Self { bit0: c & 2 != 0, bit1: c & 1 != 0 }
    }

    /// composed color
    pub fn color(&self) -> Color {
        ((self.bit0 as Color) << 1) + self.bit1 as Color
    }

    /// value of a bit as a float (bound value in the relaxation)
    pub fn bit_value(&self, i:usize) -> f64 {
        let b = if i == 0 { self.bit0 } else { self.bit1 };
        if b { 1. } else { 0. }
    }
}

/** weighted conflict edge */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEdge {
    /// first endpoint
    pub u: VertexId,
    /// second endpoint
    pub v: VertexId,
    /// conflict strength
    pub weight: Weight,
}

/**
capability needed by the LP coloring pipeline: read access to the conflict
graph and its color policy, plus color storage.
*/
pub trait ConflictModel {
    /// number of vertices
    fn nb_vertices(&self) -> usize;

    /// vertex ids
    fn vertices(&self) -> Range<VertexId> { 0..self.nb_vertices() }

    /// edge list
    fn edges(&self) -> &[ConflictEdge];

    /// vertices adjacent to u
    fn neighbors(&self, u:VertexId) -> &[VertexId];

    /// degree of u
    fn degree(&self, u:VertexId) -> usize { self.neighbors(u).len() }

    /// color-count policy
    fn color_count(&self) -> ColorCount;

    /// fixed color of u, if any
    fn precolor(&self, u:VertexId) -> Option<Color>;

    /// true if at least one vertex is precolored
    fn has_precolored(&self) -> bool {
        self.vertices().any(|u| self.precolor(u).is_some())
    }

    /// current color of u
    fn color(&self, u:VertexId) -> Option<Color>;

    /// assigns a color to u
    fn set_color(&mut self, u:VertexId, c:Color);
}


/** models a conflict graph (layout decomposition instance) */
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    /// nb vertices
    n: usize,
    /// edges of the graph
    edges: Vec<ConflictEdge>,
    /// adj_list[i]: list of vertices adjacent to i
    adj_list: Vec<Vec<VertexId>>,
    /// if exists: adj_matrix[i] represents a bitset of its neighbors
    adj_matrix: Option<Vec<BitSet>>,
    /// number of masks
    color_count: ColorCount,
    /// precolors[v]: fixed color of v (if any)
    precolors: Vec<Option<Color>>,
    /// colors[v]: color assigned to v
    colors: Vec<Option<Color>>,
}

impl ConflictModel for ConflictGraph {
    fn nb_vertices(&self) -> usize { self.n }

    fn edges(&self) -> &[ConflictEdge] { &self.edges }

    fn neighbors(&self, u:VertexId) -> &[VertexId] { &self.adj_list[u] }

    fn color_count(&self) -> ColorCount { self.color_count }

    fn precolor(&self, u:VertexId) -> Option<Color> { self.precolors[u] }

    fn color(&self, u:VertexId) -> Option<Color> { self.colors[u] }

    fn set_color(&mut self, u:VertexId, c:Color) { self.colors[u] = Some(c); }
}

impl ConflictGraph {

    /** constructor using a weighted edge list.
    Edges must reference existing vertices. Weights are checked later, when the
    relaxation is built.
    */
    pub fn new(n:usize, edges:Vec<ConflictEdge>, color_count:ColorCount) -> ColoringResult<Self> {
        let mut adj_list = vec![Vec::new() ; n];
        for e in &edges {
            for w in [e.u, e.v].iter() {
                if *w >= n {
                    return Err(ColoringError::VertexOutOfRange { vertex:*w, nb_vertices:n });
                }
            }
            adj_list[e.u].push(e.v);
            adj_list[e.v].push(e.u);
        }
        Ok(Self {
            n, edges, adj_list,
            adj_matrix: None,
            color_count,
            precolors: vec![None ; n],
            colors: vec![None ; n],
        })
    }

    /// constructor for unit-weight edges given as pairs
    pub fn from_pairs(n:usize, pairs:&[(VertexId,VertexId)], color_count:ColorCount) -> ColoringResult<Self> {
        let edges = pairs.iter()
            .map(|(u,v)| ConflictEdge { u:*u, v:*v, weight:1 })
            .collect();
        Self::new(n, edges, color_count)
    }

    /// creates an instance from a (weighted) DIMACS file
    pub fn from_file(filename:&str, color_count:ColorCount) -> ColoringResult<Self> {
        let (n, edges) = read_from_file(filename)?;
        let mut res = Self::new(n, edges, color_count)?;
        res.populate_adj_matrix();
        Ok(res)
    }

    /// fixes the color of a vertex
    pub fn with_precolor(mut self, u:VertexId, c:Color) -> ColoringResult<Self> {
        if u >= self.n {
            return Err(ColoringError::VertexOutOfRange { vertex:u, nb_vertices:self.n });
        }
        if !self.color_count.admits(c) {
            return Err(ColoringError::InvalidPrecolor { vertex:u, color:c });
        }
        self.precolors[u] = Some(c);
        self.colors[u] = Some(c);
        Ok(self)
    }

    /// number of edges
    pub fn nb_edges(&self) -> usize { self.edges.len() }

    /// colors of all vertices (None for uncolored ones)
    pub fn colors(&self) -> &[Option<Color>] { &self.colors }

    /// if called, populate the adj_matrix
    pub fn populate_adj_matrix(&mut self) {
        let mut res = vec![BitSet::default(); self.n];
        for (a,resa) in res.iter_mut().enumerate() {
            for b in &self.adj_list[a] {
                resa.insert(*b);
            }
        }
        self.adj_matrix = Some(res);
    }

    /** returns if a and b are adjacent
    if the adjacency matrix is defined: O(1)
    otherwise: O(Δ(G))
    */
    pub fn are_adjacent(&self, a:VertexId, b:VertexId) -> bool {
        match &self.adj_matrix {
            None => { self.adj_list[a].iter().any(|c| &b==c) },
            Some(matrix) => { matrix[a].contains(b) }
        }
    }

    /// print statistics of the instance
    pub fn display_statistics(&self) {
        println!("\t{} \t vertices", self.nb_vertices());
        println!("\t{} \t edges", self.nb_edges());
        let max_degree = self.vertices().map(|u| self.degree(u)).max().unwrap_or(0);
        println!("\t{} \t max degree", max_degree);
        println!("\t{} \t colors", self.color_count.nb_colors());
        let nb_precolored = self.precolors.iter().filter(|c| c.is_some()).count();
        if nb_precolored > 0 {
            println!("\t{} \t precolored vertices", nb_precolored);
        }
    }
}


/**
returns (cost, nb conflicting edges): the total weight of edges whose endpoints
share a color, and how many such edges exist. Uncolored vertices never conflict.
*/
pub fn conflict_cost(model:&dyn ConflictModel) -> (Weight, usize) {
    let mut cost = 0;
    let mut nb_conflicts = 0;
    for e in model.edges() {
        match (model.color(e.u), model.color(e.v)) {
            (Some(a), Some(b)) if a == b => {
                cost += e.weight;
                nb_conflicts += 1;
            },
            _ => {}
        }
    }
    (cost, nb_conflicts)
}
