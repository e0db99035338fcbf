//! Error types for the LP coloring pipeline.

use thiserror::Error;

use crate::color::{Color, VertexId, Weight};
use crate::lp::LpStatus;

/// Errors that abort a coloring run.
#[derive(Error, Debug)]
pub enum ColoringError {
    /// a conflict edge carries a zero or negative weight
    #[error("invalid weight {weight} on conflict edge ({u},{v}): positive weight expected")]
    InvalidEdgeWeight {
        /// first endpoint
        u: VertexId,
        /// second endpoint
        v: VertexId,
        /// offending weight
        weight: Weight,
    },

    /// a vertex id does not exist in the conflict graph
    #[error("vertex {vertex} out of range (graph has {nb_vertices} vertices)")]
    VertexOutOfRange {
        /// offending vertex
        vertex: VertexId,
        /// number of vertices in the graph
        nb_vertices: usize,
    },

    /// a precolor outside the admissible colors of the color-count policy
    #[error("invalid precolor {color} for vertex {vertex}")]
    InvalidPrecolor {
        /// precolored vertex
        vertex: VertexId,
        /// offending color
        color: Color,
    },

    /// the LP backend found no feasible point for a model that should be feasible
    #[error("relaxation is infeasible ({stage})")]
    Infeasible {
        /// pipeline stage that triggered the solve
        stage: &'static str,
    },

    /// the LP backend returned a status other than optimal or infeasible
    #[error("LP solve failed ({stage}): {status:?}")]
    SolverFailure {
        /// pipeline stage that triggered the solve
        stage: &'static str,
        /// status reported by the backend
        status: LpStatus,
    },

    /// malformed instance file
    #[error("parse error: {0}")]
    Parse(String),

    /// statistics could not be serialized
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading or writing instance or solution files
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for coloring operations.
pub type ColoringResult<T> = Result<T, ColoringError>;
