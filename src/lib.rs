//! LP relaxation based multiple patterning coloring (3 or 4 masks)

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// conflict model trait, conflict graph and coloring cost
pub mod color;

/// read DIMACS (weighted) edge formats
pub mod dimacs;

/// error type of the crate
pub mod error;

/// linear programming capability and its good_lp backend
pub mod lp;

/// run settings
pub mod settings;

/// helper and utility methods for executables
pub mod util;

/// LP relaxation based coloring
pub mod search;
