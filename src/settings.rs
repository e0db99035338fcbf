//! Configuration of the LP coloring pipeline.

use serde::{Deserialize, Serialize};

/// LP coloring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpColoringSettings {
    /// Number of threads requested from the LP backend (0 = backend default).
    pub threads: usize,

    /// Integrality tolerance.
    /// A value is considered integer if |x - round(x)| <= integrality_tol,
    /// and half-integer if |x - 0.5| <= integrality_tol.
    pub integrality_tol: f64,

    /// A constraint is binding if its slack is within binding_tol of 0.
    pub binding_tol: f64,

    /// Add odd-cycle cutting planes between solves.
    pub odd_cycle_cuts: bool,

    /// Run the greedy refinement after rounding (never run with precolored vertices).
    pub refine: bool,
}

impl Default for LpColoringSettings {
    fn default() -> Self {
        Self {
            threads: 0,
            integrality_tol: 1e-6,
            binding_tol: 1e-6,
            odd_cycle_cuts: true,
            refine: true,
        }
    }
}

impl LpColoringSettings {
    /// Set the number of LP threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable odd-cycle cuts.
    pub fn with_odd_cycle_cuts(mut self, enabled: bool) -> Self {
        self.odd_cycle_cuts = enabled;
        self
    }

    /// Enable or disable the greedy refinement.
    pub fn with_refinement(mut self, enabled: bool) -> Self {
        self.refine = enabled;
        self
    }

    /// true if the value is integral within tolerance
    pub fn is_integer(&self, value: f64) -> bool {
        (value - value.round()).abs() <= self.integrality_tol
    }

    /// true if the value is 0.5 within tolerance
    pub fn is_half_integer(&self, value: f64) -> bool {
        (value - 0.5).abs() <= self.integrality_tol
    }

    /// true if a slack makes its constraint binding
    pub fn is_binding(&self, slack: f64) -> bool {
        slack.abs() <= self.binding_tol
    }
}
