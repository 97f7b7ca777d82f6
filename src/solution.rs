//! The result of a solve.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constraints::ActiveSet;

/// The solution to a quadratic program
///
/// - `sol` is the constrained minimizer
/// - `obj` is the objective value `1/2 x' G x - a' x` at `sol`
/// - `unconstrained` is the unconstrained minimizer `G^-1 a`
/// - `iters` holds the number of passes that enforced or scanned for a violated constraint,
///   and the number of constraints dropped from the active set
/// - `lagr` holds the lagrange multiplier of each constraint, zero when inactive
/// - `iact` holds the 0-based indices of the active constraints, in the order they became active
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    pub sol: Vec<f64>,
    pub obj: f64,
    pub unconstrained: Vec<f64>,
    pub iters: [usize; 2],
    pub lagr: Vec<f64>,
    pub iact: Vec<usize>,
}

impl Solution {
    /// The solution of a problem without constraints.
    pub(crate) fn unconstrained(xu: Vec<f64>, obj: f64) -> Self {
        Self {
            sol: xu.clone(),
            obj,
            unconstrained: xu,
            iters: [0, 0],
            lagr: Vec::new(),
            iact: Vec::new(),
        }
    }

    pub(crate) fn assemble(
        sol: Vec<f64>,
        obj: f64,
        unconstrained: Vec<f64>,
        iters: [usize; 2],
        active: ActiveSet,
    ) -> Self {
        let lagr = active.lagrangian();
        Self {
            sol,
            obj,
            unconstrained,
            iters,
            lagr,
            iact: active.into_indices(),
        }
    }

    /// Whether constraint `i` is in the final active set.
    pub fn is_active(&self, i: usize) -> bool {
        self.iact.contains(&i)
    }
}
