//! Problem description, validation and the solve entry points.

use tracing::debug;

use crate::constraints::ConstraintStore;
use crate::engine::Engine;
use crate::error::{QpError, Result};
use crate::factor::{ActiveFactor, Cholesky};
use crate::linalg::dot;
use crate::settings::Settings;
use crate::solution::Solution;

/// A strictly convex quadratic program
///
/// ```text
///     minimize     1/2 x' G x - a' x
///     subject to   C' x >= b
/// ```
///
/// where the first `meq` columns of `C` are equality constraints.
///
/// `G` is n by n and `C` is n by m, both in row-major order. The columns of `C` are the
/// constraint normals.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    gmat: &'a [f64],
    avec: &'a [f64],
    cmat: &'a [f64],
    bvec: &'a [f64],
    meq: usize,
    factorized: bool,
}

impl<'a> Problem<'a> {
    /// An unconstrained problem with quadratic term `gmat` and linear term `avec`.
    pub fn new(gmat: &'a [f64], avec: &'a [f64]) -> Self {
        Self {
            gmat,
            avec,
            cmat: &[],
            bvec: &[],
            meq: 0,
            factorized: false,
        }
    }

    /// Set the constraints `C' x >= b`, the first `meq` holding with equality.
    #[must_use]
    pub fn constraints(mut self, cmat: &'a [f64], bvec: &'a [f64], meq: usize) -> Self {
        self.cmat = cmat;
        self.bvec = bvec;
        self.meq = meq;
        self
    }

    /// Treat `gmat` as `R^-1` instead of `G`, where `R` is upper triangular with `R' R = G`.
    ///
    /// Only the upper triangle of `gmat` is read.
    #[must_use]
    pub const fn factorized(mut self, factorized: bool) -> Self {
        self.factorized = factorized;
        self
    }

    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.avec.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.bvec.len()
    }

    /// Check that all shapes agree.
    pub fn validate(&self) -> Result<()> {
        let n = self.dim();
        let m = self.num_constraints();
        if self.gmat.len() != n * n {
            return Err(QpError::DimensionMismatch {
                what: "quadratic term",
                expected: n * n,
                found: self.gmat.len(),
            });
        }
        if self.cmat.len() != n * m {
            return Err(QpError::DimensionMismatch {
                what: "constraint matrix",
                expected: n * m,
                found: self.cmat.len(),
            });
        }
        if self.meq > m {
            return Err(QpError::DimensionMismatch {
                what: "equality count",
                expected: m,
                found: self.meq,
            });
        }
        Ok(())
    }

    /// Solve with default settings.
    pub fn solve(&self) -> Result<Solution> {
        self.solve_with(&Settings::default())
    }

    /// Solve with the given settings.
    pub fn solve_with(&self, settings: &Settings) -> Result<Solution> {
        self.validate()?;
        let n = self.dim();

        let mut xu = self.avec.to_owned();
        let factor = if self.factorized {
            let factor = inverse_factor(n, self.gmat)?;
            factor.solve_unconstrained(&mut xu);
            factor
        } else {
            check_symmetric(n, self.gmat, settings.symmetry_tolerance)?;
            // symmetric, so row-major and column-major agree
            let chol = Cholesky::factor(n, self.gmat.to_owned())?;
            chol.solve(&mut xu);
            chol.into_active_factor()
        };
        let obj = -dot(self.avec, &xu) / 2.0;

        if self.num_constraints() == 0 {
            debug!(n, "solved unconstrained problem");
            return Ok(Solution::unconstrained(xu, obj));
        }

        let store = ConstraintStore::from_columns(n, self.cmat, self.bvec, self.meq);
        Engine::new(&store, settings, factor, xu, obj).run()
    }
}

/// Compare each off-diagonal pair relative to the entries and the geometric mean of the two
/// diagonal entries, so rounding-level noise next to a unit diagonal passes.
fn check_symmetric(n: usize, gmat: &[f64], tol: f64) -> Result<()> {
    for row in 0..n {
        for col in row + 1..n {
            let upper = gmat[row * n + col];
            let lower = gmat[col * n + row];
            let diag = (gmat[row * n + row] * gmat[col * n + col]).abs().sqrt();
            let scale = upper.abs().max(lower.abs()).max(diag);
            if (upper - lower).abs() > tol * scale {
                return Err(QpError::NotSymmetric { row, col });
            }
        }
    }
    Ok(())
}

/// Build the active-set factor from a row-major upper triangular `R^-1`.
fn inverse_factor(n: usize, rinv: &[f64]) -> Result<ActiveFactor> {
    let mut jmat = vec![0.0; n * n];
    for row in 0..n {
        for col in row..n {
            jmat[row + col * n] = rinv[row * n + col];
        }
        if !(jmat[row + row * n] > 0.0) {
            return Err(QpError::NotPositiveDefinite { pivot: row });
        }
    }
    Ok(ActiveFactor::from_inverse(n, jmat))
}

/// Solve a strictly convex quadratic program.
///
/// The program takes the form of:
///
/// ```text
///     minimize     1/2 x' G x - a' x
///     subject to   C' x >= b
/// ```
///
/// where the first `meq` columns of `C` are equality constraints. `gmat` is n by n and `cmat` is
/// n by m, both in row-major order, with `m = bvec.len()`. Pass empty `cmat` and `bvec` for an
/// unconstrained problem.
pub fn solve(
    gmat: &[f64],
    avec: &[f64],
    cmat: &[f64],
    bvec: &[f64],
    meq: usize,
) -> Result<Solution> {
    Problem::new(gmat, avec).constraints(cmat, bvec, meq).solve()
}
