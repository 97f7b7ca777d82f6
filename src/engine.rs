//! The Goldfarb-Idnani dual active-set iteration.
//!
//! Starting from the unconstrained minimizer, the engine repeatedly picks a violated constraint
//! and moves towards it along a direction that keeps every active constraint satisfied with
//! equality. If an active inequality's multiplier would turn negative first, that constraint is
//! dropped and the move continues from the smaller active set. Every iterate is dual feasible,
//! so the first primal feasible iterate is optimal.

use tracing::{debug, trace, warn};

use crate::constraints::{ActiveSet, ConstraintStore};
use crate::error::{QpError, Result};
use crate::factor::ActiveFactor;
use crate::linalg::{axpy, dot, norm};
use crate::settings::{PivotRule, Settings};
use crate::solution::Solution;

/// Squared-norm ratio below which a normal is treated as dependent on the active normals.
const DEPENDENCE_TOL: f64 = f64::EPSILON;

/// Single-use solver state for one problem.
pub(crate) struct Engine<'a> {
    store: &'a ConstraintStore,
    settings: &'a Settings,
    factor: ActiveFactor,
    active: ActiveSet,
    /// Constraints skipped as redundant since the last drop.
    redundant: Vec<bool>,
    unconstrained: Vec<f64>,
    sol: Vec<f64>,
    obj: f64,
    iters: [usize; 2],
    dv: Vec<f64>,
    zv: Vec<f64>,
    rv: Vec<f64>,
}

impl<'a> Engine<'a> {
    /// `unconstrained` and `obj` describe the unconstrained minimizer; `factor` must have no
    /// active constraints yet.
    pub(crate) fn new(
        store: &'a ConstraintStore,
        settings: &'a Settings,
        factor: ActiveFactor,
        unconstrained: Vec<f64>,
        obj: f64,
    ) -> Self {
        debug_assert_eq!(factor.active_len(), 0);
        let n = unconstrained.len();
        Self {
            store,
            settings,
            factor,
            active: ActiveSet::new(store.len(), n.min(store.len())),
            redundant: vec![false; store.len()],
            sol: unconstrained.clone(),
            unconstrained,
            obj,
            iters: [0, 0],
            dv: vec![0.0; n],
            zv: vec![0.0; n],
            rv: vec![0.0; n],
        }
    }

    /// Run to optimality.
    pub(crate) fn run(mut self) -> Result<Solution> {
        for i in 0..self.store.meq() {
            if self.enforce(i)? {
                self.iters[0] += 1;
                self.check_budget()?;
            } else {
                self.redundant[i] = true;
                debug!(constraint = i, "skipped redundant equality");
            }
        }

        loop {
            self.iters[0] += 1;
            self.check_budget()?;

            let Some(iadd) = self.most_violated() else {
                break;
            };
            trace!(pass = self.iters[0], constraint = iadd, "enforcing violated constraint");
            if !self.enforce(iadd)? {
                self.redundant[iadd] = true;
                debug!(constraint = iadd, "skipped redundant constraint");
            }
        }

        debug!(
            obj = self.obj,
            active = self.active.len(),
            passes = self.iters[0],
            drops = self.iters[1],
            "reached optimum"
        );
        Ok(Solution::assemble(
            self.sol,
            self.obj,
            self.unconstrained,
            self.iters,
            self.active,
        ))
    }

    fn check_budget(&self) -> Result<()> {
        let iterations = self.iters[0] + self.iters[1];
        match self.settings.max_iter {
            Some(max) if iterations > max => {
                warn!(iterations, max, "iteration cap reached");
                Err(QpError::DidNotConverge { iterations })
            }
            _ => Ok(()),
        }
    }

    /// Pick the inactive constraint with the largest violation, ties going to the lowest index.
    fn most_violated(&self) -> Option<usize> {
        let xnorm = norm(&self.sol);
        let mut iadd = None;
        let mut worst = 0.0;
        for i in 0..self.store.len() {
            // Active constraints are skipped to guard against rounding errors.
            if self.active.contains(i) || self.redundant[i] {
                continue;
            }

            let slack = self.store.slack(i, &self.sol);
            let violation = if self.store.is_equality(i) {
                -slack.abs()
            } else {
                slack
            };
            if violation >= -self.store.tolerance(i, xnorm, self.settings.tolerance) {
                continue;
            }

            let score = match self.settings.pivot_rule {
                PivotRule::MostViolated => violation,
                PivotRule::Normalized => violation / self.store.normal_norm(i),
            };
            if score < worst {
                worst = score;
                iadd = Some(i);
            }
        }
        iadd
    }

    /// Bring constraint `iadd` into the active set, dropping active inequalities as needed.
    ///
    /// Returns false if the constraint's normal depends on the active normals and its slack is
    /// within the redundancy tolerance before any step is taken. Nothing but zero-length drops
    /// has happened by then, so the iterate and its multipliers are unchanged.
    fn enforce(&mut self, iadd: usize) -> Result<bool> {
        let store = self.store;
        let normal = store.normal(iadd);
        let redundant_tol =
            store.tolerance(iadd, norm(&self.sol), self.settings.redundancy_tolerance);

        // Equalities are approached from whichever side they are violated on.
        let raw = store.slack(iadd, &self.sol);
        let sign = if store.is_equality(iadd) && raw > 0.0 {
            -1.0
        } else {
            1.0
        };
        let mut slack = sign * raw;
        let mut u = 0.0;

        loop {
            let nact = self.active.len();
            self.factor.project(normal, sign, &mut self.dv);
            self.factor.primal_direction(&self.dv, &mut self.zv);
            self.factor.dual_direction(&self.dv, &mut self.rv[..nact]);

            // Largest step before an active inequality multiplier turns negative.
            let mut t1 = f64::INFINITY;
            let mut idel = None;
            let members = self.active.indices().iter().zip(self.active.multipliers());
            for (pos, ((&k, &uk), &rk)) in members.zip(&self.rv[..nact]).enumerate() {
                if store.is_equality(k) || rk <= 0.0 {
                    continue;
                }
                let t = (uk / rk).max(0.0);
                if t < t1 {
                    t1 = t;
                    idel = Some(pos);
                }
            }

            // Step that makes the constraint hold with equality.
            // ztn is also z' G z, the curvature along z.
            let ztn = sign * dot(&self.zv, normal);
            let t2 = if ztn <= DEPENDENCE_TOL * dot(&self.dv, &self.dv) {
                f64::INFINITY
            } else {
                (-slack / ztn).max(0.0)
            };

            if t2.is_infinite() {
                if u == 0.0 && slack.abs() <= redundant_tol {
                    trace!(
                        constraint = iadd,
                        slack,
                        tol = redundant_tol,
                        "dependent and satisfied"
                    );
                    return Ok(false);
                }
                if t1.is_infinite() {
                    warn!(constraint = iadd, slack, "no feasible step towards constraint");
                    return Err(QpError::Infeasible { constraint: iadd });
                }
            }

            let (step, drop) = match idel {
                Some(pos) if t1 < t2 => (t1, Some(pos)),
                _ => (t2, None),
            };

            if t2.is_finite() {
                axpy(step, &self.zv, &mut self.sol);
                self.obj += step * ztn * (step / 2.0 + u);
            }
            axpy(-step, &self.rv[..nact], self.active.multipliers_mut());
            u += step;

            let Some(pos) = drop else {
                break;
            };

            let removed = self.active.remove(pos);
            self.factor.remove(pos);
            self.iters[1] += 1;
            // the span of the active normals shrank
            self.redundant.fill(false);
            debug!(constraint = removed, step, "dropped constraint from active set");
            self.check_budget()?;

            // the partial step moved x, so the remaining violation changed
            slack = sign * store.slack(iadd, &self.sol);
        }

        self.active.push(iadd, u, sign);
        self.factor.add(&mut self.dv);
        debug!(constraint = iadd, multiplier = sign * u, "added constraint to active set");
        Ok(true)
    }
}
