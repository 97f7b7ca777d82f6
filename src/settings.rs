//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rule used to pick which violated constraint to enforce next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PivotRule {
    /// Pick the constraint with the most negative slack.
    #[default]
    MostViolated,

    /// Pick the constraint with the most negative slack divided by the norm of its normal.
    ///
    /// This makes the choice independent of how each constraint row is scaled.
    Normalized,
}

/// Settings for a quadratic program solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Relative violation tolerance. Default: 1e-14
    ///
    /// Constraint `i` is considered violated at `x` when its slack is below
    /// `-tolerance * max(1, |b_i|, |c_i| |x|)`.
    pub tolerance: f64,

    /// Relative tolerance for accepting a dependent constraint as redundant.
    /// Default: square root of machine epsilon
    ///
    /// A constraint whose normal is a combination of the active normals cannot be added. It is
    /// skipped when its slack is within `redundancy_tolerance * max(1, |b_i|, |c_i| |x|)` of
    /// zero, and reported as infeasible otherwise. Earlier steps leave rounding error in the
    /// slack that is well above `tolerance`, hence the looser default.
    pub redundancy_tolerance: f64,

    /// Relative asymmetry allowed in `G`. Default: 1e-10
    ///
    /// `G` is rejected when `|g_ij - g_ji|` exceeds
    /// `symmetry_tolerance * max(|g_ij|, |g_ji|, sqrt(|g_ii g_jj|))`.
    pub symmetry_tolerance: f64,

    /// Violated constraint selection rule. Default: [`PivotRule::MostViolated`]
    pub pivot_rule: PivotRule,

    /// Maximum number of constraint passes plus drops. If None, no limit.
    pub max_iter: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: 1e-14,
            redundancy_tolerance: f64::EPSILON.sqrt(),
            symmetry_tolerance: 1e-10,
            pivot_rule: PivotRule::MostViolated,
            max_iter: None,
        }
    }
}

impl Settings {
    /// Set the relative violation tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    /// Set the relative tolerance for skipping dependent constraints.
    #[must_use]
    pub fn with_redundancy_tolerance(mut self, tolerance: f64) -> Self {
        self.redundancy_tolerance = tolerance.abs();
        self
    }

    /// Set the relative asymmetry allowed in `G`.
    #[must_use]
    pub fn with_symmetry_tolerance(mut self, tolerance: f64) -> Self {
        self.symmetry_tolerance = tolerance.abs();
        self
    }

    /// Set the pivot rule.
    #[must_use]
    pub const fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.tolerance > 0.0 && settings.tolerance < 1e-10);
        assert!(settings.redundancy_tolerance > settings.tolerance);
        assert!(settings.redundancy_tolerance < 1e-6);
        assert!((settings.symmetry_tolerance - 1e-10).abs() < 1e-20);
        assert_eq!(settings.pivot_rule, PivotRule::MostViolated);
        assert!(settings.max_iter.is_none());
    }

    #[test]
    fn test_builders() {
        let settings = Settings::default()
            .with_tolerance(-1e-9)
            .with_redundancy_tolerance(1e-6)
            .with_symmetry_tolerance(-1e-8)
            .with_pivot_rule(PivotRule::Normalized)
            .with_max_iter(10);
        assert!((settings.tolerance - 1e-9).abs() < 1e-20);
        assert!((settings.redundancy_tolerance - 1e-6).abs() < 1e-20);
        assert!((settings.symmetry_tolerance - 1e-8).abs() < 1e-20);
        assert_eq!(settings.pivot_rule, PivotRule::Normalized);
        assert_eq!(settings.max_iter, Some(10));
    }
}
