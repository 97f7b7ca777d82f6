//! Solve dense strictly convex quadratic programs.
//!
//! This crate implements the Goldfarb Idnani dual method[^1] for solving quadratic programs of
//! the form:
//!
//! ```text
//!     minimize     1/2 x' G x - a' x
//!     subject to   C' x >= b
//! ```
//!
//! where `G` is symmetric positive definite and the first `meq` columns of `C` are equality
//! constraints. Problems are solved via [solve] or the [Problem] builder, which return a
//! [Solution] holding the minimizer, its objective value, the lagrange multipliers and the
//! active set.
//!
//! # Examples
//!
//! If we want to solve
//! ```text
//!     minimize     1/2 x^2 + 1/2 y^2 + x
//!     subject to   x + 2 y >= 1
//! ```
//!
//! we can do so with the following example:
//!
//! ```
//! # use dual_qp::solve;
//! let g = [1., 0., 0., 1.];
//! let a = [-1., 0.];
//! let c = [1., 2.];
//! let b = [1.];
//! let sol = solve(&g, &a, &c, &b, 0).unwrap();
//! assert!((sol.sol[0] + 0.6).abs() < 1e-12);
//! assert!((sol.sol[1] - 0.8).abs() < 1e-12);
//! assert_eq!(sol.iact, vec![0]);
//! ```
//!
//! Tolerances, the pivoting rule and an iteration cap are set through [Settings]:
//!
//! ```
//! # use dual_qp::{Problem, PivotRule, Settings};
//! let settings = Settings::default()
//!     .with_pivot_rule(PivotRule::Normalized)
//!     .with_max_iter(100);
//! let sol = Problem::new(&[2.], &[4.])
//!     .constraints(&[-1.], &[-1.], 0)
//!     .solve_with(&settings)
//!     .unwrap();
//! assert!((sol.sol[0] - 1.0).abs() < 1e-12);
//! assert!((sol.lagr[0] - 2.0).abs() < 1e-12);
//! ```
//!
//! [^1] D. Goldfarb and A. Idnani (1983). A numerically stable dual
//!     method for solving strictly convex quadratic programs.
//!     Mathematical Programming, 27, 1-33.

mod constraints;
mod engine;
pub mod error;
mod factor;
mod linalg;
mod problem;
pub mod settings;
mod solution;

pub use error::{QpError, Result};
pub use problem::{solve, Problem};
pub use settings::{PivotRule, Settings};
pub use solution::Solution;
