//! Factorizations driving the dual method.
//!
//! The quadratic term is factored once as `G = R' R`. The engine then works with
//! `J = R^-1 Q` and an upper triangular `T` such that `J' N = [T; 0]`, where `N` holds the
//! normals of the active constraints. Adding or dropping a constraint updates `J` and `T` with
//! Givens rotations in `O(n^2)` work instead of refactoring.

use crate::error::{QpError, Result};
use crate::linalg::{
    axpy, cholesky, dot, upper_invert, upper_mul, upper_mul_t, upper_solve, upper_solve_t,
};

/// Upper triangular `R` with `R' R = G`, stored column-major.
#[derive(Debug, Clone)]
pub(crate) struct Cholesky {
    n: usize,
    upper: Vec<f64>,
}

impl Cholesky {
    /// Factor a symmetric positive definite matrix given in column-major order.
    pub(crate) fn factor(n: usize, mut mat: Vec<f64>) -> Result<Self> {
        cholesky(n, &mut mat).map_err(|pivot| QpError::NotPositiveDefinite { pivot })?;
        Ok(Self { n, upper: mat })
    }

    /// Solve `G x = rhs` in place.
    pub(crate) fn solve(&self, rhs: &mut [f64]) {
        debug_assert_eq!(rhs.len(), self.n);
        // now rhs contains R^-T rhs
        upper_solve_t(&self.upper, self.n, rhs);
        // now rhs contains R^-1 R^-T rhs = G^-1 rhs
        upper_solve(&self.upper, self.n, rhs);
    }

    /// Consume the factorization, producing the initial active-set factor `J = R^-1`.
    pub(crate) fn into_active_factor(self) -> ActiveFactor {
        let Self { n, mut upper } = self;
        upper_invert(n, &mut upper);
        ActiveFactor::from_inverse(n, upper)
    }
}

/// The pair `(J, T)` for the current active set.
///
/// `J` is a dense `n` by `n` column-major matrix. `T` is the `nact` by `nact` upper triangle
/// stored as packed columns, so column `k` occupies `k * (k + 1) / 2..(k + 1) * (k + 2) / 2`.
#[derive(Debug, Clone)]
pub(crate) struct ActiveFactor {
    n: usize,
    jmat: Vec<f64>,
    tmat: Vec<f64>,
    nact: usize,
}

impl ActiveFactor {
    /// Build from `R^-1`, the inverse of the upper Cholesky factor, in column-major order.
    ///
    /// Only the upper triangle is read.
    pub(crate) fn from_inverse(n: usize, mut jmat: Vec<f64>) -> Self {
        debug_assert_eq!(jmat.len(), n * n);
        for j in 0..n {
            for i in j + 1..n {
                jmat[i + j * n] = 0.0;
            }
        }
        Self {
            n,
            jmat,
            tmat: Vec::with_capacity(n * (n + 1) / 2),
            nact: 0,
        }
    }

    /// Number of constraints currently factored in.
    pub(crate) fn active_len(&self) -> usize {
        self.nact
    }

    /// Compute `G^-1 rhs = J J' rhs` in place. Only valid before any constraint is added.
    pub(crate) fn solve_unconstrained(&self, rhs: &mut [f64]) {
        debug_assert_eq!(self.nact, 0);
        upper_mul_t(&self.jmat, self.n, rhs);
        upper_mul(&self.jmat, self.n, rhs);
    }

    fn column(&self, k: usize) -> &[f64] {
        &self.jmat[k * self.n..(k + 1) * self.n]
    }

    /// Set `dv = sign * J' normal`.
    pub(crate) fn project(&self, normal: &[f64], sign: f64, dv: &mut [f64]) {
        for (k, dvk) in dv.iter_mut().enumerate() {
            *dvk = sign * dot(self.column(k), normal);
        }
    }

    /// Set `zv = J_2 d_2`, the primal step direction in the null space of the active normals.
    pub(crate) fn primal_direction(&self, dv: &[f64], zv: &mut [f64]) {
        zv.fill(0.0);
        for k in self.nact..self.n {
            axpy(dv[k], self.column(k), zv);
        }
    }

    /// Set `rv = T^-1 d_1`, the rate at which active multipliers decrease.
    pub(crate) fn dual_direction(&self, dv: &[f64], rv: &mut [f64]) {
        debug_assert_eq!(rv.len(), self.nact);
        rv.copy_from_slice(&dv[..self.nact]);
        for i in (0..self.nact).rev() {
            let start = i * (i + 1) / 2;
            rv[i] /= self.tmat[start + i];
            let (head, tail) = rv.split_at_mut(i);
            axpy(-tail[0], &self.tmat[start..start + i], head);
        }
    }

    /// Append a constraint whose projection `J' normal` is in `dv`.
    ///
    /// `dv` is overwritten; on return its first `nact` entries form the new column of `T`.
    pub(crate) fn add(&mut self, dv: &mut [f64]) {
        debug_assert!(self.nact < self.n);
        qr_insert(self.nact + 1, dv, &mut self.jmat);
        self.nact += 1;
        self.tmat.extend_from_slice(&dv[..self.nact]);
    }

    /// Remove the active constraint at position `pos` (in order of entry).
    pub(crate) fn remove(&mut self, pos: usize) {
        debug_assert!(pos < self.nact);
        qr_delete(pos, &mut self.jmat, &mut self.tmat);
        self.nact -= 1;
        self.tmat.truncate(self.nact * (self.nact + 1) / 2);
    }
}

/// get length len slices to the left and right of split
///
/// for a column-major matrix these are neighboring columns.
fn left_right_slices<T>(slice: &mut [T], split: usize, len: usize) -> (&mut [T], &mut [T]) {
    let (left, right) = slice.split_at_mut(split);
    (&mut left[split - len..], &mut right[..len])
}

/// Rotate the neighboring columns `left` and `right` by the Givens rotation with
/// cosine `gc`, sine `gs` and `nu = gs / (1 + gc)`.
fn rotate(gc: f64, gs: f64, nu: f64, left: &mut [f64], right: &mut [f64]) {
    for (li, ri) in left.iter_mut().zip(right.iter_mut()) {
        let temp = gc * *li + gs * *ri;
        // this saves a fourth multiplication
        *ri = nu * (*li + temp) - *ri;
        *li = temp;
    }
}

/// Apply orthogonal transformations to `vec` to bring the components beyond the rth to zero.
/// Apply the same orthogonal transformations to the columns of `mat`.
///
/// Note: the trailing elements of `vec` are not actually zeroed out
fn qr_insert(r: usize, vec: &mut [f64], mat: &mut [f64]) {
    let n = vec.len();
    debug_assert_eq!(mat.len(), n * n);
    debug_assert!(r >= 1 && r <= n);
    for i in (r..n).rev() {
        // On this iteration, reduce vec[i] to zero.
        if vec[i] == 0.0 {
            continue;
        }

        let (left, right) = left_right_slices(mat, i * n, n);
        if vec[i - 1] == 0.0 {
            vec[i - 1] = vec[i];
            left.swap_with_slice(right);
        } else {
            let h = vec[i - 1].hypot(vec[i]).copysign(vec[i - 1]);
            let gc = vec[i - 1] / h;
            let gs = vec[i] / h;
            let nu = vec[i] / (vec[i - 1] + h);
            vec[i - 1] = h;
            rotate(gc, gs, nu, left, right);
        }
    }
}

/// Drop the col-th column of the packed upper triangle `tmat`.
/// Apply orthogonal transformations to the rows of `tmat` to restore it to upper triangular form.
/// Apply the same orthogonal transformations to the columns of `qmat`.
///
/// `tmat` is r by r on input; only its leading `(r - 1) * r / 2` entries are meaningful on output.
fn qr_delete(col: usize, qmat: &mut [f64], tmat: &mut [f64]) {
    let n = (qmat.len() as f64).sqrt() as usize;
    debug_assert_eq!(qmat.len(), n * n);
    let r = ((((8 * tmat.len() + 1) as f64).sqrt() as usize) - 1) / 2;
    debug_assert_eq!(r * (r + 1) / 2, tmat.len());

    for i in col + 1..r {
        // On this iteration, reduce the (i, i) element of T to zero,
        // and then move column i to position i - 1.
        let di = i * (i + 1) / 2;
        let l = di + i;

        if tmat[l] != 0.0 {
            let (left, right) = left_right_slices(qmat, i * n, n);
            if tmat[l - 1] == 0.0 {
                let mut ind = l;
                for j in i + 1..=r {
                    tmat.swap(ind - 1, ind);
                    ind += j;
                }
                left.swap_with_slice(right);
            } else {
                let h = tmat[l - 1].hypot(tmat[l]).copysign(tmat[l - 1]);
                let gc = tmat[l - 1] / h;
                let gs = tmat[l] / h;
                let nu = tmat[l] / (tmat[l - 1] + h);

                let mut ind = l;
                for j in i + 1..=r {
                    let temp = gc * tmat[ind - 1] + gs * tmat[ind];
                    tmat[ind] = nu * (tmat[ind - 1] + temp) - tmat[ind];
                    tmat[ind - 1] = temp;
                    ind += j;
                }

                rotate(gc, gs, nu, left, right);
            }
        }

        let (left, right) = left_right_slices(tmat, di, i);
        left.swap_with_slice(right);
    }
}
