//! Dense kernels on column-major storage.
//!
//! Matrices are slices with a leading dimension `ld`: element `(i, j)` lives at `i + j * ld`, so
//! column `j` starts at `j * ld`. The triangular kernels work on the leading `k` by `k` block,
//! where `k` is the length of the vector they act on, and read only on or above the diagonal.

/// y = a * x + y
pub(crate) fn axpy(a: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    y.iter_mut().zip(x).for_each(|(yi, xi)| *yi += a * xi);
}

pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(xi, yi)| xi * yi).sum()
}

pub(crate) fn norm(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// Column `j` of an upper triangular matrix, split into the part above the diagonal and the
/// diagonal entry.
fn upper_column(mat: &[f64], ld: usize, j: usize) -> (&[f64], f64) {
    let col = &mat[j * ld..j * ld + j + 1];
    (&col[..j], col[j])
}

/// x <- U x
pub(crate) fn upper_mul(mat: &[f64], ld: usize, vec: &mut [f64]) {
    for j in 0..vec.len() {
        let (above, diag) = upper_column(mat, ld, j);
        let (head, tail) = vec.split_at_mut(j);
        let xj = tail[0];
        axpy(xj, above, head);
        tail[0] = diag * xj;
    }
}

/// x <- U' x
pub(crate) fn upper_mul_t(mat: &[f64], ld: usize, vec: &mut [f64]) {
    for j in (0..vec.len()).rev() {
        let (above, diag) = upper_column(mat, ld, j);
        vec[j] = diag * vec[j] + dot(above, &vec[..j]);
    }
}

/// x <- U^-1 x, by back substitution
pub(crate) fn upper_solve(mat: &[f64], ld: usize, vec: &mut [f64]) {
    for j in (0..vec.len()).rev() {
        let (above, diag) = upper_column(mat, ld, j);
        let (head, tail) = vec.split_at_mut(j);
        tail[0] /= diag;
        axpy(-tail[0], above, head);
    }
}

/// x <- U'^-1 x, by forward substitution
pub(crate) fn upper_solve_t(mat: &[f64], ld: usize, vec: &mut [f64]) {
    for j in 0..vec.len() {
        let (above, diag) = upper_column(mat, ld, j);
        vec[j] = (vec[j] - dot(above, &vec[..j])) / diag;
    }
}

/// Invert the n by n upper triangular `mat` in place, one column at a time.
///
/// With the leading block already inverted, column `j` of the inverse is
/// `-inv(U[..j, ..j]) U[..j, j] / U[j, j]` above the diagonal and `1 / U[j, j]` on it.
pub(crate) fn upper_invert(n: usize, mat: &mut [f64]) {
    debug_assert_eq!(mat.len(), n * n);
    for j in 0..n {
        let (done, rest) = mat.split_at_mut(j * n);
        let col = &mut rest[..=j];
        col[j] = col[j].recip();
        let scale = -col[j];
        upper_mul(done, n, &mut col[..j]);
        col[..j].iter_mut().for_each(|v| *v *= scale);
    }
}

/// Overwrite the upper triangle of the symmetric `mat` with `R` such that `mat = R' R`.
/// The strict lower triangle is untouched.
///
/// Errs with the index of the first pivot that is not positive relative to the original
/// diagonal entry.
pub(crate) fn cholesky(n: usize, mat: &mut [f64]) -> Result<(), usize> {
    debug_assert_eq!(n * n, mat.len());
    for j in 0..n {
        let (done, rest) = mat.split_at_mut(j * n);
        let col = &mut rest[..=j];
        // R[..j, ..j]' R[..j, j] = A[..j, j]
        upper_solve_t(done, n, &mut col[..j]);

        let diag = col[j];
        let pivot = diag - dot(&col[..j], &col[..j]);
        // NaN pivots fail this comparison too
        if !(pivot > f64::EPSILON * diag.abs()) {
            return Err(j);
        }
        col[j] = pivot.sqrt();
    }
    Ok(())
}
