//! Constraint data and the active set.

use crate::linalg::{dot, norm};

/// Read-only view of the constraints `C' x >= b`, the first `meq` of which are equalities.
///
/// Normals are stored contiguously, one per constraint.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintStore {
    n: usize,
    normals: Vec<f64>,
    bvec: Vec<f64>,
    norms: Vec<f64>,
    meq: usize,
}

impl ConstraintStore {
    /// Build from an n by m row-major matrix whose columns are the constraint normals.
    pub(crate) fn from_columns(n: usize, cmat: &[f64], bvec: &[f64], meq: usize) -> Self {
        let m = bvec.len();
        debug_assert_eq!(cmat.len(), n * m);
        debug_assert!(meq <= m);
        let mut normals = vec![0.0; n * m];
        for (row, crow) in cmat.chunks_exact(m.max(1)).enumerate().take(n) {
            for (i, cij) in crow.iter().enumerate() {
                normals[row + i * n] = *cij;
            }
        }
        let norms = (0..m).map(|i| norm(&normals[i * n..(i + 1) * n])).collect();
        Self {
            n,
            normals,
            bvec: bvec.to_owned(),
            norms,
            meq,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bvec.len()
    }

    pub(crate) fn meq(&self) -> usize {
        self.meq
    }

    pub(crate) fn is_equality(&self, i: usize) -> bool {
        i < self.meq
    }

    pub(crate) fn normal(&self, i: usize) -> &[f64] {
        &self.normals[i * self.n..(i + 1) * self.n]
    }

    pub(crate) fn normal_norm(&self, i: usize) -> f64 {
        self.norms[i]
    }

    /// Signed slack `c_i' x - b_i`.
    pub(crate) fn slack(&self, i: usize, x: &[f64]) -> f64 {
        dot(self.normal(i), x) - self.bvec[i]
    }

    /// Violation threshold for constraint `i` at a point of norm `xnorm`.
    pub(crate) fn tolerance(&self, i: usize, xnorm: f64, rel: f64) -> f64 {
        rel * self.bvec[i].abs().max(self.norms[i] * xnorm).max(1.0)
    }
}

/// The constraints currently held as equalities, in order of entry.
///
/// `sign` is -1 for an equality enforced with its normal negated; multipliers are kept in that
/// negated frame and only flipped back when reported.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActiveSet {
    iact: Vec<usize>,
    uv: Vec<f64>,
    sign: Vec<f64>,
    member: Vec<bool>,
}

impl ActiveSet {
    pub(crate) fn new(m: usize, capacity: usize) -> Self {
        Self {
            iact: Vec::with_capacity(capacity),
            uv: Vec::with_capacity(capacity),
            sign: Vec::with_capacity(capacity),
            member: vec![false; m],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.iact.len()
    }

    pub(crate) fn contains(&self, i: usize) -> bool {
        self.member[i]
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.iact
    }

    pub(crate) fn multipliers(&self) -> &[f64] {
        &self.uv
    }

    pub(crate) fn multipliers_mut(&mut self) -> &mut [f64] {
        &mut self.uv
    }

    pub(crate) fn push(&mut self, i: usize, u: f64, sign: f64) {
        debug_assert!(!self.member[i]);
        self.iact.push(i);
        self.uv.push(u);
        self.sign.push(sign);
        self.member[i] = true;
    }

    /// Remove the member at position `pos`, returning its constraint index.
    pub(crate) fn remove(&mut self, pos: usize) -> usize {
        let i = self.iact.remove(pos);
        self.uv.remove(pos);
        self.sign.remove(pos);
        self.member[i] = false;
        i
    }

    /// Scatter the multipliers into a vector aligned with the constraints, zero when inactive.
    pub(crate) fn lagrangian(&self) -> Vec<f64> {
        let mut lagr = vec![0.0; self.member.len()];
        for ((&i, &u), &sign) in self.iact.iter().zip(&self.uv).zip(&self.sign) {
            lagr[i] = sign * u;
        }
        lagr
    }

    pub(crate) fn into_indices(self) -> Vec<usize> {
        self.iact
    }
}
