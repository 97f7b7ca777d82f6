//! Shared checks for integration tests.

#![allow(dead_code)]

use dual_qp::Solution;

/// Row-major matrix-vector product.
pub fn matvec(mat: &[f64], rows: usize, cols: usize, vec: &[f64]) -> Vec<f64> {
    assert_eq!(mat.len(), rows * cols);
    assert_eq!(vec.len(), cols);
    mat.chunks_exact(cols.max(1))
        .take(rows)
        .map(|row| row.iter().zip(vec).map(|(m, v)| m * v).sum())
        .collect()
}

/// `C' x - b` for a row-major n by m `C`.
pub fn slacks(cmat: &[f64], bvec: &[f64], x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let m = bvec.len();
    (0..m)
        .map(|i| (0..n).map(|j| cmat[j * m + i] * x[j]).sum::<f64>() - bvec[i])
        .collect()
}

pub fn objective(gmat: &[f64], avec: &[f64], x: &[f64]) -> f64 {
    let n = x.len();
    let gx = matvec(gmat, n, n, x);
    let quad: f64 = gx.iter().zip(x).map(|(g, x)| g * x).sum();
    let lin: f64 = avec.iter().zip(x).map(|(a, x)| a * x).sum();
    0.5 * quad - lin
}

fn assert_close(actual: &[f64], expected: &[f64], tol: f64, what: &str) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let scale = 1.0_f64.max(a.abs()).max(e.abs());
        assert!(
            (a - e).abs() <= tol * scale,
            "{what}[{i}]: {a} != {e} (tol {tol})"
        );
    }
}

/// Check the unconstrained solution and the KKT conditions of `res`.
pub fn verify(
    gmat: &[f64],
    avec: &[f64],
    cmat: &[f64],
    bvec: &[f64],
    meq: usize,
    res: &Solution,
) {
    let n = avec.len();
    let m = bvec.len();

    // unconstrained solution
    let gxu = matvec(gmat, n, n, &res.unconstrained);
    assert_close(&gxu, avec, 1e-9, "G xu");

    // reported objective
    let obj = objective(gmat, avec, &res.sol);
    assert!(
        (res.obj - obj).abs() <= 1e-8 * obj.abs().max(1.0),
        "objective {} != {}",
        res.obj,
        obj
    );

    if m == 0 {
        assert_eq!(res.sol, res.unconstrained);
        assert!(res.lagr.is_empty() && res.iact.is_empty());
        return;
    }
    assert_eq!(res.lagr.len(), m);
    assert!(res.iact.len() <= n.min(m));

    let slack = slacks(cmat, bvec, &res.sol);
    let xnorm = res.sol.iter().map(|x| x * x).sum::<f64>().sqrt();
    for (i, (s, l)) in slack.iter().zip(&res.lagr).enumerate() {
        let cnorm = (0..n).map(|j| cmat[j * m + i].powi(2)).sum::<f64>().sqrt();
        let scale = bvec[i].abs().max(cnorm * xnorm).max(1.0);
        if i < meq {
            // primal feasibility for equalities
            assert!(s.abs() <= 1e-9 * scale, "equality {i} has slack {s}");
        } else {
            // primal feasibility
            assert!(*s >= -1e-12 * scale, "constraint {i} has slack {s}");
            // dual feasibility
            assert!(*l >= -1e-12, "constraint {i} has multiplier {l}");
            // complementary slackness
            if *l > 1e-10 {
                assert!(s.abs() <= 1e-9 * scale, "constraint {i}: multiplier {l}, slack {s}");
            }
        }
        if !res.iact.contains(&i) {
            assert_eq!(*l, 0.0, "inactive constraint {i} has multiplier {l}");
        }
    }

    // stationarity: G xf - a == C lagr
    let gx = matvec(gmat, n, n, &res.sol);
    let grad: Vec<f64> = gx.iter().zip(avec).map(|(g, a)| g - a).collect();
    let clagr = matvec(cmat, n, m, &res.lagr);
    assert_close(&grad, &clagr, 1e-8, "G xf - a");
}
