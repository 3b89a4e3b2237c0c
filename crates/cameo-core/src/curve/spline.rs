//! Interpolating polynomials and splines through control points.
//!
//! # Algorithm
//! - 2 points: straight line.
//! - 3 points: the unique quadratic through all three (Lagrange form).
//! - 4+ points: cubic spline with not-a-knot end conditions. The third
//!   derivative is continuous across the second and penultimate knots, so four
//!   points collapse to the single cubic through them.
//!
//! Second derivatives `M` of the cubic spline satisfy, for interior knots,
//! ```text
//! h[i-1]·M[i-1] + 2(h[i-1] + h[i])·M[i] + h[i]·M[i+1] = 6·(d[i] − d[i-1])
//! ```
//! with `h[i] = x[i+1] − x[i]` and `d[i] = (y[i+1] − y[i]) / h[i]`.

/// Pivot magnitude below which the spline system is treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Index `i` of the segment `[xs[i], xs[i+1]]` containing `x`.
///
/// `xs` is sorted with at least two entries and `x` lies within its range.
pub(crate) fn segment(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&knot| knot <= x);
    upper.clamp(1, xs.len() - 1) - 1
}

pub(crate) fn linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let i = segment(xs, x);
    let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
    ys[i] + (ys[i + 1] - ys[i]) * t
}

pub(crate) fn quadratic(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let mut sum = 0.0;
    for i in 0..3 {
        let mut basis = 1.0;
        for j in 0..3 {
            if i != j {
                basis *= (x - xs[j]) / (xs[i] - xs[j]);
            }
        }
        sum += ys[i] * basis;
    }
    sum
}

/// Solve for the second derivatives of the not-a-knot cubic spline.
///
/// Returns `None` when the system is singular.
pub(crate) fn not_a_knot_moments(xs: &[f64], ys: &[f64]) -> Option<Vec<f64>> {
    let n = xs.len();
    debug_assert!(n >= 4);

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let d: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    let mut a = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];

    // (M1 − M0)/h0 = (M2 − M1)/h1
    a[0][0] = h[1];
    a[0][1] = -(h[0] + h[1]);
    a[0][2] = h[0];

    for i in 1..n - 1 {
        a[i][i - 1] = h[i - 1];
        a[i][i] = 2.0 * (h[i - 1] + h[i]);
        a[i][i + 1] = h[i];
        rhs[i] = 6.0 * (d[i] - d[i - 1]);
    }

    // (M[n-2] − M[n-3])/h[n-3] = (M[n-1] − M[n-2])/h[n-2]
    a[n - 1][n - 3] = h[n - 2];
    a[n - 1][n - 2] = -(h[n - 3] + h[n - 2]);
    a[n - 1][n - 1] = h[n - 3];

    solve(a, rhs)
}

/// Evaluate a cubic spline from its knots and second derivatives.
pub(crate) fn cubic(xs: &[f64], ys: &[f64], moments: &[f64], x: f64) -> f64 {
    let i = segment(xs, x);
    let h = xs[i + 1] - xs[i];
    let left = xs[i + 1] - x;
    let right = x - xs[i];
    moments[i] * left.powi(3) / (6.0 * h)
        + moments[i + 1] * right.powi(3) / (6.0 * h)
        + (ys[i] / h - moments[i] * h / 6.0) * left
        + (ys[i + 1] / h - moments[i + 1] * h / 6.0) * right
}

/// Gaussian elimination with partial pivoting. Control point counts are small,
/// so a dense solve is fine.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&p, &q| a[p][col].abs().total_cmp(&a[q][col].abs()))?;
        if a[pivot][col].abs() < SINGULAR_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
