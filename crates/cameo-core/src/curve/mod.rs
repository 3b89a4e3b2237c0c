//! Curve functions built from sparse control points, and their composition.
//!
//! A curve remaps channel intensities. It is evaluated once per possible
//! 8-bit input while building a [`LookupTable`](crate::filter::LookupTable),
//! never per pixel.

mod compose;
mod spline;

pub use compose::{ChannelFn, Composite, compose};

/// Interpolation kind, chosen by the number of control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Two points.
    Linear,
    /// Three points.
    Quadratic,
    /// Four or more points.
    Cubic,
}

/// A smooth function through `(x, y)` control points.
///
/// Only defined on `[x_min, x_max]` of its control points; evaluating outside
/// that range yields `None` rather than extrapolating.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFunction {
    xs: Vec<f64>,
    ys: Vec<f64>,
    kind: Interpolation,
    /// Spline second derivatives, cubic curves only.
    moments: Vec<f64>,
}

impl CurveFunction {
    /// Build a curve from control points in any order.
    ///
    /// Returns `None` when fewer than 2 points are given, when two points share
    /// an x-value, or when any coordinate is not finite.
    pub fn new(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return None;
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        if sorted.windows(2).any(|w| w[0].0 == w[1].0) {
            tracing::debug!(points = points.len(), "duplicate x in curve control points");
            return None;
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = sorted.into_iter().unzip();
        let kind = match xs.len() {
            2 => Interpolation::Linear,
            3 => Interpolation::Quadratic,
            _ => Interpolation::Cubic,
        };
        let moments = match kind {
            Interpolation::Cubic => spline::not_a_knot_moments(&xs, &ys)?,
            _ => Vec::new(),
        };

        Some(Self {
            xs,
            ys,
            kind,
            moments,
        })
    }

    /// Build a curve from `[x, y]` pairs, as stored in presets.
    pub fn from_pairs(points: &[[f64; 2]]) -> Option<Self> {
        let points: Vec<(f64, f64)> = points.iter().map(|&[x, y]| (x, y)).collect();
        Self::new(&points)
    }

    /// Interpolation kind in use.
    pub fn kind(&self) -> Interpolation {
        self.kind
    }

    /// `(x_min, x_max)` of the control points.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluate at `x`. `None` outside the control point domain.
    ///
    /// Exactly hits every control point's y-value.
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        let (lo, hi) = self.domain();
        if !(lo..=hi).contains(&x) {
            return None;
        }
        if let Ok(i) = self.xs.binary_search_by(|knot| knot.total_cmp(&x)) {
            return Some(self.ys[i]);
        }

        let y = match self.kind {
            Interpolation::Linear => spline::linear(&self.xs, &self.ys, x),
            Interpolation::Quadratic => spline::quadratic(&self.xs, &self.ys, x),
            Interpolation::Cubic => spline::cubic(&self.xs, &self.ys, &self.moments, x),
        };
        Some(y)
    }

    /// Borrow this curve as a plain function for composition.
    pub fn as_fn(&self) -> impl Fn(f64) -> Option<f64> + '_ {
        move |x| self.evaluate(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn lagrange(points: &[(f64, f64)], x: f64) -> f64 {
        points
            .iter()
            .enumerate()
            .map(|(i, &(xi, yi))| {
                let basis: f64 = points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &(xj, _))| (x - xj) / (xi - xj))
                    .product();
                yi * basis
            })
            .sum()
    }

    #[test]
    fn test_fewer_than_two_points_is_absent() {
        assert!(CurveFunction::new(&[]).is_none());
        assert!(CurveFunction::new(&[(10.0, 10.0)]).is_none());
    }

    #[test]
    fn test_duplicate_x_is_absent() {
        assert!(CurveFunction::new(&[(0.0, 0.0), (50.0, 10.0), (50.0, 90.0)]).is_none());
    }

    #[test]
    fn test_kind_follows_point_count() {
        let two = CurveFunction::new(&[(0.0, 0.0), (255.0, 255.0)]).expect("valid");
        let three = CurveFunction::new(&[(0.0, 0.0), (128.0, 150.0), (255.0, 255.0)]).expect("valid");
        let four = CurveFunction::new(&[(0.0, 0.0), (23.0, 20.0), (157.0, 173.0), (255.0, 255.0)])
            .expect("valid");
        assert_eq!(two.kind(), Interpolation::Linear);
        assert_eq!(three.kind(), Interpolation::Quadratic);
        assert_eq!(four.kind(), Interpolation::Cubic);
    }

    #[test]
    fn test_linear_midpoint() {
        let curve = CurveFunction::new(&[(0.0, 10.0), (100.0, 30.0)]).expect("valid");
        assert!((curve.evaluate(50.0).expect("in domain") - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_quadratic_matches_parabola_through_points() {
        let points = [(0.0, 0.0), (128.0, 150.0), (255.0, 255.0)];
        let curve = CurveFunction::new(&points).expect("valid");
        for x in [10.0, 64.0, 200.0] {
            let y = curve.evaluate(x).expect("in domain");
            assert!((y - lagrange(&points, x)).abs() < 1e-6, "x = {x}");
        }
    }

    #[test]
    fn test_four_point_cubic_is_the_interpolating_cubic() {
        let points = [(0.0, 0.0), (23.0, 20.0), (157.0, 173.0), (255.0, 255.0)];
        let curve = CurveFunction::new(&points).expect("valid");
        for x in [5.0, 80.0, 200.0, 250.0] {
            let y = curve.evaluate(x).expect("in domain");
            assert!((y - lagrange(&points, x)).abs() < 1e-6, "x = {x}");
        }
    }

    #[test]
    fn test_unsorted_points_are_sorted() {
        let sorted = CurveFunction::new(&[(0.0, 0.0), (128.0, 150.0), (255.0, 255.0)]).expect("valid");
        let shuffled = CurveFunction::new(&[(255.0, 255.0), (0.0, 0.0), (128.0, 150.0)]).expect("valid");
        assert_eq!(sorted, shuffled);
    }

    #[test]
    fn test_passes_through_control_points() {
        let points = [(0.0, 0.0), (50.0, 40.0), (120.0, 130.0), (200.0, 210.0), (255.0, 255.0)];
        let curve = CurveFunction::new(&points).expect("valid");
        for (x, y) in points {
            assert_eq!(curve.evaluate(x), Some(y));
        }
    }

    #[test]
    fn test_no_extrapolation_outside_domain() {
        let curve = CurveFunction::new(&[(10.0, 0.0), (200.0, 255.0)]).expect("valid");
        assert_eq!(curve.domain(), (10.0, 200.0));
        assert!(curve.evaluate(9.0).is_none());
        assert!(curve.evaluate(201.0).is_none());
        assert!(curve.evaluate(f64::NAN).is_none());
    }
}
