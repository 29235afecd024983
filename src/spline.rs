//! Smoothing-spline fits across channels and their per-cube consensus.
//!
//! Each block contributes a noisy length-256 uncertainty law (log10
//! relative std-dev vs channel). A degree-5 least-squares B-spline is fit
//! per block, then all block fits are averaged channel by channel into one
//! consensus curve for the cube.
//!
//! The fit uses a clamped knot vector with uniformly spaced interior
//! knots, so the coefficient count stays far below the sample count and
//! the spline smooths instead of interpolating. The overdetermined system
//! is solved by SVD.
//!
//! Basis evaluation follows algorithms A2.1/A2.2 of Piegl & Tiller,
//! *The NURBS Book* (2nd ed.).

use nalgebra::{DMatrix, DVector};

use crate::error::Error;

/// Spline degree used for the per-block smoothing fits.
pub const SPLINE_DEGREE: usize = 5;

/// Interior knot count for a full-length fit. Low enough that a 256-point
/// fit averages out block noise rather than chasing it.
const DEFAULT_INTERIOR_KNOTS: usize = 12;

/// A least-squares B-spline fit `y(x)` on a clamped uniform knot vector.
#[derive(Debug, Clone)]
pub struct SmoothingSpline {
    degree: usize,
    knots: Vec<f64>,
    coeffs: Vec<f64>,
}

impl SmoothingSpline {
    /// Fit a degree-5 smoothing spline through `(xs[i], ys[i])`.
    ///
    /// `xs` must be strictly increasing (channel indices are). Fails with
    /// [`Error::InsufficientSamples`] when fewer than `SPLINE_DEGREE + 1`
    /// points are available; a degree-5 fit is underdetermined below 6.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self, Error> {
        Self::fit_with_degree(xs, ys, SPLINE_DEGREE)
    }

    /// Fit with an explicit degree. Used by `fit` and by tests probing
    /// lower-degree behavior.
    pub fn fit_with_degree(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, Error> {
        assert_eq!(xs.len(), ys.len(), "xs and ys must have the same length");
        let m = xs.len();
        let needed = degree + 1;
        if m < needed {
            return Err(Error::InsufficientSamples { got: m, needed });
        }
        let (x0, x1) = (xs[0], xs[m - 1]);
        assert!(x1 > x0, "xs must span a nonzero range");

        // Keep the system overdetermined: never more coefficients than points.
        let n_interior = DEFAULT_INTERIOR_KNOTS.min(m - needed);
        let n_coef = needed + n_interior;
        let knots = clamped_uniform_knots(x0, x1, degree, n_interior);

        // One row per sample; only degree+1 basis functions are nonzero on
        // any row.
        let mut a = DMatrix::<f64>::zeros(m, n_coef);
        let mut b = DVector::<f64>::zeros(m);
        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            let span = find_span(&knots, degree, n_coef, x);
            let basis = basis_values(&knots, degree, span, x);
            for (j, &nj) in basis.iter().enumerate() {
                a[(i, span - degree + j)] = nj;
            }
            b[i] = y;
        }

        let svd = a.svd(true, true);
        let coeffs = svd
            .solve(&b, 1e-12)
            .unwrap_or_else(|_| DVector::zeros(n_coef));

        Ok(Self {
            degree,
            knots,
            coeffs: coeffs.iter().copied().collect(),
        })
    }

    /// Evaluate the fit at `x`.
    ///
    /// Outside the fitted range the nearest boundary polynomial piece is
    /// extrapolated.
    pub fn value(&self, x: f64) -> f64 {
        let n_coef = self.coeffs.len();
        let span = find_span(&self.knots, self.degree, n_coef, x);
        let basis = basis_values(&self.knots, self.degree, span, x);
        basis
            .iter()
            .enumerate()
            .map(|(j, &nj)| nj * self.coeffs[span - self.degree + j])
            .sum()
    }
}

/// Average many block fits into one consensus curve over `grid`.
///
/// For each grid point the fitted values of all blocks are averaged, so
/// the result is independent of block order. Fails with
/// [`Error::InsufficientSamples`] when no fits are given.
pub fn average_fits(fits: &[SmoothingSpline], grid: &[f64]) -> Result<Vec<f64>, Error> {
    if fits.is_empty() {
        return Err(Error::InsufficientSamples { got: 0, needed: 1 });
    }
    Ok(grid
        .iter()
        .map(|&x| fits.iter().map(|f| f.value(x)).sum::<f64>() / fits.len() as f64)
        .collect())
}

// ── Knot vector and basis helpers ───────────────────────────────────────────

/// Clamped knot vector: boundary knots repeated degree+1 times, interior
/// knots uniformly spaced on (x0, x1).
fn clamped_uniform_knots(x0: f64, x1: f64, degree: usize, n_interior: usize) -> Vec<f64> {
    let n_coef = degree + 1 + n_interior;
    let mut knots = Vec::with_capacity(n_coef + degree + 1);
    knots.extend(std::iter::repeat(x0).take(degree + 1));
    let step = (x1 - x0) / (n_interior + 1) as f64;
    for i in 1..=n_interior {
        knots.push(x0 + step * i as f64);
    }
    knots.extend(std::iter::repeat(x1).take(degree + 1));
    knots
}

/// Index of the knot span containing `x`, clamped to the valid range
/// `[degree, n_coef - 1]` so out-of-range evaluations extrapolate the
/// boundary piece.
fn find_span(knots: &[f64], degree: usize, n_coef: usize, x: f64) -> usize {
    if x >= knots[n_coef] {
        return n_coef - 1;
    }
    if x <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n_coef;
    let mut mid = (low + high) / 2;
    while x < knots[mid] || x >= knots[mid + 1] {
        if x < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// The degree+1 non-vanishing basis functions at `x` for the given span.
fn basis_values(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let tmp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * tmp;
            saved = left[j - r] * tmp;
        }
        n[j] = saved;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn basis_is_a_partition_of_unity() {
        let knots = clamped_uniform_knots(0.0, 255.0, 5, 12);
        let n_coef = 18;
        for &x in &[0.0, 0.3, 17.0, 128.0, 254.9, 255.0] {
            let span = find_span(&knots, 5, n_coef, x);
            let sum: f64 = basis_values(&knots, 5, span, x).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "x = {x}: sum = {sum}");
        }
    }

    #[test]
    fn too_few_points_is_an_error() {
        let xs = channel_grid(5);
        let ys = vec![0.0; 5];
        let err = SmoothingSpline::fit(&xs, &ys).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientSamples { got: 5, needed: 6 }
        ));
    }

    #[test]
    fn six_points_is_the_minimum() {
        let xs = channel_grid(6);
        let ys: Vec<f64> = xs.iter().map(|x| 0.1 * x - 1.0).collect();
        let spl = SmoothingSpline::fit(&xs, &ys).unwrap();
        assert!((spl.value(2.5) - (0.1 * 2.5 - 1.0)).abs() < 1e-8);
    }

    #[test]
    fn constant_data_is_reproduced_exactly() {
        let xs = channel_grid(256);
        let ys = vec![-1.0; 256];
        let spl = SmoothingSpline::fit(&xs, &ys).unwrap();
        for &x in &[0.0, 10.0, 99.5, 255.0] {
            assert!((spl.value(x) + 1.0).abs() < 1e-9, "x = {x}");
        }
    }

    #[test]
    fn linear_data_is_reproduced() {
        // Polynomials up to the spline degree lie in the fit space, so a
        // linear law is recovered to numerical precision.
        let xs = channel_grid(256);
        let ys: Vec<f64> = xs.iter().map(|x| -2.0 + 0.004 * x).collect();
        let spl = SmoothingSpline::fit(&xs, &ys).unwrap();
        for &x in &[0.0, 31.5, 127.0, 200.25, 255.0] {
            assert!((spl.value(x) - (-2.0 + 0.004 * x)).abs() < 1e-7, "x = {x}");
        }
    }

    #[test]
    fn fit_smooths_alternating_noise() {
        // A sawtooth around a constant: the smoothing fit should stay close
        // to the constant rather than chase the ±0.2 oscillation.
        let xs = channel_grid(256);
        let ys: Vec<f64> = xs
            .iter()
            .map(|x| -1.5 + if (*x as usize) % 2 == 0 { 0.2 } else { -0.2 })
            .collect();
        let spl = SmoothingSpline::fit(&xs, &ys).unwrap();
        for &x in &[20.0, 128.0, 230.0] {
            assert!((spl.value(x) + 1.5).abs() < 0.05, "x = {x}");
        }
    }

    #[test]
    fn consensus_averages_the_fits() {
        // Two constant laws at -1.0 and -2.0: the consensus at any channel
        // is their midpoint.
        let xs = channel_grid(256);
        let a = SmoothingSpline::fit(&xs, &vec![-1.0; 256]).unwrap();
        let b = SmoothingSpline::fit(&xs, &vec![-2.0; 256]).unwrap();
        let curve = average_fits(&[a, b], &xs).unwrap();
        assert_eq!(curve.len(), 256);
        assert!((curve[10] + 1.5).abs() < 1e-9);
    }

    #[test]
    fn consensus_is_order_independent() {
        let xs = channel_grid(64);
        let laws: Vec<SmoothingSpline> = (0..5)
            .map(|k| {
                let ys: Vec<f64> = xs.iter().map(|x| -1.0 - 0.1 * k as f64 + 0.001 * x).collect();
                SmoothingSpline::fit(&xs, &ys).unwrap()
            })
            .collect();

        let forward = average_fits(&laws, &xs).unwrap();
        let reversed: Vec<SmoothingSpline> = laws.iter().rev().cloned().collect();
        let backward = average_fits(&reversed, &xs).unwrap();
        for (f, b) in forward.iter().zip(&backward) {
            assert!((f - b).abs() < 1e-12);
        }
    }

    #[test]
    fn no_fits_is_an_error() {
        let err = average_fits(&[], &channel_grid(256)).unwrap_err();
        assert!(matches!(err, Error::InsufficientSamples { got: 0, .. }));
    }
}
