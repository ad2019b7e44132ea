//! Box-counting dimension.
//!
//! For every scale `r_i = 3^-i`, `i = 0..=t_max`, each point is assigned to
//! the grid cell `floor(position / r_i)` and the distinct occupied cells
//! `N_i` are counted. The dimension is the least-squares slope of
//! `ln N_i` against `ln(1 / r_i)`.
//!
//! Degenerate input is not an error. An empty cloud or fewer than two usable
//! scales yields `NaN`. A cloud whose counts never change with scale (a
//! single point, say) has slope `0`.

use std::collections::HashSet;

use serde::Serialize;
use sponge_types::Point3;
use tracing::debug;

/// Result of a box-counting fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionEstimate {
    /// Fitted slope, or `NaN` when undefined.
    pub dimension: f64,
    /// Box sides `r_i` that entered the fit, coarsest first.
    pub scales: Vec<f64>,
    /// Occupied-box counts `N_i`, aligned with `scales`.
    pub counts: Vec<u64>,
}

impl DimensionEstimate {
    fn undefined(scales: Vec<f64>, counts: Vec<u64>) -> Self {
        Self {
            dimension: f64::NAN,
            scales,
            counts,
        }
    }

    /// Whether the fit produced a number.
    pub const fn is_defined(&self) -> bool {
        !self.dimension.is_nan()
    }
}

/// Estimate the box-counting dimension of `points` over scales
/// `3^0 ..= 3^-t_max`.
///
/// Points with non-finite coordinates are ignored.
pub fn box_counting_dimension(points: &[Point3], t_max: u32) -> DimensionEstimate {
    let finite: Vec<&Point3> = points.iter().filter(|p| p.is_finite()).collect();
    if finite.is_empty() {
        return DimensionEstimate::undefined(Vec::new(), Vec::new());
    }

    let mut scales = Vec::new();
    let mut counts = Vec::new();
    for i in 0..=t_max {
        let Ok(exp) = i32::try_from(i) else {
            break;
        };
        let inv = 3.0_f64.powi(exp);
        let occupied = count_boxes(&finite, inv);
        if occupied > 0 {
            scales.push(inv.recip());
            counts.push(occupied);
        }
    }

    if counts.len() < 2 {
        return DimensionEstimate::undefined(scales, counts);
    }

    let xs: Vec<f64> = scales.iter().map(|r| r.recip().ln()).collect();
    #[allow(clippy::cast_precision_loss)]
    let ys: Vec<f64> = counts.iter().map(|&n| (n as f64).ln()).collect();
    let dimension = least_squares_slope(&xs, &ys);

    debug!(
        points = finite.len(),
        t_max,
        scales = counts.len(),
        dimension,
        "Box-counting fit"
    );

    DimensionEstimate {
        dimension,
        scales,
        counts,
    }
}

/// Distinct grid cells of side `1 / inv` occupied by `points`.
#[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
fn count_boxes(points: &[&Point3], inv: f64) -> u64 {
    let occupied: HashSet<[i64; 3]> = points
        .iter()
        .map(|p| p.to_array().map(|c| (c * inv).floor() as i64))
        .collect();
    u64::try_from(occupied.len()).unwrap_or(u64::MAX)
}

/// Ordinary least-squares slope of `ys` against `xs`.
///
/// Returns `NaN` if the slices are shorter than two, differ in length, or
/// `xs` has no spread.
#[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
pub fn least_squares_slope(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return f64::NAN;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (cov, var) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(cov, var), (&x, &y)| {
            let dx = x - mean_x;
            (dx.mul_add(y - mean_y, cov), dx.mul_add(dx, var))
        });

    if var == 0.0 { f64::NAN } else { cov / var }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use sponge_core::growth::generate_children;

    use super::*;

    fn full_set(depth: u32) -> Vec<Point3> {
        (0..depth).fold(vec![Point3::CENTROID], |points, level| {
            generate_children(&points, level)
        })
    }

    #[test]
    fn empty_cloud_is_undefined() {
        let estimate = box_counting_dimension(&[], 5);
        assert!(estimate.dimension.is_nan());
        assert!(estimate.scales.is_empty());
        assert!(estimate.counts.is_empty());
        assert!(!estimate.is_defined());
    }

    #[test]
    fn single_scale_is_undefined() {
        let estimate = box_counting_dimension(&[Point3::CENTROID], 0);
        assert!(estimate.dimension.is_nan());
        assert_eq!(estimate.counts, vec![1]);
    }

    #[test]
    fn single_point_has_zero_slope() {
        let estimate = box_counting_dimension(&[Point3::CENTROID], 4);
        assert!(estimate.dimension.abs() < 1e-12);
        assert_eq!(estimate.counts, vec![1; 5]);
    }

    #[test]
    fn centroid_over_three_scales_has_zero_slope() {
        let estimate = box_counting_dimension(&[Point3::new(0.5, 0.5, 0.5)], 3);
        assert_eq!(estimate.counts, vec![1; 4]);
        assert_eq!(estimate.scales.len(), 4);
        assert!(estimate.is_defined());
        assert!(estimate.dimension.abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let points = [Point3::new(f64::NAN, 0.5, 0.5)];
        assert!(box_counting_dimension(&points, 3).scales.is_empty());
    }

    #[test]
    fn full_set_counts_are_powers_of_twenty() {
        let estimate = box_counting_dimension(&full_set(3), 3);
        assert_eq!(estimate.counts, vec![1, 20, 400, 8000]);
        assert!((estimate.scales[1] - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn full_set_recovers_menger_dimension() {
        let expected = 20.0_f64.ln() / 3.0_f64.ln();
        let estimate = box_counting_dimension(&full_set(4), 4);
        assert!((estimate.dimension - expected).abs() < 1e-9);
    }

    #[test]
    fn resolving_beyond_the_depth_underestimates() {
        let expected = 20.0_f64.ln() / 3.0_f64.ln();
        let points = full_set(3);
        let matched = box_counting_dimension(&points, 3).dimension;
        let over = box_counting_dimension(&points, 5).dimension;
        assert!(over < matched);
        assert!((matched - expected).abs() < 1e-9);
    }

    #[test]
    fn slope_of_a_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        assert!((least_squares_slope(&xs, &ys) - 2.0).abs() < 1e-12);
        assert!(least_squares_slope(&[1.0, 1.0], &[0.0, 2.0]).is_nan());
        assert!(least_squares_slope(&[1.0], &[1.0]).is_nan());
    }
}
