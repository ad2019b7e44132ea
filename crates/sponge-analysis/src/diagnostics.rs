//! Derived columns over an exported series.

use serde::Serialize;
use sponge_types::SeriesPoint;

/// Unhealed defects per level divided by the `20^t` candidates a defect-free
/// run would have produced at that level.
///
/// Level 0 has no candidates and maps to `0`.
#[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
pub fn normalized_defects(series: &[SeriesPoint]) -> Vec<f64> {
    series
        .iter()
        .map(|point| {
            if point.t == 0 {
                return 0.0;
            }
            i32::try_from(point.t).map_or(0.0, |exp| {
                point.defects_count as f64 / 20.0_f64.powi(exp)
            })
        })
        .collect()
}

/// The three reservoirs of a series, one column each.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnergySeries {
    /// Levels, aligned with every column.
    pub t: Vec<u32>,
    /// Geometric reservoir.
    pub e_geom: Vec<f64>,
    /// Healing reservoir.
    pub e_heal: Vec<f64>,
    /// Entropy reservoir.
    pub e_entropy: Vec<f64>,
}

impl EnergySeries {
    /// Per-level sum of the three reservoirs.
    pub fn totals(&self) -> Vec<f64> {
        self.e_geom
            .iter()
            .zip(&self.e_heal)
            .zip(&self.e_entropy)
            .map(|((g, h), e)| g + h + e)
            .collect()
    }
}

/// Split `series` into per-reservoir columns.
pub fn energy_series(series: &[SeriesPoint]) -> EnergySeries {
    let mut out = EnergySeries::default();
    for point in series {
        out.t.push(point.t);
        out.e_geom.push(point.e_geom);
        out.e_heal.push(point.e_heal);
        out.e_entropy.push(point.e_entropy);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use sponge_core::{ParameterSet, RunRecord, run};

    use super::*;

    fn row(t: u32, defects_count: u64) -> SeriesPoint {
        SeriesPoint {
            t,
            defects_count,
            e_geom: 1.0,
            e_heal: 0.0,
            e_entropy: 0.0,
            n_realized_centers: 1,
        }
    }

    #[test]
    fn normalization_divides_by_twenty_to_the_level() {
        let series = [row(0, 3), row(1, 2), row(2, 40)];
        let normalized = normalized_defects(&series);
        assert_eq!(normalized.len(), 3);
        assert!(normalized[0].abs() < f64::EPSILON);
        assert!((normalized[1] - 0.1).abs() < 1e-15);
        assert!((normalized[2] - 0.1).abs() < 1e-15);
    }

    #[test]
    fn empty_series_has_empty_columns() {
        assert!(normalized_defects(&[]).is_empty());
        assert_eq!(energy_series(&[]), EnergySeries::default());
    }

    #[test]
    fn columns_follow_the_run() {
        let params = ParameterSet::default();
        let states = run(3, &params, 42).unwrap();
        let record = RunRecord::from_states(params, Some(42), &states);
        let columns = energy_series(&record.series);

        assert_eq!(columns.t, vec![0, 1, 2, 3]);
        assert!((columns.e_geom[0] - 1.0).abs() < f64::EPSILON);
        for total in columns.totals() {
            assert!((total - 1.0).abs() < 1e-10);
        }
        for (i, state) in states.iter().enumerate() {
            assert!((columns.e_heal[i] - state.e_heal()).abs() < f64::EPSILON);
        }
    }
}
