use crate::common::DomainResult;
use crate::domains::patrol::aggregate::{AreaBounds, OptimizationStats, Waypoint};

use super::geometry::{total_distance, CoverageGrid, DistanceMetric};

/// Collects the before/after figures of one optimization run.
pub struct StatsAccumulator<'a> {
    metric: &'a dyn DistanceMetric,
    battery_per_unit: f64,
    original_distance: f64,
    original_coverage: Option<f64>,
    grid: Option<CoverageGrid>,
    speed_limit: Option<f64>,
}

impl<'a> StatsAccumulator<'a> {
    pub fn begin(
        original: &[Waypoint],
        metric: &'a dyn DistanceMetric,
        battery_per_unit: f64,
        area_bounds: Option<&AreaBounds>,
        grid_size: usize,
        speed_limit: Option<f64>,
    ) -> DomainResult<Self> {
        let grid = area_bounds
            .map(|bounds| CoverageGrid::new(*bounds, grid_size))
            .transpose()?;
        Ok(Self {
            metric,
            battery_per_unit,
            original_distance: total_distance(original, metric),
            original_coverage: grid.as_ref().map(|g| g.coverage_ratio(original)),
            grid,
            speed_limit,
        })
    }

    pub fn finish(self, optimized: &[Waypoint]) -> OptimizationStats {
        let optimized_distance = total_distance(optimized, self.metric);
        let saved_distance = (self.original_distance - optimized_distance).max(0.0);

        let time_saved = self
            .speed_limit
            .map(|speed| saved_distance / speed)
            .unwrap_or(0.0);

        let coverage_improved = match (&self.grid, self.original_coverage) {
            (Some(grid), Some(before)) => (grid.coverage_ratio(optimized) - before).max(0.0),
            _ => 0.0,
        };

        OptimizationStats {
            original_distance: self.original_distance,
            optimized_distance,
            battery_saved: saved_distance * self.battery_per_unit,
            time_saved,
            coverage_improved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::patrol::optimizer::geometry::{Geodesic, Planar};

    #[test]
    fn shorter_path_reports_savings() {
        let original = vec![Waypoint::new(0.0, 0.0), Waypoint::new(10.0, 0.0), Waypoint::new(1.0, 0.0)];
        let optimized = vec![Waypoint::new(0.0, 0.0), Waypoint::new(1.0, 0.0), Waypoint::new(10.0, 0.0)];
        let acc = StatsAccumulator::begin(&original, &Planar, 0.5, None, 10, Some(2.0)).unwrap();
        let stats = acc.finish(&optimized);

        assert_eq!(stats.original_distance, 19.0);
        assert_eq!(stats.optimized_distance, 10.0);
        assert_eq!(stats.battery_saved, 4.5);
        assert_eq!(stats.time_saved, 4.5);
        assert_eq!(stats.coverage_improved, 0.0);
    }

    #[test]
    fn longer_path_never_reports_negative_savings() {
        let original = vec![Waypoint::new(0.0, 0.0)];
        let optimized = vec![Waypoint::new(0.0, 0.0), Waypoint::new(9.0, 9.0)];
        let bounds = AreaBounds::new(0.0, 9.0, 0.0, 9.0);
        let acc = StatsAccumulator::begin(&original, &Planar, 0.05, Some(&bounds), 10, Some(1.0)).unwrap();
        let stats = acc.finish(&optimized);

        assert_eq!(stats.battery_saved, 0.0);
        assert_eq!(stats.time_saved, 0.0);
        assert!((stats.coverage_improved - 0.01).abs() < 1e-12);
    }

    #[test]
    fn geodesic_savings_are_charged_per_metre() {
        let there = Waypoint::from_lat_lon(0.0, 0.01);
        let original = vec![Waypoint::from_lat_lon(0.0, 0.0), there.clone(), Waypoint::from_lat_lon(0.0, 0.0)];
        let optimized = vec![Waypoint::from_lat_lon(0.0, 0.0), there];
        let acc = StatsAccumulator::begin(&original, &Geodesic, 0.001, None, 10, None).unwrap();
        let stats = acc.finish(&optimized);

        let saved_metres = stats.original_distance - stats.optimized_distance;
        assert!((saved_metres - 1_111.95).abs() < 1.0, "{}", saved_metres);
        assert!((stats.battery_saved - saved_metres * 0.001).abs() < 1e-9);
    }
}
