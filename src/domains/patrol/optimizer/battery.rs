use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::Waypoint;

/// Below this charge the path is thinned to every second waypoint.
pub const LOW_BATTERY: u8 = 20;
/// Below this charge (and at or above [`LOW_BATTERY`]) the path is kept as is.
pub const MEDIUM_BATTERY: u8 = 50;

/// Reduce a path according to the remaining battery level (0..=100).
pub fn reduce_for_battery(path: &[Waypoint], battery_level: u8) -> DomainResult<Vec<Waypoint>> {
    if battery_level > 100 {
        return Err(DomainError::invalid(format!(
            "battery level {} is outside 0..=100",
            battery_level
        )));
    }

    let reduced = match battery_level {
        level if level < LOW_BATTERY => path.iter().step_by(2).cloned().collect(),
        // TODO: reorder by energy cost once per-leg consumption is modelled
        level if level < MEDIUM_BATTERY => path.to_vec(),
        _ => path.to_vec(),
    };
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Waypoint> {
        (0..n).map(|i| Waypoint::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn low_battery_keeps_even_indices() {
        let out = reduce_for_battery(&line(5), 15).unwrap();
        let xs: Vec<f64> = out.iter().map(|w| w.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn first_waypoint_survives_low_battery() {
        let out = reduce_for_battery(&line(1), 0).unwrap();
        assert_eq!(out, line(1));
        assert!(reduce_for_battery(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn medium_and_high_battery_are_identity() {
        let path = line(6);
        assert_eq!(reduce_for_battery(&path, 20).unwrap(), path);
        assert_eq!(reduce_for_battery(&path, 49).unwrap(), path);
        assert_eq!(reduce_for_battery(&path, 80).unwrap(), path);
    }

    #[test]
    fn rejects_out_of_range_level() {
        assert!(reduce_for_battery(&line(3), 101).is_err());
    }
}
