use crate::common::DomainResult;
use crate::domains::patrol::aggregate::{AreaBounds, Waypoint};

use super::geometry::CoverageGrid;

pub const DEFAULT_GRID_SIZE: usize = 10;

/// Append one waypoint per grid cell that no input waypoint falls into.
///
/// New points are placed at the interpolated cell position and appended
/// after the originals, iterating the x index in the outer loop.
pub fn densify_coverage(
    path: &[Waypoint],
    bounds: &AreaBounds,
    grid_size: usize,
) -> DomainResult<Vec<Waypoint>> {
    let grid = CoverageGrid::new(*bounds, grid_size)?;
    let covered = grid.occupancy(path);

    let mut out = path.to_vec();
    out.reserve(covered.iter().filter(|c| !**c).count());
    for ix in 0..grid.size() {
        for iy in 0..grid.size() {
            if !covered[ix * grid.size() + iy] {
                out.push(grid.cell_center(ix, iy));
            }
        }
    }
    Ok(out)
}
