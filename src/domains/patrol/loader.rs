use geojson::{GeoJson, Geometry, Value};

use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::Waypoint;

/// Read patrol waypoints from GeoJSON text.
///
/// Accepts a `FeatureCollection` of `Point`/`MultiPoint`/`LineString`
/// features, a single feature, or a bare geometry. GeoJSON positions are
/// `[longitude, latitude]`; they become `x = latitude`, `y = longitude`.
pub fn waypoints_from_geojson(text: &str) -> DomainResult<Vec<Waypoint>> {
    let parsed: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| DomainError::invalid(format!("invalid GeoJSON: {}", e)))?;

    let mut waypoints = Vec::new();
    match parsed {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    collect_geometry(&geometry, &mut waypoints)?;
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                collect_geometry(&geometry, &mut waypoints)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry(&geometry, &mut waypoints)?,
    }
    Ok(waypoints)
}

fn collect_geometry(geometry: &Geometry, out: &mut Vec<Waypoint>) -> DomainResult<()> {
    match &geometry.value {
        Value::Point(position) => out.push(to_waypoint(position)?),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            for position in positions {
                out.push(to_waypoint(position)?);
            }
        }
        Value::GeometryCollection(members) => {
            for member in members {
                collect_geometry(member, out)?;
            }
        }
        Value::MultiLineString(_) | Value::Polygon(_) | Value::MultiPolygon(_) => {
            return Err(DomainError::invalid(
                "only Point, MultiPoint and LineString geometries describe waypoints",
            ))
        }
    }
    Ok(())
}

fn to_waypoint(position: &[f64]) -> DomainResult<Waypoint> {
    match position {
        [longitude, latitude, ..] => Ok(Waypoint::from_lat_lon(*latitude, *longitude)),
        _ => Err(DomainError::invalid("GeoJSON position needs two coordinates")),
    }
}
