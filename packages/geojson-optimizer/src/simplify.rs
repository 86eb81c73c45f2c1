use geo::Simplify;
use geo_types::{Coord, LineString};

use crate::coordinates::{CoordinateTree, GeometryKind};

// A closed ring needs at least three distinct positions plus the closing one.
const MIN_RING_POSITIONS: usize = 4;

/// Douglas-Peucker simplification of polygon rings. `tolerance` is in the
/// units of the coordinates (degrees for WGS84). Geometries other than
/// Polygon and MultiPolygon are returned unchanged.
pub fn simplify_rings(tree: CoordinateTree, kind: GeometryKind, tolerance: f64) -> CoordinateTree {
    match (kind, tree) {
        (GeometryKind::Polygon, CoordinateTree::Nested(rings)) => {
            CoordinateTree::Nested(simplify_polygon(rings, tolerance))
        }
        (GeometryKind::MultiPolygon, CoordinateTree::Nested(polygons)) => CoordinateTree::Nested(
            polygons
                .into_iter()
                .map(|polygon| match polygon {
                    CoordinateTree::Nested(rings) => {
                        CoordinateTree::Nested(simplify_polygon(rings, tolerance))
                    }
                    other => other,
                })
                .collect(),
        ),
        (_, tree) => tree,
    }
}

fn simplify_polygon(rings: Vec<CoordinateTree>, tolerance: f64) -> Vec<CoordinateTree> {
    rings
        .into_iter()
        .map(|ring| match ring {
            CoordinateTree::Nested(positions) => {
                CoordinateTree::Nested(simplify_ring(positions, tolerance))
            }
            other => other,
        })
        .collect()
}

fn simplify_ring(positions: Vec<CoordinateTree>, tolerance: f64) -> Vec<CoordinateTree> {
    if positions.len() < MIN_RING_POSITIONS {
        return positions;
    }

    let coords: Option<Vec<Coord<f64>>> = positions
        .iter()
        .map(|node| match node {
            CoordinateTree::Position(coord) => Some(*coord),
            _ => None,
        })
        .collect();
    // Rings holding anything but positions are left for the caller to see as-is
    let Some(mut coords) = coords else {
        return positions;
    };

    close_ring(&mut coords);
    let mut simplified = LineString::new(coords).simplify(&tolerance).0;
    close_ring(&mut simplified);

    if simplified.len() < MIN_RING_POSITIONS {
        return positions;
    }

    simplified.into_iter().map(CoordinateTree::Position).collect()
}

fn close_ring(coords: &mut Vec<Coord<f64>>) {
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if coords.len() > 1 && first != last {
            coords.push(first);
        }
    }
}
