use geo_types::Coord;
use serde_json::Value;

// Beyond 2^52 every f64 is already a whole number, so scaling and rounding
// can only add error.
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0;
// Whole numbers below 2^53 convert to i64 without loss.
const SAFE_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// GeoJSON geometry types, as named by the `type` member of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Unknown,
}

impl GeometryKind {
    pub fn from_type_name(name: Option<&str>) -> Self {
        match name {
            Some("Point") => GeometryKind::Point,
            Some("MultiPoint") => GeometryKind::MultiPoint,
            Some("LineString") => GeometryKind::LineString,
            Some("MultiLineString") => GeometryKind::MultiLineString,
            Some("Polygon") => GeometryKind::Polygon,
            Some("MultiPolygon") => GeometryKind::MultiPolygon,
            Some("GeometryCollection") => GeometryKind::GeometryCollection,
            _ => GeometryKind::Unknown,
        }
    }

    /// Kind of a geometry object, read from its `type` member.
    pub fn of_geometry(geometry: &Value) -> Self {
        Self::from_type_name(geometry.get("type").and_then(Value::as_str))
    }

    /// Number of array levels wrapped around each position, when the type
    /// fixes it (MultiPolygon -> Polygon -> Ring -> Position is 3).
    pub fn position_depth(self) -> Option<usize> {
        match self {
            GeometryKind::Point => Some(0),
            GeometryKind::MultiPoint | GeometryKind::LineString => Some(1),
            GeometryKind::MultiLineString | GeometryKind::Polygon => Some(2),
            GeometryKind::MultiPolygon => Some(3),
            GeometryKind::GeometryCollection | GeometryKind::Unknown => None,
        }
    }
}

/// A `coordinates` member decoded into positions and the arrays nesting them.
///
/// Positions only keep longitude and latitude; elevation and measure values
/// are dropped while decoding. Anything that is neither a position nor an
/// array of nodes (including positions with fewer than two numbers) is kept
/// verbatim as `Opaque` so it can be written back untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateTree {
    Position(Coord<f64>),
    Nested(Vec<CoordinateTree>),
    Opaque(Value),
}

impl CoordinateTree {
    /// Decode `value` using the nesting depth implied by `kind`. Nodes that do
    /// not fit the expected depth, and geometries of unknown type, are
    /// classified by their first element instead.
    pub fn from_value(value: &Value, kind: GeometryKind) -> Self {
        match kind.position_depth() {
            Some(depth) => Self::parse_at_depth(value, depth),
            None => Self::parse_dynamic(value),
        }
    }

    fn parse_at_depth(value: &Value, depth: usize) -> Self {
        if depth == 0 {
            return Self::parse_dynamic(value);
        }
        match value {
            Value::Array(items) if !starts_with_number(items) => CoordinateTree::Nested(
                items
                    .iter()
                    .map(|item| Self::parse_at_depth(item, depth - 1))
                    .collect(),
            ),
            _ => Self::parse_dynamic(value),
        }
    }

    fn parse_dynamic(value: &Value) -> Self {
        let Value::Array(items) = value else {
            return CoordinateTree::Opaque(value.clone());
        };

        if starts_with_number(items) {
            return match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
                (Some(x), Some(y)) => CoordinateTree::Position(Coord { x, y }),
                _ => CoordinateTree::Opaque(value.clone()),
            };
        }

        CoordinateTree::Nested(items.iter().map(Self::parse_dynamic).collect())
    }

    /// Round every position to `precision` decimals. Nesting is unchanged.
    pub fn reduce(self, precision: u32) -> Self {
        match self {
            CoordinateTree::Position(coord) => CoordinateTree::Position(Coord {
                x: round_coordinate(coord.x, precision),
                y: round_coordinate(coord.y, precision),
            }),
            CoordinateTree::Nested(children) => CoordinateTree::Nested(
                children
                    .into_iter()
                    .map(|child| child.reduce(precision))
                    .collect(),
            ),
            opaque @ CoordinateTree::Opaque(_) => opaque,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            CoordinateTree::Position(coord) => Value::Array(vec![number(coord.x), number(coord.y)]),
            CoordinateTree::Nested(children) => {
                Value::Array(children.into_iter().map(CoordinateTree::into_value).collect())
            }
            CoordinateTree::Opaque(value) => value,
        }
    }

    /// Number of positions in the tree.
    pub fn position_count(&self) -> usize {
        match self {
            CoordinateTree::Position(_) => 1,
            CoordinateTree::Nested(children) => children.iter().map(Self::position_count).sum(),
            CoordinateTree::Opaque(_) => 0,
        }
    }
}

/// Round `value` to `precision` decimal places, ties away from zero.
pub fn round_coordinate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(i32::MAX as u32) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }

    let rounded = scaled.round() / factor;
    // -0.0 would serialize as "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Decode, round and re-encode a `coordinates` member in one step.
pub fn reduce_coordinates(coordinates: &Value, kind: GeometryKind, precision: u32) -> Value {
    CoordinateTree::from_value(coordinates, kind)
        .reduce(precision)
        .into_value()
}

fn starts_with_number(items: &[Value]) -> bool {
    matches!(items.first(), Some(Value::Number(_)))
}

// Whole values are written as integers ("125", not "125.0") so precision 0
// and integer input never grow the output.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < SAFE_INTEGER_LIMIT {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn depth(value: &Value) -> usize {
        match value {
            Value::Array(items) => match items.first() {
                Some(Value::Number(_)) | None => 0,
                Some(first) => 1 + depth(first),
            },
            _ => 0,
        }
    }

    #[test]
    fn test_point_drops_elevation_and_rounds() {
        let reduced = reduce_coordinates(
            &json!([124.245678901, 8.228012345, 12.5]),
            GeometryKind::Point,
            4,
        );
        assert_eq!(reduced, json!([124.2457, 8.228]));
    }

    #[test]
    fn test_ring_already_within_precision_is_unchanged() {
        let ring = json!([[[124.1, 8.1], [124.2, 8.1], [124.2, 8.2], [124.1, 8.1]]]);
        let reduced = reduce_coordinates(&ring, GeometryKind::Polygon, 2);
        assert_eq!(reduced, ring);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_coordinate(0.125, 2), 0.13);
        assert_eq!(round_coordinate(-0.125, 2), -0.13);
        assert_eq!(round_coordinate(2.5, 0), 3.0);
        assert_eq!(round_coordinate(-2.5, 0), -3.0);
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let rounded = round_coordinate(-0.00001, 3);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }

    #[test]
    fn test_precision_zero_gives_whole_degrees() {
        let reduced = reduce_coordinates(&json!([124.6, 8.2]), GeometryKind::Point, 0);
        assert_eq!(reduced, json!([125, 8]));
        assert_eq!(reduced.to_string(), "[125,8]");
    }

    #[test]
    fn test_huge_precision_leaves_values_alone() {
        assert_eq!(round_coordinate(124.245678901, 400), 124.245678901);
        assert_eq!(round_coordinate(8.228012345, 30), 8.228012345);
    }

    #[test]
    fn test_short_position_passes_through() {
        let value = json!([[5], [1, 2]]);
        let reduced = reduce_coordinates(&value, GeometryKind::Unknown, 4);
        assert_eq!(reduced, json!([[5], [1, 2]]));
    }

    #[test]
    fn test_non_array_passes_through() {
        let value = json!({"not": "coordinates"});
        assert_eq!(reduce_coordinates(&value, GeometryKind::Polygon, 4), value);
        assert_eq!(reduce_coordinates(&json!("text"), GeometryKind::Unknown, 4), json!("text"));
    }

    #[test]
    fn test_unknown_kind_classifies_by_first_element() {
        let value = json!([[[1.23456, 2.34567, 9.0], [3.45678, 4.56789]]]);
        let reduced = reduce_coordinates(&value, GeometryKind::Unknown, 2);
        assert_eq!(reduced, json!([[[1.23, 2.35], [3.46, 4.57]]]));
    }

    #[test]
    fn test_depth_mismatch_falls_back_to_inspection() {
        // Declared as a Polygon but shaped like a LineString.
        let value = json!([[1.23456, 2.34567], [3.45678, 4.56789]]);
        let reduced = reduce_coordinates(&value, GeometryKind::Polygon, 1);
        assert_eq!(reduced, json!([[1.2, 2.3], [3.5, 4.6]]));
    }

    #[test]
    fn test_multipolygon_shape_is_preserved() {
        let value = json!([
            [
                [[0.11111, 0.22222, 1.0], [1.11111, 0.22222], [1.11111, 1.22222], [0.11111, 0.22222]],
                [[0.5, 0.5], [0.6, 0.5], [0.6, 0.6], [0.5, 0.5]]
            ],
            [[[10.0, 10.0], [11.0, 10.0], [11.0, 11.0], [10.0, 10.0]]]
        ]);
        let tree = CoordinateTree::from_value(&value, GeometryKind::MultiPolygon);
        assert_eq!(tree.position_count(), 12);

        let reduced = tree.reduce(3).into_value();
        assert_eq!(depth(&reduced), depth(&value));

        let polygons = reduced.as_array().unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].as_array().unwrap().len(), 2);
        assert_eq!(polygons[1].as_array().unwrap().len(), 1);
        for ring in polygons[0].as_array().unwrap() {
            assert_eq!(ring.as_array().unwrap().len(), 4);
            for position in ring.as_array().unwrap() {
                assert_eq!(position.as_array().unwrap().len(), 2);
            }
        }
        assert_eq!(polygons[0][0][0], json!([0.111, 0.222]));
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let value = json!([[124.245678901, 8.228012345, 3.0], [-0.000049, 179.99995], [1e-9, -45.123456]]);
        for precision in 0..8 {
            let once = reduce_coordinates(&value, GeometryKind::LineString, precision);
            let twice = reduce_coordinates(&once, GeometryKind::LineString, precision);
            assert_eq!(once, twice, "precision {}", precision);
        }
    }

    #[test]
    fn test_output_respects_decimal_bound() {
        let value = json!([
            [124.245678901, 8.228012345],
            [121.987654321, 17.123456789],
            [124, 8, 3],
            [-0.5, 125.0],
            [-179.9999999, -89.00000001]
        ]);
        for precision in 0..=6u32 {
            let reduced = reduce_coordinates(&value, GeometryKind::LineString, precision);
            for position in reduced.as_array().unwrap() {
                for component in position.as_array().unwrap() {
                    let text = component.to_string();
                    let decimals = text.split('.').nth(1).map(str::len).unwrap_or(0);
                    assert!(
                        decimals <= precision as usize,
                        "{} has too many decimals at precision {}",
                        text,
                        precision
                    );
                }
            }
        }
    }

    #[test]
    fn test_whole_values_are_written_as_integers() {
        let reduced = reduce_coordinates(&json!([[124, 8], [125.00001, -9.0]]), GeometryKind::LineString, 4);
        assert_eq!(reduced.to_string(), "[[124,8],[125,-9]]");
    }

    #[test]
    fn test_geometry_kind_from_type_name() {
        assert_eq!(GeometryKind::of_geometry(&json!({"type": "MultiPolygon"})), GeometryKind::MultiPolygon);
        assert_eq!(GeometryKind::from_type_name(Some("Curve")), GeometryKind::Unknown);
        assert_eq!(GeometryKind::from_type_name(None), GeometryKind::Unknown);
        assert_eq!(GeometryKind::MultiPolygon.position_depth(), Some(3));
        assert_eq!(GeometryKind::GeometryCollection.position_depth(), None);
    }
}
