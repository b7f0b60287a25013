use geo::{HaversineDestination, Point};

/// Geodesic radius of a stop contour, in the same angular degrees as the
/// stop coordinates themselves.
pub const CONTOUR_RADIUS_DEG: f64 = 0.015;

/// Contour vertices per quadrant; 3 gives the low-resolution 12-gon the
/// renderer extrudes.
pub const CONTOUR_STEPS: usize = 3;

// Mean Earth radius used by the haversine formulas, in meters.
const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Closed contour ring approximating a disc around one stop coordinate:
/// `CONTOUR_STEPS * 4` vertices at equal bearings, with the first vertex
/// repeated to close the ring. Pure function of the input coordinate.
pub fn stop_contour(longitude: f64, latitude: f64) -> Vec<[f64; 2]> {
    let center = Point::new(longitude, latitude);
    let radius_m = CONTOUR_RADIUS_DEG.to_radians() * MEAN_EARTH_RADIUS_M;
    let vertex_count = CONTOUR_STEPS * 4;

    let mut ring: Vec<[f64; 2]> = (0..vertex_count)
        .map(|step| {
            let bearing = step as f64 * 360.0 / vertex_count as f64;
            let vertex = center.haversine_destination(bearing, radius_m);
            [vertex.x(), vertex.y()]
        })
        .collect();
    ring.push(ring[0]);
    ring
}
