//! Smoothed display curves for routes that do not follow a graph.

use crate::geometry::GeoPoint;

/// Largest control-point offset, as a fraction of the chord length. Keeps
/// the curve within a few percent of the straight-line length.
pub const MAX_BEND: f64 = 0.2;

/// Quadratic Bezier from `a` to `b` whose control point sits `bend` chord
/// lengths off the chord midpoint (positive bends to the left of `a -> b`).
/// Returns `samples + 1` points, starting at `a` and ending at `b`.
pub fn bezier_between(a: &GeoPoint, b: &GeoPoint, bend: f64, samples: usize) -> Vec<GeoPoint> {
    let samples = samples.max(1);
    let bend = bend.clamp(-MAX_BEND, MAX_BEND);

    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let mid = a.lerp(b, 0.5);
    // Left normal of the chord, scaled by the chord length already.
    let control = GeoPoint::new(mid.lat + bend * dx, mid.lon - bend * dy);

    (0..=samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            let (u, v, w) = ((1.0 - t) * (1.0 - t), 2.0 * (1.0 - t) * t, t * t);
            GeoPoint::new(
                u * a.lat + v * control.lat + w * b.lat,
                u * a.lon + v * control.lon + w * b.lon,
            )
        })
        .collect()
}

/// Deterministic bend for a route: the direction comes from the destination
/// name, the magnitude grows with distance (short hops stay nearly straight).
pub fn bend_for(destination: Option<&str>, distance_m: f64) -> f64 {
    let hash = destination
        .map(|name| {
            name.to_lowercase()
                .bytes()
                .fold(0xcbf2_9ce4_8422_2325u64, |h, byte| {
                    (h ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
                })
        })
        .unwrap_or(0);

    let sign = if hash % 2 == 0 { 1.0 } else { -1.0 };
    let jitter = (hash % 5) as f64 * 0.01;
    let magnitude = 0.06 + 0.06 * (distance_m / 400.0).clamp(0.0, 1.0) + jitter;
    sign * magnitude.min(MAX_BEND)
}

/// Joins curves through successive waypoints, sharing the joint points.
pub fn curve_through(waypoints: &[GeoPoint], bend: f64, samples: usize) -> Vec<GeoPoint> {
    let mut out: Vec<GeoPoint> = Vec::new();
    for pair in waypoints.windows(2) {
        let segment = bezier_between(&pair[0], &pair[1], bend, samples);
        let skip = usize::from(!out.is_empty());
        out.extend(segment.into_iter().skip(skip));
    }
    out
}
