//! Easing curves and path interpolation.

use glam::DVec3;

/// Cubic ease-in-out over `t ∈ [0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Point at eased parameter `t` on the quadratic curve from `from` to `to`.
///
/// The control point is offset sideways by `arc_ratio` of the path length,
/// so flights bow instead of sliding along the ground. The offset prefers
/// the horizontal perpendicular and falls back to +x for vertical paths.
pub fn arc_point(from: DVec3, to: DVec3, t: f64, arc_ratio: f64) -> DVec3 {
    let delta = to - from;
    let length = delta.length();
    if length <= f64::EPSILON {
        return from;
    }
    let mut side = delta.cross(DVec3::Y);
    if side.length_squared() <= f64::EPSILON {
        side = DVec3::X;
    }
    let control = from + delta * 0.5 + side.normalize() * (length * arc_ratio);
    let u = 1.0 - t;
    from * (u * u) + control * (2.0 * u * t) + to * (t * t)
}

/// Marker scale at raw parameter `t` for a pop-in (`grow`) or pop-out.
///
/// The base ramp is the eased 0→1 (or 1→0) scale; a sine swell on top makes
/// the marker briefly overshoot its rest size mid-flight.
pub fn pop_scale(t: f64, grow: bool, bulge: f32) -> f32 {
    let eased = ease_in_out_cubic(t);
    let base = if grow { eased } else { 1.0 - eased };
    let swell = 1.0 + bulge as f64 * (std::f64::consts::PI * t).sin();
    (base * swell) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_hits_its_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ease_is_monotonic_and_symmetric() {
        let mut last = 0.0;
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let v = ease_in_out_cubic(t);
            assert!(v >= last);
            assert!((v + ease_in_out_cubic(1.0 - t) - 1.0).abs() < 1e-12);
            last = v;
        }
    }

    #[test]
    fn arc_starts_and_ends_on_the_path() {
        let from = DVec3::new(0.0, 10.0, 0.0);
        let to = DVec3::new(100.0, 10.0, -50.0);
        assert!(arc_point(from, to, 0.0, 0.18).distance(from) < 1e-9);
        assert!(arc_point(from, to, 1.0, 0.18).distance(to) < 1e-9);
    }

    #[test]
    fn arc_bows_away_from_the_straight_line() {
        let from = DVec3::ZERO;
        let to = DVec3::new(100.0, 0.0, 0.0);
        let mid = arc_point(from, to, 0.5, 0.2);
        // Half the control offset shows up at the midpoint.
        assert!((mid.x - 50.0).abs() < 1e-9);
        assert!((mid.distance(DVec3::new(50.0, 0.0, 0.0)) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_and_vertical_paths_stay_finite() {
        let p = DVec3::new(3.0, 4.0, 5.0);
        assert_eq!(arc_point(p, p, 0.5, 0.18), p);
        let top = DVec3::new(3.0, 104.0, 5.0);
        let mid = arc_point(p, top, 0.5, 0.18);
        assert!(mid.is_finite());
        assert!(mid.x > p.x);
    }

    #[test]
    fn pop_scale_ramps_with_an_overshoot() {
        assert!(pop_scale(0.0, true, 0.25).abs() < 1e-6);
        assert!((pop_scale(1.0, true, 0.25) - 1.0).abs() < 1e-6);
        assert!(pop_scale(0.8, true, 0.25) > 1.0);

        assert!((pop_scale(0.0, false, 0.25) - 1.0).abs() < 1e-6);
        assert!(pop_scale(1.0, false, 0.25).abs() < 1e-6);
        assert!(pop_scale(0.2, false, 0.25) > 1.0);
    }
}
