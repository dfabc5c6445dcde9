//! Line smoothing for the `tension` style option.
//!
//! Control points follow the common "spline curve" construction used by browser
//! chart libraries: each interior point gets a pair of control points along the
//! direction `next - previous`, scaled by `tension` and by the relative lengths of
//! the neighbouring segments. Each segment is then a cubic Bézier curve.
//!
//! Points should be given in display space (pixels), where distances are
//! meaningful; the caller maps back to data space if needed.

type Point = (f64, f64);

/// `(incoming, outgoing)` control points for every input point.
pub fn control_points(points: &[Point], tension: f64) -> Vec<(Point, Point)> {
    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let current = points[i];
        let previous = if i > 0 { points[i - 1] } else { current };
        let next = if i + 1 < n { points[i + 1] } else { current };

        let d01 = distance(previous, current);
        let d12 = distance(current, next);
        let total = d01 + d12;
        let (s01, s12) = if total > 0.0 { (d01 / total, d12 / total) } else { (0.0, 0.0) };

        let fa = tension * s01;
        let fb = tension * s12;
        let dx = next.0 - previous.0;
        let dy = next.1 - previous.1;

        out.push((
            (current.0 - fa * dx, current.1 - fa * dy),
            (current.0 + fb * dx, current.1 + fb * dy),
        ));
    }
    out
}

/// Sample the smoothed polyline with `steps` sub-segments per segment.
///
/// Always passes through every input point. `tension == 0` returns the input.
pub fn smooth_path(points: &[Point], tension: f64, steps: usize) -> Vec<Point> {
    if tension <= 0.0 || points.len() < 3 || steps < 2 {
        return points.to_vec();
    }

    let cps = control_points(points, tension);
    let mut out = Vec::with_capacity((points.len() - 1) * steps + 1);
    out.push(points[0]);
    for i in 0..points.len() - 1 {
        let p0 = points[i];
        let p1 = cps[i].1;
        let p2 = cps[i + 1].0;
        let p3 = points[i + 1];
        for s in 1..=steps {
            let t = s as f64 / steps as f64;
            out.push(cubic(p0, p1, p2, p3, t));
        }
    }
    out
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    (
        a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
        a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
    )
}

fn distance(a: Point, b: Point) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tension_keeps_points() {
        let pts = [(0.0, 0.0), (1.0, 5.0), (2.0, 1.0)];
        assert_eq!(smooth_path(&pts, 0.0, 8), pts.to_vec());
        for (p, (a, b)) in pts.iter().zip(control_points(&pts, 0.0)) {
            assert_eq!(*p, a);
            assert_eq!(*p, b);
        }
    }

    #[test]
    fn smoothed_path_passes_through_inputs() {
        let pts = [(0.0, 0.0), (10.0, 30.0), (20.0, 5.0), (30.0, 12.0)];
        let path = smooth_path(&pts, 0.4, 6);
        assert_eq!(path.len(), 3 * 6 + 1);
        for (i, p) in pts.iter().enumerate() {
            let q = path[i * 6];
            assert!((q.0 - p.0).abs() < 1e-9 && (q.1 - p.1).abs() < 1e-9);
        }
    }

    #[test]
    fn collinear_points_stay_on_the_line() {
        let pts = [(0.0, 0.0), (1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        for (x, y) in smooth_path(&pts, 0.3, 5) {
            assert!((y - 2.0 * x).abs() < 1e-9);
        }
    }

    #[test]
    fn endpoint_control_points_collapse_outward() {
        let pts = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
        let cps = control_points(&pts, 0.5);
        assert_eq!(cps[0].0, pts[0]);
        assert_eq!(cps[2].1, pts[2]);
        // Interior: direction next - previous = (2, 0), equal segment lengths.
        assert_eq!(cps[1].0, (0.5, 1.0));
        assert_eq!(cps[1].1, (1.5, 1.0));
    }
}
