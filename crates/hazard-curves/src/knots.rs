//! Integration knots for the default-contingent leg integrals.
//!
//! Between consecutive knots both the forward interest rate and the forward
//! hazard rate are constant, so each leg integral is a sum of closed-form
//! pieces.

/// Points closer than this are treated as the same knot.
pub const KNOT_TOLERANCE: f64 = 1e-12;

/// Sorted union of the points of `a` and `b` strictly inside `(start, end)`,
/// bracketed by `start` and `end`.
///
/// # Example
///
/// ```rust
/// use hazard_curves::knots::integration_points;
///
/// let knots = integration_points(0.0, 5.0, &[1.0, 3.0, 10.0], &[3.0, 5.0]);
/// assert_eq!(knots, vec![0.0, 1.0, 3.0, 5.0]);
/// ```
#[must_use]
pub fn integration_points(start: f64, end: f64, a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut interior: Vec<f64> = a
        .iter()
        .chain(b)
        .copied()
        .filter(|&t| t > start + KNOT_TOLERANCE && t < end - KNOT_TOLERANCE)
        .collect();
    interior.sort_by(f64::total_cmp);

    let mut points = Vec::with_capacity(interior.len() + 2);
    points.push(start);
    for t in interior {
        if t - points[points.len() - 1] > KNOT_TOLERANCE {
            points.push(t);
        }
    }
    points.push(end);
    points
}

/// Points of the sorted `set` strictly inside `(lower, upper)`, bracketed by
/// `lower` and `upper`.
#[must_use]
pub fn truncate_set_inclusive(lower: f64, upper: f64, set: &[f64]) -> Vec<f64> {
    let mut points = Vec::with_capacity(set.len() + 2);
    points.push(lower);
    points.extend(
        set.iter()
            .copied()
            .filter(|&t| t > lower + KNOT_TOLERANCE && t < upper - KNOT_TOLERANCE),
    );
    points.push(upper);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_points_merges_and_dedups() {
        let yc = [0.25, 1.0, 2.0, 2.0 + 1e-14, 7.0];
        let cds = [1.0, 3.0, 5.0];
        let knots = integration_points(0.1, 5.0, &yc, &cds);
        assert_eq!(knots, vec![0.1, 0.25, 1.0, 2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_integration_points_without_interior() {
        assert_eq!(integration_points(0.0, 1.0, &[], &[2.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_truncate_set_inclusive() {
        let set = [0.0, 0.5, 1.0, 1.5, 2.0, 3.0];
        assert_eq!(truncate_set_inclusive(0.75, 2.0, &set), vec![0.75, 1.0, 1.5, 2.0]);
        assert_eq!(truncate_set_inclusive(0.5, 1.0, &set), vec![0.5, 1.0]);
        assert_eq!(truncate_set_inclusive(3.5, 4.0, &set), vec![3.5, 4.0]);
    }
}
