//! Piecewise-linear `RT` term structure shared by the yield and credit curves.
//!
//! Each node `i` holds a time `t_i > 0` and a zero rate `r_i`; the curve stores
//! `RT_i = r_i·t_i` alongside. Between nodes `RT(t)` is linear in `t`, which
//! makes the instantaneous forward rate flat on every segment. Before the
//! first node `RT(t) = r_0·t` (flat zero rate), and beyond the last node the
//! last segment is extended linearly (a single-node curve stays at `r_0·t`).

use crate::error::{CurveError, CurveResult};

/// Node storage and interpolation for ISDA-style curves.
#[derive(Debug, Clone, PartialEq)]
pub struct IsdaCurve {
    t: Vec<f64>,
    r: Vec<f64>,
    rt: Vec<f64>,
}

impl IsdaCurve {
    /// Creates a curve from node times and zero rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are empty, of different lengths, not
    /// finite, or if the times are not strictly increasing and positive.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        if times.is_empty() {
            return Err(CurveError::insufficient_points(1, 0));
        }
        if times.len() != rates.len() {
            return Err(CurveError::LengthMismatch {
                times: times.len(),
                rates: rates.len(),
            });
        }
        if !(times[0].is_finite() && times[0] > 0.0) {
            return Err(CurveError::invalid_value(format!(
                "first node time must be positive and finite, got {}",
                times[0]
            )));
        }
        for i in 1..times.len() {
            if !(times[i] > times[i - 1]) || !times[i].is_finite() {
                return Err(CurveError::non_monotonic_tenors(i, times[i - 1], times[i]));
            }
        }
        if let Some(bad) = rates.iter().find(|r| !r.is_finite()) {
            return Err(CurveError::invalid_value(format!("non-finite rate {bad}")));
        }

        let rt = times.iter().zip(&rates).map(|(t, r)| t * r).collect();
        Ok(Self {
            t: times,
            r: rates,
            rt,
        })
    }

    /// One-node curve: `RT(t) = rate·t` everywhere.
    pub(crate) fn single_node(time: f64, rate: f64) -> Self {
        Self {
            t: vec![time],
            r: vec![rate],
            rt: vec![time * rate],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.t.len()
    }

    /// Node times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.t
    }

    /// Node zero rates.
    #[must_use]
    pub fn zero_rates(&self) -> &[f64] {
        &self.r
    }

    /// `RT_i` at node `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_nodes()`.
    #[must_use]
    pub fn rt_at_index(&self, index: usize) -> f64 {
        self.rt[index]
    }

    /// Overwrites the zero rate at node `index`, keeping `RT_index` in step.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_nodes()`.
    pub fn set_rate(&mut self, index: usize, rate: f64) {
        self.r[index] = rate;
        self.rt[index] = rate * self.t[index];
    }

    /// `RT(t)`, the integrated rate from 0 to `t`.
    #[must_use]
    pub fn rt(&self, t: f64) -> f64 {
        let n = self.t.len();
        if n == 1 || t <= self.t[0] {
            return self.r[0] * t;
        }
        let k = self.segment_index(t);
        if t == self.t[k] {
            return self.rt[k];
        }
        let (t1, t2) = (self.t[k - 1], self.t[k]);
        let dt = t2 - t1;
        (self.rt[k - 1] * (t2 - t) + self.rt[k] * (t - t1)) / dt
    }

    /// `exp(-RT(t))`.
    #[must_use]
    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.rt(t)).exp()
    }

    /// Zero rate `RT(t)/t`, or `r_0` at or before the first node.
    #[must_use]
    pub fn zero_rate(&self, t: f64) -> f64 {
        if t <= self.t[0] {
            return self.r[0];
        }
        self.rt(t) / t
    }

    /// Instantaneous forward rate at `t`.
    ///
    /// Segments are closed on the right: at a node time the rate of the
    /// segment ending there is returned.
    #[must_use]
    pub fn forward_rate(&self, t: f64) -> f64 {
        let n = self.t.len();
        if n == 1 || t <= self.t[0] {
            return self.r[0];
        }
        let k = self.segment_index(t);
        (self.rt[k] - self.rt[k - 1]) / (self.t[k] - self.t[k - 1])
    }

    /// `(RT(t), ∂RT(t)/∂r_node)`.
    ///
    /// Only the (at most two) nodes bracketing `t` have a non-zero
    /// sensitivity. Beyond the last node the extrapolated segment depends on
    /// the last two nodes.
    #[must_use]
    pub fn rt_and_sensitivity(&self, t: f64, node: usize) -> (f64, f64) {
        let n = self.t.len();
        if n == 1 || t <= self.t[0] {
            let sense = if node == 0 { t } else { 0.0 };
            return (self.r[0] * t, sense);
        }
        let k = self.segment_index(t);
        if t == self.t[k] {
            let sense = if node == k { self.t[k] } else { 0.0 };
            return (self.rt[k], sense);
        }

        let (t1, t2) = (self.t[k - 1], self.t[k]);
        let dt = t2 - t1;
        let w1 = (t2 - t) / dt;
        let w2 = (t - t1) / dt;
        let rt = w1 * self.rt[k - 1] + w2 * self.rt[k];
        let sense = if node == k - 1 {
            w1 * t1
        } else if node == k {
            w2 * t2
        } else {
            0.0
        };
        (rt, sense)
    }

    /// Index `k >= 1` of the segment `(t_{k-1}, t_k]` used for `t > t_0`,
    /// clamped to the last segment beyond the final node.
    fn segment_index(&self, t: f64) -> usize {
        let k = self.t.partition_point(|&x| x < t);
        k.clamp(1, self.t.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> IsdaCurve {
        IsdaCurve::new(vec![1.0, 3.0, 5.0], vec![0.01, 0.02, 0.025]).unwrap()
    }

    #[test]
    fn test_rt_at_nodes() {
        let curve = sample();
        assert_relative_eq!(curve.rt(1.0), 0.01, epsilon = 1e-15);
        assert_relative_eq!(curve.rt(3.0), 0.06, epsilon = 1e-15);
        assert_relative_eq!(curve.rt(5.0), 0.125, epsilon = 1e-15);
        assert_relative_eq!(curve.rt_at_index(1), 0.06, epsilon = 1e-15);
    }

    #[test]
    fn test_rt_interpolation_and_extrapolation() {
        let curve = sample();
        // Before the first node: flat zero rate
        assert_relative_eq!(curve.rt(0.5), 0.005, epsilon = 1e-15);
        // Linear between nodes
        assert_relative_eq!(curve.rt(2.0), 0.035, epsilon = 1e-15);
        // Last segment (slope 0.0325) extended
        assert_relative_eq!(curve.rt(7.0), 0.125 + 2.0 * 0.0325, epsilon = 1e-15);
    }

    #[test]
    fn test_single_node_curve() {
        let curve = IsdaCurve::new(vec![1.0], vec![0.03]).unwrap();
        assert_relative_eq!(curve.rt(10.0), 0.3, epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rate(10.0), 0.03, epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(4.0), 0.03, epsilon = 1e-15);
        let (rt, sense) = curve.rt_and_sensitivity(10.0, 0);
        assert_relative_eq!(rt, 0.3, epsilon = 1e-15);
        assert_relative_eq!(sense, 10.0, epsilon = 1e-15);
        assert_eq!(curve.rt_and_sensitivity(10.0, 1).1, 0.0);
    }

    #[test]
    fn test_forward_rate_is_flat_per_segment() {
        let curve = sample();
        assert_relative_eq!(curve.forward_rate(0.5), 0.01, epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(2.0), 0.025, epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(3.0), 0.025, epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(4.0), 0.0325, epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(9.0), 0.0325, epsilon = 1e-15);
    }

    #[test]
    fn test_sensitivity_matches_bump() {
        let curve = sample();
        let bump = 1e-7;
        for &t in &[0.3, 1.0, 2.2, 3.0, 4.5, 6.0] {
            for node in 0..3 {
                let (rt, sense) = curve.rt_and_sensitivity(t, node);
                assert_relative_eq!(rt, curve.rt(t), epsilon = 1e-15);

                let mut up = curve.clone();
                up.set_rate(node, curve.zero_rates()[node] + bump);
                let mut down = curve.clone();
                down.set_rate(node, curve.zero_rates()[node] - bump);
                let fd = (up.rt(t) - down.rt(t)) / (2.0 * bump);
                assert_relative_eq!(sense, fd, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_set_rate_updates_rt() {
        let mut curve = sample();
        curve.set_rate(2, 0.04);
        assert_relative_eq!(curve.rt_at_index(2), 0.2, epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rates()[2], 0.04, epsilon = 1e-15);
        assert_relative_eq!(curve.rt(4.0), 0.13, epsilon = 1e-15);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            IsdaCurve::new(vec![], vec![]),
            Err(CurveError::InsufficientPoints { .. })
        ));
        assert!(matches!(
            IsdaCurve::new(vec![1.0, 2.0], vec![0.01]),
            Err(CurveError::LengthMismatch { .. })
        ));
        assert!(matches!(
            IsdaCurve::new(vec![1.0, 1.0], vec![0.01, 0.02]),
            Err(CurveError::NonMonotonicTenors { index: 1, .. })
        ));
        assert!(IsdaCurve::new(vec![0.0, 1.0], vec![0.01, 0.02]).is_err());
        assert!(IsdaCurve::new(vec![1.0], vec![f64::NAN]).is_err());
    }
}
