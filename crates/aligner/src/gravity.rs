//! Exponential low-pass gravity isolation.
//!
//! Splits raw accelerometer samples into a slowly-adapting gravity estimate
//! and the linear (motion-only) remainder.

use contracts::Vector3;

/// Smoothing constant weighting history over the instant sample.
///
/// Design constant, not user-configurable: together with the sampling rate it
/// fixes the cutoff frequency of the gravity separation.
pub const GRAVITY_ALPHA: f32 = 0.95;

/// Exponential low-pass gravity filter
///
/// Update rule per axis: `g ← α·g + (1-α)·raw`, output `linear = raw - g`.
/// Under constant input V the estimate converges as `g_n = (1-α^n)·V`, so the
/// residual after n samples is `α^n·V`.
///
/// The estimate persists for the life of the instance and is never reset;
/// each accelerometer channel owns exactly one instance.
#[derive(Debug, Clone, Default)]
pub struct GravityFilter {
    gravity: Vector3,
}

impl GravityFilter {
    /// Create a filter with a zero-initialized gravity estimate
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw sample into the estimate and return the linear remainder
    ///
    /// Must be called at most once per sensor event. NaN input propagates
    /// unsanitized.
    pub fn apply(&mut self, raw: Vector3) -> Vector3 {
        self.gravity.x = GRAVITY_ALPHA * self.gravity.x + (1.0 - GRAVITY_ALPHA) * raw.x;
        self.gravity.y = GRAVITY_ALPHA * self.gravity.y + (1.0 - GRAVITY_ALPHA) * raw.y;
        self.gravity.z = GRAVITY_ALPHA * self.gravity.z + (1.0 - GRAVITY_ALPHA) * raw.z;

        Vector3::new(
            raw.x - self.gravity.x,
            raw.y - self.gravity.y,
            raw.z - self.gravity.z,
        )
    }

    /// Current gravity estimate
    pub fn gravity(&self) -> Vector3 {
        self.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTING: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 9.81,
    };

    #[test]
    fn first_application_scales_by_alpha() {
        let mut filter = GravityFilter::new();
        let linear = filter.apply(Vector3::new(1.0, 2.0, 3.0));

        // gravity starts at zero, so output = raw - (1-α)·raw = α·raw
        assert!((linear.x - 0.95).abs() < 1e-6);
        assert!((linear.y - 1.9).abs() < 1e-6);
        assert!((linear.z - 2.85).abs() < 1e-6);
    }

    #[test]
    fn residual_follows_closed_form() {
        let mut filter = GravityFilter::new();
        let mut linear = Vector3::ZERO;
        for _ in 0..10 {
            linear = filter.apply(RESTING);
        }

        let expected = GRAVITY_ALPHA.powi(10) * RESTING.magnitude();
        let relative = (linear.magnitude() - expected).abs() / expected;
        assert!(
            relative < 1e-3,
            "residual {} deviates from closed form {}",
            linear.magnitude(),
            expected,
        );
    }

    #[test]
    fn residual_decays_monotonically_toward_zero() {
        let mut filter = GravityFilter::new();
        let mut previous = f32::MAX;
        for _ in 0..100 {
            let magnitude = filter.apply(RESTING).magnitude();
            assert!(
                magnitude <= previous,
                "residual grew from {previous} to {magnitude}",
            );
            previous = magnitude;
        }

        let mut residual = previous;
        for _ in 100..300 {
            residual = filter.apply(RESTING).magnitude();
        }
        // α^300 ≈ 2e-7, comfortably under a 1e-6 relative bound
        assert!(residual < 1e-6 * RESTING.magnitude());
        let gravity = filter.gravity();
        assert!((gravity.z - RESTING.z).abs() < 1e-4);
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut calibrated = GravityFilter::new();
        let mut uncalibrated = GravityFilter::new();

        calibrated.apply(RESTING);
        assert!(calibrated.gravity().z > 0.0);
        assert_eq!(uncalibrated.gravity(), Vector3::ZERO);

        let first = uncalibrated.apply(Vector3::new(1.0, 0.0, 0.0));
        assert!((first.x - 0.95).abs() < 1e-6);
    }

    #[test]
    fn zero_input_keeps_estimate_at_zero() {
        let mut filter = GravityFilter::new();
        let linear = filter.apply(Vector3::ZERO);
        assert_eq!(linear, Vector3::ZERO);
        assert_eq!(filter.gravity(), Vector3::ZERO);
    }
}
