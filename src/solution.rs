//! Sampled trajectory and distance queries.

use log::debug;
use serde::Serialize;

use crate::constants::{FEET_PER_YARD, INCHES_PER_FOOT, MIN_DIVISION_THRESHOLD, MOA_PER_RADIAN};
use crate::error::BallisticsError;
use crate::inputs::BallisticInputs;
use crate::trajectory_solver::Termination;

const INCHES_PER_YARD: f64 = FEET_PER_YARD * INCHES_PER_FOOT;

/// One recorded point of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub distance_yards: f64,
    /// Height relative to the sight line (inches); negative below it
    pub drop_inches: f64,
    /// Lateral drift (inches); positive to the left for wind from the right
    pub windage_inches: f64,
    pub velocity_fps: f64,
    pub time_s: f64,
}

impl TrajectorySample {
    /// Elevation correction in MOA, positive means dial up
    pub fn correction_moa(&self) -> f64 {
        angular_moa(self.drop_inches, self.distance_yards)
    }

    /// Windage correction in MOA, positive means dial left
    pub fn windage_moa(&self) -> f64 {
        angular_moa(self.windage_inches, self.distance_yards)
    }

    fn lerp(&self, next: &TrajectorySample, t: f64) -> TrajectorySample {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        TrajectorySample {
            distance_yards: mix(self.distance_yards, next.distance_yards),
            drop_inches: mix(self.drop_inches, next.drop_inches),
            windage_inches: mix(self.windage_inches, next.windage_inches),
            velocity_fps: mix(self.velocity_fps, next.velocity_fps),
            time_s: mix(self.time_s, next.time_s),
        }
    }
}

/// Angle (MOA) that cancels an offset of `offset_inches` at `distance_yards`
fn angular_moa(offset_inches: f64, distance_yards: f64) -> f64 {
    if distance_yards <= MIN_DIVISION_THRESHOLD {
        return 0.0;
    }
    -(offset_inches / (distance_yards * INCHES_PER_YARD)).atan() * MOA_PER_RADIAN
}

/// Result of a distance query
///
/// Queries outside the sampled range are answered with the value at the
/// nearest end of the table, never extrapolated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query<T> {
    Interpolated(T),
    ClampedRange {
        value: T,
        requested_yards: f64,
        sampled_yards: f64,
    },
}

impl<T> Query<T> {
    pub fn value(&self) -> &T {
        match self {
            Query::Interpolated(value) | Query::ClampedRange { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Query::Interpolated(value) | Query::ClampedRange { value, .. } => value,
        }
    }

    pub fn is_clamped(&self) -> bool {
        matches!(self, Query::ClampedRange { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Query<U> {
        match self {
            Query::Interpolated(value) => Query::Interpolated(f(value)),
            Query::ClampedRange { value, requested_yards, sampled_yards } => Query::ClampedRange {
                value: f(value),
                requested_yards,
                sampled_yards,
            },
        }
    }
}

/// Trajectory table for one zero angle and set of inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    inputs: BallisticInputs,
    zero_angle_deg: f64,
    samples: Vec<TrajectorySample>,
    termination: Termination,
}

impl Solution {
    /// `samples` must be non-empty and strictly increasing in distance from 0
    pub(crate) fn new(
        inputs: BallisticInputs,
        zero_angle_deg: f64,
        samples: Vec<TrajectorySample>,
        termination: Termination,
    ) -> Self {
        debug_assert!(!samples.is_empty());
        debug_assert!(samples.windows(2).all(|w| w[1].distance_yards > w[0].distance_yards));
        Self { inputs, zero_angle_deg, samples, termination }
    }

    pub fn inputs(&self) -> &BallisticInputs {
        &self.inputs
    }

    pub fn zero_angle_deg(&self) -> f64 {
        self.zero_angle_deg
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Distance of the last recorded sample (yards)
    pub fn max_distance_yards(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.distance_yards)
    }

    /// True when the distance or time budget ran out before the projectile stopped.
    /// Every recorded sample is still valid.
    pub fn range_exhausted(&self) -> bool {
        self.termination == Termination::MaxRangeExceeded
    }

    /// Sample at `distance_yards`, linearly interpolated between the bracketing samples.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the distance is NaN or infinite.
    pub fn sample_at(&self, distance_yards: f64) -> Result<Query<TrajectorySample>, BallisticsError> {
        if !distance_yards.is_finite() {
            return Err(BallisticsError::invalid("target_distance_yards", distance_yards));
        }
        let (first, last) = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(BallisticsError::invalid("target_distance_yards", distance_yards)),
        };

        if distance_yards < first.distance_yards || distance_yards > last.distance_yards {
            let nearest = if distance_yards < first.distance_yards { first } else { last };
            debug!(
                "query at {:.1} yd outside sampled range 0-{:.1} yd, clamped",
                distance_yards, last.distance_yards
            );
            return Ok(Query::ClampedRange {
                value: *nearest,
                requested_yards: distance_yards,
                sampled_yards: nearest.distance_yards,
            });
        }

        let upper = self
            .samples
            .partition_point(|s| s.distance_yards < distance_yards)
            .min(self.samples.len() - 1);
        if upper == 0 {
            return Ok(Query::Interpolated(*first));
        }

        let lo = &self.samples[upper - 1];
        let hi = &self.samples[upper];
        let span = hi.distance_yards - lo.distance_yards;
        let t = if span > MIN_DIVISION_THRESHOLD { (distance_yards - lo.distance_yards) / span } else { 1.0 };
        let mut sample = lo.lerp(hi, t);
        sample.distance_yards = distance_yards;
        Ok(Query::Interpolated(sample))
    }

    /// Elevation correction (MOA) to dial at `distance_yards`; positive means up.
    ///
    /// Computed from the interpolated drop, so 0 at the muzzle.
    pub fn moa_at(&self, distance_yards: f64) -> Result<Query<f64>, BallisticsError> {
        Ok(self.sample_at(distance_yards)?.map(|s| s.correction_moa()))
    }

    pub fn drop_at(&self, distance_yards: f64) -> Result<Query<f64>, BallisticsError> {
        Ok(self.sample_at(distance_yards)?.map(|s| s.drop_inches))
    }

    pub fn windage_at(&self, distance_yards: f64) -> Result<Query<f64>, BallisticsError> {
        Ok(self.sample_at(distance_yards)?.map(|s| s.windage_inches))
    }

    pub fn windage_moa_at(&self, distance_yards: f64) -> Result<Query<f64>, BallisticsError> {
        Ok(self.sample_at(distance_yards)?.map(|s| s.windage_moa()))
    }

    pub fn velocity_at(&self, distance_yards: f64) -> Result<Query<f64>, BallisticsError> {
        Ok(self.sample_at(distance_yards)?.map(|s| s.velocity_fps))
    }

    pub fn time_at(&self, distance_yards: f64) -> Result<Query<f64>, BallisticsError> {
        Ok(self.sample_at(distance_yards)?.map(|s| s.time_s))
    }
}
