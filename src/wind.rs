use crate::constants::{INCHES_PER_FOOT, MPH_TO_FPS};

/// Constant wind resolved against the line of fire
///
/// `angle_deg` is the direction the wind blows *from*, measured clockwise
/// from the line of fire: 0° is a headwind, 90° comes from the right, 180°
/// is a tailwind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub speed_mph: f64,
    pub angle_deg: f64,
}

impl Wind {
    pub fn new(speed_mph: f64, angle_deg: f64) -> Self {
        Self { speed_mph, angle_deg }
    }

    pub fn calm() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Component blowing against the projectile (ft/s); negative for a tailwind
    pub fn headwind_fps(&self) -> f64 {
        self.speed_mph * MPH_TO_FPS * self.angle_deg.to_radians().cos()
    }

    /// Component across the line of fire (ft/s); positive when blowing right to left
    pub fn crosswind_fps(&self) -> f64 {
        self.speed_mph * MPH_TO_FPS * self.angle_deg.to_radians().sin()
    }

    /// Lateral drift (inches) at `distance_ft`, reached after `time_s`
    ///
    /// Lag-time rule: drift equals the crosswind times the difference
    /// between the actual time of flight and the time of flight in vacuum.
    pub fn drift_inches(&self, muzzle_velocity_fps: f64, distance_ft: f64, time_s: f64) -> f64 {
        let lag = time_s - distance_ft / muzzle_velocity_fps;
        self.crosswind_fps() * lag * INCHES_PER_FOOT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_calm_wind_has_no_components() {
        let calm = Wind::calm();
        assert_eq!(calm.headwind_fps(), 0.0);
        assert_eq!(calm.crosswind_fps(), 0.0);
        assert_eq!(calm.drift_inches(2800.0, 300.0, 0.2), 0.0);
    }

    #[test]
    fn test_full_value_crosswind() {
        let wind = Wind::new(10.0, 90.0);
        assert_relative_eq!(wind.crosswind_fps(), 14.6667, epsilon = 1e-3);
        assert!(wind.headwind_fps().abs() < 1e-9);
    }

    #[test]
    fn test_head_and_tail_wind() {
        assert_relative_eq!(Wind::new(10.0, 0.0).headwind_fps(), 14.6667, epsilon = 1e-3);
        assert_relative_eq!(Wind::new(10.0, 180.0).headwind_fps(), -14.6667, epsilon = 1e-3);
    }

    #[test]
    fn test_wind_from_left_drifts_opposite() {
        let right = Wind::new(10.0, 90.0).drift_inches(2800.0, 1500.0, 0.6);
        let left = Wind::new(10.0, 270.0).drift_inches(2800.0, 1500.0, 0.6);
        assert!(right > 0.0);
        assert_relative_eq!(left, -right, epsilon = 1e-9);
    }

    #[test]
    fn test_drift_is_zero_without_lag() {
        // In vacuum the projectile keeps muzzle velocity, so there is no lag
        let wind = Wind::new(20.0, 90.0);
        assert!(wind.drift_inches(3000.0, 1500.0, 0.5).abs() < 1e-9);
    }
}
