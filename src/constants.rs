//! Physical constants and unit conversions used in ballistics calculations.
//!
//! The solver works in feet, seconds and inches internally, which is the
//! unit system drag tables and ballistic coefficients are published in.

/// Gravitational acceleration in ft/s²
pub const G_ACCEL_FPS2: f64 = 32.174;

/// Speed of sound in the standard atmosphere (59 °F, 29.92 inHg, dry air)
///
/// Value: 1116.45 ft/s (340.29 m/s)
///
/// Temperature dependence: c = 49.0223 * sqrt(T_rankine)
pub const SPEED_OF_SOUND_FPS: f64 = 1116.45;

/// Drag coefficient to retardation conversion constant
///
/// Converts a standard-projectile drag coefficient into deceleration for a
/// projectile with ballistic coefficient `bc` (lb/in²):
///
/// retardation (ft/s²) = CD_TO_RETARD * Cd * v² / bc
///
/// Derivation: ρ₀ * π / (8 * 144) with ρ₀ = 0.0764742 lb/ft³, the standard
/// sea-level air density. The π/8 comes from ½ * π/4 of the frontal area,
/// the 144 from in² to ft².
pub const CD_TO_RETARD: f64 = 2.08551e-4;

/// Standard sea-level air density (kg/m³)
pub const STANDARD_AIR_DENSITY: f64 = 1.2250;

/// Standard sea-level barometric pressure (inHg)
pub const STANDARD_PRESSURE_INHG: f64 = 29.92;

/// Standard temperature (°F)
pub const STANDARD_TEMPERATURE_F: f64 = 59.0;

/// Feet per yard
pub const FEET_PER_YARD: f64 = 3.0;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Miles per hour to feet per second
pub const MPH_TO_FPS: f64 = 5280.0 / 3600.0;

/// Minutes of angle per radian
pub const MOA_PER_RADIAN: f64 = 10800.0 / std::f64::consts::PI;

/// Minutes of angle per milliradian
pub const MOA_PER_MIL: f64 = MOA_PER_RADIAN / 1000.0;

// Numerical stability constants

/// Minimum threshold for preventing division by zero in general calculations
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

/// Velocity below which the projectile is considered stalled (ft/s)
pub const MIN_VELOCITY_FPS: f64 = 50.0;

/// Floor applied to interpolated and extrapolated drag coefficients
pub const MIN_DRAG_COEFFICIENT: f64 = 0.01;

/// Convert minutes of angle to milliradians.
pub fn moa_to_mil(moa: f64) -> f64 {
    moa / MOA_PER_MIL
}

/// Convert milliradians to minutes of angle.
pub fn mil_to_moa(mil: f64) -> f64 {
    mil * MOA_PER_MIL
}
