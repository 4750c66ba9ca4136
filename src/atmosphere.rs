//! Atmospheric corrections for drag.
//!
//! Drag tables and ballistic coefficients are referenced to the standard
//! sea-level atmosphere. Non-standard air changes drag through density, and
//! the drag-table lookup through the local speed of sound.

use serde::{Deserialize, Serialize};

use crate::constants::{STANDARD_AIR_DENSITY, STANDARD_PRESSURE_INHG, STANDARD_TEMPERATURE_F};
use crate::error::BallisticsError;

const R_DRY: f64 = 287.05; // Gas constant for dry air (J/(kg·K))
const R_VAPOR: f64 = 461.495; // Gas constant for water vapor (J/(kg·K))
const PA_PER_INHG: f64 = 3386.389;
const RANKINE_OFFSET: f64 = 459.67;

/// Ambient conditions at the firing point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    /// Altitude above sea level (ft)
    pub altitude_ft: f64,
    /// Sea-level corrected barometric pressure, as reported by weather services (inHg)
    pub pressure_inhg: f64,
    /// Air temperature (°F)
    pub temperature_f: f64,
    /// Relative humidity (percent, 0-100)
    pub humidity_pct: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::standard()
    }
}

impl Atmosphere {
    /// Standard sea-level atmosphere, dry air
    pub const fn standard() -> Self {
        Self {
            altitude_ft: 0.0,
            pressure_inhg: STANDARD_PRESSURE_INHG,
            temperature_f: STANDARD_TEMPERATURE_F,
            humidity_pct: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        if !self.altitude_ft.is_finite() || !(-1500.0..=36000.0).contains(&self.altitude_ft) {
            return Err(BallisticsError::invalid("altitude_ft", self.altitude_ft));
        }
        if !self.pressure_inhg.is_finite() || self.pressure_inhg <= 0.0 {
            return Err(BallisticsError::invalid("pressure_inhg", self.pressure_inhg));
        }
        if !self.temperature_f.is_finite() || self.temperature_f <= -RANKINE_OFFSET {
            return Err(BallisticsError::invalid("temperature_f", self.temperature_f));
        }
        if !self.humidity_pct.is_finite() || !(0.0..=100.0).contains(&self.humidity_pct) {
            return Err(BallisticsError::invalid("humidity_pct", self.humidity_pct));
        }
        Ok(())
    }

    /// Pressure at the firing point (inHg), from the sea-level reading
    pub fn station_pressure_inhg(&self) -> f64 {
        self.pressure_inhg * (1.0 - 6.8754e-6 * self.altitude_ft).powf(5.2559)
    }

    /// Moist air density (kg/m³)
    pub fn air_density(&self) -> f64 {
        let temp_c = (self.temperature_f - 32.0) * 5.0 / 9.0;
        let temp_k = temp_c + 273.15;
        let pressure_pa = self.station_pressure_inhg() * PA_PER_INHG;

        // Saturation vapor pressure over water (Tetens)
        let saturation_pa = 610.94 * (17.625 * temp_c / (temp_c + 243.04)).exp();
        let vapor_pa = (self.humidity_pct / 100.0) * saturation_pa;
        let dry_pa = pressure_pa - vapor_pa;

        dry_pa / (R_DRY * temp_k) + vapor_pa / (R_VAPOR * temp_k)
    }

    /// Air density relative to the standard atmosphere drag tables assume
    pub fn density_ratio(&self) -> f64 {
        self.air_density() / STANDARD_AIR_DENSITY
    }

    /// Local speed of sound (ft/s)
    pub fn speed_of_sound_fps(&self) -> f64 {
        49.0223 * (self.temperature_f + RANKINE_OFFSET).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPEED_OF_SOUND_FPS;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_atmosphere_matches_table_reference() {
        let atm = Atmosphere::standard();
        assert_relative_eq!(atm.density_ratio(), 1.0, epsilon = 1e-3);
        assert_relative_eq!(atm.speed_of_sound_fps(), SPEED_OF_SOUND_FPS, epsilon = 0.1);
        assert_relative_eq!(atm.station_pressure_inhg(), STANDARD_PRESSURE_INHG);
    }

    #[test]
    fn test_altitude_thins_the_air() {
        let high = Atmosphere { altitude_ft: 5000.0, ..Atmosphere::standard() };
        // About 83% of sea-level density at 5000 ft when the temperature is unchanged
        assert!(high.density_ratio() < 0.9 && high.density_ratio() > 0.8, "{}", high.density_ratio());
    }

    #[test]
    fn test_humidity_lowers_density() {
        let dry = Atmosphere { temperature_f: 90.0, ..Atmosphere::standard() };
        let humid = Atmosphere { humidity_pct: 100.0, ..dry };
        assert!(humid.air_density() < dry.air_density());
    }

    #[test]
    fn test_cold_air_slows_sound() {
        let cold = Atmosphere { temperature_f: 0.0, ..Atmosphere::standard() };
        assert!(cold.speed_of_sound_fps() < SPEED_OF_SOUND_FPS);
        assert!(cold.density_ratio() > 1.0);
    }

    #[test]
    fn test_validation() {
        assert!(Atmosphere::standard().validate().is_ok());
        assert!(Atmosphere { humidity_pct: 120.0, ..Atmosphere::standard() }.validate().is_err());
        assert!(Atmosphere { pressure_inhg: 0.0, ..Atmosphere::standard() }.validate().is_err());
        assert!(Atmosphere { temperature_f: f64::NAN, ..Atmosphere::standard() }.validate().is_err());
    }

    #[test]
    fn test_partial_profile_falls_back_to_standard() {
        let atm: Atmosphere = serde_json::from_str(r#"{"altitude_ft": 2000.0}"#).unwrap();
        assert_eq!(atm.altitude_ft, 2000.0);
        assert_eq!(atm.temperature_f, STANDARD_TEMPERATURE_F);
    }
}
