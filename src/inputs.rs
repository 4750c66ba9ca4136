use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::atmosphere::Atmosphere;
use crate::error::BallisticsError;
use crate::wind::Wind;
use crate::DragModel;

/// Ballistic input parameters for one zero + solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticInputs {
    pub ballistic_coefficient: f64,
    pub drag_model: DragModel,
    pub muzzle_velocity_fps: f64,
    /// Sight line above the bore axis (inches); negative when the sight sits below it
    pub sight_height_inches: f64,
    /// Uphill (positive) or downhill (negative) angle of the line of sight (degrees)
    pub shooting_angle_deg: f64,
    pub zero_distance_yards: f64,
    pub wind_speed_mph: f64,
    /// Direction the wind blows from, clockwise from the line of fire (degrees)
    pub wind_angle_deg: f64,
    pub atmosphere: Atmosphere,
}

impl Default for BallisticInputs {
    fn default() -> Self {
        // 6.5 Creedmoor class match load with a 100 yard zero
        Self {
            ballistic_coefficient: 0.425,
            drag_model: DragModel::G7,
            muzzle_velocity_fps: 2802.0,
            sight_height_inches: 2.7,
            shooting_angle_deg: 0.0,
            zero_distance_yards: 100.0,
            wind_speed_mph: 0.0,
            wind_angle_deg: 0.0,
            atmosphere: Atmosphere::standard(),
        }
    }
}

impl BallisticInputs {
    /// Load a profile from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BallisticsError> {
        let text = std::fs::read_to_string(path)?;
        let inputs: Self = serde_json::from_str(&text)?;
        inputs.validate()?;
        Ok(inputs)
    }

    /// Checks every field is finite and inside its physical domain.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<(), BallisticsError> {
        self.validate_load()?;
        check_finite("wind_angle_deg", self.wind_angle_deg)?;

        if !self.shooting_angle_deg.is_finite() || self.shooting_angle_deg.abs() >= 90.0 {
            return Err(BallisticsError::invalid("shooting_angle_deg", self.shooting_angle_deg));
        }
        if !self.wind_speed_mph.is_finite() || self.wind_speed_mph < 0.0 {
            return Err(BallisticsError::invalid("wind_speed_mph", self.wind_speed_mph));
        }
        Ok(())
    }

    /// Checks only what a level, still-air zero reads: projectile, sight,
    /// zero distance and atmosphere. Shooting angle and wind are left alone.
    pub fn validate_load(&self) -> Result<(), BallisticsError> {
        check_positive("ballistic_coefficient", self.ballistic_coefficient)?;
        check_positive("muzzle_velocity_fps", self.muzzle_velocity_fps)?;
        check_positive("zero_distance_yards", self.zero_distance_yards)?;
        check_finite("sight_height_inches", self.sight_height_inches)?;
        self.atmosphere.validate()
    }

    pub fn wind(&self) -> Wind {
        Wind::new(self.wind_speed_mph, self.wind_angle_deg)
    }
}

fn check_finite(parameter: &'static str, value: f64) -> Result<(), BallisticsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BallisticsError::invalid(parameter, value))
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), BallisticsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BallisticsError::invalid(parameter, value))
    }
}
