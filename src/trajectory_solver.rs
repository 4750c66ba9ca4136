//! Point-mass trajectory integration in the line-of-sight frame.
//!
//! x runs along the line of sight, y perpendicular to it in the vertical
//! plane. The bore starts `sight_height` below the sight line and is elevated
//! by the zero angle; gravity is resolved through the shooting angle.

use log::{debug, warn};
use nalgebra::Vector2;
use serde::Serialize;

use crate::constants::{
    FEET_PER_YARD, G_ACCEL_FPS2, INCHES_PER_FOOT, MIN_DIVISION_THRESHOLD, MIN_VELOCITY_FPS,
};
use crate::drag::retardation;
use crate::error::BallisticsError;
use crate::inputs::BallisticInputs;
use crate::solution::{Solution, TrajectorySample};
use crate::wind::Wind;
use crate::DragModel;

/// Stepper used to advance the equations of motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMethod {
    /// Classic fourth-order Runge-Kutta
    #[default]
    Rk4,
    /// Explicit Euler velocity update with trapezoidal position update
    Euler,
}

/// Why the integration loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Velocity fell below the stall threshold
    Stalled,
    /// The path turned steeper than 3:1 against the line of sight
    SteepDescent,
    /// The distance or time budget ran out while the projectile was still flying
    MaxRangeExceeded,
}

/// Upper bound on `max_range_yards / sample_interval_yards`
pub const MAX_SAMPLES: f64 = 1_000_000.0;

/// Integration settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub method: IntegrationMethod,
    /// Path length covered by one integration step (ft)
    pub step_ft: f64,
    pub sample_interval_yards: f64,
    pub max_range_yards: f64,
    pub max_time_s: f64,
    pub min_velocity_fps: f64,
    /// Hard cap on integration steps per trajectory; counts against the range budget
    pub max_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::Rk4,
            step_ft: 0.5,
            sample_interval_yards: 1.0,
            max_range_yards: 10_000.0,
            max_time_s: 60.0,
            min_velocity_fps: MIN_VELOCITY_FPS,
            // 10000 yd of 0.5 ft steps is 60000; the rest covers curved and slow flight
            max_steps: 200_000,
        }
    }
}

impl SolverConfig {
    /// Validates that every setting is finite and positive, and that the
    /// sample table stays bounded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first bad setting.
    pub fn validate(&self) -> Result<(), BallisticsError> {
        let checks = [
            (self.step_ft, "step_ft must be finite and positive"),
            (self.sample_interval_yards, "sample_interval_yards must be finite and positive"),
            (self.max_range_yards, "max_range_yards must be finite and positive"),
            (self.max_time_s, "max_time_s must be finite and positive"),
            (self.min_velocity_fps, "min_velocity_fps must be finite and positive"),
        ];
        for (value, reason) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(BallisticsError::InvalidConfig { reason });
            }
        }
        if self.max_steps == 0 {
            return Err(BallisticsError::InvalidConfig { reason: "max_steps must be at least 1" });
        }
        if self.max_range_yards / self.sample_interval_yards > MAX_SAMPLES {
            return Err(BallisticsError::InvalidConfig {
                reason: "max_range_yards / sample_interval_yards exceeds the sample limit",
            });
        }
        Ok(())
    }
}

/// Position (ft), velocity (ft/s) and elapsed time (s)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct State {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub time: f64,
}

impl State {
    /// Linear blend between two states at fraction `t` of the way to `next`
    pub(crate) fn lerp(&self, next: &State, t: f64) -> State {
        State {
            position: self.position + (next.position - self.position) * t,
            velocity: self.velocity + (next.velocity - self.velocity) * t,
            time: self.time + (next.time - self.time) * t,
        }
    }
}

/// Forces acting on the projectile for one set of inputs
#[derive(Debug, Clone, Copy)]
pub(crate) struct Integrator {
    drag_model: DragModel,
    bc: f64,
    density_ratio: f64,
    speed_of_sound_fps: f64,
    headwind_fps: f64,
    gravity: Vector2<f64>,
    method: IntegrationMethod,
    step_ft: f64,
    min_velocity_fps: f64,
    max_time_s: f64,
    max_steps: usize,
}

impl Integrator {
    pub(crate) fn new(
        inputs: &BallisticInputs,
        wind: &Wind,
        shooting_angle_deg: f64,
        config: &SolverConfig,
    ) -> Self {
        let angle = shooting_angle_deg.to_radians();
        Self {
            drag_model: inputs.drag_model,
            bc: inputs.ballistic_coefficient,
            density_ratio: inputs.atmosphere.density_ratio(),
            speed_of_sound_fps: inputs.atmosphere.speed_of_sound_fps(),
            headwind_fps: wind.headwind_fps(),
            gravity: Vector2::new(-G_ACCEL_FPS2 * angle.sin(), -G_ACCEL_FPS2 * angle.cos()),
            method: config.method,
            step_ft: config.step_ft,
            min_velocity_fps: config.min_velocity_fps,
            max_time_s: config.max_time_s,
            max_steps: config.max_steps,
        }
    }

    /// Muzzle state for a bore elevated `bore_angle_deg` above the sight line
    pub(crate) fn launch(muzzle_velocity_fps: f64, sight_height_inches: f64, bore_angle_deg: f64) -> State {
        let angle = bore_angle_deg.to_radians();
        State {
            position: Vector2::new(0.0, -sight_height_inches / INCHES_PER_FOOT),
            velocity: Vector2::new(angle.cos(), angle.sin()) * muzzle_velocity_fps,
            time: 0.0,
        }
    }

    fn acceleration(&self, velocity: &Vector2<f64>) -> Vector2<f64> {
        // Air moves toward the shooter at the headwind speed
        let air_relative = Vector2::new(velocity.x + self.headwind_fps, velocity.y);
        let speed = air_relative.norm();
        if speed < MIN_DIVISION_THRESHOLD {
            return self.gravity;
        }

        let decel = retardation(self.drag_model, self.bc, speed, self.density_ratio, self.speed_of_sound_fps);
        self.gravity - air_relative * (decel / speed)
    }

    /// Advance one fixed path-length step
    pub(crate) fn step(&self, state: &State) -> State {
        let speed = state.velocity.norm().max(self.min_velocity_fps);
        let dt = self.step_ft / speed;
        let v = state.velocity;

        let (velocity, position) = match self.method {
            IntegrationMethod::Euler => {
                let v_new = v + self.acceleration(&v) * dt;
                (v_new, state.position + (v + v_new) * (0.5 * dt))
            }
            IntegrationMethod::Rk4 => {
                let k1 = self.acceleration(&v);
                let v2 = v + k1 * (0.5 * dt);
                let k2 = self.acceleration(&v2);
                let v3 = v + k2 * (0.5 * dt);
                let k3 = self.acceleration(&v3);
                let v4 = v + k3 * dt;
                let k4 = self.acceleration(&v4);

                let v_new = v + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
                let p_new = state.position + (v + v2 * 2.0 + v3 * 2.0 + v4) * (dt / 6.0);
                (v_new, p_new)
            }
        };

        State { position, velocity, time: state.time + dt }
    }

    /// Stop condition after `steps` steps, ignoring the distance budget
    pub(crate) fn stop_reason(&self, state: &State, steps: usize) -> Option<Termination> {
        if state.velocity.norm() < self.min_velocity_fps {
            Some(Termination::Stalled)
        } else if state.velocity.y.abs() > 3.0 * state.velocity.x.abs() {
            Some(Termination::SteepDescent)
        } else if steps >= self.max_steps || state.time > self.max_time_s {
            Some(Termination::MaxRangeExceeded)
        } else {
            None
        }
    }
}

/// Trajectory solver for one set of ballistic inputs
pub struct TrajectorySolver {
    inputs: BallisticInputs,
    config: SolverConfig,
}

impl TrajectorySolver {
    pub fn new(inputs: BallisticInputs, config: SolverConfig) -> Self {
        Self { inputs, config }
    }

    pub fn inputs(&self) -> &BallisticInputs {
        &self.inputs
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_max_range(&mut self, yards: f64) {
        self.config.max_range_yards = yards;
    }

    pub fn set_sample_interval(&mut self, yards: f64) {
        self.config.sample_interval_yards = yards;
    }

    pub fn set_method(&mut self, method: IntegrationMethod) {
        self.config.method = method;
    }

    /// Integrate the trajectory for a bore elevated `zero_angle_deg` above the sight line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` or `InvalidConfig` before integrating if the
    /// inputs, the angle or the settings are out of range.
    pub fn solve(&self, zero_angle_deg: f64) -> Result<Solution, BallisticsError> {
        self.inputs.validate()?;
        self.config.validate()?;
        if !zero_angle_deg.is_finite() || zero_angle_deg.abs() >= 90.0 {
            return Err(BallisticsError::invalid("zero_angle_deg", zero_angle_deg));
        }

        let wind = self.inputs.wind();
        let integrator = Integrator::new(&self.inputs, &wind, self.inputs.shooting_angle_deg, &self.config);
        let muzzle_velocity = self.inputs.muzzle_velocity_fps;

        let interval_ft = self.config.sample_interval_yards * FEET_PER_YARD;
        let max_range_ft = self.config.max_range_yards * FEET_PER_YARD;

        let mut state = Integrator::launch(muzzle_velocity, self.inputs.sight_height_inches, zero_angle_deg);
        let mut samples = vec![make_sample(&state, 0.0, &wind, muzzle_velocity)];
        let mut next_index = 1usize;
        let mut steps = 0usize;

        let termination = loop {
            let next = integrator.step(&state);
            steps += 1;
            // Samples past the time budget are never recorded
            if next.time > self.config.max_time_s {
                break Termination::MaxRangeExceeded;
            }

            loop {
                let target_ft = next_index as f64 * interval_ft;
                if target_ft > next.position.x || target_ft > max_range_ft {
                    break;
                }
                let span = next.position.x - state.position.x;
                let t = if span > MIN_DIVISION_THRESHOLD { (target_ft - state.position.x) / span } else { 1.0 };
                let crossing = state.lerp(&next, t);
                samples.push(make_sample(&crossing, target_ft, &wind, muzzle_velocity));
                next_index += 1;
            }

            state = next;

            if state.position.x >= max_range_ft {
                break Termination::MaxRangeExceeded;
            }
            if let Some(reason) = integrator.stop_reason(&state, steps) {
                break reason;
            }
        };

        let last_yards = samples.last().map_or(0.0, |s| s.distance_yards);
        if termination == Termination::MaxRangeExceeded {
            warn!(
                "integration budget exhausted at {:.0} yd ({:.2} s) with projectile still at {:.0} ft/s",
                last_yards,
                state.time,
                state.velocity.norm()
            );
        }
        debug!(
            "solved {} samples to {:.0} yd at zero angle {:.5} deg, stopped: {:?}",
            samples.len(),
            last_yards,
            zero_angle_deg,
            termination
        );

        Ok(Solution::new(self.inputs, zero_angle_deg, samples, termination))
    }
}

fn make_sample(state: &State, distance_ft: f64, wind: &Wind, muzzle_velocity_fps: f64) -> TrajectorySample {
    TrajectorySample {
        distance_yards: distance_ft / FEET_PER_YARD,
        drop_inches: state.position.y * INCHES_PER_FOOT,
        windage_inches: wind.drift_inches(muzzle_velocity_fps, distance_ft, state.time),
        velocity_fps: state.velocity.norm(),
        time_s: state.time,
    }
}

/// Solve with default settings
pub fn solve(inputs: &BallisticInputs, zero_angle_deg: f64) -> Result<Solution, BallisticsError> {
    TrajectorySolver::new(*inputs, SolverConfig::default()).solve(zero_angle_deg)
}
