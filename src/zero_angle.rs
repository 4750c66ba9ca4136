//! Zero-angle search.
//!
//! The zero is taken on a level range in still air: shooting angle and wind
//! in the inputs are ignored, atmosphere is honoured.

use log::debug;

use crate::constants::{FEET_PER_YARD, INCHES_PER_FOOT, MIN_DIVISION_THRESHOLD};
use crate::error::BallisticsError;
use crate::inputs::BallisticInputs;
use crate::trajectory_solver::{Integrator, SolverConfig};
use crate::wind::Wind;

/// Configuration for the zero-angle search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroConfig {
    /// Accepted vertical miss at the zero distance (inches)
    pub tolerance_inches: f64,
    pub max_iterations: usize,
    /// First step away from the seed angle while bracketing (degrees)
    pub initial_step_deg: f64,
    /// Bore angles beyond ± this are never tried (degrees)
    pub max_angle_deg: f64,
    /// Height above the sight line the trajectory must pass through at the zero distance (inches)
    pub target_offset_inches: f64,
}

impl Default for ZeroConfig {
    fn default() -> Self {
        Self {
            tolerance_inches: 0.01,
            max_iterations: 100,
            initial_step_deg: 0.5,
            max_angle_deg: 45.0,
            target_offset_inches: 0.0,
        }
    }
}

impl ZeroConfig {
    /// Validates that tolerances and bounds are usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any setting is non-finite or out of range.
    pub fn validate(&self) -> Result<(), BallisticsError> {
        if !self.tolerance_inches.is_finite() || self.tolerance_inches <= 0.0 {
            return Err(BallisticsError::InvalidConfig { reason: "tolerance_inches must be finite and positive" });
        }
        if self.max_iterations == 0 {
            return Err(BallisticsError::InvalidConfig { reason: "max_iterations must be at least 1" });
        }
        if !self.initial_step_deg.is_finite() || self.initial_step_deg <= 0.0 {
            return Err(BallisticsError::InvalidConfig { reason: "initial_step_deg must be finite and positive" });
        }
        if !self.max_angle_deg.is_finite() || self.max_angle_deg <= 0.0 || self.max_angle_deg >= 90.0 {
            return Err(BallisticsError::InvalidConfig { reason: "max_angle_deg must be in (0, 90)" });
        }
        if !self.target_offset_inches.is_finite() {
            return Err(BallisticsError::InvalidConfig { reason: "target_offset_inches must be finite" });
        }
        Ok(())
    }
}

/// Signed miss (inches) at the zero distance for one bore angle
///
/// `None` when the projectile stalls or turns down before getting there,
/// which the search treats as falling short.
struct MissFunction {
    integrator: Integrator,
    muzzle_velocity_fps: f64,
    sight_height_inches: f64,
    zero_ft: f64,
    target_offset_inches: f64,
}

impl MissFunction {
    fn new(inputs: &BallisticInputs, solver_config: &SolverConfig, target_offset_inches: f64) -> Self {
        Self {
            integrator: Integrator::new(inputs, &Wind::calm(), 0.0, solver_config),
            muzzle_velocity_fps: inputs.muzzle_velocity_fps,
            sight_height_inches: inputs.sight_height_inches,
            zero_ft: inputs.zero_distance_yards * FEET_PER_YARD,
            target_offset_inches,
        }
    }

    fn eval(&self, angle_deg: f64) -> Option<f64> {
        let mut state = Integrator::launch(self.muzzle_velocity_fps, self.sight_height_inches, angle_deg);
        let mut steps = 0usize;
        loop {
            let next = self.integrator.step(&state);
            steps += 1;
            if next.position.x >= self.zero_ft {
                let span = next.position.x - state.position.x;
                let t = if span > MIN_DIVISION_THRESHOLD { (self.zero_ft - state.position.x) / span } else { 1.0 };
                let height_inches = state.lerp(&next, t).position.y * INCHES_PER_FOOT;
                return Some(height_inches - self.target_offset_inches);
            }
            if self.integrator.stop_reason(&next, steps).is_some() {
                return None;
            }
            state = next;
        }
    }
}

fn is_high(miss: Option<f64>) -> bool {
    miss.is_some_and(|m| m > 0.0)
}

/// Iteration bookkeeping shared by the bracketing and bisection phases
struct Search<'a> {
    miss_at: &'a MissFunction,
    tolerance_inches: f64,
    iterations: usize,
    best_miss: f64,
}

impl Search<'_> {
    fn eval(&mut self, angle_deg: f64) -> Option<f64> {
        self.iterations += 1;
        let miss = self.miss_at.eval(angle_deg);
        if let Some(m) = miss {
            if m.abs() < self.best_miss.abs() {
                self.best_miss = m;
            }
        }
        debug!("zero iteration {}: angle {:.6} deg, miss {:?} in", self.iterations, angle_deg, miss);
        miss
    }

    fn converged(&self, miss: Option<f64>) -> bool {
        miss.is_some_and(|m| m.abs() <= self.tolerance_inches)
    }

    fn no_convergence(&self) -> BallisticsError {
        BallisticsError::NoConvergence { iterations: self.iterations, miss_inches: self.best_miss }
    }
}

/// Search with explicit settings; see [`find_zero_angle`].
pub fn find_zero_angle_with_config(
    inputs: &BallisticInputs,
    initial_angle_deg: f64,
    config: &ZeroConfig,
    solver_config: &SolverConfig,
) -> Result<f64, BallisticsError> {
    inputs.validate_load()?;
    config.validate()?;
    solver_config.validate()?;
    if !initial_angle_deg.is_finite() {
        return Err(BallisticsError::invalid("initial_angle_deg", initial_angle_deg));
    }

    let miss_at = MissFunction::new(inputs, solver_config, config.target_offset_inches);
    let mut search = Search {
        miss_at: &miss_at,
        tolerance_inches: config.tolerance_inches,
        iterations: 0,
        best_miss: f64::INFINITY,
    };
    let max_angle = config.max_angle_deg;

    // Bracket: walk away from the seed with a doubling step until the miss changes sign
    let mut a = initial_angle_deg.clamp(-max_angle, max_angle);
    let mut miss_a = search.eval(a);
    if search.converged(miss_a) {
        return Ok(a);
    }
    let direction = if is_high(miss_a) { -1.0 } else { 1.0 };
    let mut step = config.initial_step_deg;

    let (mut low, mut high) = loop {
        let at_limit = a.abs() >= max_angle && a.signum() == direction;
        if search.iterations >= config.max_iterations || at_limit {
            return Err(search.no_convergence());
        }
        let b = (a + direction * step).clamp(-max_angle, max_angle);
        let miss_b = search.eval(b);
        if search.converged(miss_b) {
            return Ok(b);
        }
        if is_high(miss_b) != is_high(miss_a) {
            break if direction > 0.0 { (a, b) } else { (b, a) };
        }
        a = b;
        miss_a = miss_b;
        step *= 2.0;
    };

    // Bisect: `low` always shoots low, `high` always shoots high
    while search.iterations < config.max_iterations {
        let mid = 0.5 * (low + high);
        let miss = search.eval(mid);
        if search.converged(miss) {
            return Ok(mid);
        }
        if is_high(miss) {
            high = mid;
        } else {
            low = mid;
        }
        if high - low <= f64::EPSILON * mid.abs().max(1.0) {
            break;
        }
    }

    Err(search.no_convergence())
}

/// Find the bore elevation (degrees above the sight line) that puts the
/// trajectory back on the sight line at the zero distance.
///
/// `initial_angle_deg` seeds the search; 0 is a good seed for any sensible zero.
///
/// # Errors
///
/// `InvalidInput` for out-of-range inputs, `NoConvergence` if the miss can't
/// be driven inside 0.01 in within the iteration bound. A wrong angle is
/// never returned.
pub fn find_zero_angle(inputs: &BallisticInputs, initial_angle_deg: f64) -> Result<f64, BallisticsError> {
    find_zero_angle_with_config(inputs, initial_angle_deg, &ZeroConfig::default(), &SolverConfig::default())
}
