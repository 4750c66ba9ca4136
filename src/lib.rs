//! # Ballistics DOPE
//!
//! Point-mass exterior ballistics: find the zero angle for a load, integrate
//! the trajectory and read elevation/windage corrections off the resulting
//! table. A small watch-face state machine drives the same pipeline from a
//! four-digit distance entry.

// Re-export the main types and functions
pub use atmosphere::Atmosphere;
pub use drag_model::DragModel;
pub use error::BallisticsError;
pub use face::{BallisticsFace, DefaultHandler, FaceEvent, Page, SegmentDisplay};
pub use inputs::BallisticInputs;
pub use solution::{Query, Solution, TrajectorySample};
pub use trajectory_solver::{solve, IntegrationMethod, SolverConfig, Termination, TrajectorySolver};
pub use wind::Wind;
pub use zero_angle::{find_zero_angle, find_zero_angle_with_config, ZeroConfig};

// Module declarations
pub mod constants;
pub mod drag;
mod atmosphere;
mod drag_model;
mod error;
mod face;
mod inputs;
mod solution;
mod trajectory_solver;
mod wind;
mod zero_angle;

/// Zero the load at its zero distance, then solve at its shooting angle.
///
/// This is the whole pipeline a caller normally needs: the returned table
/// answers `moa_at` for any target distance.
///
/// # Errors
///
/// `InvalidInput` for out-of-range inputs, `NoConvergence` if no zero angle
/// could be found.
pub fn zero_and_solve(inputs: &BallisticInputs) -> Result<Solution, BallisticsError> {
    let zero_angle = find_zero_angle(inputs, 0.0)?;
    solve(inputs, zero_angle)
}
