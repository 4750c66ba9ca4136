//! Two-page watch face: enter a target distance, read the elevation to dial.
//!
//! Page one edits four decimal digits of the distance in yards. Page two shows
//! the MOA correction at that distance for the configured load.

use log::{debug, warn};

use crate::inputs::BallisticInputs;
use crate::solution::{Query, Solution};
use crate::BallisticsError;

/// Events delivered by the watch firmware loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceEvent {
    Activate,
    Tick,
    LightButtonDown,
    LightButtonUp,
    AlarmButtonUp,
    AlarmLongPress,
    ModeButtonUp,
    ModeLongPress,
    Timeout,
    LowEnergyUpdate,
}

/// Ten-character segment display
///
/// The face never sends more than [`DISPLAY_WIDTH`] characters.
pub trait SegmentDisplay {
    fn show(&mut self, text: &str);
}

/// Firmware fallback for events the face leaves alone
pub trait DefaultHandler {
    /// Returns whether the watch may enter standby
    fn handle(&mut self, event: FaceEvent) -> bool;
}

impl<F: FnMut(FaceEvent) -> bool> DefaultHandler for F {
    fn handle(&mut self, event: FaceEvent) -> bool {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    DistanceEntry,
    Elevation,
}

impl Page {
    fn toggled(self) -> Self {
        match self {
            Page::DistanceEntry => Page::Elevation,
            Page::Elevation => Page::DistanceEntry,
        }
    }
}

const DIGITS: usize = 4;

pub const DISPLAY_WIDTH: usize = 10;

/// Shown when the entered distance is past the end of the trajectory
const OUT_OF_RANGE: &str = "BA   RANGE";
const SOLVE_FAILED: &str = "BA     ERR";

/// Face state, owned by the caller and passed through each event
#[derive(Debug, Clone)]
pub struct BallisticsFace {
    page: Page,
    active_digit: usize,
    digits: [u8; DIGITS],
    inputs: BallisticInputs,
    solution: Option<Solution>,
}

impl Default for BallisticsFace {
    fn default() -> Self {
        Self::new(BallisticInputs::default())
    }
}

impl BallisticsFace {
    /// Face for `inputs`, starting on the entry page at 500 yards
    pub fn new(inputs: BallisticInputs) -> Self {
        Self {
            page: Page::DistanceEntry,
            active_digit: 0,
            digits: [0, 5, 0, 0],
            inputs,
            solution: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn active_digit(&self) -> usize {
        self.active_digit
    }

    pub fn digits(&self) -> [u8; DIGITS] {
        self.digits
    }

    pub fn inputs(&self) -> &BallisticInputs {
        &self.inputs
    }

    /// Replace the load; the cached solution is recomputed on next display
    pub fn set_inputs(&mut self, inputs: BallisticInputs) {
        self.inputs = inputs;
        self.solution = None;
    }

    pub fn target_distance_yards(&self) -> u16 {
        self.digits.iter().fold(0u16, |acc, &d| acc * 10 + u16::from(d))
    }

    /// Handle one firmware event, drawing to `display` when the state changes.
    ///
    /// Events the face has no use for go to `fallback`, whose answer is
    /// returned. Everything else returns `true`.
    pub fn handle_event(
        &mut self,
        event: FaceEvent,
        display: &mut impl SegmentDisplay,
        fallback: &mut impl DefaultHandler,
    ) -> bool {
        match event {
            FaceEvent::Activate => self.render(display),
            FaceEvent::LightButtonDown => {
                if self.page == Page::DistanceEntry {
                    self.active_digit += 1;
                    if self.active_digit >= DIGITS {
                        self.active_digit = 0;
                        self.page = Page::Elevation;
                    }
                    self.render(display);
                }
            }
            FaceEvent::AlarmButtonUp => {
                if self.page == Page::DistanceEntry {
                    self.increment_active_digit();
                    self.render(display);
                }
            }
            FaceEvent::AlarmLongPress => {
                self.page = self.page.toggled();
                self.render(display);
            }
            FaceEvent::Tick | FaceEvent::LightButtonUp | FaceEvent::Timeout | FaceEvent::LowEnergyUpdate => {}
            FaceEvent::ModeButtonUp | FaceEvent::ModeLongPress => return fallback.handle(event),
        }
        true
    }

    // 9 wraps to 0 without carrying into the next digit
    fn increment_active_digit(&mut self) {
        let digit = &mut self.digits[self.active_digit];
        *digit = (*digit + 1) % 10;
    }

    fn render(&mut self, display: &mut impl SegmentDisplay) {
        let text = match self.page {
            Page::DistanceEntry => format!("DS  {:04}yd", self.target_distance_yards()),
            Page::Elevation => match self.elevation_moa() {
                Ok(Query::Interpolated(moa)) => elevation_text(moa),
                Ok(Query::ClampedRange { sampled_yards, .. }) => {
                    let distance = self.target_distance_yards();
                    warn!("{distance} yd is past the end of the trajectory at {sampled_yards:.0} yd");
                    OUT_OF_RANGE.to_string()
                }
                Err(err) => {
                    warn!("ballistics face could not solve: {err}");
                    SOLVE_FAILED.to_string()
                }
            },
        };
        display.show(&text);
    }

    fn elevation_moa(&mut self) -> Result<Query<f64>, BallisticsError> {
        let distance = f64::from(self.target_distance_yards());
        let solution = match self.solution.take() {
            Some(solution) => solution,
            None => crate::zero_and_solve(&self.inputs)?,
        };
        let moa = solution.moa_at(distance)?;
        debug!("face distance {distance} yd, correction {moa:?} MOA");
        self.solution = Some(solution);
        Ok(moa)
    }
}

/// "BA" and the correction right-aligned in the remaining eight cells
///
/// An elevation correction never exceeds ±5400 MOA, so two decimals always fit;
/// the whole-number fallback only guards the display contract.
fn elevation_text(moa: f64) -> String {
    let text = format!("BA{moa:>8.2}");
    if text.len() <= DISPLAY_WIDTH {
        text
    } else {
        format!("BA{:>8.0}", moa.clamp(-9_999_999.0, 99_999_999.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Screen {
        shown: Vec<String>,
    }

    impl SegmentDisplay for Screen {
        fn show(&mut self, text: &str) {
            assert!(text.len() <= DISPLAY_WIDTH, "{text:?} overflows the display");
            self.shown.push(text.to_string());
        }
    }

    impl Screen {
        fn last(&self) -> &str {
            self.shown.last().map(String::as_str).unwrap_or("")
        }
    }

    fn no_fallback(_: FaceEvent) -> bool {
        panic!("unexpected fallback")
    }

    fn press(face: &mut BallisticsFace, screen: &mut Screen, event: FaceEvent) -> bool {
        face.handle_event(event, screen, &mut no_fallback)
    }

    #[test]
    fn test_activate_shows_initial_distance() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        assert!(press(&mut face, &mut screen, FaceEvent::Activate));
        assert_eq!(screen.last(), "DS  0500yd");
        assert_eq!(face.target_distance_yards(), 500);
    }

    #[test]
    fn test_alarm_increments_active_digit() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        press(&mut face, &mut screen, FaceEvent::AlarmButtonUp);
        assert_eq!(screen.last(), "DS  1500yd");

        press(&mut face, &mut screen, FaceEvent::LightButtonDown);
        press(&mut face, &mut screen, FaceEvent::AlarmButtonUp);
        assert_eq!(screen.last(), "DS  1600yd");
        assert_eq!(face.active_digit(), 1);
    }

    #[test]
    fn test_digit_wraps_without_carry() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        // Second digit starts at 5; five presses take it past 9
        press(&mut face, &mut screen, FaceEvent::LightButtonDown);
        for _ in 0..5 {
            press(&mut face, &mut screen, FaceEvent::AlarmButtonUp);
        }
        assert_eq!(face.digits(), [0, 0, 0, 0]);
        assert_eq!(screen.last(), "DS  0000yd");
    }

    #[test]
    fn test_light_past_last_digit_switches_to_elevation() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        for _ in 0..3 {
            press(&mut face, &mut screen, FaceEvent::LightButtonDown);
            assert_eq!(face.page(), Page::DistanceEntry);
        }
        press(&mut face, &mut screen, FaceEvent::LightButtonDown);
        assert_eq!(face.page(), Page::Elevation);
        assert_eq!(face.active_digit(), 0);
        assert!(screen.last().starts_with("BA    "), "{}", screen.last());

        // Further presses are ignored on the elevation page
        let drawn = screen.shown.len();
        press(&mut face, &mut screen, FaceEvent::LightButtonDown);
        press(&mut face, &mut screen, FaceEvent::AlarmButtonUp);
        assert_eq!(screen.shown.len(), drawn);
        assert_eq!(face.page(), Page::Elevation);
    }

    #[test]
    fn test_elevation_page_shows_positive_moa_at_500() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        press(&mut face, &mut screen, FaceEvent::AlarmLongPress);
        let text = screen.last().to_string();
        let moa: f64 = text.trim_start_matches("BA").trim().parse().unwrap();
        assert!(moa > 5.0 && moa < 15.0, "{text}");

        press(&mut face, &mut screen, FaceEvent::AlarmLongPress);
        assert_eq!(face.page(), Page::DistanceEntry);
        assert_eq!(screen.last(), "DS  0500yd");
    }

    #[test]
    fn test_zero_distance_shows_zero_correction() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        press(&mut face, &mut screen, FaceEvent::LightButtonDown);
        for _ in 0..5 {
            press(&mut face, &mut screen, FaceEvent::AlarmButtonUp);
        }
        press(&mut face, &mut screen, FaceEvent::AlarmLongPress);
        assert_eq!(screen.last(), "BA    0.00");
    }

    #[test]
    fn test_distance_past_trajectory_end_is_flagged() {
        // Slow, draggy load that turns down well short of 9999 yd
        let inputs = BallisticInputs {
            ballistic_coefficient: 0.05,
            drag_model: crate::DragModel::G1,
            muzzle_velocity_fps: 900.0,
            ..Default::default()
        };
        let mut face = BallisticsFace::new(inputs);
        let mut screen = Screen::default();
        // 0500 -> 9999: nine, four, nine and nine presses on the four digits
        for (digit, presses) in [9, 4, 9, 9].into_iter().enumerate() {
            for _ in 0..presses {
                press(&mut face, &mut screen, FaceEvent::AlarmButtonUp);
            }
            if digit < DIGITS - 1 {
                press(&mut face, &mut screen, FaceEvent::LightButtonDown);
            }
        }
        assert_eq!(screen.last(), "DS  9999yd");

        press(&mut face, &mut screen, FaceEvent::AlarmLongPress);
        assert_eq!(screen.last(), "BA   RANGE");
    }

    #[test]
    fn test_elevation_text_fits_display() {
        assert_eq!(elevation_text(4.93), "BA    4.93");
        assert_eq!(elevation_text(12.5), "BA   12.50");
        assert_eq!(elevation_text(1988.07), "BA 1988.07");
        assert_eq!(elevation_text(-5400.0), "BA-5400.00");
        assert_eq!(elevation_text(123_456.0).len(), DISPLAY_WIDTH);
    }

    #[test]
    fn test_invalid_load_shows_error() {
        let mut face = BallisticsFace::new(BallisticInputs { muzzle_velocity_fps: 0.0, ..Default::default() });
        let mut screen = Screen::default();
        press(&mut face, &mut screen, FaceEvent::AlarmLongPress);
        assert_eq!(screen.last(), "BA     ERR");

        face.set_inputs(BallisticInputs::default());
        press(&mut face, &mut screen, FaceEvent::Activate);
        assert_ne!(screen.last(), "BA     ERR");
    }

    #[test]
    fn test_passive_events_do_not_draw() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        for event in [FaceEvent::Tick, FaceEvent::LightButtonUp, FaceEvent::Timeout, FaceEvent::LowEnergyUpdate] {
            assert!(press(&mut face, &mut screen, event));
        }
        assert!(screen.shown.is_empty());
    }

    #[test]
    fn test_mode_events_go_to_fallback() {
        let mut face = BallisticsFace::default();
        let mut screen = Screen::default();
        let mut seen = Vec::new();
        let mut fallback = |event: FaceEvent| {
            seen.push(event);
            false
        };
        assert!(!face.handle_event(FaceEvent::ModeButtonUp, &mut screen, &mut fallback));
        assert!(!face.handle_event(FaceEvent::ModeLongPress, &mut screen, &mut fallback));
        assert_eq!(seen, vec![FaceEvent::ModeButtonUp, FaceEvent::ModeLongPress]);
        assert!(screen.shown.is_empty());
    }
}
