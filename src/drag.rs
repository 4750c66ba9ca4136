//! Drag coefficient lookup against the standard G1 and G7 reference tables
use once_cell::sync::Lazy;

use crate::constants::{CD_TO_RETARD, MIN_DIVISION_THRESHOLD, MIN_DRAG_COEFFICIENT};
use crate::DragModel;

/// Drag table data structure
#[derive(Debug, Clone)]
pub struct DragTable {
    pub mach_values: Vec<f64>,
    pub cd_values: Vec<f64>,
}

impl DragTable {
    /// Create a new drag table from mach and cd arrays
    pub fn new(mach_values: Vec<f64>, cd_values: Vec<f64>) -> Self {
        Self { mach_values, cd_values }
    }

    /// Build a table from (mach, cd) pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        let (mach_values, cd_values) = pairs.iter().copied().unzip();
        Self::new(mach_values, cd_values)
    }

    /// Interpolate drag coefficient for given Mach number
    ///
    /// Catmull-Rom on interior segments, linear on the first and last
    /// segment, linear extrapolation outside the table. Never below
    /// [`MIN_DRAG_COEFFICIENT`].
    pub fn interpolate(&self, mach: f64) -> f64 {
        let n = self.mach_values.len();

        if n == 0 {
            return MIN_DRAG_COEFFICIENT;
        }

        if n == 1 {
            return self.cd_values[0];
        }

        if mach <= self.mach_values[0] {
            return self.linear_interpolate(mach, 0).max(MIN_DRAG_COEFFICIENT);
        }

        if mach >= self.mach_values[n - 1] {
            return self.linear_interpolate(mach, n - 2).max(MIN_DRAG_COEFFICIENT);
        }

        // First index whose Mach exceeds the query; the segment starts one before it
        let idx = self.mach_values.partition_point(|&m| m <= mach).saturating_sub(1);

        let cd = if idx > 0 && idx < n - 2 {
            self.cubic_interpolate(mach, idx)
        } else {
            self.linear_interpolate(mach, idx)
        };
        cd.max(MIN_DRAG_COEFFICIENT)
    }

    /// Linear interpolation (or extrapolation) along segment `idx..idx+1`
    pub fn linear_interpolate(&self, mach: f64, idx: usize) -> f64 {
        if idx + 1 >= self.mach_values.len() {
            return self.cd_values.get(idx).copied().unwrap_or(MIN_DRAG_COEFFICIENT);
        }

        let x0 = self.mach_values[idx];
        let x1 = self.mach_values[idx + 1];
        let y0 = self.cd_values[idx];
        let y1 = self.cd_values[idx + 1];

        if (x1 - x0).abs() < MIN_DIVISION_THRESHOLD {
            return y0;
        }

        let t = (mach - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    /// Catmull-Rom interpolation using points idx-1 ..= idx+2
    pub fn cubic_interpolate(&self, mach: f64, idx: usize) -> f64 {
        if idx == 0 || idx + 2 >= self.mach_values.len() {
            return self.linear_interpolate(mach, idx);
        }

        let y = [
            self.cd_values[idx - 1],
            self.cd_values[idx],
            self.cd_values[idx + 1],
            self.cd_values[idx + 2],
        ];

        let denominator = self.mach_values[idx + 1] - self.mach_values[idx];
        if denominator.abs() < MIN_DIVISION_THRESHOLD {
            return y[1];
        }
        let t = (mach - self.mach_values[idx]) / denominator;
        let t2 = t * t;
        let t3 = t2 * t;

        let a0 = -0.5 * y[0] + 1.5 * y[1] - 1.5 * y[2] + 0.5 * y[3];
        let a1 = y[0] - 2.5 * y[1] + 2.0 * y[2] - 0.5 * y[3];
        let a2 = -0.5 * y[0] + 0.5 * y[2];
        let a3 = y[1];

        a0 * t3 + a1 * t2 + a2 * t + a3
    }
}

const G1_TABLE: [(f64, f64); 79] = [
    (0.000, 0.2629), (0.050, 0.2558), (0.100, 0.2487), (0.150, 0.2413),
    (0.200, 0.2344), (0.250, 0.2278), (0.300, 0.2214), (0.350, 0.2155),
    (0.400, 0.2104), (0.450, 0.2061), (0.500, 0.2032), (0.550, 0.2020),
    (0.600, 0.2034), (0.700, 0.2165), (0.725, 0.2230), (0.750, 0.2313),
    (0.775, 0.2417), (0.800, 0.2546), (0.825, 0.2706), (0.850, 0.2901),
    (0.875, 0.3136), (0.900, 0.3415), (0.925, 0.3734), (0.950, 0.4084),
    (0.975, 0.4448), (1.000, 0.4805), (1.025, 0.5136), (1.050, 0.5427),
    (1.075, 0.5677), (1.100, 0.5883), (1.125, 0.6053), (1.150, 0.6191),
    (1.200, 0.6393), (1.250, 0.6518), (1.300, 0.6589), (1.350, 0.6621),
    (1.400, 0.6625), (1.450, 0.6607), (1.500, 0.6573), (1.550, 0.6528),
    (1.600, 0.6474), (1.650, 0.6413), (1.700, 0.6347), (1.750, 0.6280),
    (1.800, 0.6210), (1.850, 0.6141), (1.900, 0.6072), (1.950, 0.6003),
    (2.000, 0.5934), (2.050, 0.5867), (2.100, 0.5804), (2.150, 0.5743),
    (2.200, 0.5685), (2.250, 0.5630), (2.300, 0.5577), (2.350, 0.5527),
    (2.400, 0.5481), (2.450, 0.5438), (2.500, 0.5397), (2.600, 0.5325),
    (2.700, 0.5264), (2.800, 0.5211), (2.900, 0.5168), (3.000, 0.5133),
    (3.100, 0.5105), (3.200, 0.5084), (3.300, 0.5067), (3.400, 0.5054),
    (3.500, 0.5040), (3.600, 0.5030), (3.700, 0.5022), (3.800, 0.5016),
    (3.900, 0.5010), (4.000, 0.5006), (4.200, 0.4998), (4.400, 0.4995),
    (4.600, 0.4992), (4.800, 0.4990), (5.000, 0.4988),
];

const G7_TABLE: [(f64, f64); 84] = [
    (0.000, 0.1198), (0.050, 0.1197), (0.100, 0.1196), (0.150, 0.1194),
    (0.200, 0.1193), (0.250, 0.1194), (0.300, 0.1194), (0.350, 0.1194),
    (0.400, 0.1193), (0.450, 0.1193), (0.500, 0.1194), (0.550, 0.1193),
    (0.600, 0.1194), (0.650, 0.1197), (0.700, 0.1202), (0.725, 0.1207),
    (0.750, 0.1215), (0.775, 0.1226), (0.800, 0.1242), (0.825, 0.1266),
    (0.850, 0.1306), (0.875, 0.1368), (0.900, 0.1464), (0.925, 0.1660),
    (0.950, 0.2054), (0.975, 0.2993), (1.000, 0.3803), (1.025, 0.4015),
    (1.050, 0.4043), (1.075, 0.4034), (1.100, 0.4014), (1.125, 0.3987),
    (1.150, 0.3955), (1.200, 0.3884), (1.250, 0.3810), (1.300, 0.3732),
    (1.350, 0.3657), (1.400, 0.3580), (1.500, 0.3440), (1.550, 0.3376),
    (1.600, 0.3315), (1.650, 0.3260), (1.700, 0.3209), (1.750, 0.3160),
    (1.800, 0.3117), (1.850, 0.3078), (1.900, 0.3042), (1.950, 0.3010),
    (2.000, 0.2980), (2.050, 0.2951), (2.100, 0.2922), (2.150, 0.2892),
    (2.200, 0.2864), (2.250, 0.2835), (2.300, 0.2807), (2.350, 0.2779),
    (2.400, 0.2752), (2.450, 0.2725), (2.500, 0.2697), (2.550, 0.2670),
    (2.600, 0.2643), (2.650, 0.2615), (2.700, 0.2588), (2.750, 0.2561),
    (2.800, 0.2533), (2.850, 0.2506), (2.900, 0.2479), (2.950, 0.2451),
    (3.000, 0.2424), (3.100, 0.2368), (3.200, 0.2313), (3.300, 0.2258),
    (3.400, 0.2205), (3.500, 0.2154), (3.600, 0.2106), (3.700, 0.2060),
    (3.800, 0.2017), (3.900, 0.1975), (4.000, 0.1935), (4.200, 0.1861),
    (4.400, 0.1793), (4.600, 0.1730), (4.800, 0.1672), (5.000, 0.1618),
];

static G1_DRAG_TABLE: Lazy<DragTable> = Lazy::new(|| DragTable::from_pairs(&G1_TABLE));

static G7_DRAG_TABLE: Lazy<DragTable> = Lazy::new(|| DragTable::from_pairs(&G7_TABLE));

/// Reference table backing a drag model
pub fn drag_table(drag_model: DragModel) -> &'static DragTable {
    match drag_model {
        DragModel::G1 => &G1_DRAG_TABLE,
        DragModel::G7 => &G7_DRAG_TABLE,
    }
}

/// Get drag coefficient for given Mach number and drag model
pub fn get_drag_coefficient(mach: f64, drag_model: DragModel) -> f64 {
    drag_table(drag_model).interpolate(mach)
}

/// Deceleration (ft/s²) of a projectile moving at `velocity_fps` through air
///
/// `density_ratio` is local air density over standard density and
/// `speed_of_sound_fps` sets the Mach number used for the table lookup.
pub fn retardation(
    drag_model: DragModel,
    bc: f64,
    velocity_fps: f64,
    density_ratio: f64,
    speed_of_sound_fps: f64,
) -> f64 {
    let mach = velocity_fps / speed_of_sound_fps;
    let cd = get_drag_coefficient(mach, drag_model);
    CD_TO_RETARD * density_ratio * cd * velocity_fps * velocity_fps / bc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPEED_OF_SOUND_FPS;
    use approx::assert_relative_eq;

    #[test]
    fn test_tables_are_strictly_increasing_in_mach() {
        for model in DragModel::ALL {
            let table = drag_table(model);
            assert_eq!(table.mach_values.len(), table.cd_values.len());
            for pair in table.mach_values.windows(2) {
                assert!(pair[1] > pair[0], "{model} table not sorted at Mach {}", pair[0]);
            }
        }
    }

    #[test]
    fn test_known_drag_values() {
        assert_relative_eq!(get_drag_coefficient(1.0, DragModel::G1), 0.4805, epsilon = 1e-9);
        assert_relative_eq!(get_drag_coefficient(1.0, DragModel::G7), 0.3803, epsilon = 1e-9);
        assert!(get_drag_coefficient(1.0, DragModel::G1) > get_drag_coefficient(1.0, DragModel::G7));
    }

    #[test]
    fn test_g1_peak_in_transonic_region() {
        let mach_values: Vec<f64> = (8..20).map(|i| i as f64 * 0.1).collect();
        let (peak_mach, peak_cd) = mach_values
            .iter()
            .map(|&m| (m, get_drag_coefficient(m, DragModel::G1)))
            .fold((0.0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        assert!(peak_mach > 1.0 && peak_mach < 1.6, "G1 peak at Mach {peak_mach}");
        assert!(peak_cd > 0.5 && peak_cd < 1.0, "G1 peak value: {peak_cd}");
    }

    #[test]
    fn test_drag_coefficient_continuity() {
        for model in DragModel::ALL {
            for mach in [0.5, 0.8, 1.2, 1.5, 2.0, 3.0] {
                let before = get_drag_coefficient(mach - 0.005, model);
                let after = get_drag_coefficient(mach + 0.005, model);
                assert!((after - before).abs() < 0.02, "{model} jump at Mach {mach}: {before} vs {after}");
            }
        }
    }

    #[test]
    fn test_physical_constraints() {
        for &mach in &[0.0, 0.1, 0.5, 0.8, 1.0, 1.2, 1.5, 2.0, 3.0, 5.0, 10.0] {
            for model in DragModel::ALL {
                let cd = get_drag_coefficient(mach, model);
                assert!(cd >= MIN_DRAG_COEFFICIENT, "{model} CD too low at Mach {mach}: {cd}");
                assert!(cd < 1.0, "{model} CD too high at Mach {mach}: {cd}");
            }
        }
    }

    #[test]
    fn test_drag_table_empty_and_single_point() {
        assert_eq!(DragTable::new(vec![], vec![]).interpolate(1.0), MIN_DRAG_COEFFICIENT);

        let single = DragTable::new(vec![1.0], vec![0.4]);
        assert_eq!(single.interpolate(0.5), 0.4);
        assert_eq!(single.interpolate(2.0), 0.4);
    }

    #[test]
    fn test_drag_table_two_points() {
        let table = DragTable::new(vec![1.0, 2.0], vec![0.4, 0.6]);

        assert_relative_eq!(table.interpolate(1.0), 0.4, epsilon = 1e-10);
        assert_relative_eq!(table.interpolate(2.0), 0.6, epsilon = 1e-10);
        assert_relative_eq!(table.interpolate(1.5), 0.5, epsilon = 1e-10);

        // Extrapolation follows the end segments but never goes below the floor
        assert_relative_eq!(table.interpolate(3.0), 0.8, epsilon = 1e-10);
        assert_eq!(table.interpolate(-10.0), MIN_DRAG_COEFFICIENT);
    }

    #[test]
    fn test_cubic_interpolation_hits_knots() {
        let table = DragTable::new(vec![0.5, 1.0, 1.5, 2.0, 2.5], vec![0.2, 0.4, 0.6, 0.5, 0.3]);

        assert_relative_eq!(table.cubic_interpolate(1.0, 1), 0.4, epsilon = 1e-12);
        assert_relative_eq!(table.cubic_interpolate(1.5, 1), 0.6, epsilon = 1e-12);

        let mid = table.cubic_interpolate(1.25, 1);
        assert!(mid > 0.4 && mid < 0.7);
        assert!((mid - table.linear_interpolate(1.25, 1)).abs() < 0.2);
    }

    #[test]
    fn test_retardation_scales_with_bc_and_density() {
        let base = retardation(DragModel::G7, 0.4, 2800.0, 1.0, SPEED_OF_SOUND_FPS);
        assert!(base > 0.0);

        let doubled_bc = retardation(DragModel::G7, 0.8, 2800.0, 1.0, SPEED_OF_SOUND_FPS);
        assert_relative_eq!(doubled_bc, base / 2.0, epsilon = 1e-9);

        let thin_air = retardation(DragModel::G7, 0.4, 2800.0, 0.8, SPEED_OF_SOUND_FPS);
        assert_relative_eq!(thin_air, base * 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_retardation_magnitude() {
        // A .308 G7 0.243 bullet at 2700 ft/s decelerates by a few hundred ft/s²
        let decel = retardation(DragModel::G7, 0.243, 2700.0, 1.0, SPEED_OF_SOUND_FPS);
        assert!(decel > 300.0 && decel < 2000.0, "deceleration {decel}");
    }
}
