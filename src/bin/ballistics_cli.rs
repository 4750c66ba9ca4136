use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

use ballistics_dope::constants::moa_to_mil;
use ballistics_dope::{
    find_zero_angle_with_config, BallisticInputs, BallisticsFace, DragModel, FaceEvent, IntegrationMethod,
    Query, SegmentDisplay, Solution, SolverConfig, TrajectorySample, TrajectorySolver, ZeroConfig,
};

#[derive(Parser)]
#[command(name = "ballistics-cli")]
#[command(version)]
#[command(about = "Zero a rifle load and print elevation/windage corrections", long_about = None)]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,

    /// Use Euler integration instead of RK4
    #[arg(long, global = true)]
    euler: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Load and environment; each flag overrides the profile (or built-in default)
#[derive(Args)]
struct LoadArgs {
    /// JSON profile with any BallisticInputs fields
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Ballistic coefficient
    #[arg(short = 'b', long, global = true)]
    bc: Option<f64>,

    /// Drag model (g1, g7)
    #[arg(long, global = true)]
    drag_model: Option<DragModel>,

    /// Muzzle velocity (ft/s)
    #[arg(short = 'v', long, global = true)]
    velocity: Option<f64>,

    /// Sight height over bore (inches)
    #[arg(long, global = true, allow_hyphen_values = true)]
    sight_height: Option<f64>,

    /// Shooting angle, uphill positive (degrees)
    #[arg(short = 'a', long, global = true, allow_hyphen_values = true)]
    angle: Option<f64>,

    /// Zero distance (yards)
    #[arg(short = 'z', long, global = true)]
    zero: Option<f64>,

    /// Wind speed (mph)
    #[arg(long, global = true)]
    wind_speed: Option<f64>,

    /// Direction the wind blows from, clockwise, 0 = headwind, 90 = from the right (degrees)
    #[arg(long, global = true)]
    wind_angle: Option<f64>,

    /// Altitude (ft)
    #[arg(long, global = true, allow_hyphen_values = true)]
    altitude: Option<f64>,

    /// Sea-level barometric pressure (inHg)
    #[arg(long, global = true)]
    pressure: Option<f64>,

    /// Temperature (°F)
    #[arg(long, global = true, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Relative humidity (percentage 0-100)
    #[arg(long, global = true)]
    humidity: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the zero angle for the load
    Zero,

    /// Print a drop/windage table
    Table {
        /// Row spacing (yards)
        #[arg(short = 's', long, default_value = "100")]
        step: u32,

        /// Last row (yards)
        #[arg(short = 'm', long, default_value = "1000")]
        max_range: u32,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Print the correction at one distance
    Moa {
        /// Target distance (yards)
        #[arg(short = 'd', long)]
        distance: f64,
    },

    /// Drive the watch face with a sequence of button events
    Face {
        /// Comma separated events, e.g. activate,alarm,light,alarm-long
        #[arg(short = 'e', long, value_delimiter = ',', required = true)]
        events: Vec<EventArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventArg {
    Activate,
    Tick,
    Light,
    LightUp,
    Alarm,
    AlarmLong,
    Mode,
    ModeLong,
    Timeout,
    LowEnergy,
}

impl From<EventArg> for FaceEvent {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Activate => FaceEvent::Activate,
            EventArg::Tick => FaceEvent::Tick,
            EventArg::Light => FaceEvent::LightButtonDown,
            EventArg::LightUp => FaceEvent::LightButtonUp,
            EventArg::Alarm => FaceEvent::AlarmButtonUp,
            EventArg::AlarmLong => FaceEvent::AlarmLongPress,
            EventArg::Mode => FaceEvent::ModeButtonUp,
            EventArg::ModeLong => FaceEvent::ModeLongPress,
            EventArg::Timeout => FaceEvent::Timeout,
            EventArg::LowEnergy => FaceEvent::LowEnergyUpdate,
        }
    }
}

#[derive(Debug, Serialize)]
struct TableRow {
    #[serde(flatten)]
    sample: TrajectorySample,
    elevation_moa: f64,
    windage_moa: f64,
}

#[derive(Debug, Serialize)]
struct TableOutput<'a> {
    inputs: &'a BallisticInputs,
    zero_angle_deg: f64,
    termination: ballistics_dope::Termination,
    rows: Vec<TableRow>,
}

struct Stdout;

impl SegmentDisplay for Stdout {
    fn show(&mut self, text: &str) {
        println!("{text}");
    }
}

impl LoadArgs {
    fn to_inputs(&self) -> Result<BallisticInputs, Box<dyn Error>> {
        let mut inputs = match &self.profile {
            Some(path) => BallisticInputs::from_json_file(path)?,
            None => BallisticInputs::default(),
        };

        let overrides = [
            (self.bc, &mut inputs.ballistic_coefficient),
            (self.velocity, &mut inputs.muzzle_velocity_fps),
            (self.sight_height, &mut inputs.sight_height_inches),
            (self.angle, &mut inputs.shooting_angle_deg),
            (self.zero, &mut inputs.zero_distance_yards),
            (self.wind_speed, &mut inputs.wind_speed_mph),
            (self.wind_angle, &mut inputs.wind_angle_deg),
            (self.altitude, &mut inputs.atmosphere.altitude_ft),
            (self.pressure, &mut inputs.atmosphere.pressure_inhg),
            (self.temperature, &mut inputs.atmosphere.temperature_f),
            (self.humidity, &mut inputs.atmosphere.humidity_pct),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value;
            }
        }
        if let Some(drag_model) = self.drag_model {
            inputs.drag_model = drag_model;
        }

        inputs.validate()?;
        Ok(inputs)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let inputs = cli.load.to_inputs()?;

    let mut config = SolverConfig::default();
    if cli.euler {
        config.method = IntegrationMethod::Euler;
    }

    match cli.command {
        Commands::Zero => {
            let angle = zero_angle(&inputs, &config)?;
            println!("Zero angle at {} yd: {:.5} deg ({:.2} MOA)", inputs.zero_distance_yards, angle, angle * 60.0);
        }

        Commands::Table { step, max_range, output } => {
            if step == 0 {
                return Err("--step must be at least 1 yard".into());
            }
            config.max_range_yards = f64::from(max_range.max(1));
            let solution = zero_and_solve(&inputs, &config)?;
            display_table(&solution, step, max_range, output)?;
        }

        Commands::Moa { distance } => {
            config.max_range_yards = config.max_range_yards.max(distance);
            let solution = zero_and_solve(&inputs, &config)?;
            display_moa(&solution, distance)?;
        }

        Commands::Face { events } => {
            let mut face = BallisticsFace::new(inputs);
            let mut display = Stdout;
            let mut fallback = |event: FaceEvent| {
                println!("({event:?} passed to default handler)");
                true
            };
            for event in events {
                face.handle_event(event.into(), &mut display, &mut fallback);
            }
        }
    }

    Ok(())
}

fn zero_angle(inputs: &BallisticInputs, config: &SolverConfig) -> Result<f64, Box<dyn Error>> {
    Ok(find_zero_angle_with_config(inputs, 0.0, &ZeroConfig::default(), config)?)
}

fn zero_and_solve(inputs: &BallisticInputs, config: &SolverConfig) -> Result<Solution, Box<dyn Error>> {
    let angle = zero_angle(inputs, config)?;
    Ok(TrajectorySolver::new(*inputs, *config).solve(angle)?)
}

fn display_moa(solution: &Solution, distance: f64) -> Result<(), Box<dyn Error>> {
    let elevation = solution.moa_at(distance)?;
    let windage = solution.windage_moa_at(distance)?;
    let sample = solution.sample_at(distance)?.into_value();

    println!("Target distance:   {:>8.0} yd", distance);
    println!("Elevation:         {:>8.2} MOA ({:.2} mil)", elevation.value(), moa_to_mil(*elevation.value()));
    println!("Windage:           {:>8.2} MOA ({:.2} mil)", windage.value(), moa_to_mil(*windage.value()));
    println!("Drop:              {:>8.2} in", sample.drop_inches);
    println!("Velocity:          {:>8.0} ft/s", sample.velocity_fps);
    println!("Time of flight:    {:>8.3} s", sample.time_s);

    if let Query::ClampedRange { requested_yards, sampled_yards, .. } = elevation {
        println!(
            "Note: {requested_yards:.0} yd is outside the trajectory ({:?}); values shown for {sampled_yards:.0} yd",
            solution.termination()
        );
    }
    Ok(())
}

fn display_table(solution: &Solution, step: u32, max_range: u32, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let mut rows = Vec::new();
    for distance in (0..=max_range).step_by(step as usize) {
        let query = solution.sample_at(f64::from(distance))?;
        if query.is_clamped() {
            break;
        }
        let sample = query.into_value();
        rows.push(TableRow {
            elevation_moa: sample.correction_moa(),
            windage_moa: sample.windage_moa(),
            sample,
        });
    }

    match format {
        OutputFormat::Json => {
            let output = TableOutput {
                inputs: solution.inputs(),
                zero_angle_deg: solution.zero_angle_deg(),
                termination: solution.termination(),
                rows,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        OutputFormat::Csv => {
            println!("distance_yd,drop_in,elevation_moa,windage_in,windage_moa,velocity_fps,time_s");
            for row in &rows {
                println!(
                    "{:.0},{:.2},{:.2},{:.2},{:.2},{:.1},{:.4}",
                    row.sample.distance_yards,
                    row.sample.drop_inches,
                    row.elevation_moa,
                    row.sample.windage_inches,
                    row.windage_moa,
                    row.sample.velocity_fps,
                    row.sample.time_s
                );
            }
        }

        OutputFormat::Table => {
            println!("Zero angle: {:.5} deg", solution.zero_angle_deg());
            println!("{:>8} {:>9} {:>8} {:>9} {:>8} {:>8} {:>7}", "Range", "Drop", "Elev", "Wind", "W.Elev", "Vel", "Time");
            println!("{:>8} {:>9} {:>8} {:>9} {:>8} {:>8} {:>7}", "yd", "in", "MOA", "in", "MOA", "ft/s", "s");
            for row in &rows {
                println!(
                    "{:>8.0} {:>9.2} {:>8.2} {:>9.2} {:>8.2} {:>8.0} {:>7.3}",
                    row.sample.distance_yards,
                    row.sample.drop_inches,
                    row.elevation_moa,
                    row.sample.windage_inches,
                    row.windage_moa,
                    row.sample.velocity_fps,
                    row.sample.time_s
                );
            }
            if !solution.range_exhausted() {
                println!("Trajectory ended at {:.0} yd ({:?})", solution.max_distance_yards(), solution.termination());
            }
        }
    }

    Ok(())
}
