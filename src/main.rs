use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::debug;

use astro_panda::analysis::columns::{DISTANCE, EMITTED, OBSERVED, VELOCITY, Z};
use astro_panda::analysis::{simulate_first_row, Operation};
use astro_panda::config::Config;
use astro_panda::data::filter::RangeFilter;
use astro_panda::data::{loader, writer, CellValue, Column, Table};
use astro_panda::physics::{self, constants::SOLAR_MASS_KG};
use astro_panda::session::Session;

#[derive(Parser)]
#[command(name = "astro-panda")]
#[command(version)]
#[command(about = "Educational astronomy calculator and table analyzer", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the Hubble constant (km/s/Mpc)
    #[arg(long, global = true)]
    h0: Option<f64>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Single-value calculators
    Calc {
        #[command(subcommand)]
        calc: Calc,
    },
    /// Show columns, first rows and statistics of a data file
    Inspect {
        file: PathBuf,
        /// Rows to show
        #[arg(long)]
        rows: Option<usize>,
    },
    /// Apply one calculation over every row of a data file
    Apply {
        file: PathBuf,
        op: OpKind,
        #[command(flatten)]
        columns: ColumnArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply every calculation whose input columns are present
    Analyze {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Propagate the orbit of the first row of a NEO elements table
    Orbit {
        file: PathBuf,
        /// Days into the future
        #[arg(long, default_value_t = 365.0)]
        days: f64,
        /// Write the sampled trajectory to this CSV file
        #[arg(long, value_name = "FILE")]
        trajectory: Option<PathBuf>,
    },
    /// List loadable .csv/.dat files in the data directory
    Datasets {
        /// Directory to scan (defaults to the configured data_dir)
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum Calc {
    /// H0 = v / d
    Hubble {
        /// Recession velocity, km/s
        #[arg(long, allow_negative_numbers = true)]
        velocity: f64,
        /// Distance, Mpc
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,
    },
    /// z = (observed - emitted) / emitted
    Redshift {
        #[arg(long)]
        observed: f64,
        #[arg(long)]
        emitted: f64,
    },
    /// ω = v / r, or ω = 2π / T with --period
    Angular {
        /// Linear velocity
        #[arg(long, allow_negative_numbers = true, required_unless_present = "period")]
        velocity: Option<f64>,
        /// Orbital period, s
        #[arg(long, conflicts_with = "velocity")]
        period: Option<f64>,
        /// Radius, in the length unit of the velocity
        #[arg(long)]
        radius: f64,
    },
    /// Circular orbital velocity and period around a central mass
    Orbit {
        /// Central mass, kg
        #[arg(long, default_value_t = SOLAR_MASS_KG)]
        mass: f64,
        /// Orbital radius / semi-major axis, m
        #[arg(long)]
        radius: f64,
        #[arg(long, default_value_t = 0.0)]
        eccentricity: f64,
    },
    /// d = c z / H0
    Distance {
        #[arg(long, allow_negative_numbers = true)]
        z: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OpKind {
    Hubble,
    Redshift,
    Distance,
    Analyze,
    Cosmology,
    Orbital,
    Exoplanets,
    Photometry,
    Cartesian,
}

#[derive(Args)]
struct ColumnArgs {
    #[arg(long, default_value = VELOCITY)]
    velocity_col: String,
    #[arg(long, default_value = DISTANCE)]
    distance_col: String,
    #[arg(long, default_value = OBSERVED)]
    observed_col: String,
    #[arg(long, default_value = EMITTED)]
    emitted_col: String,
    #[arg(long, default_value = Z)]
    redshift_col: String,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep rows whose `z` is at least this value
    #[arg(long, allow_negative_numbers = true)]
    z_min: Option<f64>,
    /// Keep rows whose `z` is at most this value
    #[arg(long, allow_negative_numbers = true)]
    z_max: Option<f64>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write the result to this CSV file
    #[arg(short, long, value_name = "FILE", conflicts_with = "export_dir")]
    output: Option<PathBuf>,
    /// Write the result under this directory with a timestamped name
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,
}

impl OpKind {
    fn into_operation(self, cols: ColumnArgs) -> Operation {
        match self {
            OpKind::Hubble => Operation::Hubble {
                velocity: cols.velocity_col,
                distance: cols.distance_col,
            },
            OpKind::Redshift => Operation::Redshift {
                observed: cols.observed_col,
                emitted: cols.emitted_col,
            },
            OpKind::Distance => Operation::HubbleDistance {
                redshift: cols.redshift_col,
            },
            OpKind::Analyze => Operation::Analyze,
            OpKind::Cosmology => Operation::Cosmology,
            OpKind::Orbital => Operation::Orbital,
            OpKind::Exoplanets => Operation::Exoplanets,
            OpKind::Photometry => Operation::Photometry,
            OpKind::Cartesian => Operation::Cartesian,
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(h0) = cli.h0 {
        config.hubble_constant = h0;
        config.validate()?;
    }
    debug!("{config:?}");

    match cli.command {
        Commands::Calc { calc } => run_calc(calc, &config),
        Commands::Inspect { file, rows } => {
            if let Some(rows) = rows {
                config.head_rows = rows;
            }
            let mut session = Session::new(config);
            session.load(&file)?;
            println!("{}", session.render_summary()?);
            Ok(())
        }
        Commands::Apply {
            file,
            op,
            columns,
            filter,
            output,
        } => run_operation(config, &file, op.into_operation(columns), filter, output),
        Commands::Analyze {
            file,
            filter,
            output,
        } => run_operation(config, &file, Operation::Analyze, filter, output),
        Commands::Orbit {
            file,
            days,
            trajectory,
        } => run_orbit(&file, days, trajectory.as_deref()),
        Commands::Datasets { dir } => {
            let dir = dir.unwrap_or_else(|| config.data_dir.clone());
            let found = loader::list_datasets(&dir)?;
            if found.is_empty() {
                println!("No .csv or .dat files in {}", dir.display());
            }
            for (i, path) in found.iter().enumerate() {
                println!("  {}. {}", i + 1, path.display());
            }
            Ok(())
        }
    }
}

fn run_calc(calc: Calc, config: &Config) -> Result<()> {
    match calc {
        Calc::Hubble { velocity, distance } => {
            let h0 = physics::hubble_constant(velocity, distance)?;
            println!("H0 = {h0:.2} km/s/Mpc");
        }
        Calc::Redshift { observed, emitted } => {
            let z = physics::redshift(observed, emitted)?;
            println!("z = {z:.6}");
            println!("v ≈ cz = {:.2} km/s", physics::recession_velocity(z));
        }
        Calc::Angular {
            velocity,
            period,
            radius,
        } => match (velocity, period) {
            (_, Some(period)) => {
                let m = physics::angular_velocity_from_period(period, radius)?;
                println!("ω = {:.6e} rad/s", m.angular_velocity);
                println!("v = {:.6e} per s", m.linear_velocity);
            }
            (Some(velocity), None) => {
                let omega = physics::angular_velocity(velocity, radius)?;
                println!("ω = {omega:.6e} rad/s");
            }
            (None, None) => anyhow::bail!("either --velocity or --period is required"),
        },
        Calc::Orbit {
            mass,
            radius,
            eccentricity,
        } => {
            let o = physics::orbit(mass, radius, eccentricity)?;
            println!("orbital velocity = {:.3} km/s", o.velocity / 1000.0);
            println!("period = {:.4} years ({:.2} hours)", o.period_years, o.period / 3600.0);
            println!("perihelion = {:.4} AU", physics::m_to_au(o.perihelion));
            println!("aphelion = {:.4} AU", physics::m_to_au(o.aphelion));
        }
        Calc::Distance { z } => {
            let d = physics::hubble_distance_with(z, config.hubble_constant)?;
            println!("v = {:.2} km/s", physics::recession_velocity(z));
            println!("d = {d:.2} Mpc ({:.3e} light years)", physics::mpc_to_light_years(d));
            println!("H0 used: {} km/s/Mpc", config.hubble_constant);
        }
    }
    Ok(())
}

fn run_operation(
    mut config: Config,
    file: &Path,
    op: Operation,
    filter: FilterArgs,
    output: OutputArgs,
) -> Result<()> {
    let head_rows = config.head_rows;
    let export = output.export_dir.is_some();
    if let Some(dir) = output.export_dir {
        config.export_dir = dir;
    }
    let mut session = Session::new(config);
    session.load(file)?;

    if filter.z_min.is_some() || filter.z_max.is_some() {
        let kept = session.filter(&[RangeFilter::new(Z, filter.z_min, filter.z_max)])?;
        println!("{kept} rows within the z range");
    }

    let report = session.apply(&op)?;
    print!("{report}");

    if let Some(table) = session.table() {
        println!("{}", astro_panda::display::render_table(table, head_rows)?);
    }

    if let Some(path) = output.output {
        session.save(&path)?;
        println!("Saved {}", path.display());
    } else if export {
        let path = session.export()?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn run_orbit(file: &Path, days: f64, trajectory: Option<&Path>) -> Result<()> {
    let table = loader::load_file(file)?;
    let sim = simulate_first_row(&table, days)?;
    let [x, y, z] = sim.future;
    println!("{} after {} days", sim.object, sim.days);
    println!("  position (AU): x = {x:.6}, y = {y:.6}, z = {z:.6}");
    println!(
        "  heliocentric distance: {:.6} AU",
        (x * x + y * y + z * z).sqrt()
    );

    if let Some(path) = trajectory {
        let axis = |i: usize| -> Vec<CellValue> {
            sim.trajectory.iter().map(|p| CellValue::Float(p[i])).collect()
        };
        let points = Table::from_columns(vec![
            Column::derived("x_au", axis(0)),
            Column::derived("y_au", axis(1)),
            Column::derived("z_au", axis(2)),
        ])
        .context("building trajectory table")?;
        writer::save_csv(&points, path)?;
        println!("Trajectory written to {}", path.display());
    }
    Ok(())
}
