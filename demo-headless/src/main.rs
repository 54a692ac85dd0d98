use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use forest_fire_core::{
    ConfigError, ForestConfig, ForestState, ForestStats, GridDims, PercolationConfig,
    PercolationExperiment, PercolationSample, RiverShape, Wind, WindDirection,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Forest-fire cellular automaton, headless
#[derive(Parser, Debug)]
#[command(name = "forest-fire-demo")]
#[command(about = "Forest-fire cellular automaton demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one forest and report the counters
    Run(RunArgs),
    /// Sweep initial density and report how much of the forest burns
    Percolation(PercolationArgs),
}

/// Forest parameters; each flag overrides the config file
#[derive(ClapArgs, Debug)]
struct ForestArgs {
    /// JSON forest config to start from
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    nx: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    ny: Option<usize>,

    /// Initial fraction of cells holding a tree (0-1)
    #[arg(long)]
    tree_ratio: Option<f64>,

    /// Relative humidity (0-1)
    #[arg(long)]
    humidity: Option<f64>,

    /// Lightning probability per tree per step (0-1)
    #[arg(short, long)]
    lightning: Option<f64>,

    /// Growth probability per empty cell per step (0-1)
    #[arg(short = 'g', long)]
    new_growth: Option<f64>,

    /// Wind direction
    #[arg(short, long, value_enum)]
    wind: Option<WindArg>,

    /// Wind strength (0-3)
    #[arg(long)]
    wind_strength: Option<u8>,

    /// River shape (needs --water)
    #[arg(long, value_enum)]
    river: Option<RiverArg>,

    /// River width in cells
    #[arg(long)]
    river_width: Option<usize>,

    /// Number of lakes (needs --water)
    #[arg(long)]
    lakes: Option<usize>,

    /// Enable rivers and lakes
    #[arg(long)]
    water: bool,

    /// Enable tree aging
    #[arg(long)]
    aging: bool,

    /// Enable humidity rules
    #[arg(long)]
    humid: bool,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    #[command(flatten)]
    forest: ForestArgs,

    /// Number of steps to simulate
    #[arg(short = 'n', long, default_value_t = 200)]
    steps: u64,

    /// Report interval in steps
    #[arg(short, long, default_value_t = 10)]
    report_interval: u64,

    /// Stop as soon as nothing is burning
    #[arg(long)]
    until_out: bool,
}

#[derive(ClapArgs, Debug)]
struct PercolationArgs {
    #[command(flatten)]
    forest: ForestArgs,

    /// First density
    #[arg(long, default_value_t = 0.01)]
    start: f64,

    /// Last density (inclusive)
    #[arg(long, default_value_t = 0.99)]
    end: f64,

    /// Density increment
    #[arg(long, default_value_t = 0.01)]
    step: f64,

    /// Run trials on all cores
    #[arg(short, long)]
    parallel: bool,

    /// Print one JSON record per density
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WindArg {
    None,
    North,
    East,
    South,
    West,
}

impl From<WindArg> for WindDirection {
    fn from(arg: WindArg) -> Self {
        match arg {
            WindArg::None => WindDirection::None,
            WindArg::North => WindDirection::North,
            WindArg::East => WindDirection::East,
            WindArg::South => WindDirection::South,
            WindArg::West => WindDirection::West,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RiverArg {
    None,
    Line,
    Sine,
}

impl From<RiverArg> for RiverShape {
    fn from(arg: RiverArg) -> Self {
        match arg {
            RiverArg::None => RiverShape::None,
            RiverArg::Line => RiverShape::Line,
            RiverArg::Sine => RiverShape::Sine,
        }
    }
}

/// Errors surfaced by the demo
#[derive(Debug)]
enum DemoError {
    /// Failed to read the config file
    Io(PathBuf, std::io::Error),
    /// Failed to parse the config file or serialize output
    Json(serde_json::Error),
    /// Rejected parameters
    Config(ConfigError),
}

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemoError::Io(path, e) => write!(f, "Failed to read {}: {e}", path.display()),
            DemoError::Json(e) => write!(f, "Invalid JSON: {e}"),
            DemoError::Config(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for DemoError {}

impl From<serde_json::Error> for DemoError {
    fn from(e: serde_json::Error) -> Self {
        DemoError::Json(e)
    }
}

impl From<ConfigError> for DemoError {
    fn from(e: ConfigError) -> Self {
        DemoError::Config(e)
    }
}

fn load_config(path: &Path) -> Result<ForestConfig, DemoError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| DemoError::Io(path.to_path_buf(), e))?;
    Ok(serde_json::from_str(&contents)?)
}

impl ForestArgs {
    /// Config file (or defaults) with command-line overrides applied
    fn to_config(&self) -> Result<ForestConfig, DemoError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ForestConfig::default(),
        };

        if self.nx.is_some() || self.ny.is_some() {
            config.dims = GridDims::new(
                self.nx.unwrap_or(config.dims.nx),
                self.ny.unwrap_or(config.dims.ny),
            );
        }
        if let Some(ratio) = self.tree_ratio {
            config.tree_ratio = ratio;
        }
        if let Some(humidity) = self.humidity {
            config.humidity = humidity;
        }
        if let Some(lightning) = self.lightning {
            config.lightning = lightning;
        }
        if let Some(growth) = self.new_growth {
            config.new_growth = growth;
        }
        if let Some(direction) = self.wind {
            config.wind.direction = direction.into();
        }
        if let Some(strength) = self.wind_strength {
            config.wind.strength = strength;
        }
        if let Some(river) = self.river {
            config.river = river.into();
        }
        if let Some(width) = self.river_width {
            config.river_width = width;
        }
        if let Some(lakes) = self.lakes {
            config.lakes = lakes;
        }
        config.features.water |= self.water;
        config.features.aging |= self.aging;
        config.features.humidity |= self.humid;
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn report(step: u64, stats: ForestStats, land: usize) {
    println!(
        "[step {:>5}] trees: {:>6.0} ({:>5.1}%)  burning: {:>6.0} ({:>5.1}%)  empty: {:>6.0} ({:>5.1}%)",
        step,
        stats.tree_count,
        ForestStats::percent_of(stats.tree_count, land),
        stats.burnt_count,
        ForestStats::percent_of(stats.burnt_count, land),
        stats.empty_count,
        ForestStats::percent_of(stats.empty_count, land),
    );
}

fn run(args: &RunArgs) -> Result<(), DemoError> {
    let config = args.forest.to_config()?;
    println!("=== Forest Fire Simulation ===\n");
    println!(
        "Grid: {}x{}, tree ratio {:.0}%, features {:?}",
        config.dims.nx,
        config.dims.ny,
        config.tree_ratio * 100.0,
        config.features
    );
    println!(
        "Lightning: {}%, growth: {}%, humidity: {:.2}, wind: {} ({})",
        config.lightning * 100.0,
        config.new_growth * 100.0,
        config.humidity,
        config.wind.direction.label(),
        config.wind.strength
    );

    let mut forest = ForestState::new(config)?;
    let land = forest.dims().cell_count() - forest.water_cell_count();
    println!("Water cells: {}\n", forest.water_cell_count());
    report(0, forest.stats(), land);

    let interval = args.report_interval.max(1);
    for _ in 0..args.steps {
        forest.update();
        if forest.step_count() % interval == 0 {
            report(forest.step_count(), forest.stats(), land);
        }
        if args.until_out && forest.is_quiescent() {
            info!("Fire out after {} steps", forest.step_count());
            break;
        }
    }

    println!();
    report(forest.step_count(), forest.stats(), land);
    println!("Trees lost: {:.2}%", forest.percent_burnt());
    Ok(())
}

fn percolation(args: &PercolationArgs) -> Result<(), DemoError> {
    let config = PercolationConfig {
        start: args.start,
        end: args.end,
        step: args.step,
        seed: args.forest.seed.unwrap_or(0),
        base: args.forest.to_config()?,
    };
    let experiment = PercolationExperiment::new(config)?;

    let print = |sample: &PercolationSample| -> Result<(), DemoError> {
        if args.json {
            println!("{}", serde_json::to_string(sample)?);
        } else {
            println!(
                "For density {:.2}, {:.2}% of the trees have burnt",
                sample.density, sample.percent_burnt
            );
        }
        Ok(())
    };

    if args.parallel {
        for sample in experiment.run_parallel()? {
            print(&sample)?;
        }
    } else {
        for sample in experiment.run() {
            print(&sample?)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Run(args) => run(args),
        Command::Percolation(args) => percolation(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
