//! ATTITUDE: a modelling tool for ranking quaternion orientation integration methods.
//!
//! The program drives the error-analysis harness of the `attitude` library against a harmonic
//! artificial input and prints the maximum deviation from the exact solution for each method and
//! step. Scenario parameters come either from command-line flags or from a configuration file
//! (TOML/JSON/YAML).
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;

use attitude::algorithm::Algorithm;
use attitude::config::ScenarioConfig;
use attitude::methods::Method;

const LONG_ABOUT: &str = "ATTITUDE: a modelling tool for quaternion orientation integration methods.

Each method integrates the orientation kinematics of a body whose heading, pitch and roll oscillate
harmonically. The computed trajectory is compared against the closed-form orientation on the same
time grid and the maximum difference is reported. Repeating a run with decreasing steps exposes the
accuracy order of the method.

The scenario (amplitudes, frequencies, phase shifts, last time, steps and methods) defaults to the
reference study and can be loaded from a configuration file (TOML/JSON/YAML). Use the `config`
command to write a template.";

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about = "A modelling tool for quaternion orientation integration methods.", long_about = LONG_ABOUT)]
struct Cli {
    /// Scenario configuration file (TOML/JSON/YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log file path (if not specified, logs to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Clone)]
enum Command {
    #[command(
        name = "run",
        about = "Model one method",
        long_about = "Model one integration method for each requested step and print the maximum difference from the exact solution. With --output, the computed and exact trajectories of every run are written as CSV files."
    )]
    Run(RunArgs),
    #[command(
        name = "compare",
        about = "Compare every configured method",
        long_about = "Run a convergence study for every method of the scenario over every step of the scenario and print the maximum differences with the observed accuracy order."
    )]
    Compare(CompareArgs),
    #[command(name = "config", about = "Write a template scenario configuration file")]
    Config(ConfigArgs),
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
    /// Integration method
    #[arg(short, long, value_enum)]
    method: Method,
    /// Output steps in seconds (repeatable); the scenario steps are used when omitted
    #[arg(short, long)]
    step: Vec<f64>,
    /// Last modelling time in seconds; overrides the scenario
    #[arg(long)]
    last_time: Option<f64>,
    /// Directory for the CSV output of every run
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct CompareArgs {
    /// CSV file for the comparison table
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct ConfigArgs {
    /// Path of the configuration file to write (.toml/.json/.yaml)
    #[arg(short, long, default_value = "scenario.toml")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct ComparisonRecord {
    method: Method,
    step: f64,
    max_difference: f64,
    observed_order: Option<f64>,
}

/// Initialize the logger with a timestamped format, optionally appending to a file.
fn init_logger(log_level: &str, log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    use std::io::Write;

    let level = log_level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
        log::LevelFilter::Info
    });

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let target = Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.try_init()?;
    Ok(())
}

fn load_scenario(path: Option<&PathBuf>) -> Result<ScenarioConfig, Box<dyn Error>> {
    let scenario = match path {
        Some(path) => {
            info!("Loading scenario from {}", path.display());
            ScenarioConfig::from_file(path)?
        }
        None => ScenarioConfig::default(),
    };
    Ok(scenario)
}

fn run_method(mut scenario: ScenarioConfig, args: &RunArgs) -> Result<(), Box<dyn Error>> {
    if !args.step.is_empty() {
        scenario.steps = args.step.clone();
    }
    if let Some(last_time) = args.last_time {
        scenario.last_time = last_time;
    }
    scenario.methods = vec![args.method];
    let modelling = scenario.modelling()?;
    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)?;
    }

    let mut algorithm = args.method.algorithm();
    algorithm.set_last_time(scenario.last_time);
    println!("{}", algorithm.title());
    for &step in &scenario.steps {
        algorithm.set_step(step);
        let result = modelling.run(algorithm.as_mut())?;
        println!("  step {:<10} max difference {:.6e}", step, result.max_difference());
        if let Some(dir) = &args.output {
            let path = dir.join(format!("{}_{}.csv", method_name(args.method), step));
            result.to_csv(&path)?;
            info!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn compare_methods(scenario: ScenarioConfig, args: &CompareArgs) -> Result<(), Box<dyn Error>> {
    let modelling = scenario.modelling()?;
    let mut records: Vec<ComparisonRecord> = Vec::new();
    for &method in &scenario.methods {
        let mut algorithm = method.algorithm();
        algorithm.set_last_time(scenario.last_time);
        println!("{}", algorithm.title());
        for point in modelling.convergence_study(algorithm.as_mut(), &scenario.steps)? {
            match point.observed_order {
                Some(order) => println!(
                    "  step {:<10} max difference {:.6e}  order {:.2}",
                    point.step, point.max_difference, order
                ),
                None => println!("  step {:<10} max difference {:.6e}", point.step, point.max_difference),
            }
            records.push(ComparisonRecord {
                method,
                step: point.step,
                max_difference: point.max_difference,
                observed_order: point.observed_order,
            });
        }
    }
    if let Some(path) = &args.output {
        write_comparison(&records, path)?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn write_comparison(records: &[ComparisonRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn method_name(method: Method) -> String {
    clap::ValueEnum::to_possible_value(&method)
        .map(|value| value.get_name().to_string())
        .unwrap_or_else(|| format!("{method:?}"))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(&cli.log_level, cli.log_file.as_ref())?;

    match cli.command {
        Command::Run(args) => run_method(load_scenario(cli.config.as_ref())?, &args),
        Command::Compare(args) => compare_methods(load_scenario(cli.config.as_ref())?, &args),
        Command::Config(args) => {
            load_scenario(cli.config.as_ref())?.to_file(&args.output)?;
            println!("Wrote scenario template to {}", args.output.display());
            Ok(())
        }
    }
}
