//! mimo-sim: run the SVD-precoded MIMO link over a test schedule.
//!
//! ```text
//! mimo-sim --message "Hello MIMO"                      # default 36-test sweep
//! mimo-sim --input payload.bin --mode custom --tests 4 --nr 8 --nt 4 --noise 2
//! mimo-sim --config mimo.yaml --seed 42 --no-files
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mimo_core::config::{MimoConfig, ScheduleMode};
use mimo_core::observe::{init_logging, LogLevel};
use mimo_sim::{SimError, SimResult, Simulation, SimulationSummary};

#[derive(Parser, Debug)]
#[command(name = "mimo-sim", version, about = "SVD-precoded MIMO link simulator")]
struct Args {
    /// Message to transmit
    #[arg(long, conflicts_with = "input")]
    message: Option<String>,

    /// File whose bytes are transmitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Configuration file (otherwise the default search path is used)
    #[arg(long, env = "MIMO_CONFIG")]
    config: Option<PathBuf>,

    /// Test schedule: default or custom
    #[arg(long)]
    mode: Option<ScheduleMode>,

    /// Number of tests (1-61)
    #[arg(long)]
    tests: Option<usize>,

    /// Receive antennas (custom mode)
    #[arg(long)]
    nr: Option<usize>,

    /// Transmit antennas (custom mode)
    #[arg(long)]
    nt: Option<usize>,

    /// Noise level selector 0-3 (custom mode)
    #[arg(long)]
    noise: Option<u8>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for recovered payload files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// CSV summary file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Do not write recovered payload files
    #[arg(long)]
    no_files: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<LogLevel>,
}

impl Args {
    fn apply(&self, config: &mut MimoConfig) {
        if let Some(mode) = self.mode {
            config.schedule.mode = mode;
        }
        // antenna overrides imply a custom schedule
        if self.nr.is_some() || self.nt.is_some() || self.noise.is_some() {
            config.schedule.mode = self.mode.unwrap_or(ScheduleMode::Custom);
        }
        if let Some(tests) = self.tests {
            config.schedule.tests = tests;
        }
        if let Some(nr) = self.nr {
            config.schedule.nr = nr;
        }
        if let Some(nt) = self.nt {
            config.schedule.nt = nt;
        }
        if let Some(noise) = self.noise {
            config.schedule.noise_level = noise;
        }
        if self.seed.is_some() {
            config.link.seed = self.seed;
        }
        if let Some(ref dir) = self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(ref csv) = self.csv {
            config.output.csv = csv.clone();
        }
        if self.no_files {
            config.output.write_files = false;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }

    fn payload(&self) -> SimResult<Vec<u8>> {
        match (&self.message, &self.input) {
            (Some(message), _) => Ok(message.as_bytes().to_vec()),
            (None, Some(path)) => std::fs::read(path).map_err(|e| SimError::Io {
                path: path.clone(),
                source: e,
            }),
            (None, None) => Err(SimError::NoPayload),
        }
    }
}

fn load_config(args: &Args) -> SimResult<MimoConfig> {
    let mut config = match args.config {
        Some(ref path) => MimoConfig::load_from(path)?,
        None => MimoConfig::load()?,
    };
    args.apply(&mut config);
    Ok(config)
}

fn print_summary(summary: &SimulationSummary) {
    for report in &summary.reports {
        let case = &report.case;
        println!(
            "================== Test {} (Nr={}, Nt={}, noise={}) ==================",
            case.test, case.nr, case.nt, case.noise_level
        );
        println!("{}", report.statistics);
    }
    for (case, reason) in &summary.failures {
        println!("Test {} (Nr={}, Nt={}) failed: {}", case.test, case.nr, case.nt, reason);
    }
    println!(
        "\n{} test(s) completed, {} failed",
        summary.completed(),
        summary.failed()
    );
}

fn run(args: &Args) -> SimResult<SimulationSummary> {
    let config = load_config(args)?;
    init_logging(&config.logging);

    let payload = args.payload()?;
    let simulation = Simulation::new(config)?;
    simulation.run(&payload)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
