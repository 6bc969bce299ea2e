//! # MIMO Link Simulator
//!
//! Runs the SVD-precoded link of `mimo-core` over a schedule of antenna
//! configurations and noise levels, one test per entry:
//!
//! ```text
//! payload ──► Schedule ──► Simulation ──► Runner (per test) ──► Report
//!                                             │                 ├─ Test_<t>_Nr<nr>_Nt<nt>_Rd<r>
//!                                             ▼                 └─ output.csv
//!                                         MimoLink
//! ```
//!
//! A failing test is logged and skipped; the remaining tests still run.

pub mod report;
pub mod runner;
pub mod schedule;

use std::path::PathBuf;

use mimo_core::{ConfigError, MimoError};

pub use report::{csv_line, output_file_name, CsvReport};
pub use runner::{Runner, Simulation, SimulationSummary, TestReport};
pub use schedule::{Schedule, TestCase};

/// Errors raised by the simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Link(#[from] MimoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no payload given, pass --message or --input")]
    NoPayload,
}

impl SimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
