//! Per-test outputs: recovered payload files and the CSV summary.
//!
//! CSV columns:
//!
//! ```text
//! test,Nr,Nt,noise,error_percentage,ber,snr_db,evm_db,capacity
//! ```
//!
//! A header is written when the file is created; later runs append.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use mimo_core::LinkStatistics;
use tracing::debug;

use crate::schedule::TestCase;
use crate::{SimError, SimResult};

pub const CSV_HEADER: &str = "test,Nr,Nt,noise,error_percentage,ber,snr_db,evm_db,capacity";

/// `Test_<t>_Nr<nr>_Nt<nt>_Rd<r>`
pub fn output_file_name(case: &TestCase) -> String {
    format!(
        "Test_{}_Nr{}_Nt{}_Rd{}",
        case.test, case.nr, case.nt, case.noise_level
    )
}

/// One CSV row, without trailing newline.
pub fn csv_line(case: &TestCase, stats: &LinkStatistics) -> String {
    format!(
        "{},{},{},{},{:.6},{:.6},{:.6},{:.6},{:.6}",
        case.test,
        case.nr,
        case.nt,
        case.noise_level,
        stats.error_percentage,
        stats.ber,
        stats.snr_db,
        stats.evm_db,
        stats.capacity
    )
}

/// Write the recovered payload of `case` into `dir`.
pub fn write_recovered(dir: &Path, case: &TestCase, payload: &[u8]) -> SimResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| SimError::io(dir, e))?;
    let path = dir.join(output_file_name(case));
    fs::write(&path, payload).map_err(|e| SimError::io(&path, e))?;
    debug!(path = %path.display(), bytes = payload.len(), "recovered payload written");
    Ok(path)
}

/// Append-only CSV summary.
#[derive(Debug, Clone)]
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the row for one test.
    pub fn append(&self, case: &TestCase, stats: &LinkStatistics) -> SimResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SimError::io(parent, e))?;
        }
        let fresh = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SimError::io(&self.path, e))?;

        let mut text = String::new();
        if fresh {
            text.push_str(CSV_HEADER);
            text.push('\n');
        }
        text.push_str(&csv_line(case, stats));
        text.push('\n');

        file.write_all(text.as_bytes())
            .map_err(|e| SimError::io(&self.path, e))
    }
}
