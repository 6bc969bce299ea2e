//! Test runner
//!
//! [`Runner`] executes one [`TestCase`]: it seeds a channel model, draws the
//! channel, sends the payload through the link and collects the metrics.
//! [`Simulation`] drives a whole [`Schedule`] and writes the reports.

use mimo_core::config::{LinkConfig, MimoConfig};
use mimo_core::framing::{bytes_to_symbols, symbols_to_bytes};
use mimo_core::{ChannelModel, LinkRegime, LinkStatistics, MimoLink, MimoResult, NoiseLevel};
use tracing::{error, info, info_span};

use crate::report::{write_recovered, CsvReport};
use crate::schedule::{Schedule, TestCase};
use crate::SimResult;

/// Result of one successful test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub case: TestCase,
    /// Seed of the channel model, for reproducing the test
    pub seed: u64,
    pub regime: LinkRegime,
    pub n_streams: usize,
    pub padding: usize,
    pub statistics: LinkStatistics,
    pub recovered: Vec<u8>,
}

/// Runs single tests with a fixed link configuration.
#[derive(Debug, Clone)]
pub struct Runner {
    link: LinkConfig,
}

impl Runner {
    pub fn new(link: LinkConfig) -> Self {
        Self { link }
    }

    /// Seed for `case`: the configured seed offset by the test number, or
    /// `None` for entropy.
    fn seed_for(&self, case: &TestCase) -> Option<u64> {
        self.link.seed.map(|s| s.wrapping_add(case.test as u64))
    }

    pub fn run_case(&self, case: &TestCase, payload: &[u8]) -> MimoResult<TestReport> {
        let _span = info_span!("test", test = case.test).entered();

        let noise = NoiseLevel::from_selector(case.noise_level)?;
        let mut model = ChannelModel::new(self.link.channel_sigma, self.seed_for(case))?;
        info!(
            nr = case.nr,
            nt = case.nt,
            noise = case.noise_level,
            seed = model.seed(),
            "test started"
        );

        let link = MimoLink::generate(
            &mut model,
            case.nr,
            case.nt,
            noise,
            self.link.zero_singular_value,
        )?;
        let symbols = bytes_to_symbols(payload);
        let outcome = link.run(&symbols, &mut model)?;
        let stats = outcome.statistics;

        info!(
            regime = %link.regime(),
            n_streams = link.n_streams(),
            padding = outcome.padding,
            symbols = stats.symbols,
            symbol_errors = stats.symbol_errors,
            error_percentage = stats.error_percentage,
            ber = stats.ber,
            snr_db = stats.snr_db,
            evm_db = stats.evm_db,
            capacity = stats.capacity,
            "test finished"
        );

        Ok(TestReport {
            case: *case,
            seed: model.seed(),
            regime: link.regime(),
            n_streams: link.n_streams(),
            padding: outcome.padding,
            statistics: stats,
            recovered: symbols_to_bytes(&outcome.recovered),
        })
    }
}

/// Totals of a simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSummary {
    pub reports: Vec<TestReport>,
    /// Tests whose link failed, with the error message
    pub failures: Vec<(TestCase, String)>,
}

impl SimulationSummary {
    pub fn completed(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// A configured run over a whole schedule.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: MimoConfig,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(config: MimoConfig) -> SimResult<Self> {
        config.validate()?;
        let schedule = Schedule::from_config(&config.schedule)?;
        Ok(Self { config, schedule })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Run every scheduled test.
    ///
    /// Link failures are logged and recorded in the summary. Output I/O
    /// errors abort the run.
    pub fn run(&self, payload: &[u8]) -> SimResult<SimulationSummary> {
        let runner = Runner::new(self.config.link.clone());
        let csv = CsvReport::new(&self.config.output.csv);
        let mut summary = SimulationSummary::default();

        info!(
            tests = self.schedule.len(),
            bytes = payload.len(),
            "simulation started"
        );

        for case in self.schedule.iter() {
            match runner.run_case(case, payload) {
                Ok(report) => {
                    if self.config.output.write_files {
                        write_recovered(&self.config.output.directory, case, &report.recovered)?;
                    }
                    csv.append(case, &report.statistics)?;
                    summary.reports.push(report);
                }
                Err(e) => {
                    error!(test = case.test, nr = case.nr, nt = case.nt, error = %e, "test failed");
                    summary.failures.push((*case, e.to_string()));
                }
            }
        }

        info!(
            completed = summary.completed(),
            failed = summary.failed(),
            "simulation finished"
        );
        Ok(summary)
    }
}
