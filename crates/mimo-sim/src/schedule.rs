//! Test schedule
//!
//! The default sweep doubles the antenna counts every four tests while the
//! noise level cycles through its four selectors:
//!
//! | Tests  | Nr × Nt    |
//! |--------|------------|
//! | 1–4    | 2 × 4      |
//! | 5–8    | 4 × 8      |
//! | 9–12   | 8 × 16     |
//! | 13–16  | 32 × 16    |
//! | 17–20  | 32 × 64    |
//! | 21–24  | 64 × 128   |
//! | 25–28  | 128 × 256  |
//! | 29–32  | 256 × 512  |
//! | 33–36+ | 512 × 1024 |
//!
//! Test `t` uses noise selector `(t - 1) % 4`. Tests past 36 repeat the last
//! antenna configuration.

use mimo_core::config::{ScheduleConfig, ScheduleMode, MAX_TESTS};
use mimo_core::ConfigError;

/// Antenna configurations of the default sweep, four tests each.
const DEFAULT_SWEEP: [(usize, usize); 9] = [
    (2, 4),
    (4, 8),
    (8, 16),
    (32, 16),
    (32, 64),
    (64, 128),
    (128, 256),
    (256, 512),
    (512, 1024),
];

const TESTS_PER_CONFIG: usize = 4;

/// One scheduled test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase {
    /// 1-based test number
    pub test: usize,
    pub nr: usize,
    pub nt: usize,
    /// Noise selector 0..=3
    pub noise_level: u8,
}

impl TestCase {
    /// Entry `test` (1-based) of the default sweep.
    pub fn default_sweep(test: usize) -> Self {
        let slot = (test.saturating_sub(1) / TESTS_PER_CONFIG).min(DEFAULT_SWEEP.len() - 1);
        let (nr, nt) = DEFAULT_SWEEP[slot];
        Self {
            test,
            nr,
            nt,
            noise_level: (test.saturating_sub(1) % 4) as u8,
        }
    }
}

/// Ordered list of tests to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    cases: Vec<TestCase>,
}

impl Schedule {
    /// The first `tests` entries of the default sweep.
    pub fn default_sweep(tests: usize) -> Result<Self, ConfigError> {
        check_count(tests)?;
        Ok(Self {
            cases: (1..=tests).map(TestCase::default_sweep).collect(),
        })
    }

    /// `tests` repetitions of one configuration.
    pub fn custom(tests: usize, nr: usize, nt: usize, noise_level: u8) -> Result<Self, ConfigError> {
        check_count(tests)?;
        if nr == 0 || nt == 0 {
            return Err(ConfigError::ValidationError(
                "nr and nt must be > 0".to_string(),
            ));
        }
        if noise_level > 3 {
            return Err(ConfigError::ValidationError(
                "noise_level must be 0-3".to_string(),
            ));
        }
        Ok(Self {
            cases: (1..=tests)
                .map(|test| TestCase {
                    test,
                    nr,
                    nt,
                    noise_level,
                })
                .collect(),
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        match config.mode {
            ScheduleMode::Default => Self::default_sweep(config.tests),
            ScheduleMode::Custom => {
                Self::custom(config.tests, config.nr, config.nt, config.noise_level)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }
}

fn check_count(tests: usize) -> Result<(), ConfigError> {
    if (1..=MAX_TESTS).contains(&tests) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "tests must be 1-{}, got {}",
            MAX_TESTS, tests
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sweep_blocks() {
        let expect = |t, nr, nt, r| {
            assert_eq!(
                TestCase::default_sweep(t),
                TestCase {
                    test: t,
                    nr,
                    nt,
                    noise_level: r
                }
            );
        };
        expect(1, 2, 4, 0);
        expect(4, 2, 4, 3);
        expect(5, 4, 8, 0);
        expect(13, 32, 16, 0);
        expect(16, 32, 16, 3);
        expect(17, 32, 64, 0);
        expect(36, 512, 1024, 3);
    }

    #[test]
    fn test_past_last_block_reuses_it() {
        let case = TestCase::default_sweep(37);
        assert_eq!((case.nr, case.nt, case.noise_level), (512, 1024, 0));
        let case = TestCase::default_sweep(61);
        assert_eq!((case.nr, case.nt, case.noise_level), (512, 1024, 0));
    }

    #[test]
    fn test_schedule_bounds() {
        assert!(Schedule::default_sweep(0).is_err());
        assert!(Schedule::default_sweep(62).is_err());
        let s = Schedule::default_sweep(61).unwrap();
        assert_eq!(s.len(), 61);
        assert_eq!(s.iter().last().map(|c| c.test), Some(61));
    }

    #[test]
    fn test_custom_schedule() {
        let s = Schedule::custom(3, 8, 2, 1).unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.iter().all(|c| c.nr == 8 && c.nt == 2 && c.noise_level == 1));
        assert_eq!(s.iter().map(|c| c.test).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(Schedule::custom(3, 0, 2, 1).is_err());
        assert!(Schedule::custom(3, 2, 2, 4).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = ScheduleConfig {
            mode: ScheduleMode::Custom,
            tests: 2,
            nr: 4,
            nt: 4,
            noise_level: 2,
        };
        let s = Schedule::from_config(&config).unwrap();
        assert_eq!(s.len(), 2);

        let s = Schedule::from_config(&ScheduleConfig::default()).unwrap();
        assert_eq!(s.len(), 36);
        assert!(!s.is_empty());
    }
}
