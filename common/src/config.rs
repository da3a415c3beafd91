use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::network::endpoint::DEFAULT_PORT;

pub const CENSUS_CONCURRENCY: usize = 200;
pub const VALIDATION_CONCURRENCY: usize = 300;
pub const CENSUS_TIMEOUT: Duration = Duration::from_secs(12);
pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(12);
pub const CENSUS_OUTPUT_DIR: &str = "scan_results";
pub const VALIDATION_OUTPUT_DIR: &str = "valid_nodes";
pub const DEFAULT_CONFIRMATION_ATTEMPTS: u32 = 3;
pub const MAX_CONFIRMATION_ATTEMPTS: u32 = 10;

/// Which scan strategy a run follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Single-shot probing, every result kept including failures.
    Census,
    /// Repeated confirmation, only valid endpoints are written.
    Validation,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub mode: ScanMode,
    /// Maximum number of endpoints being validated at the same time.
    pub concurrency_limit: usize,
    /// Budget for a single probe attempt.
    pub request_timeout: Duration,
    pub output_directory: PathBuf,
    /// Attempt cap for the repeated-confirmation policy. Ignored in census mode.
    pub confirmation_attempts: u32,
    /// Port substituted when an input line does not name one.
    pub default_port: u16,
    pub user_agent: String,
    /// Validation mode only: keep a model only if `/api/generate` answers for it.
    pub generate_check: bool,
}

impl ScanConfig {
    pub fn census() -> Self {
        Self {
            mode: ScanMode::Census,
            concurrency_limit: CENSUS_CONCURRENCY,
            request_timeout: CENSUS_TIMEOUT,
            output_directory: PathBuf::from(CENSUS_OUTPUT_DIR),
            confirmation_attempts: 1,
            default_port: DEFAULT_PORT,
            user_agent: default_user_agent(),
            generate_check: false,
        }
    }

    pub fn validation() -> Self {
        Self {
            mode: ScanMode::Validation,
            concurrency_limit: VALIDATION_CONCURRENCY,
            request_timeout: VALIDATION_TIMEOUT,
            output_directory: PathBuf::from(VALIDATION_OUTPUT_DIR),
            confirmation_attempts: DEFAULT_CONFIRMATION_ATTEMPTS,
            default_port: DEFAULT_PORT,
            user_agent: default_user_agent(),
            generate_check: false,
        }
    }

    pub fn for_mode(mode: ScanMode) -> Self {
        match mode {
            ScanMode::Census => Self::census(),
            ScanMode::Validation => Self::validation(),
        }
    }

    /// Checks the numeric options before a run is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if !(1..=MAX_CONFIRMATION_ATTEMPTS).contains(&self.confirmation_attempts) {
            return Err(ConfigError::AttemptsOutOfRange {
                got: self.confirmation_attempts,
                max: MAX_CONFIRMATION_ATTEMPTS,
            });
        }
        if self.default_port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("tagscan/{}", env!("CARGO_PKG_VERSION"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
