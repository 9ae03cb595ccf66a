//! CLI command implementations for gencode.

pub(crate) mod evolve;
pub(crate) mod generate;

mod output;

use clap::ValueEnum;
use gencode::{ConfigError, EvolutionError};
use thiserror::Error;

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// The command line was rejected.
    #[error("{0}")]
    Usage(#[from] clap::Error),
    /// The run aborted.
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
    /// Parameters or the config file were rejected before the run.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The progress bar template was rejected.
    #[error("invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// 1 and 2 report a population that shrank or grew, 3 an exhausted time
    /// budget, 4 a configuration or command-line problem and 5 anything else.
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Evolution(EvolutionError::PopulationTooSmall { .. }) => 1,
            Self::Evolution(EvolutionError::PopulationTooLarge { .. }) => 2,
            Self::Evolution(EvolutionError::TimeBudgetExceeded { .. }) => 3,
            Self::Evolution(EvolutionError::Config(_)) | Self::Config(_) | Self::Usage(_) => 4,
            Self::Progress(_) | Self::Report(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_exit_codes() {
        let cases = [
            (
                CliError::from(EvolutionError::PopulationTooSmall {
                    phase: "selection",
                    expected: 4,
                    actual: 3,
                }),
                1,
            ),
            (
                CliError::from(EvolutionError::PopulationTooLarge {
                    phase: "mutation",
                    expected: 4,
                    actual: 5,
                }),
                2,
            ),
            (
                CliError::from(EvolutionError::TimeBudgetExceeded {
                    limit: Duration::from_secs(1),
                    generation: 2,
                }),
                3,
            ),
            (
                CliError::from(ConfigError::NotPositive { name: "generations" }),
                4,
            ),
            (
                CliError::from(EvolutionError::from(ConfigError::NotPositive {
                    name: "population_size",
                })),
                4,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.exit_code(), expected, "{error}");
        }
    }
}
