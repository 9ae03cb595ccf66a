//! Output formatting utilities for CLI.

use gencode::gp::{EvolutionOutcome, GenerationStats};
use serde::Serialize;
use std::fmt::Write;

/// JSON-serializable run report.
#[derive(Debug, Serialize)]
pub(super) struct RunReport {
    /// Score of the best program.
    pub(super) score: f64,
    /// Compiler diagnostic of the best program.
    pub(super) diagnostic: String,
    /// Rendered best program.
    pub(super) program: String,
    /// Seed the run used.
    pub(super) seed: u64,
    /// Generation where the best score was first reached.
    pub(super) best_generation: usize,
    /// Per-generation statistics.
    pub(super) generations: Vec<GenerationStats>,
    /// Wall-clock time of the run.
    pub(super) elapsed_seconds: f64,
}

impl RunReport {
    /// Create from a finished run.
    pub(super) fn from_outcome(outcome: &EvolutionOutcome) -> Self {
        Self {
            score: outcome.best.score(),
            diagnostic: outcome.best.diagnostic().to_string(),
            program: outcome.best.to_string(),
            seed: outcome.stats.seed,
            best_generation: outcome.stats.best_generation,
            generations: outcome.stats.generations.clone(),
            elapsed_seconds: outcome.stats.elapsed_seconds,
        }
    }
}

/// Format a run report as human-readable text.
pub(super) fn format_text(report: &RunReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Score = {:.2}", report.score);
    let _ = writeln!(output, "Errors:\n {}", report.diagnostic);
    let _ = writeln!(output, "Program:\n{}", report.program);
    let _ = writeln!(output, "Seed: {}", report.seed);
    let _ = write!(output, "Finished in {:.3} seconds", report.elapsed_seconds);
    output
}

/// Format a run report as pretty JSON.
pub(super) fn format_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            score: 12.346,
            diagnostic: "main.cpp:2: error: x".to_string(),
            program: "int main(){\n   x ; \n}".to_string(),
            seed: 9,
            best_generation: 2,
            generations: Vec::new(),
            elapsed_seconds: 0.5,
        }
    }

    #[test]
    fn test_text_report() {
        let text = format_text(&report());
        assert!(text.starts_with("Score = 12.35\nErrors:\n main.cpp:2: error: x\n"));
        assert!(text.contains("Program:\nint main(){\n   x ; \n}\n"));
        assert!(text.ends_with("Finished in 0.500 seconds"));
    }

    #[test]
    fn test_json_report() {
        let json = format_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["seed"], 9);
        assert_eq!(value["best_generation"], 2);
        assert_eq!(value["diagnostic"], "main.cpp:2: error: x");
    }
}
