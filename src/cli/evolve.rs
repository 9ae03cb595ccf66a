//! CLI command for running an evolution.

use crate::cli::output::{RunReport, format_json, format_text};
use crate::cli::{CliError, OutputFormat};
use clap::Args;
use gencode::ConfigError;
use gencode::gp::{
    CompilerConfig, EvolutionConfig, ExternalCompiler, FitnessEvaluator, evolve_with,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Arguments of the `evolve` command.
#[derive(Args, Debug)]
pub(crate) struct EvolveArgs {
    /// Statements per initial program (default: 1)
    statements: Option<NonZeroUsize>,

    /// Number of generations (default: 10)
    generations: Option<NonZeroUsize>,

    /// Population size (default: 10)
    population: Option<NonZeroUsize>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Wall-clock budget for the run in seconds (default: 3600)
    #[arg(long)]
    time_limit: Option<u64>,

    /// Compiler executable (default: gcc)
    #[arg(long)]
    compiler: Option<String>,

    /// Compiler argument placed before the source file; repeatable (default: -pipe)
    #[arg(long = "compiler-arg", allow_hyphen_values = true)]
    compiler_args: Vec<String>,

    /// Per-compilation time limit in seconds (default: 10)
    #[arg(long)]
    compile_timeout: Option<u64>,

    /// JSON configuration file; command-line values take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parallel evaluation threads (default: CPU count)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Show progress bar
    #[arg(short, long)]
    progress: bool,
}

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunFile {
    #[serde(flatten)]
    evolution: EvolutionConfig,
    compiler: CompilerConfig,
}

impl RunFile {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl EvolveArgs {
    /// Layer command-line values over the config file (or defaults).
    fn resolve(&self) -> Result<(EvolutionConfig, CompilerConfig), ConfigError> {
        let RunFile {
            mut evolution,
            mut compiler,
        } = match &self.config {
            Some(path) => RunFile::load(path)?,
            None => RunFile::default(),
        };

        if let Some(k) = self.statements {
            evolution.statements_per_program = k.get();
        }
        if let Some(g) = self.generations {
            evolution.generations = g.get();
        }
        if let Some(n) = self.population {
            evolution.population_size = n.get();
        }
        if self.seed.is_some() {
            evolution.seed = self.seed;
        }
        if let Some(limit) = self.time_limit {
            evolution.time_limit_secs = limit;
        }
        if let Some(program) = &self.compiler {
            compiler.program.clone_from(program);
        }
        if !self.compiler_args.is_empty() {
            compiler.args.clone_from(&self.compiler_args);
        }
        if let Some(timeout) = self.compile_timeout {
            compiler.timeout_secs = timeout;
        }

        evolution.validate()?;
        if compiler.timeout_secs == 0 {
            return Err(ConfigError::NotPositive {
                name: "compiler.timeout_secs",
            });
        }
        Ok((evolution, compiler))
    }
}

fn progress_bar(generations: usize) -> Result<ProgressBar, CliError> {
    let pb = ProgressBar::new(generations as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}",
        )?
        .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Execute the evolve command.
pub(crate) fn execute(args: &EvolveArgs) -> Result<(), CliError> {
    let (config, compiler) = args.resolve()?;

    if let Some(threads) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!(error = %e, "could not configure evaluation threads");
        }
    }

    info!(
        program = %compiler.program,
        args = ?compiler.args,
        timeout_secs = compiler.timeout_secs,
        "using compiler"
    );
    let evaluator = FitnessEvaluator::new(ExternalCompiler::from(compiler), config.fitness);

    let pb = if args.progress {
        Some(progress_bar(config.generations)?)
    } else {
        None
    };

    let result = evolve_with(&config, &evaluator, |stats| {
        if let Some(pb) = &pb {
            pb.set_message(format!("best {:.2}", stats.best_score));
            pb.inc(1);
        }
    });
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let report = RunReport::from_outcome(&result?);
    match args.format {
        OutputFormat::Text => println!("{}", format_text(&report)),
        OutputFormat::Json => println!("{}", format_json(&report)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        args: EvolveArgs,
    }

    fn parse(argv: &[&str]) -> EvolveArgs {
        Harness::try_parse_from(std::iter::once("evolve").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults() {
        let (evolution, compiler) = parse(&[]).resolve().unwrap();
        assert_eq!(evolution, EvolutionConfig::default());
        assert_eq!(compiler, CompilerConfig::default());
    }

    #[test]
    fn test_positional_parameters() {
        let (evolution, _) = parse(&["3", "20", "8", "--seed", "5"]).resolve().unwrap();
        assert_eq!(evolution.statements_per_program, 3);
        assert_eq!(evolution.generations, 20);
        assert_eq!(evolution.population_size, 8);
        assert_eq!(evolution.seed, Some(5));
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        let cases = [
            ["evolve", "0", "1", "1"],
            ["evolve", "x", "1", "1"],
            ["evolve", "1", "1", "-3"],
        ];
        for argv in cases {
            let err = Harness::try_parse_from(argv).unwrap_err();
            assert_eq!(CliError::from(err).exit_code(), 4, "{argv:?}");
        }
    }

    #[test]
    fn test_compiler_flags() {
        let (_, compiler) = parse(&[
            "--compiler",
            "clang",
            "--compiler-arg",
            "-fsyntax-only",
            "--compiler-arg",
            "-w",
            "--compile-timeout",
            "2",
        ])
        .resolve()
        .unwrap();
        assert_eq!(compiler.program, "clang");
        assert_eq!(compiler.args, ["-fsyntax-only", "-w"]);
        assert_eq!(compiler.timeout_secs, 2);
    }

    #[test]
    fn test_config_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{
                "generations": 4,
                "population_size": 6,
                "mutation": {"swap_rate": 0.5},
                "compiler": {"program": "cc", "timeout_secs": 3}
            }"#,
        )
        .unwrap();

        let config_arg = path.to_string_lossy().to_string();
        let (evolution, compiler) = parse(&["--config", &config_arg]).resolve().unwrap();
        assert_eq!(evolution.generations, 4);
        assert_eq!(evolution.population_size, 6);
        assert!((evolution.mutation.swap_rate - 0.5).abs() < f64::EPSILON);
        assert!((evolution.mutation.insert_rate - 0.3).abs() < f64::EPSILON);
        assert_eq!(compiler.program, "cc");
        assert_eq!(compiler.args, ["-pipe"]);

        let (evolution, _) = parse(&["1", "2", "3", "--config", &config_arg]).resolve().unwrap();
        assert_eq!(evolution.generations, 2);
        assert_eq!(evolution.population_size, 3);
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json").to_string_lossy().to_string();
        assert!(matches!(
            parse(&["--config", &missing]).resolve(),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"mutation": {"duplicate_rate": 2.0}}"#).unwrap();
        let bad = path.to_string_lossy().to_string();
        assert!(matches!(
            parse(&["--config", &bad]).resolve(),
            Err(ConfigError::RateOutOfRange { .. })
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            parse(&["--config", &bad]).resolve(),
            Err(ConfigError::Parse { .. })
        ));
    }
}
