//! CLI command for printing a random program.

use crate::cli::CliError;
use gencode::Program;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::num::NonZeroUsize;

/// Execute the generate command.
pub(crate) fn execute(statements: NonZeroUsize, seed: Option<u64>) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = SmallRng::seed_from_u64(seed);
    let program = Program::random(&mut rng, statements.get());
    println!("// seed: {seed}");
    println!("{program}");
    Ok(())
}
