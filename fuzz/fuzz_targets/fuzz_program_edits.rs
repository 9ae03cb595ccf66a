#![no_main]

use arbitrary::Arbitrary;
use gencode::gp::{CrossoverConfig, CrossoverKind, MutationConfig, crossover, mutate};
use gencode::{Program, Statement, Token};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// One structural edit.
#[derive(Arbitrary, Debug)]
enum Edit {
    Insert(u16, String),
    Remove(u16),
    RemoveRange(u16, u16),
    Swap(u16, u16),
    Duplicate,
    Rotate,
    Replace,
    InsertRandom(u8),
    SortByLen,
    Reverse,
}

/// Structured input for program edit fuzzing.
#[derive(Arbitrary, Debug)]
struct EditInput {
    /// RNG seed for random edits.
    seed: u64,
    /// Initial statements, each a list of token texts.
    statements: Vec<Vec<String>>,
    /// Edits applied in order.
    edits: Vec<Edit>,
    /// Recombine with a random program afterwards.
    crossover_kind: u8,
}

fuzz_target!(|input: EditInput| {
    // Cap inputs to avoid OOM
    if input.statements.len() > 64 || input.edits.len() > 256 {
        return;
    }

    let mut rng = SmallRng::seed_from_u64(input.seed);
    let mut program: Program = input
        .statements
        .iter()
        .map(|words| words.iter().take(32).map(Token::new).collect::<Statement>())
        .collect();

    for edit in &input.edits {
        let before = program.len();
        match edit {
            Edit::Insert(i, text) => {
                program.insert(usize::from(*i), Statement::new(vec![Token::new(text)]));
                assert_eq!(program.len(), before + 1);
            }
            Edit::Remove(i) => {
                let removed = program.remove(usize::from(*i)).is_some();
                assert_eq!(program.len() + usize::from(removed), before);
            }
            Edit::RemoveRange(low, high) => {
                program.remove_range(usize::from(*low), usize::from(*high));
                assert!(program.len() <= before);
            }
            Edit::Swap(i, j) => {
                program.swap(usize::from(*i), usize::from(*j));
                assert_eq!(program.len(), before);
            }
            Edit::Duplicate => {
                let ok = program.duplicate_random_statement(&mut rng).is_ok();
                assert_eq!(ok, before > 0);
                assert_eq!(program.len(), before + usize::from(ok));
            }
            Edit::Rotate => {
                assert_eq!(program.rotate(&mut rng).is_ok(), before > 0);
                assert_eq!(program.len(), before);
            }
            Edit::Replace => {
                assert_eq!(program.replace_random_statement(&mut rng).is_ok(), before > 0);
                assert_eq!(program.len(), before);
            }
            Edit::InsertRandom(n) => {
                let n = usize::from(*n % 8);
                program.insert_random_statements(&mut rng, n);
                assert_eq!(program.len(), before + n);
            }
            Edit::SortByLen => {
                program.sort_by_len();
                let lens: Vec<usize> = program.statements().iter().map(Statement::len).collect();
                assert!(lens.windows(2).all(|w| w[0] <= w[1]));
            }
            Edit::Reverse => program.reverse(),
        }
        if program.len() > 512 {
            return;
        }
    }

    let kind = match input.crossover_kind % 3 {
        0 => CrossoverKind::OnePoint,
        1 => CrossoverKind::Interleave,
        _ => CrossoverKind::Split,
    };
    let config = CrossoverConfig {
        crossover_rate: 1.0,
        kind,
        ..CrossoverConfig::default()
    };
    let mate = Program::random(&mut rng, 3);
    let mut child = crossover(&program, &mate, &config, &mut rng);
    mutate(&mut child, &MutationConfig::default(), &mut rng);

    let rendered = child.to_string();
    assert!(rendered.starts_with("int main(){\n"));
    assert!(rendered.ends_with('}'));
});
