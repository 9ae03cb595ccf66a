//! Weighted random grammar for C-like program fragments.
//!
//! Every generator is a chain of independent coin flips rather than a formal
//! grammar table. The thresholds and the order in which branches are tested
//! determine the statistical shape of generated programs, so they are fixed.
//! Generated text is not guaranteed to be valid C.

use crate::gp::program::Program;
use crate::gp::statement::Statement;
use crate::gp::token::Token;
use rand::Rng;
use rand::seq::SliceRandom;

/// All keywords the generator can emit as bare tokens.
pub const KEYWORDS: [&str; 22] = [
    "bool", "break;", "char", "continue;", "const", "do", "double", "else", "false", "float",
    "for", "if", "int", "long", "void", "return", "short", "signed", "static", "true",
    "unsigned", "while",
];

/// Declarable types.
pub const TYPES: [&str; 7] = ["bool", "char", "double", "float", "int", "long", "short"];

/// Optional type modifiers for declarations.
pub const MODIFIERS: [&str; 4] = ["const", "signed", "static", "unsigned"];

/// Keywords that transfer control out of a block.
pub const BRANCHES: [&str; 3] = ["break;", "continue;", "return;"];

/// Binary operators: arithmetic, relational, logical and bitwise.
pub const BINARY_OPERATORS: [&str; 15] = [
    "+", "-", "*", "/", "%", "==", "!=", ">", "<", ">=", "<=", "&&", "||", "&", "|",
];

/// Identifier pool shared by every generated program.
pub const VARIABLES: [&str; 12] = ["i", "j", "k", "x", "y", "z", "a", "b", "c", "m", "n", "p"];

/// Characters usable in character literals.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Statement terminator.
pub const TERMINATOR: &str = ";";

fn pick<R: Rng>(rng: &mut R, pool: &[&'static str]) -> Token {
    Token::from(pool.choose(rng).copied().unwrap_or_default())
}

/// Draw from `uniform(0, uniform(1, max))`, heavily skewed toward zero.
fn skewed_len<R: Rng>(rng: &mut R, max: usize) -> usize {
    let bound = rng.gen_range(1..=max);
    rng.gen_range(0..bound)
}

/// A random token: keyword (50%), operator (10%), variable (20%) or value (20%).
pub fn random_token<R: Rng>(rng: &mut R) -> Token {
    let roll: f64 = rng.r#gen();
    if roll < 0.5 {
        random_keyword(rng)
    } else if roll < 0.6 {
        random_operator(rng)
    } else if roll < 0.8 {
        random_variable(rng)
    } else {
        random_value(rng)
    }
}

/// A uniformly chosen keyword.
pub fn random_keyword<R: Rng>(rng: &mut R) -> Token {
    pick(rng, &KEYWORDS)
}

/// A random literal: float (50%), integer (40%) or character (10%).
///
/// Numeric literals get a leading `-` 10% of the time, on top of their own
/// sign, so `--12` is a possible output.
pub fn random_value<R: Rng>(rng: &mut R) -> Token {
    let neg = if rng.gen_bool(0.1) { "-" } else { "" };

    let roll: f64 = rng.r#gen();
    if roll < 0.5 {
        let value = rng.r#gen::<f64>() * 200.0 - 100.0;
        Token::from(format!("{neg}{value:.2}"))
    } else if roll < 0.9 {
        let value = rng.gen_range(0..200) - 100;
        Token::from(format!("{neg}{value}"))
    } else {
        let c = char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]);
        Token::from(format!("'{c}'"))
    }
}

/// A uniformly chosen variable name.
pub fn random_variable<R: Rng>(rng: &mut R) -> Token {
    pick(rng, &VARIABLES)
}

/// A literal (50%) or a variable, possibly incremented, decremented or negated.
pub fn random_value_or_variable<R: Rng>(rng: &mut R) -> Token {
    if rng.r#gen::<f64>() < 0.5 {
        return random_value(rng);
    }

    if rng.r#gen::<f64>() < 0.1 {
        let form: f64 = rng.r#gen();
        let var = random_variable(rng);
        let text = if form < 0.25 {
            format!("++{var}")
        } else if form < 0.5 {
            format!("--{var}")
        } else if form < 0.75 {
            format!("{var}++")
        } else {
            format!("{var}--")
        };
        Token::from(text)
    } else {
        let not = rng.r#gen::<f64>() < 0.1;
        let var = random_variable(rng);
        if not {
            Token::from(format!("!{var}"))
        } else {
            var
        }
    }
}

/// A uniformly chosen binary operator.
pub fn random_operator<R: Rng>(rng: &mut R) -> Token {
    pick(rng, &BINARY_OPERATORS)
}

/// A uniformly chosen type.
pub fn random_type<R: Rng>(rng: &mut R) -> Token {
    pick(rng, &TYPES)
}

/// A uniformly chosen type modifier.
pub fn random_modifier<R: Rng>(rng: &mut R) -> Token {
    pick(rng, &MODIFIERS)
}

/// A random infix expression.
///
/// Always contains at least one term. Later terms are nested expressions half
/// of the time; the length distribution keeps the recursion subcritical, so
/// generation terminates with probability one.
pub fn random_expression<R: Rng>(rng: &mut R) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_expression(rng, &mut tokens);
    tokens
}

fn push_expression<R: Rng>(rng: &mut R, out: &mut Vec<Token>) {
    let len = skewed_len(rng, 8);
    let parenthesis = len > 1 && rng.r#gen::<f64>() < 0.33;

    if parenthesis {
        out.push(Token::from("("));
    }
    out.push(random_value_or_variable(rng));
    for _ in 1..len {
        out.push(random_operator(rng));
        if rng.r#gen::<f64>() < 0.5 {
            out.push(random_value_or_variable(rng));
        } else {
            push_expression(rng, out);
        }
    }
    if parenthesis {
        out.push(Token::from(")"));
    }
}

/// A random variable declaration, optionally initialised.
pub fn random_declaration<R: Rng>(rng: &mut R) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_declaration(rng, &mut tokens);
    tokens
}

fn push_declaration<R: Rng>(rng: &mut R, out: &mut Vec<Token>) {
    if rng.r#gen::<f64>() < 0.25 {
        out.push(random_modifier(rng));
    }
    out.push(random_type(rng));
    out.push(random_variable(rng));

    let roll: f64 = rng.r#gen();
    if roll < 0.1 {
        out.push(Token::from("="));
        push_expression(rng, out);
        out.push(Token::from("?"));
        out.push(random_value_or_variable(rng));
        out.push(Token::from(":"));
        out.push(random_value_or_variable(rng));
    } else if roll < 0.6 {
        out.push(Token::from("="));
        push_expression(rng, out);
    }
    out.push(Token::from(TERMINATOR));
}

/// A random assignment: `var = expression ;`.
pub fn random_assignment<R: Rng>(rng: &mut R) -> Vec<Token> {
    let mut tokens = vec![random_variable(rng), Token::from("=")];
    push_expression(rng, &mut tokens);
    tokens.push(Token::from(TERMINATOR));
    tokens
}

/// A random control statement: if (30%), for (20%), while (20%),
/// do-while (20%) or switch (10%).
pub fn random_control_statement<R: Rng>(rng: &mut R) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_control_statement(rng, &mut tokens);
    tokens
}

fn push_control_statement<R: Rng>(rng: &mut R, out: &mut Vec<Token>) {
    let roll: f64 = rng.r#gen();
    if roll < 0.3 {
        out.push(Token::from("if"));
        push_condition(rng, out);
        push_block(rng, out);
    } else if roll < 0.5 {
        out.push(Token::from("for"));
        out.push(Token::from("("));
        push_declaration(rng, out);
        push_expression(rng, out);
        out.push(Token::from(TERMINATOR));
        push_expression(rng, out);
        out.push(Token::from(")"));
        push_block(rng, out);
    } else if roll < 0.7 {
        out.push(Token::from("while"));
        push_condition(rng, out);
        push_block(rng, out);
    } else if roll < 0.9 {
        out.push(Token::from("do"));
        push_block(rng, out);
        out.push(Token::from("while"));
        push_condition(rng, out);
        out.push(Token::from(TERMINATOR));
    } else {
        push_switch(rng, out);
    }
}

fn push_condition<R: Rng>(rng: &mut R, out: &mut Vec<Token>) {
    out.push(Token::from("("));
    push_expression(rng, out);
    out.push(Token::from(")"));
}

fn push_switch<R: Rng>(rng: &mut R, out: &mut Vec<Token>) {
    out.push(Token::from("switch"));
    out.push(Token::from("("));
    out.push(random_variable(rng));
    out.push(Token::from(")"));
    out.push(Token::from("{"));

    let cases = skewed_len(rng, 10);
    for _ in 0..cases {
        out.push(Token::from("case"));
        out.push(random_value(rng));
        out.push(Token::from(":"));
        push_block(rng, out);
        if rng.r#gen::<f64>() < 0.5 {
            out.push(Token::from("break;"));
        }
    }
    if rng.r#gen::<f64>() < 0.25 {
        out.push(Token::from("default"));
        out.push(Token::from(":"));
        push_block(rng, out);
    }
    out.push(Token::from("}"));
}

/// A brace-delimited block of one or more body items.
///
/// Each item is a declaration (20%), an expression statement (60%), a branch
/// keyword (10%) or a nested control statement (10%).
pub fn random_block<R: Rng>(rng: &mut R) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_block(rng, &mut tokens);
    tokens
}

fn push_block<R: Rng>(rng: &mut R, out: &mut Vec<Token>) {
    let len = skewed_len(rng, 6) + 1;

    out.push(Token::from("{"));
    for _ in 0..len {
        let roll: f64 = rng.r#gen();
        if roll < 0.2 {
            push_declaration(rng, out);
        } else if roll < 0.8 {
            push_expression(rng, out);
            out.push(Token::from(TERMINATOR));
        } else if roll < 0.9 {
            out.push(pick(rng, &BRANCHES));
        } else {
            push_control_statement(rng, out);
        }
    }
    out.push(Token::from("}"));
}

/// A top-level statement: declaration (25%), assignment (25%) or control
/// statement (50%).
pub fn random_statement<R: Rng>(rng: &mut R) -> Statement {
    let roll: f64 = rng.r#gen();
    let tokens = if roll < 0.25 {
        random_declaration(rng)
    } else if roll < 0.5 {
        random_assignment(rng)
    } else {
        random_control_statement(rng)
    };
    Statement::new(tokens)
}

/// Number of leading forced declarations in a program of `k` statements.
#[must_use]
pub fn declaration_count(k: usize) -> usize {
    // round-half-up of k / 4 without going through floats
    (k + 2) / 4
}

/// Build a program of exactly `k` statements.
///
/// The first `round(0.25 k)` statements are declarations, which biases the
/// population toward programs whose variables are in scope.
pub fn make_random_program<R: Rng>(rng: &mut R, k: usize) -> Program {
    let declarations = declaration_count(k);
    let mut statements = Vec::with_capacity(k);

    for _ in 0..declarations {
        statements.push(Statement::new(random_declaration(rng)));
    }
    for _ in declarations..k {
        statements.push(random_statement(rng));
    }

    Program::new(statements)
}
