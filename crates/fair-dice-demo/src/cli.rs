//! Command-line arguments and dice set validation.

use clap::Parser;
use fair_dice_core::Dice;
use thiserror::Error;

/// Fewest dice a game can be played with
pub const MIN_DICE: usize = 3;

/// Non-transitive dice game against the computer, with provably fair rolls.
///
/// Every random value is committed to with HMAC-SHA3-256 before you add your
/// own number, so you can check afterwards that nothing was rigged.
#[derive(Parser, Debug)]
#[command(
    name = "fair-dice",
    version,
    about,
    long_about = None,
    after_help = "Example: fair-dice 2,2,4,4,9,9 6,8,1,1,8,6 7,5,3,7,5,3"
)]
pub struct Cli {
    /// Dice configurations, each six comma-separated integers
    #[arg(
        value_name = "DICE",
        required = true,
        num_args = MIN_DICE..,
        allow_hyphen_values = true
    )]
    pub dice: Vec<String>,
}

impl Cli {
    /// Parse every die, reporting all invalid ones at once
    pub fn dice_set(&self) -> Result<Vec<Dice>, DiceSetError> {
        parse_dice_set(&self.dice)
    }
}

/// Every problem found in the arguments
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid dice configuration:\n{}Run `fair-dice --help` for the expected format.", render(.problems))]
pub struct DiceSetError {
    pub problems: Vec<String>,
}

fn render(problems: &[String]) -> String {
    problems
        .iter()
        .map(|problem| format!("  - {}\n", problem))
        .collect()
}

/// Parse one die per argument, collecting every invalid argument
pub fn parse_dice_set<S: AsRef<str>>(args: &[S]) -> Result<Vec<Dice>, DiceSetError> {
    if args.len() < MIN_DICE {
        return Err(DiceSetError {
            problems: vec![format!(
                "At least {} dice configurations are required, got {}",
                MIN_DICE,
                args.len()
            )],
        });
    }

    let mut dice = Vec::with_capacity(args.len());
    let mut problems = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        match arg.as_ref().parse::<Dice>() {
            Ok(parsed) => dice.push(parsed),
            Err(err) => problems.push(format!("Dice {}: {}", i + 1, err)),
        }
    }

    if problems.is_empty() {
        Ok(dice)
    } else {
        Err(DiceSetError { problems })
    }
}
