//! One game: fair turn order, dice selection, one fair roll each.

use crate::cli::{DiceSetError, MIN_DICE};
use crate::console::Console;
use crate::error::DemoError;
use crate::report;
use fair_dice_core::protocol::{FairValue, FairValueProtocol};
use fair_dice_core::{Dice, ProbabilityMatrix, SecureRandomSource};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::io::Write;
use tokio::io::AsyncBufRead;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    User,
    Computer,
    Tie,
}

impl Winner {
    pub fn decide(user_roll: i64, computer_roll: i64) -> Self {
        if user_roll > computer_roll {
            Winner::User
        } else if computer_roll > user_roll {
            Winner::Computer
        } else {
            Winner::Tie
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub computer_first: bool,
    pub computer_dice: usize,
    pub user_dice: usize,
    pub computer_roll: i64,
    pub user_roll: i64,
    pub winner: Winner,
}

/// A game against the computer.
///
/// Turn order and rolls go through the fair-value protocol. The computer's
/// choice of die is not security relevant and uses `casual`, a plain
/// non-cryptographic RNG.
pub struct GameSession<S, R, W> {
    dice: Vec<Dice>,
    protocol: FairValueProtocol<S>,
    console: Console<R, W>,
    casual: SmallRng,
}

impl<S, R, W> GameSession<S, R, W>
where
    S: SecureRandomSource,
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(
        dice: Vec<Dice>,
        protocol: FairValueProtocol<S>,
        mut console: Console<R, W>,
        casual: SmallRng,
    ) -> Result<Self, DemoError> {
        if dice.len() < MIN_DICE {
            return Err(DiceSetError {
                problems: vec![format!(
                    "At least {} dice configurations are required, got {}",
                    MIN_DICE,
                    dice.len()
                )],
            }
            .into());
        }

        let matrix = ProbabilityMatrix::build(&dice);
        console.set_help(report::help_text(&dice, &matrix));

        Ok(Self {
            dice,
            protocol,
            console,
            casual,
        })
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    pub async fn play(&mut self) -> Result<GameOutcome, DemoError> {
        self.console
            .say("Let's determine who makes the first move.")?;
        let computer_first = self.fair_draw(2).await?.result == 1;

        let (computer_dice, user_dice) = if computer_first {
            let computer = self.computer_pick(None)?;
            self.console.say(format!(
                "I make the first move and choose the [{}] dice.",
                self.dice[computer]
            ))?;
            let user = self.user_pick(Some(computer)).await?;
            (computer, user)
        } else {
            self.console.say("You make the first move.")?;
            let user = self.user_pick(None).await?;
            let computer = self.computer_pick(Some(user))?;
            self.console
                .say(format!("I choose the [{}] dice.", self.dice[computer]))?;
            (computer, user)
        };

        self.console.say("It's time for my roll.")?;
        let computer_roll = self.roll(computer_dice).await?;
        self.console
            .say(format!("My roll result is {}.", computer_roll))?;

        self.console.say("It's time for your roll.")?;
        let user_roll = self.roll(user_dice).await?;
        self.console
            .say(format!("Your roll result is {}.", user_roll))?;

        let winner = Winner::decide(user_roll, computer_roll);
        match winner {
            Winner::User => self
                .console
                .say(format!("You win ({} > {})!", user_roll, computer_roll))?,
            Winner::Computer => self
                .console
                .say(format!("I win ({} > {})!", computer_roll, user_roll))?,
            Winner::Tie => self
                .console
                .say(format!("It's a tie ({} = {})!", user_roll, computer_roll))?,
        }
        info!(
            "Game finished: computer [{}] rolled {}, user [{}] rolled {}",
            self.dice[computer_dice], computer_roll, self.dice[user_dice], user_roll
        );

        Ok(GameOutcome {
            computer_first,
            computer_dice,
            user_dice,
            computer_roll,
            user_roll,
            winner,
        })
    }

    async fn fair_draw(&mut self, range: u64) -> Result<FairValue, DemoError> {
        let value = self.protocol.generate(range, &mut self.console).await?;
        self.console.say(format!(
            "The fair value generation result is {} + {} = {} (mod {}).",
            value.secret, value.contribution, value.result, value.range
        ))?;
        Ok(value)
    }

    async fn roll(&mut self, dice: usize) -> Result<i64, DemoError> {
        let faces = self.dice[dice].face_count() as u64;
        let index = self.fair_draw(faces).await?.result as usize;
        self.dice[dice]
            .face(index)
            .ok_or_else(|| DemoError::Io(std::io::Error::other("roll outside the dice faces")))
    }

    fn computer_pick(&mut self, excluded: Option<usize>) -> Result<usize, DemoError> {
        let available: Vec<usize> = (0..self.dice.len())
            .filter(|&i| Some(i) != excluded)
            .collect();
        available
            .choose(&mut self.casual)
            .copied()
            .ok_or(DemoError::Cancelled)
    }

    async fn user_pick(&mut self, excluded: Option<usize>) -> Result<usize, DemoError> {
        let choice = self
            .console
            .choose_dice(&self.dice, excluded)
            .await?
            .ok_or(DemoError::Cancelled)?;
        self.console
            .say(format!("You choose the [{}] dice.", self.dice[choice]))?;
        Ok(choice)
    }
}
