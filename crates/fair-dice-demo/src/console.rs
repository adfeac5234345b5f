//! Console interaction: the human player's side of every draw.

use crate::report::FAIR_PROTOCOL_EXPLANATION;
use async_trait::async_trait;
use fair_dice_core::crypto::verify;
use fair_dice_core::protocol::{CommitMessage, ContributionProvider, ProtocolError, RevealMessage};
use fair_dice_core::{Dice, RunId};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::warn;

/// One parsed line of menu input
#[derive(Debug, PartialEq, Eq)]
enum MenuInput {
    Exit,
    Help,
    Number(u64),
    Unreadable,
}

fn parse_menu_input(line: &str) -> MenuInput {
    let input = line.trim().to_uppercase();
    match input.as_str() {
        "X" => MenuInput::Exit,
        "?" => MenuInput::Help,
        _ => input
            .parse()
            .map(MenuInput::Number)
            .unwrap_or(MenuInput::Unreadable),
    }
}

/// Line-based console over any async reader and writer
pub struct Console<R, W> {
    input: Lines<R>,
    output: W,
    help: String,
    announced: Option<RunId>,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: input.lines(),
            output,
            help: String::new(),
            announced: None,
        }
    }

    /// Text shown for `?` in the dice menu
    pub fn set_help(&mut self, help: String) {
        self.help = help;
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn say(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    /// Prompt and read a line; `None` at end of input
    async fn read_selection(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "Your selection: ")?;
        self.output.flush()?;
        self.input.next_line().await
    }

    /// Let the user pick a die other than `excluded`; `None` means exit
    pub async fn choose_dice(
        &mut self,
        dice: &[Dice],
        excluded: Option<usize>,
    ) -> io::Result<Option<usize>> {
        let options: Vec<usize> = (0..dice.len()).filter(|&i| Some(i) != excluded).collect();

        loop {
            self.say("Choose your dice:")?;
            for (option, &index) in options.iter().enumerate() {
                self.say(format!("{} - {}", option, dice[index]))?;
            }
            self.say("X - exit")?;
            self.say("? - help")?;

            let line = match self.read_selection().await? {
                Some(line) => line,
                None => return Ok(None),
            };
            match parse_menu_input(&line) {
                MenuInput::Exit => return Ok(None),
                MenuInput::Help => {
                    let help = self.help.clone();
                    self.say(help)?;
                }
                MenuInput::Number(n) => match usize::try_from(n).ok().and_then(|n| options.get(n)) {
                    Some(&index) => return Ok(Some(index)),
                    None => self.say(format!(
                        "Invalid selection. Please choose a number between 0 and {}.",
                        options.len().saturating_sub(1)
                    ))?,
                },
                MenuInput::Unreadable => self.say(format!(
                    "Invalid selection. Please choose a number between 0 and {}.",
                    options.len().saturating_sub(1)
                ))?,
            }
        }
    }

    fn show_contribution_menu(&mut self, range: u64) -> io::Result<()> {
        self.say(format!("Add your number modulo {}.", range))?;
        for i in 0..range {
            self.say(format!("{} - {}", i, i))?;
        }
        self.say("X - exit")?;
        self.say("? - help")
    }

    async fn ask_contribution(&mut self, commit: &CommitMessage) -> io::Result<Option<u64>> {
        if self.announced != Some(commit.run_id) {
            self.announced = Some(commit.run_id);
            self.say(format!(
                "I selected a random value in the range 0..{} (HMAC={}).",
                commit.range - 1,
                commit.digest
            ))?;
            self.show_contribution_menu(commit.range)?;
        }

        loop {
            let line = match self.read_selection().await? {
                Some(line) => line,
                None => return Ok(None),
            };
            match parse_menu_input(&line) {
                MenuInput::Exit => return Ok(None),
                MenuInput::Help => {
                    self.say(FAIR_PROTOCOL_EXPLANATION)?;
                    self.show_contribution_menu(commit.range)?;
                }
                // Range is checked by the protocol, which reports back through `rejected`
                MenuInput::Number(n) => return Ok(Some(n)),
                MenuInput::Unreadable => self.say(format!(
                    "Invalid selection. Please choose a number between 0 and {}.",
                    commit.range - 1
                ))?,
            }
        }
    }
}

#[async_trait]
impl<R, W> ContributionProvider for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn contribute(&mut self, commit: &CommitMessage) -> Result<u64, ProtocolError> {
        match self.ask_contribution(commit).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ProtocolError::ContributionCancelled),
            Err(err) => {
                warn!("Console unavailable: {}", err);
                Err(ProtocolError::ContributionCancelled)
            }
        }
    }

    fn rejected(&mut self, commit: &CommitMessage, _err: &ProtocolError) {
        let message = format!(
            "Invalid selection. Please choose a number between 0 and {}.",
            commit.range - 1
        );
        if let Err(err) = self.say(message) {
            warn!("Console unavailable: {}", err);
        }
    }

    fn revealed(&mut self, commit: &CommitMessage, reveal: &RevealMessage) {
        let mut lines = vec![format!("My number: {} (KEY={}).", reveal.secret, reveal.key)];
        if !verify(reveal.secret, &reveal.key, &commit.digest.to_string()) {
            lines.push("WARNING: the revealed number and key do not match the HMAC!".to_string());
        }
        for line in lines {
            if let Err(err) = self.say(line) {
                warn!("Console unavailable: {}", err);
            }
        }
    }
}
