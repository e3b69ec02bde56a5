use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time;

use crate::bet::{BetTarget, Colour, OutsideBet, Pocket};
use crate::config::TableConfig;
use crate::error::SessionError;
use crate::session::{RoundReport, Session};

/// One line typed at the table.
#[derive(Debug, Parser)]
#[command(
    name = "roulette",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true,
    help_template = "Commands:\n{subcommands}"
)]
struct Input {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipChoice {
    Next,
    Prev,
    Value(u64),
}

impl FromStr for ChipChoice {
    type Err = anyhow::Error;

    fn from_str(arg: &str) -> Result<Self> {
        match arg {
            "next" | "right" | ">" => Ok(ChipChoice::Next),
            "prev" | "left" | "<" => Ok(ChipChoice::Prev),
            value => value
                .parse()
                .map(ChipChoice::Value)
                .map_err(|_| anyhow!("`{arg}` is not a chip value")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show this text
    #[command(visible_alias = "?")]
    Help,
    /// Show the layout (* marks a chip)
    #[command(visible_alias = "board")]
    Table,
    /// List chip values
    Chips,
    /// Pick the chip to bet with
    Chip {
        /// next, prev or a chip value
        #[arg(value_name = "CHIP", value_parser = ChipChoice::from_str)]
        choice: ChipChoice,
    },
    /// Put the chip on 0-36, red, black, even, odd, low, high, dozen1-3 or col1-3
    Bet {
        #[arg(value_name = "TARGET", value_parser = BetTarget::from_str)]
        target: BetTarget,
    },
    /// List this round's bets
    Bets,
    /// Take every chip back before spinning
    Clear,
    /// Spin the wheel and settle the round
    Spin,
    /// Show the balance
    #[command(visible_alias = "bal")]
    Balance,
    /// Leave the table
    #[command(visible_alias = "exit")]
    Quit,
}

impl FromStr for Command {
    type Err = clap::Error;

    fn from_str(line: &str) -> Result<Self, clap::Error> {
        let words = line.split_whitespace().map(str::to_ascii_lowercase);
        Input::try_parse_from(words).map(|input| input.command)
    }
}

fn help() -> String {
    Input::command().render_help().to_string()
}

fn money(amount: u64) -> String {
    format!("${amount}.00")
}

fn signed_money(amount: i128) -> String {
    if amount < 0 {
        format!("-${}.00", amount.unsigned_abs())
    } else {
        format!("${amount}.00")
    }
}

fn colour_mark(pocket: Pocket) -> char {
    match pocket.colour() {
        Colour::Green => 'g',
        Colour::Red => 'r',
        Colour::Black => 'b',
    }
}

/// Text rendering of the betting layout, zero on top and three columns below.
fn render_table(session: &Session) -> String {
    let chip = |target: BetTarget| if session.is_occupied(target) { '*' } else { ' ' };
    let mut out = String::new();

    let zero = BetTarget::Straight(Pocket::ZERO);
    let _ = writeln!(out, "        0g{}", chip(zero));
    for row in 0..12u8 {
        out.push_str("   ");
        for col in 1..=3u8 {
            if let Ok(pocket) = Pocket::new(row * 3 + col) {
                let target = BetTarget::Straight(pocket);
                let _ = write!(
                    out,
                    " {:>2}{}{}",
                    pocket.number(),
                    colour_mark(pocket),
                    chip(target)
                );
            }
        }
        out.push('\n');
    }
    for line in OutsideBet::ALL.chunks(6) {
        out.push_str("  ");
        for bet in line {
            let target = BetTarget::Outside(*bet);
            let _ = write!(out, " [{}]{}", bet, chip(target));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn render_report(report: &RoundReport) -> String {
    let winning = report.settlement.winning;
    let mut out = format!("Ball landed on {winning} {}.", winning.colour());
    for outcome in &report.settlement.outcomes {
        let bet = outcome.bet;
        let _ = write!(out, "\n  {} on {}: ", money(bet.amount()), bet.target());
        if outcome.won {
            let _ = write!(out, "pays {}", money(outcome.payout));
        } else {
            out.push_str("lost");
        }
    }
    let _ = write!(
        out,
        "\nRound winnings: {} | Balance: {}",
        signed_money(report.round_winnings),
        money(report.balance)
    );
    out
}

/// The table as seen from a terminal. Owns the player's session and the RNG
/// the spins draw from.
pub struct Console {
    session: Session,
    rng: StdRng,
    tick: Duration,
}

impl Console {
    pub fn new(config: &TableConfig, rng: StdRng) -> Result<Self> {
        let session = Session::new(config.wheel(), config.starting_balance, config.chips.clone())?;
        Ok(Self {
            session,
            rng,
            tick: Duration::from_millis(config.tick_ms),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one command. `None` means the player left.
    pub async fn execute(&mut self, command: Command) -> Option<String> {
        let reply = match command {
            Command::Quit => return None,
            Command::Help => Ok(help()),
            Command::Table => Ok(render_table(&self.session)),
            Command::Chips => Ok(self.describe_chips()),
            Command::Chip { choice } => self.choose_chip(choice),
            Command::Bet { target } => self.session.place_bet(target).map(|bet| {
                format!(
                    "{} on {}. Balance: {}",
                    money(bet.amount()),
                    bet.target(),
                    money(self.session.balance())
                )
            }),
            Command::Bets => Ok(self.describe_bets()),
            Command::Clear => self.session.withdraw_bets().map(|bets| {
                format!(
                    "Took back {} chips. Balance: {}",
                    bets.len(),
                    money(self.session.balance())
                )
            }),
            Command::Spin => self.spin().await,
            Command::Balance => Ok(format!("Balance: {}", money(self.session.balance()))),
        };
        Some(reply.unwrap_or_else(|err| {
            warn!("rejected {command:?}: {err}");
            format!("Can't do that: {err}")
        }))
    }

    fn describe_chips(&self) -> String {
        let selected = self.session.selected_chip();
        self.session
            .chips()
            .iter()
            .map(|c| {
                if *c == selected {
                    format!("[{}]", money(*c))
                } else {
                    money(*c)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn choose_chip(&mut self, choice: ChipChoice) -> Result<String, SessionError> {
        let chip = match choice {
            ChipChoice::Next => self.session.next_chip(),
            ChipChoice::Prev => self.session.prev_chip(),
            ChipChoice::Value(value) => self.session.select_chip(value)?,
        };
        let mut reply = format!("Chip: {}", money(chip));
        if chip > self.session.balance() {
            reply.push_str(" (more than your balance)");
        }
        Ok(reply)
    }

    fn describe_bets(&self) -> String {
        let bets = self.session.round().bets();
        if bets.is_empty() {
            return "No bets on the table.".to_string();
        }
        let mut out = String::new();
        for bet in bets {
            let _ = writeln!(
                out,
                "{} on {} (pays {}x)",
                money(bet.amount()),
                bet.target(),
                bet.target().payout_multiplier()
            );
        }
        let _ = write!(out, "Total staked: {}", money(self.session.round().total_staked()));
        out
    }

    async fn spin(&mut self) -> Result<String, SessionError> {
        let start = self.session.start_spin(&mut self.rng)?;
        debug!("spinning from {start:.2}°, {:?} per step", self.tick);
        // A zero interval would panic, so a zero tick just runs the steps back to back.
        let mut ticker = (!self.tick.is_zero()).then(|| time::interval(self.tick));
        loop {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }
            let tick = self.session.step_spin()?;
            if tick.rotation % 50 == 0 {
                let under = self.session.round().wheel().result_for_angle(tick.angle);
                debug!("step {}: {:.2}° over {under}", tick.rotation, tick.angle);
            }
            if tick.finished {
                break;
            }
        }
        self.session.finish_spin()?;
        let report = self.session.settle()?;
        Ok(render_report(&report))
    }
}

pub async fn start() -> Result<()> {
    let path = TableConfig::path();
    let config = TableConfig::load_or_init(&path).await?;
    info!(
        "table open: balance {}, chips {:?}, {} steps per spin",
        config.starting_balance, config.chips, config.spin.steps
    );
    let mut console = Console::new(&config, StdRng::from_entropy())?;

    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();
    stdout
        .write_all(format!("European roulette\n{}\n\n", help().trim_end()).as_bytes())
        .await?;

    loop {
        let prompt = format!(
            "[{} | chip {}] > ",
            money(console.session().balance()),
            money(console.session().selected_chip())
        );
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let reply = match line.parse::<Command>() {
            Ok(command) => match console.execute(command).await {
                Some(reply) => reply,
                None => break,
            },
            Err(err) => {
                warn!("bad input {line:?}: {:?}", err.kind());
                err.to_string().trim_end().to_string()
            }
        };
        stdout.write_all(format!("{reply}\n").as_bytes()).await?;
    }

    info!(
        "leaving the table with {}",
        money(console.session().balance())
    );
    Ok(())
}
