//! Operator console.
//!
//! A line-command loop for minting and revoking bearer tokens while the
//! server runs. It reads blocking lines on its own thread and reaches the
//! async stores through a runtime [`Handle`], so a pending read on stdin
//! never holds up process exit.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::thread::JoinHandle;

use tokio::runtime::Handle;
use tracing::{debug, error, info};

use notekeep_core::{defaults::TOKEN_BYTES, Username};
use notekeep_store::Store;

use crate::Shutdown;

/// ANSI status markers for console output.
mod deco {
    pub const GREEN: &str = "\x1b[92m";
    pub const NC: &str = "\x1b[0m";

    pub const ASK: &str = "\x1b[92m[\x1b[0m?\x1b[92m] \x1b[94m";
    pub const SUCCESS: &str = "\x1b[93m[\x1b[0m√\x1b[93m] \x1b[92m";
    pub const ERROR: &str = "\x1b[94m[\x1b[0m!\x1b[94m] \x1b[91m";
    pub const INFO: &str = "\x1b[93m[\x1b[0m+\x1b[93m] \x1b[96m";

    pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
    pub const HEADING: &str = "\x1b[1;36m";
}

const PROMPT: &str = "$: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Generate,
    Tokens,
    Remove,
    Clear,
    Help,
    Exit,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Generate,
        Command::Tokens,
        Command::Remove,
        Command::Clear,
        Command::Exit,
        Command::Help,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Generate => "generate",
            Command::Tokens => "tokens",
            Command::Remove => "remove",
            Command::Clear => "clear",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }

    fn description(self) -> String {
        match self {
            Command::Generate => format!(
                "Generate a {}-character token that can be used to authenticate from the mobile app",
                TOKEN_BYTES * 2
            ),
            Command::Tokens => "Outputs every generated token related to its user".to_string(),
            Command::Remove => "Removes a chosen token".to_string(),
            Command::Clear => "Clear the screen".to_string(),
            Command::Help => "Show this help message".to_string(),
            Command::Exit => "Stop the server and exit".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Command::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| UnknownCommand(s.trim().to_string()))
    }
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct Console<R, W> {
    input: R,
    output: W,
    store: Store,
    shutdown: Shutdown,
    runtime: Handle,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, store: Store, shutdown: Shutdown, runtime: Handle) -> Self {
        Self {
            input,
            output,
            store,
            shutdown,
            runtime,
        }
    }

    /// Run until `exit`, end of input, or an external shutdown. Returns the
    /// output sink.
    ///
    /// Must not be called from inside the async runtime.
    pub fn run(mut self) -> io::Result<W> {
        loop {
            if self.shutdown.is_triggered() {
                break;
            }
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                info!("console input closed; console stopped, server keeps running");
                break;
            };
            if line.is_empty() {
                continue;
            }

            let flow = match line.parse::<Command>() {
                Ok(cmd) => {
                    debug!(op = cmd.name(), "console command");
                    self.dispatch(cmd)?
                }
                Err(UnknownCommand(_)) => {
                    writeln!(
                        self.output,
                        "{}Unknown command, type \"help\" to output every known command.{}",
                        deco::ERROR,
                        deco::NC
                    )?;
                    Flow::Continue
                }
            };
            if flow == Flow::Stop {
                break;
            }
        }
        self.output.flush()?;
        Ok(self.output)
    }

    /// Next trimmed line, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}{}{}", deco::ASK, question, deco::NC)?;
        self.output.flush()?;
        self.read_line()
    }

    fn report_error(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}{}{}", deco::ERROR, message, deco::NC)
    }

    fn dispatch(&mut self, cmd: Command) -> io::Result<Flow> {
        match cmd {
            Command::Generate => self.generate(),
            Command::Tokens => self.tokens().map(|_| Flow::Continue),
            Command::Remove => self.remove(),
            Command::Clear => {
                write!(self.output, "{}", deco::CLEAR_SCREEN)?;
                Ok(Flow::Continue)
            }
            Command::Help => self.help().map(|_| Flow::Continue),
            Command::Exit => {
                writeln!(self.output, "{}Exiting...{}", deco::INFO, deco::NC)?;
                info!("shutdown requested from console");
                self.shutdown.trigger();
                Ok(Flow::Stop)
            }
        }
    }

    fn generate(&mut self) -> io::Result<Flow> {
        let Some(raw) = self.ask("Enter a new username: ")? else {
            return Ok(Flow::Stop);
        };
        let username = match Username::parse(&raw) {
            Ok(username) => username,
            Err(e) => {
                self.report_error(capitalize(&e.to_string()))?;
                return Ok(Flow::Continue);
            }
        };

        let tokens = self.store.tokens.clone();
        let existing = match self.runtime.block_on(tokens.tokens_for(&username)) {
            Ok(existing) => existing,
            Err(e) => {
                error!(username = %username, error = %e, "console: token lookup failed");
                self.report_error(format!("Could not read tokens: {e}"))?;
                return Ok(Flow::Continue);
            }
        };

        let issued = if existing.is_empty() {
            self.runtime.block_on(tokens.issue(&username)).map(|token| (token, 0))
        } else {
            let question = format!("{username} already has a token. Overwrite? [y/N]: ");
            let Some(answer) = self.ask(&question)? else {
                return Ok(Flow::Stop);
            };
            if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
                writeln!(self.output, "{}Kept the existing token.{}", deco::INFO, deco::NC)?;
                return Ok(Flow::Continue);
            }
            self.runtime
                .block_on(tokens.replace(&username))
                .map(|issued| (issued.token, issued.revoked.len()))
        };

        let (token, revoked) = match issued {
            Ok(issued) => issued,
            Err(e) => {
                error!(username = %username, error = %e, "console: token issue failed");
                self.report_error(format!("Could not save the token: {e}"))?;
                return Ok(Flow::Continue);
            }
        };

        if let Err(e) = self.runtime.block_on(self.store.notes.ensure(&username)) {
            error!(username = %username, error = %e, "console: notes collection setup failed");
            self.report_error(format!(
                "Token saved, but the notes collection could not be created: {e}"
            ))?;
        }

        writeln!(
            self.output,
            "{}Generating token for {}, make sure to preserve it somewhere safe. You still can recheck your tokens using the \"tokens\" command!{}",
            deco::SUCCESS,
            username,
            deco::NC
        )?;
        if revoked > 0 {
            writeln!(
                self.output,
                "{}Revoked {} previous token(s) for {}.{}",
                deco::INFO,
                revoked,
                username,
                deco::NC
            )?;
        }
        writeln!(self.output, "{}{}{}", deco::GREEN, token, deco::NC)?;
        writeln!(
            self.output,
            "{}Use command \"clear\" to hide the token!{}",
            deco::INFO,
            deco::NC
        )?;
        Ok(Flow::Continue)
    }

    fn tokens(&mut self) -> io::Result<()> {
        let entries = match self.runtime.block_on(self.store.tokens.list()) {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "console: token listing failed");
                return self.report_error(format!("Could not read tokens: {e}"));
            }
        };
        if entries.is_empty() {
            return writeln!(
                self.output,
                "{}No tokens have been generated yet.{}",
                deco::INFO,
                deco::NC
            );
        }
        for entry in entries {
            writeln!(self.output, "{}     {}", entry.token, entry.username)?;
        }
        Ok(())
    }

    fn remove(&mut self) -> io::Result<Flow> {
        let Some(token) = self.ask("Enter the token to remove: ")? else {
            return Ok(Flow::Stop);
        };
        if token.is_empty() {
            self.report_error("No token entered.")?;
            return Ok(Flow::Continue);
        }
        match self.runtime.block_on(self.store.tokens.revoke(&token)) {
            Ok(true) => writeln!(self.output, "{}Token removed.{}", deco::SUCCESS, deco::NC)?,
            Ok(false) => self.report_error("Token not found.")?,
            Err(e) => {
                error!(error = %e, "console: token removal failed");
                self.report_error(format!("Could not remove the token: {e}"))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn help(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}Available Commands:{}", deco::HEADING, deco::NC)?;
        for cmd in Command::ALL {
            writeln!(self.output, "  {:<14} {}", cmd.name(), cmd.description())?;
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Start the console on stdin/stdout in a dedicated thread.
pub fn spawn(store: Store, shutdown: Shutdown, runtime: Handle) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let console = Console::new(
                io::stdin().lock(),
                io::stdout(),
                store,
                shutdown,
                runtime,
            );
            if let Err(e) = console.run() {
                error!(error = %e, "console stopped on I/O error");
            }
        })
}
