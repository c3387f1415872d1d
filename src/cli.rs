use crate::config::SearchConfig;
use crate::error::Result;
use crate::navigator::Direction;
use crate::widget::InputEvent;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "typeahead")]
#[command(about = "Interactive typeahead search against a JSON endpoint", long_about = None)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub min_query_length: Option<usize>,
    /// Quiet window in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,
    /// Fire on the leading edge of the quiet window
    #[arg(long)]
    pub leading: bool,
    #[arg(long)]
    pub result_key: Option<String>,
    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective config: file first, then flags.
    pub fn search_config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => SearchConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(min) = self.min_query_length {
            config.min_query_length = min;
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_rate = Duration::from_millis(ms);
        }
        if self.leading {
            config.debounce_after = false;
        }
        if let Some(key) = &self.result_key {
            config.result_key = Some(key.clone());
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Input(InputEvent),
    ClearResults,
    Forget(String),
    ForgetAll,
    Quit,
}

/// Parse a line typed at the prompt.
///
/// Lines starting with `:` are commands; anything else is the new text of the
/// search field.
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Command::Input(InputEvent::TextChanged(line.to_string())));
    };

    let (name, arg) = command
        .split_once(' ')
        .map_or((command, None), |(name, arg)| (name, Some(arg.trim())));

    let index = || -> std::result::Result<usize, String> {
        arg.ok_or_else(|| format!(":{} needs an index", name))?
            .parse::<usize>()
            .map_err(|e| format!("bad index: {}", e))
    };

    let command = match name {
        "down" | "next" => Command::Input(InputEvent::Navigate(Direction::Forward)),
        "up" | "prev" => Command::Input(InputEvent::Navigate(Direction::Backward)),
        "move" => {
            let increment = arg
                .ok_or_else(|| ":move needs +1 or -1".to_string())?
                .parse::<i32>()
                .map_err(|e| format!("bad increment: {}", e))?;
            let direction = Direction::from_increment(increment)
                .ok_or_else(|| format!("increment must be +1 or -1, got {}", increment))?;
            Command::Input(InputEvent::Navigate(direction))
        }
        "enter" | "commit" => Command::Input(InputEvent::Commit),
        "hl" => Command::Input(InputEvent::Highlight(index()?)),
        "select" => Command::Input(InputEvent::Select(index()?)),
        "clear" => Command::ClearResults,
        "forget" => Command::Forget(
            arg.ok_or_else(|| ":forget needs a query".to_string())?
                .to_string(),
        ),
        "forget-all" => Command::ForgetAll,
        "q" | "quit" => Command::Quit,
        other => return Err(format!("unknown command :{}", other)),
    };
    Ok(command)
}
