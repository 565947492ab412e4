//! # swarmlog command line
//!
//! Writes messages to a self-verifying log file, in the spirit of
//! `logger(1)`:
//!
//! ```text
//! swarmlog --file /var/log/job.log --level warning "disk almost full"
//! some-job 2>&1 | swarmlog --file /var/log/job.log --priority debug
//! ```
//!
//! Settings come from `--config` (or the platform config file), then flags
//! override individual values.

use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use swarmlog::{Application, LoggerConfig, Priority};

/// Leveled, self-healing file logging from the shell
#[derive(Parser, Debug)]
#[command(name = "swarmlog", version)]
#[command(about = "Write messages to a self-verifying log file")]
struct Args {
    /// TOML config file (defaults to the platform config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Threshold: least severe priority that gets written
    #[arg(short, long)]
    priority: Option<Priority>,

    /// Line pattern, e.g. "%Y-%m-%d %H:%M:%S [%p] %t"
    #[arg(long)]
    format: Option<String>,

    /// Roll the log over daily into gzip archives
    #[arg(long)]
    rotate: bool,

    /// Rotated archives to keep (0 keeps all)
    #[arg(long)]
    purge_count: Option<u32>,

    /// Priority of the messages written by this invocation
    #[arg(short, long, default_value = "information")]
    level: Priority,

    /// Message to write; stdin lines are written when omitted
    message: Vec<String>,
}

impl Args {
    fn into_config(self) -> Result<(LoggerConfig, Priority, Vec<String>), swarmlog::LoggerError> {
        let mut config = match &self.config {
            Some(path) => LoggerConfig::load_from(path)?,
            None => LoggerConfig::load(),
        };
        if let Some(file) = self.file {
            config.path = file;
        }
        if let Some(priority) = self.priority {
            config.priority = priority;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.rotate {
            config.rotation.enabled = true;
        }
        if let Some(purge_count) = self.purge_count {
            config.rotation.purge_count = purge_count;
        }
        Ok((config, self.level, self.message))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (config, level, message) = match args.into_config() {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("swarmlog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = match Application::start(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("swarmlog: cannot open log: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let logger = app.logger();

    if message.is_empty() {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => logger.log(level, &line),
                Err(e) => {
                    eprintln!("swarmlog: reading stdin: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    } else {
        logger.log(level, &message.join(" "));
    }

    ExitCode::SUCCESS
}
