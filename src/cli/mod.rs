//! CLI parsing and orchestration shared by `armoread` and `guildopml`.
//! Resolves settings from flags and config, maps errors to exit codes.

pub mod opml;
pub mod reader;

use crate::armory::{ArmoryClient, FetchError, Region, DEFAULT_TIMEOUT_SECS};
use crate::config::Config;
use crate::dump::DumpError;
use crate::opml::ConvertError;
use crate::output::{OutputError, OutputOptions, Overwrite};
use crate::roster::{RankMapError, RosterError};
use clap::Args;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_REALM: &str = "Trollbane";
pub const DEFAULT_GUILD: &str = "Emerge";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    RankMap(#[from] RankMapError),

    #[error("{0}")]
    Roster(#[from] RosterError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Output(#[from] OutputError),

    #[error("{failed} of {attempted} target(s) failed.")]
    Incomplete { failed: usize, attempted: usize },
}

impl From<ConvertError> for CliRunError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::Fetch(e) => CliRunError::Fetch(e),
            ConvertError::Roster(e) => CliRunError::Roster(e),
        }
    }
}

impl From<DumpError> for CliRunError {
    fn from(e: DumpError) -> Self {
        match e {
            DumpError::Fetch(e) => CliRunError::Fetch(e),
            DumpError::Output(e) => CliRunError::Output(e),
            DumpError::Stdout(e) => CliRunError::Output(OutputError::Io {
                path: PathBuf::from("<stdout>"),
                source: e,
            }),
        }
    }
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::Incomplete { .. } => 1,
            CliRunError::InvalidInput(_) => 2,
            CliRunError::Config(_)
            | CliRunError::RankMap(_)
            | CliRunError::Roster(RosterError::UnmappedRank { .. }) => 3,
            CliRunError::Fetch(_) | CliRunError::Roster(_) => 4,
            CliRunError::Output(_) => 5,
        }
    }
}

/// Print an error, and with `verbose` its cause chain, to stderr.
pub fn report_error(e: &dyn std::error::Error, verbose: bool) {
    eprintln!("{}", e);
    if verbose {
        let mut source = e.source();
        while let Some(s) = source {
            eprintln!("  cause: {}", s);
            source = s.source();
        }
    }
}

/// Flags shared by both programs.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Be verbose and print what's being done.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write to file(s) instead of stdout.
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Overwrite files that already exist. Without it existing files are skipped.
    #[arg(short, long)]
    pub force: bool,

    /// Realm name.
    #[arg(short, long)]
    pub realm: Option<String>,

    /// Guild name.
    #[arg(short, long)]
    pub guild: Option<String>,

    /// Read from the EU armory.
    #[arg(long, conflicts_with = "us")]
    pub eu: bool,

    /// Read from the US armory.
    #[arg(long)]
    pub us: bool,

    /// Directory that output files are written under (default: current directory).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Create missing output directories (items/, chars/, guilds/).
    #[arg(long)]
    pub mkdir: bool,

    /// Request timeout in seconds, 0 for none (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,
}

impl CommonArgs {
    fn region_flag(&self) -> Option<Region> {
        if self.us {
            Some(Region::Us)
        } else if self.eu {
            Some(Region::Eu)
        } else {
            None
        }
    }
}

/// Effective settings for one run: flags over config over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub region: Region,
    pub base_url: String,
    pub realm: String,
    pub guild: String,
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub write: bool,
    pub force: bool,
    pub mkdir: bool,
}

impl Settings {
    pub fn resolve(args: &CommonArgs, config: Option<&Config>) -> Self {
        let region_flag = args.region_flag();
        let region = region_flag
            .or_else(|| config.and_then(|c| c.region))
            .unwrap_or_default();
        // A configured host only applies when no region was picked on the command line.
        let base_url = match (region_flag, config.and_then(|c| c.base_url.clone())) {
            (None, Some(url)) => url,
            _ => region.base_url().to_string(),
        };
        let realm = args
            .realm
            .clone()
            .or_else(|| config.and_then(|c| c.realm.clone()))
            .unwrap_or_else(|| DEFAULT_REALM.to_string());
        let guild = args
            .guild
            .clone()
            .or_else(|| config.and_then(|c| c.guild.clone()))
            .unwrap_or_else(|| DEFAULT_GUILD.to_string());
        let user_agent = args
            .user_agent
            .clone()
            .or_else(|| config.and_then(|c| c.user_agent.clone()));
        let timeout_secs = args
            .timeout
            .or_else(|| config.and_then(|c| c.timeout_secs))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let output_dir = args
            .output_dir
            .clone()
            .or_else(|| config.and_then(|c| c.output_dir.clone()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            region,
            base_url,
            realm,
            guild,
            user_agent,
            timeout_secs,
            output_dir,
            verbose: args.verbose,
            write: args.write,
            force: args.force,
            mkdir: args.mkdir,
        }
    }

    pub fn client(&self) -> Result<ArmoryClient, CliRunError> {
        let mut builder = ArmoryClient::builder().timeout_secs(self.timeout_secs);
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        Ok(builder.build()?)
    }

    pub fn output_options(&self, pretty: bool) -> OutputOptions {
        OutputOptions {
            root: self.output_dir.clone(),
            overwrite: if self.force {
                Overwrite::Replace
            } else {
                Overwrite::Keep
            },
            create_dirs: self.mkdir,
            pretty,
        }
    }
}
