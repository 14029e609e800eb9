//! Reader targets and the sequential dump loop. A failing target never stops later ones.

use crate::armory::urls::{character_sheet_url, guild_info_url, item_info_url, item_tooltip_url};
use crate::armory::{Fetch, FetchError};
use crate::output::{render_pretty, OutputError, OutputFile, OutputOptions, WriteOutcome};
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),
}

/// Something the reader can dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpTarget {
    Guild { realm: String, guild: String },
    Character { realm: String, name: String },
    Item { id: String },
}

impl fmt::Display for DumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpTarget::Guild { realm, guild } => write!(f, "guild {}@{}", guild, realm),
            DumpTarget::Character { realm, name } => write!(f, "character {}@{}", name, realm),
            DumpTarget::Item { id } => write!(f, "item {}", id),
        }
    }
}

/// One GET and where its body goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRequest {
    pub url: String,
    pub file: OutputFile,
}

impl DumpTarget {
    /// Requests for this target in the order they are issued. Items fetch info then tooltip.
    pub fn requests(&self, base_url: &str) -> Vec<DumpRequest> {
        match self {
            DumpTarget::Guild { realm, guild } => vec![DumpRequest {
                url: guild_info_url(guild, realm, base_url),
                file: OutputFile::GuildInfo {
                    realm: realm.clone(),
                    guild: guild.clone(),
                },
            }],
            DumpTarget::Character { realm, name } => vec![DumpRequest {
                url: character_sheet_url(name, realm, base_url),
                file: OutputFile::CharacterSheet { name: name.clone() },
            }],
            DumpTarget::Item { id } => vec![
                DumpRequest {
                    url: item_info_url(id, base_url),
                    file: OutputFile::ItemInfo { id: id.clone() },
                },
                DumpRequest {
                    url: item_tooltip_url(id, base_url),
                    file: OutputFile::ItemTooltip { id: id.clone() },
                },
            ],
        }
    }
}

/// Where fetched bodies go.
pub enum Sink<'a> {
    /// Print bodies, pretty-printed when `pretty` is set.
    Stdout { out: &'a mut dyn Write, pretty: bool },
    Files(&'a OutputOptions),
}

/// Options for a dump run.
#[derive(Default)]
pub struct DumpOptions<'a> {
    /// Print "opening url ... done!" style lines to stdout.
    pub verbose: bool,
    /// Called with (targets done, total) after each target.
    pub progress: Option<&'a dyn Fn(usize, usize)>,
}

/// Outcome of a dump run.
#[derive(Debug, Default)]
pub struct DumpReport {
    pub attempted: usize,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub printed: usize,
    pub failures: Vec<(DumpTarget, DumpError)>,
}

impl DumpReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dump each target in turn. Within a target the first failure aborts its remaining requests.
pub fn dump_all<F: Fetch + ?Sized>(
    fetcher: &F,
    base_url: &str,
    targets: &[DumpTarget],
    sink: &mut Sink<'_>,
    options: &DumpOptions<'_>,
) -> DumpReport {
    let mut report = DumpReport::default();
    let total = targets.len();
    for (i, target) in targets.iter().enumerate() {
        report.attempted += 1;
        if let Err(e) = dump_target(fetcher, base_url, target, sink, options.verbose, &mut report) {
            tracing::warn!(what = %target, error = %e, "dump failed");
            report.failures.push((target.clone(), e));
        }
        if let Some(progress) = options.progress {
            progress(i + 1, total);
        }
    }
    report
}

fn dump_target<F: Fetch + ?Sized>(
    fetcher: &F,
    base_url: &str,
    target: &DumpTarget,
    sink: &mut Sink<'_>,
    verbose: bool,
    report: &mut DumpReport,
) -> Result<(), DumpError> {
    for request in target.requests(base_url) {
        if verbose {
            println!("opening url '{}'...", request.url);
        }
        let body = fetcher.fetch(&request.url)?;
        match sink {
            Sink::Stdout { out, pretty } => {
                if *pretty {
                    let text = render_pretty(&request.file.relative_path(), &body)?;
                    out.write_all(text.as_bytes()).map_err(DumpError::Stdout)?;
                } else {
                    out.write_all(&body).map_err(DumpError::Stdout)?;
                }
                out.flush().map_err(DumpError::Stdout)?;
                report.printed += 1;
            }
            Sink::Files(opts) => {
                if verbose {
                    println!("writing '{}'...", opts.path_for(&request.file).display());
                }
                match opts.write(&request.file, &body)? {
                    WriteOutcome::Written(path) => report.written.push(path),
                    WriteOutcome::Skipped(path) => {
                        if verbose {
                            println!("'{}' exists, skipped (use -f to overwrite)", path.display());
                        }
                        report.skipped.push(path);
                    }
                }
            }
        }
        if verbose {
            println!("done!");
        }
    }
    Ok(())
}
