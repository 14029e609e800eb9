//! `armoread`: dump guild, character and item XML from the armory to stdout or files.

use super::{report_error, CliRunError, CommonArgs, Settings};
use crate::config;
use crate::dump::{dump_all, DumpOptions, DumpReport, DumpTarget, Sink};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "armoread")]
#[command(about = "Read guild, character and item information from the WoW Armory")]
#[command(
    after_help = "With neither -c nor -i, guild info for -g/-r is dumped. With -w, output goes to items/<id>.xml, items/<id>-tooltip.xml, chars/<name>.xml and guilds/<realm> - <guild>.xml; these directories must exist unless --mkdir is given. Config file keys are read from ./armoread.toml or ~/.config/armoread/config.toml; flags override config."
)]
pub struct ReaderArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Character to dump; may be repeated.
    #[arg(short = 'c', long = "char", value_name = "NAME")]
    pub chars: Vec<String>,

    /// Item id to dump (info and tooltip); may be repeated.
    #[arg(short = 'i', long = "itemid", value_name = "ID")]
    pub items: Vec<String>,

    /// Pretty-print the XML instead of passing it through unchanged.
    #[arg(long)]
    pub pretty: bool,
}

/// Targets in dump order: guild (only when no chars or items), then chars, then items.
pub fn targets(args: &ReaderArgs, settings: &Settings) -> Vec<DumpTarget> {
    let mut targets = Vec::with_capacity(args.chars.len() + args.items.len() + 1);
    if args.chars.is_empty() && args.items.is_empty() {
        targets.push(DumpTarget::Guild {
            realm: settings.realm.clone(),
            guild: settings.guild.clone(),
        });
    }
    targets.extend(args.chars.iter().map(|name| DumpTarget::Character {
        realm: settings.realm.clone(),
        name: name.clone(),
    }));
    targets.extend(args.items.iter().map(|id| DumpTarget::Item { id: id.clone() }));
    targets
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
        .map(|s| {
            s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .progress_chars("█▉▊▋▌▍▎▏ ")
        })
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Entry point for `armoread`.
pub fn run(args: &ReaderArgs) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::Config)?;
    let settings = Settings::resolve(&args.common, config.as_ref());
    let client = settings.client()?;
    let targets = targets(args, &settings);
    let verbose = settings.verbose;

    if verbose {
        println!("Verbose!");
        println!("realm: '{}', guild: '{}'", settings.realm, settings.guild);
        println!("armory: {}", settings.base_url);
        if args.chars.is_empty() {
            println!("chars: <no chars!>");
        } else {
            println!("chars: {}", args.chars.join(", "));
        }
        if args.items.is_empty() {
            println!("items: <no items!>");
        } else {
            println!("items: {}", args.items.join(", "));
        }
    }

    let report = if settings.write {
        let output = settings.output_options(args.pretty);
        let bar = (!verbose && targets.len() > 1).then(|| progress_bar(targets.len()));
        let on_progress = |done: usize, total: usize| {
            if let Some(bar) = &bar {
                bar.set_position(done as u64);
                bar.set_message(format!("Dumped {}/{}", done, total));
            }
        };
        let report = dump_all(
            &client,
            &settings.base_url,
            &targets,
            &mut Sink::Files(&output),
            &DumpOptions {
                verbose,
                progress: Some(&on_progress),
            },
        );
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        report
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        dump_all(
            &client,
            &settings.base_url,
            &targets,
            &mut Sink::Stdout {
                out: &mut out,
                pretty: args.pretty,
            },
            &DumpOptions {
                verbose,
                progress: None,
            },
        )
    };

    finish(report, verbose)
}

/// Report skips and failures; a single failed target keeps its own error and exit code.
fn finish(mut report: DumpReport, verbose: bool) -> Result<(), CliRunError> {
    for path in &report.skipped {
        eprintln!(
            "Skipped {}: file exists (use -f to overwrite).",
            path.display()
        );
    }
    if report.failures.is_empty() {
        return Ok(());
    }
    let attempted = report.attempted;
    let failed = report.failures.len();
    if attempted == 1 {
        if let Some((_, e)) = report.failures.pop() {
            return Err(e.into());
        }
    }
    for (target, e) in &report.failures {
        eprint!("Failed to dump {}: ", target);
        report_error(e, verbose);
    }
    Err(CliRunError::Incomplete { failed, attempted })
}
