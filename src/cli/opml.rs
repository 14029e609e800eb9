//! `guildopml`: build an OPML file of character feeds from a guild roster, grouped by rank.

use super::{CliRunError, CommonArgs, Settings};
use crate::config::{self, Config};
use crate::dump::DumpError;
use crate::opml::{guild_outline, UnmappedRanks};
use crate::output::{OutputFile, WriteOutcome};
use crate::roster::RankMapping;
use clap::Parser;
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(name = "guildopml")]
#[command(about = "Make an OPML file of character feeds from a guild roster on the WoW Armory")]
#[command(
    after_help = "The rank map lists groups separated by spaces, one digit per rank: -m \"0135 6 8 279\" puts ranks 0, 1, 3 and 5 in one outline, 6 and 8 in their own, and 2, 7 and 9 in another. A member whose rank is in no group is an error unless --skip-unmapped is given. With -w the document is written to opml-<guild>-<realm>.xml."
)]
pub struct OpmlArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Rank groups, e.g. "013 2 4" (overrides rank_map in config).
    #[arg(short, long, value_name = "RANKS")]
    pub map: Option<String>,

    /// Leave out members whose rank is not in the map instead of failing.
    #[arg(long)]
    pub skip_unmapped: bool,
}

/// Rank mapping from -m or config, using configured rank names when present.
pub fn rank_mapping(args: &OpmlArgs, config: Option<&Config>) -> Result<RankMapping, CliRunError> {
    let map = args
        .map
        .clone()
        .or_else(|| config.and_then(|c| c.rank_map.clone()))
        .ok_or_else(|| {
            CliRunError::InvalidInput(
                "No rank map given. Use -m, e.g. -m \"013 2 4\", or set rank_map in armoread.toml."
                    .to_string(),
            )
        })?;
    let mapping = match config.and_then(|c| c.rank_names.as_deref()) {
        Some(names) => RankMapping::parse_with_names(&map, names)?,
        None => RankMapping::parse(&map)?,
    };
    Ok(mapping)
}

/// Entry point for `guildopml`.
pub fn run(args: &OpmlArgs) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::Config)?;
    let settings = Settings::resolve(&args.common, config.as_ref());
    let mapping = rank_mapping(args, config.as_ref())?;
    let unmapped = if args.skip_unmapped {
        UnmappedRanks::Skip
    } else {
        UnmappedRanks::Error
    };
    let verbose = settings.verbose;

    if verbose {
        println!("Verbose!");
        println!("realm: '{}', guild: '{}'", settings.realm, settings.guild);
        for group in mapping.groups() {
            let ranks: Vec<String> = group.ranks.iter().map(u8::to_string).collect();
            println!("group '{}': ranks {}", group.label, ranks.join(", "));
        }
        println!("reading guild roster from {}...", settings.base_url);
    }

    let client = settings.client()?;
    let outline = guild_outline(
        &client,
        &mapping,
        &settings.guild,
        &settings.realm,
        &settings.base_url,
        unmapped,
    )?;
    if verbose {
        println!(
            "{} member(s) in {} group(s)",
            outline.member_count(),
            outline.groups.len()
        );
    }

    let xml = outline.to_xml();
    if !settings.write {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        return out
            .write_all(xml.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| CliRunError::from(DumpError::Stdout(e)));
    }

    // The outline is already indented; don't re-format it.
    let output = settings.output_options(false);
    let file = OutputFile::Outline {
        guild: settings.guild.clone(),
        realm: settings.realm.clone(),
    };
    match output.write(&file, xml.as_bytes())? {
        WriteOutcome::Written(path) => {
            if verbose {
                println!("wrote '{}'", path.display());
            }
        }
        WriteOutcome::Skipped(path) => {
            eprintln!(
                "Skipped {}: file exists (use -f to overwrite).",
                path.display()
            );
        }
    }
    Ok(())
}
