//! armoread: read guild, character and item XML from the WoW Armory, and turn a guild
//! roster into an OPML file of character feeds grouped by rank.

pub mod armory;
pub mod cli;
pub mod config;
pub mod dump;
pub mod logging;
pub mod opml;
pub mod output;
pub mod roster;
pub mod xml;

// Re-exports for the binaries and consumers.
pub use armory::{ArmoryClient, ArmoryClientBuilder, Fetch, FetchError, Region};
pub use dump::{dump_all, DumpError, DumpOptions, DumpReport, DumpTarget, Sink};
pub use opml::{guild_outline, ConvertError, OutlineDocument, UnmappedRanks};
pub use output::{OutputError, OutputFile, OutputOptions, Overwrite, WriteOutcome};
pub use roster::{read_roster, RankMapError, RankMapping, RosterError, RosterMember};
