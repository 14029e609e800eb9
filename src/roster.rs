//! Guild ranks and roster: the rank-to-group mapping and members read from guild-info XML.

use roxmltree::{Document, Node};
use thiserror::Error;

/// Ranks are single digits.
pub const RANK_COUNT: usize = 10;

/// Default human-readable rank names, indexed by rank.
pub const DEFAULT_RANK_NAMES: [&str; RANK_COUNT] = [
    "Guild Master",
    "Officer",
    "Officers alt",
    "Raid Leader",
    "?Loot Council?",
    "Raid Member",
    "Trial",
    "Alts",
    "Social",
    "Social Alts",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankMapError {
    #[error("Rank map is empty. Example: --map \"013 2 4\"")]
    Empty,

    #[error("Invalid rank '{0}' in rank map: ranks are single digits 0-9.")]
    InvalidRank(char),

    #[error("Rank {0} appears more than once in the rank map.")]
    DuplicateRank(u8),

    #[error("Rank {0} has no name (configure rank_names).")]
    UnnamedRank(u8),

    #[error("Two rank groups are both named '{0}'.")]
    DuplicateLabel(String),
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Guild roster is not valid UTF-8.")]
    NotUtf8,

    #[error("Could not parse guild roster: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Roster member #{index} has no '{attribute}' attribute.")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    #[error("Roster member '{name}' has invalid rank '{value}'.")]
    InvalidRank { name: String, value: String },

    #[error("Member '{name}' has rank {rank}, which is not in the rank map. Add it to --map or pass --skip-unmapped.")]
    UnmappedRank { name: String, rank: u8 },
}

/// A set of ranks shown under one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGroup {
    /// Rank names joined with ", " in the order the ranks were given.
    pub label: String,
    pub ranks: Vec<u8>,
}

/// Mapping from rank to group, built from a string like `"013 2 4"`.
///
/// Each whitespace-separated token is one group; each digit in it is a rank.
/// Ranks not listed belong to no group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMapping {
    groups: Vec<RankGroup>,
    by_rank: [Option<usize>; RANK_COUNT],
}

impl RankMapping {
    /// Parse with the default rank names.
    pub fn parse(map: &str) -> Result<Self, RankMapError> {
        Self::parse_with_names(map, &DEFAULT_RANK_NAMES)
    }

    /// Parse using `names[rank]` as the name of each rank.
    pub fn parse_with_names<S: AsRef<str>>(map: &str, names: &[S]) -> Result<Self, RankMapError> {
        let mut groups: Vec<RankGroup> = Vec::new();
        let mut by_rank = [None; RANK_COUNT];

        for token in map.split_whitespace() {
            let mut ranks = Vec::with_capacity(token.len());
            let mut rank_names = Vec::with_capacity(token.len());
            for c in token.chars() {
                let rank = c
                    .to_digit(10)
                    .map(|d| d as u8)
                    .ok_or(RankMapError::InvalidRank(c))?;
                if by_rank[rank as usize].is_some() || ranks.contains(&rank) {
                    return Err(RankMapError::DuplicateRank(rank));
                }
                let name = names
                    .get(rank as usize)
                    .map(|n| AsRef::<str>::as_ref(n))
                    .filter(|n| !n.trim().is_empty())
                    .ok_or(RankMapError::UnnamedRank(rank))?;
                ranks.push(rank);
                rank_names.push(name);
            }
            let label = rank_names.join(", ");
            if groups.iter().any(|g| g.label == label) {
                return Err(RankMapError::DuplicateLabel(label));
            }
            let index = groups.len();
            for &rank in &ranks {
                by_rank[rank as usize] = Some(index);
            }
            groups.push(RankGroup { label, ranks });
        }

        if groups.is_empty() {
            return Err(RankMapError::Empty);
        }
        Ok(Self { groups, by_rank })
    }

    /// Groups in the order they were given.
    pub fn groups(&self) -> &[RankGroup] {
        &self.groups
    }

    /// Index into [groups](Self::groups) for `rank`, if the rank is mapped.
    pub fn group_index(&self, rank: u8) -> Option<usize> {
        self.by_rank.get(rank as usize).copied().flatten()
    }

    pub fn group_for(&self, rank: u8) -> Option<&RankGroup> {
        self.group_index(rank).map(|i| &self.groups[i])
    }
}

/// One `character` entry of a guild roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub name: String,
    pub rank: u8,
    pub level: Option<u32>,
}

/// Element kinds on the path to a roster entry: guildInfo/guild/members/character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuildNode {
    GuildInfo,
    Guild,
    Members,
    Character,
}

impl GuildNode {
    fn of(node: Node<'_, '_>) -> Option<Self> {
        if !node.is_element() {
            return None;
        }
        match node.tag_name().name() {
            "guildInfo" => Some(GuildNode::GuildInfo),
            "guild" => Some(GuildNode::Guild),
            "members" => Some(GuildNode::Members),
            "character" => Some(GuildNode::Character),
            _ => None,
        }
    }

    /// The element kind a node of this kind must sit directly inside.
    fn parent(self) -> Option<Self> {
        match self {
            GuildNode::Character => Some(GuildNode::Members),
            GuildNode::Members => Some(GuildNode::Guild),
            GuildNode::Guild => Some(GuildNode::GuildInfo),
            GuildNode::GuildInfo => None,
        }
    }
}

/// True for a `character` element under guildInfo/guild/members.
fn is_roster_entry(node: Node<'_, '_>) -> bool {
    let mut kind = GuildNode::Character;
    let mut current = node;
    if GuildNode::of(current) != Some(kind) {
        return false;
    }
    while let Some(expected) = kind.parent() {
        match current.parent_element() {
            Some(parent) if GuildNode::of(parent) == Some(expected) => {
                kind = expected;
                current = parent;
            }
            _ => return false,
        }
    }
    true
}

/// Read roster members from a guild-info document, in document order.
///
/// Only `character` elements under guildInfo/guild/members count; other
/// `character` elements (e.g. in a guild header) are ignored.
pub fn read_roster(xml: &str) -> Result<Vec<RosterMember>, RosterError> {
    let doc = Document::parse(xml)?;
    let mut members = Vec::new();
    for node in doc.descendants().filter(|n| is_roster_entry(*n)) {
        let index = members.len() + 1;
        let name = node
            .attribute("name")
            .ok_or(RosterError::MissingAttribute {
                index,
                attribute: "name",
            })?;
        let rank_value = node
            .attribute("rank")
            .ok_or(RosterError::MissingAttribute {
                index,
                attribute: "rank",
            })?;
        let rank = rank_value
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|r| (*r as usize) < RANK_COUNT)
            .ok_or_else(|| RosterError::InvalidRank {
                name: name.to_string(),
                value: rank_value.to_string(),
            })?;
        members.push(RosterMember {
            name: name.to_string(),
            rank,
            level: node.attribute("level").and_then(|l| l.parse().ok()),
        });
    }
    tracing::debug!(members = members.len(), "read guild roster");
    Ok(members)
}
