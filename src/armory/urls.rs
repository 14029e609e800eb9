//! Request URLs for the armory XML endpoints.
//!
//! Builders are pure string formatting over a base host. Query values are
//! form-urlencoded, so spaces become `+` and plain ASCII names pass through unchanged.

use serde::Deserialize;
use url::form_urlencoded;

const EU_BASE_URL: &str = "http://eu.wowarmory.com/";
const US_BASE_URL: &str = "http://www.wowarmory.com/";

/// Regional armory host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Eu,
    Us,
}

impl Region {
    pub fn base_url(self) -> &'static str {
        match self {
            Region::Eu => EU_BASE_URL,
            Region::Us => US_BASE_URL,
        }
    }
}

/// Armory endpoints this tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CharacterSheet,
    GuildInfo,
    ItemInfo,
    ItemTooltip,
    CharacterFeed,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CharacterSheet => "character-sheet.xml",
            Endpoint::GuildInfo => "guild-info.xml",
            Endpoint::ItemInfo => "item-info.xml",
            Endpoint::ItemTooltip => "item-tooltip.xml",
            Endpoint::CharacterFeed => "character-feed.atom",
        }
    }
}

fn endpoint_url(base_url: &str, endpoint: Endpoint, params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let sep = if base_url.ends_with('/') { "" } else { "/" };
    format!("{}{}{}?{}", base_url, sep, endpoint.path(), query)
}

pub fn character_sheet_url(name: &str, realm: &str, base_url: &str) -> String {
    endpoint_url(base_url, Endpoint::CharacterSheet, &[("r", realm), ("n", name)])
}

pub fn guild_info_url(guild: &str, realm: &str, base_url: &str) -> String {
    endpoint_url(base_url, Endpoint::GuildInfo, &[("r", realm), ("n", guild)])
}

pub fn item_info_url(item_id: &str, base_url: &str) -> String {
    endpoint_url(base_url, Endpoint::ItemInfo, &[("i", item_id)])
}

pub fn item_tooltip_url(item_id: &str, base_url: &str) -> String {
    endpoint_url(base_url, Endpoint::ItemTooltip, &[("i", item_id)])
}

/// Activity feed of one character; used as the subscription link in OPML output.
pub fn character_feed_url(name: &str, realm: &str, base_url: &str) -> String {
    endpoint_url(base_url, Endpoint::CharacterFeed, &[("r", realm), ("cn", name)])
}
