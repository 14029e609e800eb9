//! OPML subscription outline: one outline per rank group, one feed per guild member.

use crate::armory::urls::{character_feed_url, guild_info_url};
use crate::armory::{Fetch, FetchError};
use crate::roster::{read_roster, RankMapping, RosterError, RosterMember};
use crate::xml::{xml_escape, xml_escape_attr, XML_DECLARATION};
use std::fmt;
use thiserror::Error;

const INDENT: &str = "    ";

/// What to do with a member whose rank is not in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedRanks {
    /// Fail the conversion with [RosterError::UnmappedRank].
    #[default]
    Error,
    /// Leave the member out of the document.
    Skip,
}

/// A single feed subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOutline {
    pub title: String,
    pub feed_url: String,
}

/// A rank group and the feeds nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutline {
    pub label: String,
    pub feeds: Vec<FeedOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineDocument {
    pub title: String,
    pub groups: Vec<GroupOutline>,
}

impl OutlineDocument {
    /// Group `members` under the outlines of `mapping`.
    ///
    /// Groups keep the mapping's order and members keep roster order within a group.
    pub fn build(
        mapping: &RankMapping,
        members: &[RosterMember],
        guild: &str,
        realm: &str,
        base_url: &str,
        unmapped: UnmappedRanks,
    ) -> Result<Self, RosterError> {
        let mut groups: Vec<GroupOutline> = mapping
            .groups()
            .iter()
            .map(|g| GroupOutline {
                label: g.label.clone(),
                feeds: Vec::new(),
            })
            .collect();

        for member in members {
            let Some(index) = mapping.group_index(member.rank) else {
                match unmapped {
                    UnmappedRanks::Error => {
                        return Err(RosterError::UnmappedRank {
                            name: member.name.clone(),
                            rank: member.rank,
                        })
                    }
                    UnmappedRanks::Skip => {
                        tracing::debug!(name = %member.name, rank = member.rank, "skipping unmapped rank");
                        continue;
                    }
                }
            };
            groups[index].feeds.push(FeedOutline {
                title: format!("WoW Feed for {}@{}", member.name, realm),
                feed_url: character_feed_url(&member.name, realm, base_url),
            });
        }

        Ok(Self {
            title: format!("{}@{}", guild, realm),
            groups,
        })
    }

    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.feeds.len()).sum()
    }

    /// Indented OPML 1.0, same as the `Display` output.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OutlineDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", XML_DECLARATION)?;
        writeln!(f, r#"<opml version="1.0">"#)?;
        writeln!(f, "{}<head>", INDENT)?;
        writeln!(f, "{0}{0}<title>{1}</title>", INDENT, xml_escape(&self.title))?;
        writeln!(f, "{}</head>", INDENT)?;
        writeln!(f, "{}<body>", INDENT)?;
        for group in &self.groups {
            let label = xml_escape_attr(&group.label);
            if group.feeds.is_empty() {
                writeln!(f, r#"{0}{0}<outline text="{1}" title="{1}"/>"#, INDENT, label)?;
                continue;
            }
            writeln!(f, r#"{0}{0}<outline text="{1}" title="{1}">"#, INDENT, label)?;
            for feed in &group.feeds {
                let title = xml_escape_attr(&feed.title);
                let url = xml_escape_attr(&feed.feed_url);
                writeln!(
                    f,
                    r#"{0}{0}{0}<outline text="{1}" title="{1}" type="rss" xmlUrl="{2}" htmlUrl="{2}"/>"#,
                    INDENT, title, url
                )?;
            }
            writeln!(f, "{0}{0}</outline>", INDENT)?;
        }
        writeln!(f, "{}</body>", INDENT)?;
        writeln!(f, "</opml>")
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// Fetch the guild roster of `guild@realm` and build its outline.
pub fn guild_outline<F: Fetch + ?Sized>(
    fetcher: &F,
    mapping: &RankMapping,
    guild: &str,
    realm: &str,
    base_url: &str,
    unmapped: UnmappedRanks,
) -> Result<OutlineDocument, ConvertError> {
    let body = fetcher.fetch(&guild_info_url(guild, realm, base_url))?;
    let xml = std::str::from_utf8(&body).map_err(|_| RosterError::NotUtf8)?;
    let members = read_roster(xml)?;
    Ok(OutlineDocument::build(
        mapping, &members, guild, realm, base_url, unmapped,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armory::Region;
    use roxmltree::Document;

    fn member(name: &str, rank: u8) -> RosterMember {
        RosterMember {
            name: name.to_string(),
            rank,
            level: None,
        }
    }

    #[test]
    fn empty_roster_has_group_headers_only() {
        let map = RankMapping::parse("013 2 4").unwrap();
        let doc = OutlineDocument::build(
            &map,
            &[],
            "Emerge",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap();
        assert_eq!(doc.groups.len(), 3);
        assert_eq!(doc.member_count(), 0);

        let xml = doc.to_xml();
        let parsed = Document::parse(&xml).unwrap();
        let body = parsed.descendants().find(|n| n.has_tag_name("body")).unwrap();
        let groups: Vec<_> = body.children().filter(|n| n.is_element()).collect();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.children().all(|c| !c.is_element())));
    }

    #[test]
    fn member_is_nested_under_its_rank_group() {
        let map = RankMapping::parse("01 5").unwrap();
        let doc = OutlineDocument::build(
            &map,
            &[member("Absolutus", 5)],
            "Emerge",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap();
        assert_eq!(doc.member_count(), 1);

        let xml = doc.to_xml();
        let parsed = Document::parse(&xml).unwrap();
        let feeds: Vec<_> = parsed
            .descendants()
            .filter(|n| n.attribute("type") == Some("rss"))
            .collect();
        assert_eq!(feeds.len(), 1);
        let feed = feeds[0];
        assert_eq!(
            feed.parent_element().and_then(|p| p.attribute("title")),
            Some("Raid Member")
        );
        assert_eq!(feed.attribute("text"), Some("WoW Feed for Absolutus@Trollbane"));
        let url = feed.attribute("xmlUrl").unwrap();
        assert!(url.contains("cn=Absolutus"));
        assert!(url.contains("r=Trollbane"));
        assert_eq!(feed.attribute("htmlUrl"), Some(url));
    }

    #[test]
    fn document_head_and_order() {
        let map = RankMapping::parse("5 0").unwrap();
        let members = [member("B", 0), member("A", 5), member("C", 0)];
        let doc = OutlineDocument::build(
            &map,
            &members,
            "Emerge",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap();
        assert_eq!(doc.title, "Emerge@Trollbane");
        assert_eq!(doc.groups[0].label, "Raid Member");
        assert_eq!(doc.groups[1].label, "Guild Master");
        let titles: Vec<&str> = doc.groups[1].feeds.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["WoW Feed for B@Trollbane", "WoW Feed for C@Trollbane"]);

        let xml = doc.to_xml();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<opml version=\"1.0\">\n"));
        assert!(xml.contains("        <title>Emerge@Trollbane</title>\n"));
        assert!(xml.contains("xmlUrl=\"http://eu.wowarmory.com/character-feed.atom?r=Trollbane&amp;cn=B\""));
    }

    #[test]
    fn unmapped_rank_is_an_error_unless_skipped() {
        let map = RankMapping::parse("0").unwrap();
        let members = [member("Boss", 0), member("Newbie", 6)];
        let err = OutlineDocument::build(
            &map,
            &members,
            "Emerge",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::UnmappedRank { ref name, rank: 6 } if name == "Newbie"));

        let doc = OutlineDocument::build(
            &map,
            &members,
            "Emerge",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Skip,
        )
        .unwrap();
        assert_eq!(doc.member_count(), 1);
    }

    struct StaticArmory(&'static str);

    impl Fetch for StaticArmory {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            assert!(url.contains("guild-info.xml?r=Bleeding+Hollow&n=Foo+Bar"), "{}", url);
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn guild_outline_fetches_and_groups_roster() {
        let armory = StaticArmory(
            r#"<page><guildInfo><guild><members>
                <character name="Aabacus" rank="1"/>
                <character name="Absolutus" rank="5"/>
            </members></guild></guildInfo></page>"#,
        );
        let map = RankMapping::parse("01 5").unwrap();
        let doc = guild_outline(
            &armory,
            &map,
            "Foo Bar",
            "Bleeding Hollow",
            Region::Us.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap();
        assert_eq!(doc.title, "Foo Bar@Bleeding Hollow");
        assert_eq!(doc.groups[0].feeds.len(), 1);
        assert_eq!(doc.groups[1].feeds.len(), 1);
        assert_eq!(
            doc.groups[1].feeds[0].feed_url,
            "http://www.wowarmory.com/character-feed.atom?r=Bleeding+Hollow&cn=Absolutus"
        );
    }

    #[test]
    fn guild_outline_reports_malformed_roster() {
        let map = RankMapping::parse("0").unwrap();
        let result = guild_outline(
            &StaticArmory("<page>"),
            &map,
            "Foo Bar",
            "Bleeding Hollow",
            Region::Us.base_url(),
            UnmappedRanks::Error,
        );
        assert!(matches!(result, Err(ConvertError::Roster(RosterError::Xml(_)))));
    }

    #[test]
    fn display_writes_the_whole_document() {
        let map = RankMapping::parse("0").unwrap();
        let doc = OutlineDocument::build(
            &map,
            &[member("Boss", 0)],
            "Emerge",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap();
        let xml = doc.to_xml();
        assert_eq!(xml, format!("{}", doc));
        assert!(xml.ends_with("    </body>\n</opml>\n"));
        assert_eq!(xml.matches("type=\"rss\"").count(), 1);
    }

    #[test]
    fn markup_in_names_is_escaped() {
        let map = RankMapping::parse("0").unwrap();
        let doc = OutlineDocument::build(
            &map,
            &[member("A<b>", 0)],
            "Cats & Dogs",
            "Trollbane",
            Region::Eu.base_url(),
            UnmappedRanks::Error,
        )
        .unwrap();
        let xml = doc.to_xml();
        assert!(Document::parse(&xml).is_ok());
        assert!(xml.contains("<title>Cats &amp; Dogs@Trollbane</title>"));
    }
}
