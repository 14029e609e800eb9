//! Integration test: dump characters, items and a guild through the real HTTP client
//! against a local armory stand-in.

mod common;

use armoread::armory::DEFAULT_USER_AGENT;
use armoread::{
    dump_all, ArmoryClient, DumpError, DumpOptions, DumpTarget, FetchError, OutputOptions,
    Overwrite, Sink,
};
use std::fs;
use tempfile::tempdir;

fn character(name: &str) -> DumpTarget {
    DumpTarget::Character {
        realm: "Trollbane".into(),
        name: name.into(),
    }
}

#[test]
fn failed_character_does_not_stop_the_next_one() {
    let server = common::start(&[
        (
            "/character-sheet.xml?r=Trollbane&n=Aabacus",
            "<page><character name=\"Aabacus\"/></page>",
        ),
        (
            "/character-sheet.xml?r=Trollbane&n=Absolutus",
            "<page><character name=\"Absolutus\"/></page>",
        ),
    ]);
    let dir = tempdir().unwrap();
    let opts = OutputOptions {
        root: dir.path().to_path_buf(),
        create_dirs: true,
        ..OutputOptions::default()
    };
    let client = ArmoryClient::builder().timeout_secs(10).build().unwrap();
    let targets = [character("Aabacus"), character("Missing"), character("Absolutus")];

    let report = dump_all(
        &client,
        &server.base_url,
        &targets,
        &mut Sink::Files(&opts),
        &DumpOptions::default(),
    );

    assert_eq!(server.seen().targets.len(), 3);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].1,
        DumpError::Fetch(FetchError::HttpStatus { status: 404, .. })
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("chars/Absolutus.xml")).unwrap(),
        "<page><character name=\"Absolutus\"/></page>"
    );
    assert!(dir.path().join("chars/Aabacus.xml").is_file());
    assert!(!dir.path().join("chars/Missing.xml").exists());
}

#[test]
fn requests_carry_the_browser_user_agent() {
    let server = common::start(&[("/item-info.xml?i=51218", "<page/>"), (
        "/item-tooltip.xml?i=51218",
        "<page/>",
    )]);
    let client = ArmoryClient::new().unwrap();
    let mut out = Vec::new();
    let report = dump_all(
        &client,
        &server.base_url,
        &[DumpTarget::Item { id: "51218".into() }],
        &mut Sink::Stdout {
            out: &mut out,
            pretty: false,
        },
        &DumpOptions::default(),
    );
    assert!(report.is_success());
    assert_eq!(out, b"<page/><page/>");
    let seen = server.seen();
    assert_eq!(
        seen.targets,
        ["/item-info.xml?i=51218", "/item-tooltip.xml?i=51218"]
    );
    assert!(seen.user_agents.iter().all(|ua| ua == DEFAULT_USER_AGENT));
}

#[test]
fn guild_dump_respects_force_flag() {
    let server = common::start(&[(
        "/guild-info.xml?r=Bleeding+Hollow&n=Foo+Bar",
        "<page><guildInfo/></page>",
    )]);
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("guilds")).unwrap();
    let existing = dir.path().join("guilds/Bleeding Hollow - Foo Bar.xml");
    fs::write(&existing, "old").unwrap();
    let client = ArmoryClient::new().unwrap();
    let targets = [DumpTarget::Guild {
        realm: "Bleeding Hollow".into(),
        guild: "Foo Bar".into(),
    }];

    let keep = OutputOptions {
        root: dir.path().to_path_buf(),
        ..OutputOptions::default()
    };
    let report = dump_all(
        &client,
        &server.base_url,
        &targets,
        &mut Sink::Files(&keep),
        &DumpOptions::default(),
    );
    assert_eq!(report.skipped, [existing.clone()]);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "old");

    let force = OutputOptions {
        overwrite: Overwrite::Replace,
        pretty: true,
        ..keep
    };
    let report = dump_all(
        &client,
        &server.base_url,
        &targets,
        &mut Sink::Files(&force),
        &DumpOptions::default(),
    );
    assert_eq!(report.written, [existing.clone()]);
    assert_eq!(
        fs::read_to_string(&existing).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<page>\n    <guildInfo/>\n</page>\n"
    );
}
