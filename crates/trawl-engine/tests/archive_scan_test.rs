mod common;

use common::{
    aes_zip_bytes, corrupt_local_header, drain, write_encrypted_zip, write_tar, write_tar_gz,
    write_zip, zip_bytes, Harness, RULES,
};
use trawl_core::{FileDescriptor, Triage};
use trawl_engine::{DiagnosticLevel, DiscoveredObject, ObjectKind, ENCRYPTED_ARCHIVE_RULE};
use trawl_rules::Action;

#[test]
fn test_keep_member_by_extension() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("a.zip");
    write_zip(&archive, &[("readme.md", "nothing here"), ("passwords.xlsx", "cells")]);

    assert!(engine.archives().scan_archive(&archive));

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].descriptor,
        FileDescriptor::member(&archive, "passwords.xlsx")
    );
    assert_eq!(results[0].rule_name.as_str(), "KeepSpreadsheets");
    assert_eq!(results[0].triage, Triage::Red);
}

#[test]
fn test_no_matching_members() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("plain.zip");
    write_zip(&archive, &[("docs/", ""), ("docs/readme.md", "hello"), ("logo.png", "png")]);

    assert!(!engine.archives().scan_archive(&archive));

    let (results, diagnostics) = drain(&mut receiver);
    assert!(results.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_fully_encrypted_archive() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("secret.zip");
    write_encrypted_zip(
        &archive,
        &[("passwords.xlsx", "cells"), ("config.ini", "password=hunter2")],
        None,
    );

    assert!(!engine.archives().scan_archive(&archive));

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rule_name.as_str(), ENCRYPTED_ARCHIVE_RULE);
    assert_eq!(results[0].triage, Triage::HIGHEST);
    assert_eq!(results[0].descriptor, FileDescriptor::path(&archive));
    assert!(results[0].is_encrypted_archive());
    assert!(harness.scratch_is_empty());
}

#[test]
fn test_aes_encrypted_archive() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("vault.zip");
    std::fs::write(
        &archive,
        aes_zip_bytes(&[("passwords.xlsx", "cells"), ("config.ini", "password=hunter2")]),
    )
    .expect("write zip");

    assert!(!engine.archives().scan_archive(&archive));

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert!(results[0].is_encrypted_archive());
    assert_eq!(results[0].rule_name.as_str(), ENCRYPTED_ARCHIVE_RULE);
    assert_eq!(results[0].triage, Triage::Black);
    assert_eq!(results[0].descriptor, FileDescriptor::path(&archive));
    assert!(harness.scratch_is_empty());
}

#[test]
fn test_corrupt_member_header_spares_siblings() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("a.zip");
    let mut bytes = zip_bytes(&[("readme.txt", "hello"), ("passwords.xlsx", "x")]);
    corrupt_local_header(&mut bytes, "readme.txt");
    assert_eq!(bytes[0], b'X');
    std::fs::write(&archive, bytes).expect("write zip");

    assert!(engine.archives().scan_archive(&archive));
    assert!(harness.scratch_is_empty());

    let (results, diagnostics) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rule_name.as_str(), "KeepSpreadsheets");
    assert_eq!(
        results[0].descriptor,
        FileDescriptor::member(&archive, "passwords.xlsx")
    );
    // The damaged member's relay reports its own failure
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].level, DiagnosticLevel::Trace);
    assert!(diagnostics[0].message.contains("readme.txt"));
}

#[test]
fn test_encrypted_member_aborts_only_its_relay() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("mixed.zip");
    write_encrypted_zip(
        &archive,
        &[("config.ini", "password=hunter2"), ("notes.md", "hello")],
        Some("config.ini"),
    );

    assert!(!engine.archives().scan_archive(&archive));

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert!(results[0].is_encrypted_archive());
    assert_eq!(results[0].descriptor, FileDescriptor::path(&archive));
    assert!(harness.scratch_is_empty());
}

#[test]
fn test_relay_extracts_matches_and_cleans_up() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("cfg.zip");
    write_zip(&archive, &[("etc/config.ini", "[db]\nuser=app\npassword=hunter2\n")]);

    assert!(engine.archives().scan_archive(&archive));
    assert!(!engine
        .archives()
        .scratch()
        .path_for(&archive, "etc/config.ini")
        .exists());
    assert!(harness.scratch_is_empty());

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.rule_name.as_str(), "PasswordAssignments");
    assert_eq!(result.triage, Triage::Black);
    assert_eq!(result.action, Some(Action::Keep));
    assert_eq!(
        result.relayed_by.as_ref().map(|name| name.as_str()),
        Some("RelayConfigs")
    );
    assert_eq!(result.descriptor, FileDescriptor::member(&archive, "etc/config.ini"));
    assert!(result
        .context
        .as_deref()
        .is_some_and(|context| context.contains("password=hunter2")));
}

#[test]
fn test_relay_without_content_match_cleans_up() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("cfg.zip");
    write_zip(&archive, &[("config.ini", "[db]\nuser=app\nport=5432\n")]);

    assert!(!engine.archives().scan_archive(&archive));
    assert!(harness.scratch_is_empty());

    let (results, _) = drain(&mut receiver);
    assert!(results.is_empty());
}

#[test]
fn test_relay_to_enumeration_rule_is_a_config_error() {
    let rules = RULES.replace(
        "relay_target = \"PasswordAssignments\"",
        "relay_target = \"KeepSpreadsheets\"",
    );
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(&rules);
    let archive = harness.path("cfg.zip");
    write_zip(
        &archive,
        &[("config.ini", "password=hunter2"), ("payroll.xlsx", "cells")],
    );

    // The misconfigured relay yields nothing, the sibling member still matches
    assert!(engine.archives().scan_archive(&archive));

    let (results, diagnostics) = drain(&mut receiver);
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("RelayConfigs"));

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].descriptor,
        FileDescriptor::member(&archive, "payroll.xlsx")
    );
    assert!(harness.scratch_is_empty());
}

#[test]
fn test_misconfigured_member_returns_false() {
    let rules = RULES.replace(
        "relay_target = \"PasswordAssignments\"",
        "relay_target = \"KeepSpreadsheets\"",
    );
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(&rules);
    let archive = harness.path("cfg.zip");
    write_zip(&archive, &[("config.ini", "password=hunter2")]);

    assert!(!engine.archives().scan_archive(&archive));

    let (results, diagnostics) = drain(&mut receiver);
    assert!(results.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].level, DiagnosticLevel::Error);
}

#[test]
fn test_discard_precedes_keep_for_members() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("logs.zip");
    // Matches DiscardLogs by extension and KeepPasswordNames by name
    write_zip(&archive, &[("passwords.log", "password=hunter2")]);

    assert!(engine.archives().scan_archive(&archive));

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rule_name.as_str(), "DiscardLogs");
    assert_eq!(results[0].action, Some(Action::Discard));
}

#[test]
fn test_scanning_twice_is_idempotent() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("mixed.zip");
    write_zip(
        &archive,
        &[
            ("a/passwords.xlsx", "cells"),
            ("a/config.ini", "password=one"),
            ("b/app.txt", "password=two"),
            ("b/readme.md", "hello"),
        ],
    );

    assert!(engine.archives().scan_archive(&archive));
    let (first, _) = drain(&mut receiver);
    assert!(harness.scratch_is_empty());

    assert!(engine.archives().scan_archive(&archive));
    let (second, _) = drain(&mut receiver);
    assert!(harness.scratch_is_empty());

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_tar_members() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("home.tar");
    write_tar(
        &archive,
        &[
            ("home/app/settings.ini", "password=hunter2"),
            ("home/readme.md", "hello"),
        ],
    );

    assert!(engine.archives().scan_archive(&archive));
    assert!(harness.scratch_is_empty());

    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].descriptor,
        FileDescriptor::member(&archive, "home/app/settings.ini")
    );
}

#[test]
fn test_tar_gz_members() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("backup.tgz");
    write_tar_gz(
        &archive,
        &[("finance/q3.xlsx", "cells"), ("etc/app.ini", "password=hunter2")],
    );

    assert!(engine.archives().scan_archive(&archive));
    assert!(harness.scratch_is_empty());

    let (results, _) = drain(&mut receiver);
    let rules: Vec<_> = results.iter().map(|r| r.rule_name.as_str()).collect();
    assert_eq!(rules, vec!["KeepSpreadsheets", "PasswordAssignments"]);
}

#[test]
fn test_unreadable_container_is_traced() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("broken.zip");
    std::fs::write(&archive, "definitely not a zip file").expect("write file");

    assert!(!engine.archives().scan_archive(&archive));

    let (results, diagnostics) = drain(&mut receiver);
    assert!(results.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].level, DiagnosticLevel::Trace);
}

#[test]
fn test_member_limit_stops_enumeration() {
    let mut harness = Harness::new();
    harness.config.limits.max_archive_members = 2;
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("many.zip");
    write_zip(
        &archive,
        &[("one.md", "1"), ("two.md", "2"), ("three.xlsx", "3")],
    );

    assert!(!engine.archives().scan_archive(&archive));

    let (results, diagnostics) = drain(&mut receiver);
    assert!(results.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("member limit"));
}

#[test]
fn test_oversized_member_is_not_extracted() {
    let mut harness = Harness::new();
    harness.config.limits.max_extract_bytes = 16;
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("big.zip");
    let body = format!("password=hunter2\n{}", "x".repeat(64));
    write_zip(&archive, &[("config.ini", body.as_str())]);

    assert!(!engine.archives().scan_archive(&archive));
    assert!(harness.scratch_is_empty());

    let (results, diagnostics) = drain(&mut receiver);
    assert!(results.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("extraction limit"));
}

#[test]
fn test_engine_routes_containers() {
    let harness = Harness::new();
    let (engine, mut receiver) = harness.engine(RULES);
    let archive = harness.path("a.zip");
    write_zip(&archive, &[("passwords.xlsx", "cells")]);

    let object = DiscoveredObject::new(&archive, ObjectKind::Container);
    assert!(engine.classify(&object));
    let (results, _) = drain(&mut receiver);
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0].descriptor,
        FileDescriptor::ArchiveMember { .. }
    ));

    // As a plain file, only the archive's own name is inspected
    let object = DiscoveredObject::new(&archive, ObjectKind::File);
    assert!(!engine.classify(&object));
}
