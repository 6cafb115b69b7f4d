use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::types::Action;
use crate::window::WINDOW_BYTES;

fn make_test_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn tick(tick: u64, fill: char, decision: Decision) -> TickRecord {
    TickRecord { tick, window: fill.to_string().repeat(WINDOW_BYTES), decision }
}

#[test]
fn schema_roundtrip_header_and_records() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "roundtrip.jsonl");
    let policy = Policy { detonate_trees: false, spend_charges_on_return: true };

    let mut writer = JournalWriter::create(&path, "test-build", policy).unwrap();
    writer.append(&tick(0, ' ', Decision::Act(Action::Forward))).unwrap();
    writer.append(&tick(1, '*', Decision::Act(Action::Detonate))).unwrap();
    writer.append(&tick(2, '~', Decision::Stalled)).unwrap();

    let journal = load_journal_from_file(&path).unwrap();
    assert_eq!(journal.format_version, JOURNAL_FORMAT_VERSION);
    assert_eq!(journal.build_id, "test-build");
    assert_eq!(journal.policy, policy);
    assert_eq!(journal.records.len(), 3);
    assert_eq!(journal.records[1], tick(1, '*', Decision::Act(Action::Detonate)));
    assert_eq!(journal.records[2].decision, Decision::Stalled);
}

#[test]
fn every_line_links_to_the_previous_digest() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "links.jsonl");

    let mut writer = JournalWriter::create(&path, "dev", Policy::default()).unwrap();
    writer.append(&tick(0, ' ', Decision::Act(Action::Forward))).unwrap();
    writer.append(&tick(1, ' ', Decision::Act(Action::TurnLeft))).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<ChainedLine> =
        content.lines().skip(1).map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines[0].prev_digest, GENESIS_DIGEST);
    assert_eq!(lines[1].prev_digest, lines[0].digest);
    assert_eq!(lines[1].entry.seq, 1);
}

#[test]
fn swapped_lines_break_the_chain() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "swapped.jsonl");

    let mut writer = JournalWriter::create(&path, "dev", Policy::default()).unwrap();
    writer.append(&tick(0, ' ', Decision::Act(Action::Forward))).unwrap();
    writer.append(&tick(1, ' ', Decision::Act(Action::Forward))).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    fs::write(&path, format!("{}\n{}\n{}\n", lines[0], lines[2], lines[1])).unwrap();

    assert!(matches!(
        load_journal_from_file(&path),
        Err(JournalLoadError::InvalidRecord { line: 2, .. })
    ));
}

#[test]
fn hash_chain_detects_tampered_record() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "tampered.jsonl");

    let mut writer = JournalWriter::create(&path, "dev", Policy::default()).unwrap();
    writer.append(&tick(0, ' ', Decision::Act(Action::Forward))).unwrap();
    writer.append(&tick(1, ' ', Decision::Act(Action::TurnRight))).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    assert!(lines.len() >= 3, "expected header + 2 records");

    lines[2] = lines[2].replace("TurnRight", "TurnLeft");
    fs::write(&path, lines.join("\n") + "\n").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 3 })),
        "expected hash chain broken at line 3, got: {result:?}"
    );
}

#[test]
fn hash_chain_detects_deleted_record() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "deleted.jsonl");

    let mut writer = JournalWriter::create(&path, "dev", Policy::default()).unwrap();
    for i in 0..3 {
        writer.append(&tick(i, ' ', Decision::Act(Action::Forward))).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    let tampered = format!("{}\n{}\n{}\n", lines[0], lines[1], lines[3]);
    fs::write(&path, tampered).unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(
            result,
            Err(JournalLoadError::HashChainBroken { .. })
                | Err(JournalLoadError::InvalidRecord { .. })
        ),
        "expected chain corruption error, got: {result:?}"
    );
}

#[test]
fn truncated_last_line_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "truncated.jsonl");

    let mut writer = JournalWriter::create(&path, "dev", Policy::default()).unwrap();
    writer.append(&tick(0, ' ', Decision::Act(Action::Forward))).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"seq\":1,\"tick").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::IncompleteLine { line: 3 })),
        "expected incomplete line at line 3, got: {result:?}"
    );
}

#[test]
fn empty_file_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "empty.jsonl");
    fs::write(&path, "").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::EmptyFile)),
        "expected EmptyFile error, got: {result:?}"
    );
}

#[test]
fn header_only_file_loads_empty_journal() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "header_only.jsonl");

    let _writer = JournalWriter::create(&path, "dev", Policy::default()).unwrap();

    let journal = load_journal_from_file(&path).unwrap();
    assert!(journal.records.is_empty());
    assert_eq!(journal.policy, Policy::default());
}

#[test]
fn invalid_header_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "bad_header.jsonl");
    fs::write(&path, "not valid json\n").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::InvalidHeader { line: 1, .. })),
        "expected invalid header error, got: {result:?}"
    );
}

#[test]
fn unsupported_format_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "future.jsonl");
    fs::write(
        &path,
        "{\"format_version\":99,\"build_id\":\"dev\",\"policy\":{\"detonate_trees\":true}}\n",
    )
    .unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::InvalidHeader { line: 1, .. })),
        "expected version rejection, got: {result:?}"
    );
}
