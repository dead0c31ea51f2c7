use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use trackerkit_formats::{Registry, RegistryConfig};
use trackerkit_probe::{OutputFormat, ProbeStatus, collect_files, probe_all, write_report};

fn protracker() -> Vec<u8> {
    let mut data = vec![0u8; 1084 + 64 * 4 * 4];
    data[..12].copy_from_slice(b"space debris");
    data[950] = 1;
    data[1080..1084].copy_from_slice(b"M.K.");
    data[1084..1088].copy_from_slice(&[0x03, 0x58, 0x10, 0x00]);
    data
}

fn populate(root: &Path) {
    fs::write(root.join("debris.mod"), protracker()).unwrap();
    fs::write(root.join("notes.txt"), b"not a module").unwrap();
    fs::create_dir(root.join("amiga")).unwrap();
    let mut player = vec![0u8; 0x24];
    for at in [0, 8, 16, 24] {
        player[at..at + 2].copy_from_slice(&0x2B7Cu16.to_be_bytes());
    }
    player[0x20..0x22].copy_from_slice(&0x303Cu16.to_be_bytes());
    fs::write(root.join("amiga").join("JPO.dragons"), player).unwrap();
}

#[test]
fn recursive_scan_reports_every_file() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let files = collect_files(&[dir.path().to_path_buf()], true).unwrap();
    assert_eq!(files.len(), 3);
    let records = probe_all(&Registry::standard(), &files, None);

    let summary: Vec<(Option<&str>, ProbeStatus)> =
        records.iter().map(|r| (r.tag, r.status)).collect();
    assert_eq!(
        summary,
        vec![
            (Some("JPO"), ProbeStatus::Decoded),
            (Some("MOD"), ProbeStatus::Decoded),
            (None, ProbeStatus::Unrecognised),
        ]
    );
    assert_eq!(records[0].song_name.as_deref(), Some("dragons (Steve Turner) [JPO]"));
    assert_eq!(records[1].song_name.as_deref(), Some("space debris [MOD]"));
    assert_eq!(records[1].channels, Some(4));
    assert_eq!(records[1].instruments, Some(31));
}

#[test]
fn config_switches_off_filename_detection() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let config = RegistryConfig {
        filename_detection: false,
        ..RegistryConfig::default()
    };

    let files = collect_files(&[dir.path().join("amiga")], false).unwrap();
    let records = probe_all(&Registry::with_config(&config), &files, None);
    assert_eq!(records[0].status, ProbeStatus::Unrecognised);
}

#[test]
fn json_report_round_trips_through_serde() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let files = collect_files(&[dir.path().to_path_buf()], false).unwrap();
    let records = probe_all(&Registry::standard(), &files, None);

    let mut out = Vec::new();
    write_report(&records, OutputFormat::Json, false, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["format"], "ProTracker");
    assert_eq!(rows[0]["policy"], "full");
    assert_eq!(rows[1]["status"], "unrecognised");
}
