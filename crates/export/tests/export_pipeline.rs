//! Normalized packets through formatter and file exporter.

use chrono::{Local, TimeZone};
use meshdump_core::FormatterKind;
use meshdump_decoder::{normalize_at, DecodedData, NodeRecord, RawEnvelope};
use meshdump_export::{open_exporter, Formatter, CSV_HEADER};
use std::collections::HashMap;
use std::fs;

fn envelopes() -> Vec<RawEnvelope> {
    vec![
        RawEnvelope {
            from: 1,
            to: 2,
            id: 100,
            hop_start: Some(3),
            hop_limit: Some(3),
            decoded: Some(DecodedData::new("TEXT_MESSAGE_APP", b"first".to_vec())),
            ..Default::default()
        },
        RawEnvelope {
            from: 3,
            to: u32::MAX,
            id: 101,
            ..Default::default()
        },
    ]
}

#[test]
fn csv_file_holds_header_and_one_row_per_packet() {
    let dir = std::env::temp_dir().join(format!("meshdump-pipeline-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("packets.csv");
    let _ = fs::remove_file(&path);

    let mut nodes = HashMap::new();
    nodes.insert(1, NodeRecord::new(1, "!base0001").with_names("Base", "BS"));
    let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    let mut formatter = Formatter::new(FormatterKind::Csv);
    let mut exporter = open_exporter(Some(path.as_path())).unwrap();
    for envelope in envelopes() {
        let packet = normalize_at(&envelope, at, None, false, &nodes).unwrap();
        exporter.export(&formatter.format(&packet)).unwrap();
    }
    exporter.quit().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(
        lines[1],
        "2024-01-02 03:04:05.000000,100,Base,BS,!base0001,!00000002,0,TEXT_MESSAGE_APP,,,0,,,Message(content=first)"
    );
    assert_eq!(
        lines[2],
        "2024-01-02 03:04:05.000000,101,,,!00000003,!ffffffff,,ENCRYPTED,,,,,,"
    );

    fs::remove_dir_all(dir).unwrap();
}
