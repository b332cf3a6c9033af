use fourier::{Error, Features, Precision, Wisdom, WisdomEntry, WisdomKey};
use proptest::prelude::*;
use std::sync::Arc;

fn entry(
    size: usize,
    precision: Precision,
    cpu: u64,
    algorithm: &str,
    timestamp: u64,
) -> WisdomEntry {
    WisdomEntry::new(WisdomKey::new(size, precision, cpu), algorithm, timestamp)
}

fn records(wisdom: &Wisdom) -> Vec<String> {
    let mut exported = Vec::new();
    wisdom.export(&mut exported).unwrap();
    String::from_utf8(exported)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[test]
fn export_is_sorted() {
    let wisdom = Wisdom::new();
    wisdom.store(entry(256, Precision::Complex64, 3, "stockham", 20));
    wisdom.store(entry(128, Precision::Complex128, 0, "dit", 10));
    wisdom.store(entry(128, Precision::Complex64, 2, "sixstep", 30));
    wisdom.store(entry(128, Precision::Complex64, 0, "dit64", 1_700_000_000));
    assert_eq!(
        records(&wisdom),
        vec![
            "128:0:0:dit64:1700000000",
            "128:0:2:sixstep:30",
            "128:1:0:dit:10",
            "256:0:3:stockham:20",
        ]
    );
}

#[test]
fn import_skips_comments_and_blanks() {
    let wisdom = Wisdom::new();
    let imported = wisdom
        .import_str(
            "# header\n\n128:0:0:dit64:1700000000\n   \n  # indented comment\n64:1:2:stockham:5\r\n",
        )
        .unwrap();
    assert_eq!(imported, 2);
    assert_eq!(wisdom.len(), 2);
    assert_eq!(
        wisdom.lookup_algorithm(128, Precision::Complex64, &Features::generic()),
        Some("dit64".to_string())
    );
    assert_eq!(
        wisdom
            .lookup(&WisdomKey::new(64, Precision::Complex128, 2))
            .unwrap()
            .timestamp,
        5
    );
}

#[test]
fn malformed_import_keeps_earlier_records() {
    let wisdom = Wisdom::new();
    wisdom.store(entry(32, Precision::Complex64, 0, "dit", 1));
    let result = wisdom.import_str("64:0:0:stockham:2\n# comment\n128:0:0:dit\n256:0:0:dit:3\n");
    match result {
        Err(Error::ImportFormat { line, content, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(content, "128:0:0:dit");
        }
        other => panic!("unexpected result {:?}", other),
    }
    // records before the bad line are applied, records after it are not
    assert_eq!(wisdom.len(), 2);
    assert!(wisdom
        .lookup(&WisdomKey::new(64, Precision::Complex64, 0))
        .is_some());
    assert!(wisdom
        .lookup(&WisdomKey::new(256, Precision::Complex64, 0))
        .is_none());
}

#[test]
fn invalid_utf8_reports_the_line() {
    let wisdom = Wisdom::new();
    let result = wisdom.import(&b"128:0:0:dit:1\n\xff\xfe:0:0:dit:1\n512:0:0:dit:1\n"[..]);
    match result {
        Err(Error::ImportFormat {
            line,
            content,
            reason,
        }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "\u{fffd}\u{fffd}:0:0:dit:1");
            assert_eq!(reason, "invalid UTF-8");
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(wisdom.len(), 1);
    assert!(wisdom
        .lookup(&WisdomKey::new(128, Precision::Complex64, 0))
        .is_some());
}

#[test]
fn import_overwrites() {
    let wisdom = Wisdom::new();
    wisdom.store(entry(64, Precision::Complex64, 0, "dit", 1));
    wisdom.import_str("64:0:0:stockham:2").unwrap();
    assert_eq!(wisdom.len(), 1);
    assert_eq!(
        wisdom
            .lookup(&WisdomKey::new(64, Precision::Complex64, 0))
            .unwrap()
            .algorithm,
        "stockham"
    );
}

#[test]
fn clear() {
    let wisdom = Wisdom::new();
    wisdom.store(entry(64, Precision::Complex64, 0, "dit", 1));
    assert!(!wisdom.is_empty());
    wisdom.clear();
    assert!(wisdom.is_empty());
    assert_eq!(records(&wisdom), Vec::<String>::new());
}

#[test]
fn file_round_trip() {
    let path = std::env::temp_dir().join(format!("fourier-wisdom-{}.txt", std::process::id()));
    let wisdom = Wisdom::new();
    wisdom.store(entry(1024, Precision::Complex128, 6, "eightstep", 42));
    wisdom.store(entry(40, Precision::Complex64, 0, "recursive", 43));
    wisdom.export_file(&path).unwrap();

    let restored = Wisdom::new();
    assert_eq!(restored.import_file(&path).unwrap(), 2);
    assert_eq!(restored.entries(), wisdom.entries());
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(restored.import_file(&path), Err(Error::Io(_))));
}

#[test]
fn concurrent_readers_and_writers() {
    let wisdom = Arc::new(Wisdom::new());
    let handles = (0..8u64)
        .map(|thread| {
            let wisdom = wisdom.clone();
            std::thread::spawn(move || {
                for size in 1..=64 {
                    wisdom.store(entry(size, Precision::Complex64, thread % 2, "dit", thread));
                    assert!(wisdom
                        .lookup(&WisdomKey::new(size, Precision::Complex64, thread % 2))
                        .is_some());
                    let _ = wisdom.len();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }
    // one entry per key, whichever writer won
    assert_eq!(wisdom.len(), 128);
}

fn arbitrary_entry() -> impl Strategy<Value = WisdomEntry> {
    (
        1usize..1 << 20,
        prop_oneof![Just(Precision::Complex64), Just(Precision::Complex128)],
        0u64..16,
        "[a-z][a-z0-9_]{0,15}",
        any::<u64>(),
    )
        .prop_map(|(size, precision, cpu, algorithm, timestamp)| {
            entry(size, precision, cpu, &algorithm, timestamp)
        })
}

proptest! {
    #[test]
    fn export_import_is_idempotent(entries in prop::collection::vec(arbitrary_entry(), 0..32)) {
        let wisdom = Wisdom::new();
        for entry in entries {
            wisdom.store(entry);
        }
        let mut exported = Vec::new();
        wisdom.export(&mut exported).unwrap();

        let restored = Wisdom::new();
        prop_assert_eq!(restored.import(exported.as_slice()).unwrap(), wisdom.len());
        prop_assert_eq!(restored.entries(), wisdom.entries());
    }
}
