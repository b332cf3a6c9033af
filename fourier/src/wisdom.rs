//! Persistent record of the best algorithm per transform size.
//!
//! Wisdom is stored as text, one record per line:
//!
//! ```text
//! size:precision:fingerprint:algorithm:timestamp
//! ```
//!
//! `precision` is `0` for `Complex<f32>` and `1` for `Complex<f64>`, `fingerprint` is
//! [`Features::fingerprint`], and `timestamp` is in seconds since the Unix epoch.  Blank lines
//! and lines starting with `#` are ignored.
//!
//! [`Features::fingerprint`]: struct.Features.html#method.fingerprint

use crate::error::Error;
use crate::features::Features;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const DELIMITER: char = ':';

/// Element precision of a transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Precision {
    /// `Complex<f32>`
    Complex64 = 0,
    /// `Complex<f64>`
    Complex128 = 1,
}

impl Precision {
    /// The numeric tag used in wisdom records.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Complex64),
            1 => Some(Self::Complex128),
            _ => None,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        })
    }
}

/// Identifies a transform on a particular machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WisdomKey {
    pub size: usize,
    pub precision: Precision,
    pub cpu_features: u64,
}

impl WisdomKey {
    pub fn new(size: usize, precision: Precision, cpu_features: u64) -> Self {
        Self {
            size,
            precision,
            cpu_features,
        }
    }
}

/// The algorithm chosen for a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WisdomEntry {
    pub key: WisdomKey,
    pub algorithm: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl WisdomEntry {
    pub fn new(key: WisdomKey, algorithm: impl Into<String>, timestamp: u64) -> Self {
        Self {
            key,
            algorithm: algorithm.into(),
            timestamp,
        }
    }

    /// Creates an entry stamped with the current time.
    pub fn now(key: WisdomKey, algorithm: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        Self::new(key, algorithm, timestamp)
    }

    fn parse(line: &str, number: usize) -> Result<Self, Error> {
        let malformed = |reason| Error::ImportFormat {
            line: number,
            content: line.to_string(),
            reason,
        };
        let fields = line.split(DELIMITER).collect::<Vec<_>>();
        if fields.len() != 5 {
            return Err(malformed("expected 5 fields"));
        }
        let size = fields[0]
            .parse::<usize>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| malformed("invalid size"))?;
        let precision = fields[1]
            .parse::<u8>()
            .ok()
            .and_then(Precision::from_tag)
            .ok_or_else(|| malformed("invalid precision"))?;
        let cpu_features = fields[2]
            .parse::<u64>()
            .map_err(|_| malformed("invalid capability fingerprint"))?;
        let algorithm = fields[3];
        if algorithm.is_empty() {
            return Err(malformed("empty algorithm name"));
        }
        let timestamp = fields[4]
            .parse::<u64>()
            .map_err(|_| malformed("invalid timestamp"))?;
        Ok(Self::new(
            WisdomKey::new(size, precision, cpu_features),
            algorithm,
            timestamp,
        ))
    }
}

impl std::fmt::Display for WisdomEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.key.size,
            self.key.precision.tag(),
            self.key.cpu_features,
            self.algorithm,
            self.timestamp
        )
    }
}

/// A thread-safe wisdom cache.
///
/// Any number of threads may read and write concurrently.  Concurrent stores to the same key
/// are last-write-wins.
#[derive(Debug, Default)]
pub struct Wisdom {
    entries: RwLock<HashMap<WisdomKey, WisdomEntry>>,
}

impl Wisdom {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, replacing any entry with the same key.
    pub fn store(&self, entry: WisdomEntry) {
        self.entries.write().insert(entry.key, entry);
    }

    pub fn lookup(&self, key: &WisdomKey) -> Option<WisdomEntry> {
        self.entries.read().get(key).cloned()
    }

    /// The algorithm recorded for a transform on a machine with `features`.
    pub fn lookup_algorithm(
        &self,
        size: usize,
        precision: Precision,
        features: &Features,
    ) -> Option<String> {
        let key = WisdomKey::new(size, precision, features.fingerprint());
        self.entries
            .read()
            .get(&key)
            .map(|entry| entry.algorithm.clone())
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// A snapshot of every entry, ordered by key.
    pub fn entries(&self) -> Vec<WisdomEntry> {
        let mut entries = self.entries.read().values().cloned().collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.key);
        entries
    }

    /// Writes every entry, ordered by key.
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writeln!(writer, "# fourier wisdom")?;
        writeln!(writer, "# size:precision:fingerprint:algorithm:timestamp")?;
        for entry in self.entries() {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads records and stores each in turn, returning how many were stored.
    ///
    /// Stops at the first malformed record.  Records before it remain stored.
    pub fn import<R: Read>(&self, reader: R) -> Result<usize, Error> {
        let mut imported = 0;
        for (index, raw) in BufReader::new(reader).split(b'\n').enumerate() {
            let raw = raw?;
            let line = std::str::from_utf8(&raw)
                .map_err(|_| Error::ImportFormat {
                    line: index + 1,
                    content: String::from_utf8_lossy(&raw).trim().to_string(),
                    reason: "invalid UTF-8",
                })?
                .trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.store(WisdomEntry::parse(line, index + 1)?);
            imported += 1;
        }
        tracing::debug!(imported, "imported wisdom");
        Ok(imported)
    }

    pub fn import_str(&self, wisdom: &str) -> Result<usize, Error> {
        self.import(wisdom.as_bytes())
    }

    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, Error> {
        self.import(File::open(path)?)
    }

    pub fn export_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        self.export(BufWriter::new(File::create(path)?))
    }
}

/// The process-wide wisdom cache used by default planners.
pub fn global_wisdom() -> Arc<Wisdom> {
    static GLOBAL: OnceLock<Arc<Wisdom>> = OnceLock::new();
    GLOBAL.get_or_init(|| Arc::new(Wisdom::new())).clone()
}
