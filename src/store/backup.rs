use crate::zone::Record;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Why a snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    /// Taken before an update overwrote the artifact
    Backup,
    /// Taken before the artifact was removed
    Deleted,
}

impl BackupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackupKind::Backup => "backup",
            BackupKind::Deleted => "deleted",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "backup" => Some(BackupKind::Backup),
            "deleted" => Some(BackupKind::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a stored snapshot, stored on disk as `<parent>.<kind>.<timestamp>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BackupId {
    #[serde(rename = "original_name")]
    pub parent: String,
    pub kind: BackupKind,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl BackupId {
    pub fn new(parent: impl Into<String>, kind: BackupKind, timestamp: u64) -> Self {
        Self {
            parent: parent.into(),
            kind,
            timestamp,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}.{}", self.parent, self.kind, self.timestamp)
    }

    /// Recover the identity from a stored object name.
    ///
    /// Returns `None` for snapshot-shaped names whose stamp does not fit a `u64`;
    /// use [`BackupId::is_backup_name`] to test the shape alone.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (parent, kind, stamp) = split_snapshot_name(file_name)?;
        Some(Self::new(parent, kind, stamp.parse().ok()?))
    }

    /// Whether `name` has the `<parent>.<kind>.<digits>` shape of a snapshot
    pub fn is_backup_name(name: &str) -> bool {
        split_snapshot_name(name).is_some()
    }
}

fn split_snapshot_name(file_name: &str) -> Option<(&str, BackupKind, &str)> {
    let (rest, stamp) = file_name.rsplit_once('.')?;
    if stamp.is_empty() || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (parent, tag) = rest.rsplit_once('.')?;
    let kind = BackupKind::from_tag(tag)?;
    if parent.is_empty() {
        return None;
    }

    Some((parent, kind, stamp))
}

impl Ord for BackupId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.kind.cmp(&other.kind))
            .then_with(|| self.parent.cmp(&other.parent))
    }
}

impl PartialOrd for BackupId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// A snapshot as returned by history listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backup {
    /// Name of the stored object holding the snapshot
    pub file_name: String,
    #[serde(flatten)]
    pub id: BackupId,
    pub size: u64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
}

impl Backup {
    pub fn kind(&self) -> BackupKind {
        self.id.kind
    }
}

/// Issues strictly increasing millisecond stamps for snapshot names
#[derive(Debug, Default)]
pub struct BackupClock {
    last: Mutex<u64>,
}

impl BackupClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_stamp(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut last = self.last.lock();
        *last = now.max(*last + 1);
        *last
    }
}
