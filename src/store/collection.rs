use super::backup::{Backup, BackupClock, BackupId, BackupKind};
use super::constants::MAX_ARTIFACT_SIZE;
use crate::error::{Result, StoreError};
use crate::name_guard;
use crate::named_conf::ConfigLexValidator;
use crate::validation::ValidationResult;
use crate::zone::{Record, RecordParser, ZoneTemplate, ZoneValidator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

/// Which directory a collection manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Config,
    Zones,
}

/// What an artifact's content is, which decides how it is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Config,
    Zone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub kind: ArtifactKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactDocument {
    #[serde(flatten)]
    pub metadata: ArtifactMetadata,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    #[serde(flatten)]
    pub metadata: ArtifactMetadata,
    /// Snapshot of the previous content, absent when the update created the artifact
    pub backup: Option<String>,
    /// Records of the new content, for zone artifacts only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub name: String,
    pub backup: String,
}

/// A directory of named text artifacts plus their snapshots
#[derive(Debug)]
pub struct Collection {
    kind: CollectionKind,
    root: PathBuf,
    protected: Vec<String>,
    clock: Arc<BackupClock>,
}

impl Collection {
    /// Open a collection rooted at `root`, creating the directory if needed
    pub fn open(
        kind: CollectionKind,
        root: impl Into<PathBuf>,
        protected: Vec<String>,
        clock: Arc<BackupClock>,
    ) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::storage(&root, e))?;
        debug!("Opened {:?} collection at {}", kind, root.display());

        Ok(Self {
            kind,
            root,
            protected,
            clock,
        })
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.iter().any(|p| p == name)
    }

    /// Content kind implied by an artifact name in this collection
    pub fn artifact_kind(&self, name: &str) -> ArtifactKind {
        match self.kind {
            CollectionKind::Zones => ArtifactKind::Zone,
            CollectionKind::Config if name.ends_with(".zone") || name.starts_with("db.") => {
                ArtifactKind::Zone
            }
            CollectionKind::Config => ArtifactKind::Config,
        }
    }

    /// List artifacts sorted by name, never including snapshots
    pub fn list(&self) -> Result<Vec<ArtifactMetadata>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::storage(&self.root, e))?;
        let mut listed = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::storage(&self.root, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };

            if name.starts_with('.') || BackupId::is_backup_name(&name) || !self.is_listed(&name) {
                continue;
            }

            let path = entry.path();
            let meta = match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                // Removed between the directory scan and the stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::storage(&path, e)),
            };

            listed.push(self.describe(&name, &meta));
        }

        listed.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Listed {} artifacts in {:?} collection", listed.len(), self.kind);
        Ok(listed)
    }

    pub fn read(&self, name: &str) -> Result<ArtifactDocument> {
        check_safe(name)?;
        let path = self.path_for(name);

        let meta = self.stat_file(name, &path)?;
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::storage(&path, e),
        })?;

        let metadata = self.describe(name, &meta);
        let records = (metadata.kind == ArtifactKind::Zone).then(|| RecordParser::parse(&content));
        debug!("Read {} ({} bytes)", name, metadata.size);

        Ok(ArtifactDocument {
            metadata,
            content,
            records,
        })
    }

    pub fn create(&self, name: &str, content: &str) -> Result<ArtifactMetadata> {
        check_new_name(name)?;
        let path = self.path_for(name);

        if exists(&path)? {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        check_not_backup(name)?;
        self.check_content(name, content)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(name.to_string()),
                _ => StoreError::storage(&path, e),
            })?;
        file.write_all(content.as_bytes())
            .map_err(|e| StoreError::storage(&path, e))?;

        info!("Created {} in {:?} collection", name, self.kind);
        let meta = self.stat_file(name, &path)?;
        Ok(self.describe(name, &meta))
    }

    /// Overwrite an artifact, snapshotting the previous content first
    pub fn update(&self, name: &str, content: &str) -> Result<UpdateOutcome> {
        check_new_name(name)?;
        check_not_backup(name)?;
        self.check_content(name, content)?;
        let path = self.path_for(name);

        let previous = match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::storage(&path, e)),
        };

        let backup = previous
            .map(|bytes| self.write_backup(name, BackupKind::Backup, &bytes))
            .transpose()?;

        fs::write(&path, content).map_err(|e| StoreError::storage(&path, e))?;

        match &backup {
            Some(id) => info!("Updated {} (previous content in {})", name, id),
            None => info!("Created {} via update in {:?} collection", name, self.kind),
        }

        let meta = self.stat_file(name, &path)?;
        let metadata = self.describe(name, &meta);
        let records = (metadata.kind == ArtifactKind::Zone).then(|| RecordParser::parse(content));
        Ok(UpdateOutcome {
            metadata,
            backup: backup.map(|id| id.file_name()),
            records,
        })
    }

    /// Remove an artifact, snapshotting its content first
    pub fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        check_safe(name)?;
        check_not_backup(name)?;

        if self.kind == CollectionKind::Config && self.is_protected(name) {
            warn!("Refusing to delete protected configuration file {}", name);
            return Err(StoreError::Protected(name.to_string()));
        }

        let path = self.path_for(name);
        self.stat_file(name, &path)?;
        let previous = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::storage(&path, e),
        })?;

        let backup = self.write_backup(name, BackupKind::Deleted, &previous)?;
        fs::remove_file(&path).map_err(|e| StoreError::storage(&path, e))?;

        info!("Deleted {} (content kept in {})", name, backup);
        Ok(DeleteOutcome {
            name: name.to_string(),
            backup: backup.file_name(),
        })
    }

    /// All snapshots of `name`, newest first
    pub fn history(&self, name: &str) -> Result<Vec<Backup>> {
        check_safe(name)?;

        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::storage(&self.root, e))?;
        let with_records = self.artifact_kind(name) == ArtifactKind::Zone;
        let mut history = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::storage(&self.root, e))?;
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let Some((kind, suffix)) = snapshot_suffix(&file_name, name) else {
                continue;
            };

            let path = entry.path();
            let meta = match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::storage(&path, e)),
            };

            let timestamp = match suffix.parse::<u64>() {
                Ok(stamp) if suffix.bytes().all(|b| b.is_ascii_digit()) => stamp,
                _ => modified_millis(&meta),
            };

            let bytes = fs::read(&path).map_err(|e| StoreError::storage(&path, e))?;
            let content = String::from_utf8_lossy(&bytes).into_owned();
            let records = with_records.then(|| RecordParser::parse(&content));

            history.push(Backup {
                file_name,
                id: BackupId::new(name, kind, timestamp),
                size: meta.len(),
                content,
                records,
            });
        }

        history.sort_by(|a, b| b.id.cmp(&a.id).then_with(|| b.file_name.cmp(&a.file_name)));
        debug!("Found {} snapshots of {}", history.len(), name);
        Ok(history)
    }

    /// Run the validator matching the content kind `name` implies
    pub fn validate(&self, name: &str, content: &str) -> ValidationResult {
        match self.artifact_kind(name) {
            ArtifactKind::Zone => ZoneValidator::validate(content),
            ArtifactKind::Config => ConfigLexValidator::validate(content),
        }
    }

    /// Create a starter zone file from a template
    pub fn create_zone(&self, name: &str, template: &ZoneTemplate) -> Result<ArtifactDocument> {
        if self.kind != CollectionKind::Zones {
            return Err(StoreError::InvalidInput(
                "zone templates can only be created in the zones collection".to_string(),
            ));
        }
        template.check()?;

        let serial = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let content = template.render(serial);
        let metadata = self.create(name, &content)?;
        let records = Some(RecordParser::parse(&content));

        Ok(ArtifactDocument {
            metadata,
            content,
            records,
        })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn is_listed(&self, name: &str) -> bool {
        match self.kind {
            CollectionKind::Zones => true,
            CollectionKind::Config => {
                name.ends_with(".conf")
                    || name.ends_with(".zone")
                    || name.starts_with("named.")
                    || name.starts_with("db.")
            }
        }
    }

    fn stat_file(&self, name: &str, path: &Path) -> Result<fs::Metadata> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(meta),
            Ok(_) => Err(StoreError::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::storage(path, e)),
        }
    }

    fn describe(&self, name: &str, meta: &fs::Metadata) -> ArtifactMetadata {
        let zone_name = (self.kind == CollectionKind::Zones).then(|| zone_name_for(name));
        let modified_at = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        ArtifactMetadata {
            name: name.to_string(),
            kind: self.artifact_kind(name),
            zone_name,
            size: meta.len(),
            modified_at,
        }
    }

    fn check_content(&self, name: &str, content: &str) -> Result<()> {
        if content.len() > MAX_ARTIFACT_SIZE {
            return Err(StoreError::InvalidInput(format!(
                "content exceeds {} bytes",
                MAX_ARTIFACT_SIZE
            )));
        }

        let result = self.validate(name, content);
        if !result.valid {
            warn!(
                "Rejected write to {}: {} validation errors",
                name,
                result.errors.len()
            );
            return Err(StoreError::ValidationFailed {
                name: name.to_string(),
                errors: result.errors,
            });
        }
        Ok(())
    }

    /// Write a snapshot under a fresh name; existing snapshots are never overwritten
    fn write_backup(&self, name: &str, kind: BackupKind, content: &[u8]) -> Result<BackupId> {
        loop {
            let id = BackupId::new(name, kind, self.clock.next_stamp());
            let path = self.path_for(&id.file_name());

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content)
                        .and_then(|_| file.sync_all())
                        .map_err(|e| StoreError::storage(&path, e))?;
                    info!("Wrote {} snapshot {}", kind, id);
                    return Ok(id);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Snapshot name {} taken, retrying", id);
                }
                Err(e) => return Err(StoreError::storage(&path, e)),
            }
        }
    }
}

fn check_safe(name: &str) -> Result<()> {
    if name_guard::is_safe(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

fn check_new_name(name: &str) -> Result<()> {
    if name_guard::is_valid_new_name(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// Snapshots are write-once, so their names are never valid mutation targets
fn check_not_backup(name: &str) -> Result<()> {
    if BackupId::is_backup_name(name) {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

fn exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| StoreError::storage(path, e))
}

/// Kind and stamp suffix of a snapshot object belonging to `parent`
fn snapshot_suffix<'a>(file_name: &'a str, parent: &str) -> Option<(BackupKind, &'a str)> {
    let rest = file_name.strip_prefix(parent)?.strip_prefix('.')?;
    [BackupKind::Backup, BackupKind::Deleted]
        .into_iter()
        .find_map(|kind| {
            rest.strip_prefix(kind.as_str())
                .and_then(|r| r.strip_prefix('.'))
                .map(|suffix| (kind, suffix))
        })
}

fn modified_millis(meta: &fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}

/// Zone name implied by a zone file name: `db.example.com` and `example.com.zone`
/// both give `example.com`
pub fn zone_name_for(name: &str) -> String {
    if let Some(zone) = name.strip_prefix("db.") {
        zone.to_string()
    } else if let Some(zone) = name.strip_suffix(".zone") {
        zone.to_string()
    } else {
        name.to_string()
    }
}
