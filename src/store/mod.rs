pub mod backup;
pub mod collection;

pub use backup::{Backup, BackupClock, BackupId, BackupKind};
pub use collection::{
    ArtifactDocument, ArtifactKind, ArtifactMetadata, Collection, CollectionKind, DeleteOutcome,
    UpdateOutcome,
};

use crate::config::StoreConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

/// Store constants
pub mod constants {
    /// Largest artifact body accepted for a write (10MB)
    pub const MAX_ARTIFACT_SIZE: usize = 10 * 1024 * 1024;
}

/// The configuration and zone collections of one DNS server
#[derive(Debug)]
pub struct ArtifactStore {
    config: Collection,
    zones: Collection,
}

impl ArtifactStore {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        // One clock for both collections keeps snapshot stamps unique per store
        let clock = Arc::new(BackupClock::new());

        let store = Self {
            config: Collection::open(
                CollectionKind::Config,
                &config.config_dir,
                config.protected_files.clone(),
                clock.clone(),
            )?,
            zones: Collection::open(CollectionKind::Zones, &config.records_dir, Vec::new(), clock)?,
        };

        info!(
            "Artifact store ready (config: {}, records: {})",
            config.config_dir.display(),
            config.records_dir.display()
        );
        Ok(store)
    }

    pub fn config(&self) -> &Collection {
        &self.config
    }

    pub fn zones(&self) -> &Collection {
        &self.zones
    }

    pub fn collection(&self, kind: CollectionKind) -> &Collection {
        match kind {
            CollectionKind::Config => &self.config,
            CollectionKind::Zones => &self.zones,
        }
    }
}
