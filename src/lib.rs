pub mod config;
pub mod error;
pub mod name_guard;
pub mod named_conf;
pub mod store;
pub mod validation;
pub mod zone;

pub use config::StoreConfig;
pub use error::{ConfigError, Result, StoreError};
pub use named_conf::ConfigLexValidator;
pub use store::{ArtifactStore, Collection, CollectionKind};
pub use validation::ValidationResult;
pub use zone::{Record, RecordParser, ZoneTemplate, ZoneValidator};
