pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{ImportService, InfluenceService, ServiceError, SpeakerService, TalkService};
pub use domain::import::{ImportFormat, ImportOutcome};
pub use domain::influence::InfluenceStrategy;
pub use infra::config::AppConfig;
pub use storage::{MemoryCatalog, PgCatalog, Storage};
