pub mod error;
pub mod import_service;
pub mod influence_service;
pub mod speaker_service;
pub mod talk_service;

pub use error::{ServiceError, ServiceResult};
pub use import_service::ImportService;
pub use influence_service::InfluenceService;
pub use speaker_service::SpeakerService;
pub use talk_service::TalkService;
