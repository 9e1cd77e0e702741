//! Domain types and the pure parts of the pipeline (decode, validate, score, rank).

pub mod import;
pub mod influence;
pub mod speaker;
pub mod talk;

pub use speaker::{Speaker, SpeakerPayload};
pub use talk::{CreateTalk, NewTalk, Talk, TalkView, UpdateTalk, WriteOutcome, YearMonth};
