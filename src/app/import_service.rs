//! Drives a batch through decode, validation, speaker resolution and the
//! idempotent talk write.
//!
//! Every row is persisted on its own: a failure on one row never undoes the
//! rows written before it, and re-running a batch skips what is already there.

use crate::app::error::ServiceResult;
use crate::app::speaker_service::SpeakerService;
use crate::app::talk_service::TalkService;
use crate::domain::import::{
    decode, validate, ErrorKind, ImportError, ImportFormat, ImportOutcome, ValidRow,
};
use crate::domain::{NewTalk, WriteOutcome};
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ImportService {
    speakers: Arc<SpeakerService>,
    talks: Arc<TalkService>,
    format: ImportFormat,
}

impl ImportService {
    pub fn new(speakers: Arc<SpeakerService>, talks: Arc<TalkService>, format: ImportFormat) -> Self {
        Self {
            speakers,
            talks,
            format,
        }
    }

    pub async fn import<R: Read + Send>(&self, source: R) -> ImportOutcome {
        let batch = match decode(source, &self.format) {
            Ok(batch) => batch,
            Err(fatal) => {
                warn!(error = %fatal.message, "import aborted");
                return ImportOutcome::failed(fatal);
            }
        };

        let mut outcome = ImportOutcome {
            errors: batch.errors,
            ..ImportOutcome::default()
        };

        for decoded in batch.rows {
            let verdict = validate(&decoded.row, decoded.line, &self.format);
            if verdict.has_error() {
                debug!(line = decoded.line, errors = verdict.errors.len(), "row rejected");
                outcome.errors.extend(verdict.errors);
                continue;
            }
            let Some(row) = verdict.row else {
                continue;
            };

            match self.persist(&row).await {
                Ok(written) => {
                    outcome.imported_count += 1;
                    if written == WriteOutcome::AlreadyExisted {
                        outcome.duplicate_count += 1;
                    }
                }
                Err(cause) => {
                    warn!(line = decoded.line, title = %row.title, error = %cause, "row not saved");
                    outcome.errors.push(ImportError::new(
                        decoded.line,
                        ErrorKind::GenericError,
                        format!("Error saving record for title '{}': {}", row.title, cause),
                    ));
                }
            }
        }

        info!(
            imported = outcome.imported_count,
            duplicates = outcome.duplicate_count,
            errors = outcome.errors.len(),
            "import finished"
        );
        outcome
    }

    async fn persist(&self, row: &ValidRow) -> ServiceResult<WriteOutcome> {
        let speaker = self.speakers.find_or_create(&row.author).await?;
        self.talks
            .save_if_absent(&NewTalk {
                title: row.title.clone(),
                date: row.date,
                views: row.views,
                likes: row.likes,
                link: row.link.clone(),
                speaker_id: speaker.id,
            })
            .await
    }
}
