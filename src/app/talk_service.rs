use crate::app::error::{ServiceError, ServiceResult};
use crate::app::speaker_service::SpeakerService;
use crate::domain::{CreateTalk, NewTalk, TalkView, UpdateTalk, WriteOutcome, YearMonth};
use crate::storage::paging::{Page, PageRequest};
use crate::storage::TalkStore;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct TalkService {
    store: Arc<dyn TalkStore>,
    speakers: Arc<SpeakerService>,
}

impl TalkService {
    pub fn new(store: Arc<dyn TalkStore>, speakers: Arc<SpeakerService>) -> Self {
        Self { store, speakers }
    }

    /// Writes the talk unless one with the same `(title, speaker_id, date)`
    /// is already stored. An existing match is not an error.
    pub async fn save_if_absent(&self, talk: &NewTalk) -> ServiceResult<WriteOutcome> {
        let outcome = self.store.save_if_absent(talk).await?;
        if outcome == WriteOutcome::AlreadyExisted {
            debug!(title = %talk.title, speaker_id = talk.speaker_id, date = %talk.date, "talk already stored");
        }
        Ok(outcome)
    }

    /// Explicit creation. `speaker_id` wins over `speaker_name`; a name is
    /// resolved through find-or-create.
    pub async fn create(&self, request: CreateTalk) -> ServiceResult<TalkView> {
        let speaker_id = match (request.speaker_id, request.speaker_name.as_deref()) {
            (Some(id), _) => match self.speakers.find_by_id(id).await {
                Ok(speaker) => speaker.id,
                Err(ServiceError::NotFound(_)) => {
                    return Err(ServiceError::InvalidInput(format!(
                        "Speaker not found with provided speakerId: {}",
                        id
                    )))
                }
                Err(other) => return Err(other),
            },
            (None, Some(name)) if !name.trim().is_empty() => {
                self.speakers.find_or_create(name).await?.id
            }
            _ => {
                return Err(ServiceError::InvalidInput(
                    "Either speakerId or a non-blank speakerName must be provided to create a talk."
                        .to_string(),
                ))
            }
        };

        let talk = checked_talk(
            request.title,
            &request.date,
            request.views,
            request.likes,
            request.link,
            speaker_id,
        )?;
        let created = self.store.insert(&talk).await?;
        info!(talk_id = created.id, speaker_id, "talk created");
        self.find_by_id(created.id).await
    }

    /// Replaces every field of an existing talk.
    pub async fn update(&self, id: i64, request: UpdateTalk) -> ServiceResult<TalkView> {
        let talk = checked_talk(
            request.title,
            &request.date,
            request.views,
            request.likes,
            request.link,
            request.speaker_id,
        )?;
        // Surfaces a missing speaker as NotFound rather than a storage conflict.
        self.speakers.find_by_id(talk.speaker_id).await?;

        self.store
            .update(id, &talk)
            .await?
            .ok_or_else(|| talk_not_found(id))?;
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.delete(id).await? {
            return Err(talk_not_found(id));
        }
        info!(talk_id = id, "talk deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<TalkView> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| talk_not_found(id))
    }

    pub async fn list(&self, request: &PageRequest) -> ServiceResult<Page<TalkView>> {
        Ok(self.store.list(request).await?)
    }
}

fn talk_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Talk not found with ID: {}", id))
}

fn checked_talk(
    title: String,
    date: &str,
    views: i64,
    likes: i64,
    link: Option<String>,
    speaker_id: i64,
) -> ServiceResult<NewTalk> {
    if title.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "Talk title cannot be empty".to_string(),
        ));
    }
    if views < 0 || likes < 0 {
        return Err(ServiceError::InvalidInput(
            "views and likes cannot be negative".to_string(),
        ));
    }
    let date: YearMonth = date.parse().map_err(|_| {
        ServiceError::InvalidInput(format!(
            "Invalid date format for date: '{}'. Expected format: yyyy-MM.",
            date
        ))
    })?;

    Ok(NewTalk {
        title,
        date,
        views,
        likes,
        link: link.filter(|l| !l.trim().is_empty()),
        speaker_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::paging::TALK_SORT;
    use crate::storage::{MemoryCatalog, SpeakerStore};

    fn services() -> (Arc<MemoryCatalog>, TalkService) {
        let catalog = Arc::new(MemoryCatalog::new());
        let speakers = Arc::new(SpeakerService::new(catalog.clone()));
        (catalog.clone(), TalkService::new(catalog, speakers))
    }

    fn create(title: &str, date: &str) -> CreateTalk {
        CreateTalk {
            title: title.to_string(),
            date: date.to_string(),
            views: 100,
            likes: 10,
            link: Some("https://ted.com/x".to_string()),
            speaker_id: None,
            speaker_name: Some("Jane Goodall".to_string()),
        }
    }

    #[tokio::test]
    async fn create_by_name_resolves_the_speaker() {
        let (catalog, talks) = services();
        let view = talks.create(create("Chimps", "2021-04")).await.unwrap();
        assert_eq!(view.speaker_name, "Jane Goodall");
        assert_eq!(view.date.to_string(), "2021-04");
        assert_eq!(catalog.speaker_count().await, 1);

        talks.create(create("Forests", "2021-05")).await.unwrap();
        assert_eq!(catalog.speaker_count().await, 1);
    }

    #[tokio::test]
    async fn speaker_id_takes_precedence_and_must_exist() {
        let (catalog, talks) = services();
        let speaker = SpeakerStore::insert(catalog.as_ref(), "Known").await.unwrap();

        let mut request = create("By id", "2020-01");
        request.speaker_id = Some(speaker.id);
        let view = talks.create(request).await.unwrap();
        assert_eq!(view.speaker_id, speaker.id);
        assert_eq!(view.speaker_name, "Known");

        let mut request = create("Ghost", "2020-01");
        request.speaker_id = Some(999);
        let err = talks.create(request).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidInput(ref m) if m == "Speaker not found with provided speakerId: 999"
        ));
    }

    #[tokio::test]
    async fn needs_some_speaker_and_a_canonical_date() {
        let (_, talks) = services();

        let mut request = create("Nobody", "2020-01");
        request.speaker_name = Some("  ".to_string());
        assert!(matches!(
            talks.create(request).await,
            Err(ServiceError::InvalidInput(ref m)) if m.starts_with("Either speakerId")
        ));

        let err = talks.create(create("Bad date", "January 2020")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid date format for date: 'January 2020'. Expected format: yyyy-MM."
        );
    }

    #[tokio::test]
    async fn update_replaces_fields_and_checks_references() {
        let (_, talks) = services();
        let view = talks.create(create("Draft", "2019-09")).await.unwrap();

        let updated = talks
            .update(
                view.id,
                UpdateTalk {
                    title: "Final".into(),
                    date: "2019-10".into(),
                    views: 5,
                    likes: 1,
                    link: None,
                    speaker_id: view.speaker_id,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.link, None);

        let missing_speaker = UpdateTalk {
            title: "Final".into(),
            date: "2019-10".into(),
            views: 5,
            likes: 1,
            link: None,
            speaker_id: 77,
        };
        assert!(matches!(
            talks.update(view.id, missing_speaker).await,
            Err(ServiceError::NotFound(_))
        ));

        let missing_talk = UpdateTalk {
            title: "Final".into(),
            date: "2019-10".into(),
            views: 5,
            likes: 1,
            link: None,
            speaker_id: view.speaker_id,
        };
        let err = talks.update(404, missing_talk).await.unwrap_err();
        assert_eq!(err.to_string(), "Talk not found with ID: 404");
    }

    #[tokio::test]
    async fn delete_and_list() {
        let (_, talks) = services();
        let b = talks.create(create("B", "2018-01")).await.unwrap();
        talks.create(create("A", "2018-01")).await.unwrap();

        let page = talks
            .list(&PageRequest::new(None, None, TALK_SORT.parse(None)))
            .await
            .unwrap();
        let titles: Vec<&str> = page.content.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        talks.delete(b.id).await.unwrap();
        assert!(matches!(talks.delete(b.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(talks.find_by_id(b.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn save_if_absent_reports_duplicates() {
        let (catalog, talks) = services();
        let speaker = SpeakerStore::insert(catalog.as_ref(), "S").await.unwrap();
        let talk = NewTalk {
            title: "T".into(),
            date: YearMonth::new(2022, 2).unwrap(),
            views: 1,
            likes: 1,
            link: None,
            speaker_id: speaker.id,
        };
        assert!(matches!(
            talks.save_if_absent(&talk).await.unwrap(),
            WriteOutcome::Inserted { .. }
        ));
        assert_eq!(
            talks.save_if_absent(&talk).await.unwrap(),
            WriteOutcome::AlreadyExisted
        );
        assert_eq!(catalog.talk_count().await, 1);
    }
}
