//! In-process catalog behind a single `RwLock`.
//!
//! Each operation holds the lock for its whole read-then-write, which makes
//! find-or-create and save-if-absent atomic here.

use crate::domain::influence::EngagementTotals;
use crate::domain::{NewTalk, Speaker, Talk, TalkView, WriteOutcome};
use crate::storage::paging::{Direction, Page, PageRequest, SortKey};
use crate::storage::{
    EngagementSource, HealthProbe, SpeakerStore, StoreError, StoreResult, TalkStore,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    speakers: BTreeMap<i64, Speaker>,
    talks: BTreeMap<i64, Talk>,
    next_speaker_id: i64,
    next_talk_id: i64,
}

impl Tables {
    fn speaker_named(&self, name: &str) -> Option<&Speaker> {
        self.speakers.values().find(|s| s.name == name)
    }

    fn add_speaker(&mut self, name: &str) -> Speaker {
        self.next_speaker_id += 1;
        let speaker = Speaker {
            id: self.next_speaker_id,
            name: name.to_string(),
        };
        self.speakers.insert(speaker.id, speaker.clone());
        speaker
    }

    fn natural_key_taken(&self, talk: &NewTalk, except: Option<i64>) -> bool {
        self.talks.values().any(|t| {
            Some(t.id) != except
                && t.title == talk.title
                && t.speaker_id == talk.speaker_id
                && t.date == talk.date
        })
    }

    fn check_talk(&self, talk: &NewTalk, except: Option<i64>) -> StoreResult<()> {
        if !self.speakers.contains_key(&talk.speaker_id) {
            return Err(StoreError::Conflict(format!(
                "speaker {} does not exist",
                talk.speaker_id
            )));
        }
        if self.natural_key_taken(talk, except) {
            return Err(StoreError::Conflict(format!(
                "talk '{}' by speaker {} in {} already exists",
                talk.title, talk.speaker_id, talk.date
            )));
        }
        Ok(())
    }

    fn add_talk(&mut self, talk: &NewTalk) -> Talk {
        self.next_talk_id += 1;
        let stored = stored_talk(self.next_talk_id, talk);
        self.talks.insert(stored.id, stored.clone());
        stored
    }

    fn view(&self, talk: &Talk) -> TalkView {
        TalkView {
            id: talk.id,
            title: talk.title.clone(),
            date: talk.date,
            views: talk.views,
            likes: talk.likes,
            link: talk.link.clone(),
            speaker_id: talk.speaker_id,
            speaker_name: self
                .speakers
                .get(&talk.speaker_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn stored_talk(id: i64, talk: &NewTalk) -> Talk {
    Talk {
        id,
        title: talk.title.clone(),
        date: talk.date,
        views: talk.views,
        likes: talk.likes,
        link: talk.link.clone(),
        speaker_id: talk.speaker_id,
    }
}

fn apply_direction(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn compare_speakers(a: &Speaker, b: &Speaker, keys: &[SortKey]) -> Ordering {
    keys.iter().fold(Ordering::Equal, |acc, key| {
        acc.then_with(|| {
            let ordering = match key.field.property {
                "id" => a.id.cmp(&b.id),
                "name" => a.name.cmp(&b.name),
                _ => Ordering::Equal,
            };
            apply_direction(ordering, key.direction)
        })
    })
}

fn compare_talks(a: &TalkView, b: &TalkView, keys: &[SortKey]) -> Ordering {
    keys.iter().fold(Ordering::Equal, |acc, key| {
        acc.then_with(|| {
            let ordering = match key.field.property {
                "id" => a.id.cmp(&b.id),
                "title" => a.title.cmp(&b.title),
                "date" => a.date.cmp(&b.date),
                "views" => a.views.cmp(&b.views),
                "likes" => a.likes.cmp(&b.likes),
                "link" => a.link.cmp(&b.link),
                "speakerId" => a.speaker_id.cmp(&b.speaker_id),
                _ => Ordering::Equal,
            };
            apply_direction(ordering, key.direction)
        })
    })
}

fn page_of<T>(mut items: Vec<T>, request: &PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let start = (request.offset() as usize).min(items.len());
    let end = start.saturating_add(request.size as usize).min(items.len());
    let content = items.drain(start..end).collect();
    Page::new(content, request, total)
}

#[derive(Default)]
pub struct MemoryCatalog {
    tables: RwLock<Tables>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn speaker_count(&self) -> usize {
        self.tables.read().await.speakers.len()
    }

    pub async fn talk_count(&self) -> usize {
        self.tables.read().await.talks.len()
    }
}

#[async_trait]
impl SpeakerStore for MemoryCatalog {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Speaker>> {
        Ok(self.tables.read().await.speakers.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Speaker>> {
        Ok(self.tables.read().await.speaker_named(name).cloned())
    }

    async fn find_or_create(&self, name: &str) -> StoreResult<Speaker> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.speaker_named(name) {
            return Ok(existing.clone());
        }
        Ok(tables.add_speaker(name))
    }

    async fn insert(&self, name: &str) -> StoreResult<Speaker> {
        let mut tables = self.tables.write().await;
        if tables.speaker_named(name).is_some() {
            return Err(StoreError::Conflict(format!("speaker '{}' already exists", name)));
        }
        Ok(tables.add_speaker(name))
    }

    async fn rename(&self, id: i64, name: &str) -> StoreResult<Option<Speaker>> {
        let mut tables = self.tables.write().await;
        if tables.speaker_named(name).is_some_and(|s| s.id != id) {
            return Err(StoreError::Conflict(format!("speaker '{}' already exists", name)));
        }
        Ok(tables.speakers.get_mut(&id).map(|speaker| {
            speaker.name = name.to_string();
            speaker.clone()
        }))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.speakers.remove(&id).is_none() {
            return Ok(false);
        }
        tables.talks.retain(|_, t| t.speaker_id != id);
        Ok(true)
    }

    async fn list(&self, request: &PageRequest) -> StoreResult<Page<Speaker>> {
        let tables = self.tables.read().await;
        let mut speakers: Vec<Speaker> = tables.speakers.values().cloned().collect();
        speakers.sort_by(|a, b| compare_speakers(a, b, &request.sort));
        Ok(page_of(speakers, request))
    }
}

#[async_trait]
impl TalkStore for MemoryCatalog {
    async fn save_if_absent(&self, talk: &NewTalk) -> StoreResult<WriteOutcome> {
        let mut tables = self.tables.write().await;
        if tables.natural_key_taken(talk, None) {
            return Ok(WriteOutcome::AlreadyExisted);
        }
        tables.check_talk(talk, None)?;
        let stored = tables.add_talk(talk);
        Ok(WriteOutcome::Inserted { id: stored.id })
    }

    async fn insert(&self, talk: &NewTalk) -> StoreResult<Talk> {
        let mut tables = self.tables.write().await;
        tables.check_talk(talk, None)?;
        Ok(tables.add_talk(talk))
    }

    async fn update(&self, id: i64, talk: &NewTalk) -> StoreResult<Option<Talk>> {
        let mut tables = self.tables.write().await;
        if !tables.talks.contains_key(&id) {
            return Ok(None);
        }
        tables.check_talk(talk, Some(id))?;
        let stored = stored_talk(id, talk);
        tables.talks.insert(id, stored.clone());
        Ok(Some(stored))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.talks.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<TalkView>> {
        let tables = self.tables.read().await;
        Ok(tables.talks.get(&id).map(|t| tables.view(t)))
    }

    async fn list(&self, request: &PageRequest) -> StoreResult<Page<TalkView>> {
        let tables = self.tables.read().await;
        let mut talks: Vec<TalkView> = tables.talks.values().map(|t| tables.view(t)).collect();
        talks.sort_by(|a, b| compare_talks(a, b, &request.sort));
        Ok(page_of(talks, request))
    }
}

#[async_trait]
impl EngagementSource for MemoryCatalog {
    async fn engagement_totals(&self, year: Option<&str>) -> StoreResult<Vec<EngagementTotals>> {
        let tables = self.tables.read().await;
        let mut sums: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
        for talk in tables.talks.values() {
            let stored = talk.date.to_string();
            if year.is_some_and(|y| stored.get(..4) != Some(y)) {
                continue;
            }
            let entry = sums.entry(talk.speaker_id).or_default();
            match (entry.0.checked_add(talk.views), entry.1.checked_add(talk.likes)) {
                (Some(views), Some(likes)) => *entry = (views, likes),
                _ => {
                    return Err(StoreError::Backend(anyhow::anyhow!(
                        "engagement totals for speaker {} exceed the BIGINT range",
                        talk.speaker_id
                    )))
                }
            }
        }

        Ok(sums
            .into_iter()
            .filter_map(|(speaker_id, (views, likes))| {
                tables.speakers.get(&speaker_id).map(|s| EngagementTotals {
                    speaker_id,
                    name: s.name.clone(),
                    total_views: views,
                    total_likes: likes,
                })
            })
            .collect())
    }
}

#[async_trait]
impl HealthProbe for MemoryCatalog {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
