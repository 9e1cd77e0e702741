//! PostgreSQL catalog.
//!
//! Uniqueness lives in the schema: `speakers.name` and the talk natural key
//! `(title, speaker_id, date)` carry unique constraints. Save-if-absent is one
//! `ON CONFLICT DO NOTHING` insert; find-or-create reads first and only writes
//! for a name it has not seen.

use crate::domain::influence::EngagementTotals;
use crate::domain::{NewTalk, Speaker, Talk, TalkView, WriteOutcome, YearMonth};
use crate::storage::paging::{order_by_clause, Page, PageRequest};
use crate::storage::{
    EngagementSource, HealthProbe, SpeakerStore, StoreError, StoreResult, TalkStore,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

const CREATE_SPEAKERS: &str = "CREATE TABLE IF NOT EXISTS speakers (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)";

const CREATE_TALKS: &str = "CREATE TABLE IF NOT EXISTS talks (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    date TEXT NOT NULL CHECK (date ~ '^[0-9]{4}-[0-9]{2}$'),
    views BIGINT NOT NULL CHECK (views >= 0),
    likes BIGINT NOT NULL CHECK (likes >= 0),
    link TEXT,
    speaker_id BIGINT NOT NULL REFERENCES speakers(id) ON DELETE CASCADE,
    UNIQUE (title, speaker_id, date)
)";

const TALK_VIEW_SELECT: &str = "SELECT t.id, t.title, t.date, t.views, t.likes, t.link, t.speaker_id,
        s.name AS speaker_name
   FROM talks t
   JOIN speakers s ON s.id = t.speaker_id";

#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and makes sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let catalog = Self::new(pool);
        catalog.ensure_schema().await?;
        Ok(catalog)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_SPEAKERS).execute(&self.pool).await?;
        sqlx::query(CREATE_TALKS).execute(&self.pool).await?;
        info!("speakers/talks schema ready");
        Ok(())
    }
}

fn parse_date(raw: &str) -> StoreResult<YearMonth> {
    raw.parse::<YearMonth>()
        .map_err(|e| StoreError::Backend(anyhow::anyhow!("corrupt talk date: {}", e)))
}

fn speaker_from_row(row: &PgRow) -> StoreResult<Speaker> {
    Ok(Speaker {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn talk_from_row(row: &PgRow) -> StoreResult<Talk> {
    let date: String = row.try_get("date")?;
    Ok(Talk {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        date: parse_date(&date)?,
        views: row.try_get("views")?,
        likes: row.try_get("likes")?,
        link: row.try_get("link")?,
        speaker_id: row.try_get("speaker_id")?,
    })
}

fn talk_view_from_row(row: &PgRow) -> StoreResult<TalkView> {
    let talk = talk_from_row(row)?;
    Ok(TalkView {
        id: talk.id,
        title: talk.title,
        date: talk.date,
        views: talk.views,
        likes: talk.likes,
        link: talk.link,
        speaker_id: talk.speaker_id,
        speaker_name: row.try_get("speaker_name")?,
    })
}

#[async_trait]
impl SpeakerStore for PgCatalog {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Speaker>> {
        let row = sqlx::query("SELECT id, name FROM speakers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(speaker_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Speaker>> {
        let row = sqlx::query("SELECT id, name FROM speakers WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(speaker_from_row).transpose()
    }

    async fn find_or_create(&self, name: &str) -> StoreResult<Speaker> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }

        let row = sqlx::query(
            "WITH ins AS (
                 INSERT INTO speakers (name) VALUES ($1)
                 ON CONFLICT (name) DO NOTHING
                 RETURNING id, name
             )
             SELECT id, name FROM ins
             UNION ALL
             SELECT id, name FROM speakers WHERE name = $1
             LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return speaker_from_row(&row);
        }

        // A concurrent insert committed after this statement's snapshot.
        self.find_by_name(name).await?.ok_or_else(|| {
            StoreError::Backend(anyhow::anyhow!("speaker '{}' vanished during find-or-create", name))
        })
    }

    async fn insert(&self, name: &str) -> StoreResult<Speaker> {
        let row = sqlx::query("INSERT INTO speakers (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        speaker_from_row(&row)
    }

    async fn rename(&self, id: i64, name: &str) -> StoreResult<Option<Speaker>> {
        let row = sqlx::query("UPDATE speakers SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(speaker_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM speakers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, request: &PageRequest) -> StoreResult<Page<Speaker>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM speakers")
            .fetch_one(&self.pool)
            .await?;
        let sql = format!(
            "SELECT id, name FROM speakers {} LIMIT $1 OFFSET $2",
            order_by_clause(&request.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;
        let content = rows.iter().map(speaker_from_row).collect::<StoreResult<_>>()?;
        Ok(Page::new(content, request, total))
    }
}

#[async_trait]
impl TalkStore for PgCatalog {
    async fn save_if_absent(&self, talk: &NewTalk) -> StoreResult<WriteOutcome> {
        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO talks (title, date, views, likes, link, speaker_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (title, speaker_id, date) DO NOTHING
             RETURNING id",
        )
        .bind(&talk.title)
        .bind(talk.date.to_string())
        .bind(talk.views)
        .bind(talk.likes)
        .bind(&talk.link)
        .bind(talk.speaker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(id) => WriteOutcome::Inserted { id },
            None => WriteOutcome::AlreadyExisted,
        })
    }

    async fn insert(&self, talk: &NewTalk) -> StoreResult<Talk> {
        let row = sqlx::query(
            "INSERT INTO talks (title, date, views, likes, link, speaker_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, title, date, views, likes, link, speaker_id",
        )
        .bind(&talk.title)
        .bind(talk.date.to_string())
        .bind(talk.views)
        .bind(talk.likes)
        .bind(&talk.link)
        .bind(talk.speaker_id)
        .fetch_one(&self.pool)
        .await?;
        talk_from_row(&row)
    }

    async fn update(&self, id: i64, talk: &NewTalk) -> StoreResult<Option<Talk>> {
        let row = sqlx::query(
            "UPDATE talks
                SET title = $2, date = $3, views = $4, likes = $5, link = $6, speaker_id = $7
              WHERE id = $1
          RETURNING id, title, date, views, likes, link, speaker_id",
        )
        .bind(id)
        .bind(&talk.title)
        .bind(talk.date.to_string())
        .bind(talk.views)
        .bind(talk.likes)
        .bind(&talk.link)
        .bind(talk.speaker_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(talk_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM talks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<TalkView>> {
        let sql = format!("{} WHERE t.id = $1", TALK_VIEW_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(talk_view_from_row).transpose()
    }

    async fn list(&self, request: &PageRequest) -> StoreResult<Page<TalkView>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM talks")
            .fetch_one(&self.pool)
            .await?;
        let sql = format!(
            "{} {} LIMIT $1 OFFSET $2",
            TALK_VIEW_SELECT,
            order_by_clause(&request.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;
        let content = rows.iter().map(talk_view_from_row).collect::<StoreResult<_>>()?;
        Ok(Page::new(content, request, total))
    }
}

#[async_trait]
impl EngagementSource for PgCatalog {
    async fn engagement_totals(&self, year: Option<&str>) -> StoreResult<Vec<EngagementTotals>> {
        let mut sql = String::from(
            "SELECT s.id AS speaker_id,
                    s.name AS name,
                    SUM(t.views)::BIGINT AS total_views,
                    SUM(t.likes)::BIGINT AS total_likes
               FROM speakers s
               JOIN talks t ON t.speaker_id = s.id",
        );
        if year.is_some() {
            sql.push_str(" WHERE SUBSTRING(t.date, 1, 4) = $1");
        }
        sql.push_str(" GROUP BY s.id, s.name");

        let mut query = sqlx::query(&sql);
        if let Some(year) = year {
            query = query.bind(year);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> StoreResult<EngagementTotals> {
                Ok(EngagementTotals {
                    speaker_id: row.try_get("speaker_id")?,
                    name: row.try_get("name")?,
                    total_views: row.try_get("total_views")?,
                    total_likes: row.try_get("total_likes")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl HealthProbe for PgCatalog {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
