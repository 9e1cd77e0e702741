//! PostgreSQL catalog against a real database.
//!
//! Needs `DATABASE_URL`; every test returns early without it. Each test works
//! inside its own throwaway schema so tests can run side by side.

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::env;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use talk_ledger::storage::{EngagementSource, SpeakerStore, StoreError};
use talk_ledger::{
    ImportFormat, ImportService, InfluenceService, InfluenceStrategy, PgCatalog, SpeakerService,
    TalkService,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct Scratch {
    admin: PgPool,
    schema: String,
    catalog: Arc<PgCatalog>,
}

impl Scratch {
    async fn open(tag: &str) -> Result<Option<Self>, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();
        let Ok(url) = env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping {}", tag);
            return Ok(None);
        };

        let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let schema = format!("talk_ledger_{}_{}", tag, nanos);

        let admin = PgPoolOptions::new().max_connections(1).connect(&url).await?;
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await?;

        let search_path = schema.clone();
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .after_connect(move |conn, _meta| {
                let sql = format!("SET search_path TO {}", search_path);
                Box::pin(async move {
                    conn.execute(sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await?;

        let catalog = PgCatalog::new(pool);
        catalog.ensure_schema().await?;
        Ok(Some(Self {
            admin,
            schema,
            catalog: Arc::new(catalog),
        }))
    }

    fn importer(&self) -> ImportService {
        let speakers = Arc::new(SpeakerService::new(self.catalog.clone()));
        let talks = Arc::new(TalkService::new(self.catalog.clone(), speakers.clone()));
        ImportService::new(speakers, talks, ImportFormat::default())
    }

    async fn count(&self, table: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}.{}", self.schema, table))
            .fetch_one(&self.admin)
            .await
    }

    async fn teardown(self) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await?;
        Ok(())
    }
}

const BATCH: &str = "title,author,date,views,likes,link\n\
                     Talk 1,John Doe,January 2023,1000,100,http://example.com/1\n\
                     Talk 2,Jane Roe,February 2023,2000,350,http://example.com/2\n\
                     Talk 3,John Doe,March 2022,50000,9000,\n";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reimport_skips_stored_talks() -> TestResult {
    let Some(db) = Scratch::open("reimport").await? else {
        return Ok(());
    };
    let importer = db.importer();

    let first = importer.import(BATCH.as_bytes()).await;
    assert!(first.errors.is_empty(), "{:?}", first.errors);
    assert_eq!((first.imported_count, first.duplicate_count), (3, 0));

    let second = importer.import(BATCH.as_bytes()).await;
    assert!(second.errors.is_empty(), "{:?}", second.errors);
    assert_eq!((second.imported_count, second.duplicate_count), (3, 3));

    assert_eq!(db.count("speakers").await?, 2);
    assert_eq!(db.count("talks").await?, 3);

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_find_or_create_yields_one_speaker() -> TestResult {
    let Some(db) = Scratch::open("race").await? else {
        return Ok(());
    };
    let (a, b) = tokio::join!(
        db.catalog.find_or_create("Grace Hopper"),
        db.catalog.find_or_create("Grace Hopper")
    );
    let (a, b) = (a?, b?);
    assert_eq!(a.id, b.id);
    assert_eq!(a.name, "Grace Hopper");

    let again = db.catalog.find_or_create("Grace Hopper").await?;
    assert_eq!(again.id, a.id);
    assert_eq!(db.count("speakers").await?, 1);

    let duplicate = SpeakerStore::insert(db.catalog.as_ref(), "Grace Hopper").await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ranking_filters_by_year() -> TestResult {
    let Some(db) = Scratch::open("ranking").await? else {
        return Ok(());
    };
    db.importer().import(BATCH.as_bytes()).await;
    let influence = InfluenceService::new(db.catalog.clone(), InfluenceStrategy::Weighted);

    let ranked = influence.analyze(Some(2023)).await?;
    let summary: Vec<(&str, i64, i64, Decimal)> = ranked
        .iter()
        .map(|r| (r.name.as_str(), r.total_views, r.total_likes, r.score))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Jane Roe", 2000, 350, Decimal::new(1505, 0)),
            ("John Doe", 1000, 100, Decimal::new(730, 0)),
        ]
    );

    let all_time = influence.analyze(None).await?;
    assert_eq!(all_time[0].name, "John Doe");
    assert_eq!(all_time[0].total_views, 51000);

    assert!(influence.analyze(Some(1999)).await?.is_empty());
    let best = influence.most_influential(2022).await?.map(|m| m.name);
    assert_eq!(best.as_deref(), Some("John Doe"));

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overflowing_totals_are_a_backend_error() -> TestResult {
    let Some(db) = Scratch::open("overflow").await? else {
        return Ok(());
    };
    let max = i64::MAX;
    let csv = format!(
        "title,author,date,views,likes,link\n\
         A,Ada,January 2023,{max},1,\n\
         B,Ada,February 2023,1,1,\n"
    );
    let outcome = db.importer().import(csv.as_bytes()).await;
    assert_eq!(outcome.imported_count, 2);

    let err = db.catalog.engagement_totals(Some("2023")).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));

    db.teardown().await?;
    Ok(())
}
