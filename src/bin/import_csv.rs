// src/bin/import_csv.rs
//
// Offline import: `import_csv <file.csv>`. Prints the outcome as JSON and
// exits with status 1 when any row was rejected.

use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use std::sync::Arc;
use talk_ledger::infra::{logging, AppConfig, StorageBackend};
use talk_ledger::{
    ImportFormat, ImportService, MemoryCatalog, PgCatalog, SpeakerService, Storage, TalkService,
};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;
    logging::init(config.json_logs);

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: import_csv <file.csv>");
        return Ok(ExitCode::from(2));
    };
    let file = File::open(&path).with_context(|| format!("cannot open {}", path))?;

    let storage = match config.backend {
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            Storage::from_backend(Arc::new(PgCatalog::connect(url, config.db_max_connections).await?))
        }
        StorageBackend::Memory => {
            warn!("STORAGE_BACKEND=memory: nothing will be kept after this run");
            Storage::from_backend(Arc::new(MemoryCatalog::new()))
        }
    };

    let speakers = Arc::new(SpeakerService::new(storage.speakers.clone()));
    let talks = Arc::new(TalkService::new(storage.talks.clone(), speakers.clone()));
    let imports = ImportService::new(speakers, talks, ImportFormat::default());

    let outcome = imports.import(BufReader::new(file)).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(if outcome.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
