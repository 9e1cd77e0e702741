//! End-to-end: serve the router on an ephemeral port and upload a CSV over HTTP.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use talk_ledger::transport;
use talk_ledger::{ImportFormat, InfluenceStrategy, Storage};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn upload_then_rank() -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::in_memory();
    let app_state =
        transport::http::AppState::new(&storage, InfluenceStrategy::Weighted, ImportFormat::default());
    let router = transport::http::create_router(app_state);

    // Bind to an ephemeral port to avoid conflicts with a running server.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let base_url = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();

    let csv = "title,author,date,views,likes,link\n\
               Talk 1,John Doe,January 2023,1000,100,http://example.com/1\n\
               Talk 2,Jane Roe,February 2023,2000,350,http://example.com/2\n\
               Talk 3,Jane Roe,February 2023,oops,1,\n";
    let form = Form::new().part(
        "file",
        Part::bytes(csv.as_bytes().to_vec())
            .file_name("talks.csv")
            .mime_str("text/csv")?,
    );

    let resp = client
        .post(format!("{}/api/import/talks", base_url))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["importedCount"], 2);
    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["line"], 4);
    assert_eq!(errors[0]["kind"], "NUMBER_PARSE_ERROR");

    let ranked: Value = client
        .get(format!("{}/api/speakers/influence?year=2023", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ranked["data"][0]["name"], "Jane Roe");
    assert_eq!(ranked["data"][0]["score"], 1505.0);
    assert_eq!(ranked["data"][1]["score"], 730.0);

    let best: Value = client
        .get(format!("{}/api/speakers/influence/most-influential?year=2023", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(best["data"]["score"], "1505.00");

    server_handle.abort();
    Ok(())
}
