//! Feed fetch and parse tests against a local mock HTTP server
//!
//! Covers redirect following (absolute and relative Location), the redirect
//! depth bound, fatal non-2xx responses, and the header column contract.

use bcp_ingest::config::FeedConfig;
use bcp_ingest::fetch::fetch_feed;
use bcp_ingest::mapper::HeaderIndex;
use bcp_ingest::parse::feed_reader;
use bcp_ingest::IngestError;
use futures::StreamExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAMPLE_FEED: &str = "\
bookId,title,author,rating,description,language,isbn,bookFormat,edition,pages,publisher,publishDate,firstPublishDate,likedPercent,price
1,\"A, Part One\",Smith,4.5,,,1111,,,100,,2020-01-01,,90,9.99
2,B,Smith,N/A,,,2222,,,200,,2020-02-01,,80,19.99
";

fn feed_config(url: String) -> FeedConfig {
    FeedConfig {
        url,
        connect_timeout_secs: 5,
        read_timeout_secs: 10,
        max_redirects: 5,
    }
}

fn csv_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/csv")
}

#[tokio::test]
async fn fetches_and_parses_the_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books.csv"))
        .respond_with(csv_response(SAMPLE_FEED))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/books.csv", server.uri()));
    let response = fetch_feed(&config).await.unwrap();

    let mut reader = feed_reader(response);
    let header = reader.headers().await.unwrap().clone();
    let index = HeaderIndex::from_header(&header).unwrap();

    let mut rows = Vec::new();
    let mut records = reader.records();
    while let Some(record) = records.next().await {
        rows.push(index.map_record(&record.unwrap()));
    }

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].book.book_id, 1);
    assert_eq!(rows[0].book.title, "A, Part One");
    assert_eq!(rows[0].author, "Smith");
    // Dirty rating degrades instead of aborting.
    assert_eq!(rows[1].book.rating, sqlx::types::BigDecimal::from(0));
}

#[tokio::test]
async fn follows_relative_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/moved"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(csv_response(SAMPLE_FEED))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/old", server.uri()));
    let response = fetch_feed(&config).await.unwrap();
    assert!(response.url().path().ends_with("/moved"));
}

#[tokio::test]
async fn follows_absolute_redirects() {
    let server = MockServer::start().await;
    let target = format!("{}/books.csv", server.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", target.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/books.csv"))
        .respond_with(csv_response(SAMPLE_FEED))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/old", server.uri()));
    let response = fetch_feed(&config).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn redirect_loop_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/loop", server.uri()));
    match fetch_feed(&config).await {
        Err(IngestError::TooManyRedirects { limit, .. }) => assert_eq!(limit, 5),
        other => panic!("expected TooManyRedirects, got {other:?}"),
    }
}

#[tokio::test]
async fn redirect_without_location_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/broken", server.uri()));
    match fetch_feed(&config).await {
        Err(IngestError::Fetch { reason, .. }) => assert!(reason.contains("Location")),
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/missing", server.uri()));
    match fetch_feed(&config).await {
        Err(IngestError::Fetch { reason, .. }) => assert!(reason.contains("404")),
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_isbn_column_violates_header_contract() {
    let server = MockServer::start().await;
    let body = "\
bookId,title,author,rating,description,language,bookFormat,edition,pages,publisher,publishDate,firstPublishDate,likedPercent,price
1,A,Smith,4.5,,,,,100,,2020-01-01,,90,9.99
";
    Mock::given(method("GET"))
        .and(path("/books.csv"))
        .respond_with(csv_response(body))
        .mount(&server)
        .await;

    let config = feed_config(format!("{}/books.csv", server.uri()));
    let response = fetch_feed(&config).await.unwrap();
    let mut reader = feed_reader(response);
    let header = reader.headers().await.unwrap().clone();

    match HeaderIndex::from_header(&header) {
        Err(IngestError::MissingColumn(column)) => assert_eq!(column, "isbn"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}
