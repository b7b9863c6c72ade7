//! REST行ストアのHTTP経路のテスト（スタブサーバ相手）

use chrono::NaiveDate;
use daily_report_common::{Entry, ImageSource};
use serde_json::{json, Value};
use site_daily_report::config::RemoteCredentials;
use site_daily_report::error::ReportError;
use site_daily_report::store::remote::photo_object_name;
use site_daily_report::store::{EntryFilter, EntryStore, RemoteStore};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/rest/v1/daily_reports";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn remote_store(server: &MockServer) -> RemoteStore {
    RemoteStore::new(
        reqwest::Client::new(),
        RemoteCredentials {
            url: server.uri(),
            key: "test-key".into(),
        },
        "photos",
    )
}

fn row(id: &str, site: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "entry_date": "2024-03-05",
        "site": site,
        "area": null,
        "category_progress": {"Demolition": 80},
        "photo_urls": [],
        "created_at": created_at
    })
}

#[tokio::test]
async fn test_insert_uploads_photos_before_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/photos/[0-9a-f]{64}\.png$"))
        .and(header("x-upsert", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
    let mut entry = Entry::blank(date(2024, 3, 5));
    entry.site = "Prime 11 Unit 213".into();
    entry.add_photo(ImageSource::remote("https://cdn.example.com/before.jpg"));
    entry.add_photo(ImageSource::inline("image/png", png.clone()));
    entry.add_photo(ImageSource::remote("https://cdn.example.com/after.jpg"));

    remote_store(&server).insert(&entry).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.path().starts_with("/storage/v1/object/photos/"));
    assert_eq!(requests[0].body, png);
    assert_eq!(requests[1].url.path(), TABLE_PATH);

    let body: Value = requests[1].body_json().unwrap();
    let uploaded = format!(
        "{}/storage/v1/object/public/photos/{}",
        server.uri(),
        photo_object_name("image/png", &png)
    );
    assert_eq!(
        body["photo_urls"],
        json!(["https://cdn.example.com/before.jpg", uploaded, "https://cdn.example.com/after.jpg"])
    );
    assert_eq!(body["site"], "Prime 11 Unit 213");
    assert_eq!(body["entry_date"], "2024-03-05");
}

#[tokio::test]
async fn test_insert_server_error_is_upload_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let entry = Entry::blank(date(2024, 3, 5));
    let result = remote_store(&server).insert(&entry).await;
    assert!(matches!(result, Err(ReportError::UploadFailure(_))));
}

#[tokio::test]
async fn test_failed_photo_upload_skips_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/photos/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut entry = Entry::blank(date(2024, 3, 5));
    entry.add_photo(ImageSource::inline("image/jpeg", vec![0xFF, 0xD8, 0xFF]));

    let result = remote_store(&server).insert(&entry).await;
    assert!(matches!(result, Err(ReportError::UploadFailure(_))));
}

#[tokio::test]
async fn test_list_keeps_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("site", "eq.A"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row("newer", "A", "2024-03-05T18:00:00Z"),
            row("older", "A", "2024-03-05T08:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let entries = remote_store(&server).list(&EntryFilter::for_site("A")).await.unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["newer", "older"]);
    assert_eq!(entries[0].category_progress.get("Demolition"), Some(80));
    assert_eq!(entries[0].area, "");
}

#[tokio::test]
async fn test_list_server_error_is_store_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = remote_store(&server).list(&EntryFilter::all()).await;
    assert!(matches!(result, Err(ReportError::Store(_))));
}

#[tokio::test]
async fn test_delete_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    remote_store(&server).delete("abc").await.unwrap();
}

#[tokio::test]
async fn test_delete_server_error_is_upload_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = remote_store(&server).delete("abc").await;
    assert!(matches!(result, Err(ReportError::UploadFailure(_))));
}
