use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use mc_archive_backend::config::ArchiveConfig;
use mc_archive_backend::entities::{accounts, prelude::*, resources};
use mc_archive_backend::services::storage::FilesystemStore;
use mc_archive_backend::{AppState, create_app};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Set};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let backend = db.get_database_backend();
    let schema = sea_orm::Schema::new(backend);

    db.execute(backend.build(&schema.create_table_from_entity(Accounts)))
        .await
        .ok();
    db.execute(backend.build(&schema.create_table_from_entity(Resources)))
        .await
        .ok();
    db.execute(backend.build(&schema.create_table_from_entity(Updates)))
        .await
        .ok();

    db
}

fn test_state(db: DatabaseConnection, dir: &tempfile::TempDir) -> AppState {
    AppState::new(
        db,
        Arc::new(FilesystemStore::new(dir.path())),
        ArchiveConfig::development(),
    )
}

async fn seed_account(db: &DatabaseConnection, token: &str, can_upload: bool) {
    accounts::ActiveModel {
        username: Set(format!("user-{token}")),
        token: Set(token.to_string()),
        can_upload: Set(can_upload),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

async fn seed_resource(db: &DatabaseConnection, slug: &str) -> i32 {
    let now = Utc::now();
    resources::ActiveModel {
        slug: Set(slug.to_string()),
        name: Set(slug.to_string()),
        category: Set("MODS".to_string()),
        author: Set(1),
        tagline: Set(None),
        description: Set(None),
        status: Set(resources::STATUS_ACTIVE.to_string()),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

fn multipart_body(filename: &str, content: &str, data: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n\
        {content}\r\n\
        --{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"data\"\r\n\r\n\
        {data}\r\n\
        --{BOUNDARY}--\r\n"
    )
}

fn upload_request(cookie: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/file/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", format!("user-cookie={cookie}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_upload_download_roundtrip() {
    let db = setup_test_db().await;
    seed_account(&db, "valid", true).await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db.clone(), &dir));

    let data = format!("{{\"resourceId\":{resource_id},\"versions\":[\"1.20\"]}}");
    let response = app
        .clone()
        .oneshot(upload_request(
            Some("valid"),
            multipart_body("hello.bin", "hello world", &data),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let update = Updates::find().one(&db).await.unwrap().unwrap();
    assert_eq!(update.resource_id, resource_id);
    assert_eq!(update.real_name, "hello.bin");
    assert_eq!(update.size, 11);
    assert_eq!(update.download_count, 0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/file/download?updateId={}", update.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"hello.bin\""
    );
    assert_eq!(response.headers()["content-length"], "11");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"hello world");

    let update = Updates::find_by_id(update.id).one(&db).await.unwrap().unwrap();
    assert_eq!(update.download_count, 1);
}

#[tokio::test]
async fn test_total_downloads_reflects_served_downloads() {
    let db = setup_test_db().await;
    seed_account(&db, "valid", true).await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db.clone(), &dir));

    // Two updates for the same resource.
    for (name, versions) in [("a.jar", "[\"1.20\"]"), ("b.jar", "[\"1.19\",\"1.20\"]")] {
        let data =
            format!("{{\"resourceId\":{resource_id},\"versions\":{versions}}}");
        let response = app
            .clone()
            .oneshot(upload_request(
                Some("valid"),
                multipart_body(name, "payload", &data),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let updates = Updates::find().all(&db).await.unwrap();
    assert_eq!(updates.len(), 2);

    // Serve the first update twice.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/file/download?updateId={}", updates[0].id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/archive/{resource_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["totalDownloads"], 2);
}

#[tokio::test]
async fn test_concurrent_downloads_all_counted() {
    let db = setup_test_db().await;
    seed_account(&db, "valid", true).await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db.clone(), &dir));

    let data = format!("{{\"resourceId\":{resource_id},\"versions\":[\"1.20\"]}}");
    let response = app
        .clone()
        .oneshot(upload_request(
            Some("valid"),
            multipart_body("hello.bin", "hello world", &data),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let update = Updates::find().one(&db).await.unwrap().unwrap();

    let download = || {
        app.clone().oneshot(
            Request::builder()
                .uri(format!("/file/download?updateId={}", update.id))
                .body(Body::empty())
                .unwrap(),
        )
    };
    let (first, second) = tokio::join!(download(), download());
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);

    let update = Updates::find_by_id(update.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.download_count, 2);
}

#[tokio::test]
async fn test_cors_policies_per_route() {
    let db = setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db, &dir));

    // The upload route pins the web client origin and allows credentials.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/file/upload")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");

    // Everything else answers any origin without credentials.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/archive/mods")
                .header("Origin", "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-credentials")
    );
}

#[tokio::test]
async fn test_upload_without_cookie_is_forbidden() {
    let db = setup_test_db().await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db.clone(), &dir));

    let data = format!("{{\"resourceId\":{resource_id},\"versions\":[\"1.20\"]}}");
    let response = app
        .clone()
        .oneshot(upload_request(
            None,
            multipart_body("hello.bin", "hello world", &data),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(Updates::find().one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upload_with_unprivileged_token_is_forbidden() {
    let db = setup_test_db().await;
    seed_account(&db, "bad", false).await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db.clone(), &dir));

    let data = format!("{{\"resourceId\":{resource_id},\"versions\":[\"1.20\"]}}");
    let response = app
        .clone()
        .oneshot(upload_request(
            Some("bad"),
            multipart_body("hello.bin", "hello world", &data),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "NOT_AUTHORIZED");
}

#[tokio::test]
async fn test_upload_for_unknown_resource_is_not_found() {
    let db = setup_test_db().await;
    seed_account(&db, "valid", true).await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db, &dir));

    let response = app
        .clone()
        .oneshot(upload_request(
            Some("valid"),
            multipart_body(
                "hello.bin",
                "hello world",
                r#"{"resourceId":99999,"versions":["1.20"]}"#,
            ),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_upload_with_unknown_version_label_rejected() {
    let db = setup_test_db().await;
    seed_account(&db, "valid", true).await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db.clone(), &dir));

    let data = format!("{{\"resourceId\":{resource_id},\"versions\":[\"0.0\"]}}");
    let response = app
        .clone()
        .oneshot(upload_request(
            Some("valid"),
            multipart_body("hello.bin", "hello world", &data),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "INVALID_VERSION");
    assert!(Updates::find().one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upload_missing_file_part_rejected() {
    let db = setup_test_db().await;
    seed_account(&db, "valid", true).await;
    let resource_id = seed_resource(&db, "worldedit").await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db, &dir));

    let data = format!("{{\"resourceId\":{resource_id},\"versions\":[\"1.20\"]}}");
    let body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"data\"\r\n\r\n\
        {data}\r\n\
        --{BOUNDARY}--\r\n"
    );
    let response = app.clone().oneshot(upload_request(Some("valid"), body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "MISSING_PART");
}

#[tokio::test]
async fn test_download_unknown_update_is_structured_404() {
    let db = setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(db, &dir));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/file/download?updateId=99999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "UPDATE_NOT_FOUND");
    assert_eq!(json["status"], 404);
}
