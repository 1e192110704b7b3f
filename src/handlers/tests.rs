//! Handler tests run through the full router, including the tenant rewrite
//! middleware, against an in-memory SQLite database.

use crate::config::{AppConfig, CaptchaConfig};
use crate::migration::{Migrator, MigratorTrait};
use crate::models::ad::generate_ad_id;
use crate::repositories::{AdFields, AdRepository, CreateTenantRequest, TenantRepository};
use crate::server::{AppState, create_app};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_app(config: AppConfig) -> (AppState, Router) {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.expect("sqlite connects");
    Migrator::up(&db, None).await.expect("migrations apply");

    let state = AppState::new(config, db);
    let app = create_app(state.clone());
    (state, app)
}

async fn create_tenant(state: &AppState, domain: &str) -> Uuid {
    TenantRepository::new(&state.db)
        .create_tenant(CreateTenantRequest {
            domain: domain.to_string(),
            name: "Test Directory".to_string(),
            title: Some("Local trades".to_string()),
        })
        .await
        .expect("tenant creates")
        .id
}

async fn create_ad(state: &AppState, tenant_id: Uuid, slug: &str, active: bool) -> String {
    let id = generate_ad_id();
    AdRepository::new(&state.db)
        .create_with_images(
            id.clone(),
            tenant_id,
            AdFields {
                business_name: "Joe's Cafe".to_string(),
                slug: slug.to_string(),
                is_active: active,
                ..AdFields::default()
            },
            &[],
        )
        .await
        .expect("ad creates");
    id
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Host", host)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Host", "plumbers.example.com")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    let response = app
        .oneshot(get("/healthz", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"]["service"], "locallist");
}

#[tokio::test]
async fn test_directory_home_lists_only_active_ads() {
    let (state, app) = setup_app(AppConfig::default()).await;
    let tenant_id = create_tenant(&state, "plumbers.example.com").await;
    create_ad(&state, tenant_id, "visible-1", true).await;
    create_ad(&state, tenant_id, "hidden-1", false).await;

    let response = app
        .oneshot(get("/plumbers.example.com", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["tenant"]["domain"], "plumbers.example.com");
    assert_eq!(body["ads"].as_array().unwrap().len(), 1);
    assert_eq!(body["ads"][0]["slug"], "visible-1");
}

#[tokio::test]
async fn test_directory_home_unknown_tenant_404() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    let response = app
        .oneshot(get("/nobody.example.com", "nobody.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "TENANT_NOT_FOUND");
}

#[tokio::test]
async fn test_ad_detail_hides_inactive_ads() {
    let (state, app) = setup_app(AppConfig::default()).await;
    let tenant_id = create_tenant(&state, "plumbers.example.com").await;
    create_ad(&state, tenant_id, "visible-1", true).await;
    create_ad(&state, tenant_id, "hidden-1", false).await;

    let response = app
        .clone()
        .oneshot(get("/visible-1", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ad"]["slug"], "visible-1");
    assert_eq!(body["ad"]["businessName"], "Joe's Cafe");

    let response = app
        .oneshot(get("/hidden-1", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_path_is_rewritten_per_host() {
    let (state, app) = setup_app(AppConfig::default()).await;
    create_tenant(&state, "plumbers.example.com").await;

    // Tenant host: `/` serves that tenant's directory home.
    let response = app
        .clone()
        .oneshot(get("/", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tenant"]["domain"], "plumbers.example.com");

    // Platform host: `/` serves the shared landing page.
    let response = app.clone().oneshot(get("/", "locallist.uk")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["platformDomain"], "locallist.uk");

    // `/signup` is host-scoped by the rewrite.
    let response = app
        .oneshot(get("/signup", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tenant"]["domain"], "plumbers.example.com");
}

#[tokio::test]
async fn test_bare_slug_is_rewritten_to_ad_detail() {
    let (state, app) = setup_app(AppConfig::default()).await;
    let tenant_id = create_tenant(&state, "plumbers.example.com").await;
    let ad_id = create_ad(&state, tenant_id, "joes-cafe-1", true).await;

    // The catch-all rewrite turns `/joes-cafe-1` into the detail route for
    // the requesting host.
    let response = app
        .oneshot(get("/joes-cafe-1", "plumbers.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ad"]["id"], ad_id.as_str());
    assert_eq!(body["tenant"]["domain"], "plumbers.example.com");
}

#[tokio::test]
async fn test_missing_host_is_not_rewritten() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    // No Host header: the rewrite cannot fire and no `/` route exists.
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_rejects_wrong_admin_secret() {
    let config = AppConfig {
        admin_secret: Some("correct-secret".to_string()),
        ..AppConfig::default()
    };
    let (_state, app) = setup_app(config).await;

    let mut request = post_json("/api/admin/sync", json!({ "action": "pull" }));
    request
        .headers_mut()
        .insert("Authorization", "wrong-secret".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_sync_without_configured_secret_is_unavailable() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    let response = app
        .oneshot(post_json("/api/admin/sync", json!({ "action": "pull" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_sync_rejects_unknown_action() {
    let config = AppConfig {
        admin_secret: Some("correct-secret".to_string()),
        ..AppConfig::default()
    };
    let (_state, app) = setup_app(config).await;

    let mut request = post_json("/api/admin/sync", json!({ "action": "replicate" }));
    request
        .headers_mut()
        .insert("Authorization", "correct-secret".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["details"]["action"], "replicate");
}

#[tokio::test]
async fn test_signup_requires_captcha_token() {
    let (state, app) = setup_app(AppConfig::default()).await;
    create_tenant(&state, "plumbers.example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/signup",
            json!({
                "captchaToken": "",
                "tenantDomain": "plumbers.example.com",
                "businessName": "Joe's Cafe"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "CAPTCHA_FAILED");
}

#[tokio::test]
async fn test_signup_requires_business_name() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    let response = app
        .oneshot(post_json(
            "/api/signup",
            json!({
                "captchaToken": "tok",
                "tenantDomain": "plumbers.example.com",
                "businessName": "  "
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_signup_creates_inactive_ad() {
    let captcha_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&captcha_server)
        .await;

    let config = AppConfig {
        captcha: CaptchaConfig {
            secret_key: Some("captcha-secret".to_string()),
            verify_url: format!("{}/siteverify", captcha_server.uri()),
            site_key: None,
        },
        ..AppConfig::default()
    };
    let (state, app) = setup_app(config).await;
    let tenant_id = create_tenant(&state, "plumbers.example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/signup",
            json!({
                "captchaToken": "tok",
                "tenantDomain": "plumbers.example.com",
                "businessName": "Joe's Cafe",
                "description": "Coffee and pastries",
                "imageUrls": ["https://cdn.example/a.png"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let ad_id = body["adId"].as_str().unwrap().to_string();
    assert_eq!(ad_id.len(), 32);

    // The new listing stays hidden until approved.
    let active = AdRepository::new(&state.db)
        .list_active_for_tenant(tenant_id)
        .await
        .unwrap();
    assert!(active.is_empty());

    let images = AdRepository::new(&state.db).images_for(&ad_id).await.unwrap();
    assert_eq!(images.len(), 1);
}

#[tokio::test]
async fn test_signup_rejects_failed_captcha() {
    let captcha_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "success": false, "error-codes": ["invalid-input-response"] }),
        ))
        .mount(&captcha_server)
        .await;

    let config = AppConfig {
        captcha: CaptchaConfig {
            secret_key: Some("captcha-secret".to_string()),
            verify_url: format!("{}/siteverify", captcha_server.uri()),
            site_key: None,
        },
        ..AppConfig::default()
    };
    let (state, app) = setup_app(config).await;
    create_tenant(&state, "plumbers.example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/signup",
            json!({
                "captchaToken": "bad-tok",
                "tenantDomain": "plumbers.example.com",
                "businessName": "Joe's Cafe"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "CAPTCHA_FAILED");
}

#[tokio::test]
async fn test_prepare_upload_requires_file_name() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    let response = app
        .oneshot(post_json(
            "/api/prepare-upload",
            json!({ "fileName": "", "tenantDomain": "plumbers.example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_without_recipient_fails() {
    let (_state, app) = setup_app(AppConfig::default()).await;

    let response = app
        .oneshot(post_json(
            "/api/contact",
            json!({ "name": "Ann", "email": "ann@example.com", "message": "Hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_contact_with_recipient_succeeds() {
    let mut config = AppConfig::default();
    config.mail.contact_recipient = Some("admin@locallist.uk".to_string());
    // No Resend key: the disabled mailer logs and drops the message.
    let (_state, app) = setup_app(config).await;

    let response = app
        .oneshot(post_json(
            "/api/contact",
            json!({ "name": "Ann", "email": "ann@example.com", "message": "Hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}
