// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@mutlukent.com";
const ADMIN_PASSWORD: &str = "yonetici-sifre";
const BOUNDARY: &str = "mutlukent-test-boundary";

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Test app state with in-memory persistence and a bootstrapped admin.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    app_state_with(persistence)
}

/// Bootstraps the admin into `persistence` and wraps it with a temp photo dir.
fn app_state_with(mut persistence: Persistence) -> AppState {
    AuthenticationService::bootstrap_admin(&mut persistence, ADMIN_EMAIL, ADMIN_PASSWORD)
        .unwrap()
        .expect("Admin created");

    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        photos: Arc::new(PhotoStore::new(scratch_dir("photos"))),
        clock: BusinessClock::default(),
    }
}

fn scratch_dir(kind: &str) -> PathBuf {
    let id: u64 = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "mutlukent-server-{kind}-{}-{id}",
        std::process::id()
    ))
}

fn today(app_state: &AppState) -> String {
    mutlukent_domain::format_report_date(app_state.clock.today().unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (HttpStatusCode, Value) {
    let response: Response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(
    token: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"z.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/reports")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "login failed: {body}");
    body["session_token"].as_str().unwrap().to_string()
}

async fn create_branch(app: &Router, token: &str, name: &str, code: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/branches",
            Some(token),
            &json!({ "name": name, "code": code, "season": "summer" }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "branch create failed: {body}");
    body["branch"]["branch_id"].as_i64().unwrap()
}

async fn create_user(app: &Router, token: &str, email: &str, role: &str, branch_id: i64) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/users",
            Some(token),
            &json!({
                "email": email,
                "password": "kullanici-sifre",
                "full_name": "Deniz Aydın",
                "role": role,
                "branch_id": branch_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "user create failed: {body}");
    body["user_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_login_and_whoami() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(&app, get_request("/auth/me", &token)).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["capabilities"]["can_manage_branches"], true);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "email": ADMIN_EMAIL, "password": "yanlis" }),
        ),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "E-posta veya şifre hatalı.");
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let missing: Request<Body> = Request::builder()
        .method("GET")
        .uri("/reports")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, missing).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Oturum açmanız gerekiyor.");

    let (status, _) = send(&app, get_request("/reports", "session_0_unknown")).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = send(
        &app,
        json_request("POST", "/auth/logout", Some(&token), &Value::Null),
    )
    .await;
    assert_eq!(status, HttpStatusCode::NO_CONTENT);

    let (status, _) = send(&app, get_request("/auth/me", &token)).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_report_lifecycle() {
    let app_state: AppState = create_test_app_state();
    let date: String = today(&app_state);
    let app: Router = build_router(app_state);
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id: i64 = create_branch(&app, &token, "Bodrum", "BDR").await;

    let photo: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00];
    let branch_text: String = branch_id.to_string();
    let (status, body) = send(
        &app,
        multipart_request(
            &token,
            &[
                ("branch_id", &branch_text),
                ("report_date", &date),
                ("cash_sales", "1.250,50"),
                ("credit_card_sales", "300"),
                ("debit_card_sales", ""),
                ("notes", "Kasa tamam"),
            ],
            Some(("image/jpeg", photo)),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "create failed: {body}");
    assert_eq!(body["total_sales"], 155_050);
    let report_id: i64 = body["report_id"].as_i64().unwrap();

    let (status, body) = send(&app, get_request("/reports", &token)).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["reports"][0]["has_photo"], true);

    let response: Response = app
        .clone()
        .oneshot(get_request(&format!("/reports/{report_id}/photo"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), photo);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/reports/{report_id}/verify"),
            Some(&token),
            &json!({ "verified": true }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["is_verified"], true);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/reports/{report_id}"),
            Some(&token),
            &json!({
                "branch_id": branch_id,
                "report_date": date,
                "cash_sales": 100,
                "credit_card_sales": "2,50",
            }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "update failed: {body}");
    assert_eq!(body["total_sales"], 350);

    let (status, _) = send(
        &app,
        json_request("DELETE", &format!("/reports/{report_id}"), Some(&token), &Value::Null),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(&app, get_request(&format!("/reports/{report_id}"), &token)).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Rapor bulunamadı");
}

#[tokio::test]
async fn test_invalid_report_returns_field_errors() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        multipart_request(&token, &[("cash_sales", "-10")], Some(("text/plain", b"x"))),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Lütfen formu kontrol ediniz.");
    assert!(body["field_errors"]["branch_id"].is_array());
    assert!(body["field_errors"]["report_date"].is_array());
    assert!(body["field_errors"]["cash_sales"].is_array());
    assert!(body["field_errors"]["photo"].is_array());
}

#[tokio::test]
async fn test_delete_without_permission_is_forbidden() {
    let app_state: AppState = create_test_app_state();
    let date: String = today(&app_state);
    let app: Router = build_router(app_state);
    let admin_token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id: i64 = create_branch(&app, &admin_token, "Çeşme", "CSM").await;
    create_user(&app, &admin_token, "mudur@mutlukent.com", "branch_manager", branch_id).await;
    let manager_token: String = login(&app, "mudur@mutlukent.com", "kullanici-sifre").await;

    let branch_text: String = branch_id.to_string();
    let (status, body) = send(
        &app,
        multipart_request(
            &manager_token,
            &[
                ("branch_id", &branch_text),
                ("report_date", &date),
                ("cash_sales", "500"),
            ],
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "create failed: {body}");
    let report_id: i64 = body["report_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/reports/{report_id}"),
            Some(&manager_token),
            &Value::Null,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Silme yetkiniz yok.");

    let (status, _) = send(&app, get_request(&format!("/reports/{report_id}"), &admin_token)).await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(&app, get_request("/dashboard", &manager_token)).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["stats"]["daily_sales"], 50_000);
    assert_eq!(body["weekly_trend"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_export_is_csv_attachment() {
    let app_state: AppState = create_test_app_state();
    let date: String = today(&app_state);
    let app: Router = build_router(app_state);
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id: i64 = create_branch(&app, &token, "Bodrum", "BDR").await;
    let branch_text: String = branch_id.to_string();
    send(
        &app,
        multipart_request(
            &token,
            &[
                ("branch_id", &branch_text),
                ("report_date", &date),
                ("cash_sales", "100"),
            ],
            None,
        ),
    )
    .await;

    let response: Response = app
        .clone()
        .oneshot(get_request("/reports/export?totals=true", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    let disposition: String = response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"z-raporlari-"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let content: String = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(content.starts_with("Tarih,Şube,"));
    assert!(content.contains("TOPLAM"));
    assert_eq!(content.lines().count(), 3);
}

#[tokio::test]
async fn test_user_admin_routes() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(&app, get_request("/roles", &token)).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["roles"].as_array().unwrap().len(), 7);

    let (status, body) = send(&app, get_request("/users", &token)).await;
    assert_eq!(status, HttpStatusCode::OK);
    let admin_id: i64 = body["users"][0]["user_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        json_request("DELETE", &format!("/users/{admin_id}"), Some(&token), &Value::Null),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["message"], "Kendi hesabınızı silemezsiniz.");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/users",
            Some(&token),
            &json!({
                "email": ADMIN_EMAIL,
                "password": "baska-sifre",
                "full_name": "Kopya",
                "role": "staff",
            }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["email"].is_array());
}

#[tokio::test]
async fn test_branch_routes() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id: i64 = create_branch(&app, &token, "Alaçatı", "ALC").await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/branches/{branch_id}"),
            Some(&token),
            &json!({
                "name": "Alaçatı",
                "code": "ALC",
                "season": "summer",
                "is_active": false,
            }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["branch"]["is_active"], false);

    let (_, body) = send(&app, get_request("/branches", &token)).await;
    assert_eq!(body["branches"].as_array().unwrap().len(), 0);

    let (_, body) = send(&app, get_request("/branches?include_inactive=true", &token)).await;
    assert_eq!(body["branches"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let dir: PathBuf = scratch_dir("db");
    std::fs::create_dir_all(&dir).unwrap();
    let db_path: PathBuf = dir.join("mutlukent.db");
    let persistence: Persistence = Persistence::new_with_file(&db_path).unwrap();
    let app: Router = build_router(app_state_with(persistence));
    let token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let mut side: SqliteConnection =
        SqliteConnection::establish(db_path.to_str().unwrap()).unwrap();
    diesel::sql_query("DROP TABLE sessions")
        .execute(&mut side)
        .unwrap();

    let (status, body) = send(&app, get_request("/auth/me", &token)).await;
    assert_eq!(status, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Beklenmeyen bir hata oluştu.");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Beklenmeyen bir hata oluştu.");
    assert!(!body["message"].as_str().unwrap().contains("sessions"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_role_change_applies_to_open_session() {
    let app: Router = build_router(create_test_app_state());
    let admin_token: String = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id: i64 = create_branch(&app, &admin_token, "Çeşme", "CSM").await;
    let gm_id: i64 = create_user(
        &app,
        &admin_token,
        "genel@mutlukent.com",
        "general_manager",
        branch_id,
    )
    .await;
    let gm_token: String = login(&app, "genel@mutlukent.com", "kullanici-sifre").await;

    let (status, body) = send(&app, get_request("/users", &gm_token)).await;
    assert_eq!(status, HttpStatusCode::OK, "list failed: {body}");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/users/{gm_id}"),
            Some(&admin_token),
            &json!({
                "email": "genel@mutlukent.com",
                "full_name": "Deniz Aydın",
                "role": "accountant",
                "branch_id": branch_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "demotion failed: {body}");

    let (status, _) = send(&app, get_request("/users", &gm_token)).await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);

    let (status, body) = send(&app, get_request("/auth/me", &gm_token)).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["role"], "accountant");
}
