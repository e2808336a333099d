use axum::http::StatusCode;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use studio_server::auth::{Claims, Role};
use studio_server::AuthConfig;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "integration-secret-at-least-32-bytes";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bootstrap a data root inside the given temp directory.
fn init_root(dir: &TempDir) {
    let config = studio_core::config::Config::new("test-agency");
    studio_core::io::ensure_dir(&dir.path().join(".studio/projects")).unwrap();
    config.save(dir.path()).unwrap();
}

fn app(dir: &TempDir) -> axum::Router {
    studio_server::build_router(dir.path().to_path_buf(), AuthConfig::new(SECRET))
}

fn token(user_id: &str, role: Role) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.into(),
        email: format!("{user_id}@example.com"),
        role,
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => req.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, Some(token), None).await
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(token), Some(body)).await
}

async fn put_json(
    app: axum::Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

/// Create a project as `owner` and return its id.
async fn create_project(dir: &TempDir, owner: &str, body: serde_json::Value) -> String {
    let (status, json) = post_json(app(dir), "/api/projects", &token(owner, Role::User), body).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["project"]["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let dir = TempDir::new().unwrap();
    let (status, json) = send(app(&dir), "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_401() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let (status, json) = send(app(&dir), "GET", "/api/projects/user/u1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn bad_signature_is_401() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let forged = {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".into(),
            email: String::new(),
            role: Role::Admin,
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap()
    };
    let (status, _) = get(app(&dir), "/api/projects", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_users() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let user = token("u1", Role::User);
    assert_eq!(get(app(&dir), "/api/projects", &user).await.0, StatusCode::FORBIDDEN);
    assert_eq!(
        get(app(&dir), "/api/projects/stats", &user).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        get(app(&dir), "/api/projects/user/u2", &user).await.0,
        StatusCode::FORBIDDEN
    );
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_caller_as_owner() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;

    let (status, json) = get(app(&dir), &format!("/api/projects/{id}"), &token("u1", Role::User)).await;
    assert_eq!(status, StatusCode::OK);
    let project = &json["project"];
    assert_eq!(project["ownerId"], "u1");
    assert_eq!(project["status"], "planning");
    assert_eq!(project["currentPhase"], "discovery");
    assert_eq!(project["currentSubstep"], "First Call");
    assert_eq!(project["progress"]["overall"], 0);
    assert_eq!(project["substeps"]["development"].as_array().unwrap().len(), 6);
    assert_eq!(project["lastUpdatedBy"], "u1");
}

#[tokio::test]
async fn create_validation_lists_fields() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let (status, json) = post_json(
        app(&dir),
        "/api/projects",
        &token("u1", Role::User),
        serde_json::json!({ "name": "", "status": "paused" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "status"]);
}

#[tokio::test]
async fn only_admin_creates_for_others() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let body = serde_json::json!({ "name": "Shop", "ownerId": "u2" });
    let (status, _) = post_json(app(&dir), "/api/projects", &token("u1", Role::User), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = post_json(app(&dir), "/api/projects", &token("admin", Role::Admin), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["project"]["ownerId"], "u2");
    assert_eq!(json["project"]["lastUpdatedBy"], "admin");
}

#[tokio::test]
async fn create_without_init_is_400() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        app(&dir),
        "/api/projects",
        &token("u1", Role::User),
        serde_json::json!({ "name": "Shop" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not initialized"));
}

#[tokio::test]
async fn other_users_cannot_touch_project() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;
    let intruder = token("u2", Role::User);

    assert_eq!(
        get(app(&dir), &format!("/api/projects/{id}"), &intruder).await.0,
        StatusCode::FORBIDDEN
    );
    let (status, _) = put_json(
        app(&dir),
        &format!("/api/projects/{id}/substeps"),
        &intruder,
        serde_json::json!({ "phase": "discovery", "substepName": "First Call" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = get(app(&dir), &format!("/api/projects/{id}"), &token("admin", Role::Admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["progress"]["overall"], 0);
}

#[tokio::test]
async fn unknown_project_is_404() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let (status, _) = get(app(&dir), "/api/projects/nope", &token("admin", Role::Admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_project() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;
    let owner = token("u1", Role::User);

    let (status, json) = put_json(
        app(&dir),
        &format!("/api/projects/{id}"),
        &owner,
        serde_json::json!({ "status": "active", "description": "Online orders" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["status"], "active");
    assert_eq!(json["project"]["description"], "Online orders");

    let (status, _) = send(app(&dir), "DELETE", &format!("/api/projects/{id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!dir.path().join(".studio/projects").join(&id).exists());
    assert_eq!(
        get(app(&dir), &format!("/api/projects/{id}"), &owner).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn set_phase_moves_pointer_only() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;
    let (status, json) = put_json(
        app(&dir),
        &format!("/api/projects/{id}/phase"),
        &token("u1", Role::User),
        serde_json::json!({ "currentPhase": "design", "phaseProgress": 80 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["currentPhase"], "design");
    assert_eq!(json["project"]["currentSubstep"], "Wireframes & User Flow");
    assert_eq!(json["project"]["progress"]["phases"]["design"], 0);
}

// ---------------------------------------------------------------------------
// Substeps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggling_substeps_updates_progress() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;
    let owner = token("u1", Role::User);
    let uri = format!("/api/projects/{id}/substeps");

    let (status, json) = put_json(
        app(&dir),
        &uri,
        &owner,
        serde_json::json!({ "phase": "discovery", "substepName": "First Call" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["toggled"], true);
    assert_eq!(json["completed"], true);
    assert_eq!(json["project"]["progress"]["phases"]["discovery"], 33);
    assert!(json["project"]["substeps"]["discovery"][0]["completedDate"].is_string());

    let (_, json) = put_json(
        app(&dir),
        &uri,
        &owner,
        serde_json::json!({ "phase": "discovery", "substepName": "Project Kickoff Session" }),
    )
    .await;
    assert_eq!(json["project"]["progress"]["phases"]["discovery"], 67);
    assert_eq!(json["project"]["progress"]["overall"], 8);
}

#[tokio::test]
async fn unknown_substep_is_reported_noop() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;
    let (status, json) = put_json(
        app(&dir),
        &format!("/api/projects/{id}/substeps"),
        &token("u1", Role::User),
        serde_json::json!({ "phase": "qa", "substepName": "First Call" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["toggled"], false);
    assert_eq!(json["reason"], "unknown_phase");
    assert_eq!(json["project"]["progress"]["overall"], 0);
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[tokio::test]
async fn milestone_lifecycle_recomputes_progress() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(
        &dir,
        "u1",
        serde_json::json!({ "name": "Law firm portal", "scheme": "milestones" }),
    )
    .await;
    let owner = token("u1", Role::User);
    let base = format!("/api/projects/{id}/milestones");

    let (status, json) = post_json(
        app(&dir),
        &base,
        &owner,
        serde_json::json!({ "title": "Wireframes", "phase": "design", "weight": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let wireframes = json["milestone"]["id"].as_str().unwrap().to_string();
    assert_eq!(json["milestone"]["status"], "pending");

    let (_, json) = post_json(
        app(&dir),
        &base,
        &owner,
        serde_json::json!({ "title": "QA pass", "phase": "testing", "status": "blocked" }),
    )
    .await;
    let qa = json["milestone"]["id"].as_str().unwrap().to_string();

    let (status, json) = put_json(
        app(&dir),
        &format!("{base}/{wireframes}"),
        &owner,
        serde_json::json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["milestone"]["completedDate"].is_string());
    assert_eq!(json["project"]["progress"]["overall"], 67);
    assert_eq!(json["project"]["progress"]["phases"]["design"], 100);

    let (status, json) = send(app(&dir), "DELETE", &format!("{base}/{qa}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);
    assert_eq!(json["project"]["progress"]["overall"], 100);
    let updated_at = json["project"]["updatedAt"].clone();

    let (status, json) = send(app(&dir), "DELETE", &format!("{base}/{qa}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], false);
    assert_eq!(json["project"]["updatedAt"], updated_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_milestone_adds_are_all_kept() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(
        &dir,
        "u1",
        serde_json::json!({ "name": "Busy project", "scheme": "milestones" }),
    )
    .await;
    let owner = token("u1", Role::User);
    let base = format!("/api/projects/{id}/milestones");
    let router = app(&dir);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let router = router.clone();
            let uri = base.clone();
            let tok = owner.clone();
            tokio::spawn(async move {
                post_json(
                    router,
                    &uri,
                    &tok,
                    serde_json::json!({ "title": format!("Milestone {i}"), "phase": "development" }),
                )
                .await
            })
        })
        .collect();
    for h in handles {
        let (status, json) = h.await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "{json}");
    }

    let (status, json) = get(router, &format!("/api/projects/{id}"), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["milestones"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn milestone_validation_and_not_found() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Shop" })).await;
    let owner = token("u1", Role::User);

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/projects/{id}/milestones"),
        &owner,
        serde_json::json!({ "title": "", "phase": "design", "weight": -1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["field"], "title");
    assert_eq!(json["errors"][1]["field"], "weight");

    let (status, _) = put_json(
        app(&dir),
        &format!("/api/projects/{id}/milestones/ghost"),
        &owner,
        serde_json::json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Activity and admin views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deliverables_and_communications_append() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let id = create_project(&dir, "u1", serde_json::json!({ "name": "Shop" })).await;
    let admin = token("admin", Role::Admin);

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/projects/{id}/deliverables"),
        &admin,
        serde_json::json!({ "title": "Brand guide", "kind": "design" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["deliverable"]["status"], "pending");

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/projects/{id}/communications"),
        &admin,
        serde_json::json!({ "kind": "call", "content": "Agreed on launch date", "isInternal": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["communication"]["fromUserId"], "admin");
    assert_eq!(json["project"]["communications"].as_array().unwrap().len(), 1);
    assert_eq!(json["project"]["deliverables"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_listing_and_stats() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    create_project(&dir, "u1", serde_json::json!({ "name": "Bakery site" })).await;
    create_project(&dir, "u2", serde_json::json!({ "name": "Bike shop", "status": "active" })).await;
    let admin = token("admin", Role::Admin);

    let (status, json) = get(app(&dir), "/api/projects?search=bike", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["projects"].as_array().unwrap().len(), 1);
    assert_eq!(json["pagination"]["total"], 1);

    let (_, json) = get(app(&dir), "/api/projects?limit=1&page=2&sortBy=name&sortOrder=asc", &admin).await;
    assert_eq!(json["projects"][0]["name"], "Bike shop");
    assert_eq!(json["pagination"]["pages"], 2);

    let (status, json) = get(app(&dir), "/api/projects/stats", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["statistics"]["totalProjects"], 2);
    assert_eq!(json["statistics"]["statusCounts"]["active"], 1);

    let (status, json) = get(app(&dir), "/api/projects/user/u1", &token("u1", Role::User)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["projects"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

async fn allow_origin_header(app: axum::Router, origin: &str) -> Option<String> {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri("/api/health")
        .header("origin", origin)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    response
        .headers()
        .get("access-control-allow-origin")
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let dir = TempDir::new().unwrap();
    init_root(&dir);
    let header = allow_origin_header(app(&dir), "https://anywhere.example").await;
    assert_eq!(header.as_deref(), Some("*"));
}

#[tokio::test]
async fn cors_honours_configured_origins() {
    let dir = TempDir::new().unwrap();
    let mut config = studio_core::config::Config::new("test-agency");
    config.server.allowed_origins = vec!["https://app.example.com".into()];
    studio_core::io::ensure_dir(&dir.path().join(".studio/projects")).unwrap();
    config.save(dir.path()).unwrap();

    let allowed = allow_origin_header(app(&dir), "https://app.example.com").await;
    assert_eq!(allowed.as_deref(), Some("https://app.example.com"));

    let denied = allow_origin_header(app(&dir), "https://evil.example").await;
    assert_eq!(denied, None);
}
