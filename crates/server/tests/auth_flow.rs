use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes::{self, auth};
use server::startup::build_cors;
use service::auth::identity::mock::StaticIdTokenVerifier;
use service::auth::repository::mock::MockUserRepository;
use service::auth::service::AuthConfig;
use service::auth::AuthService;

fn build_app(repo: Arc<MockUserRepository>, cfg: AuthConfig) -> anyhow::Result<Router> {
    let verifier = StaticIdTokenVerifier::default()
        .with_token("good-token", "Gina@Example.com", Some("Gina"))
        .with_token("nameless-token", "anon@example.com", None);
    let state = auth::ServerState {
        auth: Arc::new(AuthService::new(repo, Arc::new(verifier), cfg)),
    };
    let cors = build_cors(&["http://localhost:5173".to_string()])?;
    Ok(routes::build_router(state, cors))
}

fn test_cfg() -> AuthConfig {
    AuthConfig { bcrypt_cost: 4, admin_signup_code: None }
}

fn app() -> anyhow::Result<(Router, Arc<MockUserRepository>)> {
    let repo = Arc::new(MockUserRepository::default());
    Ok((build_app(repo.clone(), test_cfg())?, repo))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    send(app, req).await
}

async fn get(app: &Router, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder().method("GET").uri(uri).body(Body::empty())?;
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

fn signup_body(name: &str, email: &str, password: &str, role: &str) -> Value {
    json!({"name": name, "email": email, "password": password, "role": role, "enrollment": "E-1"})
}

#[tokio::test]
async fn test_signup_and_login_flow() -> anyhow::Result<()> {
    let (app, _) = app()?;

    let (status, body) = post_json(&app, "/api/auth/signup", signup_body("A", " A@B.com ", "pw", "student")).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"message": "User registered successfully", "name": "A", "email": "a@b.com", "role": "student"})
    );

    let (status, body) = post_json(&app, "/api/auth/login", json!({"email": "a@b.com", "password": "pw"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Login successful", "name": "A", "email": "a@b.com", "role": "student"}));
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_signup_is_bad_request() -> anyhow::Result<()> {
    let (app, repo) = app()?;
    post_json(&app, "/api/auth/signup", signup_body("A", "a@b.com", "pw", "student")).await?;

    let (status, body) = post_json(&app, "/api/auth/signup", signup_body("Z", "A@B.COM", "other", "admin")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "User already exists", "code": 1002}));

    // fields that would fail validation do not mask the conflict
    let (status, body) = post_json(&app, "/api/auth/signup", signup_body("", "a@b.com", "", "student")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "User already exists", "code": 1002}));
    assert_eq!(repo.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_login_failures() -> anyhow::Result<()> {
    let (app, _) = app()?;
    post_json(&app, "/api/auth/signup", signup_body("A", "a@b.com", "pw", "student")).await?;

    let (status, body) = post_json(&app, "/api/auth/login", json!({"email": "a@b.com", "password": "nope"})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = post_json(&app, "/api/auth/login", json!({"email": "x@b.com", "password": "pw"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn test_google_login_then_password_login_is_refused() -> anyhow::Result<()> {
    let (app, _) = app()?;

    let (status, body) = post_json(&app, "/api/auth/google", json!({"token": "good-token"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Google login successful", "name": "Gina", "email": "gina@example.com", "role": "student"})
    );

    // second login reuses the account
    let (status, _) = post_json(&app, "/api/auth/google", json!({"token": "good-token"})).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&app, "/api/auth/login", json!({"email": "gina@example.com", "password": ""})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Please login using Google", "code": 1005}));
    Ok(())
}

#[tokio::test]
async fn test_google_login_rejects_bad_token() -> anyhow::Result<()> {
    let (app, repo) = app()?;
    let (status, body) = post_json(&app, "/api/auth/google", json!({"token": "forged"})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"message": "Google authentication failed", "code": 1102}));
    assert!(repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_students_listing_excludes_admins() -> anyhow::Result<()> {
    let (app, _) = app()?;
    post_json(&app, "/api/auth/signup", signup_body("S1", "s1@b.com", "pw", "student")).await?;
    post_json(&app, "/api/auth/signup", signup_body("Root", "root@b.com", "pw", "admin")).await?;
    post_json(&app, "/api/auth/google", json!({"token": "nameless-token"})).await?;

    let (status, body) = get(&app, "/api/auth/students").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"name": "S1", "email": "s1@b.com"},
            {"name": "anon@example.com", "email": "anon@example.com"}
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_request() -> anyhow::Result<()> {
    let (app, repo) = app()?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/signup")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (status, body) = post_json(&app, "/api/auth/signup", signup_body("A", "a@b.com", "pw", "librarian")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (status, _) = post_json(&app, "/api/auth/login", json!({"email": "a@b.com"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(&app, "/api/auth/signup", signup_body(" ", "a@b.com", "pw", "student")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "name required", "code": 1001}));
    assert!(repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_signup_code_gate() -> anyhow::Result<()> {
    let repo = Arc::new(MockUserRepository::default());
    let app = build_app(repo.clone(), AuthConfig { bcrypt_cost: 4, admin_signup_code: Some("lib-2024".into()) })?;

    let (status, body) = post_json(&app, "/api/auth/signup", signup_body("Root", "root@b.com", "pw", "admin")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid admin code");

    let mut ok = signup_body("Root", "root@b.com", "pw", "admin");
    ok["adminCode"] = json!("lib-2024");
    let (status, body) = post_json(&app, "/api/auth/signup", ok).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "admin");
    assert_eq!(repo.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_hides_detail() -> anyhow::Result<()> {
    let (app, repo) = app()?;
    repo.set_unavailable(true);

    let (status, body) = post_json(&app, "/api/auth/signup", signup_body("A", "a@b.com", "pw", "student")).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Signup failed", "code": 1200}));

    let (status, body) = post_json(&app, "/api/auth/login", json!({"email": "a@b.com", "password": "pw"})).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Login failed");

    let (status, body) = post_json(&app, "/api/auth/google", json!({"token": "good-token"})).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Google authentication failed");

    let (status, body) = get(&app, "/api/auth/students").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch students");
    Ok(())
}

#[tokio::test]
async fn test_root_health_and_docs() -> anyhow::Result<()> {
    let (app, _) = app()?;

    let req = Request::builder().uri("/").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], routes::ROOT_BANNER.as_bytes());

    let (status, body) = get(&app, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = get(&app, "/api-docs/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/auth/signup"].is_object());
    assert!(body["paths"]["/api/auth/students"].is_object());
    Ok(())
}
