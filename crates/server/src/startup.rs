use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use configs::{AppConfig, AuthSettings};
use sea_orm::DatabaseConnection;
use service::auth::{
    identity::GoogleIdTokenVerifier,
    repo::seaorm::SeaOrmUserRepository,
    service::AuthConfig,
    AuthService,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::routes::{self, auth::ServerState};

/// CORS restricted to the configured origins. Credentials are allowed, so
/// wildcard origins are not.
pub fn build_cors(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Wire the auth service to Postgres and Google
pub fn build_state(db: DatabaseConnection, auth: &AuthSettings, http: reqwest::Client) -> ServerState {
    let repo = Arc::new(SeaOrmUserRepository::new(db));
    let verifier = Arc::new(GoogleIdTokenVerifier::new(
        auth.google_client_id.clone(),
        auth.google_certs_url.clone(),
        http,
    ));
    let cfg = AuthConfig {
        bcrypt_cost: auth.bcrypt_cost,
        admin_signup_code: auth.admin_signup_code.clone(),
    };
    ServerState { auth: Arc::new(AuthService::new(repo, verifier, cfg)) }
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.server.host, cfg.server.port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server until shutdown
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        models::db::migrate(&db).await?;
        info!("database migrations applied");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("building HTTP client")?;

    let state = build_state(db, &cfg.auth, http);
    let cors = build_cors(&cfg.cors.allowed_origins)?;
    let app: Router = routes::build_router(state, cors);

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, origins = ?cfg.cors.allowed_origins, "library backend listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
