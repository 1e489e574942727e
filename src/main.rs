use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod auth;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod policy;
mod routes;
mod store;

use config::Config;
use db::{init_db, run_migrations};

use crate::clock::SystemClock;
use crate::docs::ApiDoc;
use crate::policy::{EngineOptions, PolicyEngine};
use crate::store::mysql::MySqlStore;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "WorkStream policy engine"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match std::env::args().nth(1).as_deref() {
        Some("dedupe-attendance") => {
            let store = MySqlStore::new(pool);
            let report = policy::dedup::dedupe_attendance(&store)
                .await
                .context("Attendance deduplication failed")?;
            println!(
                "Collapsed {} duplicated day(s), removed {} record(s)",
                report.groups, report.removed
            );
            return Ok(());
        }
        Some(other) => anyhow::bail!("Unknown command {other:?}; expected `dedupe-attendance`"),
        None => {}
    }

    info!("Server starting...");
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let store = Arc::new(MySqlStore::new(pool));
    let engine = Data::new(PolicyEngine::new(
        store,
        Arc::new(SystemClock),
        EngineOptions::from_config(&config),
    ));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(engine.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
