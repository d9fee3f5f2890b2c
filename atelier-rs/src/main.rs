//! # atelier-rs
//!
//! Content-management backend for an artist's portfolio site.
//!
//! Serves a JSON API for exhibitions, curated links, registration/login, and
//! static biography and painting content.
//!
//! ## Architecture
//!
//! - **Exhibitions**: one JSON document on disk, whole-document
//!   read-modify-write serialized behind a process-wide lock
//! - **Links & users**: SQLite tables behind parameterized queries
//! - **Auth**: salted iterated-SHA-256 password hashes; per-request session
//!   tokens (cookie or bearer) with TTL
//! - **HTTP**: Axum router with rate limiting, request IDs, and graceful
//!   shutdown

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod auth;
mod config;
mod db;
mod exhibitions;
mod http;

use std::net::SocketAddr;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::auth::{hash_password, load_admin_file};
use crate::config::{AppConfig, Cli};
use crate::db::Database;
use crate::exhibitions::ExhibitionStore;
use crate::http::{router, AppState, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    let db = Database::open(&config.db_file)
        .with_context(|| format!("failed to open database {}", config.db_file.display()))?;

    if let Some(path) = config.admin_file.as_deref() {
        let admins = load_admin_file(path).context("failed to load admin credentials file")?;
        for admin in &admins {
            db.grant_admin(&admin.username, &hash_password(&admin.password))
                .with_context(|| format!("failed to bootstrap admin {}", admin.username))?;
        }
        info!(admins = admins.len(), "admin accounts ensured");
    }

    let exhibitions = ExhibitionStore::open(&config.exhibitions_file)
        .await
        .with_context(|| {
            format!(
                "failed to open exhibitions file {}",
                config.exhibitions_file.display()
            )
        })?;

    info!(
        bind = %config.bind,
        db = %config.db_file.display(),
        exhibitions = %config.exhibitions_file.display(),
        admin_file = ?config.admin_file.as_ref().map(|path| path.display().to_string()),
        session_ttl_hours = config.session_ttl_hours,
        "configuration loaded"
    );

    let state = AppState {
        db,
        exhibitions,
        sessions: SessionStore::new(config.session_ttl_hours),
    };

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "atelier-rs listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = shutdown.await;
        info!("shutting down gracefully");
    })
    .await
    .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
