use postboard_common::clock::SystemClock;
use postboard_store::store::{DataStore, StoreError};
use serde::Deserialize;
use server::ServerState;
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error loading data: {0}")]
    Store(#[from] StoreError),
    #[error("Error installing shutdown signal handler: {0}")]
    Signal(std::io::Error),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    #[serde(default = "default_posts_file")]
    posts_file: PathBuf,
    #[serde(default = "default_comments_file")]
    comments_file: PathBuf,
}

fn default_posts_file() -> PathBuf {
    "data/posts.json".into()
}

fn default_comments_file() -> PathBuf {
    "data/comments.json".into()
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "postboard_api=debug,\
                postboard_store=debug,\
                postboard_common=debug,\
                tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>, InitError> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate()).map_err(InitError::Signal)?;

    Ok(async move {
        tokio::select! {
            () = ctrl_c() => {},
            _ = terminate.recv() => {},
        }
        info!("Shutting down");
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>, InitError> {
    Ok(async {
        ctrl_c().await;
        info!("Shutting down");
    })
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let store = DataStore::load(&env.posts_file, &env.comments_file).await?;
    let app = server::app(ServerState {
        store: Arc::new(store),
        clock: Arc::new(SystemClock),
    });

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Serving posts");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal()?)
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{ctrl_c, shutdown_signal};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn shutdown_waits_for_a_signal() {
        assert!(timeout(Duration::from_millis(50), ctrl_c()).await.is_err());

        let shutdown = shutdown_signal().unwrap();
        assert!(timeout(Duration::from_millis(50), shutdown).await.is_err());
    }
}
