//! Quiz Arena backend entrypoint wiring REST, SSE, and storage layers.

use std::{env, fs, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_arena_back::{
    config::AppConfig,
    dao::memory::{InMemoryPlayerDirectory, InMemoryQuestionBank, InMemorySessionStore},
    model::{Player, Question},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let question_bank = InMemoryQuestionBank::new();
    let player_directory = InMemoryPlayerDirectory::new();
    seed_collaborators(&config, &question_bank, &player_directory);

    let app_state = AppState::new(
        config,
        Arc::new(question_bank),
        Arc::new(player_directory),
    );

    install_session_backend(app_state.clone()).await;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the session store backend: a supervised MongoDB connection when
/// `MONGO_URI` is set (and the feature is compiled in), the in-memory store
/// otherwise.
async fn install_session_backend(state: SharedState) {
    #[cfg(feature = "mongo-store")]
    if env::var("MONGO_URI").is_ok() {
        use quiz_arena_back::dao::mongodb::{MongoConfig, MongoSessionStore};
        use quiz_arena_back::dao::session_store::SessionStore;
        use quiz_arena_back::services::storage_supervisor;

        info!("MONGO_URI set; supervising a MongoDB session store");
        tokio::spawn(storage_supervisor::run(state, || async {
            let config = MongoConfig::from_env().await?;
            let store = MongoSessionStore::connect(config).await?;
            Ok(Arc::new(store) as Arc<dyn SessionStore>)
        }));
        return;
    }

    info!("using the in-memory session store");
    state
        .install_session_store(Arc::new(InMemorySessionStore::new()))
        .await;
}

/// Load the configured seed files into the in-memory collaborators,
/// skipping records that violate their own invariants.
fn seed_collaborators(
    config: &AppConfig,
    question_bank: &InMemoryQuestionBank,
    player_directory: &InMemoryPlayerDirectory,
) {
    if let Some(path) = &config.seeds().questions {
        match load_seed::<Question>(path) {
            Ok(questions) => {
                let mut loaded = 0usize;
                for question in questions {
                    if question.well_formed() && (1..=5).contains(&question.difficulty) {
                        question_bank.insert(question);
                        loaded += 1;
                    } else {
                        warn!(question = %question.id, "skipping malformed seed question");
                    }
                }
                info!(count = loaded, "seeded question bank");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load question seed")
            }
        }
    }

    if let Some(path) = &config.seeds().players {
        match load_seed::<Player>(path) {
            Ok(players) => {
                let mut loaded = 0usize;
                for player in players {
                    if player.stats_consistent() {
                        player_directory.upsert(player);
                        loaded += 1;
                    } else {
                        warn!(player = %player.id, "skipping seed player with inconsistent stats");
                    }
                }
                info!(count = loaded, "seeded player directory");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load player seed")
            }
        }
    }
}

fn load_seed<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
