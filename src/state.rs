//! Central application state shared by all request handlers.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{
        player_directory::PlayerDirectory, question_bank::QuestionBank,
        session_store::SessionStore,
    },
    error::EngineError,
};

/// Cheaply cloneable handle to [`AppState`].
pub type SharedState = Arc<AppState>;

/// Central application state storing collaborator handles and configuration.
///
/// The engine itself is stateless: no session data lives here, only the
/// store handles commands are routed through.
pub struct AppState {
    session_store: RwLock<Option<Arc<dyn SessionStore>>>,
    question_bank: Arc<dyn QuestionBank>,
    player_directory: Arc<dyn PlayerDirectory>,
    config: AppConfig,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a session store is
    /// installed.
    pub fn new(
        config: AppConfig,
        question_bank: Arc<dyn QuestionBank>,
        player_directory: Arc<dyn PlayerDirectory>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            session_store: RwLock::new(None),
            question_bank,
            player_directory,
            config,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current session store, if one is installed.
    pub async fn session_store(&self) -> Option<Arc<dyn SessionStore>> {
        let guard = self.session_store.read().await;
        guard.as_ref().cloned()
    }

    /// Session store handle or [`EngineError::Degraded`] when none is up.
    pub async fn require_session_store(&self) -> Result<Arc<dyn SessionStore>, EngineError> {
        self.session_store().await.ok_or(EngineError::Degraded)
    }

    /// Install a session store implementation and leave degraded mode.
    pub async fn install_session_store(&self, store: Arc<dyn SessionStore>) {
        {
            let mut guard = self.session_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current session store and enter degraded mode.
    pub async fn clear_session_store(&self) {
        {
            let mut guard = self.session_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.session_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Question Bank collaborator.
    pub fn question_bank(&self) -> Arc<dyn QuestionBank> {
        self.question_bank.clone()
    }

    /// Player Directory collaborator.
    pub fn player_directory(&self) -> Arc<dyn PlayerDirectory> {
        self.player_directory.clone()
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
