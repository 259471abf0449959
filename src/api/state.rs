use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::SuggestionsConfig;
use crate::session::{AnalysisSession, SessionLoader};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<AnalysisSession>>,
    pub loader: Arc<SessionLoader>,
    pub suggestions: SuggestionsConfig,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(
        loader: SessionLoader,
        session: AnalysisSession,
        suggestions: SuggestionsConfig,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            loader: Arc::new(loader),
            suggestions,
            cors_origin: "*".to_string(),
        }
    }

    /// Build the state with an initial session from `loader`.
    pub async fn load(loader: SessionLoader, suggestions: SuggestionsConfig) -> Self {
        let session = loader.load().await;
        Self::new(loader, session, suggestions)
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
