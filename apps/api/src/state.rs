use std::sync::Arc;

use crate::config::Config;
use crate::search::engine::SearchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the document store and the optional similarity scorer.
    pub engine: Arc<SearchEngine>,
    pub config: Config,
}
