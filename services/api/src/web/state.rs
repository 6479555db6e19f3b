//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::registry::GenerationRegistry;
use std::sync::Arc;
use wondering_core::ports::LessonContentService;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<GenerationRegistry>,
    pub lesson_adapter: Arc<dyn LessonContentService>,
}
