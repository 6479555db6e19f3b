//! crates/wondering_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete content-generation backend.

use async_trait::async_trait;

use crate::domain::{GeneratedCard, Level, LessonDescriptor};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The service credential is absent; no request was attempted.
    #[error("Service is not configured: {0}")]
    NotConfigured(String),
    /// The upstream service answered, but not with the shape we asked for.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Everything the content backend needs to write one lesson's flashcards.
#[derive(Debug, Clone)]
pub struct LessonContentRequest {
    pub topic: String,
    pub goal: String,
    pub level: Level,
    pub lesson: LessonDescriptor,
    pub cards_count: u32,
}

#[async_trait]
pub trait LessonContentService: Send + Sync {
    /// Produces the flashcards for a single lesson.
    ///
    /// Errors propagate to the caller; it is the caller's choice whether to
    /// surface them (the HTTP endpoint) or absorb them into fallback content
    /// (the generation pipeline, via `fallback::realize_lesson_cards`).
    async fn generate_lesson_cards(
        &self,
        request: &LessonContentRequest,
    ) -> PortResult<Vec<GeneratedCard>>;
}

/// The outcome of realizing one lesson's cards. The two variants are
/// flattened into a plain card sequence before anything leaves the pipeline,
/// but keeping them distinct here makes the "upstream failures never surface"
/// contract explicit and testable.
#[derive(Debug)]
pub enum LessonCards {
    /// The remote service produced the cards.
    Remote(Vec<GeneratedCard>),
    /// The remote call failed; cards came from the deterministic generator.
    Fallback {
        cards: Vec<GeneratedCard>,
        reason: PortError,
    },
}

impl LessonCards {
    pub fn into_cards(self) -> Vec<GeneratedCard> {
        match self {
            LessonCards::Remote(cards) => cards,
            LessonCards::Fallback { cards, .. } => cards,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LessonCards::Fallback { .. })
    }
}
