//! services/api/src/web/registry.rs
//!
//! The process-wide generation registry: one map tracking in-flight and
//! finished generations by generation id, and one map persisting completed
//! course content by course id for the lifetime of the process.
//!
//! Ownership discipline: the registry is constructed once at startup and
//! shared behind an `Arc`; for any given generation id, only the orchestrator
//! task that created the entry writes to it. Readers never mutate.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use wondering_core::domain::{GeneratedCourse, GenerationStatus};

/// Status message reported for generation ids nobody has ever seen.
const COURSE_NOT_FOUND: &str = "Course not found";

/// Everything the registry tracks for one generation.
#[derive(Debug, Clone)]
struct GenerationEntry {
    status: GenerationStatus,
    course: Option<GeneratedCourse>,
}

/// In-memory store for generation status and finished course content.
///
/// There is no eviction: entries live as long as the process, matching the
/// prototype scope. Reads are cheap and side-effect-free so a 400ms poller
/// costs nothing.
#[derive(Debug, Default)]
pub struct GenerationRegistry {
    generations: RwLock<HashMap<String, GenerationEntry>>,
    course_content: RwLock<HashMap<String, GeneratedCourse>>,
}

impl GenerationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another thread panicked mid-write of a
    // status snapshot; the map itself is still coherent, so recover it.
    fn generations_read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, GenerationEntry>> {
        self.generations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn generations_write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, GenerationEntry>> {
        self.generations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates the entry for a freshly requested generation, in the initial
    /// `generating(0, "Analyzing your goals...")` state.
    pub fn begin(&self, course_id: &str) {
        self.generations_write().insert(
            course_id.to_string(),
            GenerationEntry {
                status: GenerationStatus::generating(0, "Analyzing your goals..."),
                course: None,
            },
        );
    }

    /// Records a progress step for an in-flight generation. Unknown ids are
    /// ignored; terminal entries are never touched again.
    pub fn update_progress(&self, course_id: &str, progress_percentage: u8, current_step: &str) {
        if let Some(entry) = self.generations_write().get_mut(course_id) {
            if entry.status.is_terminal() {
                return;
            }
            entry.status = GenerationStatus::generating(progress_percentage, current_step);
        }
    }

    /// Stores the finished course and flips the entry to `completed`.
    pub fn complete(&self, course_id: &str, course: GeneratedCourse) {
        if let Some(entry) = self.generations_write().get_mut(course_id) {
            entry.status = GenerationStatus::completed();
            entry.course = Some(course);
        }
    }

    /// Flips the entry to `failed`, keeping the last reported progress value.
    pub fn fail(&self, course_id: &str, error_message: String) {
        if let Some(entry) = self.generations_write().get_mut(course_id) {
            if entry.status.is_terminal() {
                return;
            }
            entry.status = GenerationStatus::failed(
                entry.status.progress_percentage,
                "Generation failed",
                error_message,
            );
        }
    }

    /// The current status for a generation id. Unknown ids report a terminal,
    /// non-retryable failure rather than an absence signal.
    pub fn status(&self, course_id: &str) -> GenerationStatus {
        self.generations_read()
            .get(course_id)
            .map(|entry| entry.status.clone())
            .unwrap_or_else(|| {
                GenerationStatus::failed(0, COURSE_NOT_FOUND, COURSE_NOT_FOUND.to_string())
            })
    }

    /// The finished course, if generation has completed.
    pub fn course(&self, course_id: &str) -> Option<GeneratedCourse> {
        self.generations_read()
            .get(course_id)
            .and_then(|entry| entry.course.clone())
    }

    /// Persists a course's content so it outlives interest in its generation
    /// record (e.g. the outline view fetching a lesson's cards much later).
    pub fn register_content(&self, course: GeneratedCourse) {
        self.course_content
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(course.course_id.clone(), course);
    }

    /// Looks up full course content from either store.
    pub fn content(&self, course_id: &str) -> Option<GeneratedCourse> {
        let registered = self
            .course_content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(course_id)
            .cloned();
        registered.or_else(|| self.course(course_id))
    }
}
