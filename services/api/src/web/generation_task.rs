//! services/api/src/web/generation_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! driving one course generation from parameters to a finished course.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};
use wondering_core::domain::{
    CourseGenerationParams, CourseStructure, GeneratedCourse,
};
use wondering_core::fallback::realize_lesson_cards;
use wondering_core::ports::{LessonCards, LessonContentRequest, LessonContentService};
use wondering_core::structure::{build_skeleton, course_description, course_title};

use crate::web::registry::GenerationRegistry;

// Stand-ins for analysis work a production pipeline would actually do; the
// stage labels and pause lengths are part of the observable progress contract.
const ANALYZING_PAUSE: Duration = Duration::from_millis(600);
const STRUCTURING_PAUSE: Duration = Duration::from_millis(800);

/// The main asynchronous task for one course generation.
///
/// Spawned by the generate handler and detached; all outcomes, including
/// panics in the pipeline, are recorded in the registry so pollers always
/// reach a terminal state.
pub async fn run_generation(
    registry: Arc<GenerationRegistry>,
    content: Arc<dyn LessonContentService>,
    course_id: String,
    params: CourseGenerationParams,
) {
    let pipeline = tokio::spawn(drive_generation(
        registry.clone(),
        content,
        course_id.clone(),
        params,
    ));

    if let Err(join_err) = pipeline.await {
        let message = if join_err.is_panic() {
            let payload = join_err.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Unknown error".to_string())
        } else {
            "Unknown error".to_string()
        };
        error!(course_id = %course_id, error = %message, "course generation failed");
        registry.fail(&course_id, message);
    }
}

/// The staged pipeline itself. Stage percentages and labels are fixed; the
/// per-lesson loop is sequential so progress only ever moves forward and the
/// content service sees at most one request at a time.
async fn drive_generation(
    registry: Arc<GenerationRegistry>,
    content: Arc<dyn LessonContentService>,
    course_id: String,
    params: CourseGenerationParams,
) {
    info!(course_id = %course_id, topic = %params.topic, "course generation started");

    registry.update_progress(&course_id, 15, "Analyzing your goals...");
    sleep(ANALYZING_PAUSE).await;

    registry.update_progress(&course_id, 35, "Designing course structure...");
    sleep(STRUCTURING_PAUSE).await;

    let skeleton = build_skeleton(&params);
    let mut levels = skeleton.levels;
    let total = skeleton.eager.len();

    for (i, slot) in skeleton.eager.iter().enumerate() {
        let lesson = &levels[slot.level_index].lessons[slot.lesson_index];
        let request = LessonContentRequest {
            topic: params.topic.clone(),
            goal: params.goal.clone(),
            level: params.level,
            lesson: lesson.into(),
            cards_count: lesson.cards_count,
        };

        let outcome = realize_lesson_cards(content.as_ref(), &params, &request, slot.verb).await;
        if let LessonCards::Fallback { reason, .. } = &outcome {
            warn!(
                course_id = %course_id,
                lesson_id = %request.lesson.lesson_id,
                reason = %reason,
                "remote lesson content failed; using offline fallback cards"
            );
        }
        levels[slot.level_index].lessons[slot.lesson_index].cards = Some(outcome.into_cards());

        let percentage = 50 + (i + 1) * 45 / total;
        registry.update_progress(
            &course_id,
            percentage as u8,
            &format!("Creating lesson {}/{}...", i + 1, total),
        );
    }

    registry.update_progress(&course_id, 95, "Finalizing your course...");

    let course = GeneratedCourse {
        course_id: course_id.clone(),
        title: course_title(params.level, &params.topic),
        description: course_description(&params, skeleton.plan.estimated_hours),
        topic: params.topic.clone(),
        goal: params.goal.clone(),
        level: params.level,
        estimated_hours: skeleton.plan.estimated_hours,
        structure: CourseStructure { levels },
    };

    registry.complete(&course_id, course);
    info!(course_id = %course_id, "course generation complete");
}
