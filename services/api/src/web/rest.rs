//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::generation_task::run_generation;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;
use wondering_core::domain::{
    CourseGenerationParams, GeneratedCard, GeneratedCourse, GenerationStatus, Level,
    LessonDescriptor,
};
use wondering_core::ports::{LessonContentRequest, PortError};

const MISSING_FIELDS: &str = "Missing required fields: topic, goal, level, lesson";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_course_handler,
        generation_status_handler,
        generated_course_handler,
        course_content_handler,
        generate_lesson_handler,
        create_start_handler,
        chat_explore_handler,
    ),
    components(
        schemas(
            GenerateCourseResponse,
            ErrorBody,
            PersonalizationQuestion,
            CreateStartResponse,
            ChatExploreResponse,
        )
    ),
    tags(
        (name = "Wondering API", description = "Course generation endpoints for the flashcard learning app.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after kicking off course generation.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCourseResponse {
    course_id: String,
    status: String,
}

/// The uniform error payload. `details` is only present for generation
/// failures, where the upstream error text helps operators.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// The request body for the external lesson-content endpoint. Every field is
/// optional at the serde layer so that presence can be validated explicitly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLessonRequest {
    topic: Option<String>,
    goal: Option<String>,
    level: Option<Level>,
    lesson: Option<LessonPayload>,
    cards_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPayload {
    lesson_id: Option<String>,
    lesson_number: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateLessonResponse {
    cards: Vec<GeneratedCard>,
}

#[derive(Serialize, ToSchema)]
pub struct PersonalizationQuestion {
    id: String,
    text: String,
    options: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CreateStartResponse {
    questions: Vec<PersonalizationQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct ChatExploreRequest {
    message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatExploreResponse {
    reply: String,
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}

//=========================================================================================
// Course generation handlers
//=========================================================================================

/// Kick off course generation.
///
/// Returns immediately with a generation id; the pipeline runs in the
/// background and is observed through the status endpoint.
#[utoipa::path(
    post,
    path = "/api/courses/generate",
    request_body(content_type = "application/json", description = "The course generation parameters."),
    responses(
        (status = 202, description = "Generation started", body = GenerateCourseResponse),
        (status = 400, description = "Malformed generation parameters")
    )
)]
pub async fn generate_course_handler(
    State(app_state): State<Arc<AppState>>,
    Json(params): Json<CourseGenerationParams>,
) -> impl IntoResponse {
    // Timestamp plus a random suffix so rapid successive requests cannot collide.
    let course_id = format!(
        "gen-{}-{}",
        Utc::now().timestamp_millis(),
        &Uuid::new_v4().simple().to_string()[..8]
    );

    app_state.registry.begin(&course_id);
    info!(course_id = %course_id, topic = %params.topic, "accepted course generation request");

    tokio::spawn(run_generation(
        app_state.registry.clone(),
        app_state.lesson_adapter.clone(),
        course_id.clone(),
        params,
    ));

    (
        StatusCode::ACCEPTED,
        Json(GenerateCourseResponse {
            course_id,
            status: "generating".to_string(),
        }),
    )
}

/// Poll generation status.
///
/// Always answers 200; an unknown id is reported as a terminal failed status
/// with the message "Course not found".
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/status",
    params(("course_id" = String, Path, description = "The generation id returned when generation started.")),
    responses(
        (status = 200, description = "The current generation status")
    )
)]
pub async fn generation_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Json<GenerationStatus> {
    Json(app_state.registry.status(&course_id))
}

/// Get the fully generated course once status is "completed".
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    params(("course_id" = String, Path, description = "The generation id.")),
    responses(
        (status = 200, description = "The generated course"),
        (status = 404, description = "Unknown id, or generation not finished", body = ErrorBody)
    )
)]
pub async fn generated_course_handler(
    State(app_state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<Json<GeneratedCourse>, Response> {
    app_state
        .registry
        .course(&course_id)
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Course not found", None))
}

/// Look up a course's full content (levels, lessons, cards) by course id.
///
/// Works long after generation finished, from either store.
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/content",
    params(("course_id" = String, Path, description = "The course id.")),
    responses(
        (status = 200, description = "The course content"),
        (status = 404, description = "No content stored for this id", body = ErrorBody)
    )
)]
pub async fn course_content_handler(
    State(app_state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<Json<GeneratedCourse>, Response> {
    app_state
        .registry
        .content(&course_id)
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Course not found", None))
}

//=========================================================================================
// External lesson-content endpoint
//=========================================================================================

/// Generate one lesson's flashcards via the content model.
///
/// This endpoint surfaces upstream failures to its caller instead of falling
/// back; only the internal generation pipeline degrades to offline content.
#[utoipa::path(
    post,
    path = "/api/generate-lesson",
    request_body(content_type = "application/json", description = "Topic, goal, level and a lesson descriptor."),
    responses(
        (status = 200, description = "The generated cards"),
        (status = 400, description = "Invalid JSON or missing required fields", body = ErrorBody),
        (status = 503, description = "Content model credential is not configured", body = ErrorBody),
        (status = 500, description = "Generation failed upstream", body = ErrorBody)
    )
)]
pub async fn generate_lesson_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Response {
    // Credential check comes first: without a key there is nothing to
    // validate a request body against.
    if app_state.config.gemini_api_key.is_none() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "GEMINI_API_KEY is not configured. Set it in your environment to generate real course content.",
            None,
        );
    }

    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body", None),
    };
    let request: GenerateLessonRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS, None),
    };

    let Some(content_request) = validate_lesson_request(request) else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS, None);
    };

    match app_state
        .lesson_adapter
        .generate_lesson_cards(&content_request)
        .await
    {
        Ok(cards) => (StatusCode::OK, Json(GenerateLessonResponse { cards })).into_response(),
        Err(PortError::NotConfigured(message)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, &message, None)
        }
        Err(err) => {
            error!(lesson_id = %content_request.lesson.lesson_id, error = %err, "generate-lesson failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Generation failed",
                Some(err.to_string()),
            )
        }
    }
}

/// Checks required fields and assembles the port request. Topic, goal, level,
/// and a lesson with id and title must be present and non-empty.
fn validate_lesson_request(request: GenerateLessonRequest) -> Option<LessonContentRequest> {
    let topic = request.topic.filter(|t| !t.is_empty())?;
    let goal = request.goal.filter(|g| !g.is_empty())?;
    let level = request.level?;
    let lesson = request.lesson?;
    let lesson_id = lesson.lesson_id.filter(|id| !id.is_empty())?;
    let title = lesson.title.filter(|t| !t.is_empty())?;

    Some(LessonContentRequest {
        topic,
        goal,
        level,
        lesson: LessonDescriptor {
            lesson_id,
            lesson_number: lesson.lesson_number.unwrap_or_default(),
            title,
            description: lesson.description.unwrap_or_default(),
        },
        cards_count: request.cards_count.unwrap_or(10),
    })
}

//=========================================================================================
// Create-flow handlers
//=========================================================================================

/// Start course creation and receive the personalization questions.
#[utoipa::path(
    post,
    path = "/api/courses/create/start",
    responses(
        (status = 200, description = "The personalization question set", body = CreateStartResponse)
    )
)]
pub async fn create_start_handler() -> Json<CreateStartResponse> {
    Json(CreateStartResponse {
        questions: personalization_questions(),
    })
}

fn personalization_questions() -> Vec<PersonalizationQuestion> {
    vec![
        PersonalizationQuestion {
            id: "q1".to_string(),
            text: "What's your current experience level with this topic?".to_string(),
            options: vec![
                "Complete Beginner".to_string(),
                "Some Knowledge".to_string(),
                "Intermediate".to_string(),
                "Advanced".to_string(),
            ],
        },
        PersonalizationQuestion {
            id: "q2".to_string(),
            text: "How do you prefer to learn?".to_string(),
            options: vec![
                "Short daily lessons".to_string(),
                "Deep-dive sessions".to_string(),
                "Practice-heavy".to_string(),
                "Theory first".to_string(),
            ],
        },
        PersonalizationQuestion {
            id: "q3".to_string(),
            text: "What's your main goal?".to_string(),
            options: vec![
                "General understanding".to_string(),
                "Apply at work".to_string(),
                "Teach others".to_string(),
                "Personal curiosity".to_string(),
            ],
        },
    ]
}

const CANNED_RESPONSES: [&str; 4] = [
    "That's a great topic to explore! There are many fascinating angles we could take. What aspect interests you most?",
    "Interesting! I can see a few directions we could go. Would you like to focus on the fundamentals first, or dive into a specific area?",
    "I love that question. Let me think about how to structure that into a learning path for you. What would you like to be able to do after completing the course?",
    "That's a wonderful area of study. Many learners find it helpful to start with the history and context. Does that appeal to you?",
];

/// Send a message in the chat-explore flow and get a response.
#[utoipa::path(
    post,
    path = "/api/chat/explore",
    request_body(content_type = "application/json", description = "The user's exploration message."),
    responses(
        (status = 200, description = "A canned exploration reply", body = ChatExploreResponse)
    )
)]
pub async fn chat_explore_handler(
    Json(request): Json<ChatExploreRequest>,
) -> Json<ChatExploreResponse> {
    let message = request.message.unwrap_or_default();
    // Deterministic pick keeps the endpoint reproducible under test.
    let reply = CANNED_RESPONSES[message.chars().count() % CANNED_RESPONSES.len()];
    Json(ChatExploreResponse {
        reply: reply.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::web::registry::GenerationRegistry;
    use async_trait::async_trait;
    use std::time::Duration;
    use wondering_core::domain::{Frequency, GenerationState};
    use wondering_core::ports::{LessonContentService, PortResult};

    struct FailingAdapter;

    #[async_trait]
    impl LessonContentService for FailingAdapter {
        async fn generate_lesson_cards(
            &self,
            _request: &LessonContentRequest,
        ) -> PortResult<Vec<GeneratedCard>> {
            Err(PortError::MalformedResponse(
                "Empty response from the content model".to_string(),
            ))
        }
    }

    fn config(with_key: bool) -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            log_level: tracing::Level::INFO,
            gemini_api_key: with_key.then(|| "test-key".to_string()),
            gemini_api_base: "http://localhost".to_string(),
            lesson_model: "gemini-2.0-flash".to_string(),
            lesson_timeout: Duration::from_secs(30),
        }
    }

    fn state(with_key: bool) -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(config(with_key)),
            registry: Arc::new(GenerationRegistry::new()),
            lesson_adapter: Arc::new(FailingAdapter),
        })
    }

    fn lesson_body() -> String {
        r#"{
            "topic": "Roman History",
            "goal": "understand the fall of Rome",
            "level": "beginner",
            "lesson": {
                "lessonId": "lesson-1-1",
                "lessonNumber": "1.1",
                "title": "Introduction to Roman History",
                "description": "intro"
            },
            "cardsCount": 10
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn lesson_endpoint_requires_a_credential() {
        let response = generate_lesson_handler(State(state(false)), lesson_body()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn lesson_endpoint_rejects_invalid_json() {
        let response = generate_lesson_handler(State(state(true)), "not json".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lesson_endpoint_rejects_missing_fields() {
        let response = generate_lesson_handler(
            State(state(true)),
            r#"{"topic": "Roman History"}"#.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = generate_lesson_handler(
            State(state(true)),
            r#"{"topic": "", "goal": "g", "level": "beginner",
                "lesson": {"lessonId": "l", "title": "t"}}"#
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lesson_endpoint_surfaces_upstream_failure_without_fallback() {
        let response = generate_lesson_handler(State(state(true)), lesson_body()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["error"], "Generation failed");
        assert!(payload["details"]
            .as_str()
            .unwrap()
            .contains("Empty response"));
    }

    #[tokio::test(start_paused = true)]
    async fn generate_then_poll_reaches_a_completed_course() {
        let app_state = state(false);
        let params = CourseGenerationParams {
            topic: "Roman History".to_string(),
            goal: "understand the fall of Rome".to_string(),
            level: Level::Beginner,
            frequency: Frequency::Daily,
            duration: 10,
            timeline: Some(4),
        };

        let response = generate_course_handler(State(app_state.clone()), Json(params))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let course_id = payload["courseId"].as_str().unwrap().to_string();
        assert_eq!(payload["status"], "generating");

        // Freshly accepted: generating at 0%, on the first stage label.
        let status = app_state.registry.status(&course_id);
        assert_eq!(status.status, GenerationState::Generating);
        assert_eq!(status.progress_percentage, 0);
        assert_eq!(status.current_step, "Analyzing your goals...");

        while !app_state.registry.status(&course_id).is_terminal() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let status = app_state.registry.status(&course_id);
        assert_eq!(status.status, GenerationState::Completed);
        assert_eq!(status.progress_percentage, 100);
        assert!(app_state.registry.course(&course_id).is_some());
    }

    #[tokio::test]
    async fn chat_explore_reply_is_deterministic() {
        let request = || ChatExploreRequest {
            message: Some("tell me about stars".to_string()),
        };
        let first = chat_explore_handler(Json(request())).await;
        let second = chat_explore_handler(Json(request())).await;
        assert_eq!(first.0.reply, second.0.reply);
    }
}
