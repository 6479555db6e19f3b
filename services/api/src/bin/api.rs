//! services/api/src/bin/api.rs

use api_lib::{
    adapters::GeminiLessonAdapter,
    config::Config,
    error::ApiError,
    web::{
        chat_explore_handler, course_content_handler, create_start_handler,
        generate_course_handler, generate_lesson_handler, generated_course_handler,
        generation_status_handler, rest::ApiDoc, state::AppState, GenerationRegistry,
    },
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let lesson_adapter = Arc::new(GeminiLessonAdapter::from_config(&config));
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; generated courses will use offline fallback cards.");
    }

    // --- 3. Build the Shared AppState ---
    let registry = Arc::new(GenerationRegistry::new());
    let app_state = Arc::new(AppState {
        config: config.clone(),
        registry,
        lesson_adapter,
    });

    // The lesson endpoint is called straight from the browser client.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/courses/generate", post(generate_course_handler))
        .route("/api/courses/create/start", post(create_start_handler))
        .route("/api/courses/{course_id}/status", get(generation_status_handler))
        .route("/api/courses/{course_id}/content", get(course_content_handler))
        .route("/api/courses/{course_id}", get(generated_course_handler))
        .route("/api/generate-lesson", post(generate_lesson_handler))
        .route("/api/chat/explore", post(chat_explore_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
