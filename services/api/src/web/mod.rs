pub mod generation_task;
pub mod progress;
pub mod registry;
pub mod rest;
pub mod state;

// Re-export the pieces the server binary wires together.
pub use progress::{watch_generation, ProgressWatch};
pub use registry::GenerationRegistry;
pub use rest::{
    chat_explore_handler, course_content_handler, create_start_handler, generate_course_handler,
    generate_lesson_handler, generated_course_handler, generation_status_handler,
};
