pub mod lesson_llm;

pub use lesson_llm::GeminiLessonAdapter;
