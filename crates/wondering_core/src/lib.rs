pub mod domain;
pub mod fallback;
pub mod ports;
pub mod structure;

pub use domain::{
    CardType, CourseGenerationParams, CourseStructure, Frequency, GeneratedCard, GeneratedCourse,
    GeneratedLesson, GeneratedLevel, GenerationState, GenerationStatus, Level, LessonDescriptor,
    LessonStatus,
};
pub use ports::{LessonCards, LessonContentRequest, LessonContentService, PortError, PortResult};
