//! crates/wondering_core/src/domain.rs
//!
//! Defines the core data structures for course generation.
//! These structs double as the wire format, so they carry serde derives
//! with the camelCase names the client expects.

use serde::{Deserialize, Serialize};

/// The learner's self-reported experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

/// How often the learner plans to study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "3x_week")]
    ThreeTimesAWeek,
    #[serde(rename = "weekly")]
    Weekly,
}

impl Frequency {
    pub fn sessions_per_week(&self) -> u32 {
        match self {
            Frequency::Daily => 7,
            Frequency::ThreeTimesAWeek => 3,
            Frequency::Weekly => 1,
        }
    }

    /// Human-readable label used in course descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::ThreeTimesAWeek => "3x/week",
            Frequency::Weekly => "weekly",
        }
    }
}

/// The immutable input to course generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseGenerationParams {
    pub topic: String,
    pub goal: String,
    pub level: Level,
    pub frequency: Frequency,
    /// Minutes per study session (5, 10, 15 or 30).
    pub duration: u32,
    /// Timeline in weeks; `None` means self-paced.
    pub timeline: Option<u32>,
}

/// The kind of flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Concept,
    Definition,
    Comparison,
    Review,
}

/// A single generated flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCard {
    pub card_id: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub key_terms: Vec<String>,
    pub visual_description: String,
}

/// Whether a lesson's cards exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Generated,
    Pending,
}

/// One lesson within a level. Cards are present iff the lesson was among
/// the eagerly generated ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLesson {
    pub lesson_id: String,
    /// Dotted "level.index" string, 1-based (e.g. "2.3").
    pub lesson_number: String,
    pub title: String,
    pub description: String,
    pub estimated_minutes: u32,
    pub cards_count: u32,
    pub status: LessonStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<GeneratedCard>>,
}

/// One difficulty tier of a course; lesson order is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLevel {
    pub level_number: u32,
    pub title: String,
    pub description: String,
    pub lessons: Vec<GeneratedLesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseStructure {
    pub levels: Vec<GeneratedLevel>,
}

/// A fully assembled course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourse {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub topic: String,
    pub goal: String,
    pub level: Level,
    pub estimated_hours: f64,
    pub structure: CourseStructure,
}

/// The lesson descriptor sent to the content-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDescriptor {
    pub lesson_id: String,
    pub lesson_number: String,
    pub title: String,
    pub description: String,
}

impl From<&GeneratedLesson> for LessonDescriptor {
    fn from(lesson: &GeneratedLesson) -> Self {
        Self {
            lesson_id: lesson.lesson_id.clone(),
            lesson_number: lesson.lesson_number.clone(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Generating,
    Completed,
    Failed,
}

/// A snapshot of one generation's progress, as reported to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatus {
    pub status: GenerationState,
    pub progress_percentage: u8,
    pub current_step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GenerationStatus {
    pub fn generating(progress_percentage: u8, current_step: &str) -> Self {
        Self {
            status: GenerationState::Generating,
            progress_percentage,
            current_step: current_step.to_string(),
            error_message: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: GenerationState::Completed,
            progress_percentage: 100,
            current_step: "Complete!".to_string(),
            error_message: None,
        }
    }

    pub fn failed(progress_percentage: u8, current_step: &str, error_message: String) -> Self {
        Self {
            status: GenerationState::Failed,
            progress_percentage,
            current_step: current_step.to_string(),
            error_message: Some(error_message),
        }
    }

    /// Whether this generation has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            GenerationState::Completed | GenerationState::Failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_serialize_with_client_field_names() {
        let card = GeneratedCard {
            card_id: "lesson-1-1-c1".to_string(),
            card_type: CardType::Concept,
            question: "q".to_string(),
            answer: "a".to_string(),
            explanation: "e".to_string(),
            key_terms: vec!["t1".to_string(), "t2".to_string()],
            visual_description: "v".to_string(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["cardId"], "lesson-1-1-c1");
        assert_eq!(json["type"], "concept");
        assert_eq!(json["keyTerms"][1], "t2");
        assert_eq!(json["visualDescription"], "v");
    }

    #[test]
    fn params_deserialize_from_client_json() {
        let params: CourseGenerationParams = serde_json::from_str(
            r#"{
                "topic": "Roman History",
                "goal": "understand the fall of Rome",
                "level": "beginner",
                "frequency": "3x_week",
                "duration": 15,
                "timeline": null
            }"#,
        )
        .unwrap();
        assert_eq!(params.frequency, Frequency::ThreeTimesAWeek);
        assert_eq!(params.timeline, None);
        assert_eq!(params.level, Level::Beginner);
    }

    #[test]
    fn pending_lessons_omit_the_cards_field() {
        let lesson = GeneratedLesson {
            lesson_id: "lesson-2-1".to_string(),
            lesson_number: "2.1".to_string(),
            title: "Deep Dive into Rust".to_string(),
            description: "d".to_string(),
            estimated_minutes: 10,
            cards_count: 10,
            status: LessonStatus::Pending,
            cards: None,
        };
        let json = serde_json::to_value(&lesson).unwrap();
        assert_eq!(json["lessonNumber"], "2.1");
        assert_eq!(json["status"], "pending");
        assert!(json.get("cards").is_none());
    }
}

