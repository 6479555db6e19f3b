//! services/api/src/adapters/lesson_llm.rs
//!
//! This module contains the adapter for the lesson-content LLM.
//! It implements the `LessonContentService` port from the `core` crate,
//! talking to Gemini through its OpenAI-compatible endpoint.

const LESSON_PROMPT_TEMPLATE: &str = r#"You are creating flashcard content for a Duolingo-style learning app.

COURSE CONTEXT:
- Topic: {topic}
- User Goal: {goal}
- User Level: {level}
- Lesson: {lesson_number} - {lesson_title}
- Description: {lesson_description}

TASK:
Create {cards_count} flashcards for this lesson. Each card must have topic-specific, substantive content - no generic placeholders.

FLASHCARD REQUIREMENTS:
1. Types to include (mix these):
   - Concept cards: Explain a single idea (60%)
   - Definition cards: Define key terms (20%)
   - Comparison cards: Show relationships (10%)
   - Review card: Summarize lesson (10%, always last card)

2. Each flashcard needs:
   - Clear question/prompt (front of card)
   - Concise answer (2-3 sentences max)
   - Engaging explanation or fun fact
   - 2-3 key terms (topic-specific)
   - Visual description (what diagram/image would help)

3. Content guidelines:
   - Use simple, conversational language
   - Build on previous cards in the lesson
   - Include concrete examples and analogies specific to {topic}
   - Add engaging context or real-world applications
   - Make it memorable (fun facts, surprising connections)
   - For {level} level: {level_guidance}
   - IMPORTANT: Generate real, topic-specific content. Do NOT use generic phrases like "systematic thinking" or "evidence-based reasoning" for every topic.

4. Card order:
   - Card 1: Most fundamental concept for this lesson
   - Cards 2-{cards_count_before_last}: Progressive building blocks
   - Card {cards_count}: Review card that tests comprehension

OUTPUT FORMAT (JSON only, no markdown):
{
  "cards": [
    {
      "cardId": "{lesson_id}-c1",
      "type": "concept",
      "question": "Topic-specific question here",
      "answer": "Clear, concise answer with real content",
      "explanation": "Fun fact or additional context",
      "keyTerms": ["term1", "term2"],
      "visualDescription": "Specific description of helpful visual"
    }
  ]
}

Generate all {cards_count} flashcards now. Output only valid JSON."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use wondering_core::domain::{CardType, GeneratedCard, Level};
use wondering_core::ports::{LessonContentRequest, LessonContentService, PortError, PortResult};

use crate::config::Config;

/// Level-specific guidance embedded in the prompt.
fn level_guidance(level: Level) -> &'static str {
    match level {
        Level::Beginner => "Assume no background, explain everything",
        Level::Intermediate => "Can reference foundational concepts",
        Level::Advanced => "Can use technical language, focus on nuance",
    }
}

/// Builds the full generation prompt for one lesson.
pub fn build_lesson_prompt(request: &LessonContentRequest) -> String {
    LESSON_PROMPT_TEMPLATE
        .replace("{topic}", &request.topic)
        .replace("{goal}", &request.goal)
        .replace("{level_guidance}", level_guidance(request.level))
        .replace("{level}", request.level.as_str())
        .replace("{lesson_number}", &request.lesson.lesson_number)
        .replace("{lesson_title}", &request.lesson.title)
        .replace("{lesson_description}", &request.lesson.description)
        .replace("{lesson_id}", &request.lesson.lesson_id)
        .replace(
            "{cards_count_before_last}",
            &(request.cards_count.saturating_sub(1)).to_string(),
        )
        .replace("{cards_count}", &request.cards_count.to_string())
}

//=========================================================================================
// Response parsing helpers
//=========================================================================================

/// A card as the model wrote it: every field optional, normalized later.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    card_id: Option<String>,
    #[serde(rename = "type")]
    card_type: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    explanation: Option<String>,
    key_terms: Option<serde_json::Value>,
    visual_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LessonCardsPayload {
    cards: Option<Vec<RawCard>>,
}

/// Extracts the first balanced `{...}` span from a text blob, so responses
/// wrapped in markdown fences or prose still parse.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_card_type(raw: Option<&str>) -> CardType {
    match raw {
        Some("definition") => CardType::Definition,
        Some("comparison") => CardType::Comparison,
        Some("review") => CardType::Review,
        // Missing or unrecognized types degrade to concept cards.
        _ => CardType::Concept,
    }
}

/// Normalizes raw model cards into well-formed `GeneratedCard`s: ids filled
/// from position, missing strings emptied, non-array key terms dropped.
fn normalize_cards(raw: Vec<RawCard>, lesson_id: &str) -> Vec<GeneratedCard> {
    raw.into_iter()
        .enumerate()
        .map(|(i, card)| GeneratedCard {
            card_id: card
                .card_id
                .unwrap_or_else(|| format!("{lesson_id}-c{}", i + 1)),
            card_type: parse_card_type(card.card_type.as_deref()),
            question: card.question.unwrap_or_default(),
            answer: card.answer.unwrap_or_default(),
            explanation: card.explanation.unwrap_or_default(),
            key_terms: card
                .key_terms
                .as_ref()
                .and_then(serde_json::Value::as_array)
                .map(|terms| {
                    terms
                        .iter()
                        .filter_map(|t| t.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            visual_description: card.visual_description.unwrap_or_default(),
        })
        .collect()
}

/// Parses a model text blob into normalized cards. Split out of the adapter
/// so the whole response path is testable without a network.
pub fn parse_lesson_response(text: &str, lesson_id: &str) -> PortResult<Vec<GeneratedCard>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PortError::MalformedResponse(
            "Empty response from the content model".to_string(),
        ));
    }

    let json_str = extract_json_object(trimmed).ok_or_else(|| {
        PortError::MalformedResponse("Response contained no JSON object".to_string())
    })?;

    let payload: LessonCardsPayload = serde_json::from_str(json_str)
        .map_err(|e| PortError::MalformedResponse(format!("Response was not valid JSON: {e}")))?;

    let cards = payload.cards.ok_or_else(|| {
        PortError::MalformedResponse("Invalid response format: expected { \"cards\": [...] }".to_string())
    })?;
    if cards.is_empty() {
        return Err(PortError::MalformedResponse(
            "Response contained an empty cards array".to_string(),
        ));
    }

    Ok(normalize_cards(cards, lesson_id))
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LessonContentService` against Gemini's
/// OpenAI-compatible chat endpoint.
#[derive(Clone)]
pub struct GeminiLessonAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
    timeout: Duration,
}

impl GeminiLessonAdapter {
    /// Creates the adapter from loaded configuration. Without an API key the
    /// adapter is constructed "unconfigured" and every call reports
    /// `PortError::NotConfigured`.
    pub fn from_config(config: &Config) -> Self {
        let client = config.gemini_api_key.as_ref().map(|key| {
            Client::with_config(
                OpenAIConfig::new()
                    .with_api_base(&config.gemini_api_base)
                    .with_api_key(key),
            )
        });
        Self {
            client,
            model: config.lesson_model.clone(),
            timeout: config.lesson_timeout,
        }
    }
}

//=========================================================================================
// `LessonContentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LessonContentService for GeminiLessonAdapter {
    /// Requests one lesson's flashcards from the content model.
    async fn generate_lesson_cards(
        &self,
        request: &LessonContentRequest,
    ) -> PortResult<Vec<GeneratedCard>> {
        let client = self.client.as_ref().ok_or_else(|| {
            PortError::NotConfigured(
                "GEMINI_API_KEY is not configured. Set it in your environment to generate real course content."
                    .to_string(),
            )
        })?;

        let prompt = build_lesson_prompt(request);
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(8192u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API with a bounded timeout and manually map the error,
        // which respects the orphan rule.
        let response = tokio::time::timeout(self.timeout, client.chat().create(chat_request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!(
                    "Content generation timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        parse_lesson_response(&text, &request.lesson.lesson_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wondering_core::domain::LessonDescriptor;

    fn request() -> LessonContentRequest {
        LessonContentRequest {
            topic: "Roman History".to_string(),
            goal: "understand the fall of Rome".to_string(),
            level: Level::Beginner,
            lesson: LessonDescriptor {
                lesson_id: "lesson-1-1".to_string(),
                lesson_number: "1.1".to_string(),
                title: "Introduction to Roman History".to_string(),
                description: "Learn to introduction to key aspects of Roman History in this 10-minute lesson.".to_string(),
            },
            cards_count: 10,
        }
    }

    #[test]
    fn prompt_carries_context_mix_and_output_contract() {
        let prompt = build_lesson_prompt(&request());
        assert!(prompt.contains("- Topic: Roman History"));
        assert!(prompt.contains("- Lesson: 1.1 - Introduction to Roman History"));
        assert!(prompt.contains("Create 10 flashcards"));
        assert!(prompt.contains("Concept cards: Explain a single idea (60%)"));
        assert!(prompt.contains("Review card: Summarize lesson (10%, always last card)"));
        assert!(prompt.contains("For beginner level: Assume no background, explain everything"));
        assert!(prompt.contains("Cards 2-9: Progressive building blocks"));
        assert!(prompt.contains("Card 10: Review card that tests comprehension"));
        assert!(prompt.contains("\"cardId\": \"lesson-1-1-c1\""));
        assert!(prompt.contains("Output only valid JSON."));
        // No unfilled placeholders left behind.
        assert!(!prompt.contains("{topic}"));
        assert!(!prompt.contains("{cards_count}"));
        assert!(!prompt.contains("{level_guidance}"));
    }

    #[test]
    fn prompt_guidance_tracks_level() {
        let mut advanced = request();
        advanced.level = Level::Advanced;
        let prompt = build_lesson_prompt(&advanced);
        assert!(prompt.contains("For advanced level: Can use technical language, focus on nuance"));
    }

    #[test]
    fn extracts_json_from_markdown_wrapping() {
        let text = "Sure! Here are your cards:\n```json\n{\"cards\": [{\"question\": \"q\"}]}\n```\nEnjoy.";
        assert_eq!(
            extract_json_object(text),
            Some("{\"cards\": [{\"question\": \"q\"}]}")
        );
    }

    #[test]
    fn extraction_ignores_braces_inside_strings() {
        let text = "{\"cards\": [{\"question\": \"what does } mean?\"}]} trailing";
        assert_eq!(
            extract_json_object(text),
            Some("{\"cards\": [{\"question\": \"what does } mean?\"}]}")
        );
    }

    #[test]
    fn extraction_fails_without_an_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{ unbalanced"), None);
    }

    #[test]
    fn parses_and_normalizes_sparse_cards() {
        let text = r#"{"cards": [
            {"question": "What is Rome?", "answer": "A city.", "keyTerms": ["Rome", 7]},
            {"cardId": "custom-id", "type": "review", "question": "q", "answer": "a",
             "explanation": "e", "keyTerms": "not-an-array", "visualDescription": "v"}
        ]}"#;
        let cards = parse_lesson_response(text, "lesson-1-1").unwrap();
        assert_eq!(cards.len(), 2);

        assert_eq!(cards[0].card_id, "lesson-1-1-c1");
        assert_eq!(cards[0].card_type, CardType::Concept);
        assert_eq!(cards[0].key_terms, vec!["Rome".to_string()]);
        assert_eq!(cards[0].explanation, "");

        assert_eq!(cards[1].card_id, "custom-id");
        assert_eq!(cards[1].card_type, CardType::Review);
        assert!(cards[1].key_terms.is_empty());
    }

    #[test]
    fn unknown_card_types_degrade_to_concept() {
        let text = r#"{"cards": [{"type": "trivia", "question": "q"}]}"#;
        let cards = parse_lesson_response(text, "lesson-1-1").unwrap();
        assert_eq!(cards[0].card_type, CardType::Concept);
    }

    #[test]
    fn rejects_empty_and_malformed_responses() {
        assert!(matches!(
            parse_lesson_response("", "lesson-1-1"),
            Err(PortError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_lesson_response("I cannot help with that.", "lesson-1-1"),
            Err(PortError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_lesson_response(r#"{"cards": []}"#, "lesson-1-1"),
            Err(PortError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_lesson_response(r#"{"notCards": true}"#, "lesson-1-1"),
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unconfigured_adapter_reports_not_configured() {
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            log_level: tracing::Level::INFO,
            gemini_api_key: None,
            gemini_api_base: "http://localhost".to_string(),
            lesson_model: "gemini-2.0-flash".to_string(),
            lesson_timeout: Duration::from_secs(30),
        };
        let adapter = GeminiLessonAdapter::from_config(&config);
        let err = adapter
            .generate_lesson_cards(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotConfigured(_)));
    }
}
