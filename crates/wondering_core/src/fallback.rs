//! crates/wondering_core/src/fallback.rs
//!
//! Deterministic, offline flashcard generation. When the remote content
//! service is unreachable or answers garbage, these templates produce a full
//! lesson with the same shape and card mix a successful call would have:
//! same inputs, byte-identical output.

use crate::domain::{CardType, CourseGenerationParams, GeneratedCard};
use crate::ports::{LessonCards, LessonContentRequest, LessonContentService};
use crate::structure::normalized_goal;

/// The fixed card-type mix: 60% concept, 20% definition, 10% comparison,
/// 10% review, with the review card always last.
const CARD_MIX: [CardType; 10] = [
    CardType::Concept,
    CardType::Concept,
    CardType::Definition,
    CardType::Concept,
    CardType::Concept,
    CardType::Comparison,
    CardType::Concept,
    CardType::Concept,
    CardType::Definition,
    CardType::Review,
];

struct CardContent {
    question: String,
    answer: String,
    explanation: String,
    key_terms: Vec<String>,
    visual_description: String,
}

//=========================================================================================
// Template sets
//=========================================================================================

fn concept_templates(
    topic: &str,
    goal: &str,
    level: &str,
    verb_lower: &str,
) -> Vec<CardContent> {
    vec![
        CardContent {
            question: format!("What is {topic} and why does it matter?"),
            answer: format!(
                "{topic} is a rich area of study with significant real-world applications. \
                 Understanding it helps you {goal} and see the world differently."
            ),
            explanation: "The field has been studied extensively and continues to evolve with new discoveries.".to_string(),
            key_terms: vec![
                topic.to_string(),
                "fundamentals".to_string(),
                "applications".to_string(),
            ],
            visual_description: format!(
                "A diagram showing the key areas of {topic} and how they connect."
            ),
        },
        CardContent {
            question: format!("What are the core principles of {verb_lower} {topic}?"),
            answer: format!(
                "The core principles include systematic thinking, evidence-based reasoning, \
                 and practical application. These form the foundation for {level} learners."
            ),
            explanation: "These principles form the backbone of effective learning in this area.".to_string(),
            key_terms: vec![
                "principles".to_string(),
                "systematic thinking".to_string(),
                "evidence-based".to_string(),
            ],
            visual_description: "An illustrated list of the core principles with icons.".to_string(),
        },
        CardContent {
            question: format!("How can you apply {topic} concepts in everyday life?"),
            answer: format!(
                "You can apply these concepts by observing patterns, asking critical questions, \
                 and testing your understanding through practice. This supports your goal: {goal}."
            ),
            explanation: "Real-world application accelerates learning and deepens understanding.".to_string(),
            key_terms: vec![
                "application".to_string(),
                "practice".to_string(),
                "patterns".to_string(),
            ],
            visual_description: "A before/after comparison showing how knowledge changes perspective.".to_string(),
        },
        CardContent {
            question: format!("What makes {topic} different from related fields?"),
            answer: format!(
                "{topic} focuses on specific methods, frameworks, and outcomes that distinguish \
                 it from adjacent disciplines. The key is how concepts are applied."
            ),
            explanation: "Understanding boundaries helps you know when and where to use what you learn.".to_string(),
            key_terms: vec![
                "distinction".to_string(),
                "focus".to_string(),
                "frameworks".to_string(),
            ],
            visual_description: format!("A Venn diagram comparing {topic} with related fields."),
        },
        CardContent {
            question: format!("What common mistakes do people make when learning {topic}?"),
            answer: format!(
                "Common mistakes include skipping fundamentals, memorizing without understanding, \
                 and not practicing enough. {level} learners often benefit from building a strong base first."
            ),
            explanation: "Avoiding these pitfalls can save you time and frustration.".to_string(),
            key_terms: vec![
                "mistakes".to_string(),
                "pitfalls".to_string(),
                "fundamentals".to_string(),
            ],
            visual_description: "A checklist of pitfalls to avoid, with checkmarks.".to_string(),
        },
        CardContent {
            question: format!("How does {verb_lower} {topic} connect to your overall goal?"),
            answer: format!(
                "This lesson builds toward your goal of {goal} by introducing essential concepts \
                 you'll use later. Each card adds another building block."
            ),
            explanation: "Connecting new knowledge to your goals improves retention.".to_string(),
            key_terms: vec![
                "connection".to_string(),
                "goal".to_string(),
                "progression".to_string(),
            ],
            visual_description: "A progress path from this lesson toward your goal.".to_string(),
        },
    ]
}

fn definition_templates(topic: &str) -> Vec<CardContent> {
    vec![
        CardContent {
            question: format!("Define the term \"core competency\" in the context of {topic}."),
            answer: format!(
                "In {topic}, core competency refers to the fundamental skills and knowledge \
                 you need to understand and apply key concepts effectively."
            ),
            explanation: "Having a clear definition helps you recognize when you've mastered a concept.".to_string(),
            key_terms: vec![
                "core competency".to_string(),
                "fundamentals".to_string(),
                topic.to_string(),
            ],
            visual_description: "An illustrated definition card with key terms highlighted.".to_string(),
        },
        CardContent {
            question: format!("What does \"evidence-based\" mean when applied to {topic}?"),
            answer: format!(
                "Evidence-based means relying on research, data, and proven methods rather than \
                 opinions or anecdotes. In {topic}, this ensures your learning is grounded in what works."
            ),
            explanation: "Evidence-based practice has roots in medicine and has spread to many disciplines.".to_string(),
            key_terms: vec![
                "evidence-based".to_string(),
                "research".to_string(),
                "data".to_string(),
            ],
            visual_description: "A diagram showing data flowing into decisions.".to_string(),
        },
    ]
}

fn comparison_template(topic: &str, level: &str) -> CardContent {
    CardContent {
        question: format!(
            "How does {topic} for beginners differ from {topic} for advanced learners?"
        ),
        answer: format!(
            "Beginners focus on foundations and core concepts; advanced learners tackle nuance, \
             edge cases, and specialized applications. Your {level} level shapes what you learn next."
        ),
        explanation: "The same topic unfolds differently depending on where you start.".to_string(),
        key_terms: vec![
            "beginner".to_string(),
            "advanced".to_string(),
            "progression".to_string(),
        ],
        visual_description: "A comparison timeline showing beginner vs advanced paths.".to_string(),
    }
}

fn review_template(topic: &str, goal: &str, verb_lower: &str) -> CardContent {
    CardContent {
        question: format!(
            "Quick review: Summarize the key takeaways about {topic} from this lesson."
        ),
        answer: format!(
            "This lesson covered core principles of {verb_lower} {topic}, how to apply them, \
             common pitfalls, and how they connect to your goal of {goal}. \
             You now have a solid base to build on."
        ),
        explanation: "Summarizing helps consolidate what you've learned and identify any gaps.".to_string(),
        key_terms: vec!["review".to_string(), "summary".to_string(), topic.to_string()],
        visual_description: "A mind-map summarizing the lesson's key points.".to_string(),
    }
}

//=========================================================================================
// Generation
//=========================================================================================

/// Produces the full 10-card sequence for one lesson, entirely offline.
///
/// Concept slots cycle through six templates and definition slots through
/// two, indexed by position in the mix rather than by mutable counters, so
/// identical inputs always yield identical cards.
pub fn fallback_cards(
    params: &CourseGenerationParams,
    lesson_id: &str,
    verb: &str,
) -> Vec<GeneratedCard> {
    let level = params.level.as_str();
    let goal = normalized_goal(&params.goal);
    let verb_lower = verb.to_lowercase();

    let concepts = concept_templates(&params.topic, &goal, level, &verb_lower);
    let definitions = definition_templates(&params.topic);
    let comparison = comparison_template(&params.topic, level);
    let review = review_template(&params.topic, &goal, &verb_lower);

    let mut concept_idx = 0usize;
    let mut definition_idx = 0usize;

    CARD_MIX
        .iter()
        .enumerate()
        .map(|(i, card_type)| {
            let content = match card_type {
                CardType::Concept => {
                    let content = &concepts[concept_idx % concepts.len()];
                    concept_idx += 1;
                    content
                }
                CardType::Definition => {
                    let content = &definitions[definition_idx % definitions.len()];
                    definition_idx += 1;
                    content
                }
                CardType::Comparison => &comparison,
                CardType::Review => &review,
            };

            GeneratedCard {
                card_id: format!("{lesson_id}-c{}", i + 1),
                card_type: *card_type,
                question: content.question.clone(),
                answer: content.answer.clone(),
                explanation: content.explanation.clone(),
                key_terms: content.key_terms.clone(),
                visual_description: content.visual_description.clone(),
            }
        })
        .collect()
}

/// Realizes one lesson's cards through the content port, absorbing every
/// failure into deterministic fallback content. This is the only path the
/// generation pipeline uses; upstream errors never travel further than here.
pub async fn realize_lesson_cards(
    service: &dyn LessonContentService,
    params: &CourseGenerationParams,
    request: &LessonContentRequest,
    verb: &str,
) -> LessonCards {
    match service.generate_lesson_cards(request).await {
        Ok(cards) => LessonCards::Remote(cards),
        Err(reason) => LessonCards::Fallback {
            cards: fallback_cards(params, &request.lesson.lesson_id, verb),
            reason,
        },
    }
}
