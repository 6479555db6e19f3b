//! crates/wondering_core/src/structure.rs
//!
//! The course structuring algorithm: sizes a course from the generation
//! parameters and synthesizes its level/lesson skeleton (titles, numbering,
//! descriptions — no flashcards). Everything here is pure.

use crate::domain::{
    CourseGenerationParams, GeneratedLesson, GeneratedLevel, Level, LessonStatus,
};

/// Sizing used when the learner picks a self-paced timeline. Display still
/// says "self-paced"; only the math uses this.
const SELF_PACED_WEEKS: u32 = 4;

/// How many lessons get cards generated eagerly at course-creation time.
pub const EAGER_LESSON_COUNT: usize = 3;

const LEVEL_TEMPLATES: [(&str, &str); 5] = [
    ("Foundations", "Build your base understanding"),
    ("Core Concepts", "Master the essential ideas"),
    ("Practical Application", "Put knowledge into practice"),
    ("Advanced Topics", "Dive deeper into nuanced areas"),
    ("Mastery & Synthesis", "Bring it all together"),
];

const LESSON_VERBS: [[&str; 4]; 5] = [
    ["Introduction to", "Understanding", "Exploring", "Discovering"],
    ["Deep Dive into", "Analyzing", "Breaking Down", "Examining"],
    ["Applying", "Practicing", "Building with", "Working with"],
    ["Advanced", "Optimizing", "Evaluating", "Mastering"],
    ["Synthesizing", "Creating with", "Innovating in", "Teaching"],
];

//=========================================================================================
// Sizing
//=========================================================================================

/// The computed dimensions of a course.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoursePlan {
    pub total_sessions: u32,
    pub total_minutes: u32,
    /// Rounded to one decimal place.
    pub estimated_hours: f64,
    pub num_levels: usize,
    pub lessons_per_level: usize,
}

/// Computes session counts, estimated hours and the level/lesson grid.
pub fn plan_course(params: &CourseGenerationParams) -> CoursePlan {
    let weeks = params.timeline.unwrap_or(SELF_PACED_WEEKS);
    let total_sessions = params.frequency.sessions_per_week() * weeks;
    let total_minutes = total_sessions * params.duration;
    let estimated_hours = (f64::from(total_minutes) / 60.0 * 10.0).round() / 10.0;

    let num_levels = if estimated_hours <= 2.0 {
        3
    } else if estimated_hours <= 6.0 {
        4
    } else {
        5
    };
    let lessons_per_level = if estimated_hours <= 3.0 {
        2
    } else if estimated_hours <= 8.0 {
        3
    } else {
        4
    };

    CoursePlan {
        total_sessions,
        total_minutes,
        estimated_hours,
        num_levels,
        lessons_per_level,
    }
}

//=========================================================================================
// Skeleton synthesis
//=========================================================================================

/// Locates a lesson queued for eager card generation within the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EagerLesson {
    pub level_index: usize,
    pub lesson_index: usize,
    /// The verb phrase the lesson title was built from, reused by the
    /// fallback card templates.
    pub verb: &'static str,
}

/// A course skeleton: levels and lessons, titled and numbered, no cards yet.
#[derive(Debug, Clone)]
pub struct CourseSkeleton {
    pub plan: CoursePlan,
    pub levels: Vec<GeneratedLevel>,
    /// The first [`EAGER_LESSON_COUNT`] lessons in authoring order.
    pub eager: Vec<EagerLesson>,
}

/// Builds the level/lesson skeleton for the given parameters.
///
/// Lessons are numbered `"{level}.{index}"` (1-based); the first
/// [`EAGER_LESSON_COUNT`] lessons in level-then-lesson order are marked
/// [`LessonStatus::Generated`], all others [`LessonStatus::Pending`].
pub fn build_skeleton(params: &CourseGenerationParams) -> CourseSkeleton {
    let plan = plan_course(params);

    let mut levels = Vec::with_capacity(plan.num_levels);
    let mut eager = Vec::with_capacity(EAGER_LESSON_COUNT);
    let mut lesson_count = 0usize;

    for l in 0..plan.num_levels {
        let mut lessons = Vec::with_capacity(plan.lessons_per_level);
        for s in 0..plan.lessons_per_level {
            lesson_count += 1;
            let verb = LESSON_VERBS[l][s % LESSON_VERBS[l].len()];
            let is_eager = lesson_count <= EAGER_LESSON_COUNT;

            if is_eager {
                eager.push(EagerLesson {
                    level_index: l,
                    lesson_index: s,
                    verb,
                });
            }

            lessons.push(GeneratedLesson {
                lesson_id: format!("lesson-{}-{}", l + 1, s + 1),
                lesson_number: format!("{}.{}", l + 1, s + 1),
                title: format!("{verb} {}", params.topic),
                description: format!(
                    "Learn to {} key aspects of {} in this {}-minute lesson.",
                    verb.to_lowercase(),
                    params.topic,
                    params.duration
                ),
                estimated_minutes: params.duration,
                cards_count: 10,
                status: if is_eager {
                    LessonStatus::Generated
                } else {
                    LessonStatus::Pending
                },
                cards: None,
            });
        }

        let (title, desc) = LEVEL_TEMPLATES[l];
        levels.push(GeneratedLevel {
            level_number: (l + 1) as u32,
            title: title.to_string(),
            description: format!("{desc} of {}", params.topic),
            lessons,
        });
    }

    CourseSkeleton {
        plan,
        levels,
        eager,
    }
}

//=========================================================================================
// Course title and description
//=========================================================================================

/// The learner's goal, lowercased with any trailing period stripped, for
/// embedding mid-sentence.
pub fn normalized_goal(goal: &str) -> String {
    let lowered = goal.to_lowercase();
    lowered
        .strip_suffix('.')
        .map(str::to_string)
        .unwrap_or(lowered)
}

pub fn course_title(level: Level, topic: &str) -> String {
    match level {
        Level::Beginner => format!("{topic}: A Beginner's Journey"),
        Level::Intermediate => format!("Leveling Up in {topic}"),
        Level::Advanced => format!("Mastering {topic}"),
    }
}

pub fn course_description(params: &CourseGenerationParams, estimated_hours: f64) -> String {
    format!(
        "A personalized {estimated_hours}-hour course designed to help you {}. \
         Built for {} learners with {}-minute {} sessions.",
        normalized_goal(&params.goal),
        params.level.as_str(),
        params.duration,
        params.frequency.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;

    fn params(frequency: Frequency, duration: u32, timeline: Option<u32>) -> CourseGenerationParams {
        CourseGenerationParams {
            topic: "Roman History".to_string(),
            goal: "understand the fall of Rome".to_string(),
            level: Level::Beginner,
            frequency,
            duration,
            timeline,
        }
    }

    #[test]
    fn sizes_daily_ten_minute_four_week_course() {
        let plan = plan_course(&params(Frequency::Daily, 10, Some(4)));
        assert_eq!(plan.total_sessions, 28);
        assert_eq!(plan.total_minutes, 280);
        assert_eq!(plan.estimated_hours, 4.7);
        assert_eq!(plan.num_levels, 4);
        assert_eq!(plan.lessons_per_level, 3);
    }

    #[test]
    fn self_paced_sizes_as_four_weeks() {
        let with_timeline = plan_course(&params(Frequency::Weekly, 15, Some(4)));
        let self_paced = plan_course(&params(Frequency::Weekly, 15, None));
        assert_eq!(with_timeline, self_paced);
    }

    #[test]
    fn sizing_stays_within_bounds_for_all_inputs() {
        for frequency in [Frequency::Daily, Frequency::ThreeTimesAWeek, Frequency::Weekly] {
            for duration in [5, 10, 15, 30] {
                for timeline in [Some(1), Some(2), Some(4), Some(12), None] {
                    let plan = plan_course(&params(frequency, duration, timeline));
                    assert!((3..=5).contains(&plan.num_levels));
                    assert!((2..=4).contains(&plan.lessons_per_level));
                    let expected = (f64::from(plan.total_minutes) / 60.0 * 10.0).round() / 10.0;
                    assert_eq!(plan.estimated_hours, expected);
                }
            }
        }
    }

    #[test]
    fn first_three_lessons_are_generated_in_traversal_order() {
        let skeleton = build_skeleton(&params(Frequency::Daily, 10, Some(4)));
        let statuses: Vec<LessonStatus> = skeleton
            .levels
            .iter()
            .flat_map(|level| level.lessons.iter().map(|lesson| lesson.status))
            .collect();

        assert_eq!(statuses.len(), 12);
        assert!(statuses[..3]
            .iter()
            .all(|s| *s == LessonStatus::Generated));
        assert!(statuses[3..].iter().all(|s| *s == LessonStatus::Pending));

        assert_eq!(skeleton.eager.len(), 3);
        assert_eq!(
            skeleton.eager[0],
            EagerLesson {
                level_index: 0,
                lesson_index: 0,
                verb: "Introduction to"
            }
        );
        // Three lessons per level here, so all eager lessons sit in level 1.
        assert_eq!(
            skeleton.eager[2],
            EagerLesson {
                level_index: 0,
                lesson_index: 2,
                verb: "Exploring"
            }
        );
    }

    #[test]
    fn eager_lessons_spill_into_the_second_level_on_small_grids() {
        // 2 lessons per level: the third eager lesson is lesson 2.1.
        let skeleton = build_skeleton(&params(Frequency::Weekly, 5, Some(1)));
        assert_eq!(skeleton.eager.len(), 3);
        assert_eq!(skeleton.eager[2].level_index, 1);
        assert_eq!(skeleton.eager[2].lesson_index, 0);
        assert_eq!(skeleton.eager[2].verb, "Deep Dive into");
    }

    #[test]
    fn lesson_numbers_match_level_positions_and_are_unique() {
        let skeleton = build_skeleton(&params(Frequency::Daily, 30, Some(12)));
        let mut seen = std::collections::HashSet::new();
        for level in &skeleton.levels {
            for (i, lesson) in level.lessons.iter().enumerate() {
                assert_eq!(
                    lesson.lesson_number,
                    format!("{}.{}", level.level_number, i + 1)
                );
                assert!(seen.insert(lesson.lesson_number.clone()));
                assert_eq!(lesson.cards_count, 10);
                assert_eq!(lesson.estimated_minutes, 30);
            }
        }
    }

    #[test]
    fn short_course_uses_level_template_prefix() {
        // 1 session/week x 1 week x 5 minutes ~= 0.1 hours: the smallest grid.
        let skeleton = build_skeleton(&params(Frequency::Weekly, 5, Some(1)));
        let titles: Vec<&str> = skeleton
            .levels
            .iter()
            .map(|level| level.title.as_str())
            .collect();
        assert_eq!(titles, ["Foundations", "Core Concepts", "Practical Application"]);
    }

    #[test]
    fn derives_title_and_description() {
        let p = params(Frequency::Daily, 10, Some(4));
        assert_eq!(
            course_title(Level::Beginner, &p.topic),
            "Roman History: A Beginner's Journey"
        );
        assert_eq!(
            course_title(Level::Advanced, &p.topic),
            "Mastering Roman History"
        );
        let description = course_description(&p, 4.7);
        assert_eq!(
            description,
            "A personalized 4.7-hour course designed to help you understand the fall of rome. \
             Built for beginner learners with 10-minute daily sessions."
        );
    }

    #[test]
    fn normalized_goal_strips_one_trailing_period() {
        assert_eq!(normalized_goal("Pass the exam."), "pass the exam");
        assert_eq!(normalized_goal("Pass the exam"), "pass the exam");
        assert_eq!(normalized_goal("Why not..."), "why not..");
    }
}
