//! Deterministic scenario and test generation from learning blocks.
//!
//! The output depends only on the block, the student's preferences and the
//! options passed in (plus fresh ids and timestamps), so repeated calls with
//! the same inputs produce the same questions in the same order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::api::{
    Activity, ActivityId, ActivityType, BlockId, DifficultyLevel, GameInventory, GameState,
    GameStats, GeneratedScenario, GeneratedTest, LearningBlock, LearningPreferences, QuestionId,
    TestId, TestOptions, TestQuestion, User, UserId,
};
use crate::db::models::StoredTest;
use crate::db::repository::{RepositoryError, RepositoryResult};

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 50;
/// Seconds granted per question when no time limit is requested.
pub const SECONDS_PER_QUESTION: u32 = 60;

/// Points per question for a difficulty level.
pub fn question_points(difficulty: DifficultyLevel) -> u32 {
    match difficulty {
        DifficultyLevel::Easy => 10,
        DifficultyLevel::Medium => 20,
        DifficultyLevel::Hard => 30,
    }
}

/// Activity types that suit a learning style, best match first.
pub fn preferred_activity_types(style: &str) -> &'static [ActivityType] {
    match style {
        "visual" => &[ActivityType::Exploration, ActivityType::MiniGame, ActivityType::Story],
        "auditory" => &[ActivityType::Discussion, ActivityType::Story, ActivityType::Quiz],
        "kinesthetic" => &[ActivityType::MiniGame, ActivityType::Exploration, ActivityType::Quiz],
        _ => &[ActivityType::Quiz, ActivityType::Story, ActivityType::Discussion],
    }
}

/// Rank activities by how well their type suits `style`; stable otherwise.
pub fn rank_activities(activities: &[Activity], style: &str) -> Vec<Activity> {
    let preferred = preferred_activity_types(style);
    let rank = |a: &Activity| {
        preferred
            .iter()
            .position(|t| *t == a.kind)
            .unwrap_or(preferred.len())
    };
    let mut ranked = activities.to_vec();
    ranked.sort_by_key(|a| rank(a));
    ranked
}

/// The state a student starts from before saving any progress.
///
/// Points at the first activity of `first_block` when there is one.
pub fn initial_game_state(student_id: UserId, first_block: Option<&LearningBlock>) -> GameState {
    let current_block_id = first_block
        .map(|b| b.id.clone())
        .unwrap_or_else(|| BlockId::new(""));
    let current_activity_id = first_block
        .and_then(|b| b.activities.first())
        .map(|a| a.id.clone())
        .unwrap_or_else(|| ActivityId::new(""));
    GameState {
        student_id,
        current_block_id,
        current_activity_id,
        progress: Default::default(),
        inventory: GameInventory::default(),
        stats: GameStats {
            level: 1,
            ..GameStats::default()
        },
        preferences: LearningPreferences::default(),
    }
}

/// Build a personalised scenario for one student.
pub fn generate_scenario(
    block: &LearningBlock,
    student: &User,
    preferences: &LearningPreferences,
    now: DateTime<Utc>,
) -> GeneratedScenario {
    let style = super::analysis::dominant_style(preferences);
    let objectives = if block.learning_objectives.is_empty() {
        String::from("explore the topic")
    } else {
        block.learning_objectives.join("; ")
    };
    let narrative = format!(
        "{}, your next mission is \"{}\". Along the way you will: {}.",
        student.name, block.title, objectives
    );

    GeneratedScenario {
        block_id: block.id.clone(),
        student_id: student.id.clone(),
        title: format!("{}: {}", block.title, style_title(style)),
        narrative,
        difficulty: preferences.preferred_difficulty,
        activities: rank_activities(&block.activities, style),
        generated_at: now,
    }
}

fn style_title(style: &str) -> &'static str {
    match style {
        "visual" => "Expedition",
        "auditory" => "Conversation",
        "kinesthetic" => "Workshop",
        _ => "Chronicle",
    }
}

/// A question candidate with its correct answer.
struct Candidate {
    prompt: String,
    choices: Vec<String>,
    answer: Value,
}

fn quiz_candidate(activity: &Activity) -> Option<Candidate> {
    if activity.kind != ActivityType::Quiz {
        return None;
    }
    let prompt = activity.content.get("question")?.as_str()?.to_string();
    let answer = activity.content.get("correctAnswer")?.clone();
    let choices = activity
        .content
        .get("options")
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .filter_map(|o| o.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Some(Candidate {
        prompt,
        choices,
        answer,
    })
}

fn objective_candidate(block: &LearningBlock, objective: &str) -> Candidate {
    Candidate {
        prompt: format!(
            "Is \"{}\" one of the objectives of \"{}\"?",
            objective, block.title
        ),
        choices: vec!["yes".to_string(), "no".to_string()],
        answer: Value::String("yes".to_string()),
    }
}

/// Build a test for `block`, returning it together with the answer key.
///
/// Questions come from the block's quiz activities first, then from its
/// learning objectives.
pub fn generate_test(
    block: &LearningBlock,
    student: &User,
    options: &TestOptions,
    now: DateTime<Utc>,
) -> RepositoryResult<StoredTest> {
    let requested = options.question_count.unwrap_or(DEFAULT_QUESTION_COUNT);
    if requested == 0 || requested > MAX_QUESTION_COUNT {
        return Err(RepositoryError::validation(format!(
            "questionCount must be between 1 and {}",
            MAX_QUESTION_COUNT
        )));
    }

    let candidates: Vec<Candidate> = block
        .activities
        .iter()
        .filter_map(quiz_candidate)
        .chain(
            block
                .learning_objectives
                .iter()
                .map(|o| objective_candidate(block, o)),
        )
        .take(requested as usize)
        .collect();
    if candidates.is_empty() {
        return Err(RepositoryError::validation(format!(
            "Learning block {} has no quiz activities or objectives to build a test from",
            block.id
        )));
    }

    let difficulty = options.difficulty.unwrap_or(block.difficulty);
    let points = question_points(difficulty);
    let test_id = TestId::new(Uuid::new_v4().to_string());

    let mut questions = Vec::with_capacity(candidates.len());
    let mut answer_key = BTreeMap::new();
    for (n, candidate) in candidates.into_iter().enumerate() {
        let id = QuestionId::new(format!("{}-q{}", test_id, n + 1));
        answer_key.insert(id.clone(), candidate.answer);
        questions.push(TestQuestion {
            id,
            prompt: candidate.prompt,
            choices: candidate.choices,
            points,
        });
    }

    let time_limit = options
        .time_limit
        .unwrap_or(questions.len() as u32 * SECONDS_PER_QUESTION);

    let test = GeneratedTest {
        id: test_id,
        block_id: block.id.clone(),
        student_id: student.id.clone(),
        difficulty,
        questions,
        time_limit: Some(time_limit),
        created_at: now,
    };
    Ok(StoredTest::new(test, answer_key))
}
