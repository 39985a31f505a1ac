//! Scoring of test submissions and activity answers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::api::{
    Activity, AnswerOutcome, QuestionId, SubmittedAnswer, TestAnswer, TestResult, TestResultId,
    UserId,
};
use crate::db::models::StoredTest;
use crate::db::repository::{RepositoryError, RepositoryResult};

const NUMERIC_TOLERANCE: f64 = 1e-6;

/// Compare a given answer with the expected one.
///
/// Strings match case-insensitively after trimming, numbers within a small
/// tolerance (a numeric string matches a number), and anything else must be
/// equal.
pub fn answers_match(expected: &Value, given: &Value) -> bool {
    match (expected, given) {
        (Value::String(a), Value::String(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (as_number(expected), as_number(given)) {
                (Some(a), Some(b)) => (a - b).abs() < NUMERIC_TOLERANCE,
                _ => false,
            }
        }
        _ => expected == given,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Feedback line for a percentage score.
pub fn feedback_for(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "Excellent work! You have mastered this block.",
        p if p >= 70.0 => "Good job. Review the questions you missed to close the gaps.",
        p if p >= 50.0 => "You passed. Another pass through the block's activities will help.",
        _ => "This block needs more practice. Try the activities again before retaking the test.",
    }
}

/// Score a submission against the stored answer key.
///
/// Every question of the test appears in the result; unanswered questions
/// count as incorrect. Answers to questions that are not in the test are
/// rejected.
pub fn score_submission(
    stored: &StoredTest,
    student_id: UserId,
    answers: Vec<SubmittedAnswer>,
    now: DateTime<Utc>,
) -> RepositoryResult<TestResult> {
    let mut submitted: HashMap<QuestionId, SubmittedAnswer> = HashMap::new();
    for answer in answers {
        if stored.correct_answer(&answer.question_id).is_none() {
            return Err(RepositoryError::validation(format!(
                "Question {} is not part of test {}",
                answer.question_id, stored.test.id
            )));
        }
        submitted.insert(answer.question_id.clone(), answer);
    }

    let mut score = 0u32;
    let mut max_score = 0u32;
    let mut time_spent = 0u64;
    let mut scored_answers = Vec::with_capacity(stored.test.questions.len());

    for question in &stored.test.questions {
        max_score += question.points;
        let correct_answer = stored
            .correct_answer(&question.id)
            .cloned()
            .unwrap_or(Value::Null);
        let (user_answer, spent) = match submitted.remove(&question.id) {
            Some(a) => (a.user_answer, a.time_spent),
            None => (Value::Null, 0),
        };
        let is_correct = !user_answer.is_null() && answers_match(&correct_answer, &user_answer);
        if is_correct {
            score += question.points;
        }
        time_spent = time_spent.saturating_add(spent);
        scored_answers.push(TestAnswer {
            question_id: question.id.clone(),
            user_answer,
            correct_answer,
            is_correct,
            time_spent: spent,
        });
    }

    let mut result = TestResult {
        id: TestResultId::new(Uuid::new_v4().to_string()),
        student_id,
        block_id: stored.test.block_id.clone(),
        score: f64::from(score),
        max_score: f64::from(max_score),
        time_spent,
        answers: scored_answers,
        feedback: String::new(),
        completed_at: now,
    };
    result.feedback = feedback_for(result.percentage()).to_string();
    Ok(result)
}

/// Check an answer to a single activity.
///
/// Activities with a `correctAnswer` in their content are graded; open
/// activities (discussion, story, exploration) accept any non-empty answer.
pub fn check_activity_answer(activity: &Activity, answer: &Value) -> AnswerOutcome {
    let answered = match answer {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    };
    let (correct, feedback) = match activity.content.get("correctAnswer") {
        Some(expected) => {
            let correct = answered && answers_match(expected, answer);
            let feedback = if correct {
                "Correct!"
            } else {
                "Not quite. Have another look at the material."
            };
            (correct, feedback)
        }
        None if answered => (true, "Thanks, your answer has been recorded."),
        None => (false, "Please provide an answer."),
    };

    AnswerOutcome {
        activity_id: activity.id.clone(),
        correct,
        points_awarded: if correct { activity.points } else { 0 },
        feedback: feedback.to_string(),
    }
}
