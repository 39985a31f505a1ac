use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::curriculum::BlockId;
use super::user::UserId;

define_id_type!(TestId);
define_id_type!(TestResultId);
define_id_type!(QuestionId);

/// Outcome of one test attempt. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: TestResultId,
    pub student_id: UserId,
    pub block_id: BlockId,
    pub score: f64,
    pub max_score: f64,
    /// Seconds
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub answers: Vec<TestAnswer>,
    #[serde(default)]
    pub feedback: String,
    pub completed_at: DateTime<Utc>,
}

impl TestResult {
    /// Score as a percentage of the maximum, `0.0` when the test had no points.
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0.0 {
            0.0
        } else {
            self.score * 100.0 / self.max_score
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAnswer {
    pub question_id: QuestionId,
    pub user_answer: Value,
    pub correct_answer: Value,
    pub is_correct: bool,
    #[serde(default)]
    pub time_spent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64, max_score: f64) -> TestResult {
        TestResult {
            id: "r1".into(),
            student_id: "s1".into(),
            block_id: "b1".into(),
            score,
            max_score,
            time_spent: 0,
            answers: vec![],
            feedback: String::new(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage() {
        assert_eq!(result(15.0, 20.0).percentage(), 75.0);
        assert_eq!(result(0.0, 0.0).percentage(), 0.0);
    }

    #[test]
    fn test_answer_wire_format() {
        let json = r#"{
            "questionId": "q1", "userAnswer": 2, "correctAnswer": 2,
            "isCorrect": true, "timeSpent": 12
        }"#;
        let answer: TestAnswer = serde_json::from_str(json).unwrap();
        assert!(answer.is_correct);
        assert_eq!(answer.user_answer, Value::from(2));
    }
}
