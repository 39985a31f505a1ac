//! Public API surface: request and response payloads exchanged with the server.
//!
//! Persisted entities live in [`crate::models`] and are re-exported here so
//! callers can import everything the HTTP contract needs from one place.
//! All payloads use camelCase JSON field names.

pub use crate::models::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error body returned by the server with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// Returned by login and register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Generic confirmation body for operations without a resource to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Subjects & learning blocks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub grade: u8,
    /// Defaults to the authenticated teacher when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLearningBlock {
    pub subject_id: SubjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_duration: u32,
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningBlockUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    pub student_id: UserId,
}

/// Personalised game scenario built around one learning block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScenario {
    pub block_id: BlockId,
    pub student_id: UserId,
    pub title: String,
    pub narrative: String,
    pub difficulty: DifficultyLevel,
    pub activities: Vec<Activity>,
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Game
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub answer: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub activity_id: ActivityId,
    pub correct: bool,
    pub points_awarded: u32,
    #[serde(default)]
    pub feedback: String,
}

/// Query for the leaderboard; an absent subject is omitted from the URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub student_id: UserId,
    pub name: String,
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u32,
}

// =============================================================================
// Analytics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: UserId,
    pub name: String,
    /// Percentage in `[0, 100]`
    pub overall_progress: f64,
    pub risk_level: RiskSeverity,
    pub preferred_learning_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAnalysis {
    pub class_id: String,
    pub student_count: usize,
    /// Percentage in `[0, 100]`
    pub average_score: f64,
    pub students: Vec<StudentSummary>,
    pub at_risk_students: Vec<UserId>,
}

// =============================================================================
// Tests
// =============================================================================

/// Extra generation options, flattened into the generate-test body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyLevel>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestRequest {
    pub block_id: BlockId,
    pub student_id: UserId,
    #[serde(flatten)]
    pub options: TestOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestion {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    pub points: u32,
}

/// A generated test as handed to the student (no answer key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTest {
    pub id: TestId,
    pub block_id: BlockId,
    pub student_id: UserId,
    pub difficulty: DifficultyLevel,
    pub questions: Vec<TestQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedTest {
    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub user_answer: Value,
    /// Seconds
    #[serde(default)]
    pub time_spent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitTestRequest {
    pub answers: Vec<SubmittedAnswer>,
}

/// Query for test results; an absent block is omitted from the URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
}

/// Free-form JSON object, used where the contract leaves a shape open.
pub type JsonObject = Map<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_test_request_flattens_options() {
        let request = GenerateTestRequest {
            block_id: "b1".into(),
            student_id: "s1".into(),
            options: TestOptions {
                question_count: Some(5),
                difficulty: Some(DifficultyLevel::Hard),
                time_limit: None,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "blockId": "b1",
                "studentId": "s1",
                "questionCount": 5,
                "difficulty": "hard"
            })
        );
    }

    #[test]
    fn test_generate_test_request_without_options() {
        let request = GenerateTestRequest {
            block_id: "b1".into(),
            student_id: "s1".into(),
            options: TestOptions::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"blockId": "b1", "studentId": "s1"}));
    }

    #[test]
    fn test_empty_update_serializes_to_empty_object() {
        let value = serde_json::to_value(SubjectUpdate::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_max_score_sums_question_points() {
        let test = GeneratedTest {
            id: "t1".into(),
            block_id: "b1".into(),
            student_id: "s1".into(),
            difficulty: DifficultyLevel::Easy,
            questions: vec![
                TestQuestion {
                    id: "q1".into(),
                    prompt: "?".to_string(),
                    choices: vec![],
                    points: 3,
                },
                TestQuestion {
                    id: "q2".into(),
                    prompt: "?".to_string(),
                    choices: vec![],
                    points: 7,
                },
            ],
            time_limit: None,
            created_at: Utc::now(),
        };
        assert_eq!(test.max_score(), 10);
    }
}
