//! Service layer for the mock server.
//!
//! Pure business logic that sits between the HTTP handlers and the
//! repository: building scenarios and tests from learning blocks, scoring
//! submissions, and the rule-based analyses behind the analytics endpoints.

pub mod analysis;
pub mod generation;
pub mod scoring;


pub use analysis::{analyze_student, class_analysis, leaderboard, StudentRecord};
pub use generation::{generate_scenario, generate_test, initial_game_state};
pub use scoring::{check_activity_answer, score_submission};
