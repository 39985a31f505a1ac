//! Records the repository keeps that never cross the wire as-is.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::{GeneratedTest, QuestionId};

/// A generated test together with its answer key.
///
/// Only `test` is ever returned to clients; the key stays server side and
/// is used when a submission is scored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTest {
    pub test: GeneratedTest,
    pub answer_key: BTreeMap<QuestionId, Value>,
}

impl StoredTest {
    pub fn new(test: GeneratedTest, answer_key: BTreeMap<QuestionId, Value>) -> Self {
        Self { test, answer_key }
    }

    pub fn correct_answer(&self, question_id: &QuestionId) -> Option<&Value> {
        self.answer_key.get(question_id)
    }
}
