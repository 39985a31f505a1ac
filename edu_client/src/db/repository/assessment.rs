//! Generated tests and their results.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{BlockId, TestId, TestResult, UserId};
use crate::db::models::StoredTest;

/// Repository trait for tests.
///
/// Results are append-only: there is no update or delete.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn store_test(&self, test: StoredTest) -> RepositoryResult<()>;

    async fn get_test(&self, id: &TestId) -> RepositoryResult<StoredTest>;

    /// Record a new result. Fails with a conflict if the id is already taken.
    async fn append_result(&self, result: TestResult) -> RepositoryResult<TestResult>;

    /// Results of one student in completion order, optionally for one block.
    async fn list_results(
        &self,
        student_id: &UserId,
        block_id: Option<&BlockId>,
    ) -> RepositoryResult<Vec<TestResult>>;

    async fn list_all_results(&self) -> RepositoryResult<Vec<TestResult>>;
}
