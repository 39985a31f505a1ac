use crate::api::{
    GenerateTestRequest, GeneratedTest, SubmitTestRequest, SubmittedAnswer, TestOptions, TestResult,
    TestResultsQuery,
};
use crate::client::{ApiClient, ApiPath, ClientResult};

pub const GENERATE_TEST: &str = "/tests/generate";
pub const SUBMIT_TEST: &str = "/tests/{id}/submit";
pub const TEST_RESULTS: &str = "/tests/results/{student_id}";
pub const TEST: &str = "/tests/{id}";

/// Test generation, submission and results.
pub struct TestsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TestsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST /tests/generate; `options` are merged into the body.
    pub async fn generate_test(
        &self,
        block_id: impl AsRef<str>,
        student_id: impl AsRef<str>,
        options: Option<TestOptions>,
    ) -> ClientResult<GeneratedTest> {
        let body = GenerateTestRequest {
            block_id: block_id.as_ref().into(),
            student_id: student_id.as_ref().into(),
            options: options.unwrap_or_default(),
        };
        self.client.post(GENERATE_TEST, &body).await
    }

    /// POST /tests/{id}/submit. Every call records a new result.
    pub async fn submit_test(
        &self,
        test_id: impl AsRef<str>,
        answers: Vec<SubmittedAnswer>,
    ) -> ClientResult<TestResult> {
        self.client
            .post(
                ApiPath::expand(SUBMIT_TEST, &[test_id.as_ref()]),
                &SubmitTestRequest { answers },
            )
            .await
    }

    /// GET /tests/results/{student_id}, with `blockId` only when one is given.
    pub async fn get_test_results(
        &self,
        student_id: impl AsRef<str>,
        block_id: Option<&str>,
    ) -> ClientResult<Vec<TestResult>> {
        let query = TestResultsQuery {
            block_id: block_id.map(Into::into),
        };
        self.client
            .get_with(ApiPath::expand(TEST_RESULTS, &[student_id.as_ref()]), &query)
            .await
    }

    /// GET /tests/{id}
    pub async fn get_test_by_id(&self, test_id: impl AsRef<str>) -> ClientResult<GeneratedTest> {
        self.client.get(ApiPath::expand(TEST, &[test_id.as_ref()])).await
    }
}
