use crate::api::{
    Acknowledgement, GeneratedScenario, LearningBlock, LearningBlockUpdate, NewLearningBlock,
    ScenarioRequest,
};
use crate::client::{ApiClient, ApiPath, ClientResult};

pub const SUBJECT_BLOCKS: &str = "/subjects/{id}/blocks";
pub const BLOCKS: &str = "/blocks";
pub const BLOCK: &str = "/blocks/{id}";
pub const GENERATE_SCENARIO: &str = "/blocks/{id}/generate-scenario";

/// Learning block CRUD and scenario generation.
pub struct LearningBlocksApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LearningBlocksApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /subjects/{id}/blocks
    pub async fn get_by_subject(&self, subject_id: impl AsRef<str>) -> ClientResult<Vec<LearningBlock>> {
        self.client
            .get(ApiPath::expand(SUBJECT_BLOCKS, &[subject_id.as_ref()]))
            .await
    }

    /// GET /blocks/{id}
    pub async fn get_by_id(&self, id: impl AsRef<str>) -> ClientResult<LearningBlock> {
        self.client.get(ApiPath::expand(BLOCK, &[id.as_ref()])).await
    }

    /// POST /blocks
    pub async fn create(&self, data: &NewLearningBlock) -> ClientResult<LearningBlock> {
        self.client.post(BLOCKS, data).await
    }

    /// PUT /blocks/{id}
    pub async fn update(
        &self,
        id: impl AsRef<str>,
        data: &LearningBlockUpdate,
    ) -> ClientResult<LearningBlock> {
        self.client.put(ApiPath::expand(BLOCK, &[id.as_ref()]), data).await
    }

    /// DELETE /blocks/{id}
    pub async fn delete(&self, id: impl AsRef<str>) -> ClientResult<Option<Acknowledgement>> {
        self.client.delete(ApiPath::expand(BLOCK, &[id.as_ref()])).await
    }

    /// POST /blocks/{id}/generate-scenario
    pub async fn generate_scenario(
        &self,
        block_id: impl AsRef<str>,
        student_id: impl AsRef<str>,
    ) -> ClientResult<GeneratedScenario> {
        let body = ScenarioRequest {
            student_id: student_id.as_ref().into(),
        };
        self.client
            .post(ApiPath::expand(GENERATE_SCENARIO, &[block_id.as_ref()]), &body)
            .await
    }
}
