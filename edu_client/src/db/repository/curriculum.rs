//! Subjects, learning blocks and their materials.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    Activity, ActivityId, BlockId, LearningBlock, LearningBlockUpdate, Material, NewLearningBlock,
    Subject, SubjectId, SubjectUpdate, UserId,
};

/// Repository trait for curriculum content.
///
/// # Invariants
/// A block's `order` is unique within its subject. Writes that would break
/// this fail with `RepositoryError::Conflict`.
#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>>;

    async fn get_subject(&self, id: &SubjectId) -> RepositoryResult<Subject>;

    async fn create_subject(
        &self,
        name: String,
        grade: u8,
        teacher_id: UserId,
    ) -> RepositoryResult<Subject>;

    async fn update_subject(
        &self,
        id: &SubjectId,
        update: SubjectUpdate,
    ) -> RepositoryResult<Subject>;

    /// Delete a subject along with its blocks and materials.
    async fn delete_subject(&self, id: &SubjectId) -> RepositoryResult<()>;

    async fn add_material(
        &self,
        subject_id: &SubjectId,
        material: Material,
    ) -> RepositoryResult<Material>;

    async fn list_materials(&self, subject_id: &SubjectId) -> RepositoryResult<Vec<Material>>;

    /// Blocks of a subject, sorted by `order`.
    async fn list_blocks(&self, subject_id: &SubjectId) -> RepositoryResult<Vec<LearningBlock>>;

    async fn get_block(&self, id: &BlockId) -> RepositoryResult<LearningBlock>;

    async fn create_block(&self, block: NewLearningBlock) -> RepositoryResult<LearningBlock>;

    async fn update_block(
        &self,
        id: &BlockId,
        update: LearningBlockUpdate,
    ) -> RepositoryResult<LearningBlock>;

    async fn delete_block(&self, id: &BlockId) -> RepositoryResult<()>;

    /// Find an activity and the block that owns it.
    async fn find_activity(&self, id: &ActivityId) -> RepositoryResult<(LearningBlock, Activity)>;
}
