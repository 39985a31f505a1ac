//! Repository traits.
//!
//! Each concern gets its own trait; [`FullRepository`] ties them together
//! so handlers can hold a single `Arc<dyn FullRepository>`.

mod assessment;
mod auth;
mod curriculum;
mod error;
mod game;

use async_trait::async_trait;

pub use assessment::AssessmentRepository;
pub use auth::AuthRepository;
pub use curriculum::CurriculumRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use game::GameRepository;

#[async_trait]
pub trait FullRepository:
    AuthRepository + CurriculumRepository + GameRepository + AssessmentRepository
{
    /// Check that the backend can serve requests.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
