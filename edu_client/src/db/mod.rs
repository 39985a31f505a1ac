//! Storage for the mock server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (crate::services) - generation, scoring, │
//! │  analysis                                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │             Local Repository                 │
//!     │               (in-memory)                    │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod models;
pub mod password;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod seed;

use std::sync::Arc;

pub use models::StoredTest;
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
pub use repository::{
    AssessmentRepository, AuthRepository, CurriculumRepository, ErrorContext, FullRepository,
    GameRepository, RepositoryError, RepositoryResult,
};

/// Build the repository described by `config`.
pub fn create_repository(config: &RepositoryConfig) -> Arc<dyn FullRepository> {
    let repo = if config.repository.seed_demo_data {
        LocalRepository::with_demo_data()
    } else {
        LocalRepository::new()
    };
    Arc::new(repo)
}
