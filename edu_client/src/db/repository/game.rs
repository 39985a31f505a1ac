//! Per-student game state.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{GameState, UserId};

/// Repository trait for game state.
///
/// At most one state exists per student; `put_game_state` replaces it.
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// The stored state, or `None` when the student has never saved one.
    async fn get_game_state(&self, student_id: &UserId) -> RepositoryResult<Option<GameState>>;

    async fn put_game_state(&self, state: GameState) -> RepositoryResult<GameState>;

    async fn list_game_states(&self) -> RepositoryResult<Vec<GameState>>;
}
