use serde_json::Value;

use crate::api::{
    Achievement, AnswerOutcome, AnswerSubmission, GameState, LeaderboardEntry, LeaderboardQuery,
};
use crate::client::{ApiClient, ApiPath, ClientResult};

pub const GAME_STATE: &str = "/game/state/{student_id}";
pub const ACTIVITY_ANSWER: &str = "/game/activities/{id}/answer";
pub const ACHIEVEMENTS: &str = "/game/achievements/{student_id}";
pub const LEADERBOARD: &str = "/game/leaderboard";

/// Game state, answers, achievements and the leaderboard.
pub struct GameApi<'a> {
    client: &'a ApiClient,
}

impl<'a> GameApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /game/state/{student_id}
    pub async fn get_game_state(&self, student_id: impl AsRef<str>) -> ClientResult<GameState> {
        self.client
            .get(ApiPath::expand(GAME_STATE, &[student_id.as_ref()]))
            .await
    }

    /// PUT /game/state/{student_id}
    pub async fn update_game_state(
        &self,
        student_id: impl AsRef<str>,
        state: &GameState,
    ) -> ClientResult<GameState> {
        self.client
            .put(ApiPath::expand(GAME_STATE, &[student_id.as_ref()]), state)
            .await
    }

    /// POST /game/activities/{id}/answer
    pub async fn submit_answer(
        &self,
        activity_id: impl AsRef<str>,
        answer: Value,
    ) -> ClientResult<AnswerOutcome> {
        self.client
            .post(
                ApiPath::expand(ACTIVITY_ANSWER, &[activity_id.as_ref()]),
                &AnswerSubmission { answer },
            )
            .await
    }

    /// GET /game/achievements/{student_id}
    pub async fn get_achievements(&self, student_id: impl AsRef<str>) -> ClientResult<Vec<Achievement>> {
        self.client
            .get(ApiPath::expand(ACHIEVEMENTS, &[student_id.as_ref()]))
            .await
    }

    /// GET /game/leaderboard, with `subjectId` only when one is given.
    pub async fn get_leaderboard(&self, subject_id: Option<&str>) -> ClientResult<Vec<LeaderboardEntry>> {
        let query = LeaderboardQuery {
            subject_id: subject_id.map(Into::into),
        };
        self.client.get_with(LEADERBOARD, &query).await
    }
}
