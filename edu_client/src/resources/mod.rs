//! Resource API modules.
//!
//! Each façade maps one domain operation to exactly one call on the
//! [`ApiClient`], with a fixed method and route template. No validation,
//! retries, or caching happen here; errors pass through untouched.
//!
//! The route templates are public so the mock server mounts the exact same
//! paths the client requests.

pub mod analytics;
pub mod assessments;
pub mod auth;
pub mod game;
pub mod learning_blocks;
pub mod subjects;

pub use analytics::AnalyticsApi;
pub use assessments::TestsApi;
pub use auth::AuthApi;
pub use game::GameApi;
pub use learning_blocks::LearningBlocksApi;
pub use subjects::SubjectsApi;

use crate::client::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn subjects(&self) -> SubjectsApi<'_> {
        SubjectsApi::new(self)
    }

    pub fn learning_blocks(&self) -> LearningBlocksApi<'_> {
        LearningBlocksApi::new(self)
    }

    pub fn game(&self) -> GameApi<'_> {
        GameApi::new(self)
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi::new(self)
    }

    pub fn tests(&self) -> TestsApi<'_> {
        TestsApi::new(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ApiPath;

    #[test]
    fn test_route_templates_expand() {
        assert_eq!(
            ApiPath::expand(super::subjects::SUBJECT, &["42"]).to_string(),
            "/subjects/42"
        );
        assert_eq!(
            ApiPath::expand(super::learning_blocks::GENERATE_SCENARIO, &["b1"]).to_string(),
            "/blocks/b1/generate-scenario"
        );
        assert_eq!(
            ApiPath::expand(super::analytics::LEARNING_STYLE, &["s1"]).to_string(),
            "/analytics/learning-style/s1"
        );
        assert_eq!(
            ApiPath::expand(super::assessments::TEST_RESULTS, &["s1"]).to_string(),
            "/tests/results/s1"
        );
        assert_eq!(
            ApiPath::expand(super::game::ACTIVITY_ANSWER, &["a1"]).to_string(),
            "/game/activities/a1/answer"
        );
    }
}
