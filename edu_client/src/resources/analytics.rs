use crate::api::{AiAnalysis, ClassAnalysis, LearningStyleAnalysis, PerformancePrediction, RiskFlag};
use crate::client::{ApiClient, ApiPath, ClientResult};

pub const STUDENT_ANALYSIS: &str = "/analytics/student/{id}";
pub const CLASS_ANALYSIS: &str = "/analytics/class/{id}";
pub const LEARNING_STYLE: &str = "/analytics/learning-style/{id}";
pub const PREDICTION: &str = "/analytics/prediction/{id}";
pub const RISKS: &str = "/analytics/risks/{id}";

/// Read-only analysis endpoints.
pub struct AnalyticsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AnalyticsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_student_analysis(&self, student_id: impl AsRef<str>) -> ClientResult<AiAnalysis> {
        self.client
            .get(ApiPath::expand(STUDENT_ANALYSIS, &[student_id.as_ref()]))
            .await
    }

    pub async fn get_class_analysis(&self, class_id: impl AsRef<str>) -> ClientResult<ClassAnalysis> {
        self.client
            .get(ApiPath::expand(CLASS_ANALYSIS, &[class_id.as_ref()]))
            .await
    }

    pub async fn get_learning_style_analysis(
        &self,
        student_id: impl AsRef<str>,
    ) -> ClientResult<LearningStyleAnalysis> {
        self.client
            .get(ApiPath::expand(LEARNING_STYLE, &[student_id.as_ref()]))
            .await
    }

    pub async fn get_performance_prediction(
        &self,
        student_id: impl AsRef<str>,
    ) -> ClientResult<PerformancePrediction> {
        self.client
            .get(ApiPath::expand(PREDICTION, &[student_id.as_ref()]))
            .await
    }

    pub async fn get_risk_analysis(&self, student_id: impl AsRef<str>) -> ClientResult<Vec<RiskFlag>> {
        self.client
            .get(ApiPath::expand(RISKS, &[student_id.as_ref()]))
            .await
    }
}
