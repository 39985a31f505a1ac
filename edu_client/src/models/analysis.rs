//! Server-computed analysis output. Read-only on the client side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::curriculum::Activity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub learning_style_analysis: LearningStyleAnalysis,
    pub performance_prediction: PerformancePrediction,
    #[serde(default)]
    pub recommended_activities: Vec<Activity>,
    #[serde(default)]
    pub personalized_feedback: String,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStyleAnalysis {
    pub dominant_style: String,
    pub style_distribution: BTreeMap<String, f64>,
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePrediction {
    pub expected_score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Indicator of a student's at-risk status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    #[serde(rename = "type")]
    pub kind: RiskType,
    pub severity: RiskSeverity,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    LearningDifficulty,
    EngagementDrop,
    BehavioralConcern,
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}
