//! Subjects and the learning blocks, materials and activities they contain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::user::UserId;

define_id_type!(SubjectId);
define_id_type!(BlockId);
define_id_type!(MaterialId);
define_id_type!(ActivityId);

/// A taught subject, owned by exactly one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub grade: u8,
    pub teacher_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

/// An ordered unit of curriculum content.
///
/// `order` is unique among the blocks of the same subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningBlock {
    pub id: BlockId,
    pub subject_id: SubjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Minutes
    #[serde(default)]
    pub estimated_duration: u32,
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Document,
    Video,
    Audio,
    Image,
    Interactive,
}

impl MaterialType {
    /// Best-effort classification of an uploaded file by its extension.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "webm" | "mov" | "avi" | "mkv" => MaterialType::Video,
            "mp3" | "wav" | "ogg" | "flac" | "m4a" => MaterialType::Audio,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => MaterialType::Image,
            "html" | "htm" | "h5p" | "swf" => MaterialType::Interactive,
            _ => MaterialType::Document,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MaterialType,
    pub url: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Quiz,
    Discussion,
    Story,
    Exploration,
    MiniGame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: Map<String, Value>,
    pub points: u32,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
}
