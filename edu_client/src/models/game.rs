//! Gamified learning state kept per student.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::curriculum::{ActivityId, BlockId, DifficultyLevel};
use super::user::UserId;

define_id_type!(AchievementId);

/// Live game state of one student. Replaced wholesale by the game-state update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub student_id: UserId,
    pub current_block_id: BlockId,
    pub current_activity_id: ActivityId,
    #[serde(default)]
    pub progress: Map<String, Value>,
    pub inventory: GameInventory,
    pub stats: GameStats,
    pub preferences: LearningPreferences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInventory {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub physics_fragments: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: String,
    pub unlocked_at: DateTime<Utc>,
    pub category: AchievementCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Learning,
    Exploration,
    Persistence,
    Collaboration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u32,
    pub streak: u32,
    pub completed_activities: u32,
    /// Seconds
    pub total_time_spent: u64,
    pub physics_understanding_level: f64,
}

impl GameStats {
    pub const XP_PER_LEVEL: u64 = 300;

    /// Adds experience and recomputes the level from the new total.
    pub fn award_xp(&mut self, xp: u64) {
        self.total_xp += xp;
        self.level = (self.total_xp / Self::XP_PER_LEVEL) as u32 + 1;
    }
}

/// Learning-style weights in `[0, 1]` plus session preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPreferences {
    pub visual_learning: f64,
    pub auditory_learning: f64,
    pub kinesthetic_learning: f64,
    pub reading_writing_learning: f64,
    pub preferred_difficulty: DifficultyLevel,
    /// Minutes
    pub session_length: u32,
}

impl Default for LearningPreferences {
    fn default() -> Self {
        Self {
            visual_learning: 0.25,
            auditory_learning: 0.25,
            kinesthetic_learning: 0.25,
            reading_writing_learning: 0.25,
            preferred_difficulty: DifficultyLevel::Medium,
            session_length: 30,
        }
    }
}
