use serde::{Deserialize, Serialize};

/// Progression state for one user. Every field defaults individually so
/// older persisted shapes (missing counters, missing unlock list) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub current_xp: i64,
    #[serde(default = "default_next_level_xp")]
    pub next_level_xp: i64,
    #[serde(default)]
    pub total_xp_earned: i64,
    #[serde(default)]
    pub quests_completed: u32,
    #[serde(default)]
    pub unlocked_achievements: Vec<String>,
}

fn default_level() -> u32 {
    1
}

fn default_next_level_xp() -> i64 {
    100
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            next_level_xp: 100,
            total_xp_earned: 0,
            quests_completed: 0,
            unlocked_achievements: Vec::new(),
        }
    }
}
