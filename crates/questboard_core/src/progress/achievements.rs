/// What an achievement threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Level,
    QuestCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: u32,
    pub metric: Metric,
}

/// Static catalog. Evaluation follows declaration order; unlocking is
/// one-directional, so entries are only ever appended here.
pub const CATALOG: &[Achievement] = &[
    Achievement {
        id: "first_quest",
        title: "First Steps",
        description: "Complete your first quest",
        icon: "🗡️",
        requirement: 1,
        metric: Metric::QuestCount,
    },
    Achievement {
        id: "quest_novice",
        title: "Quest Novice",
        description: "Complete 5 quests",
        icon: "🛡️",
        requirement: 5,
        metric: Metric::QuestCount,
    },
    Achievement {
        id: "quest_adept",
        title: "Quest Adept",
        description: "Complete 25 quests",
        icon: "⚔️",
        requirement: 25,
        metric: Metric::QuestCount,
    },
    Achievement {
        id: "quest_master",
        title: "Quest Master",
        description: "Complete 100 quests",
        icon: "👑",
        requirement: 100,
        metric: Metric::QuestCount,
    },
    Achievement {
        id: "level_5",
        title: "Seasoned Adventurer",
        description: "Reach level 5",
        icon: "⭐",
        requirement: 5,
        metric: Metric::Level,
    },
    Achievement {
        id: "level_10",
        title: "Veteran",
        description: "Reach level 10",
        icon: "🌟",
        requirement: 10,
        metric: Metric::Level,
    },
    Achievement {
        id: "level_20",
        title: "Living Legend",
        description: "Reach level 20",
        icon: "💫",
        requirement: 20,
        metric: Metric::Level,
    },
];
