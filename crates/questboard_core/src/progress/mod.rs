pub mod achievements;

use crate::model::UserStats;
use achievements::{Achievement, CATALOG, Metric};

/// XP threshold for leveling out of `level`. Fresh stats start with a flat
/// 100 before the first level-up; the curve applies from then on.
pub fn next_level_xp(level: u32) -> i64 {
    (100.0 * (level as f64 * 1.2)).floor() as i64
}

/// Threshold credited back when dropping into `level` during a level-down.
pub fn prev_level_xp(level: u32) -> i64 {
    if level <= 1 {
        return 100;
    }
    (100.0 * ((level - 1) as f64 * 1.2)).floor() as i64
}

/// Sole authority on level/XP/achievement state. Pure state machine: callers
/// persist the resulting stats themselves.
#[derive(Debug, Default)]
pub struct ProgressionEngine {
    stats: UserStats,
    recent_unlocks: Vec<&'static Achievement>,
}

impl ProgressionEngine {
    pub fn new(stats: UserStats) -> Self {
        Self {
            stats,
            recent_unlocks: Vec::new(),
        }
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Unlocks accumulated since the last `clear_recent_unlocks`, in unlock
    /// order. Drives the "achievement unlocked" announcement, nothing else.
    pub fn recent_unlocks(&self) -> &[&'static Achievement] {
        &self.recent_unlocks
    }

    pub fn clear_recent_unlocks(&mut self) {
        self.recent_unlocks.clear();
    }

    /// Grants XP, cascading level-ups while the threshold is met, then
    /// evaluates the catalog. Returns the newly unlocked batch.
    pub fn add_xp(&mut self, amount: u32) -> Vec<&'static Achievement> {
        self.stats.current_xp += amount as i64;
        self.stats.total_xp_earned += amount as i64;

        while self.stats.current_xp >= self.stats.next_level_xp {
            self.stats.current_xp -= self.stats.next_level_xp;
            self.stats.level += 1;
            self.stats.next_level_xp = next_level_xp(self.stats.level);
        }

        self.evaluate_unlocks()
    }

    /// Revokes XP, cascading level-downs while current XP is negative.
    /// Already-unlocked achievements are never revoked, so no evaluation.
    pub fn remove_xp(&mut self, amount: u32) {
        self.stats.current_xp -= amount as i64;
        self.stats.total_xp_earned = (self.stats.total_xp_earned - amount as i64).max(0);

        while self.stats.current_xp < 0 && self.stats.level > 1 {
            self.stats.level -= 1;
            self.stats.current_xp += prev_level_xp(self.stats.level);
            self.stats.next_level_xp = next_level_xp(self.stats.level);
        }

        // XP never goes negative at the floor level.
        if self.stats.level == 1 && self.stats.current_xp < 0 {
            self.stats.current_xp = 0;
        }
    }

    pub fn increment_quest_count(&mut self) -> Vec<&'static Achievement> {
        self.stats.quests_completed += 1;
        self.evaluate_unlocks()
    }

    pub fn decrement_quest_count(&mut self) {
        self.stats.quests_completed = self.stats.quests_completed.saturating_sub(1);
    }

    /// Unlocks every catalog entry whose threshold is now met and not yet in
    /// the unlocked set. All qualifying entries unlock in one batch, in
    /// catalog order.
    fn evaluate_unlocks(&mut self) -> Vec<&'static Achievement> {
        let mut newly = Vec::new();
        for achievement in CATALOG {
            let already = self
                .stats
                .unlocked_achievements
                .iter()
                .any(|id| id == achievement.id);
            if already {
                continue;
            }

            let met = match achievement.metric {
                Metric::Level => self.stats.level >= achievement.requirement,
                Metric::QuestCount => self.stats.quests_completed >= achievement.requirement,
            };
            if met {
                self.stats
                    .unlocked_achievements
                    .push(achievement.id.to_string());
                self.recent_unlocks.push(achievement);
                newly.push(achievement);
            }
        }
        newly
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressionEngine, next_level_xp, prev_level_xp};
    use crate::model::UserStats;

    #[test]
    fn threshold_formula_matches_curve() {
        assert_eq!(next_level_xp(1), 120);
        assert_eq!(next_level_xp(2), 240);
        // 3 * 1.2 lands just below 3.6 in f64, so the floor gives 359.
        assert_eq!(next_level_xp(3), 359);
        assert_eq!(next_level_xp(4), 480);
        assert_eq!(next_level_xp(10), 1200);
    }

    #[test]
    fn prev_threshold_special_cases_the_floor() {
        assert_eq!(prev_level_xp(1), 100);
        assert_eq!(prev_level_xp(2), 120);
        assert_eq!(prev_level_xp(3), 240);
        // Same f64 artifact as next_level_xp(3).
        assert_eq!(prev_level_xp(4), 359);
    }

    #[test]
    fn add_99_xp_stays_at_level_one() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(99);

        assert_eq!(engine.stats().level, 1);
        assert_eq!(engine.stats().current_xp, 99);
        assert_eq!(engine.stats().next_level_xp, 100);
        assert_eq!(engine.stats().total_xp_earned, 99);
    }

    #[test]
    fn add_100_xp_reaches_level_two_exactly() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(100);

        assert_eq!(engine.stats().level, 2);
        assert_eq!(engine.stats().current_xp, 0);
        assert_eq!(engine.stats().next_level_xp, 240);
        assert_eq!(engine.stats().total_xp_earned, 100);
    }

    #[test]
    fn large_grant_cascades_multiple_level_ups() {
        let mut engine = ProgressionEngine::default();
        // 100 + 240 + 359 = 699 to clear levels 1..=3, leaving 51 inside 4.
        engine.add_xp(750);

        assert_eq!(engine.stats().level, 4);
        assert_eq!(engine.stats().current_xp, 51);
        assert_eq!(engine.stats().next_level_xp, next_level_xp(4));
        assert_eq!(engine.stats().total_xp_earned, 750);
    }

    #[test]
    fn threshold_invariant_holds_after_any_level_transition() {
        let mut engine = ProgressionEngine::default();
        for amount in [100, 37, 500, 1, 999] {
            engine.add_xp(amount);
            assert_eq!(
                engine.stats().next_level_xp,
                next_level_xp(engine.stats().level)
            );
        }
        for amount in [3, 400, 1200] {
            engine.remove_xp(amount);
            assert!(engine.stats().level >= 1);
            assert!(engine.stats().current_xp >= 0);
        }
    }

    #[test]
    fn add_then_remove_within_a_level_restores_stats() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(40);
        let before = engine.stats().clone();

        engine.add_xp(30);
        engine.remove_xp(30);

        assert_eq!(engine.stats().level, before.level);
        assert_eq!(engine.stats().current_xp, before.current_xp);
        assert_eq!(engine.stats().next_level_xp, before.next_level_xp);
        assert_eq!(engine.stats().total_xp_earned, before.total_xp_earned);
    }

    #[test]
    fn remove_xp_levels_down_and_credits_previous_threshold() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(100); // level 2, current 0
        engine.add_xp(240); // level 3, current 0

        engine.remove_xp(100);

        // Drops into level 2 and is credited prev_level_xp(2) = 120.
        assert_eq!(engine.stats().level, 2);
        assert_eq!(engine.stats().current_xp, 20);
        assert_eq!(engine.stats().next_level_xp, 240);
    }

    #[test]
    fn remove_xp_dropping_to_level_one_recomputes_threshold_from_curve() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(100); // level 2, current 0

        engine.remove_xp(100);

        // Back at level 1 the threshold comes from the curve (120), not the
        // flat 100 fresh stats start with.
        assert_eq!(engine.stats().level, 1);
        assert_eq!(engine.stats().current_xp, 0);
        assert_eq!(engine.stats().next_level_xp, 120);
    }

    #[test]
    fn remove_xp_clamps_at_level_one_floor() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(50);
        engine.remove_xp(500);

        assert_eq!(engine.stats().level, 1);
        assert_eq!(engine.stats().current_xp, 0);
        assert_eq!(engine.stats().total_xp_earned, 0);
    }

    #[test]
    fn total_xp_never_goes_negative() {
        let mut engine = ProgressionEngine::default();
        engine.add_xp(10);
        engine.remove_xp(25);

        assert_eq!(engine.stats().total_xp_earned, 0);
        assert_eq!(engine.stats().current_xp, 0);
        assert_eq!(engine.stats().level, 1);
    }

    #[test]
    fn quest_novice_unlocks_exactly_on_fifth_completion() {
        let mut engine = ProgressionEngine::default();

        for call in 1..5 {
            let unlocked = engine.increment_quest_count();
            assert!(
                !unlocked.iter().any(|a| a.id == "quest_novice"),
                "quest_novice unlocked early on call {call}"
            );
        }

        let unlocked = engine.increment_quest_count();
        assert!(unlocked.iter().any(|a| a.id == "quest_novice"));
        assert_eq!(
            engine
                .recent_unlocks()
                .iter()
                .filter(|a| a.id == "quest_novice")
                .count(),
            1
        );
    }

    #[test]
    fn first_completion_unlocks_first_quest() {
        let mut engine = ProgressionEngine::default();
        let unlocked = engine.increment_quest_count();

        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "first_quest");
        assert_eq!(engine.stats().quests_completed, 1);
    }

    #[test]
    fn evaluation_is_idempotent_without_state_change() {
        let mut engine = ProgressionEngine::default();
        engine.increment_quest_count();

        // No threshold crossed since the last call: nothing new unlocks.
        let unlocked = engine.add_xp(0);
        assert!(unlocked.is_empty());
        assert_eq!(engine.stats().unlocked_achievements.len(), 1);
    }

    #[test]
    fn level_milestones_unlock_in_one_batch() {
        let mut engine = ProgressionEngine::default();
        // Enough XP to blow past level 10 in a single grant.
        let unlocked = engine.add_xp(20_000);

        let ids: Vec<&str> = unlocked.iter().map(|a| a.id).collect();
        assert!(ids.contains(&"level_5"));
        assert!(ids.contains(&"level_10"));
        // Catalog order is preserved inside the batch.
        let five = ids.iter().position(|id| *id == "level_5").unwrap();
        let ten = ids.iter().position(|id| *id == "level_10").unwrap();
        assert!(five < ten);
    }

    #[test]
    fn decrement_quest_count_floors_at_zero_and_keeps_unlocks() {
        let mut engine = ProgressionEngine::default();
        engine.increment_quest_count();
        engine.decrement_quest_count();
        engine.decrement_quest_count();

        assert_eq!(engine.stats().quests_completed, 0);
        // Unlocking is one-directional.
        assert_eq!(engine.stats().unlocked_achievements, vec!["first_quest"]);
    }

    #[test]
    fn clear_recent_unlocks_keeps_unlocked_set() {
        let mut engine = ProgressionEngine::default();
        engine.increment_quest_count();
        assert_eq!(engine.recent_unlocks().len(), 1);

        engine.clear_recent_unlocks();

        assert!(engine.recent_unlocks().is_empty());
        assert_eq!(engine.stats().unlocked_achievements, vec!["first_quest"]);
    }

    #[test]
    fn persisted_unlocks_are_not_re_announced() {
        let stats = UserStats {
            quests_completed: 7,
            unlocked_achievements: vec!["first_quest".to_string(), "quest_novice".to_string()],
            ..UserStats::default()
        };
        let mut engine = ProgressionEngine::new(stats);

        let unlocked = engine.increment_quest_count();
        assert!(unlocked.is_empty());
        assert!(engine.recent_unlocks().is_empty());
    }
}
