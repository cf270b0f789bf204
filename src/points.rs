use serde::Serialize;

use crate::store::{load_or_heal, save_json, KeyValueStore, StoreError};

pub const POINTS_KEY: &str = "learning_points";
pub const BADGES_KEY: &str = "learning_badges";

/// Reaching this many points converts the counter into a badge.
pub const BADGE_THRESHOLD: u64 = 10_000;
/// Counter value after a badge is awarded. Excess points are dropped.
pub const POINTS_FLOOR: u64 = 5;
pub const MAX_BADGES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    LessonStep,
    ModuleComplete,
    Quiz,
    Game,
    Chat,
    Video,
}

impl ActivityType {
    pub fn default_award(&self) -> u64 {
        match self {
            ActivityType::LessonStep => 10,
            ActivityType::ModuleComplete => 50,
            ActivityType::Quiz => 20,
            ActivityType::Game => 15,
            ActivityType::Chat => 5,
            ActivityType::Video => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeUnlocked {
    pub badges: u32,
    pub activity: ActivityType,
}

/// Reward counter with overflow-to-badge semantics, persisted after every change.
#[derive(Debug)]
pub struct PointsLedger<S> {
    store: S,
    points: u64,
    badges: u32,
}

impl<S: KeyValueStore> PointsLedger<S> {
    pub fn load(store: S) -> Result<Self, StoreError> {
        let points = load_or_heal::<u64, _>(&store, POINTS_KEY)?.unwrap_or(0);
        let badges = load_or_heal::<u32, _>(&store, BADGES_KEY)?
            .unwrap_or(0)
            .min(MAX_BADGES);

        Ok(Self {
            store,
            points,
            badges,
        })
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn badges(&self) -> u32 {
        self.badges
    }

    pub fn add_points(
        &mut self,
        amount: u64,
        activity: ActivityType,
    ) -> Result<Option<BadgeUnlocked>, StoreError> {
        let total = self.points.saturating_add(amount);
        let mut unlocked = None;

        if total >= BADGE_THRESHOLD {
            self.points = POINTS_FLOOR;
            if self.badges < MAX_BADGES {
                self.badges += 1;
                tracing::info!(badges = self.badges, ?activity, "badge unlocked");
                unlocked = Some(BadgeUnlocked {
                    badges: self.badges,
                    activity,
                });
            }
        } else {
            self.points = total;
        }

        tracing::debug!(amount, ?activity, points = self.points, "points added");
        save_json(&self.store, POINTS_KEY, &self.points)?;
        save_json(&self.store, BADGES_KEY, &self.badges)?;
        Ok(unlocked)
    }

    pub fn award(&mut self, activity: ActivityType) -> Result<Option<BadgeUnlocked>, StoreError> {
        self.add_points(activity.default_award(), activity)
    }

    pub fn clear_progress(&mut self) -> Result<(), StoreError> {
        self.points = 0;
        self.badges = 0;
        self.store.remove(POINTS_KEY)?;
        self.store.remove(BADGES_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn overflow_resets_to_floor_and_awards_badge() {
        let store = MemoryStore::new();
        let mut ledger = PointsLedger::load(store.clone()).unwrap();
        ledger.add_points(9_995, ActivityType::Quiz).unwrap();

        let unlocked = ledger.add_points(10, ActivityType::LessonStep).unwrap();

        assert_eq!(ledger.points(), POINTS_FLOOR);
        assert_eq!(ledger.badges(), 1);
        assert_eq!(
            unlocked,
            Some(BadgeUnlocked {
                badges: 1,
                activity: ActivityType::LessonStep
            })
        );
        assert_eq!(store.get(POINTS_KEY).unwrap().as_deref(), Some("5"));
        assert_eq!(store.get(BADGES_KEY).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn badges_are_capped() {
        let store = MemoryStore::new();
        store.set(BADGES_KEY, &MAX_BADGES.to_string()).unwrap();
        let mut ledger = PointsLedger::load(store).unwrap();

        let unlocked = ledger.add_points(BADGE_THRESHOLD, ActivityType::Game).unwrap();

        assert_eq!(unlocked, None);
        assert_eq!(ledger.badges(), MAX_BADGES);
        assert_eq!(ledger.points(), POINTS_FLOOR);
    }

    #[test]
    fn clear_progress_removes_entries() {
        let store = MemoryStore::new();
        let mut ledger = PointsLedger::load(store.clone()).unwrap();
        ledger.award(ActivityType::ModuleComplete).unwrap();
        assert_eq!(ledger.points(), 50);

        ledger.clear_progress().unwrap();

        assert_eq!((ledger.points(), ledger.badges()), (0, 0));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn corrupt_counter_loads_as_zero() {
        let store = MemoryStore::new();
        store.set(POINTS_KEY, "\"lots\"").unwrap();
        let ledger = PointsLedger::load(store.clone()).unwrap();
        assert_eq!(ledger.points(), 0);
        assert_eq!(store.get(POINTS_KEY).unwrap(), None);
    }
}
