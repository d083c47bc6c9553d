//! Drives the progression rules against a [`ProgressStore`].

use std::sync::Arc;

use mollysou_database::{ProgressStore, StoreError};
use mollysou_progression::{
    ActionKind, CooldownWindows, Cooldowns, RankInfo, UserProgress, checked_grant, cooldowns,
    rank_info, touch_cooldown,
};
use mollysou_utils::time::{Clock, SystemClock};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
    windows: CooldownWindows,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn ProgressStore>, windows: CooldownWindows) -> Self {
        Self {
            store,
            windows,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock used for cooldowns.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn progress(&self, user_id: u64) -> Result<UserProgress, StoreError> {
        self.store.load(user_id).await
    }

    /// Add points and XP, levelling up as far as the XP reaches.
    ///
    /// Fails with [`StoreError::Rejected`] when the result would leave points
    /// or current XP below zero; nothing is written in that case.
    pub async fn grant(
        &self,
        user_id: u64,
        points_delta: i64,
        xp_delta: i64,
    ) -> Result<UserProgress, StoreError> {
        let mut level_before = 0;
        let updated = self
            .store
            .update(
                user_id,
                Box::new(|progress| {
                    level_before = progress.level;
                    checked_grant(progress, points_delta, xp_delta)
                        .map_err(|e| StoreError::Rejected(e.to_string()))
                }),
            )
            .await?;

        if updated.level > level_before {
            info!(
                user_id,
                from = level_before,
                to = updated.level,
                rank = %updated.rank,
                "user levelled up"
            );
        }
        debug!(user_id, points_delta, xp_delta, "progress granted");

        Ok(updated)
    }

    /// Record that `kind` was used now.
    pub async fn touch_cooldown(
        &self,
        user_id: u64,
        kind: ActionKind,
    ) -> Result<UserProgress, StoreError> {
        let now = self.clock.now_unix_secs();
        let updated = self
            .store
            .update(
                user_id,
                Box::new(move |progress| Ok(touch_cooldown(progress, kind, now))),
            )
            .await?;

        debug!(user_id, action = %kind, now, "cooldown started");
        Ok(updated)
    }

    /// Remaining seconds for every action, measured from now.
    pub async fn cooldowns(&self, user_id: u64) -> Result<Cooldowns, StoreError> {
        let progress = self.store.load(user_id).await?;
        Ok(cooldowns(
            &progress,
            self.clock.now_unix_secs(),
            &self.windows,
        ))
    }

    pub fn rank_info(&self, level: u32) -> RankInfo {
        rank_info(level)
    }
}

#[cfg(test)]
mod tests {
    use mollysou_database::MemoryProgressStore;
    use mollysou_progression::Rank;
    use mollysou_utils::time::ManualClock;

    use super::*;

    const NOW: u64 = 1_760_000_000;

    async fn service_with_user(user_id: u64) -> (ProgressService, Arc<ManualClock>) {
        let store = MemoryProgressStore::new();
        store.insert(user_id, UserProgress::new()).await;

        let clock = Arc::new(ManualClock::new(NOW));
        let service = ProgressService::new(Arc::new(store), CooldownWindows::new(6))
            .with_clock(clock.clone());
        (service, clock)
    }

    #[tokio::test]
    async fn grant_persists_level_ups() {
        let (service, _) = service_with_user(1).await;

        let updated = service.grant(1, 1_500, 1_500).await.unwrap();
        assert_eq!(updated.level, 2);
        assert_eq!(updated.current_xp, 500);
        assert_eq!(updated.xp_to_next_level, 1_200);

        let updated = service.grant(1, 0, 700).await.unwrap();
        assert_eq!(updated.level, 3);
        assert_eq!(updated.current_xp, 0);
        assert_eq!(updated.rank, Rank::Bronze);

        assert_eq!(service.progress(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn overdrawing_grant_is_rejected_and_not_saved() {
        let (service, _) = service_with_user(1).await;
        service.grant(1, 30, 30).await.unwrap();

        let err = service.grant(1, -31, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        let err = service.grant(1, 0, -31).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));

        let stored = service.progress(1).await.unwrap();
        assert_eq!(stored.points, 30);
        assert_eq!(stored.current_xp, 30);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (service, _) = service_with_user(1).await;

        assert!(service.grant(2, 1, 1).await.unwrap_err().is_not_found());
        assert!(
            service
                .touch_cooldown(2, ActionKind::Wheel)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(service.cooldowns(2).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn cooldown_cycle() {
        let (service, clock) = service_with_user(1).await;

        let fresh = service.cooldowns(1).await.unwrap();
        assert_eq!(fresh, Cooldowns::default());

        clock.set(NOW - 3_600);
        service.touch_cooldown(1, ActionKind::Wheel).await.unwrap();
        clock.set(NOW);
        service.touch_cooldown(1, ActionKind::Reflex).await.unwrap();

        let remaining = service.cooldowns(1).await.unwrap();
        assert_eq!(remaining.wheel, 23 * 3_600);
        assert_eq!(remaining.puzzle, 0);
        assert_eq!(remaining.video, 0);
        assert_eq!(remaining.reflex, 6 * 3_600);

        clock.advance(25 * 3_600);
        let later = service.cooldowns(1).await.unwrap();
        assert_eq!(later, Cooldowns::default());
    }

    #[tokio::test]
    async fn touching_a_cooldown_keeps_progress() {
        let (service, _) = service_with_user(1).await;
        let granted = service.grant(1, 40, 40).await.unwrap();

        let touched = service
            .touch_cooldown(1, ActionKind::Puzzle)
            .await
            .unwrap();
        assert_eq!(touched.last_puzzle_game, Some(NOW));
        assert_eq!(touched.points, granted.points);
        assert_eq!(touched.current_xp, granted.current_xp);
    }
}
