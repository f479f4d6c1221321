use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::Result;

use crate::{
    db::GameStore,
    game::{Ranking, RankingUpdate},
    models::Score,
};

/// A post-game write that failed after the game itself was saved as finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairItem {
    /// Score was never written; ranking must be recomputed after it is
    RecordScore(Score),
    /// Score exists but the user's ranking is stale
    RecomputeRanking { user_id: i64 },
}

impl RepairItem {
    pub fn user_id(&self) -> i64 {
        match self {
            RepairItem::RecordScore(score) => score.user_id,
            RepairItem::RecomputeRanking { user_id } => *user_id,
        }
    }
}

/// Pending repairs, retried by [`repair_task`]
#[derive(Debug, Default)]
pub struct RepairQueue {
    items: Mutex<VecDeque<RepairItem>>,
}

impl RepairQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section is a single deque call, so a poisoned lock
    // still guards a consistent queue.
    fn items(&self) -> MutexGuard<'_, VecDeque<RepairItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: RepairItem) {
        self.items().push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_all(&self) -> Vec<RepairItem> {
        self.items().drain(..).collect()
    }

    /// Retry every pending item once. Items that fail again are re-queued.
    /// Returns the number of items repaired.
    pub async fn process(&self, store: &dyn GameStore) -> usize {
        let mut repaired = 0;
        for item in self.take_all() {
            match apply(store, &item).await {
                Ok(()) => {
                    repaired += 1;
                    tracing::info!("Repaired post-game state for user {}", item.user_id());
                }
                Err(e) => {
                    tracing::warn!(
                        "Repair for user {} failed again, will retry: {:#}",
                        item.user_id(),
                        e
                    );
                    self.push(item);
                }
            }
        }
        repaired
    }
}

async fn apply(store: &dyn GameStore, item: &RepairItem) -> Result<()> {
    if let RepairItem::RecordScore(score) = item {
        store.insert_score(score).await?;
    }
    recompute_ranking(store, item.user_id()).await?;
    Ok(())
}

/// Recompute a user's ranking from every score they have. Safe to repeat.
pub async fn recompute_ranking(store: &dyn GameStore, user_id: i64) -> Result<RankingUpdate> {
    let points: Vec<i32> = store
        .list_user_scores(user_id)
        .await?
        .iter()
        .map(|s| s.points)
        .collect();
    let update = Ranking::recompute(&points);
    store.update_user_ranking(user_id, update).await?;
    Ok(update)
}

/// Background task that periodically retries failed post-game writes
pub async fn repair_task(queue: Arc<RepairQueue>, store: Arc<dyn GameStore>, period: Duration) {
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        if queue.is_empty() {
            continue;
        }
        let pending = queue.len();
        let repaired = queue.process(store.as_ref()).await;
        tracing::info!("Repair pass finished: {} of {} items repaired", repaired, pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStore, game::ScoreResult};
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_record_score_repair_writes_score_and_ranking() {
        let store = MemoryStore::new();
        let user = store.create_user("erin", "e@x").await.unwrap().unwrap();
        let result = ScoreResult {
            points: 4,
            wrong_guesses: 1,
            won: true,
        };
        let score = Score::new(Uuid::new_v4(), user.user_id, &user.name, Utc::now().date_naive(), &result);

        let queue = RepairQueue::new();
        queue.push(RepairItem::RecordScore(score));
        assert_eq!(queue.process(&store).await, 1);
        assert!(queue.is_empty());

        let user = store.get_user(user.user_id).await.unwrap().unwrap();
        assert_eq!(user.ranking_score, 4);
        assert_eq!(user.completed_games, 1);
    }

    #[tokio::test]
    async fn test_failed_repair_is_requeued() {
        let store = MemoryStore::new();
        let queue = RepairQueue::new();
        // Unknown user: the ranking update fails
        queue.push(RepairItem::RecomputeRanking { user_id: 42 });

        assert_eq!(queue.process(&store).await, 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_poisoned_queue_still_accepts_items() {
        let queue = Arc::new(RepairQueue::new());
        let poisoner = Arc::clone(&queue);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.items.lock().unwrap();
            panic!("poison the repair queue");
        })
        .join();
        assert!(queue.items.is_poisoned());

        queue.push(RepairItem::RecomputeRanking { user_id: 7 });
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.take_all(), vec![RepairItem::RecomputeRanking { user_id: 7 }]);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let store = MemoryStore::new();
        let user = store.create_user("finn", "f@x").await.unwrap().unwrap();
        for points in [2, 4, 3] {
            let result = ScoreResult {
                points,
                wrong_guesses: 0,
                won: true,
            };
            let score = Score::new(Uuid::new_v4(), user.user_id, &user.name, Utc::now().date_naive(), &result);
            store.insert_score(&score).await.unwrap();
        }

        let first = recompute_ranking(&store, user.user_id).await.unwrap();
        let second = recompute_ranking(&store, user.user_id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.ranking_score, 3);
        assert_eq!(first.completed_games, 3);
    }
}
