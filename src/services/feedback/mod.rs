use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::OutfitStore;
use crate::utils::metrics::{FeedbackSummary, MetricsCalculator};
use crate::utils::validation::{sanitize_string, validate_feedback_input, validate_user_id, MAX_REASON_LENGTH};
use crate::utils::Clock;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const SUMMARY_TOP_ITEMS: usize = 5;

/// Accepts reactions to earlier recommendations. Writes are best-effort.
pub struct FeedbackService {
    store: Arc<dyn OutfitStore>,
    clock: Arc<dyn Clock>,
    metrics: MetricsCalculator,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn OutfitStore>, clock: Arc<dyn Clock>, precision_k: usize) -> Self {
        Self {
            store,
            clock,
            metrics: MetricsCalculator::new(precision_k),
        }
    }

    /// Returns whether the feedback was stored. Never fails.
    pub async fn process_feedback(&self, user_id: &str, recommendation_id: Uuid, input: FeedbackInput) -> bool {
        if let Err(e) = validate_user_id(user_id).and_then(|_| validate_feedback_input(&input)) {
            warn!(user_id = %user_id, recommendation_id = %recommendation_id, error = %e, "Rejected feedback");
            return false;
        }

        let feedback = Feedback {
            user_id: user_id.to_string(),
            recommendation_id,
            feedback_type: input.feedback_type,
            rating: input.rating,
            reason: sanitize_string(&input.reason, MAX_REASON_LENGTH),
            selected_items: input.selected_items,
            timestamp: self.clock.now(),
        };

        match self.store.write_feedback(&feedback).await {
            Ok(()) => {
                info!(
                    user_id = %user_id,
                    recommendation_id = %recommendation_id,
                    feedback_type = ?feedback.feedback_type,
                    rating = feedback.rating,
                    "Feedback recorded"
                );
                true
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    recommendation_id = %recommendation_id,
                    error = %e,
                    "Failed to record feedback"
                );
                false
            }
        }
    }

    /// Aggregates the user's most recent feedback, joined to the recommendations it answers.
    pub async fn summarize_feedback(&self, user_id: &str, limit: usize) -> StoreResult<FeedbackSummary> {
        let feedback = self.store.read_user_feedback(user_id, limit).await?;

        let mut joined = Vec::with_capacity(feedback.len());
        for entry in feedback {
            let recommended = self
                .store
                .read_recommendation(entry.recommendation_id)
                .await?
                .map(|recommendation| recommendation.recommended_items);
            joined.push((entry, recommended));
        }

        Ok(self.metrics.summarize(&joined, SUMMARY_TOP_ITEMS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::services::store::MockOutfitStore;
    use crate::utils::SystemClock;

    fn input(rating: u8) -> FeedbackInput {
        FeedbackInput {
            feedback_type: FeedbackType::Positive,
            rating,
            reason: "딱 좋았어요 <3".to_string(),
            selected_items: vec!["니트".to_string()],
        }
    }

    #[tokio::test]
    async fn test_successful_write_returns_true() {
        let mut store = MockOutfitStore::new();
        store
            .expect_write_feedback()
            .withf(|feedback| feedback.rating == 4 && feedback.reason == "딱 좋았어요 3")
            .times(1)
            .returning(|_| Ok(()));

        let service = FeedbackService::new(Arc::new(store), Arc::new(SystemClock), 5);
        assert!(service.process_feedback("u1", Uuid::new_v4(), input(4)).await);
    }

    #[tokio::test]
    async fn test_store_failure_returns_false() {
        let mut store = MockOutfitStore::new();
        store
            .expect_write_feedback()
            .returning(|_| Err(StoreError::Unavailable("write timeout".to_string())));

        let service = FeedbackService::new(Arc::new(store), Arc::new(SystemClock), 5);
        assert!(!service.process_feedback("u1", Uuid::new_v4(), input(4)).await);
    }

    #[tokio::test]
    async fn test_invalid_rating_skips_store() {
        let mut store = MockOutfitStore::new();
        store.expect_write_feedback().times(0);

        let service = FeedbackService::new(Arc::new(store), Arc::new(SystemClock), 5);
        assert!(!service.process_feedback("u1", Uuid::new_v4(), input(9)).await);
    }
}
