use crate::error::{StoreError, StoreResult};
use crate::models::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Narrow read/write contracts against the document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OutfitStore: Send + Sync {
    /// The user's own outfit log, newest first.
    async fn read_user_records(&self, user_id: &str, limit: usize) -> StoreResult<Vec<OutfitRecord>>;

    /// Outfits in `range` with matching weather, most-liked first (newest first on ties).
    async fn read_outfits_by_condition(
        &self,
        range: TemperatureRange,
        weather: WeatherCondition,
        limit: usize,
    ) -> StoreResult<Vec<Outfit>>;

    /// Outfits created at or after `since`, newest first.
    async fn read_outfits_by_recency(&self, since: DateTime<Utc>, limit: usize) -> StoreResult<Vec<Outfit>>;

    async fn read_user_likes(&self, user_id: &str, limit: usize) -> StoreResult<Vec<OutfitId>>;

    async fn read_outfit_likers(&self, outfit_id: &str, limit: usize) -> StoreResult<Vec<UserId>>;

    async fn write_recommendation(&self, recommendation: &Recommendation) -> StoreResult<()>;

    async fn read_recommendation(&self, id: Uuid) -> StoreResult<Option<Recommendation>>;

    /// Fails with `NotFound` when the referenced recommendation is unknown.
    async fn write_feedback(&self, feedback: &Feedback) -> StoreResult<()>;

    /// The user's feedback, newest first.
    async fn read_user_feedback(&self, user_id: &str, limit: usize) -> StoreResult<Vec<Feedback>>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LikeEdge {
    pub user_id: UserId,
    pub outfit_id: OutfitId,
}

/// JSON document used to preload an [`InMemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub records: Vec<OutfitRecord>,
    #[serde(default)]
    pub outfits: Vec<Outfit>,
    #[serde(default)]
    pub likes: Vec<LikeEdge>,
}

impl StoreSeed {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Store kept entirely in process memory.
pub struct InMemoryStore {
    records: RwLock<HashMap<UserId, Vec<OutfitRecord>>>,
    outfits: RwLock<Vec<Outfit>>,
    likes: RwLock<Vec<LikeEdge>>,
    recommendations: RwLock<HashMap<Uuid, Recommendation>>,
    feedback: RwLock<Vec<Feedback>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            outfits: RwLock::new(Vec::new()),
            likes: RwLock::new(Vec::new()),
            recommendations: RwLock::new(HashMap::new()),
            feedback: RwLock::new(Vec::new()),
        }
    }

    pub async fn from_seed(seed: StoreSeed) -> Self {
        let store = Self::new();
        let (records, outfits, likes) = (seed.records.len(), seed.outfits.len(), seed.likes.len());

        for record in seed.records {
            store.insert_record(record).await;
        }
        for outfit in seed.outfits {
            store.insert_outfit(outfit).await;
        }
        for like in seed.likes {
            store.add_like(&like.user_id, &like.outfit_id).await;
        }

        info!("Seeded in-memory store: {} records, {} outfits, {} likes", records, outfits, likes);
        store
    }

    pub async fn insert_record(&self, record: OutfitRecord) {
        let mut records = self.records.write().await;
        let entries = records.entry(record.user_id.clone()).or_default();
        entries.push(record);
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    }

    pub async fn insert_outfit(&self, outfit: Outfit) {
        let mut outfits = self.outfits.write().await;
        outfits.retain(|existing| existing.id != outfit.id);
        outfits.push(outfit);
    }

    pub async fn add_like(&self, user_id: &str, outfit_id: &str) {
        let mut likes = self.likes.write().await;
        let exists = likes
            .iter()
            .any(|like| like.user_id == user_id && like.outfit_id == outfit_id);
        if !exists {
            likes.push(LikeEdge {
                user_id: user_id.to_string(),
                outfit_id: outfit_id.to_string(),
            });
        }
    }

    pub async fn feedback_count(&self) -> usize {
        self.feedback.read().await.len()
    }

    fn newest_first(mut outfits: Vec<Outfit>, limit: usize) -> Vec<Outfit> {
        outfits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        outfits.truncate(limit);
        outfits
    }
}

#[async_trait::async_trait]
impl OutfitStore for InMemoryStore {
    async fn read_user_records(&self, user_id: &str, limit: usize) -> StoreResult<Vec<OutfitRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .map(|entries| entries.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn read_outfits_by_condition(
        &self,
        range: TemperatureRange,
        weather: WeatherCondition,
        limit: usize,
    ) -> StoreResult<Vec<Outfit>> {
        let outfits = self.outfits.read().await;
        let mut matching: Vec<Outfit> = outfits
            .iter()
            .filter(|outfit| outfit.weather == weather && range.contains(outfit.temperature))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        matching.truncate(limit);
        Ok(matching)
    }

    async fn read_outfits_by_recency(&self, since: DateTime<Utc>, limit: usize) -> StoreResult<Vec<Outfit>> {
        let outfits = self.outfits.read().await;
        let recent = outfits
            .iter()
            .filter(|outfit| outfit.created_at >= since)
            .cloned()
            .collect();
        Ok(Self::newest_first(recent, limit))
    }

    async fn read_user_likes(&self, user_id: &str, limit: usize) -> StoreResult<Vec<OutfitId>> {
        let likes = self.likes.read().await;
        Ok(likes
            .iter()
            .filter(|like| like.user_id == user_id)
            .take(limit)
            .map(|like| like.outfit_id.clone())
            .collect())
    }

    async fn read_outfit_likers(&self, outfit_id: &str, limit: usize) -> StoreResult<Vec<UserId>> {
        let likes = self.likes.read().await;
        Ok(likes
            .iter()
            .filter(|like| like.outfit_id == outfit_id)
            .take(limit)
            .map(|like| like.user_id.clone())
            .collect())
    }

    async fn write_recommendation(&self, recommendation: &Recommendation) -> StoreResult<()> {
        let mut recommendations = self.recommendations.write().await;
        recommendations.insert(recommendation.id, recommendation.clone());
        Ok(())
    }

    async fn read_recommendation(&self, id: Uuid) -> StoreResult<Option<Recommendation>> {
        let recommendations = self.recommendations.read().await;
        Ok(recommendations.get(&id).cloned())
    }

    async fn write_feedback(&self, feedback: &Feedback) -> StoreResult<()> {
        if !self.recommendations.read().await.contains_key(&feedback.recommendation_id) {
            return Err(StoreError::NotFound(format!(
                "recommendation {}",
                feedback.recommendation_id
            )));
        }

        self.feedback.write().await.push(feedback.clone());
        Ok(())
    }

    async fn read_user_feedback(&self, user_id: &str, limit: usize) -> StoreResult<Vec<Feedback>> {
        let feedback = self.feedback.read().await;
        let mut entries: Vec<Feedback> = feedback
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_records_newest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .insert_record(OutfitRecord::new("old", "u1", "").recorded_at(now - Duration::days(2)))
            .await;
        store.insert_record(OutfitRecord::new("new", "u1", "").recorded_at(now)).await;

        let records = store.read_user_records("u1", 10).await.unwrap();
        assert_eq!(records[0].id, "new");
        assert_eq!(store.read_user_records("u1", 1).await.unwrap().len(), 1);
        assert!(store.read_user_records("nobody", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outfits_by_condition_filters_range_and_weather() {
        let store = InMemoryStore::new();
        store.insert_outfit(Outfit::new("a", "u2", &["코트"], 4.0, WeatherCondition::Snowy)).await;
        store.insert_outfit(Outfit::new("b", "u2", &["코트"], 12.0, WeatherCondition::Snowy)).await;
        store.insert_outfit(Outfit::new("c", "u2", &["우산"], 5.0, WeatherCondition::Rainy)).await;

        let found = store
            .read_outfits_by_condition(TemperatureRange::around(5.0, 3.0), WeatherCondition::Snowy, 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[tokio::test]
    async fn test_outfits_by_condition_keeps_most_liked() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .insert_outfit(
                Outfit::new("classic", "u2", &["코트"], 5.0, WeatherCondition::Snowy)
                    .with_likes(40)
                    .created_at(now - Duration::days(60)),
            )
            .await;
        for i in 0..5 {
            store
                .insert_outfit(
                    Outfit::new(format!("fresh{}", i), "u3", &["패딩"], 5.0, WeatherCondition::Snowy)
                        .created_at(now - Duration::minutes(i)),
                )
                .await;
        }

        let found = store
            .read_outfits_by_condition(TemperatureRange::around(5.0, 3.0), WeatherCondition::Snowy, 3)
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["classic", "fresh0", "fresh1"]);
    }

    #[tokio::test]
    async fn test_feedback_requires_known_recommendation() {
        let store = InMemoryStore::new();
        let feedback = Feedback {
            user_id: "u1".to_string(),
            recommendation_id: Uuid::new_v4(),
            feedback_type: FeedbackType::Positive,
            rating: 5,
            reason: String::new(),
            selected_items: Vec::new(),
            timestamp: Utc::now(),
        };

        let result = store.write_feedback(&feedback).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.feedback_count().await, 0);
    }

    #[tokio::test]
    async fn test_likes_and_likers() {
        let store = InMemoryStore::new();
        store.add_like("u1", "o1").await;
        store.add_like("u1", "o1").await;
        store.add_like("u2", "o1").await;

        assert_eq!(store.read_user_likes("u1", 10).await.unwrap(), vec!["o1"]);
        assert_eq!(store.read_outfit_likers("o1", 10).await.unwrap(), vec!["u1", "u2"]);
    }
}
