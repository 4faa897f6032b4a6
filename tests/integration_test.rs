use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stylecast::algorithms::predictors::TemperaturePredictor;
use stylecast::algorithms::{context_for_request, features_from_records, Lexicon, WeightedPrediction};
use stylecast::config::{CommunityConfig, RecommendationConfig};
use stylecast::error::{StoreError, StoreResult};
use stylecast::services::analytics::TracingInteractionLog;
use stylecast::services::community::{CommunityDataAccess, DEGRADED_REASONING};
use stylecast::services::feedback::FeedbackService;
use stylecast::services::recommendation::{RecommendationService, FALLBACK_MODEL_VERSION};
use stylecast::services::store::{InMemoryStore, OutfitStore};
use stylecast::utils::{Clock, ManualClock, SystemClock};
use stylecast::*;
use uuid::Uuid;

/// Delegates to an in-memory store while counting community reads and optionally failing them.
struct InstrumentedStore {
    inner: InMemoryStore,
    condition_reads: AtomicUsize,
    fail_community: bool,
    fail_records: bool,
}

impl InstrumentedStore {
    fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            condition_reads: AtomicUsize::new(0),
            fail_community: false,
            fail_records: false,
        }
    }

    fn failing_community(mut self) -> Self {
        self.fail_community = true;
        self
    }

    fn failing_records(mut self) -> Self {
        self.fail_records = true;
        self
    }

    fn condition_reads(&self) -> usize {
        self.condition_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutfitStore for InstrumentedStore {
    async fn read_user_records(&self, user_id: &str, limit: usize) -> StoreResult<Vec<OutfitRecord>> {
        if self.fail_records {
            return Err(StoreError::Unavailable("records offline".to_string()));
        }
        self.inner.read_user_records(user_id, limit).await
    }

    async fn read_outfits_by_condition(
        &self,
        range: TemperatureRange,
        weather: WeatherCondition,
        limit: usize,
    ) -> StoreResult<Vec<Outfit>> {
        self.condition_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_community {
            return Err(StoreError::Unavailable("community offline".to_string()));
        }
        self.inner.read_outfits_by_condition(range, weather, limit).await
    }

    async fn read_outfits_by_recency(&self, since: DateTime<Utc>, limit: usize) -> StoreResult<Vec<Outfit>> {
        self.inner.read_outfits_by_recency(since, limit).await
    }

    async fn read_user_likes(&self, user_id: &str, limit: usize) -> StoreResult<Vec<OutfitId>> {
        self.inner.read_user_likes(user_id, limit).await
    }

    async fn read_outfit_likers(&self, outfit_id: &str, limit: usize) -> StoreResult<Vec<UserId>> {
        self.inner.read_outfit_likers(outfit_id, limit).await
    }

    async fn write_recommendation(&self, recommendation: &Recommendation) -> StoreResult<()> {
        self.inner.write_recommendation(recommendation).await
    }

    async fn read_recommendation(&self, id: Uuid) -> StoreResult<Option<Recommendation>> {
        self.inner.read_recommendation(id).await
    }

    async fn write_feedback(&self, feedback: &Feedback) -> StoreResult<()> {
        self.inner.write_feedback(feedback).await
    }

    async fn read_user_feedback(&self, user_id: &str, limit: usize) -> StoreResult<Vec<Feedback>> {
        self.inner.read_user_feedback(user_id, limit).await
    }
}

fn request_at(temperature: f64, condition: WeatherCondition, hour: u32) -> RecommendationContext {
    let time = NaiveDate::from_ymd_opt(2024, 1, 10)
        .and_then(|d| d.and_hms_opt(hour, 30, 0))
        .unwrap();
    RecommendationContext::new(Weather::new(temperature, condition), time)
}

fn service_with_clock(store: Arc<dyn OutfitStore>, clock: Arc<dyn Clock>) -> RecommendationService {
    let community = Arc::new(CommunityDataAccess::new(
        store.clone(),
        clock.clone(),
        CommunityConfig::default(),
    ));
    RecommendationService::new(
        store,
        community,
        Arc::new(TracingInteractionLog),
        clock,
        RecommendationConfig::default(),
    )
}

fn service(store: Arc<dyn OutfitStore>) -> RecommendationService {
    service_with_clock(store, Arc::new(SystemClock))
}

fn signal(predictions: &[WeightedPrediction], kind: SignalKind) -> &SignalPrediction {
    &predictions
        .iter()
        .find(|entry| entry.kind == kind)
        .expect("every signal runs")
        .prediction
}

async fn casual_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    let base = Utc::now();
    for i in 0..4 {
        store
            .insert_record(
                OutfitRecord::new(format!("r{}", i), "casual-user", "편한 블랙 맨투맨")
                    .with_styles(&["casual"])
                    .recorded_at(base - Duration::days(i)),
            )
            .await;
    }
    store
}

#[tokio::test]
async fn test_new_user_in_snow_gets_warm_low_confidence_recommendation() {
    let service = service(Arc::new(InMemoryStore::new()));
    let request = request_at(5.0, WeatherCondition::Snowy, 8);

    let output = service.run_pipeline("newcomer", &request).await.unwrap();
    let recommendation = &output.recommendation;

    assert_eq!(recommendation.sanitized_user_features.total_records, 0);
    assert_eq!(recommendation.sanitized_user_features.comfort_range, ComfortRange::default());

    let weather = signal(&output.predictions, SignalKind::Weather);
    assert!(weather.items.iter().any(|item| item == "따뜻한 코트"));

    let temperature = signal(&output.predictions, SignalKind::Temperature);
    assert!(temperature.items.iter().any(|item| item == "패딩"));

    assert!(recommendation.confidence < 0.6, "confidence was {}", recommendation.confidence);
    assert!(!recommendation.is_fallback());
}

#[tokio::test]
async fn test_casual_user_in_mild_weather() {
    let service = service(Arc::new(casual_store().await));
    let request = request_at(22.0, WeatherCondition::Cloudy, 14);

    let output = service.run_pipeline("casual-user", &request).await.unwrap();

    let style = signal(&output.predictions, SignalKind::Style);
    assert_eq!(style.confidence, 0.9);
    assert!(style.items.iter().any(|item| item == "청바지"));

    let temperature = signal(&output.predictions, SignalKind::Temperature);
    assert_eq!(temperature.items, TemperaturePredictor::moderate_items());

    let top_styles = &output.recommendation.sanitized_user_features.top_styles;
    assert_eq!(top_styles.first().map(String::as_str), Some("casual"));
}

#[tokio::test]
async fn test_community_failure_degrades_only_that_signal() {
    let store = Arc::new(InstrumentedStore::new(casual_store().await).failing_community());
    let service = service(store.clone());
    let request = request_at(3.0, WeatherCondition::Rainy, 19);

    let output = service.run_pipeline("casual-user", &request).await.unwrap();

    let community = signal(&output.predictions, SignalKind::Community);
    assert!(community.items.is_empty());
    assert_eq!(community.confidence, 0.3);
    assert_eq!(community.reasoning, DEGRADED_REASONING);

    let recommendation = &output.recommendation;
    assert!(!recommendation.is_fallback());
    assert!(!recommendation.recommended_items.is_empty());
    assert!(recommendation.confidence > 0.0);
    assert!(store.condition_reads() >= 1);
}

#[tokio::test]
async fn test_feedback_for_unknown_recommendation_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let feedback = FeedbackService::new(store.clone(), Arc::new(SystemClock), 5);

    let input = FeedbackInput {
        feedback_type: FeedbackType::Negative,
        rating: 2,
        reason: "추웠어요".to_string(),
        selected_items: Vec::new(),
    };

    assert!(!feedback.process_feedback("u1", Uuid::new_v4(), input).await);
    assert_eq!(store.feedback_count().await, 0);
}

#[tokio::test]
async fn test_feedback_round_trip_feeds_summary() {
    let store = Arc::new(casual_store().await);
    let recommender = service(store.clone());
    let feedback = FeedbackService::new(store.clone(), Arc::new(SystemClock), 5);

    let recommendation = recommender
        .generate_recommendation("casual-user", &request_at(18.0, WeatherCondition::Sunny, 10))
        .await;
    let chosen = recommendation.recommended_items[0].clone();

    let input = FeedbackInput {
        feedback_type: FeedbackType::Positive,
        rating: 5,
        reason: "좋아요".to_string(),
        selected_items: vec![chosen.clone()],
    };
    assert!(feedback.process_feedback("casual-user", recommendation.id, input).await);

    let summary = feedback.summarize_feedback("casual-user", 10).await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.positive, 1);
    assert_eq!(summary.average_rating, 5.0);
    let expected_precision = 1.0 / recommendation.recommended_items.len().min(5) as f64;
    assert_eq!(summary.selection_precision, Some(expected_precision));
    assert_eq!(summary.top_selected_items, vec![(chosen, 1)]);
}

#[tokio::test]
async fn test_store_outage_serves_fallback() {
    let store = Arc::new(InstrumentedStore::new(InMemoryStore::new()).failing_records());
    let service = service(store);

    let recommendation = service
        .generate_recommendation("u1", &request_at(12.0, WeatherCondition::Cloudy, 9))
        .await;

    assert!(recommendation.is_fallback());
    assert_eq!(recommendation.model_version, FALLBACK_MODEL_VERSION);
    assert_eq!(recommendation.confidence, 0.4);
    assert_eq!(recommendation.recommended_items, vec!["기본 티셔츠", "청바지", "스니커즈"]);
    assert!(recommendation.alternatives.is_empty());
}

#[tokio::test]
async fn test_recommendation_items_come_from_predictions() {
    let store = casual_store().await;
    store
        .insert_outfit(Outfit::new("o1", "other", &["트렌치 코트", "로퍼"], 11.0, WeatherCondition::Rainy).with_likes(12))
        .await;
    let service = service(Arc::new(store));

    for (temperature, condition, hour) in [
        (-8.0, WeatherCondition::Snowy, 7),
        (11.0, WeatherCondition::Rainy, 13),
        (31.0, WeatherCondition::Sunny, 15),
        (18.0, WeatherCondition::Other, 23),
    ] {
        let output = service
            .run_pipeline("casual-user", &request_at(temperature, condition, hour))
            .await
            .unwrap();

        let proposed: HashSet<&String> = output
            .predictions
            .iter()
            .flat_map(|entry| entry.prediction.items.iter())
            .collect();
        let recommendation = &output.recommendation;

        assert!(recommendation.recommended_items.len() <= 5);
        assert!(recommendation
            .recommended_items
            .iter()
            .all(|item| proposed.contains(item)));
        assert!((0.0..=1.0).contains(&recommendation.confidence));
        for entry in &output.predictions {
            assert!((0.0..=1.0).contains(&entry.prediction.confidence));
        }
    }
}

#[test]
fn test_style_frequencies_sum_to_one() {
    let base = Utc::now();
    let records = vec![
        OutfitRecord::new("a", "u", "블랙 정장 셔츠").recorded_at(base),
        OutfitRecord::new("b", "u", "빈티지 데님").with_styles(&["street"]).recorded_at(base),
        OutfitRecord::new("c", "u", "캐주얼 후드").with_styles(&["casual"]).recorded_at(base),
        OutfitRecord::new("d", "u", "무지 티").recorded_at(base),
    ];

    let features = features_from_records(&records, &Lexicon::default());
    assert_eq!(features.total_records, 4);

    let total: f64 = features.style_preferences.values().sum();
    assert!((total - 1.0).abs() < 1e-9);

    let colors: f64 = features.color_preferences.values().sum();
    assert!((colors - 1.0).abs() < 1e-9);
}

#[test]
fn test_context_building_is_deterministic() {
    let request = request_at(14.5, WeatherCondition::Cloudy, 17);

    let first = context_for_request(&request);
    let second = context_for_request(&request);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.time_of_day, TimeOfDay::Evening);
    assert_eq!(first.season, Season::Winter);
}

#[tokio::test]
async fn test_community_cache_respects_ttl() {
    let store = Arc::new(InstrumentedStore::new(InMemoryStore::new()));
    store
        .inner
        .insert_outfit(Outfit::new("o1", "u2", &["패딩", "목도리"], 4.0, WeatherCondition::Snowy).with_likes(3))
        .await;

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let data = CommunityDataAccess::new(store.clone(), clock.clone(), CommunityConfig::default());

    let first = data.popular_by_condition(5.0, WeatherCondition::Snowy, 10).await.unwrap();
    assert_eq!(store.condition_reads(), 1);

    clock.advance(Duration::seconds(120));
    let second = data.popular_by_condition(5.0, WeatherCondition::Snowy, 10).await.unwrap();
    assert_eq!(store.condition_reads(), 1);
    assert_eq!(first, second);

    clock.advance(Duration::seconds(181));
    let third = data.popular_by_condition(5.0, WeatherCondition::Snowy, 10).await.unwrap();
    assert_eq!(store.condition_reads(), 2);
    assert_eq!(first, third);
}

#[tokio::test]
async fn test_repeated_requests_share_community_cache() {
    let store = Arc::new(InstrumentedStore::new(casual_store().await));
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc::now()));
    let service = service_with_clock(store.clone(), clock);
    let request = request_at(9.0, WeatherCondition::Rainy, 8);

    let first = service.generate_recommendation("casual-user", &request).await;
    let second = service.generate_recommendation("casual-user", &request).await;

    assert_eq!(store.condition_reads(), 1);
    assert_ne!(first.id, second.id);
    assert_eq!(first.recommended_items, second.recommended_items);
}
