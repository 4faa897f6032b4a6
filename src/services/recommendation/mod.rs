use crate::algorithms::{
    context_for_request, EnsembleCombiner, FeatureExtractor, Lexicon, StylePredictor, TemperaturePredictor,
    TimeOfDayPredictor, WeatherPredictor, WeightedPrediction, WeightedPredictor,
};
use crate::config::RecommendationConfig;
use crate::error::EngineError;
use crate::models::*;
use crate::services::analytics::InteractionLog;
use crate::services::community::{CommunityDataAccess, CommunityPredictor};
use crate::services::store::OutfitStore;
use crate::utils::Clock;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const FALLBACK_MODEL_VERSION: &str = "fallback";
pub const FALLBACK_CONFIDENCE: f64 = 0.4;
pub const FALLBACK_REASONING: &str = "basic recommendation (engine unavailable)";
pub const FALLBACK_ITEMS: [&str; 3] = ["기본 티셔츠", "청바지", "스니커즈"];

/// A completed pipeline run together with the raw signal outputs behind it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub recommendation: Recommendation,
    pub predictions: Vec<WeightedPrediction>,
}

/// Orchestrates feature extraction, the signal predictors and the combiner.
pub struct RecommendationService {
    store: Arc<dyn OutfitStore>,
    extractor: FeatureExtractor,
    predictors: Vec<WeightedPredictor>,
    combiner: EnsembleCombiner,
    interaction_log: Arc<dyn InteractionLog>,
    clock: Arc<dyn Clock>,
    config: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn OutfitStore>,
        community: Arc<CommunityDataAccess>,
        interaction_log: Arc<dyn InteractionLog>,
        clock: Arc<dyn Clock>,
        config: RecommendationConfig,
    ) -> Self {
        let predictors = Self::default_predictors(community, config.max_items);
        Self::with_predictors(store, predictors, interaction_log, clock, config)
    }

    pub fn with_predictors(
        store: Arc<dyn OutfitStore>,
        predictors: Vec<WeightedPredictor>,
        interaction_log: Arc<dyn InteractionLog>,
        clock: Arc<dyn Clock>,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            extractor: FeatureExtractor::new(store.clone(), Arc::new(Lexicon::default())),
            store,
            predictors,
            combiner: EnsembleCombiner::new(config.max_items, config.ranking_depth),
            interaction_log,
            clock,
            config,
        }
    }

    /// Swaps the keyword lexicon used for feature extraction.
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.extractor = FeatureExtractor::new(self.store.clone(), Arc::new(lexicon));
        self
    }

    /// The five standard signals with their fixed weights.
    pub fn default_predictors(community: Arc<CommunityDataAccess>, community_outfits: usize) -> Vec<WeightedPredictor> {
        vec![
            WeightedPredictor::with_default_weight(Arc::new(StylePredictor)),
            WeightedPredictor::with_default_weight(Arc::new(WeatherPredictor)),
            WeightedPredictor::with_default_weight(Arc::new(TemperaturePredictor)),
            WeightedPredictor::with_default_weight(Arc::new(TimeOfDayPredictor)),
            WeightedPredictor::with_default_weight(Arc::new(CommunityPredictor::new(
                community,
                community_outfits.max(10),
            ))),
        ]
    }

    /// Always returns a recommendation; any pipeline failure yields the fallback.
    pub async fn generate_recommendation(&self, user_id: &str, request: &RecommendationContext) -> Recommendation {
        let outcome = AssertUnwindSafe(self.run_pipeline(user_id, request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(EngineError::Panicked(panic_message(panic.as_ref()))));

        let recommendation = match outcome {
            Ok(output) => output.recommendation,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Recommendation pipeline failed, serving fallback");
                self.fallback(user_id, request)
            }
        };

        if let Err(panic) = AssertUnwindSafe(self.record(&recommendation)).catch_unwind().await {
            warn!(
                recommendation_id = %recommendation.id,
                panic = %panic_message(panic.as_ref()),
                "Recording the recommendation panicked"
            );
        }
        recommendation
    }

    /// Runs the full pipeline without the fallback boundary or persistence.
    pub async fn run_pipeline(
        &self,
        user_id: &str,
        request: &RecommendationContext,
    ) -> Result<PipelineOutput, EngineError> {
        let context = context_for_request(request);
        let features = self
            .extractor
            .extract(user_id, Some(self.config.history_limit))
            .await?;

        let predictions: Vec<WeightedPrediction> = join_all(self.predictors.iter().map(|entry| {
            let features = &features;
            let context = &context;
            async move {
                WeightedPrediction {
                    kind: entry.predictor.kind(),
                    weight: entry.weight,
                    prediction: entry.predictor.predict(features, context).await,
                }
            }
        }))
        .await;

        for entry in &predictions {
            debug!(
                signal = %entry.kind,
                confidence = entry.prediction.confidence,
                items = entry.prediction.items.len(),
                "Signal prediction"
            );
        }

        let result = self.combiner.combine(&predictions);
        let recommendation = Recommendation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            context,
            sanitized_user_features: features.sanitized(),
            recommended_items: result.recommended_items,
            confidence: result.confidence,
            reasoning: result.reasoning,
            alternatives: result.alternatives,
            created_at: self.clock.now(),
            model_version: self.config.model_version.clone(),
        };

        info!(
            user_id = %user_id,
            recommendation_id = %recommendation.id,
            confidence = recommendation.confidence,
            total_records = features.total_records,
            "Generated recommendation"
        );

        Ok(PipelineOutput {
            recommendation,
            predictions,
        })
    }

    pub fn fallback(&self, user_id: &str, request: &RecommendationContext) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            context: context_for_request(request),
            sanitized_user_features: SanitizedFeatures::default(),
            recommended_items: FALLBACK_ITEMS.iter().map(|item| item.to_string()).collect(),
            confidence: FALLBACK_CONFIDENCE,
            reasoning: FALLBACK_REASONING.to_string(),
            alternatives: Vec::new(),
            created_at: self.clock.now(),
            model_version: FALLBACK_MODEL_VERSION.to_string(),
        }
    }

    /// Persists the recommendation and emits the interaction event. Failures are only logged.
    async fn record(&self, recommendation: &Recommendation) {
        if let Err(e) = self.store.write_recommendation(recommendation).await {
            warn!(recommendation_id = %recommendation.id, error = %e, "Failed to persist recommendation");
        }

        let event = InteractionEvent::from_recommendation(recommendation, self.clock.now());
        if let Err(e) = self.interaction_log.log_interaction(&event).await {
            warn!(recommendation_id = %recommendation.id, error = %e, "Failed to log interaction");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
