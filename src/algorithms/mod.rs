pub mod context;
pub mod ensemble;
pub mod features;
pub mod lexicon;
pub mod predictors;

use crate::models::*;
use std::sync::Arc;

pub use context::{build_context, context_for_request};
pub use ensemble::{EnsembleCombiner, EnsembleResult};
pub use features::{features_from_records, FeatureExtractor, DEFAULT_HISTORY_LIMIT};
pub use lexicon::Lexicon;
pub use predictors::{StylePredictor, TemperaturePredictor, TimeOfDayPredictor, WeatherPredictor};

/// Fixed blend weights per signal. They sum to 1.0.
pub const DEFAULT_SIGNAL_WEIGHTS: [(SignalKind, f64); 5] = [
    (SignalKind::Style, 0.30),
    (SignalKind::Weather, 0.25),
    (SignalKind::Temperature, 0.20),
    (SignalKind::TimeOfDay, 0.15),
    (SignalKind::Community, 0.10),
];

pub fn default_weight(kind: SignalKind) -> f64 {
    DEFAULT_SIGNAL_WEIGHTS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, weight)| *weight)
        .unwrap_or(0.0)
}

/// One independent heuristic signal.
///
/// Implementations must not fail: upstream problems are folded into a
/// low-confidence prediction instead.
#[async_trait::async_trait]
pub trait SignalPredictor: Send + Sync {
    fn kind(&self) -> SignalKind;

    async fn predict(&self, features: &UserFeatureVector, context: &ContextVector) -> SignalPrediction;
}

#[derive(Clone)]
pub struct WeightedPredictor {
    pub predictor: Arc<dyn SignalPredictor>,
    pub weight: f64,
}

impl WeightedPredictor {
    pub fn new(predictor: Arc<dyn SignalPredictor>, weight: f64) -> Self {
        Self { predictor, weight }
    }

    /// Uses the standard weight for the predictor's signal kind.
    pub fn with_default_weight(predictor: Arc<dyn SignalPredictor>) -> Self {
        let weight = default_weight(predictor.kind());
        Self { predictor, weight }
    }
}

/// A predictor's output tagged with where it came from and how much it counts.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPrediction {
    pub kind: SignalKind,
    pub weight: f64,
    pub prediction: SignalPrediction,
}
