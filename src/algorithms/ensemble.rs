use super::WeightedPrediction;
use crate::models::*;

pub const DEFAULT_MAX_ITEMS: usize = 5;
pub const DEFAULT_RANKING_DEPTH: usize = 8;

/// Predictors whose reasoning is quoted must be at least this confident.
const REASONING_MIN_CONFIDENCE: f64 = 0.5;
const REASONING_SOURCES: usize = 3;
const GENERIC_REASONING: &str = "Recommended from general outfit patterns for the current conditions";

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleResult {
    /// Internal ranking with scores, at most `ranking_depth` long.
    pub ranked: Vec<(String, f64)>,
    pub recommended_items: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
    pub alternatives: Vec<AlternativeGroup>,
}

#[derive(Debug, Clone)]
pub struct EnsembleCombiner {
    max_items: usize,
    ranking_depth: usize,
}

impl Default for EnsembleCombiner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS, DEFAULT_RANKING_DEPTH)
    }
}

impl EnsembleCombiner {
    pub fn new(max_items: usize, ranking_depth: usize) -> Self {
        Self {
            max_items,
            ranking_depth: ranking_depth.max(max_items),
        }
    }

    pub fn combine(&self, predictions: &[WeightedPrediction]) -> EnsembleResult {
        let ranked = self.rank_items(predictions);
        let recommended_items = ranked
            .iter()
            .take(self.max_items)
            .map(|(item, _)| item.clone())
            .collect();

        EnsembleResult {
            ranked,
            recommended_items,
            confidence: Self::aggregate_confidence(predictions),
            reasoning: Self::reasoning(predictions),
            alternatives: Self::alternatives(predictions),
        }
    }

    /// Scores every item by the summed `weight × confidence` of the predictors proposing it.
    /// Ties keep first-seen order.
    fn rank_items(&self, predictions: &[WeightedPrediction]) -> Vec<(String, f64)> {
        let mut scores: Vec<(String, f64)> = Vec::new();

        for entry in predictions {
            let contribution = entry.weight * entry.prediction.confidence;
            if contribution <= 0.0 {
                continue;
            }

            let mut seen: Vec<&str> = Vec::new();
            for item in &entry.prediction.items {
                if seen.contains(&item.as_str()) {
                    continue;
                }
                seen.push(item);

                match scores.iter_mut().find(|(existing, _)| existing == item) {
                    Some((_, score)) => *score += contribution,
                    None => scores.push((item.clone(), contribution)),
                }
            }
        }

        // Vec::sort_by is stable, so equal scores stay in insertion order.
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(self.ranking_depth);
        scores
    }

    /// Weighted mean of the predictor confidences.
    fn aggregate_confidence(predictions: &[WeightedPrediction]) -> f64 {
        let pairs: Vec<(f64, f64)> = predictions
            .iter()
            .map(|entry| (entry.prediction.confidence, entry.weight))
            .collect();
        crate::utils::weighted_average(&pairs).clamp(0.0, 1.0)
    }

    fn reasoning(predictions: &[WeightedPrediction]) -> String {
        let mut confident: Vec<&WeightedPrediction> = predictions
            .iter()
            .filter(|entry| entry.prediction.confidence > REASONING_MIN_CONFIDENCE)
            .filter(|entry| !entry.prediction.reasoning.is_empty())
            .collect();

        if confident.is_empty() {
            return GENERIC_REASONING.to_string();
        }

        confident.sort_by(|a, b| {
            b.prediction
                .confidence
                .partial_cmp(&a.prediction.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        confident
            .iter()
            .take(REASONING_SOURCES)
            .map(|entry| entry.prediction.reasoning.as_str())
            .collect::<Vec<_>>()
            .join(". ")
    }

    fn alternatives(predictions: &[WeightedPrediction]) -> Vec<AlternativeGroup> {
        let groups = [
            (SignalKind::Style, "style", "Picks that match your usual style"),
            (SignalKind::Weather, "weather", "Picks for today's weather"),
        ];

        groups
            .iter()
            .filter_map(|(kind, group_type, description)| {
                predictions
                    .iter()
                    .find(|entry| entry.kind == *kind && !entry.prediction.items.is_empty())
                    .map(|entry| AlternativeGroup {
                        group_type: group_type.to_string(),
                        items: entry.prediction.items.clone(),
                        description: description.to_string(),
                    })
            })
            .collect()
    }
}
