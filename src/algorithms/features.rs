use crate::algorithms::lexicon::Lexicon;
use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::OutfitStore;
use crate::utils::normalize_counts;
use chrono::Timelike;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

pub struct FeatureExtractor {
    store: Arc<dyn OutfitStore>,
    lexicon: Arc<Lexicon>,
}

impl FeatureExtractor {
    pub fn new(store: Arc<dyn OutfitStore>, lexicon: Arc<Lexicon>) -> Self {
        Self { store, lexicon }
    }

    pub async fn extract(&self, user_id: &str, limit: Option<usize>) -> StoreResult<UserFeatureVector> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let records = self.store.read_user_records(user_id, limit).await?;
        let records = &records[..records.len().min(limit)];

        let features = features_from_records(records, &self.lexicon);
        debug!(
            user_id = %user_id,
            total_records = features.total_records,
            "Extracted user features"
        );
        Ok(features)
    }
}

/// Builds the feature vector from records ordered newest first.
pub fn features_from_records(records: &[OutfitRecord], lexicon: &Lexicon) -> UserFeatureVector {
    let mut style_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut color_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut time_counts: BTreeMap<TimeOfDay, usize> = BTreeMap::new();

    let mut labeled = 0usize;
    let mut uncomfortable = 0usize;
    let mut comfortable_temps: Vec<f64> = Vec::new();

    for record in records {
        let mut styles: Vec<String> = record
            .style_tags
            .iter()
            .filter(|tag| !tag.trim().is_empty())
            .map(|tag| lexicon.canonical_style(tag))
            .collect();
        styles.extend(lexicon.extract_styles(&record.description));
        styles.sort();
        styles.dedup();
        for style in styles {
            *style_counts.entry(style).or_insert(0) += 1;
        }

        for color in lexicon.extract_colors(&record.description) {
            *color_counts.entry(color).or_insert(0) += 1;
        }

        let period = record
            .time_of_day
            .unwrap_or_else(|| TimeOfDay::from_hour(record.recorded_at.hour()));
        *time_counts.entry(period).or_insert(0) += 1;

        if let Some(comfort) = record.comfort {
            labeled += 1;
            match comfort {
                ComfortFeedback::TooHot | ComfortFeedback::TooCold => uncomfortable += 1,
                ComfortFeedback::Comfortable => {
                    if let Some(temperature) = record.temperature.filter(|t| t.is_finite()) {
                        comfortable_temps.push(temperature);
                    }
                }
            }
        }
    }

    let temperature_sensitivity = if labeled == 0 {
        0.0
    } else {
        uncomfortable as f64 / labeled as f64
    };

    let region = records
        .iter()
        .find_map(|record| record.region.clone())
        .unwrap_or_else(|| "unknown".to_string());

    UserFeatureVector {
        region,
        style_preferences: normalize_counts(&style_counts),
        color_preferences: normalize_counts(&color_counts),
        temperature_sensitivity,
        comfort_range: comfort_range(&comfortable_temps),
        time_preferences: normalize_counts(&time_counts),
        total_records: records.len(),
    }
}

fn comfort_range(temperatures: &[f64]) -> ComfortRange {
    if temperatures.is_empty() {
        return ComfortRange::default();
    }

    let min = temperatures.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = temperatures.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let optimal = temperatures.iter().sum::<f64>() / temperatures.len() as f64;

    ComfortRange { min, max, optimal }
}
