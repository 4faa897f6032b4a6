use crate::models::{Feedback, FeedbackType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub average_rating: f64,
    /// Mean precision@k of selected items over feedback whose recommendation could be joined.
    pub selection_precision: Option<f64>,
    pub top_selected_items: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    k: usize,
}

impl MetricsCalculator {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Share of the top-k recommended items the user actually picked.
    pub fn calculate_precision_at_k(&self, recommended: &[String], selected: &[String]) -> f64 {
        if recommended.is_empty() || self.k == 0 {
            return 0.0;
        }

        let selected_set: HashSet<&String> = selected.iter().collect();
        let hits = recommended
            .iter()
            .take(self.k)
            .filter(|item| selected_set.contains(item))
            .count();

        hits as f64 / self.k.min(recommended.len()) as f64
    }

    pub fn calculate_average_rating(&self, feedback: &[Feedback]) -> f64 {
        if feedback.is_empty() {
            return 0.0;
        }

        feedback.iter().map(|f| f.rating as f64).sum::<f64>() / feedback.len() as f64
    }

    /// `joined` pairs each feedback entry with the items of the recommendation it answers, when known.
    pub fn summarize(&self, joined: &[(Feedback, Option<Vec<String>>)], top_items: usize) -> FeedbackSummary {
        let feedback: Vec<Feedback> = joined.iter().map(|(f, _)| f.clone()).collect();

        let count_of = |kind: FeedbackType| feedback.iter().filter(|f| f.feedback_type == kind).count();

        let precisions: Vec<f64> = joined
            .iter()
            .filter_map(|(f, recommended)| {
                recommended
                    .as_ref()
                    .map(|items| self.calculate_precision_at_k(items, &f.selected_items))
            })
            .collect();

        let selection_precision = if precisions.is_empty() {
            None
        } else {
            Some(precisions.iter().sum::<f64>() / precisions.len() as f64)
        };

        let mut selections: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &feedback {
            for item in &entry.selected_items {
                *selections.entry(item.clone()).or_insert(0) += 1;
            }
        }
        let mut top_selected_items: Vec<(String, usize)> = selections.into_iter().collect();
        top_selected_items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_selected_items.truncate(top_items);

        FeedbackSummary {
            total: feedback.len(),
            positive: count_of(FeedbackType::Positive),
            neutral: count_of(FeedbackType::Neutral),
            negative: count_of(FeedbackType::Negative),
            average_rating: self.calculate_average_rating(&feedback),
            selection_precision,
            top_selected_items,
        }
    }
}
