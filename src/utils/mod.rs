use std::collections::BTreeMap;

pub mod clock;
pub mod metrics;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};

/// Turns raw tallies into frequencies that sum to 1. Empty or all-zero input yields an empty map.
pub fn normalize_counts<K: Ord + Clone>(counts: &BTreeMap<K, usize>) -> BTreeMap<K, f64> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }

    counts
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(key, &count)| (key.clone(), count as f64 / total as f64))
        .collect()
}

/// Highest-valued entries first; ties break on key order so results are stable.
pub fn top_k_entries<K: Ord + Clone>(map: &BTreeMap<K, f64>, k: usize) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = map.iter().map(|(key, &value)| (key.clone(), value)).collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries.truncate(k);
    entries
}

/// Appends `item` unless it is already present.
pub fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}

pub fn weighted_average(values: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = values.iter().map(|(_, weight)| weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    values.iter().map(|(value, weight)| value * weight).sum::<f64>() / total_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_counts() {
        let mut counts = BTreeMap::new();
        counts.insert("casual", 3);
        counts.insert("formal", 1);
        let freqs = normalize_counts(&counts);
        assert!((freqs["casual"] - 0.75).abs() < 1e-9);
        assert!((freqs.values().sum::<f64>() - 1.0).abs() < 1e-9);

        let empty: BTreeMap<&str, usize> = BTreeMap::new();
        assert!(normalize_counts(&empty).is_empty());
    }

    #[test]
    fn test_top_k_entries_breaks_ties_by_key() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 0.4);
        map.insert("a".to_string(), 0.4);
        map.insert("c".to_string(), 0.2);
        let top = top_k_entries(&map, 2);
        assert_eq!(top[0].0, "a");
        assert_eq!(top[1].0, "b");
    }

    #[test]
    fn test_weighted_average() {
        assert!((weighted_average(&[(1.0, 0.5), (0.0, 0.5)]) - 0.5).abs() < 1e-9);
        assert_eq!(weighted_average(&[]), 0.0);
    }
}
