pub mod cache;

use crate::algorithms::SignalPredictor;
use crate::config::CommunityConfig;
use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::OutfitStore;
use crate::utils::Clock;
use cache::TtlCache;
use chrono::Duration;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEGRADED_REASONING: &str = "Community data is unavailable right now, so this leans on your own signals";
const EMPTY_REASONING: &str = "No community outfits logged for these conditions yet";
const COMMUNITY_ITEMS: usize = 5;

/// Canonical form of a community query, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommunityQuery {
    Popular {
        temperature_tenths: i64,
        weather: WeatherCondition,
        limit: usize,
    },
    Trend {
        limit: usize,
    },
    Collaborative {
        user_id: UserId,
        temperature_tenths: i64,
        weather: WeatherCondition,
        limit: usize,
    },
}

/// Temperature in whole tenths of a degree. Queries are answered for this
/// rounded value so a cached result equals a fresh one.
fn temperature_key(temperature: f64) -> i64 {
    (temperature * 10.0).round() as i64
}

fn canonical_temperature(temperature: f64) -> f64 {
    temperature_key(temperature) as f64 / 10.0
}

/// Condition relevance of one outfit for a target temperature and weather.
pub fn relevance_score(outfit: &Outfit, temperature: f64, weather: WeatherCondition) -> f64 {
    let like_score = 0.3 * outfit.like_count as f64;
    let temperature_score = 0.4 * (10.0 - (outfit.temperature - temperature).abs()).max(0.0);
    let weather_score = if outfit.weather == weather { 0.3 * 20.0 } else { 0.0 };
    like_score + temperature_score + weather_score
}

fn sort_scored(scored: &mut [ScoredOutfit]) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.outfit.id.cmp(&b.outfit.id))
    });
}

/// Answers "what do other people wear in conditions like these", backed by the store
/// and a short-lived result cache.
pub struct CommunityDataAccess {
    store: Arc<dyn OutfitStore>,
    cache: TtlCache<CommunityQuery, Vec<ScoredOutfit>>,
    clock: Arc<dyn Clock>,
    config: CommunityConfig,
}

impl CommunityDataAccess {
    pub fn new(store: Arc<dyn OutfitStore>, clock: Arc<dyn Clock>, config: CommunityConfig) -> Self {
        let cache = TtlCache::new(Duration::seconds(config.cache_ttl_seconds), clock.clone());
        Self {
            store,
            cache,
            clock,
            config,
        }
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    fn candidate_limit(&self, limit: usize) -> usize {
        limit.max(self.config.result_limit)
    }

    /// Outfits within the temperature window and matching weather, best relevance first.
    pub async fn popular_by_condition(
        &self,
        temperature: f64,
        weather: WeatherCondition,
        limit: usize,
    ) -> StoreResult<Vec<ScoredOutfit>> {
        let temperature = canonical_temperature(temperature);
        let key = CommunityQuery::Popular {
            temperature_tenths: temperature_key(temperature),
            weather,
            limit,
        };
        if let Some(hit) = self.cache.get(&key) {
            debug!(?key, "Community cache hit");
            return Ok(hit);
        }

        let range = TemperatureRange::around(temperature, self.config.temperature_window);
        let outfits = self
            .store
            .read_outfits_by_condition(range, weather, self.candidate_limit(limit))
            .await?;

        let mut scored: Vec<ScoredOutfit> = outfits
            .into_iter()
            .map(|outfit| {
                let score = relevance_score(&outfit, temperature, weather);
                ScoredOutfit { outfit, score }
            })
            .collect();
        sort_scored(&mut scored);
        scored.truncate(limit);

        self.cache.insert(key, scored.clone());
        Ok(scored)
    }

    /// Recent outfits ranked by likes decayed over days since creation.
    pub async fn trending(&self, limit: usize) -> StoreResult<Vec<ScoredOutfit>> {
        let key = CommunityQuery::Trend { limit };
        if let Some(hit) = self.cache.get(&key) {
            debug!(?key, "Community cache hit");
            return Ok(hit);
        }

        let now = self.clock.now();
        let since = now - Duration::days(self.config.trend_days);
        let outfits = self
            .store
            .read_outfits_by_recency(since, self.candidate_limit(limit))
            .await?;

        let mut scored: Vec<ScoredOutfit> = outfits
            .into_iter()
            .map(|outfit| {
                let days = (now - outfit.created_at).num_days().max(0) as f64;
                let score = outfit.like_count as f64 / (1.0 + days);
                ScoredOutfit { outfit, score }
            })
            .collect();
        sort_scored(&mut scored);
        scored.truncate(limit);

        self.cache.insert(key, scored.clone());
        Ok(scored)
    }

    /// Condition-matching outfits liked by users who share likes with `user_id`.
    pub async fn liked_by_similar_users(
        &self,
        user_id: &str,
        temperature: f64,
        weather: WeatherCondition,
        limit: usize,
    ) -> StoreResult<Vec<ScoredOutfit>> {
        let temperature = canonical_temperature(temperature);
        let key = CommunityQuery::Collaborative {
            user_id: user_id.to_string(),
            temperature_tenths: temperature_key(temperature),
            weather,
            limit,
        };
        if let Some(hit) = self.cache.get(&key) {
            debug!(?key, "Community cache hit");
            return Ok(hit);
        }

        let scan = self.config.like_scan_limit;
        let liked = self.store.read_user_likes(user_id, scan).await?;
        let liked_set: HashSet<&String> = liked.iter().collect();

        let mut co_likes: HashMap<UserId, usize> = HashMap::new();
        for outfit_id in &liked {
            for liker in self.store.read_outfit_likers(outfit_id, scan).await? {
                if liker != user_id {
                    *co_likes.entry(liker).or_insert(0) += 1;
                }
            }
        }

        let mut similar: Vec<(UserId, usize)> = co_likes.into_iter().collect();
        similar.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        similar.truncate(self.config.similar_users);

        let mut scored = Vec::new();
        if !similar.is_empty() {
            let mut support: HashMap<OutfitId, usize> = HashMap::new();
            for (similar_user, _) in &similar {
                for outfit_id in self.store.read_user_likes(similar_user, scan).await? {
                    *support.entry(outfit_id).or_insert(0) += 1;
                }
            }

            let range = TemperatureRange::around(temperature, self.config.temperature_window);
            let candidates = self
                .store
                .read_outfits_by_condition(range, weather, self.candidate_limit(limit))
                .await?;

            scored = candidates
                .into_iter()
                .filter(|outfit| !liked_set.contains(&outfit.id))
                .filter_map(|outfit| {
                    let votes = support.get(&outfit.id).copied().unwrap_or(0);
                    (votes > 0).then(|| {
                        let score = votes as f64 * 10.0 + relevance_score(&outfit, temperature, weather);
                        ScoredOutfit { outfit, score }
                    })
                })
                .collect();
            sort_scored(&mut scored);
            scored.truncate(limit);
        }

        debug!(user_id = %user_id, similar_users = similar.len(), results = scored.len(), "Collaborative lookup");
        self.cache.insert(key, scored.clone());
        Ok(scored)
    }
}

/// Signal drawn from what other users wear in similar conditions.
pub struct CommunityPredictor {
    data: Arc<CommunityDataAccess>,
    outfit_limit: usize,
}

impl CommunityPredictor {
    pub fn new(data: Arc<CommunityDataAccess>, outfit_limit: usize) -> Self {
        Self { data, outfit_limit }
    }

    fn tally_items(outfits: &[ScoredOutfit]) -> Vec<String> {
        let mut tally: Vec<(String, f64)> = Vec::new();
        for scored in outfits {
            for item in &scored.outfit.items {
                match tally.iter_mut().find(|(existing, _)| existing == item) {
                    Some((_, score)) => *score += scored.score,
                    None => tally.push((item.clone(), scored.score)),
                }
            }
        }

        tally.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        tally.into_iter().take(COMMUNITY_ITEMS).map(|(item, _)| item).collect()
    }
}

#[async_trait::async_trait]
impl SignalPredictor for CommunityPredictor {
    fn kind(&self) -> SignalKind {
        SignalKind::Community
    }

    async fn predict(&self, _features: &UserFeatureVector, context: &ContextVector) -> SignalPrediction {
        let lookup = self
            .data
            .popular_by_condition(context.temperature, context.weather_condition, self.outfit_limit)
            .await;

        match lookup {
            Ok(outfits) if outfits.is_empty() => SignalPrediction::new(Vec::new(), 0.3, EMPTY_REASONING),
            Ok(outfits) => {
                let confidence = 0.5 + 0.05 * outfits.len().min(6) as f64;
                SignalPrediction::new(
                    Self::tally_items(&outfits),
                    confidence,
                    format!("Popular in {} community outfits from similar weather", outfits.len()),
                )
            }
            Err(e) => {
                warn!(error = %e, "Community lookup failed, degrading community signal");
                SignalPrediction::new(Vec::new(), 0.3, DEGRADED_REASONING)
            }
        }
    }
}
