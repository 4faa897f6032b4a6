use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type UserId = String;
pub type OutfitId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[serde(alias = "rain")]
    Rainy,
    #[serde(alias = "sun", alias = "clear")]
    Sunny,
    #[serde(alias = "cloud", alias = "clouds")]
    Cloudy,
    #[serde(alias = "snow")]
    Snowy,
    #[serde(other)]
    Other,
}

impl WeatherCondition {
    /// Icon name used when querying outfits by condition.
    pub fn icon(&self) -> &'static str {
        match self {
            WeatherCondition::Rainy => "rain",
            WeatherCondition::Sunny => "sun",
            WeatherCondition::Cloudy => "cloud",
            WeatherCondition::Snowy => "snow",
            WeatherCondition::Other => "other",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.icon())
    }
}

impl FromStr for WeatherCondition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "rain" | "rainy" => WeatherCondition::Rainy,
            "sun" | "sunny" | "clear" => WeatherCondition::Sunny,
            "cloud" | "cloudy" | "clouds" => WeatherCondition::Cloudy,
            "snow" | "snowy" => WeatherCondition::Snowy,
            _ => WeatherCondition::Other,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComfortFeedback {
    TooHot,
    TooCold,
    Comfortable,
}

/// Current weather as reported by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    #[serde(default)]
    pub rain_amount: f64,
}

impl Weather {
    pub fn new(temperature: f64, condition: WeatherCondition) -> Self {
        Self {
            temperature,
            humidity: 0.0,
            wind_speed: 0.0,
            condition,
            rain_amount: 0.0,
        }
    }
}

/// One outfit the user logged in the past.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitRecord {
    pub id: String,
    pub user_id: UserId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub weather: Option<WeatherCondition>,
    #[serde(default)]
    pub comfort: Option<ComfortFeedback>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub region: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl OutfitRecord {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            description: description.into(),
            style_tags: Vec::new(),
            temperature: None,
            weather: None,
            comfort: None,
            time_of_day: None,
            region: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_styles(mut self, tags: &[&str]) -> Self {
        self.style_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_temperature(mut self, temperature: f64, comfort: Option<ComfortFeedback>) -> Self {
        self.temperature = Some(temperature);
        self.comfort = comfort;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = at;
        self
    }
}

/// A community outfit shared by some user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: OutfitId,
    pub user_id: UserId,
    pub items: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub temperature: f64,
    pub weather: WeatherCondition,
    #[serde(default)]
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Outfit {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        items: &[&str],
        temperature: f64,
        weather: WeatherCondition,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            items: items.iter().map(|i| i.to_string()).collect(),
            description: String::new(),
            temperature,
            weather,
            like_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_likes(mut self, like_count: u32) -> Self {
        self.like_count = like_count;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOutfit {
    pub outfit: Outfit,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortRange {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

impl Default for ComfortRange {
    fn default() -> Self {
        Self {
            min: 15.0,
            max: 25.0,
            optimal: 20.0,
        }
    }
}

impl ComfortRange {
    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }
}

/// Preference distributions derived from a user's history for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFeatureVector {
    pub region: String,
    pub style_preferences: BTreeMap<String, f64>,
    pub color_preferences: BTreeMap<String, f64>,
    pub temperature_sensitivity: f64,
    pub comfort_range: ComfortRange,
    pub time_preferences: BTreeMap<TimeOfDay, f64>,
    pub total_records: usize,
}

impl Default for UserFeatureVector {
    fn default() -> Self {
        Self {
            region: "unknown".to_string(),
            style_preferences: BTreeMap::new(),
            color_preferences: BTreeMap::new(),
            temperature_sensitivity: 0.0,
            comfort_range: ComfortRange::default(),
            time_preferences: BTreeMap::new(),
            total_records: 0,
        }
    }
}

impl UserFeatureVector {
    pub fn top_styles(&self, k: usize) -> Vec<(String, f64)> {
        crate::utils::top_k_entries(&self.style_preferences, k)
    }

    pub fn top_colors(&self, k: usize) -> Vec<(String, f64)> {
        crate::utils::top_k_entries(&self.color_preferences, k)
    }

    /// Summary stored alongside a recommendation; full distributions stay request-local.
    pub fn sanitized(&self) -> SanitizedFeatures {
        SanitizedFeatures {
            region: self.region.clone(),
            top_styles: self.top_styles(3).into_iter().map(|(tag, _)| tag).collect(),
            top_colors: self.top_colors(2).into_iter().map(|(color, _)| color).collect(),
            temperature_sensitivity: self.temperature_sensitivity,
            comfort_range: self.comfort_range,
            total_records: self.total_records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedFeatures {
    pub region: String,
    pub top_styles: Vec<String>,
    pub top_colors: Vec<String>,
    pub temperature_sensitivity: f64,
    pub comfort_range: ComfortRange,
    pub total_records: usize,
}

impl Default for SanitizedFeatures {
    fn default() -> Self {
        UserFeatureVector::default().sanitized()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextVector {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub weather_condition: WeatherCondition,
    pub rain_amount: f64,
    pub hour: u32,
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: u32,
    pub time_of_day: TimeOfDay,
    pub season: Season,
    pub region: String,
    pub timestamp: NaiveDateTime,
}

impl ContextVector {
    pub fn is_weekend(&self) -> bool {
        self.day_of_week == 0 || self.day_of_week == 6
    }
}

/// Caller-supplied inputs for a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    pub weather: Weather,
    pub time: NaiveDateTime,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "unknown".to_string()
}

impl RecommendationContext {
    pub fn new(weather: Weather, time: NaiveDateTime) -> Self {
        Self {
            weather,
            time,
            season: None,
            region: default_region(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Style,
    Weather,
    Temperature,
    TimeOfDay,
    Community,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Style => "style",
            SignalKind::Weather => "weather",
            SignalKind::Temperature => "temperature",
            SignalKind::TimeOfDay => "time",
            SignalKind::Community => "community",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPrediction {
    pub items: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
}

impl SignalPrediction {
    pub fn new(items: Vec<String>, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            items,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    pub items: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: UserId,
    pub context: ContextVector,
    pub sanitized_user_features: SanitizedFeatures,
    pub recommended_items: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
    pub alternatives: Vec<AlternativeGroup>,
    pub created_at: DateTime<Utc>,
    pub model_version: String,
}

impl Recommendation {
    pub fn is_fallback(&self) -> bool {
        self.model_version == crate::services::recommendation::FALLBACK_MODEL_VERSION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Positive,
    Neutral,
    Negative,
}

/// User reaction as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub rating: u8,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub selected_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: UserId,
    pub recommendation_id: Uuid,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub rating: u8,
    pub reason: String,
    pub selected_items: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Event handed to the interaction log after each recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: UserId,
    pub recommendation_id: Uuid,
    pub recommended_items: Vec<String>,
    pub confidence: f64,
    pub model_version: String,
    pub logged_at: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn from_recommendation(recommendation: &Recommendation, logged_at: DateTime<Utc>) -> Self {
        Self {
            user_id: recommendation.user_id.clone(),
            recommendation_id: recommendation.id,
            recommended_items: recommendation.recommended_items.clone(),
            confidence: recommendation.confidence,
            model_version: recommendation.model_version.clone(),
            logged_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn around(center: f64, window: f64) -> Self {
        Self {
            min: center - window,
            max: center + window,
        }
    }

    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
    }

    #[test]
    fn test_weather_condition_aliases() {
        let parsed: WeatherCondition = serde_json::from_str("\"snow\"").unwrap();
        assert_eq!(parsed, WeatherCondition::Snowy);
        let parsed: WeatherCondition = serde_json::from_str("\"hail\"").unwrap();
        assert_eq!(parsed, WeatherCondition::Other);
        assert_eq!("Rainy".parse::<WeatherCondition>().unwrap(), WeatherCondition::Rainy);
    }

    #[test]
    fn test_sanitized_features_keep_top_entries() {
        let mut features = UserFeatureVector::default();
        features.style_preferences.insert("casual".into(), 0.5);
        features.style_preferences.insert("formal".into(), 0.3);
        features.style_preferences.insert("street".into(), 0.1);
        features.style_preferences.insert("vintage".into(), 0.1);

        let sanitized = features.sanitized();
        assert_eq!(sanitized.top_styles, vec!["casual", "formal", "street"]);
        assert!(sanitized.top_colors.is_empty());
    }
}
