use super::SignalPredictor;
use crate::models::*;
use crate::utils::push_unique;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Garments that go with each canonical style tag.
const STYLE_ITEMS: &[(&str, &[&str])] = &[
    ("casual", &["청바지", "맨투맨", "스니커즈"]),
    ("formal", &["셔츠", "슬랙스", "로퍼"]),
    ("sporty", &["트레이닝복", "운동화", "후드티"]),
    ("street", &["오버핏 티셔츠", "카고 팬츠", "볼캡"]),
    ("minimal", &["무지 티셔츠", "와이드 팬츠", "가죽 스니커즈"]),
    ("vintage", &["데님 자켓", "플란넬 셔츠", "부츠"]),
    ("romantic", &["블라우스", "플레어 스커트", "플랫 슈즈"]),
];

pub struct StylePredictor;

impl StylePredictor {
    fn items_for_style(style: &str) -> &'static [&'static str] {
        STYLE_ITEMS
            .iter()
            .find(|(tag, _)| *tag == style)
            .map(|(_, items)| *items)
            .unwrap_or(&[])
    }

    pub fn predict_sync(features: &UserFeatureVector) -> SignalPrediction {
        let top_styles = features.top_styles(3);
        let top_colors = features.top_colors(2);

        let Some((dominant, dominant_freq)) = top_styles.first().cloned() else {
            return SignalPrediction::new(
                top_colors.iter().map(|(color, _)| format!("{} 계열 아이템", color)).collect(),
                0.3,
                "Not enough style history yet",
            );
        };

        let mut items = Vec::new();
        for (style, _) in &top_styles {
            for item in Self::items_for_style(style) {
                push_unique(&mut items, item);
            }
        }
        for (color, _) in &top_colors {
            push_unique(&mut items, &format!("{} 계열 아이템", color));
        }

        let confidence = if dominant_freq > 0.5 {
            0.9
        } else if dominant_freq > 0.3 {
            0.7
        } else {
            0.5
        };

        SignalPrediction::new(
            items,
            confidence,
            format!("You mostly wear {} outfits ({:.0}%)", dominant, dominant_freq * 100.0),
        )
    }
}

#[async_trait::async_trait]
impl SignalPredictor for StylePredictor {
    fn kind(&self) -> SignalKind {
        SignalKind::Style
    }

    async fn predict(&self, features: &UserFeatureVector, _context: &ContextVector) -> SignalPrediction {
        Self::predict_sync(features)
    }
}

/// Items dropped from the weather set once it gets hot.
const COLD_WEATHER_ITEMS: &[&str] = &["따뜻한 코트", "목도리", "방한 부츠", "니트", "가디건", "패딩"];
const WARM_LAYER_ITEMS: &[&str] = &["따뜻한 코트", "니트"];
const COOLING_ITEMS: &[&str] = &["반팔 티셔츠", "반바지", "샌들"];

pub struct WeatherPredictor;

impl WeatherPredictor {
    pub fn predict_sync(context: &ContextVector) -> SignalPrediction {
        let (base, confidence, reasoning): (&[&str], f64, &str) = match context.weather_condition {
            WeatherCondition::Rainy => (&["우산", "방수 자켓", "레인부츠"], 0.9, "Rain expected, stay dry"),
            WeatherCondition::Snowy => (&["따뜻한 코트", "목도리", "방한 부츠"], 0.9, "Snow expected, bundle up"),
            WeatherCondition::Sunny => (&["선글라스", "가벼운 셔츠", "모자"], 0.85, "Sunny skies today"),
            WeatherCondition::Cloudy => (&["가디건", "긴팔 티셔츠"], 0.75, "Overcast, layer lightly"),
            WeatherCondition::Other => (&["가벼운 자켓", "긴팔 티셔츠"], 0.8, "Mixed weather, keep a light jacket"),
        };

        let mut items = owned(base);
        if context.temperature < 10.0 {
            for item in WARM_LAYER_ITEMS {
                push_unique(&mut items, item);
            }
        } else if context.temperature > 25.0 {
            items.retain(|item| !COLD_WEATHER_ITEMS.contains(&item.as_str()));
            for item in COOLING_ITEMS {
                push_unique(&mut items, item);
            }
        }

        SignalPrediction::new(items, confidence, reasoning)
    }
}

#[async_trait::async_trait]
impl SignalPredictor for WeatherPredictor {
    fn kind(&self) -> SignalKind {
        SignalKind::Weather
    }

    async fn predict(&self, _features: &UserFeatureVector, context: &ContextVector) -> SignalPrediction {
        Self::predict_sync(context)
    }
}

const WARM_ITEMS: &[&str] = &["패딩", "니트", "히트텍"];
const EXTRA_WARM_ITEM: &str = "핫팩";
const COOL_ITEMS: &[&str] = &["반팔 티셔츠", "린넨 셔츠", "반바지"];
const EXTRA_COOL_ITEM: &str = "쿨토시";
const MODERATE_ITEMS: &[&str] = &["긴팔 티셔츠", "가디건", "면바지"];

/// Sensitivity above which an extra warmth/cooling item is added.
const SENSITIVE_THRESHOLD: f64 = 0.3;

pub struct TemperaturePredictor;

impl TemperaturePredictor {
    pub fn predict_sync(features: &UserFeatureVector, context: &ContextVector) -> SignalPrediction {
        let range = features.comfort_range;
        let sensitivity = features.temperature_sensitivity.clamp(0.0, 1.0);
        let temperature = context.temperature;
        let out_of_range_confidence = 0.7 + 0.15 * sensitivity;

        if temperature < range.min {
            let mut items = owned(WARM_ITEMS);
            if sensitivity > SENSITIVE_THRESHOLD {
                items.push(EXTRA_WARM_ITEM.to_string());
            }
            SignalPrediction::new(
                items,
                out_of_range_confidence,
                format!("{:.0}° is below your comfort range ({:.0}°~{:.0}°)", temperature, range.min, range.max),
            )
        } else if temperature > range.max {
            let mut items = owned(COOL_ITEMS);
            if sensitivity > SENSITIVE_THRESHOLD {
                items.push(EXTRA_COOL_ITEM.to_string());
            }
            SignalPrediction::new(
                items,
                out_of_range_confidence,
                format!("{:.0}° is above your comfort range ({:.0}°~{:.0}°)", temperature, range.min, range.max),
            )
        } else {
            SignalPrediction::new(
                owned(MODERATE_ITEMS),
                0.75,
                format!("{:.0}° is within your comfort range", temperature),
            )
        }
    }

    pub fn moderate_items() -> Vec<String> {
        owned(MODERATE_ITEMS)
    }
}

#[async_trait::async_trait]
impl SignalPredictor for TemperaturePredictor {
    fn kind(&self) -> SignalKind {
        SignalKind::Temperature
    }

    async fn predict(&self, features: &UserFeatureVector, context: &ContextVector) -> SignalPrediction {
        Self::predict_sync(features, context)
    }
}

pub struct TimeOfDayPredictor;

impl TimeOfDayPredictor {
    pub fn predict_sync(context: &ContextVector) -> SignalPrediction {
        let period: &[&str] = match context.time_of_day {
            TimeOfDay::Morning => &["가디건", "가벼운 자켓"],
            TimeOfDay::Afternoon => &["반팔 티셔츠", "선글라스"],
            TimeOfDay::Evening => &["자켓", "니트"],
            TimeOfDay::Night => &["후드티", "트레이닝복"],
        };
        let day: &[&str] = if context.is_weekend() {
            &["맨투맨", "청바지", "스니커즈"]
        } else {
            &["셔츠", "슬랙스"]
        };

        let mut items = owned(period);
        for item in day {
            push_unique(&mut items, item);
        }

        let when = if context.is_weekend() { "weekend" } else { "weekday" };
        SignalPrediction::new(
            items,
            0.6,
            format!("Suited to a {} {}", when, context.time_of_day.as_str()),
        )
    }
}

#[async_trait::async_trait]
impl SignalPredictor for TimeOfDayPredictor {
    fn kind(&self) -> SignalKind {
        SignalKind::TimeOfDay
    }

    async fn predict(&self, _features: &UserFeatureVector, context: &ContextVector) -> SignalPrediction {
        Self::predict_sync(context)
    }
}
